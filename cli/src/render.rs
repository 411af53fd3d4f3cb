//! Terminal output for command results.

use std::fmt::Write;

use exchange::{
  precision::format_fixed, weex::response::PositionSummary, Adjustment, AllPositions,
  OrderRequest, PlacedOrder,
};
use rust_decimal::Decimal;
use serde_json::Value;

fn pretty(value: &Value) -> String {
  serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn titled(title: &str, value: &Value) {
  println!("{}:", title);
  println!("{}", pretty(value));
}

pub fn orders(orders: &[Value]) {
  if orders.is_empty() {
    println!("No open orders");
    return;
  }
  println!("{} open order(s):", orders.len());
  for order in orders {
    println!("{}", pretty(order));
  }
}

pub fn single_position(symbol: &str, response: &Value, verbose: bool) {
  print!("{}", single_position_report(symbol, response, verbose));
}

pub fn all_positions(all: &AllPositions, verbose: bool) {
  print!("{}", all_positions_report(all, verbose));
}

pub fn placed_order(request: &OrderRequest, placed: &PlacedOrder) {
  print!("{}", placed_order_report(request, placed));
}

fn single_position_report(symbol: &str, response: &Value, verbose: bool) -> String {
  let mut out = match PositionSummary::from_response(symbol, response) {
    Some(summary) => position_block(&summary),
    None => format!("No open position on {}\n", symbol),
  };
  if verbose {
    let _ = writeln!(out, "Raw response:\n{}", pretty(response));
  }
  out
}

fn all_positions_report(all: &AllPositions, verbose: bool) -> String {
  let mut out = String::new();
  if all.positions.is_empty() {
    out.push_str("No open positions\n");
  } else {
    for summary in &all.positions {
      out.push_str(&position_block(summary));
      if verbose {
        let _ = writeln!(out, "  raw: {}", pretty(&summary.raw));
      }
    }
    let _ = writeln!(
      out,
      "Total open value: {}",
      format_fixed(total_open_value(&all.positions), 2)
    );
  }

  if !all.failures.is_empty() {
    let _ = writeln!(out, "Failed to query {} symbol(s):", all.failures.len());
    for (symbol, e) in &all.failures {
      let _ = writeln!(out, "  {}: {}", symbol, e.summary());
    }
  }
  out
}

fn placed_order_report(request: &OrderRequest, placed: &PlacedOrder) -> String {
  let mut out = String::new();
  let body = &placed.order.body;
  match placed.order.adjustment {
    Adjustment::Applied(_) => {
      if placed.order.adjusted_size != request.size {
        let _ = writeln!(out, "Size adjusted {} -> {}", request.size, body.size);
      }
      if let (Some(asked), Some(adjusted)) = (request.price, placed.order.adjusted_price) {
        if asked != adjusted {
          let _ = writeln!(out, "Price adjusted {} -> {}", asked, body.price);
        }
      }
    }
    Adjustment::PassedThrough => {
      let _ = writeln!(out, "No precision rules for {}, sent as given", request.symbol);
    }
  }

  let _ = writeln!(
    out,
    "Order placed: {} {} {} size {}{}",
    request.symbol,
    request.kind,
    request.side,
    body.size,
    match placed.order.adjusted_price {
      Some(_) => format!(" @ {}", body.price),
      None => String::new(),
    }
  );
  match &placed.order_id {
    Some(id) => {
      let _ = writeln!(out, "Order id: {}", id);
    }
    None => {
      let _ = writeln!(out, "Order id: unknown");
      let _ = writeln!(
        out,
        "No order id in the reply; the order may have been accepted or filled immediately."
      );
      let _ = writeln!(out, "Response:\n{}", pretty(&placed.response));
    }
  }
  out
}

fn position_block(summary: &PositionSummary) -> String {
  let mut out = format!(
    "{} {}\n  size: {}\n  leverage: {}x\n  open value: {}\n  margin: {}\n  unrealized PnL: {}\n",
    summary.symbol,
    summary.side,
    summary.size,
    summary.leverage,
    summary.open_value,
    summary.margin_size,
    summary.unrealized_pnl,
  );
  if let Some(price) = &summary.liquidate_price {
    let _ = writeln!(out, "  liquidation price: {}", price);
  }
  out
}

/// Sum of open values; entries that do not parse are left out.
fn total_open_value(positions: &[PositionSummary]) -> Decimal {
  positions
    .iter()
    .filter_map(PositionSummary::open_value_decimal)
    .sum()
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use exchange::{ExchangeError, PrecisionTable, Side};
  use serde_json::json;

  use super::*;

  fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
  }

  fn summary(response: Value) -> PositionSummary {
    PositionSummary::from_response("cmt_btcusdt", &response).unwrap()
  }

  fn placed(request: &OrderRequest, response: Value) -> PlacedOrder {
    PlacedOrder {
      order: request.normalize(&PrecisionTable::default(), "1").unwrap(),
      order_id: exchange::weex::response::order_id(&response),
      response,
    }
  }

  #[test]
  fn total_skips_unparsable_values() {
    let positions = vec![
      summary(json!({ "size": "1", "openValue": "100.25" })),
      summary(json!({ "size": "1", "open_value": "49.75" })),
      summary(json!({ "size": "1", "openValue": "n/a" })),
    ];
    assert_eq!(total_open_value(&positions), Decimal::new(150, 0));
    assert_eq!(total_open_value(&[]), Decimal::ZERO);
  }

  #[test]
  fn total_is_printed_with_two_decimals() {
    let all = AllPositions {
      positions: vec![
        summary(json!({ "size": "1", "openValue": "100.25" })),
        summary(json!({ "size": "1", "openValue": "49.755" })),
      ],
      failures: Vec::new(),
    };
    assert!(all_positions_report(&all, false).contains("Total open value: 150.00\n"));

    let whole = AllPositions {
      positions: vec![summary(json!({ "size": "1", "openValue": "10" }))],
      failures: Vec::new(),
    };
    assert!(all_positions_report(&whole, false).contains("Total open value: 10.00\n"));
  }

  #[test]
  fn failures_are_listed_with_their_message() {
    let all = AllPositions {
      positions: Vec::new(),
      failures: vec![(
        "cmt_adausdt".to_string(),
        ExchangeError::Api {
          status: 500,
          body: r#"{"msg":"busy"}"#.to_string(),
        },
      )],
    };
    let report = all_positions_report(&all, false);
    assert!(report.starts_with("No open positions\n"));
    assert!(report.contains("  cmt_adausdt: busy\n"));
  }

  #[test]
  fn verbose_positions_include_raw_json() {
    let response = json!({ "size": "2", "side": "LONG", "marginMode": "cross" });
    let all = AllPositions {
      positions: vec![summary(response.clone())],
      failures: Vec::new(),
    };
    assert!(!all_positions_report(&all, false).contains("marginMode"));
    assert!(all_positions_report(&all, true).contains("\"marginMode\": \"cross\""));

    let single = single_position_report("cmt_btcusdt", &response, true);
    assert!(single.starts_with("cmt_btcusdt LONG\n"));
    assert!(single.contains("Raw response:"));
    assert!(single.contains("\"marginMode\": \"cross\""));

    let flat = json!({ "size": "0", "unrealizePnl": "0", "marker": 7 });
    let single = single_position_report("cmt_ethusdt", &flat, true);
    assert!(single.starts_with("No open position on cmt_ethusdt\n"));
    assert!(single.contains("\"marker\": 7"));
    assert!(!single_position_report("cmt_ethusdt", &flat, false).contains("marker"));
  }

  #[test]
  fn order_without_id_shows_response() {
    let request = OrderRequest::market("cmt_btcusdt", Side::Buy, d("0.0104"));
    let report = placed_order_report(&request, &placed(&request, json!({ "code": "00000" })));
    assert!(report.contains("Size adjusted 0.0104 -> 0.01\n"));
    assert!(report.contains("Order id: unknown\n"));
    assert!(report.contains("filled immediately"));
    assert!(report.contains("\"code\": \"00000\""));
  }

  #[test]
  fn order_with_id_is_brief() {
    let request = OrderRequest::limit("cmt_btcusdt", Side::Sell, d("0.01"), d("80000"));
    let report = placed_order_report(&request, &placed(&request, json!({ "orderId": "42" })));
    assert!(report.contains("Order placed: cmt_btcusdt limit sell size 0.01 @ 80000.0\n"));
    assert!(report.ends_with("Order id: 42\n"));
    assert!(!report.contains("adjusted"));
    assert!(!report.contains("Response"));
  }

  #[test]
  fn position_block_lists_fields() {
    let block = position_block(&summary(json!({
      "size": "2",
      "side": "LONG",
      "leverage": "20",
      "openValue": "1000",
      "marginSize": "50",
      "unrealizePnl": "-4.5",
      "liquidatePrice": "61000"
    })));
    assert!(block.starts_with("cmt_btcusdt LONG\n"));
    assert!(block.contains("  leverage: 20x\n"));
    assert!(block.contains("  unrealized PnL: -4.5\n"));
    assert!(block.ends_with("  liquidation price: 61000\n"));
  }

  #[test]
  fn position_block_omits_missing_liquidation_price() {
    let block = position_block(&summary(json!({ "size": "1" })));
    assert!(!block.contains("liquidation"));
    assert!(block.starts_with("cmt_btcusdt unknown\n"));
  }
}
