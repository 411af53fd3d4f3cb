use std::{fmt, str::FromStr};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
  error::{ExchangeError, Result},
  precision::{PrecisionTable, SymbolPrecision},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
  Buy,
  Sell,
}

impl Side {
  /// `"1"` opens long, `"2"` opens short.
  pub fn wire_code(&self) -> &'static str {
    match self {
      Side::Buy => "1",
      Side::Sell => "2",
    }
  }
}

impl FromStr for Side {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "buy" => Ok(Side::Buy),
      "sell" => Ok(Side::Sell),
      other => Err(format!("unknown side `{}`, expected buy or sell", other)),
    }
  }
}

impl fmt::Display for Side {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Side::Buy => "buy",
      Side::Sell => "sell",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
  Market,
  Limit,
}

impl OrderKind {
  /// `match_price`: `"1"` for market, `"0"` for limit.
  pub fn match_price(&self) -> &'static str {
    match self {
      OrderKind::Market => "1",
      OrderKind::Limit => "0",
    }
  }
}

impl FromStr for OrderKind {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "market" => Ok(OrderKind::Market),
      "limit" => Ok(OrderKind::Limit),
      other => Err(format!("unknown order type `{}`, expected market or limit", other)),
    }
  }
}

impl fmt::Display for OrderKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      OrderKind::Market => "market",
      OrderKind::Limit => "limit",
    })
  }
}

/// What the user asked for, before precision rules are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
  pub symbol: String,
  pub side: Side,
  pub kind: OrderKind,
  pub size: Decimal,
  /// Required for limit orders, ignored for market orders.
  pub price: Option<Decimal>,
}

/// Whether the precision table knew the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
  Applied(SymbolPrecision),
  /// Unknown symbol; values went out exactly as given.
  PassedThrough,
}

/// `POST /capi/v2/order/placeOrder` body, fields in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceOrderBody {
  pub symbol: String,
  pub client_oid: String,
  pub size: String,
  #[serde(rename = "type")]
  pub side: String,
  pub order_type: String,
  pub match_price: String,
  pub price: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrder {
  pub body: PlaceOrderBody,
  pub adjusted_size: Decimal,
  /// `None` for market orders.
  pub adjusted_price: Option<Decimal>,
  pub adjustment: Adjustment,
}

/// Current time in milliseconds, used as `client_oid`.
pub fn client_order_id() -> String {
  Utc::now().timestamp_millis().to_string()
}

impl OrderRequest {
  pub fn market(symbol: impl Into<String>, side: Side, size: Decimal) -> Self {
    Self {
      symbol: symbol.into(),
      side,
      kind: OrderKind::Market,
      size,
      price: None,
    }
  }

  pub fn limit(symbol: impl Into<String>, side: Side, size: Decimal, price: Decimal) -> Self {
    Self {
      symbol: symbol.into(),
      side,
      kind: OrderKind::Limit,
      size,
      price: Some(price),
    }
  }

  /// Applies the symbol's precision rules and produces the wire body.
  ///
  /// Fails with [`ExchangeError::MissingPrice`] for a limit order without a
  /// price; nothing else is checked.
  pub fn normalize(
    &self,
    table: &PrecisionTable,
    client_oid: impl Into<String>,
  ) -> Result<NormalizedOrder> {
    let limit_price = match (self.kind, self.price) {
      (OrderKind::Limit, None) => {
        return Err(ExchangeError::MissingPrice {
          symbol: self.symbol.clone(),
        })
      }
      (OrderKind::Limit, Some(price)) => Some(price),
      (OrderKind::Market, _) => None,
    };

    let (adjusted_size, size, adjusted_price, price, adjustment) = match table.lookup(&self.symbol) {
      Some(precision) => {
        let adjusted_size = precision.adjust_size(self.size);
        let adjusted_price = limit_price.map(|p| precision.adjust_price(p));
        (
          adjusted_size,
          precision.format_size(adjusted_size),
          adjusted_price,
          adjusted_price.map(|p| precision.format_price(p)),
          Adjustment::Applied(*precision),
        )
      }
      None => {
        tracing::warn!(
          symbol = %self.symbol,
          "no precision rules for symbol, sending size and price unchanged"
        );
        (
          self.size,
          self.size.normalize().to_string(),
          limit_price,
          limit_price.map(|p| p.normalize().to_string()),
          Adjustment::PassedThrough,
        )
      }
    };

    Ok(NormalizedOrder {
      body: PlaceOrderBody {
        symbol: self.symbol.clone(),
        client_oid: client_oid.into(),
        size,
        side: self.side.wire_code().to_string(),
        order_type: "0".to_string(),
        match_price: self.kind.match_price().to_string(),
        price: price.unwrap_or_else(|| "0".to_string()),
      },
      adjusted_size,
      adjusted_price,
      adjustment,
    })
  }
}
