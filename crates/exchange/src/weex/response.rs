//! Reading WEEX response bodies.
//!
//! The API is not consistent about field names, so every logical field has
//! an ordered alias list in [`aliases`]. [`field`] returns the first alias
//! that is present, not null and not an empty string.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

pub mod aliases {
  pub const SIZE: &[&str] = &["size", "amount"];
  /// The live API spells it `unrealizePnl`.
  pub const UNREALIZED_PNL: &[&str] = &[
    "unrealizePnl",
    "unrealizedPnl",
    "unrealizedPNL",
    "unrealized_pnl",
  ];
  pub const SIDE: &[&str] = &["side", "positionSide"];
  pub const LEVERAGE: &[&str] = &["leverage"];
  pub const OPEN_VALUE: &[&str] = &["open_value", "openValue"];
  pub const MARGIN_SIZE: &[&str] = &["marginSize", "margin_size"];
  pub const LIQUIDATE_PRICE: &[&str] = &["liquidatePrice", "liquidate_price"];
  pub const ORDER_ID: &[&str] = &["order_id", "orderId", "data"];
  /// Envelope members that may wrap a list result.
  pub const LIST: &[&str] = &["data", "list"];
}

pub fn field<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
  names.iter().find_map(|name| match record.get(*name) {
    None | Some(Value::Null) => None,
    Some(Value::String(s)) if s.is_empty() => None,
    Some(value) => Some(value),
  })
}

/// Like [`field`] but rendered as text; strings are returned without quotes.
pub fn field_text(record: &Map<String, Value>, names: &[&str]) -> Option<String> {
  field(record, names).map(|value| match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  })
}

/// The position object inside a single-position reply: the first element of
/// an array, the `data` member of an object, or the object itself.
pub fn position_record(response: &Value) -> Option<&Map<String, Value>> {
  match response {
    Value::Array(items) => items.first().and_then(Value::as_object),
    Value::Object(object) => match object.get("data") {
      Some(data) => data.as_object(),
      None => Some(object),
    },
    _ => None,
  }
}

/// A record holds a position when its size is positive or its unrealized
/// PnL is non-zero. Values that do not parse count as holding.
pub fn holds_position(record: &Map<String, Value>) -> bool {
  let parse = |names: &[&str]| {
    field_text(record, names)
      .unwrap_or_else(|| "0".to_string())
      .trim()
      .parse::<Decimal>()
      .ok()
  };
  match (parse(aliases::SIZE), parse(aliases::UNREALIZED_PNL)) {
    (Some(size), Some(pnl)) => size > Decimal::ZERO || !pnl.is_zero(),
    _ => true,
  }
}

/// A list result: a bare array, or an array under `data` or `list`.
pub fn extract_list(response: Value) -> Vec<Value> {
  match response {
    Value::Array(items) => items,
    Value::Object(mut object) => aliases::LIST
      .iter()
      .find_map(|key| match object.remove(*key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
      })
      .unwrap_or_default(),
    _ => Vec::new(),
  }
}

pub fn order_id(response: &Value) -> Option<String> {
  response
    .as_object()
    .and_then(|object| field_text(object, aliases::ORDER_ID))
}

/// The fields a position view shows, with the raw record alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
  pub symbol: String,
  pub side: String,
  pub size: String,
  pub leverage: String,
  pub open_value: String,
  pub margin_size: String,
  pub unrealized_pnl: String,
  pub liquidate_price: Option<String>,
  pub raw: Value,
}

impl PositionSummary {
  pub fn from_record(symbol: impl Into<String>, record: &Map<String, Value>) -> Self {
    let text = |names: &[&str], default: &str| {
      field_text(record, names).unwrap_or_else(|| default.to_string())
    };
    Self {
      symbol: symbol.into(),
      side: text(aliases::SIDE, "unknown"),
      size: text(aliases::SIZE, "0"),
      leverage: text(aliases::LEVERAGE, "1"),
      open_value: text(aliases::OPEN_VALUE, "0"),
      margin_size: text(aliases::MARGIN_SIZE, "0"),
      unrealized_pnl: text(aliases::UNREALIZED_PNL, "0"),
      liquidate_price: field_text(record, aliases::LIQUIDATE_PRICE),
      raw: Value::Object(record.clone()),
    }
  }

  /// Summary of a single-position reply, or `None` when flat.
  pub fn from_response(symbol: &str, response: &Value) -> Option<Self> {
    position_record(response)
      .filter(|record| holds_position(record))
      .map(|record| Self::from_record(symbol, record))
  }

  pub fn open_value_decimal(&self) -> Option<Decimal> {
    self.open_value.trim().parse().ok()
  }
}
