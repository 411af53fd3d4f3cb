use serde::{Deserialize, Serialize};

pub const ACCOUNT_ASSETS: &str = "/capi/v2/account/assets";
pub const MARKET_TICKER: &str = "/capi/v2/market/ticker";
pub const CURRENT_ORDERS: &str = "/capi/v2/order/current";
pub const ORDER_HISTORY: &str = "/capi/v2/order/history";
pub const ORDER_FILLS: &str = "/capi/v2/order/fills";
pub const SINGLE_POSITION: &str = "/capi/v2/account/position/singlePosition";
pub const LEVERAGE: &str = "/capi/v2/account/leverage";
pub const PLACE_ORDER: &str = "/capi/v2/order/placeOrder";
pub const CANCEL_ORDER: &str = "/capi/v2/order/cancel_order";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SymbolQuery<'a> {
  pub symbol: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery<'a> {
  pub symbol: &'a str,
  pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginMode {
  Cross,
  Isolated,
}

impl MarginMode {
  pub fn code(&self) -> u8 {
    match self {
      MarginMode::Cross => 1,
      MarginMode::Isolated => 2,
    }
  }
}

impl TryFrom<u8> for MarginMode {
  type Error = String;

  fn try_from(code: u8) -> Result<Self, Self::Error> {
    match code {
      1 => Ok(MarginMode::Cross),
      2 => Ok(MarginMode::Isolated),
      other => Err(format!("unknown margin mode {}, expected 1 (cross) or 2 (isolated)", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLeverageRequest {
  pub symbol: String,
  pub margin_mode: u8,
  pub long_leverage: String,
  pub short_leverage: String,
}

impl SetLeverageRequest {
  pub fn new(symbol: impl Into<String>, margin_mode: MarginMode, long: u32, short: u32) -> Self {
    Self {
      symbol: symbol.into(),
      margin_mode: margin_mode.code(),
      long_leverage: long.to_string(),
      short_leverage: short.to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
  pub order_id: String,
}
