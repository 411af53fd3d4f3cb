pub mod config;
pub mod error;
pub mod http;
pub mod order;
pub mod precision;
pub mod request;
pub mod signing;
pub mod traits;
pub mod weex;

pub use crate::{
  config::{Config, Credentials},
  error::{ExchangeError, Result},
  http::HttpTransport,
  order::{Adjustment, NormalizedOrder, OrderKind, OrderRequest, PlaceOrderBody, Side},
  precision::{PrecisionTable, SymbolPrecision},
  request::{Method, RequestBuilder, SignedRequest},
  traits::{RawResponse, Transport},
  weex::{AllPositions, PlacedOrder, Weex},
};
