pub mod response;
pub mod types;

use futures::{stream, StreamExt};
use serde_json::Value;

use crate::{
  config::Config,
  error::{ExchangeError, Result},
  http::HttpTransport,
  order::{client_order_id, NormalizedOrder, OrderRequest},
  precision::PrecisionTable,
  request::{Method, RequestBuilder, SignedRequest},
  traits::Transport,
};

use self::{
  response::PositionSummary,
  types::{
    CancelOrderRequest, PageQuery, SetLeverageRequest, SymbolQuery, ACCOUNT_ASSETS, CANCEL_ORDER,
    CURRENT_ORDERS, LEVERAGE, MARKET_TICKER, ORDER_FILLS, ORDER_HISTORY, PLACE_ORDER,
    SINGLE_POSITION,
  },
};

/// In-flight single-position queries during [`Weex::all_positions`].
const POSITION_FANOUT: usize = 4;

/// WEEX contract REST client. Each call builds, signs and sends one request.
pub struct Weex<T: Transport = HttpTransport> {
  builder: RequestBuilder,
  transport: T,
  precision: PrecisionTable,
  fanout: usize,
}

#[derive(Debug)]
pub struct PlacedOrder {
  pub order: NormalizedOrder,
  /// `None` when the reply carried no recognizable id.
  pub order_id: Option<String>,
  pub response: Value,
}

/// Result of querying every known symbol. Both lists are in symbol order.
#[derive(Debug, Default)]
pub struct AllPositions {
  pub positions: Vec<PositionSummary>,
  pub failures: Vec<(String, ExchangeError)>,
}

impl Weex<HttpTransport> {
  pub fn from_config(config: &Config) -> Result<Self> {
    Ok(Self::new(
      RequestBuilder::from_config(config),
      HttpTransport::from_config(config)?,
    ))
  }
}

impl<T: Transport> Weex<T> {
  pub fn new(builder: RequestBuilder, transport: T) -> Self {
    Self {
      builder,
      transport,
      precision: PrecisionTable::default(),
      fanout: POSITION_FANOUT,
    }
  }

  pub fn with_precision(mut self, precision: PrecisionTable) -> Self {
    self.precision = precision;
    self
  }

  /// Caps concurrent requests in [`Weex::all_positions`]; `1` is sequential.
  pub fn with_fanout(mut self, fanout: usize) -> Self {
    self.fanout = fanout.max(1);
    self
  }

  pub fn precision(&self) -> &PrecisionTable {
    &self.precision
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub async fn account_assets(&self) -> Result<Value> {
    self.send(self.builder.build(Method::Get, ACCOUNT_ASSETS, "", "")?).await
  }

  pub async fn ticker(&self, symbol: &str) -> Result<Value> {
    self.send(self.builder.get(MARKET_TICKER, &SymbolQuery { symbol })?).await
  }

  /// Active orders, unwrapped from whichever envelope the API used.
  pub async fn current_orders(&self, symbol: &str) -> Result<Vec<Value>> {
    let response = self.send(self.builder.get(CURRENT_ORDERS, &SymbolQuery { symbol })?).await?;
    Ok(response::extract_list(response))
  }

  pub async fn order_history(&self, symbol: &str, page_size: u32) -> Result<Value> {
    self.send(self.builder.get(ORDER_HISTORY, &PageQuery { symbol, page_size })?).await
  }

  pub async fn fills(&self, symbol: &str, page_size: u32) -> Result<Value> {
    self.send(self.builder.get(ORDER_FILLS, &PageQuery { symbol, page_size })?).await
  }

  pub async fn single_position(&self, symbol: &str) -> Result<Value> {
    self.send(self.builder.get(SINGLE_POSITION, &SymbolQuery { symbol })?).await
  }

  /// Queries every symbol in the precision table. A failing symbol is
  /// recorded in `failures` and does not stop the others.
  pub async fn all_positions(&self) -> AllPositions {
    let symbols: Vec<String> = self.precision.symbols().map(str::to_string).collect();

    let results: Vec<(String, Result<Value>)> = stream::iter(symbols)
      .map(|symbol| async move {
        let result = self.single_position(&symbol).await;
        (symbol, result)
      })
      .buffered(self.fanout)
      .collect()
      .await;

    let mut all = AllPositions::default();
    for (symbol, result) in results {
      match result {
        Ok(response) => {
          if let Some(summary) = PositionSummary::from_response(&symbol, &response) {
            all.positions.push(summary);
          }
        }
        Err(e) => {
          tracing::warn!(symbol = %symbol, error = %e, "position query failed");
          all.failures.push((symbol, e));
        }
      }
    }
    all
  }

  pub async fn leverage(&self, symbol: &str) -> Result<Value> {
    self.send(self.builder.get(LEVERAGE, &SymbolQuery { symbol })?).await
  }

  pub async fn set_leverage(&self, request: &SetLeverageRequest) -> Result<Value> {
    self.send(self.builder.post(LEVERAGE, request)?).await
  }

  /// Normalizes, signs and submits an order. A limit order without a price
  /// fails before anything is sent.
  pub async fn place_order(&self, order: &OrderRequest) -> Result<PlacedOrder> {
    let normalized = order.normalize(&self.precision, client_order_id())?;

    tracing::info!(
      symbol = %order.symbol,
      side = %order.side,
      kind = %order.kind,
      size = %order.size,
      adjusted_size = %normalized.body.size,
      price = %normalized.body.price,
      client_oid = %normalized.body.client_oid,
      "placing order"
    );

    let response = self.send(self.builder.post(PLACE_ORDER, &normalized.body)?).await?;
    Ok(PlacedOrder {
      order_id: response::order_id(&response),
      order: normalized,
      response,
    })
  }

  pub async fn cancel_order(&self, order_id: &str) -> Result<Value> {
    let body = CancelOrderRequest {
      order_id: order_id.to_string(),
    };
    self.send(self.builder.post(CANCEL_ORDER, &body)?).await
  }

  async fn send(&self, request: SignedRequest) -> Result<Value> {
    let response = self.transport.execute(&request).await?;
    if !response.is_success() {
      return Err(ExchangeError::Api {
        status: response.status,
        body: response.body,
      });
    }
    if response.body.trim().is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(ExchangeError::Decode)
  }
}
