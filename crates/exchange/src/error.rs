use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
  /// Missing credentials or an unusable endpoint/proxy setting.
  #[error("configuration error: {0}")]
  Config(String),

  #[error("limit order on {symbol} requires a price")]
  MissingPrice { symbol: String },

  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// Non-2xx reply. `body` is the raw response text.
  #[error("exchange returned HTTP {status}: {body}")]
  Api { status: u16, body: String },

  #[error("failed to serialize request body: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to decode response body: {0}")]
  Decode(#[source] serde_json::Error),

  #[error("failed to encode query string: {0}")]
  Query(#[from] serde_qs::Error),

  #[error("invalid url: {0}")]
  Url(#[from] url::ParseError),

  #[error("invalid header value: {0}")]
  Header(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

impl ExchangeError {
  /// Short human message for an exchange rejection: the `message` or `msg`
  /// member of a JSON error body, falling back to the status line.
  pub fn summary(&self) -> String {
    match self {
      ExchangeError::Api { status, body } => serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
          ["message", "msg"]
            .iter()
            .find_map(|key| value.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| {
          let snippet: String = body.chars().take(100).collect();
          if snippet.is_empty() {
            format!("HTTP {}", status)
          } else {
            format!("HTTP {}: {}", status, snippet)
          }
        }),
      other => other.to_string(),
    }
  }
}
