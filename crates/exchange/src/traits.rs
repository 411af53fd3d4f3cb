use async_trait::async_trait;

use crate::{error::Result, request::SignedRequest};

/// Status code and body text of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
  pub status: u16,
  pub body: String,
}

impl RawResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Sends a [`SignedRequest`] exactly as built. Implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn execute(&self, request: &SignedRequest) -> Result<RawResponse>;
}
