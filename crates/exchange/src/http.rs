use async_trait::async_trait;
use reqwest::{Client, Proxy};

use crate::{
  config::Config,
  error::{ExchangeError, Result},
  request::{Method, SignedRequest},
  traits::{RawResponse, Transport},
};

/// `reqwest` transport. One pooled client per process.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new(proxy: Option<&str>) -> Result<Self> {
    let mut builder = Client::builder();
    if let Some(proxy) = proxy {
      let proxy = Proxy::all(proxy)
        .map_err(|e| ExchangeError::Config(format!("invalid proxy url: {}", e)))?;
      builder = builder.proxy(proxy);
    }
    Ok(Self {
      client: builder.build()?,
    })
  }

  pub fn from_config(config: &Config) -> Result<Self> {
    Self::new(config.proxy.as_deref())
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn execute(&self, request: &SignedRequest) -> Result<RawResponse> {
    let builder = match request.method {
      Method::Get => self.client.get(request.url.clone()),
      Method::Post => self.client.post(request.url.clone()).body(request.body.clone()),
    };

    let response = builder.headers(request.headers.clone()).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;

    tracing::debug!(status, body = %body, "response");

    Ok(RawResponse { status, body })
  }
}
