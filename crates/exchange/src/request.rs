//! Signed request envelopes.
//!
//! A [`SignedRequest`] is fully specified: the transport sends `url`,
//! `headers` and `body` as they are. The body string is produced once and is
//! the same string that was signed.

use std::fmt;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use crate::{
  config::{mask, Config, Credentials, DEFAULT_LOCALE},
  error::{ExchangeError, Result},
  signing,
};

pub const ACCESS_KEY: &str = "access-key";
pub const ACCESS_SIGN: &str = "access-sign";
pub const ACCESS_TIMESTAMP: &str = "access-timestamp";
pub const ACCESS_PASSPHRASE: &str = "access-passphrase";
pub const LOCALE: &str = "locale";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Get,
  Post,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Post => "POST",
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone)]
pub struct SignedRequest {
  /// Milliseconds since epoch.
  pub timestamp: String,
  pub method: Method,
  pub path: String,
  /// Empty, or starting with `?`.
  pub query: String,
  /// Empty when the request has no body.
  pub body: String,
  pub signature: String,
  pub url: Url,
  pub headers: HeaderMap,
}

/// Turns `(method, path, query, body)` into a [`SignedRequest`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
  credentials: Credentials,
  base_url: String,
  locale: String,
}

impl RequestBuilder {
  pub fn new(credentials: Credentials, base_url: impl Into<String>) -> Self {
    Self {
      credentials,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      locale: DEFAULT_LOCALE.to_string(),
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.credentials.clone(), config.base_url.clone()).with_locale(config.locale.clone())
  }

  pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
    self.locale = locale.into();
    self
  }

  pub fn get<Q: Serialize>(&self, path: &str, query: &Q) -> Result<SignedRequest> {
    self.build(Method::Get, path, &encode_query(query)?, "")
  }

  pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<SignedRequest> {
    self.build(Method::Post, path, "", &encode_body(body)?)
  }

  /// Stamps the request with the current time.
  pub fn build(&self, method: Method, path: &str, query: &str, body: &str) -> Result<SignedRequest> {
    self.build_at(Utc::now().timestamp_millis(), method, path, query, body)
  }

  pub fn build_at(
    &self,
    timestamp_ms: i64,
    method: Method,
    path: &str,
    query: &str,
    body: &str,
  ) -> Result<SignedRequest> {
    let timestamp = timestamp_ms.to_string();
    let query = canonical_query(query);
    let signature = signing::sign(
      self.credentials.secret_key(),
      &timestamp,
      method.as_str(),
      path,
      &query,
      body,
    );

    let url = Url::parse(&format!("{}{}{}", self.base_url, path, query))?;

    let mut headers = HeaderMap::new();
    headers.insert(
      HeaderName::from_static(ACCESS_KEY),
      HeaderValue::from_str(self.credentials.api_key())?,
    );
    headers.insert(HeaderName::from_static(ACCESS_SIGN), HeaderValue::from_str(&signature)?);
    headers.insert(HeaderName::from_static(ACCESS_TIMESTAMP), HeaderValue::from_str(&timestamp)?);
    headers.insert(
      HeaderName::from_static(ACCESS_PASSPHRASE),
      HeaderValue::from_str(self.credentials.passphrase())?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static(LOCALE), HeaderValue::from_str(&self.locale)?);

    tracing::debug!(
      %method,
      path,
      url = %url,
      access_key = %mask(self.credentials.api_key(), 10),
      access_sign = %mask(&signature, 20),
      timestamp = %timestamp,
      body = %body,
      "signed request"
    );

    Ok(SignedRequest {
      timestamp,
      method,
      path: path.to_string(),
      query,
      body: body.to_string(),
      signature,
      url,
      headers,
    })
  }
}

/// `""` stays empty, anything else gets exactly one leading `?`.
pub fn canonical_query(query: &str) -> String {
  let trimmed = query.trim_start_matches('?');
  if trimmed.is_empty() {
    String::new()
  } else {
    format!("?{}", trimmed)
  }
}

/// Form-encodes a parameter struct in field declaration order.
pub fn encode_query<Q: Serialize>(query: &Q) -> Result<String> {
  Ok(canonical_query(&serde_qs::to_string(query)?))
}

pub fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<String> {
  serde_json::to_string(body).map_err(ExchangeError::Serialize)
}
