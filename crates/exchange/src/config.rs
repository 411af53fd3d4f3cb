use std::{env, fmt};

use crate::error::{ExchangeError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api-contract.weex.com";
pub const DEFAULT_LOCALE: &str = "zh-CN";

const API_KEY_VAR: &str = "WEEX_API_KEY";
const SECRET_KEY_VAR: &str = "WEEX_SECRET_KEY";
const PASSPHRASE_VAR: &str = "WEEX_PASSPHRASE";
const BASE_URL_VAR: &str = "WEEX_API_BASE_URL";
const LOCALE_VAR: &str = "WEEX_LOCALE";
/// Checked in order, first non-empty wins.
const PROXY_VARS: [&str; 3] = ["WEEX_PROXY", "HTTPS_PROXY", "HTTP_PROXY"];

/// API key, secret and passphrase. All three are non-empty.
#[derive(Clone)]
pub struct Credentials {
  api_key: String,
  secret_key: String,
  passphrase: String,
}

impl Credentials {
  pub fn new(
    api_key: impl Into<String>,
    secret_key: impl Into<String>,
    passphrase: impl Into<String>,
  ) -> Result<Self> {
    let credentials = Self {
      api_key: api_key.into(),
      secret_key: secret_key.into(),
      passphrase: passphrase.into(),
    };
    let missing: Vec<&str> = [
      (API_KEY_VAR, &credentials.api_key),
      (SECRET_KEY_VAR, &credentials.secret_key),
      (PASSPHRASE_VAR, &credentials.passphrase),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
      Ok(credentials)
    } else {
      Err(missing_vars(&missing))
    }
  }

  pub fn api_key(&self) -> &str {
    &self.api_key
  }

  pub fn secret_key(&self) -> &str {
    &self.secret_key
  }

  pub fn passphrase(&self) -> &str {
    &self.passphrase
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("api_key", &mask(&self.api_key, 10))
      .field("secret_key", &"***")
      .field("passphrase", &"***")
      .finish()
  }
}

/// Keeps the first `keep` characters and hides the rest.
pub fn mask(value: &str, keep: usize) -> String {
  let visible: String = value.chars().take(keep).collect();
  format!("{}***", visible)
}

fn missing_vars(names: &[&str]) -> ExchangeError {
  ExchangeError::Config(format!(
    "missing required environment variables: {}",
    names.join(", ")
  ))
}

#[derive(Debug, Clone)]
pub struct Config {
  pub credentials: Credentials,
  pub base_url: String,
  pub proxy: Option<String>,
  pub locale: String,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes
  /// `std::env::var`.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| {
      lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    let api_key = get(API_KEY_VAR);
    let secret_key = get(SECRET_KEY_VAR);
    let passphrase = get(PASSPHRASE_VAR);

    let credentials = match (api_key, secret_key, passphrase) {
      (Some(api_key), Some(secret_key), Some(passphrase)) => {
        Credentials::new(api_key, secret_key, passphrase)?
      }
      (api_key, secret_key, passphrase) => {
        let missing: Vec<&str> = [
          (API_KEY_VAR, api_key.is_none()),
          (SECRET_KEY_VAR, secret_key.is_none()),
          (PASSPHRASE_VAR, passphrase.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        return Err(missing_vars(&missing));
      }
    };

    let base_url = get(BASE_URL_VAR)
      .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
      .trim_end_matches('/')
      .to_string();
    url::Url::parse(&base_url)
      .map_err(|e| ExchangeError::Config(format!("{} is not a valid url: {}", BASE_URL_VAR, e)))?;

    Ok(Self {
      credentials,
      base_url,
      proxy: PROXY_VARS.iter().find_map(|name| get(*name)),
      locale: get(LOCALE_VAR).unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
    })
  }
}
