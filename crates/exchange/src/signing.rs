//! ACCESS-SIGN computation.
//!
//! The signed message is `timestamp + METHOD + path + query + body` with no
//! separators. `query` is used verbatim (leading `?` included) and an absent
//! body is the empty string.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn canonical_message(
  timestamp: &str,
  method: &str,
  path: &str,
  query: &str,
  body: &str,
) -> String {
  format!(
    "{}{}{}{}{}",
    timestamp,
    method.to_uppercase(),
    path,
    query,
    body
  )
}

/// Base64 (standard alphabet, padded) HMAC-SHA256 of the canonical message.
pub fn sign(
  secret_key: &str,
  timestamp: &str,
  method: &str,
  path: &str,
  query: &str,
  body: &str,
) -> String {
  // HMAC pads or hashes the key, so every length is accepted.
  let mut mac =
    HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC takes keys of any length");
  mac.update(canonical_message(timestamp, method, path, query, body).as_bytes());
  STANDARD.encode(mac.finalize().into_bytes())
}
