//! Opaque continuation tokens for list calls.
//!
//! A token carries the last scanned cursor position and the filter it
//! was produced for, so a resumed call can verify it is continuing the
//! same query. Tokens are URL-safe base64 over a JSON payload: opaque
//! to callers, exact through an encode/decode round trip, and rejected
//! whenever the encoding is structurally invalid.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageToken {
  /// Scan cursor of the last physical row visited.
  pub cursor: i64,
  /// The filter the token's query ran with.
  pub filter: String,
}

impl PageToken {
  pub fn new(cursor: i64, filter: impl Into<String>) -> Self {
    Self {
      cursor,
      filter: filter.into(),
    }
  }

  pub fn encode(&self) -> Result<String, ServiceError> {
    let payload =
      serde_json::to_vec(self).map_err(|err| ServiceError::internal("encode page token", err))?;
    Ok(URL_SAFE_NO_PAD.encode(payload))
  }

  pub fn decode(token: &str) -> Result<Self, ServiceError> {
    let payload = URL_SAFE_NO_PAD
      .decode(token)
      .map_err(|_| ServiceError::invalid("invalid page token encoding"))?;
    serde_json::from_slice(&payload)
      .map_err(|_| ServiceError::invalid("invalid page token contents"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_decode_round_trip() {
    let token = PageToken::new(42, r#"api_version == "v1beta1""#);
    let encoded = token.encode().unwrap();
    assert_eq!(PageToken::decode(&encoded).unwrap(), token);
  }

  #[test]
  fn rejects_non_base64_input() {
    let err = PageToken::decode("not a token!").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument { .. }));
  }

  #[test]
  fn rejects_well_encoded_garbage() {
    let garbage = URL_SAFE_NO_PAD.encode(b"{\"unexpected\":true}");
    let err = PageToken::decode(&garbage).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument { .. }));
  }
}
