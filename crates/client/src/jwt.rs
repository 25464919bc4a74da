//! Unverified JWT payload inspection
//!
//! Only reads the claims; signatures are the server's business.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Decode the payload segment of a JWT.
///
/// Returns `None` for anything that is not `header.payload[.signature]` with
/// a base64url JSON payload. Padding is optional.
pub fn decode_jwt(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The `exp` claim as a timestamp
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let exp = decode_jwt(token)?.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_payload_claims() {
        let claims = json!({"userId": "u1", "role": "admin", "exp": 1_700_000_000});
        assert_eq!(decode_jwt(&token(&claims)), Some(claims));
    }

    #[test]
    fn accepts_padded_payloads() {
        // "{}" encodes to "e30" and needs one pad character
        assert_eq!(decode_jwt("x.e30=.y"), Some(json!({})));
        assert_eq!(decode_jwt("x.e30"), Some(json!({})));
    }

    #[test]
    fn malformed_tokens_are_none() {
        assert_eq!(decode_jwt(""), None);
        assert_eq!(decode_jwt("only-one-part"), None);
        assert_eq!(decode_jwt("a.!!!.c"), None);
        assert_eq!(decode_jwt(&format!("a.{}.c", URL_SAFE_NO_PAD.encode("not json"))), None);
    }

    #[test]
    fn reads_expiry() {
        let expiry = token_expiry(&token(&json!({"exp": 1_700_000_000}))).unwrap();
        assert_eq!(expiry.timestamp(), 1_700_000_000);
        assert_eq!(token_expiry(&token(&json!({"sub": "u1"}))), None);
    }
}
