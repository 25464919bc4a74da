//! Endpoint bindings
//!
//! Typed methods on [`StorefrontClient`](crate::StorefrontClient), one file
//! per API area. Every binding goes through `send`, so all of them share the
//! cookie and 401 handling.

mod products;
mod upload;
mod users;
mod wishlist;

pub use products::ProductQuery;

use crate::error::{ClientError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Reject a 2xx body that carries `success: false`
fn ensure_success(body: Value) -> Result<Value> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ClientError::rejected(body));
    }
    Ok(body)
}

/// Require `success: true`, for endpoints whose payload is only valid then
fn require_success(body: Value) -> Result<Value> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(body)
    } else {
        Err(ClientError::rejected(body))
    }
}

/// Deserialize one field of the body
fn field<T: DeserializeOwned>(body: &mut Value, key: &str) -> Result<T> {
    let value = body.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}

/// Deserialize an array field; missing or null means empty
fn list_field<T: DeserializeOwned>(body: &mut Value, key: &str) -> Result<Vec<T>> {
    match body.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

/// `{ key: {...} }` or the bare object
fn wrapped_or_bare<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<T> {
    let value = match body.get_mut(key).map(Value::take) {
        Some(inner) if inner.is_object() => inner,
        _ => body,
    };
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_false_is_rejected() {
        let err = ensure_success(json!({"success": false, "message": "Nope"})).unwrap_err();
        assert_eq!(err.failure().unwrap().message, "Nope");
        assert!(ensure_success(json!({"products": []})).is_ok());
        assert!(require_success(json!({"products": []})).is_err());
    }

    #[test]
    fn missing_list_is_empty() {
        let mut body = json!({"success": true});
        let users: Vec<Value> = list_field(&mut body, "users").unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn wrapped_and_bare_objects_both_decode() {
        let wrapped: Value = wrapped_or_bare(json!({"product": {"name": "A"}}), "product").unwrap();
        assert_eq!(wrapped, json!({"name": "A"}));
        let bare: Value = wrapped_or_bare(json!({"name": "B"}), "product").unwrap();
        assert_eq!(bare, json!({"name": "B"}));
    }
}
