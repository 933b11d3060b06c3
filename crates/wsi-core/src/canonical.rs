//! Canonical form for structural comparison
//!
//! Object keys are sorted recursively, array order is kept, and integral
//! floats collapse to integers so `1.0` and `1` compare equal. Nesting is
//! bounded: an owned `Value` tree cannot contain a cycle, but a hostile payload
//! can still be deep enough to exhaust the stack.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Deepest nesting accepted by [`canonicalize`] (matches serde_json's parse limit)
pub const MAX_CANONICAL_DEPTH: usize = 128;

/// Largest integer an f64 represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CanonicalError {
    #[error("value nesting exceeds {limit} levels")]
    DepthExceeded { limit: usize },
}

/// Canonicalize a value with the default nesting limit
pub fn canonicalize(value: &Value) -> Result<Value, CanonicalError> {
    canonicalize_with_limit(value, MAX_CANONICAL_DEPTH)
}

/// Canonicalize a value, failing once nesting goes past `limit`
pub fn canonicalize_with_limit(value: &Value, limit: usize) -> Result<Value, CanonicalError> {
    canonicalize_at(value, 0, limit)
}

fn canonicalize_at(value: &Value, depth: usize, limit: usize) -> Result<Value, CanonicalError> {
    if depth > limit {
        return Err(CanonicalError::DepthExceeded { limit });
    }

    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                let child = canonicalize_at(&map[key.as_str()], depth + 1, limit)?;
                sorted.insert(key.clone(), child);
            }
            Ok(Value::Object(sorted))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| canonicalize_at(item, depth + 1, limit))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Number(n) => Ok(Value::Number(canonical_number(n))),
        other => Ok(other.clone()),
    }
}

fn canonical_number(n: &Number) -> Number {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                return Number::from(f as i64);
            }
        }
    }
    n.clone()
}

/// Order-independent equality for objects, order-sensitive for arrays.
///
/// Falls back to plain structural equality when either side is too deep to
/// canonicalize.
pub fn canonical_eq(left: &Value, right: &Value) -> bool {
    match (canonicalize(left), canonicalize(right)) {
        (Ok(l), Ok(r)) => l == r,
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(%err, "canonical comparison degraded to structural equality");
            left == right
        }
    }
}

/// Content fingerprint of a value's canonical JSON form (`blake3:<hex>`)
pub fn fingerprint(value: &Value) -> String {
    let canonical = canonicalize(value).unwrap_or_else(|_| value.clone());
    let text = serde_json::to_string(&canonical).unwrap_or_default();
    format!("blake3:{}", blake3::hash(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested(depth: usize) -> Value {
        let mut value = json!(0);
        for _ in 0..depth {
            value = json!({ "n": value });
        }
        value
    }

    #[test]
    fn test_object_key_order_ignored() {
        let a = json!({ "nested": { "z": 9, "y": 8 }, "a": 1, "b": 2 });
        let b = json!({ "a": 1, "b": 2, "nested": { "y": 8, "z": 9 } });
        assert!(canonical_eq(&a, &b));
    }

    #[test]
    fn test_array_order_matters() {
        assert!(!canonical_eq(&json!([1, 2]), &json!([2, 1])));
        assert!(!canonical_eq(
            &json!([1, 2, { "x": "y" }]),
            &json!([1, 2, { "x": "changed" }])
        ));
    }

    #[test]
    fn test_keys_sorted_in_output() {
        let canonical = canonicalize(&json!({ "b": 1, "a": { "d": 2, "c": 3 } })).unwrap();
        let text = serde_json::to_string(&canonical).unwrap();
        assert_eq!(text, r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn test_integral_floats_match_integers() {
        assert!(canonical_eq(&json!(1.0), &json!(1)));
        assert!(!canonical_eq(&json!(1.5), &json!(1)));
    }

    #[test]
    fn test_depth_limit() {
        assert!(canonicalize_with_limit(&nested(10), 20).is_ok());
        assert_eq!(
            canonicalize_with_limit(&nested(10), 5),
            Err(CanonicalError::DepthExceeded { limit: 5 })
        );
    }

    #[test]
    fn test_deep_values_still_compare() {
        let deep = nested(MAX_CANONICAL_DEPTH + 5);
        assert!(canonical_eq(&deep, &deep.clone()));
        assert!(!canonical_eq(&deep, &nested(3)));
    }

    #[test]
    fn test_fingerprint_stable_across_key_order() {
        let a = fingerprint(&json!({ "x": 1, "y": [1, 2] }));
        let b = fingerprint(&json!({ "y": [1, 2], "x": 1 }));
        assert_eq!(a, b);
        assert!(a.starts_with("blake3:"));
        assert_ne!(a, fingerprint(&json!({ "x": 2, "y": [1, 2] })));
    }
}
