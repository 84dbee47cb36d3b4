//! Numeric normalization: one place that decides what counts as a number.
//!
//! Every numeric node consumes the same canonical form instead of matching on
//! `serde_json::Number` internals itself. Adding another integer-like
//! representation touches this file only.

use serde::Serialize;
use serde_json::Value;

/// Canonical comparable form of a JSON number.
///
/// JSON text that parses as an integer (`5`) is `Int`; anything carrying a
/// fractional representation (`5.0`) is `Real`, even when integer-valued.
/// Integer constraints therefore reject `5.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Num {
    Int(i64),
    Real(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Real(f) => f,
        }
    }
}

impl std::fmt::Display for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Num::Int(i) => write!(f, "{i}"),
            Num::Real(x) => write!(f, "{x}"),
        }
    }
}

/// Classify a runtime value into the numeric domain, or `None` if the value
/// is not a number at all.
///
/// Unsigned magnitudes above `i64::MAX` wrap into the signed 64-bit range.
/// Bound checks against such values use the wrapped representation; this is a
/// known limitation of the 64-bit-stored bounds, kept rather than widened.
pub fn classify(v: &Value) -> Option<Num> {
    let n = match v {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(i) = n.as_i64() {
        Some(Num::Int(i))
    } else if let Some(u) = n.as_u64() {
        Some(Num::Int(u as i64))
    } else {
        n.as_f64().map(Num::Real)
    }
}

/// Equality with JSON-number semantics: `1` and `1.0` are the same value.
/// Arrays and objects compare element-wise with the same rule; everything
/// else is plain structural equality.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => {
            match (classify(a), classify(b)) {
                (Some(Num::Int(x)), Some(Num::Int(y))) => x == y,
                (Some(x), Some(y)) => x.as_f64() == y.as_f64(),
                _ => false,
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_classify_as_int() {
        assert_eq!(classify(&json!(42)), Some(Num::Int(42)));
        assert_eq!(classify(&json!(-7)), Some(Num::Int(-7)));
        assert_eq!(classify(&json!(i64::MIN)), Some(Num::Int(i64::MIN)));
    }

    #[test]
    fn floats_classify_as_real_even_when_whole() {
        assert_eq!(classify(&json!(5.0)), Some(Num::Real(5.0)));
        assert_eq!(classify(&json!(2.5)), Some(Num::Real(2.5)));
    }

    #[test]
    fn u64_beyond_i64_wraps_into_signed_range() {
        let v = json!(u64::MAX);
        match classify(&v) {
            Some(Num::Int(i)) => assert_eq!(i, u64::MAX as i64),
            other => panic!("expected wrapped Int, got {other:?}"),
        }
    }

    #[test]
    fn non_numbers_are_not_numeric() {
        assert_eq!(classify(&json!("42")), None);
        assert_eq!(classify(&json!(null)), None);
        assert_eq!(classify(&json!([1])), None);
        assert_eq!(classify(&json!(true)), None);
    }

    #[test]
    fn json_eq_crosses_numeric_representations() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(json_eq(&json!([1, 2.0]), &json!([1.0, 2])));
        assert!(!json_eq(&json!(1), &json!(1.5)));
        assert!(!json_eq(&json!(1), &json!("1")));
    }

    #[test]
    fn json_eq_objects_ignore_key_order() {
        assert!(json_eq(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(!json_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }
}
