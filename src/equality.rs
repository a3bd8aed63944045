//! Cross-representation equality for property values.
//!
//! Numbers compare by mathematical value regardless of width or category:
//! `Int32(123)`, `Int(123)` and `Float(123.0)` are all equal. Strings and
//! booleans compare by content. Lists and typed arrays compare
//! element-wise in positional order; whether a sequence came from a typed
//! array or a literal list does not matter. Property maps are equal only
//! when their key sets are identical.

use crate::model::{PropertyMap, Value};

/// A number lifted out of whatever width it was stored in.
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Number> {
        match value {
            Value::Int8(i) => Some(Number::Int(i64::from(*i))),
            Value::Int16(i) => Some(Number::Int(i64::from(*i))),
            Value::Int32(i) => Some(Number::Int(i64::from(*i))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float32(f) => Some(Number::Float(f64::from(*f))),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }
}

fn numbers_equal(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x == y,
        (Number::Float(x), Number::Float(y)) => x == y,
        (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => {
            int_equals_float(i, f)
        }
    }
}

/// Exact comparison: `i as f64` would round large integers.
fn int_equals_float(i: i64, f: f64) -> bool {
    // 2^63 is exactly representable; anything at or above it is out of i64 range.
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if !f.is_finite() || f.fract() != 0.0 || f < -TWO_POW_63 || f >= TWO_POW_63 {
        return false;
    }
    f as i64 == i
}

/// Semantic equality of two property values.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (Number::of(a), Number::of(b)) {
        return numbers_equal(x, y);
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::List(_) | Value::Array(_), Value::List(_) | Value::Array(_)) => {
            sequences_equal(a, b)
        }
        _ => false,
    }
}

fn sequences_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // Same-origin lists avoid materializing element copies.
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        _ => match (a.elements(), b.elements()) {
            (Some(x), Some(y)) => {
                x.len() == y.len() && x.iter().zip(&y).all(|(l, r)| values_equal(l, r))
            }
            _ => false,
        },
    }
}

/// Property maps are equal iff their key sets match and every value is
/// [`values_equal`]. There is no subset matching.
pub fn properties_equal(a: &PropertyMap, b: &PropertyMap) -> bool {
    a.len() == b.len()
        && a.iter().all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
}
