//! Property values as a graph store keeps them.
//!
//! A store may hold the same number in several concrete widths (a narrow
//! `Int32` written by an embedding application, a wide `Int` produced by a
//! script literal). The variants keep that representation; semantic
//! equality across representations lives in [`crate::equality`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Property value type.
///
/// - Scalars: Bool, Int8/Int16/Int32/Int, Float32/Float, String
/// - Containers: List (literal-list origin), Array (typed primitive array)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int(i64),
    Float32(f32),
    Float(f64),
    String(String),
    /// Homogeneous list of scalars, as produced by a `[1, 2, 3]` literal.
    List(Vec<Value>),
    /// Typed primitive array, as written by an embedding application.
    Array(PrimitiveArray),
}

/// Homogeneous primitive array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items")]
pub enum PrimitiveArray {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int(Vec<i64>),
    Float32(Vec<f32>),
    Float(Vec<f64>),
    String(Vec<String>),
}

impl PrimitiveArray {
    pub fn len(&self) -> usize {
        match self {
            PrimitiveArray::Bool(v) => v.len(),
            PrimitiveArray::Int8(v) => v.len(),
            PrimitiveArray::Int16(v) => v.len(),
            PrimitiveArray::Int32(v) => v.len(),
            PrimitiveArray::Int(v) => v.len(),
            PrimitiveArray::Float32(v) => v.len(),
            PrimitiveArray::Float(v) => v.len(),
            PrimitiveArray::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, lifted into a scalar [`Value`].
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            PrimitiveArray::Bool(v) => v.get(index).map(|x| Value::Bool(*x)),
            PrimitiveArray::Int8(v) => v.get(index).map(|x| Value::Int8(*x)),
            PrimitiveArray::Int16(v) => v.get(index).map(|x| Value::Int16(*x)),
            PrimitiveArray::Int32(v) => v.get(index).map(|x| Value::Int32(*x)),
            PrimitiveArray::Int(v) => v.get(index).map(|x| Value::Int(*x)),
            PrimitiveArray::Float32(v) => v.get(index).map(|x| Value::Float32(*x)),
            PrimitiveArray::Float(v) => v.get(index).map(|x| Value::Float(*x)),
            PrimitiveArray::String(v) => v.get(index).map(|x| Value::String(x.clone())),
        }
    }

    /// All elements as scalar values, in order.
    pub fn to_values(&self) -> Vec<Value> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "BOOLEAN",
            Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int(_) => "INTEGER",
            Value::Float32(_) | Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::List(_) => "LIST",
            Value::Array(_) => "ARRAY",
        }
    }

    pub fn is_sequence(&self) -> bool { matches!(self, Value::List(_) | Value::Array(_)) }

    /// Elements of a list or array, in order. `None` for scalars.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.clone()),
            Value::Array(array) => Some(array.to_values()),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i8> for Value { fn from(v: i8) -> Self { Value::Int8(v) } }
impl From<i16> for Value { fn from(v: i16) -> Self { Value::Int16(v) } }
/// Rust integer literals default to `i32`; treat them as script integers.
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f32> for Value { fn from(v: f32) -> Self { Value::Float32(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<PrimitiveArray> for Value { fn from(v: PrimitiveArray) -> Self { Value::Array(v) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}

impl From<Vec<bool>> for PrimitiveArray { fn from(v: Vec<bool>) -> Self { PrimitiveArray::Bool(v) } }
impl From<Vec<i8>> for PrimitiveArray { fn from(v: Vec<i8>) -> Self { PrimitiveArray::Int8(v) } }
impl From<Vec<i16>> for PrimitiveArray { fn from(v: Vec<i16>) -> Self { PrimitiveArray::Int16(v) } }
impl From<Vec<i32>> for PrimitiveArray { fn from(v: Vec<i32>) -> Self { PrimitiveArray::Int32(v) } }
impl From<Vec<i64>> for PrimitiveArray { fn from(v: Vec<i64>) -> Self { PrimitiveArray::Int(v) } }
impl From<Vec<f32>> for PrimitiveArray { fn from(v: Vec<f32>) -> Self { PrimitiveArray::Float32(v) } }
impl From<Vec<f64>> for PrimitiveArray { fn from(v: Vec<f64>) -> Self { PrimitiveArray::Float(v) } }
impl From<Vec<String>> for PrimitiveArray { fn from(v: Vec<String>) -> Self { PrimitiveArray::String(v) } }

// ============================================================================
// Display (script literal syntax)
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int8(i) => write!(f, "{i}"),
            Value::Int16(i) => write!(f, "{i}"),
            Value::Int32(i) => write!(f, "{i}"),
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps the fractional part (`1.0`) so the literal reads back as a float.
            Value::Float32(v) => write!(f, "{:?}", f64::from(*v)),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::String(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::List(_) | Value::Array(_) => {
                write!(f, "[")?;
                for (i, v) in self.elements().unwrap_or_default().iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}
