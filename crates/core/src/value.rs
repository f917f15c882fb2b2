//! Value types for sagastore
//!
//! This module defines the scalar value model shared by every layer.
//! The table store only understands eight scalar kinds, so the `Value` enum
//! has exactly eight variants and nothing else can be stored or queried.
//!
//! ## The Eight Kinds
//!
//! 1. `Binary` - Arbitrary binary data
//! 2. `Bool` - Boolean true or false
//! 3. `DateTime` - UTC timestamp
//! 4. `Guid` - 128-bit UUID
//! 5. `Int32` - 32-bit signed integer
//! 6. `Int64` - 64-bit signed integer
//! 7. `Double` - 64-bit IEEE-754 floating point
//! 8. `String` - UTF-8 encoded string
//!
//! ## Equality Rules
//!
//! - Different kinds are NEVER equal (no coercion)
//! - `Int32(1)` != `Int64(1)`
//! - `String("abc")` != `Binary([97, 98, 99])`
//! - Double uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A scalar property value as understood by the table store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Arbitrary binary data
    Binary(Vec<u8>),

    /// Boolean true or false
    Bool(bool),

    /// UTC timestamp
    DateTime(DateTime<Utc>),

    /// 128-bit unique identifier
    Guid(Uuid),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit IEEE-754 floating point
    Double(f64),

    /// UTF-8 encoded string
    String(String),
}

/// The kind of a [`Value`], without its payload.
///
/// Entity fields are mapped to a `ScalarKind` once, when the entity type is
/// registered, and every later encode/decode/query dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// `Vec<u8>`
    Binary,
    /// `bool`
    Bool,
    /// `DateTime<Utc>`
    DateTime,
    /// `Uuid`
    Guid,
    /// `i32`
    Int32,
    /// `i64`
    Int64,
    /// `f64`
    Double,
    /// `String`
    String,
}

impl ScalarKind {
    /// All eight kinds, in declaration order.
    pub const ALL: [ScalarKind; 8] = [
        ScalarKind::Binary,
        ScalarKind::Bool,
        ScalarKind::DateTime,
        ScalarKind::Guid,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Double,
        ScalarKind::String,
    ];

    /// Returns the kind name (for error messages)
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Binary => "Binary",
            ScalarKind::Bool => "Bool",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Guid => "Guid",
            ScalarKind::Int32 => "Int32",
            ScalarKind::Int64 => "Int64",
            ScalarKind::Double => "Double",
            ScalarKind::String => "String",
        }
    }

    /// The value a field of this kind holds when nothing was stored for it.
    pub fn zero_value(&self) -> Value {
        match self {
            ScalarKind::Binary => Value::Binary(Vec::new()),
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::DateTime => Value::DateTime(DateTime::<Utc>::default()),
            ScalarKind::Guid => Value::Guid(Uuid::nil()),
            ScalarKind::Int32 => Value::Int32(0),
            ScalarKind::Int64 => Value::Int64(0),
            ScalarKind::Double => Value::Double(0.0),
            ScalarKind::String => Value::String(String::new()),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Returns the kind of this value
    pub fn kind(&self) -> ScalarKind {
        match self {
            Value::Binary(_) => ScalarKind::Binary,
            Value::Bool(_) => ScalarKind::Bool,
            Value::DateTime(_) => ScalarKind::DateTime,
            Value::Guid(_) => ScalarKind::Guid,
            Value::Int32(_) => ScalarKind::Int32,
            Value::Int64(_) => ScalarKind::Int64,
            Value::Double(_) => ScalarKind::Double,
            Value::String(_) => ScalarKind::String,
        }
    }

    /// Returns the kind name as a string (for error messages)
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Try to get as bytes slice
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as timestamp
    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Try to get as UUID
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }

    /// Try to get as i32
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Binary(b.to_vec())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::DateTime(t)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
