//! Store-native equality filters
//!
//! A [`Filter`] is what the store evaluates during a scan. There is one
//! constructor per scalar kind so that the operand is always encoded with the
//! kind the property was declared with; a property stored as `Int64` is never
//! matched by an `Int32` operand.
//!
//! Filters render to the table service's textual filter syntax through
//! `Display`, e.g. `OrderNumber eq 'PO-42' and Count eq 5L`.

use crate::bag::PropertyBag;
use crate::value::Value;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use uuid::Uuid;

/// An equality predicate over property bags.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `property eq value`
    Equals {
        /// Property (or key column) name
        property: String,
        /// Operand, compared without coercion
        value: Value,
    },
    /// Both sides must match
    And(Box<Filter>, Box<Filter>),
}

impl Filter {
    /// Binary compare
    pub fn binary(property: impl Into<String>, value: &[u8]) -> Self {
        Self::equals(property, Value::Binary(value.to_vec()))
    }

    /// Boolean compare
    pub fn bool(property: impl Into<String>, value: bool) -> Self {
        Self::equals(property, Value::Bool(value))
    }

    /// Exact timestamp compare
    pub fn date(property: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::equals(property, Value::DateTime(value))
    }

    /// UUID compare
    pub fn guid(property: impl Into<String>, value: Uuid) -> Self {
        Self::equals(property, Value::Guid(value))
    }

    /// 32-bit integer compare
    pub fn int(property: impl Into<String>, value: i32) -> Self {
        Self::equals(property, Value::Int32(value))
    }

    /// 64-bit integer compare
    pub fn long(property: impl Into<String>, value: i64) -> Self {
        Self::equals(property, Value::Int64(value))
    }

    /// Exact double compare
    pub fn double(property: impl Into<String>, value: f64) -> Self {
        Self::equals(property, Value::Double(value))
    }

    /// Case-sensitive string compare
    pub fn string(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::equals(property, Value::String(value.into()))
    }

    fn equals(property: impl Into<String>, value: Value) -> Self {
        Filter::Equals {
            property: property.into(),
            value,
        }
    }

    /// Combine with another filter
    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    /// Evaluate against a row
    ///
    /// A row without the property never matches.
    pub fn matches(&self, bag: &PropertyBag) -> bool {
        match self {
            Filter::Equals { property, value } => match bag.get(property) {
                Some(actual) => actual == *value,
                None => false,
            },
            Filter::And(left, right) => left.matches(bag) && right.matches(bag),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Equals { property, value } => {
                write!(f, "{} eq ", property)?;
                write_operand(f, value)
            }
            Filter::And(left, right) => write!(f, "({}) and ({})", left, right),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Binary(bytes) => {
            f.write_str("X'")?;
            for b in bytes {
                write!(f, "{:02x}", b)?;
            }
            f.write_str("'")
        }
        Value::Bool(b) => write!(f, "{}", b),
        Value::DateTime(t) => write!(
            f,
            "datetime'{}'",
            t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        ),
        Value::Guid(g) => write!(f, "guid'{}'", g),
        Value::Int32(i) => write!(f, "{}", i),
        Value::Int64(i) => write!(f, "{}L", i),
        Value::Double(d) => write!(f, "{:?}", d),
        Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
    }
}
