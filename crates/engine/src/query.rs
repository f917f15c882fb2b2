//! Equality query builder
//!
//! Builds the store-native filter for `property == value` on an entity kind.
//! The filter primitive is chosen by the property's declared kind, mirroring
//! the converter, so anything that can be stored can also be queried.

use crate::error::{EngineError, Result};
use crate::schema::Schema;
use sagastore_core::{Filter, ScalarKind, Value};

/// Filter matching rows whose `property` equals `value`.
pub fn build<E>(schema: &Schema<E>, property: &str, value: &Value) -> Result<Filter> {
    let field = schema
        .field(property)
        .ok_or_else(|| EngineError::UnknownProperty {
            kind: schema.kind().to_string(),
            property: property.to_string(),
        })?;
    let expected = field.kind(schema.kind())?;

    let filter = match (expected, value) {
        (ScalarKind::Binary, Value::Binary(b)) => Filter::binary(property, b),
        (ScalarKind::Bool, Value::Bool(b)) => Filter::bool(property, *b),
        (ScalarKind::DateTime, Value::DateTime(t)) => Filter::date(property, *t),
        (ScalarKind::Guid, Value::Guid(g)) => Filter::guid(property, *g),
        (ScalarKind::Int32, Value::Int32(i)) => Filter::int(property, *i),
        (ScalarKind::Int64, Value::Int64(i)) => Filter::long(property, *i),
        (ScalarKind::Double, Value::Double(d)) => Filter::double(property, *d),
        (ScalarKind::String, Value::String(s)) => Filter::string(property, s.as_str()),
        (expected, value) => {
            return Err(EngineError::WrongType {
                kind: schema.kind().to_string(),
                field: property.to_string(),
                expected,
                actual: value.kind(),
            })
        }
    };
    Ok(filter)
}
