//! Property-bag converter
//!
//! Maps a typed entity to the store's property bag and back, one declared
//! field at a time, using the scalar kind recorded in the entity's
//! [`Schema`]. Only the eight scalar kinds exist; anything else is an
//! [`EngineError::UnsupportedType`].

use crate::error::{EngineError, Result};
use crate::schema::{SagaData, Schema};
use sagastore_core::PropertyBag;

/// Encode every declared field of `entity` into a bag with the given keys.
pub fn to_bag<E>(
    schema: &Schema<E>,
    entity: &E,
    partition_key: &str,
    row_key: &str,
) -> Result<PropertyBag> {
    let mut bag = PropertyBag::new(partition_key, row_key);
    for field in schema.fields() {
        bag.insert(field.name(), field.value(schema.kind(), entity)?);
    }
    Ok(bag)
}

/// Decode a bag into a fresh `E`.
///
/// Fields missing from the bag keep their default value. Properties that
/// `E` does not declare, including the key columns, are ignored.
pub fn from_bag<E: SagaData>(schema: &Schema<E>, bag: &PropertyBag) -> Result<E> {
    let mut entity = E::default();
    for field in schema.fields() {
        let expected = field.kind(schema.kind())?;
        let Some(value) = bag.property(field.name()) else {
            continue;
        };
        let actual = value.kind();
        if actual != expected || !field.write(&mut entity, value.clone()) {
            return Err(EngineError::WrongType {
                kind: schema.kind().to_string(),
                field: field.name().to_string(),
                expected,
                actual,
            });
        }
    }
    Ok(entity)
}
