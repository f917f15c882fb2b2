//! Entity schemas
//!
//! A [`Schema`] records, once per entity type, which fields are persisted,
//! which [`ScalarKind`] each one maps to and which ones are unique. The
//! converter and query builder dispatch on that record instead of inspecting
//! types on every call.
//!
//! Fields are declared through accessor pairs:
//!
//! ```ignore
//! impl SagaData for OrderSaga {
//!     fn id(&self) -> Uuid {
//!         self.id
//!     }
//!
//!     fn describe(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
//!         schema
//!             .field("Id", |s| &s.id, |s| &mut s.id)
//!             .unique("OrderNumber", |s| &s.order_number, |s| &mut s.order_number)
//!             .field("Total", |s| &s.total, |s| &mut s.total)
//!     }
//! }
//! ```
//!
//! A field whose Rust type is not one of the eight scalar types is recorded
//! as unsupported; registering the schema then fails with
//! [`EngineError::UnsupportedType`].

use crate::error::{EngineError, Result};
use crate::index::PRIMARY_PARTITION;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use sagastore_core::key::validate_table_name;
use sagastore_core::{ScalarKind, Value, PARTITION_KEY, ROW_KEY};
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Property that must hold the entity id
pub const ID_FIELD: &str = "Id";

/// A typed entity ("saga data") that can be persisted.
pub trait SagaData: Default + Send + Sync + 'static {
    /// The caller-visible primary identifier
    fn id(&self) -> Uuid;

    /// Declare the persisted fields
    ///
    /// Must include a `Uuid` field named [`ID_FIELD`] mapped to the value
    /// `id()` returns; it is how a loaded entity gets its id back.
    fn describe(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self>;

    /// Kind name, used as the table name
    ///
    /// Defaults to the type's name without module path or generics.
    fn kind() -> String {
        short_type_name(type_name::<Self>()).to_string()
    }
}

/// `a::b::Order<T>` -> `Order`
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Storage type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// One of the eight storable kinds
    Scalar(ScalarKind),
    /// Any other Rust type; carries the type name for error messages
    Unsupported(&'static str),
}

impl FieldType {
    /// Resolve the storage type of `T`
    pub fn of<T: Any>() -> Self {
        let id = TypeId::of::<T>();
        let kind = if id == TypeId::of::<Vec<u8>>() {
            ScalarKind::Binary
        } else if id == TypeId::of::<bool>() {
            ScalarKind::Bool
        } else if id == TypeId::of::<DateTime<Utc>>() {
            ScalarKind::DateTime
        } else if id == TypeId::of::<Uuid>() {
            ScalarKind::Guid
        } else if id == TypeId::of::<i32>() {
            ScalarKind::Int32
        } else if id == TypeId::of::<i64>() {
            ScalarKind::Int64
        } else if id == TypeId::of::<f64>() {
            ScalarKind::Double
        } else if id == TypeId::of::<String>() {
            ScalarKind::String
        } else {
            return FieldType::Unsupported(type_name::<T>());
        };
        FieldType::Scalar(kind)
    }
}

type Reader<E> = Box<dyn Fn(&E) -> Option<Value> + Send + Sync>;
type Writer<E> = Box<dyn Fn(&mut E, Value) -> bool + Send + Sync>;

/// One declared field of an entity
pub struct FieldDef<E> {
    name: &'static str,
    ty: FieldType,
    unique: bool,
    read: Reader<E>,
    write: Writer<E>,
}

impl<E> FieldDef<E> {
    /// Property name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Storage type
    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    /// True if this field is a unique business key
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Scalar kind, or `UnsupportedType` naming this field
    pub fn kind(&self, entity_kind: &str) -> Result<ScalarKind> {
        match self.ty {
            FieldType::Scalar(kind) => Ok(kind),
            FieldType::Unsupported(type_name) => Err(EngineError::UnsupportedType {
                kind: entity_kind.to_string(),
                field: self.name.to_string(),
                type_name: type_name.to_string(),
            }),
        }
    }

    /// Current value of the field
    pub fn value(&self, entity_kind: &str, entity: &E) -> Result<Value> {
        let kind = self.kind(entity_kind)?;
        // `read` only yields `None` for unsupported types, rejected above
        Ok((self.read)(entity).unwrap_or_else(|| kind.zero_value()))
    }

    /// Store `value` into the field. Returns `false` if its kind does not
    /// match the field's type.
    pub fn write(&self, entity: &mut E, value: Value) -> bool {
        (self.write)(entity, value)
    }
}

impl<E> std::fmt::Debug for FieldDef<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("unique", &self.unique)
            .finish()
    }
}

fn encode<T: Any>(value: &T) -> Option<Value> {
    let any = value as &dyn Any;
    if let Some(b) = any.downcast_ref::<Vec<u8>>() {
        Some(Value::Binary(b.clone()))
    } else if let Some(b) = any.downcast_ref::<bool>() {
        Some(Value::Bool(*b))
    } else if let Some(t) = any.downcast_ref::<DateTime<Utc>>() {
        Some(Value::DateTime(*t))
    } else if let Some(g) = any.downcast_ref::<Uuid>() {
        Some(Value::Guid(*g))
    } else if let Some(i) = any.downcast_ref::<i32>() {
        Some(Value::Int32(*i))
    } else if let Some(i) = any.downcast_ref::<i64>() {
        Some(Value::Int64(*i))
    } else if let Some(d) = any.downcast_ref::<f64>() {
        Some(Value::Double(*d))
    } else {
        any.downcast_ref::<String>().map(|s| Value::String(s.clone()))
    }
}

fn assign<T: Any>(slot: &mut dyn Any, value: T) -> bool {
    match slot.downcast_mut::<T>() {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn decode<T: Any>(slot: &mut T, value: Value) -> bool {
    let slot = slot as &mut dyn Any;
    match value {
        Value::Binary(b) => assign(slot, b),
        Value::Bool(b) => assign(slot, b),
        Value::DateTime(t) => assign(slot, t),
        Value::Guid(g) => assign(slot, g),
        Value::Int32(i) => assign(slot, i),
        Value::Int64(i) => assign(slot, i),
        Value::Double(d) => assign(slot, d),
        Value::String(s) => assign(slot, s),
    }
}

/// Collects field declarations for a [`Schema`]
pub struct SchemaBuilder<E> {
    kind: String,
    fields: Vec<FieldDef<E>>,
}

impl<E: 'static> SchemaBuilder<E> {
    /// Start a schema for the given kind name
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a persisted field
    pub fn field<T: Any>(
        self,
        name: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Self {
        self.declare(name, false, get, get_mut)
    }

    /// Declare a persisted field that is also a unique business key
    pub fn unique<T: Any>(
        self,
        name: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Self {
        self.declare(name, true, get, get_mut)
    }

    fn declare<T: Any>(
        mut self,
        name: &'static str,
        unique: bool,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Self {
        self.fields.push(FieldDef {
            name,
            ty: FieldType::of::<T>(),
            unique,
            read: Box::new(move |e: &E| encode(get(e))),
            write: Box::new(move |e: &mut E, v: Value| decode(get_mut(e), v)),
        });
        self
    }

    /// Finish the schema without validating it
    pub fn build(self) -> Schema<E> {
        let by_name = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name, i))
            .collect();
        Schema {
            kind: self.kind,
            fields: self.fields,
            by_name,
        }
    }
}

/// Field layout of one entity kind
pub struct Schema<E> {
    kind: String,
    fields: Vec<FieldDef<E>>,
    by_name: FxHashMap<&'static str, usize>,
}

impl<E: SagaData> Schema<E> {
    /// Build the schema `E` declares
    pub fn of() -> Self {
        E::describe(SchemaBuilder::new(E::kind())).build()
    }
}

impl<E> Schema<E> {
    /// Kind (table) name
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef<E>> {
        self.fields.iter()
    }

    /// Look up a field by property name
    pub fn field(&self, name: &str) -> Option<&FieldDef<E>> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Fields declared unique, in declaration order
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldDef<E>> {
        self.fields.iter().filter(|f| f.unique)
    }

    /// True if `name` is a declared unique field
    pub fn is_unique(&self, name: &str) -> bool {
        self.field(name).map_or(false, FieldDef::is_unique)
    }

    /// Check the schema can be stored
    ///
    /// The kind must be a valid table name, field names must be distinct,
    /// must not shadow a key column and every field must map to a scalar
    /// kind. The id must be declared as a `Guid` field named [`ID_FIELD`].
    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.kind).map_err(EngineError::InvalidKind)?;
        if self.by_name.len() != self.fields.len() {
            let mut seen = FxHashSet::default();
            for f in &self.fields {
                if !seen.insert(f.name) {
                    return Err(EngineError::DuplicateField {
                        kind: self.kind.clone(),
                        field: f.name.to_string(),
                    });
                }
            }
        }
        for f in &self.fields {
            let reserved = f.name == PARTITION_KEY
                || f.name == ROW_KEY
                || (f.unique && f.name == PRIMARY_PARTITION);
            if reserved {
                return Err(EngineError::ReservedField {
                    kind: self.kind.clone(),
                    field: f.name.to_string(),
                });
            }
            f.kind(&self.kind)?;
        }
        match self.field(ID_FIELD).map(FieldDef::field_type) {
            Some(FieldType::Scalar(ScalarKind::Guid)) => Ok(()),
            _ => Err(EngineError::MissingId {
                kind: self.kind.clone(),
            }),
        }
    }
}

impl<E> std::fmt::Debug for Schema<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Validated schemas, built once per entity type
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of `E`, building and validating it on first use
    ///
    /// Invalid schemas are not cached; every use reports the error again.
    pub fn get_or_register<E: SagaData>(&self) -> Result<Arc<Schema<E>>> {
        let type_id = TypeId::of::<E>();
        if let Some(schema) = self.schemas.get(&type_id) {
            if let Ok(schema) = Arc::clone(schema.value()).downcast::<Schema<E>>() {
                return Ok(schema);
            }
        }

        let schema = Schema::<E>::of();
        schema.validate()?;
        debug!(
            kind = schema.kind(),
            fields = schema.fields.len(),
            unique = schema.unique_fields().count(),
            "registered entity schema"
        );
        let schema = Arc::new(schema);
        self.schemas
            .insert(type_id, Arc::clone(&schema) as Arc<dyn Any + Send + Sync>);
        Ok(schema)
    }

    /// Number of registered entity types
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("registered", &self.len())
            .finish()
    }
}
