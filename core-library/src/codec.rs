//! # Entity Codec
//!
//! Maps typed entities onto individually stored fields.
//!
//! Every entity type declares, once and at compile time, the table it lives
//! in, its fields (name plus accessor pair), the secondary indexes derived
//! from its scalar fields and an optional parent relation. [`EntityCodec`]
//! validates that declaration when a repository is built and then performs
//! all encoding, decoding and scoring for that type.
//!
//! Field values are stored as JSON. A field that is absent, empty or `null`
//! decodes to the field's `Default` value.

use crate::error::{LibraryError, Result};
use chrono::{DateTime, Utc};
use core_store::Score;
use serde_json::Value;
use std::collections::HashSet;

/// Name of the primary field every entity declares first
pub const ID_FIELD: &str = "Id";

/// Scalar kinds an index may project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Boolean,
    Timestamp,
}

/// A value an index can be scored by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarValue {
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Integer(_) => ScalarKind::Integer,
            Self::Boolean(_) => ScalarKind::Boolean,
            Self::Timestamp(_) => ScalarKind::Timestamp,
        }
    }

    /// Sorted-set score: booleans are 0/1, timestamps are epoch milliseconds
    ///
    /// # Examples
    ///
    /// ```
    /// use core_library::codec::ScalarValue;
    ///
    /// assert_eq!(ScalarValue::Boolean(true).score(), 1);
    /// assert_eq!(ScalarValue::Integer(1969).score(), 1969);
    /// ```
    pub fn score(&self) -> Score {
        match self {
            Self::Integer(value) => *value,
            Self::Boolean(value) => i64::from(*value),
            Self::Timestamp(value) => value.timestamp_millis(),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// One stored field: its on-disk name and JSON accessors
pub struct FieldDescriptor<E> {
    pub name: &'static str,
    pub encode: fn(&E) -> serde_json::Result<Value>,
    pub decode: fn(&mut E, Value) -> serde_json::Result<()>,
}

/// A secondary index kept as `{table}:idx:{name}`
pub struct IndexSpec<E> {
    pub name: &'static str,
    /// Field the index projects
    pub field: &'static str,
    pub kind: ScalarKind,
    pub project: fn(&E) -> ScalarValue,
}

/// Declares that records belong to a parent's child collection
pub struct ParentRelation<E> {
    pub table: &'static str,
    /// Field holding the parent id
    pub field: &'static str,
    pub parent_id: fn(&E) -> &str,
}

/// A record type persisted by [`KvRepository`](crate::repositories::KvRepository)
pub trait Entity: Default + Clone + Send + Sync + 'static {
    /// Table name used as key prefix
    const TABLE: &'static str;

    fn id(&self) -> &str;

    /// Stored fields; the first one must be [`ID_FIELD`]
    fn fields() -> Vec<FieldDescriptor<Self>>;

    fn indexes() -> Vec<IndexSpec<Self>> {
        Vec::new()
    }

    fn parent() -> Option<ParentRelation<Self>> {
        None
    }
}

/// Builds a [`FieldDescriptor`] that (de)serialises `entity.$member` as JSON.
macro_rules! field {
    ($entity:ty, $name:literal, $member:ident) => {
        $crate::codec::FieldDescriptor::<$entity> {
            name: $name,
            encode: |entity: &$entity| ::serde_json::to_value(&entity.$member),
            decode: |entity: &mut $entity,
                     value: ::serde_json::Value|
             -> ::serde_json::Result<()> {
                entity.$member = ::serde_json::from_value(value)?;
                Ok(())
            },
        }
    };
}
pub(crate) use field;

/// Validated descriptor of one entity type
pub struct EntityCodec<E: Entity> {
    fields: Vec<FieldDescriptor<E>>,
    indexes: Vec<IndexSpec<E>>,
    parent: Option<ParentRelation<E>>,
}

impl<E: Entity> EntityCodec<E> {
    /// Build the codec from `E`'s declaration
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Descriptor` when the declaration is inconsistent:
    /// no fields, a first field other than `Id`, duplicate field or index
    /// names, an index or parent relation over an undeclared field, or an
    /// index whose declared kind differs from what its projection yields.
    pub fn new() -> Result<Self> {
        Self::from_parts(E::fields(), E::indexes(), E::parent())
    }

    pub(crate) fn from_parts(
        fields: Vec<FieldDescriptor<E>>,
        indexes: Vec<IndexSpec<E>>,
        parent: Option<ParentRelation<E>>,
    ) -> Result<Self> {
        let invalid = |message: String| LibraryError::Descriptor {
            table: E::TABLE.to_string(),
            message,
        };

        match fields.first() {
            None => return Err(invalid("no fields declared".to_string())),
            Some(first) if first.name != ID_FIELD => {
                return Err(invalid(format!(
                    "first field must be {}, found {}",
                    ID_FIELD, first.name
                )))
            }
            Some(_) => {}
        }

        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name) {
                return Err(invalid(format!("duplicate field {}", field.name)));
            }
        }

        let zero = E::default();
        let mut index_names = HashSet::new();
        for index in &indexes {
            if !index_names.insert(index.name) {
                return Err(invalid(format!("duplicate index {}", index.name)));
            }
            if !names.contains(index.field) {
                return Err(invalid(format!(
                    "index {} refers to undeclared field {}",
                    index.name, index.field
                )));
            }
            let projected = (index.project)(&zero).kind();
            if projected != index.kind {
                return Err(invalid(format!(
                    "index {} declared as {:?} but projects {:?}",
                    index.name, index.kind, projected
                )));
            }
        }

        if let Some(parent) = &parent {
            if parent.table.is_empty() {
                return Err(invalid("parent table is empty".to_string()));
            }
            if !names.contains(parent.field) {
                return Err(invalid(format!(
                    "parent relation refers to undeclared field {}",
                    parent.field
                )));
            }
        }

        Ok(Self {
            fields,
            indexes,
            parent,
        })
    }

    pub fn table(&self) -> &'static str {
        E::TABLE
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    pub fn indexes(&self) -> &[IndexSpec<E>] {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&IndexSpec<E>> {
        self.indexes.iter().find(|index| index.name == name)
    }

    pub fn parent(&self) -> Option<&ParentRelation<E>> {
        self.parent.as_ref()
    }

    /// Serialise every declared field, in declaration order
    pub fn encode(&self, entity: &E) -> Result<Vec<(&'static str, Vec<u8>)>> {
        self.fields
            .iter()
            .map(|field| -> Result<(&'static str, Vec<u8>)> {
                let encoded = (field.encode)(entity)
                    .and_then(|value| serde_json::to_vec(&value))
                    .map_err(|source| LibraryError::Encode {
                        table: E::TABLE.to_string(),
                        field: field.name.to_string(),
                        source,
                    })?;
                Ok((field.name, encoded))
            })
            .collect()
    }

    /// Populate a zero-valued entity from stored values given in field order
    pub fn decode(&self, values: &[Option<Vec<u8>>]) -> Result<E> {
        let mut entity = E::default();

        for (field, raw) in self.fields.iter().zip(values) {
            let Some(raw) = raw.as_deref().filter(|raw| !raw.is_empty()) else {
                continue;
            };
            let decode_error = |source| LibraryError::Decode {
                table: E::TABLE.to_string(),
                field: field.name.to_string(),
                source,
            };

            let value: Value = serde_json::from_slice(raw).map_err(decode_error)?;
            if value.is_null() {
                continue;
            }
            (field.decode)(&mut entity, value).map_err(decode_error)?;
        }

        Ok(entity)
    }

    /// Score of `entity` for the index projecting `field`
    pub fn score(&self, entity: &E, field: &str) -> Result<Score> {
        self.indexes
            .iter()
            .find(|index| index.field == field)
            .map(|index| (index.project)(entity).score())
            .ok_or_else(|| {
                LibraryError::invalid_input(
                    field,
                    format!("{} declares no index over this field", E::TABLE),
                )
            })
    }

    /// Parent id of `entity`, empty when no relation is declared
    pub fn parent_id<'a>(&self, entity: &'a E) -> &'a str {
        match &self.parent {
            Some(parent) => (parent.parent_id)(entity),
            None => "",
        }
    }
}
