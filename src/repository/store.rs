//! Storage backend interface
//!
//! A document store keeps JSON objects in named collections, keyed by
//! [`ObjectRef`]. Every single-document write is atomic; nothing spans
//! documents.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use super::filter::Filter;
use crate::models::reference::{resolve, resolve_many, ObjectRef};

/// A stored document. The primary reference lives under [`ID_FIELD`].
pub type Document = Map<String, Value>;

/// Field holding the primary reference of every document
pub const ID_FIELD: &str = "_id";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed document in {collection}: {message}")]
    Malformed { collection: String, message: String },

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of an update touching one or more documents
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents the target reference(s) matched
    pub matched: u64,
    /// Documents whose content actually changed
    pub modified: u64,
}

/// Sparse update: only the fields present are written.
///
/// A field mapped to `Value::Null` is explicitly cleared; a field that is
/// absent from the patch is left untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Patch(Document);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` when provided
    pub fn set<V: Into<Value>>(&mut self, field: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.0.insert(field.to_string(), v.into());
        }
        self
    }

    /// Write `value` when provided, clearing the field on an explicit null
    pub fn set_nullable<V: Into<Value>>(&mut self, field: &str, value: Option<Option<V>>) -> &mut Self {
        match value {
            Some(Some(v)) => {
                self.0.insert(field.to_string(), v.into());
            }
            Some(None) => {
                self.0.insert(field.to_string(), Value::Null);
            }
            None => {}
        }
        self
    }

    pub fn set_date(&mut self, field: &str, value: Option<Option<NaiveDate>>) -> &mut Self {
        self.set_nullable(field, value.map(|d| d.map(|d| d.format("%Y-%m-%d").to_string())))
    }

    /// Singular reference: a malformed value leaves the field untouched,
    /// an explicit null clears it
    pub fn set_reference(&mut self, field: &str, raw: Option<Option<String>>) -> &mut Self {
        match raw {
            Some(Some(raw)) => self.set(field, resolve(Some(raw.as_str()))),
            Some(None) => self.set_nullable::<Value>(field, Some(None)),
            None => self,
        }
    }

    /// Reference set, replaced wholesale by its well-formed elements. An
    /// explicit `[]` clears the set; a non-empty list with no well-formed
    /// element leaves it untouched.
    pub fn set_references(&mut self, field: &str, raw: Option<Vec<String>>) -> &mut Self {
        let Some(raw) = raw else {
            return self;
        };
        let refs = resolve_many(&raw);
        if refs.is_empty() && !raw.is_empty() {
            return self;
        }
        self.set(field, Some(Value::from(refs)))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<ObjectRef> for Value {
    fn from(r: ObjectRef) -> Self {
        Value::String(r.to_hex())
    }
}

/// Abstract per-collection document storage
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return the reference assigned to it.
    /// Any `_id` in `doc` is replaced.
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<ObjectRef>;

    /// Fetch one document by reference
    async fn find_by_id(&self, collection: &str, id: &ObjectRef) -> StoreResult<Option<Document>>;

    /// Fetch the documents matching `filter` in reference order, skipping
    /// `skip` and returning at most `limit` (all remaining when `None`)
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        skip: u64,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Document>>;

    /// Count the documents matching `filter`
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Merge `patch` into one document
    async fn update_fields(&self, collection: &str, id: &ObjectRef, patch: Patch) -> StoreResult<UpdateOutcome>;

    /// Remove one document; returns the number removed (0 or 1)
    async fn delete(&self, collection: &str, id: &ObjectRef) -> StoreResult<u64>;

    /// Set-union `values` into the array `field` of every document in `ids`.
    ///
    /// Members already present are skipped, a missing or non-array field is
    /// treated as empty. Atomic per document, not across documents.
    async fn add_to_set(
        &self,
        collection: &str,
        ids: &[ObjectRef],
        field: &str,
        values: &[ObjectRef],
    ) -> StoreResult<UpdateOutcome>;

    /// Check the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
