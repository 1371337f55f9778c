//! Typed access to one collection of a [`DocumentStore`]

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::filter::Filter;
use super::store::{Document, DocumentStore, Patch, StoreError, StoreResult, UpdateOutcome};
use crate::models::{pagination::Pagination, reference::ObjectRef};

/// An entity persisted in its own collection
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    /// Human-readable name used in messages
    const NAME: &'static str;
}

/// An entity together with the reference the store assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: ObjectRef,
    #[serde(flatten)]
    pub data: T,
}

pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("name", &T::COLLECTION).finish()
    }
}

impl<T: Entity> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn insert(&self, entity: T) -> StoreResult<Stored<T>> {
        let doc = match serde_json::to_value(&entity)? {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Malformed {
                    collection: T::COLLECTION.to_string(),
                    message: format!("entity serialized to {}, expected an object", other),
                })
            }
        };
        let id = self.store.insert(T::COLLECTION, doc).await?;
        Ok(Stored { id, data: entity })
    }

    pub async fn find_by_id(&self, id: &ObjectRef) -> StoreResult<Option<Stored<T>>> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// One page of the documents matching `filter`
    pub async fn find(&self, filter: &Filter, page: Pagination) -> StoreResult<Vec<Stored<T>>> {
        let docs = self
            .store
            .find(T::COLLECTION, filter, page.skip, Some(page.limit))
            .await?;
        docs.into_iter().map(decode).collect()
    }

    /// All documents among `ids`, in reference order. Unknown ids are skipped.
    pub async fn find_by_ids(&self, ids: &[ObjectRef]) -> StoreResult<Vec<Stored<T>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = Filter::new().id_in(ids.to_vec());
        let docs = self.store.find(T::COLLECTION, &filter, 0, None).await?;
        docs.into_iter().map(decode).collect()
    }

    pub async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        self.store.count(T::COLLECTION, filter).await
    }

    pub async fn update_fields(&self, id: &ObjectRef, patch: Patch) -> StoreResult<UpdateOutcome> {
        self.store.update_fields(T::COLLECTION, id, patch).await
    }

    pub async fn delete(&self, id: &ObjectRef) -> StoreResult<u64> {
        self.store.delete(T::COLLECTION, id).await
    }

    /// Set-union `values` into the array `field` of one document
    pub async fn add_to_set(&self, id: &ObjectRef, field: &str, values: &[ObjectRef]) -> StoreResult<UpdateOutcome> {
        self.store.add_to_set(T::COLLECTION, std::slice::from_ref(id), field, values).await
    }

    /// Set-union `values` into the array `field` of every document in `ids`
    pub async fn add_to_set_many(
        &self,
        ids: &[ObjectRef],
        field: &str,
        values: &[ObjectRef],
    ) -> StoreResult<UpdateOutcome> {
        if ids.is_empty() {
            return Ok(UpdateOutcome::default());
        }
        self.store.add_to_set(T::COLLECTION, ids, field, values).await
    }
}

fn decode<T: Entity>(doc: Document) -> StoreResult<Stored<T>> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Malformed {
        collection: T::COLLECTION.to_string(),
        message: e.to_string(),
    })
}
