//! In-memory document store for tests and development

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::filter::Filter;
use super::store::{Document, DocumentStore, Patch, StoreResult, UpdateOutcome, ID_FIELD};
use crate::models::reference::ObjectRef;

/// Collections keyed by name; documents ordered by reference, which keeps
/// pagination stable and in creation order
type Collections = HashMap<String, BTreeMap<ObjectRef, Document>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut doc: Document) -> StoreResult<ObjectRef> {
        let id = ObjectRef::generate();
        doc.insert(ID_FIELD.to_string(), id.into());

        let mut data = self.data.write().await;
        data.entry(collection.to_string()).or_default().insert(id, doc);
        Ok(id)
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectRef) -> StoreResult<Option<Document>> {
        let data = self.data.read().await;
        Ok(data.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        skip: u64,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Document>> {
        let data = self.data.read().await;
        let Some(docs) = data.get(collection) else {
            return Ok(Vec::new());
        };

        let matching = docs.values().filter(|d| filter.matches(d)).skip(skip as usize);
        let page = match limit {
            Some(n) => matching.take(n as usize).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(page)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let data = self.data.read().await;
        Ok(data
            .get(collection)
            .map(|docs| docs.values().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn update_fields(&self, collection: &str, id: &ObjectRef, patch: Patch) -> StoreResult<UpdateOutcome> {
        let mut data = self.data.write().await;
        let Some(doc) = data.get_mut(collection).and_then(|c| c.get_mut(id)) else {
            return Ok(UpdateOutcome::default());
        };

        let mut modified = false;
        for (field, value) in patch.into_document() {
            if field == ID_FIELD {
                continue;
            }
            if doc.get(&field) != Some(&value) {
                doc.insert(field, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn delete(&self, collection: &str, id: &ObjectRef) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let removed = data.get_mut(collection).and_then(|c| c.remove(id));
        Ok(u64::from(removed.is_some()))
    }

    async fn add_to_set(
        &self,
        collection: &str,
        ids: &[ObjectRef],
        field: &str,
        values: &[ObjectRef],
    ) -> StoreResult<UpdateOutcome> {
        let mut data = self.data.write().await;
        let mut outcome = UpdateOutcome::default();
        let Some(docs) = data.get_mut(collection) else {
            return Ok(outcome);
        };

        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }

            let Some(doc) = docs.get_mut(id) else {
                continue;
            };
            outcome.matched += 1;

            let mut members = match doc.get(field) {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            let before = members.len();
            let mut present: HashSet<String> = members
                .iter()
                .filter_map(|m| m.as_str().map(str::to_string))
                .collect();
            for value in values {
                let hex = value.to_hex();
                if present.insert(hex.clone()) {
                    members.push(Value::String(hex));
                }
            }
            if members.len() != before || !matches!(doc.get(field), Some(Value::Array(_))) {
                doc.insert(field.to_string(), Value::Array(members));
                outcome.modified += 1;
            }
        }

        Ok(outcome)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
