// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local document store.
//!
//! Used when `STORAGE_BACKEND=memory` and by the test suite. Documents are
//! kept per collection in insertion order, which is also the order `find`
//! returns them in when no sort is requested. Identifiers use the same
//! 24-character ObjectId encoding as MongoDB, so malformed ids are rejected
//! the same way on both backends.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    Collection, DeleteOutcome, DocumentStore, Filter, FindOptions, InsertOutcome, SortDirection,
    StorageError, StorageResult, UpdateOutcome,
};
use crate::models::{fields, Document};

#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    operations: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of storage calls served so far.
    pub fn operation_count(&self) -> usize {
        self.operations.load(AtomicOrdering::SeqCst)
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

/// Compiled form of a [`Filter`], with the identifier already validated.
enum Matcher {
    All,
    Id(String),
    Eq(String, Value),
}

impl Matcher {
    fn compile(filter: Filter) -> StorageResult<Self> {
        Ok(match filter {
            Filter::All => Matcher::All,
            Filter::Id(id) => {
                let oid = ObjectId::parse_str(&id).map_err(|_| StorageError::InvalidId(id))?;
                Matcher::Id(oid.to_hex())
            }
            Filter::Eq(field, value) => Matcher::Eq(field, value),
        })
    }

    fn matches(&self, document: &Document) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Id(id) => document.id() == Some(id.as_str()),
            // As in MongoDB, a null query value also matches a missing field.
            Matcher::Eq(field, value) => {
                values_equal(document.get(field).unwrap_or(&Value::Null), value)
            }
        }
    }
}

/// Equality as MongoDB applies it: numbers compare by value, so `5` matches `5.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
        options: FindOptions,
    ) -> StorageResult<Vec<Document>> {
        self.record_operation();
        let matcher = Matcher::compile(filter)?;
        let collections = self.collections.read().await;

        let mut found: Vec<Document> = collections
            .get(&collection)
            .into_iter()
            .flatten()
            .filter(|doc| matcher.matches(doc))
            .cloned()
            .collect();

        if let Some(sort) = options.sort {
            // Vec::sort_by is stable, so ties keep insertion order.
            found.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        // A limit of zero means no limit.
        if let Some(limit) = options.limit.filter(|l| *l != 0) {
            found.truncate(limit.unsigned_abs() as usize);
        }

        Ok(found)
    }

    async fn find_one(&self, collection: Collection, filter: Filter) -> StorageResult<Option<Document>> {
        self.record_operation();
        let matcher = Matcher::compile(filter)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| matcher.matches(doc)))
            .cloned())
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> StorageResult<InsertOutcome> {
        self.record_operation();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        let inserted_id = match document.get(fields::ID) {
            None => {
                let id = ObjectId::new().to_hex();
                document.insert(fields::ID, id.clone());
                id
            }
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
        };

        if docs
            .iter()
            .any(|existing| existing.get(fields::ID) == document.get(fields::ID))
        {
            return Err(StorageError::DuplicateKey(inserted_id));
        }

        docs.push(document);
        Ok(InsertOutcome { inserted_id })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        set: Document,
    ) -> StorageResult<UpdateOutcome> {
        self.record_operation();
        let matcher = Matcher::compile(filter)?;
        let mut collections = self.collections.write().await;

        let Some(target) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| matcher.matches(doc)))
        else {
            return Ok(UpdateOutcome::default());
        };

        let mut modified = false;
        for (field, value) in set.into_inner() {
            if target.get(&field) != Some(&value) {
                target.insert(field, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_one(&self, collection: Collection, filter: Filter) -> StorageResult<DeleteOutcome> {
        self.record_operation();
        let matcher = Matcher::compile(filter)?;
        let mut collections = self.collections.write().await;

        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(DeleteOutcome::default());
        };

        match docs.iter().position(|doc| matcher.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteOutcome { deleted_count: 1 })
            }
            None => Ok(DeleteOutcome::default()),
        }
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn shutdown(&self) {
        let documents: usize = self.collections.read().await.values().map(Vec::len).sum();
        tracing::info!(documents, "Discarding in-memory store");
    }
}

/// Cross-type ordering mirroring MongoDB's sort order for the JSON types:
/// missing/null < numbers < strings < objects < arrays < booleans.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Object(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Bool(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
