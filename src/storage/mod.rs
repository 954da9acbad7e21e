// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Gateway
//!
//! A thin accessor over the three document collections. Handlers never talk
//! to a database driver directly: they go through the typed repositories in
//! [`repository`], which in turn use a [`DocumentStore`] trait object.
//!
//! ## Backends
//!
//! - [`MongoStore`] - MongoDB via the official driver (production)
//! - [`InMemoryStore`] - process-local collections (development and tests)
//!
//! ## Consistency
//!
//! Each call is a single storage operation, atomic at the document level.
//! There are no transactions and no cross-request ordering guarantees.

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Document;

pub mod memory;
pub mod mongo;
pub mod repository;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;
pub use repository::{BidRepository, ProductRepository, UserRepository};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Identifier is not a valid ObjectId hex string
    #[error("invalid document identifier: {0:?}")]
    InvalidId(String),
    /// A document with the same identifier already exists
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    /// Document could not be converted to or from the storage encoding
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Driver or connectivity failure
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The named collections of the marketplace database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Bids,
    Users,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Bids => "bids",
            Collection::Users => "users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Document selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection
    All,
    /// The document whose `_id` is this hex identifier
    Id(String),
    /// Documents whose field equals the value
    Eq(String, Value),
}

impl Filter {
    pub fn id(id: impl Into<String>) -> Self {
        Filter::Id(id.into())
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub direction: SortDirection,
}

impl SortBy {
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Ordering and size limits for [`DocumentStore::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<SortBy>,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn sorted(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Identifier assigned by an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Find/insert/update/delete primitives over the named collections.
///
/// Implementations are shared across all requests for the lifetime of the
/// process and must be safe to call concurrently.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents matching `filter`, ordered and limited by `options`.
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
        options: FindOptions,
    ) -> StorageResult<Vec<Document>>;

    /// The first document matching `filter`, or `None`.
    async fn find_one(&self, collection: Collection, filter: Filter) -> StorageResult<Option<Document>>;

    /// Insert `document` as-is. An identifier is generated when `_id` is absent.
    async fn insert_one(&self, collection: Collection, document: Document) -> StorageResult<InsertOutcome>;

    /// Set the fields of `set` on the first document matching `filter`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        set: Document,
    ) -> StorageResult<UpdateOutcome>;

    /// Delete the first document matching `filter`.
    async fn delete_one(&self, collection: Collection, filter: Filter) -> StorageResult<DeleteOutcome>;

    /// Round-trip to the backend to confirm it is reachable.
    async fn ping(&self) -> StorageResult<()>;

    /// Release backend resources. Called once after the server has drained.
    async fn shutdown(&self);
}
