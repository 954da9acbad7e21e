// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Product repository.
//!
//! Products are listings owned by the submitting user's email. Only `name`
//! and `price` are ever modified after creation.

use crate::models::{fields, Document, UpdateProductRequest};
use crate::storage::{
    Collection, DeleteOutcome, DocumentStore, Filter, FindOptions, InsertOutcome, SortBy,
    StorageResult, UpdateOutcome,
};

/// Number of listings returned by [`ProductRepository::latest`].
pub const LATEST_PRODUCTS_LIMIT: i64 = 6;

pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// All products, or only those whose owner email equals `email`.
    pub async fn list(&self, email: Option<&str>) -> StorageResult<Vec<Document>> {
        let filter = match email {
            Some(email) => Filter::eq(fields::EMAIL, email),
            None => Filter::All,
        };
        self.store
            .find(Collection::Products, filter, FindOptions::default())
            .await
    }

    /// The most recently created products, newest first.
    pub async fn latest(&self) -> StorageResult<Vec<Document>> {
        let options = FindOptions::default()
            .sorted(SortBy::descending(fields::CREATED_AT))
            .limit(LATEST_PRODUCTS_LIMIT);
        self.store.find(Collection::Products, Filter::All, options).await
    }

    pub async fn get(&self, product_id: &str) -> StorageResult<Option<Document>> {
        self.store
            .find_one(Collection::Products, Filter::id(product_id))
            .await
    }

    /// Store the listing exactly as submitted.
    pub async fn create(&self, product: Document) -> StorageResult<InsertOutcome> {
        self.store.insert_one(Collection::Products, product).await
    }

    /// Overwrite `name` and `price`; every other field is left untouched.
    pub async fn update_listing(
        &self,
        product_id: &str,
        update: UpdateProductRequest,
    ) -> StorageResult<UpdateOutcome> {
        self.store
            .update_one(Collection::Products, Filter::id(product_id), update.into_set())
            .await
    }

    pub async fn delete(&self, product_id: &str) -> StorageResult<DeleteOutcome> {
        self.store
            .delete_one(Collection::Products, Filter::id(product_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use serde_json::{json, Value};

    fn product(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_returns_submitted_fields() {
        let store = InMemoryStore::new();
        let repo = ProductRepository::new(&store);

        let created = repo
            .create(product(json!({
                "name": "Road bike",
                "price": 450,
                "email": "seller@example.com",
                "condition": "used"
            })))
            .await
            .unwrap();

        let loaded = repo.get(&created.inserted_id).await.unwrap().unwrap();
        assert_eq!(loaded.get_str("name"), Some("Road bike"));
        assert_eq!(loaded.get("price"), Some(&json!(450)));
        assert_eq!(loaded.get_str("condition"), Some("used"));
    }

    #[tokio::test]
    async fn get_missing_product_is_none() {
        let store = InMemoryStore::new();
        let repo = ProductRepository::new(&store);
        let loaded = repo.get("65f0c0ffee0000000000abcd").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_owner_email() {
        let store = InMemoryStore::new();
        let repo = ProductRepository::new(&store);
        for (name, email) in [("a", "x@example.com"), ("b", "y@example.com"), ("c", "x@example.com")] {
            repo.create(product(json!({"name": name, "email": email})))
                .await
                .unwrap();
        }

        let mine = repo.list(Some("x@example.com")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|p| p.get_str("email") == Some("x@example.com")));

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn latest_returns_six_newest() {
        let store = InMemoryStore::new();
        let repo = ProductRepository::new(&store);
        // Inserted out of order so the result depends on the sort, not insertion.
        for day in [3, 9, 1, 7, 5, 8, 2, 6, 4] {
            repo.create(product(json!({
                "name": format!("item-{day}"),
                "created_at": format!("2025-01-0{day}T00:00:00Z")
            })))
            .await
            .unwrap();
        }

        let latest = repo.latest().await.unwrap();
        let names: Vec<_> = latest.iter().map(|p| p.get_str("name").unwrap()).collect();
        assert_eq!(names, ["item-9", "item-8", "item-7", "item-6", "item-5", "item-4"]);
    }

    #[tokio::test]
    async fn update_listing_touches_only_name_and_price() {
        let store = InMemoryStore::new();
        let repo = ProductRepository::new(&store);
        let id = repo
            .create(product(json!({
                "name": "Desk",
                "price": 100,
                "email": "owner@example.com",
                "created_at": "2025-01-01T00:00:00Z"
            })))
            .await
            .unwrap()
            .inserted_id;

        let update: UpdateProductRequest = serde_json::from_value(json!({
            "name": "Standing desk",
            "price": 180,
            "email": "mallory@example.com",
            "created_at": "1999-01-01T00:00:00Z"
        }))
        .unwrap();
        let outcome = repo.update_listing(&id, update).await.unwrap();
        assert_eq!(outcome.matched_count, 1);

        let loaded = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.get_str("name"), Some("Standing desk"));
        assert_eq!(loaded.get("price"), Some(&json!(180)));
        assert_eq!(loaded.get_str("email"), Some("owner@example.com"));
        assert_eq!(loaded.get_str("created_at"), Some("2025-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn delete_removes_product() {
        let store = InMemoryStore::new();
        let repo = ProductRepository::new(&store);
        let id = repo
            .create(product(json!({"name": "Lamp"})))
            .await
            .unwrap()
            .inserted_id;

        assert_eq!(repo.delete(&id).await.unwrap().deleted_count, 1);
        assert!(repo.get(&id).await.unwrap().is_none());
    }
}
