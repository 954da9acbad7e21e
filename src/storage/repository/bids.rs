// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bid repository.
//!
//! A bid references its product by a plain string in `product`. Nothing
//! checks that the product exists: bids on a deleted product stay listed.

use crate::models::{fields, Document};
use crate::storage::{
    Collection, DeleteOutcome, DocumentStore, Filter, FindOptions, InsertOutcome, SortBy,
    StorageResult,
};

pub struct BidRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> BidRepository<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// All bids, or only those placed by `buyer_email`.
    pub async fn list(&self, buyer_email: Option<&str>) -> StorageResult<Vec<Document>> {
        let filter = match buyer_email {
            Some(email) => Filter::eq(fields::BUYER_EMAIL, email),
            None => Filter::All,
        };
        self.store
            .find(Collection::Bids, filter, FindOptions::default())
            .await
    }

    /// Bids on one product, highest bid first.
    pub async fn list_for_product(&self, product_id: &str) -> StorageResult<Vec<Document>> {
        let options = FindOptions::default().sorted(SortBy::descending(fields::BID_PRICE));
        self.store
            .find(Collection::Bids, Filter::eq(fields::PRODUCT, product_id), options)
            .await
    }

    pub async fn create(&self, bid: Document) -> StorageResult<InsertOutcome> {
        self.store.insert_one(Collection::Bids, bid).await
    }

    pub async fn delete(&self, bid_id: &str) -> StorageResult<DeleteOutcome> {
        self.store.delete_one(Collection::Bids, Filter::id(bid_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryStore, ProductRepository};
    use serde_json::{json, Value};

    fn bid(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn list_for_product_sorts_by_price_descending() {
        let store = InMemoryStore::new();
        let repo = BidRepository::new(&store);
        for (price, buyer) in [(120, "a"), (300, "b"), (90, "c"), (300, "d")] {
            repo.create(bid(json!({
                "product": "p-1",
                "bid_price": price,
                "buyer_email": format!("{buyer}@example.com")
            })))
            .await
            .unwrap();
        }
        repo.create(bid(json!({"product": "p-2", "bid_price": 1000})))
            .await
            .unwrap();

        let bids = repo.list_for_product("p-1").await.unwrap();
        let prices: Vec<_> = bids.iter().map(|b| b.get("bid_price").unwrap().clone()).collect();
        assert_eq!(prices, [json!(300), json!(300), json!(120), json!(90)]);

        // Equal prices keep insertion order.
        assert_eq!(bids[0].get_str("buyer_email"), Some("b@example.com"));
        assert_eq!(bids[1].get_str("buyer_email"), Some("d@example.com"));
    }

    #[tokio::test]
    async fn list_filters_by_buyer() {
        let store = InMemoryStore::new();
        let repo = BidRepository::new(&store);
        for buyer in ["me@example.com", "you@example.com", "me@example.com"] {
            repo.create(bid(json!({"product": "p", "buyer_email": buyer})))
                .await
                .unwrap();
        }

        assert_eq!(repo.list(Some("me@example.com")).await.unwrap().len(), 2);
        assert_eq!(repo.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn bids_survive_product_deletion() {
        let store = InMemoryStore::new();
        let products = ProductRepository::new(&store);
        let bids = BidRepository::new(&store);

        let product_id = products
            .create(bid(json!({"name": "Guitar"})))
            .await
            .unwrap()
            .inserted_id;
        bids.create(bid(json!({"product": product_id, "bid_price": 50})))
            .await
            .unwrap();

        products.delete(&product_id).await.unwrap();

        let dangling = bids.list_for_product(&product_id).await.unwrap();
        assert_eq!(dangling.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_bid() {
        let store = InMemoryStore::new();
        let repo = BidRepository::new(&store);
        let id = repo
            .create(bid(json!({"product": "p"})))
            .await
            .unwrap()
            .inserted_id;

        assert_eq!(repo.delete(&id).await.unwrap().deleted_count, 1);
        assert_eq!(repo.delete(&id).await.unwrap().deleted_count, 0);
    }
}
