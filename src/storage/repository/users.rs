// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! The email is the natural key of a user. Registration is idempotent by
//! email: a second registration is reported, not stored. The check and the
//! insert are two separate calls, so two concurrent first registrations for
//! the same email can both succeed; a unique index on `email` closes that gap.

use serde_json::Value;

use crate::models::{fields, Document};
use crate::storage::{Collection, DocumentStore, Filter, InsertOutcome, StorageResult};

/// Result of [`UserRepository::create_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserWrite {
    Created(InsertOutcome),
    AlreadyExists,
}

pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    pub async fn find_by_email(&self, email: Option<&Value>) -> StorageResult<Option<Document>> {
        let email = email.cloned().unwrap_or(Value::Null);
        self.store
            .find_one(Collection::Users, Filter::eq(fields::EMAIL, email))
            .await
    }

    /// Insert `user` unless a user with the same `email` is already stored.
    pub async fn create_if_absent(&self, user: Document) -> StorageResult<UserWrite> {
        if self.find_by_email(user.get(fields::EMAIL)).await?.is_some() {
            return Ok(UserWrite::AlreadyExists);
        }
        let outcome = self.store.insert_one(Collection::Users, user).await?;
        Ok(UserWrite::Created(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use serde_json::json;

    fn user(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn second_registration_is_reported_not_stored() {
        let store = InMemoryStore::new();
        let repo = UserRepository::new(&store);

        let first = repo
            .create_if_absent(user(json!({"email": "ana@example.com", "name": "Ana"})))
            .await
            .unwrap();
        assert!(matches!(first, UserWrite::Created(_)));

        let second = repo
            .create_if_absent(user(json!({"email": "ana@example.com", "name": "Ana again"})))
            .await
            .unwrap();
        assert_eq!(second, UserWrite::AlreadyExists);

        assert_eq!(store.len(Collection::Users).await, 1);
        let stored = repo
            .find_by_email(Some(&json!("ana@example.com")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_str("name"), Some("Ana"));
    }

    #[tokio::test]
    async fn different_emails_are_distinct_users() {
        let store = InMemoryStore::new();
        let repo = UserRepository::new(&store);

        for email in ["a@example.com", "b@example.com"] {
            let write = repo.create_if_absent(user(json!({"email": email}))).await.unwrap();
            assert!(matches!(write, UserWrite::Created(_)));
        }
        assert_eq!(store.len(Collection::Users).await, 2);
    }

    #[tokio::test]
    async fn users_without_email_share_one_slot() {
        let store = InMemoryStore::new();
        let repo = UserRepository::new(&store);

        let first = repo.create_if_absent(user(json!({"name": "anon"}))).await.unwrap();
        assert!(matches!(first, UserWrite::Created(_)));

        let second = repo.create_if_absent(user(json!({"name": "anon 2"}))).await.unwrap();
        assert_eq!(second, UserWrite::AlreadyExists);
    }
}
