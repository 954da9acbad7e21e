// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AccessPolicy, TokenVerifier};
use crate::storage::{BidRepository, DocumentStore, ProductRepository, UserRepository};

/// Shared dependencies handed to every handler.
///
/// The store is owned by `main`, which releases it once the server has
/// drained; handlers only ever see this shared handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            policy: Arc::new(AccessPolicy::default()),
        }
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(self.store.as_ref())
    }

    pub fn bids(&self) -> BidRepository<'_> {
        BidRepository::new(self.store.as_ref())
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.store.as_ref())
    }
}
