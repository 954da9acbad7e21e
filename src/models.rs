// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Products, bids and users are schema-flexible documents. The service only
//! reads a handful of well-known fields (see [`fields`]); everything else a
//! client submits is stored and returned verbatim.
//!
//! ## Model Categories
//!
//! - **Documents**: the [`Document`] newtype wrapping a JSON object
//! - **Requests**: [`UpdateProductRequest`] and the listing query strings
//! - **Write acknowledgements**: insert/update/delete results in the shape
//!   clients of the marketplace already consume

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::storage::{DeleteOutcome, InsertOutcome, UpdateOutcome};

/// Well-known document field names.
pub mod fields {
    /// Storage-assigned identifier.
    pub const ID: &str = "_id";
    /// Product owner email, and the natural key of a user.
    pub const EMAIL: &str = "email";
    pub const NAME: &str = "name";
    pub const PRICE: &str = "price";
    pub const CREATED_AT: &str = "created_at";
    /// Product identifier referenced by a bid (plain string).
    pub const PRODUCT: &str = "product";
    pub const BID_PRICE: &str = "bid_price";
    pub const BUYER_EMAIL: &str = "buyer_email";
}

// =============================================================================
// Documents
// =============================================================================

/// A schema-flexible record stored in one of the collections.
///
/// Serializes as a plain JSON object. The identifier lives under `_id` as a
/// 24-character hex string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Document(pub Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// The document identifier, if it has been assigned one.
    pub fn id(&self) -> Option<&str> {
        self.get_str(fields::ID)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Document(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Optional owner filter used by `GET /products` and `GET /bids`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EmailQuery {
    /// Restrict results to documents owned by this email.
    pub email: Option<String>,
}

impl EmailQuery {
    /// The filter value; an empty `?email=` counts as no filter.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

/// Body of `PATCH /products/{id}`.
///
/// Only `name` and `price` are read; any other field in the body is ignored.
/// A missing field is written as `null`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub name: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub price: Option<Value>,
}

impl UpdateProductRequest {
    /// The `$set` document applied to the stored product.
    pub fn into_set(self) -> Document {
        [
            (fields::NAME, self.name.unwrap_or(Value::Null)),
            (fields::PRICE, self.price.unwrap_or(Value::Null)),
        ]
        .into_iter()
        .collect()
    }
}

// =============================================================================
// Write acknowledgements
// =============================================================================

/// Result of inserting a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    /// Identifier assigned to the new document.
    pub inserted_id: String,
}

/// Result of updating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

/// Result of deleting a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<InsertOutcome> for InsertResult {
    fn from(outcome: InsertOutcome) -> Self {
        Self {
            acknowledged: true,
            inserted_id: outcome.inserted_id,
        }
    }
}

impl From<UpdateOutcome> for UpdateResult {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            acknowledged: true,
            matched_count: outcome.matched_count,
            modified_count: outcome.modified_count,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

impl From<DeleteOutcome> for DeleteResult {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            acknowledged: true,
            deleted_count: outcome.deleted_count,
        }
    }
}

/// Sentinel returned when a user with the submitted email already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserExists {
    #[serde(rename = "Message")]
    pub message: String,
}

impl Default for UserExists {
    fn default() -> Self {
        Self {
            message: "User Already Exist".to_string(),
        }
    }
}

/// Outcome of `POST /users`. Both variants are success responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CreateUserResponse {
    Created(InsertResult),
    AlreadyExists(UserExists),
}
