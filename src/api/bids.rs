// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{DeleteResult, Document, EmailQuery, InsertResult},
    state::AppState,
};

/// Bids placed by `email`, or every bid when the filter is absent.
///
/// The access layer rejects a filter naming someone other than the caller.
#[utoipa::path(
    get,
    path = "/bids",
    params(EmailQuery),
    tag = "Bids",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [Document]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Filter names another user")
    )
)]
pub async fn list_bids(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.bids().list(params.email()).await?))
}

/// Bids on one product, highest `bid_price` first.
#[utoipa::path(
    get,
    path = "/products/bids/{product_id}",
    params(("product_id" = String, Path, description = "Product the bids reference")),
    tag = "Bids",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [Document]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_product_bids(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.bids().list_for_product(&product_id).await?))
}

#[utoipa::path(
    post,
    path = "/bids",
    request_body = Document,
    tag = "Bids",
    responses((status = 200, body = InsertResult))
)]
pub async fn create_bid(
    State(state): State<AppState>,
    Json(bid): Json<Document>,
) -> Result<Json<InsertResult>, ApiError> {
    let outcome = state.bids().create(bid).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    delete,
    path = "/bids/{id}",
    params(("id" = String, Path, description = "Bid identifier")),
    tag = "Bids",
    responses((status = 200, body = DeleteResult))
)]
pub async fn delete_bid(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResult>, ApiError> {
    let outcome = state.bids().delete(&id).await?;
    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::verifier::testing::StaticVerifier;
    use crate::storage::InMemoryStore;
    use serde_json::{json, Value};

    fn test_state() -> AppState {
        AppState::new(Arc::new(InMemoryStore::new()), Arc::new(StaticVerifier::new()))
    }

    fn bid(value: Value) -> Json<Document> {
        Json(serde_json::from_value(value).unwrap())
    }

    #[tokio::test]
    async fn product_bids_are_highest_first() {
        let state = test_state();
        let product = "65f0c0ffee0000000000abcd";
        for price in [10, 30, 20] {
            create_bid(
                State(state.clone()),
                bid(json!({"product": product, "bid_price": price, "buyer_email": "b@example.com"})),
            )
            .await
            .unwrap();
        }
        create_bid(
            State(state.clone()),
            bid(json!({"product": "65f0c0ffee0000000000ffff", "bid_price": 99})),
        )
        .await
        .unwrap();

        let Json(bids) = list_product_bids(Path(product.to_string()), State(state))
            .await
            .unwrap();
        let prices: Vec<_> = bids.iter().map(|b| b.get("bid_price").cloned()).collect();
        assert_eq!(prices, vec![Some(json!(30)), Some(json!(20)), Some(json!(10))]);
    }

    #[tokio::test]
    async fn list_bids_filters_by_buyer() {
        let state = test_state();
        for buyer in ["ana@example.com", "bo@example.com", "ana@example.com"] {
            create_bid(State(state.clone()), bid(json!({"buyer_email": buyer, "bid_price": 1})))
                .await
                .unwrap();
        }

        let Json(all) = list_bids(State(state.clone()), Query(EmailQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let Json(mine) = list_bids(
            State(state),
            Query(EmailQuery {
                email: Some("ana@example.com".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn delete_bid_removes_it() {
        let state = test_state();
        let Json(created) = create_bid(State(state.clone()), bid(json!({"bid_price": 5})))
            .await
            .unwrap();

        let Json(result) = delete_bid(Path(created.inserted_id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 1);

        let Json(remaining) = list_bids(State(state), Query(EmailQuery::default()))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
