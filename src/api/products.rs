// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        DeleteResult, Document, EmailQuery, InsertResult, UpdateProductRequest, UpdateResult,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/products",
    params(EmailQuery),
    tag = "Products",
    responses((status = 200, body = [Document]))
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let products = state.products().list(params.email()).await?;
    Ok(Json(products))
}

/// The six most recently created products.
#[utoipa::path(
    get,
    path = "/latest-products",
    tag = "Products",
    responses((status = 200, body = [Document]))
)]
pub async fn latest_products(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.products().latest().await?))
}

/// Returns `null` when no product has the identifier.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    tag = "Products",
    responses((status = 200, body = Document, description = "The product, or null when absent"))
)]
pub async fn get_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Option<Document>>, ApiError> {
    Ok(Json(state.products().get(&id).await?))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = Document,
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 200, body = InsertResult),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(product): Json<Document>,
) -> Result<Json<InsertResult>, ApiError> {
    let outcome = state.products().create(product).await?;
    tracing::info!(
        product_id = %outcome.inserted_id,
        principal = %user.email,
        "Product created"
    );
    Ok(Json(outcome.into()))
}

/// Only `name` and `price` are applied; other body fields are ignored.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    request_body = UpdateProductRequest,
    tag = "Products",
    responses((status = 200, body = UpdateResult))
)]
pub async fn update_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let outcome = state.products().update_listing(&id, request).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    tag = "Products",
    responses((status = 200, body = DeleteResult))
)]
pub async fn delete_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResult>, ApiError> {
    let outcome = state.products().delete(&id).await?;
    Ok(Json(outcome.into()))
}
