// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::enforce_access, AuthenticatedUser},
    models::{
        CreateUserResponse, DeleteResult, Document, InsertResult, UpdateProductRequest,
        UpdateResult, UserExists,
    },
    state::AppState,
};

pub mod bids;
pub mod health;
pub mod products;
pub mod users;

/// Build the HTTP application.
///
/// Every API route sits behind the access-policy layer; the documentation
/// routes are merged afterwards and stay public.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(health::greeting))
        .route("/health", get(health::health))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/latest-products", get(products::latest_products))
        .route(
            "/products/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/bids/{product_id}", get(bids::list_product_bids))
        .route("/bids", get(bids::list_bids).post(bids::create_bid))
        .route("/bids/{id}", delete(bids::delete_bid))
        .route("/users", post(users::create_user))
        .route_layer(from_fn_with_state(state.clone(), enforce_access))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("Firebase ID token")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::greeting,
        health::health,
        products::list_products,
        products::latest_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        bids::list_bids,
        bids::list_product_bids,
        bids::create_bid,
        bids::delete_bid,
        users::create_user
    ),
    components(
        schemas(
            Document,
            UpdateProductRequest,
            InsertResult,
            UpdateResult,
            DeleteResult,
            UserExists,
            CreateUserResponse,
            AuthenticatedUser,
            health::HealthResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Health", description = "Greeting and health checks"),
        (name = "Products", description = "Product listings"),
        (name = "Bids", description = "Bids on products"),
        (name = "Users", description = "User registration")
    )
)]
struct ApiDoc;
