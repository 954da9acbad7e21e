// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{CreateUserResponse, Document, UserExists},
    state::AppState,
    storage::repository::UserWrite,
};

/// Register a user, keyed by `email`.
///
/// Registering an email that is already stored leaves the collection
/// untouched and answers with the `User Already Exist` sentinel.
#[utoipa::path(
    post,
    path = "/users",
    request_body = Document,
    tag = "Users",
    responses((status = 200, body = CreateUserResponse))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<Document>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let response = match state.users().create_if_absent(user).await? {
        UserWrite::Created(outcome) => CreateUserResponse::Created(outcome.into()),
        UserWrite::AlreadyExists => {
            tracing::debug!("User already registered");
            CreateUserResponse::AlreadyExists(UserExists::default())
        }
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::verifier::testing::StaticVerifier;
    use crate::storage::{Collection, InMemoryStore};
    use serde_json::json;

    #[tokio::test]
    async fn second_registration_returns_sentinel() {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(store.clone(), Arc::new(StaticVerifier::new()));
        let user: Document = serde_json::from_value(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "image": "https://example.com/ana.png"
        }))
        .unwrap();

        let Json(first) = create_user(State(state.clone()), Json(user.clone())).await.unwrap();
        assert!(matches!(first, CreateUserResponse::Created(ref r) if r.acknowledged));

        let Json(second) = create_user(State(state), Json(user)).await.unwrap();
        assert_eq!(second, CreateUserResponse::AlreadyExists(UserExists::default()));

        assert_eq!(store.len(Collection::Users).await, 1);
    }
}
