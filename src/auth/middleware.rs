// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! [`enforce_access`] is installed as a route layer over the whole API. It
//! looks up the matched route in the [`AccessPolicy`](super::AccessPolicy)
//! and, for protected routes, verifies the bearer token and stores the
//! [`AuthenticatedUser`] in the request extensions before the handler runs.
//! Rejected requests never reach a handler, and so never touch storage.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/bids", get(bids::list_bids))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), enforce_access))
//!     .with_state(state);
//! ```

use axum::{
    extract::{MatchedPath, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{Access, AuthError, AuthenticatedUser, TokenVerifier};
use crate::{models::EmailQuery, state::AppState};

/// Extract the bearer token from the Authorization header.
///
/// The token is the second space-separated segment of the header value;
/// the scheme word itself is not inspected.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    value
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Verify the request's bearer token and return the principal.
pub async fn authenticate(
    headers: &HeaderMap,
    verifier: &dyn TokenVerifier,
) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers)?;
    verifier.verify(token).await
}

/// Route layer applying the access policy to every request.
pub async fn enforce_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let access = match request.extensions().get::<MatchedPath>() {
        Some(route) => state.policy.access_for(request.method(), route.as_str()),
        None => Access::Authenticated,
    };

    if access == Access::Public {
        return next.run(request).await;
    }

    let user = match authenticate(request.headers(), state.verifier.as_ref()).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    // Parsed exactly as the handler parses it. An empty filter is no filter.
    if access == Access::Owner {
        let params = match Query::<EmailQuery>::try_from_uri(request.uri()) {
            Ok(Query(params)) => params,
            Err(rejection) => return rejection.into_response(),
        };
        if let Some(owner) = params.email() {
            if !user.owns(owner) {
                tracing::warn!(
                    principal = %user.email,
                    requested = %owner,
                    path = %request.uri().path(),
                    "Owner check failed"
                );
                return AuthError::OwnerMismatch.into_response();
            }
        }
    }

    tracing::debug!(email = %user.email, "Authenticated request");
    request.extensions_mut().insert(user);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_takes_second_segment() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("Bearer abc trailing")).unwrap(), "abc");
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[test]
    fn empty_token_is_unauthenticated() {
        assert!(matches!(bearer_token(&headers("Bearer")), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(&headers("Bearer ")), Err(AuthError::MissingToken)));
        assert!(matches!(
            bearer_token(&headers("Bearer  abc")),
            Err(AuthError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn authenticate_delegates_to_verifier() {
        use crate::auth::verifier::testing::StaticVerifier;

        let verifier = StaticVerifier::new().with_token("good", "me@example.com");
        let user = authenticate(&headers("Bearer good"), &verifier).await.unwrap();
        assert_eq!(user.email, "me@example.com");

        let rejected = authenticate(&headers("Bearer bad"), &verifier).await;
        assert!(rejected.is_err());
    }
}
