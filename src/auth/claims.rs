// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Firebase ID token claims and the authenticated principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AuthError;

/// Claims carried by a Firebase ID token.
///
/// See: https://firebase.google.com/docs/auth/admin/verify-id-tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// Subject (Firebase user ID)
    pub sub: String,

    /// Email of the signed-in user
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub email_verified: Option<bool>,

    /// Issuer (`https://securetoken.google.com/<project>`)
    pub iss: String,

    /// Audience (the Firebase project ID)
    pub aud: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// When the user authenticated
    #[serde(default)]
    pub auth_time: Option<i64>,
}

/// Identity derived from a verified bearer token.
///
/// This is the principal used for ownership checks: resources are owned
/// by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Firebase user ID (`sub` claim)
    pub uid: String,

    /// Verified email claim
    pub email: String,

    pub email_verified: bool,
}

impl AuthenticatedUser {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            email_verified: false,
        }
    }

    /// Whether this principal owns resources recorded under `email`.
    pub fn owns(&self, email: &str) -> bool {
        self.email == email
    }
}

impl TryFrom<FirebaseClaims> for AuthenticatedUser {
    type Error = AuthError;

    fn try_from(claims: FirebaseClaims) -> Result<Self, Self::Error> {
        if claims.sub.is_empty() {
            return Err(AuthError::MalformedToken);
        }
        let email = claims
            .email
            .filter(|email| !email.is_empty())
            .ok_or(AuthError::MissingEmailClaim)?;

        Ok(Self {
            uid: claims.sub,
            email,
            email_verified: claims.email_verified.unwrap_or(false),
        })
    }
}
