// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! [`TokenVerifier`] is the capability boundary between the HTTP layer and
//! the identity provider: give it an opaque token, get back the verified
//! principal or an [`AuthError`]. [`FirebaseVerifier`] checks Firebase ID
//! tokens against Google's published signing keys.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, get_current_timestamp, Algorithm, Validation};

use super::{AuthError, AuthenticatedUser, FirebaseClaims, JwksManager};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Firebase token issuer prefix.
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Verifies Firebase ID tokens for one project.
pub struct FirebaseVerifier {
    jwks: JwksManager,
    project_id: String,
}

impl FirebaseVerifier {
    pub fn new(jwks: JwksManager, project_id: impl Into<String>) -> Self {
        Self {
            jwks,
            project_id: project_id.into(),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_nbf = true;
        validation.set_issuer(&[format!("{FIREBASE_ISSUER_PREFIX}{}", self.project_id)]);
        validation.set_audience(&[&self.project_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

/// `iat` and `auth_time` must not lie in the future, beyond the clock skew leeway.
fn check_issued_in_past(claims: &FirebaseClaims, now: u64) -> Result<(), AuthError> {
    let latest = now.saturating_add(CLOCK_SKEW_LEEWAY) as i64;
    if claims.iat > latest || claims.auth_time.is_some_and(|t| t > latest) {
        return Err(AuthError::TokenNotYetValid);
    }
    Ok(())
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::MalformedToken);
        }
        let kid = header.kid.ok_or(AuthError::MalformedToken)?;

        let decoding_key = self.jwks.get_decoding_key(&kid).await?;

        let token_data = decode::<FirebaseClaims>(token, &decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            })?;

        check_issued_in_past(&token_data.claims, get_current_timestamp())?;
        AuthenticatedUser::try_from(token_data.claims)
    }
}

#[cfg(test)]
pub mod testing {
    //! Verifier double for handler and router tests.

    use std::collections::HashMap;

    use super::*;

    /// Accepts a fixed set of tokens, each mapped to an email.
    #[derive(Default)]
    pub struct StaticVerifier {
        tokens: HashMap<String, AuthenticatedUser>,
    }

    impl StaticVerifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_token(mut self, token: &str, email: &str) -> Self {
            let user = AuthenticatedUser::new(format!("uid-{email}"), email);
            self.tokens.insert(token.to_string(), user);
            self
        }
    }

    #[async_trait]
    impl TokenVerifier for StaticVerifier {
        async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            self.tokens.get(token).cloned().ok_or(AuthError::InvalidSignature)
        }
    }
}
