// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Firebase ID token authentication for the marketplace API.
//!
//! ## Auth Flow
//!
//! 1. The frontend signs the user in with Firebase Auth
//! 2. The frontend sends `Authorization: Bearer <Firebase ID token>`
//! 3. The server:
//!    - Looks up the route in the [`AccessPolicy`]
//!    - Fetches Google's signing keys (JWKS) over HTTPS, cached for an hour
//!    - Verifies signature, expiry, issuer and audience (the project ID)
//!    - Binds the token's email to the request as [`AuthenticatedUser`]
//!
//! ## Failure Modes
//!
//! - Missing header, empty token or failed verification: 401
//! - Owner check mismatch (e.g. `GET /bids?email=` for someone else): 403

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod policy;
pub mod verifier;

pub use claims::{AuthenticatedUser, FirebaseClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::JwksManager;
pub use policy::{Access, AccessPolicy, PolicyMode};
pub use verifier::{FirebaseVerifier, TokenVerifier};
