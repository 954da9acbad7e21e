// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-route access requirements.
//!
//! The policy is a declarative table of `(method, route) -> Access`. It is
//! enforced by a single layer in [`super::middleware`], so no handler opts in
//! or out of authentication on its own.
//!
//! | Route | compat | strict |
//! |-------|--------|--------|
//! | `GET /`, `GET /health`, product reads | public | public |
//! | `POST /products` | authenticated | authenticated |
//! | `PATCH`/`DELETE /products/{id}` | public | authenticated |
//! | `GET /bids` | owner (`?email=`) | owner (`?email=`) |
//! | `GET /products/bids/{product_id}` | authenticated | authenticated |
//! | `POST /bids`, `DELETE /bids/{id}` | public | authenticated |
//! | `POST /users` | public | authenticated |
//!
//! Routes missing from the table require authentication.

use axum::http::Method;

/// What a request must prove before its handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// Authenticated, and a non-empty `?email=` filter must equal the
    /// principal's email.
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyMode {
    /// Gating the marketplace frontend relies on: only owner data is protected.
    #[default]
    Compat,
    /// Every mutating route requires authentication.
    Strict,
}

impl std::str::FromStr for PolicyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compat" => Ok(PolicyMode::Compat),
            "strict" => Ok(PolicyMode::Strict),
            other => Err(format!("unknown auth policy {other:?} (expected compat or strict)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
}

impl RouteRule {
    fn new(method: Method, path: &'static str, access: Access) -> Self {
        Self { method, path, access }
    }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<RouteRule>,
}

impl AccessPolicy {
    pub fn for_mode(mode: PolicyMode) -> Self {
        match mode {
            PolicyMode::Compat => Self::compat(),
            PolicyMode::Strict => Self::strict(),
        }
    }

    pub fn compat() -> Self {
        use Access::*;

        let rules = vec![
            RouteRule::new(Method::GET, "/", Public),
            RouteRule::new(Method::GET, "/health", Public),
            RouteRule::new(Method::GET, "/products", Public),
            RouteRule::new(Method::POST, "/products", Authenticated),
            RouteRule::new(Method::GET, "/latest-products", Public),
            RouteRule::new(Method::GET, "/products/{id}", Public),
            RouteRule::new(Method::PATCH, "/products/{id}", Public),
            RouteRule::new(Method::DELETE, "/products/{id}", Public),
            RouteRule::new(Method::GET, "/products/bids/{product_id}", Authenticated),
            RouteRule::new(Method::GET, "/bids", Owner),
            RouteRule::new(Method::POST, "/bids", Public),
            RouteRule::new(Method::DELETE, "/bids/{id}", Public),
            RouteRule::new(Method::POST, "/users", Public),
        ];
        Self { rules }
    }

    pub fn strict() -> Self {
        let mut policy = Self::compat();
        for rule in &mut policy.rules {
            let mutating = !matches!(rule.method, Method::GET | Method::HEAD | Method::OPTIONS);
            if mutating && rule.access == Access::Public {
                rule.access = Access::Authenticated;
            }
        }
        policy
    }

    /// Requirement for a request, given the router's matched path pattern.
    ///
    /// `HEAD` follows the `GET` rule of the same route.
    pub fn access_for(&self, method: &Method, route: &str) -> Access {
        let method = if *method == Method::HEAD {
            Method::GET
        } else {
            method.clone()
        };
        self.rules
            .iter()
            .find(|rule| rule.method == method && rule.path == route)
            .map(|rule| rule.access)
            .unwrap_or(Access::Authenticated)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::compat()
    }
}
