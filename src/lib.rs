// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Smart Deals - Marketplace API Service
//!
//! This crate provides the HTTP backend of a second-hand marketplace: product
//! listings, bids on products and user registration, stored in MongoDB and
//! protected by Firebase ID tokens.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication and route access policy (Firebase JWT)
//! - `config` - Environment configuration
//! - `storage` - Document store abstraction (MongoDB, in-memory)
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod telemetry;
