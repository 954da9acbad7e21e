// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository owns the query shape for one collection: which fields
//! are filtered on, how results are ordered, and how many are returned.

pub mod bids;
pub mod products;
pub mod users;

pub use bids::BidRepository;
pub use products::ProductRepository;
pub use users::{UserRepository, UserWrite};
