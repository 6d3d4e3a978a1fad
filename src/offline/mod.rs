//! File-backed store for the offline/PWA layer
//!
//! This module provides a simple CRUD store the app uses to queue work and
//! keep data available while offline. Records live in named collections keyed
//! by id, with most-recent-write-wins semantics. There is no TTL here; data
//! written stays until it is overwritten or deleted.

mod store;

pub use store::{OfflineStore, StoreError, StoredRecord};
