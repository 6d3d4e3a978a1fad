//! In-memory response cache with per-entry TTL
//!
//! This module provides a session-scoped cache used to avoid redundant network
//! calls. Each entry carries its own time-to-live so different data types
//! (search results vs. static metadata) can have independently tuned freshness
//! in a single cache instance. Expiry is checked lazily at read time; there is
//! no background sweep.

mod memory;

pub use memory::TtlCache;
