//! Tubefetch: cached, rate-limited data-fetch layer for a video platform client
//!
//! The crate sits between UI data hooks and the platform API. Three pieces
//! compose, leaves first:
//!
//! - [`cache::TtlCache`]: an in-memory store with per-entry expiry, so repeat
//!   reads of the same endpoint skip the network while the data is fresh.
//! - [`queue::RequestQueue`]: a FIFO queue that starts at most a configured
//!   number of requests per rate window, delaying (never dropping) the rest.
//! - [`client::ApiClient`]: the facade callers use. Cached GETs check the
//!   cache first and bypass the queue entirely on a hit; everything else runs
//!   through the queue, and errors come back as a small typed taxonomy.
//!
//! [`offline::OfflineStore`] is a separate file-backed CRUD store used by the
//! app's offline layer; it shares no state with the fetch path.

pub mod cache;
pub mod client;
pub mod config;
pub mod offline;
pub mod queue;

pub use cache::TtlCache;
pub use client::{ApiClient, ApiError};
pub use config::{ClientConfig, RateLimitConfig, TtlTier, TtlTiers};
pub use offline::{OfflineStore, StoreError, StoredRecord};
pub use queue::{QueueError, RequestQueue};
