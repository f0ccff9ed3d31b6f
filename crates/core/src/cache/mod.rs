//! In-memory response cache for upstream payloads.
//!
//! This module provides the process-local cache shared by every route
//! handler. It supports:
//!
//! - Deterministic request fingerprints (SHA-256 over canonical JSON)
//! - Lazy TTL expiry on read
//! - Periodic background sweeps with an optional entry cap
//! - An injectable clock for deterministic tests

pub mod clock;
pub mod key;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::CacheKey;
pub use store::{CacheEntry, CacheStats, ResponseCache};
pub use sweeper::spawn_sweeper;
