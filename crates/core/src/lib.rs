//! Core types and shared functionality for wxgate.
//!
//! This crate provides:
//! - In-memory response cache with TTL expiry and background sweeps
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheKey, ResponseCache};
pub use config::{AppConfig, ConfigError, SearchDedup, Setting, SourceMode};
pub use error::Error;
