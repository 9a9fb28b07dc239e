//! Core types and shared functionality for mcp-fetchserp.
//!
//! This crate provides:
//! - The ephemeral result cache backing the search → fetch workflow
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheEntry, Clock, ManualClock, ResultCache, SystemClock};
pub use config::{AppConfig, ConfigError, Transport};
pub use error::Error;
