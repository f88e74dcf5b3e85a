//! Error handling module for registry search and export operations.
//!
//! This module provides error handling for the whole crate with:
//! - Structured error kinds for the API, query, export, and config layers
//! - A crate-wide [`Result`] alias
//! - An [`ErrorInfo`] structure carrying the status/message pair surfaced
//!   to the presentation layer after a failed search or export

pub mod info;
pub mod kinds;

// Re-export commonly used types
pub use info::ErrorInfo;
pub use kinds::{ApiError, ConfigError, ExportError, QueryError, RegsearchError, Result};
