//! Centralized error handling for the XMLTV grabber
//!
//! # Error Categories
//!
//! - **Configuration Errors**: missing or invalid config and channel files (fatal)
//! - **Source Errors**: upstream fetch and response parsing failures (recovered per channel)
//! - **I/O Errors**: output write failures (fatal)

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
