//! Common types and utilities.

/// Factory SDK error type.
pub use crate::error::Error;

/// Factory SDK result type.
pub type Result<T> = core::result::Result<T, Error>;
