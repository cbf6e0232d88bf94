//! Unified error types for the Longan library.
//!
//! This module provides a unified error type that encompasses errors from
//! the codec, style, geometry and package layers, presenting a consistent
//! API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
