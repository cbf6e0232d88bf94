//! Common utilities shared across the library.
//!
//! This module hosts functionality that is independent of any particular
//! document part: the unified error type, the invariant numeric codec used
//! for every attribute value, the generic XML tree, and the secure
//! credential buffer used by the protection helpers.

pub mod error;
pub mod numeric;
pub mod secure;
pub mod xml;

pub use error::{Error, Result};
