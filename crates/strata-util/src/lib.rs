//! Shared utilities for strata.
//!
//! Cross-cutting concerns used by every other strata crate: the unified
//! error type, filesystem helpers, hashing and terminal status output.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
