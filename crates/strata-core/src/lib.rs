//! Core data types for strata.
//!
//! This crate defines the types shared by the resolver and the stack
//! generator: projects (manifest plus optional lock), package versions,
//! version requirement matching, the package index contract with its
//! file-backed catalog, and global configuration.
//!
//! This crate is intentionally free of network I/O.

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "Strata.toml";

/// File name of the project lockfile.
pub const LOCK_FILE: &str = "Strata.lock";

/// Platform assumed when the runtime environment does not state one.
pub const DEFAULT_PLATFORM: &str = "linux-x86_64";

pub mod config;
pub mod index;
pub mod lockfile;
pub mod manifest;
pub mod package;
pub mod project;
pub mod version;
