use std::fmt;

use serde::{Deserialize, Serialize};

/// A single version of a package as published on a package index.
///
/// Identity is `(name, version, index)`. The hash list is the only part that
/// is ever mutated after creation, and only by appending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageVersion {
    pub name: String,
    pub version: String,
    pub index: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashes: Vec<String>,
    /// Only required by development dependencies.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub develop: bool,
}

impl PackageVersion {
    pub fn new(name: impl Into<String>, version: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            index: index.into(),
            hashes: Vec::new(),
            develop: false,
        }
    }

    pub fn locked_version(&self) -> &str {
        &self.version
    }

    /// `name==version`, the form used in log messages and justifications.
    pub fn key(&self) -> String {
        format!("{}=={}", self.name, self.version)
    }

    /// Whether two entries refer to the same published artifact, ignoring hashes.
    pub fn same_release(&self, other: &PackageVersion) -> bool {
        self.name == other.name && self.version == other.version && self.index == other.index
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={} ({})", self.name, self.version, self.index)
    }
}

/// A dependency edge declared by a package version: the required name and
/// the version requirement it imposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    #[serde(default = "any_version")]
    pub version: String,
}

impl Requirement {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

fn any_version() -> String {
    "*".to_string()
}
