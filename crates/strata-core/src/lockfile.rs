use std::path::Path;

use serde::{Deserialize, Serialize};

use strata_util::errors::StrataError;

use crate::package::PackageVersion;

/// Deterministic lockfile recording one pinned version per package.
///
/// Runtime and development packages are kept in separate ordered sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lockfile {
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageVersion>,
    #[serde(default, rename = "dev-package")]
    pub dev_packages: Vec<PackageVersion>,
}

impl Lockfile {
    /// Split pinned packages into runtime and development sections, preserving order.
    pub fn from_packages(packages: impl IntoIterator<Item = PackageVersion>) -> Self {
        let (dev_packages, packages) = packages.into_iter().partition(|p| p.develop);
        Self {
            packages,
            dev_packages,
        }
    }

    /// Load and parse a `Strata.lock` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::Manifest {
            message: format!("Failed to read lockfile: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            StrataError::Manifest {
                message: format!("Failed to parse lockfile: {e}"),
            }
            .into()
        })
    }

    /// Serialize the lockfile to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// All pinned packages, runtime section first.
    pub fn all_packages(&self) -> impl Iterator<Item = &PackageVersion> {
        self.packages.iter().chain(self.dev_packages.iter())
    }

    pub fn all_packages_mut(&mut self) -> impl Iterator<Item = &mut PackageVersion> {
        self.packages.iter_mut().chain(self.dev_packages.iter_mut())
    }

    pub fn find(&self, name: &str) -> Option<&PackageVersion> {
        self.all_packages().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.packages.len() + self.dev_packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
