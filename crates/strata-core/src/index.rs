//! The package index contract and a file-backed catalog implementing it.
//!
//! The resolver and the stack generator never talk to a package index
//! directly; they go through [`PackageIndex`], which answers three questions:
//! which versions of a package exist, what each version requires, and which
//! artifact digests belong to a version.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use strata_util::errors::StrataError;

use crate::manifest::{DependencySpec, DependencyTable};
use crate::package::{PackageVersion, Requirement};

/// One artifact digest set, keyed by algorithm name (`sha256`, ...).
pub type DigestEntry = BTreeMap<String, String>;

pub trait PackageIndex {
    /// All known versions of `name`, in the order the index publishes them.
    fn versions(&self, name: &str) -> miette::Result<Vec<PackageVersion>>;

    /// Names and version requirements declared by one package version.
    fn requirements(&self, package: &PackageVersion) -> miette::Result<Vec<Requirement>>;

    /// Artifact digests for `name==version`.
    fn get_hashes(&self, name: &str, version: &str) -> miette::Result<Vec<DigestEntry>>;
}

impl<T: PackageIndex + ?Sized> PackageIndex for &T {
    fn versions(&self, name: &str) -> miette::Result<Vec<PackageVersion>> {
        (**self).versions(name)
    }

    fn requirements(&self, package: &PackageVersion) -> miette::Result<Vec<Requirement>> {
        (**self).requirements(package)
    }

    fn get_hashes(&self, name: &str, version: &str) -> miette::Result<Vec<DigestEntry>> {
        (**self).get_hashes(name, version)
    }
}

/// A static package universe loaded from a TOML catalog file.
///
/// ```toml
/// [[package]]
/// name = "flask"
/// version = "1.1.0"
/// index = "https://pypi.org/simple"
/// hashes = [{ sha256 = "..." }]
///
/// [package.requires]
/// werkzeug = ">=0.15"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogIndex {
    #[serde(default, rename = "package")]
    pub packages: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub version: String,
    #[serde(default = "default_index")]
    pub index: String,
    /// Requirements in the order the catalog lists them.
    #[serde(default)]
    pub requires: DependencyTable,
    #[serde(default)]
    pub hashes: Vec<DigestEntry>,
}

fn default_index() -> String {
    "https://pypi.org/simple".to_string()
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::Index {
            message: format!("Failed to read catalog {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            StrataError::Index {
                message: format!("Failed to parse catalog: {e}"),
            }
            .into()
        })
    }

    /// Builder-style helper for assembling catalogs in code.
    pub fn with_package(
        mut self,
        name: &str,
        version: &str,
        requires: &[(&str, &str)],
    ) -> Self {
        let mut table = DependencyTable::new();
        for (n, r) in requires {
            table.insert(*n, DependencySpec::Short(r.to_string()));
        }
        self.packages.push(CatalogEntry {
            name: name.to_string(),
            version: version.to_string(),
            index: default_index(),
            requires: table,
            hashes: Vec::new(),
        });
        self
    }

    /// Attach a digest entry to an already-added package.
    pub fn with_hash(mut self, name: &str, version: &str, algorithm: &str, value: &str) -> Self {
        if let Some(entry) = self
            .packages
            .iter_mut()
            .find(|e| e.name == name && e.version == version)
        {
            entry
                .hashes
                .push(BTreeMap::from([(algorithm.to_string(), value.to_string())]));
        }
        self
    }

    fn entry(&self, name: &str, version: &str) -> Option<&CatalogEntry> {
        self.packages
            .iter()
            .find(|e| e.name == name && e.version == version)
    }
}

impl PackageIndex for CatalogIndex {
    fn versions(&self, name: &str) -> miette::Result<Vec<PackageVersion>> {
        Ok(self
            .packages
            .iter()
            .filter(|e| e.name == name)
            .map(|e| PackageVersion::new(&e.name, &e.version, &e.index))
            .collect())
    }

    fn requirements(&self, package: &PackageVersion) -> miette::Result<Vec<Requirement>> {
        let entry = self
            .entry(&package.name, &package.version)
            .ok_or_else(|| StrataError::Index {
                message: format!("{} is not in the catalog", package.key()),
            })?;
        Ok(entry
            .requires
            .iter()
            .map(|(name, spec)| Requirement::new(name, spec.requirement()))
            .collect())
    }

    fn get_hashes(&self, name: &str, version: &str) -> miette::Result<Vec<DigestEntry>> {
        self.entry(name, version)
            .map(|e| e.hashes.clone())
            .ok_or_else(|| {
                StrataError::Index {
                    message: format!("{name}=={version} is not in the catalog"),
                }
                .into()
            })
    }
}
