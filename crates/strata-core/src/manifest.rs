use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use semver::VersionReq;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use strata_util::errors::StrataError;

use crate::package::PackageVersion;
use crate::version;

/// The parsed representation of a `Strata.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectMetadata,

    #[serde(default, rename = "source", skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,

    #[serde(default, rename = "runtime-environment")]
    pub runtime_environment: RuntimeEnvironment,

    #[serde(default)]
    pub dependencies: DependencyTable,

    #[serde(default, rename = "dev-dependencies")]
    pub dev_dependencies: DependencyTable,
}

/// Project identity from the `[project]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A package index the project resolves against, from `[[source]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default = "default_verify_ssl", rename = "verify-ssl")]
    pub verify_ssl: bool,
}

fn default_verify_ssl() -> bool {
    true
}

/// Target environment constraints from `[runtime-environment]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEnvironment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, rename = "operating-system", skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<OperatingSystem>,
    #[serde(default, rename = "runtime-version", skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingSystem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A dependency specification: a bare requirement string or a detailed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Short(String),
    Detailed(DetailedDependency),
}

/// A dependency with an explicit requirement and optional index pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedDependency {
    #[serde(default = "any_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

fn any_version() -> String {
    "*".to_string()
}

impl DependencySpec {
    pub fn requirement(&self) -> &str {
        match self {
            Self::Short(req) => req,
            Self::Detailed(d) => &d.version,
        }
    }

    /// Name of the `[[source]]` this dependency is pinned to, if any.
    pub fn index(&self) -> Option<&str> {
        match self {
            Self::Short(_) => None,
            Self::Detailed(d) => d.index.as_deref(),
        }
    }
}

/// Dependency declarations in the order they appear in the manifest.
///
/// Declaration order is the order in which the resolver visits direct
/// dependencies, so it must survive a parse/serialize cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyTable(Vec<(String, DependencySpec)>);

impl DependencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a declaration, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, spec: DependencySpec) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = spec,
            None => self.0.push((name, spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DependencySpec> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DependencySpec)> {
        self.0.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DependencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spec) in &self.0 {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DependencyTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = DependencyTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of dependency declarations")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = DependencyTable::new();
                while let Some((name, spec)) = access.next_entry::<String, DependencySpec>()? {
                    table.insert(name, spec);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// What a project declaration admits for one direct dependency: a version
/// requirement and, when pinned to a `[[source]]`, that source's URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredConstraint {
    pub requirement: VersionReq,
    pub index: Option<String>,
}

impl DeclaredConstraint {
    pub fn admits(&self, package: &PackageVersion) -> bool {
        version::matches(&self.requirement, &package.version)
            && self.index.as_ref().map_or(true, |i| *i == package.index)
    }
}

impl Manifest {
    /// A manifest with only a project name and no dependencies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project: ProjectMetadata {
                name: name.into(),
                description: None,
            },
            sources: Vec::new(),
            runtime_environment: RuntimeEnvironment::default(),
            dependencies: DependencyTable::new(),
            dev_dependencies: DependencyTable::new(),
        }
    }

    /// Load and parse a `Strata.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    /// Parse a `Strata.toml` from a string.
    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            StrataError::Manifest {
                message: format!("Failed to parse Strata.toml: {e}"),
            }
            .into()
        })
    }

    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Direct dependency names: runtime declarations first, then development
    /// declarations not already declared as runtime, each in declaration order.
    pub fn direct_dependency_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dependencies.names().map(str::to_string).collect();
        for name in self.dev_dependencies.names() {
            if !self.dependencies.contains(name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// The declaration for a direct dependency, runtime section first.
    pub fn declaration(&self, name: &str) -> Option<&DependencySpec> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
    }

    /// Declared constraint of every direct dependency. A pin naming an
    /// unknown source is compared as a literal URL.
    pub fn declared_constraints(&self) -> Result<HashMap<String, DeclaredConstraint>, StrataError> {
        let mut declared = HashMap::new();
        for name in self.direct_dependency_names() {
            let Some(spec) = self.declaration(&name) else {
                continue;
            };
            let requirement = version::parse_requirement(spec.requirement())?;
            let index = spec
                .index()
                .map(|pin| self.source_url(pin).unwrap_or(pin).to_string());
            declared.insert(name, DeclaredConstraint { requirement, index });
        }
        Ok(declared)
    }

    /// URL of a named `[[source]]`.
    pub fn source_url(&self, name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.url.as_str())
    }
}
