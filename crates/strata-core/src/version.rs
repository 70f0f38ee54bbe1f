//! Lenient version parsing and requirement matching.
//!
//! Package indexes publish versions that are not always strict semver
//! (`2.0`, `1`, `1.0.0rc1`). Missing numeric components are padded with zeros
//! before handing the string to `semver`; anything that still fails to parse
//! is treated as opaque and only matches the wildcard requirement.

use std::cmp::Ordering;

use semver::{Version, VersionReq};

use strata_util::errors::StrataError;

/// Parse a version string, padding `1` / `1.2` to `1.0.0` / `1.2.0`.
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim().trim_start_matches('v');
    if let Ok(v) = Version::parse(trimmed) {
        return Some(v);
    }
    let (core, rest) = match trimmed.find(|c: char| c == '-' || c == '+') {
        Some(pos) => trimmed.split_at(pos),
        None => (trimmed, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.parse::<u64>().is_err()) {
        return None;
    }
    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    Version::parse(&format!("{padded}{rest}")).ok()
}

/// Parse a requirement string. An empty string and `*` both mean "any version".
pub fn parse_requirement(requirement: &str) -> Result<VersionReq, StrataError> {
    let trimmed = requirement.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(trimmed).map_err(|e| StrataError::Manifest {
        message: format!("Invalid version requirement '{requirement}': {e}"),
    })
}

/// Whether `version` satisfies `requirement`.
///
/// Versions that cannot be parsed satisfy only the wildcard.
pub fn matches(requirement: &VersionReq, version: &str) -> bool {
    if *requirement == VersionReq::STAR {
        return true;
    }
    parse_version(version).is_some_and(|v| requirement.matches(&v))
}

pub fn is_prerelease(version: &str) -> bool {
    parse_version(version).is_some_and(|v| !v.pre.is_empty())
}

/// Order two version strings, newest last. Unparseable versions sort first.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}
