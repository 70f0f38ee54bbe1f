//! Artifact digests from a warehouse-style JSON API.

use std::collections::BTreeMap;

use serde::Deserialize;

use strata_core::index::{DigestEntry, PackageIndex};
use strata_core::package::{PackageVersion, Requirement};
use strata_util::errors::StrataError;

#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    #[serde(default)]
    digests: BTreeMap<String, String>,
}

/// Wraps another index, answering `get_hashes` from
/// `GET {base}/{name}/{version}/json`.
pub struct WarehouseHashes<I> {
    inner: I,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl<I: PackageIndex> WarehouseHashes<I> {
    pub fn new(inner: I, base_url: &str) -> miette::Result<Self> {
        let client = crate::http_client()?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn release_url(&self, name: &str, version: &str) -> String {
        format!("{}/{name}/{version}/json", self.base_url)
    }
}

/// Extract the sha256 digest of every release file, in listing order.
pub fn parse_release_digests(body: &str) -> Result<Vec<DigestEntry>, StrataError> {
    let info: ReleaseInfo = serde_json::from_str(body).map_err(|e| StrataError::Index {
        message: format!("Malformed release metadata: {e}"),
    })?;
    Ok(info
        .urls
        .into_iter()
        .filter_map(|file| file.digests.get("sha256").cloned())
        .map(|value| DigestEntry::from([("sha256".to_string(), value)]))
        .collect())
}

impl<I: PackageIndex> PackageIndex for WarehouseHashes<I> {
    fn versions(&self, name: &str) -> miette::Result<Vec<PackageVersion>> {
        self.inner.versions(name)
    }

    fn requirements(&self, package: &PackageVersion) -> miette::Result<Vec<Requirement>> {
        self.inner.requirements(package)
    }

    fn get_hashes(&self, name: &str, version: &str) -> miette::Result<Vec<DigestEntry>> {
        let url = self.release_url(name, version);
        tracing::debug!("Fetching digests from {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| StrataError::Network {
                message: format!("Failed to fetch {url}: {e}"),
            })?;
        if !resp.status().is_success() {
            return Err(StrataError::Index {
                message: format!("HTTP {} for {url}", resp.status()),
            }
            .into());
        }
        let body = resp.text().map_err(|e| StrataError::Network {
            message: format!("Read error for {url}: {e}"),
        })?;
        Ok(parse_release_digests(&body)?)
    }
}
