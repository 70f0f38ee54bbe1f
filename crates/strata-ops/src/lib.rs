pub mod ops_advise;
pub mod ops_generate;
pub mod validation;
pub mod warehouse;

use std::path::Path;

use strata_core::index::{CatalogIndex, PackageIndex};
use strata_util::errors::StrataError;

use crate::warehouse::WarehouseHashes;

/// Open the package index for a run: the catalog file, with digests looked
/// up from a warehouse when one is configured.
pub fn open_index(catalog: &Path, warehouse: Option<&str>) -> miette::Result<Box<dyn PackageIndex>> {
    let catalog = CatalogIndex::from_path(catalog)?;
    match warehouse {
        Some(url) => {
            tracing::debug!("Looking up digests from {url}");
            Ok(Box::new(WarehouseHashes::new(catalog, url)?))
        }
        None => Ok(Box::new(catalog)),
    }
}

/// Blocking HTTP client shared by the validation and warehouse adapters.
pub(crate) fn http_client() -> Result<reqwest::blocking::Client, StrataError> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("strata/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| StrataError::Network {
            message: format!("Failed to build HTTP client: {e}"),
        })
}
