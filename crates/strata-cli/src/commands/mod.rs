//! Command dispatch and handler modules.

mod advise;
mod generate;

use std::path::{Path, PathBuf};

use miette::Result;

use strata_core::config::GlobalConfig;
use strata_core::MANIFEST_FILE;
use strata_util::errors::StrataError;
use strata_util::fs::find_ancestor_with;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = GlobalConfig::load()?;
    match cli.command {
        Command::Generate {
            destination,
            seed,
            decision,
            dry_run,
            context,
            count,
            project,
            catalog,
        } => generate::exec(
            &config,
            generate::Args {
                destination,
                seed,
                decision,
                dry_run,
                context,
                count,
                project,
                catalog,
            },
        ),
        Command::Advise {
            limit,
            beam_width,
            seed,
            project,
            catalog,
        } => advise::exec(&config, limit, beam_width, seed, project, catalog),
    }
}

/// The project directory: as given, or the nearest ancestor of the working
/// directory holding a manifest.
fn project_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        if !dir.join(MANIFEST_FILE).is_file() {
            return Err(StrataError::Manifest {
                message: format!("No {MANIFEST_FILE} found in {}", dir.display()),
            }
            .into());
        }
        return Ok(dir);
    }
    let cwd = std::env::current_dir().map_err(StrataError::Io)?;
    find_ancestor_with(&cwd, MANIFEST_FILE).ok_or_else(|| {
        StrataError::Manifest {
            message: format!("No {MANIFEST_FILE} found in current directory or any parent"),
        }
        .into()
    })
}

/// Catalog file: the flag, then the configured path, then `catalog.toml`
/// next to the manifest.
fn catalog_path(explicit: Option<PathBuf>, config: &GlobalConfig, root: &Path) -> PathBuf {
    let path = explicit
        .or_else(|| config.index.catalog.clone())
        .unwrap_or_else(|| root.join("catalog.toml"));
    tracing::debug!("Using catalog {}", path.display());
    path
}
