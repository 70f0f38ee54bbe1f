//! Handler for `strata generate`.

use std::path::PathBuf;

use miette::Result;

use strata_core::config::GlobalConfig;
use strata_ops::open_index;
use strata_ops::ops_generate::{self, GenerateOptions};
use strata_util::progress;

pub struct Args {
    pub destination: String,
    pub seed: Option<u64>,
    pub decision: String,
    pub dry_run: bool,
    pub context: Option<String>,
    pub count: Option<i64>,
    pub project: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

pub fn exec(config: &GlobalConfig, args: Args) -> Result<()> {
    let root = super::project_root(args.project)?;
    let catalog = super::catalog_path(args.catalog, config, &root);
    let index = open_index(&catalog, config.index.warehouse.as_deref())?;

    let options = GenerateOptions {
        destination: args.destination,
        seed: args.seed,
        decision: args.decision,
        dry_run: args.dry_run,
        context: args.context,
        count: args.count,
        sampling_probability: config.generator.sampling_probability,
    };

    let report = ops_generate::generate(&root, &*index, &options)?;

    if options.dry_run {
        progress::status_warn(
            "Dry run",
            &format!("{} stack(s) computed, nothing written", report.computed),
        );
    } else {
        progress::status(
            "Generated",
            &format!(
                "{} stack(s), {} recorded",
                report.computed,
                report.output.len()
            ),
        );
        for entry in &report.output {
            progress::status("Output", entry);
        }
    }
    Ok(())
}
