//! Handler for `strata advise`.

use std::path::PathBuf;

use console::Style;
use miette::Result;

use strata_core::config::GlobalConfig;
use strata_ops::open_index;
use strata_ops::ops_advise::{self, AdviseOptions};
use strata_util::progress;

pub fn exec(
    config: &GlobalConfig,
    limit: Option<usize>,
    beam_width: Option<usize>,
    seed: Option<u64>,
    project: Option<PathBuf>,
    catalog: Option<PathBuf>,
) -> Result<()> {
    let root = super::project_root(project)?;
    let catalog = super::catalog_path(catalog, config, &root);
    let index = open_index(&catalog, config.index.warehouse.as_deref())?;

    let options = AdviseOptions {
        limit: limit.unwrap_or(config.resolver.limit),
        beam_width: beam_width.unwrap_or(config.resolver.beam_width),
        seed,
        units: config.pipeline.units.clone(),
    };

    let pb = progress::spinner("Resolving stacks...");
    let result = ops_advise::advise(&root, &*index, &options);
    pb.finish_and_clear();
    let resolution = result?;

    if resolution.finished.is_empty() {
        progress::status_warn("Advise", "no stack satisfies the project");
        return Ok(());
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();
    for (rank, state) in resolution.ranked().into_iter().enumerate() {
        println!(
            "{} score {:.4}",
            bold.apply_to(format!("#{}", rank + 1)),
            state.score
        );
        for package in &state.packages {
            let dev = if package.develop { " (dev)" } else { "" };
            println!("  {}=={}{dev}", package.name, package.version);
        }
        for entry in &state.justification {
            println!("  {}", dim.apply_to(entry));
        }
        for note in &state.notes {
            println!("  {}", dim.apply_to(note));
        }
    }
    progress::status(
        "Resolved",
        &format!(
            "{} stack(s): {} produced, {} discarded, {} pruned",
            resolution.finished.len(),
            resolution.produced,
            resolution.discarded,
            resolution.pruned
        ),
    );
    Ok(())
}
