//! Operation: resolve the best-scoring stacks for a project.

use std::path::Path;
use std::sync::Arc;

use strata_core::config::UnitEntry;
use strata_core::index::PackageIndex;
use strata_core::project::Project;
use strata_resolver::context::Context;
use strata_resolver::graph::DependencyGraph;
use strata_resolver::resolver::{Resolution, Resolver};
use strata_resolver::unit::{Pipeline, RunKind};
use strata_util::errors::StrataError;

/// Options for `strata advise`.
#[derive(Debug, Clone)]
pub struct AdviseOptions {
    /// Stop after this many finished stacks.
    pub limit: usize,
    pub beam_width: usize,
    pub seed: Option<u64>,
    /// Explicitly configured units, constructed before auto-inclusion.
    pub units: Vec<UnitEntry>,
}

impl Default for AdviseOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            beam_width: 5000,
            seed: None,
            units: Vec::new(),
        }
    }
}

/// Run the resolver over `project`.
pub fn advise_project(
    project: Project,
    index: &dyn PackageIndex,
    options: &AdviseOptions,
) -> miette::Result<Resolution> {
    if options.limit == 0 {
        return Err(StrataError::configuration("limit must be a positive number").into());
    }
    let pipeline = Pipeline::build(&project, RunKind::Resolve, &options.units)?;
    let graph = DependencyGraph::from_project(&project, index)?;
    let context = Context::new(project, Arc::new(graph), options.beam_width, options.seed);
    let resolver = Resolver::new(context, pipeline)?;
    Ok(resolver.resolve(Some(options.limit), |_| false))
}

/// Resolve the project at `project_root`.
pub fn advise(
    project_root: &Path,
    index: &dyn PackageIndex,
    options: &AdviseOptions,
) -> miette::Result<Resolution> {
    let project = Project::from_dir(project_root)?;
    advise_project(project, index, options)
}
