//! Built-in pipeline units.

pub mod boots;
pub mod sieves;
pub mod steps;
pub mod strides;
pub mod wraps;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use strata_core::index::CatalogIndex;
    use strata_core::manifest::{DependencySpec, Manifest};
    use strata_core::project::Project;

    use crate::context::Context;
    use crate::graph::DependencyGraph;

    /// A seeded context over `catalog` for a project declaring `deps`.
    pub fn context(catalog: &CatalogIndex, deps: &[(&str, &str)]) -> Context {
        let mut manifest = Manifest::new("units");
        for (name, req) in deps {
            manifest
                .dependencies
                .insert(*name, DependencySpec::Short(req.to_string()));
        }
        let project = Project::new(manifest);
        let graph = DependencyGraph::from_project(&project, catalog).unwrap();
        Context::new(project, Arc::new(graph), 100, Some(7))
    }
}
