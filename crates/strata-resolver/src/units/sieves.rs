use std::collections::HashMap;

use serde::Deserialize;

use strata_core::manifest::DeclaredConstraint;
use strata_core::version;
use strata_util::errors::StrataError;

use crate::context::Context;
use crate::unit::{
    validate, BuilderContext, Candidates, Sieve, Unit, UnitFactory, UnitInstance, UnitKind,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoConfiguration {}

/// Drops candidates of a direct dependency that the project's own
/// declaration does not admit, by version requirement or pinned source.
#[derive(Default)]
pub struct ConstraintSieve {
    declared: HashMap<String, DeclaredConstraint>,
}

impl UnitFactory for ConstraintSieve {
    const NAME: &'static str = "ConstraintSieve";
    const KIND: UnitKind = UnitKind::Sieve;

    fn should_include(context: &BuilderContext<'_>) -> Option<toml::Table> {
        (context.is_resolving() && !context.is_included(Self::NAME)).then(toml::Table::new)
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        validate::<NoConfiguration>(Self::NAME, configuration)?;
        Ok(UnitInstance::Sieve(Box::<ConstraintSieve>::default()))
    }
}

impl Unit for ConstraintSieve {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn pre_run(&mut self, context: &mut Context) -> Result<(), StrataError> {
        self.declared = context.project.manifest.declared_constraints()?;
        Ok(())
    }
}

impl Sieve for ConstraintSieve {
    fn run<'a>(&'a self, _context: &'a Context, candidates: Candidates<'a>) -> Candidates<'a> {
        Box::new(candidates.filter(move |c| {
            let admitted = self.declared.get(&c.name).map_or(true, |d| d.admits(c));
            if !admitted {
                tracing::debug!("{} is not admitted by the project declaration", c.key());
            }
            admitted
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PrereleaseConfiguration {
    #[serde(default)]
    allow_prereleases: bool,
}

/// Drops pre-release versions unless explicitly allowed.
pub struct PrereleaseSieve {
    allow_prereleases: bool,
}

impl UnitFactory for PrereleaseSieve {
    const NAME: &'static str = "PrereleaseSieve";
    const KIND: UnitKind = UnitKind::Sieve;

    fn should_include(context: &BuilderContext<'_>) -> Option<toml::Table> {
        (context.is_resolving() && !context.is_included(Self::NAME)).then(toml::Table::new)
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        let config: PrereleaseConfiguration = validate(Self::NAME, configuration)?;
        Ok(UnitInstance::Sieve(Box::new(PrereleaseSieve {
            allow_prereleases: config.allow_prereleases,
        })))
    }
}

impl Unit for PrereleaseSieve {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl Sieve for PrereleaseSieve {
    fn run<'a>(&'a self, _context: &'a Context, candidates: Candidates<'a>) -> Candidates<'a> {
        if self.allow_prereleases {
            return candidates;
        }
        Box::new(candidates.filter(|c| !version::is_prerelease(&c.version)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::index::CatalogIndex;
    use strata_core::manifest::{DependencySpec, DetailedDependency, Source};

    use crate::units::testing;

    fn sieve(instance: UnitInstance) -> Box<dyn Sieve> {
        match instance {
            UnitInstance::Sieve(s) => s,
            other => panic!("unexpected unit {other:?}"),
        }
    }

    fn versions(context: &Context, sieve: &dyn Sieve, name: &str) -> Vec<String> {
        let candidates = Box::new(context.graph.candidates(name).into_iter().cloned());
        sieve.run(context, candidates).map(|c| c.version).collect()
    }

    #[test]
    fn constraint_sieve_applies_declared_requirement() {
        let catalog = CatalogIndex::new()
            .with_package("flask", "2.0.0", &[])
            .with_package("flask", "1.1.0", &[])
            .with_package("flask", "0.12.0", &[]);
        let mut context = testing::context(&catalog, &[("flask", ">=1, <2")]);
        let mut unit = sieve(ConstraintSieve::from_configuration(toml::Table::new()).unwrap());
        unit.pre_run(&mut context).unwrap();
        assert_eq!(versions(&context, unit.as_ref(), "flask"), vec!["1.1.0"]);
    }

    #[test]
    fn constraint_sieve_applies_source_pin() {
        let catalog = CatalogIndex::new()
            .with_package("flask", "2.0.0", &[])
            .with_package("flask", "1.0.0", &[]);
        let mut context = testing::context(&catalog, &[("flask", "*")]);
        let manifest = &mut context.project.manifest;
        manifest.sources.push(Source {
            name: "internal".into(),
            url: "https://mirror.example/simple".into(),
            verify_ssl: true,
        });
        manifest.dependencies.insert(
            "flask",
            DependencySpec::Detailed(DetailedDependency {
                version: "*".into(),
                index: Some("internal".into()),
            }),
        );
        let mut unit = sieve(ConstraintSieve::from_configuration(toml::Table::new()).unwrap());
        unit.pre_run(&mut context).unwrap();
        assert!(versions(&context, unit.as_ref(), "flask").is_empty());
    }

    #[test]
    fn constraint_sieve_ignores_transitive_names() {
        let catalog = CatalogIndex::new()
            .with_package("app", "1.0.0", &[("lib", "*")])
            .with_package("lib", "1.0.0", &[])
            .with_package("lib", "2.0.0", &[]);
        let mut context = testing::context(&catalog, &[("app", "*")]);
        let mut unit = sieve(ConstraintSieve::from_configuration(toml::Table::new()).unwrap());
        unit.pre_run(&mut context).unwrap();
        assert_eq!(versions(&context, unit.as_ref(), "lib"), vec!["1.0.0", "2.0.0"]);
    }

    #[test]
    fn constraint_sieve_takes_no_options() {
        let err = ConstraintSieve::from_configuration("strict = true".parse().unwrap()).unwrap_err();
        assert!(matches!(err, StrataError::UnitConfiguration { .. }));
    }

    #[test]
    fn prerelease_sieve_drops_prereleases_by_default() {
        let catalog = CatalogIndex::new()
            .with_package("numpy", "2.0.0-rc.1", &[])
            .with_package("numpy", "1.26.0", &[]);
        let context = testing::context(&catalog, &[("numpy", "*")]);
        let unit = sieve(PrereleaseSieve::from_configuration(toml::Table::new()).unwrap());
        assert_eq!(versions(&context, unit.as_ref(), "numpy"), vec!["1.26.0"]);

        let permissive =
            sieve(PrereleaseSieve::from_configuration("allow_prereleases = true".parse().unwrap()).unwrap());
        assert_eq!(versions(&context, permissive.as_ref(), "numpy").len(), 2);
    }
}
