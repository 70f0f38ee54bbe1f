use std::cmp::Ordering;

use rand::Rng;
use serde::Deserialize;

use strata_core::package::PackageVersion;
use strata_core::version;
use strata_util::errors::StrataError;

use crate::context::Context;
use crate::state::{Justification, State};
use crate::unit::{
    validate, BuilderContext, Step, StepResult, Unit, UnitFactory, UnitInstance, UnitKind,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoConfiguration {}

/// Rejects a candidate that conflicts with a package the state already
/// resolved, in either direction.
pub struct RequirementsStep;

impl UnitFactory for RequirementsStep {
    const NAME: &'static str = "RequirementsStep";
    const KIND: UnitKind = UnitKind::Step;

    fn should_include(context: &BuilderContext<'_>) -> Option<toml::Table> {
        (context.is_resolving() && !context.is_included(Self::NAME)).then(toml::Table::new)
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        validate::<NoConfiguration>(Self::NAME, configuration)?;
        Ok(UnitInstance::Step(Box::new(RequirementsStep)))
    }
}

impl Unit for RequirementsStep {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl Step for RequirementsStep {
    fn run(
        &mut self,
        context: &Context,
        state: State<'_>,
        candidate: &PackageVersion,
    ) -> Option<StepResult> {
        let conflict = state
            .resolved()
            .into_iter()
            .find(|resolved| !context.graph.compatible(resolved, candidate));
        match conflict {
            Some(resolved) => {
                tracing::debug!("{} conflicts with {}", candidate.key(), resolved.key());
                None
            }
            None => Some(StepResult::neutral()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LatestConfiguration {
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Prefers newer releases: the newest candidate of a name scores `weight`,
/// older ones proportionally less.
pub struct LatestVersionStep {
    weight: f64,
}

impl LatestVersionStep {
    fn rank(context: &Context, candidate: &PackageVersion) -> (usize, usize) {
        let candidates = context.graph.candidates(&candidate.name);
        let newer = candidates
            .iter()
            .filter(|c| version::compare(&c.version, &candidate.version) == Ordering::Greater)
            .count();
        (newer, candidates.len().max(1))
    }
}

impl UnitFactory for LatestVersionStep {
    const NAME: &'static str = "LatestVersionStep";
    const KIND: UnitKind = UnitKind::Step;

    fn should_include(context: &BuilderContext<'_>) -> Option<toml::Table> {
        (context.is_resolving() && !context.is_included(Self::NAME)).then(toml::Table::new)
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        let config: LatestConfiguration = validate(Self::NAME, configuration)?;
        Ok(UnitInstance::Step(Box::new(LatestVersionStep {
            weight: config.weight,
        })))
    }
}

impl Unit for LatestVersionStep {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl Step for LatestVersionStep {
    fn run(
        &mut self,
        context: &Context,
        _state: State<'_>,
        candidate: &PackageVersion,
    ) -> Option<StepResult> {
        let (rank, count) = Self::rank(context, candidate);
        let score = self.weight * (1.0 - rank as f64 / count as f64);
        Some(StepResult::scored(score))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetScoreConfiguration {
    package_name: String,
    #[serde(default)]
    package_version: Option<String>,
    #[serde(default)]
    index_url: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

/// Assigns a fixed score to one package, optionally restricted to a single
/// version and index. Candidates of that package not matching the
/// restriction are rejected. Without a configured score one is drawn from
/// the run's generator.
pub struct SetScoreStep {
    package_name: String,
    package_version: Option<String>,
    index_url: Option<String>,
    score: Option<f64>,
}

impl UnitFactory for SetScoreStep {
    const NAME: &'static str = "SetScoreStep";
    const KIND: UnitKind = UnitKind::Step;

    fn should_include(_context: &BuilderContext<'_>) -> Option<toml::Table> {
        None
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        let config: SetScoreConfiguration = validate(Self::NAME, configuration)?;
        Ok(UnitInstance::Step(Box::new(SetScoreStep {
            package_name: config.package_name,
            package_version: config.package_version,
            index_url: config.index_url,
            score: config.score,
        })))
    }
}

impl Unit for SetScoreStep {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn pre_run(&mut self, context: &mut Context) -> Result<(), StrataError> {
        if self.score.is_none() {
            let drawn = context.rng.gen_range(-1.0..1.0);
            tracing::debug!("Drew score {drawn} for {}", self.package_name);
            self.score = Some(drawn);
        }
        Ok(())
    }
}

impl Step for SetScoreStep {
    fn run(
        &mut self,
        _context: &Context,
        _state: State<'_>,
        candidate: &PackageVersion,
    ) -> Option<StepResult> {
        if candidate.name != self.package_name {
            return Some(StepResult::neutral());
        }
        if self
            .package_version
            .as_ref()
            .is_some_and(|v| *v != candidate.version)
        {
            return None;
        }
        if self.index_url.as_ref().is_some_and(|i| *i != candidate.index) {
            return None;
        }
        let score = self.score.unwrap_or_default();
        Some(
            StepResult::scored(score).with_justification(
                Justification::info(format!("Score set to {score}"))
                    .for_package(candidate.key()),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::index::CatalogIndex;

    use crate::state::StateArena;
    use crate::units::testing;

    fn step(instance: UnitInstance) -> Box<dyn Step> {
        match instance {
            UnitInstance::Step(s) => s,
            other => panic!("unexpected unit {other:?}"),
        }
    }

    fn candidate(context: &Context, name: &str, version: &str) -> PackageVersion {
        context
            .graph
            .candidates(name)
            .into_iter()
            .find(|c| c.version == version)
            .cloned()
            .unwrap()
    }

    fn flask_catalog() -> CatalogIndex {
        CatalogIndex::new()
            .with_package("flask", "1.0.0", &[("werkzeug", ">=0.14")])
            .with_package("flask", "0.12.0", &[("werkzeug", "<0.14")])
            .with_package("werkzeug", "0.15.0", &[])
            .with_package("werkzeug", "0.13.0", &[])
    }

    #[test]
    fn requirements_step_rejects_conflicting_candidates() {
        let context = testing::context(&flask_catalog(), &[("flask", "*")]);
        let mut arena = StateArena::new();
        let root = arena.root(vec!["flask".to_string()]);
        let flask = candidate(&context, "flask", "1.0.0");
        let resolved = arena
            .expand_with(root, "flask", flask, 0.0, vec![], vec!["werkzeug".to_string()])
            .unwrap();

        let mut unit = step(RequirementsStep::from_configuration(toml::Table::new()).unwrap());
        let new = candidate(&context, "werkzeug", "0.15.0");
        let old = candidate(&context, "werkzeug", "0.13.0");
        assert!(unit.run(&context, arena.get(resolved), &new).is_some());
        assert!(unit.run(&context, arena.get(resolved), &old).is_none());
    }

    #[test]
    fn latest_version_step_ranks_newest_highest() {
        let context = testing::context(&flask_catalog(), &[("flask", "*")]);
        let mut arena = StateArena::new();
        let root = arena.root(vec!["flask".to_string()]);
        let mut unit = step(LatestVersionStep::from_configuration(toml::Table::new()).unwrap());

        let newest = unit
            .run(&context, arena.get(root), &candidate(&context, "flask", "1.0.0"))
            .unwrap();
        let oldest = unit
            .run(&context, arena.get(root), &candidate(&context, "flask", "0.12.0"))
            .unwrap();
        assert_eq!(newest.score, 1.0);
        assert_eq!(oldest.score, 0.5);
    }

    #[test]
    fn set_score_step_scores_matching_package() {
        let mut context = testing::context(&flask_catalog(), &[("flask", "*")]);
        let mut arena = StateArena::new();
        let root = arena.root(vec!["flask".to_string()]);
        let mut unit = step(
            SetScoreStep::from_configuration(
                "package_name = \"flask\"\npackage_version = \"1.0.0\"\nscore = 0.75"
                    .parse()
                    .unwrap(),
            )
            .unwrap(),
        );
        unit.pre_run(&mut context).unwrap();

        let hit = unit
            .run(&context, arena.get(root), &candidate(&context, "flask", "1.0.0"))
            .unwrap();
        assert_eq!(hit.score, 0.75);
        assert_eq!(hit.justification.len(), 1);
        assert!(unit
            .run(&context, arena.get(root), &candidate(&context, "flask", "0.12.0"))
            .is_none());
        let other = unit
            .run(&context, arena.get(root), &candidate(&context, "werkzeug", "0.15.0"))
            .unwrap();
        assert_eq!(other, StepResult::neutral());
    }

    #[test]
    fn set_score_step_rejects_other_index() {
        let context = testing::context(&flask_catalog(), &[("flask", "*")]);
        let mut arena = StateArena::new();
        let root = arena.root(vec!["flask".to_string()]);
        let mut unit = step(
            SetScoreStep::from_configuration(
                "package_name = \"flask\"\nindex_url = \"https://mirror.example/simple\"\nscore = 1.0"
                    .parse()
                    .unwrap(),
            )
            .unwrap(),
        );
        assert!(unit
            .run(&context, arena.get(root), &candidate(&context, "flask", "1.0.0"))
            .is_none());
    }

    #[test]
    fn set_score_step_draws_score_in_range() {
        let mut context = testing::context(&flask_catalog(), &[("flask", "*")]);
        let mut arena = StateArena::new();
        let root = arena.root(vec!["flask".to_string()]);
        let mut unit = step(SetScoreStep::from_configuration("package_name = \"flask\"".parse().unwrap()).unwrap());
        unit.pre_run(&mut context).unwrap();
        let result = unit
            .run(&context, arena.get(root), &candidate(&context, "flask", "0.12.0"))
            .unwrap();
        assert!((-1.0..1.0).contains(&result.score));
    }

    #[test]
    fn set_score_step_requires_package_name() {
        let err = SetScoreStep::from_configuration("score = 1.0".parse().unwrap()).unwrap_err();
        assert!(matches!(err, StrataError::UnitConfiguration { .. }));
    }

    #[test]
    fn set_score_step_is_never_auto_included() {
        let project = strata_core::project::Project::new(strata_core::manifest::Manifest::new("x"));
        let context = BuilderContext::new(&project, crate::unit::RunKind::Resolve);
        assert!(SetScoreStep::should_include(&context).is_none());
    }
}
