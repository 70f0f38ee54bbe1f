use serde::Deserialize;

use strata_util::errors::StrataError;

use crate::context::Context;
use crate::state::State;
use crate::unit::{validate, BuilderContext, Stride, Unit, UnitFactory, UnitInstance, UnitKind, Verdict};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdConfiguration {
    min_score: f64,
}

/// Discards finished stacks scoring below `min_score`.
pub struct ScoreThresholdStride {
    min_score: f64,
}

impl UnitFactory for ScoreThresholdStride {
    const NAME: &'static str = "ScoreThresholdStride";
    const KIND: UnitKind = UnitKind::Stride;

    fn should_include(_context: &BuilderContext<'_>) -> Option<toml::Table> {
        None
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        let config: ThresholdConfiguration = validate(Self::NAME, configuration)?;
        Ok(UnitInstance::Stride(Box::new(ScoreThresholdStride {
            min_score: config.min_score,
        })))
    }
}

impl Unit for ScoreThresholdStride {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl Stride for ScoreThresholdStride {
    fn run(&mut self, _context: &Context, state: State<'_>) -> Verdict {
        if state.score() < self.min_score {
            tracing::debug!(
                "Discarding state {} with score {} below {}",
                state.id().index(),
                state.score(),
                self.min_score
            );
            return Verdict::Reject;
        }
        Verdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::index::CatalogIndex;
    use strata_core::package::PackageVersion;

    use crate::state::StateArena;
    use crate::units::testing;

    #[test]
    fn rejects_states_below_threshold() {
        let context = testing::context(&CatalogIndex::new(), &[]);
        let mut arena = StateArena::new();
        let root = arena.root(vec!["a".to_string(), "b".to_string()]);
        let low = arena
            .expand(root, "a", PackageVersion::new("a", "1.0", "i"), 0.2, vec![])
            .unwrap();
        let high = arena
            .expand(root, "a", PackageVersion::new("a", "2.0", "i"), 0.9, vec![])
            .unwrap();

        let UnitInstance::Stride(mut stride) =
            ScoreThresholdStride::from_configuration("min_score = 0.5".parse().unwrap()).unwrap()
        else {
            panic!("expected a stride");
        };
        assert_eq!(stride.run(&context, arena.get(low)), Verdict::Reject);
        assert_eq!(stride.run(&context, arena.get(high)), Verdict::Accept);
    }

    #[test]
    fn threshold_is_required() {
        assert!(ScoreThresholdStride::from_configuration(toml::Table::new()).is_err());
    }
}
