use serde::Deserialize;

use strata_util::errors::StrataError;

use crate::context::Context;
use crate::state::FinishedState;
use crate::unit::{validate, BuilderContext, Unit, UnitFactory, UnitInstance, UnitKind, Wrap};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoConfiguration {}

/// Appends a one-line summary to every finished stack.
pub struct SummaryWrap;

impl UnitFactory for SummaryWrap {
    const NAME: &'static str = "SummaryWrap";
    const KIND: UnitKind = UnitKind::Wrap;

    fn should_include(context: &BuilderContext<'_>) -> Option<toml::Table> {
        (context.is_resolving() && !context.is_included(Self::NAME)).then(toml::Table::new)
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        validate::<NoConfiguration>(Self::NAME, configuration)?;
        Ok(UnitInstance::Wrap(Box::new(SummaryWrap)))
    }
}

impl Unit for SummaryWrap {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl Wrap for SummaryWrap {
    fn run(&mut self, _context: &Context, state: &mut FinishedState) {
        let develop = state.packages.iter().filter(|p| p.develop).count();
        state.notes.push(format!(
            "{} package(s) resolved ({} development), score {:.4}",
            state.packages.len(),
            develop,
            state.score
        ));
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
    fn appends_summary_note() {
        let context = testing::context(&CatalogIndex::new(), &[]);
        let mut arena = StateArena::new();
        let root = arena.root(vec!["a".to_string()]);
        let done = arena
            .expand(root, "a", PackageVersion::new("a", "1.0", "i"), 0.5, vec![])
            .unwrap();
        let mut finished = arena.get(done).finish();

        let UnitInstance::Wrap(mut wrap) = SummaryWrap::from_configuration(toml::Table::new()).unwrap() else {
            panic!("expected a wrap");
        };
        wrap.run(&context, &mut finished);
        assert_eq!(finished.notes, vec!["1 package(s) resolved (0 development), score 0.5000"]);
    }
}
