//! Run-scoped state shared with every pipeline unit.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use strata_core::project::Project;

use crate::graph::DependencyGraph;

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// States created by expansion.
    pub produced: usize,
    /// Expansions rejected by a step plus terminal states rejected by a stride.
    pub discarded: usize,
    /// States dropped by beam capacity or as duplicates.
    pub pruned: usize,
}

/// Created once per run and handed to every unit invocation.
pub struct Context {
    pub project: Project,
    pub graph: Arc<DependencyGraph>,
    pub beam_width: usize,
    pub seed: u64,
    pub rng: StdRng,
    pub counters: RunCounters,
}

impl Context {
    /// Build a context. Without an explicit seed one is drawn from entropy
    /// and logged so the run can be reproduced.
    pub fn new(
        project: Project,
        graph: Arc<DependencyGraph>,
        beam_width: usize,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(|| {
            let drawn = rand::random::<u64>();
            tracing::info!("No seed given, using {drawn}");
            drawn
        });
        Self {
            project,
            graph,
            beam_width,
            seed,
            rng: StdRng::seed_from_u64(seed),
            counters: RunCounters::default(),
        }
    }
}
