//! Beam search over candidate states, driving the pipeline units.
//!
//! One package name is processed per generation, cycling through the graph's
//! name order until the beam runs dry. Finished states are handed out one at
//! a time through [`Iterator`], so callers may stop as soon as they have
//! enough.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use strata_core::package::PackageVersion;
use strata_util::errors::StrataError;

use crate::beam::Beam;
use crate::context::{Context, RunCounters};
use crate::state::{FinishedState, StateArena, StateId};
use crate::unit::{Candidates, Pipeline, Verdict};

type Fingerprint = BTreeSet<(String, String, String)>;

/// Outcome of [`Resolver::resolve`].
#[derive(Debug)]
pub struct Resolution {
    pub finished: Vec<FinishedState>,
    pub produced: usize,
    pub discarded: usize,
    pub pruned: usize,
    /// Largest beam observed during the run.
    pub peak_beam: usize,
}

impl Resolution {
    /// The highest-scoring finished state; ties go to the one found first.
    pub fn best(&self) -> Option<&FinishedState> {
        self.finished
            .iter()
            .rev()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Finished states ordered best first.
    pub fn ranked(&self) -> Vec<&FinishedState> {
        let mut ranked: Vec<&FinishedState> = self.finished.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Done,
}

pub struct Resolver {
    pipeline: Pipeline,
    context: Context,
    arena: StateArena,
    beam: Beam,
    sieved: HashMap<String, Rc<[PackageVersion]>>,
    cursor: usize,
    pending: VecDeque<FinishedState>,
    finished: HashSet<Fingerprint>,
    phase: Phase,
    peak_beam: usize,
}

impl Resolver {
    /// Prepare a run: boots mutate the context, every unit's `pre_run`
    /// executes, and the root state is seeded with the direct dependencies.
    pub fn new(mut context: Context, mut pipeline: Pipeline) -> Result<Self, StrataError> {
        if context.beam_width == 0 {
            return Err(StrataError::configuration("beam width must be positive"));
        }

        for boot in pipeline.boots_mut() {
            boot.pre_run(&mut context)?;
            boot.run(&mut context);
        }
        for unit in pipeline.units_mut() {
            if unit.kind() != crate::unit::UnitKind::Boot {
                unit.pre_run(&mut context)?;
            }
        }

        let mut arena = StateArena::new();
        let root = arena.root(context.graph.direct_dependencies().iter().cloned());
        let mut resolver = Self {
            beam: Beam::new(context.beam_width),
            pipeline,
            context,
            arena,
            sieved: HashMap::new(),
            cursor: 0,
            pending: VecDeque::new(),
            finished: HashSet::new(),
            phase: Phase::Running,
            peak_beam: 1,
        };

        if resolver.arena.get(root).is_terminal() {
            resolver.admit(root);
        } else {
            resolver.beam.push(root, 0.0);
        }
        tracing::info!(
            "Resolving {} with beam width {} (seed {})",
            resolver.context.project.name(),
            resolver.context.beam_width,
            resolver.context.seed
        );
        Ok(resolver)
    }

    pub fn counters(&self) -> RunCounters {
        self.context.counters
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn beam_len(&self) -> usize {
        self.beam.len()
    }

    pub fn peak_beam(&self) -> usize {
        self.peak_beam
    }

    pub fn states_created(&self) -> usize {
        self.arena.len()
    }

    /// Run until the beam is exhausted, `limit` states finished, or `stop`
    /// returns true for a finished state. Partial results are returned on
    /// every path.
    pub fn resolve<F>(mut self, limit: Option<usize>, mut stop: F) -> Resolution
    where
        F: FnMut(&FinishedState) -> bool,
    {
        let mut finished = Vec::new();
        if limit != Some(0) {
            for state in self.by_ref() {
                let halt = stop(&state);
                finished.push(state);
                if halt || limit.is_some_and(|l| finished.len() >= l) {
                    break;
                }
            }
        }
        self.finish();
        let counters = self.context.counters;
        Resolution {
            finished,
            produced: counters.produced,
            discarded: counters.discarded,
            pruned: counters.pruned,
            peak_beam: self.peak_beam,
        }
    }

    /// Candidates of `name` after every sieve, computed once per run.
    fn sieved(&mut self, name: &str) -> Rc<[PackageVersion]> {
        if let Some(cached) = self.sieved.get(name) {
            return Rc::clone(cached);
        }
        let all: Vec<PackageVersion> = self
            .context
            .graph
            .candidates(name)
            .into_iter()
            .cloned()
            .collect();
        let total = all.len();
        let mut candidates: Candidates<'_> = Box::new(all.into_iter());
        for sieve in self.pipeline.sieves() {
            candidates = sieve.run(&self.context, candidates);
        }
        let kept: Rc<[PackageVersion]> = candidates.collect::<Vec<_>>().into();
        tracing::debug!("{name}: {} of {total} candidate(s) pass the sieves", kept.len());
        self.sieved.insert(name.to_string(), Rc::clone(&kept));
        kept
    }

    /// Expand every live state on the current name.
    fn step_generation(&mut self) {
        let names = self.context.graph.names();
        if names.is_empty() {
            self.beam.take();
            return;
        }
        let name = names[self.cursor % names.len()].clone();
        self.cursor = (self.cursor + 1) % names.len();

        let live = self.beam.take();
        let mut seen: HashSet<Fingerprint> = HashSet::new();
        let mut expanded = false;

        for id in live {
            let state = self.arena.get(id);
            if !state.unresolved().contains(&name) {
                let fingerprint = state.fingerprint();
                let score = state.score();
                self.enqueue(id, score, fingerprint, &mut seen);
                continue;
            }
            expanded = true;
            let candidates = self.sieved(&name);
            if candidates.is_empty() {
                tracing::debug!("State {} has no viable candidate of {name}", id.index());
            }
            for candidate in candidates.iter() {
                if let Some(child) = self.expand(id, &name, candidate) {
                    let state = self.arena.get(child);
                    if state.is_terminal() {
                        self.admit(child);
                    } else {
                        let fingerprint = state.fingerprint();
                        let score = state.score();
                        self.enqueue(child, score, fingerprint, &mut seen);
                    }
                }
            }
        }

        self.peak_beam = self.peak_beam.max(self.beam.len());
        if expanded {
            tracing::debug!(
                "Expanded {name}: beam {} / {}, {} finished so far",
                self.beam.len(),
                self.beam.width(),
                self.finished.len()
            );
        }
    }

    /// Run every step over (`parent`, `candidate`); on acceptance create the
    /// child state.
    fn expand(&mut self, parent: StateId, name: &str, candidate: &PackageVersion) -> Option<StateId> {
        let mut score = 0.0;
        let mut justification = Vec::new();
        let state = self.arena.get(parent);
        for step in self.pipeline.steps_mut() {
            match step.run(&self.context, state, candidate) {
                Some(result) => {
                    score += result.score;
                    justification.extend(result.justification);
                }
                None => {
                    tracing::debug!("{} rejected {} on state {}", step.name(), candidate.key(), parent.index());
                    self.context.counters.discarded += 1;
                    return None;
                }
            }
        }

        let discovered = self.context.graph.required_names(candidate);
        match self.arena.expand_with(
            parent,
            name,
            candidate.clone(),
            score,
            justification,
            discovered,
        ) {
            Ok(child) => {
                self.context.counters.produced += 1;
                Some(child)
            }
            Err(e) => {
                tracing::warn!("{e}");
                self.context.counters.discarded += 1;
                None
            }
        }
    }

    fn enqueue(&mut self, id: StateId, score: f64, fingerprint: Fingerprint, seen: &mut HashSet<Fingerprint>) {
        if !seen.insert(fingerprint) {
            self.context.counters.pruned += 1;
            return;
        }
        if self.beam.push(id, score).is_some() {
            self.context.counters.pruned += 1;
        }
    }

    /// Judge a terminal state and, if accepted, queue it for output.
    fn admit(&mut self, id: StateId) {
        let state = self.arena.get(id);
        for stride in self.pipeline.strides_mut() {
            if stride.run(&self.context, state) == Verdict::Reject {
                self.context.counters.discarded += 1;
                return;
            }
        }
        if !self.finished.insert(state.fingerprint()) {
            self.context.counters.pruned += 1;
            return;
        }
        let mut finished = state.finish();
        for wrap in self.pipeline.wraps_mut() {
            wrap.run(&self.context, &mut finished);
        }
        tracing::debug!(
            "Finished state {} with score {}",
            id.index(),
            finished.score
        );
        self.pending.push_back(finished);
    }

    /// Tear down: every unit's `post_run` runs exactly once.
    fn finish(&mut self) {
        if self.phase == Phase::Done {
            return;
        }
        self.phase = Phase::Done;
        self.beam.take();
        for unit in self.pipeline.units_mut() {
            unit.post_run(&mut self.context);
        }
        let counters = self.context.counters;
        tracing::info!(
            "Resolution finished: {} produced, {} discarded, {} pruned, {} state(s) accepted",
            counters.produced,
            counters.discarded,
            counters.pruned,
            self.finished.len()
        );
    }
}

impl Iterator for Resolver {
    type Item = FinishedState;

    fn next(&mut self) -> Option<FinishedState> {
        loop {
            if let Some(state) = self.pending.pop_front() {
                return Some(state);
            }
            if self.phase == Phase::Done {
                return None;
            }
            if self.beam.is_empty() {
                self.finish();
                continue;
            }
            self.step_generation();
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        self.finish();
    }
}
