//! Immutable candidate states stored in an append-only arena.
//!
//! Each record stores only the package it resolved and a link to its parent,
//! so expanding a state never copies or mutates the resolved mapping of any
//! other state: siblings share their common prefix through the parent chain.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use strata_core::lockfile::Lockfile;
use strata_core::package::PackageVersion;
use strata_core::project::Project;
use strata_util::errors::StrataError;

/// Index of a record in a [`StateArena`]. Lower ids were created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JustificationKind {
    Info,
    Warning,
    Error,
}

/// A free-form annotation a step attaches to the state it accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    #[serde(rename = "type")]
    pub kind: JustificationKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl Justification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: JustificationKind::Info,
            message: message.into(),
            package: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: JustificationKind::Warning,
            message: message.into(),
            package: None,
        }
    }

    pub fn for_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            JustificationKind::Info => "info",
            JustificationKind::Warning => "warning",
            JustificationKind::Error => "error",
        };
        match &self.package {
            Some(package) => write!(f, "[{kind}] {package}: {}", self.message),
            None => write!(f, "[{kind}] {}", self.message),
        }
    }
}

#[derive(Debug)]
struct StateRecord {
    parent: Option<StateId>,
    resolved: Option<PackageVersion>,
    resolved_count: usize,
    score: f64,
    justification: Vec<Justification>,
    unresolved: Vec<String>,
}

/// Append-only storage for every state created during a run.
#[derive(Debug, Default)]
pub struct StateArena {
    records: Vec<StateRecord>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state with nothing resolved and the given names queued.
    /// Repeated names are queued once.
    pub fn root(&mut self, unresolved: impl IntoIterator<Item = String>) -> StateId {
        let mut queue: Vec<String> = Vec::new();
        for name in unresolved {
            if !queue.contains(&name) {
                queue.push(name);
            }
        }
        self.push(StateRecord {
            parent: None,
            resolved: None,
            resolved_count: 0,
            score: 0.0,
            justification: Vec::new(),
            unresolved: queue,
        })
    }

    pub fn get(&self, id: StateId) -> State<'_> {
        State { arena: self, id }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve `name` to `version` on top of state `id`, producing a new state.
    pub fn expand(
        &mut self,
        id: StateId,
        name: &str,
        version: PackageVersion,
        score_delta: f64,
        justification: Vec<Justification>,
    ) -> Result<StateId, StrataError> {
        self.expand_with(id, name, version, score_delta, justification, Vec::new())
    }

    /// Like [`StateArena::expand`], additionally queueing the names the chosen
    /// version requires. Names already resolved or queued are skipped.
    pub fn expand_with(
        &mut self,
        id: StateId,
        name: &str,
        version: PackageVersion,
        score_delta: f64,
        justification: Vec<Justification>,
        discovered: impl IntoIterator<Item = String>,
    ) -> Result<StateId, StrataError> {
        let parent = self.get(id);
        if !parent.unresolved().iter().any(|n| n == name) {
            return Err(StrataError::resolution(format!(
                "cannot expand state {}: {name} is not unresolved",
                id.0
            )));
        }
        if parent.is_resolved(name) {
            return Err(StrataError::resolution(format!(
                "cannot expand state {}: {name} is already resolved",
                id.0
            )));
        }
        if version.name != name {
            return Err(StrataError::resolution(format!(
                "cannot resolve {name} to {}",
                version.key()
            )));
        }

        let mut unresolved: Vec<String> = parent
            .unresolved()
            .iter()
            .filter(|n| *n != name)
            .cloned()
            .collect();
        for next in discovered {
            if next != name && !unresolved.contains(&next) && !parent.is_resolved(&next) {
                unresolved.push(next);
            }
        }

        let record = StateRecord {
            parent: Some(id),
            resolved: Some(version),
            resolved_count: parent.resolved_count() + 1,
            score: parent.score() + score_delta,
            justification,
            unresolved,
        };
        Ok(self.push(record))
    }

    fn push(&mut self, record: StateRecord) -> StateId {
        let id = StateId(self.records.len());
        self.records.push(record);
        id
    }

    fn record(&self, id: StateId) -> &StateRecord {
        &self.records[id.0]
    }
}

/// A read-only view of one state in the arena.
#[derive(Clone, Copy)]
pub struct State<'a> {
    arena: &'a StateArena,
    id: StateId,
}

impl<'a> State<'a> {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn score(&self) -> f64 {
        self.arena.record(self.id).score
    }

    pub fn unresolved(&self) -> &'a [String] {
        &self.arena.record(self.id).unresolved
    }

    pub fn is_terminal(&self) -> bool {
        self.unresolved().is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.arena.record(self.id).resolved_count
    }

    fn chain(&self) -> impl Iterator<Item = &'a StateRecord> + 'a {
        let arena = self.arena;
        std::iter::successors(Some(arena.record(self.id)), move |r| {
            r.parent.map(|p| arena.record(p))
        })
    }

    /// The version chosen for `name`, if resolved.
    pub fn get(&self, name: &str) -> Option<&'a PackageVersion> {
        self.chain()
            .filter_map(|r| r.resolved.as_ref())
            .find(|p| p.name == name)
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolved packages in the order they were resolved.
    pub fn resolved(&self) -> Vec<&'a PackageVersion> {
        let mut packages: Vec<&PackageVersion> =
            self.chain().filter_map(|r| r.resolved.as_ref()).collect();
        packages.reverse();
        packages
    }

    /// Justification entries in the order they were added.
    pub fn justification(&self) -> Vec<&'a Justification> {
        let mut records: Vec<&StateRecord> = self.chain().collect();
        records.reverse();
        records
            .into_iter()
            .flat_map(|r| r.justification.iter())
            .collect()
    }

    /// Order-independent identity of the resolved mapping.
    pub fn fingerprint(&self) -> BTreeSet<(String, String, String)> {
        self.chain()
            .filter_map(|r| r.resolved.as_ref())
            .map(|p| (p.name.clone(), p.version.clone(), p.index.clone()))
            .collect()
    }

    pub fn is_duplicate_of(&self, other: &State<'_>) -> bool {
        self.resolved_count() == other.resolved_count() && self.fingerprint() == other.fingerprint()
    }

    /// Owned snapshot used for final output.
    pub fn finish(&self) -> FinishedState {
        FinishedState {
            id: self.id,
            packages: self.resolved().into_iter().cloned().collect(),
            score: self.score(),
            justification: self.justification().into_iter().cloned().collect(),
            notes: Vec::new(),
        }
    }
}

impl fmt::Debug for State<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("score", &self.score())
            .field("resolved", &self.resolved_count())
            .field("unresolved", &self.unresolved())
            .finish()
    }
}

/// A terminal state accepted by every stride. Wraps may annotate `notes`.
#[derive(Debug, Clone, Serialize)]
pub struct FinishedState {
    #[serde(skip)]
    pub id: StateId,
    pub packages: Vec<PackageVersion>,
    pub score: f64,
    pub justification: Vec<Justification>,
    pub notes: Vec<String>,
}

impl FinishedState {
    /// The project pinned to exactly this state's resolved packages.
    pub fn to_project(&self, base: &Project) -> Project {
        base.with_lock(Lockfile::from_packages(self.packages.iter().cloned()))
    }
}
