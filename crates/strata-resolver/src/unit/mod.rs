//! Pipeline units: the pluggable boots, sieves, steps, strides and wraps
//! the resolver drives.
//!
//! Each kind has its own `run` contract. The set of kinds is closed and
//! carried by [`UnitInstance`]; concrete unit types are listed once in
//! [`registry`] and constructed by [`builder::Pipeline::build`].

pub mod builder;

use std::fmt;

use serde::de::DeserializeOwned;

use strata_core::package::PackageVersion;
use strata_util::errors::StrataError;

use crate::context::Context;
use crate::state::{FinishedState, Justification, State};
use crate::units;

pub use builder::{BuilderContext, Pipeline, RunKind};

/// Behaviour shared by every unit kind.
pub trait Unit {
    fn name(&self) -> &'static str;

    /// One-time setup before traversal starts.
    fn pre_run(&mut self, _context: &mut Context) -> Result<(), StrataError> {
        Ok(())
    }

    /// One-time teardown after traversal ends, on every termination path.
    fn post_run(&mut self, _context: &mut Context) {}
}

/// Mutates the run context once, before any expansion.
pub trait Boot: Unit {
    fn run(&mut self, context: &mut Context);
}

pub type Candidates<'a> = Box<dyn Iterator<Item = PackageVersion> + 'a>;

/// Filters the candidate versions of one package name. Never sees a state.
pub trait Sieve: Unit {
    fn run<'a>(&'a self, context: &'a Context, candidates: Candidates<'a>) -> Candidates<'a>;
}

/// Contribution of a step to an accepted expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    pub score: f64,
    pub justification: Vec<Justification>,
}

impl StepResult {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn scored(score: f64) -> Self {
        Self {
            score,
            justification: Vec::new(),
        }
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification.push(justification);
        self
    }
}

/// Scores a (state, candidate) pair. `None` rejects the pair.
pub trait Step: Unit {
    fn run(
        &mut self,
        context: &Context,
        state: State<'_>,
        candidate: &PackageVersion,
    ) -> Option<StepResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Judges a terminal state.
pub trait Stride: Unit {
    fn run(&mut self, context: &Context, state: State<'_>) -> Verdict;
}

/// Annotates an accepted terminal state.
pub trait Wrap: Unit {
    fn run(&mut self, context: &Context, state: &mut FinishedState);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Boot,
    Sieve,
    Step,
    Stride,
    Wrap,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnitKind::Boot => "boot",
            UnitKind::Sieve => "sieve",
            UnitKind::Step => "step",
            UnitKind::Stride => "stride",
            UnitKind::Wrap => "wrap",
        };
        f.write_str(s)
    }
}

/// A constructed unit of one of the five kinds.
pub enum UnitInstance {
    Boot(Box<dyn Boot>),
    Sieve(Box<dyn Sieve>),
    Step(Box<dyn Step>),
    Stride(Box<dyn Stride>),
    Wrap(Box<dyn Wrap>),
}

impl UnitInstance {
    pub fn kind(&self) -> UnitKind {
        match self {
            UnitInstance::Boot(_) => UnitKind::Boot,
            UnitInstance::Sieve(_) => UnitKind::Sieve,
            UnitInstance::Step(_) => UnitKind::Step,
            UnitInstance::Stride(_) => UnitKind::Stride,
            UnitInstance::Wrap(_) => UnitKind::Wrap,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitInstance::Boot(u) => u.name(),
            UnitInstance::Sieve(u) => u.name(),
            UnitInstance::Step(u) => u.name(),
            UnitInstance::Stride(u) => u.name(),
            UnitInstance::Wrap(u) => u.name(),
        }
    }

    pub fn pre_run(&mut self, context: &mut Context) -> Result<(), StrataError> {
        match self {
            UnitInstance::Boot(u) => u.pre_run(context),
            UnitInstance::Sieve(u) => u.pre_run(context),
            UnitInstance::Step(u) => u.pre_run(context),
            UnitInstance::Stride(u) => u.pre_run(context),
            UnitInstance::Wrap(u) => u.pre_run(context),
        }
    }

    pub fn post_run(&mut self, context: &mut Context) {
        match self {
            UnitInstance::Boot(u) => u.post_run(context),
            UnitInstance::Sieve(u) => u.post_run(context),
            UnitInstance::Step(u) => u.post_run(context),
            UnitInstance::Stride(u) => u.post_run(context),
            UnitInstance::Wrap(u) => u.post_run(context),
        }
    }
}

impl fmt::Debug for UnitInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.name())
    }
}

/// Construction hooks every concrete unit type provides.
pub trait UnitFactory {
    const NAME: &'static str;
    const KIND: UnitKind;

    /// Configuration to construct this unit with, or `None` to skip it.
    fn should_include(context: &BuilderContext<'_>) -> Option<toml::Table>;

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError>;
}

/// Deserialize a raw configuration table into a unit's typed configuration.
///
/// Defaults declared on `C` are merged in; unknown keys and type mismatches
/// are reported against `unit`.
pub fn validate<C: DeserializeOwned>(unit: &str, raw: toml::Table) -> Result<C, StrataError> {
    toml::Value::Table(raw)
        .try_into::<C>()
        .map_err(|e| StrataError::UnitConfiguration {
            unit: unit.to_string(),
            message: e.to_string(),
        })
}

/// Type-erased entry in the unit registry.
#[derive(Clone, Copy)]
pub struct UnitDescriptor {
    pub name: &'static str,
    pub kind: UnitKind,
    pub should_include: fn(&BuilderContext<'_>) -> Option<toml::Table>,
    pub build: fn(toml::Table) -> Result<UnitInstance, StrataError>,
}

impl UnitDescriptor {
    pub fn of<F: UnitFactory>() -> Self {
        Self {
            name: F::NAME,
            kind: F::KIND,
            should_include: F::should_include,
            build: F::from_configuration,
        }
    }
}

impl fmt::Debug for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.name)
    }
}

/// Every built-in unit type, in the order the builder consults them.
pub fn registry() -> Vec<UnitDescriptor> {
    vec![
        UnitDescriptor::of::<units::boots::PlatformBoot>(),
        UnitDescriptor::of::<units::sieves::ConstraintSieve>(),
        UnitDescriptor::of::<units::sieves::PrereleaseSieve>(),
        UnitDescriptor::of::<units::steps::RequirementsStep>(),
        UnitDescriptor::of::<units::steps::LatestVersionStep>(),
        UnitDescriptor::of::<units::steps::SetScoreStep>(),
        UnitDescriptor::of::<units::strides::ScoreThresholdStride>(),
        UnitDescriptor::of::<units::wraps::SummaryWrap>(),
    ]
}

/// Look up a registry entry by unit name.
pub fn descriptor(name: &str) -> Option<UnitDescriptor> {
    registry().into_iter().find(|d| d.name == name)
}
