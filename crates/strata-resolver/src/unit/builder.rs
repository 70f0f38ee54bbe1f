use strata_core::config::UnitEntry;
use strata_core::project::Project;
use strata_util::errors::StrataError;

use super::{descriptor, registry, Boot, Sieve, Step, Stride, UnitInstance, Wrap};

/// What the pipeline is being assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Scored beam search.
    Resolve,
    /// Scoring-free stack generation.
    Generate,
}

/// Run-wide facts a unit may consult when deciding whether to join.
pub struct BuilderContext<'a> {
    pub project: &'a Project,
    pub fingerprint: String,
    pub kind: RunKind,
    included: Vec<&'static str>,
}

impl<'a> BuilderContext<'a> {
    pub fn new(project: &'a Project, kind: RunKind) -> Self {
        Self {
            project,
            fingerprint: project.fingerprint(),
            kind,
            included: Vec::new(),
        }
    }

    pub fn is_included(&self, unit: &str) -> bool {
        self.included.iter().any(|n| *n == unit)
    }

    pub fn included(&self) -> &[&'static str] {
        &self.included
    }

    /// Record that a unit joined the pipeline.
    pub fn include(&mut self, unit: &'static str) {
        self.included.push(unit);
    }

    pub fn is_resolving(&self) -> bool {
        self.kind == RunKind::Resolve
    }
}

/// The ordered set of units for one run.
#[derive(Debug, Default)]
pub struct Pipeline {
    units: Vec<UnitInstance>,
}

impl Pipeline {
    /// Construct the units configured in `explicit` first, then every
    /// registry entry whose `should_include` asks to join.
    ///
    /// Any unit configuration error aborts the build.
    pub fn build(
        project: &Project,
        kind: RunKind,
        explicit: &[UnitEntry],
    ) -> Result<Self, StrataError> {
        let mut context = BuilderContext::new(project, kind);
        let mut pipeline = Pipeline::default();

        for entry in explicit {
            let Some(d) = descriptor(&entry.name) else {
                let known: Vec<&str> = registry().iter().map(|d| d.name).collect();
                return Err(StrataError::UnitConfiguration {
                    unit: entry.name.clone(),
                    message: format!("unknown unit, available are: {}", known.join(", ")),
                });
            };
            let unit = (d.build)(entry.configuration.clone())?;
            tracing::debug!("Configured {} unit {}", d.kind, d.name);
            context.include(d.name);
            pipeline.push(unit);
        }

        for d in registry() {
            if let Some(configuration) = (d.should_include)(&context) {
                let unit = (d.build)(configuration)?;
                tracing::debug!("Included {} unit {}", d.kind, d.name);
                context.include(d.name);
                pipeline.push(unit);
            }
        }

        tracing::info!("Pipeline: {}", pipeline.names().join(", "));
        Ok(pipeline)
    }

    pub fn push(&mut self, unit: UnitInstance) {
        self.units.push(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.units.iter().map(UnitInstance::name).collect()
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut UnitInstance> {
        self.units.iter_mut()
    }

    pub fn boots_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Boot>> {
        self.units.iter_mut().filter_map(|u| match u {
            UnitInstance::Boot(b) => Some(b),
            _ => None,
        })
    }

    pub fn sieves(&self) -> impl Iterator<Item = &dyn Sieve> {
        self.units.iter().filter_map(|u| match u {
            UnitInstance::Sieve(s) => Some(s.as_ref()),
            _ => None,
        })
    }

    pub fn steps_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Step>> {
        self.units.iter_mut().filter_map(|u| match u {
            UnitInstance::Step(s) => Some(s),
            _ => None,
        })
    }

    pub fn strides_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Stride>> {
        self.units.iter_mut().filter_map(|u| match u {
            UnitInstance::Stride(s) => Some(s),
            _ => None,
        })
    }

    pub fn wraps_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Wrap>> {
        self.units.iter_mut().filter_map(|u| match u {
            UnitInstance::Wrap(w) => Some(w),
            _ => None,
        })
    }
}
