//! Operation: generate fully pinned stacks by walking the dependency graph.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_core::index::PackageIndex;
use strata_core::project::Project;
use strata_core::{LOCK_FILE, MANIFEST_FILE};
use strata_resolver::context::Context;
use strata_resolver::decision::DecisionFunction;
use strata_resolver::graph::DependencyGraph;
use strata_resolver::unit::{Pipeline, RunKind};
use strata_util::errors::StrataError;
use strata_util::fs::ensure_dir;
use strata_util::hash::prefixed_digest;

use crate::validation::{HttpValidationService, ValidationService};

/// Options for `strata generate`.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// A URL, `-` for standard output, or a directory path.
    pub destination: String,
    pub seed: Option<u64>,
    /// Decision function name, see [`DecisionFunction::NAMES`].
    pub decision: String,
    /// Walk and fill hashes but dispatch nothing.
    pub dry_run: bool,
    /// JSON object forwarded with every validation submission.
    pub context: Option<String>,
    /// Upper bound on the number of stacks.
    pub count: Option<i64>,
    pub sampling_probability: f64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            destination: "-".to_string(),
            seed: None,
            decision: "all".to_string(),
            dry_run: false,
            context: None,
            count: None,
            sampling_probability: 0.5,
        }
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Inspection ids or written directories, one per dispatched stack.
    pub output: Vec<String>,
    /// Stacks produced by the walk, dispatched or not.
    pub computed: usize,
}

/// Where generated stacks go.
pub enum Sink {
    Validation {
        url: String,
        context: serde_json::Map<String, serde_json::Value>,
        service: Box<dyn ValidationService>,
    },
    Stream(Box<dyn Write>),
    Directory(PathBuf),
}

fn is_url(destination: &str) -> bool {
    destination.starts_with("http://") || destination.starts_with("https://")
}

fn parse_context(raw: &str) -> Result<serde_json::Map<String, serde_json::Value>, StrataError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
        StrataError::configuration(format!("context is not valid JSON: {e}"))
    })?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StrataError::configuration(format!(
            "context must be a JSON object, got {other}"
        ))),
    }
}

impl Sink {
    /// Pick the sink by inspecting `destination`. Directories are created
    /// when missing. A blank context counts as no context.
    pub fn from_destination(destination: &str, context: Option<&str>) -> miette::Result<Self> {
        let context = context.filter(|raw| {
            let blank = raw.trim().is_empty();
            if blank {
                tracing::warn!("Empty context given, ignoring it");
            }
            !blank
        });
        let parsed = context.map(parse_context).transpose()?;
        if is_url(destination) {
            let service = HttpValidationService::new()?;
            return Ok(Self::validation(destination, parsed.unwrap_or_default(), Box::new(service)));
        }
        if destination == "-" {
            if parsed.is_some() {
                tracing::warn!("Context is only forwarded to a validation service, ignoring it");
            }
            return Ok(Self::Stream(Box::new(std::io::stdout())));
        }
        if parsed.is_some() {
            return Err(StrataError::configuration(
                "context cannot be used when writing stacks to a directory",
            )
            .into());
        }
        let root = PathBuf::from(destination);
        ensure_dir(&root).map_err(StrataError::Io)?;
        Ok(Self::Directory(root))
    }

    pub fn validation(
        url: &str,
        context: serde_json::Map<String, serde_json::Value>,
        service: Box<dyn ValidationService>,
    ) -> Self {
        if context.is_empty() {
            tracing::warn!("No context given, submitting stacks without it");
        }
        Self::Validation {
            url: url.to_string(),
            context,
            service,
        }
    }

    /// Emit one generated stack. Returns the entry to record, if any.
    ///
    /// Validation failures are logged and yield no entry; write failures on
    /// the other sinks are errors.
    pub fn dispatch(&mut self, project: &Project, sequence: usize) -> miette::Result<Option<String>> {
        match self {
            Sink::Validation {
                url,
                context,
                service,
            } => {
                let mut payload = context.clone();
                payload.insert("project".to_string(), project.to_value()?);
                match service.submit(url, &serde_json::Value::Object(payload)) {
                    Ok(resp) => {
                        tracing::info!("Stack {sequence} submitted as {}", resp.inspection_id);
                        Ok(Some(resp.inspection_id))
                    }
                    Err(e) => {
                        tracing::warn!("Failed to submit stack {sequence}: {e}");
                        Ok(None)
                    }
                }
            }
            Sink::Stream(out) => {
                let json = project.to_json_pretty()?;
                writeln!(out, "{json}").map_err(StrataError::Io)?;
                Ok(None)
            }
            Sink::Directory(root) => {
                let dir = root.join(format!("{sequence:05}"));
                project.to_files(&dir.join(MANIFEST_FILE), &dir.join(LOCK_FILE))?;
                tracing::debug!("Stack {sequence} written to {}", dir.display());
                Ok(Some(dir.display().to_string()))
            }
        }
    }
}

/// Append digests to every locked package that has none. Packages with
/// hashes are never touched. Returns how many packages were filled.
pub fn fill_hashes(project: &mut Project, index: &dyn PackageIndex) -> usize {
    let Some(lock) = project.lock.as_mut() else {
        return 0;
    };
    let mut filled = 0;
    for package in lock.all_packages_mut() {
        if !package.hashes.is_empty() {
            continue;
        }
        match index.get_hashes(&package.name, &package.version) {
            Ok(entries) => {
                for entry in &entries {
                    for (algorithm, value) in entry {
                        package.hashes.push(prefixed_digest(algorithm, value));
                    }
                }
                if !package.hashes.is_empty() {
                    filled += 1;
                }
            }
            Err(e) => {
                tracing::warn!("No hashes for {}: {e}", package.key());
            }
        }
    }
    filled
}

/// A validated generation run.
pub struct StackGenerator<'i> {
    index: &'i dyn PackageIndex,
    decision: DecisionFunction,
    count: Option<usize>,
    dry_run: bool,
    seed: Option<u64>,
}

impl<'i> StackGenerator<'i> {
    pub fn new(index: &'i dyn PackageIndex, options: &GenerateOptions) -> Result<Self, StrataError> {
        let decision = DecisionFunction::from_name(&options.decision, options.sampling_probability)?;
        let count = match options.count {
            None => None,
            Some(n) if n > 0 => Some(n as usize),
            Some(n) => {
                return Err(StrataError::configuration(format!(
                    "count must be a positive number, got {n}"
                )))
            }
        };
        Ok(Self {
            index,
            decision,
            count,
            dry_run: options.dry_run,
            seed: options.seed,
        })
    }

    /// Walk the project's graph, dispatching each stack to `sink`.
    pub fn run(&self, project: Project, sink: &mut Sink) -> miette::Result<GenerationReport> {
        let graph = Arc::new(DependencyGraph::from_project(&project, self.index)?);
        let mut pipeline = Pipeline::build(&project, RunKind::Generate, &[])?;
        let mut context = Context::new(project, graph, 0, self.seed);
        for boot in pipeline.boots_mut() {
            boot.pre_run(&mut context)?;
            boot.run(&mut context);
        }

        tracing::info!(
            "Generating stacks for {} with decision function {} (seed {})",
            context.project.name(),
            self.decision,
            context.seed
        );

        let mut report = GenerationReport::default();
        {
            let Context {
                project,
                graph,
                rng,
                ..
            } = &mut context;
            let decision = self.decision;
            let walk = graph.walk(project, |partial| decision.decide(partial, &mut *rng));
            for mut generated in walk {
                report.computed += 1;
                fill_hashes(&mut generated, self.index);
                if !self.dry_run {
                    if let Some(entry) = sink.dispatch(&generated, report.computed)? {
                        report.output.push(entry);
                    }
                }
                if self.count.is_some_and(|c| report.computed >= c) {
                    break;
                }
            }
        }

        for boot in pipeline.boots_mut() {
            boot.post_run(&mut context);
        }
        tracing::info!(
            "Computed {} stack(s), {} recorded",
            report.computed,
            report.output.len()
        );
        Ok(report)
    }
}

/// Generate stacks for the project at `project_root` into `options.destination`.
pub fn generate(
    project_root: &Path,
    index: &dyn PackageIndex,
    options: &GenerateOptions,
) -> miette::Result<GenerationReport> {
    let generator = StackGenerator::new(index, options)?;
    let project = Project::from_dir(project_root)?;
    let mut sink = Sink::from_destination(&options.destination, options.context.as_deref())?;
    generator.run(project, &mut sink)
}
