//! The candidate product graph: every version of every package reachable
//! from a project's direct dependencies.
//!
//! Nodes are candidate package versions. An edge `a -> b` means candidate `a`
//! requires `b`'s package name and `b`'s version satisfies that requirement.
//! Two assigned candidates are compatible when neither requires the other's
//! name, or the requirement edge between them exists.
//!
//! Candidates of a direct dependency are additionally checked against the
//! project's own declaration (version requirement and `[[source]]` pin);
//! every traversal only assigns admitted candidates.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use strata_core::index::PackageIndex;
use strata_core::manifest::DeclaredConstraint;
use strata_core::package::{PackageVersion, Requirement};
use strata_core::project::Project;
use strata_core::version;
use strata_util::errors::StrataError;

use crate::walk::{PartialAssignment, Walk};

/// Edge label: the requirement string that admitted the edge.
#[derive(Debug, Clone)]
pub struct RequirementEdge {
    pub requirement: String,
}

pub struct DependencyGraph {
    graph: DiGraph<PackageVersion, RequirementEdge>,
    /// Candidates of each package name, in index order.
    candidates: HashMap<String, Vec<NodeIndex>>,
    requirements: HashMap<NodeIndex, Vec<Requirement>>,
    /// Direct dependencies in declaration order, then discovery order.
    order: Vec<String>,
    direct: Vec<String>,
    declared: HashMap<String, DeclaredConstraint>,
}

impl DependencyGraph {
    /// Discover the transitive closure of the project's direct dependencies.
    ///
    /// Every candidate version of every name on the frontier is asked for its
    /// requirements; new names join the frontier until nothing new turns up.
    pub fn from_project(project: &Project, index: &dyn PackageIndex) -> miette::Result<Self> {
        let manifest = &project.manifest;
        for (name, spec) in manifest.dependencies.iter().chain(manifest.dev_dependencies.iter()) {
            version::parse_requirement(spec.requirement()).map_err(|e| StrataError::Manifest {
                message: format!("dependency {name}: {e}"),
            })?;
        }
        let declared = manifest.declared_constraints()?;

        let direct = manifest.direct_dependency_names();
        let mut graph = DiGraph::new();
        let mut candidates: HashMap<String, Vec<NodeIndex>> = HashMap::new();
        let mut requirements: HashMap<NodeIndex, Vec<Requirement>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<String> = VecDeque::new();

        for name in &direct {
            if seen.insert(name.clone()) {
                frontier.push_back(name.clone());
            }
        }

        while let Some(name) = frontier.pop_front() {
            let versions = index.versions(&name)?;
            if versions.is_empty() {
                return Err(StrataError::resolution(format!(
                    "no candidate versions of {name} in the package index"
                ))
                .into());
            }
            tracing::debug!("Discovered {name} with {} candidate(s)", versions.len());
            if let Some(constraint) = declared.get(&name) {
                if !versions.iter().any(|p| constraint.admits(p)) {
                    tracing::warn!("No candidate of {name} is admitted by the project declaration");
                }
            }

            let mut nodes = Vec::with_capacity(versions.len());
            for package in versions {
                let reqs = index.requirements(&package)?;
                for req in &reqs {
                    if seen.insert(req.name.clone()) {
                        frontier.push_back(req.name.clone());
                    }
                }
                let node = graph.add_node(package);
                requirements.insert(node, reqs);
                nodes.push(node);
            }
            candidates.insert(name.clone(), nodes);
            order.push(name);
        }

        let mut dg = Self {
            graph,
            candidates,
            requirements,
            order,
            direct,
            declared,
        };
        dg.link()?;
        dg.mark_development(project);
        tracing::info!(
            "Dependency graph for {}: {} package(s), {} candidate(s)",
            project.name(),
            dg.len(),
            dg.candidate_count()
        );
        Ok(dg)
    }

    /// Add an edge for every (dependent, candidate) pair that satisfies a requirement.
    fn link(&mut self) -> Result<(), StrataError> {
        let mut edges = Vec::new();
        for (&node, reqs) in &self.requirements {
            for req in reqs {
                let parsed = version::parse_requirement(&req.version).map_err(|e| {
                    StrataError::Index {
                        message: format!("{} requires {}: {e}", self.graph[node].key(), req.name),
                    }
                })?;
                for &target in self.candidates.get(&req.name).into_iter().flatten() {
                    if version::matches(&parsed, &self.graph[target].version) {
                        edges.push((node, target, req.version.clone()));
                    }
                }
            }
        }
        for (from, to, requirement) in edges {
            self.graph.add_edge(from, to, RequirementEdge { requirement });
        }
        Ok(())
    }

    /// Flag every candidate of a name reachable only through development
    /// dependencies.
    fn mark_development(&mut self, project: &Project) {
        let mut runtime: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = project
            .manifest
            .dependencies
            .names()
            .map(str::to_string)
            .collect();
        while let Some(name) = queue.pop_front() {
            if !runtime.insert(name.clone()) {
                continue;
            }
            for node in self.candidates.get(&name).into_iter().flatten() {
                for req in self.requirements.get(node).into_iter().flatten() {
                    if !runtime.contains(&req.name) {
                        queue.push_back(req.name.clone());
                    }
                }
            }
        }
        for (name, nodes) in &self.candidates {
            if !runtime.contains(name) {
                for &node in nodes {
                    self.graph[node].develop = true;
                }
            }
        }
    }

    /// Package names in processing order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn direct_dependencies(&self) -> &[String] {
        &self.direct
    }

    pub(crate) fn candidate_nodes(&self, name: &str) -> &[NodeIndex] {
        self.candidates.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn package(&self, node: NodeIndex) -> &PackageVersion {
        &self.graph[node]
    }

    /// Candidate versions of `name`, in index order.
    pub fn candidates(&self, name: &str) -> Vec<&PackageVersion> {
        self.candidate_nodes(name)
            .iter()
            .map(|&n| &self.graph[n])
            .collect()
    }

    pub(crate) fn node_of(&self, package: &PackageVersion) -> Option<NodeIndex> {
        self.candidate_nodes(&package.name)
            .iter()
            .copied()
            .find(|&n| self.graph[n].same_release(package))
    }

    /// Whether the project's declaration admits `package`. Names the project
    /// does not declare directly are always admitted.
    pub fn admits(&self, package: &PackageVersion) -> bool {
        self.declared
            .get(&package.name)
            .map_or(true, |d| d.admits(package))
    }

    pub(crate) fn node_admitted(&self, node: NodeIndex) -> bool {
        self.admits(&self.graph[node])
    }

    /// Requirements declared by a candidate. Unknown packages have none.
    pub fn requirements(&self, package: &PackageVersion) -> &[Requirement] {
        self.node_of(package)
            .and_then(|n| self.requirements.get(&n))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names required by a candidate, in declaration order.
    pub fn required_names(&self, package: &PackageVersion) -> Vec<String> {
        self.requirements(package)
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    pub(crate) fn node_satisfies(&self, dependent: NodeIndex, candidate: NodeIndex) -> bool {
        let name = &self.graph[candidate].name;
        let requires = self
            .requirements
            .get(&dependent)
            .is_some_and(|reqs| reqs.iter().any(|r| &r.name == name));
        if !requires {
            return true;
        }
        self.graph
            .edges(dependent)
            .any(|e| e.target() == candidate)
    }

    /// Whether `candidate` meets every requirement `dependent` places on its name.
    pub fn satisfies(&self, dependent: &PackageVersion, candidate: &PackageVersion) -> bool {
        match (self.node_of(dependent), self.node_of(candidate)) {
            (Some(d), Some(c)) => self.node_satisfies(d, c),
            _ => true,
        }
    }

    /// Whether two candidates can appear in the same stack.
    pub fn compatible(&self, a: &PackageVersion, b: &PackageVersion) -> bool {
        self.satisfies(a, b) && self.satisfies(b, a)
    }

    /// Candidates that `package` accepts for a required name.
    pub fn dependencies_of(&self, package: &PackageVersion) -> Vec<(&PackageVersion, &str)> {
        self.node_of(package)
            .map(|n| {
                self.graph
                    .edges(n)
                    .map(|e| (&self.graph[e.target()], e.weight().requirement.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Lazily enumerate fully pinned projects, depth first.
    ///
    /// `decision` is consulted for every partial assignment before it is
    /// deepened; returning `false` abandons that branch. Each call starts a
    /// fresh traversal.
    pub fn walk<'g, D>(&'g self, base: &'g Project, decision: D) -> Walk<'g, D>
    where
        D: FnMut(&PartialAssignment<'_>) -> bool,
    {
        Walk::new(self, base, decision)
    }

    /// Number of package names.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.graph.node_count()
    }
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("names", &self.order)
            .field("candidates", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}
