//! Depth-first enumeration of fully pinned projects.

use petgraph::graph::NodeIndex;

use strata_core::lockfile::Lockfile;
use strata_core::package::PackageVersion;
use strata_core::project::Project;

use crate::graph::DependencyGraph;

/// A partial assignment offered to a decision function.
pub struct PartialAssignment<'a> {
    graph: &'a DependencyGraph,
    assigned: &'a [NodeIndex],
    unresolved: &'a [String],
}

impl<'a> PartialAssignment<'a> {
    /// Pinned packages in assignment order.
    pub fn packages(&self) -> impl Iterator<Item = &'a PackageVersion> + 'a {
        let graph = self.graph;
        self.assigned.iter().map(move |&n| graph.package(n))
    }

    /// The package pinned most recently.
    pub fn last(&self) -> Option<&'a PackageVersion> {
        self.assigned.last().map(|&n| self.graph.package(n))
    }

    pub fn unresolved(&self) -> &'a [String] {
        self.unresolved
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

struct Frame {
    assigned: Vec<NodeIndex>,
    unresolved: Vec<String>,
}

/// Iterator returned by [`DependencyGraph::walk`].
///
/// Each call to `next` deepens the search only as far as needed to produce
/// one more project, so a caller may stop between items at no cost.
pub struct Walk<'g, D> {
    graph: &'g DependencyGraph,
    base: &'g Project,
    decision: D,
    stack: Vec<Frame>,
}

impl<'g, D> Walk<'g, D>
where
    D: FnMut(&PartialAssignment<'_>) -> bool,
{
    pub(crate) fn new(graph: &'g DependencyGraph, base: &'g Project, decision: D) -> Self {
        let root = Frame {
            assigned: Vec::new(),
            unresolved: graph.direct_dependencies().to_vec(),
        };
        Self {
            graph,
            base,
            decision,
            stack: vec![root],
        }
    }

    fn compatible(&self, assigned: &[NodeIndex], candidate: NodeIndex) -> bool {
        assigned.iter().all(|&a| {
            self.graph.node_satisfies(a, candidate) && self.graph.node_satisfies(candidate, a)
        })
    }

    fn materialize(&self, assigned: &[NodeIndex]) -> Project {
        let packages = assigned.iter().map(|&n| self.graph.package(n).clone());
        self.base.with_lock(Lockfile::from_packages(packages))
    }

    fn children(&self, frame: &Frame) -> Vec<Frame> {
        let Some((name, rest)) = frame.unresolved.split_first() else {
            return Vec::new();
        };
        let mut children = Vec::new();
        for &candidate in self.graph.candidate_nodes(name) {
            if !self.graph.node_admitted(candidate) || !self.compatible(&frame.assigned, candidate) {
                continue;
            }
            let mut assigned = frame.assigned.clone();
            assigned.push(candidate);
            let mut unresolved = rest.to_vec();
            for req in self.graph.required_names(self.graph.package(candidate)) {
                let pinned = assigned
                    .iter()
                    .any(|&n| self.graph.package(n).name == req);
                if !pinned && !unresolved.contains(&req) {
                    unresolved.push(req);
                }
            }
            children.push(Frame {
                assigned,
                unresolved,
            });
        }
        children
    }
}

impl<'g, D> Iterator for Walk<'g, D>
where
    D: FnMut(&PartialAssignment<'_>) -> bool,
{
    type Item = Project;

    fn next(&mut self) -> Option<Project> {
        while let Some(frame) = self.stack.pop() {
            if !frame.assigned.is_empty() {
                let partial = PartialAssignment {
                    graph: self.graph,
                    assigned: &frame.assigned,
                    unresolved: &frame.unresolved,
                };
                if !(self.decision)(&partial) {
                    continue;
                }
            }
            if frame.unresolved.is_empty() {
                return Some(self.materialize(&frame.assigned));
            }
            let children = self.children(&frame);
            // Reversed so the first candidate in index order is explored first.
            self.stack.extend(children.into_iter().rev());
        }
        None
    }
}
