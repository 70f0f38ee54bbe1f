//! Stack resolution engine.
//!
//! A [`graph::DependencyGraph`] captures every candidate version reachable
//! from a project's direct dependencies. Two traversals run over it:
//!
//! - [`resolver::Resolver`], a beam search that drives the pipeline
//!   [`unit`]s over immutable [`state`]s and yields scored stacks;
//! - [`walk::Walk`], a scoring-free depth-first enumeration steered by a
//!   [`decision::DecisionFunction`], used to generate stacks in bulk.

pub mod beam;
pub mod context;
pub mod decision;
pub mod graph;
pub mod resolver;
pub mod state;
pub mod unit;
pub mod units;
pub mod walk;
