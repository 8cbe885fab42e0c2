//! OSP Graph Storage
//!
//! This crate provides the persistent object graph walkers traverse:
//! - Generational arena storage for nodes and edges
//! - Ordered adjacency: neighbor queries in edge insertion order
//! - Edge selectors evaluated at query time
//! - Reachability sweep from the root and tracked roots
//! - A shared, lock-guarded handle for concurrent runs
//! - An id-keyed snapshot schema for persistence

mod filter;
mod graph;
mod index;
mod shared;
mod snapshot;

pub use filter::{AttrConstraint, CompareOp, Direction, EdgeFilter};
pub use graph::{Graph, Neighbor, SweepStats};
pub use shared::SharedGraph;
pub use snapshot::{EdgeRecord, GraphSnapshot, NodeRecord};
