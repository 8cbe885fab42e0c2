//! Lock-guarded graph handle shared between concurrent walker runs.

use crate::graph::Graph;
use osp_core::NodeId;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A cloneable handle to one graph behind a single global reader/writer lock.
///
/// Structural mutation goes through [`SharedGraph::write`] and is exclusive
/// with every other access. Read-only queries through [`SharedGraph::read`]
/// may run concurrently with each other.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Graph> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Graph> {
        self.inner.write()
    }

    /// The root node id. The root never changes for the life of a graph.
    pub fn root(&self) -> NodeId {
        self.inner.read().root()
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}
