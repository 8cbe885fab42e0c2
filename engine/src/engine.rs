//! The Engine - public entry point for running walkers.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use osp_core::{Archetype, Attributes, GraphError, NodeId};
use osp_graph::{SharedGraph, SweepStats};
use osp_walker::{AbilityRegistry, CancelToken, RunOutcome, Scheduler, Walker};
use std::sync::Arc;
use tracing::debug;

/// Owns the ability registry and a handle to the graph, and runs walkers
/// against them.
///
/// Cloning an engine is cheap; clones share the registry and the graph, so
/// runs on different threads see each other's mutations.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<AbilityRegistry>,
    graph: SharedGraph,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with default configuration.
    pub fn new(registry: AbilityRegistry, graph: SharedGraph) -> Self {
        Self {
            registry: Arc::new(registry),
            graph,
            config: EngineConfig::default(),
        }
    }

    /// Create an engine with the given configuration.
    pub fn with_config(
        registry: AbilityRegistry,
        graph: SharedGraph,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
            graph,
            config,
        })
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    pub fn registry(&self) -> &AbilityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Spawn a walker of the named type at `start` (the root if `None`) and
    /// drive it to completion.
    ///
    /// The walker attributes are validated against the walker type's schema
    /// and receive its defaults. A faulted run returns
    /// [`EngineError::Fault`] carrying the reports emitted before the fault.
    pub fn run(
        &self,
        walker_type: &str,
        attrs: Attributes,
        start: Option<NodeId>,
    ) -> EngineResult<RunOutcome> {
        self.execute(walker_type, attrs, start, None)
    }

    /// Like [`Engine::run`], stopping early once `cancel` fires.
    pub fn run_with_cancel(
        &self,
        walker_type: &str,
        attrs: Attributes,
        start: Option<NodeId>,
        cancel: CancelToken,
    ) -> EngineResult<RunOutcome> {
        self.execute(walker_type, attrs, start, Some(cancel))
    }

    /// Delete every node unreachable from the root or a tracked root.
    pub fn sweep(&self) -> SweepStats {
        self.graph.write().sweep_unreachable()
    }

    fn execute(
        &self,
        walker_type: &str,
        mut attrs: Attributes,
        start: Option<NodeId>,
        cancel: Option<CancelToken>,
    ) -> EngineResult<RunOutcome> {
        let type_id = self
            .registry
            .walker_type_id(walker_type)
            .ok_or_else(|| EngineError::unknown_walker(walker_type))?;
        self.registry
            .validate_attrs(Archetype::Walker(type_id), &mut attrs)?;

        let start = match start {
            Some(id) => {
                if !self.graph.read().contains_node(id) {
                    return Err(GraphError::invalid_node(id).into());
                }
                id
            }
            None => self.graph.root(),
        };
        debug!(walker = walker_type, %start, "spawning walker");

        let mut walker = Walker::new(type_id, attrs);
        walker.spawn(start);

        let mut options = self.config.scheduler_options();
        options.cancel = cancel;
        let outcome = Scheduler::new(&self.registry, &self.graph, options).run(walker)?;
        Ok(outcome)
    }
}
