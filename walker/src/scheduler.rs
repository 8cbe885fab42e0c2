//! The Scheduler - drives one walker through its queue.
//!
//! Each popped location is visited under the graph's write lock. Abilities
//! run in a fixed order:
//! 1. entry abilities of the location's type for this walker
//! 2. entry abilities of the walker's type for this location
//! 3. exit abilities of the walker's type for this location
//! 4. exit abilities of the location's type for this walker
//!
//! Within each step, abilities run in registration order.

use crate::context::{AbilityContext, Flow};
use crate::error::{AbilityError, RunFault};
use crate::reporter::Reporter;
use crate::walker::{RunState, Walker};
use crate::{AbilityFn, AbilityRegistry};
use osp_core::{Archetype, Attributes, Location, Value};
use osp_graph::{Graph, SharedGraph};
use osp_registry::{Ability, Trigger};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Default queue length above which a run logs a growth warning.
pub const DEFAULT_QUEUE_WARN_LEN: usize = 100_000;

/// Shared flag for stopping a run from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The run stops at its next dispatch boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Options for a single run.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Stop the run once this instant has passed.
    pub deadline: Option<Instant>,
    /// Stop the run once this token is cancelled.
    pub cancel: Option<CancelToken>,
    /// Log every ability body at trace level.
    pub trace_dispatch: bool,
    /// Warn once when the queue grows past this length.
    pub queue_warn_len: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            deadline: None,
            cancel: None,
            trace_dispatch: false,
            queue_warn_len: DEFAULT_QUEUE_WARN_LEN,
        }
    }
}

/// Why a run stopped before its queue ran empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisengageCause {
    /// An ability called `disengage`.
    Ability,
    /// The run's cancel token fired.
    Cancelled,
    /// The run's deadline passed.
    Deadline,
}

/// The result of a run that did not fault.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Completed or Disengaged.
    pub state: RunState,
    /// Reported values in emission order.
    pub reports: Vec<Value>,
    /// Final walker attributes.
    pub walker_attrs: Attributes,
    /// Number of locations visited.
    pub steps: usize,
    /// Set when the run was disengaged.
    pub disengaged_by: Option<DisengageCause>,
}

/// How a single location's dispatch ended.
enum Step {
    Continue,
    Stop(DisengageCause),
}

/// A failing ability, before the run's state is attached.
struct Failure {
    ability: String,
    error: AbilityError,
}

/// Runs walkers against a shared graph.
pub struct Scheduler<'a> {
    registry: &'a AbilityRegistry,
    graph: &'a SharedGraph,
    options: SchedulerOptions,
}

impl<'a> Scheduler<'a> {
    pub fn new(registry: &'a AbilityRegistry, graph: &'a SharedGraph, options: SchedulerOptions) -> Self {
        Self {
            registry,
            graph,
            options,
        }
    }

    /// Drive `walker` until its queue is empty, it disengages, or an ability
    /// faults.
    ///
    /// The walker must already be spawned on its start location.
    pub fn run(&self, mut walker: Walker) -> Result<RunOutcome, RunFault> {
        let walker_name = self.display_name(walker.archetype());
        info!(walker = %walker_name, queued = walker.queue_len(), "walker run started");

        let mut reporter = Reporter::new();
        let mut steps = 0usize;
        let mut warned = false;
        let mut disengaged_by = None;

        loop {
            if let Some(cause) = self.interrupted() {
                disengaged_by = Some(cause);
                break;
            }
            let Some(here) = walker.pop() else {
                break;
            };

            let mut graph = self.graph.write();
            let Some(here_type) = location_type(&graph, here) else {
                debug!(location = %here, "skipping deleted location");
                continue;
            };

            steps += 1;
            walker.set_state(RunState::Visiting);
            debug!(
                walker = %walker_name,
                location = %here,
                location_type = %self.display_name(here_type),
                step = steps,
                "visiting"
            );

            let step = self.visit(&mut graph, &mut walker, &mut reporter, here, here_type);
            drop(graph);

            match step {
                Ok(Step::Continue) => walker.set_state(RunState::Queued),
                Ok(Step::Stop(cause)) => {
                    disengaged_by = Some(cause);
                    break;
                }
                Err(failure) => {
                    walker.set_state(RunState::Faulted);
                    warn!(
                        walker = %walker_name,
                        ability = %failure.ability,
                        location = %here,
                        error = %failure.error,
                        "ability faulted"
                    );
                    return Err(RunFault {
                        ability: failure.ability,
                        location: here,
                        source: failure.error,
                        reports: reporter.collect(),
                        walker_attrs: walker.into_attributes(),
                    });
                }
            }

            if !warned && walker.queue_len() > self.options.queue_warn_len {
                warned = true;
                warn!(
                    walker = %walker_name,
                    queued = walker.queue_len(),
                    "walker queue is growing without bound"
                );
            }
        }

        let state = match disengaged_by {
            Some(_) => {
                walker.clear_queue();
                RunState::Disengaged
            }
            None => RunState::Completed,
        };
        walker.set_state(state);

        info!(
            walker = %walker_name,
            %state,
            steps,
            reports = reporter.len(),
            "walker run finished"
        );

        Ok(RunOutcome {
            state,
            reports: reporter.collect(),
            walker_attrs: walker.into_attributes(),
            steps,
            disengaged_by,
        })
    }

    /// Run every matching ability at one location.
    fn visit(
        &self,
        graph: &mut Graph,
        walker: &mut Walker,
        reporter: &mut Reporter,
        here: Location,
        here_type: Archetype,
    ) -> Result<Step, Failure> {
        let walker_type = walker.archetype();
        let phases = [
            (here_type, Trigger::Entry, walker_type),
            (walker_type, Trigger::Entry, here_type),
            (walker_type, Trigger::Exit, here_type),
            (here_type, Trigger::Exit, walker_type),
        ];

        for (owner, trigger, counterpart) in phases {
            for ability in self.registry.lookup(owner, trigger, counterpart) {
                if let Some(cause) = self.interrupted() {
                    return Ok(Step::Stop(cause));
                }

                let mut flow = Flow::default();
                self.invoke(ability, graph, walker, reporter, here, here_type, &mut flow)?;

                if flow.disengage {
                    debug!(ability = %ability.name, location = %here, "walker disengaged");
                    return Ok(Step::Stop(DisengageCause::Ability));
                }
                if flow.interrupted() {
                    debug!(ability = %ability.name, location = %here, "skipping rest of location");
                    return Ok(Step::Continue);
                }
            }
        }
        Ok(Step::Continue)
    }

    #[allow(clippy::too_many_arguments)]
    fn invoke(
        &self,
        ability: &Ability<AbilityFn>,
        graph: &mut Graph,
        walker: &mut Walker,
        reporter: &mut Reporter,
        here: Location,
        here_type: Archetype,
        flow: &mut Flow,
    ) -> Result<(), Failure> {
        if self.options.trace_dispatch {
            trace!(
                ability = %ability.name,
                owner = %self.display_name(ability.owner),
                trigger = %ability.trigger,
                location = %here,
                "running ability"
            );
        }

        let mut ctx = AbilityContext::new(graph, self.registry, walker, reporter, here, here_type, flow);
        let result = panic::catch_unwind(AssertUnwindSafe(|| (ability.body)(&mut ctx)))
            .unwrap_or_else(|payload| Err(AbilityError::Panicked(panic_message(payload.as_ref()))));
        result.map_err(|error| Failure {
            ability: ability.name.clone(),
            error,
        })
    }

    fn interrupted(&self) -> Option<DisengageCause> {
        if self.options.cancel.as_ref().map_or(false, CancelToken::is_cancelled) {
            return Some(DisengageCause::Cancelled);
        }
        match self.options.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(DisengageCause::Deadline),
            _ => None,
        }
    }

    fn display_name(&self, archetype: Archetype) -> String {
        self.registry
            .name_of(archetype)
            .map(str::to_string)
            .unwrap_or_else(|| archetype.to_string())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Archetype of a live location, or None if it was deleted.
fn location_type(graph: &Graph, location: Location) -> Option<Archetype> {
    match location {
        Location::Node(id) => graph.get_node(id).map(|node| Archetype::Node(node.type_id)),
        Location::Edge(id) => graph.get_edge(id).map(|edge| Archetype::Edge(edge.type_id)),
    }
}
