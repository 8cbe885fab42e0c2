//! The walker: a transient unit of computation with its own state and queue.

use osp_core::{Archetype, Attributes, Location, Value, WalkerTypeId};
use std::collections::VecDeque;
use std::fmt;

/// Lifecycle of a walker run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Waiting for the scheduler to pop the next location.
    Queued,
    /// Abilities are executing at the current location.
    Visiting,
    /// Stopped early; the remaining queue was dropped.
    Disengaged,
    /// An ability failed and the run was aborted.
    Faulted,
    /// The queue ran empty.
    Completed,
}

impl RunState {
    /// Returns true once the run can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Disengaged | RunState::Faulted | RunState::Completed
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Queued => "queued",
            RunState::Visiting => "visiting",
            RunState::Disengaged => "disengaged",
            RunState::Faulted => "faulted",
            RunState::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// A walker instance.
///
/// Locations enter the queue only through [`Walker::spawn`] (the start
/// location) and through `visit` calls from ability bodies.
#[derive(Debug, Clone)]
pub struct Walker {
    type_id: WalkerTypeId,
    attributes: Attributes,
    queue: VecDeque<Location>,
    state: RunState,
}

impl Walker {
    /// Create a walker with validated attributes and an empty queue.
    pub fn new(type_id: WalkerTypeId, attributes: Attributes) -> Self {
        Self {
            type_id,
            attributes,
            queue: VecDeque::new(),
            state: RunState::Queued,
        }
    }

    /// Place the walker on its start location.
    pub fn spawn(&mut self, start: impl Into<Location>) {
        self.queue.push_back(start.into());
        self.state = RunState::Queued;
    }

    pub fn type_id(&self) -> WalkerTypeId {
        self.type_id
    }

    pub fn archetype(&self) -> Archetype {
        Archetype::Walker(self.type_id)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    // ==================== Attributes ====================

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: Value) -> Option<Value> {
        self.attributes.insert(name.to_string(), value)
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    // ==================== Queue ====================

    /// Locations waiting to be visited, head first.
    pub fn pending(&self) -> impl Iterator<Item = &Location> + '_ {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn enqueue(&mut self, location: Location) {
        self.queue.push_back(location);
    }

    pub(crate) fn pop(&mut self) -> Option<Location> {
        self.queue.pop_front()
    }

    pub(crate) fn clear_queue(&mut self) {
        self.queue.clear();
    }
}
