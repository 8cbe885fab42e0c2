//! OSP Walker Runtime
//!
//! This crate runs walkers over the object graph:
//! - Walker instances with their own attributes and FIFO visit queue
//! - The ability context handed to every body
//! - The scheduler that pops locations and dispatches entry/exit abilities
//! - The reporter collecting values emitted during a run

mod context;
mod error;
mod reporter;
mod scheduler;
mod walker;

use osp_registry::{Registry, RegistryBuilder};
use std::sync::Arc;

pub use context::AbilityContext;
pub use error::{AbilityError, AbilityResult, RunFault};
pub use reporter::Reporter;
pub use scheduler::{
    CancelToken, DisengageCause, RunOutcome, Scheduler, SchedulerOptions, DEFAULT_QUEUE_WARN_LEN,
};
pub use walker::{RunState, Walker};

/// An executable ability body.
pub type AbilityFn = Arc<dyn Fn(&mut AbilityContext<'_>) -> AbilityResult + Send + Sync>;

/// A registry whose abilities are native closures.
pub type AbilityRegistry = Registry<AbilityFn>;

/// Builder for an [`AbilityRegistry`].
pub type AbilityRegistryBuilder = RegistryBuilder<AbilityFn>;

/// Wrap a closure as an ability body.
pub fn ability<F>(body: F) -> AbilityFn
where
    F: Fn(&mut AbilityContext<'_>) -> AbilityResult + Send + Sync + 'static,
{
    Arc::new(body)
}
