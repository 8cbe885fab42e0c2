//! Walker run error types.

use osp_core::{Attributes, GraphError, Location, Value};
use osp_registry::RegistryError;
use thiserror::Error;

/// Result type returned by ability bodies.
pub type AbilityResult<T = ()> = Result<T, AbilityError>;

/// A failure raised inside an ability body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbilityError {
    /// A graph operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A schema or dispatch check failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Raised by the body itself.
    #[error("{0}")]
    Message(String),

    /// The body panicked. Holds the panic message when it was a string.
    #[error("ability panicked: {0}")]
    Panicked(String),
}

impl AbilityError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// An unhandled ability failure that aborted a run.
///
/// Carries whatever the run produced before the failure. Graph mutations made
/// before it are not rolled back.
#[derive(Debug, Clone, Error)]
#[error("ability '{ability}' faulted at {location}: {source}")]
pub struct RunFault {
    /// Name of the ability that failed.
    pub ability: String,
    /// Where the walker stood.
    pub location: Location,
    /// The error as the body returned it.
    #[source]
    pub source: AbilityError,
    /// Reports emitted before the fault, in order.
    pub reports: Vec<Value>,
    /// Walker attributes at the time of the fault.
    pub walker_attrs: Attributes,
}
