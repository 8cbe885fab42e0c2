//! Engine error types.

use crate::config::ConfigError;
use osp_core::GraphError;
use osp_registry::RegistryError;
use osp_walker::RunFault;
use thiserror::Error;

/// Errors surfaced by [`crate::Engine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The start location or a graph operation was invalid.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Walker attributes failed schema validation.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The named type is not a registered walker type.
    #[error("Unknown walker type: {0}")]
    UnknownWalker(String),

    /// An ability failed. Partial reports are in the fault.
    #[error("Run faulted: {0}")]
    Fault(#[from] RunFault),

    /// The engine configuration was invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn unknown_walker(name: impl Into<String>) -> Self {
        Self::UnknownWalker(name.into())
    }

    /// The fault, if the run was aborted by an ability.
    pub fn as_fault(&self) -> Option<&RunFault> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
