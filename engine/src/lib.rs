//! OSP Engine
//!
//! The public entry point of the object-spatial runtime. An [`Engine`] pairs
//! an immutable ability registry with a shared graph and runs walkers over it:
//!
//! ```ignore
//! let outcome = engine.run("Visitor", attrs! { "budget" => 3i64 }, None)?;
//! for value in &outcome.reports {
//!     println!("{value:?}");
//! }
//! ```
//!
//! No tracing subscriber is installed here; hosts choose their own.

mod config;
mod engine;
mod error;

pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};

pub use osp_walker::{CancelToken, DisengageCause, RunFault, RunOutcome, RunState};
