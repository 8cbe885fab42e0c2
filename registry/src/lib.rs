//! OSP Registry
//!
//! Runtime lookup of node, edge and walker types and of the abilities bound to
//! them. The registry is immutable after construction via RegistryBuilder; its
//! dispatch table maps `(owner archetype, trigger)` to abilities in
//! registration order.

mod builder;
mod error;
mod registry;
mod types;

pub use builder::{AbilityBuilder, ArchetypeBuilder, RegistryBuilder, ROOT_TYPE_NAME};
pub use error::{RegistryError, RegistryResult};
pub use registry::Registry;
pub use types::*;
