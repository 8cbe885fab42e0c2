//! OSP Core Types
//!
//! This crate provides the foundational types used throughout the OSP engine:
//! - Identity types (NodeId, EdgeId) with generational slots
//! - Archetype identifiers (TypeId, EdgeTypeId, WalkerTypeId)
//! - Value types (the Value enum stored in attribute bags)
//! - Entity structures (Node, Edge)
//! - Common error types

mod entity;
mod error;
mod id;
mod value;

pub use entity::*;
pub use error::*;
pub use id::*;
pub use value::*;
