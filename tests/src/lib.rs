//! OSP Behavioural Test Framework
//!
//! Provides a fluent API for setting up a schema, abilities and a labelled
//! seed graph, then running walkers against it.
//!
//! # Example
//!
//! ```ignore
//! use osp_tests::prelude::*;
//!
//! let world = Scenario::new("greeting")
//!     .schema(|reg| {
//!         reg.add_node_type("Person").done()?;
//!         reg.add_edge_type("knows").done()?;
//!         reg.add_walker_type("Greeter").done()?;
//!         reg.add_ability("hello", "Greeter", Trigger::Entry)
//!             .guard("Person")
//!             .body(ability(|ctx| {
//!                 ctx.report("hello");
//!                 Ok(())
//!             }))
//!             .done()?;
//!         Ok(())
//!     })
//!     .node("ada", "Person", attrs!())
//!     .edge("root", "ada", "knows", attrs!())
//!     .build()
//!     .unwrap();
//!
//! let outcome = world.run("Greeter", attrs!(), Some("ada")).unwrap();
//! assert_eq!(outcome.report_strings(), vec!["hello"]);
//! ```

mod assertion;

pub use assertion::{expect_fault, report_strings, OutcomeExt};
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::{Scenario, World, ROOT_LABEL};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{expect_fault, report_strings, OutcomeExt};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::scenario::{Scenario, World, ROOT_LABEL};

    pub use osp_core::{attrs, Attributes, EdgeId, Location, NodeId, Value};
    pub use osp_engine::{
        CancelToken, DisengageCause, Engine, EngineConfig, EngineError, RunFault, RunOutcome,
        RunState,
    };
    pub use osp_graph::{CompareOp, Direction, EdgeFilter, Graph, SharedGraph};
    pub use osp_registry::{AttrDef, RegistryError, Trigger};
    pub use osp_walker::{ability, AbilityContext, AbilityError, AbilityFn, AbilityRegistryBuilder};
}
