//! Check engine.
//!
//! Path lookup, mapping flattening, the check registry and runner, run
//! orchestration, and the report event stream and tree.

pub mod events;
pub mod flatten;
pub mod orchestrator;
pub mod path;
pub mod registry;
pub mod result;
pub mod runner;
pub mod snapshot;
