//! Plugin implementations for the supported diagram types
//!
//! Each plugin implements the core traits for its diagram type; the
//! orchestrator drives them by [`DiagramKind`].

pub mod flowchart;
pub mod gantt;
pub mod orchestrator;

pub use flowchart::*;
pub use gantt::*;
pub use orchestrator::*;
