//! Drawbridge - Convert symbolic diagram notation to draw.io files
//!
//! Two text formats are supported:
//!
//! - **Flowcharts**: bracketed stages (`[Design]`) with arrow-separated
//!   subtasks (`→ Mockups → Review`) on the same or indented lines.
//! - **Gantt charts**: a tab or double-space separated task table with
//!   `M<n>` month columns.
//!
//! Both produce an uncompressed draw.io (`mxfile`) XML document.
//!
//! # Quick Start
//!
//! ```rust
//! use drawbridge::convert_flowchart_to_drawio;
//!
//! let xml = convert_flowchart_to_drawio("[Plan]\n  → Draft → Review\n[Ship]", None).unwrap();
//! assert!(xml.contains("value=\"Draft\""));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use drawbridge::prelude::*;
//!
//! let table = "任务ID\t任务名称\t开始时间\t结束时间\n1\tKickoff\tM0\tM2";
//!
//! // Parse into a database
//! let mut database = GanttDatabase::new();
//! GanttParser::new().parse(table, &mut database).unwrap();
//! assert_eq!(database.node_count(), 1);
//!
//! // Render with dependency arrows switched on
//! let renderer = GanttRenderer::new()
//!     .with_options(GanttRenderOptions::default().with_dependencies(true));
//! let xml = renderer.render(&database).unwrap();
//! assert!(xml.contains("id=\"bar_1\""));
//! ```

pub mod core;
pub mod plugins;

use std::path::Path;

pub use crate::core::*;
pub use crate::plugins::orchestrator::{Conversion, DiagramKind, Orchestrator};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Database, Diagram, DiagramError, DrawioDocument, FileMeta, LayoutAlgorithm, Parser,
        Renderer,
    };
    pub use crate::plugins::flowchart::{
        FlowchartDatabase, FlowchartDiagram, FlowchartLayoutAlgorithm, FlowchartLayoutConfig,
        FlowchartParser, FlowchartRenderer,
    };
    pub use crate::plugins::gantt::{
        GanttDatabase, GanttDiagram, GanttLayoutAlgorithm, GanttLayoutConfig, GanttParser,
        GanttRenderOptions, GanttRenderer,
    };
    pub use crate::plugins::orchestrator::{Conversion, DiagramKind, Orchestrator};
}

/// Convert flowchart notation to a draw.io document
///
/// When `output` is given the document is also written to that path.
///
/// # Errors
/// * [`DiagramError::EmptyInput`] for whitespace-only text
/// * I/O errors while writing `output`
///
/// # Example
/// ```rust
/// use drawbridge::convert_flowchart_to_drawio;
///
/// let xml = convert_flowchart_to_drawio("[Start]\n[End]", None).unwrap();
/// assert!(xml.contains("value=\"Start\""));
/// assert!(xml.contains("value=\"End\""));
/// ```
pub fn convert_flowchart_to_drawio(text: &str, output: Option<&Path>) -> anyhow::Result<String> {
    Orchestrator::new()
        .convert(DiagramKind::Flowchart, text, output)
        .map(|conversion| conversion.xml)
}

/// Convert a Gantt task table to a draw.io document
///
/// When `output` is given the document is also written to that path.
///
/// # Errors
/// * [`DiagramError::EmptyInput`] for whitespace-only text
/// * [`DiagramError::NoTasks`] when no task row could be read
/// * I/O errors while writing `output`
///
/// # Example
/// ```rust
/// use drawbridge::convert_gantt_to_drawio;
///
/// let table = "任务ID\t任务名称\t开始时间\t结束时间\n1\t启动\tM0\tM2";
/// let xml = convert_gantt_to_drawio(table, None).unwrap();
/// assert!(xml.contains("value=\"启动\""));
/// ```
pub fn convert_gantt_to_drawio(text: &str, output: Option<&Path>) -> anyhow::Result<String> {
    Orchestrator::new()
        .convert(DiagramKind::Gantt, text, output)
        .map(|conversion| conversion.xml)
}

/// Parse flowchart notation into a database without rendering
///
/// # Example
/// ```rust
/// use drawbridge::parse_flowchart;
/// use drawbridge::prelude::Database;
///
/// let db = parse_flowchart("[A] → a1 → a2\n[B]").unwrap();
/// assert_eq!(db.main_stages().count(), 2);
/// assert_eq!(db.subtasks().count(), 3);
/// ```
pub fn parse_flowchart(text: &str) -> anyhow::Result<plugins::flowchart::FlowchartDatabase> {
    Orchestrator::new().parse::<plugins::flowchart::FlowchartDiagram>(text)
}

/// Parse a Gantt task table into a database without rendering
///
/// Unlike [`convert_gantt_to_drawio`], a table without task rows is not an
/// error here; the database is simply empty.
pub fn parse_gantt(text: &str) -> anyhow::Result<plugins::gantt::GanttDatabase> {
    Orchestrator::new().parse::<plugins::gantt::GanttDiagram>(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_flowchart() {
        let xml = convert_flowchart_to_drawio("[A]\n  → x", None).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("value=\"x\""));
    }

    #[test]
    fn test_convert_gantt() {
        let table = "任务ID\t任务名称\n1\tA\tM0\tM3\n2\tB\tM3\tM4\t1月\t1\tOps";
        let xml = convert_gantt_to_drawio(table, None).unwrap();
        assert!(xml.contains("id=\"remark_2\""));
        assert!(!xml.contains("id=\"remark_1\""));
    }

    #[test]
    fn test_convert_empty_input() {
        let err = convert_flowchart_to_drawio("   ", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::EmptyInput)
        ));
    }

    #[test]
    fn test_convert_gantt_no_tasks() {
        let err = convert_gantt_to_drawio("任务ID\t任务名称", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::NoTasks)
        ));
    }

    #[test]
    fn test_parse_gantt_allows_empty_table() {
        let db = parse_gantt("任务ID\t任务名称").unwrap();
        assert!(db.is_empty());
    }

    #[test]
    fn test_parse_flowchart() {
        let db = parse_flowchart("Plan: q3\n[A]\n[B]").unwrap();
        assert_eq!(db.node_count(), 2);
        assert_eq!(db.edge_count(), 1);
    }
}
