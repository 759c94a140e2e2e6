//! Gantt chart plugin
//!
//! Task tables with month-based start and end columns, drawn as a
//! three-column chart: task names, remarks, and bars on a month axis.

use crate::core::Diagram;

mod database;
mod layout;
mod parser;
mod renderer;

pub use database::*;
pub use layout::*;
pub use parser::*;
pub use renderer::*;

/// Gantt diagram implementation
pub struct GanttDiagram;

impl Diagram for GanttDiagram {
    type Database = GanttDatabase;
    type Parser = GanttParser;
    type Renderer = GanttRenderer;

    fn create_parser() -> Self::Parser {
        GanttParser::new()
    }

    fn create_database() -> Self::Database {
        GanttDatabase::new()
    }

    fn create_renderer() -> Self::Renderer {
        GanttRenderer::new()
    }

    fn name() -> &'static str {
        "gantt"
    }

    fn version() -> &'static str {
        "0.1.0"
    }
}
