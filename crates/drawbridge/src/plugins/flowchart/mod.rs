//! Flowchart diagram plugin
//!
//! Bracketed stages stacked top to bottom, with arrow-separated subtasks
//! fanned out below each stage.

use crate::core::Diagram;

mod database;
mod layout;
mod parser;
mod renderer;

pub use database::*;
pub use layout::*;
pub use parser::*;
pub use renderer::*;

/// Flowchart diagram implementation
pub struct FlowchartDiagram;

impl Diagram for FlowchartDiagram {
    type Database = FlowchartDatabase;
    type Parser = FlowchartParser;
    type Renderer = FlowchartRenderer;

    fn create_parser() -> Self::Parser {
        FlowchartParser::new()
    }

    fn create_database() -> Self::Database {
        FlowchartDatabase::new()
    }

    fn create_renderer() -> Self::Renderer {
        FlowchartRenderer::new()
    }

    fn name() -> &'static str {
        "flowchart"
    }

    fn version() -> &'static str {
        "0.1.0"
    }
}
