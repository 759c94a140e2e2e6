//! Core diagram trait tying the pipeline stages together
//!
//! Each diagram plugin exposes its database, parser and renderer types
//! through this trait so the orchestrator can drive any of them generically.

use super::{Database, Parser, Renderer};

/// Core trait for diagram types
///
/// # Example
/// ```
/// use drawbridge::core::Diagram;
/// use drawbridge::plugins::gantt::GanttDiagram;
///
/// assert_eq!(GanttDiagram::name(), "gantt");
/// let _parser = GanttDiagram::create_parser();
/// ```
pub trait Diagram: Send + Sync {
    /// The specific database type for this diagram
    type Database: Database + Send + Sync;

    /// The parser type for this diagram
    type Parser: Parser<Self::Database> + Send + Sync;

    /// The renderer type for this diagram
    type Renderer: Renderer<Self::Database, Output = String> + Send + Sync;

    /// Create a new parser instance
    fn create_parser() -> Self::Parser;

    /// Create a new database instance
    fn create_database() -> Self::Database;

    /// Create a new renderer instance with default settings
    fn create_renderer() -> Self::Renderer;

    /// Get the name of this diagram type
    fn name() -> &'static str;

    /// Get the version of this diagram type
    fn version() -> &'static str;
}
