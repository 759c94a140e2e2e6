//! Core renderer trait for diagram output

use anyhow::Result;

use super::Database;

/// Core trait for diagram renderers
///
/// Renderers run their layout internally and produce the final document.
///
/// # Example
/// ```
/// use drawbridge::core::Renderer;
/// use drawbridge::plugins::flowchart::{FlowchartDatabase, FlowchartRenderer};
///
/// let db = FlowchartDatabase::new();
/// let xml = FlowchartRenderer::new().render(&db).unwrap();
/// assert!(xml.contains("<mxGraphModel"));
/// ```
pub trait Renderer<D: Database>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram database into the output format
    fn render(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
