//! Core layout trait for diagram positioning
//!
//! Layout algorithms assign pixel geometry to the contents of a database.
//! They are deterministic single passes: the same database always yields
//! the same positions.

use anyhow::Result;

use super::Database;

/// Core trait for layout algorithms
///
/// # Example
/// ```
/// use drawbridge::core::{LayoutAlgorithm, Parser};
/// use drawbridge::plugins::flowchart::{
///     FlowchartDatabase, FlowchartLayoutAlgorithm, FlowchartParser,
/// };
///
/// let mut db = FlowchartDatabase::new();
/// FlowchartParser::new().parse("[A]\n[B]", &mut db).unwrap();
/// let positioned = FlowchartLayoutAlgorithm::new().layout(&db).unwrap();
/// assert_eq!(positioned.nodes.len(), 2);
/// ```
pub trait LayoutAlgorithm<D: Database>: Send + Sync {
    /// The output type of this layout algorithm
    type Output;

    /// Arrange elements in the database using this layout algorithm
    fn layout(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}
