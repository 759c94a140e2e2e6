//! Storage for parsed diagram content
//!
//! Flowcharts store stages, subtasks and the links between them; Gantt
//! charts store task rows and predecessor references. Both keep insertion
//! order, which the layouts use as drawing order.

use anyhow::Result;

/// Parsed content of one diagram
///
/// `Node` and `Edge` are the plugin's own records. Ids are the ones the
/// source text assigned (or the parser allocated); a Gantt table may repeat
/// an id, in which case `get_node` answers with the first occurrence.
pub trait Database: Send + Sync {
    type Node: Clone + Send + Sync;
    type Edge: Clone + Send + Sync;

    /// Append a node
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Append an edge; implementations may reject edges naming unknown nodes
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Nodes in insertion order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Edges in insertion order
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    fn clear(&mut self);

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// True when nothing has been parsed into the database
    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Whether some node carries `id`
    fn contains(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }
}
