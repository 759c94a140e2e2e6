//! Flowchart layout implementation
//!
//! Two deterministic phases:
//!
//! 1. Main stages are stacked vertically in parse order at a fixed x.
//! 2. Subtasks are grouped by parent and spread horizontally below it,
//!    the group centred on the parent's x.
//!
//! Edges do not influence placement; they are only filtered so that both
//! endpoints have a position.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, span, trace, Level};

use super::database::{FlowEdgeKind, FlowNode, FlowchartDatabase};
use crate::core::{Database, LayoutAlgorithm};

/// Geometry constants for flowchart layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowchartLayoutConfig {
    /// x of every main stage
    pub main_x: f64,
    /// y of the first main stage
    pub start_y: f64,
    /// Vertical distance between successive main stages
    pub stage_spacing: f64,
    /// Horizontal distance between sibling subtasks
    pub subtask_spacing: f64,
    /// Vertical offset of subtasks below their parent
    pub subtask_offset: f64,
    pub node_height: f64,
    pub min_node_width: f64,
    /// Width budget per character of node text
    pub char_width: f64,
    pub text_padding: f64,
}

impl Default for FlowchartLayoutConfig {
    fn default() -> Self {
        Self {
            main_x: 300.0,
            start_y: 50.0,
            stage_spacing: 150.0,
            subtask_spacing: 180.0,
            subtask_offset: 80.0,
            node_height: 40.0,
            min_node_width: 120.0,
            char_width: 8.0,
            text_padding: 40.0,
        }
    }
}

impl FlowchartLayoutConfig {
    /// Box width for a node label: `max(min, chars * char_width + padding)`
    pub fn node_width(&self, text: &str) -> f64 {
        let chars = text.chars().count() as f64;
        (chars * self.char_width + self.text_padding).max(self.min_node_width)
    }
}

/// Position data for a laid out node
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An edge whose endpoints both received a position
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedEdge {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub kind: FlowEdgeKind,
}

/// Layout output containing positioned elements
#[derive(Debug, Default)]
pub struct FlowchartLayoutResult {
    /// Positioned nodes in database order
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
}

impl FlowchartLayoutResult {
    /// Find the position of a node by id
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Flowchart layout algorithm
pub struct FlowchartLayoutAlgorithm {
    config: FlowchartLayoutConfig,
}

impl FlowchartLayoutAlgorithm {
    pub fn new() -> Self {
        Self::with_config(FlowchartLayoutConfig::default())
    }

    pub fn with_config(config: FlowchartLayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlowchartLayoutConfig {
        &self.config
    }

    fn place_main_stages<'a>(
        &self,
        database: &'a FlowchartDatabase,
        positions: &mut HashMap<&'a str, (f64, f64)>,
    ) {
        for (i, node) in database.main_stages().enumerate() {
            let y = self.config.start_y + i as f64 * self.config.stage_spacing;
            trace!(id = %node.id, x = self.config.main_x, y, "Placed main stage");
            positions.insert(node.id.as_str(), (self.config.main_x, y));
        }
    }

    fn place_subtasks<'a>(
        &self,
        database: &'a FlowchartDatabase,
        positions: &mut HashMap<&'a str, (f64, f64)>,
    ) {
        // Group by parent, keeping first-seen parent order
        let mut groups: Vec<(&'a str, Vec<&'a FlowNode>)> = Vec::new();
        for subtask in database.subtasks() {
            let Some(parent) = subtask.parent.as_deref() else {
                continue;
            };
            match groups.iter_mut().find(|(p, _)| *p == parent) {
                Some((_, children)) => children.push(subtask),
                None => groups.push((parent, vec![subtask])),
            }
        }

        let spacing = self.config.subtask_spacing;
        for (parent, children) in groups {
            let Some(&(parent_x, parent_y)) = positions.get(parent) else {
                debug!(parent, dropped = children.len(), "Parent has no position, skipping subtasks");
                continue;
            };

            let total_width = children.len() as f64 * spacing;
            let start_x = parent_x - total_width / 2.0 + spacing / 2.0;
            let y = parent_y + self.config.subtask_offset;

            for (i, child) in children.into_iter().enumerate() {
                let x = start_x + i as f64 * spacing;
                trace!(id = %child.id, parent, x, y, "Placed subtask");
                positions.insert(child.id.as_str(), (x, y));
            }
        }
    }
}

impl Default for FlowchartLayoutAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutAlgorithm<FlowchartDatabase> for FlowchartLayoutAlgorithm {
    type Output = FlowchartLayoutResult;

    fn layout(&self, database: &FlowchartDatabase) -> Result<Self::Output> {
        let layout_span = span!(
            Level::INFO,
            "layout_flowchart",
            node_count = database.node_count(),
            edge_count = database.edge_count()
        );
        let _enter = layout_span.enter();

        let mut positions: HashMap<&str, (f64, f64)> = HashMap::new();
        self.place_main_stages(database, &mut positions);
        self.place_subtasks(database, &mut positions);

        let nodes: Vec<PositionedNode> = database
            .nodes()
            .filter_map(|node| {
                positions.get(node.id.as_str()).map(|&(x, y)| PositionedNode {
                    id: node.id.clone(),
                    x,
                    y,
                    width: self.config.node_width(&node.text),
                    height: self.config.node_height,
                })
            })
            .collect();

        let edges: Vec<PositionedEdge> = database
            .edges()
            .filter(|edge| {
                positions.contains_key(edge.from.as_str()) && positions.contains_key(edge.to.as_str())
            })
            .map(|edge| PositionedEdge {
                id: format!("edge_{}_{}", edge.from, edge.to),
                from_id: edge.from.clone(),
                to_id: edge.to.clone(),
                kind: edge.kind,
            })
            .collect();

        info!(
            positioned_nodes = nodes.len(),
            positioned_edges = edges.len(),
            dropped_nodes = database.node_count() - nodes.len(),
            "Flowchart layout completed"
        );

        Ok(FlowchartLayoutResult { nodes, edges })
    }

    fn name(&self) -> &'static str {
        "stacked-stages"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}
