//! Flowchart database implementation
//!
//! Stores the stage/subtask graph produced by the flowchart parser. Nodes
//! and edges keep insertion order, which is also the layout order.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

use crate::core::{Database, DiagramError};

/// Role of a flowchart node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Bracketed stage heading
    MainStage,
    /// Arrow-separated fragment hanging off a stage
    Subtask,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::MainStage => write!(f, "main_stage"),
            NodeKind::Subtask => write!(f, "subtask"),
        }
    }
}

/// Relationship carried by a flowchart edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEdgeKind {
    /// Successive stages, or successive subtasks of one stage
    Sequence,
    /// Stage to one of its subtasks
    Child,
}

impl FlowEdgeKind {
    /// Whether the rendered connector ends in an arrowhead
    pub fn has_arrow(&self) -> bool {
        matches!(self, FlowEdgeKind::Sequence)
    }
}

impl fmt::Display for FlowEdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowEdgeKind::Sequence => write!(f, "sequence"),
            FlowEdgeKind::Child => write!(f, "child"),
        }
    }
}

/// A node of the flowchart graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    pub id: String,
    pub text: String,
    pub level: usize,
    pub parent: Option<String>,
    pub kind: NodeKind,
}

impl FlowNode {
    /// Create a main-stage node (no parent)
    pub fn main_stage(id: impl Into<String>, text: impl Into<String>, level: usize) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
            parent: None,
            kind: NodeKind::MainStage,
        }
    }

    /// Create a subtask node under `parent`
    pub fn subtask(
        id: impl Into<String>,
        text: impl Into<String>,
        level: usize,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
            parent: Some(parent.into()),
            kind: NodeKind::Subtask,
        }
    }

    pub fn is_main_stage(&self) -> bool {
        self.kind == NodeKind::MainStage
    }
}

/// A directed edge of the flowchart graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub kind: FlowEdgeKind,
}

impl FlowEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: FlowEdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    pub fn sequence(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, FlowEdgeKind::Sequence)
    }

    pub fn child(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, FlowEdgeKind::Child)
    }
}

/// Flowchart database implementation
#[derive(Debug, Default, Serialize)]
pub struct FlowchartDatabase {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FlowchartDatabase {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a node exists
    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Main-stage nodes in parse order
    pub fn main_stages(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::MainStage)
    }

    /// Subtask nodes in parse order
    pub fn subtasks(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Subtask)
    }

    /// Subtasks whose parent is `parent_id`, in parse order
    pub fn children_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a FlowNode> {
        self.subtasks()
            .filter(move |n| n.parent.as_deref() == Some(parent_id))
    }

    /// Edges of one kind, in insertion order
    pub fn edges_of_kind(&self, kind: FlowEdgeKind) -> impl Iterator<Item = &FlowEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Edges pointing at `node_id`
    pub fn incoming(&self, node_id: &str) -> Vec<&FlowEdge> {
        self.edges.iter().filter(|e| e.to == node_id).collect()
    }
}

impl Database for FlowchartDatabase {
    type Node = FlowNode;
    type Edge = FlowEdge;

    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(
                DiagramError::database_error(format!("duplicate node id '{}'", node.id)).into(),
            );
        }
        trace!(id = %node.id, kind = %node.kind, level = node.level, "Adding node");
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        for endpoint in [&edge.from, &edge.to] {
            if !self.index.contains_key(endpoint) {
                return Err(DiagramError::database_error(format!(
                    "edge {} -> {} references unknown node '{}'",
                    edge.from, edge.to, endpoint
                ))
                .into());
            }
        }
        trace!(from = %edge.from, to = %edge.to, kind = %edge.kind, "Adding edge");
        self.edges.push(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.nodes.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.edges.iter()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index.clear();
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
