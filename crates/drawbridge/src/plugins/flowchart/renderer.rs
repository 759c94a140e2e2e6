//! draw.io rendering for flowcharts
//!
//! Turns the positioned stage graph into an `mxfile` document: one vertex
//! per placed node, one connector per edge with both endpoints placed.

use anyhow::Result;
use tracing::{info, span, warn, Level};

use super::database::{FlowEdgeKind, FlowNode, FlowchartDatabase};
use super::layout::{FlowchartLayoutAlgorithm, FlowchartLayoutConfig};
use crate::core::{
    Database, DrawioDocument, FileMeta, GraphModel, LayoutAlgorithm, MxCell, MxGeometry, Renderer,
    Style,
};

/// Fill and stroke colors of a node box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTheme {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub bold: bool,
}

impl NodeTheme {
    /// Top-level nodes
    pub const STAGE: NodeTheme = NodeTheme {
        fill: "#d5e8d4",
        stroke: "#82b366",
        bold: true,
    };
    /// Parentless nodes below the top level
    pub const NESTED_STAGE: NodeTheme = NodeTheme {
        fill: "#fff2cc",
        stroke: "#d6b656",
        bold: false,
    };
    /// Everything else
    pub const DEFAULT: NodeTheme = NodeTheme {
        fill: "#dae8fc",
        stroke: "#6c8ebf",
        bold: false,
    };

    /// Pick the theme for a node from its level and parent
    pub fn for_node(node: &FlowNode) -> NodeTheme {
        if node.level == 0 {
            Self::STAGE
        } else if node.parent.is_none() {
            Self::NESTED_STAGE
        } else {
            Self::DEFAULT
        }
    }

    pub fn style(&self) -> Style {
        let style = Style::new()
            .with("rounded", 1)
            .with("whiteSpace", "wrap")
            .with("html", 1)
            .with("fillColor", self.fill)
            .with("strokeColor", self.stroke);
        if self.bold {
            style.with("fontStyle", 1)
        } else {
            style
        }
    }
}

/// Connector style for an edge kind
pub fn edge_style(kind: FlowEdgeKind) -> Style {
    let style = Style::new()
        .with("edgeStyle", "orthogonalEdgeStyle")
        .with("rounded", 0)
        .with("orthogonalLoop", 1)
        .with("jettySize", "auto")
        .with("html", 1);
    if kind.has_arrow() {
        style.with("endArrow", "block").with("endFill", 1)
    } else {
        style
    }
}

/// draw.io flowchart renderer
pub struct FlowchartRenderer {
    layout: FlowchartLayoutAlgorithm,
    meta: FileMeta,
}

impl FlowchartRenderer {
    pub fn new() -> Self {
        Self {
            layout: FlowchartLayoutAlgorithm::new(),
            meta: FileMeta::default(),
        }
    }

    /// Use custom layout geometry
    pub fn with_layout_config(mut self, config: FlowchartLayoutConfig) -> Self {
        self.layout = FlowchartLayoutAlgorithm::with_config(config);
        self
    }

    /// Use custom `mxfile` attributes
    pub fn with_meta(mut self, meta: FileMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Build the document without serializing it
    pub fn build_document(&self, database: &FlowchartDatabase) -> Result<DrawioDocument> {
        let positioned = self.layout.layout(database)?;

        let mut document = DrawioDocument::new(
            self.meta.clone(),
            "flowchart",
            "流程图",
            GraphModel::new(1422.0, 794.0, 1169.0, 827.0),
        );

        for placed in &positioned.nodes {
            let Some(node) = database.get_node(&placed.id) else {
                continue;
            };
            document.push(MxCell::vertex(
                &placed.id,
                &node.text,
                NodeTheme::for_node(node).style(),
                MxGeometry::bounds(placed.x, placed.y, placed.width, placed.height),
            ));
        }

        for edge in &positioned.edges {
            document.push(
                MxCell::edge(&edge.id, edge_style(edge.kind), MxGeometry::relative())
                    .connect(&edge.from_id, &edge.to_id),
            );
        }

        document.validate()?;
        Ok(document)
    }
}

impl Default for FlowchartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<FlowchartDatabase> for FlowchartRenderer {
    type Output = String;

    fn render(&self, database: &FlowchartDatabase) -> Result<Self::Output> {
        let render_span = span!(
            Level::INFO,
            "render_flowchart",
            node_count = database.node_count(),
            edge_count = database.edge_count()
        );
        let _enter = render_span.enter();

        if database.is_empty() {
            warn!("No flowchart nodes to render, emitting an empty canvas");
        }

        let document = self.build_document(database)?;
        info!(cell_count = document.cells().len(), "Flowchart rendering completed");
        Ok(document.to_xml())
    }

    fn name(&self) -> &'static str {
        "drawio-flowchart"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "drawio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Parser;
    use crate::plugins::flowchart::FlowchartParser;

    fn render(input: &str) -> String {
        let mut db = FlowchartDatabase::new();
        FlowchartParser::new().parse(input, &mut db).unwrap();
        FlowchartRenderer::new().render(&db).unwrap()
    }

    #[test]
    fn test_node_themes() {
        let top = FlowNode::main_stage("a", "A", 0);
        let nested = FlowNode::main_stage("b", "B", 1);
        let child = FlowNode::subtask("c", "C", 1, "a");
        assert_eq!(NodeTheme::for_node(&top), NodeTheme::STAGE);
        assert_eq!(NodeTheme::for_node(&nested), NodeTheme::NESTED_STAGE);
        assert_eq!(NodeTheme::for_node(&child), NodeTheme::DEFAULT);

        assert_eq!(
            NodeTheme::STAGE.style().to_string(),
            "rounded=1;whiteSpace=wrap;html=1;fillColor=#d5e8d4;strokeColor=#82b366;fontStyle=1;"
        );
        assert_eq!(
            NodeTheme::DEFAULT.style().to_string(),
            "rounded=1;whiteSpace=wrap;html=1;fillColor=#dae8fc;strokeColor=#6c8ebf;"
        );
    }

    #[test]
    fn test_edge_styles() {
        assert_eq!(
            edge_style(FlowEdgeKind::Child).to_string(),
            "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;"
        );
        assert_eq!(
            edge_style(FlowEdgeKind::Sequence).to_string(),
            "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;endArrow=block;endFill=1;"
        );
    }

    #[test]
    fn test_render_vertices_and_edges() {
        let xml = render("[Plan]\n  → Draft → Review\n[Ship]");
        assert!(xml.contains(
            "<mxCell id=\"node_0\" value=\"Plan\" style=\"rounded=1;whiteSpace=wrap;html=1;fillColor=#d5e8d4;strokeColor=#82b366;fontStyle=1;\" vertex=\"1\" parent=\"1\">"
        ));
        assert!(xml.contains("<mxGeometry x=\"300\" y=\"50\" width=\"120\" height=\"40\" as=\"geometry\"/>"));
        assert!(xml.contains("source=\"node_1\" target=\"node_2\""));
        assert!(xml.contains("id=\"edge_node_0_node_3\""));
        assert_eq!(xml.matches("vertex=\"1\"").count(), 4);
        assert_eq!(xml.matches("edge=\"1\"").count(), 4);
    }

    #[test]
    fn test_render_escapes_text() {
        let xml = render("[R&D <phase>]");
        assert!(xml.contains("value=\"R&amp;D &lt;phase&gt;\""));
    }

    #[test]
    fn test_render_empty_database() {
        let xml = FlowchartRenderer::new()
            .render(&FlowchartDatabase::new())
            .unwrap();
        assert!(xml.contains("<mxCell id=\"0\"/>"));
        assert!(xml.contains("<mxCell id=\"1\" parent=\"0\"/>"));
        assert!(!xml.contains("vertex=\"1\""));
    }

    #[test]
    fn test_custom_meta() {
        let mut db = FlowchartDatabase::new();
        FlowchartParser::new().parse("[A]", &mut db).unwrap();
        let xml = FlowchartRenderer::new()
            .with_meta(FileMeta::default().with_modified("2030-05-01T10:00:00.000Z"))
            .render(&db)
            .unwrap();
        assert!(xml.contains("modified=\"2030-05-01T10:00:00.000Z\""));
    }
}
