//! draw.io document model
//!
//! Shared output surface for every renderer. A [`DrawioDocument`] holds the
//! flat list of `mxCell`s of one diagram page; [`DrawioDocument::to_xml`]
//! wraps them in the `mxfile > diagram > mxGraphModel > root` envelope,
//! prepends the two structural cells draw.io requires (`0`, and `1` parented
//! to `0`) and pretty-prints the result.

use std::collections::HashSet;
use std::fmt::Write as _;

use anyhow::Result;

use super::{DiagramError, Style};

/// Id of the structural root cell
pub const ROOT_CELL_ID: &str = "0";

/// Id of the default layer every drawn cell is parented to
pub const LAYER_CELL_ID: &str = "1";

/// Attributes of the `mxfile` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub host: String,
    pub modified: String,
    pub agent: String,
    pub version: String,
    pub etag: String,
    pub file_type: String,
}

impl Default for FileMeta {
    fn default() -> Self {
        Self {
            host: "app.diagrams.net".to_string(),
            modified: "2024-01-01T00:00:00.000Z".to_string(),
            agent: "5.0".to_string(),
            version: "21.0.0".to_string(),
            etag: "xxx".to_string(),
            file_type: "device".to_string(),
        }
    }
}

impl FileMeta {
    /// Replace the `modified` timestamp
    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = modified.into();
        self
    }
}

/// Canvas attributes of the `mxGraphModel` element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphModel {
    pub dx: f64,
    pub dy: f64,
    pub page_width: f64,
    pub page_height: f64,
}

impl GraphModel {
    pub fn new(dx: f64, dy: f64, page_width: f64, page_height: f64) -> Self {
        Self {
            dx,
            dy,
            page_width,
            page_height,
        }
    }
}

/// A point inside an edge geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MxPoint {
    pub x: f64,
    pub y: f64,
}

impl MxPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geometry of a cell: absolute bounds for vertices, relative with optional
/// terminal and waypoint coordinates for edges
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MxGeometry {
    pub bounds: Option<(f64, f64, f64, f64)>,
    pub relative: bool,
    pub source_point: Option<MxPoint>,
    pub target_point: Option<MxPoint>,
    pub points: Vec<MxPoint>,
}

impl MxGeometry {
    /// Absolute vertex bounds
    pub fn bounds(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            bounds: Some((x, y, width, height)),
            ..Self::default()
        }
    }

    /// Relative edge geometry without explicit coordinates
    pub fn relative() -> Self {
        Self {
            relative: true,
            ..Self::default()
        }
    }

    pub fn with_source_point(mut self, point: MxPoint) -> Self {
        self.source_point = Some(point);
        self
    }

    pub fn with_target_point(mut self, point: MxPoint) -> Self {
        self.target_point = Some(point);
        self
    }

    /// Intermediate waypoints, emitted as `<Array as="points">`
    pub fn with_points(mut self, points: Vec<MxPoint>) -> Self {
        self.points = points;
        self
    }

    fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("mxGeometry");
        if let Some((x, y, width, height)) = self.bounds {
            element.attr("x", format_number(x));
            element.attr("y", format_number(y));
            element.attr("width", format_number(width));
            element.attr("height", format_number(height));
        }
        if self.relative {
            element.attr("relative", "1");
        }
        element.attr("as", "geometry");

        if let Some(point) = self.source_point {
            element.child(point_element(point, Some("sourcePoint")));
        }
        if let Some(point) = self.target_point {
            element.child(point_element(point, Some("targetPoint")));
        }
        if !self.points.is_empty() {
            let mut array = XmlElement::new("Array");
            array.attr("as", "points");
            for point in &self.points {
                array.child(point_element(*point, None));
            }
            element.child(array);
        }
        element
    }
}

/// Whether a cell is drawn as a shape or a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Vertex,
    Edge,
}

/// One drawn `mxCell`, always parented to the default layer
#[derive(Debug, Clone, PartialEq)]
pub struct MxCell {
    pub id: String,
    pub value: String,
    pub style: Style,
    pub kind: CellKind,
    pub source: Option<String>,
    pub target: Option<String>,
    pub geometry: MxGeometry,
}

impl MxCell {
    /// Create a vertex cell
    pub fn vertex(
        id: impl Into<String>,
        value: impl Into<String>,
        style: Style,
        geometry: MxGeometry,
    ) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            style,
            kind: CellKind::Vertex,
            source: None,
            target: None,
            geometry,
        }
    }

    /// Create an edge cell with an empty label
    pub fn edge(id: impl Into<String>, style: Style, geometry: MxGeometry) -> Self {
        Self {
            id: id.into(),
            value: String::new(),
            style,
            kind: CellKind::Edge,
            source: None,
            target: None,
            geometry,
        }
    }

    /// Attach the edge to source and target cells
    pub fn connect(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.target = Some(target.into());
        self
    }

    pub fn is_vertex(&self) -> bool {
        self.kind == CellKind::Vertex
    }

    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("mxCell");
        element.attr("id", self.id.clone());
        element.attr("value", self.value.clone());
        element.attr("style", self.style.to_string());
        match self.kind {
            CellKind::Vertex => element.attr("vertex", "1"),
            CellKind::Edge => element.attr("edge", "1"),
        }
        element.attr("parent", LAYER_CELL_ID);
        if let Some(source) = &self.source {
            element.attr("source", source.clone());
        }
        if let Some(target) = &self.target {
            element.attr("target", target.clone());
        }
        element.child(self.geometry.to_element());
        element
    }
}

/// A single-page draw.io document
#[derive(Debug, Clone)]
pub struct DrawioDocument {
    meta: FileMeta,
    diagram_id: String,
    diagram_name: String,
    model: GraphModel,
    cells: Vec<MxCell>,
}

impl DrawioDocument {
    /// Create an empty document for one diagram page
    pub fn new(
        meta: FileMeta,
        diagram_id: impl Into<String>,
        diagram_name: impl Into<String>,
        model: GraphModel,
    ) -> Self {
        Self {
            meta,
            diagram_id: diagram_id.into(),
            diagram_name: diagram_name.into(),
            model,
            cells: Vec::new(),
        }
    }

    /// Append a cell after the ones already present
    pub fn push(&mut self, cell: MxCell) {
        self.cells.push(cell);
    }

    /// Drawn cells, excluding the two structural cells
    pub fn cells(&self) -> &[MxCell] {
        &self.cells
    }

    /// Find a drawn cell by id
    pub fn cell(&self, id: &str) -> Option<&MxCell> {
        self.cells.iter().find(|cell| cell.id == id)
    }

    pub fn model(&self) -> GraphModel {
        self.model
    }

    /// Check the id invariants draw.io relies on
    ///
    /// Ids must be unique (including against the structural cells) and
    /// every edge endpoint must name a vertex of this document.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::from([ROOT_CELL_ID, LAYER_CELL_ID]);
        for cell in &self.cells {
            if !seen.insert(cell.id.as_str()) {
                return Err(
                    DiagramError::render_error(format!("duplicate cell id '{}'", cell.id)).into(),
                );
            }
        }

        let vertices: HashSet<&str> = self
            .cells
            .iter()
            .filter(|cell| cell.is_vertex())
            .map(|cell| cell.id.as_str())
            .collect();
        for cell in self.cells.iter().filter(|cell| cell.is_edge()) {
            for endpoint in [&cell.source, &cell.target].into_iter().flatten() {
                if !vertices.contains(endpoint.as_str()) {
                    return Err(DiagramError::render_error(format!(
                        "edge '{}' references unknown cell '{}'",
                        cell.id, endpoint
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Serialize to an indented `mxfile` XML string
    pub fn to_xml(&self) -> String {
        let mut root = XmlElement::new("root");
        let mut root_cell = XmlElement::new("mxCell");
        root_cell.attr("id", ROOT_CELL_ID);
        root.child(root_cell);
        let mut layer_cell = XmlElement::new("mxCell");
        layer_cell.attr("id", LAYER_CELL_ID);
        layer_cell.attr("parent", ROOT_CELL_ID);
        root.child(layer_cell);
        for cell in &self.cells {
            root.child(cell.to_element());
        }

        let mut model = XmlElement::new("mxGraphModel");
        model.attr("dx", format_number(self.model.dx));
        model.attr("dy", format_number(self.model.dy));
        for (key, value) in [
            ("grid", "1"),
            ("gridSize", "10"),
            ("guides", "1"),
            ("tooltips", "1"),
            ("connect", "1"),
            ("arrows", "1"),
            ("fold", "1"),
            ("page", "1"),
            ("pageScale", "1"),
        ] {
            model.attr(key, value);
        }
        model.attr("pageWidth", format_number(self.model.page_width));
        model.attr("pageHeight", format_number(self.model.page_height));
        model.attr("math", "0");
        model.attr("shadow", "0");
        model.child(root);

        let mut diagram = XmlElement::new("diagram");
        diagram.attr("id", self.diagram_id.clone());
        diagram.attr("name", self.diagram_name.clone());
        diagram.child(model);

        let mut file = XmlElement::new("mxfile");
        file.attr("host", self.meta.host.clone());
        file.attr("modified", self.meta.modified.clone());
        file.attr("agent", self.meta.agent.clone());
        file.attr("version", self.meta.version.clone());
        file.attr("etag", self.meta.etag.clone());
        file.attr("type", self.meta.file_type.clone());
        file.child(diagram);

        let mut out = String::from("<?xml version=\"1.0\" ?>\n");
        file.write_pretty(&mut out, 0);
        out
    }
}

/// Format a coordinate the way draw.io files usually carry them: integral
/// values without a fractional part
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // also folds -0.0
        return "0".to_string();
    }
    format!("{}", value)
}

fn point_element(point: MxPoint, role: Option<&'static str>) -> XmlElement {
    let mut element = XmlElement::new("mxPoint");
    element.attr("x", format_number(point.x));
    element.attr("y", format_number(point.y));
    if let Some(role) = role {
        element.attr("as", role);
    }
    element
}

/// Minimal element tree used for serialization
#[derive(Debug, Clone)]
struct XmlElement {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    fn attr(&mut self, key: &'static str, value: impl Into<String>) {
        self.attrs.push((key, value.into()));
    }

    fn child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(self.name);
        for (key, value) in &self.attrs {
            // Writing into a String cannot fail
            let _ = write!(out, " {}=\"{}\"", key, escape_attr(value));
        }
        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");
        for child in &self.children {
            child.write_pretty(out, depth + 1);
        }
        out.push_str(&indent);
        let _ = writeln!(out, "</{}>", self.name);
    }
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
