//! Pipeline orchestration
//!
//! Runs parser → database → renderer for a chosen diagram kind, enforces the
//! input checks shared by every entry point (library functions and CLI), and
//! optionally writes the resulting document to disk.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, span, warn, Level};

use crate::core::{Database, Diagram, DiagramError, FileMeta, Parser, Renderer};
use crate::plugins::flowchart::{FlowchartDiagram, FlowchartLayoutConfig, FlowchartRenderer};
use crate::plugins::gantt::{GanttDiagram, GanttLayoutConfig, GanttRenderOptions, GanttRenderer};

/// Supported diagram kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Flowchart,
    Gantt,
}

impl DiagramKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => FlowchartDiagram::name(),
            DiagramKind::Gantt => GanttDiagram::name(),
        }
    }

    /// File name used when the caller gives no output path
    pub fn default_output(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "flowchart.drawio",
            DiagramKind::Gantt => "gantt.drawio",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flowchart" => Ok(DiagramKind::Flowchart),
            "gantt" => Ok(DiagramKind::Gantt),
            _ => Err(format!("Unknown diagram kind: {}", s)),
        }
    }
}

/// Result of one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub kind: DiagramKind,
    /// The draw.io document
    pub xml: String,
    /// Parsed nodes (flowchart) or tasks (gantt)
    pub element_count: usize,
}

/// Coordinates parsing and rendering for both diagram kinds
///
/// # Example
/// ```
/// use drawbridge::plugins::{DiagramKind, Orchestrator};
///
/// let conversion = Orchestrator::new()
///     .process(DiagramKind::Flowchart, "[Plan]\n[Build]")
///     .unwrap();
/// assert_eq!(conversion.element_count, 2);
/// assert!(conversion.xml.contains("<mxfile"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    meta: FileMeta,
    flowchart_layout: FlowchartLayoutConfig,
    gantt_layout: GanttLayoutConfig,
    gantt_options: GanttRenderOptions,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom `mxfile` attributes for every document
    pub fn with_meta(mut self, meta: FileMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_flowchart_layout(mut self, config: FlowchartLayoutConfig) -> Self {
        self.flowchart_layout = config;
        self
    }

    pub fn with_gantt_layout(mut self, config: GanttLayoutConfig) -> Self {
        self.gantt_layout = config;
        self
    }

    pub fn with_gantt_options(mut self, options: GanttRenderOptions) -> Self {
        self.gantt_options = options;
        self
    }

    pub fn meta(&self) -> &FileMeta {
        &self.meta
    }

    pub fn flowchart_renderer(&self) -> FlowchartRenderer {
        FlowchartDiagram::create_renderer()
            .with_layout_config(self.flowchart_layout)
            .with_meta(self.meta.clone())
    }

    pub fn gantt_renderer(&self) -> GanttRenderer {
        GanttDiagram::create_renderer()
            .with_layout_config(self.gantt_layout)
            .with_options(self.gantt_options)
            .with_meta(self.meta.clone())
    }

    /// Parse text into a fresh database of diagram type `D`
    ///
    /// Whitespace-only input is rejected with [`DiagramError::EmptyInput`].
    pub fn parse<D: Diagram>(&self, input: &str) -> Result<D::Database> {
        if input.trim().is_empty() {
            warn!(diagram = D::name(), "Refusing empty input");
            return Err(DiagramError::EmptyInput.into());
        }

        let parse_span = span!(Level::DEBUG, "pipeline_parse", diagram = D::name());
        let _enter = parse_span.enter();

        let parser = D::create_parser();
        let mut database = D::create_database();
        parser.parse(input, &mut database)?;
        debug!(
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            "Parsing completed"
        );
        Ok(database)
    }

    fn run<D: Diagram>(&self, input: &str, renderer: &D::Renderer) -> Result<(String, usize)> {
        let database = self.parse::<D>(input)?;
        let element_count = database.node_count();

        let render_span = span!(Level::DEBUG, "pipeline_render", diagram = D::name());
        let _enter = render_span.enter();
        let xml = renderer.render(&database)?;
        debug!(output_len = xml.len(), "Rendering completed");

        Ok((xml, element_count))
    }

    /// Convert text to a draw.io document in memory
    ///
    /// A Gantt table yielding no tasks fails with [`DiagramError::NoTasks`];
    /// a flowchart without stages still renders an empty canvas.
    pub fn process(&self, kind: DiagramKind, input: &str) -> Result<Conversion> {
        let process_span = span!(
            Level::INFO,
            "process_diagram",
            kind = %kind,
            input_len = input.len()
        );
        let _enter = process_span.enter();

        info!("Starting diagram processing pipeline");

        let (xml, element_count) = match kind {
            DiagramKind::Flowchart => {
                self.run::<FlowchartDiagram>(input, &self.flowchart_renderer())?
            }
            DiagramKind::Gantt => {
                let database = self.parse::<GanttDiagram>(input)?;
                if database.is_empty() {
                    warn!("Gantt input produced no tasks");
                    return Err(DiagramError::NoTasks.into());
                }
                let xml = self.gantt_renderer().render(&database)?;
                (xml, database.node_count())
            }
        };

        info!(element_count, "Pipeline completed successfully");

        Ok(Conversion {
            kind,
            xml,
            element_count,
        })
    }

    /// Convert text and, when `output` is given, write the document there
    pub fn convert(
        &self,
        kind: DiagramKind,
        input: &str,
        output: Option<&Path>,
    ) -> Result<Conversion> {
        let conversion = self.process(kind, input)?;

        if let Some(path) = output {
            fs::write(path, &conversion.xml)
                .map_err(DiagramError::from)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                bytes = conversion.xml.len(),
                "Wrote draw.io file"
            );
        }

        Ok(conversion)
    }
}
