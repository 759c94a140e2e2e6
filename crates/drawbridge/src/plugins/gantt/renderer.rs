//! draw.io rendering for Gantt charts
//!
//! Cell order: column headers, axis title, month labels and tick marks, then
//! a label / remark / bar group per task, then dependency arrows if enabled.

use anyhow::Result;
use tracing::{debug, info, span, warn, Level};

use super::database::{GanttDatabase, Task};
use super::layout::{
    DependencyArrow, GanttLayoutAlgorithm, GanttLayoutConfig, GanttLayoutResult, Rect, TaskRow,
};
use crate::core::{
    Database, DrawioDocument, FileMeta, GraphModel, LayoutAlgorithm, MxCell, MxGeometry, MxPoint,
    Renderer, Style,
};

/// Bar fill colors by nesting level; deeper levels reuse the last entry
pub const LEVEL_FILLS: [&str; 5] = ["#d5e8d4", "#fff2cc", "#dae8fc", "#e1d5e7", "#f8cecc"];

/// Bar stroke colors matching [`LEVEL_FILLS`]
pub const LEVEL_STROKES: [&str; 5] = ["#82b366", "#d6b656", "#6c8ebf", "#9673a6", "#b85450"];

/// Optional parts of the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GanttRenderOptions {
    /// Draw predecessor-to-successor arrows
    pub show_dependencies: bool,
}

impl GanttRenderOptions {
    pub fn with_dependencies(mut self, show: bool) -> Self {
        self.show_dependencies = show;
        self
    }
}

fn text_style() -> Style {
    Style::named("text").with("html", 1)
}

fn header_style() -> Style {
    text_style()
        .with("strokeColor", "#666666")
        .with("fillColor", "#f5f5f5")
        .with("align", "center")
        .with("verticalAlign", "middle")
        .with("whiteSpace", "wrap")
        .with("rounded", 0)
        .with("fontStyle", 1)
        .with("fontSize", 12)
}

/// Borderless text cell style up to `rounded=0;`
fn plain_text_style(align: &str) -> Style {
    text_style()
        .with("strokeColor", "none")
        .with("fillColor", "none")
        .with("align", align)
        .with("verticalAlign", "middle")
        .with("whiteSpace", "wrap")
        .with("rounded", 0)
}

/// Style of a task bar, colored by level and dashed for long tasks
pub fn bar_style(task: &Task) -> Style {
    let palette = task.level.min(LEVEL_FILLS.len() - 1);
    let mut style = Style::new()
        .with("rounded", 1)
        .with("whiteSpace", "wrap")
        .with("html", 1)
        .with("fillColor", LEVEL_FILLS[palette])
        .with("strokeColor", LEVEL_STROKES[palette])
        .with("strokeWidth", if task.level == 0 { 2 } else { 1 });
    if task.is_long() {
        style.set("dashed", 1);
        style.set("dashPattern", "8 8");
    }
    style
        .with("fontSize", 10)
        .with("align", "left")
        .with("verticalAlign", "middle")
        .with("spacingLeft", 4)
}

fn arrow_style() -> Style {
    Style::new()
        .with("endArrow", "block")
        .with("html", 1)
        .with("strokeColor", "#666666")
        .with("strokeWidth", 2)
        .with("dashed", 1)
        .with("dashPattern", "8 8")
}

fn rect_geometry(rect: &Rect) -> MxGeometry {
    MxGeometry::bounds(rect.x, rect.y, rect.width, rect.height)
}

/// draw.io Gantt renderer
pub struct GanttRenderer {
    layout: GanttLayoutAlgorithm,
    options: GanttRenderOptions,
    meta: FileMeta,
}

impl GanttRenderer {
    pub fn new() -> Self {
        Self {
            layout: GanttLayoutAlgorithm::new(),
            options: GanttRenderOptions::default(),
            meta: FileMeta::default(),
        }
    }

    pub fn with_layout_config(mut self, config: GanttLayoutConfig) -> Self {
        self.layout = GanttLayoutAlgorithm::with_config(config);
        self
    }

    pub fn with_options(mut self, options: GanttRenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_meta(mut self, meta: FileMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn options(&self) -> GanttRenderOptions {
        self.options
    }

    fn push_headers(&self, document: &mut DrawioDocument, positioned: &GanttLayoutResult) {
        let config = self.layout.config();
        let header_y = config.top_margin + 30.0;

        document.push(MxCell::vertex(
            "header_task_name",
            "任务名称",
            header_style(),
            MxGeometry::bounds(config.left_margin, header_y, config.name_column_width, 30.0),
        ));
        document.push(MxCell::vertex(
            "header_remark",
            "责任方/备注",
            header_style(),
            MxGeometry::bounds(
                config.left_margin + config.name_column_width,
                header_y,
                config.remark_column_width,
                30.0,
            ),
        ));
        document.push(MxCell::vertex(
            "time_label",
            "时间轴 (月)",
            plain_text_style("left").with("fontStyle", 1).with("fontSize", 14),
            MxGeometry::bounds(
                config.timeline_x(),
                config.top_margin,
                positioned.timeline.width(),
                30.0,
            ),
        ));
    }

    fn push_time_axis(&self, document: &mut DrawioDocument, positioned: &GanttLayoutResult) {
        let config = self.layout.config();
        for tick in &positioned.timeline.ticks {
            document.push(MxCell::vertex(
                format!("month_label_{}", tick.month),
                format!("M{}", tick.month),
                plain_text_style("center").with("fontSize", 10),
                MxGeometry::bounds(tick.x - 20.0, config.top_margin + 30.0, 40.0, 20.0),
            ));

            if tick.has_line {
                let geometry = MxGeometry::relative()
                    .with_source_point(MxPoint::new(tick.x, config.top_margin + 50.0))
                    .with_target_point(MxPoint::new(tick.x, config.first_row_y()));
                document.push(MxCell::edge(
                    format!("tick_{}", tick.month),
                    Style::new()
                        .with("endArrow", "none")
                        .with("html", 1)
                        .with("strokeColor", "#666666")
                        .with("strokeWidth", 1),
                    geometry,
                ));
            }
        }
    }

    fn push_task(&self, document: &mut DrawioDocument, task: &Task, row: &TaskRow) {
        let indent = task.level as f64 * self.layout.config().indent_per_level;

        document.push(MxCell::vertex(
            format!("label_{}", row.key),
            &task.name,
            plain_text_style("left")
                .with("fontSize", 11)
                .with("spacingLeft", indent),
            rect_geometry(&row.label),
        ));

        if !task.responsible.is_empty() {
            document.push(MxCell::vertex(
                format!("remark_{}", row.key),
                &task.responsible,
                plain_text_style("left")
                    .with("fontSize", 10)
                    .with("fontColor", "#666666"),
                rect_geometry(&row.remark),
            ));
        }

        document.push(MxCell::vertex(
            format!("bar_{}", row.key),
            "",
            bar_style(task),
            rect_geometry(&row.bar),
        ));
    }

    fn push_arrow(&self, document: &mut DrawioDocument, arrow: &DependencyArrow) {
        let geometry = MxGeometry::relative()
            .with_source_point(MxPoint::new(arrow.start.0, arrow.start.1))
            .with_target_point(MxPoint::new(arrow.end.0, arrow.end.1))
            .with_points(
                arrow
                    .waypoints
                    .iter()
                    .map(|&(x, y)| MxPoint::new(x, y))
                    .collect(),
            );
        document.push(MxCell::edge(&arrow.id, arrow_style(), geometry));
    }

    /// Build the document without serializing it
    pub fn build_document(&self, database: &GanttDatabase) -> Result<DrawioDocument> {
        let positioned = self.layout.layout(database)?;

        let mut document = DrawioDocument::new(
            self.meta.clone(),
            "gantt",
            "甘特图",
            GraphModel::new(
                positioned.canvas_width,
                positioned.canvas_height,
                positioned.canvas_width,
                positioned.canvas_height,
            ),
        );

        self.push_headers(&mut document, &positioned);
        self.push_time_axis(&mut document, &positioned);

        for (task, row) in database.tasks().iter().zip(&positioned.rows) {
            self.push_task(&mut document, task, row);
        }

        if self.options.show_dependencies {
            for arrow in &positioned.arrows {
                self.push_arrow(&mut document, arrow);
            }
            debug!(arrows = positioned.arrows.len(), "Drew dependency arrows");
        }

        document.validate()?;
        Ok(document)
    }
}

impl Default for GanttRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<GanttDatabase> for GanttRenderer {
    type Output = String;

    fn render(&self, database: &GanttDatabase) -> Result<Self::Output> {
        let render_span = span!(
            Level::INFO,
            "render_gantt",
            task_count = database.node_count(),
            show_dependencies = self.options.show_dependencies
        );
        let _enter = render_span.enter();

        if database.is_empty() {
            warn!("No tasks to render, emitting axes only");
        }

        let document = self.build_document(database)?;
        info!(cell_count = document.cells().len(), "Gantt rendering completed");
        Ok(document.to_xml())
    }

    fn name(&self) -> &'static str {
        "drawio-gantt"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "drawio"
    }
}
