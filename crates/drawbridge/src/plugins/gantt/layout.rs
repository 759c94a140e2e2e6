//! Gantt layout implementation
//!
//! Columns from left to right: task name, remarks, timeline. Rows follow
//! table order. The horizontal scale is one fixed width per month, squeezed
//! when a long task would otherwise make the canvas very wide.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, span, trace, Level};

use super::database::{GanttDatabase, Task};
use crate::core::{Database, DiagramError, LayoutAlgorithm};

/// Longest timeline the layout accepts, in months
pub const MAX_TIMELINE_MONTHS: f64 = 1200.0;

/// Geometry constants for Gantt layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GanttLayoutConfig {
    /// Width of one month at normal scale
    pub month_width: f64,
    /// Total timeline width aimed for when squeezing
    pub compressed_budget: f64,
    /// Lower bound of a squeezed month
    pub min_compressed_width: f64,
    /// Squeeze only when the timeline covers more months than this
    pub compress_after_months: f64,
    pub row_height: f64,
    pub row_spacing: f64,
    pub name_column_width: f64,
    pub remark_column_width: f64,
    pub header_height: f64,
    pub left_margin: f64,
    pub top_margin: f64,
    /// Label indent per nesting level
    pub indent_per_level: f64,
    pub min_bar_width: f64,
    /// Extra room right of the timeline and below the last row
    pub canvas_padding: f64,
}

impl Default for GanttLayoutConfig {
    fn default() -> Self {
        Self {
            month_width: 80.0,
            compressed_budget: 2000.0,
            min_compressed_width: 30.0,
            compress_after_months: 20.0,
            row_height: 30.0,
            row_spacing: 10.0,
            name_column_width: 200.0,
            remark_column_width: 250.0,
            header_height: 60.0,
            left_margin: 20.0,
            top_margin: 20.0,
            indent_per_level: 20.0,
            min_bar_width: 10.0,
            canvas_padding: 100.0,
        }
    }
}

impl GanttLayoutConfig {
    /// x where month `min_month` starts
    pub fn timeline_x(&self) -> f64 {
        self.left_margin + self.name_column_width + self.remark_column_width
    }

    /// y of the first task row
    pub fn first_row_y(&self) -> f64 {
        self.top_margin + self.header_height
    }

    pub fn row_pitch(&self) -> f64 {
        self.row_height + self.row_spacing
    }
}

/// Axis-aligned box in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// One labelled month on the time axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub month: i64,
    pub x: f64,
    /// Whether a tick mark is drawn under the label
    pub has_line: bool,
}

/// Horizontal scale shared by every row
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub min_month: f64,
    pub max_month: f64,
    pub month_width: f64,
    /// Label every n-th month
    pub stride: i64,
    pub ticks: Vec<Tick>,
}

impl Timeline {
    pub fn span(&self) -> f64 {
        self.max_month - self.min_month
    }

    /// Width of the axis title and of the timeline column
    pub fn width(&self) -> f64 {
        (self.span() + 1.0) * self.month_width
    }
}

/// Label stride for a timeline covering `span` months
pub fn tick_stride(span: f64) -> i64 {
    if span > 24.0 {
        3
    } else if span > 12.0 {
        2
    } else {
        1
    }
}

/// Geometry of one task row
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    /// Index into the task table
    pub index: usize,
    /// Cell id suffix; the task id, made unique for repeated ids
    pub key: String,
    pub label: Rect,
    pub remark: Rect,
    /// Bar as drawn, with the minimum width applied
    pub bar: Rect,
    /// `(end - start) * month_width`, negative for inverted tasks
    pub raw_width: f64,
}

/// A finish-to-start connector between two bars
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyArrow {
    pub id: String,
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Waypoints forming a jog when the rows differ
    pub waypoints: Vec<(f64, f64)>,
}

/// Layout output
#[derive(Debug, Clone)]
pub struct GanttLayoutResult {
    pub timeline: Timeline,
    pub rows: Vec<TaskRow>,
    /// Arrows for every dependency whose predecessor exists
    pub arrows: Vec<DependencyArrow>,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

/// Gantt layout algorithm
pub struct GanttLayoutAlgorithm {
    config: GanttLayoutConfig,
}

impl GanttLayoutAlgorithm {
    pub fn new() -> Self {
        Self::with_config(GanttLayoutConfig::default())
    }

    pub fn with_config(config: GanttLayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GanttLayoutConfig {
        &self.config
    }

    /// Derive the time axis from the task table
    ///
    /// Fails when the months cover more than [`MAX_TIMELINE_MONTHS`].
    pub fn timeline(&self, database: &GanttDatabase) -> Result<Timeline> {
        let min_month = database.min_month();
        let max_month = database.max_month();
        let span = max_month - min_month;

        if !span.is_finite() || span > MAX_TIMELINE_MONTHS {
            return Err(DiagramError::layout_error(format!(
                "timeline from month {} to month {} exceeds {} months",
                min_month, max_month, MAX_TIMELINE_MONTHS
            ))
            .into());
        }

        let month_width =
            if database.has_long_task() && span > self.config.compress_after_months {
                (self.config.compressed_budget / span).max(self.config.min_compressed_width)
            } else {
                self.config.month_width
            };

        let stride = tick_stride(span);
        let first = min_month.floor() as i64;
        let last = (max_month.floor() as i64).saturating_add(1);
        let ticks = (first..=last)
            .filter(|m| (m - first) % stride == 0 || *m == last)
            .map(|m| Tick {
                month: m,
                x: self.config.timeline_x() + (m as f64 - min_month) * month_width,
                has_line: m as f64 <= max_month,
            })
            .collect();

        debug!(min_month, max_month, month_width, stride, "Computed timeline");

        Ok(Timeline {
            min_month,
            max_month,
            month_width,
            stride,
            ticks,
        })
    }

    fn place_row(&self, index: usize, key: String, task: &Task, timeline: &Timeline) -> TaskRow {
        let config = &self.config;
        let y = config.first_row_y() + index as f64 * config.row_pitch();
        let x = config.timeline_x() + (task.start_month - timeline.min_month) * timeline.month_width;
        let raw_width = task.span() * timeline.month_width;
        let indent = task.level as f64 * config.indent_per_level;

        trace!(id = %task.id, key = %key, x, y, raw_width, "Placed task row");

        TaskRow {
            index,
            key,
            label: Rect::new(
                config.left_margin + indent,
                y,
                (config.name_column_width - 10.0 - indent).max(0.0),
                config.row_height,
            ),
            remark: Rect::new(
                config.left_margin + config.name_column_width + 5.0,
                y,
                config.remark_column_width - 10.0,
                config.row_height,
            ),
            bar: Rect::new(x, y, raw_width.max(config.min_bar_width), config.row_height),
            raw_width,
        }
    }

    fn route_arrows(&self, database: &GanttDatabase, rows: &[TaskRow]) -> Vec<DependencyArrow> {
        let mut arrows = Vec::new();
        let mut connected = HashSet::new();
        let mut ids = HashSet::new();

        for (task, row) in database.tasks().iter().zip(rows) {
            for predecessor in &task.dependencies {
                let Some(from) = database.position_of(predecessor).map(|i| &rows[i]) else {
                    trace!(task = %task.id, predecessor = %predecessor, "Unknown predecessor");
                    continue;
                };

                if !connected.insert((from.index, row.index)) {
                    debug!(task = %task.id, predecessor = %predecessor, "Repeated dependency, keeping the first arrow");
                    continue;
                }

                // `1_2 -> 3` and `1 -> 2_3` would otherwise share an id
                let base = format!("arrow_{}_{}", from.key, row.key);
                let mut id = base.clone();
                let mut n = 1;
                while !ids.insert(id.clone()) {
                    n += 1;
                    id = format!("{}_{}", base, n);
                }

                let start = (from.bar.right(), from.bar.mid_y());
                let end = (row.bar.x, row.bar.mid_y());
                let waypoints = if (start.1 - end.1).abs() >= 5.0 {
                    let jog_x = start.0 + 30.0;
                    vec![(jog_x, start.1), (jog_x, end.1)]
                } else {
                    Vec::new()
                };

                arrows.push(DependencyArrow {
                    id,
                    start,
                    end,
                    waypoints,
                });
            }
        }

        arrows
    }
}

impl Default for GanttLayoutAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutAlgorithm<GanttDatabase> for GanttLayoutAlgorithm {
    type Output = GanttLayoutResult;

    fn layout(&self, database: &GanttDatabase) -> Result<Self::Output> {
        let layout_span = span!(
            Level::INFO,
            "layout_gantt",
            task_count = database.node_count(),
            dependency_count = database.edge_count()
        );
        let _enter = layout_span.enter();

        let timeline = self.timeline(database)?;

        // Suffixed keys must not land on an id the table already uses
        let mut keys: HashSet<String> = database.tasks().iter().map(|t| t.id.clone()).collect();
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        let rows: Vec<TaskRow> = database
            .tasks()
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let seen = occurrences.entry(task.id.as_str()).or_insert(0);
                *seen += 1;
                let key = if *seen == 1 {
                    task.id.clone()
                } else {
                    let mut n = *seen;
                    let mut key = format!("{}_{}", task.id, n);
                    while !keys.insert(key.clone()) {
                        n += 1;
                        key = format!("{}_{}", task.id, n);
                    }
                    debug!(id = %task.id, occurrence = *seen, key = %key, "Repeated task id");
                    key
                };
                self.place_row(index, key, task, &timeline)
            })
            .collect();

        let arrows = self.route_arrows(database, &rows);

        let canvas_width = self.config.name_column_width
            + self.config.remark_column_width
            + timeline.width()
            + self.config.canvas_padding;
        let canvas_height = self.config.header_height
            + rows.len() as f64 * self.config.row_pitch()
            + self.config.canvas_padding;

        info!(
            rows = rows.len(),
            arrows = arrows.len(),
            month_width = timeline.month_width,
            canvas_width,
            canvas_height,
            "Gantt layout completed"
        );

        Ok(GanttLayoutResult {
            timeline,
            rows,
            arrows,
            canvas_width,
            canvas_height,
        })
    }

    fn name(&self) -> &'static str {
        "month-grid"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_of(tasks: Vec<Task>) -> GanttDatabase {
        let mut db = GanttDatabase::new();
        for task in tasks {
            db.add_node(task).unwrap();
        }
        db
    }

    fn layout(tasks: Vec<Task>) -> GanttLayoutResult {
        GanttLayoutAlgorithm::new().layout(&db_of(tasks)).unwrap()
    }

    #[test]
    fn test_tick_stride() {
        assert_eq!(tick_stride(10.0), 1);
        assert_eq!(tick_stride(12.0), 1);
        assert_eq!(tick_stride(13.0), 2);
        assert_eq!(tick_stride(24.0), 2);
        assert_eq!(tick_stride(30.0), 3);
        assert_eq!(tick_stride(40.0), 3);
    }

    #[test]
    fn test_default_timeline() {
        let result = layout(vec![Task::new("1", "a", 0.0, 2.0)]);
        let timeline = &result.timeline;
        assert_eq!((timeline.min_month, timeline.max_month), (0.0, 12.0));
        assert_eq!(timeline.month_width, 80.0);
        assert_eq!(timeline.stride, 1);

        let months: Vec<_> = timeline.ticks.iter().map(|t| t.month).collect();
        assert_eq!(months, (0..=13).collect::<Vec<_>>());
        assert_eq!(timeline.ticks[0].x, 470.0);
        assert_eq!(timeline.ticks[1].x, 550.0);
        // month 13 gets a label but no tick mark
        assert!(timeline.ticks[12].has_line);
        assert!(!timeline.ticks[13].has_line);
    }

    #[test]
    fn test_strided_ticks_keep_final_label() {
        let result = layout(vec![Task::new("1", "a", 0.0, 30.0)]);
        let timeline = &result.timeline;
        assert_eq!(timeline.stride, 3);
        let months: Vec<_> = timeline.ticks.iter().map(|t| t.month).collect();
        assert_eq!(months, vec![0, 3, 6, 9, 12, 15, 18, 21, 24, 27, 30, 31]);

        let result = layout(vec![Task::new("1", "a", 0.0, 17.0)]);
        let months: Vec<_> = result.timeline.ticks.iter().map(|t| t.month).collect();
        assert_eq!(months, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
    }

    #[test]
    fn test_month_width_compression() {
        // long task over a wide range: 2000 / 40
        let result = layout(vec![Task::new("1", "a", 0.0, 40.0)]);
        assert_eq!(result.timeline.month_width, 50.0);

        // floor of 30 once the range gets very wide
        let result = layout(vec![Task::new("1", "a", 0.0, 100.0)]);
        assert_eq!(result.timeline.month_width, 30.0);

        // wide range but no single long task keeps the normal scale
        let result = layout(vec![
            Task::new("1", "a", 0.0, 10.0),
            Task::new("2", "b", 10.0, 21.0),
            Task::new("3", "c", 20.0, 30.0),
        ]);
        assert_eq!(result.timeline.month_width, 80.0);

        // long task within the default range keeps the normal scale
        let result = layout(vec![Task::new("1", "a", 0.0, 13.0)]);
        assert_eq!(result.timeline.month_width, 80.0);
    }

    #[test]
    fn test_row_geometry() {
        let result = layout(vec![
            Task::new("1", "a", 0.0, 2.0),
            Task::new("1.1", "b", 1.5, 3.0),
        ]);
        let first = &result.rows[0];
        assert_eq!(first.bar, Rect::new(470.0, 80.0, 160.0, 30.0));
        assert_eq!(first.label, Rect::new(20.0, 80.0, 190.0, 30.0));
        assert_eq!(first.remark, Rect::new(225.0, 80.0, 240.0, 30.0));

        let second = &result.rows[1];
        assert_eq!(second.bar, Rect::new(590.0, 120.0, 120.0, 30.0));
        assert_eq!(second.label, Rect::new(40.0, 120.0, 170.0, 30.0));
    }

    #[test]
    fn test_min_bar_width() {
        let result = layout(vec![
            Task::new("1", "milestone", 3.0, 3.0),
            Task::new("2", "backwards", 5.0, 3.0),
        ]);
        assert_eq!(result.rows[0].bar.width, 10.0);
        assert_eq!(result.rows[0].raw_width, 0.0);
        assert_eq!(result.rows[1].bar.width, 10.0);
        assert_eq!(result.rows[1].raw_width, -160.0);
    }

    #[test]
    fn test_canvas_size() {
        let result = layout(vec![Task::new("1", "a", 0.0, 2.0)]);
        assert_eq!(result.canvas_width, 200.0 + 250.0 + 13.0 * 80.0 + 100.0);
        assert_eq!(result.canvas_height, 60.0 + 40.0 + 100.0);
    }

    #[test]
    fn test_repeated_ids_get_unique_keys() {
        let result = layout(vec![
            Task::new("1", "a", 0.0, 1.0),
            Task::new("1", "b", 1.0, 2.0),
            Task::new("1", "c", 2.0, 3.0),
        ]);
        let keys: Vec<_> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "1_2", "1_3"]);
        assert_eq!(result.rows[2].bar.y, 160.0);
    }

    #[test]
    fn test_repeated_id_key_skips_existing_id() {
        let result = layout(vec![
            Task::new("1", "a", 0.0, 1.0),
            Task::new("1", "b", 1.0, 2.0),
            Task::new("1_2", "c", 2.0, 3.0),
        ]);
        let keys: Vec<_> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "1_3", "1_2"]);
    }

    #[test]
    fn test_arrow_ids_stay_unique() {
        let result = layout(vec![
            Task::new("1", "a", 0.0, 1.0),
            Task::new("1_2", "b", 0.0, 1.0),
            Task::new("3", "c", 1.0, 2.0).with_dependencies(vec!["1_2".into()]),
            Task::new("2_3", "d", 1.0, 2.0).with_dependencies(vec!["1".into()]),
        ]);
        let ids: Vec<_> = result.arrows.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["arrow_1_2_3", "arrow_1_2_3_2"]);
    }

    #[test]
    fn test_deep_label_width_is_clamped() {
        let result = layout(vec![Task::new("1.1.1.1.1.1.1.1.1.1.1.1", "deep", 0.0, 1.0)]);
        let label = result.rows[0].label;
        assert_eq!(label.x, 20.0 + 11.0 * 20.0);
        assert_eq!(label.width, 0.0);
    }

    #[test]
    fn test_oversized_timeline_is_rejected() {
        let db = db_of(vec![Task::new("1", "a", 0.0, 1e20)]);
        let err = GanttLayoutAlgorithm::new().layout(&db).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::LayoutError { .. })
        ));

        let db = db_of(vec![Task::new("1", "a", 0.0, MAX_TIMELINE_MONTHS)]);
        let timeline = GanttLayoutAlgorithm::new().timeline(&db).unwrap();
        assert_eq!(timeline.stride, 3);
        assert_eq!(timeline.ticks.last().unwrap().month, 1201);
    }

    #[test]
    fn test_dependency_arrows() {
        let result = layout(vec![
            Task::new("1", "a", 0.0, 2.0),
            Task::new("2", "b", 2.0, 4.0).with_dependencies(vec!["1".into(), "ghost".into()]),
        ]);
        assert_eq!(result.arrows.len(), 1);
        let arrow = &result.arrows[0];
        assert_eq!(arrow.id, "arrow_1_2");
        assert_eq!(arrow.start, (630.0, 95.0));
        assert_eq!(arrow.end, (630.0, 135.0));
        assert_eq!(arrow.waypoints, vec![(660.0, 95.0), (660.0, 135.0)]);
    }

    #[test]
    fn test_same_row_arrow_is_straight() {
        let result = layout(vec![
            Task::new("1", "a", 0.0, 2.0).with_dependencies(vec!["1".into(), "1".into()]),
        ]);
        assert_eq!(result.arrows.len(), 1);
        assert!(result.arrows[0].waypoints.is_empty());
    }
}
