//! Gantt database implementation
//!
//! Tasks are stored in row order. Dependencies are kept twice: on the task
//! itself (as parsed) and as a flat edge list for graph-style iteration.

use anyhow::Result;
use serde::Serialize;
use tracing::trace;

use crate::core::{Database, DiagramError};

/// Spans longer than this many months are drawn as long tasks
pub const LONG_TASK_MONTHS: f64 = 12.0;

/// One row of the task table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start_month: f64,
    pub end_month: f64,
    /// Free-text duration column, kept verbatim
    pub duration: String,
    /// Predecessor task ids
    pub dependencies: Vec<String>,
    /// Responsible party or remarks
    pub responsible: String,
    /// Nesting depth: number of `.` in the id
    pub level: usize,
}

impl Task {
    /// Create a task with no duration, dependencies or remarks
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_month: f64,
        end_month: f64,
    ) -> Self {
        let id = id.into();
        let level = id.matches('.').count();
        Self {
            id,
            name: name.into(),
            start_month,
            end_month,
            duration: String::new(),
            dependencies: Vec::new(),
            responsible: String::new(),
            level,
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = responsible.into();
        self
    }

    /// Length in months; negative for inverted rows
    pub fn span(&self) -> f64 {
        self.end_month - self.start_month
    }

    pub fn is_long(&self) -> bool {
        self.span() > LONG_TASK_MONTHS
    }

    pub fn is_inverted(&self) -> bool {
        self.end_month < self.start_month
    }
}

/// Finish-to-start link between two tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Predecessor id
    pub from: String,
    /// Successor id
    pub to: String,
}

impl Dependency {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Gantt database implementation
#[derive(Debug, Default, Serialize)]
pub struct GanttDatabase {
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
}

impl GanttDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in row order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Row index of the first task with this id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Earliest start, never later than month 0
    pub fn min_month(&self) -> f64 {
        self.tasks
            .iter()
            .map(|task| task.start_month)
            .fold(0.0, f64::min)
    }

    /// Latest end, never earlier than month 12
    pub fn max_month(&self) -> f64 {
        self.tasks
            .iter()
            .map(|task| task.end_month)
            .fold(LONG_TASK_MONTHS, f64::max)
    }

    pub fn has_long_task(&self) -> bool {
        self.tasks.iter().any(Task::is_long)
    }

    /// Dependencies naming a predecessor that is not in the table
    pub fn unresolved_dependencies(&self) -> Vec<&Dependency> {
        self.dependencies
            .iter()
            .filter(|dep| self.position_of(&dep.from).is_none())
            .collect()
    }
}

impl Database for GanttDatabase {
    type Node = Task;
    type Edge = Dependency;

    fn add_node(&mut self, task: Self::Node) -> Result<()> {
        trace!(
            id = %task.id,
            start = task.start_month,
            end = task.end_month,
            level = task.level,
            "Adding task"
        );
        for predecessor in &task.dependencies {
            self.dependencies
                .push(Dependency::new(predecessor.as_str(), task.id.as_str()));
        }
        self.tasks.push(task);
        Ok(())
    }

    fn add_edge(&mut self, dependency: Self::Edge) -> Result<()> {
        let Some(successor) = self.tasks.iter_mut().find(|task| task.id == dependency.to) else {
            return Err(DiagramError::database_error(format!(
                "dependency {} -> {} references unknown task '{}'",
                dependency.from, dependency.to, dependency.to
            ))
            .into());
        };
        trace!(from = %dependency.from, to = %dependency.to, "Adding dependency");
        successor.dependencies.push(dependency.from.clone());
        self.dependencies.push(dependency);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.tasks.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.dependencies.iter()
    }

    fn clear(&mut self) {
        self.tasks.clear();
        self.dependencies.clear();
    }

    fn node_count(&self) -> usize {
        self.tasks.len()
    }

    fn edge_count(&self) -> usize {
        self.dependencies.len()
    }
}
