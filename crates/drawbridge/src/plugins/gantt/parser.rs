//! Gantt task table parser
//!
//! Input is a plain-text table, one task per row, columns separated by tabs
//! or by runs of two or more spaces:
//!
//! ```text
//! 任务ID  任务名称  开始时间  结束时间  工期  前置任务  责任方
//! 1       Kickoff   M0        M1        1月             PMO
//! 1.1     Survey    M1        M2+0.5    1.5月  1        Team A
//! ```
//!
//! Nothing is read until the header row shows up. Rows with fewer than three
//! columns are skipped; missing trailing columns default to empty.

use anyhow::Result;
use chumsky::prelude::*;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, span, trace, warn, Level};

use super::database::{GanttDatabase, Task};
use crate::core::{Database, Parser as CoreParser};

/// Substrings identifying the header row
pub const HEADER_MARKERS: [&str; 2] = ["任务ID", "任务名称"];

fn column_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\t+| {2,}").expect("column pattern is valid"))
}

fn dependency_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[,，\s]+").expect("dependency pattern is valid"))
}

fn loose_number() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"[0-9]+\.?[0-9]*").expect("number pattern is valid"))
}

/// Unsigned decimal: `12` or `1.5`
fn decimal<'src>() -> impl chumsky::Parser<'src, &'src str, f64> + Clone {
    let digits = one_of('0'..='9').repeated().at_least(1);
    digits
        .clone()
        .then(just('.').then(digits).or_not())
        .to_slice()
        .map(|s: &str| s.parse::<f64>().unwrap_or(0.0))
}

/// `M<base>` optionally followed by `+<offset>`; trailing text is ignored
fn month_expression<'src>() -> impl chumsky::Parser<'src, &'src str, f64> + Clone {
    just('M')
        .ignore_then(decimal())
        .then(just('+').ignore_then(decimal()).or_not())
        .then_ignore(any().repeated())
        .map(|(base, offset)| base + offset.unwrap_or(0.0))
}

/// Convert a time cell into a fractional month index
///
/// `M3` is 3.0, `M1.5` is 1.5 and `M7+0.5` is 7.5. Anything else falls back
/// to the first number found in the text, then to 0.0.
///
/// # Example
/// ```
/// use drawbridge::plugins::gantt::parse_month;
///
/// assert_eq!(parse_month("M7+0.5"), 7.5);
/// assert_eq!(parse_month("第3月"), 3.0);
/// assert_eq!(parse_month("TBD"), 0.0);
/// ```
pub fn parse_month(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    if let Ok(month) = month_expression().parse(text).into_result() {
        return month;
    }

    loose_number()
        .find(text)
        .and_then(|m| m.as_str().trim_end_matches('.').parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Split a table row into trimmed fields
pub fn split_columns(line: &str) -> Vec<&str> {
    column_separator().split(line).map(str::trim).collect()
}

/// Split a dependency cell on commas (ASCII or full-width) and whitespace
pub fn parse_dependencies(text: &str) -> Vec<String> {
    dependency_separator()
        .split(text.trim())
        .map(str::trim)
        .filter(|dep| !dep.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_header(line: &str) -> bool {
    HEADER_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Gantt parser implementation
pub struct GanttParser;

impl GanttParser {
    pub fn new() -> Self {
        Self
    }

    /// Build a task from the fields of one data row
    ///
    /// Returns `None` for rows with fewer than three fields.
    pub fn parse_row(&self, fields: &[&str]) -> Option<Task> {
        if fields.len() < 3 {
            return None;
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or("");

        let task = Task::new(
            field(0),
            field(1),
            parse_month(field(2)),
            parse_month(field(3)),
        )
        .with_duration(field(4))
        .with_dependencies(parse_dependencies(field(5)))
        .with_responsible(field(6));
        Some(task)
    }
}

impl Default for GanttParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser<GanttDatabase> for GanttParser {
    fn parse(&self, input: &str, database: &mut GanttDatabase) -> Result<()> {
        let parse_span = span!(Level::INFO, "parse_gantt", input_len = input.len());
        let _enter = parse_span.enter();

        trace!("Starting gantt parsing");

        let mut header_found = false;
        let mut skipped = 0usize;

        for (line_no, line) in input.trim().split('\n').map(str::trim_end).enumerate() {
            if is_header(line) {
                debug!(line_no, "Found header row");
                header_found = true;
                continue;
            }
            if !header_found {
                trace!(line_no, "Skipping preamble line");
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("---") {
                continue;
            }

            let fields = split_columns(line);
            let Some(task) = self.parse_row(&fields) else {
                trace!(line_no, columns = fields.len(), "Too few columns, skipping row");
                skipped += 1;
                continue;
            };

            if task.is_inverted() {
                warn!(
                    line_no,
                    id = %task.id,
                    start = task.start_month,
                    end = task.end_month,
                    "Task ends before it starts"
                );
            }
            debug!(
                line_no,
                id = %task.id,
                start = task.start_month,
                end = task.end_month,
                level = task.level,
                "Parsed task"
            );
            database.add_node(task)?;
        }

        if !header_found {
            warn!("No header row found, no tasks were read");
        }

        info!(
            task_count = database.node_count(),
            dependency_count = database.edge_count(),
            skipped,
            "Gantt parsing completed"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "gantt"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input.lines().any(is_header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> GanttDatabase {
        let mut db = GanttDatabase::new();
        GanttParser::new().parse(input, &mut db).unwrap();
        db
    }

    #[test]
    fn test_parse_month_expressions() {
        assert_eq!(parse_month("M0"), 0.0);
        assert_eq!(parse_month("M1.5"), 1.5);
        assert_eq!(parse_month("M7+0.5"), 7.5);
        assert_eq!(parse_month("M12+3"), 15.0);
        assert_eq!(parse_month("  M4  "), 4.0);
        // trailing text after the expression is ignored
        assert_eq!(parse_month("M2 (est.)"), 2.0);
        assert_eq!(parse_month("M3."), 3.0);
    }

    #[test]
    fn test_parse_month_fallbacks() {
        assert_eq!(parse_month("第3月"), 3.0);
        assert_eq!(parse_month("month 2.5"), 2.5);
        assert_eq!(parse_month("about 4. weeks"), 4.0);
        assert_eq!(parse_month("M"), 0.0);
        assert_eq!(parse_month("Mx9"), 9.0);
        assert_eq!(parse_month("TBD"), 0.0);
        assert_eq!(parse_month(""), 0.0);
        assert_eq!(parse_month("   "), 0.0);
    }

    #[test]
    fn test_split_columns() {
        assert_eq!(split_columns("1\tA\tM0\tM1"), vec!["1", "A", "M0", "M1"]);
        assert_eq!(split_columns("1\t\tA"), vec!["1", "A"]);
        assert_eq!(split_columns("1  Write docs   M0  M1"), vec!["1", "Write docs", "M0", "M1"]);
        // a single space does not separate
        assert_eq!(split_columns("Write docs"), vec!["Write docs"]);
    }

    #[test]
    fn test_parse_dependencies() {
        assert_eq!(parse_dependencies("1, 2，3 4"), vec!["1", "2", "3", "4"]);
        assert_eq!(parse_dependencies(" 1.1 "), vec!["1.1"]);
        assert!(parse_dependencies("").is_empty());
        assert!(parse_dependencies(" , ").is_empty());
    }

    #[test]
    fn test_single_task_row() {
        let db = parse("任务ID\t任务名称\t开始时间\t结束时间\n1\t启动\tM0\tM2");
        assert_eq!(db.node_count(), 1);
        let task = &db.tasks()[0];
        assert_eq!(task.id, "1");
        assert_eq!(task.name, "启动");
        assert_eq!(task.start_month, 0.0);
        assert_eq!(task.end_month, 2.0);
        assert_eq!(task.level, 0);
        assert!(task.duration.is_empty());
        assert!(task.dependencies.is_empty());
        assert!(task.responsible.is_empty());
    }

    #[test]
    fn test_full_row() {
        let db = parse(
            "任务ID\t任务名称\t开始时间\t结束时间\t工期\t前置任务\t责任方\n\
             1.2\tSurvey\tM1\tM2+0.5\t1.5月\t1，1.1\tTeam A",
        );
        let task = &db.tasks()[0];
        assert_eq!(task.level, 1);
        assert_eq!(task.end_month, 2.5);
        assert_eq!(task.duration, "1.5月");
        assert_eq!(task.dependencies, vec!["1", "1.1"]);
        assert_eq!(task.responsible, "Team A");
        assert_eq!(db.edge_count(), 2);
    }

    #[test]
    fn test_rows_before_header_ignored() {
        let db = parse("1\tEarly\tM0\tM1\n任务ID\t任务名称\n2\tLate\tM1\tM2");
        let ids: Vec<_> = db.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_no_header_yields_nothing() {
        let db = parse("1\tA\tM0\tM1\n2\tB\tM1\tM2");
        assert!(db.is_empty());
    }

    #[test]
    fn test_separator_blank_and_repeated_header_rows() {
        let db = parse(
            "任务ID\t任务名称\t开始时间\t结束时间\n\
             ---\t---\t---\t---\n\
             \n\
             1\tA\tM0\tM1\n\
             任务名称 (cont.)\n\
             2\tB\tM1\tM3",
        );
        assert_eq!(db.node_count(), 2);
    }

    #[test]
    fn test_short_rows_skipped() {
        let db = parse("任务ID\t任务名称\n1\tOnly two\n2\tB\tM1");
        assert_eq!(db.node_count(), 1);
        let task = &db.tasks()[0];
        assert_eq!(task.id, "2");
        assert_eq!(task.end_month, 0.0);
    }

    #[test]
    fn test_inverted_rows_accepted() {
        let db = parse("任务ID\t任务名称\n1\tBackwards\tM5\tM3");
        assert_eq!(db.node_count(), 1);
        assert!(db.tasks()[0].is_inverted());
    }

    #[test]
    fn test_space_separated_table() {
        let db = parse("任务ID  任务名称  开始时间  结束时间\n1.1.1  Deep task  M2  M4");
        let task = &db.tasks()[0];
        assert_eq!(task.name, "Deep task");
        assert_eq!(task.level, 2);
    }

    #[test]
    fn test_can_parse() {
        let parser = GanttParser::new();
        assert!(parser.can_parse("任务名称\tx"));
        assert!(!parser.can_parse("1\tA\tM0\tM1"));
    }
}
