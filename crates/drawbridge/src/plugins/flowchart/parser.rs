//! Flowchart parser implementation
//!
//! Parses the symbolic stage notation:
//!
//! ```text
//! Project plan: overview        <- optional caption, dropped
//! [Requirements]                <- main stage
//!   → Interviews → Draft spec   <- subtasks of the previous stage
//! [Design] → Mockups → Review   <- main stage with inline subtasks
//! ```
//!
//! Parsing is best-effort. Lines that match neither a stage nor an indented
//! arrow continuation are skipped, so the worst case is an empty database.

use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, span, trace, Level};

use super::database::{FlowEdge, FlowNode, FlowchartDatabase};
use crate::core::{Database, Parser};

/// Separator between subtask fragments
pub const ARROW: char = '→';

fn bracket_regex() -> &'static Regex {
    static BRACKET: OnceLock<Regex> = OnceLock::new();
    BRACKET.get_or_init(|| Regex::new(r"\[([^\]]+)\]").expect("bracket pattern is valid"))
}

/// Text of the first non-empty bracketed group on the line
pub fn bracket_text(line: &str) -> Option<&str> {
    bracket_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Indentation level of a line: leading whitespace characters, two per level
pub fn indent_level(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count() / 2
}

/// State scoped to a single `parse` call
///
/// Node ids come from one monotonic counter shared by stages and subtasks,
/// restarting at zero for every parse.
#[derive(Debug, Default)]
struct ParseState {
    next_id: usize,
    previous_main: Option<String>,
}

impl ParseState {
    fn allocate_id(&mut self) -> String {
        let id = format!("node_{}", self.next_id);
        self.next_id += 1;
        id
    }
}

/// Flowchart parser implementation
pub struct FlowchartParser;

impl FlowchartParser {
    pub fn new() -> Self {
        Self
    }

    /// Split `line` on arrows and add one subtask per non-empty fragment
    ///
    /// Every fragment gets a child edge from `parent_id`; consecutive
    /// fragments are chained with sequence edges. Residual brackets are
    /// stripped, so on a stage line the stage text itself also becomes the
    /// first fragment.
    fn parse_subtasks(
        &self,
        line: &str,
        parent_id: &str,
        level: usize,
        state: &mut ParseState,
        database: &mut FlowchartDatabase,
    ) -> Result<usize> {
        let mut previous: Option<String> = None;
        let mut created = 0;

        for fragment in line.split(ARROW) {
            let text = fragment.trim().replace(['[', ']'], "");
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let id = state.allocate_id();
            database.add_node(FlowNode::subtask(&id, text, level + 1, parent_id))?;
            database.add_edge(FlowEdge::child(parent_id, &id))?;
            if let Some(prev) = previous.take() {
                database.add_edge(FlowEdge::sequence(prev, &id))?;
            }
            previous = Some(id);
            created += 1;
        }

        Ok(created)
    }
}

impl Default for FlowchartParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser<FlowchartDatabase> for FlowchartParser {
    fn parse(&self, input: &str, database: &mut FlowchartDatabase) -> Result<()> {
        let parse_span = span!(Level::INFO, "parse_flowchart", input_len = input.len());
        let _enter = parse_span.enter();

        trace!("Starting flowchart parsing");

        let mut lines: Vec<&str> = input.trim().split('\n').map(str::trim_end).collect();
        if lines.first().is_some_and(|first| first.contains(':')) {
            debug!(caption = lines[0], "Dropping caption line");
            lines.remove(0);
        }

        let mut state = ParseState::default();
        let mut skipped = 0usize;

        for (line_no, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let level = indent_level(line);

            if line.contains('[') && line.contains(']') {
                let Some(text) = bracket_text(line) else {
                    trace!(line_no, "Bracket line without text, skipping");
                    skipped += 1;
                    continue;
                };

                let id = state.allocate_id();
                database.add_node(FlowNode::main_stage(&id, text, level))?;
                if let Some(previous) = state.previous_main.take() {
                    database.add_edge(FlowEdge::sequence(previous, &id))?;
                }
                state.previous_main = Some(id.clone());
                debug!(line_no, id = %id, text, level, "Parsed main stage");

                if line.contains(ARROW) {
                    let count = self.parse_subtasks(line, &id, level, &mut state, database)?;
                    debug!(line_no, parent = %id, count, "Parsed inline subtasks");
                }
            } else if line.contains(ARROW) && level > 0 {
                match state.previous_main.clone() {
                    Some(parent) => {
                        let count =
                            self.parse_subtasks(line, &parent, level, &mut state, database)?;
                        debug!(line_no, parent = %parent, count, "Parsed continuation subtasks");
                    }
                    None => {
                        trace!(line_no, "Continuation line before any stage, skipping");
                        skipped += 1;
                    }
                }
            } else {
                trace!(line_no, "Unrecognised line, skipping");
                skipped += 1;
            }
        }

        info!(
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            skipped,
            "Flowchart parsing completed"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "flowchart"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input
            .lines()
            .any(|line| (line.contains('[') && line.contains(']')) || line.contains(ARROW))
    }
}
