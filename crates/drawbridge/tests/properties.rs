//! Property tests for the parsers and generated documents

use drawbridge::core::{Database, Parser};
use drawbridge::plugins::flowchart::{FlowchartDatabase, FlowchartParser};
use drawbridge::plugins::gantt::{parse_month, GanttDatabase, GanttParser};
use drawbridge::{convert_flowchart_to_drawio, convert_gantt_to_drawio};
use proptest::prelude::*;

fn stage_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        "[A-Za-z][A-Za-z ]{0,10}[A-Za-z]",
        prop::collection::vec("[a-z]{1,8}", 0..4),
    )
}

fn row_strategy() -> impl Strategy<Value = (String, String, u32, u32)> {
    ("[1-9](\\.[1-9]){0,2}", "[a-z]{1,8}", 0u32..36, 0u32..36)
}

proptest! {
    #[test]
    fn flowchart_parser_never_panics(input in any::<String>()) {
        let mut db = FlowchartDatabase::new();
        prop_assert!(FlowchartParser::new().parse(&input, &mut db).is_ok());
    }

    #[test]
    fn gantt_parser_never_panics(input in any::<String>()) {
        let mut db = GanttDatabase::new();
        prop_assert!(GanttParser::new().parse(&input, &mut db).is_ok());
    }

    #[test]
    fn parse_month_is_non_negative(text in "[ -~]{0,12}") {
        let month = parse_month(&text);
        prop_assert!(month >= 0.0);
        prop_assert!(month.is_finite());
    }

    #[test]
    fn parse_month_reads_m_prefix(whole in 0u32..100, tenths in 0u32..10) {
        let text = format!("M{}.{}", whole, tenths);
        let expected = whole as f64 + tenths as f64 / 10.0;
        prop_assert!((parse_month(&text) - expected).abs() < 1e-9);
    }

    #[test]
    fn flowchart_output_is_well_formed(input in "[\\PC\n]{0,200}") {
        match convert_flowchart_to_drawio(&input, None) {
            Ok(xml) => prop_assert!(roxmltree::Document::parse(&xml).is_ok()),
            Err(_) => prop_assert!(input.trim().is_empty()),
        }
    }

    #[test]
    fn flowchart_counts_follow_notation(stages in prop::collection::vec(stage_strategy(), 1..6)) {
        let mut text = String::new();
        for (name, subtasks) in &stages {
            text.push_str(&format!("[{}]\n", name));
            if !subtasks.is_empty() {
                text.push_str(&format!("  → {}\n", subtasks.join(" → ")));
            }
        }

        let mut db = FlowchartDatabase::new();
        FlowchartParser::new().parse(&text, &mut db).unwrap();

        let subtask_total: usize = stages.iter().map(|(_, s)| s.len()).sum();
        let chain_edges: usize = stages.iter().map(|(_, s)| s.len().saturating_sub(1)).sum();
        prop_assert_eq!(db.main_stages().count(), stages.len());
        prop_assert_eq!(db.subtasks().count(), subtask_total);
        prop_assert_eq!(
            db.edge_count(),
            stages.len() - 1 + subtask_total + chain_edges
        );
    }

    #[test]
    fn gantt_renders_one_bar_per_row(rows in prop::collection::vec(row_strategy(), 1..12)) {
        let mut text = String::from("任务ID\t任务名称\t开始时间\t结束时间\n");
        for (id, name, start, end) in &rows {
            text.push_str(&format!("{}\t{}\tM{}\tM{}\n", id, name, start, end));
        }

        let xml = convert_gantt_to_drawio(&text, None).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let bars = doc
            .descendants()
            .filter_map(|n| n.attribute("id"))
            .filter(|id| id.starts_with("bar_"))
            .count();
        prop_assert_eq!(bars, rows.len());
    }
}
