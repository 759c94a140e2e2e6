//! Structural checks on generated documents
//!
//! Every document is parsed back with `roxmltree` and checked for the
//! invariants draw.io relies on when opening a file.

use std::collections::HashSet;

use drawbridge::prelude::*;

const FLOW: &str = "CI pipeline: stages
[Checkout]
  → Fetch → Submodules
[Test] → Unit → Integration
    → Coverage
[Deploy]";

const TABLE: &str = "任务ID\t任务名称\t开始时间\t结束时间\t工期\t前置任务\t责任方
1\t调研\tM0\tM3\t3月\t0\t产品部
1.1\t访谈\tM0\tM1.5\t1.5月\t1\t产品部
2\t建设\tM3\tM30\t27月\t1,1.1\t研发部
3\t验收\tM30\tM31+0.5\t1.5月\t2\t质量部";

fn check_document(xml: &str) -> usize {
    let doc = roxmltree::Document::parse(xml).expect("document is well-formed XML");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "mxfile");
    assert!(root.attribute("modified").is_some());

    let cells: Vec<roxmltree::Node> = doc
        .descendants()
        .filter(|n| n.has_tag_name("mxCell"))
        .collect();

    let mut ids = HashSet::new();
    for cell in &cells {
        let id = cell.attribute("id").expect("every cell has an id");
        assert!(ids.insert(id), "duplicate id {}", id);
    }
    assert!(ids.contains("0"));
    assert!(ids.contains("1"));

    for cell in cells.iter().filter(|c| c.attribute("edge") == Some("1")) {
        for end in ["source", "target"] {
            if let Some(endpoint) = cell.attribute(end) {
                assert!(ids.contains(endpoint), "dangling {} {}", end, endpoint);
            }
        }
    }

    for cell in cells.iter().filter(|c| c.attribute("id") != Some("0")) {
        assert!(cell.attribute("parent").is_some());
    }

    cells.len()
}

#[test]
fn test_flowchart_document_is_well_formed() {
    let xml = drawbridge::convert_flowchart_to_drawio(FLOW, None).unwrap();
    let count = check_document(&xml);
    assert!(count > 2);
}

#[test]
fn test_flowchart_edges_reference_vertices() {
    let xml = drawbridge::convert_flowchart_to_drawio(FLOW, None).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let edges = doc
        .descendants()
        .filter(|n| n.has_tag_name("mxCell") && n.attribute("edge") == Some("1"))
        .count();
    let db = drawbridge::parse_flowchart(FLOW).unwrap();
    assert_eq!(edges, db.edge_count());
}

#[test]
fn test_gantt_document_is_well_formed() {
    let xml = drawbridge::convert_gantt_to_drawio(TABLE, None).unwrap();
    check_document(&xml);
}

#[test]
fn test_gantt_with_arrows_is_well_formed() {
    let xml = Orchestrator::new()
        .with_gantt_options(GanttRenderOptions::default().with_dependencies(true))
        .process(DiagramKind::Gantt, TABLE)
        .unwrap()
        .xml;
    check_document(&xml);

    let doc = roxmltree::Document::parse(&xml).unwrap();
    let arrows: Vec<&str> = doc
        .descendants()
        .filter_map(|n| n.attribute("id"))
        .filter(|id| id.starts_with("arrow_"))
        .collect();
    assert_eq!(arrows, vec!["arrow_1_1.1", "arrow_1_2", "arrow_1.1_2", "arrow_2_3"]);
}

#[test]
fn test_geometry_elements_present() {
    let xml = drawbridge::convert_gantt_to_drawio(TABLE, None).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    for cell in doc
        .descendants()
        .filter(|n| n.has_tag_name("mxCell") && n.attribute("vertex") == Some("1"))
    {
        let geometry = cell
            .children()
            .find(|c| c.has_tag_name("mxGeometry"))
            .expect("vertex has geometry");
        assert_eq!(geometry.attribute("as"), Some("geometry"));
        let width: f64 = geometry.attribute("width").unwrap().parse().unwrap();
        assert!(width > 0.0);
    }
}

#[test]
fn test_graph_model_attributes() {
    let xml = drawbridge::convert_gantt_to_drawio(TABLE, None).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let model = doc
        .descendants()
        .find(|n| n.has_tag_name("mxGraphModel"))
        .unwrap();
    let page_width: f64 = model.attribute("pageWidth").unwrap().parse().unwrap();
    let dx: f64 = model.attribute("dx").unwrap().parse().unwrap();
    assert_eq!(page_width, dx);
    assert!(page_width > 0.0);
}
