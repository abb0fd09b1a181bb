use std::sync::Arc;

use chrono::NaiveDate;
use mermaid_rs_layout::layout::{DiagramData, Layout};
use mermaid_rs_layout::{
    DeterministicTextMeasurer, DiagramKind, DiagramModel, LayoutConfig, Pipeline, TextMeasurer,
    compute_layout,
};

fn layout_json(json: &str) -> Layout {
    let model: DiagramModel = serde_json::from_str(json).expect("model json");
    compute_layout(
        &model,
        &DeterministicTextMeasurer::default(),
        &LayoutConfig::default(),
    )
    .expect("layout failed")
}

fn assert_inside_canvas(layout: &Layout) {
    for node in &layout.nodes {
        assert!(node.x >= 0.0 && node.y >= 0.0, "{}: negative origin", node.id);
        assert!(node.x + node.width <= layout.width + 0.01, "{}: past right edge", node.id);
        assert!(node.y + node.height <= layout.height + 0.01, "{}: past bottom edge", node.id);
    }
}

const MINDMAP: &str = r#"{
    "kind": "mindmap",
    "root": 0,
    "nodes": [
        {"id": "R", "label": "Root", "children": [1, 2]},
        {"id": "A", "label": "Alpha", "level": 1, "children": [3, 4]},
        {"id": "B", "label": "Beta", "level": 1},
        {"id": "A1", "label": "One", "level": 2},
        {"id": "A2", "label": "Two", "level": 2}
    ]
}"#;

#[test]
fn mindmap_tree_is_laid_out_top_down() {
    let layout = layout_json(MINDMAP);
    assert_eq!(layout.kind, DiagramKind::Mindmap);
    assert_eq!(layout.nodes.len(), 5);
    assert_eq!(layout.edges.len(), 4);
    assert_inside_canvas(&layout);

    let by_id = |id: &str| layout.nodes.iter().find(|n| n.id == id).unwrap();
    assert_eq!(by_id("R").depth, 0);
    assert_eq!(by_id("A1").depth, 2);
    assert!(by_id("A").y > by_id("R").y);
    assert!(by_id("A1").y > by_id("A").y);
    assert!(by_id("A1").x < by_id("A2").x);
}

#[test]
fn every_empty_model_lays_out_on_minimum_canvas() {
    let config = LayoutConfig::default();
    let measurer = DeterministicTextMeasurer::default();
    for kind in DiagramKind::ALL {
        let layout = compute_layout(&DiagramModel::empty(kind), &measurer, &config)
            .unwrap_or_else(|err| panic!("{kind}: {err}"));
        assert_eq!((layout.width, layout.height), (800.0, 600.0), "{kind}");
    }
}

#[test]
fn gantt_after_chain_from_json() {
    let layout = layout_json(
        r#"{
            "kind": "gantt",
            "sections": [{
                "name": "Build",
                "tasks": [
                    {"id": "A", "label": "Design", "start": {"on": "2024-01-01"},
                     "end": {"duration": {"amount": 10, "unit": "day"}}},
                    {"id": "B", "label": "Ship", "start": {"after": ["A"]},
                     "end": {"duration": {"amount": 5, "unit": "day"}}}
                ]
            }]
        }"#,
    );
    let DiagramData::Gantt(gantt) = &layout.diagram else {
        panic!("expected gantt data, got {:?}", layout.diagram);
    };
    let b = gantt.tasks.iter().find(|task| task.key == "B").unwrap();
    assert_eq!(b.start, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    assert_eq!(b.end, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    assert!(gantt.unresolved.is_empty());
    let a = gantt.tasks.iter().find(|task| task.key == "A").unwrap();
    assert!((b.x - (a.x + a.width)).abs() < 0.01);
}

#[test]
fn graph_without_engine_is_degraded_grid() {
    let layout = layout_json(
        r#"{
            "kind": "flowchart",
            "direction": "LeftRight",
            "nodes": [
                {"id": "a", "label": "Start"},
                {"id": "b", "label": "Middle"},
                {"id": "c", "label": "End"}
            ],
            "edges": [
                {"from": "a", "to": "b"},
                {"from": "b", "to": "c", "label": "done"},
                {"from": "c", "to": "missing"}
            ]
        }"#,
    );
    assert_eq!(layout.nodes.len(), 3);
    assert_eq!(layout.edges.len(), 2);
    assert_inside_canvas(&layout);
    let DiagramData::Graph(graph) = &layout.diagram else {
        panic!("expected graph data");
    };
    assert!(graph.degraded);
    assert!(layout.edges[1].label_anchor.is_some());
}

#[test]
fn models_survive_a_json_round_trip() {
    let model: DiagramModel = serde_json::from_str(MINDMAP).unwrap();
    let encoded = serde_json::to_string(&model).unwrap();
    let decoded: DiagramModel = serde_json::from_str(&encoded).unwrap();
    let measurer = DeterministicTextMeasurer::default();
    let config = LayoutConfig::default();
    let first = compute_layout(&model, &measurer, &config).unwrap();
    let second = compute_layout(&decoded, &measurer, &config).unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn layouts_run_concurrently_with_a_shared_measurer() {
    let measurer: Arc<dyn TextMeasurer> = Arc::new(DeterministicTextMeasurer::default());
    let config = LayoutConfig::default();
    let model: DiagramModel = serde_json::from_str(MINDMAP).unwrap();
    let expected = compute_layout(&model, measurer.as_ref(), &config).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compute_layout(&model, measurer.as_ref(), &config).unwrap()))
            .collect();
        for handle in handles {
            let layout = handle.join().unwrap();
            assert_eq!(layout.width, expected.width);
            assert_eq!(layout.nodes.len(), expected.nodes.len());
            for (got, want) in layout.nodes.iter().zip(&expected.nodes) {
                assert_eq!((got.x, got.y), (want.x, want.y));
            }
        }
    });
}

#[test]
fn pipeline_turns_json_models_into_dumps() {
    let pipeline = Pipeline::json(LayoutConfig::default());
    let output = pipeline
        .run(
            DiagramKind::Packet,
            r#"{"kind": "packet", "fields": [
                {"range": {"span": {"start": 0, "end": 15}}, "label": "Source Port"},
                {"range": {"length": 16}, "label": "Destination Port"},
                {"range": {"length": 32}, "label": "Sequence Number"}
            ]}"#,
        )
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["kind"], "packet");
    assert_eq!(json["diagram"]["type"], "packet");
    assert!(json["width"].as_f64().unwrap() >= 800.0);
}
