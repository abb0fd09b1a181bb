use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mermaid_rs_layout::config::LayoutConfig;
use mermaid_rs_layout::ir::{
    Block, BlockModel, DiagramModel, GraphEdge, GraphModel, GraphNode, MindmapModel, MindmapNode,
    SankeyFlow, SankeyModel, SankeyNode,
};
use mermaid_rs_layout::layout::compute_layout;
use mermaid_rs_layout::pipeline::Pipeline;
use mermaid_rs_layout::text_metrics::DeterministicTextMeasurer;
use std::hint::black_box;

fn dense_flowchart(nodes: usize, extra_edges: usize) -> DiagramModel {
    let mut graph = GraphModel::default();
    for i in 0..nodes {
        graph.nodes.push(GraphNode {
            id: format!("N{i}"),
            label: format!("Node {i}"),
            ..GraphNode::default()
        });
    }
    let edge = |from: usize, to: usize| GraphEdge {
        from: format!("N{from}"),
        to: format!("N{to}"),
        ..GraphEdge::default()
    };
    for i in 0..nodes.saturating_sub(1) {
        graph.edges.push(edge(i, i + 1));
    }
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            graph.edges.push(edge(i, j));
            count += 1;
        }
    }
    DiagramModel::Flowchart(graph)
}

/// Complete tree with `fanout` children per node, `depth` levels below the root.
fn mindmap(fanout: usize, depth: usize) -> DiagramModel {
    let mut model = MindmapModel {
        nodes: vec![MindmapNode {
            id: "root".to_string(),
            label: "Root".to_string(),
            ..MindmapNode::default()
        }],
        root: Some(0),
    };
    let mut frontier = vec![0usize];
    for level in 1..=depth {
        let mut next = Vec::new();
        for parent in frontier {
            for k in 0..fanout {
                let idx = model.nodes.len();
                model.nodes.push(MindmapNode {
                    id: format!("n{idx}"),
                    label: format!("Topic {level}.{k}"),
                    level,
                    ..MindmapNode::default()
                });
                model.nodes[parent].children.push(idx);
                next.push(idx);
            }
        }
        frontier = next;
    }
    DiagramModel::Mindmap(model)
}

fn sankey(columns: usize, per_column: usize) -> DiagramModel {
    let id = |col: usize, row: usize| format!("c{col}r{row}");
    let mut model = SankeyModel::default();
    for col in 0..columns {
        for row in 0..per_column {
            model.nodes.push(SankeyNode {
                id: id(col, row),
                label: None,
            });
        }
    }
    for col in 0..columns.saturating_sub(1) {
        for row in 0..per_column {
            for next in [row, (row + 1) % per_column] {
                model.flows.push(SankeyFlow {
                    source: id(col, row),
                    target: id(col + 1, next),
                    value: (row + next + 1) as f32,
                });
            }
        }
    }
    DiagramModel::Sankey(model)
}

fn nested_blocks(groups: usize, per_group: usize) -> DiagramModel {
    let mut model = BlockModel {
        columns: Some(3),
        ..BlockModel::default()
    };
    for g in 0..groups {
        let group_idx = model.blocks.len();
        model.roots.push(group_idx);
        model.blocks.push(Block {
            id: format!("g{g}"),
            label: Some(format!("Group {g}")),
            shape: Default::default(),
            span: 1,
            is_space: false,
            columns: Some(2),
            children: Vec::new(),
        });
        for i in 0..per_group {
            let idx = model.blocks.len();
            model.blocks[group_idx].children.push(idx);
            model.blocks.push(Block {
                id: format!("g{g}b{i}"),
                label: None,
                shape: Default::default(),
                span: 1 + i % 2,
                is_space: false,
                columns: None,
                children: Vec::new(),
            });
        }
    }
    DiagramModel::Block(model)
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    let measurer = DeterministicTextMeasurer::default();
    let cases = [
        ("flowchart_small", dense_flowchart(10, 5)),
        ("flowchart_large", dense_flowchart(200, 300)),
        ("mindmap_wide", mindmap(6, 3)),
        ("sankey_medium", sankey(6, 8)),
        ("block_nested", nested_blocks(12, 6)),
    ];
    for (name, model) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), model, |b, data| {
            b.iter(|| compute_layout(black_box(data), &measurer, &config))
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let pipeline = Pipeline::json(LayoutConfig::default());
    let cases = [
        ("mindmap_wide", mindmap(6, 3)),
        ("sankey_medium", sankey(6, 8)),
    ];
    for (name, model) in &cases {
        let source = serde_json::to_string(model).expect("model encodes");
        let kind = model.kind();
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, data| {
            b.iter(|| pipeline.run(kind, black_box(data)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_end_to_end);
criterion_main!(benches);
