use std::collections::{HashMap, VecDeque};

use super::text::measure_label;
use super::*;
use crate::ir::SankeyModel;

struct Flow {
    from: usize,
    to: usize,
    value: f32,
    source: usize,
}

/// Longest-path rank of every node. Nodes caught in a cycle keep rank 0.
fn longest_path_ranks(node_count: usize, flows: &[Flow]) -> Vec<usize> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indegree = vec![0usize; node_count];
    for (idx, flow) in flows.iter().enumerate() {
        outgoing[flow.from].push(idx);
        indegree[flow.to] += 1;
    }

    let mut queue: VecDeque<usize> = indegree
        .iter()
        .enumerate()
        .filter_map(|(idx, deg)| (*deg == 0).then_some(idx))
        .collect();
    let mut ranks = vec![0usize; node_count];
    let mut visited = 0;
    while let Some(node) = queue.pop_front() {
        visited += 1;
        for &flow_idx in &outgoing[node] {
            let to = flows[flow_idx].to;
            ranks[to] = ranks[to].max(ranks[node] + 1);
            indegree[to] -= 1;
            if indegree[to] == 0 {
                queue.push_back(to);
            }
        }
    }
    if visited < node_count {
        tracing::debug!(
            cyclic = node_count - visited,
            "sankey flows contain a cycle; affected nodes stay in the first rank"
        );
        for (rank, deg) in ranks.iter_mut().zip(&indegree) {
            if *deg > 0 {
                *rank = 0;
            }
        }
    }
    ranks
}

pub(super) fn compute_sankey_layout(model: &SankeyModel, ctx: &LayoutContext<'_>) -> LayoutParts {
    let sankey = &ctx.config.sankey;
    let node_count = model.nodes.len();
    let index: HashMap<&str, usize> = model
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    let mut flows = Vec::with_capacity(model.flows.len());
    for (source, flow) in model.flows.iter().enumerate() {
        let (Some(&from), Some(&to)) = (
            index.get(flow.source.as_str()),
            index.get(flow.target.as_str()),
        ) else {
            tracing::debug!(
                source = %flow.source,
                target = %flow.target,
                "skipping sankey flow with unknown node"
            );
            continue;
        };
        flows.push(Flow {
            from,
            to,
            value: flow.value,
            source,
        });
    }

    let mut in_total = vec![0.0f32; node_count];
    let mut out_total = vec![0.0f32; node_count];
    for flow in &flows {
        out_total[flow.from] += flow.value;
        in_total[flow.to] += flow.value;
    }
    let totals: Vec<f32> = in_total
        .iter()
        .zip(&out_total)
        .map(|(i, o)| i.max(*o))
        .collect();

    let ranks = longest_path_ranks(node_count, &flows);
    let num_ranks = ranks.iter().copied().max().map_or(0, |max| max + 1);
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); num_ranks];
    for (idx, &rank) in ranks.iter().enumerate() {
        columns[rank].push(idx);
    }

    // One scale for every column so equal values get equal heights.
    let scale = columns
        .iter()
        .filter_map(|column| {
            let sum: f32 = column.iter().map(|&idx| totals[idx]).sum();
            let gaps = sankey.node_gap * column.len().saturating_sub(1) as f32;
            (sum > 0.0).then(|| ((sankey.height - gaps).max(0.0)) / sum)
        })
        .fold(f32::INFINITY, f32::min);
    let scale = if scale.is_finite() { scale } else { 0.0 };

    let gap_x = if num_ranks > 1 {
        ((sankey.width - sankey.node_width * num_ranks as f32) / (num_ranks - 1) as f32).max(0.0)
    } else {
        0.0
    };

    let mut node_pos = vec![(0.0f32, 0.0f32); node_count];
    let mut node_height = vec![0.0f32; node_count];
    for (rank, column) in columns.iter().enumerate() {
        let mut y = 0.0;
        for &idx in column {
            node_height[idx] = totals[idx] * scale;
            node_pos[idx] = (rank as f32 * (sankey.node_width + gap_x), y);
            y += node_height[idx] + sankey.node_gap;
        }
    }

    let mut out_offset = vec![0.0f32; node_count];
    let mut in_offset = vec![0.0f32; node_count];
    let mut links = Vec::with_capacity(flows.len());
    let mut edges = Vec::with_capacity(flows.len());
    for flow in &flows {
        let thickness = flow.value * scale;
        let start = (
            node_pos[flow.from].0 + sankey.node_width,
            node_pos[flow.from].1 + out_offset[flow.from] + thickness / 2.0,
        );
        let end = (
            node_pos[flow.to].0,
            node_pos[flow.to].1 + in_offset[flow.to] + thickness / 2.0,
        );
        out_offset[flow.from] += thickness;
        in_offset[flow.to] += thickness;

        let half_dx = (end.0 - start.0) / 2.0;
        let control1 = (start.0 + half_dx, start.1);
        let control2 = (end.0 - half_dx, end.1);
        let from_id = model.nodes[flow.from].id.clone();
        let to_id = model.nodes[flow.to].id.clone();
        edges.push(EdgeLayout {
            from: from_id.clone(),
            to: to_id.clone(),
            source: flow.source,
            points: vec![start, control1, control2, end],
            label: None,
            label_anchor: None,
        });
        links.push(SankeyLinkLayout {
            source: from_id,
            target: to_id,
            value: flow.value,
            thickness,
            start,
            end,
            control1,
            control2,
        });
    }

    let mut nodes = Vec::with_capacity(node_count);
    let mut sankey_nodes = Vec::with_capacity(node_count);
    for (idx, node) in model.nodes.iter().enumerate() {
        let label = node.label.clone().unwrap_or_else(|| node.id.clone());
        let (x, y) = node_pos[idx];
        nodes.push(NodeLayout {
            id: node.id.clone(),
            x,
            y,
            width: sankey.node_width,
            height: node_height[idx],
            label: measure_label(ctx.measurer, &label, ctx.config),
            shape: NodeShape::Rectangle,
            depth: 0,
            source: idx,
            children: Vec::new(),
        });
        sankey_nodes.push(SankeyNodeLayout {
            id: node.id.clone(),
            label,
            total: totals[idx],
            rank: ranks[idx],
            x,
            y,
            width: sankey.node_width,
            height: node_height[idx],
        });
    }

    LayoutParts {
        nodes,
        edges,
        diagram: DiagramData::Sankey(SankeyLayout {
            node_width: sankey.node_width,
            nodes: sankey_nodes,
            links,
        }),
    }
}
