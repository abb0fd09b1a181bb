use super::text::measure_label;
use super::*;
use crate::ir::{MindmapModel, MindmapNode};
use crate::text_metrics::split_lines;

fn own_size(node: &MindmapNode, config: &LayoutConfig) -> Dimension {
    let mindmap = &config.mindmap;
    let chars = split_lines(&node.label)
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let mut width = (chars as f32 * mindmap.per_char_width + mindmap.margin).max(mindmap.min_width);
    let mut height = mindmap.node_height;
    match node.shape {
        NodeShape::Circle | NodeShape::DoubleCircle => {
            width = width.max(height);
            height = width;
        }
        NodeShape::Hexagon => width += mindmap.hexagon_extra_width,
        _ => {}
    }
    Dimension::new(width, height)
}

/// Nodes reachable from `root` in pre-order, paired with their depth.
fn pre_order(model: &MindmapModel, root: usize) -> Vec<(usize, usize)> {
    let mut order = Vec::with_capacity(model.nodes.len());
    let mut stack = vec![(root, 0usize)];
    while let Some((idx, depth)) = stack.pop() {
        order.push((idx, depth));
        if let Some(node) = model.nodes.get(idx) {
            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
    }
    order
}

fn children_span(children: &[usize], subtree_widths: &[f32], spacing: f32) -> f32 {
    let total: f32 = children.iter().map(|&child| subtree_widths[child]).sum();
    total + spacing * children.len().saturating_sub(1) as f32
}

/// Bottom-up pass: `max(own, children total + gaps)` for every reachable node.
fn subtree_widths(
    model: &MindmapModel,
    order: &[(usize, usize)],
    sizes: &[Dimension],
    spacing: f32,
) -> Vec<f32> {
    let mut widths = vec![0.0f32; model.nodes.len()];
    for &(idx, _) in order.iter().rev() {
        let node = &model.nodes[idx];
        widths[idx] = if node.children.is_empty() {
            sizes[idx].width
        } else {
            sizes[idx]
                .width
                .max(children_span(&node.children, &widths, spacing))
        };
    }
    widths
}

pub(super) fn compute_mindmap_layout(model: &MindmapModel, ctx: &LayoutContext<'_>) -> LayoutParts {
    let mindmap = &ctx.config.mindmap;
    let Some(root) = model.root else {
        return LayoutParts {
            diagram: DiagramData::Mindmap(MindmapLayout {
                tree_width: 0.0,
                tree_height: 0.0,
                nodes: Vec::new(),
            }),
            ..LayoutParts::default()
        };
    };

    let order = pre_order(model, root);
    let sizes: Vec<Dimension> = model
        .nodes
        .iter()
        .map(|node| own_size(node, ctx.config))
        .collect();
    let widths = subtree_widths(model, &order, &sizes, mindmap.sibling_spacing);
    let tree_width = widths[root];

    // Top-down pass: centres, children packed left to right under the parent.
    let mut centers = vec![(0.0f32, 0.0f32); model.nodes.len()];
    let mut sections: Vec<Option<usize>> = vec![None; model.nodes.len()];
    centers[root] = (tree_width / 2.0, mindmap.top_padding);
    let mut max_depth = 0usize;
    for &(idx, depth) in &order {
        max_depth = max_depth.max(depth);
        let node = &model.nodes[idx];
        let (parent_x, parent_y) = centers[idx];
        let mut cursor =
            parent_x - children_span(&node.children, &widths, mindmap.sibling_spacing) / 2.0;
        for (position, &child) in node.children.iter().enumerate() {
            centers[child] = (cursor + widths[child] / 2.0, parent_y + mindmap.level_spacing);
            sections[child] = if idx == root {
                Some(position)
            } else {
                sections[idx]
            };
            cursor += widths[child] + mindmap.sibling_spacing;
        }
    }

    let mut nodes = Vec::with_capacity(order.len());
    let mut infos = Vec::with_capacity(order.len());
    let mut edges = Vec::new();
    for &(idx, depth) in &order {
        let node = &model.nodes[idx];
        let size = sizes[idx];
        let (cx, cy) = centers[idx];
        nodes.push(NodeLayout {
            id: node.id.clone(),
            x: cx - size.width / 2.0,
            y: cy - size.height / 2.0,
            width: size.width,
            height: size.height,
            label: measure_label(ctx.measurer, &node.label, ctx.config),
            shape: node.shape,
            depth,
            source: idx,
            children: Vec::new(),
        });
        infos.push(MindmapNodeInfo {
            id: node.id.clone(),
            level: node.level,
            section: sections[idx],
            subtree_width: widths[idx],
        });
        for &child in &node.children {
            edges.push(EdgeLayout {
                from: node.id.clone(),
                to: model.nodes[child].id.clone(),
                source: edges.len(),
                points: vec![(cx, cy), centers[child]],
                label: None,
                label_anchor: None,
            });
        }
    }

    let tree_height = mindmap.top_padding
        + max_depth as f32 * mindmap.level_spacing
        + mindmap.node_height / 2.0;
    LayoutParts {
        nodes,
        edges,
        diagram: DiagramData::Mindmap(MindmapLayout {
            tree_width,
            tree_height,
            nodes: infos,
        }),
    }
}
