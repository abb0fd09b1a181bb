//! Generic-graph adapter shared by every node/edge diagram family.
//!
//! Nodes are measured with per-detail rules, handed to an optional
//! [`GraphLayoutEngine`], and whatever the engine leaves unplaced is put on a
//! deterministic grid. The grid never routes: edges become straight segments
//! clipped to the node borders.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::text::{measure_label, measure_label_with_font_size, optional_label};
use super::*;
use crate::config::GraphConfig;
use crate::error::EngineError;
use crate::ir::{C4ElementKind, Direction, GraphModel, GraphNode, NodeDetail, StateKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutAlgorithm {
    Layered,
    Force,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodePlacement {
    BrandesKoepf,
    NetworkSimplex,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HierarchyHandling {
    /// Nested nodes are laid out together with their container's siblings.
    IncludeChildren,
    SeparateChildren,
}

/// Declarative options handed to a graph layout engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayoutOptions {
    pub algorithm: LayoutAlgorithm,
    pub direction: Direction,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub node_placement: NodePlacement,
    pub hierarchy: HierarchyHandling,
}

impl GraphLayoutOptions {
    pub fn for_model(kind: DiagramKind, graph: &GraphModel, config: &GraphConfig) -> Self {
        let algorithm = match kind {
            DiagramKind::Architecture => LayoutAlgorithm::Force,
            _ => LayoutAlgorithm::Layered,
        };
        let node_placement = match kind {
            DiagramKind::C4 | DiagramKind::Architecture => NodePlacement::NetworkSimplex,
            DiagramKind::Sequence | DiagramKind::Journey | DiagramKind::Treemap => {
                NodePlacement::Simple
            }
            _ => NodePlacement::BrandesKoepf,
        };
        let hierarchy = if graph.nodes.iter().any(|node| node.parent.is_some()) {
            HierarchyHandling::IncludeChildren
        } else {
            HierarchyHandling::SeparateChildren
        };
        Self {
            algorithm,
            direction: graph.direction,
            node_spacing: config.node_spacing,
            rank_spacing: config.rank_spacing,
            node_placement,
            hierarchy,
        }
    }

    /// ELK-style layout property map.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let algorithm = match self.algorithm {
            LayoutAlgorithm::Layered => "layered",
            LayoutAlgorithm::Force => "force",
        };
        let direction = match self.direction {
            Direction::TopDown => "DOWN",
            Direction::BottomTop => "UP",
            Direction::LeftRight => "RIGHT",
            Direction::RightLeft => "LEFT",
        };
        let placement = match self.node_placement {
            NodePlacement::BrandesKoepf => "BRANDES_KOEPF",
            NodePlacement::NetworkSimplex => "NETWORK_SIMPLEX",
            NodePlacement::Simple => "SIMPLE",
        };
        let hierarchy = match self.hierarchy {
            HierarchyHandling::IncludeChildren => "INCLUDE_CHILDREN",
            HierarchyHandling::SeparateChildren => "SEPARATE_CHILDREN",
        };
        [
            ("elk.algorithm", algorithm.to_string()),
            ("elk.direction", direction.to_string()),
            ("elk.spacing.nodeNode", self.node_spacing.to_string()),
            (
                "elk.layered.spacing.nodeNodeBetweenLayers",
                self.rank_spacing.to_string(),
            ),
            ("elk.layered.nodePlacement.strategy", placement.to_string()),
            ("elk.hierarchyHandling", hierarchy.to_string()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNodeRequest {
    pub id: String,
    pub width: f32,
    pub height: f32,
    /// Index of the container in `GraphLayoutRequest::nodes`.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdgeRequest {
    /// Index of the edge in the model.
    pub source: usize,
    pub from: usize,
    pub to: usize,
    pub label: Option<Dimension>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphLayoutRequest {
    pub kind: DiagramKind,
    pub nodes: Vec<GraphNodeRequest>,
    pub edges: Vec<GraphEdgeRequest>,
}

/// Placement produced by an engine. Nodes or edges missing from the maps are
/// completed by the grid fallback.
#[derive(Debug, Clone, Default)]
pub struct GraphLayoutResponse {
    /// Absolute top-left corner per node id.
    pub positions: HashMap<String, (f32, f32)>,
    /// Route per model edge index, endpoints included.
    pub routes: HashMap<usize, Vec<(f32, f32)>>,
}

pub trait GraphLayoutEngine: Send + Sync {
    fn layout(
        &self,
        request: &GraphLayoutRequest,
        options: &GraphLayoutOptions,
    ) -> Result<GraphLayoutResponse, EngineError>;
}

/// Total width and stacked height of several labels.
fn stack(blocks: &[TextBlock]) -> Dimension {
    Dimension::new(
        blocks.iter().map(|b| b.width).fold(0.0, f32::max),
        blocks.iter().map(|b| b.height).sum(),
    )
}

fn measure_node(
    node: &GraphNode,
    label: &TextBlock,
    direction: Direction,
    ctx: &LayoutContext<'_>,
) -> Dimension {
    let config = ctx.config;
    let graph = &config.graph;
    let pad_x = config.node_padding_x;
    let pad_y = config.node_padding_y;
    let measure = |text: &str| measure_label(ctx.measurer, text, config);
    let small = |text: &str| {
        measure_label_with_font_size(ctx.measurer, text, config.font_size * 0.75, config, false)
    };

    match &node.detail {
        NodeDetail::Plain => shape_size(node.shape, label, config),
        NodeDetail::Class {
            annotations,
            members,
            methods,
        } => {
            let rows: Vec<TextBlock> = annotations
                .iter()
                .map(|a| measure(&format!("«{a}»")))
                .chain(members.iter().map(|m| measure(m)))
                .chain(methods.iter().map(|m| measure(m)))
                .collect();
            let width = rows.iter().map(|r| r.width).fold(label.width, f32::max);
            let row_count = annotations.len() + members.len() + methods.len();
            let header = label.height.max(graph.class_row_height);
            Dimension::new(
                width + pad_x * 2.0,
                header + row_count as f32 * graph.class_row_height
                    + graph.class_divider_padding * 4.0,
            )
        }
        NodeDetail::Entity { attributes } => {
            let mut columns = [0.0f32; 4];
            for attribute in attributes {
                let cells = [
                    measure(&attribute.data_type).width,
                    measure(&attribute.name).width,
                    measure(&attribute.keys.join(",")).width,
                    attribute
                        .comment
                        .as_deref()
                        .map_or(0.0, |comment| measure(comment).width),
                ];
                for (column, cell) in columns.iter_mut().zip(cells) {
                    *column = column.max(cell);
                }
            }
            let used = columns.iter().filter(|w| **w > 0.0).count();
            let row_width: f32 = columns.iter().sum::<f32>() + used as f32 * pad_x / 2.0;
            Dimension::new(
                row_width.max(label.width) + pad_x * 2.0,
                label.height + pad_y * 2.0 + attributes.len() as f32 * graph.entity_row_height,
            )
        }
        NodeDetail::State { kind } => match kind {
            StateKind::Start | StateKind::End => {
                Dimension::new(graph.state_marker_size, graph.state_marker_size)
            }
            StateKind::Fork | StateKind::Join => {
                // Bars run across the flow direction.
                if direction.is_horizontal() {
                    Dimension::new(graph.fork_bar_thickness, graph.fork_bar_length)
                } else {
                    Dimension::new(graph.fork_bar_length, graph.fork_bar_thickness)
                }
            }
            StateKind::Choice => {
                let side = graph.state_marker_size * 2.0;
                Dimension::new(side, side)
            }
            StateKind::Normal => shape_size(NodeShape::RoundRect, label, config),
        },
        NodeDetail::Participant { actor: true } => Dimension::new(
            graph.actor_width.max(label.width),
            graph.actor_height + label.height,
        ),
        NodeDetail::Participant { actor: false } => Dimension::new(
            (label.width + pad_x * 2.0).max(graph.participant_min_width),
            graph.participant_height.max(label.height + pad_y * 2.0),
        ),
        NodeDetail::C4Element {
            element,
            technology,
            description,
            ..
        } => {
            let mut lines = vec![small(&format!("<<{}>>", element.type_label())), label.clone()];
            if let Some(technology) = technology {
                lines.push(small(&format!("[{technology}]")));
            }
            if let Some(description) = description {
                lines.push(measure(description));
            }
            let content = stack(&lines);
            let min_height = if *element == C4ElementKind::Person {
                graph.c4_min_height + graph.actor_height / 2.0
            } else {
                graph.c4_min_height
            };
            Dimension::new(
                (content.width + pad_x * 2.0).max(graph.c4_min_width),
                (content.height + pad_y * 2.0).max(min_height),
            )
        }
        NodeDetail::Requirement {
            requirement_type,
            text,
            risk,
            verify_method,
        } => {
            let mut lines = vec![label.clone()];
            if let Some(kind) = requirement_type {
                lines.push(small(&format!("<<{kind}>>")));
            }
            for (key, value) in [("Text", text), ("Risk", risk), ("Verification", verify_method)] {
                if let Some(value) = value {
                    lines.push(measure(&format!("{key}: {value}")));
                }
            }
            let content = stack(&lines);
            Dimension::new(
                (content.width + pad_x * 2.0).max(graph.requirement_min_width),
                content.height + pad_y * 2.0,
            )
        }
        NodeDetail::Service { .. } => Dimension::new(
            graph.service_icon_size.max(label.width),
            graph.service_icon_size + label.height,
        ),
        NodeDetail::JourneyTask { .. } => Dimension::new(
            graph.journey_task_width.max(label.width + pad_x),
            graph.journey_task_height.max(label.height + pad_y * 2.0),
        ),
        NodeDetail::TreemapItem { value } => {
            let value_height = value.map_or(0.0, |v| small(&v.to_string()).height);
            Dimension::new(
                (label.width + pad_x * 2.0).max(graph.treemap_min_size),
                (label.height + value_height + pad_y * 2.0).max(graph.treemap_min_size),
            )
        }
    }
}

/// Grid placement of one sibling group, relative to the group origin.
struct GridCells {
    offsets: Vec<(f32, f32)>,
    extent: Dimension,
}

fn grid_cells(sizes: &[Dimension], columns: usize, config: &GraphConfig) -> GridCells {
    if sizes.is_empty() {
        return GridCells {
            offsets: Vec::new(),
            extent: Dimension::ZERO,
        };
    }
    let columns = columns.max(1);
    let max_width = sizes.iter().map(|s| s.width).fold(0.0, f32::max);
    let max_height = sizes.iter().map(|s| s.height).fold(0.0, f32::max);
    let cell_width = max_width + config.node_spacing;
    let cell_height = max_height + config.rank_spacing;
    let offsets = sizes
        .iter()
        .enumerate()
        .map(|(i, size)| {
            let (col, row) = (i % columns, i / columns);
            (
                col as f32 * cell_width + (max_width - size.width) / 2.0,
                row as f32 * cell_height + (max_height - size.height) / 2.0,
            )
        })
        .collect();
    let used_columns = sizes.len().min(columns);
    let rows = sizes.len().div_ceil(columns);
    GridCells {
        offsets,
        extent: Dimension::new(
            used_columns as f32 * cell_width - config.node_spacing,
            rows as f32 * cell_height - config.rank_spacing,
        ),
    }
}

struct GraphPlacer<'a> {
    graph: &'a GraphModel,
    config: &'a GraphConfig,
    children: Vec<Vec<usize>>,
    labels: Vec<TextBlock>,
    sizes: Vec<Dimension>,
    /// Fallback offset of each node relative to its container's content origin.
    offsets: Vec<(f32, f32)>,
}

impl<'a> GraphPlacer<'a> {
    fn new(graph: &'a GraphModel, ctx: &'a LayoutContext<'a>) -> (Self, Vec<usize>) {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
        let mut roots = Vec::new();
        for (idx, node) in graph.nodes.iter().enumerate() {
            match node.parent {
                Some(parent) => children[parent].push(idx),
                None => roots.push(idx),
            }
        }
        let labels: Vec<TextBlock> = graph
            .nodes
            .iter()
            .map(|node| measure_label(ctx.measurer, &node.label, ctx.config))
            .collect();
        let sizes = graph
            .nodes
            .iter()
            .zip(&labels)
            .map(|(node, label)| measure_node(node, label, graph.direction, ctx))
            .collect();
        let placer = Self {
            graph,
            config: &ctx.config.graph,
            children,
            labels,
            sizes,
            offsets: vec![(0.0, 0.0); graph.nodes.len()],
        };
        (placer, roots)
    }

    fn content_origin(&self) -> (f32, f32) {
        (
            self.config.container_padding,
            self.config.container_padding + self.config.container_label_height,
        )
    }

    /// Grows containers around their children, deepest first.
    fn size_group(&mut self, group: &[usize]) -> Dimension {
        for &idx in group {
            if self.children[idx].is_empty() {
                continue;
            }
            let kids = self.children[idx].clone();
            let extent = self.size_group(&kids);
            let (ox, oy) = self.content_origin();
            let own = self.sizes[idx];
            self.sizes[idx] = Dimension::new(
                own.width.max(extent.width + ox + self.config.container_padding),
                own.height.max(extent.height + oy + self.config.container_padding),
            );
        }
        let sizes: Vec<Dimension> = group.iter().map(|&idx| self.sizes[idx]).collect();
        let cells = grid_cells(&sizes, self.config.grid_columns, self.config);
        for (&idx, offset) in group.iter().zip(cells.offsets) {
            self.offsets[idx] = offset;
        }
        cells.extent
    }

    fn build(
        &self,
        group: &[usize],
        origin: (f32, f32),
        depth: usize,
        placed: &HashMap<String, (f32, f32)>,
        fallback_used: &mut bool,
    ) -> Vec<NodeLayout> {
        group
            .iter()
            .map(|&idx| {
                let node = &self.graph.nodes[idx];
                let (x, y) = match placed.get(&node.id) {
                    Some(&position) => position,
                    None => {
                        *fallback_used = true;
                        (origin.0 + self.offsets[idx].0, origin.1 + self.offsets[idx].1)
                    }
                };
                let (ox, oy) = self.content_origin();
                let children = self.build(
                    &self.children[idx],
                    (x + ox, y + oy),
                    depth + 1,
                    placed,
                    fallback_used,
                );
                NodeLayout {
                    id: node.id.clone(),
                    x,
                    y,
                    width: self.sizes[idx].width,
                    height: self.sizes[idx].height,
                    label: self.labels[idx].clone(),
                    shape: node.shape,
                    depth,
                    source: idx,
                    children,
                }
            })
            .collect()
    }
}

fn index_nodes<'n>(nodes: &'n [NodeLayout], out: &mut HashMap<&'n str, &'n NodeLayout>) {
    for node in nodes {
        out.insert(node.id.as_str(), node);
        index_nodes(&node.children, out);
    }
}

fn polyline_midpoint(points: &[(f32, f32)]) -> (f32, f32) {
    match points {
        [] => (0.0, 0.0),
        [only] => *only,
        _ if points.len() % 2 == 0 => {
            let a = points[points.len() / 2 - 1];
            let b = points[points.len() / 2];
            ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
        }
        _ => points[points.len() / 2],
    }
}

pub(super) fn compute_graph_layout(
    kind: DiagramKind,
    graph: &GraphModel,
    ctx: &LayoutContext<'_>,
) -> LayoutParts {
    let options = GraphLayoutOptions::for_model(kind, graph, &ctx.config.graph);
    let (mut placer, roots) = GraphPlacer::new(graph, ctx);
    placer.size_group(&roots);

    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();
    let mut edge_requests = Vec::with_capacity(graph.edges.len());
    for (source, edge) in graph.edges.iter().enumerate() {
        let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
        else {
            tracing::debug!(%kind, from = %edge.from, to = %edge.to, "skipping edge with unknown end");
            continue;
        };
        edge_requests.push(GraphEdgeRequest {
            source,
            from,
            to,
            label: optional_label(ctx.measurer, edge.label.as_deref(), ctx.config)
                .map(|label| Dimension::new(label.width, label.height)),
        });
    }

    let mut engine_failed = false;
    let response = match ctx.engine {
        Some(engine) => {
            let request = GraphLayoutRequest {
                kind,
                nodes: graph
                    .nodes
                    .iter()
                    .enumerate()
                    .map(|(idx, node)| GraphNodeRequest {
                        id: node.id.clone(),
                        width: placer.sizes[idx].width,
                        height: placer.sizes[idx].height,
                        parent: node.parent,
                    })
                    .collect(),
                edges: edge_requests.clone(),
            };
            match engine.layout(&request, &options) {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "graph layout engine failed; using grid fallback");
                    engine_failed = true;
                    GraphLayoutResponse::default()
                }
            }
        }
        None => GraphLayoutResponse::default(),
    };

    let mut fallback_used = false;
    let nodes = placer.build(&roots, (0.0, 0.0), 0, &response.positions, &mut fallback_used);

    let mut by_id = HashMap::new();
    index_nodes(&nodes, &mut by_id);
    let mut edges = Vec::with_capacity(edge_requests.len());
    for request in &edge_requests {
        let edge = &graph.edges[request.source];
        let (Some(from), Some(to)) = (by_id.get(edge.from.as_str()), by_id.get(edge.to.as_str()))
        else {
            continue;
        };
        let points = match response.routes.get(&request.source) {
            Some(route) if route.len() >= 2 => route.clone(),
            _ => {
                let (a, b) = (from.center(), to.center());
                vec![
                    clip_to_rect(a, from.width / 2.0, from.height / 2.0, b),
                    clip_to_rect(b, to.width / 2.0, to.height / 2.0, a),
                ]
            }
        };
        let label = optional_label(ctx.measurer, edge.label.as_deref(), ctx.config);
        let label_anchor = label.as_ref().map(|_| polyline_midpoint(&points));
        edges.push(EdgeLayout {
            from: edge.from.clone(),
            to: edge.to.clone(),
            source: request.source,
            points,
            label,
            label_anchor,
        });
    }

    let title = optional_label(ctx.measurer, graph.title.as_deref(), ctx.config);
    let (title_x, title_y) = match &title {
        Some(title) => {
            let mut content = Bounds::EMPTY;
            for node in &nodes {
                node.collect_bounds(&mut content);
            }
            for edge in &edges {
                edge.collect_bounds(&mut content);
            }
            if content.is_empty() {
                (title.width / 2.0, title.height / 2.0)
            } else {
                (
                    (content.min_x + content.max_x) / 2.0,
                    content.min_y - ctx.config.graph.title_gap - title.height / 2.0,
                )
            }
        }
        None => (0.0, 0.0),
    };

    LayoutParts {
        nodes,
        edges,
        diagram: DiagramData::Graph(GraphData {
            title,
            title_x,
            title_y,
            options,
            degraded: engine_failed || fallback_used,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EdgeDetail, EntityAttribute, GraphEdge};
    use crate::text_metrics::DeterministicTextMeasurer;

    fn node(id: &str) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            label: id.to_uppercase(),
            ..GraphNode::default()
        }
    }

    fn edge(from: &str, to: &str) -> GraphEdge {
        GraphEdge {
            from: from.to_string(),
            to: to.to_string(),
            label: None,
            detail: EdgeDetail::Plain,
        }
    }

    fn run_with(
        graph: &GraphModel,
        engine: Option<&dyn GraphLayoutEngine>,
    ) -> (LayoutParts, GraphData) {
        let measurer = DeterministicTextMeasurer::default();
        let config = LayoutConfig::default();
        let ctx = LayoutContext {
            measurer: &measurer,
            config: &config,
            engine,
        };
        let parts = compute_graph_layout(DiagramKind::Flowchart, graph, &ctx);
        let data = match &parts.diagram {
            DiagramData::Graph(data) => data.clone(),
            other => panic!("unexpected data {other:?}"),
        };
        (parts, data)
    }

    fn overlaps(a: &NodeLayout, b: &NodeLayout) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    #[test]
    fn fallback_grid_uses_three_columns() {
        let graph = GraphModel {
            nodes: ["a", "b", "c", "d", "e"].into_iter().map(node).collect(),
            ..GraphModel::default()
        };
        let (parts, data) = run_with(&graph, None);
        let n = &parts.nodes;
        assert_eq!(n[0].y, n[2].y);
        assert!(n[3].y > n[0].y);
        assert!((n[3].center().0 - n[0].center().0).abs() < 1e-3);
        assert!(n[1].x > n[0].x);
        assert!(data.degraded);
        for (i, a) in n.iter().enumerate() {
            for b in &n[i + 1..] {
                assert!(!overlaps(a, b), "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn children_sit_inside_their_container() {
        let mut inner = node("inner");
        inner.parent = Some(0);
        let mut other = node("other");
        other.parent = Some(0);
        let graph = GraphModel {
            nodes: vec![node("group"), inner, other, node("outside")],
            ..GraphModel::default()
        };
        let (parts, data) = run_with(&graph, None);
        assert_eq!(data.options.hierarchy, HierarchyHandling::IncludeChildren);
        let group = &parts.nodes[0];
        assert_eq!(group.children.len(), 2);
        for child in &group.children {
            assert_eq!(child.depth, 1);
            assert!(child.x >= group.x && child.x + child.width <= group.x + group.width);
            assert!(child.y >= group.y && child.y + child.height <= group.y + group.height);
        }
        assert!(!overlaps(group, &parts.nodes[1]));
    }

    #[test]
    fn straight_edges_are_clipped_and_unknown_ends_skipped() {
        let graph = GraphModel {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("a", "b"), edge("a", "missing")],
            ..GraphModel::default()
        };
        let (parts, _) = run_with(&graph, None);
        assert_eq!(parts.edges.len(), 1);
        let a = &parts.nodes[0];
        let start = parts.edges[0].points[0];
        assert!((start.0 - (a.x + a.width)).abs() < 1e-3);
        assert!((start.1 - a.center().1).abs() < 1e-3);
    }

    struct FailingEngine;

    impl GraphLayoutEngine for FailingEngine {
        fn layout(
            &self,
            _: &GraphLayoutRequest,
            _: &GraphLayoutOptions,
        ) -> Result<GraphLayoutResponse, EngineError> {
            Err(EngineError::Unavailable)
        }
    }

    struct PinningEngine;

    impl GraphLayoutEngine for PinningEngine {
        fn layout(
            &self,
            request: &GraphLayoutRequest,
            _: &GraphLayoutOptions,
        ) -> Result<GraphLayoutResponse, EngineError> {
            let mut response = GraphLayoutResponse::default();
            for (i, node) in request.nodes.iter().enumerate() {
                response
                    .positions
                    .insert(node.id.clone(), (0.0, i as f32 * 200.0));
            }
            for edge in &request.edges {
                response
                    .routes
                    .insert(edge.source, vec![(1.0, 1.0), (5.0, 100.0), (1.0, 200.0)]);
            }
            Ok(response)
        }
    }

    #[test]
    fn engine_failure_degrades_to_grid() {
        let graph = GraphModel {
            nodes: vec![node("a"), node("b")],
            ..GraphModel::default()
        };
        let (parts, data) = run_with(&graph, Some(&FailingEngine));
        assert!(data.degraded);
        assert_eq!(parts.nodes.len(), 2);
    }

    #[test]
    fn engine_positions_and_routes_are_used() {
        let graph = GraphModel {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("a", "b")],
            ..GraphModel::default()
        };
        let (parts, data) = run_with(&graph, Some(&PinningEngine));
        assert!(!data.degraded);
        assert_eq!((parts.nodes[1].x, parts.nodes[1].y), (0.0, 200.0));
        assert_eq!(parts.edges[0].points.len(), 3);
    }

    #[test]
    fn entity_rows_add_height() {
        let mut entity = node("customer");
        entity.detail = NodeDetail::Entity {
            attributes: vec![
                EntityAttribute {
                    data_type: "string".to_string(),
                    name: "name".to_string(),
                    ..EntityAttribute::default()
                },
                EntityAttribute {
                    data_type: "int".to_string(),
                    name: "id".to_string(),
                    keys: vec!["PK".to_string()],
                    comment: None,
                },
            ],
        };
        let bare = node("customer");
        let graph = GraphModel {
            nodes: vec![entity],
            ..GraphModel::default()
        };
        let (parts, _) = run_with(&graph, None);
        let plain = run_with(
            &GraphModel {
                nodes: vec![bare],
                ..GraphModel::default()
            },
            None,
        )
        .0;
        assert!(parts.nodes[0].height >= plain.nodes[0].height + 2.0 * 28.0 - 1e-3);
    }

    #[test]
    fn fork_bars_follow_direction() {
        let mut fork = node("fork");
        fork.detail = NodeDetail::State {
            kind: StateKind::Fork,
        };
        let vertical = GraphModel {
            nodes: vec![fork.clone()],
            ..GraphModel::default()
        };
        let horizontal = GraphModel {
            direction: Direction::LeftRight,
            nodes: vec![fork],
            ..GraphModel::default()
        };
        let v = &run_with(&vertical, None).0.nodes[0];
        let h = &run_with(&horizontal, None).0.nodes[0];
        assert_eq!((v.width, v.height), (70.0, 10.0));
        assert_eq!((h.width, h.height), (10.0, 70.0));
    }

    #[test]
    fn title_sits_above_nodes_inside_bounds() {
        let graph = GraphModel {
            title: Some("Checkout flow".to_string()),
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("a", "b")],
            ..GraphModel::default()
        };
        let (parts, data) = run_with(&graph, None);
        let title = data.title.as_ref().unwrap();
        let top = parts.nodes.iter().map(|n| n.y).fold(f32::INFINITY, f32::min);
        assert!(data.title_y + title.height / 2.0 <= top);

        let bounds = parts.bounds();
        assert!(bounds.min_y <= data.title_y - title.height / 2.0 + 1e-3);
        assert!(bounds.min_x <= data.title_x - title.width / 2.0 + 1e-3);
    }

    #[test]
    fn options_export_elk_properties() {
        let graph = GraphModel {
            direction: Direction::LeftRight,
            ..GraphModel::default()
        };
        let options =
            GraphLayoutOptions::for_model(DiagramKind::Architecture, &graph, &GraphConfig::default());
        let props = options.to_properties();
        assert_eq!(props["elk.algorithm"], "force");
        assert_eq!(props["elk.direction"], "RIGHT");
        assert_eq!(props["elk.hierarchyHandling"], "SEPARATE_CHILDREN");
        assert_eq!(props["elk.spacing.nodeNode"], "50");
    }
}
