mod block;
mod error;
mod gantt;
pub mod graph;
mod kanban;
mod mindmap;
mod packet;
mod pie;
mod quadrant;
mod radar;
mod sankey;
mod text;
mod timeline;
pub(crate) mod types;

pub use gantt::{ResolvedTask, ScheduleResolution, resolve_schedule};
pub use graph::{
    GraphEdgeRequest, GraphLayoutEngine, GraphLayoutOptions, GraphLayoutRequest,
    GraphLayoutResponse, GraphNodeRequest,
};
pub use quadrant::classify_point;
pub use radar::RadarScale;
pub use types::*;

use block::*;
use error::*;
use gantt::*;
use graph::*;
use kanban::*;
use mindmap::*;
use packet::*;
use pie::*;
use quadrant::*;
use radar::*;
use sankey::*;
use timeline::*;

use crate::config::{CanvasConfig, LayoutConfig};
use crate::error::LayoutError;
use crate::ir::{DiagramKind, DiagramModel, NodeShape};
use crate::text_metrics::TextMeasurer;

/// Shared inputs of every per-kind transform.
pub(crate) struct LayoutContext<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub config: &'a LayoutConfig,
    pub engine: Option<&'a dyn GraphLayoutEngine>,
}

/// Turns a diagram model into absolute geometry.
///
/// Graph families are placed with the deterministic grid; see
/// [`compute_layout_with_engine`] to delegate them to a layout engine.
pub fn compute_layout(
    model: &DiagramModel,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    compute_layout_with_engine(model, measurer, config, None)
}

pub fn compute_layout_with_engine(
    model: &DiagramModel,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
    engine: Option<&dyn GraphLayoutEngine>,
) -> Result<Layout, LayoutError> {
    let kind = model.kind();
    model
        .validate()
        .map_err(|reason| LayoutError::invalid(kind, reason))?;

    let ctx = LayoutContext {
        measurer,
        config,
        engine,
    };
    let parts = match model {
        DiagramModel::Flowchart(graph)
        | DiagramModel::Sequence(graph)
        | DiagramModel::Class(graph)
        | DiagramModel::State(graph)
        | DiagramModel::Er(graph)
        | DiagramModel::C4(graph)
        | DiagramModel::Architecture(graph)
        | DiagramModel::Treemap(graph)
        | DiagramModel::Requirement(graph)
        | DiagramModel::Journey(graph) => compute_graph_layout(kind, graph, &ctx),
        DiagramModel::Mindmap(mindmap) => compute_mindmap_layout(mindmap, &ctx),
        DiagramModel::Gantt(gantt) => compute_gantt_layout(gantt, &ctx),
        DiagramModel::Radar(radar) => compute_radar_layout(radar, &ctx),
        DiagramModel::Pie(pie) => compute_pie_layout(pie, &ctx),
        DiagramModel::Quadrant(quadrant) => compute_quadrant_layout(quadrant, &ctx),
        DiagramModel::Sankey(sankey) => compute_sankey_layout(sankey, &ctx),
        DiagramModel::Timeline(timeline) => compute_timeline_layout(timeline, &ctx),
        DiagramModel::Block(block) => compute_block_layout(block, &ctx),
        DiagramModel::Kanban(kanban) => compute_kanban_layout(kanban, &ctx),
        DiagramModel::Packet(packet) => compute_packet_layout(packet, &ctx)
            .map_err(|reason| LayoutError::invalid(kind, reason))?,
        DiagramModel::Error(error) => compute_error_layout(error, config),
        DiagramModel::Info(info) => compute_info_layout(info, config),
    };

    let layout = finish_layout(kind, parts, &config.canvas);
    tracing::debug!(
        kind = %kind,
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        width = layout.width,
        height = layout.height,
        "computed layout"
    );
    Ok(layout)
}

/// Moves content so its bounding box starts at the canvas padding and sizes
/// the canvas to the padded box, never below the configured minimum.
fn finish_layout(kind: DiagramKind, mut parts: LayoutParts, canvas: &CanvasConfig) -> Layout {
    let pad = canvas.padding.max(0.0);
    let bounds = parts.bounds();
    let (content_width, content_height) = if bounds.is_empty() {
        (0.0, 0.0)
    } else {
        parts.translate(pad - bounds.min_x, pad - bounds.min_y);
        (bounds.width() + pad * 2.0, bounds.height() + pad * 2.0)
    };
    Layout {
        kind,
        nodes: parts.nodes,
        edges: parts.edges,
        width: content_width.max(canvas.min_width),
        height: content_height.max(canvas.min_height),
        diagram: parts.diagram,
    }
}

/// Node box around a measured label, following the padding each shape needs.
pub(crate) fn shape_size(shape: NodeShape, label: &TextBlock, config: &LayoutConfig) -> Dimension {
    let (pad_x_factor, pad_y_factor) = shape_padding_factors(shape);
    let pad_x = config.node_padding_x * pad_x_factor;
    let pad_y = config.node_padding_y * pad_y_factor;
    let base_width = label.width + pad_x * 2.0;
    let base_height = label.height + pad_y * 2.0;
    let mut width = base_width;
    let mut height = base_height;

    match shape {
        NodeShape::Diamond => {
            let size = base_width.max(base_height) * 0.95;
            width = size;
            height = size;
        }
        NodeShape::ForkJoin => {
            width = width.max(50.0);
            height = (config.node_padding_y * 0.4).max(8.0);
        }
        NodeShape::Circle | NodeShape::DoubleCircle => {
            let size = if label.is_empty() {
                (config.node_padding_y * 1.4).max(14.0)
            } else {
                width.max(height)
            };
            width = size;
            height = size;
        }
        NodeShape::RoundRect => {
            width *= 1.1;
            height *= 1.05;
        }
        NodeShape::Cylinder | NodeShape::Cloud | NodeShape::Bang => {
            width *= 1.1;
            height *= 1.1;
        }
        NodeShape::Hexagon => {
            width *= 1.2;
            height *= 1.1;
        }
        NodeShape::Trapezoid | NodeShape::TrapezoidAlt | NodeShape::Asymmetric => {
            width *= 1.2;
        }
        NodeShape::Rectangle
        | NodeShape::Stadium
        | NodeShape::Subroutine
        | NodeShape::Parallelogram
        | NodeShape::ParallelogramAlt
        | NodeShape::Text
        | NodeShape::MindmapDefault => {}
    }
    Dimension::new(width, height)
}

fn shape_padding_factors(shape: NodeShape) -> (f32, f32) {
    match shape {
        NodeShape::Text => (0.0, 0.0),
        NodeShape::Stadium => (1.2, 0.8),
        NodeShape::Subroutine => (1.1, 1.0),
        NodeShape::Parallelogram | NodeShape::ParallelogramAlt => (1.3, 1.0),
        NodeShape::Diamond => (0.6, 0.6),
        _ => (1.0, 1.0),
    }
}

/// Cartesian point at `angle_deg` (clockwise from 3 o'clock, y down).
pub(crate) fn polar_point(center: (f32, f32), angle_deg: f32, radius: f32) -> (f32, f32) {
    let rad = angle_deg.to_radians();
    (center.0 + radius * rad.cos(), center.1 + radius * rad.sin())
}

/// Point where the segment from the centre of `rect` towards `toward` leaves
/// the rectangle.
pub(crate) fn clip_to_rect(
    (cx, cy): (f32, f32),
    half_width: f32,
    half_height: f32,
    toward: (f32, f32),
) -> (f32, f32) {
    let dx = toward.0 - cx;
    let dy = toward.1 - cy;
    if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
        return (cx, cy);
    }
    let scale_x = if dx.abs() > f32::EPSILON {
        half_width / dx.abs()
    } else {
        f32::INFINITY
    };
    let scale_y = if dy.abs() > f32::EPSILON {
        half_height / dy.abs()
    } else {
        f32::INFINITY
    };
    let scale = scale_x.min(scale_y).min(1.0);
    (cx + dx * scale, cy + dy * scale)
}
