use chrono::NaiveDate;
use serde::Serialize;

use crate::ir::{DiagramKind, GanttStatus, KanbanPriority, NodeShape};
use crate::layout::graph::GraphLayoutOptions;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Dimension {
    pub width: f32,
    pub height: f32,
}

impl Dimension {
    pub const ZERO: Dimension = Dimension {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.is_empty())
    }
}

/// Axis-aligned bounding box accumulated while walking emitted geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min_x: f32::INFINITY,
        min_y: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        max_y: f32::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    pub fn include_point(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn include_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.include_point(x, y);
        self.include_point(x + width, y + height);
    }

    /// Includes a label of `block` size centred on `(cx, cy)`.
    pub fn include_centered(&mut self, cx: f32, cy: f32, block: &TextBlock) {
        self.include_rect(
            cx - block.width / 2.0,
            cy - block.height / 2.0,
            block.width,
            block.height,
        );
    }

    pub fn merge(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.include_point(other.min_x, other.min_y);
        self.include_point(other.max_x, other.max_y);
    }
}

/// A positioned node. `x`/`y` are the top-left corner in absolute canvas
/// coordinates, also for nested `children`.
#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: TextBlock,
    pub shape: NodeShape,
    pub depth: usize,
    /// Index of the originating element in the model's node collection.
    pub source: usize,
    pub children: Vec<NodeLayout>,
}

impl NodeLayout {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }

    pub(crate) fn collect_bounds(&self, bounds: &mut Bounds) {
        bounds.include_rect(self.x, self.y, self.width, self.height);
        for child in &self.children {
            child.collect_bounds(bounds);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    /// Index of the originating edge in the model.
    pub source: usize,
    /// First and last points are the endpoints; inner points are bend points.
    pub points: Vec<(f32, f32)>,
    pub label: Option<TextBlock>,
    pub label_anchor: Option<(f32, f32)>,
}

impl EdgeLayout {
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for point in &mut self.points {
            point.0 += dx;
            point.1 += dy;
        }
        if let Some(anchor) = &mut self.label_anchor {
            anchor.0 += dx;
            anchor.1 += dy;
        }
    }

    pub(crate) fn collect_bounds(&self, bounds: &mut Bounds) {
        for &(x, y) in &self.points {
            bounds.include_point(x, y);
        }
        if let (Some((x, y)), Some(label)) = (self.label_anchor, &self.label) {
            bounds.include_centered(x, y, label);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub kind: DiagramKind,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
    pub diagram: DiagramData,
}

impl Layout {
    /// Every node, nested children included, in pre-order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &NodeLayout> {
        let mut stack: Vec<&NodeLayout> = self.nodes.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.iter_nodes().find(|node| node.id == id)
    }
}

/// Geometry produced by one diagram transform before canvas normalization.
#[derive(Debug, Clone, Default)]
pub struct LayoutParts {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub diagram: DiagramData,
}

impl LayoutParts {
    pub fn bounds(&self) -> Bounds {
        let mut bounds = self.diagram.bounds();
        for node in &self.nodes {
            node.collect_bounds(&mut bounds);
        }
        for edge in &self.edges {
            edge.collect_bounds(&mut bounds);
        }
        bounds
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for node in &mut self.nodes {
            node.translate(dx, dy);
        }
        for edge in &mut self.edges {
            edge.translate(dx, dy);
        }
        self.diagram.translate(dx, dy);
    }
}

/// Per-kind rendering metadata.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiagramData {
    #[default]
    Empty,
    Graph(GraphData),
    Mindmap(MindmapLayout),
    Gantt(GanttLayout),
    Radar(RadarLayout),
    Pie(PieLayout),
    Quadrant(QuadrantLayout),
    Sankey(SankeyLayout),
    Timeline(TimelineLayout),
    Block(BlockLayout),
    Kanban(KanbanLayout),
    Packet(PacketLayout),
    Error(ErrorLayout),
    Info(InfoLayout),
}

impl DiagramData {
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::EMPTY;
        match self {
            Self::Empty | Self::Mindmap(_) | Self::Block(_) => {}
            Self::Graph(graph) => {
                if let Some(title) = &graph.title {
                    bounds.include_centered(graph.title_x, graph.title_y, title);
                }
            }
            Self::Gantt(gantt) => gantt.collect_bounds(&mut bounds),
            Self::Radar(radar) => radar.collect_bounds(&mut bounds),
            Self::Pie(pie) => pie.collect_bounds(&mut bounds),
            Self::Quadrant(quadrant) => quadrant.collect_bounds(&mut bounds),
            Self::Sankey(sankey) => sankey.collect_bounds(&mut bounds),
            Self::Timeline(timeline) => timeline.collect_bounds(&mut bounds),
            Self::Kanban(kanban) => kanban.collect_bounds(&mut bounds),
            Self::Packet(packet) => packet.collect_bounds(&mut bounds),
            Self::Error(error) => bounds.include_rect(0.0, 0.0, error.width, error.height),
            Self::Info(info) => bounds.include_rect(0.0, 0.0, info.width, info.height),
        }
        bounds
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            // Fixed canvases and node-only kinds carry no free coordinates.
            Self::Empty
            | Self::Mindmap(_)
            | Self::Block(_)
            | Self::Error(_)
            | Self::Info(_) => {}
            Self::Graph(graph) => {
                graph.title_x += dx;
                graph.title_y += dy;
            }
            Self::Gantt(gantt) => gantt.translate(dx, dy),
            Self::Radar(radar) => radar.translate(dx, dy),
            Self::Pie(pie) => pie.translate(dx, dy),
            Self::Quadrant(quadrant) => quadrant.translate(dx, dy),
            Self::Sankey(sankey) => sankey.translate(dx, dy),
            Self::Timeline(timeline) => timeline.translate(dx, dy),
            Self::Kanban(kanban) => kanban.translate(dx, dy),
            Self::Packet(packet) => packet.translate(dx, dy),
        }
    }
}

fn shift(point: &mut (f32, f32), dx: f32, dy: f32) {
    point.0 += dx;
    point.1 += dy;
}

// ---------------------------------------------------------------------------
// Graph families
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub title: Option<TextBlock>,
    /// Centre of the title, in a band above the placed nodes.
    pub title_x: f32,
    pub title_y: f32,
    pub options: GraphLayoutOptions,
    /// Set when positions come from the grid fallback rather than an engine.
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// Mindmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MindmapLayout {
    pub tree_width: f32,
    pub tree_height: f32,
    pub nodes: Vec<MindmapNodeInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MindmapNodeInfo {
    pub id: String,
    pub level: usize,
    /// Index of the root-level branch the node belongs to; `None` for the root.
    pub section: Option<usize>,
    pub subtree_width: f32,
}

// ---------------------------------------------------------------------------
// Gantt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GanttLayout {
    pub title: Option<TextBlock>,
    pub title_y: f32,
    /// Padded timeline bounds; `None` when no task resolved.
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub chart_x: f32,
    pub chart_y: f32,
    pub chart_width: f32,
    pub chart_height: f32,
    pub day_width: f32,
    pub row_height: f32,
    pub sections: Vec<GanttSectionLayout>,
    pub tasks: Vec<GanttTaskLayout>,
    pub ticks: Vec<GanttTick>,
    /// Task keys dropped because their dependencies never resolved.
    pub unresolved: Vec<String>,
}

impl GanttLayout {
    fn collect_bounds(&self, bounds: &mut Bounds) {
        if let Some(title) = &self.title {
            bounds.include_centered(self.chart_x + self.chart_width / 2.0, self.title_y, title);
        }
        if !self.tasks.is_empty() {
            bounds.include_rect(self.chart_x, self.chart_y, self.chart_width, self.chart_height);
        }
        for section in &self.sections {
            bounds.include_rect(section.label_x, section.y, section.label.width, section.height);
        }
        for task in &self.tasks {
            bounds.include_rect(task.x, task.y, task.width, task.height);
            bounds.include_rect(task.label_x, task.y, task.label.width, task.label.height);
        }
        for tick in &self.ticks {
            bounds.include_centered(tick.x, tick.y, &tick.label);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.title_y += dy;
        self.chart_x += dx;
        self.chart_y += dy;
        for section in &mut self.sections {
            section.label_x += dx;
            section.y += dy;
        }
        for task in &mut self.tasks {
            task.x += dx;
            task.y += dy;
            task.label_x += dx;
        }
        for tick in &mut self.ticks {
            tick.x += dx;
            tick.y += dy;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GanttSectionLayout {
    pub label: TextBlock,
    pub label_x: f32,
    pub y: f32,
    pub height: f32,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GanttTaskLayout {
    pub key: String,
    pub label: TextBlock,
    pub label_x: f32,
    pub section: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub status: Option<GanttStatus>,
    pub milestone: bool,
}

#[derive(Debug, Clone, Serialize)]
/// Date tick; the label is centred on `(x, y)`.
pub struct GanttTick {
    pub x: f32,
    pub y: f32,
    pub label: TextBlock,
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RadarLayout {
    pub title: Option<TextBlock>,
    pub title_y: f32,
    pub center: (f32, f32),
    pub radius: f32,
    pub min: f32,
    pub max: f32,
    /// Radii of the reference circles, innermost first.
    pub rings: Vec<f32>,
    pub axes: Vec<RadarAxisLayout>,
    pub curves: Vec<RadarCurveLayout>,
}

impl RadarLayout {
    fn collect_bounds(&self, bounds: &mut Bounds) {
        if self.axes.is_empty() {
            return;
        }
        let (cx, cy) = self.center;
        bounds.include_rect(
            cx - self.radius,
            cy - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        );
        if let Some(title) = &self.title {
            bounds.include_centered(cx, self.title_y, title);
        }
        for axis in &self.axes {
            bounds.include_centered(axis.label_pos.0, axis.label_pos.1, &axis.label);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.title_y += dy;
        shift(&mut self.center, dx, dy);
        for axis in &mut self.axes {
            shift(&mut axis.end, dx, dy);
            shift(&mut axis.label_pos, dx, dy);
        }
        for curve in &mut self.curves {
            for point in &mut curve.points {
                shift(point, dx, dy);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RadarAxisLayout {
    pub id: String,
    pub label: TextBlock,
    /// Degrees, measured clockwise from 3 o'clock.
    pub angle: f32,
    pub end: (f32, f32),
    pub label_pos: (f32, f32),
}

#[derive(Debug, Clone, Serialize)]
pub struct RadarCurveLayout {
    pub id: String,
    pub label: String,
    pub index: usize,
    pub radii: Vec<f32>,
    /// One vertex per axis; the polygon is closed by the renderer.
    pub points: Vec<(f32, f32)>,
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PieLayout {
    pub title: Option<TextBlock>,
    pub title_y: f32,
    pub center: (f32, f32),
    pub radius: f32,
    pub total: f32,
    pub slices: Vec<PieSliceLayout>,
    pub legend: Vec<PieLegendItem>,
}

impl PieLayout {
    fn collect_bounds(&self, bounds: &mut Bounds) {
        if self.slices.is_empty() && self.title.is_none() {
            return;
        }
        let (cx, cy) = self.center;
        bounds.include_rect(
            cx - self.radius,
            cy - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        );
        if let Some(title) = &self.title {
            bounds.include_centered(cx, self.title_y, title);
        }
        for slice in &self.slices {
            if let Some((x, y)) = slice.label_pos {
                bounds.include_centered(x, y, &slice.label);
            }
        }
        for item in &self.legend {
            bounds.include_rect(
                item.x,
                item.y,
                item.marker_size + item.label_gap + item.label.width,
                item.marker_size.max(item.label.height),
            );
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.title_y += dy;
        shift(&mut self.center, dx, dy);
        for slice in &mut self.slices {
            if let Some(pos) = &mut slice.label_pos {
                shift(pos, dx, dy);
            }
        }
        for item in &mut self.legend {
            item.x += dx;
            item.y += dy;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PieSliceLayout {
    pub label: TextBlock,
    pub value: f32,
    pub percent: f32,
    /// Degrees; 0 is 3 o'clock, the first slice starts at -90.
    pub start_angle: f32,
    pub end_angle: f32,
    pub large_arc: bool,
    /// `None` when the slice is too small for an inline label.
    pub label_pos: Option<(f32, f32)>,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieLegendItem {
    pub x: f32,
    pub y: f32,
    pub label: TextBlock,
    pub marker_size: f32,
    pub label_gap: f32,
    pub value: f32,
    pub index: usize,
}

// ---------------------------------------------------------------------------
// Quadrant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Quadrant {
    TopRight,
    TopLeft,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantLayout {
    pub title: Option<TextBlock>,
    pub title_y: f32,
    pub grid_x: f32,
    pub grid_y: f32,
    pub grid_width: f32,
    pub grid_height: f32,
    pub quadrants: Vec<QuadrantRegion>,
    pub x_axis_left: Option<AxisLabel>,
    pub x_axis_right: Option<AxisLabel>,
    pub y_axis_bottom: Option<AxisLabel>,
    pub y_axis_top: Option<AxisLabel>,
    pub points: Vec<QuadrantPointLayout>,
}

impl QuadrantLayout {
    fn axis_labels_mut(&mut self) -> impl Iterator<Item = &mut AxisLabel> {
        [
            &mut self.x_axis_left,
            &mut self.x_axis_right,
            &mut self.y_axis_bottom,
            &mut self.y_axis_top,
        ]
        .into_iter()
        .flatten()
    }

    fn collect_bounds(&self, bounds: &mut Bounds) {
        bounds.include_rect(self.grid_x, self.grid_y, self.grid_width, self.grid_height);
        if let Some(title) = &self.title {
            bounds.include_centered(self.grid_x + self.grid_width / 2.0, self.title_y, title);
        }
        for label in [
            &self.x_axis_left,
            &self.x_axis_right,
            &self.y_axis_bottom,
            &self.y_axis_top,
        ]
        .into_iter()
        .flatten()
        {
            bounds.include_centered(label.x, label.y, &label.text);
        }
        for point in &self.points {
            bounds.include_point(point.x - point.radius, point.y - point.radius);
            bounds.include_point(point.x + point.radius, point.y + point.radius);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.title_y += dy;
        self.grid_x += dx;
        self.grid_y += dy;
        for region in &mut self.quadrants {
            region.x += dx;
            region.y += dy;
        }
        for label in self.axis_labels_mut() {
            label.x += dx;
            label.y += dy;
        }
        for point in &mut self.points {
            point.x += dx;
            point.y += dy;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantRegion {
    pub quadrant: Quadrant,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: Option<TextBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisLabel {
    pub text: TextBlock,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantPointLayout {
    pub label: TextBlock,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub quadrant: Quadrant,
}

// ---------------------------------------------------------------------------
// Sankey
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SankeyLayout {
    pub node_width: f32,
    pub nodes: Vec<SankeyNodeLayout>,
    pub links: Vec<SankeyLinkLayout>,
}

impl SankeyLayout {
    fn collect_bounds(&self, bounds: &mut Bounds) {
        for node in &self.nodes {
            bounds.include_rect(node.x, node.y, node.width, node.height);
        }
        for link in &self.links {
            bounds.include_point(link.start.0, link.start.1 - link.thickness / 2.0);
            bounds.include_point(link.end.0, link.end.1 + link.thickness / 2.0);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        for node in &mut self.nodes {
            node.x += dx;
            node.y += dy;
        }
        for link in &mut self.links {
            shift(&mut link.start, dx, dy);
            shift(&mut link.end, dx, dy);
            shift(&mut link.control1, dx, dy);
            shift(&mut link.control2, dx, dy);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyNodeLayout {
    pub id: String,
    pub label: String,
    pub total: f32,
    pub rank: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyLinkLayout {
    pub source: String,
    pub target: String,
    pub value: f32,
    pub thickness: f32,
    /// Centre of the link band where it leaves the source node.
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub control1: (f32, f32),
    pub control2: (f32, f32),
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TimelineLayout {
    pub title: Option<TextBlock>,
    pub title_y: f32,
    pub line_y: f32,
    pub line_start_x: f32,
    pub line_end_x: f32,
    pub periods: Vec<TimelinePeriodLayout>,
    pub sections: Vec<TimelineSectionLayout>,
}

impl TimelineLayout {
    fn collect_bounds(&self, bounds: &mut Bounds) {
        if self.periods.is_empty() && self.title.is_none() {
            return;
        }
        bounds.include_point(self.line_start_x, self.line_y);
        bounds.include_point(self.line_end_x, self.line_y);
        if let Some(title) = &self.title {
            bounds.include_centered(
                (self.line_start_x + self.line_end_x) / 2.0,
                self.title_y,
                title,
            );
        }
        for period in &self.periods {
            bounds.include_centered(period.x, period.time_y, &period.time);
            for event in &period.events {
                bounds.include_rect(event.x, event.y, event.width, event.height);
            }
        }
        for section in &self.sections {
            bounds.include_rect(section.x, section.y, section.width, section.height);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.title_y += dy;
        self.line_y += dy;
        self.line_start_x += dx;
        self.line_end_x += dx;
        for period in &mut self.periods {
            period.x += dx;
            period.time_y += dy;
            for event in &mut period.events {
                event.x += dx;
                event.y += dy;
            }
        }
        for section in &mut self.sections {
            section.x += dx;
            section.y += dy;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelinePeriodLayout {
    pub time: TextBlock,
    /// Position along the axis in percent of its width.
    pub percent: f32,
    pub x: f32,
    pub time_y: f32,
    pub section: Option<usize>,
    pub events: Vec<TimelineEventLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEventLayout {
    pub label: TextBlock,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSectionLayout {
    pub label: TextBlock,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

// ---------------------------------------------------------------------------
// Block, kanban, packet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BlockLayout {
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct KanbanLayout {
    pub columns: Vec<KanbanColumnLayout>,
}

impl KanbanLayout {
    fn collect_bounds(&self, bounds: &mut Bounds) {
        for column in &self.columns {
            bounds.include_rect(column.x, column.y, column.width, column.height);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        for column in &mut self.columns {
            column.x += dx;
            column.y += dy;
            for card in &mut column.cards {
                card.x += dx;
                card.y += dy;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumnLayout {
    pub id: String,
    pub label: TextBlock,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub cards: Vec<KanbanCardLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KanbanCardLayout {
    pub id: String,
    pub label: TextBlock,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub ticket: Option<String>,
    pub assigned: Option<String>,
    pub priority: Option<KanbanPriority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    /// The field continues on the next row.
    Continuation,
    Final,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketLayout {
    pub title: Option<TextBlock>,
    pub title_y: f32,
    pub bits_per_row: u32,
    pub bit_width: f32,
    pub row_height: f32,
    pub rows: u32,
    pub fields: Vec<PacketFieldLayout>,
}

impl PacketLayout {
    fn collect_bounds(&self, bounds: &mut Bounds) {
        if let Some(title) = &self.title {
            let row_width = self.bits_per_row as f32 * self.bit_width;
            bounds.include_centered(row_width / 2.0, self.title_y, title);
        }
        for segment in self.fields.iter().flat_map(|field| &field.segments) {
            bounds.include_rect(segment.x, segment.y, segment.width, segment.height);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.title_y += dy;
        for segment in self.fields.iter_mut().flat_map(|field| &mut field.segments) {
            segment.x += dx;
            segment.y += dy;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketFieldLayout {
    pub label: TextBlock,
    pub start: u32,
    pub end: u32,
    pub segments: Vec<PacketSegment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketSegment {
    pub start: u32,
    pub end: u32,
    pub row: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: SegmentKind,
}

// ---------------------------------------------------------------------------
// Fixed canvases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ErrorLayout {
    pub viewbox_width: f32,
    pub viewbox_height: f32,
    pub width: f32,
    pub height: f32,
    pub message: String,
    pub version: String,
    pub text_x: f32,
    pub text_y: f32,
    pub text_size: f32,
    pub version_x: f32,
    pub version_y: f32,
    pub version_size: f32,
    pub icon_scale: f32,
    pub icon_tx: f32,
    pub icon_ty: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoLayout {
    pub version: String,
    pub width: f32,
    pub height: f32,
    pub text_x: f32,
    pub text_y: f32,
    pub font_size: f32,
}
