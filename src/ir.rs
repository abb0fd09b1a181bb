use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    Er,
    C4,
    Architecture,
    Treemap,
    Requirement,
    Journey,
    Gantt,
    Pie,
    Mindmap,
    Radar,
    Kanban,
    Block,
    Packet,
    Quadrant,
    Sankey,
    Timeline,
    Error,
    Info,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 22] = [
        Self::Flowchart,
        Self::Sequence,
        Self::Class,
        Self::State,
        Self::Er,
        Self::C4,
        Self::Architecture,
        Self::Treemap,
        Self::Requirement,
        Self::Journey,
        Self::Gantt,
        Self::Pie,
        Self::Mindmap,
        Self::Radar,
        Self::Kanban,
        Self::Block,
        Self::Packet,
        Self::Quadrant,
        Self::Sankey,
        Self::Timeline,
        Self::Error,
        Self::Info,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequence",
            Self::Class => "class",
            Self::State => "state",
            Self::Er => "er",
            Self::C4 => "c4",
            Self::Architecture => "architecture",
            Self::Treemap => "treemap",
            Self::Requirement => "requirement",
            Self::Journey => "journey",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::Mindmap => "mindmap",
            Self::Radar => "radar",
            Self::Kanban => "kanban",
            Self::Block => "block",
            Self::Packet => "packet",
            Self::Quadrant => "quadrant",
            Self::Sankey => "sankey",
            Self::Timeline => "timeline",
            Self::Error => "error",
            Self::Info => "info",
        }
    }

    /// Kinds laid out through the generic graph adapter.
    pub fn is_graph(self) -> bool {
        matches!(
            self,
            Self::Flowchart
                | Self::Sequence
                | Self::Class
                | Self::State
                | Self::Er
                | Self::C4
                | Self::Architecture
                | Self::Treemap
                | Self::Requirement
                | Self::Journey
        )
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    TopDown,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" => Some(Self::TopDown),
            "BT" => Some(Self::BottomTop),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight | Self::RightLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeShape {
    #[default]
    Rectangle,
    RoundRect,
    Stadium,
    Subroutine,
    Cylinder,
    Circle,
    DoubleCircle,
    Diamond,
    Hexagon,
    Parallelogram,
    ParallelogramAlt,
    Trapezoid,
    TrapezoidAlt,
    Asymmetric,
    Text,
    ForkJoin,
    Cloud,
    Bang,
    MindmapDefault,
}

/// Every diagram model the layout stage understands, one variant per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiagramModel {
    Flowchart(GraphModel),
    Sequence(GraphModel),
    Class(GraphModel),
    State(GraphModel),
    Er(GraphModel),
    C4(GraphModel),
    Architecture(GraphModel),
    Treemap(GraphModel),
    Requirement(GraphModel),
    Journey(GraphModel),
    Gantt(GanttModel),
    Pie(PieModel),
    Mindmap(MindmapModel),
    Radar(RadarModel),
    Kanban(KanbanModel),
    Block(BlockModel),
    Packet(PacketModel),
    Quadrant(QuadrantModel),
    Sankey(SankeyModel),
    Timeline(TimelineModel),
    Error(ErrorModel),
    Info(InfoModel),
}

impl DiagramModel {
    pub fn kind(&self) -> DiagramKind {
        match self {
            Self::Flowchart(_) => DiagramKind::Flowchart,
            Self::Sequence(_) => DiagramKind::Sequence,
            Self::Class(_) => DiagramKind::Class,
            Self::State(_) => DiagramKind::State,
            Self::Er(_) => DiagramKind::Er,
            Self::C4(_) => DiagramKind::C4,
            Self::Architecture(_) => DiagramKind::Architecture,
            Self::Treemap(_) => DiagramKind::Treemap,
            Self::Requirement(_) => DiagramKind::Requirement,
            Self::Journey(_) => DiagramKind::Journey,
            Self::Gantt(_) => DiagramKind::Gantt,
            Self::Pie(_) => DiagramKind::Pie,
            Self::Mindmap(_) => DiagramKind::Mindmap,
            Self::Radar(_) => DiagramKind::Radar,
            Self::Kanban(_) => DiagramKind::Kanban,
            Self::Block(_) => DiagramKind::Block,
            Self::Packet(_) => DiagramKind::Packet,
            Self::Quadrant(_) => DiagramKind::Quadrant,
            Self::Sankey(_) => DiagramKind::Sankey,
            Self::Timeline(_) => DiagramKind::Timeline,
            Self::Error(_) => DiagramKind::Error,
            Self::Info(_) => DiagramKind::Info,
        }
    }

    /// An empty model of the given kind.
    pub fn empty(kind: DiagramKind) -> Self {
        match kind {
            DiagramKind::Flowchart => Self::Flowchart(GraphModel::default()),
            DiagramKind::Sequence => Self::Sequence(GraphModel::default()),
            DiagramKind::Class => Self::Class(GraphModel::default()),
            DiagramKind::State => Self::State(GraphModel::default()),
            DiagramKind::Er => Self::Er(GraphModel::default()),
            DiagramKind::C4 => Self::C4(GraphModel::default()),
            DiagramKind::Architecture => Self::Architecture(GraphModel::default()),
            DiagramKind::Treemap => Self::Treemap(GraphModel::default()),
            DiagramKind::Requirement => Self::Requirement(GraphModel::default()),
            DiagramKind::Journey => Self::Journey(GraphModel::default()),
            DiagramKind::Gantt => Self::Gantt(GanttModel::default()),
            DiagramKind::Pie => Self::Pie(PieModel::default()),
            DiagramKind::Mindmap => Self::Mindmap(MindmapModel::default()),
            DiagramKind::Radar => Self::Radar(RadarModel::default()),
            DiagramKind::Kanban => Self::Kanban(KanbanModel::default()),
            DiagramKind::Block => Self::Block(BlockModel::default()),
            DiagramKind::Packet => Self::Packet(PacketModel::default()),
            DiagramKind::Quadrant => Self::Quadrant(QuadrantModel::default()),
            DiagramKind::Sankey => Self::Sankey(SankeyModel::default()),
            DiagramKind::Timeline => Self::Timeline(TimelineModel::default()),
            DiagramKind::Error => Self::Error(ErrorModel::default()),
            DiagramKind::Info => Self::Info(InfoModel::default()),
        }
    }

    /// Model-level validity predicate, checked once at transform entry.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Flowchart(graph)
            | Self::Sequence(graph)
            | Self::Class(graph)
            | Self::State(graph)
            | Self::Er(graph)
            | Self::C4(graph)
            | Self::Architecture(graph)
            | Self::Treemap(graph)
            | Self::Requirement(graph)
            | Self::Journey(graph) => graph.validate(),
            Self::Gantt(gantt) => gantt.validate(),
            Self::Pie(pie) => pie.validate(),
            Self::Mindmap(mindmap) => mindmap.validate(),
            Self::Radar(radar) => radar.validate(),
            Self::Kanban(kanban) => kanban.validate(),
            Self::Block(block) => block.validate(),
            Self::Packet(packet) => packet.validate(),
            Self::Quadrant(quadrant) => quadrant.validate(),
            Self::Sankey(sankey) => sankey.validate(),
            Self::Timeline(_) | Self::Error(_) | Self::Info(_) => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Graph families (flowchart, sequence, class, state, ER, C4, ...)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphModel {
    pub title: Option<String>,
    pub direction: Direction,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    /// Index of the enclosing container node in `GraphModel::nodes`.
    pub parent: Option<usize>,
    pub detail: NodeDetail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeDetail {
    #[default]
    Plain,
    Class {
        #[serde(default)]
        annotations: Vec<String>,
        #[serde(default)]
        members: Vec<String>,
        #[serde(default)]
        methods: Vec<String>,
    },
    Entity {
        #[serde(default)]
        attributes: Vec<EntityAttribute>,
    },
    State {
        kind: StateKind,
    },
    Participant {
        #[serde(default)]
        actor: bool,
    },
    C4Element {
        element: C4ElementKind,
        #[serde(default)]
        technology: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        external: bool,
    },
    Requirement {
        #[serde(default)]
        requirement_type: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        risk: Option<String>,
        #[serde(default)]
        verify_method: Option<String>,
    },
    Service {
        #[serde(default)]
        icon: Option<String>,
    },
    JourneyTask {
        #[serde(default)]
        score: Option<u8>,
        #[serde(default)]
        actors: Vec<String>,
    },
    TreemapItem {
        #[serde(default)]
        value: Option<f32>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityAttribute {
    pub data_type: String,
    pub name: String,
    pub keys: Vec<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateKind {
    #[default]
    Normal,
    Start,
    End,
    Fork,
    Join,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum C4ElementKind {
    Person,
    #[default]
    System,
    SystemDb,
    SystemQueue,
    Container,
    ContainerDb,
    ContainerQueue,
    Component,
    Boundary,
}

impl C4ElementKind {
    pub fn type_label(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::System => "system",
            Self::SystemDb => "system_db",
            Self::SystemQueue => "system_queue",
            Self::Container => "container",
            Self::ContainerDb => "container_db",
            Self::ContainerQueue => "container_queue",
            Self::Component => "component",
            Self::Boundary => "boundary",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub detail: EdgeDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dotted,
    Thick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    Inheritance,
    Composition,
    Aggregation,
    Association,
    Dependency,
    Realization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    Sync,
    Async,
    Reply,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeDetail {
    #[default]
    Plain,
    Link {
        #[serde(default)]
        style: EdgeStyle,
        #[serde(default)]
        arrow_start: bool,
        #[serde(default = "default_true")]
        arrow_end: bool,
    },
    Relation {
        relation: RelationKind,
        #[serde(default)]
        from_cardinality: Option<String>,
        #[serde(default)]
        to_cardinality: Option<String>,
    },
    Message {
        message: MessageKind,
        #[serde(default)]
        sequence: usize,
    },
    C4Rel {
        #[serde(default)]
        technology: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

impl GraphModel {
    pub fn validate(&self) -> Result<(), String> {
        let mut seen: HashSet<&str> = HashSet::new();
        for node in &self.nodes {
            if node.id.trim().is_empty() {
                return Err("node with empty id".to_string());
            }
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate node id '{}'", node.id));
            }
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            let Some(parent) = node.parent else {
                continue;
            };
            if parent >= self.nodes.len() {
                return Err(format!(
                    "node '{}' names parent index {} outside of {} nodes",
                    node.id,
                    parent,
                    self.nodes.len()
                ));
            }
            // Walk the parent chain; more steps than nodes means a cycle.
            let mut cursor = Some(parent);
            let mut steps = 0usize;
            while let Some(current) = cursor {
                if current == idx || steps > self.nodes.len() {
                    return Err(format!("node '{}' is its own ancestor", node.id));
                }
                cursor = self.nodes.get(current).and_then(|n| n.parent);
                steps += 1;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mindmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MindmapModel {
    pub nodes: Vec<MindmapNode>,
    /// Index of the root in `nodes`; `None` means the tree is empty.
    pub root: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MindmapNode {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub level: usize,
    pub children: Vec<usize>,
}

impl MindmapModel {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(root) = self.root
            && root >= self.nodes.len()
        {
            return Err(format!("root index {root} outside of {} nodes", self.nodes.len()));
        }
        let mut parent_of: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child >= self.nodes.len() {
                    return Err(format!(
                        "node '{}' names child index {} outside of {} nodes",
                        node.id,
                        child,
                        self.nodes.len()
                    ));
                }
                if child == idx || Some(child) == self.root {
                    return Err(format!("node '{}' closes a cycle", node.id));
                }
                if parent_of[child].replace(idx).is_some() {
                    return Err(format!("node '{}' has more than one parent", self.nodes[child].id));
                }
            }
        }
        // With single parents and the root parentless, a cycle can only live in a
        // component detached from the root; walking up from every node detects it.
        for start in 0..self.nodes.len() {
            let mut cursor = parent_of[start];
            let mut steps = 0usize;
            while let Some(current) = cursor {
                if current == start || steps > self.nodes.len() {
                    return Err(format!("node '{}' is its own ancestor", self.nodes[start].id));
                }
                cursor = parent_of[current];
                steps += 1;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gantt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GanttModel {
    pub title: Option<String>,
    pub sections: Vec<GanttSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GanttSection {
    pub name: Option<String>,
    pub tasks: Vec<GanttTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttTask {
    #[serde(default)]
    pub id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub start: TaskStart,
    pub end: TaskEnd,
    #[serde(default)]
    pub status: Option<GanttStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStart {
    On(NaiveDate),
    /// Starts when the latest of the referenced tasks ends.
    After(Vec<String>),
    /// Starts when the previously declared task ends.
    #[default]
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskEnd {
    On(NaiveDate),
    Duration(TaskDuration),
    /// Ends when the referenced task starts.
    Until(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl TaskDuration {
    pub fn days(amount: u32) -> Self {
        Self {
            amount,
            unit: DurationUnit::Day,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GanttStatus {
    Done,
    Active,
    Crit,
    Milestone,
}

/// Key prefix of tasks declared without an id; explicit ids may not use it.
pub const ANONYMOUS_TASK_PREFIX: &str = "__task";

impl GanttModel {
    /// Tasks in declaration order across sections, with their section index.
    pub fn tasks(&self) -> impl Iterator<Item = (usize, &GanttTask)> {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(idx, section)| section.tasks.iter().map(move |task| (idx, task)))
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (_, task) in self.tasks() {
            if let Some(id) = task.id.as_deref() {
                if id.starts_with(ANONYMOUS_TASK_PREFIX) {
                    return Err(format!(
                        "task id '{id}' uses the reserved prefix '{ANONYMOUS_TASK_PREFIX}'"
                    ));
                }
                if !seen.insert(id) {
                    return Err(format!("duplicate task id '{id}'"));
                }
            }
            if let TaskStart::After(refs) = &task.start
                && refs.is_empty()
            {
                return Err(format!("task '{}' has an empty 'after' list", task.label));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pie, radar, quadrant, sankey, timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PieModel {
    pub title: Option<String>,
    pub show_data: bool,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f32,
}

impl PieModel {
    pub fn validate(&self) -> Result<(), String> {
        for slice in &self.slices {
            if !slice.value.is_finite() || slice.value < 0.0 {
                return Err(format!(
                    "slice '{}' has value {}; values must be finite and non-negative",
                    slice.label, slice.value
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadarModel {
    pub title: Option<String>,
    pub axes: Vec<RadarAxis>,
    pub curves: Vec<RadarCurve>,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub ticks: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarAxis {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarCurve {
    pub id: String,
    pub label: String,
    pub values: Vec<f32>,
}

impl RadarModel {
    pub fn validate(&self) -> Result<(), String> {
        for curve in &self.curves {
            if curve.values.len() != self.axes.len() {
                return Err(format!(
                    "curve '{}' has {} values for {} axes",
                    curve.id,
                    curve.values.len(),
                    self.axes.len()
                ));
            }
            if curve.values.iter().any(|v| !v.is_finite()) {
                return Err(format!("curve '{}' has a non-finite value", curve.id));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(format!("min {min} is greater than max {max}"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuadrantModel {
    pub title: Option<String>,
    pub x_axis_left: Option<String>,
    pub x_axis_right: Option<String>,
    pub y_axis_bottom: Option<String>,
    pub y_axis_top: Option<String>,
    /// Labels for quadrants 1..=4 (top-right, top-left, bottom-left, bottom-right).
    pub quadrant_labels: [Option<String>; 4],
    pub points: Vec<QuadrantPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadrantPoint {
    pub label: String,
    pub x: f32,
    pub y: f32,
}

impl QuadrantModel {
    pub fn validate(&self) -> Result<(), String> {
        for point in &self.points {
            let in_range = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
            if !in_range(point.x) || !in_range(point.y) {
                return Err(format!(
                    "point '{}' at ({}, {}) lies outside [0, 1]",
                    point.label, point.x, point.y
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SankeyModel {
    pub nodes: Vec<SankeyNode>,
    pub flows: Vec<SankeyFlow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyFlow {
    pub source: String,
    pub target: String,
    pub value: f32,
}

impl SankeyModel {
    pub fn validate(&self) -> Result<(), String> {
        let mut seen: HashSet<&str> = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate node id '{}'", node.id));
            }
        }
        for flow in &self.flows {
            if !flow.value.is_finite() || flow.value < 0.0 {
                return Err(format!(
                    "flow {} -> {} has value {}",
                    flow.source, flow.target, flow.value
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineModel {
    pub title: Option<String>,
    pub sections: Vec<TimelineSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineSection {
    pub name: Option<String>,
    pub periods: Vec<TimelinePeriod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelinePeriod {
    pub time: String,
    pub events: Vec<String>,
}

// ---------------------------------------------------------------------------
// Block, kanban, packet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockModel {
    pub columns: Option<usize>,
    /// Arena of every block; nesting is expressed through `Block::children`.
    pub blocks: Vec<Block>,
    /// Top-level blocks in placement order.
    pub roots: Vec<usize>,
    pub edges: Vec<BlockEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default = "default_span")]
    pub span: usize,
    #[serde(default)]
    pub is_space: bool,
    /// Column count used for this block's own children.
    #[serde(default)]
    pub columns: Option<usize>,
    #[serde(default)]
    pub children: Vec<usize>,
}

fn default_span() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl BlockModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.columns == Some(0) {
            return Err("column count must be positive".to_string());
        }
        let mut has_parent = vec![false; self.blocks.len()];
        let mut mark = |idx: usize, has_parent: &mut Vec<bool>| -> Result<(), String> {
            if idx >= self.blocks.len() {
                return Err(format!(
                    "block index {idx} outside of {} blocks",
                    self.blocks.len()
                ));
            }
            if std::mem::replace(&mut has_parent[idx], true) {
                return Err(format!(
                    "block '{}' is placed more than once",
                    self.blocks[idx].id
                ));
            }
            Ok(())
        };
        for &root in &self.roots {
            mark(root, &mut has_parent)?;
        }
        for block in &self.blocks {
            if block.span == 0 {
                return Err(format!("block '{}' has zero span", block.id));
            }
            if block.columns == Some(0) {
                return Err(format!("block '{}' has zero columns", block.id));
            }
            for &child in &block.children {
                mark(child, &mut has_parent)?;
            }
        }
        // Every block has at most one placement; a block reachable from no root
        // while still owning children forms a detached cycle.
        let mut reachable = vec![false; self.blocks.len()];
        let mut stack: Vec<usize> = self.roots.clone();
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut reachable[idx], true) {
                continue;
            }
            stack.extend(self.blocks[idx].children.iter().copied());
        }
        for (idx, block) in self.blocks.iter().enumerate() {
            if has_parent[idx] && !reachable[idx] {
                return Err(format!("block '{}' sits in a nesting cycle", block.id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KanbanModel {
    pub columns: Vec<KanbanColumn>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KanbanColumn {
    pub id: String,
    pub label: String,
    pub cards: Vec<KanbanCard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KanbanCard {
    pub id: String,
    pub label: String,
    pub ticket: Option<String>,
    pub assigned: Option<String>,
    pub priority: Option<KanbanPriority>,
}

impl KanbanCard {
    pub fn metadata_line_count(&self) -> usize {
        usize::from(self.ticket.is_some())
            + usize::from(self.assigned.is_some())
            + usize::from(self.priority.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KanbanPriority {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl KanbanModel {
    pub fn validate(&self) -> Result<(), String> {
        let mut seen: HashSet<&str> = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.id.as_str()) {
                return Err(format!("duplicate id '{}'", column.id));
            }
            for card in &column.cards {
                if !seen.insert(card.id.as_str()) {
                    return Err(format!("duplicate id '{}'", card.id));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PacketModel {
    pub title: Option<String>,
    pub bits_per_row: Option<u32>,
    pub fields: Vec<PacketField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketField {
    pub range: BitRange,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BitRange {
    /// Inclusive `start..=end`.
    Span { start: u32, end: u32 },
    /// `bits` bits directly after the previous field.
    Length(u32),
}

impl PacketModel {
    /// Resolves every field to an inclusive `(start, end)` bit range.
    pub fn resolved_ranges(&self) -> Result<Vec<(u32, u32)>, String> {
        let mut ranges = Vec::with_capacity(self.fields.len());
        let mut next_bit = 0u32;
        for field in &self.fields {
            let (start, end) = match field.range {
                BitRange::Span { start, end } => (start, end),
                BitRange::Length(0) => {
                    return Err(format!("field '{}' has zero length", field.label));
                }
                BitRange::Length(bits) => {
                    let end = next_bit
                        .checked_add(bits - 1)
                        .ok_or_else(|| format!("field '{}' overflows the bit space", field.label))?;
                    (next_bit, end)
                }
            };
            if end < start {
                return Err(format!(
                    "field '{}' ends at bit {end} before it starts at bit {start}",
                    field.label
                ));
            }
            if start < next_bit {
                return Err(format!(
                    "field '{}' starts at bit {start} inside the previous field",
                    field.label
                ));
            }
            next_bit = end.saturating_add(1);
            ranges.push((start, end));
        }
        Ok(ranges)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bits_per_row == Some(0) {
            return Err("bits per row must be positive".to_string());
        }
        self.resolved_ranges().map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Fixed canvases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorModel {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfoModel {
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_token() {
        assert_eq!(Direction::from_token("TB"), Some(Direction::TopDown));
        assert_eq!(Direction::from_token("RL"), Some(Direction::RightLeft));
        assert_eq!(Direction::from_token("XX"), None);
    }

    #[test]
    fn empty_model_has_requested_kind() {
        for kind in DiagramKind::ALL {
            assert_eq!(DiagramModel::empty(kind).kind(), kind);
            assert!(DiagramModel::empty(kind).validate().is_ok());
        }
    }

    #[test]
    fn graph_parent_cycle_is_rejected() {
        let mut graph = GraphModel::default();
        for (id, parent) in [("a", Some(1)), ("b", Some(0))] {
            graph.nodes.push(GraphNode {
                id: id.to_string(),
                label: id.to_string(),
                parent,
                ..GraphNode::default()
            });
        }
        assert!(graph.validate().is_err());
    }

    #[test]
    fn mindmap_child_out_of_range_is_rejected() {
        let model = MindmapModel {
            nodes: vec![MindmapNode {
                id: "root".to_string(),
                label: "root".to_string(),
                children: vec![3],
                ..MindmapNode::default()
            }],
            root: Some(0),
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn packet_length_fields_continue_from_previous() {
        let model = PacketModel {
            fields: vec![
                PacketField {
                    range: BitRange::Span { start: 0, end: 15 },
                    label: "Source".to_string(),
                },
                PacketField {
                    range: BitRange::Length(16),
                    label: "Destination".to_string(),
                },
            ],
            ..PacketModel::default()
        };
        assert_eq!(model.resolved_ranges().unwrap(), vec![(0, 15), (16, 31)]);
    }

    #[test]
    fn packet_overlap_is_rejected() {
        let model = PacketModel {
            fields: vec![
                PacketField {
                    range: BitRange::Span { start: 0, end: 15 },
                    label: "a".to_string(),
                },
                PacketField {
                    range: BitRange::Span { start: 8, end: 20 },
                    label: "b".to_string(),
                },
            ],
            ..PacketModel::default()
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn gantt_ids_may_not_shadow_anonymous_keys() {
        let task = |id: Option<&str>| GanttTask {
            id: id.map(str::to_string),
            label: "work".to_string(),
            start: TaskStart::Previous,
            end: TaskEnd::Duration(TaskDuration::days(1)),
            status: None,
        };
        let model = GanttModel {
            title: None,
            sections: vec![GanttSection {
                name: None,
                tasks: vec![task(None), task(Some("__task1")), task(None)],
            }],
        };
        let err = model.validate().unwrap_err();
        assert!(err.contains("reserved prefix"), "{err}");

        let model = GanttModel {
            title: None,
            sections: vec![GanttSection {
                name: None,
                tasks: vec![task(None), task(Some("task1"))],
            }],
        };
        assert!(model.validate().is_ok());
    }

    #[test]
    fn model_deserializes_from_tagged_json() {
        let json = r#"{
            "kind": "pie",
            "title": "Pets",
            "slices": [{"label": "Dogs", "value": 3}, {"label": "Cats", "value": 1}]
        }"#;
        let model: DiagramModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.kind(), DiagramKind::Pie);
    }
}
