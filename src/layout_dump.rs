use crate::layout::{DiagramData, Layout, NodeLayout};
use serde::Serialize;

/// Flat, serializable view of a [`Layout`].
#[derive(Debug, Serialize)]
pub struct LayoutDump<'a> {
    pub kind: String,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub diagram: &'a DiagramData,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub parent: Option<String>,
    pub depth: usize,
    pub shape: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_width: f32,
    pub label_height: f32,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub points: Vec<[f32; 2]>,
}

fn push_nodes(nodes: &[NodeLayout], parent: Option<&str>, out: &mut Vec<NodeDump>) {
    for node in nodes {
        out.push(NodeDump {
            id: node.id.clone(),
            parent: parent.map(str::to_string),
            depth: node.depth,
            shape: format!("{:?}", node.shape),
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
            label_width: node.label.width,
            label_height: node.label.height,
            label_lines: node.label.lines.clone(),
        });
        push_nodes(&node.children, Some(&node.id), out);
    }
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a Layout) -> Self {
        let mut nodes = Vec::new();
        push_nodes(&layout.nodes, None, &mut nodes);

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                label: edge.label.as_ref().map(|label| label.lines.join("\n")),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            kind: layout.kind.to_string(),
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
            diagram: &layout.diagram,
        }
    }
}

pub fn layout_dump_json(layout: &Layout) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&LayoutDump::from_layout(layout))
}
