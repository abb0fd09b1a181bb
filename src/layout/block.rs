use std::collections::HashMap;

use super::text::{measure_label, optional_label};
use super::*;
use crate::config::BlockConfig;
use crate::ir::BlockModel;

/// Column/row assignment of one grid of sibling blocks.
struct GridPlan {
    column_widths: Vec<f32>,
    row_heights: Vec<f32>,
    /// `(block, row, column, span)` for every non-space block.
    cells: Vec<(usize, usize, usize, usize)>,
}

impl GridPlan {
    fn width(&self, gap: f32) -> f32 {
        sum_with_gaps(&self.column_widths, gap)
    }

    fn height(&self, gap: f32) -> f32 {
        sum_with_gaps(&self.row_heights, gap)
    }
}

fn sum_with_gaps(sizes: &[f32], gap: f32) -> f32 {
    sizes.iter().sum::<f32>() + gap * sizes.len().saturating_sub(1) as f32
}

struct BlockGrid<'a> {
    model: &'a BlockModel,
    ctx: &'a LayoutContext<'a>,
    config: &'a BlockConfig,
    labels: Vec<TextBlock>,
    sizes: Vec<Dimension>,
    plans: HashMap<usize, GridPlan>,
}

impl<'a> BlockGrid<'a> {
    fn new(model: &'a BlockModel, ctx: &'a LayoutContext<'a>) -> Self {
        let labels = model
            .blocks
            .iter()
            .map(|block| {
                if block.children.is_empty() {
                    measure_label(
                        ctx.measurer,
                        block.label.as_deref().unwrap_or(&block.id),
                        ctx.config,
                    )
                } else {
                    optional_label(ctx.measurer, block.label.as_deref(), ctx.config)
                        .unwrap_or_default()
                }
            })
            .collect();
        Self {
            model,
            ctx,
            config: &ctx.config.block,
            labels,
            sizes: vec![Dimension::ZERO; model.blocks.len()],
            plans: HashMap::new(),
        }
    }

    fn columns_for(&self, parent: Option<usize>) -> usize {
        let explicit = match parent {
            Some(idx) => self.model.blocks[idx].columns,
            None => self.model.columns,
        };
        explicit.unwrap_or(self.config.default_columns).max(1)
    }

    /// Sizes `idx` and everything nested in it, children first.
    fn measure(&mut self, idx: usize) -> Dimension {
        let model = self.model;
        let block = &model.blocks[idx];
        let size = if block.children.is_empty() {
            let size = shape_size(block.shape, &self.labels[idx], self.ctx.config);
            Dimension::new(
                size.width.max(self.config.cell_min_width),
                size.height.max(self.config.cell_min_height),
            )
        } else {
            let children = block.children.clone();
            let plan = self.plan(Some(idx), &children);
            let label = &self.labels[idx];
            let pad = self.config.padding;
            let size = Dimension::new(
                (plan.width(self.config.gap) + pad * 2.0).max(label.width + pad * 2.0),
                plan.height(self.config.gap) + pad * 2.0 + label.height,
            );
            self.plans.insert(idx, plan);
            size
        };
        self.sizes[idx] = size;
        size
    }

    fn plan(&mut self, parent: Option<usize>, children: &[usize]) -> GridPlan {
        let columns = self.columns_for(parent);
        let mut column_widths = vec![self.config.cell_min_width; columns];
        let mut row_heights: Vec<f32> = Vec::new();
        let mut cells = Vec::new();
        let (mut row, mut col) = (0usize, 0usize);

        for &child in children {
            let span = self.model.blocks[child].span.clamp(1, columns);
            if col + span > columns {
                col = 0;
                row += 1;
            }
            if row_heights.len() <= row {
                row_heights.resize(row + 1, self.config.cell_min_height);
            }
            if !self.model.blocks[child].is_space {
                let size = self.measure(child);
                let per_column = (size.width - self.config.gap * (span - 1) as f32) / span as f32;
                for width in &mut column_widths[col..col + span] {
                    *width = width.max(per_column);
                }
                row_heights[row] = row_heights[row].max(size.height);
                cells.push((child, row, col, span));
            }
            col += span;
        }

        GridPlan {
            column_widths,
            row_heights,
            cells,
        }
    }

    fn place(&self, plan: &GridPlan, origin: (f32, f32), depth: usize) -> Vec<NodeLayout> {
        let gap = self.config.gap;
        let column_x: Vec<f32> = offsets(&plan.column_widths, origin.0, gap);
        let row_y: Vec<f32> = offsets(&plan.row_heights, origin.1, gap);

        plan.cells
            .iter()
            .map(|&(idx, row, col, span)| {
                let size = self.sizes[idx];
                let span_width = sum_with_gaps(&plan.column_widths[col..col + span], gap);
                let x = column_x[col] + (span_width - size.width) / 2.0;
                let y = row_y[row] + (plan.row_heights[row] - size.height) / 2.0;
                let children = match self.plans.get(&idx) {
                    Some(inner) => {
                        let pad = self.config.padding;
                        let inner_origin = (
                            x + (size.width - inner.width(gap)) / 2.0,
                            y + pad + self.labels[idx].height,
                        );
                        self.place(inner, inner_origin, depth + 1)
                    }
                    None => Vec::new(),
                };
                let block = &self.model.blocks[idx];
                NodeLayout {
                    id: block.id.clone(),
                    x,
                    y,
                    width: size.width,
                    height: size.height,
                    label: self.labels[idx].clone(),
                    shape: block.shape,
                    depth,
                    source: idx,
                    children,
                }
            })
            .collect()
    }
}

fn offsets(sizes: &[f32], start: f32, gap: f32) -> Vec<f32> {
    let mut cursor = start;
    sizes
        .iter()
        .map(|size| {
            let at = cursor;
            cursor += size + gap;
            at
        })
        .collect()
}

fn collect_nodes<'n>(nodes: &'n [NodeLayout], out: &mut HashMap<&'n str, &'n NodeLayout>) {
    for node in nodes {
        out.insert(node.id.as_str(), node);
        collect_nodes(&node.children, out);
    }
}

pub(super) fn compute_block_layout(model: &BlockModel, ctx: &LayoutContext<'_>) -> LayoutParts {
    let mut grid = BlockGrid::new(model, ctx);
    let root_plan = grid.plan(None, &model.roots);
    let columns = root_plan.column_widths.len();
    let rows = root_plan.row_heights.len();
    let nodes = grid.place(&root_plan, (0.0, 0.0), 0);

    let mut by_id = HashMap::new();
    collect_nodes(&nodes, &mut by_id);
    let mut edges = Vec::with_capacity(model.edges.len());
    for (source, edge) in model.edges.iter().enumerate() {
        let (Some(from), Some(to)) = (by_id.get(edge.from.as_str()), by_id.get(edge.to.as_str()))
        else {
            tracing::debug!(from = %edge.from, to = %edge.to, "skipping block edge with unknown end");
            continue;
        };
        let start = from.center();
        let end = to.center();
        let label = optional_label(ctx.measurer, edge.label.as_deref(), ctx.config);
        let label_anchor = label
            .as_ref()
            .map(|_| ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0));
        edges.push(EdgeLayout {
            from: edge.from.clone(),
            to: edge.to.clone(),
            source,
            points: vec![start, end],
            label,
            label_anchor,
        });
    }

    LayoutParts {
        nodes,
        edges,
        diagram: DiagramData::Block(BlockLayout { columns, rows }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Block, BlockEdge};
    use crate::text_metrics::DeterministicTextMeasurer;

    fn block(id: &str) -> Block {
        Block {
            id: id.to_string(),
            label: None,
            shape: NodeShape::Rectangle,
            span: 1,
            is_space: false,
            columns: None,
            children: Vec::new(),
        }
    }

    fn run(model: &BlockModel) -> LayoutParts {
        let measurer = DeterministicTextMeasurer::default();
        let config = LayoutConfig::default();
        let ctx = LayoutContext {
            measurer: &measurer,
            config: &config,
            engine: None,
        };
        compute_block_layout(model, &ctx)
    }

    fn flat(model: BlockModel) -> BlockModel {
        BlockModel {
            roots: (0..model.blocks.len()).collect(),
            ..model
        }
    }

    #[test]
    fn wraps_after_column_count() {
        let parts = run(&flat(BlockModel {
            columns: Some(2),
            blocks: vec![block("a"), block("b"), block("c")],
            ..BlockModel::default()
        }));
        let [a, b, c] = &parts.nodes[..] else {
            panic!("expected three nodes");
        };
        assert_eq!(a.y, b.y);
        assert!(b.x > a.x);
        assert!(c.y > a.y);
        assert_eq!(c.x, a.x);
        assert!(matches!(
            parts.diagram,
            DiagramData::Block(BlockLayout {
                columns: 2,
                rows: 2
            })
        ));
    }

    #[test]
    fn wide_span_starts_a_new_row() {
        let mut wide = block("wide");
        wide.span = 2;
        let parts = run(&flat(BlockModel {
            columns: Some(2),
            blocks: vec![block("a"), wide],
            ..BlockModel::default()
        }));
        assert!(parts.nodes[1].y > parts.nodes[0].y);
    }

    #[test]
    fn spaces_advance_without_geometry() {
        let mut gap = block("gap");
        gap.is_space = true;
        let parts = run(&flat(BlockModel {
            columns: Some(3),
            blocks: vec![block("a"), gap, block("b")],
            ..BlockModel::default()
        }));
        assert_eq!(parts.nodes.len(), 2);
        let a = &parts.nodes[0];
        let b = &parts.nodes[1];
        assert_eq!(a.y, b.y);
        assert!(b.x > a.x + a.width * 2.0);
    }

    #[test]
    fn compound_blocks_contain_their_children() {
        let mut group = block("group");
        group.children = vec![1, 2];
        group.columns = Some(2);
        let parts = run(&BlockModel {
            blocks: vec![group, block("x"), block("y")],
            roots: vec![0],
            ..BlockModel::default()
        });
        let group = &parts.nodes[0];
        assert_eq!(group.children.len(), 2);
        for child in &group.children {
            assert_eq!(child.depth, 1);
            assert!(child.x >= group.x && child.x + child.width <= group.x + group.width);
            assert!(child.y >= group.y && child.y + child.height <= group.y + group.height);
        }
    }

    #[test]
    fn edges_connect_centres_and_skip_unknown_ids() {
        let parts = run(&flat(BlockModel {
            blocks: vec![block("a"), block("b")],
            edges: vec![
                BlockEdge {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    label: Some("go".to_string()),
                },
                BlockEdge {
                    from: "a".to_string(),
                    to: "nowhere".to_string(),
                    label: None,
                },
            ],
            ..BlockModel::default()
        }));
        assert_eq!(parts.edges.len(), 1);
        let edge = &parts.edges[0];
        assert_eq!(edge.points[0], parts.nodes[0].center());
        assert_eq!(edge.points[1], parts.nodes[1].center());
        assert!(edge.label_anchor.is_some());
    }
}
