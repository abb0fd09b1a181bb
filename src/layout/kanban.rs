use super::text::measure_label;
use super::*;
use crate::ir::KanbanModel;

pub(super) fn compute_kanban_layout(model: &KanbanModel, ctx: &LayoutContext<'_>) -> LayoutParts {
    let kanban = &ctx.config.kanban;
    let card_width = (kanban.column_width - kanban.column_padding * 2.0).max(0.0);

    let mut nodes = Vec::with_capacity(model.columns.len());
    let mut columns = Vec::with_capacity(model.columns.len());
    let mut card_source = 0usize;
    for (column_idx, column) in model.columns.iter().enumerate() {
        let x = column_idx as f32 * (kanban.column_width + kanban.column_gap);
        let label = measure_label(ctx.measurer, &column.label, ctx.config);

        let mut y = kanban.header_height;
        let mut cards = Vec::with_capacity(column.cards.len());
        let mut card_nodes = Vec::with_capacity(column.cards.len());
        for card in &column.cards {
            let height = kanban.card_base_height
                + card.metadata_line_count() as f32 * kanban.metadata_line_height;
            let card_x = x + kanban.column_padding;
            let card_label = measure_label(ctx.measurer, &card.label, ctx.config);
            card_nodes.push(NodeLayout {
                id: card.id.clone(),
                x: card_x,
                y,
                width: card_width,
                height,
                label: card_label.clone(),
                shape: NodeShape::RoundRect,
                depth: 1,
                source: card_source,
                children: Vec::new(),
            });
            cards.push(KanbanCardLayout {
                id: card.id.clone(),
                label: card_label,
                x: card_x,
                y,
                width: card_width,
                height,
                ticket: card.ticket.clone(),
                assigned: card.assigned.clone(),
                priority: card.priority,
            });
            card_source += 1;
            y += height + kanban.card_gap;
        }
        let height = if cards.is_empty() {
            kanban.header_height + kanban.column_padding
        } else {
            y - kanban.card_gap + kanban.column_padding
        };

        nodes.push(NodeLayout {
            id: column.id.clone(),
            x,
            y: 0.0,
            width: kanban.column_width,
            height,
            label: label.clone(),
            shape: NodeShape::Rectangle,
            depth: 0,
            source: column_idx,
            children: card_nodes,
        });
        columns.push(KanbanColumnLayout {
            id: column.id.clone(),
            label,
            x,
            y: 0.0,
            width: kanban.column_width,
            height,
            cards,
        });
    }

    LayoutParts {
        nodes,
        edges: Vec::new(),
        diagram: DiagramData::Kanban(KanbanLayout { columns }),
    }
}
