use super::text::{measure_label, optional_label};
use super::*;
use crate::ir::PacketModel;

/// Splits an inclusive bit range at row boundaries.
fn split_range(start: u32, end: u32, bits_per_row: u32) -> Vec<(u32, u32, u32)> {
    let mut pieces = Vec::new();
    let mut cursor = start;
    loop {
        let row = cursor / bits_per_row;
        let row_last = row
            .saturating_add(1)
            .saturating_mul(bits_per_row)
            .saturating_sub(1);
        let piece_end = end.min(row_last);
        pieces.push((cursor, piece_end, row));
        if piece_end >= end {
            break;
        }
        cursor = piece_end + 1;
    }
    pieces
}

pub(super) fn compute_packet_layout(
    model: &PacketModel,
    ctx: &LayoutContext<'_>,
) -> Result<LayoutParts, String> {
    let packet = &ctx.config.packet;
    let bits_per_row = model.bits_per_row.unwrap_or(packet.bits_per_row).max(1);
    let ranges = model.resolved_ranges()?;
    // Bit numbers sit above each row when shown.
    let padding_y = if packet.show_bits {
        packet.padding_y + 10.0
    } else {
        packet.padding_y
    };
    let total_row_height = packet.row_height + padding_y;

    let fields: Vec<PacketFieldLayout> = model
        .fields
        .iter()
        .zip(&ranges)
        .map(|(field, &(start, end))| {
            let segments = split_range(start, end, bits_per_row)
                .into_iter()
                .map(|(seg_start, seg_end, row)| PacketSegment {
                    start: seg_start,
                    end: seg_end,
                    row,
                    x: (seg_start % bits_per_row) as f32 * packet.bit_width + 1.0,
                    y: row as f32 * total_row_height + padding_y,
                    width: (seg_end - seg_start + 1) as f32 * packet.bit_width - packet.padding_x,
                    height: packet.row_height,
                    kind: if seg_end == end {
                        SegmentKind::Final
                    } else {
                        SegmentKind::Continuation
                    },
                })
                .collect();
            PacketFieldLayout {
                label: measure_label(ctx.measurer, &field.label, ctx.config),
                start,
                end,
                segments,
            }
        })
        .collect();

    let rows = ranges
        .last()
        .map_or(0, |&(_, end)| end / bits_per_row + 1);
    tracing::debug!(fields = fields.len(), rows, bits_per_row, "laid out packet");

    Ok(LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Packet(PacketLayout {
            title: optional_label(ctx.measurer, model.title.as_deref(), ctx.config),
            title_y: -packet.title_gap,
            bits_per_row,
            bit_width: packet.bit_width,
            row_height: packet.row_height,
            rows,
            fields,
        }),
    })
}
