use super::text::{measure_label_with_font_size, optional_label};
use super::*;
use crate::ir::PieModel;

fn format_pie_value(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if (rounded - rounded.round()).abs() < 0.001 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.2}")
    }
}

pub(super) fn compute_pie_layout(model: &PieModel, ctx: &LayoutContext<'_>) -> LayoutParts {
    let pie = &ctx.config.pie;
    let font_size = ctx.config.font_size;
    let center = (0.0, 0.0);
    let radius = pie.radius;
    let title = optional_label(ctx.measurer, model.title.as_deref(), ctx.config);

    let total: f32 = model.slices.iter().map(|slice| slice.value).sum();
    // With nothing to weigh, slices share the circle evenly.
    let even_span = 360.0 / model.slices.len().max(1) as f32;

    let mut slices = Vec::with_capacity(model.slices.len());
    let mut angle = -90.0_f32;
    for (index, slice) in model.slices.iter().enumerate() {
        let (span, percent) = if total > 0.0 {
            (360.0 * slice.value / total, slice.value / total * 100.0)
        } else {
            (even_span, 0.0)
        };
        let start_angle = angle;
        let end_angle = angle + span;
        let label_pos = (percent >= pie.min_label_percent).then(|| {
            polar_point(
                center,
                (start_angle + end_angle) / 2.0,
                radius * pie.text_position,
            )
        });
        slices.push(PieSliceLayout {
            label: measure_label_with_font_size(
                ctx.measurer,
                &format!("{percent:.0}%"),
                font_size,
                ctx.config,
                false,
            ),
            value: slice.value,
            percent,
            start_angle,
            end_angle,
            large_arc: span > 180.0,
            label_pos,
            index,
        });
        angle = end_angle;
    }

    let item_height = pie.legend_rect_size + pie.legend_spacing;
    let legend_top = center.1 - item_height * model.slices.len() as f32 / 2.0;
    let legend_x = center.0 + radius + pie.legend_gap;
    let legend = model
        .slices
        .iter()
        .enumerate()
        .map(|(index, slice)| {
            let text = if model.show_data {
                format!("{} [{}]", slice.label, format_pie_value(slice.value))
            } else {
                slice.label.clone()
            };
            PieLegendItem {
                x: legend_x,
                y: legend_top + index as f32 * item_height,
                label: measure_label_with_font_size(ctx.measurer, &text, font_size, ctx.config, false),
                marker_size: pie.legend_rect_size,
                label_gap: pie.legend_spacing,
                value: slice.value,
                index,
            }
        })
        .collect();

    let title_y = center.1 - radius - pie.title_gap;
    LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Pie(PieLayout {
            title,
            title_y,
            center,
            radius,
            total,
            slices,
            legend,
        }),
    }
}
