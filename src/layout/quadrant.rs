use super::text::optional_label;
use super::*;
use crate::ir::QuadrantModel;

/// Quadrant a normalized point falls into; the midline belongs to the upper
/// and right halves.
pub fn classify_point(x: f32, y: f32) -> Quadrant {
    match (x >= 0.5, y >= 0.5) {
        (true, true) => Quadrant::TopRight,
        (false, true) => Quadrant::TopLeft,
        (false, false) => Quadrant::BottomLeft,
        (true, false) => Quadrant::BottomRight,
    }
}

pub(super) fn compute_quadrant_layout(
    model: &QuadrantModel,
    ctx: &LayoutContext<'_>,
) -> LayoutParts {
    let quadrant = &ctx.config.quadrant;
    let grid = quadrant.grid_size;
    let half = grid / 2.0;
    let (grid_x, grid_y) = (0.0, 0.0);
    let gap = quadrant.axis_label_gap;
    let label = |text: &Option<String>| optional_label(ctx.measurer, text.as_deref(), ctx.config);

    // Quadrant labels are listed 1..=4: top-right, top-left, bottom-left, bottom-right.
    let regions = [
        (Quadrant::TopRight, grid_x + half, grid_y),
        (Quadrant::TopLeft, grid_x, grid_y),
        (Quadrant::BottomLeft, grid_x, grid_y + half),
        (Quadrant::BottomRight, grid_x + half, grid_y + half),
    ];
    let quadrants = regions
        .iter()
        .zip(&model.quadrant_labels)
        .map(|(&(quadrant, x, y), text)| QuadrantRegion {
            quadrant,
            x,
            y,
            width: half,
            height: half,
            label: label(text),
        })
        .collect();

    let axis_label = |text: &Option<String>, x: f32, y: f32| {
        label(text).map(|text| AxisLabel { text, x, y })
    };
    let below = grid_y + grid + gap;
    let left_of = grid_x - gap;

    let points = model
        .points
        .iter()
        .map(|point| QuadrantPointLayout {
            label: super::text::measure_label(ctx.measurer, &point.label, ctx.config),
            x: grid_x + point.x * grid,
            // Chart space grows upwards.
            y: grid_y + (1.0 - point.y) * grid,
            radius: quadrant.point_radius,
            quadrant: classify_point(point.x, point.y),
        })
        .collect();

    LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Quadrant(QuadrantLayout {
            title: label(&model.title),
            title_y: grid_y - quadrant.title_gap,
            grid_x,
            grid_y,
            grid_width: grid,
            grid_height: grid,
            quadrants,
            x_axis_left: axis_label(&model.x_axis_left, grid_x + grid / 4.0, below),
            x_axis_right: axis_label(&model.x_axis_right, grid_x + grid * 0.75, below),
            y_axis_bottom: axis_label(&model.y_axis_bottom, left_of, grid_y + grid * 0.75),
            y_axis_top: axis_label(&model.y_axis_top, left_of, grid_y + grid / 4.0),
            points,
        }),
    }
}
