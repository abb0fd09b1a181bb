use super::text::{measure_label, optional_label};
use super::*;
use crate::ir::RadarModel;

/// Shared value range of a radar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarScale {
    pub min: f32,
    pub max: f32,
}

impl RadarScale {
    /// Explicit bounds win; missing ones come from the data.
    pub fn from_values(
        min: Option<f32>,
        max: Option<f32>,
        values: impl IntoIterator<Item = f32>,
    ) -> Self {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let lo = if lo.is_finite() { lo } else { 0.0 };
        let hi = if hi.is_finite() { hi } else { lo };
        let min = min.unwrap_or(lo);
        let max = max.unwrap_or(hi).max(min);
        Self { min, max }
    }

    /// Maps a value into `[0, 1]`. A degenerate range maps everything to 1.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= f32::EPSILON {
            return 1.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn denormalize(&self, t: f32) -> f32 {
        self.min + t * (self.max - self.min)
    }
}

pub(super) fn compute_radar_layout(model: &RadarModel, ctx: &LayoutContext<'_>) -> LayoutParts {
    let radar = &ctx.config.radar;
    let radius = radar.radius;
    let center = (0.0, 0.0);
    let scale = RadarScale::from_values(
        model.min,
        model.max,
        model.curves.iter().flat_map(|curve| curve.values.iter().copied()),
    );
    let title = optional_label(ctx.measurer, model.title.as_deref(), ctx.config);

    if model.axes.is_empty() {
        return LayoutParts {
            diagram: DiagramData::Radar(RadarLayout {
                title,
                title_y: 0.0,
                center,
                radius,
                min: scale.min,
                max: scale.max,
                rings: Vec::new(),
                axes: Vec::new(),
                curves: Vec::new(),
            }),
            ..LayoutParts::default()
        };
    }

    let step = 360.0 / model.axes.len() as f32;
    let axes: Vec<RadarAxisLayout> = model
        .axes
        .iter()
        .enumerate()
        .map(|(i, axis)| {
            let angle = -90.0 + i as f32 * step;
            RadarAxisLayout {
                id: axis.id.clone(),
                label: measure_label(ctx.measurer, &axis.label, ctx.config),
                angle,
                end: polar_point(center, angle, radius),
                label_pos: polar_point(center, angle, radius + radar.axis_label_offset),
            }
        })
        .collect();

    let curves = model
        .curves
        .iter()
        .enumerate()
        .map(|(index, curve)| {
            let radii: Vec<f32> = curve
                .values
                .iter()
                .map(|&value| scale.normalize(value) * radius)
                .collect();
            let points = radii
                .iter()
                .zip(&axes)
                .map(|(&r, axis)| polar_point(center, axis.angle, r))
                .collect();
            RadarCurveLayout {
                id: curve.id.clone(),
                label: curve.label.clone(),
                index,
                radii,
                points,
            }
        })
        .collect();

    let ticks = model.ticks.unwrap_or(radar.ticks).max(1);
    let rings = (1..=ticks)
        .map(|k| radius * k as f32 / ticks as f32)
        .collect();

    LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Radar(RadarLayout {
            title,
            title_y: center.1 - radius - radar.axis_label_offset - radar.title_gap,
            center,
            radius,
            min: scale.min,
            max: scale.max,
            rings,
            axes,
            curves,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{RadarAxis, RadarCurve};
    use crate::text_metrics::DeterministicTextMeasurer;

    fn axes(n: usize) -> Vec<RadarAxis> {
        (0..n)
            .map(|i| RadarAxis {
                id: format!("a{i}"),
                label: format!("Axis {i}"),
            })
            .collect()
    }

    fn run(model: &RadarModel) -> RadarLayout {
        let measurer = DeterministicTextMeasurer::default();
        let config = LayoutConfig::default();
        let ctx = LayoutContext {
            measurer: &measurer,
            config: &config,
            engine: None,
        };
        match compute_radar_layout(model, &ctx).diagram {
            DiagramData::Radar(radar) => radar,
            other => panic!("unexpected data {other:?}"),
        }
    }

    #[test]
    fn first_axis_points_up_and_axes_go_clockwise() {
        let layout = run(&RadarModel {
            axes: axes(4),
            ..RadarModel::default()
        });
        let angles: Vec<f32> = layout.axes.iter().map(|a| a.angle).collect();
        assert_eq!(angles, vec![-90.0, 0.0, 90.0, 180.0]);
        let (x, y) = layout.axes[0].end;
        assert!(x.abs() < 1e-3);
        assert!((y + 250.0).abs() < 1e-3);
        let (x, _) = layout.axes[1].end;
        assert!((x - 250.0).abs() < 1e-3);
    }

    #[test]
    fn values_scale_against_shared_range() {
        let layout = run(&RadarModel {
            axes: axes(3),
            curves: vec![
                RadarCurve {
                    id: "a".to_string(),
                    label: "A".to_string(),
                    values: vec![0.0, 5.0, 10.0],
                },
                RadarCurve {
                    id: "b".to_string(),
                    label: "B".to_string(),
                    values: vec![10.0, 10.0, 2.5],
                },
            ],
            ..RadarModel::default()
        });
        assert_eq!(layout.curves[0].radii, vec![0.0, 125.0, 250.0]);
        assert_eq!(layout.curves[1].radii, vec![250.0, 250.0, 62.5]);
        assert_eq!(layout.curves[0].points.len(), 3);
    }

    #[test]
    fn explicit_bounds_override_data() {
        let scale = RadarScale::from_values(Some(0.0), Some(100.0), [20.0, 40.0]);
        assert_eq!(scale.normalize(50.0), 0.5);
        assert_eq!(scale.normalize(150.0), 1.0);
    }

    #[test]
    fn degenerate_range_normalizes_to_one() {
        let scale = RadarScale::from_values(None, None, [3.0, 3.0]);
        assert_eq!(scale.normalize(3.0), 1.0);
    }

    #[test]
    fn reference_rings_are_evenly_spaced() {
        let layout = run(&RadarModel {
            axes: axes(5),
            ticks: Some(4),
            ..RadarModel::default()
        });
        assert_eq!(layout.rings, vec![62.5, 125.0, 187.5, 250.0]);
    }

    #[test]
    fn no_axes_yields_empty_layout() {
        let layout = run(&RadarModel::default());
        assert!(layout.axes.is_empty());
        assert!(layout.rings.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn radar_strategy() -> impl Strategy<Value = RadarModel> {
            (1usize..10, 0usize..5).prop_flat_map(|(n, m)| {
                prop::collection::vec(prop::collection::vec(-1000.0f32..1000.0, n), m).prop_map(
                    move |values| RadarModel {
                        axes: axes(n),
                        curves: values
                            .into_iter()
                            .enumerate()
                            .map(|(i, values)| RadarCurve {
                                id: format!("c{i}"),
                                label: format!("C{i}"),
                                values,
                            })
                            .collect(),
                        ..RadarModel::default()
                    },
                )
            })
        }

        proptest! {
            #[test]
            fn radii_stay_within_chart(model in radar_strategy()) {
                let layout = run(&model);
                for curve in &layout.curves {
                    for &r in &curve.radii {
                        prop_assert!((0.0..=layout.radius).contains(&r));
                    }
                }
            }

            #[test]
            fn normalize_then_denormalize_round_trips(
                min in -1000.0f32..1000.0,
                span in 0.01f32..1000.0,
                t in 0.0f32..=1.0,
            ) {
                let scale = RadarScale { min, max: min + span };
                let value = scale.denormalize(t);
                let back = scale.denormalize(scale.normalize(value));
                prop_assert!((back - value).abs() <= 1e-3 * (1.0 + value.abs().max(span)));
            }
        }
    }
}
