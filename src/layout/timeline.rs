use once_cell::sync::Lazy;
use regex::Regex;

use super::text::{measure_label, optional_label};
use super::*;
use crate::ir::TimelineModel;

static NUMERIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("numeric token regex must compile"));

/// First number found in a period label, e.g. `2021` in "Q1 2021".
fn numeric_token(time: &str) -> Option<f32> {
    NUMERIC_TOKEN
        .find(time)
        .and_then(|found| found.as_str().parse::<f32>().ok())
}

/// Position of each period along the axis, in percent.
///
/// Numeric labels map linearly between the smallest and largest value. A label
/// without a number is interpolated between its numeric neighbours by index;
/// leading and trailing ones continue the average step of the numbered run,
/// and the whole axis is then rescaled to 0..100. With fewer than two distinct
/// numbers, periods are spread evenly in declaration order.
fn period_percents(times: &[&str]) -> Vec<f32> {
    let values: Vec<Option<f32>> = times.iter().map(|time| numeric_token(time)).collect();
    let numeric: Vec<(usize, f32)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.map(|v| (idx, v)))
        .collect();
    let (min, max) = value_range(numeric.iter().map(|&(_, v)| v));
    let (Some(&(first_idx, first)), Some(&(last_idx, last))) = (numeric.first(), numeric.last())
    else {
        return even_percents(times.len());
    };
    if max - min <= f32::EPSILON {
        return even_percents(times.len());
    }

    let step = if (last - first).abs() > f32::EPSILON {
        (last - first) / (last_idx - first_idx) as f32
    } else {
        (max - min) / (last_idx - first_idx) as f32
    };
    let mut next = 0usize;
    let mut previous: Option<(usize, f32)> = None;
    let positions: Vec<f32> = values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            if let Some(v) = *value {
                previous = Some((idx, v));
                next += 1;
                return v;
            }
            match (previous, numeric.get(next)) {
                (Some((a, va)), Some(&(b, vb))) => {
                    va + (vb - va) * (idx - a) as f32 / (b - a) as f32
                }
                (Some((a, va)), None) => va + step * (idx - a) as f32,
                (None, Some(&(b, vb))) => vb - step * (b - idx) as f32,
                (None, None) => first,
            }
        })
        .collect();

    let (lo, hi) = value_range(positions.iter().copied());
    positions
        .iter()
        .map(|p| (p - lo) / (hi - lo) * 100.0)
        .collect()
}

fn value_range(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn even_percents(count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![50.0],
        n => (0..n)
            .map(|idx| idx as f32 / (n - 1) as f32 * 100.0)
            .collect(),
    }
}

pub(super) fn compute_timeline_layout(
    model: &TimelineModel,
    ctx: &LayoutContext<'_>,
) -> LayoutParts {
    let timeline = &ctx.config.timeline;
    let line_y = 0.0;
    let line_start_x = 0.0;
    let line_end_x = timeline.axis_width;
    let time_line_height = ctx.config.font_size * ctx.config.label_line_height;
    let time_y = line_y - timeline.axis_gap;
    let section_y = time_y - time_line_height - timeline.section_height;

    let flat: Vec<(usize, &crate::ir::TimelinePeriod)> = model
        .sections
        .iter()
        .enumerate()
        .flat_map(|(idx, section)| section.periods.iter().map(move |period| (idx, period)))
        .collect();
    let times: Vec<&str> = flat.iter().map(|(_, period)| period.time.as_str()).collect();
    let percents = period_percents(&times);

    let periods: Vec<TimelinePeriodLayout> = flat
        .iter()
        .zip(&percents)
        .map(|(&(section_idx, period), &percent)| {
            let x = line_start_x + percent / 100.0 * timeline.axis_width;
            let mut y = line_y + timeline.axis_gap;
            let events = period
                .events
                .iter()
                .map(|event| {
                    let label = measure_label(ctx.measurer, event, ctx.config);
                    let height = label.height + timeline.event_gap * 2.0;
                    let layout = TimelineEventLayout {
                        label,
                        x: x - timeline.event_width / 2.0,
                        y,
                        width: timeline.event_width,
                        height,
                    };
                    y += height + timeline.event_gap;
                    layout
                })
                .collect();
            let named = model.sections[section_idx].name.is_some();
            TimelinePeriodLayout {
                time: measure_label(ctx.measurer, &period.time, ctx.config),
                percent,
                x,
                time_y,
                section: named.then_some(section_idx),
                events,
            }
        })
        .collect();

    let sections: Vec<TimelineSectionLayout> = model
        .sections
        .iter()
        .enumerate()
        .filter_map(|(idx, section)| {
            let name = section.name.as_deref()?;
            let (lo, hi) = periods
                .iter()
                .filter(|period| period.section == Some(idx))
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), period| {
                    (lo.min(period.x), hi.max(period.x))
                });
            if !lo.is_finite() {
                return None;
            }
            let x = lo - timeline.event_width / 2.0;
            Some(TimelineSectionLayout {
                label: measure_label(ctx.measurer, name, ctx.config),
                x,
                y: section_y,
                width: hi + timeline.event_width / 2.0 - x,
                height: timeline.section_height,
            })
        })
        .collect();

    let top = if sections.is_empty() {
        time_y - time_line_height
    } else {
        section_y
    };

    LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Timeline(TimelineLayout {
            title: optional_label(ctx.measurer, model.title.as_deref(), ctx.config),
            title_y: top - timeline.title_gap,
            line_y,
            line_start_x,
            line_end_x,
            periods,
            sections,
        }),
    }
}
