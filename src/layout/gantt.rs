use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{Days, Months, NaiveDate};

use super::text::{measure_label, optional_label};
use super::*;
use crate::ir::{
    ANONYMOUS_TASK_PREFIX, DurationUnit, GanttModel, GanttStatus, GanttTask, TaskDuration, TaskEnd,
    TaskStart,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTask {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Outcome of schedule resolution: every task keyed by its id (or
/// `__task{n}` for anonymous tasks, `n` counting declarations from zero).
#[derive(Debug, Clone, Default)]
pub struct ScheduleResolution {
    pub resolved: HashMap<String, ResolvedTask>,
    /// Keys still pending when resolution stopped, in declaration order.
    pub unresolved: Vec<String>,
    /// Dependency rounds run after the explicit-date pass.
    pub rounds: usize,
}

impl ScheduleResolution {
    pub fn get(&self, key: &str) -> Option<&ResolvedTask> {
        self.resolved.get(key)
    }
}

pub(crate) fn task_key(task: &GanttTask, index: usize) -> String {
    task.id
        .clone()
        .unwrap_or_else(|| format!("{ANONYMOUS_TASK_PREFIX}{index}"))
}

fn add_duration(start: NaiveDate, duration: TaskDuration) -> Option<NaiveDate> {
    let amount = duration.amount;
    match duration.unit {
        DurationUnit::Hour => start.checked_add_days(Days::new(u64::from(amount.div_ceil(24)))),
        DurationUnit::Day => start.checked_add_days(Days::new(u64::from(amount))),
        DurationUnit::Week => start.checked_add_days(Days::new(u64::from(amount) * 7)),
        DurationUnit::Month => start.checked_add_months(Months::new(amount)),
        DurationUnit::Year => start.checked_add_months(Months::new(amount.checked_mul(12)?)),
    }
}

/// Tries to resolve one task against the tasks resolved so far.
fn try_resolve(
    task: &GanttTask,
    previous: Option<&str>,
    known: &HashMap<String, ResolvedTask>,
) -> Option<ResolvedTask> {
    let start = match &task.start {
        TaskStart::On(date) => *date,
        TaskStart::After(refs) => refs
            .iter()
            .map(|id| known.get(id).map(|dep| dep.end))
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .max()?,
        TaskStart::Previous => known.get(previous?)?.end,
    };
    let end = match &task.end {
        TaskEnd::On(date) => *date,
        TaskEnd::Duration(duration) => add_duration(start, *duration)?,
        TaskEnd::Until(id) => known.get(id)?.start,
    };
    Some(ResolvedTask {
        start,
        end: end.max(start),
    })
}

/// Resolves task dates in two phases: explicitly dated tasks first, then up
/// to `max_rounds` dependency rounds. A round walks pending tasks in
/// declaration order and sees every task resolved before it, so forward
/// chains settle in one round. Stops early once a round resolves nothing.
pub fn resolve_schedule(model: &GanttModel, max_rounds: usize) -> ScheduleResolution {
    let tasks: Vec<(String, &GanttTask)> = model
        .tasks()
        .enumerate()
        .map(|(index, (_, task))| (task_key(task, index), task))
        .collect();

    let mut resolved: HashMap<String, ResolvedTask> = HashMap::new();
    let mut pending: Vec<usize> = Vec::new();
    for (index, (key, task)) in tasks.iter().enumerate() {
        let explicit = matches!(task.start, TaskStart::On(_))
            && !matches!(task.end, TaskEnd::Until(_));
        match explicit.then(|| try_resolve(task, None, &resolved)).flatten() {
            Some(dates) => {
                resolved.insert(key.clone(), dates);
            }
            None => pending.push(index),
        }
    }

    let mut rounds = 0;
    while !pending.is_empty() && rounds < max_rounds {
        rounds += 1;
        let before = pending.len();
        pending.retain(|&index| {
            let (key, task) = &tasks[index];
            let previous = index.checked_sub(1).map(|prev| tasks[prev].0.as_str());
            match try_resolve(task, previous, &resolved) {
                Some(dates) => {
                    resolved.insert(key.clone(), dates);
                    false
                }
                None => true,
            }
        });
        if pending.len() == before {
            break;
        }
    }

    let unresolved: Vec<String> = pending.iter().map(|&index| tasks[index].0.clone()).collect();
    if !unresolved.is_empty() {
        tracing::warn!(
            count = unresolved.len(),
            tasks = ?unresolved,
            rounds,
            "gantt tasks left unresolved; excluded from layout"
        );
    }
    ScheduleResolution {
        resolved,
        unresolved,
        rounds,
    }
}

fn format_date(date: NaiveDate, fmt: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(fmt)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format("%Y-%m-%d"));
    }
    out
}

fn days_between(from: NaiveDate, to: NaiveDate) -> f32 {
    (to - from).num_days() as f32
}

pub(super) fn compute_gantt_layout(model: &GanttModel, ctx: &LayoutContext<'_>) -> LayoutParts {
    let gantt = &ctx.config.gantt;
    let schedule = resolve_schedule(model, gantt.max_resolution_rounds);

    let title = optional_label(ctx.measurer, model.title.as_deref(), ctx.config);
    let title_y = gantt.top_padding / 2.0;
    let chart_y = gantt.top_padding + if title.is_some() { gantt.title_height } else { 0.0 };

    let range = schedule
        .resolved
        .values()
        .flat_map(|task| [task.start, task.end])
        .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, date| match acc {
            Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
            None => Some((date, date)),
        })
        .map(|(lo, hi)| {
            (
                lo.checked_sub_days(Days::new(1)).unwrap_or(lo),
                hi.checked_add_days(Days::new(1)).unwrap_or(hi),
            )
        });

    let mut rows: Vec<(usize, String, &GanttTask, ResolvedTask)> = Vec::new();
    for (index, (section, task)) in model.tasks().enumerate() {
        let key = task_key(task, index);
        if let Some(dates) = schedule.get(&key) {
            rows.push((section, key, task, *dates));
        }
    }

    let task_labels: Vec<TextBlock> = rows
        .iter()
        .map(|(_, _, task, _)| measure_label(ctx.measurer, &task.label, ctx.config))
        .collect();
    let task_label_width = task_labels.iter().map(|l| l.width).fold(0.0, f32::max);
    let task_label_x = gantt.section_label_width;
    let chart_x = task_label_x + task_label_width + gantt.bar_gap * 2.0;
    let row_height = gantt.bar_height + gantt.bar_gap;

    let (chart_width, day_width) = match range {
        Some((lo, hi)) => {
            let days = days_between(lo, hi).max(1.0);
            (gantt.timeline_width, gantt.timeline_width / days)
        }
        None => (0.0, 0.0),
    };

    let mut tasks = Vec::with_capacity(rows.len());
    let mut sections: Vec<GanttSectionLayout> = Vec::new();
    for (row, ((section, key, task, dates), label)) in rows.iter().zip(task_labels).enumerate() {
        let y = chart_y + row as f32 * row_height;
        if sections.last().is_none_or(|last| last.index != *section) {
            let name = model.sections[*section].name.as_deref().unwrap_or_default();
            sections.push(GanttSectionLayout {
                label: measure_label(ctx.measurer, name, ctx.config),
                label_x: 0.0,
                y,
                height: 0.0,
                index: *section,
            });
        }
        if let Some(current) = sections.last_mut() {
            current.height = y + row_height - current.y;
        }

        let origin = range.map(|(lo, _)| lo).unwrap_or(dates.start);
        let duration_days = days_between(dates.start, dates.end);
        let milestone = duration_days <= 0.0 || task.status == Some(GanttStatus::Milestone);
        let (x, width) = if duration_days <= 0.0 {
            let cx = chart_x + days_between(origin, dates.start) * day_width;
            (cx - gantt.milestone_width / 2.0, gantt.milestone_width)
        } else {
            (
                chart_x + days_between(origin, dates.start) * day_width,
                duration_days * day_width,
            )
        };
        tasks.push(GanttTaskLayout {
            key: key.clone(),
            label,
            label_x: task_label_x,
            section: *section,
            start: dates.start,
            end: dates.end,
            x,
            y,
            width,
            height: gantt.bar_height,
            status: task.status,
            milestone,
        });
    }
    let chart_height = rows.len() as f32 * row_height;

    let mut ticks = Vec::new();
    if let Some((lo, hi)) = range {
        let count = gantt.tick_count.max(2);
        let span = days_between(lo, hi);
        for i in 0..count {
            let offset = (span * i as f32 / (count - 1) as f32).round() as u64;
            let date = lo.checked_add_days(Days::new(offset)).unwrap_or(hi);
            ticks.push(GanttTick {
                x: chart_x + days_between(lo, date) * day_width,
                y: chart_y + chart_height + ctx.config.font_size,
                label: measure_label(
                    ctx.measurer,
                    &format_date(date, &gantt.tick_format),
                    ctx.config,
                ),
            });
        }
    }

    LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Gantt(GanttLayout {
            title,
            title_y,
            range,
            chart_x,
            chart_y,
            chart_width,
            chart_height,
            day_width,
            row_height,
            sections,
            tasks,
            ticks,
            unresolved: schedule.unresolved,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::GanttSection;
    use crate::text_metrics::DeterministicTextMeasurer;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, start: TaskStart, end: TaskEnd) -> GanttTask {
        GanttTask {
            id: Some(id.to_string()),
            label: id.to_string(),
            start,
            end,
            status: None,
        }
    }

    fn model(tasks: Vec<GanttTask>) -> GanttModel {
        GanttModel {
            title: None,
            sections: vec![GanttSection {
                name: Some("Main".to_string()),
                tasks,
            }],
        }
    }

    #[test]
    fn after_chain_resolves_from_end_of_dependency() {
        let model = model(vec![
            task(
                "A",
                TaskStart::On(date(2024, 1, 1)),
                TaskEnd::Duration(TaskDuration::days(10)),
            ),
            task(
                "B",
                TaskStart::After(vec!["A".to_string()]),
                TaskEnd::Duration(TaskDuration::days(5)),
            ),
        ]);
        let schedule = resolve_schedule(&model, 100);
        let b = schedule.get("B").unwrap();
        assert_eq!(b.start, date(2024, 1, 11));
        assert_eq!(b.end, date(2024, 1, 16));
        assert_eq!(schedule.rounds, 1);
    }

    #[test]
    fn until_ends_at_start_of_reference() {
        let model = model(vec![
            task(
                "release",
                TaskStart::On(date(2024, 3, 1)),
                TaskEnd::Duration(TaskDuration::days(1)),
            ),
            task(
                "prep",
                TaskStart::On(date(2024, 2, 20)),
                TaskEnd::Until("release".to_string()),
            ),
        ]);
        let schedule = resolve_schedule(&model, 100);
        assert_eq!(schedule.get("prep").unwrap().end, date(2024, 3, 1));
    }

    #[test]
    fn after_many_uses_latest_end() {
        let model = model(vec![
            task(
                "a",
                TaskStart::On(date(2024, 1, 1)),
                TaskEnd::On(date(2024, 1, 5)),
            ),
            task(
                "b",
                TaskStart::On(date(2024, 1, 1)),
                TaskEnd::On(date(2024, 1, 9)),
            ),
            task(
                "c",
                TaskStart::After(vec!["a".to_string(), "b".to_string()]),
                TaskEnd::Duration(TaskDuration::days(1)),
            ),
        ]);
        let schedule = resolve_schedule(&model, 100);
        assert_eq!(schedule.get("c").unwrap().start, date(2024, 1, 9));
    }

    #[test]
    fn implicit_start_follows_previous_task() {
        let mut anonymous = task(
            "x",
            TaskStart::Previous,
            TaskEnd::Duration(TaskDuration {
                amount: 2,
                unit: DurationUnit::Week,
            }),
        );
        anonymous.id = None;
        let model = model(vec![
            task(
                "first",
                TaskStart::On(date(2024, 1, 1)),
                TaskEnd::Duration(TaskDuration::days(3)),
            ),
            anonymous,
        ]);
        let schedule = resolve_schedule(&model, 100);
        let resolved = schedule.get("__task1").unwrap();
        assert_eq!(resolved.start, date(2024, 1, 4));
        assert_eq!(resolved.end, date(2024, 1, 18));
    }

    #[test]
    fn month_and_hour_arithmetic() {
        let start = date(2024, 1, 31);
        let month = TaskDuration {
            amount: 1,
            unit: DurationUnit::Month,
        };
        assert_eq!(add_duration(start, month), Some(date(2024, 2, 29)));
        let hours = TaskDuration {
            amount: 25,
            unit: DurationUnit::Hour,
        };
        assert_eq!(add_duration(start, hours), Some(date(2024, 2, 2)));
    }

    #[test]
    fn dangling_reference_is_reported_and_dropped() {
        let model = model(vec![
            task(
                "a",
                TaskStart::On(date(2024, 1, 1)),
                TaskEnd::Duration(TaskDuration::days(2)),
            ),
            task(
                "b",
                TaskStart::After(vec!["missing".to_string()]),
                TaskEnd::Duration(TaskDuration::days(2)),
            ),
        ]);
        let schedule = resolve_schedule(&model, 100);
        assert_eq!(schedule.unresolved, vec!["b".to_string()]);
        assert_eq!(schedule.rounds, 1);

        let measurer = DeterministicTextMeasurer::default();
        let config = LayoutConfig::default();
        let ctx = LayoutContext {
            measurer: &measurer,
            config: &config,
            engine: None,
        };
        let DiagramData::Gantt(layout) = compute_gantt_layout(&model, &ctx).diagram else {
            panic!("expected gantt data");
        };
        assert_eq!(layout.tasks.len(), 1);
        assert_eq!(layout.unresolved, vec!["b".to_string()]);
        assert_eq!(layout.range, Some((date(2023, 12, 31), date(2024, 1, 4))));
    }

    #[test]
    fn round_cap_limits_long_chains() {
        let mut tasks = vec![task(
            "t0",
            TaskStart::On(date(2024, 1, 1)),
            TaskEnd::Duration(TaskDuration::days(1)),
        )];
        for i in 1..6 {
            tasks.push(task(
                &format!("t{i}"),
                TaskStart::After(vec![format!("t{}", i - 1)]),
                TaskEnd::Duration(TaskDuration::days(1)),
            ));
        }
        // Declared in reverse, so each round can only settle the link whose
        // dependency was resolved by an earlier round.
        tasks[1..].reverse();
        let schedule = resolve_schedule(&model(tasks), 3);
        assert_eq!(schedule.rounds, 3);
        assert_eq!(schedule.unresolved, vec!["t5".to_string(), "t4".to_string()]);
    }

    #[test]
    fn forward_chain_longer_than_cap_resolves_in_one_round() {
        let mut tasks = vec![task(
            "t0",
            TaskStart::On(date(2024, 1, 1)),
            TaskEnd::Duration(TaskDuration::days(1)),
        )];
        for i in 1..150 {
            tasks.push(task(
                &format!("t{i}"),
                TaskStart::Previous,
                TaskEnd::Duration(TaskDuration::days(1)),
            ));
        }
        let schedule = resolve_schedule(&model(tasks), 100);
        assert!(schedule.unresolved.is_empty());
        assert_eq!(schedule.resolved.len(), 150);
        assert_eq!(schedule.rounds, 1);
        let last = schedule.get("t149").unwrap();
        assert_eq!(last.start, date(2024, 5, 29));
        assert_eq!(last.end, date(2024, 5, 30));
    }

    #[test]
    fn tick_labels_stay_inside_bounds() {
        let model = model(vec![task(
            "a",
            TaskStart::On(date(2024, 1, 1)),
            TaskEnd::Duration(TaskDuration::days(10)),
        )]);
        let measurer = DeterministicTextMeasurer::default();
        let config = LayoutConfig::default();
        let ctx = LayoutContext {
            measurer: &measurer,
            config: &config,
            engine: None,
        };
        let parts = compute_gantt_layout(&model, &ctx);
        let bounds = parts.bounds();
        let DiagramData::Gantt(layout) = &parts.diagram else {
            panic!("expected gantt data");
        };
        let last = layout.ticks.last().unwrap();
        assert!(last.label.width > 0.0);
        assert!(bounds.max_x >= last.x + last.label.width / 2.0 - 1e-3);
        assert!(bounds.max_y >= last.y + last.label.height / 2.0 - 1e-3);
    }

    #[test]
    fn bars_map_days_linearly_and_milestones_get_min_width() {
        let mut milestone = task(
            "m",
            TaskStart::On(date(2024, 1, 5)),
            TaskEnd::On(date(2024, 1, 5)),
        );
        milestone.status = Some(GanttStatus::Milestone);
        let model = model(vec![
            task(
                "a",
                TaskStart::On(date(2024, 1, 1)),
                TaskEnd::Duration(TaskDuration::days(8)),
            ),
            milestone,
        ]);
        let measurer = DeterministicTextMeasurer::default();
        let config = LayoutConfig::default();
        let ctx = LayoutContext {
            measurer: &measurer,
            config: &config,
            engine: None,
        };
        let DiagramData::Gantt(layout) = compute_gantt_layout(&model, &ctx).diagram else {
            panic!("expected gantt data");
        };
        // Range 2023-12-31..2024-01-10 spans 10 days over 800px.
        assert_eq!(layout.day_width, 80.0);
        let a = &layout.tasks[0];
        assert_eq!(a.x - layout.chart_x, 80.0);
        assert_eq!(a.width, 640.0);
        let m = &layout.tasks[1];
        assert!(m.milestone);
        assert_eq!(m.width, config.gantt.milestone_width);
        assert_eq!(layout.ticks.len(), 5);
        assert_eq!(layout.ticks[0].label.lines, vec!["2023-12-31".to_string()]);
        assert_eq!(layout.sections.len(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn explicit_task() -> impl Strategy<Value = (i64, u32, bool)> {
            (0i64..2000, 0u32..400, any::<bool>())
        }

        proptest! {
            #[test]
            fn explicit_tasks_resolve_in_first_phase(specs in prop::collection::vec(explicit_task(), 0..30)) {
                let base = date(2020, 1, 1);
                let tasks: Vec<GanttTask> = specs
                    .iter()
                    .enumerate()
                    .map(|(i, (offset, len, use_date))| {
                        let start = base + chrono::Duration::days(*offset);
                        let end = if *use_date {
                            TaskEnd::On(start + chrono::Duration::days(i64::from(*len)))
                        } else {
                            TaskEnd::Duration(TaskDuration::days(*len))
                        };
                        task(&format!("t{i}"), TaskStart::On(start), end)
                    })
                    .collect();
                let schedule = resolve_schedule(&model(tasks), 100);
                prop_assert_eq!(schedule.rounds, 0);
                prop_assert!(schedule.unresolved.is_empty());
                prop_assert_eq!(schedule.resolved.len(), specs.len());
                for dates in schedule.resolved.values() {
                    prop_assert!(dates.end >= dates.start);
                }
            }
        }
    }
}
