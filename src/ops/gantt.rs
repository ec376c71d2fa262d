use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::model::directory::Directory;
use crate::model::item::{WorkItem, parse_date};

use super::table::NO_PROJECT_LABEL;

/// Narrowest bar, in percent of the axis, so zero-length or inverted ranges
/// stay visible.
pub const MIN_BAR_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTick {
    /// First day of the month
    pub date: NaiveDate,
    pub label: String,
    /// Offset of the month start on the axis, in percent (clamped to 0..=100)
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttBar {
    pub id: String,
    pub title: String,
    pub status: Option<String>,
    pub start: String,
    pub end: String,
    pub left: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttLane {
    /// Project id, `None` for the trailing no-project lane
    pub project: Option<String>,
    pub label: String,
    pub bars: Vec<GanttBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttLayout {
    pub axis_start: NaiveDate,
    pub axis_end: NaiveDate,
    pub total_days: i64,
    pub months: Vec<MonthTick>,
    pub lanes: Vec<GanttLane>,
}

impl GanttLayout {
    pub fn bar_count(&self) -> usize {
        self.lanes.iter().map(|l| l.bars.len()).sum()
    }
}

impl GanttBar {
    /// First column and length of the bar on a track `columns` wide. A bar
    /// always covers at least one column.
    pub fn cells(&self, columns: usize) -> (usize, usize) {
        if columns == 0 {
            return (0, 0);
        }
        let scale = columns as f64 / 100.0;
        let start = ((self.left * scale).round() as usize).min(columns - 1);
        let len = ((self.width * scale).round() as usize).clamp(1, columns - start);
        (start, len)
    }
}

/// Shared date axis for a set of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Axis {
    /// Padded bounds of every parseable start and end date; the month of
    /// `today` when nothing parses.
    pub fn for_items(items: &[&WorkItem], today: NaiveDate, padding_days: u64) -> Axis {
        let scheduled = items.iter().filter_map(|i| i.date_bounds());
        let (mut starts, mut ends) = (Vec::new(), Vec::new());
        for (start, end) in scheduled {
            starts.extend(parse_date(start));
            ends.extend(parse_date(end));
        }
        match (starts.into_iter().min(), ends.into_iter().max()) {
            (Some(min), Some(max)) => Axis {
                start: min - Days::new(padding_days),
                end: max + Days::new(padding_days),
            },
            _ => Axis::month_of(today),
        }
    }

    fn month_of(day: NaiveDate) -> Axis {
        let start = first_of_month(day);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(start);
        Axis { start, end }
    }

    /// Axis length in days, never less than one.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }

    /// Offset of a date, in percent, clamped to 0..=100.
    pub fn position(&self, date: NaiveDate) -> f64 {
        let diff = (date - self.start).num_days() as f64;
        (diff / self.total_days() as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Month starts from the first of the axis start month while before the axis end.
    pub fn months(&self) -> Vec<MonthTick> {
        let mut ticks = Vec::new();
        let mut current = first_of_month(self.start);
        while current < self.end {
            ticks.push(MonthTick {
                date: current,
                label: current.format("%b %Y").to_string(),
                left: self.position(current),
            });
            match current.checked_add_months(Months::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        ticks
    }

    /// Left offset and width of a bar. Unparseable bounds place the bar at
    /// the axis start with the minimum width; the width never runs past 100%.
    pub fn bar_geometry(&self, start: &str, end: &str) -> (f64, f64) {
        let start = parse_date(start);
        let end = parse_date(end);
        let left = start.map_or(0.0, |s| self.position(s));
        let width = match (start, end) {
            (Some(s), Some(e)) => {
                let diff = (e - s).num_days() as f64;
                (diff / self.total_days() as f64 * 100.0).max(MIN_BAR_WIDTH)
            }
            _ => MIN_BAR_WIDTH,
        };
        (left, width.min(100.0 - left))
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Lay out scheduled items on one shared axis, one lane per project in
/// directory order. Items without both bounds are left out; items without
/// a resolvable project go to a trailing lane shown only when non-empty.
pub fn layout(
    items: &[&WorkItem],
    directory: &Directory,
    today: NaiveDate,
    padding_days: u64,
) -> GanttLayout {
    let axis = Axis::for_items(items, today, padding_days);
    let bar = |item: &WorkItem| -> Option<GanttBar> {
        let (start, end) = item.date_bounds()?;
        let (left, width) = axis.bar_geometry(start, end);
        Some(GanttBar {
            id: item.id.clone(),
            title: item.title.clone(),
            status: item.status.clone(),
            start: start.to_string(),
            end: end.to_string(),
            left,
            width,
        })
    };

    let mut lanes: Vec<GanttLane> = directory
        .projects
        .iter()
        .map(|project| GanttLane {
            project: Some(project.id.clone()),
            label: project.name.clone(),
            bars: items
                .iter()
                .filter(|i| i.project.as_deref() == Some(project.id.as_str()))
                .filter_map(|i| bar(*i))
                .collect(),
        })
        .filter(|lane| !lane.bars.is_empty())
        .collect();

    let loose: Vec<GanttBar> = items
        .iter()
        .filter(|i| {
            i.project
                .as_deref()
                .is_none_or(|id| directory.project(id).is_none())
        })
        .filter_map(|i| bar(*i))
        .collect();
    if !loose.is_empty() {
        lanes.push(GanttLane {
            project: None,
            label: NO_PROJECT_LABEL.to_string(),
            bars: loose,
        });
    }

    GanttLayout {
        axis_start: axis.start,
        axis_end: axis.end,
        total_days: axis.total_days(),
        months: axis.months(),
        lanes,
    }
}
