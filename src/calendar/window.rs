// src/calendar/window.rs

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::types::{Granularity, ShiftDirection};

/// Number of cells in a month grid (six Monday-first weeks).
pub const MONTH_GRID_DAYS: usize = 42;

/// One rendered day of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Outside the anchor month in month view; shown dimmed.
    pub muted: bool,
}

impl CalendarDay {
    pub fn key(&self) -> String {
        day_key(self.date)
    }
}

/// The set of days a view currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWindow {
    anchor: NaiveDate,
    granularity: Granularity,
    days: Vec<CalendarDay>,
    range_start: NaiveDate,
    range_end: NaiveDate,
}

impl CalendarWindow {
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    /// First day to query jobs for (inclusive).
    pub fn range_start(&self) -> NaiveDate {
        self.range_start
    }

    /// Last day to query jobs for (inclusive, whole day).
    ///
    /// In month view this is the last day of the anchor month, not the last
    /// grid cell.
    pub fn range_end(&self) -> NaiveDate {
        self.range_end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.range_start && date <= self.range_end
    }

    pub fn next(&self) -> CalendarWindow {
        shift(self, ShiftDirection::Forward)
    }

    pub fn previous(&self) -> CalendarWindow {
        shift(self, ShiftDirection::Back)
    }

    /// Header text: `Week of Mon Oct 12 2026` or `October 2026`.
    pub fn title(&self) -> String {
        match self.granularity {
            Granularity::Week => format!("Week of {}", self.range_start.format("%a %b %d %Y")),
            Granularity::Month => self.anchor.format("%B %Y").to_string(),
        }
    }
}

/// Locale-stable bucket key for a local calendar day.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Compute the window for `anchor` at the given granularity.
pub fn compute_window(anchor: NaiveDate, granularity: Granularity) -> CalendarWindow {
    match granularity {
        Granularity::Week => week_window(anchor),
        Granularity::Month => month_window(anchor),
    }
}

/// Re-anchor by exactly one granularity unit and recompute.
///
/// Month shifts clamp the day-of-month (Jan 31 -> Feb 28).
pub fn shift(window: &CalendarWindow, direction: ShiftDirection) -> CalendarWindow {
    let anchor = window.anchor;
    let moved = match (window.granularity, direction) {
        (Granularity::Week, ShiftDirection::Forward) => anchor.checked_add_days(Days::new(7)),
        (Granularity::Week, ShiftDirection::Back) => anchor.checked_sub_days(Days::new(7)),
        (Granularity::Month, ShiftDirection::Forward) => anchor.checked_add_months(Months::new(1)),
        (Granularity::Month, ShiftDirection::Back) => anchor.checked_sub_months(Months::new(1)),
    };
    compute_window(moved.unwrap_or(anchor), window.granularity)
}

/// Monday on or before `date`. A Sunday belongs to the preceding Monday.
fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn consecutive_days(start: NaiveDate, count: usize) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(count)
}

fn week_window(anchor: NaiveDate) -> CalendarWindow {
    let monday = monday_of(anchor);
    let days: Vec<CalendarDay> = consecutive_days(monday, 7)
        .map(|date| CalendarDay { date, muted: false })
        .collect();
    let range_end = days.last().map(|d| d.date).unwrap_or(monday);

    CalendarWindow {
        anchor,
        granularity: Granularity::Week,
        days,
        range_start: monday,
        range_end,
    }
}

fn month_window(anchor: NaiveDate) -> CalendarWindow {
    let first = anchor.with_day(1).unwrap_or(anchor);
    let last = last_day_of_month(first);
    let grid_start = monday_of(first);

    let days: Vec<CalendarDay> = consecutive_days(grid_start, MONTH_GRID_DAYS)
        .map(|date| CalendarDay {
            date,
            muted: date.month() != first.month() || date.year() != first.year(),
        })
        .collect();

    CalendarWindow {
        anchor,
        granularity: Granularity::Month,
        days,
        range_start: grid_start,
        range_end: last,
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}
