use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use shared::domain::SessionRecord;

/// Cells in the month grid: always six full weeks, padded with leading and
/// trailing days from the adjacent months.
pub const GRID_CELLS: usize = 42;

/// One cell of the calendar grid. Derived on every rebuild, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub date_str: String,
    pub is_today: bool,
    pub is_current_month: bool,
    pub sessions: Vec<SessionRecord>,
}

/// Maps (reference month, session list) to the ordered 42-cell grid. The grid
/// starts on the Sunday on or before the first of the reference month. Each
/// cell holds the sessions whose `session_date` matches exactly, sorted by
/// `start_time` ascending with untimed sessions after timed ones (the sort is
/// stable, so insertion order breaks ties).
///
/// Recomputed in full on every reference-date or list change; linear in
/// session count times 42, which is fine at month-sized volumes.
pub fn calendar_days(
    reference: NaiveDate,
    today: NaiveDate,
    sessions: &[SessionRecord],
) -> Vec<CalendarDay> {
    let first_of_month = reference.with_day(1).unwrap_or(reference);
    let offset = first_of_month.weekday().num_days_from_sunday() as u64;
    let grid_start = first_of_month
        .checked_sub_days(Days::new(offset))
        .unwrap_or(first_of_month);

    (0..GRID_CELLS as u64)
        .filter_map(|i| grid_start.checked_add_days(Days::new(i)))
        .map(|date| {
            let mut bucket: Vec<SessionRecord> = sessions
                .iter()
                .filter(|s| s.session_date == date)
                .cloned()
                .collect();
            bucket.sort_by(|a, b| {
                (a.start_time.is_none(), &a.start_time).cmp(&(b.start_time.is_none(), &b.start_time))
            });

            CalendarDay {
                date,
                date_str: SessionRecord::date_key(date),
                is_today: date == today,
                is_current_month: date.month() == reference.month()
                    && date.year() == reference.year(),
                sessions: bucket,
            }
        })
        .collect()
}

/// Month/window statistics over the active (non-cancelled) subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthStats {
    pub total: u32,
    pub completed: u32,
    pub scheduled: u32,
    pub revenue: i64,
    pub pending: u32,
}

pub fn month_stats(sessions: &[SessionRecord]) -> MonthStats {
    let mut stats = MonthStats::default();
    for session in sessions.iter().filter(|s| !s.status.is_cancelled()) {
        stats.total += 1;
        stats.revenue += session.total_amount;
        if session.status.is_taught() {
            stats.completed += 1;
        } else {
            stats.scheduled += 1;
        }
        if !session.status.is_paid() {
            stats.pending += 1;
        }
    }
    stats
}

#[cfg(test)]
#[path = "tests/calendar_tests.rs"]
mod tests;
