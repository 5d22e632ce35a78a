use chrono::{NaiveDate, NaiveTime, Timelike};
use log::debug;
use serde::{Serialize, Serializer};

use crate::calendar::{Calendar, EventEntry};
use crate::value::Moment;

fn serialize_naive_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted_time = format!("{:02}:{:02}", time.hour(), time.minute());
    serializer.serialize_str(&formatted_time)
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_naive_time")]
    pub start: NaiveTime,
    #[serde(serialize_with = "serialize_naive_time")]
    pub end: NaiveTime,
    pub summary: String,
    pub duration_minutes: i64,
}

/// Returns the report rows for every timed event, in document order.
pub fn extract_rows(calendar: &Calendar) -> Vec<Row> {
    let rows = calendar
        .events
        .iter()
        .filter_map(event_to_row)
        .collect::<Vec<_>>();

    debug!(
        "Kept {} of {} event(s)",
        rows.len(),
        calendar.events.len()
    );

    rows
}

/// Converts a single event, or returns `None` when it lacks a start or end
/// or spans whole days.
pub fn event_to_row(event: &EventEntry) -> Option<Row> {
    let start = event.start?.normalize();
    let end = event.end?.normalize();

    // Midnight to midnight counts as all-day, even for timed values.
    if is_midnight(&start) && is_midnight(&end) {
        return None;
    }

    Some(Row {
        date: start.wall.date(),
        start: start.wall.time(),
        end: end.wall.time(),
        summary: event.summary.clone(),
        duration_minutes: duration_minutes(&start, &end),
    })
}

fn is_midnight(moment: &Moment) -> bool {
    moment.wall.num_seconds_from_midnight() == 0 && moment.wall.nanosecond() == 0
}

fn duration_minutes(start: &Moment, end: &Moment) -> i64 {
    let elapsed = match (start.instant, end.instant) {
        (Some(start), Some(end)) => end - start,
        _ => end.wall - start.wall,
    };

    elapsed.num_seconds().div_euclid(60)
}
