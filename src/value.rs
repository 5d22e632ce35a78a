use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A `DTSTART`/`DTEND` value as written in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrDateTime {
    Date(NaiveDate),
    Floating(NaiveDateTime),
    Utc(DateTime<Utc>),
    Zoned(DateTime<Tz>),
}

/// A value pinned to a point on the wall clock, and to an absolute instant
/// when the calendar says which zone it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub wall: NaiveDateTime,
    pub instant: Option<DateTime<Utc>>,
}

impl DateOrDateTime {
    /// Parses a raw property value. `value_type` is the `VALUE` parameter and
    /// `tzid` the `TZID` parameter, if present.
    pub fn parse(raw: &str, value_type: Option<&str>, tzid: Option<&str>) -> Option<Self> {
        let raw = raw.trim();

        if value_type.is_some_and(|kind| kind.eq_ignore_ascii_case("DATE")) || raw.len() == 8 {
            return NaiveDate::parse_from_str(raw, "%Y%m%d").ok().map(Self::Date);
        }

        if let Some(utc) = raw.strip_suffix('Z') {
            let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
            return Some(Self::Utc(Utc.from_utc_datetime(&naive)));
        }

        let naive = NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S").ok()?;

        let zoned = tzid
            .and_then(resolve_tzid)
            .and_then(|tz| tz.from_local_datetime(&naive).single());

        Some(zoned.map_or(Self::Floating(naive), Self::Zoned))
    }

    /// Dates become midnight of that day.
    pub fn normalize(self) -> Moment {
        match self {
            Self::Date(date) => Moment {
                wall: date.and_time(chrono::NaiveTime::MIN),
                instant: None,
            },
            Self::Floating(wall) => Moment {
                wall,
                instant: None,
            },
            Self::Utc(utc) => Moment {
                wall: utc.naive_utc(),
                instant: Some(utc),
            },
            Self::Zoned(zoned) => Moment {
                wall: zoned.naive_local(),
                instant: Some(zoned.with_timezone(&Utc)),
            },
        }
    }
}

fn resolve_tzid(tzid: &str) -> Option<Tz> {
    let tzid = tzid.trim_matches('"');
    let stripped = tzid
        .strip_prefix("/mozilla.org/20070129_1/")
        .or_else(|| tzid.strip_prefix("/mozilla.org/"))
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .or_else(|| tzid.strip_prefix("/freeassociation.sourceforge.net/Tzfile/"))
        .unwrap_or(tzid);

    Tz::from_str(stripped).ok()
}

/// Decodes the backslash escapes of an iCalendar TEXT value.
pub fn unescape_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }

        match chars.next() {
            Some('n' | 'N') => text.push('\n'),
            Some(escaped) => text.push(escaped),
            None => text.push('\\'),
        }
    }

    text
}
