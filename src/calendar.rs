use std::fs;
use std::path::Path;

use ical::property::{Property, PropertyParser};
use log::debug;

use crate::error::{Error, Result};
use crate::value::{unescape_text, DateOrDateTime};

/// The events of a parsed calendar document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    pub events: Vec<EventEntry>,
}

/// A single `VEVENT`, reduced to what the report needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventEntry {
    pub start: Option<DateOrDateTime>,
    pub end: Option<DateOrDateTime>,
    pub summary: String,
}

/// An open `BEGIN:` block. Only `VEVENT` blocks collect an entry.
struct Frame {
    name: String,
    event: Option<EventEntry>,
}

impl Calendar {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Read {} bytes from {}", text.len(), path.display());
        Self::parse(&text)
    }

    /// Walks the content lines of `text`, keeping every `VEVENT` and
    /// skipping other components, including unknown and `X-` ones.
    pub fn parse<S: AsRef<str>>(text: S) -> Result<Self> {
        let text = text
            .as_ref()
            .trim_start_matches('\u{feff}')
            .replace("\r\n", "\n");
        let mut stack: Vec<Frame> = Vec::new();
        let mut calendars = 0;
        let mut events = Vec::new();

        for property in PropertyParser::from_reader(text.as_bytes()) {
            let property = property.map_err(|err| Error::Parse(err.to_string()))?;
            let name = property.name.to_ascii_uppercase();

            match name.as_str() {
                "BEGIN" => {
                    let component = component_name(&property)?;
                    if stack.is_empty() && component != "VCALENDAR" {
                        return Err(Error::Parse(format!(
                            "missing header: expected BEGIN:VCALENDAR, found BEGIN:{component}"
                        )));
                    }

                    let event = (component == "VEVENT").then(EventEntry::default);
                    stack.push(Frame {
                        name: component,
                        event,
                    });
                }
                "END" => {
                    let component = component_name(&property)?;
                    let frame = stack.pop().ok_or_else(|| {
                        Error::Parse(format!("END:{component} without matching BEGIN"))
                    })?;

                    if frame.name != component {
                        return Err(Error::Parse(format!(
                            "END:{component} does not close BEGIN:{}",
                            frame.name
                        )));
                    }

                    if let Some(event) = frame.event {
                        events.push(event);
                    }
                    if stack.is_empty() {
                        calendars += 1;
                    }
                }
                _ => match stack.last_mut() {
                    Some(frame) => {
                        if let Some(event) = frame.event.as_mut() {
                            event.apply(&name, &property);
                        }
                    }
                    None => {
                        return Err(Error::Parse(format!(
                            "missing header: {name} outside of BEGIN:VCALENDAR"
                        )));
                    }
                },
            }
        }

        if let Some(frame) = stack.last() {
            return Err(Error::Parse(format!("unterminated BEGIN:{}", frame.name)));
        }

        if calendars == 0 {
            return Err(Error::Parse("no VCALENDAR component found".into()));
        }

        debug!("Parsed {calendars} calendar(s) with {} event(s)", events.len());
        Ok(Calendar { events })
    }
}

impl EventEntry {
    fn apply(&mut self, name: &str, property: &Property) {
        match name {
            "DTSTART" => self.start = date_property(property),
            "DTEND" => self.end = date_property(property),
            "SUMMARY" => {
                self.summary = property
                    .value
                    .as_deref()
                    .map(unescape_text)
                    .unwrap_or_default();
            }
            _ => {}
        }
    }
}

fn component_name(property: &Property) -> Result<String> {
    property
        .value
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| Error::Parse(format!("{} without a component name", property.name)))
}

fn date_property(property: &Property) -> Option<DateOrDateTime> {
    let raw = property.value.as_deref()?;
    let value = DateOrDateTime::parse(raw, param(property, "VALUE"), param(property, "TZID"));

    if value.is_none() {
        debug!("Ignoring unparsable {} value {raw:?}", property.name);
    }

    value
}

fn param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))?
        .1
        .first()
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    use super::*;

    fn wrap(events: &str) -> String {
        format!("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Test//Test//EN\n{events}END:VCALENDAR\n")
    }

    #[test]
    fn parses_events_in_document_order() {
        let calendar = Calendar::parse(wrap(
            "BEGIN:VEVENT\nUID:1\nDTSTART:20240102T090000\nDTEND:20240102T100000\nSUMMARY:Second day\nEND:VEVENT\n\
             BEGIN:VEVENT\nUID:2\nDTSTART:20240101T090000\nDTEND:20240101T100000\nSUMMARY:First day\nEND:VEVENT\n",
        ))
        .unwrap();

        let summaries: Vec<_> = calendar.events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, ["Second day", "First day"]);
    }

    #[test]
    fn reads_date_parameters() {
        let calendar = Calendar::parse(wrap(
            "BEGIN:VEVENT\nUID:1\nDTSTART;VALUE=DATE:20240101\nDTEND;VALUE=DATE:20240102\nEND:VEVENT\n",
        ))
        .unwrap();

        let event = &calendar.events[0];
        assert_eq!(
            event.start,
            Some(DateOrDateTime::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        );
        assert_eq!(
            event.end,
            Some(DateOrDateTime::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()))
        );
        assert_eq!(event.summary, "");
    }

    #[test]
    fn reads_tzid_parameter() {
        let calendar = Calendar::parse(wrap(
            "BEGIN:VEVENT\nUID:1\nDTSTART;TZID=Europe/Berlin:20240701T090000\nDTEND;TZID=Europe/Berlin:20240701T170000\nEND:VEVENT\n",
        ))
        .unwrap();

        assert!(matches!(calendar.events[0].start, Some(DateOrDateTime::Zoned(_))));
    }

    #[test]
    fn missing_and_broken_times_are_absent() {
        let calendar = Calendar::parse(wrap(
            "BEGIN:VEVENT\nUID:1\nDTSTART:20240101T090000\nSUMMARY:No end\nEND:VEVENT\n\
             BEGIN:VEVENT\nUID:2\nDTSTART:soon\nDTEND:20240101T100000\nEND:VEVENT\n",
        ))
        .unwrap();

        assert_eq!(calendar.events.len(), 2);
        assert!(calendar.events[0].end.is_none());
        assert!(calendar.events[1].start.is_none());
        assert!(calendar.events[1].end.is_some());
    }

    #[test]
    fn unescapes_summary() {
        let calendar = Calendar::parse(wrap(
            "BEGIN:VEVENT\nUID:1\nDTSTART:20240101T090000\nDTEND:20240101T100000\nSUMMARY:Standup\\, daily\nEND:VEVENT\n",
        ))
        .unwrap();

        assert_eq!(calendar.events[0].summary, "Standup, daily");
    }

    #[test]
    fn accepts_crlf_and_folded_lines() {
        let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:1\r\n\
                    DTSTART:20240101T090000\r\nDTEND:20240101T100000\r\n\
                    SUMMARY:Quarterly plan\r\n ning\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let calendar = Calendar::parse(text).unwrap();

        assert_eq!(calendar.events[0].summary, "Quarterly planning");
    }

    #[test]
    fn collects_events_from_every_calendar() {
        let one = wrap("BEGIN:VEVENT\nUID:1\nSUMMARY:A\nEND:VEVENT\n");
        let two = wrap("BEGIN:VEVENT\nUID:2\nSUMMARY:B\nEND:VEVENT\n");
        let calendar = Calendar::parse(format!("{one}{two}")).unwrap();

        assert_eq!(calendar.events.len(), 2);
    }

    #[test]
    fn empty_calendar_has_no_events() {
        let calendar = Calendar::parse(wrap("")).unwrap();
        assert!(calendar.events.is_empty());
    }

    #[test]
    fn skips_unknown_components() {
        let calendar = Calendar::parse(wrap(
            "BEGIN:X-FOO\nA:b\nDTSTART:20240101T000000\nEND:X-FOO\n\
             BEGIN:VAVAILABILITY\nUID:a\nBEGIN:AVAILABLE\nDTSTART:20240101T080000\nEND:AVAILABLE\nEND:VAVAILABILITY\n\
             BEGIN:VEVENT\nUID:1\nDTSTART:20240101T090000\nDTEND:20240101T100000\nSUMMARY:Work\nEND:VEVENT\n",
        ))
        .unwrap();

        assert_eq!(calendar.events.len(), 1);
        assert_eq!(calendar.events[0].summary, "Work");
    }

    #[test]
    fn nested_alarm_does_not_leak_into_event() {
        let calendar = Calendar::parse(wrap(
            "BEGIN:VEVENT\nUID:1\nDTSTART:20240101T090000\nDTEND:20240101T100000\nSUMMARY:Work\n\
             BEGIN:VALARM\nACTION:DISPLAY\nSUMMARY:Reminder\nTRIGGER:-PT15M\nEND:VALARM\nEND:VEVENT\n",
        ))
        .unwrap();

        assert_eq!(calendar.events[0].summary, "Work");
    }

    #[test]
    fn ignores_leading_byte_order_mark() {
        let text = format!(
            "\u{feff}{}",
            wrap("BEGIN:VEVENT\nUID:1\nSUMMARY:Work\nEND:VEVENT\n")
        );
        let calendar = Calendar::parse(text).unwrap();

        assert_eq!(calendar.events[0].summary, "Work");
    }

    #[test]
    fn rejects_mismatched_and_unterminated_components() {
        assert!(matches!(
            Calendar::parse(wrap("BEGIN:VEVENT\nUID:1\nEND:VTODO\n")),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Calendar::parse("BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VEVENT\nUID:1\n"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Calendar::parse("BEGIN:VEVENT\nUID:1\nEND:VEVENT\n"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(Calendar::parse(""), Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_non_calendar_text() {
        assert!(matches!(
            Calendar::parse("this is not a calendar\n"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Calendar::from_file("does/not/exist.ics").unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn from_file_reads_calendar() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(wrap("BEGIN:VEVENT\nUID:1\nSUMMARY:Work\nEND:VEVENT\n").as_bytes())
            .unwrap();
        file.flush().unwrap();

        let calendar = Calendar::from_file(file.path()).unwrap();
        assert_eq!(calendar.events[0].summary, "Work");
    }
}
