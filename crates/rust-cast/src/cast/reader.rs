//! Reading casts back.

use std::io::BufRead;

use super::format::{CastHeader, Channel, Event};
use crate::error::{CastError, Result};

/// A parsed recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    /// The header line.
    pub header: CastHeader,
    /// Events in file order.
    pub events: Vec<Event>,
}

impl Cast {
    /// Whether event timestamps start at or after zero and never decrease.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.events.first().is_none_or(|e| e.timestamp >= 0.0)
            && self
                .events
                .windows(2)
                .all(|pair| pair[1].timestamp >= pair[0].timestamp)
    }

    /// All output data concatenated, as a player would show it.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.events
            .iter()
            .filter(|e| e.channel == Channel::Output)
            .map(|e| e.data.as_str())
            .collect()
    }

    /// Timestamp of the last event.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.timestamp)
    }
}

/// Read a cast from a line-oriented stream.
pub fn read_cast<R: BufRead>(reader: R) -> Result<Cast> {
    let mut lines = reader.lines().enumerate();

    let (_, header_line) = lines.next().ok_or_else(|| CastError::malformed(1, "empty cast"))?;
    let header_line = header_line.map_err(|e| CastError::io_context("reading cast header", e))?;
    let header: CastHeader =
        serde_json::from_str(&header_line).map_err(|e| CastError::malformed(1, e.to_string()))?;

    let mut events = Vec::new();
    for (i, line) in lines {
        let line = line.map_err(|e| CastError::io_context("reading cast event", e))?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(parse_event(i + 1, &line)?);
    }

    Ok(Cast { header, events })
}

/// Parse a cast held in memory.
pub fn parse_cast(text: &str) -> Result<Cast> {
    read_cast(text.as_bytes())
}

fn parse_event(line_no: usize, line: &str) -> Result<Event> {
    let (timestamp, code, data): (f64, String, String) =
        serde_json::from_str(line).map_err(|e| CastError::malformed(line_no, e.to_string()))?;
    let channel = Channel::from_code(&code)
        .ok_or_else(|| CastError::malformed(line_no, format!("unknown event code {code:?}")))?;
    Ok(Event {
        timestamp,
        channel,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"{"version":2,"width":80,"height":24,"timestamp":1,"idle_time_limit":4.0,"env":{"SHELL":"/bin/bash","TERM":"xterm-256color"}}"#,
        "\n",
        r#"[0.000000, "o", "$ "]"#,
        "\n",
        r#"[0.000000, "o", "echo hi\r\n"]"#,
        "\n\n",
        r#"[0.003000, "o", "hi\r\n"]"#,
        "\n",
    );

    #[test]
    fn reads_header_and_events() {
        let cast = parse_cast(SAMPLE).unwrap();
        assert_eq!(cast.header.width, 80);
        assert_eq!(cast.events.len(), 3);
        assert_eq!(cast.events[2].data, "hi\r\n");
        assert_eq!(cast.output_text(), "$ echo hi\r\nhi\r\n");
        assert!(cast.is_monotonic());
        assert!((cast.duration() - 0.003).abs() < 1e-12);
    }

    #[test]
    fn detects_regression() {
        let cast = Cast {
            header: CastHeader::new(80, 24, 0),
            events: vec![Event::output(1.0, "a"), Event::output(0.5, "b")],
        };
        assert!(!cast.is_monotonic());
    }

    #[test]
    fn empty_input() {
        let err = parse_cast("").unwrap_err();
        assert!(matches!(err, CastError::MalformedCast { line: 1, .. }));
    }

    #[test]
    fn bad_event_reports_line() {
        let text = format!("{}\n[0.1, \"o\"]\n", SAMPLE.lines().next().unwrap());
        let err = parse_cast(&text).unwrap_err();
        assert!(matches!(err, CastError::MalformedCast { line: 2, .. }));

        let text = format!("{}\n[0.1, \"x\", \"a\"]\n", SAMPLE.lines().next().unwrap());
        let err = parse_cast(&text).unwrap_err();
        assert!(err.to_string().contains("unknown event code"));
    }
}
