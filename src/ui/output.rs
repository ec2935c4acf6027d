//! Result sink: renders probe results as lines on a writer

use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

use crate::core::constants::{error_messages, output_formats};
use crate::core::types::{ProbeOutcome, ProbeResult};
use crate::discovery::SourceLine;

/// Writes one line per result, flushed as soon as it is written.
pub struct ResultSink<W: Write> {
    writer: W,
    format: String,
}

#[derive(Serialize)]
struct ResultRecord<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    latency_ms: u64,
}

#[derive(Serialize)]
struct SkippedRecord<'a> {
    line: usize,
    url: &'a str,
    error: &'static str,
}

impl<W: Write> ResultSink<W> {
    /// Unknown formats fall back to text; config validation rejects them earlier.
    pub fn new(writer: W, format: &str) -> Self {
        let format = if output_formats::ALL.contains(&format) {
            format
        } else {
            output_formats::DEFAULT
        };
        Self {
            writer,
            format: format.to_string(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Announce the input source. Only the text format prints it.
    pub fn opening(&mut self, path: &str) -> io::Result<()> {
        if self.format == output_formats::TEXT {
            self.write_line(&format!("Opening {path}"))?;
        }
        Ok(())
    }

    /// Write one probe result.
    pub fn emit(&mut self, result: &ProbeResult) -> io::Result<()> {
        let line = match self.format.as_str() {
            output_formats::JSON => json_line(result)?,
            output_formats::MINIMAL => minimal_line(result),
            _ => text_line(result),
        };
        self.write_line(&line)
    }

    /// Write the diagnostic for an input line that was not probed.
    pub fn skipped(&mut self, line: &SourceLine) -> io::Result<()> {
        let rendered = match self.format.as_str() {
            output_formats::JSON => serde_json::to_string(&SkippedRecord {
                line: line.number,
                url: &line.address,
                error: error_messages::ONLY_HTTP_ALLOWED,
            })
            .map_err(io::Error::other)?,
            output_formats::MINIMAL => format!(
                "SKIP {} {}",
                line.address,
                error_messages::ONLY_HTTP_ALLOWED
            ),
            _ => skipped_text(line),
        };
        self.write_line(&rendered)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

/// `Url: <address>; Status: <code>; Latency: <d>` or `Url: <address>; Error: <e>`
pub fn text_line(result: &ProbeResult) -> String {
    match &result.outcome {
        ProbeOutcome::Status(code) => format!(
            "Url: {}; Status: {}; Latency: {}",
            result.address,
            code,
            format_latency(result.latency)
        ),
        ProbeOutcome::Failed(err) => format!("Url: {}; Error: {}", result.address, err),
    }
}

fn minimal_line(result: &ProbeResult) -> String {
    match &result.outcome {
        ProbeOutcome::Status(code) => format!("{code} {}", result.address),
        ProbeOutcome::Failed(err) => format!("ERR {} {err}", result.address),
    }
}

fn json_line(result: &ProbeResult) -> io::Result<String> {
    let record = ResultRecord {
        url: &result.address,
        status: result.status_code(),
        error: result.error().map(ToString::to_string),
        latency_ms: u64::try_from(result.latency.as_millis()).unwrap_or(u64::MAX),
    };
    serde_json::to_string(&record).map_err(io::Error::other)
}

fn skipped_text(line: &SourceLine) -> String {
    format!(
        "Line {}: Invalid URL: {} ({})",
        line.number,
        line.address,
        error_messages::ONLY_HTTP_ALLOWED
    )
}

/// Render a latency rounded to the millisecond: `0s`, `82ms`, `1.5s`, `1m2.5s`.
pub fn format_latency(latency: Duration) -> String {
    let millis = (latency.as_micros() + 500) / 1000;
    if millis == 0 {
        return "0s".to_string();
    }
    if millis < 1000 {
        return format!("{millis}ms");
    }

    let total_seconds = millis / 1000;
    let fraction = millis % 1000;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 3600;

    let mut rendered = String::new();
    if hours > 0 {
        rendered.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        rendered.push_str(&format!("{minutes}m"));
    }
    if fraction == 0 {
        rendered.push_str(&format!("{seconds}s"));
    } else {
        let fraction = format!("{fraction:03}");
        rendered.push_str(&format!("{seconds}.{}s", fraction.trim_end_matches('0')));
    }
    rendered
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::core::types::ProbeError;

    fn render<F>(format: &str, f: F) -> String
    where
        F: FnOnce(&mut ResultSink<Vec<u8>>) -> io::Result<()>,
    {
        let mut sink = ResultSink::new(Vec::new(), format);
        f(&mut sink).expect("writing to a Vec cannot fail");
        String::from_utf8(sink.into_inner()).expect("sink output is UTF-8")
    }

    fn ok_result() -> ProbeResult {
        ProbeResult::succeeded(
            "https://go.dev".to_string(),
            200,
            Duration::from_millis(82),
        )
    }

    fn timed_out_result() -> ProbeResult {
        ProbeResult::failed(
            "https://slow.test".to_string(),
            ProbeError::Timeout,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(Duration::ZERO), "0s");
        assert_eq!(format_latency(Duration::from_micros(400)), "0s");
        assert_eq!(format_latency(Duration::from_micros(81_600)), "82ms");
        assert_eq!(format_latency(Duration::from_millis(999)), "999ms");
        assert_eq!(format_latency(Duration::from_millis(1000)), "1s");
        assert_eq!(format_latency(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_latency(Duration::from_millis(1234)), "1.234s");
        assert_eq!(format_latency(Duration::from_millis(60_000)), "1m0s");
        assert_eq!(format_latency(Duration::from_millis(62_500)), "1m2.5s");
        assert_eq!(format_latency(Duration::from_secs(3_725)), "1h2m5s");
    }

    #[test]
    fn test_text_line__success() {
        assert_eq!(
            text_line(&ok_result()),
            "Url: https://go.dev; Status: 200; Latency: 82ms"
        );
    }

    #[test]
    fn test_text_line__non_2xx_is_still_a_status() {
        let result = ProbeResult::succeeded(
            "https://kubernetes.io/missing".to_string(),
            404,
            Duration::from_millis(1500),
        );

        assert_eq!(
            text_line(&result),
            "Url: https://kubernetes.io/missing; Status: 404; Latency: 1.5s"
        );
    }

    #[test]
    fn test_text_line__failure() {
        assert_eq!(
            text_line(&timed_out_result()),
            "Url: https://slow.test; Error: request timed out"
        );
    }

    #[test]
    fn test_sink__opening_only_in_text_format() {
        assert_eq!(
            render(output_formats::TEXT, |s| s.opening("services.txt")),
            "Opening services.txt\n"
        );
        assert_eq!(render(output_formats::JSON, |s| s.opening("services.txt")), "");
        assert_eq!(
            render(output_formats::MINIMAL, |s| s.opening("services.txt")),
            ""
        );
    }

    #[test]
    fn test_sink__text_lines() {
        let output = render(output_formats::TEXT, |s| {
            s.emit(&ok_result())?;
            s.emit(&timed_out_result())
        });

        assert_eq!(
            output,
            "Url: https://go.dev; Status: 200; Latency: 82ms\n\
             Url: https://slow.test; Error: request timed out\n"
        );
    }

    #[test]
    fn test_sink__minimal_lines() {
        let output = render(output_formats::MINIMAL, |s| {
            s.emit(&ok_result())?;
            s.emit(&timed_out_result())
        });

        assert_eq!(
            output,
            "200 https://go.dev\nERR https://slow.test request timed out\n"
        );
    }

    #[test]
    fn test_sink__json_lines_are_one_object_each() -> serde_json::Result<()> {
        let output = render(output_formats::JSON, |s| {
            s.emit(&ok_result())?;
            s.emit(&timed_out_result())
        });

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let ok: serde_json::Value = serde_json::from_str(lines[0])?;
        assert_eq!(ok["url"], "https://go.dev");
        assert_eq!(ok["status"], 200);
        assert_eq!(ok["latency_ms"], 82);
        assert!(ok.get("error").is_none());

        let failed: serde_json::Value = serde_json::from_str(lines[1])?;
        assert_eq!(failed["error"], "request timed out");
        assert!(failed.get("status").is_none());
        Ok(())
    }

    #[test]
    fn test_sink__skipped_line_diagnostic() {
        let line = SourceLine::new(3, "ftp://example.com");

        assert_eq!(
            render(output_formats::TEXT, |s| s.skipped(&line)),
            "Line 3: Invalid URL: ftp://example.com (only HTTP/HTTPS allowed)\n"
        );
        assert_eq!(
            render(output_formats::MINIMAL, |s| s.skipped(&line)),
            "SKIP ftp://example.com only HTTP/HTTPS allowed\n"
        );
        assert!(render(output_formats::JSON, |s| s.skipped(&line)).contains("\"line\":3"));
    }

    #[test]
    fn test_sink__unknown_format_falls_back_to_text() {
        let sink = ResultSink::new(Vec::new(), "xml");
        assert_eq!(sink.format(), output_formats::TEXT);
    }
}
