//! Lenient reader for the intrinsic-peak record stream
//!
//! The stream is line oriented:
//!
//! ```text
//! >title
//! A 120 3 x x x 0
//! 50 30 10
//! C 131 2 x x x 1
//! 40 12
//! ```
//!
//! After the `>` header, non-blank lines pair up. The first line of a pair holds
//! the base, the intrinsic position, the half-width `N`, three ignored fields and
//! the peak type; the second holds `N` magnitudes. Numeric fields that do not
//! parse fall back to zero and leave a [`FieldDiagnostic`] behind.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use super::error::IntrinsicError;
use super::peak::IntrinsicPeak;

/// Largest half-width accepted from a record; larger counts are clamped
pub const MAX_RECORD_SAMPLES: i64 = 1 << 16;

/// Largest number of magnitudes accepted across a whole stream
///
/// Records past the budget keep their position but lose their samples.
pub const MAX_STREAM_SAMPLES: i64 = 1 << 20;

/// Marker that opens the header line
pub const HEADER_MARKER: char = '>';

/// Longest header excerpt kept in a [`IntrinsicError::MissingHeader`]
const HEADER_EXCERPT_LEN: usize = 40;

/// One numeric field that did not parse and was replaced by a default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiagnostic {
    /// 1-based line number
    pub line: usize,
    /// Name of the field
    pub field: &'static str,
    /// Text found in the field, or `None` when it was missing
    pub found: Option<String>,
    /// Value used instead
    pub substituted: String,
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(found) => write!(
                f,
                "line {}: {} {:?} rejected, using {}",
                self.line, self.field, found, self.substituted
            ),
            None => write!(
                f,
                "line {}: {} missing, using {}",
                self.line, self.field, self.substituted
            ),
        }
    }
}

/// Parse a field, falling back to `T::default()`
///
/// The diagnostic is `Some` whenever the default was used.
pub fn parse_or_default<T>(
    text: Option<&str>,
    line: usize,
    field: &'static str,
) -> (T, Option<FieldDiagnostic>)
where
    T: FromStr + Default + fmt::Display,
{
    if let Some(value) = text.and_then(|t| t.parse::<T>().ok()) {
        return (value, None);
    }
    let value = T::default();
    let diagnostic = FieldDiagnostic {
        line,
        field,
        found: text.map(str::to_owned),
        substituted: value.to_string(),
    };
    (value, Some(diagnostic))
}

/// Everything read from one stream
#[derive(Debug, Default)]
pub(crate) struct ParsedRecords {
    pub title: String,
    pub peaks: Vec<IntrinsicPeak>,
    pub diagnostics: Vec<FieldDiagnostic>,
}

/// Line source that reports consumed bytes after every line
struct LineReader<R, F> {
    reader: R,
    progress: F,
    consumed: u64,
    line_number: usize,
    buffer: Vec<u8>,
}

impl<R: BufRead, F: FnMut(u64)> LineReader<R, F> {
    fn new(reader: R, progress: F) -> Self {
        Self {
            reader,
            progress,
            consumed: 0,
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Next line with its number, trailing `\r\n` removed
    fn next_line(&mut self) -> Result<Option<(usize, String)>, IntrinsicError> {
        self.buffer.clear();
        let read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if read == 0 {
            return Ok(None);
        }
        self.consumed += read as u64;
        self.line_number += 1;
        (self.progress)(self.consumed);

        let text = String::from_utf8_lossy(&self.buffer);
        let text = text.trim_end_matches(['\n', '\r']);
        Ok(Some((self.line_number, text.to_owned())))
    }

    /// Next line that holds anything besides whitespace
    fn next_non_blank(&mut self) -> Result<Option<(usize, String)>, IntrinsicError> {
        while let Some((number, text)) = self.next_line()? {
            if !text.trim().is_empty() {
                return Ok(Some((number, text)));
            }
        }
        Ok(None)
    }
}

/// Fields of the first line of a record pair
struct RecordHead {
    base: char,
    position: i64,
    count: i64,
    peak_type: i32,
}

fn parse_head(line: usize, text: &str, diagnostics: &mut Vec<FieldDiagnostic>) -> RecordHead {
    let mut fields = text.split_whitespace();

    let base = fields.next().and_then(|f| f.chars().next()).unwrap_or('N');
    let (position, d) = parse_or_default::<i64>(fields.next(), line, "position");
    diagnostics.extend(d);
    let (mut count, d) = parse_or_default::<i64>(fields.next(), line, "sample count");
    diagnostics.extend(d);

    // Three fields carried by the format that nothing consumes
    let mut fields = fields.skip(3);
    let (peak_type, d) = parse_or_default::<i32>(fields.next(), line, "peak type");
    diagnostics.extend(d);

    if count > MAX_RECORD_SAMPLES {
        diagnostics.push(FieldDiagnostic {
            line,
            field: "sample count",
            found: Some(count.to_string()),
            substituted: MAX_RECORD_SAMPLES.to_string(),
        });
        count = MAX_RECORD_SAMPLES;
    }

    RecordHead {
        base,
        position,
        count,
        peak_type,
    }
}

fn parse_magnitudes(
    line: usize,
    text: Option<&str>,
    count: usize,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> Vec<f64> {
    let mut magnitudes = Vec::with_capacity(count);
    let mut fields = text.map(str::split_whitespace).into_iter().flatten();

    for value in fields.by_ref().take(count) {
        let (magnitude, d) = parse_or_default::<f64>(Some(value), line, "magnitude");
        diagnostics.extend(d);
        magnitudes.push(magnitude);
    }

    if magnitudes.len() < count {
        diagnostics.push(FieldDiagnostic {
            line,
            field: "magnitudes",
            found: text.map(|_| format!("{} of {}", magnitudes.len(), count)),
            substituted: "0".to_string(),
        });
        magnitudes.resize(count, 0.0);
    }

    magnitudes
}

/// Read the whole stream into peaks
///
/// `progress` is called with the cumulative byte count after every line.
pub(crate) fn parse_records<R, F>(reader: R, progress: F) -> Result<ParsedRecords, IntrinsicError>
where
    R: BufRead,
    F: FnMut(u64),
{
    let mut lines = LineReader::new(reader, progress);
    let mut parsed = ParsedRecords::default();
    let mut budget = MAX_STREAM_SAMPLES;

    let Some((_, header)) = lines.next_non_blank()? else {
        debug!("Intrinsic peak stream is empty");
        return Ok(parsed);
    };
    let Some(title) = header.trim_start().strip_prefix(HEADER_MARKER) else {
        return Err(IntrinsicError::MissingHeader(
            header.chars().take(HEADER_EXCERPT_LEN).collect(),
        ));
    };
    parsed.title = title.trim().to_owned();

    while let Some((head_line, head_text)) = lines.next_non_blank()? {
        let head = parse_head(head_line, &head_text, &mut parsed.diagnostics);
        let body = if head.count > 0 {
            lines.next_non_blank()?
        } else {
            None
        };

        let mut kept = head.count;
        if kept > budget {
            parsed.diagnostics.push(FieldDiagnostic {
                line: head_line,
                field: "sample count",
                found: Some(kept.to_string()),
                substituted: budget.to_string(),
            });
            kept = budget;
        }
        budget -= kept.max(0);
        let count = usize::try_from(kept).unwrap_or(0);

        let body_line = body.as_ref().map_or(head_line, |(n, _)| *n);
        let half = if count > 0 {
            parse_magnitudes(
                body_line,
                body.as_ref().map(|(_, t)| t.as_str()),
                count,
                &mut parsed.diagnostics,
            )
        } else {
            Vec::new()
        };

        parsed.peaks.push(IntrinsicPeak::from_record(
            head.base,
            head.position,
            kept,
            &half,
            head.peak_type,
        ));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsic::PeakShape;

    fn parse(text: &str) -> ParsedRecords {
        parse_records(text.as_bytes(), |_| {}).unwrap()
    }

    #[test]
    fn test_parse_or_default() {
        let (value, diagnostic) = parse_or_default::<i64>(Some("42"), 1, "position");
        assert_eq!(value, 42);
        assert!(diagnostic.is_none());

        let (value, diagnostic) = parse_or_default::<f64>(Some("abc"), 3, "magnitude");
        assert_eq!(value, 0.0);
        let diagnostic = diagnostic.unwrap();
        assert_eq!(diagnostic.line, 3);
        assert_eq!(diagnostic.found.as_deref(), Some("abc"));
        assert_eq!(diagnostic.substituted, "0");
    }

    #[test]
    fn test_two_records() {
        let parsed = parse(">sample 1\nA 10 3 x x x 0\n5 3 1\nC 20 1 x x x 2\n7\n");
        assert_eq!(parsed.title, "sample 1");
        assert_eq!(parsed.peaks.len(), 2);
        assert_eq!(parsed.peaks[0].values(), &[1.0, 3.0, 5.0, 3.0, 1.0]);
        assert_eq!(parsed.peaks[1].base(), 'C');
        assert_eq!(parsed.peaks[1].peak_type(), 2);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let parsed = parse(">t\r\n\r\nG 4 2 x x x 0\r\n\r\n2 1\r\n");
        assert_eq!(parsed.peaks.len(), 1);
        assert_eq!(parsed.peaks[0].values(), &[1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_bad_fields_default() {
        let parsed = parse(">t\nT pos 2 x x x kind\n4 oops\n");
        assert_eq!(parsed.peaks[0].position(), 0);
        assert_eq!(parsed.peaks[0].peak_type(), 0);
        assert_eq!(parsed.peaks[0].values(), &[0.0, 4.0, 0.0]);
        let fields: Vec<_> = parsed.diagnostics.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["position", "peak type", "magnitude"]);
        assert_eq!(parsed.diagnostics[2].line, 3);
    }

    #[test]
    fn test_short_magnitude_line_pads() {
        let parsed = parse(">t\nA 5 3 x x x 0\n9\n");
        assert_eq!(parsed.peaks[0].values(), &[0.0, 0.0, 9.0, 0.0, 0.0]);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].field, "magnitudes");
    }

    #[test]
    fn test_dangling_head() {
        let parsed = parse(">t\nA 5 2 x x x 0\n");
        assert_eq!(parsed.peaks.len(), 1);
        assert_eq!(parsed.peaks[0].values(), &[0.0, 0.0, 0.0]);
        assert_eq!(parsed.diagnostics[0].found, None);
    }

    #[test]
    fn test_zero_count_has_no_body() {
        let parsed = parse(">t\nA 5 0 x x x 0\nC 8 1 x x x 0\n3\n");
        assert_eq!(parsed.peaks.len(), 2);
        assert_eq!(parsed.peaks[0].width(), 0);
        assert_eq!(parsed.peaks[1].values(), &[3.0]);
    }

    #[test]
    fn test_oversized_count_is_clamped() {
        let parsed = parse(">t\nA 5 99999999 x x x 0\n1\n");
        assert_eq!(parsed.peaks[0].width() as i64, 2 * MAX_RECORD_SAMPLES - 1);
        assert_eq!(parsed.diagnostics[0].field, "sample count");
    }

    #[test]
    fn test_missing_header() {
        let err = parse_records("A 1 1 x x x 0\n1\n".as_bytes(), |_| {}).unwrap_err();
        assert!(matches!(err, IntrinsicError::MissingHeader(ref line) if line == "A 1 1 x x x 0"));
    }

    #[test]
    fn test_empty_stream() {
        let parsed = parse("");
        assert!(parsed.peaks.is_empty());
        assert!(parse("\n\n").peaks.is_empty());
    }

    #[test]
    fn test_progress_is_cumulative() {
        let mut seen = Vec::new();
        parse_records(">t\nA 1 1 x x x 0\n2\n".as_bytes(), |n| seen.push(n)).unwrap();
        assert_eq!(seen, vec![3, 17, 19]);
    }

    #[test]
    fn test_stream_sample_budget() {
        let mut text = String::from(">t\n");
        let records = MAX_STREAM_SAMPLES / MAX_RECORD_SAMPLES + 1;
        for _ in 0..records {
            text.push_str(&format!("A 1 {} x x x 0\n1\n", MAX_RECORD_SAMPLES));
        }
        text.push_str("C 9 1 x x x 0\n4\n");
        let parsed = parse(&text);

        assert_eq!(parsed.peaks.len() as i64, records + 1);
        let over = &parsed.peaks[records as usize - 1];
        assert_eq!(over.width(), 0);
        assert_eq!(parsed.peaks[records as usize].width(), 0);

        let budget: Vec<_> = parsed
            .diagnostics
            .iter()
            .filter(|d| d.field == "sample count")
            .collect();
        assert_eq!(budget.len(), 2);
        assert_eq!(budget[0].substituted, "0");
        assert_eq!(budget[1].line, 2 * records as usize + 2);
    }
}
