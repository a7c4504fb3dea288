//! Content line lexing: unfolding and `NAME;PARAM=VALUE:VALUE` splitting
//! (RFC 5545 §3.1, RFC 6868 parameter value encoding).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{ContentLine, Parameter};

/// Splits physical lines on `\r\n`, `\n`, or a bare `\r`.
fn physical_lines(input: &str) -> impl Iterator<Item = &str> {
    let mut rest = input;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                let line = &rest[..pos];
                let after = &rest[pos..];
                rest = after.strip_prefix("\r\n").unwrap_or(&after[1..]);
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

/// Unfolds the input into logical lines (RFC 5545 §3.1).
///
/// A physical line starting with a single SP or HTAB continues the previous
/// logical line; the continuation marker is stripped. Empty physical lines
/// are skipped. Each logical line keeps the 1-based number of the physical
/// line it started on, for error attribution.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in physical_lines(input).enumerate() {
        if raw.is_empty() {
            continue;
        }
        if let Some(continuation) = raw.strip_prefix([' ', '\t']) {
            if let Some((_, logical)) = lines.last_mut() {
                logical.push_str(continuation);
                continue;
            }
        }
        lines.push((idx + 1, raw.to_string()));
    }
    lines
}

/// Unfolds the input and rejoins the logical lines with CRLF.
#[must_use]
pub fn unfold(input: &str) -> String {
    split_lines(input)
        .into_iter()
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Decodes RFC 6868 caret escapes in a parameter value.
fn decode_caret(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some('^') => out.push('^'),
            Some('\'') => out.push('"'),
            Some(other) => {
                out.push('^');
                out.push(other);
            }
            None => out.push('^'),
        }
    }
    out
}

fn parse_param_value(line: &str, start: usize, line_no: usize) -> ParseResult<(String, usize)> {
    if line[start..].starts_with('"') {
        let rest = &line[start + 1..];
        match rest.find('"') {
            Some(end) => Ok((decode_caret(&rest[..end]), start + 1 + end + 1)),
            None => Err(ParseError::new(ParseErrorKind::UnclosedQuote, line_no, start)),
        }
    } else {
        let rest = &line[start..];
        let end = rest.find([',', ';', ':']).unwrap_or(rest.len());
        Ok((decode_caret(&rest[..end]), start + end))
    }
}

fn scan_name(line: &str, start: usize) -> usize {
    let bytes = line.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'-') {
        pos += 1;
    }
    pos
}

fn parse_parameter(line: &str, start: usize, line_no: usize) -> ParseResult<(Parameter, usize)> {
    let name_end = scan_name(line, start);
    if name_end == start || line.as_bytes().get(name_end) != Some(&b'=') {
        let prefix: String = line.chars().take(24).collect();
        return Err(
            ParseError::new(ParseErrorKind::InvalidParameter, line_no, start)
                .with_context(format!("in line starting with '{prefix}'")),
        );
    }
    let name = line[start..name_end].to_ascii_uppercase();

    let mut values = Vec::new();
    let mut pos = name_end + 1;
    loop {
        let (value, next) = parse_param_value(line, pos, line_no)?;
        values.push(value);
        pos = next;
        if line.as_bytes().get(pos) == Some(&b',') {
            pos += 1;
        } else {
            break;
        }
    }

    Ok((Parameter { name, values }, pos))
}

/// Parses one logical line into a [`ContentLine`].
///
/// ## Errors
/// Returns an error for an empty or invalid property name, a malformed
/// parameter, an unclosed quoted value, or a missing `:` separator.
pub fn parse_content_line(line: &str, line_no: usize) -> ParseResult<ContentLine> {
    let name_end = scan_name(line, 0);
    if name_end == 0 {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_no,
            0,
        ));
    }
    let name = line[..name_end].to_ascii_uppercase();

    let mut params = Vec::new();
    let mut pos = name_end;
    loop {
        match line.as_bytes().get(pos) {
            Some(b':') => {
                pos += 1;
                break;
            }
            Some(b';') => {
                let (param, next) = parse_parameter(line, pos + 1, line_no)?;
                params.push(param);
                pos = next;
            }
            _ => {
                return Err(ParseError::new(ParseErrorKind::MissingColon, line_no, pos)
                    .with_context(format!("in property '{name}'")));
            }
        }
    }

    Ok(ContentLine {
        name,
        params,
        raw_value: line[pos..].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfold_simple() {
        let input = "DESCRIPTION:This is a lo\r\n ng description\r\n";
        assert_eq!(unfold(input), "DESCRIPTION:This is a long description");
    }

    #[test]
    fn unfold_with_tab_continuation() {
        let input = "SUMMARY:part one\n\tpart two\n";
        assert_eq!(unfold(input), "SUMMARY:part onepart two");
    }

    #[test]
    fn split_lines_tracks_physical_numbers() {
        let input = "BEGIN:VCALENDAR\r\nDESCRIPTION:a\r\n b\r\nEND:VCALENDAR\r\n";
        let lines = split_lines(input);
        assert_eq!(
            lines,
            vec![
                (1, "BEGIN:VCALENDAR".to_string()),
                (2, "DESCRIPTION:ab".to_string()),
                (4, "END:VCALENDAR".to_string()),
            ]
        );
    }

    #[test]
    fn parse_plain_line() {
        let line = parse_content_line("SUMMARY:Team standup", 1).unwrap();
        assert_eq!(line.name, "SUMMARY");
        assert!(line.params.is_empty());
        assert_eq!(line.raw_value, "Team standup");
    }

    #[test]
    fn parse_line_with_params() {
        let line =
            parse_content_line("DTSTART;TZID=Europe/Berlin;VALUE=DATE-TIME:20240523T115445", 1)
                .unwrap();
        assert_eq!(line.name, "DTSTART");
        assert_eq!(line.tzid(), Some("Europe/Berlin"));
        assert_eq!(line.value_type(), Some("DATE-TIME"));
        assert_eq!(line.raw_value, "20240523T115445");
    }

    #[test]
    fn parse_line_with_quoted_param() {
        let line = parse_content_line(
            "ATTENDEE;CN=\"Doe, Jane\";RSVP=TRUE:mailto:jane@example.com",
            1,
        )
        .unwrap();
        assert_eq!(line.param_value("CN"), Some("Doe, Jane"));
        assert_eq!(line.param_value("RSVP"), Some("TRUE"));
        assert_eq!(line.raw_value, "mailto:jane@example.com");
    }

    #[test]
    fn parse_line_with_multi_valued_param() {
        let line = parse_content_line(
            "ATTENDEE;MEMBER=\"mailto:a@example.com\",\"mailto:b@example.com\":mailto:c@example.com",
            1,
        )
        .unwrap();
        let member = line.param("MEMBER").unwrap();
        assert_eq!(member.values.len(), 2);
        assert_eq!(member.values[1], "mailto:b@example.com");
    }

    #[test]
    fn parse_line_unclosed_quote() {
        let err = parse_content_line("ATTENDEE;CN=\"Doe:mailto:jane@example.com", 7).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedQuote);
        assert_eq!(err.line, 7);
    }

    #[test]
    fn parse_line_missing_colon() {
        let err = parse_content_line("SUMMARY", 2).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingColon);
    }

    #[test]
    fn caret_decoding() {
        let line = parse_content_line("X-NOTE;X-REASON=line1^nline2^^caret^'quote^':ok", 1).unwrap();
        assert_eq!(
            line.param_value("X-REASON"),
            Some("line1\nline2^caret\"quote\"")
        );
    }
}
