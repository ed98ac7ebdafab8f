//! Input line parsing.

use crate::error::CliError;

/// One `<stream_id> <value>` record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRecord<'a> {
    pub stream_id: &'a str,
    pub value: &'a str,
}

/// Parse one input line.
///
/// The stream id ends at the first comma or whitespace; the rest, trimmed,
/// is the value. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<InputRecord<'_>>, CliError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let Some(split) = line.find(|c: char| c == ',' || c.is_whitespace()) else {
        return Err(CliError::invalid_line(
            line_no,
            format!("missing value in '{line}', expected '<stream_id> <value>'"),
        ));
    };

    let stream_id = &line[..split];
    let value = line[split + 1..].trim();
    if value.is_empty() {
        return Err(CliError::invalid_line(
            line_no,
            format!("missing value for stream '{stream_id}'"),
        ));
    }

    Ok(Some(InputRecord { stream_id, value }))
}

/// Turn one raw line from `read_until` into text.
///
/// The trailing `\n` or `\r\n` is dropped. Bytes that are not UTF-8 make the
/// line malformed.
pub fn decode_line(line_no: usize, mut raw: Vec<u8>) -> Result<String, CliError> {
    if raw.last() == Some(&b'\n') {
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
    }
    String::from_utf8(raw)
        .map_err(|e| CliError::invalid_line(line_no, format!("not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record<'a>(stream_id: &'a str, value: &'a str) -> Option<InputRecord<'a>> {
        Some(InputRecord { stream_id, value })
    }

    #[test]
    fn test_decode_strips_line_ending() {
        assert_eq!(decode_line(1, b"8 1\r\n".to_vec()).unwrap(), "8 1");
        assert_eq!(decode_line(2, b"8 2\n".to_vec()).unwrap(), "8 2");
        assert_eq!(decode_line(3, b"8 3".to_vec()).unwrap(), "8 3");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_line(4, b"\xff\xfe bad\n".to_vec()).unwrap_err();
        assert!(matches!(err, CliError::InvalidLine { line: 4, .. }));
    }

    #[test]
    fn test_space_and_comma_forms() {
        assert_eq!(parse_line(1, "8 23.5").unwrap(), record("8", "23.5"));
        assert_eq!(parse_line(1, "8,23.5").unwrap(), record("8", "23.5"));
        assert_eq!(parse_line(1, "  temp\t 19 ").unwrap(), record("temp", "19"));
    }

    #[test]
    fn test_value_keeps_inner_text() {
        assert_eq!(parse_line(1, "8, 1 2").unwrap(), record("8", "1 2"));
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(1, "   ").unwrap(), None);
        assert_eq!(parse_line(1, "# header").unwrap(), None);
    }

    #[test]
    fn test_missing_value() {
        let err = parse_line(3, "8").unwrap_err();
        assert!(err.to_string().starts_with("line 3:"), "got: {err}");
        assert!(parse_line(4, "8,").is_err());
    }
}
