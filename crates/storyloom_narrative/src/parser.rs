//! Tolerant parsing of beat lists out of model output.
//!
//! Models are asked for a JSON list of beats but routinely answer with
//! something close: a bracketed list with unescaped quotes, one beat per
//! line, or markdown sections. Every strategy here falls back to a looser
//! one instead of failing, so parsing never produces an error value.

use serde_json::Value;
use tracing::{debug, instrument};

/// What to do when the text is neither a JSON list nor a well-formed
/// bracketed list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// One beat per non-blank line.
    #[default]
    Lines,
    /// One beat per section introduced by `marker` (e.g. `"## Conflict"`).
    Sections {
        /// Heading that starts every section
        marker: String,
    },
}

impl ParseMode {
    /// Section mode split on `marker`.
    pub fn sections(marker: impl Into<String>) -> Self {
        Self::Sections {
            marker: marker.into(),
        }
    }
}

/// Parse `text` into beats and drop every beat that lacks `sigil`.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::{ParseMode, parse_beats};
///
/// let beats = parse_beats(r##"["# Meet", "note", "# Part"]"##, &ParseMode::Lines, "#");
/// assert_eq!(beats, vec!["# Meet", "# Part"]);
/// ```
#[instrument(skip(text), fields(length = text.len()))]
pub fn parse_beats(text: &str, mode: &ParseMode, sigil: &str) -> Vec<String> {
    let parsed = parse_list(text, mode);
    let total = parsed.len();
    let beats = retain_marked(parsed, sigil);
    debug!(total, kept = beats.len(), "Parsed beat list");
    beats
}

/// Parse `text` into an ordered list, trying progressively looser strategies.
///
/// 1. The whole text as a JSON list (non-string elements keep their JSON text).
/// 2. A bracketed list scanned by hand, tolerant of invalid escapes.
/// 3. The fallback chosen by `mode`.
pub fn parse_list(text: &str, mode: &ParseMode) -> Vec<String> {
    if let Some(items) = parse_json_list(text) {
        debug!(count = items.len(), "Parsed as JSON list");
        return items;
    }

    let trimmed = text.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        match scan_bracketed(&trimmed[1..trimmed.len() - 1]) {
            Ok(items) => {
                debug!(count = items.len(), "Parsed as bracketed list");
                return items;
            }
            Err(e) => debug!(error = ?e, "Bracketed scan failed, falling back"),
        }
    }

    match mode {
        ParseMode::Lines => split_lines(text),
        ParseMode::Sections { marker } => split_sections(text, marker),
    }
}

/// Keep only the beats that contain `sigil`, in order.
pub fn retain_marked(beats: Vec<String>, sigil: &str) -> Vec<String> {
    beats
        .into_iter()
        .filter(|beat| beat.contains(sigil))
        .collect()
}

fn parse_json_list(text: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(values) => Some(
            values
                .into_iter()
                .map(|value| match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanError {
    UnterminatedString,
    UnbalancedClose(usize),
    UnclosedBracket(usize),
}

/// Split the interior of a bracketed list on top-level commas.
///
/// A `"` toggles string state unless the element so far ends in a
/// backslash. Escapes are left in place.
fn scan_bracketed(interior: &str) -> Result<Vec<String>, ScanError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::Normal;
    let mut depth = 0usize;

    for (offset, c) in interior.char_indices() {
        match (state, c) {
            (ScanState::Normal, '"') => {
                if !current.ends_with('\\') {
                    state = ScanState::InString;
                }
                current.push(c);
            }
            (ScanState::InString, '"') => {
                if !current.ends_with('\\') {
                    state = ScanState::Normal;
                }
                current.push(c);
            }
            (ScanState::Normal, '[') => {
                depth += 1;
                current.push(c);
            }
            (ScanState::Normal, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(ScanError::UnbalancedClose(offset))?;
                current.push(c);
            }
            (ScanState::Normal, ',') if depth == 0 => {
                parts.push(std::mem::take(&mut current).trim().to_string());
            }
            _ => current.push(c),
        }
    }

    if state == ScanState::InString {
        return Err(ScanError::UnterminatedString);
    }
    if depth != 0 {
        return Err(ScanError::UnclosedBracket(depth));
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    Ok(parts.into_iter().map(strip_quotes).collect())
}

fn strip_quotes(part: String) -> String {
    if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
        part[1..part.len() - 1].to_string()
    } else {
        part
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split on `marker` and put the marker back in front of every section.
///
/// Blank fragments (including the empty one before a leading marker) are
/// dropped. Text before the first marker is kept as a section of its own, so
/// a window answer that did not open with the heading still becomes a beat.
fn split_sections(text: &str, marker: &str) -> Vec<String> {
    text.split(marker)
        .map(str::trim_end)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(|fragment| format!("{}{}", marker, fragment))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_keeps_nested_lists_whole() {
        let items = scan_bracketed(r#""a", ["b", "c"], "d""#).unwrap();
        assert_eq!(items, vec!["a", r#"["b", "c"]"#, "d"]);
    }

    #[test]
    fn test_scan_comma_inside_string() {
        let items = scan_bracketed(r##""# One, two", "# Three""##).unwrap();
        assert_eq!(items, vec!["# One, two", "# Three"]);
    }

    #[test]
    fn test_scan_escaped_quote_does_not_close_string() {
        let items = scan_bracketed(r##""# He said \"go, now\"", "# B""##).unwrap();
        assert_eq!(items, vec![r##"# He said \"go, now\""##, "# B"]);
    }

    #[test]
    fn test_scan_structural_errors() {
        assert_eq!(
            scan_bracketed(r#""open, "b""#),
            Err(ScanError::UnterminatedString)
        );
        assert_eq!(scan_bracketed("a ] b"), Err(ScanError::UnbalancedClose(2)));
        assert_eq!(scan_bracketed("[a, b"), Err(ScanError::UnclosedBracket(1)));
    }

    #[test]
    fn test_split_sections_keeps_leading_text() {
        let sections = split_sections("Preface\n## Conflict 1\none\n", "## Conflict");
        assert_eq!(sections, vec!["## ConflictPreface", "## Conflict 1\none"]);
    }

    #[test]
    fn test_strip_quotes_only_when_wrapped() {
        assert_eq!(strip_quotes("\"x\"".into()), "x");
        assert_eq!(strip_quotes("\"x".into()), "\"x");
        assert_eq!(strip_quotes("\"".into()), "\"");
    }
}
