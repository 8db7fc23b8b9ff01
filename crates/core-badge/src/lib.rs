//! Badge codec: creates and parses the in-band markers that stand in for
//! bulky content (file paths, multi-line pastes) inside buffer text.
//!
//! A marker is a short run of Unicode scalar values wrapped in glyphs chosen
//! because they are single display cells, vanishingly unlikely in real
//! input, and visually signal a non-text span:
//!
//! - file marker:  `«path»`                         (U+00AB / U+00BB)
//! - paste marker: `‹PASTE:N›payload‹/PASTE›`        (U+2039 / U+203A),
//!   with embedded newlines encoded as `⏎` (U+23CE)
//!
//! All positions in this module are Unicode scalar (char) indices, matching
//! the column convention used by the edit buffer.

use core_errors::EngineError;

pub const FILE_OPEN: char = '\u{00AB}';
pub const FILE_CLOSE: char = '\u{00BB}';
pub const PASTE_OPEN: char = '\u{2039}';
pub const PASTE_CLOSE: char = '\u{203A}';
pub const PASTE_NL: char = '\u{23CE}';
const PASTE_TAG: &str = "PASTE:";
const PASTE_END_TAG: &str = "/PASTE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    File,
    Paste,
}

/// A located marker: `[start, end)` are char-index bounds into the scanned string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub start: usize,
    pub end: usize,
    pub kind: MarkerKind,
}

/// Build a file marker. Rejects paths containing either marker glyph or a newline,
/// since those would make the encoding ambiguous to re-parse.
pub fn create_file_marker(path: &str) -> Result<String, EngineError> {
    if path.contains(FILE_OPEN) || path.contains(FILE_CLOSE) || path.contains('\n') {
        return Err(EngineError::MarkerCollision(format!(
            "file path contains a marker glyph or newline: {path:?}"
        )));
    }
    Ok(format!("{FILE_OPEN}{path}{FILE_CLOSE}"))
}

/// Build a paste marker. Newlines in `content` are encoded as `⏎`. The
/// declared line count is `1 + count('\n', content)`. Rejects content
/// containing either paste glyph, which would make the payload ambiguous.
pub fn create_paste_marker(content: &str) -> Result<String, EngineError> {
    if content.contains(PASTE_OPEN) || content.contains(PASTE_CLOSE) {
        return Err(EngineError::MarkerCollision(
            "paste content contains a marker glyph".to_string(),
        ));
    }
    let line_count = 1 + content.matches('\n').count();
    let payload = content.replace('\n', &PASTE_NL.to_string());
    Ok(format!(
        "{PASTE_OPEN}{PASTE_TAG}{line_count}{PASTE_CLOSE}{payload}{PASTE_OPEN}{PASTE_END_TAG}{PASTE_CLOSE}"
    ))
}

/// Scan `s` left to right for non-overlapping markers. Unmatched openers
/// (no corresponding closer) are left as ordinary text.
pub fn find_markers(s: &str) -> Vec<Marker> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] == FILE_OPEN {
            if let Some(close) = find_char(&chars, i + 1, FILE_CLOSE) {
                out.push(Marker {
                    start: i,
                    end: close + 1,
                    kind: MarkerKind::File,
                });
                i = close + 1;
                continue;
            }
        } else if chars[i] == PASTE_OPEN {
            if let Some(end) = try_parse_paste(&chars, i) {
                out.push(Marker {
                    start: i,
                    end,
                    kind: MarkerKind::Paste,
                });
                i = end;
                continue;
            }
        }
        i += 1;
    }
    out
}

fn find_char(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars[from..].iter().position(|&c| c == target).map(|p| p + from)
}

fn matches_at(chars: &[char], pos: usize, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    if pos + needle.len() > chars.len() {
        return false;
    }
    chars[pos..pos + needle.len()] == needle[..]
}

/// Attempt to parse a complete paste marker starting at `open` (index of `PASTE_OPEN`).
/// Returns the exclusive end index on success.
fn try_parse_paste(chars: &[char], open: usize) -> Option<usize> {
    let tag_start = open + 1;
    if !matches_at(chars, tag_start, PASTE_TAG) {
        return None;
    }
    let digits_start = tag_start + PASTE_TAG.chars().count();
    let mut j = digits_start;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    if j == digits_start {
        return None; // no digits => not a valid header
    }
    if j >= chars.len() || chars[j] != PASTE_CLOSE {
        return None;
    }
    let payload_start = j + 1;
    // scan for the closing "‹/PASTE›" sequence
    let mut k = payload_start;
    while k < chars.len() {
        if chars[k] == PASTE_OPEN && matches_at(chars, k + 1, PASTE_END_TAG) {
            let after_tag = k + 1 + PASTE_END_TAG.chars().count();
            if after_tag < chars.len() && chars[after_tag] == PASTE_CLOSE {
                return Some(after_tag + 1);
            }
        }
        k += 1;
    }
    None
}

/// Replace every marker with its compact display label; non-marker text passes through.
pub fn render_for_display(s: &str) -> String {
    transform(s, |kind, inner| match kind {
        MarkerKind::File => format!("[ {} ]", basename(inner)),
        MarkerKind::Paste => {
            let n = paste_line_count(inner).unwrap_or(1);
            format!("[ Pasted {n} Lines ]")
        }
    })
}

/// Replace every marker with its original payload (inverse of the constructors).
pub fn expand_markers(s: &str) -> String {
    transform(s, |kind, inner| match kind {
        MarkerKind::File => inner.to_string(),
        MarkerKind::Paste => paste_payload(inner).replace(PASTE_NL, "\n"),
    })
}

/// Return the marker whose half-open span contains `col`, if any.
pub fn get_marker_at_position(s: &str, col: usize) -> Option<Marker> {
    find_markers(s)
        .into_iter()
        .find(|m| col >= m.start && col < m.end)
}

fn transform(s: &str, render: impl Fn(MarkerKind, &str) -> String) -> String {
    let chars: Vec<char> = s.chars().collect();
    let markers = find_markers(s);
    let mut out = String::new();
    let mut cursor = 0usize;
    for m in markers {
        out.extend(chars[cursor..m.start].iter());
        let inner = inner_slice(&chars, &m);
        out.push_str(&render(m.kind, &inner));
        cursor = m.end;
    }
    out.extend(chars[cursor..].iter());
    out
}

/// The raw text between a marker's delimiters (header excluded for paste markers).
fn inner_slice(chars: &[char], m: &Marker) -> String {
    match m.kind {
        MarkerKind::File => chars[m.start + 1..m.end - 1].iter().collect(),
        MarkerKind::Paste => chars[m.start..m.end].iter().collect(),
    }
}

fn paste_payload(marker_text: &str) -> String {
    let chars: Vec<char> = marker_text.chars().collect();
    // marker_text is the full `‹PASTE:N›payload‹/PASTE›` span.
    let close = find_char(&chars, 0, PASTE_CLOSE).unwrap_or(0);
    let payload_start = close + 1;
    let end_open = {
        let mut k = payload_start;
        loop {
            if k >= chars.len() {
                break chars.len();
            }
            if chars[k] == PASTE_OPEN && matches_at(&chars, k + 1, PASTE_END_TAG) {
                break k;
            }
            k += 1;
        }
    };
    chars[payload_start..end_open].iter().collect()
}

fn paste_line_count(marker_text: &str) -> Option<usize> {
    let chars: Vec<char> = marker_text.chars().collect();
    let digits_start = 1 + PASTE_TAG.chars().count();
    let mut j = digits_start;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    chars[digits_start..j].iter().collect::<String>().parse().ok()
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
