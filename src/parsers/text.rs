/// Appended to any text cut by [`truncate`]
pub const TRUNCATION_MARKER: &str = "\n\n[... content truncated ...]";

/// Trims every line, drops blank lines and suppresses a line equal to the
/// line emitted just before it.
///
/// Only adjacent repeats are removed; the same line further down survives.
pub fn collapse_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if lines.last() != Some(&line) {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Bounds `text` to `max_chars` characters (plus the marker).
///
/// When a newline falls within the last tenth of the window the cut moves
/// back to it so lines are not split mid-sentence.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let window = &text[..cut];
    let mut end = cut;
    if let Some(newline) = window.rfind('\n') {
        let newline_chars = window[..newline].chars().count();
        if newline_chars * 10 > max_chars * 9 {
            end = newline;
        }
    }

    let mut truncated = String::with_capacity(end + TRUNCATION_MARKER.len());
    truncated.push_str(&text[..end]);
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
