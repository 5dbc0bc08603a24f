pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

pub use html::{clean, extract_links};
pub use text::{TRUNCATION_MARKER, collapse_lines, truncate};

/// Cleans `html` and bounds the resulting text to `max_chars`
pub fn clean_and_truncate(html: &str, max_chars: usize) -> String {
    truncate(&clean(html), max_chars)
}
