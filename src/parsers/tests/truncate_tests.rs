use crate::parsers::{truncate, TRUNCATION_MARKER};

#[test]
fn test_short_text_is_unchanged() {
    assert_eq!(truncate("hello", 100), "hello");
    assert_eq!(truncate("", 10), "");

    let exact = "x".repeat(100);
    assert_eq!(truncate(&exact, 100), exact);
}

#[test]
fn test_backtracks_to_newline_in_last_tenth() {
    // 150 characters with a newline at position 95
    let text = format!("{}\n{}", "a".repeat(95), "b".repeat(54));
    assert_eq!(text.chars().count(), 150);

    let result = truncate(&text, 100);
    assert_eq!(result, format!("{}{}", "a".repeat(95), TRUNCATION_MARKER));
    assert!(result.chars().count() <= 100 + TRUNCATION_MARKER.chars().count());
}

#[test]
fn test_ignores_newline_before_last_tenth() {
    let text = format!("{}\n{}", "a".repeat(50), "b".repeat(99));
    let result = truncate(&text, 100);

    let expected_body: String = text.chars().take(100).collect();
    assert_eq!(result, format!("{}{}", expected_body, TRUNCATION_MARKER));
}

#[test]
fn test_newline_exactly_at_ninety_percent_is_not_used() {
    let text = format!("{}\n{}", "a".repeat(90), "b".repeat(59));
    let result = truncate(&text, 100);
    assert!(result.starts_with(&format!("{}\nbbbbbbbbb", "a".repeat(90))));
}

#[test]
fn test_counts_characters_not_bytes() {
    let text = "ñ".repeat(20);
    let result = truncate(&text, 10);
    assert_eq!(result, format!("{}{}", "ñ".repeat(10), TRUNCATION_MARKER));
}
