//! Front-end helpers that do not need a terminal.

use tootline::app::{validate_toot, CHAR_LIMIT};
use tootline::tui::strip_html;

#[test]
fn strip_html_removes_tags() {
    assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
}

#[test]
fn strip_html_handles_empty() {
    assert_eq!(strip_html(""), "");
}

#[test]
fn strip_html_decodes_entities() {
    assert_eq!(strip_html("<p>fish &amp; chips &lt;3</p>"), "fish & chips <3");
}

#[test]
fn toots_are_limited_to_500_characters() {
    assert_eq!(CHAR_LIMIT, 500);
    assert!(validate_toot(&"x".repeat(CHAR_LIMIT)).is_ok());
    assert!(validate_toot(&"x".repeat(CHAR_LIMIT + 1)).is_err());
    assert!(validate_toot("").is_err());
}
