//! Rows of the build script's config error report

#[path = "../build/report.rs"]
mod report;

use report::{row, WIDTH};

fn text(row: &str) -> &str {
    row.trim_start_matches("║  ").trim_end_matches(" ║")
}

#[test]
fn test_short_line_is_padded() {
    let row = row("missing [console]");
    assert_eq!(text(&row).trim_end(), "missing [console]");
    assert_eq!(text(&row).chars().count(), WIDTH);
}

#[test]
fn test_long_line_is_cut_with_ellipsis() {
    let line = "x".repeat(100);
    let row = row(&line);
    assert_eq!(text(&row), format!("{}...", "x".repeat(WIDTH - 3)));
}

#[test]
fn test_multibyte_text_is_cut_on_char_boundary() {
    // 'é' is two bytes; byte 61 falls inside one.
    let line = "é".repeat(70);
    let row = row(&line);
    assert_eq!(text(&row), format!("{}...", "é".repeat(WIDTH - 3)));
}
