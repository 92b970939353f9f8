//! Boxed error report rows for the build script

/// Text columns inside the report box
pub const WIDTH: usize = 64;

/// One report row, cut to fit the box
///
/// Counts characters, not bytes, so config values with non-ASCII text are
/// never split inside a character.
pub fn row(line: &str) -> String {
    let fitted = if line.chars().count() > WIDTH {
        let mut cut: String = line.chars().take(WIDTH - 3).collect();
        cut.push_str("...");
        cut
    } else {
        line.to_owned()
    };
    format!("║  {:<64} ║", fitted)
}
