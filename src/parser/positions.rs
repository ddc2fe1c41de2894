//! Position conversion utilities.
//!
//! Tokens and errors track character offsets into the source (not byte
//! offsets). Diagnostics need a line and a column, so this module converts
//! between the two when an error is rendered.

/// Location of a character offset in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Character offset in source
    pub offset: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

/// Convert a character offset to a line/column position.
///
/// Offsets past the end of the source are clamped to the end.
pub fn position_at(source: &str, offset: usize) -> Position {
    let mut line = 0;
    let mut col = 0;
    let mut seen = 0;

    for ch in source.chars() {
        if seen == offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
        seen += 1;
    }

    Position { offset: seen, line, col }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let pos = position_at("div: content:{x};", 5);
        assert_eq!((pos.line, pos.col), (0, 5));
    }

    #[test]
    fn test_after_newline() {
        let source = "div:\n  span:;\n;";
        let pos = position_at(source, 7);
        assert_eq!((pos.line, pos.col), (1, 2));
    }

    #[test]
    fn test_multibyte_counts_chars() {
        // é is 2 bytes but one character
        let source = "café:;";
        assert_eq!(position_at(source, 4).col, 4);
        assert_eq!(position_at(source, 6).offset, 6);
    }

    #[test]
    fn test_out_of_bounds() {
        let pos = position_at("div", 100);
        assert_eq!(pos.offset, 3);
        assert_eq!(pos.col, 3);
    }
}
