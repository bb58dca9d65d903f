//! Terminal display width measurement.
//!
//! Measures how many terminal columns a text fragment occupies when rendered
//! in a monospaced context. This is not a character or byte count: wide
//! glyphs (CJK ideographs, fullwidth forms) occupy two columns, while
//! combining marks, zero-width code points, and control characters occupy
//! none. Used for column alignment in tabular output and for sizing
//! underline rules.

use unicode_width::UnicodeWidthChar;

/// Display width of a single code point in terminal columns.
///
/// Control characters and zero-width code points (ZWSP, ZWJ/ZWNJ, BOM,
/// combining marks) measure 0; wide glyphs measure 2; everything else 1.
///
/// # Example
///
/// ```
/// use markweave_width::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('常'), 2);
/// assert_eq!(char_width('\u{200B}'), 0);
/// ```
#[must_use]
pub fn char_width(c: char) -> usize {
    if is_zero_width(c) {
        return 0;
    }
    c.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
///
/// Sums [`char_width`] over the string's code points. Embedded line breaks
/// are not given special treatment; callers measuring multi-line content
/// should measure each line separately.
///
/// # Example
///
/// ```
/// use markweave_width::str_width;
///
/// assert_eq!(str_width("abcd"), 4);
/// assert_eq!(str_width("常用漢字"), 8);
/// ```
#[must_use]
pub fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Code points that render to nothing regardless of what the width tables
/// say for them.
fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' // ZWSP, ZWNJ, ZWJ, directional marks
            | '\u{FEFF}' // BOM / zero-width no-break space
            | '\u{2060}' // word joiner
    ) || c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_width() {
        let cases: &[(&str, &str, usize)] = &[
            ("empty", "", 0),
            ("zero-width", "\u{200B}", 0),
            ("single latin", "a", 1),
            ("single wide", "常", 2),
            ("multiple latin", "abcd", 4),
            ("multiple wide", "常用漢字", 8),
            ("mixed", "a常b", 4),
            ("combining mark", "e\u{0301}", 1),
        ];
        for (name, arg, want) in cases {
            assert_eq!(str_width(arg), *want, "case {name}");
        }
    }

    #[test]
    fn test_control_chars_are_zero() {
        assert_eq!(char_width('\t'), 0);
        assert_eq!(char_width('\n'), 0);
        assert_eq!(str_width("a\tb"), 2);
    }

    #[test]
    fn test_bom_is_zero() {
        assert_eq!(char_width('\u{FEFF}'), 0);
    }
}
