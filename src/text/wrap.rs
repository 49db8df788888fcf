use textwrap::{Options, WrapAlgorithm};

/// Wraps `text` into display lines no wider than `width` columns.
///
/// Logical lines (explicit `\n`) wrap independently; an empty logical line
/// survives as an empty display line so paragraph breaks stay visible.
/// Whitespace runs collapse to a single space and words pack greedily onto
/// each line; a word wider than `width` is hard-broken at the boundary.
///
/// Width is measured in display columns, not bytes or chars, so wide glyphs
/// count double.
///
/// # Panics
/// Panics when `width` is zero.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    assert!(width >= 1, "wrap width must be at least 1");
    let mut out = Vec::new();
    for line in text.split('\n') {
        wrap_line_into(line, width, &mut out);
    }
    out
}

/// Wraps a single logical line. Same contract as [`wrap`].
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    assert!(width >= 1, "wrap width must be at least 1");
    let mut out = Vec::new();
    wrap_line_into(line, width, &mut out);
    out
}

fn wrap_line_into(line: &str, width: usize, out: &mut Vec<String>) {
    let collapsed = collapse_whitespace(line);
    if collapsed.is_empty() {
        out.push(String::new());
        return;
    }

    // FirstFit keeps the packing greedy and deterministic; the default
    // OptimalFit may move short words onto later lines depending on what
    // follows them, which would make re-wraps unstable.
    let options = Options::new(width).wrap_algorithm(WrapAlgorithm::FirstFit);
    for piece in textwrap::wrap(&collapsed, options) {
        out.push(piece.into_owned());
    }
}

pub(crate) fn collapse_whitespace(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for word in line.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{collapse_whitespace, wrap};
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn lines_never_exceed_width() {
        let text = "the quick brown fox jumps over the lazy dog";
        for width in 1..=20 {
            for line in wrap(text, width) {
                assert!(
                    UnicodeWidthStr::width(line.as_str()) <= width,
                    "line {line:?} wider than {width}"
                );
            }
        }
    }

    #[test]
    fn rejoining_reproduces_words_in_order() {
        let text = "alpha beta gamma delta epsilon";
        let rejoined = wrap(text, 9).join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn wrap_is_idempotent_under_rejoin() {
        let text = "one two   three\tfour five six seven";
        let first = wrap(text, 10);
        let second = wrap(&first.join(" "), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn consecutive_newlines_become_empty_lines() {
        assert_eq!(wrap("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap("\n", 10), vec!["", ""]);
    }

    #[test]
    fn overlong_word_is_hard_broken() {
        let lines = wrap("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn interior_whitespace_collapses_to_single_spaces() {
        assert_eq!(wrap("a   b\t c", 20), vec!["a b c"]);
    }

    #[test]
    fn leading_and_trailing_whitespace_is_trimmed() {
        assert_eq!(wrap("  hello world  ", 20), vec!["hello world"]);
    }

    #[test]
    #[should_panic(expected = "wrap width")]
    fn zero_width_is_a_programming_error() {
        wrap("anything", 0);
    }

    #[test]
    fn collapse_whitespace_keeps_word_content() {
        assert_eq!(collapse_whitespace(" a  b "), "a b");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
