//! Minimal markdown-to-styled-text rendering.
//!
//! One display line in, one [`DisplayLine`] out: a text run with ordered,
//! non-overlapping style spans. Only a small markdown subset is recognized
//! (headers, list markers, bold/italic/inline-code, fenced code handled by
//! the document renderer); anything malformed degrades to literal text.

/// Rendering style for one span of a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
    Header1,
    Header2,
    Header3,
    Bold,
    Italic,
    InlineCode,
    CodeBlock,
    ListBullet,
    Plain,
}

/// A contiguous styled run. Offsets are byte positions into the owning
/// [`DisplayLine::text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSpan {
    pub start: usize,
    pub end: usize,
    pub tag: StyleTag,
}

/// One rendered row of text. Regenerated from scratch on every wrap or
/// restyle pass; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayLine {
    pub text: String,
    pub spans: Vec<StyleSpan>,
}

impl DisplayLine {
    /// A line with no markdown styling at all.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let spans = if text.is_empty() {
            Vec::new()
        } else {
            vec![StyleSpan {
                start: 0,
                end: text.len(),
                tag: StyleTag::Plain,
            }]
        };
        Self { text, spans }
    }

    pub fn span_text(&self, span: &StyleSpan) -> &str {
        &self.text[span.start..span.end]
    }
}

const BULLET: &str = "\u{2022} ";

/// Converts one display line of markdown into styled text.
///
/// Line-prefix rules are mutually exclusive and checked in priority order:
/// header, then list marker, then plain inline scanning. Markers are
/// stripped from the displayed text. Never fails: unmatched inline markers
/// render as literal characters.
pub fn stylize(line: &str) -> DisplayLine {
    if line.is_empty() {
        return DisplayLine::default();
    }

    if let Some((level, rest)) = header_prefix(line) {
        let tag = match level {
            1 => StyleTag::Header1,
            2 => StyleTag::Header2,
            _ => StyleTag::Header3,
        };
        let mut out = DisplayLine {
            text: rest.to_string(),
            spans: Vec::new(),
        };
        if !out.text.is_empty() {
            out.spans.push(StyleSpan {
                start: 0,
                end: out.text.len(),
                tag,
            });
        }
        return out;
    }

    if let Some(rest) = list_item_text(line) {
        let mut out = DisplayLine {
            text: BULLET.to_string(),
            spans: vec![StyleSpan {
                start: 0,
                end: BULLET.len(),
                tag: StyleTag::ListBullet,
            }],
        };
        scan_inline(rest, &mut out);
        return out;
    }

    let mut out = DisplayLine::default();
    scan_inline(line, &mut out);
    out
}

/// `# `..`### ` prefix; four or more hashes are not a header.
fn header_prefix(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=3).contains(&hashes) && line[hashes..].starts_with(' ') {
        Some((hashes, &line[hashes + 1..]))
    } else {
        None
    }
}

/// `- `, `* `, or `<digits>.`/`<digits>)` followed by a space.
fn list_item_text(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ") {
        return Some(rest);
    }
    if let Some(rest) = line.strip_prefix("* ") {
        return Some(rest);
    }

    let bytes = line.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || digits + 1 >= bytes.len() {
        return None;
    }
    let punct = bytes[digits];
    if (punct == b'.' || punct == b')') && bytes[digits + 1] == b' ' {
        Some(&line[digits + 2..])
    } else {
        None
    }
}

/// Left-to-right inline scan: `**bold**`, `*italic*`/`_italic_`, `` `code` ``.
/// Non-overlapping, first match wins at each position, bold wins over italic
/// when the markers are adjacent. Unterminated markers stay literal.
fn scan_inline(input: &str, out: &mut DisplayLine) {
    let mut plain_start = out.text.len();
    let mut i = 0;

    while i < input.len() {
        let rest = &input[i..];

        if rest.starts_with("**") {
            if let Some((inner, consumed)) = match_delimited(rest, "**") {
                flush_plain(out, &mut plain_start);
                push_styled(out, inner, StyleTag::Bold);
                plain_start = out.text.len();
                i += consumed;
            } else {
                // Unterminated bold marker: keep it literal and move on so a
                // later single `*` cannot steal half of it.
                out.text.push_str("**");
                i += 2;
            }
            continue;
        }

        let styled = match_delimited(rest, "*")
            .or_else(|| match_delimited(rest, "_"))
            .map(|hit| (hit, StyleTag::Italic))
            .or_else(|| match_delimited(rest, "`").map(|hit| (hit, StyleTag::InlineCode)));

        if let Some(((inner, consumed), tag)) = styled {
            flush_plain(out, &mut plain_start);
            push_styled(out, inner, tag);
            plain_start = out.text.len();
            i += consumed;
            continue;
        }

        let ch = rest.chars().next().expect("non-empty remainder");
        out.text.push(ch);
        i += ch.len_utf8();
    }

    flush_plain(out, &mut plain_start);
}

/// Matches `<delim>text<delim>` at the start of `rest` with non-empty text.
/// Returns the inner text and the total bytes consumed.
fn match_delimited<'a>(rest: &'a str, delim: &str) -> Option<(&'a str, usize)> {
    let body = rest.strip_prefix(delim)?;
    let close = body.find(delim)?;
    if close == 0 {
        return None;
    }
    Some((&body[..close], delim.len() + close + delim.len()))
}

fn flush_plain(out: &mut DisplayLine, plain_start: &mut usize) {
    if out.text.len() > *plain_start {
        out.spans.push(StyleSpan {
            start: *plain_start,
            end: out.text.len(),
            tag: StyleTag::Plain,
        });
    }
    *plain_start = out.text.len();
}

fn push_styled(out: &mut DisplayLine, inner: &str, tag: StyleTag) {
    let start = out.text.len();
    out.text.push_str(inner);
    out.spans.push(StyleSpan {
        start,
        end: out.text.len(),
        tag,
    });
}

#[cfg(test)]
mod tests {
    use super::{stylize, StyleTag};

    fn spans_of(line: &str) -> Vec<(String, StyleTag)> {
        let dl = stylize(line);
        dl.spans
            .iter()
            .map(|s| (dl.span_text(s).to_string(), s.tag))
            .collect()
    }

    #[test]
    fn header_strips_markers_and_tags_whole_line() {
        let dl = stylize("# Hello");
        assert_eq!(dl.text, "Hello");
        assert_eq!(spans_of("# Hello"), vec![("Hello".into(), StyleTag::Header1)]);
        assert_eq!(spans_of("## Two"), vec![("Two".into(), StyleTag::Header2)]);
        assert_eq!(spans_of("### Three"), vec![("Three".into(), StyleTag::Header3)]);
    }

    #[test]
    fn four_hashes_is_not_a_header() {
        assert_eq!(stylize("#### nope").text, "#### nope");
        assert_eq!(spans_of("#### nope"), vec![("#### nope".into(), StyleTag::Plain)]);
    }

    #[test]
    fn hash_without_space_is_literal() {
        assert_eq!(spans_of("#tag"), vec![("#tag".into(), StyleTag::Plain)]);
    }

    #[test]
    fn bold_and_italic_split_into_ordered_spans() {
        assert_eq!(
            spans_of("**bold** and *italic*"),
            vec![
                ("bold".into(), StyleTag::Bold),
                (" and ".into(), StyleTag::Plain),
                ("italic".into(), StyleTag::Italic),
            ]
        );
    }

    #[test]
    fn underscore_italic_matches() {
        assert_eq!(
            spans_of("_soft_ voice"),
            vec![
                ("soft".into(), StyleTag::Italic),
                (" voice".into(), StyleTag::Plain),
            ]
        );
    }

    #[test]
    fn inline_code_strips_backticks() {
        assert_eq!(spans_of("`code`"), vec![("code".into(), StyleTag::InlineCode)]);
    }

    #[test]
    fn unterminated_backtick_falls_back_to_literal() {
        assert_eq!(
            spans_of("`unterminated"),
            vec![("`unterminated".into(), StyleTag::Plain)]
        );
    }

    #[test]
    fn unterminated_bold_marker_stays_literal() {
        assert_eq!(
            spans_of("**oops and *fine*"),
            vec![
                ("**oops and ".into(), StyleTag::Plain),
                ("fine".into(), StyleTag::Italic),
            ]
        );
    }

    #[test]
    fn empty_marker_pair_is_literal() {
        assert_eq!(spans_of("a ** b"), vec![("a ** b".into(), StyleTag::Plain)]);
        assert_eq!(spans_of("``"), vec![("``".into(), StyleTag::Plain)]);
    }

    #[test]
    fn list_marker_becomes_bullet_glyph() {
        let dl = stylize("- item");
        assert_eq!(dl.text, "\u{2022} item");
        assert_eq!(dl.spans[0].tag, StyleTag::ListBullet);
        assert_eq!(dl.span_text(&dl.spans[0]), "\u{2022} ");
        assert_eq!(dl.span_text(&dl.spans[1]), "item");
    }

    #[test]
    fn star_and_ordered_list_markers_match() {
        assert_eq!(stylize("* item").spans[0].tag, StyleTag::ListBullet);
        assert_eq!(stylize("3. item").spans[0].tag, StyleTag::ListBullet);
        assert_eq!(stylize("12) item").spans[0].tag, StyleTag::ListBullet);
    }

    #[test]
    fn list_item_scans_inline_styles_after_marker() {
        assert_eq!(
            spans_of("- has **bold** inside"),
            vec![
                ("\u{2022} ".into(), StyleTag::ListBullet),
                ("has ".into(), StyleTag::Plain),
                ("bold".into(), StyleTag::Bold),
                (" inside".into(), StyleTag::Plain),
            ]
        );
    }

    #[test]
    fn empty_line_yields_empty_display_line() {
        let dl = stylize("");
        assert_eq!(dl.text, "");
        assert!(dl.spans.is_empty());
    }

    #[test]
    fn bold_wins_over_italic_on_adjacent_markers() {
        // `**` is always tried before `*`, so a doubled marker can never be
        // consumed as two italics.
        assert_eq!(
            spans_of("**x** *y*"),
            vec![
                ("x".into(), StyleTag::Bold),
                (" ".into(), StyleTag::Plain),
                ("y".into(), StyleTag::Italic),
            ]
        );
    }
}
