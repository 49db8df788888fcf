//! Text layout and rendering core: word wrap, markdown styling, viewport
//! scrolling, and the editor buffer. Everything here is pure state — no
//! terminal, no storage.

pub mod editor;
pub mod style;
pub mod viewport;
pub mod wrap;

pub use editor::{ClosedEditor, Editor, EditorInput, EditorState};
pub use style::{stylize, DisplayLine, StyleSpan, StyleTag};
pub use viewport::Viewport;
pub use wrap::wrap;

use unicode_width::UnicodeWidthChar;

/// Renders a whole markdown document into display lines for `width` columns.
///
/// Fence lines (three backticks on their own) toggle code-block mode and are
/// not emitted. Lines inside a fence are kept verbatim, hard-chunked at the
/// width boundary and tagged [`StyleTag::CodeBlock`] with no inline scanning.
/// Everything else is word-wrapped and then stylized per wrapped line.
pub fn render(text: &str, width: usize) -> Vec<DisplayLine> {
    assert!(width >= 1, "render width must be at least 1");

    let mut out = Vec::new();
    let mut in_code_block = false;

    for line in text.split('\n') {
        if line.trim() == "```" {
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            for chunk in chunk_by_width(line, width) {
                let end = chunk.len();
                let spans = if end == 0 {
                    Vec::new()
                } else {
                    vec![StyleSpan {
                        start: 0,
                        end,
                        tag: StyleTag::CodeBlock,
                    }]
                };
                out.push(DisplayLine { text: chunk, spans });
            }
        } else {
            for piece in wrap::wrap_line(line, width) {
                out.push(stylize(&piece));
            }
        }
    }

    out
}

/// Splits a line into pieces of display width at most `width`, never inside
/// a character. Used for verbatim code lines where word-wrap would mangle
/// indentation.
fn chunk_by_width(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in line.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += w;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
