//! Multi-line text editor state machine for the entry composer.
//!
//! The buffer is a list of logical (unwrapped) lines plus a cursor given as
//! (line index, character column). Wrapped display rows and the display
//! cursor are derived on demand from the logical state, never stored, so the
//! rendered view can not drift out of sync with the buffer.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::text::style::DisplayLine;
use crate::text::wrap::{collapse_whitespace, wrap_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Editing,
    Committed,
    Cancelled,
}

/// Edit-time input events. Commit and cancel are separate transitions on
/// [`Editor`] because they close the editor rather than mutate the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorInput {
    Char(char),
    Newline,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Input arrived after the editor reached a terminal state. The buffer is
/// untouched; the caller misused the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedEditor;

impl Display for ClosedEditor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "editor already committed or cancelled")
    }
}

impl Error for ClosedEditor {}

pub struct Editor {
    lines: Vec<String>,
    /// (line index, column in chars); both clamped on every edit.
    cursor: (usize, usize),
    state: EditorState,
    dirty: bool,
}

impl Editor {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(String::from).collect(),
            cursor: (0, 0),
            state: EditorState::Editing,
            dirty: false,
        }
    }

    /// Reopens a buffer that already holds user edits, e.g. after a rejected
    /// commit. Starts `Editing` with the dirty flag set for non-empty text so
    /// cancelling still asks for confirmation.
    pub fn from_unsaved(text: &str) -> Self {
        let mut editor = Self::from_text(text);
        editor.dirty = !text.is_empty();
        editor
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The buffer as newline-joined logical lines.
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// Applies one edit or cursor motion. Rejected without side effects once
    /// the editor has committed or cancelled.
    pub fn handle(&mut self, input: EditorInput) -> Result<(), ClosedEditor> {
        if self.state != EditorState::Editing {
            return Err(ClosedEditor);
        }

        let (line, col) = self.cursor;
        match input {
            EditorInput::Char(c) => {
                let at = byte_index(&self.lines[line], col);
                self.lines[line].insert(at, c);
                self.cursor = (line, col + 1);
                self.dirty = true;
            }
            EditorInput::Newline => {
                let at = byte_index(&self.lines[line], col);
                let tail = self.lines[line].split_off(at);
                self.lines.insert(line + 1, tail);
                self.cursor = (line + 1, 0);
                self.dirty = true;
            }
            EditorInput::Backspace => {
                if col > 0 {
                    let at = byte_index(&self.lines[line], col - 1);
                    self.lines[line].remove(at);
                    self.cursor = (line, col - 1);
                    self.dirty = true;
                } else if line > 0 {
                    let removed = self.lines.remove(line);
                    let join_col = char_len(&self.lines[line - 1]);
                    self.lines[line - 1].push_str(&removed);
                    self.cursor = (line - 1, join_col);
                    self.dirty = true;
                }
            }
            EditorInput::Left => {
                if col > 0 {
                    self.cursor = (line, col - 1);
                } else if line > 0 {
                    self.cursor = (line - 1, char_len(&self.lines[line - 1]));
                }
            }
            EditorInput::Right => {
                if col < char_len(&self.lines[line]) {
                    self.cursor = (line, col + 1);
                } else if line + 1 < self.lines.len() {
                    self.cursor = (line + 1, 0);
                }
            }
            EditorInput::Up => {
                if line > 0 {
                    self.cursor = (line - 1, col.min(char_len(&self.lines[line - 1])));
                }
            }
            EditorInput::Down => {
                if line + 1 < self.lines.len() {
                    self.cursor = (line + 1, col.min(char_len(&self.lines[line + 1])));
                }
            }
            EditorInput::Home => {
                self.cursor = (line, 0);
            }
            EditorInput::End => {
                self.cursor = (line, char_len(&self.lines[line]));
            }
        }

        Ok(())
    }

    /// Closes the editor and hands the buffer back to the caller.
    pub fn commit(&mut self) -> Result<String, ClosedEditor> {
        if self.state != EditorState::Editing {
            return Err(ClosedEditor);
        }
        self.state = EditorState::Committed;
        Ok(self.contents())
    }

    /// Closes the editor and discards the buffer.
    pub fn cancel(&mut self) -> Result<(), ClosedEditor> {
        if self.state != EditorState::Editing {
            return Err(ClosedEditor);
        }
        self.state = EditorState::Cancelled;
        Ok(())
    }

    /// Recomputes the wrapped display rows for `width` columns and the
    /// derived display position of the cursor.
    ///
    /// The composer shows raw text; markdown styling is applied by the view
    /// screen where there is no cursor to keep aligned.
    pub fn display(&self, width: usize) -> (Vec<DisplayLine>, (usize, usize)) {
        let mut rows = Vec::new();
        let mut cursor_pos = (0, 0);

        for (idx, line) in self.lines.iter().enumerate() {
            let pieces = wrap_line(line, width);
            if idx == self.cursor.0 {
                let (row, col) = place_cursor(line, self.cursor.1, &pieces);
                cursor_pos = (rows.len() + row, col);
            }
            for piece in pieces {
                rows.push(DisplayLine::plain(piece));
            }
        }

        (rows, cursor_pos)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Maps a logical column onto the wrapped pieces of its line. The wrapper
/// collapses whitespace runs, so the column is first translated into the
/// collapsed text before walking the pieces.
fn place_cursor(line: &str, col: usize, pieces: &[String]) -> (usize, usize) {
    let target = collapsed_prefix_len(line, col);
    let collapsed: Vec<char> = collapse_whitespace(line).chars().collect();
    let mut consumed = 0;

    for (row, piece) in pieces.iter().enumerate() {
        let len = char_len(piece);
        if target <= consumed + len {
            return (row, target - consumed);
        }
        consumed += len;
        // A word-boundary break eats the joining space; a hard break inside
        // an overlong word does not.
        if collapsed.get(consumed) == Some(&' ') {
            consumed += 1;
        }
    }

    let last = pieces.len().saturating_sub(1);
    (last, pieces.last().map(|p| char_len(p)).unwrap_or(0))
}

fn collapsed_prefix_len(line: &str, col: usize) -> usize {
    let mut count = 0;
    let mut pending_space = false;
    for ch in line.chars().take(col) {
        if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && count > 0 {
                count += 1;
            }
            pending_space = false;
            count += 1;
        }
    }
    if pending_space && count > 0 {
        count + 1
    } else {
        count
    }
}
