use std::collections::BTreeSet;

/// A persisted journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Lowercase, deduplicated (see [`normalize_tags`]).
    pub tags: Vec<String>,
    /// `YYYY-MM-DD HH:MM:SS`, local time.
    pub created_at: String,
}

/// Unsaved entry data as produced by the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// List-screen projection of an entry; the content stays in the database
/// until the entry is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

/// Discrete input events delivered by the screen controller. A closed set so
/// every screen matches exhaustively and a new binding is a compile-time
/// checked addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Backspace,
    Tab,
    Escape,
    NewEntry,
    EditEntry,
    DeleteEntry,
    Search,
    Filter,
    Export,
    ToggleTheme,
    Commit,
    Help,
    Quit,
}

/// Normalizes one tag: trimmed and lowercased, `None` when empty.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates a tag set, sorted by name.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag.as_ref()) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

/// Splits a comma-separated tags field into a normalized tag set.
pub fn parse_tag_field(field: &str) -> Vec<String> {
    normalize_tags(field.split(','))
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags, parse_tag_field};

    #[test]
    fn tags_are_lowercased_and_deduplicated() {
        let tags = normalize_tags(["Work", "work", " WORK ", "life"]);
        assert_eq!(tags, ["life", "work"]);
    }

    #[test]
    fn empty_tags_are_dropped() {
        assert_eq!(normalize_tag("   "), None);
        assert_eq!(normalize_tags(["", "  ", "a"]), ["a"]);
    }

    #[test]
    fn tag_field_splits_on_commas() {
        assert_eq!(parse_tag_field("Rust, tui,  rust ,"), ["rust", "tui"]);
        assert!(parse_tag_field("").is_empty());
    }
}
