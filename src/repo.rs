//! Entry persistence over a local SQLite database.
//!
//! The repository owns all SQL. Tag sets are replaced atomically in a single
//! transaction on every save, and tag names are normalized to lowercase
//! before they reach the database. Failures surface as distinct
//! [`RepoError`] variants; the repository never retries.

use crate::models::{normalize_tags, Entry, EntryDraft, EntrySummary};
use chrono::Local;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    NotFound(i64),
    Validation(String),
    Db(rusqlite::Error),
    Io(std::io::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::Validation(message) => write!(f, "invalid entry: {message}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NotFound(_) | Self::Validation(_) => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Optional constraints for list/count queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Exact tag match, lowercased.
    pub tag: Option<String>,
    /// Case-insensitive substring match over title and content.
    pub query: Option<String>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.query.is_none()
    }
}

/// Persistence contract consumed by the screen controller. The controller
/// only ever reads title/content for rendering and writes back the committed
/// composer buffer plus a tag set.
pub trait EntryRepository {
    fn load(&self, id: i64) -> RepoResult<Entry>;
    fn list(&self, page: usize, page_size: usize, filter: &ListFilter)
        -> RepoResult<Vec<EntrySummary>>;
    fn count(&self, filter: &ListFilter) -> RepoResult<usize>;
    fn save(&mut self, draft: &EntryDraft) -> RepoResult<i64>;
    fn update(&mut self, entry: &Entry) -> RepoResult<()>;
    fn delete(&mut self, id: i64) -> RepoResult<()>;
    /// All known tags with their usage counts, sorted by name.
    fn all_tags(&self) -> RepoResult<Vec<(String, usize)>>;
    /// Writes the entry as a markdown file.
    fn export(&self, id: i64, path: &Path) -> RepoResult<()>;
}

/// SQLite-backed repository.
pub struct SqliteEntryRepository {
    conn: Connection,
}

impl SqliteEntryRepository {
    pub fn open(path: &Path) -> RepoResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let repo = Self::from_connection(conn)?;
        debug!("opened journal database at {}", path.display());
        Ok(repo)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> RepoResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS entry_tags (
                entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id),
                PRIMARY KEY (entry_id, tag_id)
            );",
        )?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository {
    fn load(&self, id: i64) -> RepoResult<Entry> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, content, created_at FROM entries WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, title, content, created_at)) = row else {
            return Err(RepoError::NotFound(id));
        };

        Ok(Entry {
            id,
            title,
            content,
            tags: load_tags_for_entry(&self.conn, id)?,
            created_at,
        })
    }

    fn list(
        &self,
        page: usize,
        page_size: usize,
        filter: &ListFilter,
    ) -> RepoResult<Vec<EntrySummary>> {
        let mut sql = String::from(
            "SELECT id, title, created_at FROM entries WHERE 1 = 1",
        );
        let mut binds: Vec<Value> = Vec::new();
        push_filter_clauses(&mut sql, &mut binds, filter);

        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        binds.push(Value::Integer(page_size as i64));
        binds.push(Value::Integer((page * page_size) as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            summaries.push(EntrySummary {
                id,
                title: row.get(1)?,
                tags: load_tags_for_entry(&self.conn, id)?,
                created_at: row.get(2)?,
            });
        }
        Ok(summaries)
    }

    fn count(&self, filter: &ListFilter) -> RepoResult<usize> {
        let mut sql = String::from("SELECT COUNT(*) FROM entries WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();
        push_filter_clauses(&mut sql, &mut binds, filter);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        Ok(count as usize)
    }

    fn save(&mut self, draft: &EntryDraft) -> RepoResult<i64> {
        validate_title(&draft.title)?;

        let created_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO entries (created_at, title, content) VALUES (?1, ?2, ?3);",
            params![created_at, draft.title.trim(), draft.content],
        )?;
        let id = tx.last_insert_rowid();
        replace_tags(&tx, id, &draft.tags)?;
        tx.commit()?;

        debug!("saved entry {id}");
        Ok(id)
    }

    fn update(&mut self, entry: &Entry) -> RepoResult<()> {
        validate_title(&entry.title)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE entries SET title = ?2, content = ?3 WHERE id = ?1;",
            params![entry.id, entry.title.trim(), entry.content],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(entry.id));
        }
        replace_tags(&tx, entry.id, &entry.tags)?;
        tx.commit()?;

        debug!("updated entry {}", entry.id);
        Ok(())
    }

    fn delete(&mut self, id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        debug!("deleted entry {id}");
        Ok(())
    }

    fn all_tags(&self) -> RepoResult<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name, COUNT(et.entry_id)
             FROM tags t
             INNER JOIN entry_tags et ON et.tag_id = t.id
             GROUP BY t.name
             ORDER BY t.name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            tags.push((name, count as usize));
        }
        Ok(tags)
    }

    fn export(&self, id: i64, path: &Path) -> RepoResult<()> {
        let entry = self.load(id)?;

        let mut out = format!("# {}\n\n", entry.title);
        out.push_str(&format!("Created: {}\n", entry.created_at));
        if !entry.tags.is_empty() {
            out.push_str(&format!("Tags: {}\n", entry.tags.join(", ")));
        }
        out.push('\n');
        out.push_str(&entry.content);
        if !out.ends_with('\n') {
            out.push('\n');
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, out)?;
        debug!("exported entry {id} to {}", path.display());
        Ok(())
    }
}

fn validate_title(title: &str) -> RepoResult<()> {
    if title.trim().is_empty() {
        return Err(RepoError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}

fn push_filter_clauses(sql: &mut String, binds: &mut Vec<Value>, filter: &ListFilter) {
    if let Some(tag) = filter.tag.as_deref() {
        sql.push_str(
            " AND EXISTS (
                SELECT 1 FROM entry_tags et
                INNER JOIN tags t ON t.id = et.tag_id
                WHERE et.entry_id = entries.id AND t.name = ?
            )",
        );
        binds.push(Value::Text(tag.to_lowercase()));
    }
    if let Some(query) = filter.query.as_deref() {
        sql.push_str(" AND (LOWER(title) LIKE ? OR LOWER(content) LIKE ?)");
        let pattern = format!("%{}%", query.to_lowercase());
        binds.push(Value::Text(pattern.clone()));
        binds.push(Value::Text(pattern));
    }
}

/// Replaces the whole tag set for one entry inside the caller's transaction.
fn replace_tags(tx: &rusqlite::Transaction<'_>, entry_id: i64, tags: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM entry_tags WHERE entry_id = ?1;", [entry_id])?;
    for tag in normalize_tags(tags) {
        tx.execute(
            "INSERT OR IGNORE INTO tags (name) VALUES (?1);",
            [tag.as_str()],
        )?;
        tx.execute(
            "INSERT INTO entry_tags (entry_id, tag_id)
             SELECT ?1, id FROM tags WHERE name = ?2;",
            params![entry_id, tag.as_str()],
        )?;
    }
    Ok(())
}

fn load_tags_for_entry(conn: &Connection, entry_id: i64) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM entry_tags et
         INNER JOIN tags t ON t.id = et.tag_id
         WHERE et.entry_id = ?1
         ORDER BY t.name ASC;",
    )?;
    let mut rows = stmt.query([entry_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get::<_, String>(0)?);
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::{EntryRepository, ListFilter, RepoError, SqliteEntryRepository};
    use crate::models::EntryDraft;

    fn draft(title: &str, content: &str, tags: &[&str]) -> EntryDraft {
        EntryDraft {
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn save_and_load_roundtrip_normalizes_tags() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        let id = repo
            .save(&draft("First", "hello world", &["Rust", "rust", " TUI "]))
            .unwrap();

        let entry = repo.load(id).unwrap();
        assert_eq!(entry.title, "First");
        assert_eq!(entry.content, "hello world");
        assert_eq!(entry.tags, ["rust", "tui"]);
        assert!(!entry.created_at.is_empty());
    }

    #[test]
    fn empty_title_is_a_validation_error() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        let err = repo.save(&draft("   ", "body", &[])).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn load_and_delete_missing_entry_is_not_found() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        assert!(matches!(repo.load(42), Err(RepoError::NotFound(42))));
        assert!(matches!(repo.delete(42), Err(RepoError::NotFound(42))));
    }

    #[test]
    fn update_replaces_content_and_tag_set() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        let id = repo.save(&draft("Title", "old", &["old"])).unwrap();

        let mut entry = repo.load(id).unwrap();
        entry.content = "new".to_string();
        entry.tags = vec!["fresh".to_string()];
        repo.update(&entry).unwrap();

        let reloaded = repo.load(id).unwrap();
        assert_eq!(reloaded.content, "new");
        assert_eq!(reloaded.tags, ["fresh"]);

        let tags = repo.all_tags().unwrap();
        // `old` still exists as a tag row but no longer counts any entry.
        assert!(tags.iter().all(|(name, _)| name != "old"));
        assert_eq!(tags, [("fresh".to_string(), 1)]);
    }

    #[test]
    fn list_filters_by_tag() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        repo.save(&draft("A", "one", &["work"])).unwrap();
        repo.save(&draft("B", "two", &["life"])).unwrap();

        let filter = ListFilter {
            tag: Some("work".to_string()),
            query: None,
        };
        let found = repo.list(0, 10, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "A");
        assert_eq!(repo.count(&filter).unwrap(), 1);
    }

    #[test]
    fn search_matches_title_and_content_case_insensitively() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        repo.save(&draft("Groceries", "buy milk", &[])).unwrap();
        repo.save(&draft("Workout", "leg day", &[])).unwrap();

        let filter = ListFilter {
            tag: None,
            query: Some("MILK".to_string()),
        };
        let found = repo.list(0, 10, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Groceries");
    }

    #[test]
    fn list_is_paginated_newest_first() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        for i in 0..5 {
            repo.save(&draft(&format!("Entry {i}"), "body", &[])).unwrap();
        }

        let filter = ListFilter::default();
        let page0 = repo.list(0, 2, &filter).unwrap();
        let page1 = repo.list(1, 2, &filter).unwrap();
        assert_eq!(page0[0].title, "Entry 4");
        assert_eq!(page0[1].title, "Entry 3");
        assert_eq!(page1[0].title, "Entry 2");
        assert_eq!(repo.count(&filter).unwrap(), 5);
    }

    #[test]
    fn export_writes_markdown_file() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        let id = repo
            .save(&draft("Note", "some **bold** text", &["misc"]))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        repo.export(id, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Note\n"));
        assert!(written.contains("Tags: misc"));
        assert!(written.contains("some **bold** text"));
    }

    #[test]
    fn deleting_entry_drops_its_tag_links() {
        let mut repo = SqliteEntryRepository::open_in_memory().unwrap();
        let id = repo.save(&draft("Tagged", "body", &["solo"])).unwrap();
        repo.delete(id).unwrap();
        assert!(repo.all_tags().unwrap().is_empty());
    }
}
