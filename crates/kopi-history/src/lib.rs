//! Capped, append-only translation history over SQLite.
//!
//! Writers serialize through one connection behind a mutex; eviction runs
//! in the same transaction as the insert, so readers never observe more
//! than `max_entries` rows.

use std::path::Path;
use std::sync::Mutex;

use kopi_types::HistoryEntry;
use rusqlite::{params, Connection};

pub const DEFAULT_MAX_ENTRIES: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("history lock poisoned")]
    Poisoned,
}

pub struct HistoryStore {
    conn: Mutex<Connection>,
    max_entries: usize,
}

impl HistoryStore {
    pub fn open<P: AsRef<Path>>(path: P, max_entries: usize) -> Result<Self, HistoryError> {
        if let Some(dir) = path.as_ref().parent()
            && !dir.as_os_str().is_empty()
        {
            // Best effort: SQLite reports the real error if this fails.
            let _ = std::fs::create_dir_all(dir);
        }
        Self::init(Connection::open(path)?, max_entries)
    }

    pub fn open_in_memory(max_entries: usize) -> Result<Self, HistoryError> {
        Self::init(Connection::open_in_memory()?, max_entries)
    }

    fn init(conn: Connection, max_entries: usize) -> Result<Self, HistoryError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                src_text   TEXT NOT NULL,
                tgt_text   TEXT NOT NULL,
                src_lang   TEXT NOT NULL,
                tgt_lang   TEXT NOT NULL,
                model      TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            max_entries,
        })
    }

    /// Inserts an entry and evicts rows beyond the cap, oldest id first,
    /// atomically with respect to readers.
    pub fn append(
        &self,
        src_text: &str,
        tgt_text: &str,
        src_lang: &str,
        tgt_lang: &str,
        model: &str,
    ) -> Result<i64, HistoryError> {
        let mut conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO history (src_text, tgt_text, src_lang, tgt_lang, model)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![src_text, tgt_text, src_lang, tgt_lang, model],
        )?;
        let id = tx.last_insert_rowid();
        let evicted = tx.execute(
            "DELETE FROM history WHERE id NOT IN
             (SELECT id FROM history ORDER BY id DESC LIMIT ?1)",
            params![self.max_entries as i64],
        )?;
        tx.commit()?;

        if evicted > 0 {
            tracing::debug!(evicted, "history cap enforced");
        }
        Ok(id)
    }

    /// Newest first. `filter` is a substring match (SQLite LIKE collation)
    /// over source and target text; it only ever sees live rows.
    pub fn list(&self, filter: Option<&str>) -> Result<Vec<HistoryEntry>, HistoryError> {
        let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;

        let mut rows = Vec::new();
        match filter {
            Some(search) if !search.is_empty() => {
                let pattern = format!("%{search}%");
                let mut stmt = conn.prepare(
                    "SELECT id, src_text, tgt_text, src_lang, tgt_lang, model, created_at
                     FROM history
                     WHERE src_text LIKE ?1 OR tgt_text LIKE ?1
                     ORDER BY id DESC",
                )?;
                let mapped = stmt.query_map(params![pattern], Self::row_to_entry)?;
                for entry in mapped {
                    rows.push(entry?);
                }
            }
            _ => {
                let mut stmt = conn.prepare(
                    "SELECT id, src_text, tgt_text, src_lang, tgt_lang, model, created_at
                     FROM history ORDER BY id DESC",
                )?;
                let mapped = stmt.query_map([], Self::row_to_entry)?;
                for entry in mapped {
                    rows.push(entry?);
                }
            }
        }
        Ok(rows)
    }

    pub fn delete(&self, id: i64) -> Result<(), HistoryError> {
        let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
        conn.execute("DELETE FROM history WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn delete_all(&self) -> Result<(), HistoryError> {
        let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
        conn.execute("DELETE FROM history", [])?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize, HistoryError> {
        let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: row.get(0)?,
            src_text: row.get(1)?,
            tgt_text: row.get(2)?,
            src_lang: row.get(3)?,
            tgt_lang: row.get(4)?,
            model: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max: usize) -> HistoryStore {
        HistoryStore::open_in_memory(max).unwrap()
    }

    fn fill(store: &HistoryStore, n: usize) {
        for i in 0..n {
            store
                .append(&format!("src {i}"), &format!("tgt {i}"), "auto", "English", "haiku")
                .unwrap();
        }
    }

    #[test]
    fn append_then_list_is_newest_first() {
        let store = store(10);
        fill(&store, 3);
        let entries = store.list(None).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].src_text, "src 2");
        assert_eq!(entries[2].src_text, "src 0");
        assert!(entries[0].id > entries[2].id);
    }

    #[test]
    fn cap_evicts_oldest_by_id() {
        let store = store(DEFAULT_MAX_ENTRIES);
        fill(&store, DEFAULT_MAX_ENTRIES + 5);

        assert_eq!(store.count().unwrap(), DEFAULT_MAX_ENTRIES);
        let entries = store.list(None).unwrap();
        // The five oldest are gone; the newest five plus the rest survive.
        assert_eq!(entries.last().unwrap().src_text, "src 5");
        assert_eq!(entries.first().unwrap().src_text, format!("src {}", DEFAULT_MAX_ENTRIES + 4));
    }

    #[test]
    fn cap_is_never_exceeded_between_appends() {
        let store = store(4);
        for i in 0..12 {
            store
                .append(&format!("s{i}"), &format!("t{i}"), "auto", "English", "haiku")
                .unwrap();
            assert!(store.count().unwrap() <= 4);
        }
    }

    #[test]
    fn search_matches_both_columns() {
        let store = store(10);
        store.append("hello world", "bonjour", "English", "French", "haiku").unwrap();
        store.append("goodbye", "au revoir le monde", "English", "French", "haiku").unwrap();
        store.append("unrelated", "nichts", "English", "German", "haiku").unwrap();

        let hits = store.list(Some("world")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].src_text, "hello world");

        let hits = store.list(Some("monde")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tgt_text, "au revoir le monde");
    }

    #[test]
    fn empty_filter_behaves_like_no_filter() {
        let store = store(10);
        fill(&store, 2);
        assert_eq!(store.list(Some("")).unwrap().len(), 2);
    }

    #[test]
    fn delete_by_id_and_delete_all() {
        let store = store(10);
        fill(&store, 3);
        let id = store.list(None).unwrap()[0].id;

        store.delete(id).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.list(None).unwrap().iter().all(|e| e.id != id));

        store.delete_all().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn ids_keep_increasing_after_eviction() {
        let store = store(2);
        fill(&store, 5);
        let entries = store.list(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].id > entries[1].id);
        assert_eq!(entries[0].src_text, "src 4");
    }
}
