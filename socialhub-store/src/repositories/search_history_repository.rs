use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use socialhub_types::SearchHistoryEntry;

use crate::connection::{Database, Table};
use crate::encode::{decode_dt, encode_dt, escape_like};
use crate::error::Result;

fn map_entry(row: &Row<'_>) -> rusqlite::Result<SearchHistoryEntry> {
    Ok(SearchHistoryEntry {
        id: row.get(0)?,
        query: row.get(1)?,
        searched_at: decode_dt(2, row.get(2)?)?,
    })
}

#[derive(Clone)]
pub struct SearchHistoryRepository {
    db: Database,
}

impl SearchHistoryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list_all(&self) -> Result<Vec<SearchHistoryEntry>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT id, query, searched_at FROM search_history ORDER BY id")?;
        let entries = stmt.query_map([], map_entry)?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Most recent searches first
    pub fn recent(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, query, searched_at FROM search_history ORDER BY searched_at DESC LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt.query_map([limit], map_entry)?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Past queries starting with `prefix`, most recent first
    pub fn by_prefix(&self, prefix: &str) -> Result<Vec<SearchHistoryEntry>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, query, searched_at FROM search_history
             WHERE query LIKE ?1 || '%' ESCAPE '\\' ORDER BY searched_at DESC",
        )?;
        let entries = stmt
            .query_map([escape_like(prefix)], map_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Record a query, refreshing its timestamp if it was searched before
    pub fn record(&self, query: &str, searched_at: DateTime<Utc>) -> Result<()> {
        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO search_history (query, searched_at) VALUES (?1, ?2)
             ON CONFLICT(query) DO UPDATE SET searched_at = excluded.searched_at",
            params![query, encode_dt(&searched_at)],
        )?;
        drop(conn);

        self.db.notify(Table::SearchHistory);
        Ok(())
    }

    pub fn delete(&self, entry_id: i64) -> Result<bool> {
        let conn = self.db.connection()?;
        let changed = conn.execute("DELETE FROM search_history WHERE id = ?1", [entry_id])?;
        drop(conn);

        if changed > 0 {
            self.db.notify(Table::SearchHistory);
        }
        Ok(changed > 0)
    }

    pub fn clear(&self) -> Result<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM search_history", [])?;
        drop(conn);

        self.db.notify(Table::SearchHistory);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_record_is_unique_per_query() {
        let repo = SearchHistoryRepository::new(Database::open(":memory:").unwrap());
        repo.record("ann", at(1_000)).unwrap();
        repo.record("bo", at(2_000)).unwrap();
        repo.record("ann", at(3_000)).unwrap();

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 2);

        let recent: Vec<String> = repo.recent(10).unwrap().into_iter().map(|e| e.query).collect();
        assert_eq!(recent, vec!["ann", "bo"]);
    }

    #[test]
    fn test_prefix_and_clear() {
        let repo = SearchHistoryRepository::new(Database::open(":memory:").unwrap());
        repo.record("anna", at(1_000)).unwrap();
        repo.record("ann", at(2_000)).unwrap();
        repo.record("bob", at(3_000)).unwrap();

        let matches: Vec<String> = repo.by_prefix("an").unwrap().into_iter().map(|e| e.query).collect();
        assert_eq!(matches, vec!["ann", "anna"]);

        let first = repo.list_all().unwrap()[0].id;
        assert!(repo.delete(first).unwrap());
        repo.clear().unwrap();
        assert!(repo.list_all().unwrap().is_empty());
    }
}
