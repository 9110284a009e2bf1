//! Profile Store
//!
//! Simple key-value persistence for learner profiles: whole-profile
//! overwrite on every write, listing in insertion order, no transactions.
//! A broken store is never fatal; callers degrade to an empty profile
//! list or an in-memory store.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::error::BuddyResult;
use crate::profile::LearnerProfile;

pub trait ProfileStore: Send + Sync {
    /// All profiles, oldest first
    fn list_all(&self) -> BuddyResult<Vec<LearnerProfile>>;

    /// A single profile by id
    fn get(&self, id: &str) -> BuddyResult<Option<LearnerProfile>>;

    /// Insert or overwrite a whole profile
    fn put(&self, profile: &LearnerProfile) -> BuddyResult<()>;
}

/// SQLite-backed store. Profiles are stored as JSON blobs keyed by id;
/// rowid preserves insertion order.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> BuddyResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl ProfileStore for SqliteStore {
    fn list_all(&self) -> BuddyResult<Vec<LearnerProfile>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT data FROM profiles ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut profiles = Vec::new();
        for row in rows {
            let data = row?;
            match serde_json::from_str::<LearnerProfile>(&data) {
                Ok(profile) => profiles.push(profile),
                Err(e) => warn!("⚠️ Skipping unreadable profile row: {}", e),
            }
        }
        Ok(profiles)
    }

    fn get(&self, id: &str) -> BuddyResult<Option<LearnerProfile>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT data FROM profiles WHERE id = ?1")?;
        let mut rows = stmt.query_map([id], |row| row.get::<_, String>(0))?;

        match rows.next() {
            Some(row) => {
                let data = row?;
                match serde_json::from_str(&data) {
                    Ok(profile) => Ok(Some(profile)),
                    Err(e) => {
                        warn!("⚠️ Unreadable profile {}: {}", id, e);
                        Ok(None)
                    }
                }
            }
            None => Ok(None),
        }
    }

    fn put(&self, profile: &LearnerProfile) -> BuddyResult<()> {
        let data = serde_json::to_string(profile)?;
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO profiles (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            (&profile.id, &data),
        )?;
        Ok(())
    }
}

/// In-memory store for tests and as a fallback when the database cannot
/// be opened. Data dies with the process.
#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Vec<LearnerProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn list_all(&self) -> BuddyResult<Vec<LearnerProfile>> {
        Ok(self.profiles.lock()?.clone())
    }

    fn get(&self, id: &str) -> BuddyResult<Option<LearnerProfile>> {
        Ok(self.profiles.lock()?.iter().find(|p| p.id == id).cloned())
    }

    fn put(&self, profile: &LearnerProfile) -> BuddyResult<()> {
        let mut profiles = self.profiles.lock()?;
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => profiles.push(profile.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> LearnerProfile {
        let mut profile = LearnerProfile::new(name, 0);
        // Ids derive from the clock; make them unique per sample
        profile.id = format!("{}-{}", profile.id, name);
        profile
    }

    #[test]
    fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("profiles.db")).unwrap();

        let mut profile = sample("Mira");
        store.put(&profile).unwrap();

        let loaded = store.get(&profile.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Mira");

        // Overwrite semantics: the whole profile is replaced
        profile.sessions_completed = 3;
        store.put(&profile).unwrap();
        let loaded = store.get(&profile.id).unwrap().unwrap();
        assert_eq!(loaded.sessions_completed, 3);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_sqlite_list_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("profiles.db")).unwrap();

        for name in ["Ada", "Ben", "Cleo"] {
            store.put(&sample(name)).unwrap();
        }

        let names: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Ben", "Cleo"]);
    }

    #[test]
    fn test_sqlite_skips_corrupt_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("profiles.db")).unwrap();
        store.put(&sample("Mira")).unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO profiles (id, data) VALUES ('junk', 'not json')",
                [],
            )
            .unwrap();
        }

        let profiles = store.list_all().unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(store.get("junk").unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.list_all().unwrap().is_empty());

        let mut profile = sample("Mira");
        store.put(&profile).unwrap();
        profile.streak_days = 4;
        store.put(&profile).unwrap();

        assert_eq!(store.list_all().unwrap().len(), 1);
        assert_eq!(store.get(&profile.id).unwrap().unwrap().streak_days, 4);
        assert!(store.get("missing").unwrap().is_none());
    }
}
