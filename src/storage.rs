//! SQLite-backed word store.
//!
//! Words are stored as JSON documents keyed by word id, with a small `meta`
//! key/value table alongside (currently just the one-time seeding flag).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Word;

/// Bundled starter vocabulary, installed on first run.
const BUNDLED_WORDS: &str = include_str!("../seed/words.json");

const SEEDED_FLAG: &str = "seeded";

/// Shape of the bundled seed file.
#[derive(Debug, Deserialize)]
struct SeedFile {
    items: Vec<Word>,
}

/// Export envelope, also accepted on import (alongside a bare word array).
#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    pub version: u32,
    pub exported_at: DateTime<Local>,
    pub items: Vec<Word>,
}

/// Handles word persistence.
pub struct WordStore {
    conn: Connection,
}

impl WordStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open word store: {:?}", path))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Get default store location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab-cycle")
            .join("words.db")
    }

    /// Default export destination: a timestamped file in the user's
    /// documents directory (current directory as a fallback).
    pub fn default_export_path() -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        dirs::document_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(format!("vocab-export-{}.json", timestamp))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS words (
                     id   TEXT PRIMARY KEY,
                     data TEXT NOT NULL
                 );
                 CREATE TABLE IF NOT EXISTS meta (
                     key   TEXT PRIMARY KEY,
                     value TEXT NOT NULL
                 );",
            )
            .context("Failed to initialize word store schema")?;
        Ok(())
    }

    /// Load a single word by id.
    pub fn get(&self, id: &str) -> Result<Option<Word>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM words WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        match data {
            Some(json) => Ok(Some(
                serde_json::from_str(&json)
                    .with_context(|| format!("Corrupt word record: {}", id))?,
            )),
            None => Ok(None),
        }
    }

    /// Load the full word list.
    pub fn get_all(&self) -> Result<Vec<Word>> {
        let mut stmt = self.conn.prepare("SELECT data FROM words ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut words = Vec::new();
        for json in rows {
            let word: Word =
                serde_json::from_str(&json?).context("Corrupt word record in store")?;
            words.push(word);
        }
        Ok(words)
    }

    /// Insert or replace the whole record. The single-row write is what makes
    /// the per-answer statistics update atomic.
    pub fn put(&self, word: &Word) -> Result<()> {
        let json = serde_json::to_string(word)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO words (id, data) VALUES (?1, ?2)",
            params![word.id, json],
        )?;
        Ok(())
    }

    fn meta_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn meta_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// One-time population from the bundled word list. Words already present
    /// are left untouched, so re-running never clobbers learning statistics.
    /// Returns the number of words inserted.
    pub fn ensure_seeded(&self) -> Result<usize> {
        if self.meta_get(SEEDED_FLAG)?.as_deref() == Some("true") {
            return Ok(0);
        }

        let seed: SeedFile =
            serde_json::from_str(BUNDLED_WORDS).context("Invalid bundled seed data")?;

        let mut inserted = 0;
        for mut word in seed.items {
            word.normalize();
            if self.get(&word.id)?.is_none() {
                self.put(&word)?;
                inserted += 1;
            }
        }

        self.meta_set(SEEDED_FLAG, "true")?;
        Ok(inserted)
    }

    /// Import words from JSON: either the export envelope
    /// `{version, exported_at, items: [...]}` or a bare array of words.
    /// Entries without a word text are skipped; missing ids, statistics and
    /// pronunciation are defaulted exactly as at seed time.
    /// Returns the number of words imported.
    pub fn import_json(&self, json: &str) -> Result<usize> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("Invalid JSON")?;

        let items = match value.get("items").and_then(|v| v.as_array()) {
            Some(items) => items.clone(),
            None => match value.as_array() {
                Some(items) => items.clone(),
                None => bail!("JSON must have {{items: [...]}} or be an array"),
            },
        };

        let mut count = 0;
        for item in items {
            let Ok(mut word) = serde_json::from_value::<Word>(item) else {
                continue;
            };
            if word.word.is_empty() {
                continue;
            }
            word.normalize();
            self.put(&word)?;
            count += 1;
        }
        Ok(count)
    }

    /// Export the full library as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        let backup = Backup {
            version: 1,
            exported_at: Local::now(),
            items: self.get_all()?,
        };
        Ok(serde_json::to_string_pretty(&backup)?)
    }

    /// Wipe all local data, including the seeded flag so the next launch
    /// reseeds. The only deletion path; there is no single-word delete.
    pub fn reset(&self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM words; DELETE FROM meta;")
            .context("Failed to reset word store")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sense;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, WordStore) {
        let dir = TempDir::new().unwrap();
        let store = WordStore::open(&dir.path().join("words.db")).unwrap();
        (dir, store)
    }

    fn sample(id: &str, def: &str) -> Word {
        Word::new(id.to_string(), vec![Sense::new(def.to_string())])
    }

    #[test]
    fn put_get_roundtrip() {
        let (_dir, store) = open_store();
        let mut w = sample("cat", "猫");
        w.tags = vec!["animal".into()];
        w.stats.record_answer(true);
        store.put(&w).unwrap();

        let loaded = store.get("cat").unwrap().unwrap();
        assert_eq!(loaded.word, "cat");
        assert_eq!(loaded.tags, vec!["animal".to_string()]);
        assert_eq!(loaded.stats.correct, 1);
        assert_eq!(loaded.stats.mastery, 1);
        assert!(loaded.stats.last_seen.is_some());
    }

    #[test]
    fn get_missing_returns_none() {
        let (_dir, store) = open_store();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn put_replaces_existing_record() {
        let (_dir, store) = open_store();
        store.put(&sample("cat", "猫")).unwrap();

        let mut updated = sample("cat", "猫咪");
        updated.stats.record_answer(false);
        store.put(&updated).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].senses[0].definition_cn, "猫咪");
        assert_eq!(all[0].stats.wrong, 1);
    }

    #[test]
    fn seeding_is_idempotent_and_preserves_stats() {
        let (_dir, store) = open_store();
        let inserted = store.ensure_seeded().unwrap();
        assert!(inserted > 0);

        // Answer one seeded word, then reseed: nothing changes.
        let mut words = store.get_all().unwrap();
        let first = &mut words[0];
        first.stats.record_answer(true);
        store.put(first).unwrap();
        let id = first.id.clone();

        assert_eq!(store.ensure_seeded().unwrap(), 0);
        assert_eq!(store.get_all().unwrap().len(), inserted);
        assert_eq!(store.get(&id).unwrap().unwrap().stats.seen, 1);
    }

    #[test]
    fn import_accepts_envelope_and_defaults_missing_fields() {
        let (_dir, store) = open_store();
        let json = r#"{
            "version": 1,
            "exported_at": "2024-01-01T00:00:00+00:00",
            "items": [
                {"word": "Give Up", "senses": [{"definition_cn": "放弃"}]}
            ]
        }"#;
        assert_eq!(store.import_json(json).unwrap(), 1);

        let w = store.get("give_up").unwrap().unwrap();
        assert_eq!(w.core_sense, 0);
        assert_eq!(w.stats.seen, 0);
        assert!(w.pronunciation.tts);
    }

    #[test]
    fn import_accepts_bare_array_and_skips_bad_entries() {
        let (_dir, store) = open_store();
        let json = r#"[
            {"word": "cat", "senses": [{"definition_cn": "猫"}]},
            {"senses": [{"definition_cn": "orphan"}]},
            {"word": "", "senses": []},
            {"word": "dog", "senses": [{"definition_cn": "狗"}]}
        ]"#;
        assert_eq!(store.import_json(json).unwrap(), 2);
        assert_eq!(store.get_all().unwrap().len(), 2);
    }

    #[test]
    fn import_rejects_non_list_payload() {
        let (_dir, store) = open_store();
        assert!(store.import_json(r#"{"words": 3}"#).is_err());
        assert!(store.import_json("not json").is_err());
    }

    #[test]
    fn import_respects_explicit_id() {
        let (_dir, store) = open_store();
        let json = r#"[{"id": "felix", "word": "cat", "senses": [{"definition_cn": "猫"}]}]"#;
        store.import_json(json).unwrap();
        assert!(store.get("felix").unwrap().is_some());
        assert!(store.get("cat").unwrap().is_none());
    }

    #[test]
    fn export_roundtrips_through_import() {
        let (_dir, store) = open_store();
        store.put(&sample("cat", "猫")).unwrap();
        store.put(&sample("dog", "狗")).unwrap();

        let json = store.export_json().unwrap();
        let backup: Backup = serde_json::from_str(&json).unwrap();
        assert_eq!(backup.version, 1);
        assert_eq!(backup.items.len(), 2);

        let (_dir2, other) = open_store();
        assert_eq!(other.import_json(&json).unwrap(), 2);
        assert_eq!(other.get_all().unwrap().len(), 2);
    }

    #[test]
    fn reset_wipes_words_and_reenables_seeding() {
        let (_dir, store) = open_store();
        let inserted = store.ensure_seeded().unwrap();
        assert!(inserted > 0);

        store.reset().unwrap();
        assert!(store.get_all().unwrap().is_empty());

        // Seeded flag is gone, so the next launch reseeds.
        assert_eq!(store.ensure_seeded().unwrap(), inserted);
    }
}
