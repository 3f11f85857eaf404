//! Read `ideas.json` and `events.json` from a data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::warn;

use crate::types::{EventRecord, IdeaRecord};

pub const IDEAS_FILE: &str = "ideas.json";
pub const EVENTS_FILE: &str = "events.json";

/// Read-only view of the files the idea generator writes.
#[derive(Debug, Clone)]
pub struct IdeaStore {
    data_dir: PathBuf,
}

impl IdeaStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn ideas_path(&self) -> PathBuf {
        self.data_dir.join(IDEAS_FILE)
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join(EVENTS_FILE)
    }

    /// Load all ideas, newest `updated_at` first.
    ///
    /// A missing file means no ideas yet. Entries that are not idea objects
    /// are skipped with a warning; a file that is not a JSON array is an error.
    pub fn load_ideas(&self) -> Result<Vec<IdeaRecord>> {
        let path = self.ideas_path();
        if !path.exists() {
            return Ok(vec![]);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read ideas: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse ideas: {}", path.display()))?;
        let Value::Array(entries) = value else {
            bail!("Expected a JSON array in {}", path.display());
        };

        let mut ideas = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<IdeaRecord>(entry) {
                Ok(idea) => ideas.push(idea),
                Err(e) => warn!(index, error = %e, "skipping unreadable idea"),
            }
        }

        sort_newest_first(&mut ideas);
        Ok(ideas)
    }

    /// Load the activity feed as stored (newest first). Missing or unreadable
    /// files give an empty feed.
    pub fn load_events(&self) -> Vec<EventRecord> {
        let path = self.events_path();
        if !path.exists() {
            return vec![];
        }

        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read events: {}", path.display()))
            .and_then(|content| {
                serde_json::from_str::<Vec<EventRecord>>(&content)
                    .with_context(|| format!("Failed to parse events: {}", path.display()))
            });

        match parsed {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "ignoring events file");
                vec![]
            }
        }
    }

    /// Find one idea by id.
    pub fn find_idea(&self, id: &str) -> Result<Option<IdeaRecord>> {
        Ok(self.load_ideas()?.into_iter().find(|idea| idea.id == id))
    }
}

/// Stable sort by `updated_at`, newest first.
pub fn sort_newest_first(ideas: &mut [IdeaRecord]) {
    ideas.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// True when any idea was updated after `last_timestamp`.
///
/// Timestamps are compared as strings, which orders correctly for the
/// uniform RFC 3339 values the generator writes.
pub fn has_updates_since(ideas: &[IdeaRecord], last_timestamp: &str) -> bool {
    ideas
        .iter()
        .any(|idea| idea.updated_at.as_str() > last_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn idea(id: &str, updated_at: &str) -> IdeaRecord {
        IdeaRecord {
            id: id.to_string(),
            updated_at: updated_at.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_files_are_empty() {
        let temp = TempDir::new().unwrap();
        let store = IdeaStore::new(temp.path());

        assert!(store.load_ideas().unwrap().is_empty());
        assert!(store.load_events().is_empty());
        assert!(store.find_idea("x").unwrap().is_none());
    }

    #[test]
    fn test_load_ideas_sorted_newest_first() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            IDEAS_FILE,
            r#"[
                {"id": "old", "title": "Old", "updated_at": "2026-01-01T00:00:00+00:00"},
                {"id": "new", "title": "New", "updated_at": "2026-03-01T00:00:00+00:00"},
                {"id": "mid", "title": "Mid", "updated_at": "2026-02-01T00:00:00+00:00"}
            ]"#,
        );

        let ideas = IdeaStore::new(temp.path()).load_ideas().unwrap();
        let ids: Vec<&str> = ideas.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_load_ideas_skips_non_objects() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            IDEAS_FILE,
            r#"[{"id": "ok", "updated_at": "2026-01-01"}, "garbage", 42]"#,
        );

        let ideas = IdeaStore::new(temp.path()).load_ideas().unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].id, "ok");
    }

    #[test]
    fn test_load_ideas_keeps_records_with_odd_field_types() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            IDEAS_FILE,
            r#"[
                {"id": "a", "recommendation_score": 4.5, "updated_at": "2026-01-03"},
                {"id": "b", "cost": 4000000, "updated_at": "2026-01-02"},
                {"id": "c", "recommendation_score": "5", "updated_at": "2026-01-01"},
                {"id": "d", "recommendation_score": "high"}
            ]"#,
        );

        let ideas = IdeaStore::new(temp.path()).load_ideas().unwrap();
        let ids: Vec<&str> = ideas.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(ideas[1].cost.as_deref(), Some("4000000"));
        assert_eq!(ideas[2].score(), 5.0);
    }

    #[test]
    fn test_load_ideas_rejects_non_array() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), IDEAS_FILE, r#"{"error": "oops"}"#);

        let err = IdeaStore::new(temp.path()).load_ideas().unwrap_err();
        assert!(err.to_string().contains("Expected a JSON array"));
    }

    #[test]
    fn test_load_ideas_reports_invalid_json() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), IDEAS_FILE, "[{");

        let err = IdeaStore::new(temp.path()).load_ideas().unwrap_err();
        assert!(err.to_string().contains("Failed to parse ideas"));
    }

    #[test]
    fn test_find_idea() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            IDEAS_FILE,
            r#"[{"id": "a", "title": "Alpha"}, {"id": "b", "title": "Beta"}]"#,
        );

        let store = IdeaStore::new(temp.path());
        assert_eq!(store.find_idea("b").unwrap().unwrap().title, "Beta");
        assert!(store.find_idea("c").unwrap().is_none());
    }

    #[test]
    fn test_load_events() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            EVENTS_FILE,
            r#"[
                {"timestamp": "2026-01-02T00:00:00+00:00", "message": "second"},
                {"timestamp": "2026-01-01T00:00:00+00:00", "message": "first"}
            ]"#,
        );

        let events = IdeaStore::new(temp.path()).load_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "second");
    }

    #[test]
    fn test_malformed_events_are_empty() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), EVENTS_FILE, "not json");
        assert!(IdeaStore::new(temp.path()).load_events().is_empty());
    }

    #[test]
    fn test_has_updates_since() {
        let ideas = vec![
            idea("a", "2026-01-02T00:00:00+00:00"),
            idea("b", "2026-01-01T00:00:00+00:00"),
        ];

        assert!(has_updates_since(&ideas, "2026-01-01T12:00:00+00:00"));
        assert!(!has_updates_since(&ideas, "2026-01-02T00:00:00+00:00"));
        assert!(has_updates_since(&ideas, ""));
        assert!(!has_updates_since(&[], ""));
    }
}
