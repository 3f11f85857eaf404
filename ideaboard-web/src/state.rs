use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use ideaboard_data::{EventRecord, IdeaRecord, IdeaStore};

/// Everything read from disk in one refresh. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Newest `updated_at` first.
    pub ideas: Vec<IdeaRecord>,
    pub events: Vec<EventRecord>,
}

/// Shared application state accessible by all handlers
pub struct AppState {
    store: IdeaStore,
    /// Latest snapshot of the data files
    snapshot: RwLock<Arc<Snapshot>>,
    /// Broadcast channel for notifying WebSocket clients of updates
    update_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(store: IdeaStore) -> Arc<Self> {
        let (update_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            store,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            update_tx,
        })
    }

    /// State reading from `data_dir`. Nothing is loaded until [`reload`](Self::reload).
    pub fn open(data_dir: impl Into<PathBuf>) -> Arc<Self> {
        Self::new(IdeaStore::new(data_dir))
    }

    pub fn store(&self) -> &IdeaStore {
        &self.store
    }

    /// The current snapshot. Holders keep seeing it even after a reload.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Get a single idea by id
    pub async fn get_idea(&self, id: &str) -> Option<IdeaRecord> {
        self.snapshot
            .read()
            .await
            .ideas
            .iter()
            .find(|idea| idea.id == id)
            .cloned()
    }

    /// Re-read the data files and notify subscribers.
    ///
    /// If the idea file cannot be read the previous ideas are kept, so a
    /// half-written file never blanks the dashboard.
    pub async fn reload(&self) {
        let previous = self.snapshot().await;

        let ideas = match self.store.load_ideas() {
            Ok(ideas) => ideas,
            Err(e) => {
                warn!(error = %e, "failed to load ideas, keeping previous snapshot");
                previous.ideas.clone()
            }
        };
        let events = self.store.load_events();

        if ideas.len() != previous.ideas.len() {
            info!(count = ideas.len(), "loaded ideas");
        }

        *self.snapshot.write().await = Arc::new(Snapshot { ideas, events });
        let _ = self.update_tx.send(());
    }

    /// Subscribe to update notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.update_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_state_has_empty_snapshot() {
        let temp = TempDir::new().unwrap();
        let state = AppState::open(temp.path());
        let snapshot = state.snapshot().await;
        assert!(snapshot.ideas.is_empty());
        assert!(snapshot.events.is_empty());
    }

    #[tokio::test]
    async fn test_get_nonexistent_idea_returns_none() {
        let temp = TempDir::new().unwrap();
        let state = AppState::open(temp.path());
        assert!(state.get_idea("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_reload_reads_files() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("ideas.json"),
            r#"[{"id": "a", "updated_at": "2026-01-01"}, {"id": "b", "updated_at": "2026-01-02"}]"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("events.json"),
            r#"[{"timestamp": "2026-01-02", "message": "updated b"}]"#,
        )
        .unwrap();

        let state = AppState::open(temp.path());
        state.reload().await;

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.ideas.len(), 2);
        assert_eq!(snapshot.ideas[0].id, "b");
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(state.get_idea("a").await.unwrap().id, "a");
    }

    #[tokio::test]
    async fn test_reload_keeps_ideas_when_file_is_broken() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ideas.json");
        fs::write(&path, r#"[{"id": "a"}]"#).unwrap();

        let state = AppState::open(temp.path());
        state.reload().await;
        let before = state.snapshot().await;

        fs::write(&path, "[{\"id\": ").unwrap();
        state.reload().await;

        let after = state.snapshot().await;
        assert_eq!(after.ideas.len(), 1);
        assert_eq!(after.ideas[0].id, "a");
        // Old holders still see their own snapshot.
        assert_eq!(before.ideas.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_returns_receiver() {
        let temp = TempDir::new().unwrap();
        let state = AppState::open(temp.path());
        let mut rx = state.subscribe();

        // Reload should send a notification
        state.reload().await;

        // Should receive the notification
        let result = rx.try_recv();
        assert!(result.is_ok());
    }
}
