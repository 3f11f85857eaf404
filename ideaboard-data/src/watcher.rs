//! File watcher for automatic data refresh

use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::store::{EVENTS_FILE, IDEAS_FILE};

/// Events that the watcher can send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Idea or event files changed, refresh needed
    Refresh,
    /// Error occurred during watching
    Error(String),
}

/// Whether a notify event touches one of the files we serve.
fn touches_data_files(event: &Event) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name == IDEAS_FILE || name == EVENTS_FILE)
            .unwrap_or(false)
    })
}

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    pub receiver: Receiver<WatchEvent>,
}

impl FileWatcher {
    /// Watch `data_dir` for changes to the idea and event files.
    pub fn new(data_dir: &Path) -> notify::Result<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if touches_data_files(&event) {
                        let _ = tx.send(WatchEvent::Refresh);
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(data_dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Try to receive a watch event (non-blocking)
    pub fn try_recv(&self) -> Option<WatchEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next watch event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WatchEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_watcher_initializes_without_error() {
        let temp = TempDir::new().unwrap();
        let result = FileWatcher::new(temp.path());
        assert!(result.is_ok(), "FileWatcher should initialize successfully");
    }

    #[test]
    fn test_try_recv_returns_none_when_no_events() {
        let temp = TempDir::new().unwrap();
        let watcher = FileWatcher::new(temp.path()).unwrap();
        assert!(watcher.try_recv().is_none(), "Should return None when no events");
    }

    #[test]
    fn test_watcher_fails_for_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does-not-exist");
        assert!(FileWatcher::new(&missing).is_err());
    }

    #[test]
    fn test_touches_data_files() {
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/data/ideas.json"));
        assert!(touches_data_files(&event));

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/data/ideas.json.tmp"));
        assert!(!touches_data_files(&event));
    }

    #[test]
    fn test_writing_ideas_file_sends_refresh() {
        let temp = TempDir::new().unwrap();
        let watcher = FileWatcher::new(temp.path()).unwrap();

        fs::write(temp.path().join(IDEAS_FILE), "[]").unwrap();

        let mut refreshed = false;
        for _ in 0..20 {
            if let Some(WatchEvent::Refresh) = watcher.recv_timeout(Duration::from_millis(250)) {
                refreshed = true;
                break;
            }
        }
        assert!(refreshed, "Should see a refresh after writing ideas.json");
    }
}
