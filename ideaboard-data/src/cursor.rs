//! Per-consumer "last seen" marker for update checks.

use crate::store::has_updates_since;
use crate::types::IdeaRecord;

/// Remembers the newest `updated_at` a consumer has seen.
///
/// Each consumer owns its cursor and passes it to the refresh routine, so
/// two consumers never share or race on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCursor {
    last_seen: Option<String>,
}

impl UpdateCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Record the newest timestamp in `ideas`. An empty list leaves the
    /// cursor unchanged.
    pub fn observe(&mut self, ideas: &[IdeaRecord]) {
        if let Some(newest) = ideas.iter().map(|i| i.updated_at.as_str()).max() {
            self.last_seen = Some(newest.to_string());
        }
    }

    /// Whether `ideas` holds anything newer than what was last observed.
    /// Before the first observation there is nothing to compare against, so
    /// the answer is `false`.
    pub fn has_updates(&self, ideas: &[IdeaRecord]) -> bool {
        match &self.last_seen {
            Some(last) => has_updates_since(ideas, last),
            None => false,
        }
    }

    /// Observe `ideas` and report whether the newest timestamp moved past
    /// the cursor. The first non-empty observation counts as a move.
    pub fn advance(&mut self, ideas: &[IdeaRecord]) -> bool {
        let moved = match &self.last_seen {
            Some(_) => self.has_updates(ideas),
            None => !ideas.is_empty(),
        };
        if moved {
            self.observe(ideas);
        }
        moved
    }
}
