//! Shared data layer for the ideaboard dashboard
//!
//! This crate provides idea and event records, the schedule normalization
//! engine that turns loosely-shaped schedules into a grid-ready timeline,
//! and the file store, filters, and watcher used by ideaboard-web.

pub mod cursor;
pub mod filter;
pub mod schedule;
pub mod store;
pub mod types;
pub mod watcher;

pub use cursor::UpdateCursor;
pub use filter::{Facets, IdeaFilter, ScoreSort};
pub use schedule::{normalize, NormalizedSchedule, Role, TimelineLayout};
pub use store::IdeaStore;
pub use types::{EventRecord, IdeaRecord, RawPhase, RawTask};

impl IdeaRecord {
    /// The normalized schedule of this idea, rebuilt on every call.
    pub fn normalized_schedule(&self) -> NormalizedSchedule {
        normalize(self.schedule.as_ref())
    }

    /// Grid layout of this idea's schedule.
    pub fn timeline(&self) -> TimelineLayout {
        TimelineLayout::from_schedule(&self.normalized_schedule())
    }
}
