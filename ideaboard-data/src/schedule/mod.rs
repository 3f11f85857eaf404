//! Schedule normalization and timeline layout.
//!
//! Idea records carry a `schedule` of loose shape: usually a list of phases
//! whose tasks name their actor in free text, sometimes a structure that is
//! already split into tracks. [`normalize`] turns either into a
//! [`NormalizedSchedule`] and [`TimelineLayout`] places it on a grid.
//!
//! Everything here is pure: no IO, no shared state, and equal inputs give
//! equal outputs.

pub mod actor;
pub mod ingest;
pub mod layout;
pub mod tracks;
pub mod view;

use serde_json::Value;
use tracing::debug;

pub use actor::{classify, Role};
pub use ingest::{IngestError, PrebuiltSchedule, ScheduleInput};
pub use layout::{to_grid_span, GridCell, GridSpan, TimelineBar, TimelineGrid, TimelineLayout, TimelineRow};
pub use tracks::build_tracks;
pub use view::{NormalizedSchedule, ScheduleError, TaskDetail, Track, TrackItem, TrackKind};

/// Normalize a raw schedule, reporting why an unreadable one was rejected.
pub fn try_normalize(raw: Option<&Value>) -> Result<NormalizedSchedule, IngestError> {
    Ok(ScheduleInput::from_value(raw)?.into_schedule())
}

/// Normalize a raw schedule. Unreadable input yields the empty schedule.
pub fn normalize(raw: Option<&Value>) -> NormalizedSchedule {
    try_normalize(raw).unwrap_or_else(|e| {
        debug!(error = %e, "schedule rejected, using empty schedule");
        NormalizedSchedule::empty()
    })
}
