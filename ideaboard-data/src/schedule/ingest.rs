//! Discriminate a raw `schedule` value into one of the shapes we understand.

use serde_json::{Map, Value};
use thiserror::Error;

use super::tracks::build_tracks;
use super::view::{NormalizedSchedule, TaskDetail, Track};
use crate::types::{whole_number, RawPhase};

/// Duration used for a pre-built schedule that does not state one.
pub const DEFAULT_PREBUILT_DURATIONS: u32 = 3;

/// Why a schedule value could not be read. Callers that only need something
/// to render use [`super::normalize`], which turns every error into the empty
/// schedule.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unrecognized schedule shape: {0}")]
    UnrecognizedShape(&'static str),

    #[error("Malformed pre-built schedule: {0}")]
    MalformedPrebuilt(&'static str),
}

/// A schedule that already carries its tracks. Tracks and tasks serialize
/// back exactly as they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrebuiltSchedule {
    pub duration_count: u32,
    pub tracks: Vec<Track>,
    pub tasks: Vec<TaskDetail>,
}

/// The shapes a `schedule` field can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleInput {
    /// Absent, `null`, or `[]`.
    Empty,
    /// Legacy list of phases; position is the 1-based time unit.
    Phases(Vec<RawPhase>),
    /// Object with a `tracks` field.
    Prebuilt(PrebuiltSchedule),
}

impl ScheduleInput {
    pub fn from_value(raw: Option<&Value>) -> Result<Self, IngestError> {
        match raw {
            None | Some(Value::Null) => Ok(ScheduleInput::Empty),
            Some(Value::Array(items)) if items.is_empty() => Ok(ScheduleInput::Empty),
            Some(Value::Array(items)) => Ok(ScheduleInput::Phases(
                items.iter().map(RawPhase::from_value).collect(),
            )),
            Some(Value::Object(map)) => match map.get("tracks") {
                None | Some(Value::Null) => Err(IngestError::UnrecognizedShape("object without tracks")),
                Some(tracks) => Ok(ScheduleInput::Prebuilt(prebuilt_from_object(map, tracks)?)),
            },
            Some(Value::String(_)) => Err(IngestError::UnrecognizedShape("string")),
            Some(Value::Number(_)) => Err(IngestError::UnrecognizedShape("number")),
            Some(Value::Bool(_)) => Err(IngestError::UnrecognizedShape("bool")),
        }
    }

    /// Produce the normalized schedule for this input.
    pub fn into_schedule(self) -> NormalizedSchedule {
        match self {
            ScheduleInput::Empty => NormalizedSchedule::empty(),
            ScheduleInput::Phases(phases) => {
                let (tracks, tasks) = build_tracks(&phases);
                let schedule = NormalizedSchedule::assemble(tracks, tasks, phases.len() as u32);
                debug_assert!(schedule.validate().is_ok());
                schedule
            }
            ScheduleInput::Prebuilt(prebuilt) => NormalizedSchedule::assemble(
                prebuilt.tracks,
                prebuilt.tasks,
                prebuilt.duration_count,
            ),
        }
    }
}

fn prebuilt_from_object(map: &Map<String, Value>, tracks: &Value) -> Result<PrebuiltSchedule, IngestError> {
    let Value::Array(tracks) = tracks else {
        return Err(IngestError::MalformedPrebuilt("tracks is not a list"));
    };
    let tracks = tracks.iter().map(Track::from_value).collect();

    let tasks = match map.get("tasks") {
        Some(Value::Array(tasks)) => tasks.iter().map(TaskDetail::from_value).collect(),
        _ => Vec::new(),
    };

    // Fractions are floored; zero and unreadable values fall back to the default.
    let duration_count = whole_number(map.get("durations"))
        .filter(|d| *d > 0)
        .map(|d| d.min(u32::MAX as u64) as u32)
        .unwrap_or(DEFAULT_PREBUILT_DURATIONS);

    Ok(PrebuiltSchedule {
        duration_count,
        tracks,
        tasks,
    })
}
