//! The normalized schedule handed to the presentation layer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use super::actor::Role;
use crate::types::{scalar_string, whole_number};

/// Which lane a track is. Pre-built schedules may leave it unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Overall,
    Vendor,
    Client,
}

impl TrackKind {
    /// Kind implied by a row position, for tracks that do not carry one.
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => TrackKind::Overall,
            1 => TrackKind::Vendor,
            _ => TrackKind::Client,
        }
    }

    fn from_value(value: Option<&Value>) -> Option<Self> {
        match value?.as_str()? {
            "overall" => Some(TrackKind::Overall),
            "vendor" => Some(TrackKind::Vendor),
            "client" => Some(TrackKind::Client),
            _ => None,
        }
    }
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| scalar_string(value.get(*key)))
}

fn first_unit(value: &Value, keys: &[&str]) -> u32 {
    keys.iter()
        .find_map(|key| whole_number(value.get(*key)))
        .map(|n| n.min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

/// A bar on a track covering `start_unit..=end_unit` (1-based).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackItem {
    pub label: String,
    pub start_unit: u32,
    pub end_unit: u32,
}

impl TrackItem {
    /// An item occupying exactly one time unit.
    pub fn single(label: impl Into<String>, unit: u32) -> Self {
        TrackItem {
            label: label.into(),
            start_unit: unit,
            end_unit: unit,
        }
    }

    /// Read an item from loosely-typed JSON. Accepts `label`/`name`,
    /// `startUnit`/`start` and `endUnit`/`end`; units may be fractional or
    /// numeric strings. Unreadable fields read as empty or 0.
    pub fn from_value(value: &Value) -> Self {
        TrackItem {
            label: first_string(value, &["label", "name"]).unwrap_or_default(),
            start_unit: first_unit(value, &["startUnit", "start"]),
            end_unit: first_unit(value, &["endUnit", "end"]),
        }
    }
}

impl<'de> Deserialize<'de> for TrackItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| TrackItem::from_value(&value))
    }
}

/// A horizontal lane of the timeline.
///
/// A track read from a pre-built schedule keeps its original JSON in
/// `source` and serializes back to exactly that; `name`, `kind` and `items`
/// are the view used for layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub kind: Option<TrackKind>,
    pub items: Vec<TrackItem>,
    pub source: Option<Value>,
}

#[derive(Serialize)]
struct TrackRepr<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<TrackKind>,
    items: &'a [TrackItem],
}

impl Track {
    /// Read a track from loosely-typed JSON. Never fails: entries of
    /// `items` that are not objects read as empty items.
    pub fn from_value(value: &Value) -> Self {
        let items = match value.get("items") {
            Some(Value::Array(items)) => items.iter().map(TrackItem::from_value).collect(),
            _ => Vec::new(),
        };

        Track {
            name: first_string(value, &["name"]).unwrap_or_default(),
            kind: TrackKind::from_value(value.get("kind")),
            items,
            source: Some(value.clone()),
        }
    }
}

impl Serialize for Track {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.source {
            Some(source) => source.serialize(serializer),
            None => TrackRepr {
                name: &self.name,
                kind: self.kind,
                items: &self.items,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Track {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Track::from_value(&value))
    }
}

/// One row of the flattened task table. Like [`Track`], a task read from a
/// pre-built schedule serializes back to its original JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDetail {
    pub name: String,
    pub phase_label: String,
    pub actor_role: Role,
    pub duration: String,
    pub dependency: String,
    pub source: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDetailRepr<'a> {
    name: &'a str,
    phase_label: &'a str,
    actor_role: Role,
    duration: &'a str,
    dependency: &'a str,
}

impl TaskDetail {
    /// Read a task row from loosely-typed JSON. Never fails.
    pub fn from_value(value: &Value) -> Self {
        TaskDetail {
            name: first_string(value, &["name"]).unwrap_or_default(),
            phase_label: first_string(value, &["phaseLabel", "phase"]).unwrap_or_default(),
            actor_role: first_string(value, &["actorRole", "actor"])
                .map(Role::from)
                .unwrap_or_default(),
            duration: first_string(value, &["duration"]).unwrap_or_default(),
            dependency: first_string(value, &["dependency"]).unwrap_or_default(),
            source: Some(value.clone()),
        }
    }
}

impl Serialize for TaskDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.source {
            Some(source) => source.serialize(serializer),
            None => TaskDetailRepr {
                name: &self.name,
                phase_label: &self.phase_label,
                actor_role: self.actor_role,
                duration: &self.duration,
                dependency: &self.dependency,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TaskDetail {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| TaskDetail::from_value(&value))
    }
}

/// Canonical timeline model: tracks of time-bucketed items plus a task table.
///
/// A `duration_count` of zero with no tracks is the "no schedule" value and
/// renders as such; it is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSchedule {
    pub duration_count: u32,
    pub tracks: Vec<Track>,
    pub tasks: Vec<TaskDetail>,
}

/// A track item whose range does not fit the schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Item '{label}' on track '{track}' starts at unit 0; units are 1-based")]
    StartsBeforeFirstUnit { track: String, label: String },

    #[error("Item '{label}' on track '{track}' ends at {end} before it starts at {start}")]
    EndsBeforeStart {
        track: String,
        label: String,
        start: u32,
        end: u32,
    },

    #[error("Item '{label}' on track '{track}' ends at {end} past the last unit {duration_count}")]
    PastLastUnit {
        track: String,
        label: String,
        end: u32,
        duration_count: u32,
    },
}

impl NormalizedSchedule {
    /// The schedule of an idea that has none.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Package built parts into a fresh schedule value.
    pub fn assemble(tracks: Vec<Track>, tasks: Vec<TaskDetail>, duration_count: u32) -> Self {
        NormalizedSchedule {
            duration_count,
            tracks,
            tasks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.duration_count == 0 && self.tracks.is_empty() && self.tasks.is_empty()
    }

    /// Check every item range against `duration_count`.
    ///
    /// Schedules built from a phase list always pass. Pre-built schedules are
    /// served as given, so callers decide what to do with a failure.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for track in &self.tracks {
            for item in &track.items {
                if item.start_unit == 0 {
                    return Err(ScheduleError::StartsBeforeFirstUnit {
                        track: track.name.clone(),
                        label: item.label.clone(),
                    });
                }
                if item.end_unit < item.start_unit {
                    return Err(ScheduleError::EndsBeforeStart {
                        track: track.name.clone(),
                        label: item.label.clone(),
                        start: item.start_unit,
                        end: item.end_unit,
                    });
                }
                if item.end_unit > self.duration_count {
                    return Err(ScheduleError::PastLastUnit {
                        track: track.name.clone(),
                        label: item.label.clone(),
                        end: item.end_unit,
                        duration_count: self.duration_count,
                    });
                }
            }
        }
        Ok(())
    }
}
