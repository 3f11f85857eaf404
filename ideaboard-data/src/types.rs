use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// An idea record as written to `ideas.json` by the generator.
///
/// Only `schedule` is interpreted by the schedule engine; the remaining fields
/// are carried for display. Keys this struct does not know are kept in
/// `extra` so a record survives a read/serve round trip unchanged. Display
/// fields are read leniently: a value of an unexpected type never costs the
/// whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub persona: String,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub modules: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub approach: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub viewpoint: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Kept as written (`4`, `4.5`); numeric strings are read as numbers.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub recommendation_score: Option<Number>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    /// Schedule of unknown shape, see [`crate::schedule::ScheduleInput`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// RFC 3339 timestamp. Compared as a string, the way the generator writes it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdeaRecord {
    /// Score used for sorting. Missing scores count as 0.
    pub fn score(&self) -> f64 {
        self.recommendation_score
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(0.0)
    }
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(scalar_string(value.as_ref()))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Number>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => Some(n),
        Some(Value::String(s)) => s.trim().parse::<Number>().ok(),
        _ => None,
    })
}

/// One entry of the activity feed in `events.json` (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: String,
    pub message: String,
}

/// A phase of a legacy schedule. Its position in the list is its time unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPhase {
    pub phase: Option<String>,
    pub month: Option<String>,
    pub tasks: Vec<RawTask>,
}

/// A task inside a [`RawPhase`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTask {
    pub name: String,
    pub actor: Option<String>,
    pub raci: Option<String>,
    pub duration: Option<String>,
    pub dependency: Option<String>,
}

impl RawPhase {
    /// Read a phase from loosely-typed JSON. Never fails: anything that is not
    /// an object reads as a phase with no label and no tasks.
    pub fn from_value(value: &Value) -> Self {
        let tasks = match value.get("tasks") {
            Some(Value::Array(items)) => items.iter().map(RawTask::from_value).collect(),
            _ => Vec::new(),
        };

        RawPhase {
            phase: scalar_string(value.get("phase")),
            month: scalar_string(value.get("month")),
            tasks,
        }
    }
}

impl RawTask {
    /// Read a task from loosely-typed JSON. Never fails.
    pub fn from_value(value: &Value) -> Self {
        RawTask {
            name: scalar_string(value.get("name")).unwrap_or_default(),
            actor: scalar_string(value.get("actor")),
            raci: scalar_string(value.get("raci")),
            duration: scalar_string(value.get("duration")),
            dependency: scalar_string(value.get("dependency")),
        }
    }
}

/// Strings pass through, numbers and booleans use their JSON text, and
/// null, arrays and objects read as absent.
pub(crate) fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// A non-negative whole number from a number or a numeric string.
/// Fractions are floored; negatives and other values read as absent.
pub(crate) fn whole_number(value: Option<&Value>) -> Option<u64> {
    let n = match value? {
        Value::Number(n) => match n.as_u64() {
            Some(whole) => return Some(whole),
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then(|| n.floor() as u64)
}
