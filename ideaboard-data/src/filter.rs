//! Filtering, score sorting, facet values, and recency of ideas.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::IdeaRecord;

/// How long an idea counts as recently updated.
pub const RECENT_THRESHOLD: Duration = Duration::from_secs(10 * 60);

const ALL: &str = "all";
const MODULE_SEPARATOR: char = ',';
const AUDIENCE_SEPARATOR: char = '・';

/// Order by recommendation score. `Default` keeps the incoming order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSort {
    #[default]
    Default,
    Desc,
    Asc,
}

/// Criteria for narrowing the idea list. `None` and `"all"` match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdeaFilter {
    pub target: Option<String>,
    pub module: Option<String>,
    pub audience: Option<String>,
    #[serde(default)]
    pub sort: ScoreSort,
}

fn active(criterion: &Option<String>) -> Option<&str> {
    criterion.as_deref().filter(|c| !c.is_empty() && *c != ALL)
}

impl IdeaFilter {
    /// Target must match exactly; module and audience match as substrings.
    pub fn matches(&self, idea: &IdeaRecord) -> bool {
        let target = active(&self.target).map_or(true, |t| idea.target.as_deref() == Some(t));
        let module = active(&self.module).map_or(true, |m| {
            idea.modules.as_deref().is_some_and(|modules| modules.contains(m))
        });
        let audience = active(&self.audience).map_or(true, |a| {
            idea.target_audience
                .as_deref()
                .is_some_and(|audience| audience.contains(a))
        });
        target && module && audience
    }

    /// Keep matching ideas and order them by score. Ties keep their order.
    pub fn apply(&self, ideas: Vec<IdeaRecord>) -> Vec<IdeaRecord> {
        let mut filtered: Vec<IdeaRecord> = ideas.into_iter().filter(|i| self.matches(i)).collect();

        match self.sort {
            ScoreSort::Default => {}
            ScoreSort::Desc => filtered.sort_by(|a, b| b.score().total_cmp(&a.score())),
            ScoreSort::Asc => filtered.sort_by(|a, b| a.score().total_cmp(&b.score())),
        }

        filtered
    }
}

/// Distinct filter values present in a set of ideas, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub targets: Vec<String>,
    pub modules: Vec<String>,
    pub audiences: Vec<String>,
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

impl Facets {
    pub fn collect(ideas: &[IdeaRecord]) -> Self {
        let mut facets = Facets::default();

        for idea in ideas {
            if let Some(target) = &idea.target {
                push_unique(&mut facets.targets, target);
            }
            if let Some(modules) = &idea.modules {
                for module in modules.split(MODULE_SEPARATOR) {
                    push_unique(&mut facets.modules, module);
                }
            }
            if let Some(audience) = &idea.target_audience {
                for part in audience.split(AUDIENCE_SEPARATOR) {
                    push_unique(&mut facets.audiences, part);
                }
            }
        }

        facets
    }
}

/// Parse an `updated_at` value. Offset-less timestamps are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Whether `idea` was updated within `threshold` of `now`. Unparseable
/// timestamps are never recent.
pub fn is_recent(idea: &IdeaRecord, now: DateTime<Utc>, threshold: Duration) -> bool {
    let Some(updated_at) = parse_timestamp(&idea.updated_at) else {
        return false;
    };
    match (now - updated_at).to_std() {
        Ok(age) => age <= threshold,
        // Timestamps in the future count as just updated.
        Err(_) => true,
    }
}
