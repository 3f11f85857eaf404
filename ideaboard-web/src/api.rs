use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use ideaboard_data::filter::{is_recent, RECENT_THRESHOLD};
use ideaboard_data::store::has_updates_since;
use ideaboard_data::{EventRecord, Facets, IdeaFilter, IdeaRecord, NormalizedSchedule, TimelineLayout};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// --- Ideas ---

#[derive(Debug, Serialize)]
pub struct IdeaListEntry {
    #[serde(flatten)]
    pub idea: IdeaRecord,
    /// Updated within the last ten minutes.
    pub recently_updated: bool,
}

pub async fn list_ideas(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<IdeaFilter>,
) -> Json<Vec<IdeaListEntry>> {
    let snapshot = state.snapshot().await;
    let now = Utc::now();

    let entries = filter
        .apply(snapshot.ideas.clone())
        .into_iter()
        .map(|idea| IdeaListEntry {
            recently_updated: is_recent(&idea, now, RECENT_THRESHOLD),
            idea,
        })
        .collect();

    Json(entries)
}

pub async fn get_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<IdeaRecord>, StatusCode> {
    state.get_idea(&id).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_idea_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NormalizedSchedule>, StatusCode> {
    let idea = state.get_idea(&id).await.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(idea.normalized_schedule()))
}

pub async fn get_idea_timeline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimelineLayout>, StatusCode> {
    let idea = state.get_idea(&id).await.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(idea.timeline()))
}

pub async fn get_filters(State(state): State<Arc<AppState>>) -> Json<Facets> {
    let snapshot = state.snapshot().await;
    Json(Facets::collect(&snapshot.ideas))
}

// --- Updates ---

#[derive(Deserialize)]
pub struct CheckUpdatesParams {
    pub last_timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct CheckUpdatesResponse {
    pub has_updates: bool,
}

pub async fn check_updates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckUpdatesParams>,
) -> Json<CheckUpdatesResponse> {
    let snapshot = state.snapshot().await;
    Json(CheckUpdatesResponse {
        has_updates: has_updates_since(&snapshot.ideas, &params.last_timestamp),
    })
}

// --- Events ---

pub async fn list_events(State(state): State<Arc<AppState>>) -> Json<Vec<EventRecord>> {
    let snapshot = state.snapshot().await;
    Json(snapshot.events.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use ideaboard_data::{Role, ScoreSort};
    use std::fs;

    fn test_state() -> Arc<AppState> {
        let dir = tempfile::tempdir().unwrap();
        AppState::open(dir.keep())
    }

    async fn loaded_state(ideas: &str) -> Arc<AppState> {
        let dir = tempfile::tempdir().unwrap().keep();
        fs::write(dir.join("ideas.json"), ideas).unwrap();
        let state = AppState::open(dir);
        state.reload().await;
        state
    }

    const IDEAS: &str = r#"[
        {"id": "a", "title": "Alpha", "target": "既存顧客", "modules": "Learning", "recommendation_score": 3,
         "updated_at": "2026-01-01T00:00:00+00:00",
         "schedule": [{"phase": "Phase 1", "tasks": [{"name": "Kickoff", "actor": "ベンダー", "duration": "2w", "dependency": "-"}]}]},
        {"id": "b", "title": "Beta", "target": "新規開拓", "modules": "Employee Central", "recommendation_score": 5,
         "updated_at": "2026-01-02T00:00:00+00:00"}
    ]"#;

    #[tokio::test]
    async fn test_health_returns_ok() {
        let response = health().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn test_list_ideas_empty() {
        let state = test_state();
        let response = list_ideas(State(state), Query(IdeaFilter::default())).await;
        assert!(response.0.is_empty());
    }

    #[tokio::test]
    async fn test_list_ideas_newest_first() {
        let state = loaded_state(IDEAS).await;
        let response = list_ideas(State(state), Query(IdeaFilter::default())).await;
        let ids: Vec<&str> = response.0.iter().map(|e| e.idea.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(!response.0[0].recently_updated);
    }

    #[tokio::test]
    async fn test_list_ideas_filtered_and_sorted() {
        let state = loaded_state(IDEAS).await;

        let filter = IdeaFilter {
            target: Some("既存顧客".to_string()),
            ..Default::default()
        };
        let response = list_ideas(State(state.clone()), Query(filter)).await;
        assert_eq!(response.0.len(), 1);
        assert_eq!(response.0[0].idea.id, "a");

        let filter = IdeaFilter {
            sort: ScoreSort::Asc,
            ..Default::default()
        };
        let response = list_ideas(State(state), Query(filter)).await;
        assert_eq!(response.0[0].idea.id, "a");
    }

    #[tokio::test]
    async fn test_get_nonexistent_idea_returns_404() {
        let state = test_state();
        let result = get_idea(State(state), Path("nonexistent".to_string())).await;
        assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_nonexistent_schedule_returns_404() {
        let state = test_state();
        let result = get_idea_schedule(State(state), Path("nonexistent".to_string())).await;
        assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_nonexistent_timeline_returns_404() {
        let state = test_state();
        let result = get_idea_timeline(State(state), Path("nonexistent".to_string())).await;
        assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_idea_schedule() {
        let state = loaded_state(IDEAS).await;
        let schedule = get_idea_schedule(State(state.clone()), Path("a".to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(schedule.duration_count, 1);
        assert_eq!(schedule.tasks[0].actor_role, Role::Vendor);

        let empty = get_idea_schedule(State(state), Path("b".to_string()))
            .await
            .unwrap()
            .0;
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_get_idea_timeline() {
        let state = loaded_state(IDEAS).await;
        let layout = get_idea_timeline(State(state), Path("a".to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.tracks[1].bars[0].label, "Kickoff");
    }

    #[tokio::test]
    async fn test_get_filters() {
        let state = loaded_state(IDEAS).await;
        let facets = get_filters(State(state)).await.0;
        assert_eq!(facets.targets, vec!["新規開拓", "既存顧客"]);
        assert_eq!(facets.modules, vec!["Employee Central", "Learning"]);
    }

    #[tokio::test]
    async fn test_check_updates() {
        let state = loaded_state(IDEAS).await;

        let params = CheckUpdatesParams {
            last_timestamp: "2026-01-01T12:00:00+00:00".to_string(),
        };
        let response = check_updates(State(state.clone()), Query(params)).await;
        assert!(response.0.has_updates);

        let params = CheckUpdatesParams {
            last_timestamp: "2026-01-02T00:00:00+00:00".to_string(),
        };
        let response = check_updates(State(state), Query(params)).await;
        assert!(!response.0.has_updates);
    }

    #[tokio::test]
    async fn test_list_events_empty() {
        let state = test_state();
        let response = list_events(State(state)).await;
        assert!(response.0.is_empty());
    }
}
