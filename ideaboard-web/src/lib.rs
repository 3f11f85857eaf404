pub mod api;
pub mod cli;
pub mod config;
pub mod state;
pub mod ws;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::warn;

use ideaboard_data::watcher::{FileWatcher, WatchEvent};

use crate::state::AppState;

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(api::health))
        .route("/ideas", get(api::list_ideas))
        .route("/ideas/{id}", get(api::get_idea))
        .route("/ideas/{id}/schedule", get(api::get_idea_schedule))
        .route("/ideas/{id}/timeline", get(api::get_idea_timeline))
        .route("/filters", get(api::get_filters))
        .route("/check_updates", get(api::check_updates))
        .route("/events", get(api::list_events))
}

/// Build the Axum router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build the router with static file serving for the frontend
pub fn build_router_with_static(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the file watcher that triggers state reloads on file changes.
///
/// Watch events arrive on a blocking channel, so they are drained on a
/// dedicated thread that hands each reload to the runtime. Must be called
/// from within a Tokio runtime.
pub fn start_file_watcher(state: Arc<AppState>) -> anyhow::Result<std::thread::JoinHandle<()>> {
    let watcher = FileWatcher::new(state.store().data_dir())?;
    let runtime = tokio::runtime::Handle::current();

    let handle = std::thread::spawn(move || {
        while let Ok(event) = watcher.receiver.recv() {
            match event {
                WatchEvent::Refresh => {
                    let state = state.clone();
                    runtime.spawn(async move {
                        state.reload().await;
                    });
                }
                WatchEvent::Error(e) => warn!(error = %e, "file watcher error"),
            }
        }
    });

    Ok(handle)
}

/// Reload the state every `period`, discarding the previous snapshot each time.
pub fn spawn_refresh_loop(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; the caller has already loaded.
        interval.tick().await;
        loop {
            interval.tick().await;
            state.reload().await;
        }
    })
}
