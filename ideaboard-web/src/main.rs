use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use ideaboard_web::cli::{self, Cli, Command};
use ideaboard_web::config::WebConfig;
use ideaboard_web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command() {
        Command::Schedule { file, layout } => {
            let ideas = cli::read_ideas(&file)?;
            print!("{}", cli::render_schedules(&ideas, layout)?);
            Ok(())
        }
        Command::Serve => serve(&cli).await,
    }
}

async fn serve(cli: &Cli) -> Result<()> {
    let config = WebConfig::load(cli.config.as_ref(), cli.overrides())?;
    info!(data_dir = %config.data_dir.display(), "loaded config");

    let state = AppState::open(config.data_dir.clone());

    // Load initial data
    state.reload().await;

    // File watcher plus a periodic refresh in case events are missed
    let _watcher = match ideaboard_web::start_file_watcher(state.clone()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "file watcher unavailable, relying on periodic refresh");
            None
        }
    };
    let _refresh = ideaboard_web::spawn_refresh_loop(
        state.clone(),
        Duration::from_secs(config.refresh_secs),
    );

    let app = if config.static_dir.exists() {
        info!("Serving static files from {}", config.static_dir.display());
        ideaboard_web::build_router_with_static(state, &config.static_dir)
    } else {
        info!("No static directory found, serving API only");
        ideaboard_web::build_router(state)
    };

    let addr = config.addr()?;
    info!("ideaboard-web listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
