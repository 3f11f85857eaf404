use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use ideaboard_data::IdeaRecord;

use crate::config::CliOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "ideaboard-web",
    about = "Serves the idea dashboard and renders idea schedules"
)]
pub struct Cli {
    /// Path to config file (default: ~/.config/ideaboard/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding ideas.json and events.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory of static frontend files
    #[arg(long, global = true)]
    pub static_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub host: Option<String>,

    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the web server (default)
    Serve,
    /// Print the normalized schedule of each idea in FILE
    Schedule {
        /// A JSON file with one idea or an array of ideas
        file: PathBuf,
        /// Print the timeline layout instead of the schedule
        #[arg(long)]
        layout: bool,
    },
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            data_dir: self.data_dir.clone(),
            static_dir: self.static_dir.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

/// Read ideas from `path`, accepting either a single object or an array.
pub fn read_ideas(path: &Path) -> Result<Vec<IdeaRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let ideas = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<IdeaRecord>, _>>(),
        other => serde_json::from_value(other).map(|idea| vec![idea]),
    };
    ideas.with_context(|| format!("Invalid idea record in {}", path.display()))
}

/// Render each idea's schedule (or timeline layout) as pretty JSON, one
/// document per idea.
pub fn render_schedules(ideas: &[IdeaRecord], layout: bool) -> Result<String> {
    let mut out = String::new();
    for idea in ideas {
        let rendered = if layout {
            serde_json::to_string_pretty(&idea.timeline())?
        } else {
            serde_json::to_string_pretty(&idea.normalized_schedule())?
        };
        out.push_str(&rendered);
        out.push('\n');
    }
    Ok(out)
}
