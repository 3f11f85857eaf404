use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REFRESH_SECS: u64 = 5;

/// Server configuration loaded from file, environment, and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// Directory holding `ideas.json` and `events.json`.
    pub data_dir: PathBuf,
    /// Directory of the built frontend, served when it exists.
    pub static_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Interval of the periodic full refresh.
    pub refresh_secs: u64,
}

/// Raw TOML file structure for `~/.config/ideaboard/config.toml`.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    refresh_secs: Option<u64>,
}

/// Values given on the command line. They win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Default config file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ideaboard").join("config.toml"))
}

impl WebConfig {
    /// Load configuration.
    ///
    /// Priority: CLI overrides, then `IDEABOARD_*` environment variables,
    /// then the config file, then defaults. A missing config file is fine.
    pub fn load(config_path: Option<&PathBuf>, overrides: CliOverrides) -> Result<Self> {
        let path = config_path.cloned().or_else(default_config_path);

        let file_config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?;
                toml::from_str::<ConfigFile>(&content)
                    .with_context(|| format!("failed to parse config: {}", path.display()))?
            }
            _ => ConfigFile::default(),
        };

        Self::resolve(file_config, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge parsed file values, an environment lookup, and CLI overrides.
    fn resolve(
        file_config: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: CliOverrides,
    ) -> Result<Self> {
        let data_dir = overrides
            .data_dir
            .or_else(|| env("IDEABOARD_DATA_DIR").map(PathBuf::from))
            .or(file_config.data_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let static_dir = overrides
            .static_dir
            .or_else(|| env("IDEABOARD_STATIC_DIR").map(PathBuf::from))
            .or(file_config.static_dir)
            .unwrap_or_else(|| PathBuf::from("static"));
        let host = overrides
            .host
            .or_else(|| env("IDEABOARD_HOST"))
            .or(file_config.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let env_port = match env("IDEABOARD_PORT") {
            Some(raw) => Some(
                raw.parse::<u16>()
                    .with_context(|| format!("invalid IDEABOARD_PORT: {}", raw))?,
            ),
            None => None,
        };
        let port = overrides
            .port
            .or(env_port)
            .or(file_config.port)
            .unwrap_or(DEFAULT_PORT);

        let env_refresh = match env("IDEABOARD_REFRESH_SECS") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .with_context(|| format!("invalid IDEABOARD_REFRESH_SECS: {}", raw))?,
            ),
            None => None,
        };
        let refresh_secs = env_refresh
            .or(file_config.refresh_secs)
            .unwrap_or(DEFAULT_REFRESH_SECS);
        if refresh_secs == 0 {
            bail!("refresh_secs must be at least 1");
        }

        Ok(Self {
            data_dir,
            static_dir,
            host,
            port,
            refresh_secs,
        })
    }

    /// Socket address to bind.
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
