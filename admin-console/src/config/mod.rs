use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub auth_service: AuthServiceSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthServiceSettings {
    /// Base URL of the auth server (login, refresh, me).
    #[serde(default = "default_auth_url")]
    pub url: String,
}

impl Default for AuthServiceSettings {
    fn default() -> Self {
        Self {
            url: default_auth_url(),
        }
    }
}

fn default_auth_url() -> String {
    "http://localhost:8001".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    /// Base URL of the API gateway.
    #[serde(default = "default_gateway_url")]
    pub url: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
        }
    }
}

fn default_gateway_url() -> String {
    "http://localhost:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    /// Per-request timeout; an elapsed timeout is reported as a network error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Where tokens, the cached profile and the theme are persisted.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            state_file: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured state file, else `~/.admin-console/state.json`, else a
    /// file in the working directory when no home directory is known.
    pub fn state_file_path(&self) -> PathBuf {
        if let Some(path) = &self.state_file {
            return path.clone();
        }
        dirs::home_dir()
            .map(|home| home.join(".admin-console").join("state.json"))
            .unwrap_or_else(|| PathBuf::from("admin-console-state.json"))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP/gRPC collector; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load `config/base.yaml` (relative to the crate directory or the working
/// directory) layered with `APP_*` environment overrides.
pub fn get_configuration() -> Result<Settings, console_core::error::CoreError> {
    let base_path = std::env::current_dir()?;

    // Either we run from inside admin-console/ or from the workspace root
    let configuration_directory = if base_path.ends_with("admin-console") {
        base_path.join("config")
    } else {
        base_path.join("admin-console").join("config")
    };

    load_from(&configuration_directory)
}

pub fn load_from(configuration_directory: &Path) -> Result<Settings, console_core::error::CoreError> {
    console_core::config::load_layered(configuration_directory)
}
