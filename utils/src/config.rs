use anyhow::{Context, Result, bail};
use bridge_client::{BridgeConfig, bridge_config::DEFAULT_ENDPOINT};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENDPOINT_ENV: &str = "FLAMINGO_BRIDGE_ENDPOINT";
pub const TOKEN_ENV: &str = "FLAMINGO_BRIDGE_TOKEN";
pub const CONFIG_FILE_NAME: &str = "native-host.json";

#[cfg(any(target_os = "windows", target_os = "macos"))]
const APP_DIR_NAME: &str = "Flamingo Downloader";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const APP_DIR_NAME: &str = "flamingo-downloader";

/// Per-user application directory: `%APPDATA%`, `~/Library/Application Support`
/// or `~/.config`, joined with the application folder name.
pub fn app_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

pub fn default_config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

pub fn default_log_dir() -> PathBuf {
    app_dir()
        .unwrap_or_else(env::temp_dir)
        .join("logs")
}

/// Reads the bridge config from the process environment and `config_path`.
pub fn load_bridge_config(config_path: Option<&Path>) -> BridgeConfig {
    resolve_bridge_config(|key| env::var(key).ok(), config_path)
}

/// Environment values first, then non-empty fields from the config file on top.
///
/// A broken config file is logged and skipped, it never prevents startup.
pub fn resolve_bridge_config<F>(env_lookup: F, config_path: Option<&Path>) -> BridgeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = BridgeConfig::new(
        env_lookup(ENDPOINT_ENV).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        env_lookup(TOKEN_ENV).unwrap_or_default(),
    );

    let Some(path) = config_path else {
        return config;
    };
    if !path.exists() {
        debug!("no config file at {}", path.display());
        return config;
    }

    match read_overrides(path) {
        Ok(overrides) => overrides.apply(&mut config),
        Err(e) => warn!("failed to parse config {}: {:#}", path.display(), e),
    }

    config
}

#[derive(Debug, Default, PartialEq, Eq)]
struct FileOverrides {
    endpoint: Option<String>,
    token: Option<String>,
}

impl FileOverrides {
    fn apply(self, config: &mut BridgeConfig) {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(token) = self.token {
            config.token = token;
        }
    }
}

fn read_overrides(path: &Path) -> Result<FileOverrides> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).context("Invalid JSON")?;
    let Value::Object(map) = value else {
        bail!("config root must be a JSON object");
    };

    let field = |name: &str| {
        map.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    Ok(FileOverrides {
        endpoint: field("endpoint"),
        token: field("token"),
    })
}
