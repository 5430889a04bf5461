pub mod schema;

pub use schema::{MembraneConfig, DEFAULT_API_URL};

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "MEMBRANE_TOKEN";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "MEMBRANE_API_URL";

/// Default membrane home directory (~/.membrane).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".membrane"))
        .unwrap_or_else(|| PathBuf::from(".membrane"))
}

/// Default config file location (~/.membrane/config.toml).
pub fn default_config_path() -> PathBuf {
    default_home_dir().join("config.toml")
}

/// Expand a user-supplied path that may start with `~`.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<MembraneConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read membrane config file")?;
        let config: MembraneConfig =
            toml::from_str(&contents).context("Failed to parse membrane config (TOML)")?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    } else {
        Ok(MembraneConfig::default())
    }
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &MembraneConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}

/// Overlay environment values onto `config`. Non-empty variables win.
pub fn apply_env_with<F>(mut config: MembraneConfig, lookup: F) -> MembraneConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    if let Some(token) = non_empty(TOKEN_ENV) {
        config.api_key = token;
    }
    if let Some(url) = non_empty(API_URL_ENV) {
        config.api_url = Some(url);
    }
    config
}

/// Build a config purely from the process environment.
pub fn from_env() -> Result<MembraneConfig> {
    let config = apply_env_with(MembraneConfig::default(), |name| std::env::var(name).ok());
    if !config.has_api_key() {
        bail!("{} is not set", TOKEN_ENV);
    }
    Ok(config)
}

/// Resolve the effective config: file, then environment, then an explicit URL override.
///
/// Fails when no layer supplies a token.
pub fn resolve_config(path: &Path, api_url_override: Option<&str>) -> Result<MembraneConfig> {
    let file = load_config(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    let mut config = apply_env_with(file, |name| std::env::var(name).ok());
    if let Some(url) = api_url_override {
        config.api_url = Some(url.to_string());
    }
    if !config.has_api_key() {
        bail!(
            "No Membrane API token configured. Set {} or run `membrane-tools configure --token <TOKEN>` (config: {})",
            TOKEN_ENV,
            path.display()
        );
    }
    Ok(config)
}
