//! User configuration handling.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Which provider backs the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Github,
    Azure,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub provider: Option<Provider>,
    /// Azure repository id or name; unused for GitHub.
    pub azure_repository: Option<String>,
    pub theme: Option<String>,
    /// Seconds between background thread polls.
    pub refresh_secs: Option<u64>,
}

impl UiConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_secs.unwrap_or(60))
    }
}

/// Load UI configuration from the user's config directory.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_ui_config() -> anyhow::Result<Option<UiConfig>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(Some(config))
}

/// Save UI configuration to the user's config directory.
///
/// # Errors
///
/// Returns an error if the config directory cannot be created or the file cannot be written.
pub fn save_ui_config(config: &UiConfig) -> anyhow::Result<()> {
    let Some(path) = config_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    Ok(())
}

fn config_path() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        Path::new(&home).join(".config")
    } else {
        return None;
    };

    Some(base.join("prdeck").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_parses_with_defaults() {
        let config: UiConfig =
            serde_json::from_str(r#"{"provider":"azure","refresh_secs":30}"#).unwrap();
        assert_eq!(config.provider, Some(Provider::Azure));
        assert_eq!(config.refresh_interval().as_secs(), 30);
        assert!(config.theme.is_none());
    }

    #[test]
    fn default_refresh_interval_is_a_minute() {
        assert_eq!(UiConfig::default().refresh_interval().as_secs(), 60);
    }
}
