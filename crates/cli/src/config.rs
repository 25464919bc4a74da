//! CLI configuration utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use storefront_client::ClientConfig;
use storefront_client::config::default_data_dir;

/// Configuration file used when `--config` is not given
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// Load the client configuration and apply command-line overrides
pub fn resolve(
    path: Option<&Path>,
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
) -> Result<ClientConfig> {
    let default_path = default_config_path();
    let path = path.unwrap_or(&default_path);
    let mut config = ClientConfig::load(Some(path))
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    if let Some(api_url) = api_url {
        config.api_url = api_url;
    }
    if let Some(data_dir) = data_dir {
        config.session_file = data_dir.join("session.json");
    }

    Ok(config)
}

/// Write a configuration file holding the defaults
pub fn generate_default_config<P: AsRef<Path>>(path: P, force: bool) -> Result<()> {
    let path = path.as_ref();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(&ClientConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
