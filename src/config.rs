use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub config_version: u32,
    pub depth: usize,
    pub package_marker: String,
    pub show_changed: bool,
    pub base_ref: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            depth: 1,
            package_marker: "package.yml".to_string(),
            show_changed: true,
            base_ref: "main".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_or_default() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        Self::parse(&raw).with_context(|| format!("failed to parse config: {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self> {
        let parsed = toml::from_str::<AppConfig>(raw)?;
        if parsed.config_version != CONFIG_VERSION {
            bail!(
                "unsupported config_version {} (expected {CONFIG_VERSION})",
                parsed.config_version
            );
        }
        Ok(parsed)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not resolve config directory")?;
    Ok(base.join("pkgmark").join("config.toml"))
}
