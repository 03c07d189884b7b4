use crate::daemon::DEFAULT_DAEMON_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub daemon_url: String,
    /// Persisted language preference, written by the settings page
    pub language: Option<String>,
    /// Prefix for outbound scrape requests; the target URL is appended
    /// percent-encoded (e.g. `https://corsproxy.io/?`)
    pub relay_url: Option<String>,
    pub package_site: String,
    pub screenshot_site: String,
    pub suite: String,
    pub catalog_path: Option<PathBuf>,
    pub locales_dir: Option<PathBuf>,
    pub list_description_limit: usize,
    pub detail_description_limit: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_url: DEFAULT_DAEMON_URL.to_string(),
            language: None,
            relay_url: None,
            package_site: "https://packages.debian.org".to_string(),
            screenshot_site: "https://screenshots.debian.net".to_string(),
            suite: "trixie".to_string(),
            catalog_path: None,
            locales_dir: None,
            list_description_limit: 160,
            detail_description_limit: 400,
            request_timeout_secs: 15,
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/andistro-center/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        log::info!("config saved to {}", path.display());
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
