// Application settings.
// Loaded from settings.json in the config directory, then overridden by environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::paths;
use crate::error::{BordadoError, Result};

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound for a single API request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    /// Writable cache database. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Template copied into place when the cache database does not exist yet.
    pub seed_database_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            database_path: None,
            seed_database_path: None,
        }
    }
}

impl Settings {
    /// Load settings from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = match paths::settings_path() {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read a settings file, or return defaults if it does not exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply `BORDADO_*` overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("BORDADO_API_URL") {
            self.api_base_url = url;
        }
        if let Some(size) = lookup("BORDADO_PAGE_SIZE") {
            self.page_size = size
                .parse()
                .map_err(|_| BordadoError::Config(format!("BORDADO_PAGE_SIZE: {size:?}")))?;
        }
        if let Some(secs) = lookup("BORDADO_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .parse()
                .map_err(|_| BordadoError::Config(format!("BORDADO_TIMEOUT_SECS: {secs:?}")))?;
        }
        if let Some(path) = lookup("BORDADO_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("BORDADO_SEED_DB") {
            self.seed_database_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(BordadoError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.page_size == 0 {
            return Err(BordadoError::Config("page_size must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(BordadoError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolved cache database path.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => paths::database_path()
                .ok_or_else(|| BordadoError::Config("could not find data directory".to_string())),
        }
    }
}
