use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    /// Path to the pipe-delimited catalog file. Defaults to
    /// `<data dir>/movie_links.txt` when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Settings consumed by the image cache: whether caching is on, and where
/// the disk tier lives. A missing directory means the default cache dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Scraper executable; the selected movie URL is appended as the last
    /// argument. Scraping is unavailable when unset.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// File the scraper is expected to produce. Defaults to
    /// `<data dir>/scrape_result.txt` when unset.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    #[serde(default = "default_scraper_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
}

fn default_true() -> bool {
    true
}

fn default_player_command() -> String {
    "mpv".to_string()
}

fn default_scraper_timeout() -> u64 {
    30
}

fn default_accent_color() -> String {
    "magenta".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: Vec::new(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            output_file: None,
            timeout_secs: default_scraper_timeout(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "kino").ok_or(Error::NoConfigDir)
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn default_image_cache_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.cache_dir().join("images"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config, falling back to built-in defaults when the file is
    /// missing or malformed. Settings problems are never fatal.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Could not load config, using defaults: {}", e);
                Config::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.general.catalog_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("movie_links.txt")),
        }
    }

    pub fn scraper_output_file(&self) -> Result<PathBuf> {
        match &self.scraper.output_file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("scrape_result.txt")),
        }
    }

    pub fn scraper_timeout(&self) -> Duration {
        Duration::from_secs(self.scraper.timeout_secs)
    }
}
