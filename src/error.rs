use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Cache directory unusable: {}", .0.display())]
    CacheDir(PathBuf),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Failed to launch player: {0}")]
    PlayerLaunch(String),

    #[error("No scraper command configured")]
    ScraperNotConfigured,

    #[error("Failed to launch scraper: {0}")]
    ScraperLaunch(String),
}

pub type Result<T> = std::result::Result<T, Error>;
