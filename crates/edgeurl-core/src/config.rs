use crate::media::MediaType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `image_location` from the config file.
pub const IMAGE_LOCATION_ENV: &str = "EDGEURL_IMAGE_LOCATION";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("image_location is not set (config file, EDGEURL_IMAGE_LOCATION, or --base-location)")]
    MissingImageLocation,
    #[error("image_location {location:?} is not an absolute URL: {source}")]
    InvalidImageLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },
    #[error("cannot locate XDG directories: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("config io {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Global configuration loaded from `~/.config/edgeurl/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// CDN base location every edge URL starts with.
    #[serde(default)]
    pub image_location: String,
    /// Media kind assumed when a request names none.
    #[serde(default)]
    pub default_media_type: Option<MediaType>,
}

impl EdgeConfig {
    /// Applies `EDGEURL_IMAGE_LOCATION` when it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_image_location_override(std::env::var(IMAGE_LOCATION_ENV).ok())
    }

    pub fn with_image_location_override(mut self, location: Option<String>) -> Self {
        if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
            tracing::debug!("image_location overridden to {}", location);
            self.image_location = location;
        }
        self
    }

    /// Checks that a usable base location is configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let location = self.image_location.trim();
        if location.is_empty() {
            return Err(ConfigError::MissingImageLocation);
        }
        url::Url::parse(location).map_err(|source| ConfigError::InvalidImageLocation {
            location: location.to_string(),
            source,
        })?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("edgeurl")?;
    xdg_dirs
        .place_config_file("config.toml")
        .map_err(|source| ConfigError::Io {
            path: xdg_dirs.get_config_home(),
            source,
        })
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<EdgeConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = EdgeConfig::default();
        write_config(&path, &default_cfg)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: EdgeConfig = toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

pub fn write_config(path: &Path, cfg: &EdgeConfig) -> Result<(), ConfigError> {
    let toml = toml::to_string_pretty(cfg)?;
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, toml).map_err(io_err)
}
