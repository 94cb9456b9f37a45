use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Environment variable that replaces the list endpoint, the deployment-time
/// API URL override.
pub const API_URL_ENV: &str = "POSTER_CATALOG_API_URL";

const CONFIG_FILE: &str = "config.json";

/// Endpoints and storage location of the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL relative endpoints are resolved against.
    pub origin: String,
    /// Poster list endpoint, absolute or relative to `origin`.
    pub list_url: String,
    /// Directory holding `<id>.json` analysis fragments.
    pub generated_base: String,
    /// Where the snapshot store keeps its files.
    pub store_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".to_string(),
            list_url: "/data/posters.json".to_string(),
            generated_base: "/data/generated".to_string(),
            store_dir: project_dirs()
                .map(|dirs| dirs.cache_dir().to_path_buf())
                .unwrap_or_else(|| std::env::temp_dir().join("poster-catalog")),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "poster-catalog", "poster-catalog")
}

impl ViewerConfig {
    /// Defaults, then the per-user `config.json` if present, then the API URL
    /// environment override.
    pub fn load() -> Result<Self, CatalogError> {
        let mut config = match project_dirs() {
            Some(dirs) => Self::from_file(&dirs.config_dir().join(CONFIG_FILE))?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url(&url);
        }
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn from_file(path: &std::path::Path) -> Result<Self, CatalogError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                CatalogError::Configuration(format!("{}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Blank values leave the list endpoint untouched.
    pub fn apply_api_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.list_url = url.to_string();
        }
    }
}
