// Tour configuration and its persistence

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::connection::types::{BucketSettings, FileRevision};

#[cfg(debug_assertions)]
const APP_NAME: &str = "mongo-tour-dev";

#[cfg(not(debug_assertions))]
const APP_NAME: &str = "mongo-tour";

const URI_ENV: &str = "MONGO_TOUR_URI";
const DATABASE_ENV: &str = "MONGO_TOUR_DATABASE";

/// Everything the tour needs to know about its target deployment and local files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Target of the JSON Lines bulk import
    #[serde(default = "default_import_collection")]
    pub import_collection: String,
    #[serde(default = "default_timeout_secs")]
    pub server_selection_timeout_secs: u64,
    /// Abort the run at the first failed step instead of reporting and continuing
    #[serde(default)]
    pub stop_on_error: bool,
    #[serde(default)]
    pub user: UserSettings,
    #[serde(default)]
    pub files: FileSettings,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            import_collection: default_import_collection(),
            server_selection_timeout_secs: default_timeout_secs(),
            stop_on_error: false,
            user: UserSettings::default(),
            files: FileSettings::default(),
        }
    }
}

impl TourConfig {
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_secs)
    }

    /// Apply `MONGO_TOUR_URI` / `MONGO_TOUR_DATABASE` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(uri) = lookup(URI_ENV).filter(|v| !v.trim().is_empty()) {
            self.uri = uri;
        }
        if let Some(database) = lookup(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.database = database;
        }
        self
    }
}

/// Credential created (after a reset) by the admin steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_user_name")]
    pub name: String,
    #[serde(default = "default_user_password")]
    pub password: String,
    #[serde(default = "default_user_roles")]
    pub roles: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            name: default_user_name(),
            password: default_user_password(),
            roles: default_user_roles(),
        }
    }
}

/// Local files and the GridFS bucket used by the file steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub bucket: BucketSettings,
    #[serde(default = "default_upload_path")]
    pub upload_path: PathBuf,
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,
    #[serde(default = "default_import_path")]
    pub import_path: PathBuf,
    /// Revision fetched by the download-by-name step
    #[serde(default = "default_revision")]
    pub revision: FileRevision,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            bucket: BucketSettings::default(),
            upload_path: default_upload_path(),
            download_path: default_download_path(),
            import_path: default_import_path(),
            revision: default_revision(),
        }
    }
}

impl FileSettings {
    /// Name stored in the bucket: the upload path's final component.
    pub fn upload_filename(&self) -> String {
        self.upload_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.upload_path.to_string_lossy().into_owned())
    }
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "testDB".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_import_collection() -> String {
    "colors".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_name() -> String {
    "superAdmin".to_string()
}

fn default_user_password() -> String {
    "000000".to_string()
}

fn default_user_roles() -> Vec<String> {
    vec!["readWrite".to_string()]
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("oldImage.jpg")
}

fn default_download_path() -> PathBuf {
    PathBuf::from("newImage.jpg")
}

fn default_import_path() -> PathBuf {
    PathBuf::from("colors.json")
}

fn default_revision() -> FileRevision {
    FileRevision::default()
}

/// Loads and saves the tour configuration file
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    const CONFIG_FILE: &'static str = "config.json";

    /// Create a new ConfigManager for the platform config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Use an explicit directory instead of the platform one
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the platform-specific config directory
    fn get_config_dir() -> Result<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME)).context("Could not determine config directory")
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(Self::CONFIG_FILE)
    }

    /// Load the saved configuration, or the defaults when none was saved
    pub fn load(&self) -> Result<TourConfig> {
        let path = self.config_path();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(TourConfig::default());
        }
        Self::load_from(&path)
    }

    /// Load a configuration from an explicit JSON file
    pub fn load_from(path: &Path) -> Result<TourConfig> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: TourConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to deserialize {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration (atomic via temp + rename)
    pub fn save(&self, config: &TourConfig) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).context("Failed to create config directory")?;
        }

        let path = self.config_path();
        let json = serde_json::to_string_pretty(config)
            .with_context(|| format!("Failed to serialize {}", Self::CONFIG_FILE))?;

        atomic_write(&path, json.as_bytes())
            .with_context(|| format!("Failed to write {}", Self::CONFIG_FILE))?;

        Ok(())
    }
}

/// Write to a temp file in the same directory, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(path);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
