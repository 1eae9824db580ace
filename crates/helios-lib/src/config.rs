//! Core settings: directory layout, endpoints and request limits.
//! Constructed once by the host application and handed to the services.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// URL Constants
pub const VANILLA_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";
pub const LIBRARIES_URL: &str = "https://libraries.minecraft.net";

pub const REQUEST_TIMEOUT_SECS: u64 = 120;
pub const VALIDATION_CONCURRENCY: usize = 16;

const DISTRIBUTION_FILE: &str = "distribution.json";
const DISTRIBUTION_DEV_FILE: &str = "distribution_dev.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    /// Root launcher directory; holds the distribution cache files
    pub launcher_dir: PathBuf,

    /// Shared game files (libraries, modstore, versions, assets)
    #[serde(default)]
    pub common_dir: Option<PathBuf>,

    /// Per-server instance directories
    #[serde(default)]
    pub instance_dir: Option<PathBuf>,

    #[serde(default)]
    pub distribution_url: String,

    #[serde(default = "default_version_manifest_url")]
    pub version_manifest_url: String,

    #[serde(default = "default_resources_url")]
    pub resources_url: String,

    #[serde(default = "default_libraries_url")]
    pub libraries_url: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_concurrency")]
    pub validation_concurrency: usize,
}

fn default_version_manifest_url() -> String {
    VANILLA_MANIFEST_URL.to_string()
}

fn default_resources_url() -> String {
    RESOURCES_URL.to_string()
}

fn default_libraries_url() -> String {
    LIBRARIES_URL.to_string()
}

fn default_timeout() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_concurrency() -> usize {
    VALIDATION_CONCURRENCY
}

impl CoreConfig {
    pub fn new(launcher_dir: impl Into<PathBuf>, distribution_url: impl Into<String>) -> Self {
        Self {
            launcher_dir: launcher_dir.into(),
            common_dir: None,
            instance_dir: None,
            distribution_url: distribution_url.into(),
            version_manifest_url: default_version_manifest_url(),
            resources_url: default_resources_url(),
            libraries_url: default_libraries_url(),
            request_timeout_secs: default_timeout(),
            validation_concurrency: default_concurrency(),
        }
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Read config file {:?}", path))?;
        let config: CoreConfig = serde_json::from_str(&data)
            .with_context(|| format!("Parse config file {:?}", path))?;
        Ok(config)
    }

    pub fn with_common_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.common_dir = Some(dir.into());
        self
    }

    pub fn with_instance_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.instance_dir = Some(dir.into());
        self
    }

    pub fn common_dir(&self) -> PathBuf {
        self.common_dir
            .clone()
            .unwrap_or_else(|| self.launcher_dir.join("common"))
    }

    pub fn instance_dir(&self) -> PathBuf {
        self.instance_dir
            .clone()
            .unwrap_or_else(|| self.launcher_dir.join("instances"))
    }

    /// Get the path to the libraries directory
    pub fn libraries_dir(&self) -> PathBuf {
        self.common_dir().join("libraries")
    }

    /// Get the path to the mod store directory
    pub fn modstore_dir(&self) -> PathBuf {
        self.common_dir().join("modstore")
    }

    /// Get the path to the versions directory
    pub fn versions_dir(&self) -> PathBuf {
        self.common_dir().join("versions")
    }

    /// Get the path to the assets directory
    pub fn assets_dir(&self) -> PathBuf {
        self.common_dir().join("assets")
    }

    pub fn distribution_cache_path(&self) -> PathBuf {
        self.launcher_dir.join(DISTRIBUTION_FILE)
    }

    pub fn distribution_dev_cache_path(&self) -> PathBuf {
        self.launcher_dir.join(DISTRIBUTION_DEV_FILE)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
