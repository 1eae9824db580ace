/// Validation output shared by the distribution and Mojang index processors
use crate::utils::hash::HashAlgo;
use serde::Serialize;
use std::path::PathBuf;

/// A file that is missing locally or does not match its published hash.
/// Produced only as validation output and handed to the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    /// Expected hash; `None` means only presence is checked
    pub hash: Option<String>,
    pub algo: HashAlgo,
    pub size: u64,
    pub url: String,
    pub path: PathBuf,
}

/// Everything the Mojang index processor found to be missing or invalid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub assets: Vec<Asset>,
    pub libraries: Vec<Asset>,
    pub client: Vec<Asset>,
    pub misc: Vec<Asset>,
}

impl ValidationResult {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
            && self.libraries.is_empty()
            && self.client.is_empty()
            && self.misc.is_empty()
    }

    pub fn total(&self) -> usize {
        self.assets.len() + self.libraries.len() + self.client.len() + self.misc.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets
            .iter()
            .chain(&self.libraries)
            .chain(&self.client)
            .chain(&self.misc)
    }
}
