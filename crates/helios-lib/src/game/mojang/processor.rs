//! Vanilla version index: descriptor and asset index acquisition, then
//! validation of assets, libraries, the client jar and the log config.

use super::rules::{library_applies, native_classifier};
use super::types::{AssetIndex, Library, VersionJson, VersionManifest};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, NetworkFailure};
use crate::game::asset::{Asset, ValidationResult};
use crate::game::maven::{Coordinate, DEFAULT_EXTENSION};
use crate::game::progress::{ProgressReporter, SilentProgressReporter};
use crate::net::{log_fetch_failure, parse_json, HttpClient};
use crate::utils::fs::{relative_path, write_cache_file};
use crate::utils::hash::{calculate_hash, hashes_match, validate_local_file, HashAlgo};
use crate::utils::platform::{Arch, OsType};
use futures::future;
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::fs;
use url::Url;

const VALIDATION_STAGES: u32 = 4;

/// Hash a cached or downloaded file must carry to be trusted
#[derive(Debug, Clone, Copy)]
pub struct ExpectedHash<'a> {
    pub algo: HashAlgo,
    pub value: &'a str,
}

impl<'a> ExpectedHash<'a> {
    pub fn sha1(value: &'a str) -> Self {
        Self {
            algo: HashAlgo::Sha1,
            value,
        }
    }
}

/// Load a JSON document, preferring the local copy.
///
/// A local file is used when it exists and either no hash is expected or its
/// hash matches; otherwise the document is fetched once from `url`, checked
/// against the hash and written back verbatim. `Ok(None)` means the remote
/// attempt failed and there was nothing usable locally. A local file that
/// passes the hash check but cannot be read or parsed is a `CorruptCache`.
pub async fn load_with_remote_fallback<T: DeserializeOwned>(
    http: &HttpClient,
    url: &str,
    path: &Path,
    expected: Option<ExpectedHash<'_>>,
) -> CoreResult<Option<T>> {
    match fs::read(path).await {
        Ok(bytes) => {
            let trusted = match expected {
                None => true,
                Some(hash) => hashes_match(&calculate_hash(&bytes, hash.algo), hash.value),
            };
            if trusted {
                return serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                    log::error!("Corrupt cache file {:?}: {}", path, e);
                    CoreError::corrupt_cache(path, e)
                });
            }
            log::info!("Cached {:?} is stale, fetching {}", path, url);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No cached copy at {:?}, fetching {}", path, url);
        }
        Err(e) => {
            log::error!("Corrupt cache file {:?}: {}", path, e);
            return Err(CoreError::corrupt_cache(path, e));
        }
    }

    match fetch_verified(http, url, expected).await {
        Ok((value, bytes)) => {
            write_cache_file(path, &bytes).await;
            Ok(Some(value))
        }
        Err(failure) => {
            log_fetch_failure("load index", &failure);
            Ok(None)
        }
    }
}

async fn fetch_verified<T: DeserializeOwned>(
    http: &HttpClient,
    url: &str,
    expected: Option<ExpectedHash<'_>>,
) -> Result<(T, Vec<u8>), NetworkFailure> {
    let bytes = http.get_bytes(url).await?;
    if let Some(hash) = expected {
        let actual = calculate_hash(&bytes, hash.algo);
        if !hashes_match(&actual, hash.value) {
            return Err(NetworkFailure::Integrity {
                url: url.to_string(),
                expected: hash.value.to_string(),
                actual,
            });
        }
    }
    let value = parse_json(url, &bytes)?;
    Ok((value, bytes))
}

/// The descriptor's SHA-1 is the second-to-last path segment of its URL.
fn descriptor_hash(url: &str) -> CoreResult<String> {
    let format_changed = || {
        log::error!("Version descriptor URL has an unexpected shape: {}", url);
        CoreError::FormatChanged {
            what: "version descriptor url".to_string(),
            value: url.to_string(),
        }
    };

    let parsed = Url::parse(url).map_err(|_| format_changed())?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();

    match segments.len().checked_sub(2).map(|i| segments[i]) {
        Some(hash) if hash.len() == 40 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            Ok(hash.to_string())
        }
        _ => Err(format_changed()),
    }
}

fn unavailable(detail: String) -> CoreError {
    log::error!("No usable source [load version index]: {}", detail);
    CoreError::ContentUnavailable(detail)
}

/// Coordinate of a Mojang library name, `group:artifact:version[:classifier][@ext]`
fn library_coordinate(name: &str, classifier: Option<&str>) -> Option<Coordinate> {
    let (name, extension) = match name.split_once('@') {
        Some((name, ext)) => (name, Some(ext)),
        None => (name, None),
    };

    let parts: Vec<&str> = name.split(':').collect();
    let (group, artifact, version, named_classifier) = match parts.as_slice() {
        [g, a, v] => (*g, *a, *v, None),
        [g, a, v, c] => (*g, *a, *v, Some(*c)),
        _ => return None,
    };

    Some(Coordinate {
        group: group.to_string(),
        artifact: artifact.to_string(),
        version: version.to_string(),
        classifier: classifier.or(named_classifier).map(str::to_string),
        extension: extension.unwrap_or(DEFAULT_EXTENSION).to_string(),
        explicit_extension: extension.is_some(),
    })
}

/// Keep only the assets that are missing or fail their hash check, in input order
async fn invalid_only(candidates: Vec<Asset>, concurrency: usize) -> Vec<Asset> {
    stream::iter(candidates)
        .map(|asset| async move {
            if validate_local_file(&asset.path, asset.algo, asset.hash.as_deref()).await {
                None
            } else {
                Some(asset)
            }
        })
        .buffered(concurrency)
        .filter_map(future::ready)
        .collect()
        .await
}

struct LoadedIndex {
    version_json: VersionJson,
    asset_index: AssetIndex,
}

/// Loads and validates one vanilla game version.
///
/// `init` must succeed before anything can be validated.
pub struct VersionIndexProcessor {
    config: CoreConfig,
    http: HttpClient,
    version: String,
    os: OsType,
    arch: Arch,
    loaded: Option<LoadedIndex>,
}

impl VersionIndexProcessor {
    pub fn new(config: CoreConfig, http: HttpClient, version: impl Into<String>) -> Self {
        Self {
            config,
            http,
            version: version.into(),
            os: OsType::current(),
            arch: Arch::current(),
            loaded: None,
        }
    }

    /// Evaluate library rules for another platform than the host
    pub fn with_platform(mut self, os: OsType, arch: Arch) -> Self {
        self.os = os;
        self.arch = arch;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_initialized(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn version_json(&self) -> Option<&VersionJson> {
        self.loaded.as_ref().map(|l| &l.version_json)
    }

    pub fn asset_index(&self) -> Option<&AssetIndex> {
        self.loaded.as_ref().map(|l| &l.asset_index)
    }

    /// Acquire the version descriptor and its asset index.
    ///
    /// An unreachable version manifest is tolerated: the descriptor must then
    /// already be on disk and is trusted without a hash check.
    pub async fn init(&mut self) -> CoreResult<()> {
        let manifest = self.fetch_version_manifest().await;
        let version_json = self.load_version_json(manifest.as_ref()).await?;
        let asset_index = self.load_asset_index(&version_json).await?;

        log::info!(
            "Initialised version {} ({} libraries, {} asset objects)",
            version_json.id,
            version_json.libraries.len(),
            asset_index.objects.len()
        );

        self.loaded = Some(LoadedIndex {
            version_json,
            asset_index,
        });
        Ok(())
    }

    pub async fn validate(&self) -> CoreResult<ValidationResult> {
        self.validate_with_reporter(&SilentProgressReporter).await
    }

    /// Check every asset, library, the client jar and the log config against
    /// local files. The four classes run concurrently; within each class the
    /// output keeps input order.
    pub async fn validate_with_reporter(
        &self,
        reporter: &dyn ProgressReporter,
    ) -> CoreResult<ValidationResult> {
        let loaded = self.loaded.as_ref().ok_or_else(|| {
            CoreError::ContentUnavailable(format!(
                "version {} must be initialised before validation",
                self.version
            ))
        })?;

        reporter.start_step(
            &format!("Validating files for {}", self.version),
            Some(VALIDATION_STAGES),
        );

        let concurrency = self.config.validation_concurrency.max(1);
        let finished = AtomicU32::new(0);
        let stage = |candidates: Vec<Asset>| {
            let finished = &finished;
            async move {
                let invalid = invalid_only(candidates, concurrency).await;
                let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
                reporter.set_step_count(done, Some(VALIDATION_STAGES));
                invalid
            }
        };

        let (assets, libraries, client, misc) = tokio::join!(
            stage(self.asset_candidates(&loaded.asset_index)),
            stage(self.library_candidates(&loaded.version_json)),
            stage(self.client_candidates(&loaded.version_json)),
            stage(self.log_config_candidates(&loaded.version_json)),
        );

        let result = ValidationResult {
            assets,
            libraries,
            client,
            misc,
        };
        log::info!(
            "Version {}: {} asset(s), {} librar(ies), {} client and {} misc file(s) need downloading",
            self.version,
            result.assets.len(),
            result.libraries.len(),
            result.client.len(),
            result.misc.len()
        );
        reporter.done(true, None);
        Ok(result)
    }

    async fn fetch_version_manifest(&self) -> Option<VersionManifest> {
        match self
            .http
            .get_json(&self.config.version_manifest_url)
            .await
        {
            Ok(manifest) => Some(manifest),
            Err(failure) => {
                log_fetch_failure("load version manifest", &failure);
                log::warn!(
                    "Continuing without the version manifest; version {} must be available locally",
                    self.version
                );
                None
            }
        }
    }

    fn version_json_path(&self) -> PathBuf {
        self.config
            .versions_dir()
            .join(&self.version)
            .join(format!("{}.json", self.version))
    }

    async fn load_version_json(&self, manifest: Option<&VersionManifest>) -> CoreResult<VersionJson> {
        let path = self.version_json_path();

        let Some(manifest) = manifest else {
            return self.read_local_version_json(&path).await;
        };

        let entry = manifest.find(&self.version).ok_or_else(|| {
            unavailable(format!(
                "version {} is not listed in the version manifest",
                self.version
            ))
        })?;
        let hash = descriptor_hash(&entry.url)?;

        load_with_remote_fallback(&self.http, &entry.url, &path, Some(ExpectedHash::sha1(&hash)))
            .await?
            .ok_or_else(|| unavailable(format!("no usable descriptor for version {}", self.version)))
    }

    async fn read_local_version_json(&self, path: &Path) -> CoreResult<VersionJson> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(unavailable(format!(
                    "version manifest unreachable and no local descriptor at {:?}",
                    path
                )));
            }
            Err(e) => {
                log::error!("Corrupt cache file {:?}: {}", path, e);
                return Err(CoreError::corrupt_cache(path, e));
            }
        };

        log::info!("Using local descriptor {:?} without verification", path);
        serde_json::from_slice(&bytes).map_err(|e| {
            log::error!("Corrupt cache file {:?}: {}", path, e);
            CoreError::corrupt_cache(path, e)
        })
    }

    async fn load_asset_index(&self, version_json: &VersionJson) -> CoreResult<AssetIndex> {
        let index_ref = version_json.asset_index.as_ref().ok_or_else(|| {
            unavailable(format!("version {} declares no asset index", version_json.id))
        })?;

        let path = self
            .config
            .assets_dir()
            .join("indexes")
            .join(format!("{}.json", index_ref.id));

        load_with_remote_fallback(
            &self.http,
            &index_ref.url,
            &path,
            Some(ExpectedHash::sha1(&index_ref.sha1)),
        )
        .await?
        .ok_or_else(|| unavailable(format!("no usable asset index {}", index_ref.id)))
    }

    fn asset_candidates(&self, index: &AssetIndex) -> Vec<Asset> {
        let objects_dir = self.config.assets_dir().join("objects");
        let resources = self.config.resources_url.trim_end_matches('/');

        index
            .objects
            .iter()
            .map(|(name, object)| {
                let prefix = object.hash.get(..2).unwrap_or(&object.hash);
                Asset {
                    id: name.clone(),
                    hash: Some(object.hash.clone()),
                    algo: HashAlgo::Sha1,
                    size: object.size,
                    url: format!("{}/{}/{}", resources, prefix, object.hash),
                    path: objects_dir.join(prefix).join(&object.hash),
                }
            })
            .collect()
    }

    fn library_candidates(&self, version_json: &VersionJson) -> Vec<Asset> {
        version_json
            .libraries
            .iter()
            .filter(|lib| library_applies(lib, self.os, self.arch))
            .filter_map(|lib| self.library_candidate(lib))
            .collect()
    }

    fn library_candidate(&self, library: &Library) -> Option<Asset> {
        let downloads = library.downloads.as_ref();
        let classifier = native_classifier(library, self.os, self.arch);
        let artifact = match &classifier {
            Some(classifier) => downloads
                .and_then(|d| d.classifiers.as_ref())
                .and_then(|c| c.get(classifier)),
            None => downloads.and_then(|d| d.artifact.as_ref()),
        };

        let coordinate = library_coordinate(&library.name, classifier.as_deref());

        let relative = artifact
            .and_then(|a| a.path.clone())
            .or_else(|| coordinate.as_ref().map(Coordinate::to_relative_path));
        let url = artifact
            .and_then(|a| a.url.clone())
            .filter(|url| !url.is_empty())
            .or_else(|| {
                let repo = library.url.as_deref().unwrap_or(&self.config.libraries_url);
                coordinate.as_ref().map(|c| c.url(repo))
            });

        let (Some(relative), Some(url)) = (relative, url) else {
            log::warn!("Skipping library {} with no derivable path", library.name);
            return None;
        };

        Some(Asset {
            id: library.name.clone(),
            hash: artifact.and_then(|a| a.sha1.clone()),
            algo: HashAlgo::Sha1,
            size: artifact.and_then(|a| a.size).unwrap_or(0),
            url,
            path: self.config.libraries_dir().join(relative_path(&relative)),
        })
    }

    fn client_candidates(&self, version_json: &VersionJson) -> Vec<Asset> {
        let Some(client) = version_json.client_download() else {
            log::debug!("Version {} has no client download", version_json.id);
            return Vec::new();
        };

        vec![Asset {
            id: format!("{}.jar", version_json.id),
            hash: Some(client.sha1.clone()),
            algo: HashAlgo::Sha1,
            size: client.size,
            url: client.url.clone(),
            path: self
                .config
                .versions_dir()
                .join(&version_json.id)
                .join(format!("{}.jar", version_json.id)),
        }]
    }

    fn log_config_candidates(&self, version_json: &VersionJson) -> Vec<Asset> {
        let Some(client) = version_json.logging.as_ref().and_then(|l| l.client.as_ref()) else {
            return Vec::new();
        };

        let file = &client.file;
        vec![Asset {
            id: file.id.clone(),
            hash: Some(file.sha1.clone()),
            algo: HashAlgo::Sha1,
            size: file.size,
            url: file.url.clone(),
            path: self.config.assets_dir().join("log_configs").join(&file.id),
        }]
    }
}
