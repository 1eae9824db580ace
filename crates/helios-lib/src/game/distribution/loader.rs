use super::model::Distribution;
use super::types::RawDistribution;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, NetworkFailure};
use crate::net::{log_fetch_failure, parse_json, HttpClient};
use crate::utils::fs::write_cache_file;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

const OPERATION: &str = "load distribution";

/// Acquires the distribution manifest and keeps the resolved tree.
///
/// Normal mode tries the remote URL once, persisting the payload once it builds and
/// falling back to the last good local copy on failure. Development mode only
/// reads the separate dev copy.
pub struct DistributionLoader {
    config: CoreConfig,
    http: HttpClient,
    dev_mode: AtomicBool,
    distribution: RwLock<Option<Arc<Distribution>>>,
}

impl DistributionLoader {
    pub fn new(config: CoreConfig, http: HttpClient) -> Self {
        Self {
            config,
            http,
            dev_mode: AtomicBool::new(false),
            distribution: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode.load(Ordering::SeqCst)
    }

    /// Switch sources. Takes effect on the next load or refresh.
    pub fn set_dev_mode(&self, dev: bool) {
        log::info!("Distribution dev mode {}", if dev { "enabled" } else { "disabled" });
        self.dev_mode.store(dev, Ordering::SeqCst);
    }

    /// Return the loaded distribution, loading it on first use
    pub async fn get_distribution(&self) -> CoreResult<Arc<Distribution>> {
        if let Some(distribution) = self.distribution.read().await.as_ref() {
            return Ok(Arc::clone(distribution));
        }

        let mut slot = self.distribution.write().await;
        if let Some(distribution) = slot.as_ref() {
            return Ok(Arc::clone(distribution));
        }

        let distribution = Arc::new(self.acquire_and_build().await?);
        *slot = Some(Arc::clone(&distribution));
        Ok(distribution)
    }

    /// Reload and replace the tree wholesale. If no source yields data, keep
    /// serving the previously loaded tree when there is one.
    pub async fn refresh_distribution_or_fallback(&self) -> CoreResult<Arc<Distribution>> {
        match self.load_distribution().await {
            Ok(distribution) => Ok(distribution),
            Err(CoreError::FatalUnavailable { operation, detail }) => {
                match self.distribution.read().await.as_ref() {
                    Some(previous) => {
                        log::warn!("Distribution refresh failed, keeping the loaded distribution");
                        Ok(Arc::clone(previous))
                    }
                    None => Err(CoreError::FatalUnavailable { operation, detail }),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Run the acquisition state machine, resolve the tree and store it
    pub async fn load_distribution(&self) -> CoreResult<Arc<Distribution>> {
        let distribution = Arc::new(self.acquire_and_build().await?);
        *self.distribution.write().await = Some(Arc::clone(&distribution));
        log::info!(
            "Loaded distribution {} with {} server(s)",
            distribution.version(),
            distribution.servers().len()
        );
        Ok(distribution)
    }

    /// Resolve the acquired manifest. A remote payload replaces the local copy
    /// only once it has built into a tree, so a broken publish never
    /// overwrites the last good file.
    async fn acquire_and_build(&self) -> CoreResult<Distribution> {
        let (raw, fresh_bytes) = self.acquire().await?;
        let distribution = self.build(&raw)?;
        if let Some(bytes) = fresh_bytes {
            write_cache_file(&self.config.distribution_cache_path(), &bytes).await;
        }
        Ok(distribution)
    }

    /// Raw manifest plus the remote bytes when it came from the network
    async fn acquire(&self) -> CoreResult<(RawDistribution, Option<Vec<u8>>)> {
        if self.is_dev_mode() {
            let path = self.config.distribution_dev_cache_path();
            log::info!("Dev mode: loading distribution from {:?}", path);
            let raw = read_distribution_file(&path)
                .await
                .ok_or_else(|| fatal(format!("no valid dev distribution at {:?}", path)))?;
            return Ok((raw, None));
        }

        let path = self.config.distribution_cache_path();
        match self.pull_remote().await {
            Ok((raw, bytes)) => Ok((raw, Some(bytes))),
            Err(failure) => {
                log_fetch_failure(OPERATION, &failure);
                log::info!("Falling back to cached distribution at {:?}", path);
                let raw = read_distribution_file(&path).await.ok_or_else(|| {
                    fatal(format!(
                        "remote fetch failed ({}) and no valid local copy at {:?}",
                        failure, path
                    ))
                })?;
                Ok((raw, None))
            }
        }
    }

    async fn pull_remote(&self) -> Result<(RawDistribution, Vec<u8>), NetworkFailure> {
        let url = &self.config.distribution_url;
        let bytes = self.http.get_bytes(url).await?;
        let raw = parse_json(url, &bytes)?;
        Ok((raw, bytes))
    }

    fn build(&self, raw: &RawDistribution) -> CoreResult<Distribution> {
        Distribution::build(raw, &self.config.common_dir(), &self.config.instance_dir())
    }
}

fn fatal(detail: String) -> CoreError {
    log::error!("No usable source [{}]: {}", OPERATION, detail);
    CoreError::FatalUnavailable {
        operation: OPERATION.to_string(),
        detail,
    }
}

/// Missing and malformed files both yield `None`
async fn read_distribution_file(path: &Path) -> Option<RawDistribution> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No distribution file at {:?}", path);
            return None;
        }
        Err(e) => {
            log::error!("Corrupt cache file {:?}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(raw) => Some(raw),
        Err(e) => {
            log::error!("Corrupt cache file {:?}: {}", path, e);
            None
        }
    }
}
