//! Validation of a server's module tree against local files.

use super::model::{Distribution, Module, Server};
use super::types::ModuleType;
use crate::error::{CoreError, CoreResult};
use crate::game::asset::Asset;
use crate::game::mojang::types::VersionJson;
use crate::game::progress::{ProgressReporter, SilentProgressReporter};
use crate::utils::hash::{validate_local_file, HashAlgo};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::fs;

/// Checks every module of one server, depth-first, against its published MD5.
pub struct DistributionIndexProcessor {
    distribution: Arc<Distribution>,
    server_index: usize,
    concurrency: usize,
}

impl DistributionIndexProcessor {
    pub fn new(
        distribution: Arc<Distribution>,
        server_id: &str,
        concurrency: usize,
    ) -> CoreResult<Self> {
        let server_index = distribution
            .servers()
            .iter()
            .position(|s| s.id() == server_id)
            .ok_or_else(|| {
                CoreError::ContentUnavailable(format!(
                    "server {} is not part of the distribution",
                    server_id
                ))
            })?;

        Ok(Self {
            distribution,
            server_index,
            concurrency: concurrency.max(1),
        })
    }

    pub fn server(&self) -> &Server {
        &self.distribution.servers()[self.server_index]
    }

    pub async fn validate(&self) -> Vec<Asset> {
        self.validate_with_reporter(&SilentProgressReporter).await
    }

    /// Every module whose file is absent or fails its MD5 check, in
    /// depth-first declaration order.
    pub async fn validate_with_reporter(&self, reporter: &dyn ProgressReporter) -> Vec<Asset> {
        let server = self.server();
        let modules: Vec<&Module> = server.modules_depth_first().collect();
        let total = modules.len() as u32;
        reporter.start_step("Validating server modules", Some(total));
        log::info!(
            "Validating {} module(s) for server {}",
            total,
            server.id()
        );

        let mut checked = 0u32;
        let results: Vec<Option<Asset>> = stream::iter(modules)
            .map(validate_module)
            .buffered(self.concurrency)
            .inspect(|_| {
                checked += 1;
                reporter.set_step_count(checked, Some(total));
            })
            .collect()
            .await;

        let invalid: Vec<Asset> = results.into_iter().flatten().collect();
        log::info!(
            "Server {}: {} of {} module(s) need downloading",
            server.id(),
            invalid.len(),
            total
        );
        reporter.done(true, None);
        invalid
    }

    /// Read the version descriptor shipped with the server's mod loader.
    ///
    /// The mod loader is the first top-level `ForgeHosted` or `Fabric` module;
    /// its descriptor is the `VersionManifest` submodule already on disk.
    pub async fn load_mod_loader_version_json(&self) -> CoreResult<VersionJson> {
        let server = self.server();
        let loader = server
            .modules()
            .iter()
            .find(|m| m.kind().is_mod_loader())
            .ok_or_else(|| {
                CoreError::ContentUnavailable(format!(
                    "server {} has no mod loader module",
                    server.id()
                ))
            })?;

        let manifest = loader
            .sub_modules()
            .iter()
            .find(|m| *m.kind() == ModuleType::VersionManifest)
            .ok_or_else(|| {
                CoreError::ContentUnavailable(format!(
                    "mod loader {} has no version manifest submodule",
                    loader.id()
                ))
            })?;

        let path = manifest.path();
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::ContentUnavailable(format!(
                    "mod loader version manifest {:?} is not on disk",
                    path
                )));
            }
            Err(e) => {
                log::error!("Corrupt cache file {:?}: {}", path, e);
                return Err(CoreError::corrupt_cache(path, e));
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            log::error!("Corrupt cache file {:?}: {}", path, e);
            CoreError::corrupt_cache(path, e)
        })
    }
}

async fn validate_module(module: &Module) -> Option<Asset> {
    let artifact = module.artifact();
    if validate_local_file(module.path(), HashAlgo::Md5, artifact.md5.as_deref()).await {
        return None;
    }

    Some(Asset {
        id: module.id().to_string(),
        hash: artifact.md5.clone(),
        algo: HashAlgo::Md5,
        size: artifact.size,
        url: artifact.url.clone(),
        path: module.path().to_path_buf(),
    })
}
