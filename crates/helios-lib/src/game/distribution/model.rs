//! Resolved distribution tree.
//!
//! Built in one pass from a [`RawDistribution`]. Every module has its
//! coordinate, required flags and absolute local path fixed at construction;
//! the tree is never mutated afterwards. A reload builds a new tree.

use super::types::{ModuleType, RawArtifact, RawDistribution, RawModule, RawRequired, RawServer};
use crate::error::{CoreError, CoreResult};
use crate::game::maven::Coordinate;
use crate::utils::fs::relative_path;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_PORT: u16 = 25565;

/// Fully resolved `required` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Required {
    /// Module is mandatory
    pub value: bool,
    /// Optional module is enabled unless the user turns it off
    pub default_enabled: bool,
}

impl Required {
    /// Each field defaults to `true` on its own when absent.
    pub fn resolve(raw: Option<&RawRequired>) -> Self {
        match raw {
            None => Required {
                value: true,
                default_enabled: true,
            },
            Some(raw) => Required {
                value: raw.value.unwrap_or(true),
                default_enabled: raw.def.unwrap_or(true),
            },
        }
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::resolve(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArtifact {
    pub size: u64,
    pub md5: Option<String>,
    pub url: String,
}

impl From<&RawArtifact> for ModuleArtifact {
    fn from(raw: &RawArtifact) -> Self {
        Self {
            size: raw.size,
            md5: raw.md5.clone(),
            url: raw.url.clone(),
        }
    }
}

/// Where a module lives on disk
struct PathContext<'a> {
    common_dir: &'a Path,
    instance_dir: &'a Path,
    server_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct Module {
    id: String,
    name: String,
    kind: ModuleType,
    classpath_eligible: bool,
    required: Required,
    artifact: ModuleArtifact,
    coordinate: Option<Coordinate>,
    path: PathBuf,
    sub_modules: Vec<Module>,
}

impl Module {
    fn build(raw: &RawModule, ctx: &PathContext<'_>) -> CoreResult<Self> {
        let coordinate = resolve_coordinate(raw)?;
        let path = resolve_path(raw, coordinate.as_ref(), ctx);

        let sub_modules = raw
            .sub_modules
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|sub| Module::build(sub, ctx))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            kind: raw.kind.clone(),
            classpath_eligible: raw.classpath.unwrap_or(true),
            required: Required::resolve(raw.required.as_ref()),
            artifact: ModuleArtifact::from(&raw.artifact),
            coordinate,
            path,
            sub_modules,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ModuleType {
        &self.kind
    }

    pub fn is_classpath_eligible(&self) -> bool {
        self.classpath_eligible
    }

    pub fn required(&self) -> Required {
        self.required
    }

    pub fn artifact(&self) -> &ModuleArtifact {
        &self.artifact
    }

    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.coordinate.as_ref()
    }

    /// Absolute local path of the module's artifact
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn maven_identifier(&self) -> Option<String> {
        self.coordinate.as_ref().map(Coordinate::to_identifier)
    }

    pub fn extensionless_maven_identifier(&self) -> Option<String> {
        self.coordinate
            .as_ref()
            .map(Coordinate::to_extensionless_identifier)
    }

    pub fn versionless_maven_identifier(&self) -> Option<String> {
        self.coordinate
            .as_ref()
            .map(Coordinate::to_versionless_identifier)
    }

    pub fn has_sub_modules(&self) -> bool {
        !self.sub_modules.is_empty()
    }

    pub fn sub_modules(&self) -> &[Module] {
        &self.sub_modules
    }

    /// This module followed by all of its descendants, depth-first in declaration order
    pub fn iter(&self) -> ModuleIter<'_> {
        ModuleIter { stack: vec![self] }
    }
}

/// Pre-order depth-first walk over a module forest
pub struct ModuleIter<'a> {
    stack: Vec<&'a Module>,
}

impl<'a> ModuleIter<'a> {
    fn over(modules: &'a [Module]) -> Self {
        Self {
            stack: modules.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for ModuleIter<'a> {
    type Item = &'a Module;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.sub_modules.iter().rev());
        Some(next)
    }
}

fn resolve_coordinate(raw: &RawModule) -> CoreResult<Option<Coordinate>> {
    match raw.kind {
        ModuleType::File if raw.artifact.path.is_some() => Ok(None),
        ModuleType::VersionManifest => Ok(None),
        _ => Coordinate::parse(&raw.id)
            .map(Some)
            .map_err(|_| CoreError::ModuleConfiguration {
                module: raw.id.clone(),
                kind: raw.kind.to_string(),
            }),
    }
}

fn resolve_path(raw: &RawModule, coordinate: Option<&Coordinate>, ctx: &PathContext<'_>) -> PathBuf {
    if raw.kind == ModuleType::VersionManifest {
        return ctx
            .common_dir
            .join("versions")
            .join(&raw.id)
            .join(format!("{}.json", raw.id));
    }

    let relative = match (&raw.artifact.path, coordinate) {
        (Some(explicit), _) => relative_path(explicit),
        (None, Some(coordinate)) => coordinate.to_path(),
        // resolve_coordinate guarantees one of the two
        (None, None) => PathBuf::from(&raw.id),
    };

    match raw.kind {
        ModuleType::Library
        | ModuleType::Forge
        | ModuleType::ForgeHosted
        | ModuleType::LiteLoader
        | ModuleType::Fabric => ctx.common_dir.join("libraries").join(relative),
        ModuleType::ForgeMod | ModuleType::LiteMod | ModuleType::FabricMod => {
            ctx.common_dir.join("modstore").join(relative)
        }
        ModuleType::File | ModuleType::VersionManifest | ModuleType::Other(_) => {
            ctx.instance_dir.join(ctx.server_id).join(relative)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Server {
    id: String,
    name: String,
    description: String,
    icon: Option<String>,
    version: String,
    address: String,
    minecraft_version: String,
    main_server: bool,
    autoconnect: bool,
    modules: Vec<Module>,
}

impl Server {
    fn build(raw: &RawServer, common_dir: &Path, instance_dir: &Path) -> CoreResult<Self> {
        let ctx = PathContext {
            common_dir,
            instance_dir,
            server_id: &raw.id,
        };
        let modules = raw
            .modules
            .iter()
            .map(|m| Module::build(m, &ctx))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            description: raw.description.clone(),
            icon: raw.icon.clone(),
            version: raw.version.clone(),
            address: raw.address.clone(),
            minecraft_version: raw.minecraft_version.clone(),
            main_server: raw.main_server,
            autoconnect: raw.autoconnect,
            modules,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn minecraft_version(&self) -> &str {
        &self.minecraft_version
    }

    /// Flagged main in the manifest (not necessarily the effective main server)
    pub fn is_main_server(&self) -> bool {
        self.main_server
    }

    pub fn autoconnect(&self) -> bool {
        self.autoconnect
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Every module of this server, depth-first, in declaration order
    pub fn modules_depth_first(&self) -> ModuleIter<'_> {
        ModuleIter::over(&self.modules)
    }

    pub fn hostname(&self) -> &str {
        match self.address.rsplit_once(':') {
            Some((host, _)) => host,
            None => &self.address,
        }
    }

    pub fn port(&self) -> u16 {
        let Some((_, port)) = self.address.rsplit_once(':') else {
            return DEFAULT_SERVER_PORT;
        };
        match port.parse() {
            Ok(port) => port,
            Err(_) => {
                log::warn!(
                    "Server {} has an invalid port in address '{}', using {}",
                    self.id,
                    self.address,
                    DEFAULT_SERVER_PORT
                );
                DEFAULT_SERVER_PORT
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Distribution {
    version: String,
    rss: Option<String>,
    servers: Vec<Server>,
    main_server: usize,
}

impl Distribution {
    /// Resolve a raw manifest into a tree. Fails as a whole on the first bad module.
    pub fn build(raw: &RawDistribution, common_dir: &Path, instance_dir: &Path) -> CoreResult<Self> {
        if raw.servers.is_empty() {
            return Err(CoreError::EmptyDistribution);
        }

        let servers = raw
            .servers
            .iter()
            .map(|s| Server::build(s, common_dir, instance_dir))
            .collect::<CoreResult<Vec<_>>>()?;

        let main_server = servers.iter().position(|s| s.main_server).unwrap_or(0);

        Ok(Self {
            version: raw.version.clone(),
            rss: raw.rss.clone(),
            servers,
            main_server,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rss(&self) -> Option<&str> {
        self.rss.as_deref()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// First server flagged main, else the first server
    pub fn main_server(&self) -> &Server {
        &self.servers[self.main_server]
    }

    pub fn server_by_id(&self, id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }
}
