/// Wire format of the distribution manifest (distribution.json)
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of the manifest as published by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDistribution {
    /// Manifest format version
    #[serde(default)]
    pub version: String,

    /// News feed URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss: Option<String>,

    /// Opaque Discord rich presence settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<serde_json::Value>,

    pub servers: Vec<RawServer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawServer {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Server pack version
    #[serde(default)]
    pub version: String,

    /// `hostname[:port]`
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub minecraft_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<serde_json::Value>,

    #[serde(default)]
    pub main_server: bool,

    #[serde(default)]
    pub autoconnect: bool,

    #[serde(default)]
    pub modules: Vec<RawModule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModule {
    /// Maven identifier, or a plain id for `File` / `VersionManifest` modules
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ModuleType,

    /// Whether the artifact goes on the classpath (defaults to true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classpath: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<RawRequired>,

    pub artifact: RawArtifact,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_modules: Option<Vec<RawModule>>,
}

/// `required` object; either field may be omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRequired {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,

    /// Enabled by default when optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArtifact {
    #[serde(default)]
    pub size: u64,

    #[serde(rename = "MD5", default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    #[serde(default)]
    pub url: String,

    /// Explicit relative path, overrides the coordinate-derived one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Declared module type. Unknown names are kept and treated like `File`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleType {
    Library,
    ForgeHosted,
    Forge,
    LiteLoader,
    ForgeMod,
    LiteMod,
    Fabric,
    FabricMod,
    File,
    VersionManifest,
    Other(String),
}

impl ModuleType {
    pub fn as_str(&self) -> &str {
        match self {
            ModuleType::Library => "Library",
            ModuleType::ForgeHosted => "ForgeHosted",
            ModuleType::Forge => "Forge",
            ModuleType::LiteLoader => "LiteLoader",
            ModuleType::ForgeMod => "ForgeMod",
            ModuleType::LiteMod => "LiteMod",
            ModuleType::Fabric => "Fabric",
            ModuleType::FabricMod => "FabricMod",
            ModuleType::File => "File",
            ModuleType::VersionManifest => "VersionManifest",
            ModuleType::Other(name) => name,
        }
    }

    /// Mod loader modules that carry a `VersionManifest` submodule
    pub fn is_mod_loader(&self) -> bool {
        matches!(self, ModuleType::ForgeHosted | ModuleType::Fabric)
    }
}

impl From<String> for ModuleType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Library" => ModuleType::Library,
            "ForgeHosted" => ModuleType::ForgeHosted,
            "Forge" => ModuleType::Forge,
            "LiteLoader" => ModuleType::LiteLoader,
            "ForgeMod" => ModuleType::ForgeMod,
            "LiteMod" => ModuleType::LiteMod,
            "Fabric" => ModuleType::Fabric,
            "FabricMod" => ModuleType::FabricMod,
            "File" => ModuleType::File,
            "VersionManifest" => ModuleType::VersionManifest,
            _ => ModuleType::Other(value),
        }
    }
}

impl From<ModuleType> for String {
    fn from(value: ModuleType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
