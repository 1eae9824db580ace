/// Maven-style package coordinates
use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = "jar";

/// `group:artifact:version[@ext]`
static ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+):(.+):([^@]+)()(?:@(.+))?$").expect("valid regex"));

/// `group:artifact:version-classifier[@ext]`
///
/// Tried first. The classifier must be purely alphabetic and run to `@` or the
/// end, so `1.0-rc1` stays a version. A version like `1.0-SNAPSHOT` matches
/// this grammar too and is read as version `1.0` with classifier `SNAPSHOT`;
/// the two grammars cannot tell these apart.
static ID_REGEX_WITH_CLASSIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+):(.+):([^@]+)-([a-zA-Z]+)(?:@(.+))?$").expect("valid regex")
});

/// A parsed coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension, `jar` unless the id carried `@ext`
    pub extension: String,
    /// Whether the extension came from the id text rather than the default
    #[serde(default)]
    pub explicit_extension: bool,
}

impl Coordinate {
    /// Check whether `id` matches either coordinate grammar
    pub fn is_coordinate(id: &str) -> bool {
        ID_REGEX_WITH_CLASSIFIER.is_match(id) || ID_REGEX.is_match(id)
    }

    /// Parse with the default `jar` extension
    pub fn parse(id: &str) -> CoreResult<Self> {
        Self::parse_with_extension(id, DEFAULT_EXTENSION)
    }

    pub fn parse_with_extension(id: &str, default_extension: &str) -> CoreResult<Self> {
        let caps = ID_REGEX_WITH_CLASSIFIER
            .captures(id)
            .or_else(|| ID_REGEX.captures(id))
            .ok_or_else(|| CoreError::InvalidCoordinate(id.to_string()))?;

        let group = |i: usize| caps.get(i).map(|m| m.as_str()).filter(|s| !s.is_empty());

        let extension = group(5);
        Ok(Self {
            group: group(1).unwrap_or_default().to_string(),
            artifact: group(2).unwrap_or_default().to_string(),
            version: group(3).unwrap_or_default().to_string(),
            classifier: group(4).map(str::to_string),
            extension: extension.unwrap_or(default_extension).to_string(),
            explicit_extension: extension.is_some(),
        })
    }

    /// Group with dots turned into directory separators (`org/lwjgl`)
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    /// `artifact-version[-classifier].ext`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact, self.version, c, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact, self.version, self.extension),
        }
    }

    /// Relative repository path as a `/`-separated string
    pub fn to_relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_path(),
            self.artifact,
            self.version,
            self.filename()
        )
    }

    /// Relative repository path in host path syntax
    /// Example: "com.google.guava:guava:21.0" -> com/google/guava/guava/21.0/guava-21.0.jar
    pub fn to_path(&self) -> PathBuf {
        self.to_relative_path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Full URL of this artifact under a repository base
    pub fn url(&self, repo_base: &str) -> String {
        format!(
            "{}/{}",
            repo_base.trim_end_matches('/'),
            self.to_relative_path()
        )
    }

    /// `group:artifact:version[-classifier][@ext]`
    pub fn to_identifier(&self) -> String {
        if self.explicit_extension {
            format!("{}@{}", self.to_extensionless_identifier(), self.extension)
        } else {
            self.to_extensionless_identifier()
        }
    }

    /// `group:artifact:version[-classifier]`
    pub fn to_extensionless_identifier(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}:{}:{}-{}", self.group, self.artifact, self.version, c),
            None => format!("{}:{}:{}", self.group, self.artifact, self.version),
        }
    }

    /// `group:artifact`
    pub fn to_versionless_identifier(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_identifier())
    }
}

impl std::str::FromStr for Coordinate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
