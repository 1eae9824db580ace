//! Content hashing and local file validation.

use md5::Md5;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;
use tokio::io::AsyncReadExt;

const READ_CHUNK_SIZE: usize = 16384;

/// Hash algorithms published by distribution and Mojang indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgo {
    Md5,
    Sha1,
    Sha256,
}

impl HashAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgo::Md5 => "md5",
            HashAlgo::Sha1 => "sha1",
            HashAlgo::Sha256 => "sha256",
        }
    }
}

impl FromStr for HashAlgo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgo::Md5),
            "sha1" | "sha-1" => Ok(HashAlgo::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgo::Sha256),
            other => Err(format!("Unsupported hash algorithm: {}", other)),
        }
    }
}

impl std::fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incremental hasher over any of the supported algorithms.
enum Hasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Hasher {
    fn new(algo: HashAlgo) -> Self {
        match algo {
            HashAlgo::Md5 => Hasher::Md5(Md5::new()),
            HashAlgo::Sha1 => Hasher::Sha1(Sha1::new()),
            HashAlgo::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Hasher::Md5(h) => h.update(bytes),
            Hasher::Sha1(h) => h.update(bytes),
            Hasher::Sha256(h) => h.update(bytes),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Hasher::Md5(h) => format!("{:x}", h.finalize()),
            Hasher::Sha1(h) => format!("{:x}", h.finalize()),
            Hasher::Sha256(h) => format!("{:x}", h.finalize()),
        }
    }
}

/// Hash a byte buffer, returning lowercase hex.
pub fn calculate_hash(bytes: &[u8], algo: HashAlgo) -> String {
    let mut hasher = Hasher::new(algo);
    hasher.update(bytes);
    hasher.finalize_hex()
}

/// Hash a file on disk in chunks.
pub async fn calculate_file_hash(path: &Path, algo: HashAlgo) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Hasher::new(algo);
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize_hex())
}

pub fn hashes_match(computed: &str, expected: &str) -> bool {
    computed.eq_ignore_ascii_case(expected.trim())
}

/// Decide whether a local file can be trusted.
///
/// * path absent -> `false`
/// * path present, `expected` is `None` -> `true` (presence is trusted)
/// * otherwise the file is hashed and compared
///
/// An `expected` of `Some("")` is a real (and never matching) hash, not the
/// presence-only mode.
pub async fn validate_local_file(path: &Path, algo: HashAlgo, expected: Option<&str>) -> bool {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return false;
    }

    let Some(expected) = expected else {
        return true;
    };

    match calculate_file_hash(path, algo).await {
        Ok(computed) => {
            let valid = hashes_match(&computed, expected);
            if !valid {
                log::debug!(
                    "Hash mismatch for {:?} ({} != {})",
                    path,
                    computed,
                    expected
                );
            }
            valid
        }
        Err(e) => {
            log::warn!("Failed to read {:?} for validation: {}", path, e);
            false
        }
    }
}
