//! Caption cache for repeated uploads.
//!
//! Captioning is the slow, metered step of an upload: one network round trip
//! per photo. Re-uploading the same file (a retry after a failed remote push,
//! the same shot added to both collections) should not pay for it twice.
//!
//! The cache is **content-addressed**: keys are the SHA-256 of the encoded
//! image bytes, so renaming a file does not miss and changing its pixels
//! always does. Only real captions are stored; the placeholder triples are
//! never cached, so a later upload with a working key gets a real caption.
//!
//! The cache lives at `<state_dir>/.caption-cache.json`. Pass `--no-cache`
//! to `upload` to start from an empty cache; the file is still rewritten at
//! the end of the run.

use crate::caption::Caption;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the state directory.
const CACHE_FILENAME: &str = ".caption-cache.json";

/// Bump to invalidate every existing cache when the format changes.
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionCache {
    pub version: u32,
    pub entries: HashMap<String, Caption>,
}

impl CaptionCache {
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the state directory. Missing, corrupt and wrong-version
    /// files all yield an empty cache.
    pub fn load(state_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(cache_path(state_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let cache: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("ignoring unreadable caption cache: {e}");
                return Self::empty();
            }
        };
        if cache.version != CACHE_VERSION {
            return Self::empty();
        }
        cache
    }

    pub fn save(&self, state_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(state_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(state_dir), json)
    }

    pub fn get(&self, sha256: &str) -> Option<&Caption> {
        self.entries.get(sha256)
    }

    pub fn insert(&mut self, sha256: String, caption: Caption) {
        self.entries.insert(sha256, caption);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 of a byte slice as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn cache_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CACHE_FILENAME)
}

/// Cache hits and misses over one upload run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} captioned ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} captioned", self.misses)
        }
    }
}
