//! Persistence adapter: a key→JSON store plus the published snapshot.
//!
//! # Layout
//!
//! The local store is a directory with one JSON document per key:
//!
//! ```text
//! .folio/
//! ├── gallery.json     # Photo[]
//! ├── heroes.json      # Photo[]
//! └── remote.json      # {repo, token, path, branch}
//! ```
//!
//! Writes go to a temp file in the same directory and are renamed into
//! place, so a reader never sees a half-written document and the last write
//! always wins.
//!
//! # Hydration
//!
//! Two read paths exist:
//!
//! - [`hydrate_public`] — for the showcase. The published snapshot, when
//!   present and non-empty, takes precedence over the local store.
//! - [`hydrate_studio`] — for curation. The local store wins; the snapshot
//!   seeds a store that has never been written.
//!
//! Both fall back to [`seed_portfolio`] per collection when nothing usable
//! is found. Corrupt documents are logged and treated as absent; they never
//! surface as errors.

use crate::types::{LayoutType, Photo, Portfolio};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed file name of the export.
pub const EXPORT_FILENAME: &str = "folio-backup.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
}

/// String-keyed document store.
pub trait Store {
    /// Raw document for `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Read and parse a JSON document. Missing and unparseable documents both
/// come back as `None`; the latter is logged.
pub fn read_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("store read failed for '{key}': {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring corrupt document '{key}': {e}");
            None
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn Store,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

// ============================================================================
// File-backed store
// ============================================================================

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store. Used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Key names for the two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionKeys {
    pub gallery: String,
    pub heroes: String,
}

impl CollectionKeys {
    pub fn from_config(storage: &crate::config::StorageConfig) -> Self {
        Self {
            gallery: storage.gallery_key.clone(),
            heroes: storage.heroes_key.clone(),
        }
    }
}

impl Default for CollectionKeys {
    fn default() -> Self {
        Self::from_config(&crate::config::StorageConfig::default())
    }
}

/// Load the published snapshot. Missing, unreadable, corrupt, and fully
/// empty snapshots are all `None`.
pub fn load_snapshot(path: &Path) -> Option<Portfolio> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("cannot read snapshot {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str::<Portfolio>(&content) {
        Ok(portfolio) if !portfolio.is_empty() => Some(portfolio),
        Ok(_) => None,
        Err(e) => {
            log::warn!("ignoring corrupt snapshot {}: {e}", path.display());
            None
        }
    }
}

/// Hydrate for the public views: snapshot first, then store, then seed.
pub fn hydrate_public(store: &dyn Store, keys: &CollectionKeys, snapshot: Option<Portfolio>) -> Portfolio {
    if let Some(snapshot) = snapshot {
        log::debug!("hydrating showcase from published snapshot");
        return snapshot;
    }
    hydrate_from_store(store, keys, None)
}

/// Hydrate for the studio: store first, then snapshot, then seed, per
/// collection.
pub fn hydrate_studio(store: &dyn Store, keys: &CollectionKeys, snapshot: Option<Portfolio>) -> Portfolio {
    hydrate_from_store(store, keys, snapshot)
}

fn hydrate_from_store(store: &dyn Store, keys: &CollectionKeys, snapshot: Option<Portfolio>) -> Portfolio {
    let seed = seed_portfolio();
    let (snap_photos, snap_heroes) = match snapshot {
        Some(p) => (Some(p.photos), Some(p.home_heroes)),
        None => (None, None),
    };
    let photos = read_json::<Vec<Photo>>(store, &keys.gallery)
        .or(snap_photos)
        .unwrap_or(seed.photos);
    let home_heroes = read_json::<Vec<Photo>>(store, &keys.heroes)
        .or(snap_heroes)
        .unwrap_or(seed.home_heroes);
    Portfolio { photos, home_heroes }
}

pub fn save_collection(
    store: &mut dyn Store,
    key: &str,
    photos: &[Photo],
) -> Result<(), StoreError> {
    write_json(store, key, photos)
}

/// Pretty-printed `{photos, homeHeroes}` document.
pub fn export_json(portfolio: &Portfolio) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(portfolio)?)
}

/// Parse an export (or snapshot) document.
pub fn import_json(json: &str) -> Result<Portfolio, StoreError> {
    Ok(serde_json::from_str(json)?)
}

/// Write the export under its fixed file name in `dir`. Returns the path.
pub fn write_export(portfolio: &Portfolio, dir: &Path) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILENAME);
    fs::write(&path, export_json(portfolio)?)?;
    Ok(path)
}

// ============================================================================
// Seed data
// ============================================================================

/// Built-in collections used when nothing has been persisted yet.
pub fn seed_portfolio() -> Portfolio {
    let seed = |id: &str, url: &str, title: &str, category: &str, description: &str, layout| Photo {
        id: id.to_string(),
        url: url.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        is_published: true,
        is_category_hero: false,
        layout_type: layout,
    };
    let photos = vec![
        seed(
            "p1",
            "https://images.unsplash.com/photo-1534528741775-53994a69daeb?q=80&w=1200",
            "Velvet Silence",
            "Portrait",
            "Shadow play on silk.",
            LayoutType::Classic,
        ),
        seed(
            "p2",
            "https://images.unsplash.com/photo-1506794778202-cad84cf45f1d?q=80&w=1200",
            "The Architect",
            "Portrait",
            "Lines of character.",
            LayoutType::Editorial,
        ),
        seed(
            "w1",
            "https://images.unsplash.com/photo-1583939003579-730e3918a45a?q=80&w=1200",
            "Eternal Gold",
            "Pre-wed",
            "Sunset vows.",
            LayoutType::Wide,
        ),
    ];
    let mut hero = seed(
        "h1",
        "https://images.unsplash.com/photo-1534528741775-53994a69daeb?q=80&w=1200",
        "Human Stories",
        "Portrait",
        "Enter the Portrait Archive",
        LayoutType::Editorial,
    );
    hero.is_category_hero = true;
    Portfolio::new(photos, vec![hero])
}
