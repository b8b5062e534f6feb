//! Upload pipeline: files on disk to captioned photos in the studio.
//!
//! ```text
//! 1. Collect   paths    →  files       (directories walked, sorted by name)
//! 2. Encode    files    →  images      (parallel: bytes, format sniff, SHA-256)
//! 3. Commit    images   →  photos      (sequential: caption, host, add to studio)
//! ```
//!
//! Encoding is the only parallel step. Files are encoded [`ENCODE_CHUNK`] at
//! a time and each chunk is committed before the next is read, so at most one
//! chunk of raw bytes is held at once. Results are collected in input order
//! within a chunk, so photos are committed in the order the files were given.
//! Each photo is persisted as soon as it is committed: an interrupted batch
//! keeps every photo that finished. A failed write keeps the photo in memory,
//! is reported on that file's outcome, and the batch carries on.
//!
//! Captioning and remote hosting never fail a batch. A missing API key or a
//! failed call yields placeholder metadata; a failed push keeps the inline
//! data URI. A file that cannot be read or is not an image is reported and
//! skipped, and still counts toward progress.

use crate::cache::{self, CacheStats, CaptionCache};
use crate::caption::{self, Caption, CaptionSource, Captioner};
use crate::remote::{self, RemoteHost};
use crate::studio::{Studio, StudioError};
use crate::types::{Collection, Photo};
use image::ImageFormat;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Files read and encoded together before their photos are committed.
pub const ENCODE_CHUNK: usize = 8;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Nothing to upload")]
    NoInputs,
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Studio(#[from] StudioError),
}

/// Why a single file was skipped.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("file is empty")]
    Empty,
    #[error("not a recognized image format")]
    NotAnImage,
}

/// A file read into memory and ready to caption or host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub sha256: String,
}

impl EncodedImage {
    /// Sniff the format from the bytes, falling back to the file extension.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, EncodeError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(EncodeError::Empty);
        }
        let format = image::guess_format(&bytes)
            .or_else(|_| ImageFormat::from_path(&file_name))
            .map_err(|_| EncodeError::NotAnImage)?;
        Ok(Self {
            mime: format.to_mime_type().to_string(),
            sha256: cache::hash_bytes(&bytes),
            file_name,
            bytes,
        })
    }

    pub fn read(path: &Path) -> Result<Self, EncodeError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(file_name, bytes)
    }

    pub fn base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64())
    }
}

// ============================================================================
// Events and outcomes
// ============================================================================

/// Where a committed photo's `url` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostStatus {
    /// No remote host configured: the photo carries its data URI.
    Inline,
    Hosted(String),
    /// Push failed: the photo carries its data URI.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileResult {
    Added {
        id: String,
        title: String,
        category: String,
        caption: CaptionSource,
        host: HostStatus,
        /// Store write error. The photo is in the studio but not on disk.
        unsaved: Option<String>,
    },
    Unreadable {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: FileResult,
}

impl FileOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self.result, FileResult::Added { .. })
    }

    pub fn is_unsaved(&self) -> bool {
        matches!(self.result, FileResult::Added { unsaved: Some(_), .. })
    }
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started { total: usize, collection: Collection },
    Progress { current: usize, total: usize, outcome: FileOutcome },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub outcomes: Vec<FileOutcome>,
    /// Final `(current, total)`. Always `(total, total)` for a completed batch.
    pub progress: (usize, usize),
    pub cache_stats: CacheStats,
}

impl UploadReport {
    pub fn added(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_added()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.added()
    }

    /// Added photos whose store write failed.
    pub fn unsaved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_unsaved()).count()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Expand the given paths into the list of files to upload. Files are kept
/// as given; directories contribute their image files sorted by name.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, UploadError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && has_image_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    if files.is_empty() {
        return Err(UploadError::NoInputs);
    }
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok()
}

/// Read and encode every file in parallel, preserving input order.
pub fn encode_all(files: &[PathBuf]) -> Vec<Result<EncodedImage, EncodeError>> {
    files.par_iter().map(|path| EncodedImage::read(path)).collect()
}

/// Collaborators for one batch.
pub struct Uploader<'a> {
    pub captioner: &'a dyn Captioner,
    pub host: Option<&'a dyn RemoteHost>,
    pub cache: &'a mut CaptionCache,
    pub collection: Collection,
    pub publish: bool,
}

impl Uploader<'_> {
    /// Run a batch against the studio. Returns early only when the studio
    /// rejects a photo outright; store write failures are per-file outcomes.
    pub fn run(
        &mut self,
        studio: &mut Studio<'_>,
        files: &[PathBuf],
        events: Option<Sender<UploadEvent>>,
    ) -> Result<UploadReport, UploadError> {
        let total = files.len();
        let emit = |event: UploadEvent| {
            if let Some(tx) = &events {
                tx.send(event).ok();
            }
        };
        emit(UploadEvent::Started {
            total,
            collection: self.collection,
        });

        let mut outcomes = Vec::with_capacity(total);
        let mut stats = CacheStats::default();

        for chunk in files.chunks(ENCODE_CHUNK) {
            let encoded = encode_all(chunk);
            for (source, image) in chunk.iter().zip(encoded) {
                let result = match image {
                    Ok(image) => self.commit(studio, &image, &mut stats)?,
                    Err(e) => {
                        log::warn!("skipping {}: {e}", source.display());
                        FileResult::Unreadable {
                            reason: e.to_string(),
                        }
                    }
                };
                let outcome = FileOutcome {
                    source: source.clone(),
                    result,
                };
                emit(UploadEvent::Progress {
                    current: outcomes.len() + 1,
                    total,
                    outcome: outcome.clone(),
                });
                outcomes.push(outcome);
            }
        }

        Ok(UploadReport {
            outcomes,
            progress: (total, total),
            cache_stats: stats,
        })
    }

    fn commit(
        &mut self,
        studio: &mut Studio<'_>,
        image: &EncodedImage,
        stats: &mut CacheStats,
    ) -> Result<FileResult, StudioError> {
        let (caption, source) = self.caption(image, stats);
        let (url, host) = self.host(image);

        let photo = Photo::new(url, &caption.title, &caption.category)
            .with_description(&caption.description)
            .published(self.publish);
        let id = photo.id.clone();
        let unsaved = match studio.add_to(self.collection, photo) {
            Ok(()) => {
                log::info!("added '{}' to {}", caption.title, self.collection.label());
                None
            }
            Err(StudioError::Store(e)) => {
                log::warn!("added '{}' but could not save it: {e}", caption.title);
                Some(e.to_string())
            }
            Err(e) => return Err(e),
        };

        Ok(FileResult::Added {
            id,
            title: caption.title,
            category: caption.category,
            caption: source,
            host,
            unsaved,
        })
    }

    fn caption(&mut self, image: &EncodedImage, stats: &mut CacheStats) -> (Caption, CaptionSource) {
        if let Some(cached) = self.cache.get(&image.sha256) {
            stats.hit();
            return (cached.clone(), CaptionSource::Cache);
        }
        stats.miss();
        let (caption, source) = caption::caption_or_fallback(self.captioner, image);
        if source == CaptionSource::Api {
            self.cache.insert(image.sha256.clone(), caption.clone());
        }
        (caption, source)
    }

    fn host(&self, image: &EncodedImage) -> (String, HostStatus) {
        let Some(host) = self.host else {
            return (image.data_uri(), HostStatus::Inline);
        };
        let name = remote::object_name(&image.sha256, &image.file_name);
        match host.upload(&name, &image.bytes) {
            Ok(url) => (url.clone(), HostStatus::Hosted(url)),
            Err(e) => {
                log::warn!("remote upload failed for {}: {e}", image.file_name);
                (image.data_uri(), HostStatus::Failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::CaptionError;
    use crate::remote::RemoteError;
    use crate::store::{CollectionKeys, MemoryStore, Store, StoreError};
    use crate::test_helpers::{PNG_1X1, session};
    use crate::types::Portfolio;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use tempfile::TempDir;

    /// Captions "Shot N" in call order; fails on the listed calls.
    struct Scripted {
        calls: Cell<usize>,
        fail_on: Vec<usize>,
    }

    impl Scripted {
        fn failing_on(fail_on: &[usize]) -> Self {
            Self {
                calls: Cell::new(0),
                fail_on: fail_on.to_vec(),
            }
        }
    }

    impl Captioner for Scripted {
        fn caption(&self, _image: &EncodedImage) -> Result<Caption, CaptionError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if self.fail_on.contains(&n) {
                return Err(CaptionError::EmptyResponse);
            }
            Ok(Caption::new(format!("Shot {n}"), "Street", "d"))
        }
    }

    struct FakeHost {
        fail: bool,
        names: RefCell<Vec<String>>,
    }

    impl RemoteHost for FakeHost {
        fn upload(&self, name: &str, _bytes: &[u8]) -> Result<String, RemoteError> {
            self.names.borrow_mut().push(name.to_string());
            if self.fail {
                Err(RemoteError::MissingToken)
            } else {
                Ok(format!("https://cdn.test/{name}"))
            }
        }
    }

    fn write_pngs(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, PNG_1X1).unwrap();
                path
            })
            .collect()
    }

    /// Accepts `writes_left` writes, then fails every write.
    struct FullDisk {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl Store for FullDisk {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.writes_left == 0 {
                return Err(StoreError::Io(std::io::Error::other("no space left on device")));
            }
            self.writes_left -= 1;
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn new_studio(store: &mut MemoryStore) -> Studio<'_> {
        Studio::new(
            Portfolio::default(),
            store,
            CollectionKeys::default(),
            "remote",
            session(),
        )
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    #[test]
    fn png_bytes_are_sniffed() {
        let image = EncodedImage::from_bytes("shot.bin", PNG_1X1.to_vec()).unwrap();
        assert_eq!(image.mime, "image/png");
        assert!(image.data_uri().starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(image.sha256.len(), 64);
    }

    #[test]
    fn unknown_bytes_fall_back_to_extension() {
        let image = EncodedImage::from_bytes("shot.jpg", b"not really".to_vec()).unwrap();
        assert_eq!(image.mime, "image/jpeg");
    }

    #[test]
    fn unknown_bytes_and_extension_are_rejected() {
        let result = EncodedImage::from_bytes("notes.txt", b"hello".to_vec());
        assert!(matches!(result, Err(EncodeError::NotAnImage)));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(
            EncodedImage::from_bytes("a.png", Vec::new()),
            Err(EncodeError::Empty)
        ));
    }

    // =========================================================================
    // Input collection
    // =========================================================================

    #[test]
    fn directories_contribute_sorted_images_only() {
        let tmp = TempDir::new().unwrap();
        write_pngs(tmp.path(), &["b.png", "a.png"]);
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        let files = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn explicit_files_keep_given_order() {
        let files = vec![PathBuf::from("z.png"), PathBuf::from("a.png")];
        assert_eq!(collect_inputs(&files).unwrap(), files);
    }

    #[test]
    fn no_inputs_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            collect_inputs(&[tmp.path().to_path_buf()]),
            Err(UploadError::NoInputs)
        ));
    }

    // =========================================================================
    // Batch runs
    // =========================================================================

    #[test]
    fn failed_caption_still_completes_batch() {
        let tmp = TempDir::new().unwrap();
        let files = write_pngs(tmp.path(), &["1.png", "2.png", "3.png"]);
        // Distinct bytes so the cache does not short-circuit calls 2 and 3
        fs::write(&files[1], [PNG_1X1, b"2"].concat()).unwrap();
        fs::write(&files[2], [PNG_1X1, b"3"].concat()).unwrap();

        let mut store = MemoryStore::new();
        let mut studio = new_studio(&mut store);
        let captioner = Scripted::failing_on(&[2]);
        let mut cache = CaptionCache::empty();
        let (tx, rx) = std::sync::mpsc::channel();

        let report = Uploader {
            captioner: &captioner,
            host: None,
            cache: &mut cache,
            collection: Collection::Gallery,
            publish: true,
        }
        .run(&mut studio, &files, Some(tx))
        .unwrap();

        assert_eq!(report.progress, (3, 3));
        assert_eq!(report.added(), 3);
        let titles: Vec<_> = studio.items().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Shot 1", "Untitled Composition", "Shot 3"]);
        assert!(studio.items().iter().all(|p| p.is_published));
        assert!(studio.items()[0].url.starts_with("data:image/png;base64,"));

        let progress: Vec<_> = rx
            .iter()
            .filter_map(|e| match e {
                UploadEvent::Progress { current, total, .. } => Some((current, total)),
                UploadEvent::Started { .. } => None,
            })
            .collect();
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);

        // Only real captions are cached
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unreadable_files_count_toward_progress() {
        let tmp = TempDir::new().unwrap();
        let mut files = write_pngs(tmp.path(), &["ok.png"]);
        files.insert(0, tmp.path().join("missing.png"));
        let text = tmp.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        files.push(text);

        let mut store = MemoryStore::new();
        let mut studio = new_studio(&mut store);
        let mut cache = CaptionCache::empty();
        let report = Uploader {
            captioner: &Scripted::failing_on(&[]),
            host: None,
            cache: &mut cache,
            collection: Collection::Gallery,
            publish: true,
        }
        .run(&mut studio, &files, None)
        .unwrap();

        assert_eq!(report.progress, (3, 3));
        assert_eq!(report.added(), 1);
        assert_eq!(report.skipped(), 2);
        assert!(matches!(report.outcomes[0].result, FileResult::Unreadable { .. }));
        assert!(report.outcomes[1].is_added());
        assert_eq!(studio.items().len(), 1);
    }

    #[test]
    fn repeated_bytes_hit_the_cache() {
        let tmp = TempDir::new().unwrap();
        let files = write_pngs(tmp.path(), &["a.png", "copy-of-a.png"]);
        let mut store = MemoryStore::new();
        let mut studio = new_studio(&mut store);
        let captioner = Scripted::failing_on(&[]);
        let mut cache = CaptionCache::empty();

        let report = Uploader {
            captioner: &captioner,
            host: None,
            cache: &mut cache,
            collection: Collection::Gallery,
            publish: true,
        }
        .run(&mut studio, &files, None)
        .unwrap();

        assert_eq!(captioner.calls.get(), 1);
        assert_eq!(report.cache_stats, CacheStats { hits: 1, misses: 1 });
        match &report.outcomes[1].result {
            FileResult::Added { caption, title, .. } => {
                assert_eq!(*caption, CaptionSource::Cache);
                assert_eq!(title, "Shot 1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hosted_url_replaces_data_uri() {
        let tmp = TempDir::new().unwrap();
        let files = write_pngs(tmp.path(), &["My Shot.png"]);
        let mut store = MemoryStore::new();
        let mut studio = new_studio(&mut store);
        let host = FakeHost {
            fail: false,
            names: RefCell::new(Vec::new()),
        };
        let mut cache = CaptionCache::empty();

        Uploader {
            captioner: &Scripted::failing_on(&[]),
            host: Some(&host),
            cache: &mut cache,
            collection: Collection::Heroes,
            publish: false,
        }
        .run(&mut studio, &files, None)
        .unwrap();

        let name = host.names.borrow()[0].clone();
        assert!(name.ends_with("-My_Shot.png"));
        let hero = &studio.portfolio().home_heroes[0];
        assert_eq!(hero.url, format!("https://cdn.test/{name}"));
        assert!(hero.is_category_hero);
        assert!(!hero.is_published);
    }

    #[test]
    fn failed_push_keeps_data_uri() {
        let tmp = TempDir::new().unwrap();
        let files = write_pngs(tmp.path(), &["a.png"]);
        let mut store = MemoryStore::new();
        let mut studio = new_studio(&mut store);
        let host = FakeHost {
            fail: true,
            names: RefCell::new(Vec::new()),
        };
        let mut cache = CaptionCache::empty();

        let report = Uploader {
            captioner: &Scripted::failing_on(&[]),
            host: Some(&host),
            cache: &mut cache,
            collection: Collection::Gallery,
            publish: true,
        }
        .run(&mut studio, &files, None)
        .unwrap();

        assert!(studio.items()[0].url.starts_with("data:image/png"));
        assert!(matches!(
            &report.outcomes[0].result,
            FileResult::Added { host: HostStatus::Failed(_), .. }
        ));
    }

    #[test]
    fn photos_are_persisted_per_file() {
        let tmp = TempDir::new().unwrap();
        let files = write_pngs(tmp.path(), &["a.png"]);
        let mut store = MemoryStore::new();
        let mut cache = CaptionCache::empty();
        {
            let mut studio = new_studio(&mut store);
            Uploader {
                captioner: &caption::DisabledCaptioner,
                host: None,
                cache: &mut cache,
                collection: Collection::Gallery,
                publish: true,
            }
            .run(&mut studio, &files, None)
            .unwrap();
        }
        let stored: Vec<Photo> =
            serde_json::from_str(&store.get("gallery").unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "New Capture");
        assert_eq!(stored[0].category, "Archive");
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_store_write_keeps_batch_going() {
        let tmp = TempDir::new().unwrap();
        let files = write_pngs(tmp.path(), &["1.png", "2.png", "3.png"]);
        let mut store = FullDisk {
            inner: MemoryStore::new(),
            writes_left: 1,
        };
        let mut studio = Studio::new(
            Portfolio::default(),
            &mut store,
            CollectionKeys::default(),
            "remote",
            session(),
        );
        let mut cache = CaptionCache::empty();
        let (tx, rx) = std::sync::mpsc::channel();

        let report = Uploader {
            captioner: &Scripted::failing_on(&[]),
            host: None,
            cache: &mut cache,
            collection: Collection::Gallery,
            publish: true,
        }
        .run(&mut studio, &files, Some(tx))
        .unwrap();

        assert_eq!(report.progress, (3, 3));
        assert_eq!(report.added(), 3);
        assert_eq!(report.unsaved(), 2);
        assert!(!report.outcomes[0].is_unsaved());
        assert!(report.outcomes[2].is_unsaved());
        assert_eq!(studio.items().len(), 3);

        let progress: Vec<_> = rx
            .iter()
            .filter_map(|e| match e {
                UploadEvent::Progress { current, total, .. } => Some((current, total)),
                UploadEvent::Started { .. } => None,
            })
            .collect();
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn batches_larger_than_a_chunk_keep_input_order() {
        let tmp = TempDir::new().unwrap();
        let names: Vec<String> = (0..ENCODE_CHUNK * 2 + 3).map(|i| format!("{i:02}.png")).collect();
        let files: Vec<PathBuf> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let path = tmp.path().join(name);
                fs::write(&path, [PNG_1X1, &[i as u8]].concat()).unwrap();
                path
            })
            .collect();
        let mut store = MemoryStore::new();
        let mut studio = new_studio(&mut store);
        let mut cache = CaptionCache::empty();
        let (tx, rx) = std::sync::mpsc::channel();

        let report = Uploader {
            captioner: &Scripted::failing_on(&[]),
            host: None,
            cache: &mut cache,
            collection: Collection::Gallery,
            publish: true,
        }
        .run(&mut studio, &files, Some(tx))
        .unwrap();

        let total = files.len();
        assert_eq!(report.progress, (total, total));
        let sources: Vec<_> = report.outcomes.iter().map(|o| o.source.clone()).collect();
        assert_eq!(sources, files);
        let titles: Vec<_> = studio.items().iter().map(|p| p.title.clone()).collect();
        let expected: Vec<_> = (1..=total).map(|n| format!("Shot {n}")).collect();
        assert_eq!(titles, expected);

        let currents: Vec<usize> = rx
            .iter()
            .filter_map(|e| match e {
                UploadEvent::Progress { current, .. } => Some(current),
                UploadEvent::Started { .. } => None,
            })
            .collect();
        assert_eq!(currents, (1..=total).collect::<Vec<_>>());
    }
}
