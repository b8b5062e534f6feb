//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not storage-centric**. Every photo leads
//! with its positional index and title; ids, sources and statuses follow as
//! indented context lines. This reads as a content inventory while still
//! giving the ids the studio commands take as arguments.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Full Archive (2 photos)
//! 001 Velvet Hour
//!     Portrait · classic · published
//!     Id: 3f2a...
//! 002 Untitled Composition
//!     General · editorial · draft
//!     Id: 9b1c...
//! ```
//!
//! ## Upload
//!
//! ```text
//! Uploading 2 files to Full Archive
//!     [1/2] 001 Velvet Hour
//!         Source: shots/velvet.jpg
//!         Caption: captioned
//!         Image: hosted at https://raw.githubusercontent.com/...
//!     [2/2] (notes.txt) skipped: not a recognized image format
//! Added 1 of 2 files (1 skipped)
//! Captions: 1 captioned
//! ```
//!
//! ## Build
//!
//! ```text
//! Showcase → index.html (2 heroes)
//! 001 Portrait → portrait/index.html (2 photos)
//!     lightbox → portrait/1.html .. portrait/2.html
//!
//! Pages
//!     001 About → about.html (from about.md)
//!     002 Contact → contact.html
//!
//! Generated 1 category, 2 lightbox pages
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::gallery::GalleryState;
use crate::generate::SiteSummary;
use crate::remote::RemoteConfig;
use crate::types::{Collection, Photo, Portfolio};
use crate::upload::{FileResult, HostStatus, UploadEvent, UploadReport};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Title line for a photo. Blank titles show the id in parens instead.
///
/// ```text
/// 001 Velvet Hour
/// 002 (3f2a9c...)
/// ```
fn photo_line(index: usize, photo: &Photo) -> String {
    if photo.title.trim().is_empty() {
        format!("{} ({})", format_index(index), photo.id)
    } else {
        format!("{} {}", format_index(index), photo.title)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

// ============================================================================
// list
// ============================================================================

/// Format one studio collection for `folio list`.
pub fn format_collection(collection: Collection, items: &[Photo]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        collection.label(),
        plural(items.len(), "photo", "photos")
    )];
    for (i, photo) in items.iter().enumerate() {
        let status = if photo.is_published { "published" } else { "draft" };
        lines.push(photo_line(i + 1, photo));
        lines.push(format!(
            "{}{} \u{b7} {} \u{b7} {}",
            indent(1),
            photo.category,
            photo.layout_type,
            status
        ));
        lines.push(format!("{}Id: {}", indent(1), photo.id));
        let desc = truncate_desc(photo.description.trim(), 60);
        if !desc.is_empty() {
            lines.push(format!("{}{}", indent(1), desc));
        }
    }
    lines
}

pub fn print_collection(collection: Collection, items: &[Photo]) {
    for line in format_collection(collection, items) {
        println!("{}", line);
    }
}

// ============================================================================
// upload
// ============================================================================

/// Format a single upload progress event as display lines.
pub fn format_upload_event(event: &UploadEvent) -> Vec<String> {
    match event {
        UploadEvent::Started { total, collection } => vec![format!(
            "Uploading {} to {}",
            plural(*total, "file", "files"),
            collection.label()
        )],
        UploadEvent::Progress {
            current,
            total,
            outcome,
        } => {
            let counter = format!("{}[{}/{}]", indent(1), current, total);
            let source = outcome.source.display().to_string();
            match &outcome.result {
                FileResult::Added {
                    title,
                    caption,
                    host,
                    unsaved,
                    ..
                } => {
                    let image = match host {
                        HostStatus::Inline => "inline data URI".to_string(),
                        HostStatus::Hosted(url) => format!("hosted at {}", url),
                        HostStatus::Failed(e) => format!("push failed ({}), kept inline", e),
                    };
                    let mut lines = vec![
                        format!("{} {} {}", counter, format_index(*current), title),
                        format!("{}Source: {}", indent(2), source),
                        format!("{}Caption: {}", indent(2), caption.label()),
                        format!("{}Image: {}", indent(2), image),
                    ];
                    if let Some(e) = unsaved {
                        lines.push(format!("{}Not saved: {}", indent(2), e));
                    }
                    lines
                }
                FileResult::Unreadable { reason } => {
                    let name = outcome
                        .source
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or(source);
                    vec![format!("{} ({}) skipped: {}", counter, name, reason)]
                }
            }
        }
    }
}

/// Format the closing summary of an upload batch.
pub fn format_upload_summary(report: &UploadReport) -> Vec<String> {
    let (_, total) = report.progress;
    let mut head = format!("Added {} of {}", report.added(), plural(total, "file", "files"));
    if report.skipped() > 0 {
        head.push_str(&format!(" ({} skipped)", report.skipped()));
    }
    let mut lines = vec![head];
    if report.unsaved() > 0 {
        lines.push(format!(
            "Warning: {} not saved to disk (kept only until this command exits)",
            plural(report.unsaved(), "photo", "photos")
        ));
    }
    lines.push(format!("Captions: {}", report.cache_stats));
    lines
}

pub fn print_upload_summary(report: &UploadReport) {
    for line in format_upload_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the pages written by `folio build`.
pub fn format_generate_output(summary: &SiteSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Showcase \u{2192} index.html ({})",
        plural(summary.heroes, "hero", "heroes")
    )];

    for (i, category) in summary.categories.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}/index.html ({})",
            format_index(i + 1),
            category.name,
            category.slug,
            plural(category.photos, "photo", "photos")
        ));
        match category.photos {
            0 => {}
            1 => lines.push(format!("{}lightbox \u{2192} {}/1.html", indent(1), category.slug)),
            n => lines.push(format!(
                "{}lightbox \u{2192} {slug}/1.html .. {slug}/{n}.html",
                indent(1),
                slug = category.slug,
            )),
        }
    }

    let about_source = if summary.about_from_markdown {
        "from about.md"
    } else {
        "from site config"
    };
    lines.push(String::new());
    lines.push("Pages".to_string());
    lines.push(format!(
        "{}{} About \u{2192} about.html ({})",
        indent(1),
        format_index(1),
        about_source
    ));
    lines.push(format!("{}{} Contact \u{2192} contact.html", indent(1), format_index(2)));

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        plural(summary.categories.len(), "category", "categories"),
        plural(summary.lightbox_pages(), "lightbox page", "lightbox pages")
    ));
    if summary.removed_pages > 0 {
        lines.push(format!(
            "Removed {} from the previous build",
            plural(summary.removed_pages, "stale page", "stale pages")
        ));
    }
    lines
}

pub fn print_generate_output(summary: &SiteSummary) {
    for line in format_generate_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// browse
// ============================================================================

/// Format the showcase as `folio browse` displays it: tabs, heading, grid,
/// and the lightbox when one is open.
pub fn format_showcase(state: &GalleryState, portfolio: &Portfolio) -> Vec<String> {
    let tabs: Vec<String> = state
        .categories(portfolio)
        .into_iter()
        .map(|cat| {
            if cat == state.active_category() {
                format!("[{}]", cat)
            } else {
                cat
            }
        })
        .collect();
    let photos = state.filtered_photos(portfolio);

    let mut lines = vec![tabs.join("  "), String::new()];
    if state.is_overview() {
        lines.push(format!("Masterpieces ({})", plural(photos.len(), "hero", "heroes")));
    } else {
        lines.push(format!(
            "{} ({})",
            state.active_category(),
            plural(photos.len(), "capture", "captures")
        ));
    }
    for (i, photo) in photos.iter().enumerate() {
        lines.push(format!(
            "{}{} [{}]",
            indent(1),
            photo_line(i + 1, photo),
            photo.category
        ));
    }

    if let Some((index, photo)) = state
        .selected_index()
        .and_then(|i| photos.get(i).map(|p| (i, *p)))
    {
        lines.push(String::new());
        lines.push(format!(
            "Lightbox {} of {}: {}",
            index + 1,
            photos.len(),
            photo.title
        ));
        lines.push(format!("{}Category: {}", indent(1), photo.category));
        if !photo.description.is_empty() {
            lines.push(format!("{}{}", indent(1), photo.description));
        }
        lines.push(format!("{}Url: {}", indent(1), truncate_desc(&photo.url, 72)));
    }
    lines
}

pub fn print_showcase(state: &GalleryState, portfolio: &Portfolio) {
    for line in format_showcase(state, portfolio) {
        println!("{}", line);
    }
}

// ============================================================================
// remote
// ============================================================================

/// Format stored remote host coordinates. The token is never shown.
pub fn format_remote(remote: Option<&RemoteConfig>) -> Vec<String> {
    let Some(remote) = remote else {
        return vec!["No remote host configured; uploads stay inline".to_string()];
    };
    let token = if remote.stored_token().is_some() {
        "stored"
    } else {
        "from $GITHUB_TOKEN"
    };
    vec![
        format!("Remote: github.com/{}", remote.repo),
        format!("{}Branch: {}", indent(1), remote.branch),
        format!("{}Folder: {}", indent(1), remote.path),
        format!("{}Token: {}", indent(1), token),
    ]
}

pub fn print_remote(remote: Option<&RemoteConfig>) {
    for line in format_remote(remote) {
        println!("{}", line);
    }
}
