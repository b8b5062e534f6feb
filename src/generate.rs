//! Static site rendering.
//!
//! Renders the public views of a [`Portfolio`] as plain HTML. Every page is
//! produced from the same derived values the interactive showcase uses
//! ([`gallery::categories`], [`gallery::filtered_photos`]), so the static site
//! and `folio browse` always agree on what is visible.
//!
//! ## Generated Pages
//!
//! - **Showcase** (`/index.html`): splash, category tabs, published heroes.
//!   Each hero links into its category page.
//! - **Category pages** (`/{slug}/index.html`): published photos of one
//!   category in collection order, laid out by each photo's layout type.
//! - **Lightbox pages** (`/{slug}/{n}.html`): one photo full screen with
//!   cyclic prev/next links and a close link back to the category page.
//! - **About** (`/about.html`): markdown from `site.about`, or a short page
//!   built from the site config when the file is absent.
//! - **Contact** (`/contact.html`): the contact details set in `[site]`.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about.html
//! ├── contact.html
//! ├── portrait/
//! │   ├── index.html
//! │   ├── 1.html
//! │   └── 2.html
//! └── pre-wed/
//!     └── ...
//! ```
//!
//! The paths written are kept in `.folio-pages.json`. The next build deletes
//! any listed page it did not write again, so unpublished photos and emptied
//! categories disappear from the output. Files folio never wrote are left
//! alone.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined per page:
//! - `static/style.css`: base styles (colors injected from config)
//! - `static/nav.js`: lightbox keys (ArrowLeft, ArrowRight, Escape)

use crate::config::{self, FolioConfig, SiteInfo};
use crate::gallery::{self, GALLERY_ANCHOR, GalleryState, Interaction};
use crate::naming::unique_slugs;
use crate::types::{Direction, OVERVIEW, Photo, Portfolio, cycle_index};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Page list error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/nav.js");

/// One rendered category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPage {
    pub name: String,
    pub slug: String,
    pub photos: usize,
}

/// What [`generate`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    pub heroes: usize,
    pub categories: Vec<CategoryPage>,
    /// True when the about page came from the markdown file.
    pub about_from_markdown: bool,
    /// Pages of the previous build that no longer exist and were deleted.
    pub removed_pages: usize,
}

impl SiteSummary {
    pub fn lightbox_pages(&self) -> usize {
        self.categories.iter().map(|c| c.photos).sum()
    }
}

/// Shared inputs for every page.
struct Site<'a> {
    info: &'a SiteInfo,
    css: String,
    /// `(name, slug)` for every category tab after the overview.
    tabs: Vec<(String, String)>,
}

impl Site<'_> {
    fn slug_of(&self, category: &str) -> Option<&str> {
        self.tabs
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, slug)| slug.as_str())
    }
}

/// Render the public site for `portfolio` into `output_dir`. The about
/// markdown is read relative to `root`.
pub fn generate(
    portfolio: &Portfolio,
    config: &FolioConfig,
    root: &Path,
    output_dir: &Path,
) -> Result<SiteSummary, GenerateError> {
    let color_css = config::generate_color_css(&config.colors);
    let names = gallery::categories(portfolio);
    let site = Site {
        info: &config.site,
        css: format!("{}\n\n{}", color_css, CSS_STATIC),
        tabs: unique_slugs(names.iter().skip(1).map(String::as_str)),
    };

    let previous = load_page_list(output_dir);
    let mut pages = PageWriter::new(output_dir)?;

    let heroes = gallery::filtered_photos(portfolio, OVERVIEW);
    pages.write("index.html", render_index(&site, &heroes))?;
    log::debug!("wrote index.html with {} heroes", heroes.len());

    let mut categories = Vec::with_capacity(site.tabs.len());
    for (name, slug) in &site.tabs {
        let mut state = GalleryState::new();
        state.change_category(name);
        let photos = state.filtered_photos(portfolio);

        pages.write(
            &format!("{slug}/index.html"),
            render_category_page(&site, name, &photos),
        )?;

        for (idx, photo) in photos.iter().enumerate() {
            if let (Interaction::Opened(open), _) = state.handle_interaction(photo, idx) {
                let page = render_lightbox_page(&site, name, &photos, open);
                pages.write(&format!("{slug}/{}.html", open + 1), page)?;
            }
        }
        log::debug!("wrote {slug}/ with {} photos", photos.len());

        categories.push(CategoryPage {
            name: name.clone(),
            slug: slug.clone(),
            photos: photos.len(),
        });
    }

    let about_path = root.join(&config.site.about);
    let about_markdown = fs::read_to_string(&about_path).ok();
    pages.write(
        "about.html",
        render_about_page(&site, about_markdown.as_deref()),
    )?;
    pages.write("contact.html", render_contact_page(&site))?;

    let removed_pages = prune_stale_pages(output_dir, &previous, &pages.written)?;
    save_page_list(output_dir, &pages.written)?;

    log::info!("site generated at {}", output_dir.display());
    Ok(SiteSummary {
        heroes: heroes.len(),
        categories,
        about_from_markdown: about_markdown.is_some(),
        removed_pages,
    })
}

// ============================================================================
// Page List
// ============================================================================

/// Records every page of the last build, relative to the output directory.
pub const PAGE_LIST_FILENAME: &str = ".folio-pages.json";

/// Writes pages under the output directory and remembers their paths.
struct PageWriter<'a> {
    output_dir: &'a Path,
    written: BTreeSet<String>,
}

impl<'a> PageWriter<'a> {
    fn new(output_dir: &'a Path) -> Result<Self, GenerateError> {
        fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir,
            written: BTreeSet::new(),
        })
    }

    fn write(&mut self, rel: &str, page: Markup) -> Result<(), GenerateError> {
        let path = self.output_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, page.into_string())?;
        self.written.insert(rel.to_string());
        Ok(())
    }
}

/// Load the page list of the previous build. Missing or corrupt means empty.
fn load_page_list(output_dir: &Path) -> BTreeSet<String> {
    let path = output_dir.join(PAGE_LIST_FILENAME);
    let Ok(content) = fs::read_to_string(&path) else {
        return BTreeSet::new();
    };
    match serde_json::from_str(&content) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("ignoring corrupt page list {}: {e}", path.display());
            BTreeSet::new()
        }
    }
}

fn save_page_list(output_dir: &Path, written: &BTreeSet<String>) -> Result<(), GenerateError> {
    let json = serde_json::to_string_pretty(written)?;
    fs::write(output_dir.join(PAGE_LIST_FILENAME), json)?;
    Ok(())
}

/// Only plain relative paths inside the output directory are ever removed.
fn is_generated_path(rel: &str) -> bool {
    !rel.is_empty()
        && !rel.starts_with('/')
        && !rel.contains('\\')
        && rel.split('/').all(|part| !part.is_empty() && part != "." && part != "..")
}

/// Remove pages the previous build wrote that this build did not, then any
/// category directory they leave empty. Returns how many pages were removed.
fn prune_stale_pages(
    output_dir: &Path,
    previous: &BTreeSet<String>,
    written: &BTreeSet<String>,
) -> Result<usize, GenerateError> {
    let mut removed = 0;
    for rel in previous.difference(written) {
        if !is_generated_path(rel) {
            log::warn!("page list entry '{rel}' is outside the site, leaving it");
            continue;
        }
        let path = output_dir.join(rel);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("removed stale page {rel}");
                removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(parent) = path.parent() {
            if parent != output_dir {
                // Fails while the directory still holds other files.
                let _ = fs::remove_dir(parent);
            }
        }
    }
    Ok(removed)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Which top-level section a page belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Work,
    Story,
    Connect,
}

fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn site_header(info: &SiteInfo, current: Section) -> Markup {
    let links = [
        (Section::Work, "/", "Work"),
        (Section::Story, "/about.html", "Story"),
        (Section::Connect, "/contact.html", "Connect"),
    ];
    html! {
        header.site-header {
            a.brand href="/" {
                span.brand-title { (info.title) }
                @if !info.owner.is_empty() {
                    span.brand-owner { "By " (info.owner) }
                }
            }
            nav.site-nav {
                @for (section, href, label) in links {
                    a href=(href) class=[(section == current).then_some("current")] { (label) }
                }
            }
        }
    }
}

fn category_tabs(site: &Site<'_>, active: &str) -> Markup {
    html! {
        nav.category-tabs {
            a href="/" class=[(active == OVERVIEW).then_some("active")] { (OVERVIEW) }
            @for (name, slug) in &site.tabs {
                a href={ "/" (slug) "/" } class=[(name == active).then_some("active")] { (name) }
            }
        }
    }
}

fn photo_card(photo: &Photo, href: Option<&str>, hover_label: &str) -> Markup {
    let image = html! {
        img src=(photo.url) alt=(photo.title) loading="lazy";
        span.photo-hover {
            span.hover-label { (hover_label) }
            span.hover-title { (photo.title) }
        }
    };
    html! {
        div class={ "photo-card layout-" (photo.layout_type.as_str()) } {
            @if let Some(href) = href {
                a.photo-frame href=(href) { (image) }
            } @else {
                div.photo-frame { (image) }
            }
            div.photo-label {
                div.photo-label-head {
                    h4 { (photo.title) }
                    span.photo-category { (photo.category) }
                }
                @if !photo.description.is_empty() {
                    p.photo-description { (photo.description) }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_index(site: &Site<'_>, heroes: &[&Photo]) -> Markup {
    let info = site.info;
    let content = html! {
        (site_header(info, Section::Work))
        section.splash {
            @if !info.splash_image.is_empty() {
                img.splash-image src=(info.splash_image) alt="";
            }
            div.splash-text {
                h1 { (info.title) }
                @if !info.tagline.is_empty() {
                    p.tagline { (info.tagline) }
                }
                a.splash-scroll href={ "#" (GALLERY_ANCHOR) } aria-label="Enter the gallery" {}
            }
        }
        main.showcase {
            (category_tabs(site, OVERVIEW))
            header.category-title id=(GALLERY_ANCHOR) {
                span.eyebrow { "The Collection" }
                h2 { "Masterpieces" }
                p.lede {
                    "A curated selection of our most definitive works. "
                    "Choose a signature piece to explore the full collection."
                }
            }
            div.photo-grid {
                @for hero in heroes {
                    @let href = site.slug_of(&hero.category).map(|slug| format!("/{slug}/#{GALLERY_ANCHOR}"));
                    (photo_card(hero, href.as_deref(), "Enter Archive"))
                }
            }
        }
    };
    base_document(&info.title, &site.css, None, content)
}

fn render_category_page(site: &Site<'_>, category: &str, photos: &[&Photo]) -> Markup {
    let content = html! {
        (site_header(site.info, Section::Work))
        main.showcase {
            (category_tabs(site, category))
            header.category-title id=(GALLERY_ANCHOR) {
                span.eyebrow { "Archive Gallery" }
                h2 { (category) }
                p.lede {
                    "Showcasing the complete series of " (photos.len())
                    " captures from the " (category) " archive."
                }
            }
            div.photo-grid {
                @for (idx, photo) in photos.iter().enumerate() {
                    @let href = format!("{}.html", idx + 1);
                    (photo_card(photo, Some(&href), "Focus View"))
                }
            }
        }
    };
    let title = format!("{} - {}", category, site.info.title);
    base_document(&title, &site.css, None, content)
}

/// Lightbox for `photos[index]`. Prev and next wrap around the category.
fn render_lightbox_page(site: &Site<'_>, category: &str, photos: &[&Photo], index: usize) -> Markup {
    let photo = photos[index];
    let len = photos.len();
    let page_for = |direction| {
        cycle_index(index, len, direction)
            .map(|i| format!("{}.html", i + 1))
            .unwrap_or_else(|| "index.html".to_string())
    };
    let prev_url = page_for(Direction::Prev);
    let next_url = page_for(Direction::Next);
    let close_url = format!("index.html#{GALLERY_ANCHOR}");

    let content = html! {
        div.lightbox {
            div.lightbox-bar {
                span.lightbox-trail { (category) " Archive / " (format!("{:02}", index + 1)) }
                a.lightbox-close href=(close_url) aria-label="Close" { "×" }
            }
            a.lightbox-prev href=(prev_url) aria-label="Previous" { "‹" }
            figure.lightbox-frame {
                img src=(photo.url) alt=(photo.title);
            }
            a.lightbox-next href=(next_url) aria-label="Next" { "›" }
            div.lightbox-caption {
                div.lightbox-meta {
                    span.photo-category { (photo.category) }
                    span.lightbox-count { (index + 1) " of " (len) }
                }
                h2 { (photo.title) }
                @if !photo.description.is_empty() {
                    p { (photo.description) }
                }
            }
        }
        div.nav-zones data-prev=(prev_url) data-next=(next_url) data-close=(close_url) {}
        script { (PreEscaped(JS)) }
    };
    let title = format!("{} - {}", photo.title, site.info.title);
    base_document(&title, &site.css, Some("lightbox-view"), content)
}

fn render_about_page(site: &Site<'_>, markdown: Option<&str>) -> Markup {
    let info = site.info;
    let body = match markdown {
        Some(md) => {
            let mut body_html = String::new();
            md_html::push_html(&mut body_html, Parser::new(md));
            PreEscaped(body_html)
        }
        None => html! {
            h1 { (info.title) }
            @if !info.owner.is_empty() {
                p { "Photographs by " (info.owner) "." }
            }
            @if !info.tagline.is_empty() {
                p { (info.tagline) }
            }
        },
    };
    let content = html! {
        (site_header(info, Section::Story))
        main.about-page {
            span.eyebrow { "The Curator" }
            article.about-content { (body) }
        }
    };
    let title = format!("About - {}", info.title);
    base_document(&title, &site.css, None, content)
}

fn render_contact_page(site: &Site<'_>) -> Markup {
    let info = site.info;
    let instagram_handle = info.instagram.trim_start_matches('@');
    let content = html! {
        (site_header(info, Section::Connect))
        main.contact-page {
            span.eyebrow { "Inquiries" }
            h2 { "Let's craft " em { "forever" } "." }
            dl.contact-details {
                @if !info.email.is_empty() {
                    dt { "Direct Message" }
                    dd { a href={ "mailto:" (info.email) } { (info.email) } }
                }
                @if !instagram_handle.is_empty() {
                    dt { "Social Studio" }
                    dd {
                        a href={ "https://www.instagram.com/" (instagram_handle) "/" } target="_blank" rel="noopener" {
                            "@" (instagram_handle)
                        }
                    }
                }
                @if !info.phone.is_empty() {
                    dt { "Phone" }
                    dd { a href={ "tel:" (info.phone) } { (info.phone) } }
                }
                @if !info.location.is_empty() {
                    dt { "Studio" }
                    dd { (info.location) }
                }
            }
        }
    };
    let title = format!("Contact - {}", info.title);
    base_document(&title, &site.css, None, content)
}

// ============================================================================
// Tests
// ============================================================================
