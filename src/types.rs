//! Shared types for the portfolio: photos, layouts, and the two collections.
//!
//! These types are persisted to the key→JSON store, exported as the backup
//! file, and read back from the published snapshot. Field names serialize in
//! camelCase so snapshots exported by earlier versions of the site load
//! unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel category that shows the hero collection instead of a category.
pub const OVERVIEW: &str = "Overview";

/// A closed enumeration with a fixed display order that can be stepped
/// round-robin.
pub trait Cycle: Sized + Copy + PartialEq + 'static {
    const ORDER: &'static [Self];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|v| *v == self).unwrap_or(0)
    }

    /// `ORDER[(index(self) + 1) mod len]`
    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    /// `ORDER[(index(self) + len - 1) mod len]`
    fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }
}

/// Cyclic step over `len` slots. Returns `None` when there is nothing to
/// step over.
pub fn cycle_index(current: usize, len: usize, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current % len;
    Some(match direction {
        Direction::Next => (current + 1) % len,
        Direction::Prev => (current + len - 1) % len,
    })
}

/// Direction for lightbox navigation and tab cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// How a photo spans the showcase grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    /// 4:5 portrait tile, two grid columns.
    #[default]
    Classic,
    /// 16:10 tile, four grid columns.
    Editorial,
    /// Panoramic band across the full row.
    Wide,
}

impl Cycle for LayoutType {
    const ORDER: &'static [Self] = &[Self::Classic, Self::Editorial, Self::Wide];
}

impl LayoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Editorial => "editorial",
            Self::Wide => "wide",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDER
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layout '{s}' (expected classic, editorial or wide)"))
    }
}

/// One image and its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Opaque unique id, assigned at creation and never reused.
    pub id: String,
    /// Data URI, remote http(s) URL, or path to a static asset.
    pub url: String,
    pub title: String,
    /// Grouping key. Case-sensitive, exact match.
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub is_published: bool,
    /// Kept for snapshot compatibility; membership in the hero collection is
    /// what actually makes a photo a hero.
    #[serde(default)]
    pub is_category_hero: bool,
    #[serde(default)]
    pub layout_type: LayoutType,
}

impl Photo {
    /// Create a photo with a freshly generated id.
    pub fn new(url: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: new_photo_id(),
            url: url.into(),
            title: title.into(),
            category: category.into(),
            description: String::new(),
            is_published: true,
            is_category_hero: false,
            layout_type: LayoutType::Classic,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.is_published = published;
        self
    }
}

/// Generate a photo id. UUID v4 in simple (dash-free) form.
pub fn new_photo_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Which of the two ordered collections an operation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Collection {
    #[default]
    Gallery,
    Heroes,
}

impl Collection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Gallery => "Full Archive",
            Self::Heroes => "Showcase Heroes",
        }
    }
}

/// Both collections together. This is the shape of the published snapshot
/// and of the export file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub home_heroes: Vec<Photo>,
}

impl Portfolio {
    pub fn new(photos: Vec<Photo>, home_heroes: Vec<Photo>) -> Self {
        Self { photos, home_heroes }
    }

    pub fn collection(&self, which: Collection) -> &[Photo] {
        match which {
            Collection::Gallery => &self.photos,
            Collection::Heroes => &self.home_heroes,
        }
    }

    pub(crate) fn collection_mut(&mut self, which: Collection) -> &mut Vec<Photo> {
        match which {
            Collection::Gallery => &mut self.photos,
            Collection::Heroes => &mut self.home_heroes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty() && self.home_heroes.is_empty()
    }
}
