//! Showcase view state: category tabs, filtered grid, and the lightbox.
//!
//! [`GalleryState`] holds only two pieces of state: the active category and
//! the index of the photo open in the lightbox. Everything else (published
//! photos, the category tabs, the grid contents) is derived from the current
//! [`Portfolio`] on every call. The portfolio is passed in rather than held,
//! so the studio can mutate the collections between two showcase calls and
//! the showcase always sees the result.
//!
//! ## Overview vs. categories
//!
//! ```text
//! "Overview"  →  grid = published heroes      click = drill into hero's category
//! "<cat>"     →  grid = published photos of   click = open lightbox at index
//!                <cat>, collection order
//! ```
//!
//! ## Lightbox
//!
//! Navigation is cyclic over the *current* grid and recomputed each time. An
//! index that no longer fits the grid (e.g. the photo was deleted) closes the
//! lightbox instead of reading out of range.
//!
//! ## Mounted views
//!
//! [`Showcase`] pairs the state with a [`Viewport`]. Keyboard input only
//! reaches the state through a live `Showcase`, and dropping it releases the
//! scroll lock, so nothing outlives the view.

use crate::types::{Direction, OVERVIEW, Photo, Portfolio, cycle_index};

/// Element id the viewport scrolls to after a category change.
pub const GALLERY_ANCHOR: &str = "category-title-section";

/// Presentation side effect requested by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Bring the gallery heading into view.
    ScrollTo(&'static str),
}

/// Keys the showcase reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

impl Key {
    /// Map a DOM-style key name (`"ArrowRight"`, `"Escape"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// What a click on a grid tile did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Overview tile: switched to the photo's category.
    DrilledInto(String),
    /// Category tile: lightbox opened at this index.
    Opened(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryState {
    active_category: String,
    selected: Option<usize>,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryState {
    pub fn new() -> Self {
        Self {
            active_category: OVERVIEW.to_string(),
            selected: None,
        }
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn is_overview(&self) -> bool {
        self.active_category == OVERVIEW
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Background scrolling is suppressed while the lightbox is open.
    pub fn scroll_locked(&self) -> bool {
        self.selected.is_some()
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    /// `"Overview"` followed by the sorted, distinct categories of published
    /// gallery photos.
    pub fn categories(&self, portfolio: &Portfolio) -> Vec<String> {
        categories(portfolio)
    }

    /// Photos shown in the grid for the active category.
    pub fn filtered_photos<'p>(&self, portfolio: &'p Portfolio) -> Vec<&'p Photo> {
        filtered_photos(portfolio, &self.active_category)
    }

    /// The photo open in the lightbox. An index that no longer fits the grid
    /// closes the lightbox.
    pub fn current_photo<'p>(&mut self, portfolio: &'p Portfolio) -> Option<&'p Photo> {
        let index = self.selected?;
        let photo = self.filtered_photos(portfolio).get(index).copied();
        if photo.is_none() {
            log::debug!("lightbox index {index} out of range, closing");
            self.selected = None;
        }
        photo
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Switch category. Any open lightbox is closed, since its index refers
    /// to the previous grid.
    pub fn change_category(&mut self, category: &str) -> Effect {
        self.active_category = category.to_string();
        self.selected = None;
        Effect::ScrollTo(GALLERY_ANCHOR)
    }

    /// A click on the tile at `index` of the current grid.
    pub fn handle_interaction(&mut self, photo: &Photo, index: usize) -> (Interaction, Option<Effect>) {
        if self.is_overview() {
            let effect = self.change_category(&photo.category);
            (Interaction::DrilledInto(photo.category.clone()), Some(effect))
        } else {
            self.selected = Some(index);
            (Interaction::Opened(index), None)
        }
    }

    /// Step the lightbox cyclically. No-op while closed.
    pub fn navigate_lightbox(&mut self, portfolio: &Portfolio, direction: Direction) {
        let Some(index) = self.selected else {
            return;
        };
        let len = self.filtered_photos(portfolio).len();
        self.selected = cycle_index(index, len, direction);
    }

    pub fn close_lightbox(&mut self) {
        self.selected = None;
    }

    /// Keyboard binding: arrows navigate, Escape closes. Ignored while the
    /// lightbox is closed.
    pub fn handle_key(&mut self, portfolio: &Portfolio, key: Key) {
        if self.selected.is_none() {
            return;
        }
        match key {
            Key::ArrowRight => self.navigate_lightbox(portfolio, Direction::Next),
            Key::ArrowLeft => self.navigate_lightbox(portfolio, Direction::Prev),
            Key::Escape => self.close_lightbox(),
            Key::Other => {}
        }
    }

    /// Move to the neighbouring category tab, wrapping around.
    pub fn cycle_category(&mut self, portfolio: &Portfolio, direction: Direction) -> Effect {
        let tabs = self.categories(portfolio);
        let current = tabs
            .iter()
            .position(|c| *c == self.active_category)
            .unwrap_or(0);
        let next = cycle_index(current, tabs.len(), direction).unwrap_or(0);
        let target = tabs[next].clone();
        self.change_category(&target)
    }
}

/// Sorted category tabs with the overview sentinel first.
pub fn categories(portfolio: &Portfolio) -> Vec<String> {
    let mut cats: Vec<String> = portfolio
        .photos
        .iter()
        .filter(|p| p.is_published)
        .map(|p| p.category.clone())
        .collect();
    cats.sort();
    cats.dedup();
    // A photo literally categorised "Overview" would otherwise duplicate the
    // sentinel tab.
    cats.retain(|c| c != OVERVIEW);
    let mut tabs = Vec::with_capacity(cats.len() + 1);
    tabs.push(OVERVIEW.to_string());
    tabs.extend(cats);
    tabs
}

/// Grid contents for `category`.
pub fn filtered_photos<'p>(portfolio: &'p Portfolio, category: &str) -> Vec<&'p Photo> {
    if category == OVERVIEW {
        portfolio.home_heroes.iter().filter(|p| p.is_published).collect()
    } else {
        portfolio
            .photos
            .iter()
            .filter(|p| p.is_published && p.category == category)
            .collect()
    }
}

// ============================================================================
// Mounted view
// ============================================================================

/// Presentation surface a mounted showcase drives.
pub trait Viewport {
    fn scroll_to(&mut self, anchor: &str);
    fn set_scroll_locked(&mut self, locked: bool);
}

/// A mounted showcase. Owns the state and the viewport for as long as the
/// view is on screen; dropping it unmounts the view.
pub struct Showcase<V: Viewport> {
    state: GalleryState,
    viewport: V,
}

impl<V: Viewport> Showcase<V> {
    pub fn mount(viewport: V) -> Self {
        Self {
            state: GalleryState::new(),
            viewport,
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn change_category(&mut self, category: &str) {
        let effect = self.state.change_category(category);
        self.apply(Some(effect));
    }

    pub fn cycle_category(&mut self, portfolio: &Portfolio, direction: Direction) {
        let effect = self.state.cycle_category(portfolio, direction);
        self.apply(Some(effect));
    }

    /// Click on the tile at `index`. Out-of-range clicks are ignored.
    pub fn click(&mut self, portfolio: &Portfolio, index: usize) -> Option<Interaction> {
        let photo = self.state.filtered_photos(portfolio).get(index).copied()?.clone();
        let (interaction, effect) = self.state.handle_interaction(&photo, index);
        self.apply(effect);
        Some(interaction)
    }

    pub fn key(&mut self, portfolio: &Portfolio, key: Key) {
        self.state.handle_key(portfolio, key);
        self.apply(None);
    }

    pub fn close(&mut self) {
        self.state.close_lightbox();
        self.apply(None);
    }

    /// Current lightbox photo, closing the lightbox if it went stale.
    pub fn current_photo<'p>(&mut self, portfolio: &'p Portfolio) -> Option<&'p Photo> {
        let photo = self.state.current_photo(portfolio);
        self.apply(None);
        photo
    }

    fn apply(&mut self, effect: Option<Effect>) {
        if let Some(Effect::ScrollTo(anchor)) = effect {
            self.viewport.scroll_to(anchor);
        }
        self.viewport.set_scroll_locked(self.state.scroll_locked());
    }
}

impl<V: Viewport> Drop for Showcase<V> {
    fn drop(&mut self) {
        self.viewport.set_scroll_locked(false);
    }
}
