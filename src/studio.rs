//! Studio: the owner's curation controller.
//!
//! The studio owns the portfolio while the owner edits it. Every operation
//! targets the collection selected by the active tab (gallery or heroes),
//! builds a fresh `Vec<Photo>` for it, swaps it in, and writes that
//! collection back to the store before returning.
//!
//! Constructing a [`Studio`] requires a [`Session`]; there is no way to reach
//! the mutating operations without one.
//!
//! Operations that name an unknown id are no-ops and report `false`.

use crate::auth::Session;
use crate::remote::RemoteConfig;
use crate::store::{self, CollectionKeys, Store, StoreError};
use crate::types::{Collection, Cycle, LayoutType, Photo, Portfolio};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Category must not be empty")]
    EmptyCategory,
    #[error("Photo id '{0}' already exists in the {1}")]
    DuplicateId(String, &'static str),
}

/// Reorder direction in the studio list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Photo),
    Declined,
    NotFound,
}

pub struct Studio<'s> {
    portfolio: Portfolio,
    store: &'s mut dyn Store,
    keys: CollectionKeys,
    remote_key: String,
    active_tab: Collection,
    session: Session,
}

impl<'s> Studio<'s> {
    pub fn new(
        portfolio: Portfolio,
        store: &'s mut dyn Store,
        keys: CollectionKeys,
        remote_key: impl Into<String>,
        session: Session,
    ) -> Self {
        Self {
            portfolio,
            store,
            keys,
            remote_key: remote_key.into(),
            active_tab: Collection::Gallery,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn into_portfolio(self) -> Portfolio {
        self.portfolio
    }

    pub fn active_tab(&self) -> Collection {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: Collection) {
        self.active_tab = tab;
    }

    /// Photos of the active tab, in curation order.
    pub fn items(&self) -> &[Photo] {
        self.portfolio.collection(self.active_tab)
    }

    pub fn find(&self, id: &str) -> Option<&Photo> {
        self.items().iter().find(|p| p.id == id)
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    /// Append to the active tab.
    pub fn add(&mut self, photo: Photo) -> Result<(), StudioError> {
        self.add_to(self.active_tab, photo)
    }

    /// Append to a specific collection.
    pub fn add_to(&mut self, collection: Collection, mut photo: Photo) -> Result<(), StudioError> {
        let current = self.portfolio.collection(collection);
        if current.iter().any(|p| p.id == photo.id) {
            return Err(StudioError::DuplicateId(photo.id, collection.label()));
        }
        photo.is_category_hero = collection == Collection::Heroes;
        let mut next = current.to_vec();
        next.push(photo);
        self.commit(collection, next)?;
        Ok(())
    }

    pub fn toggle_publish(&mut self, id: &str) -> Result<bool, StudioError> {
        self.update(id, |p| p.is_published = !p.is_published)
    }

    /// Swap with the neighbour above or below. No-op at either end.
    pub fn move_item(&mut self, id: &str, direction: Move) -> Result<bool, StudioError> {
        let tab = self.active_tab;
        let current = self.portfolio.collection(tab);
        let Some(index) = current.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        let target = match direction {
            Move::Up => index.checked_sub(1),
            Move::Down => Some(index + 1).filter(|t| *t < current.len()),
        };
        let Some(target) = target else {
            return Ok(false);
        };
        let mut next = current.to_vec();
        next.swap(index, target);
        self.commit(tab, next)?;
        Ok(true)
    }

    pub fn update_category(&mut self, id: &str, category: &str) -> Result<bool, StudioError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(StudioError::EmptyCategory);
        }
        self.update(id, |p| p.category = category.to_string())
    }

    pub fn update_details(
        &mut self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, StudioError> {
        self.update(id, |p| {
            if let Some(title) = title {
                p.title = title.to_string();
            }
            if let Some(description) = description {
                p.description = description.to_string();
            }
        })
    }

    /// Step the layout `classic → editorial → wide → classic`.
    pub fn toggle_layout(&mut self, id: &str) -> Result<Option<LayoutType>, StudioError> {
        let mut layout = None;
        self.update(id, |p| {
            p.layout_type = p.layout_type.next();
            layout = Some(p.layout_type);
        })?;
        Ok(layout)
    }

    /// Remove a photo once `confirm` approves it.
    pub fn delete(
        &mut self,
        id: &str,
        confirm: impl FnOnce(&Photo) -> bool,
    ) -> Result<DeleteOutcome, StudioError> {
        let tab = self.active_tab;
        let Some(photo) = self.find(id).cloned() else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !confirm(&photo) {
            return Ok(DeleteOutcome::Declined);
        }
        let next: Vec<Photo> = self
            .portfolio
            .collection(tab)
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        self.commit(tab, next)?;
        log::info!("deleted '{}' from {}", photo.title, tab.label());
        Ok(DeleteOutcome::Deleted(photo))
    }

    // ------------------------------------------------------------------
    // Remote host coordinates and export
    // ------------------------------------------------------------------

    pub fn remote(&self) -> Option<RemoteConfig> {
        store::read_json(&*self.store, &self.remote_key)
    }

    pub fn set_remote(&mut self, config: &RemoteConfig) -> Result<(), StudioError> {
        store::write_json(self.store, &self.remote_key, config)?;
        Ok(())
    }

    pub fn clear_remote(&mut self) -> Result<(), StudioError> {
        self.store.remove(&self.remote_key)?;
        Ok(())
    }

    /// Write the backup file into `dir`.
    pub fn export(&self, dir: &Path) -> Result<PathBuf, StudioError> {
        Ok(store::write_export(&self.portfolio, dir)?)
    }

    // ------------------------------------------------------------------

    fn update(&mut self, id: &str, edit: impl FnOnce(&mut Photo)) -> Result<bool, StudioError> {
        let tab = self.active_tab;
        let current = self.portfolio.collection(tab);
        let Some(index) = current.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        let mut next = current.to_vec();
        edit(&mut next[index]);
        self.commit(tab, next)?;
        Ok(true)
    }

    /// Swap in the new collection, then persist it. The in-memory state is
    /// updated even when the write fails.
    fn commit(&mut self, collection: Collection, next: Vec<Photo>) -> Result<(), StoreError> {
        *self.portfolio.collection_mut(collection) = next;
        let key = match collection {
            Collection::Gallery => &self.keys.gallery,
            Collection::Heroes => &self.keys.heroes,
        };
        store::save_collection(self.store, key, self.portfolio.collection(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_helpers::{hero, photo, session};

    fn studio_with(store: &mut MemoryStore, photos: Vec<Photo>) -> Studio<'_> {
        let heroes = vec![hero("h1", "Portrait")];
        Studio::new(
            Portfolio::new(photos, heroes),
            store,
            CollectionKeys::default(),
            "remote",
            session(),
        )
    }

    fn ids(studio: &Studio<'_>) -> Vec<String> {
        studio.items().iter().map(|p| p.id.clone()).collect()
    }

    fn three() -> Vec<Photo> {
        vec![photo("a", "Portrait"), photo("b", "Street"), photo("c", "Kids")]
    }

    fn stored_gallery(store: &MemoryStore) -> Vec<Photo> {
        serde_json::from_str(&store.get("gallery").unwrap().unwrap()).unwrap()
    }

    // =========================================================================
    // add
    // =========================================================================

    #[test]
    fn add_appends_and_persists() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        studio.add(photo("d", "Portrait")).unwrap();
        assert_eq!(ids(&studio), vec!["a", "b", "c", "d"]);
        drop(studio);
        assert_eq!(stored_gallery(&store).len(), 4);
    }

    #[test]
    fn add_to_heroes_marks_hero_flag() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        studio.select_tab(Collection::Heroes);
        studio.add(photo("h2", "Street")).unwrap();
        let added = studio.find("h2").unwrap();
        assert!(added.is_category_hero);
        assert_eq!(studio.portfolio().photos.len(), 3);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        let result = studio.add(photo("a", "Portrait"));
        assert!(matches!(result, Err(StudioError::DuplicateId(..))));
    }

    // =========================================================================
    // publish / category / layout
    // =========================================================================

    #[test]
    fn toggle_publish_flips_flag() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        assert!(studio.toggle_publish("b").unwrap());
        assert!(!studio.find("b").unwrap().is_published);
        studio.toggle_publish("b").unwrap();
        assert!(studio.find("b").unwrap().is_published);
    }

    #[test]
    fn toggle_publish_unknown_id_is_noop() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        assert!(!studio.toggle_publish("zzz").unwrap());
        drop(studio);
        assert_eq!(store.get("gallery").unwrap(), None);
    }

    #[test]
    fn update_category_trims_and_rejects_empty() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        assert!(studio.update_category("a", "  Landscape ").unwrap());
        assert_eq!(studio.find("a").unwrap().category, "Landscape");
        assert!(matches!(
            studio.update_category("a", "   "),
            Err(StudioError::EmptyCategory)
        ));
    }

    #[test]
    fn toggle_layout_three_times_is_identity() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        let original = studio.find("a").unwrap().layout_type;
        assert_eq!(studio.toggle_layout("a").unwrap(), Some(LayoutType::Editorial));
        assert_eq!(studio.toggle_layout("a").unwrap(), Some(LayoutType::Wide));
        assert_eq!(studio.toggle_layout("a").unwrap(), Some(original));
    }

    #[test]
    fn toggle_layout_unknown_id() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        assert_eq!(studio.toggle_layout("nope").unwrap(), None);
    }

    #[test]
    fn update_details_changes_only_given_fields() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        studio.update_details("a", Some("Dawn"), None).unwrap();
        let p = studio.find("a").unwrap();
        assert_eq!(p.title, "Dawn");
        assert_eq!(p.description, "");
    }

    // =========================================================================
    // move_item
    // =========================================================================

    #[test]
    fn move_up_swaps_with_previous() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        assert!(studio.move_item("b", Move::Up).unwrap());
        assert_eq!(ids(&studio), vec!["b", "a", "c"]);
    }

    #[test]
    fn move_is_noop_at_bounds() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        assert!(!studio.move_item("a", Move::Up).unwrap());
        assert!(!studio.move_item("c", Move::Down).unwrap());
        assert_eq!(ids(&studio), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_up_then_down_restores_order() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        for id in ["b", "c"] {
            studio.move_item(id, Move::Up).unwrap();
            studio.move_item(id, Move::Down).unwrap();
            assert_eq!(ids(&studio), vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn move_persists_new_order() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        studio.move_item("a", Move::Down).unwrap();
        drop(studio);
        let order: Vec<String> = stored_gallery(&store).into_iter().map(|p| p.id).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn move_only_touches_active_tab() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        studio.select_tab(Collection::Heroes);
        assert!(!studio.move_item("b", Move::Up).unwrap());
        assert_eq!(studio.portfolio().photos[1].id, "b");
    }

    // =========================================================================
    // delete
    // =========================================================================

    #[test]
    fn delete_requires_confirmation() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        let outcome = studio.delete("b", |_| false).unwrap();
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(ids(&studio), vec!["a", "b", "c"]);
    }

    #[test]
    fn delete_confirmed_removes_photo() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        let mut asked = None;
        let outcome = studio
            .delete("b", |p| {
                asked = Some(p.title.clone());
                true
            })
            .unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted(p) if p.id == "b"));
        assert_eq!(asked.as_deref(), Some("Photo b"));
        assert_eq!(ids(&studio), vec!["a", "c"]);
    }

    #[test]
    fn delete_unknown_id_never_asks() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        let outcome = studio
            .delete("zzz", |_| panic!("should not ask"))
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    // =========================================================================
    // remote + export
    // =========================================================================

    #[test]
    fn remote_config_roundtrips_through_store() {
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        assert_eq!(studio.remote(), None);
        let remote = RemoteConfig {
            repo: "owner/site".into(),
            token: "ghp_x".into(),
            path: "images".into(),
            branch: "main".into(),
        };
        studio.set_remote(&remote).unwrap();
        assert_eq!(studio.remote(), Some(remote));
        studio.clear_remote().unwrap();
        assert_eq!(studio.remote(), None);
    }

    #[test]
    fn export_writes_current_state() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        let mut studio = studio_with(&mut store, three());
        studio.toggle_publish("c").unwrap();
        let path = studio.export(tmp.path()).unwrap();
        let exported = store::import_json(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(&exported, studio.portfolio());
    }
}
