//! End-to-end curation: log in, edit through the studio against a real
//! on-disk store, then read the result back the way the public views do.

use folio::auth::{AuthError, Authenticator, SessionFile};
use folio::config::FolioConfig;
use folio::gallery::{Interaction, Key, Showcase, Viewport};
use folio::store::{self, CollectionKeys, EXPORT_FILENAME, FileStore};
use folio::studio::{DeleteOutcome, Move, Studio};
use folio::types::{Collection, LayoutType, Photo, Portfolio};
use folio::{generate, naming};
use std::fs;
use tempfile::TempDir;

fn shot(id: &str, category: &str) -> Photo {
    let mut p = Photo::new(format!("/img/{id}.jpg"), format!("Shot {id}"), category);
    p.id = id.to_string();
    p
}

fn starting_portfolio() -> Portfolio {
    Portfolio::new(
        vec![
            shot("a", "Portrait"),
            shot("b", "Street"),
            shot("c", "Portrait"),
        ],
        vec![shot("h", "Street")],
    )
}

#[derive(Default)]
struct RecordingViewport {
    scrolled: Vec<String>,
    locked: bool,
}

impl Viewport for RecordingViewport {
    fn scroll_to(&mut self, anchor: &str) {
        self.scrolled.push(anchor.to_string());
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}

// =========================================================================
// Login and persistence
// =========================================================================

#[test]
fn login_session_survives_between_commands() {
    let tmp = TempDir::new().unwrap();
    let auth = Authenticator::new("lumiere", 30);

    assert!(matches!(auth.login("wrong"), Err(AuthError::InvalidPasscode)));
    assert!(matches!(auth.login("wrong"), Err(AuthError::InvalidPasscode)));

    let session = auth.login("lumiere").unwrap();
    let file = SessionFile::new(tmp.path());
    file.save(&session).unwrap();
    assert_eq!(file.require().unwrap(), session);

    file.clear().unwrap();
    assert!(matches!(file.require(), Err(AuthError::NotLoggedIn)));
}

#[test]
fn studio_edits_persist_to_disk() {
    let tmp = TempDir::new().unwrap();
    let session = Authenticator::new("pw", 60).login("pw").unwrap();
    let keys = CollectionKeys::default();

    {
        let mut file_store = FileStore::new(tmp.path());
        let mut studio = Studio::new(
            starting_portfolio(),
            &mut file_store,
            keys.clone(),
            "remote",
            session,
        );
        assert!(studio.move_item("c", Move::Up).unwrap());
        assert!(studio.toggle_publish("b").unwrap());
        assert_eq!(
            studio.toggle_layout("a").unwrap(),
            Some(LayoutType::Editorial)
        );
        assert!(studio.update_category("a", "  Kids  ").unwrap());
        assert_eq!(
            studio.delete("h", |_| false).unwrap(),
            DeleteOutcome::NotFound,
            "heroes are not on the active tab"
        );
        studio.select_tab(Collection::Heroes);
        assert!(matches!(
            studio.delete("h", |_| true).unwrap(),
            DeleteOutcome::Deleted(_)
        ));
    }

    let reopened = FileStore::new(tmp.path());
    let portfolio = store::hydrate_studio(&reopened, &keys, None);
    let ids: Vec<&str> = portfolio.photos.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
    assert_eq!(portfolio.photos[0].category, "Kids");
    assert_eq!(portfolio.photos[0].layout_type, LayoutType::Editorial);
    assert!(!portfolio.photos[2].is_published);
    assert!(portfolio.home_heroes.is_empty());
}

#[test]
fn export_file_reproduces_portfolio() {
    let tmp = TempDir::new().unwrap();
    let session = Authenticator::new("pw", 60).login("pw").unwrap();
    let mut file_store = FileStore::new(tmp.path().join("state"));
    let portfolio = starting_portfolio();
    let studio = Studio::new(
        portfolio.clone(),
        &mut file_store,
        CollectionKeys::default(),
        "remote",
        session,
    );

    let path = studio.export(tmp.path()).unwrap();
    assert_eq!(path, tmp.path().join(EXPORT_FILENAME));

    let parsed = store::import_json(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, portfolio);
}

#[test]
fn published_snapshot_wins_for_public_views_only() {
    let tmp = TempDir::new().unwrap();
    let keys = CollectionKeys::default();
    let mut file_store = FileStore::new(tmp.path());
    store::save_collection(&mut file_store, &keys.gallery, &[shot("local", "Street")]).unwrap();

    let snapshot = Portfolio::new(vec![shot("snap", "Portrait")], vec![]);
    let public = store::hydrate_public(&file_store, &keys, Some(snapshot.clone()));
    let studio = store::hydrate_studio(&file_store, &keys, Some(snapshot));

    assert_eq!(public.photos[0].id, "snap");
    assert_eq!(studio.photos[0].id, "local");
}

// =========================================================================
// Showcase over studio edits
// =========================================================================

#[test]
fn showcase_follows_studio_changes() {
    let session = Authenticator::new("pw", 60).login("pw").unwrap();
    let mut memory = store::MemoryStore::new();
    let mut studio = Studio::new(
        starting_portfolio(),
        &mut memory,
        CollectionKeys::default(),
        "remote",
        session,
    );

    let mut showcase = Showcase::mount(RecordingViewport::default());
    let clicked = showcase.click(studio.portfolio(), 0);
    assert_eq!(clicked, Some(Interaction::DrilledInto("Street".to_string())));
    assert_eq!(showcase.viewport().scrolled, vec!["category-title-section"]);

    showcase.change_category("Portrait");
    assert_eq!(showcase.click(studio.portfolio(), 1), Some(Interaction::Opened(1)));
    assert!(showcase.viewport().locked);

    // The open photo is deleted behind the lightbox.
    studio.delete("c", |_| true).unwrap();
    showcase.key(studio.portfolio(), Key::ArrowRight);
    assert!(showcase.current_photo(studio.portfolio()).is_some_and(|p| p.id == "a"));

    studio.delete("a", |_| true).unwrap();
    assert!(showcase.current_photo(studio.portfolio()).is_none());
    assert!(!showcase.viewport().locked);
}

// =========================================================================
// Static site
// =========================================================================

#[test]
fn build_writes_every_public_page() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("dist");
    let mut portfolio = starting_portfolio();
    portfolio.photos.push(shot("d", "Pre-wed"));
    portfolio.photos.push(shot("e", "Hidden").published(false));

    let summary = generate::generate(&portfolio, &FolioConfig::default(), tmp.path(), &out).unwrap();

    assert_eq!(summary.categories.len(), 3);
    assert_eq!(summary.lightbox_pages(), 4);
    for page in ["index.html", "about.html", "contact.html"] {
        assert!(out.join(page).exists(), "missing {page}");
    }
    let portrait = naming::slugify("Portrait");
    assert!(out.join(&portrait).join("index.html").exists());
    assert!(out.join(&portrait).join("2.html").exists());
    assert!(!out.join(naming::slugify("Hidden")).exists());

    let lightbox = fs::read_to_string(out.join(&portrait).join("2.html")).unwrap();
    assert!(lightbox.contains("data-next=\"1.html\""));
}
