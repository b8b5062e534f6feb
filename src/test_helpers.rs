//! Shared test utilities for the folio test suite.
//!
//! Builders for photos with predictable ids and titles, a ready-made studio
//! session, and a tiny valid PNG for upload tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let portfolio = Portfolio::new(
//!     vec![photo("p1", "Portrait"), draft("k1", "Kids")],
//!     vec![hero("h1", "Portrait")],
//! );
//! assert_eq!(portfolio.photos[0].title, "Photo p1");
//! ```

use crate::auth::Session;
use crate::types::Photo;
use crate::upload::EncodedImage;
use chrono::{Duration, Utc};

/// A valid 1x1 RGBA PNG.
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

// =========================================================================
// Photo builders
// =========================================================================

/// Published classic photo with id `id` and title `"Photo {id}"`.
pub fn photo(id: &str, category: &str) -> Photo {
    let mut p = Photo::new(format!("/img/{id}.jpg"), format!("Photo {id}"), category);
    p.id = id.to_string();
    p
}

/// Like [`photo`] but unpublished.
pub fn draft(id: &str, category: &str) -> Photo {
    photo(id, category).published(false)
}

/// Like [`photo`] with the hero flag set.
pub fn hero(id: &str, category: &str) -> Photo {
    let mut p = photo(id, category);
    p.is_category_hero = true;
    p
}

// =========================================================================
// Studio and upload fixtures
// =========================================================================

/// A session valid for the next hour.
pub fn session() -> Session {
    let now = Utc::now();
    Session {
        started_at: now,
        expires_at: now + Duration::hours(1),
    }
}

/// An encoded JPEG-typed image with placeholder bytes.
pub fn encoded(file_name: &str) -> EncodedImage {
    EncodedImage {
        file_name: file_name.to_string(),
        mime: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        sha256: crate::cache::hash_bytes(file_name.as_bytes()),
    }
}
