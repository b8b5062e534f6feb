//! # Folio
//!
//! A photography portfolio: a public showcase (category tabs, a curated
//! overview of hero shots, a cyclic lightbox), about and contact pages, and
//! a passcode-gated studio where the owner curates the collections and
//! uploads new work with machine-written captions.
//!
//! # Architecture
//!
//! ```text
//! config.toml ──► FolioConfig
//!                     │
//! .folio/*.json ──► store ──► Portfolio ──┬──► gallery ──► browse (terminal)
//! snapshot.json ──┘                       ├──► generate ──► dist/ (static HTML)
//!                                         └──► studio ◄── upload ◄── caption
//!                                                              └──── remote
//! ```
//!
//! All state mutation happens on one thread. The studio owns the portfolio
//! while it is being edited and writes every touched collection back to the
//! store before returning. The showcase never holds derived data: categories
//! and grid contents are recomputed from the portfolio on every call.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Photo`, `LayoutType`, `Collection`, `Portfolio`, cyclic index arithmetic |
//! | [`gallery`] | Showcase state machine: tabs, filtered grid, lightbox, keyboard |
//! | [`studio`] | Owner's curation controller: CRUD, reordering, remote coordinates, export |
//! | [`auth`] | Passcode check and the on-disk studio session |
//! | [`store`] | Key→JSON persistence, snapshot loading, hydration, seed data |
//! | [`upload`] | Batch pipeline: collect, encode in parallel, caption, host, commit |
//! | [`caption`] | Captioning client and its fallback triples |
//! | [`remote`] | Remote image host (GitHub contents API) |
//! | [`cache`] | Content-hash caption cache |
//! | [`credentials`] | Ordered credential provider chains |
//! | [`generate`] | Static site rendering with Maud |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`naming`] | Slugs and safe file names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit sessions
//!
//! The studio cannot be constructed without a [`auth::Session`]. There is no
//! global "authenticated" flag to forget to check: the type system carries
//! the login.
//!
//! ## Captions never fail a batch
//!
//! A photo without a machine caption is still a photo. Missing credentials
//! and API failures each map to a fixed fallback triple, and the upload goes
//! on. The same holds for the remote host: a failed push keeps the inline
//! data URI.

pub mod auth;
pub mod cache;
pub mod caption;
pub mod config;
pub mod credentials;
pub mod gallery;
pub mod generate;
pub mod naming;
pub mod output;
pub mod remote;
pub mod store;
pub mod studio;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
