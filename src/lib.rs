//! # Foyer
//!
//! A password-protected static photo gallery in one binary: an offline
//! manifest generator and a small gated HTTP server. The gallery page itself
//! is a static client-side application that consumes the manifest; foyer
//! never renders it, it only controls who gets the files.
//!
//! # Two Halves
//!
//! ```text
//! foyer manifest   photos/  →  gallery.generated.json   (scan + reconcile)
//! foyer serve      public/  →  http://0.0.0.0:8080      (login-gated files)
//! ```
//!
//! The halves share nothing at runtime (the generator runs offline on the
//! photographer's machine, the server runs wherever the site is hosted)
//! but they agree on two contracts: the manifest JSON schema and the session
//! cookie.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`probe`] | header-only PNG/JPEG dimension parsing |
//! | [`reconcile`] | walks the photo tree, merges `_small`/`_large` variants into logical photos |
//! | [`manifest`] | output document types, path normalization, assembly |
//! | [`auth`] | session token derivation and verification from the shared password |
//! | [`server`] | axum router: access gate, login flow, gated static files |
//! | [`config`] | environment configuration for the server |
//! | [`output`] | CLI summary formatting for the generator |
//!
//! # Design Decisions
//!
//! ## Header Parsing Over Image Decoding
//!
//! The manifest needs width and height so the client can lay out the masonry
//! grid before any image bytes arrive, and nothing more. Decoding crates pull in
//! far more surface than two fixed-offset header reads, so [`probe`] parses
//! the PNG IHDR and JPEG start-of-frame headers directly and treats every
//! failure as "dimensions unknown" rather than a fatal error.
//!
//! ## One Shared Password
//!
//! The gallery has a single audience (family, clients, a wedding party)
//! and a single shared password. There are no accounts, no database, and no
//! server-side session store: the session token is deterministic from the
//! password and a secret salt, so any server instance can validate a cookie
//! it never issued. The trade-offs of that scheme are documented in [`auth`].
//!
//! ## Manifest as the Only Interface
//!
//! The generator writes one JSON document and the client renders from it.
//! Regenerating is cheap and idempotent: unchanged photos produce an
//! unchanged manifest, so the file diffs cleanly in version control.

pub mod auth;
pub mod config;
pub mod manifest;
pub mod output;
pub mod probe;
pub mod reconcile;
pub mod server;

#[cfg(test)]
pub(crate) mod test_helpers;
