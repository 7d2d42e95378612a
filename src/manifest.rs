//! Manifest document types and assembly.
//!
//! The manifest is the contract between this tool and the client-side
//! renderer: a single JSON document with an ordered `photos` array plus
//! optional hero/archive metadata. Field names are camelCase on the wire and
//! absent optionals are omitted entirely, so the document stays diffable and
//! hand-editable.
//!
//! Path-valued metadata (hero image, download archive) is normalized here:
//! absolute URLs pass through untouched, local paths become manifest-relative
//! forward-slash paths. Photo paths themselves are already relative; the
//! reconciler produces them from the walk.

use serde::Serialize;

/// Fixed schema reference embedded in every generated manifest.
pub const SCHEMA_REF: &str = "./gallery.schema.json";

/// Which way a photo should flow in the masonry layout.
///
/// `Square` doubles as the "unknown" value: when probing failed we have no
/// dimensions, and a square cell is the least-bad layout guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    /// Classify from optional dimensions. Within 1px of equal counts as
    /// square; sensor crops routinely come out one pixel off.
    pub fn from_dimensions(width: Option<u32>, height: Option<u32>) -> Self {
        match (width, height) {
            (Some(w), Some(h)) => {
                if w.abs_diff(h) <= 1 {
                    Orientation::Square
                } else if w > h {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                }
            }
            _ => Orientation::Square,
        }
    }
}

/// Height/width ratio rounded to six decimal places.
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    (height as f64 / width as f64 * 1_000_000.0).round() / 1_000_000.0
}

/// One photo in the gallery, as written to the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoEntry {
    /// URL-safe slug, unique across the manifest.
    pub id: String,
    pub title: String,
    /// Relative path to the grid asset. May equal `full`.
    pub thumbnail: String,
    /// Relative path to the lightbox asset. May equal `thumbnail`.
    pub full: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    pub orientation: Orientation,
}

/// Optional top-level page metadata, straight from CLI flags / environment.
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    pub download_archive: Option<String>,
    pub hero_eyebrow: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub hero_image: Option<String>,
}

/// The complete manifest document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryManifest {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub photos: Vec<PhotoEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_archive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_eyebrow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

/// Wrap reconciled photos and page metadata into the output document.
pub fn assemble(photos: Vec<PhotoEntry>, meta: PageMeta) -> GalleryManifest {
    GalleryManifest {
        schema: SCHEMA_REF.to_string(),
        photos,
        download_archive: meta.download_archive.as_deref().map(normalize_asset_path),
        hero_eyebrow: meta.hero_eyebrow,
        hero_title: meta.hero_title,
        hero_subtitle: meta.hero_subtitle,
        hero_image: meta.hero_image.as_deref().map(normalize_asset_path),
    }
}

/// Normalize a path-valued metadata field.
///
/// Absolute URLs (with a scheme, or protocol-relative `//`) pass through
/// unchanged. Local paths are made manifest-relative: backslashes become
/// forward slashes, a leading `./` is dropped, and a leading `assets/`
/// segment is dropped (the renderer resolves photo paths against the assets
/// directory already).
pub fn normalize_asset_path(path: &str) -> String {
    if path.contains("://") || path.starts_with("//") {
        return path.to_string();
    }

    let mut p = path.replace('\\', "/");
    if let Some(rest) = p.strip_prefix("./") {
        p = rest.to_string();
    }
    if let Some(rest) = p.strip_prefix("assets/") {
        p = rest.to_string();
    }
    p
}
