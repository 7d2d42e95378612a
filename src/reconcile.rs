//! Photo discovery and entry reconciliation.
//!
//! Walks a photo directory and merges related files into logical photos for
//! the manifest. A photo often exists as several files, `beach_small.jpg`
//! for the grid and `beach_large.jpg` for the lightbox, and the reconciler's
//! job is to recognize them as one subject.
//!
//! ## Pipeline
//!
//! 1. **Discover** image files recursively (hidden files skipped, traversal
//!    sorted by file name so runs are reproducible across filesystems).
//! 2. **Probe** each file's dimensions on the rayon pool; header parsing is
//!    I/O bound and per-file independent. Failures degrade to "no
//!    dimensions" with a recorded warning; they never abort the run.
//! 3. **Classify** each file stem as thumbnail, full, or generic by suffix
//!    substring, and derive its reconciliation key `directory/cleanBase`.
//! 4. **Merge** files into a keyed accumulator, sequentially in traversal
//!    order. A generic file backfills whichever roles remain empty. Within a
//!    role, last write wins; each overwrite is recorded as a warning so
//!    accidental key collisions are visible.
//! 5. **Sort** keys with numeric-aware, case-insensitive natural ordering:
//!    `photo-2` before `photo-10`. This is the canonical manifest order.
//! 6. **Finalize** each entry into a [`PhotoEntry`]: slug id, title,
//!    dimensions, aspect ratio, orientation.
//!
//! ## Suffix matching policy
//!
//! Suffixes match as a substring anywhere in the stem, not only at the end:
//! `beach_small_edit.jpg` classifies as the thumbnail of `beach_edit`. This
//! tolerates export tools that append version tags after the size suffix.
//! Anchoring the match to the end would reclassify such files, so the
//! substring behavior is deliberate and load-bearing.

use crate::manifest::{Orientation, PhotoEntry, aspect_ratio};
use crate::probe::{self, Dimensions};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("photo root not found: {0}")]
    PhotosRootMissing(PathBuf),
}

/// Suffix configuration for variant classification.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Substring marking a grid/thumbnail variant.
    pub thumbnail_suffix: String,
    /// Substring marking a full-resolution/lightbox variant.
    pub full_suffix: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            thumbnail_suffix: "_small".to_string(),
            full_suffix: "_large".to_string(),
        }
    }
}

/// Result of a reconciliation run: ordered photos plus non-fatal warnings.
#[derive(Debug)]
pub struct ReconcileReport {
    pub photos: Vec<PhotoEntry>,
    pub warnings: Vec<String>,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Role a file plays for its reconciliation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Thumbnail,
    Full,
    Generic,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Thumbnail => "thumbnail",
            Role::Full => "full",
            Role::Generic => "generic",
        }
    }
}

/// One file's claim on a role: its relative path and probed dimensions.
#[derive(Debug, Clone)]
struct Candidate {
    path: String,
    dims: Option<Dimensions>,
}

/// Accumulator for one reconciliation key. Created on the first file
/// matching the key, mutated as later files arrive, finalized exactly once.
#[derive(Debug, Default)]
struct ReconciliationEntry {
    directory: String,
    clean_base: String,
    thumbnail: Option<Candidate>,
    full: Option<Candidate>,
    generic: Option<Candidate>,
}

/// Reconcile all photos under `root` into manifest entries.
pub fn reconcile(
    root: &Path,
    config: &ReconcileConfig,
) -> Result<ReconcileReport, ReconcileError> {
    if !root.is_dir() {
        return Err(ReconcileError::PhotosRootMissing(root.to_path_buf()));
    }

    let files = discover_files(root)?;

    // Probe dimensions concurrently; results come back in discovery order.
    let probed: Vec<Result<Option<Dimensions>, probe::ProbeError>> =
        files.par_iter().map(|path| probe::probe_file(path)).collect();

    let mut warnings = Vec::new();
    let mut entries: HashMap<String, ReconciliationEntry> = HashMap::new();

    // Merge sequentially so last-write-wins is well defined.
    for (path, probe_result) in files.iter().zip(probed) {
        let rel = relative_slash_path(path, root);
        let dims = match probe_result {
            Ok(dims) => dims,
            Err(err) => {
                warnings.push(format!("{rel}: {err}, continuing without dimensions"));
                None
            }
        };
        merge_file(&mut entries, &rel, dims, config, &mut warnings);
    }

    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort_by(|a, b| natural_cmp(a, b));

    let photos = finalize_entries(&keys, &entries);

    Ok(ReconcileReport { photos, warnings })
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

fn discover_files(root: &Path) -> Result<Vec<PathBuf>, ReconcileError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        if is_image(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Relative path from the root, always forward-slash.
fn relative_slash_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap();
    rel.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Classification and merge
// ---------------------------------------------------------------------------

/// Classify a file stem and strip the matched suffix to get the clean base.
///
/// Checks the thumbnail suffix first, then the full suffix. The first
/// occurrence of the matched substring is removed wherever it appears in the
/// stem (see the module docs for why this is not anchored to the end).
fn classify_stem(stem: &str, config: &ReconcileConfig) -> (Role, String) {
    if let Some(idx) = stem.find(&config.thumbnail_suffix) {
        let clean = remove_range(stem, idx, config.thumbnail_suffix.len());
        return (Role::Thumbnail, clean);
    }
    if let Some(idx) = stem.find(&config.full_suffix) {
        let clean = remove_range(stem, idx, config.full_suffix.len());
        return (Role::Full, clean);
    }
    (Role::Generic, stem.to_string())
}

fn remove_range(s: &str, start: usize, len: usize) -> String {
    format!("{}{}", &s[..start], &s[start + len..])
}

fn merge_file(
    entries: &mut HashMap<String, ReconciliationEntry>,
    rel_path: &str,
    dims: Option<Dimensions>,
    config: &ReconcileConfig,
    warnings: &mut Vec<String>,
) {
    let (directory, filename) = match rel_path.rsplit_once('/') {
        Some((dir, file)) => (dir.to_string(), file),
        None => (String::new(), rel_path),
    };
    let stem = filename.rsplit_once('.').map_or(filename, |(s, _)| s);
    let (role, clean_base) = classify_stem(stem, config);

    let key = if directory.is_empty() {
        clean_base.clone()
    } else {
        format!("{directory}/{clean_base}")
    };

    let entry = entries.entry(key.clone()).or_insert_with(|| {
        ReconciliationEntry {
            directory: directory.clone(),
            clean_base: clean_base.clone(),
            ..Default::default()
        }
    });

    let slot = match role {
        Role::Thumbnail => &mut entry.thumbnail,
        Role::Full => &mut entry.full,
        Role::Generic => &mut entry.generic,
    };
    if let Some(previous) = slot {
        warnings.push(format!(
            "{key}: {rel_path} replaces {} as the {} variant",
            previous.path,
            role.label()
        ));
    }
    *slot = Some(Candidate {
        path: rel_path.to_string(),
        dims,
    });
}

// ---------------------------------------------------------------------------
// Finalization
// ---------------------------------------------------------------------------

/// Sequential fallback ids for entries whose slug collapses to nothing.
/// Scoped to one generation run, never global state.
struct FallbackIds {
    next: u32,
}

impl FallbackIds {
    fn new() -> Self {
        Self { next: 0 }
    }

    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("photo-{:03}", self.next)
    }
}

fn finalize_entries(
    keys: &[&String],
    entries: &HashMap<String, ReconciliationEntry>,
) -> Vec<PhotoEntry> {
    let mut photos = Vec::with_capacity(keys.len());
    let mut fallback = FallbackIds::new();
    let mut used_ids: HashSet<String> = HashSet::new();

    for key in keys {
        let entry = &entries[*key];

        // A generic file stands in for whichever roles no specific file claimed.
        let thumbnail = entry.thumbnail.clone().or_else(|| entry.generic.clone());
        let full = entry.full.clone().or_else(|| entry.generic.clone());

        // Degenerate input guard: nothing claimed either role.
        if thumbnail.is_none() && full.is_none() {
            continue;
        }

        let full_dims = full.as_ref().and_then(|c| c.dims);
        let thumb_dims = thumbnail.as_ref().and_then(|c| c.dims);
        let dims = full_dims.or(thumb_dims);

        let id = assign_id(entry, &mut fallback, &mut used_ids);
        let title = title_from_base(&entry.clean_base);

        photos.push(PhotoEntry {
            id,
            title,
            thumbnail: thumbnail.map(|c| c.path).unwrap_or_default(),
            full: full.map(|c| c.path).unwrap_or_default(),
            width: dims.map(|d| d.width),
            height: dims.map(|d| d.height),
            thumbnail_width: thumb_dims.map(|d| d.width),
            thumbnail_height: thumb_dims.map(|d| d.height),
            aspect_ratio: dims.map(|d| aspect_ratio(d.width, d.height)),
            orientation: Orientation::from_dimensions(
                dims.map(|d| d.width),
                dims.map(|d| d.height),
            ),
        });
    }

    photos
}

fn assign_id(
    entry: &ReconciliationEntry,
    fallback: &mut FallbackIds,
    used_ids: &mut HashSet<String>,
) -> String {
    let raw = format!("{} {}", entry.directory, entry.clean_base);
    let slug = kebab_slug(raw.trim());

    let base = if slug.is_empty() {
        fallback.next_id()
    } else {
        slug
    };

    // Distinct keys can slugify identically ("a&b" vs "a-b"); suffix until
    // unique so manifest ids stay usable as DOM anchors.
    let mut id = base.clone();
    let mut n = 2;
    while !used_ids.insert(id.clone()) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

/// Lowercase kebab slug: non-alphanumeric runs become single dashes.
fn kebab_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut prev_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
            prev_dash = false;
        } else if !prev_dash && !slug.is_empty() {
            slug.push('-');
            prev_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Display title from the clean base name: separators become spaces, each
/// word gets an initial capital. Empty input falls back to a placeholder.
fn title_from_base(base: &str) -> String {
    let words: Vec<String> = base
        .split(['-', '_', ' ', '.'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "Untitled photo".to_string()
    } else {
        words.join(" ")
    }
}

// ---------------------------------------------------------------------------
// Natural ordering
// ---------------------------------------------------------------------------

/// Case-insensitive comparison that orders digit runs numerically, so
/// `photo-2` sorts before `photo-10`. Equal numeric values with different
/// zero padding compare by padding length to keep the order total.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let si = i;
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let da: String = a[si..i].iter().collect();
            let db: String = b[sj..j].iter().collect();
            let ta = da.trim_start_matches('0');
            let tb = db.trim_start_matches('0');
            let ord = ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb));
            if ord != Ordering::Equal {
                return ord;
            }
            if da.len() != db.len() {
                return da.len().cmp(&db.len());
            }
        } else {
            let ord = a[i].cmp(&b[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }
    (a.len() - i).cmp(&(b.len() - j))
}
