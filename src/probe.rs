//! Header-only dimension probing for PNG and JPEG files.
//!
//! The gallery never decodes pixel data. The manifest only needs width and
//! height so the client can reserve layout space before images load. Both
//! formats put dimensions close enough to the front of the file that a plain
//! byte scan is all that's required:
//!
//! - **PNG**: the IHDR chunk is required to be first, so width and height sit
//!   at fixed offsets 16 and 20 (big-endian u32).
//! - **JPEG**: walk the marker stream from SOI until a start-of-frame segment
//!   (baseline, extended, or progressive) and read the 16-bit height/width
//!   fields inside it.
//!
//! Extensions the probe doesn't understand are not an error: the file simply
//! has no dimensions available and the manifest omits those fields.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed {0} header")]
    MalformedHeader(&'static str),
}

/// Pixel dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Probe a file on disk, dispatching by extension.
///
/// Returns `Ok(None)` for extensions the probe has no parser for (webp, gif,
/// and so on). Those files still enter the manifest, just without dimensions.
pub fn probe_file(path: &Path) -> Result<Option<Dimensions>, ProbeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "png" => {
            let bytes = std::fs::read(path)?;
            png_dimensions(&bytes).map(Some)
        }
        "jpg" | "jpeg" => {
            let bytes = std::fs::read(path)?;
            jpeg_dimensions(&bytes).map(Some)
        }
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Read dimensions from a PNG buffer.
///
/// Layout: 8-byte signature, 4-byte chunk length, 4-byte `IHDR` tag, then
/// width and height as big-endian u32. IHDR must be the first chunk per the
/// PNG spec, so no chunk walking is needed.
pub fn png_dimensions(data: &[u8]) -> Result<Dimensions, ProbeError> {
    if data.len() < 24 || !data.starts_with(PNG_SIGNATURE) {
        return Err(ProbeError::MalformedHeader("PNG"));
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);

    Ok(Dimensions { width, height })
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

/// Start-of-frame markers that carry dimensions: C0–C3, C5–C7, C9–CB, CD–CF.
/// C4 (DHT), C8 (JPG) and CC (DAC) share the range but are not frame headers.
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF)
}

/// Read dimensions from a JPEG buffer by scanning the marker stream.
///
/// Every segment between SOI and SOS is `0xFF`, a marker byte, then a
/// big-endian u16 length that includes itself. A start-of-frame segment holds
/// sample precision (1 byte), height (u16) and width (u16) right after the
/// length. Reaching EOI, SOS, or the end of the buffer without a frame header
/// means the dimensions cannot be recovered.
pub fn jpeg_dimensions(data: &[u8]) -> Result<Dimensions, ProbeError> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(ProbeError::MalformedHeader("JPEG"));
    }

    let mut pos = 2;
    loop {
        // Markers may be preceded by any number of 0xFF fill bytes.
        while pos < data.len() && data[pos] == 0xFF {
            pos += 1;
        }
        if pos >= data.len() {
            return Err(ProbeError::MalformedHeader("JPEG"));
        }

        let marker = data[pos];
        pos += 1;

        // EOI or SOS: entropy-coded data follows, no frame header was seen.
        if marker == 0xD9 || marker == 0xDA {
            return Err(ProbeError::MalformedHeader("JPEG"));
        }

        if pos + 2 > data.len() {
            return Err(ProbeError::MalformedHeader("JPEG"));
        }
        let seg_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if seg_len < 2 {
            return Err(ProbeError::MalformedHeader("JPEG"));
        }

        if is_start_of_frame(marker) {
            // length (2) + precision (1) + height (2) + width (2)
            if pos + 7 > data.len() {
                return Err(ProbeError::MalformedHeader("JPEG"));
            }
            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            return Ok(Dimensions { width, height });
        }

        // Skip the rest of this segment (length counts its own two bytes).
        pos += seg_len;
    }
}
