//! Shared test utilities for the foyer test suite.
//!
//! Real photos are too heavy for fixtures, and the probe only ever reads
//! headers, so tests fabricate the smallest byte sequences that carry
//! dimensions. These builders are the single source of fake image bytes for
//! reconciler and CLI tests.

/// Minimal PNG: signature, IHDR length/tag, width, height. Nothing after the
/// dimensions is read by the probe.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data
}

/// Minimal baseline JPEG: SOI, one APP0 segment, then an SOF0 frame header
/// carrying the dimensions.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];

    // APP0 so the SOF is not the first segment, as in real files.
    let app0 = b"JFIF\0";
    data.push(0xFF);
    data.push(0xE0);
    data.extend_from_slice(&((app0.len() as u16 + 2).to_be_bytes()));
    data.extend_from_slice(app0);

    let mut sof = vec![8u8]; // sample precision
    sof.extend_from_slice(&(height as u16).to_be_bytes());
    sof.extend_from_slice(&(width as u16).to_be_bytes());
    sof.extend_from_slice(&[1, 0x01, 0x11, 0x00]); // one component
    data.push(0xFF);
    data.push(0xC0);
    data.extend_from_slice(&((sof.len() as u16 + 2).to_be_bytes()));
    data.extend_from_slice(&sof);

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe;

    #[test]
    fn builders_round_trip_through_the_probe() {
        let png = png_bytes(321, 654);
        let dims = probe::png_dimensions(&png).unwrap();
        assert_eq!((dims.width, dims.height), (321, 654));

        let jpeg = jpeg_bytes(1234, 567);
        let dims = probe::jpeg_dimensions(&jpeg).unwrap();
        assert_eq!((dims.width, dims.height), (1234, 567));
    }
}
