//! Pixel rows to digits.

use super::grid::DigitGrid;
use super::header::{BYTES_PER_PIXEL, FormatError, RasterHeader};
use super::luminance::Bgr;

/// Parse the headers of a whole bitmap file and decode its pixels.
pub fn decode(bytes: &[u8]) -> Result<DigitGrid, FormatError> {
    let header = RasterHeader::parse(bytes)?;
    let pixels = bytes.get(header.pixel_offset as usize..).unwrap_or_default();
    decode_pixels(pixels, &header)
}

/// Decode pixel data laid out as `header` describes. `pixels` starts at the
/// first stored row.
pub fn decode_pixels(pixels: &[u8], header: &RasterHeader) -> Result<DigitGrid, FormatError> {
    header.validate()?;
    let width = header.width_px();
    let rows = header.rows();
    let stride = header.row_stride();

    let needed = header.pixel_data_len().unwrap_or(usize::MAX);
    if pixels.len() < needed {
        return Err(FormatError::TruncatedPixels {
            needed,
            found: pixels.len(),
        });
    }

    let mut digits = Vec::with_capacity(width * rows);
    for row in 0..rows {
        let start = row * stride;
        let row_bytes = &pixels[start..start + width * BYTES_PER_PIXEL];
        digits.extend(
            row_bytes
                .chunks_exact(BYTES_PER_PIXEL)
                .map(|px| Bgr::from_bytes([px[0], px[1], px[2]]).digit()),
        );
    }
    Ok(DigitGrid::from_stored_rows(
        width,
        rows,
        digits,
        header.orientation(),
    ))
}
