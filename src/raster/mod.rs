//! Bitmap decoding: 24-bit uncompressed bitmap bytes to a top-down grid of
//! decimal digits, `'8'` for dark pixels and `'1'` for light ones.

mod decode;
mod grid;
mod header;
mod luminance;

pub use decode::{decode, decode_pixels};
pub use grid::DigitGrid;
pub use header::{FormatError, Orientation, RasterHeader, row_padding};
pub use luminance::{
    Bgr, DARK_DIGIT, LIGHT_DIGIT, LUMINANCE_THRESHOLD, digit_for_luminance, relative_luminance,
};
