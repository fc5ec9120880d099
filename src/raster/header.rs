//! Bitmap file and info header parsing.
//!
//! Only one layout is accepted: a 14-byte `BM` file header, a 40-byte info
//! header, pixel data starting at byte 54, 24 bits per pixel, no
//! compression. All multi-byte fields are little-endian.
//!
//! ```text
//! offset  size  field
//!      0     2  signature "BM"
//!     10     4  pixel data offset
//!     14     4  info header size
//!     18     4  width  (i32)
//!     22     4  height (i32, negative = rows stored top-down)
//!     28     2  bits per pixel
//!     30     4  compression
//! ```

use thiserror::Error;

pub const FILE_HEADER_LEN: usize = 14;
pub const INFO_HEADER_LEN: u32 = 40;
/// Byte offset of the pixel data, straight after both headers.
pub const PIXEL_OFFSET: u32 = 54;
pub const SIGNATURE: [u8; 2] = *b"BM";
pub const BYTES_PER_PIXEL: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("file is {len} bytes, too short for a bitmap header")]
    TruncatedHeader { len: usize },
    #[error("not a bitmap: signature {found:?}, expected \"BM\"")]
    BadSignature { found: [u8; 2] },
    #[error("unsupported pixel data offset {0}, expected 54")]
    PixelOffset(u32),
    #[error("unsupported info header size {0}, expected 40")]
    InfoHeaderSize(u32),
    #[error("unsupported bit depth {0}, only 24 bits per pixel is supported")]
    BitDepth(u16),
    #[error("compressed bitmaps are not supported (compression {0})")]
    Compression(u32),
    #[error("invalid dimensions {width}x{height}: width must be positive, height non-zero")]
    Dimensions { width: i32, height: i32 },
    #[error("pixel data truncated: need {needed} bytes, found {found}")]
    TruncatedPixels { needed: usize, found: usize },
}

/// Order in which pixel rows are stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// First stored row is the bottom of the image. Positive height.
    BottomUp,
    /// First stored row is the top of the image. Negative height.
    TopDown,
}

impl Orientation {
    pub fn from_height(height: i32) -> Self {
        if height < 0 {
            Orientation::TopDown
        } else {
            Orientation::BottomUp
        }
    }
}

/// The header fields that govern how pixel bytes are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterHeader {
    pub width: i32,
    /// Sign encodes row order, see [`Orientation`].
    pub height: i32,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub pixel_offset: u32,
}

impl RasterHeader {
    /// Read and validate the headers at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let header_len = FILE_HEADER_LEN + INFO_HEADER_LEN as usize;
        if bytes.len() < header_len {
            return Err(FormatError::TruncatedHeader { len: bytes.len() });
        }

        let found = [bytes[0], bytes[1]];
        if found != SIGNATURE {
            return Err(FormatError::BadSignature { found });
        }
        let pixel_offset = read_u32(bytes, 10);
        if pixel_offset != PIXEL_OFFSET {
            return Err(FormatError::PixelOffset(pixel_offset));
        }
        let info_size = read_u32(bytes, 14);
        if info_size != INFO_HEADER_LEN {
            return Err(FormatError::InfoHeaderSize(info_size));
        }

        let header = Self {
            width: read_u32(bytes, 18) as i32,
            height: read_u32(bytes, 22) as i32,
            bits_per_pixel: u16::from_le_bytes([bytes[28], bytes[29]]),
            compression: read_u32(bytes, 30),
            pixel_offset,
        };
        header.validate()?;
        Ok(header)
    }

    /// Reject everything but uncompressed 24-bit pixels with a non-empty area.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.bits_per_pixel != 24 {
            return Err(FormatError::BitDepth(self.bits_per_pixel));
        }
        if self.compression != 0 {
            return Err(FormatError::Compression(self.compression));
        }
        if self.width <= 0 || self.height == 0 {
            return Err(FormatError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_height(self.height)
    }

    /// Width in pixels. Zero for a header that failed validation.
    pub fn width_px(&self) -> usize {
        usize::try_from(self.width).unwrap_or(0)
    }

    /// Number of pixel rows, `|height|`.
    pub fn rows(&self) -> usize {
        self.height.unsigned_abs() as usize
    }

    pub fn row_padding(&self) -> usize {
        row_padding(self.width_px())
    }

    /// Bytes per stored row, padding included.
    pub fn row_stride(&self) -> usize {
        self.width_px() * BYTES_PER_PIXEL + self.row_padding()
    }

    /// Bytes of pixel data needed to read every pixel. The last row's
    /// padding is not required.
    pub fn pixel_data_len(&self) -> Option<usize> {
        let rows = self.rows();
        if rows == 0 {
            return Some(0);
        }
        self.row_stride()
            .checked_mul(rows - 1)?
            .checked_add(self.width_px() * BYTES_PER_PIXEL)
    }
}

/// Padding bytes after each row so stored rows are a multiple of 4 bytes.
pub fn row_padding(width: usize) -> usize {
    (4 - (width * BYTES_PER_PIXEL) % 4) % 4
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
