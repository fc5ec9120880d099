//! Shared test utilities for the pixel-prime test suite.
//!
//! Builds bitmap byte streams from logical pixel rows, so tests describe the
//! image they mean (top row first, RGB) and the builder handles storage
//! order, BGR channel order and row padding.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = BmpBuilder::new(vec![vec![DARK, LIGHT], vec![DARK, LIGHT]])
//!     .top_down()
//!     .build();
//! assert_eq!(decode(&bytes).unwrap().into_digit_string(), "8181");
//! ```

use std::path::{Path, PathBuf};

/// Black, luminance 0.
pub const DARK: [u8; 3] = [0, 0, 0];
/// White, luminance 255.
pub const LIGHT: [u8; 3] = [255, 255, 255];

/// Filler written into row padding. Non-zero so a decoder that reads padding
/// as pixels produces wrong digits instead of passing by accident.
const PADDING_BYTE: u8 = 0xab;

// =========================================================================
// Bitmap builder
// =========================================================================

/// Builder for 24-bit bitmap files. Rows are given top row first, pixels as
/// `[red, green, blue]`.
#[derive(Debug, Clone)]
pub struct BmpBuilder {
    rows: Vec<Vec<[u8; 3]>>,
    top_down: bool,
    signature: [u8; 2],
    bit_depth: u16,
    compression: u32,
}

impl BmpBuilder {
    pub fn new(rows: Vec<Vec<[u8; 3]>>) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == width),
            "all rows must have the same width"
        );
        Self {
            rows,
            top_down: false,
            signature: *b"BM",
            bit_depth: 24,
            compression: 0,
        }
    }

    /// Build from rows of digits, `'8'` becoming [`DARK`] and anything else
    /// [`LIGHT`].
    pub fn from_digits(rows: &[&str]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| {
                    row.chars()
                        .map(|c| if c == '8' { DARK } else { LIGHT })
                        .collect()
                })
                .collect(),
        )
    }

    /// Store rows top-down (negative height) instead of bottom-up.
    pub fn top_down(mut self) -> Self {
        self.top_down = true;
        self
    }

    pub fn signature(mut self, signature: [u8; 2]) -> Self {
        self.signature = signature;
        self
    }

    /// Declared bit depth. Pixel data is still written as 24-bit.
    pub fn bit_depth(mut self, bit_depth: u16) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    pub fn compression(mut self, compression: u32) -> Self {
        self.compression = compression;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let width = self.rows.first().map_or(0, Vec::len);
        let height = self.rows.len();
        let padding = (4 - (width * 3) % 4) % 4;
        let stride = width * 3 + padding;
        let image_size = stride * height;
        let file_size = 54 + image_size;
        let signed_height = if self.top_down {
            -(height as i32)
        } else {
            height as i32
        };

        let mut bytes = Vec::with_capacity(file_size);
        // File header
        bytes.extend_from_slice(&self.signature);
        bytes.extend_from_slice(&(file_size as u32).to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend_from_slice(&54u32.to_le_bytes());
        // Info header
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(&(width as i32).to_le_bytes());
        bytes.extend_from_slice(&signed_height.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&self.bit_depth.to_le_bytes());
        bytes.extend_from_slice(&self.compression.to_le_bytes());
        bytes.extend_from_slice(&(image_size as u32).to_le_bytes());
        bytes.extend_from_slice(&2835i32.to_le_bytes());
        bytes.extend_from_slice(&2835i32.to_le_bytes());
        bytes.extend_from_slice(&[0; 8]);
        assert_eq!(bytes.len(), 54);

        let stored: Box<dyn Iterator<Item = &Vec<[u8; 3]>>> = if self.top_down {
            Box::new(self.rows.iter())
        } else {
            Box::new(self.rows.iter().rev())
        };
        for row in stored {
            for &[red, green, blue] in row {
                bytes.extend_from_slice(&[blue, green, red]);
            }
            bytes.extend(std::iter::repeat_n(PADDING_BYTE, padding));
        }
        bytes
    }

    /// Write the bitmap to `dir/name` and return the path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build())
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
        path
    }
}

// =========================================================================
// Arithmetic oracles
// =========================================================================

/// Trial division up to the square root.
pub fn is_prime_naive(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
