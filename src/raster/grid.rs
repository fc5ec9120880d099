//! The decoded digit grid and the canonical digit string built from it.

use super::header::Orientation;

/// One digit per pixel, rows always top-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitGrid {
    width: usize,
    height: usize,
    digits: Vec<u8>,
}

impl DigitGrid {
    /// Build a grid from rows in on-disk order. This is the only place row
    /// order is normalized: bottom-up storage gets its rows reversed.
    ///
    /// `digits` must hold exactly `width * height` entries; [`super::decode`]
    /// is the only caller outside tests and sizes the buffer from the header.
    pub(crate) fn from_stored_rows(
        width: usize,
        height: usize,
        digits: Vec<u8>,
        orientation: Orientation,
    ) -> Self {
        debug_assert_eq!(digits.len(), width * height);
        let digits = match orientation {
            Orientation::TopDown => digits,
            Orientation::BottomUp => digits
                .chunks_exact(width.max(1))
                .rev()
                .flatten()
                .copied()
                .collect(),
        };
        Self {
            width,
            height,
            digits,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.digits.chunks_exact(self.width.max(1))
    }

    /// Digit at column `x` of row `y`, counted from the top left.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width {
            return None;
        }
        self.digits.get(y * self.width + x).copied()
    }

    /// Row-major digits, no separators.
    pub fn as_bytes(&self) -> &[u8] {
        &self.digits
    }

    pub fn to_digit_string(&self) -> String {
        self.digits.iter().copied().map(char::from).collect()
    }

    pub fn into_digit_string(self) -> String {
        self.to_digit_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_up_rows_are_reversed() {
        let stored = b"111888".to_vec();
        let grid = DigitGrid::from_stored_rows(3, 2, stored, Orientation::BottomUp);
        assert_eq!(grid.to_digit_string(), "888111");
        assert_eq!(grid.get(0, 0), Some(b'8'));
        assert_eq!(grid.get(2, 1), Some(b'1'));
    }

    #[test]
    fn top_down_rows_pass_through() {
        let stored = b"111888".to_vec();
        let grid = DigitGrid::from_stored_rows(3, 2, stored, Orientation::TopDown);
        assert_eq!(grid.into_digit_string(), "111888");
    }

    #[test]
    fn rows_iterate_top_to_bottom() {
        let grid = DigitGrid::from_stored_rows(2, 3, b"818811".to_vec(), Orientation::BottomUp);
        let rows: Vec<&[u8]> = grid.rows().collect();
        assert_eq!(rows, vec![&b"11"[..], &b"88"[..], &b"81"[..]]);
        assert_eq!(grid.len(), 6);
        assert_eq!((grid.width(), grid.height()), (2, 3));
    }

    #[test]
    fn get_out_of_bounds() {
        let grid = DigitGrid::from_stored_rows(2, 1, b"81".to_vec(), Orientation::TopDown);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 1), None);
    }
}
