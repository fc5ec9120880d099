//! Pixel brightness and the digit each pixel becomes.

/// Pixels at or above this luminance are light.
pub const LUMINANCE_THRESHOLD: f64 = 200.0;
/// Digit for a dark pixel. Zero is never used so no digit changes the
/// magnitude by position alone.
pub const DARK_DIGIT: u8 = b'8';
pub const LIGHT_DIGIT: u8 = b'1';

/// One stored pixel, channels in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bgr {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl Bgr {
    pub fn from_bytes([blue, green, red]: [u8; 3]) -> Self {
        Self { blue, green, red }
    }

    pub fn luminance(self) -> f64 {
        relative_luminance(self.red, self.green, self.blue)
    }

    pub fn digit(self) -> u8 {
        digit_for_luminance(self.luminance())
    }
}

/// ITU-R BT.709 relative luminance, in channel units (0.0 to 255.0).
pub fn relative_luminance(red: u8, green: u8, blue: u8) -> f64 {
    0.2126 * f64::from(red) + 0.7152 * f64::from(green) + 0.0722 * f64::from(blue)
}

pub fn digit_for_luminance(luminance: f64) -> u8 {
    if luminance < LUMINANCE_THRESHOLD {
        DARK_DIGIT
    } else {
        LIGHT_DIGIT
    }
}
