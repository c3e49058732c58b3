//! Foreground/background color registers and panel byte order.

use embedded_graphics_core::pixelcolor::{Rgb565, raw::RawU16};
use embedded_graphics_core::prelude::RawData;

// Board palette
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
pub const BLUE: Rgb565 = Rgb565::new(0, 0, 31);
pub const RED: Rgb565 = Rgb565::new(31, 0, 0);
pub const GREEN: Rgb565 = Rgb565::new(0, 63, 0);
pub const MAGENTA: Rgb565 = Rgb565::new(31, 0, 31);
pub const CYAN: Rgb565 = Rgb565::new(0, 63, 31);
pub const YELLOW: Rgb565 = Rgb565::new(31, 63, 0);
pub const GRAY: Rgb565 = Rgb565::new(16, 33, 16);

/// Color as the two bytes the panel expects on the wire (high byte first).
pub fn panel_bytes(color: Rgb565) -> [u8; 2] {
    RawU16::from(color).into_inner().to_be_bytes()
}

/// Color from a raw 16-bit 5-6-5 value as passed through the control commands.
pub fn from_raw(value: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(value))
}

/// The two color registers every drawing call reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorState {
    foreground: Rgb565,
    background: Rgb565,
}

impl Default for ColorState {
    fn default() -> Self {
        Self {
            foreground: BLACK,
            background: WHITE,
        }
    }
}

impl ColorState {
    pub fn foreground(&self) -> Rgb565 {
        self.foreground
    }

    pub fn background(&self) -> Rgb565 {
        self.background
    }

    /// Returns the previous foreground so callers can restore it.
    pub fn set_foreground(&mut self, color: Rgb565) -> Rgb565 {
        core::mem::replace(&mut self.foreground, color)
    }

    /// Returns the previous background so callers can restore it.
    pub fn set_background(&mut self, color: Rgb565) -> Rgb565 {
        core::mem::replace(&mut self.background, color)
    }
}
