//! Panel geometry, orientation and pin configuration.

/// Name used as the prefix of every GPIO label requested by the driver.
pub const DRIVER_NAME: &str = "lcd_st7735";
pub const RESET_LABEL: &str = "lcd_st7735:rst-gpios";
pub const DATA_COMMAND_LABEL: &str = "lcd_st7735:cd-gpios";
pub const BACKLIGHT_LABEL: &str = "lcd_st7735:backlight-gpios";

// ST7735S 128RGB×160, mounted landscape
pub const SCREEN_WIDTH: u16 = 160;
pub const SCREEN_HEIGHT: u16 = 128;

/// Bits per pixel of the 65k color mode programmed by `init`.
pub const BITS_PER_PIXEL: u32 = 16;

/// Memory Access Control (36h) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait = 0x00,
    Landscape = 0x60,
    PortraitSwapped = 0xC0,
    LandscapeSwapped = 0xA0,
}

/// Software rotation applied by the addressing engine on top of the
/// hardware orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Whether logical width and height are exchanged.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Get rotation angle in degrees for logging
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub rgb: bool,
    pub orientation: Orientation,
    pub rotation: Rotation,
    /// Width of the surface addressed by the controller after `orientation`.
    pub width: u16,
    /// Height of the surface addressed by the controller after `orientation`.
    pub height: u16,
    pub dx: u16,
    pub dy: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rgb: true,
            orientation: Orientation::Landscape,
            rotation: Rotation::Deg0,
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            dx: 0,
            dy: 0,
        }
    }
}

impl Config {
    /// Logical dimensions seen by drawing calls.
    pub fn logical_size(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Bytes the staging buffer must hold: one 16-bit cell per pixel.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 2
    }

    /// MADCTL parameter byte including the RGB/BGR order bit.
    pub fn madctl(&self) -> u8 {
        if self.rgb {
            self.orientation as u8
        } else {
            self.orientation as u8 | 0x08
        }
    }
}

/// GPIO line numbers handed over by the board description.
///
/// A missing line disables the feature it drives instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct PinConfig {
    pub reset: Option<u32>,
    pub data_command: Option<u32>,
    pub backlight: Option<u32>,
    pub backlight_active_low: bool,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            reset: None,
            data_command: None,
            backlight: None,
            backlight_active_low: true,
        }
    }
}
