/// ST7735S command set used by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Sleep Out (11h) - Exit low-power mode, needs 120ms before the next command
    SleepOut = 0x11,

    /// Display Off (28h) - Disable panel output
    DisplayOff = 0x28,
    /// Display On (29h) - Enable panel output
    DisplayOn = 0x29,
    /// Column Address Set (2Ah) - Horizontal addressing bounds
    ColumnAddressSet = 0x2A,
    /// Row Address Set (2Bh) - Vertical addressing bounds
    RowAddressSet = 0x2B,
    /// Memory Write (2Ch) - Begin pixel stream into the scan window
    MemoryWrite = 0x2C,

    /// Memory Access Control (36h) - GRAM orientation/order
    MemoryAccessControl = 0x36,
    /// Interface Pixel Format (3Ah) - Color depth configuration
    PixelFormatSet = 0x3A,

    /// Frame Rate Control, normal mode (B1h)
    FrameRateControl1 = 0xB1,
    /// Frame Rate Control, idle mode (B2h)
    FrameRateControl2 = 0xB2,
    /// Frame Rate Control, partial mode (B3h)
    FrameRateControl3 = 0xB3,
    /// Display Inversion Control (B4h)
    InversionControl = 0xB4,

    /// Power Control 1 (C0h)
    PowerControl1 = 0xC0,
    /// Power Control 2 (C1h)
    PowerControl2 = 0xC1,
    /// Power Control 3 (C2h) - normal mode
    PowerControl3 = 0xC2,
    /// Power Control 4 (C3h) - idle mode
    PowerControl4 = 0xC3,
    /// Power Control 5 (C4h) - partial mode
    PowerControl5 = 0xC4,
    /// VCOM Control (C5h)
    VcomControl = 0xC5,

    /// Positive Gamma Correction (E0h)
    PositiveGamma = 0xE0,
    /// Negative Gamma Correction (E1h)
    NegativeGamma = 0xE1,
}
