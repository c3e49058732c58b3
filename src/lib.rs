//! Driver for ST7735 SPI TFT panels.
//!
//! [`St7735`] owns the bus, the control lines and a caller-supplied staging
//! buffer, and implements the panel bring-up, scan-window addressing and the
//! drawing primitives (points, rectangles, lines, circles, ellipses, arcs,
//! text and bitmaps). [`Device`] puts the driver behind a mutex and exposes
//! it as single-opener [`Session`]s taking [`Command`]s.
//!
//! Every bus-touching operation is `async` with the default `async` feature
//! and blocking without it.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod color;
pub mod config;
pub mod device;
pub mod display;
pub mod error;
pub mod font;
pub mod geometry;
pub mod glyph;
pub mod instruction;
pub mod interface;
mod raster;

#[cfg(all(test, feature = "async"))]
mod mock;

pub use config::{Config, Orientation, PinConfig, Rotation};
pub use device::{Command, Corners, Device, GpioController, LcdInfo, Reply, Session};
pub use display::{Pins, St7735};
pub use error::{Error, Line};
pub use font::{BitOrder, Font, FontDescriptor, FontRegistry};
pub use glyph::GlyphMode;
pub use instruction::Instruction;

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Timer",),
    async(feature = "async", keep_self)
)]
/// Delay source for the reset pulse and the sleep-out settle time.
pub trait Timer {
    /// Delay for the specified number of milliseconds.
    async fn delay_ms(milliseconds: u64);
}

/// [`Timer`] backed by the embassy time driver.
#[cfg(all(feature = "embassy-time", feature = "async"))]
pub struct EmbassyTimer;

#[cfg(all(feature = "embassy-time", feature = "async"))]
impl Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}
