//! Panel bring-up and scan-window addressing.

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::Timer;
use crate::color::ColorState;
use crate::config::{Config, Orientation, Rotation};
use crate::error::Error;
use crate::instruction::Instruction;
use crate::interface::SpiInterface;

/// Control lines owned by the driver while a session is open.
pub struct Pins<PIN> {
    pub reset: Option<PIN>,
    pub data_command: Option<PIN>,
    pub backlight: Option<PIN>,
    pub backlight_active_low: bool,
}

impl<PIN> Pins<PIN> {
    pub fn none() -> Self {
        Self {
            reset: None,
            data_command: None,
            backlight: None,
            backlight_active_low: true,
        }
    }
}

pub struct St7735<'b, SPI, PIN, TIMER>
where
    SPI: SpiDevice,
    PIN: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    pub(crate) iface: SpiInterface<SPI, PIN>,
    rst: Option<PIN>,
    backlight: Option<PIN>,
    backlight_active_low: bool,
    config: Config,
    /// Staging buffer, one big-endian 16-bit cell per pixel.
    pub(crate) buffer: &'b mut [u8],
    pub(crate) colors: ColorState,
    _timer: PhantomData<TIMER>,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "St7735",),
    async(feature = "async", keep_self)
)]
impl<'b, SPI, PIN, E, TIMER> St7735<'b, SPI, PIN, TIMER>
where
    SPI: SpiDevice<Error = E>,
    PIN: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    /// Fails with [`Error::InvalidConfig`] for a zero-sized panel and with
    /// [`Error::BufferTooSmall`] unless `buffer` holds a full frame.
    pub fn new(
        config: Config,
        spi: SPI,
        pins: Pins<PIN>,
        buffer: &'b mut [u8],
    ) -> Result<Self, Error<E>> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::InvalidConfig);
        }
        if buffer.len() < config.frame_bytes() {
            return Err(Error::BufferTooSmall);
        }
        Ok(Self {
            iface: SpiInterface::new(spi, pins.data_command),
            rst: pins.reset,
            backlight: pins.backlight,
            backlight_active_low: pins.backlight_active_low,
            config,
            buffer,
            colors: ColorState::default(),
            _timer: PhantomData,
        })
    }

    /// Install control lines, returning the ones previously held.
    pub fn attach_pins(&mut self, pins: Pins<PIN>) -> Pins<PIN> {
        let previous = Pins {
            reset: core::mem::replace(&mut self.rst, pins.reset),
            data_command: self.iface.replace_dc(pins.data_command),
            backlight: core::mem::replace(&mut self.backlight, pins.backlight),
            backlight_active_low: self.backlight_active_low,
        };
        self.backlight_active_low = pins.backlight_active_low;
        previous
    }

    pub fn detach_pins(&mut self) -> Pins<PIN> {
        self.attach_pins(Pins::none())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Logical drawing surface, after software rotation.
    pub fn size(&self) -> (u16, u16) {
        self.config.logical_size()
    }

    pub fn colors(&self) -> &ColorState {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut ColorState {
        &mut self.colors
    }

    pub fn staging(&self) -> &[u8] {
        &*self.buffer
    }

    pub fn staging_mut(&mut self) -> &mut [u8] {
        &mut *self.buffer
    }

    pub async fn init(&mut self) -> Result<(), Error<E>> {
        log::info!(
            "st7735: init {}x{} rotation {}",
            self.config.width,
            self.config.height,
            self.config.rotation.degrees()
        );
        self.reset().await?;

        self.iface.write_command(Instruction::SleepOut, &[]).await?;
        // Panel shows garbage if the next command arrives sooner
        TIMER::delay_ms(120).await;

        // Frame rate
        self.iface
            .write_command(Instruction::FrameRateControl1, &[0x05, 0x3C, 0x3C])
            .await?;
        self.iface
            .write_command(Instruction::FrameRateControl2, &[0x05, 0x3C, 0x3C])
            .await?;
        self.iface
            .write_command(
                Instruction::FrameRateControl3,
                &[0x05, 0x3C, 0x3C, 0x05, 0x3C, 0x3C],
            )
            .await?;
        self.iface
            .write_command(Instruction::InversionControl, &[0x03])
            .await?; // dot inversion

        // Power sequence
        self.iface
            .write_command(Instruction::PowerControl1, &[0x28, 0x08, 0x04])
            .await?;
        self.iface
            .write_command(Instruction::PowerControl2, &[0xC0])
            .await?;
        self.iface
            .write_command(Instruction::PowerControl3, &[0x0D, 0x00])
            .await?;
        self.iface
            .write_command(Instruction::PowerControl4, &[0x8D, 0x2A])
            .await?;
        self.iface
            .write_command(Instruction::PowerControl5, &[0x8D, 0xEE])
            .await?;
        self.iface
            .write_command(Instruction::VcomControl, &[0x1A])
            .await?;

        self.set_orientation(self.config.orientation).await?;

        // Gamma sequence
        self.iface
            .write_command(
                Instruction::PositiveGamma,
                &[
                    0x04, 0x22, 0x07, 0x0A, 0x2E, 0x30, 0x25, 0x2A, 0x28, 0x26, 0x2E, 0x3A, 0x00,
                    0x01, 0x03, 0x13,
                ],
            )
            .await?;
        self.iface
            .write_command(
                Instruction::NegativeGamma,
                &[
                    0x04, 0x16, 0x06, 0x0D, 0x2D, 0x26, 0x23, 0x27, 0x27, 0x25, 0x2D, 0x3B, 0x00,
                    0x01, 0x04, 0x13,
                ],
            )
            .await?;

        self.iface
            .write_command(Instruction::PixelFormatSet, &[0x55])
            .await?; // 65k colors
        self.display_on().await
    }

    /// Pulse the reset line; a missing line skips the pulse.
    pub async fn reset(&mut self) -> Result<(), Error<E>> {
        let Some(rst) = self.rst.as_mut() else {
            return Ok(());
        };
        rst.set_high().map_err(Error::Pin)?;
        TIMER::delay_ms(5).await;
        rst.set_low().map_err(Error::Pin)?;
        TIMER::delay_ms(5).await;
        rst.set_high().map_err(Error::Pin)?;
        TIMER::delay_ms(5).await;
        Ok(())
    }

    /// Drive reset low and leave it there.
    pub fn hold_reset(&mut self) -> Result<(), Error<E>> {
        if let Some(rst) = self.rst.as_mut() {
            rst.set_low().map_err(Error::Pin)?;
        }
        Ok(())
    }

    pub async fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Error<E>> {
        self.config.orientation = orientation;
        let madctl = self.config.madctl();
        self.iface
            .write_command(Instruction::MemoryAccessControl, &[madctl])
            .await
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.config.rotation = rotation;
    }

    pub async fn display_on(&mut self) -> Result<(), Error<E>> {
        self.iface.write_command(Instruction::DisplayOn, &[]).await
    }

    pub async fn display_off(&mut self) -> Result<(), Error<E>> {
        self.iface.write_command(Instruction::DisplayOff, &[]).await
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), Error<E>> {
        let high = on != self.backlight_active_low;
        if let Some(backlight) = self.backlight.as_mut() {
            if high {
                backlight.set_high().map_err(Error::Pin)?;
            } else {
                backlight.set_low().map_err(Error::Pin)?;
            }
        }
        Ok(())
    }

    /// Program the scan window `(x1, y1)..=(x2, y2)` in logical coordinates
    /// and start a memory write. Expects `x1 <= x2` and `y1 <= y2`.
    pub async fn set_window(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<(), Error<E>> {
        let (px1, py1) = self.to_physical(x1, y1);
        let (px2, py2) = self.to_physical(x2, y2);

        let sx = px1.min(px2) + self.config.dx;
        let ex = px1.max(px2) + self.config.dx;
        let sy = py1.min(py2) + self.config.dy;
        let ey = py1.max(py2) + self.config.dy;

        self.iface
            .write_command(
                Instruction::ColumnAddressSet,
                &[
                    (sx >> 8) as u8,
                    (sx & 0xFF) as u8,
                    (ex >> 8) as u8,
                    (ex & 0xFF) as u8,
                ],
            )
            .await?;
        self.iface
            .write_command(
                Instruction::RowAddressSet,
                &[
                    (sy >> 8) as u8,
                    (sy & 0xFF) as u8,
                    (ey >> 8) as u8,
                    (ey & 0xFF) as u8,
                ],
            )
            .await?;
        self.iface.write_command(Instruction::MemoryWrite, &[]).await
    }

    /// Transform logical coordinates to the controller's column/row.
    fn to_physical(&self, x: u16, y: u16) -> (u16, u16) {
        let (w, h) = (self.config.width, self.config.height);
        match self.config.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (w - 1 - y, x),
            Rotation::Deg180 => (w - 1 - x, h - 1 - y),
            Rotation::Deg270 => (y, h - 1 - x),
        }
    }

    /// Position of logical cell `(dx, dy)` of a `w`×`h` window in the order
    /// the controller scans it.
    pub(crate) fn stage_index(&self, dx: u16, dy: u16, w: u16, h: u16) -> usize {
        let (dx, dy, w, h) = (dx as usize, dy as usize, w as usize, h as usize);
        match self.config.rotation {
            Rotation::Deg0 => dy * w + dx,
            Rotation::Deg90 => dx * h + (h - 1 - dy),
            Rotation::Deg180 => (h - 1 - dy) * w + (w - 1 - dx),
            Rotation::Deg270 => (w - 1 - dx) * h + dy,
        }
    }
}
