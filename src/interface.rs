//! Command/data framing over a write-only SPI link.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::error::Error;
use crate::instruction::Instruction;

/// SPI device plus the D/C line that tells the controller whether a byte
/// is a register address (low) or data (high).
pub struct SpiInterface<SPI, DC> {
    spi: SPI,
    dc: Option<DC>,
}

impl<SPI, DC> SpiInterface<SPI, DC> {
    pub fn new(spi: SPI, dc: Option<DC>) -> Self {
        Self { spi, dc }
    }

    /// Swap the D/C line, returning the one previously installed.
    pub fn replace_dc(&mut self, dc: Option<DC>) -> Option<DC> {
        core::mem::replace(&mut self.dc, dc)
    }

    pub fn release(self) -> (SPI, Option<DC>) {
        (self.spi, self.dc)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "SpiInterface",),
    async(feature = "async", keep_self)
)]
impl<SPI, DC, E> SpiInterface<SPI, DC>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
{
    /// Send one register address with D/C asserted "command".
    pub async fn write_register_address(&mut self, reg: u8) -> Result<(), Error<E>> {
        if let Some(dc) = self.dc.as_mut() {
            dc.set_low().map_err(Error::Pin)?;
        }
        self.spi.write(&[reg]).await.map_err(Error::Comm)
    }

    /// Send pixel or parameter bytes with D/C asserted "data".
    pub async fn write_data(&mut self, data: &[u8]) -> Result<(), Error<E>> {
        if let Some(dc) = self.dc.as_mut() {
            dc.set_high().map_err(Error::Pin)?;
        }
        self.spi.write(data).await.map_err(Error::Comm)
    }

    /// Write command with optional parameters
    pub async fn write_command(
        &mut self,
        cmd: Instruction,
        params: &[u8],
    ) -> Result<(), Error<E>> {
        self.write_register_address(cmd as u8).await?;
        if !params.is_empty() {
            self.write_data(params).await?;
        }
        Ok(())
    }

    /// Send a big-endian 16-bit data word.
    pub async fn write_data16(&mut self, value: u16) -> Result<(), Error<E>> {
        self.write_data(&value.to_be_bytes()).await
    }
}
