//! Text and bitmap blitting.

use core::convert::Infallible;

use embedded_graphics_core::geometry::Point;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::Timer;
use crate::color;
use crate::display::St7735;
use crate::error::Error;
use crate::font::Font;

/// How a glyph treats its unset pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphMode {
    /// Paint the whole cell, unset pixels in the background color.
    #[default]
    Opaque,
    /// Plot set pixels only, leaving the rest of the cell untouched.
    Overlay,
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
    /// Draw one character cell with its top-left corner at `(x, y)`.
    ///
    /// A cell that does not fit entirely on the surface is skipped.
    pub async fn show_char(
        &mut self,
        font: &Font,
        x: u16,
        y: u16,
        code: u8,
        mode: GlyphMode,
    ) -> Result<(), Error<E>> {
        let (width, height) = self.size();
        let (w, h) = (font.width() as u16, font.height() as u16);
        if w > width || h > height || x > width - w || y > height - h {
            return Ok(());
        }
        let glyph = font.glyph(code);

        if mode == GlyphMode::Overlay {
            for row in 0..h {
                for col in 0..w {
                    if font.pixel(glyph, col, row) {
                        self.plot(Point::new((x + col) as i32, (y + row) as i32))
                            .await?;
                    }
                }
            }
            return Ok(());
        }

        let fg = color::panel_bytes(self.colors.foreground());
        let bg = color::panel_bytes(self.colors.background());
        for row in 0..h {
            for col in 0..w {
                let i = self.stage_index(col, row, w, h) * 2;
                let bytes = if font.pixel(glyph, col, row) { &fg } else { &bg };
                self.buffer[i..i + 2].copy_from_slice(bytes);
            }
        }
        self.set_window(x, y, x + w - 1, y + h - 1).await?;
        let len = w as usize * h as usize * 2;
        self.iface.write_data(&self.buffer[..len]).await
    }

    /// Draw `text` left to right starting at `(x, y)`, stopping at the first
    /// NUL. Wraps to the next line when a cell would cross the right edge and
    /// back to the origin when a line would cross the bottom.
    pub async fn show_string(
        &mut self,
        font: Option<&Font>,
        mut x: u16,
        mut y: u16,
        text: &[u8],
    ) -> Result<(), Error<E>> {
        let Some(font) = font else {
            log::warn!("st7735: no font selected");
            return Ok(());
        };
        let (width, height) = self.size();
        let (w, h) = (font.width() as u16, font.height() as u16);
        if w > width || h > height {
            return Ok(());
        }

        for &code in text.iter().take_while(|&&c| c != 0) {
            if x > width - w {
                x = 0;
                y = y.saturating_add(h);
            }
            if y > height - h {
                x = 0;
                y = 0;
            }
            self.show_char(font, x, y, code, GlyphMode::Opaque).await?;
            x += w;
        }
        Ok(())
    }

    /// Stream a `width`×`height` bitmap from the staging buffer to `(x, y)`.
    ///
    /// Pixels are read row by row, `width` cells per row, in controller scan
    /// order. An origin past an edge wraps to 0 on that axis; the part past
    /// the right or bottom edge is cut off.
    pub async fn draw_bitmap(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Error<E>> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let (sw, sh) = self.size();
        let x = if x >= sw { 0 } else { x };
        let y = if y >= sh { 0 } else { y };
        let end_x = (x as u32 + width as u32).min(sw as u32) as u16;
        let end_y = (y as u32 + height as u32).min(sh as u32) as u16;
        let (cols, rows) = (end_x - x, end_y - y);

        let stride = width as usize * 2;
        let last = (rows as usize - 1) * stride + cols as usize * 2;
        if last > self.buffer.len() {
            return Err(Error::OutOfRange);
        }

        log::debug!("st7735: bitmap {cols}x{rows} at ({x}, {y})");
        self.set_window(x, y, end_x - 1, end_y - 1).await?;
        if cols == width {
            return self.iface.write_data(&self.buffer[..last]).await;
        }
        for row in 0..rows as usize {
            let start = row * stride;
            self.iface
                .write_data(&self.buffer[start..start + cols as usize * 2])
                .await?;
        }
        Ok(())
    }

    /// Copy `data` into the staging buffer at `offset`.
    pub fn write_staging(&mut self, offset: usize, data: &[u8]) -> Result<(), Error<E>> {
        let end = offset.checked_add(data.len()).ok_or(Error::OutOfRange)?;
        let target = self.buffer.get_mut(offset..end).ok_or(Error::OutOfRange)?;
        target.copy_from_slice(data);
        Ok(())
    }
}
