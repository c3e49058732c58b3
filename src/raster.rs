//! Drawing primitives on top of the scan window.
//!
//! Every primitive uses the current foreground color. Coordinates outside the
//! logical surface are clipped here; saturating out-of-range arguments is the
//! job of the front-end.

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
use crate::geometry::{
    ArcWalk, EllipseBounds, Line, MidpointCircle, MidpointEllipse, octants, quadrants,
};

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
    pub async fn draw_point(&mut self, x: u16, y: u16) -> Result<(), Error<E>> {
        self.plot(Point::new(x as i32, y as i32)).await
    }

    /// Single pixel; points off the surface are dropped.
    pub async fn plot(&mut self, p: Point) -> Result<(), Error<E>> {
        let (width, height) = self.size();
        if p.x < 0 || p.y < 0 || p.x >= width as i32 || p.y >= height as i32 {
            return Ok(());
        }
        let (x, y) = (p.x as u16, p.y as u16);
        self.set_window(x, y, x, y).await?;
        let bytes = color::panel_bytes(self.colors.foreground());
        self.iface.write_data(&bytes).await
    }

    /// Fill the rectangle spanned by two corners, in any order, with one
    /// window and a single data burst.
    pub async fn fill_rect(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<(), Error<E>> {
        let (width, height) = self.size();
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        if x1 >= width || y1 >= height {
            return Ok(());
        }
        let (x2, y2) = (x2.min(width - 1), y2.min(height - 1));

        log::debug!("st7735: fill ({x1}, {y1})..=({x2}, {y2})");
        self.set_window(x1, y1, x2, y2).await?;
        let cells = (x2 - x1 + 1) as usize * (y2 - y1 + 1) as usize;
        let bytes = color::panel_bytes(self.colors.foreground());
        for cell in self.buffer[..cells * 2].chunks_exact_mut(2) {
            cell.copy_from_slice(&bytes);
        }
        self.iface.write_data(&self.buffer[..cells * 2]).await
    }

    /// Fill with the background color. The foreground is left untouched,
    /// even when the bus fails midway.
    pub async fn clear_rect(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<(), Error<E>> {
        let background = self.colors.background();
        let foreground = self.colors.set_foreground(background);
        let result = self.fill_rect(x1, y1, x2, y2).await;
        self.colors.set_foreground(foreground);
        result
    }

    pub async fn clear(&mut self) -> Result<(), Error<E>> {
        let (width, height) = self.size();
        self.clear_rect(0, 0, width - 1, height - 1).await
    }

    /// Horizontal span from `x1` to `x2` on row `y`, clipped.
    async fn span(&mut self, x1: i32, x2: i32, y: i32) -> Result<(), Error<E>> {
        let (width, height) = self.size();
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        if y < 0 || y >= height as i32 || x2 < 0 || x1 >= width as i32 {
            return Ok(());
        }
        let x1 = x1.max(0) as u16;
        let x2 = x2.min(width as i32 - 1) as u16;
        self.fill_rect(x1, y as u16, x2, y as u16).await
    }

    pub async fn draw_line(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<(), Error<E>> {
        let line = Line::new(
            Point::new(x1 as i32, y1 as i32),
            Point::new(x2 as i32, y2 as i32),
        );
        if line.is_axis_aligned() {
            return self.fill_rect(x1, y1, x2, y2).await;
        }
        for p in line {
            self.plot(p).await?;
        }
        Ok(())
    }

    pub async fn draw_rect(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<(), Error<E>> {
        self.draw_line(x1, y1, x2, y1).await?;
        self.draw_line(x1, y1, x1, y2).await?;
        self.draw_line(x1, y2, x2, y2).await?;
        self.draw_line(x2, y1, x2, y2).await
    }

    /// Circle outline; radius 0 draws nothing.
    pub async fn draw_circle(&mut self, x0: u16, y0: u16, r: u16) -> Result<(), Error<E>> {
        if r == 0 {
            return Ok(());
        }
        let c = Point::new(x0 as i32, y0 as i32);
        let r = r as i32;
        for p in axis_points(c, r) {
            self.plot(p).await?;
        }
        if r == 1 {
            return Ok(());
        }
        for step in MidpointCircle::new(r) {
            for p in octants(step) {
                self.plot(c + p).await?;
            }
        }
        Ok(())
    }

    pub async fn fill_circle(&mut self, x0: u16, y0: u16, r: u16) -> Result<(), Error<E>> {
        if r == 0 {
            return Ok(());
        }
        let c = Point::new(x0 as i32, y0 as i32);
        let r = r as i32;
        for p in axis_points(c, r) {
            self.plot(p).await?;
        }
        self.span(c.x - r, c.x + r, c.y).await?;
        if r == 1 {
            return Ok(());
        }
        for step in MidpointCircle::new(r) {
            for p in octants(step) {
                self.plot(c + p).await?;
            }
            self.span(c.x - step.x, c.x + step.x, c.y + step.y).await?;
            self.span(c.x - step.x, c.x + step.x, c.y - step.y).await?;
            self.span(c.x - step.y, c.x + step.y, c.y + step.x).await?;
            self.span(c.x - step.y, c.x + step.y, c.y - step.x).await?;
        }
        Ok(())
    }

    /// Ellipse inscribed in the box given by its horizontal extremes `x0`, `x1`
    /// and vertical extremes `y0`, `y1`. A zero radius on either axis draws
    /// nothing.
    pub async fn draw_ellipse(&mut self, x0: u16, x1: u16, y0: u16, y1: u16) -> Result<(), Error<E>> {
        self.ellipse(x0, x1, y0, y1, false).await
    }

    pub async fn fill_ellipse(&mut self, x0: u16, x1: u16, y0: u16, y1: u16) -> Result<(), Error<E>> {
        self.ellipse(x0, x1, y0, y1, true).await
    }

    async fn ellipse(
        &mut self,
        x0: u16,
        x1: u16,
        y0: u16,
        y1: u16,
        fill: bool,
    ) -> Result<(), Error<E>> {
        let Some(bounds) =
            EllipseBounds::from_extremes(x0 as i32, x1 as i32, y0 as i32, y1 as i32)
        else {
            return Ok(());
        };
        let c = bounds.center;
        let ry = bounds.radius_y;

        self.plot(Point::new(c.x, c.y + ry)).await?;
        self.plot(Point::new(c.x, c.y - ry)).await?;
        for step in MidpointEllipse::new(bounds.radius_x, ry) {
            let offset = step.offset;
            for p in quadrants(offset) {
                self.plot(c + p).await?;
            }
            if fill && step.new_row {
                self.span(c.x - offset.x, c.x + offset.x, c.y + offset.y).await?;
                self.span(c.x - offset.x, c.x + offset.x, c.y - offset.y).await?;
            }
        }
        Ok(())
    }

    /// Arc of radius `r` from `start` sweeping clockwise-negative to `end`,
    /// angles in degrees with 0° pointing right and 90° pointing down.
    /// Equal angles or angles of 360 and above draw nothing.
    pub async fn draw_arc(&mut self, x0: u16, y0: u16, r: u16, start: u16, end: u16) -> Result<(), Error<E>> {
        let Some(walk) = ArcWalk::new(r as i32, start, end) else {
            log::debug!("st7735: arc {start}..{end} r={r} skipped");
            return Ok(());
        };
        let c = Point::new(x0 as i32, y0 as i32);
        for p in walk {
            self.plot(c + p).await?;
        }
        Ok(())
    }
}

fn axis_points(c: Point, r: i32) -> [Point; 4] {
    [
        Point::new(c.x + r, c.y),
        Point::new(c.x - r, c.y),
        Point::new(c.x, c.y + r),
        Point::new(c.x, c.y - r),
    ]
}
