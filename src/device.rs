//! Serialized front-end: single-opener sessions, GPIO ownership and the
//! drawing command set.
//!
//! A [`Device`] owns the driver behind a mutex. [`Device::open`] acquires the
//! control lines, brings the panel up and hands out the only [`Session`];
//! every command then runs under the mutex with its coordinates saturated to
//! the panel.

use core::convert::Infallible;
use core::fmt::Debug;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::Timer;
use crate::color;
use crate::config::{BITS_PER_PIXEL, Config, PinConfig};
use crate::display::{Pins, St7735};
use crate::error::{Error, Line};
use crate::font::{FontDescriptor, FontRegistry};

/// Source of the output lines the driver drives while open.
pub trait GpioController {
    type Pin: OutputPin<Error = Infallible>;
    type Error: Debug;

    /// Claim `line` as an output at the given initial level.
    fn request_output(
        &mut self,
        line: u32,
        label: &'static str,
        high: bool,
    ) -> Result<Self::Pin, Self::Error>;

    fn free(&mut self, line: u32, pin: Self::Pin);
}

/// Two corners in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corners {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Corners {
    pub fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn clamp(self, width: u16, height: u16) -> Self {
        Self {
            x1: self.x1.min(width - 1),
            y1: self.y1.min(height - 1),
            x2: self.x2.min(width - 1),
            y2: self.y2.min(height - 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Init,
    SetForegroundColor(u16),
    SetBackgroundColor(u16),
    Clear,
    LcdInfo,
    DrawPoint { x: u16, y: u16 },
    DrawLine(Corners),
    DrawRectangle(Corners),
    FillRectangle(Corners),
    ClearRectangle(Corners),
    DrawCircle { x: u16, y: u16, r: u16 },
    FillCircle { x: u16, y: u16, r: u16 },
    DrawEllipse { x0: u16, x1: u16, y0: u16, y1: u16 },
    FillEllipse { x0: u16, x1: u16, y0: u16, y1: u16 },
    DrawArc { x: u16, y: u16, r: u16, start: u16, end: u16 },
    /// Text up to the first NUL, drawn with the active font.
    ShowString { x: u16, y: u16, text: &'a [u8] },
    SetFont(&'a str),
    /// Packed font descriptor, see [`FontDescriptor`].
    AddFont(&'a [u8]),
    /// Stream the staging buffer, uploaded with [`Session::write_staging`].
    DrawBitmap { x: u16, y: u16, width: u16, height: u16 },
    BacklightOn,
    BacklightOff,
    DisplayOn,
    DisplayOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcdInfo {
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Done,
    Info(LcdInfo),
}

struct Inner<'b, SPI, G, TIMER>
where
    SPI: SpiDevice,
    G: GpioController,
    TIMER: Timer,
{
    display: St7735<'b, SPI, G::Pin, TIMER>,
    gpio: G,
    pins: PinConfig,
    fonts: FontRegistry,
    open: bool,
}

impl<'b, SPI, G, TIMER> Inner<'b, SPI, G, TIMER>
where
    SPI: SpiDevice,
    G: GpioController,
    TIMER: Timer,
{
    /// Request every configured line; on failure the lines already claimed
    /// are freed again.
    fn acquire_pins(&mut self) -> Result<Pins<G::Pin>, Line> {
        let mut pins = Pins {
            backlight_active_low: self.pins.backlight_active_low,
            ..Pins::none()
        };
        let requests = [
            (Line::Reset, self.pins.reset, false),
            (Line::DataCommand, self.pins.data_command, false),
            // backlight starts off
            (Line::Backlight, self.pins.backlight, self.pins.backlight_active_low),
        ];
        for (line, number, high) in requests {
            let Some(number) = number else {
                continue;
            };
            match self.gpio.request_output(number, line.label(), high) {
                Ok(pin) => *slot(&mut pins, line) = Some(pin),
                Err(e) => {
                    log::warn!("st7735: gpio {number} ({}) unavailable: {e:?}", line.label());
                    self.free_pins(pins);
                    return Err(line);
                }
            }
        }
        Ok(pins)
    }

    fn free_pins(&mut self, mut pins: Pins<G::Pin>) {
        for (line, number) in [
            (Line::Reset, self.pins.reset),
            (Line::DataCommand, self.pins.data_command),
            (Line::Backlight, self.pins.backlight),
        ] {
            if let (Some(number), Some(pin)) = (number, slot(&mut pins, line).take()) {
                self.gpio.free(number, pin);
            }
        }
    }

    fn release_pins(&mut self) {
        let pins = self.display.detach_pins();
        self.free_pins(pins);
    }

    fn shut_down(&mut self) {
        self.fonts.clear();
        // Pin writes cannot fail
        self.display.hold_reset().ok();
        self.display.set_backlight(false).ok();
        self.release_pins();
        self.open = false;
        log::info!("st7735: closed");
    }
}

fn slot<PIN>(pins: &mut Pins<PIN>, line: Line) -> &mut Option<PIN> {
    match line {
        Line::Reset => &mut pins.reset,
        Line::DataCommand => &mut pins.data_command,
        Line::Backlight => &mut pins.backlight,
    }
}

pub struct Device<'b, M, SPI, G, TIMER>
where
    M: RawMutex,
    SPI: SpiDevice,
    G: GpioController,
    TIMER: Timer,
{
    inner: Mutex<M, Inner<'b, SPI, G, TIMER>>,
}

impl<'b, M, SPI, G, TIMER> Device<'b, M, SPI, G, TIMER>
where
    M: RawMutex,
    SPI: SpiDevice,
    G: GpioController,
    TIMER: Timer,
{
    #[cfg(feature = "async")]
    async fn lock(&self) -> MutexGuard<'_, M, Inner<'b, SPI, G, TIMER>> {
        self.inner.lock().await
    }

    #[cfg(not(feature = "async"))]
    fn lock(&self) -> MutexGuard<'_, M, Inner<'b, SPI, G, TIMER>> {
        loop {
            if let Ok(guard) = self.inner.try_lock() {
                return guard;
            }
            core::hint::spin_loop();
        }
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Device",),
    async(feature = "async", keep_self)
)]
impl<'b, M, SPI, G, E, TIMER> Device<'b, M, SPI, G, TIMER>
where
    M: RawMutex,
    SPI: SpiDevice<Error = E>,
    G: GpioController,
    TIMER: Timer,
{
    /// Attach the driver. `buffer` becomes the staging buffer and must hold
    /// a full frame.
    pub fn new(
        config: Config,
        pins: PinConfig,
        spi: SPI,
        gpio: G,
        buffer: &'b mut [u8],
    ) -> Result<Self, Error<E>> {
        let display = St7735::new(config, spi, Pins::none(), buffer)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                display,
                gpio,
                pins,
                fonts: FontRegistry::new(),
                open: false,
            }),
        })
    }

    /// Start the only session. Fails with [`Error::Busy`] while another
    /// session is open; any other failure leaves no line claimed.
    pub async fn open(&self) -> Result<Session<'_, 'b, M, SPI, G, TIMER>, Error<E>> {
        let mut inner = self.lock().await;
        if inner.open {
            return Err(Error::Busy);
        }
        let pins = inner.acquire_pins().map_err(Error::Gpio)?;
        inner.display.attach_pins(pins);

        let colors = inner.display.colors_mut();
        colors.set_background(color::YELLOW);
        colors.set_foreground(color::BLACK);

        if let Err(e) = Self::bring_up(&mut inner.display).await {
            inner.release_pins();
            return Err(e);
        }
        inner.open = true;
        log::info!("st7735: opened");
        Ok(Session {
            device: self,
            closed: false,
        })
    }

    async fn bring_up(display: &mut St7735<'b, SPI, G::Pin, TIMER>) -> Result<(), Error<E>> {
        display.init().await?;
        display.clear().await?;
        display.set_backlight(true)
    }

    pub async fn is_open(&self) -> bool {
        self.lock().await.open
    }
}

/// Exclusive handle on an open [`Device`].
///
/// Dropping a session without [`Session::close`] closes it too, unless the
/// device is locked at that moment.
pub struct Session<'d, 'b, M, SPI, G, TIMER>
where
    M: RawMutex,
    SPI: SpiDevice,
    G: GpioController,
    TIMER: Timer,
{
    device: &'d Device<'b, M, SPI, G, TIMER>,
    closed: bool,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Session",),
    async(feature = "async", keep_self)
)]
impl<'d, 'b, M, SPI, G, E, TIMER> Session<'d, 'b, M, SPI, G, TIMER>
where
    M: RawMutex,
    SPI: SpiDevice<Error = E>,
    G: GpioController,
    TIMER: Timer,
{
    pub async fn ioctl(&self, command: Command<'_>) -> Result<Reply, Error<E>> {
        let mut guard = self.device.lock().await;
        let inner = &mut *guard;
        let lcd = &mut inner.display;
        let (width, height) = lcd.size();
        let cx = |x: u16| x.min(width - 1);
        let cy = |y: u16| y.min(height - 1);

        match command {
            Command::Init => lcd.init().await?,
            Command::SetForegroundColor(raw) => {
                lcd.colors_mut().set_foreground(color::from_raw(raw));
            }
            Command::SetBackgroundColor(raw) => {
                lcd.colors_mut().set_background(color::from_raw(raw));
            }
            Command::Clear => lcd.clear().await?,
            Command::LcdInfo => {
                return Ok(Reply::Info(LcdInfo {
                    width,
                    height,
                    bits_per_pixel: BITS_PER_PIXEL,
                }));
            }
            Command::DrawPoint { x, y } => lcd.draw_point(cx(x), cy(y)).await?,
            Command::DrawLine(c) => {
                let c = c.clamp(width, height);
                lcd.draw_line(c.x1, c.y1, c.x2, c.y2).await?
            }
            Command::DrawRectangle(c) => {
                let c = c.clamp(width, height);
                lcd.draw_rect(c.x1, c.y1, c.x2, c.y2).await?
            }
            Command::FillRectangle(c) => {
                let c = c.clamp(width, height);
                lcd.fill_rect(c.x1, c.y1, c.x2, c.y2).await?
            }
            Command::ClearRectangle(c) => {
                let c = c.clamp(width, height);
                lcd.clear_rect(c.x1, c.y1, c.x2, c.y2).await?
            }
            Command::DrawCircle { x, y, r } => lcd.draw_circle(cx(x), cy(y), r).await?,
            Command::FillCircle { x, y, r } => lcd.fill_circle(cx(x), cy(y), r).await?,
            Command::DrawEllipse { x0, x1, y0, y1 } => {
                lcd.draw_ellipse(cx(x0), cx(x1), cy(y0), cy(y1)).await?
            }
            Command::FillEllipse { x0, x1, y0, y1 } => {
                lcd.fill_ellipse(cx(x0), cx(x1), cy(y0), cy(y1)).await?
            }
            Command::DrawArc { x, y, r, start, end } => {
                lcd.draw_arc(cx(x), cy(y), r, start, end).await?
            }
            Command::ShowString { x, y, text } => {
                let font = inner.fonts.active();
                inner.display.show_string(font, cx(x), cy(y), text).await?
            }
            Command::SetFont(name) => inner.fonts.select(name).map_err(Error::widen)?,
            Command::AddFont(packed) => {
                let font = FontDescriptor::parse(packed)
                    .and_then(|desc| desc.to_font())
                    .map_err(Error::widen)?;
                inner.fonts.add(font).map_err(Error::widen)?
            }
            Command::DrawBitmap {
                x,
                y,
                width: w,
                height: h,
            } => lcd.draw_bitmap(cx(x), cy(y), w, h).await?,
            Command::BacklightOn => lcd.set_backlight(true)?,
            Command::BacklightOff => lcd.set_backlight(false)?,
            Command::DisplayOn => lcd.display_on().await?,
            Command::DisplayOff => lcd.display_off().await?,
        }
        Ok(Reply::Done)
    }

    /// Upload pixel data for a following [`Command::DrawBitmap`].
    pub async fn write_staging(&self, offset: usize, data: &[u8]) -> Result<(), Error<E>> {
        self.device.lock().await.display.write_staging(offset, data)
    }

    /// Free all fonts, hold the panel in reset, switch the backlight off and
    /// release the control lines.
    pub async fn close(mut self) {
        self.device.lock().await.shut_down();
        self.closed = true;
    }
}

impl<M, SPI, G, TIMER> Drop for Session<'_, '_, M, SPI, G, TIMER>
where
    M: RawMutex,
    SPI: SpiDevice,
    G: GpioController,
    TIMER: Timer,
{
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        match self.device.inner.try_lock() {
            Ok(mut inner) => inner.shut_down(),
            Err(_) => log::warn!("st7735: session dropped while device locked"),
        }
    }
}
