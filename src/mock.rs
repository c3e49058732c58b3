//! Test doubles: a recording SPI bus, a panel emulator that decodes what was
//! sent, a fake GPIO controller and a delay recorder.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::future::Future;
use std::rc::Rc;

use embedded_graphics_core::pixelcolor::{Rgb565, raw::RawU16};
use embedded_graphics_core::prelude::RawData;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::{ErrorKind, ErrorType, Operation};

use crate::Timer;
use crate::color;
use crate::device::GpioController;

pub fn run<F: Future>(future: F) -> F::Output {
    embassy_futures::block_on(future)
}

thread_local! {
    static DELAYS: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Delays requested on this thread so far.
pub fn delays() -> Vec<u64> {
    DELAYS.with(|d| d.borrow().clone())
}

/// Returns immediately and records the requested delay.
pub struct NoDelay;

impl Timer for NoDelay {
    async fn delay_ms(milliseconds: u64) {
        DELAYS.with(|d| d.borrow_mut().push(milliseconds));
    }
}

/// Output pin that remembers every level it was driven to.
#[derive(Debug, Clone, Default)]
pub struct MockPin(Rc<RefCell<Vec<bool>>>);

impl MockPin {
    fn drive(&self, high: bool) {
        self.0.borrow_mut().push(high);
    }

    pub fn history(&self) -> Vec<bool> {
        self.0.borrow().clone()
    }

    pub fn level(&self) -> Option<bool> {
        self.0.borrow().last().copied()
    }
}

impl PinErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}

/// One SPI write as the controller sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Command(u8),
    Data(Vec<u8>),
}

#[derive(Default)]
struct BusState {
    dc: MockPin,
    frames: Vec<Frame>,
    writes: usize,
    fail_after: Option<usize>,
}

/// Shared recording of everything written over the bus, framed by the D/C
/// pin handed out by [`MockBus::dc`].
#[derive(Clone, Default)]
pub struct MockBus(Rc<RefCell<BusState>>);

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spi(&self) -> MockSpi {
        MockSpi { bus: self.clone() }
    }

    pub fn dc(&self) -> MockPin {
        self.0.borrow().dc.clone()
    }

    /// A pin unrelated to the bus.
    pub fn pin(&self) -> MockPin {
        MockPin::default()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.0.borrow().frames.clone()
    }

    pub fn take_frames(&self) -> Vec<Frame> {
        core::mem::take(&mut self.0.borrow_mut().frames)
    }

    /// Let `writes` more writes through, then fail every write.
    pub fn fail_after(&self, writes: usize) {
        let mut state = self.0.borrow_mut();
        state.fail_after = Some(state.writes + writes);
    }

    fn record(&self, bytes: &[u8]) -> Result<(), ErrorKind> {
        let mut state = self.0.borrow_mut();
        if state.fail_after.is_some_and(|limit| state.writes >= limit) {
            return Err(ErrorKind::Other);
        }
        state.writes += 1;
        if state.dc.level() == Some(true) {
            state.frames.push(Frame::Data(bytes.to_vec()));
        } else {
            let commands: Vec<Frame> = bytes.iter().map(|&b| Frame::Command(b)).collect();
            state.frames.extend(commands);
        }
        Ok(())
    }
}

pub struct MockSpi {
    bus: MockBus,
}

impl ErrorType for MockSpi {
    type Error = ErrorKind;
}

impl embedded_hal_async::spi::SpiDevice for MockSpi {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
        for operation in operations {
            if let Operation::Write(bytes) = operation {
                self.bus.record(bytes)?;
            }
        }
        Ok(())
    }
}

/// Scan window programmed before a memory write, in controller coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

/// Pixel grid rebuilt from the recorded CASET/RASET/RAMWR traffic.
pub struct Panel {
    width: u16,
    height: u16,
    grid: Vec<Option<u16>>,
    pub windows: Vec<Window>,
    /// Pixels streamed after memory writes, including ones off the grid.
    pub written: usize,
    /// Every command with its parameters; memory write data is not kept.
    pub commands: Vec<(u8, Vec<u8>)>,
}

fn range(params: &[u8]) -> Option<(u16, u16)> {
    match params {
        [a, b, c, d, ..] => Some((u16::from_be_bytes([*a, *b]), u16::from_be_bytes([*c, *d]))),
        _ => None,
    }
}

impl Panel {
    pub fn replay(frames: &[Frame], width: u16, height: u16) -> Self {
        let mut panel = Self {
            width,
            height,
            grid: vec![None; width as usize * height as usize],
            windows: Vec::new(),
            written: 0,
            commands: Vec::new(),
        };
        let (mut cols, mut rows) = ((0, 0), (0, 0));
        let mut cursor: Option<(Window, usize)> = None;
        let mut half: Option<u8> = None;

        for frame in frames {
            match frame {
                Frame::Command(cmd) => {
                    panel.commands.push((*cmd, Vec::new()));
                    half = None;
                    cursor = None;
                    if *cmd == 0x2C {
                        let window = Window {
                            x1: cols.0,
                            y1: rows.0,
                            x2: cols.1,
                            y2: rows.1,
                        };
                        panel.windows.push(window);
                        cursor = Some((window, 0));
                    }
                }
                Frame::Data(bytes) => {
                    if let Some((window, pos)) = cursor.as_mut() {
                        for &byte in bytes {
                            match half.take() {
                                None => half = Some(byte),
                                Some(high) => {
                                    panel.put(window, *pos, u16::from_be_bytes([high, byte]));
                                    *pos += 1;
                                }
                            }
                        }
                        continue;
                    }
                    let Some((cmd, params)) = panel.commands.last_mut() else {
                        continue;
                    };
                    params.extend_from_slice(bytes);
                    match *cmd {
                        0x2A => cols = range(params).unwrap_or(cols),
                        0x2B => rows = range(params).unwrap_or(rows),
                        _ => {}
                    }
                }
            }
        }
        panel
    }

    fn put(&mut self, window: &Window, pos: usize, value: u16) {
        self.written += 1;
        let w = (window.x2 - window.x1 + 1) as usize;
        let x = window.x1 as usize + pos % w;
        let y = window.y1 as usize + pos / w;
        if x < self.width as usize && y < self.height as usize {
            self.grid[y * self.width as usize + x] = Some(value);
        }
    }

    /// Parameters of the last `cmd` sent.
    pub fn params(&self, cmd: u8) -> Option<&[u8]> {
        self.commands
            .iter()
            .rev()
            .find(|(c, _)| *c == cmd)
            .map(|(_, p)| p.as_slice())
    }

    pub fn raw(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.grid[y as usize * self.width as usize + x as usize]
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        self.raw(x, y).map(color::from_raw)
    }

    pub fn count(&self, color: Rgb565) -> usize {
        let raw = RawU16::from(color).into_inner();
        self.grid.iter().filter(|&&cell| cell == Some(raw)).count()
    }
}

#[derive(Default)]
struct GpioState {
    requested: Vec<(u32, &'static str)>,
    freed: Vec<u32>,
    pins: BTreeMap<u32, MockPin>,
    fail: Option<u32>,
}

/// GPIO controller that hands out [`MockPin`]s; the D/C line is wired to
/// the bus so framing follows it.
#[derive(Clone)]
pub struct FakeGpio {
    bus: MockBus,
    dc_line: u32,
    state: Rc<RefCell<GpioState>>,
}

impl FakeGpio {
    pub fn new(bus: &MockBus, dc_line: u32) -> Self {
        Self {
            bus: bus.clone(),
            dc_line,
            state: Rc::default(),
        }
    }

    /// Make requests for `line` fail.
    pub fn fail_line(&self, line: u32) {
        self.state.borrow_mut().fail = Some(line);
    }

    pub fn requested(&self) -> Vec<(u32, &'static str)> {
        self.state.borrow().requested.clone()
    }

    pub fn freed(&self) -> Vec<u32> {
        self.state.borrow().freed.clone()
    }

    /// Lines requested and not freed yet.
    pub fn held(&self) -> Vec<u32> {
        let state = self.state.borrow();
        let mut held: Vec<u32> = state.requested.iter().map(|(line, _)| *line).collect();
        for line in &state.freed {
            if let Some(i) = held.iter().position(|l| l == line) {
                held.remove(i);
            }
        }
        held
    }

    /// Pin handed out by the latest request for `line`.
    pub fn pin(&self, line: u32) -> Option<MockPin> {
        self.state.borrow().pins.get(&line).cloned()
    }
}

impl GpioController for FakeGpio {
    type Pin = MockPin;
    type Error = &'static str;

    fn request_output(
        &mut self,
        line: u32,
        label: &'static str,
        high: bool,
    ) -> Result<MockPin, &'static str> {
        let mut state = self.state.borrow_mut();
        if state.fail == Some(line) {
            return Err("line busy");
        }
        let pin = if line == self.dc_line {
            self.bus.dc()
        } else {
            MockPin::default()
        };
        pin.drive(high);
        state.requested.push((line, label));
        state.pins.insert(line, pin.clone());
        Ok(pin)
    }

    fn free(&mut self, line: u32, _pin: MockPin) {
        self.state.borrow_mut().freed.push(line);
    }
}
