use core::convert::Infallible;
use core::fmt;

/// GPIO lines owned by an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Reset,
    DataCommand,
    Backlight,
}

impl Line {
    pub fn label(self) -> &'static str {
        match self {
            Line::Reset => crate::config::RESET_LABEL,
            Line::DataCommand => crate::config::DATA_COMMAND_LABEL,
            Line::Backlight => crate::config::BACKLIGHT_LABEL,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Error<E = ()> {
    /// Communication error
    Comm(E),
    /// Pin setting error
    Pin(Infallible),
    /// A GPIO line could not be requested while opening
    Gpio(Line),
    /// The device is already open
    Busy,
    /// Panel width or height is zero
    InvalidConfig,
    /// Staging buffer cannot hold a full frame
    BufferTooSmall,
    /// No registered font has the requested name
    UnknownFont,
    /// A font with the same name is already registered
    DuplicateFont,
    /// Font descriptor is malformed
    InvalidFont,
    /// Access past the end of the staging buffer
    OutOfRange,
}

impl Error<Infallible> {
    /// Lift an error raised without touching the bus into any bus error type.
    pub fn widen<E>(self) -> Error<E> {
        match self {
            Self::Comm(never) => match never {},
            Self::Pin(e) => Error::Pin(e),
            Self::Gpio(line) => Error::Gpio(line),
            Self::Busy => Error::Busy,
            Self::InvalidConfig => Error::InvalidConfig,
            Self::BufferTooSmall => Error::BufferTooSmall,
            Self::UnknownFont => Error::UnknownFont,
            Self::DuplicateFont => Error::DuplicateFont,
            Self::InvalidFont => Error::InvalidFont,
            Self::OutOfRange => Error::OutOfRange,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comm(e) => write!(f, "SPI communication error: {e:?}"),
            Self::Pin(_) => write!(f, "GPIO set failed"),
            Self::Gpio(line) => write!(f, "GPIO request failed ({})", line.label()),
            Self::Busy => write!(f, "Device is busy"),
            Self::InvalidConfig => write!(f, "Panel size must be non-zero"),
            Self::BufferTooSmall => write!(f, "Staging buffer too small"),
            Self::UnknownFont => write!(f, "Unknown font"),
            Self::DuplicateFont => write!(f, "Font already added"),
            Self::InvalidFont => write!(f, "Invalid font descriptor"),
            Self::OutOfRange => write!(f, "Staging access out of range"),
        }
    }
}
