//! Bitmap fonts and the per-device font registry.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;

use crate::error::Error;

/// Font errors never involve the bus.
pub type FontResult<T> = Result<T, Error<Infallible>>;

/// Longest font name, in bytes.
pub const NAME_LEN: usize = 10;

/// Size of the packed descriptor header that precedes the glyph data.
pub const DESCRIPTOR_HEADER_LEN: usize = 16;

/// First and last character codes stored in a font.
pub const FIRST_CHAR: u8 = 0x20;
pub const LAST_CHAR: u8 = 0x7F;

/// Order of pixels within a glyph byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    /// Leftmost pixel in bit 7.
    #[default]
    MsbFirst,
    /// Leftmost pixel in bit 0.
    LsbFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    name: String,
    width: u8,
    height: u8,
    bytes_per_line: u8,
    bit_order: BitOrder,
    data: Vec<u8>,
}

impl Font {
    /// Build a font over glyphs for codes 0x20..=0x7F stored back to back,
    /// `height` rows of `bytes_per_line` bytes each.
    pub fn new(
        name: &str,
        width: u8,
        height: u8,
        bytes_per_line: u8,
        data: Vec<u8>,
    ) -> FontResult<Self> {
        let font = Self {
            name: String::from(name),
            width,
            height,
            bytes_per_line,
            bit_order: BitOrder::MsbFirst,
            data,
        };
        font.validate()?;
        Ok(font)
    }

    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    fn validate(&self) -> FontResult<()> {
        if self.name.is_empty() || self.name.len() > NAME_LEN {
            return Err(Error::InvalidFont);
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidFont);
        }
        if (self.bytes_per_line as usize) * 8 < self.width as usize {
            return Err(Error::InvalidFont);
        }
        if self.data.len() < self.glyph_len() {
            return Err(Error::InvalidFont);
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    fn glyph_len(&self) -> usize {
        self.height as usize * self.bytes_per_line as usize
    }

    /// Bitmap of `code`. Codes outside the font, and codes whose bytes are
    /// missing from a truncated table, fall back to the space glyph.
    pub fn glyph(&self, code: u8) -> &[u8] {
        let len = self.glyph_len();
        let index = if (FIRST_CHAR..=LAST_CHAR).contains(&code) {
            (code - FIRST_CHAR) as usize
        } else {
            0
        };
        let start = index * len;
        match self.data.get(start..start + len) {
            Some(glyph) => glyph,
            None => &self.data[..len],
        }
    }

    /// Whether pixel `(col, row)` of `glyph` is set.
    pub fn pixel(&self, glyph: &[u8], col: u16, row: u16) -> bool {
        let index = row as usize * self.bytes_per_line as usize + col as usize / 8;
        let Some(byte) = glyph.get(index) else {
            return false;
        };
        let bit = (col % 8) as u8;
        let mask = match self.bit_order {
            BitOrder::MsbFirst => 0x80 >> bit,
            BitOrder::LsbFirst => 1 << bit,
        };
        byte & mask != 0
    }
}

/// Packed font descriptor as passed through the add-font command.
///
/// | offset | size | field                      |
/// |--------|------|----------------------------|
/// | 0      | 10   | name, NUL padded           |
/// | 10     | 1    | width                      |
/// | 11     | 1    | height                     |
/// | 12     | 1    | bytes per line             |
/// | 13     | 1    | padding                    |
/// | 14     | 2    | data size, little endian   |
/// | 16     | size | glyph data                 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontDescriptor<'a> {
    pub name: &'a str,
    pub width: u8,
    pub height: u8,
    pub bytes_per_line: u8,
    pub data: &'a [u8],
}

impl<'a> FontDescriptor<'a> {
    pub fn parse(bytes: &'a [u8]) -> FontResult<Self> {
        if bytes.len() < DESCRIPTOR_HEADER_LEN {
            return Err(Error::InvalidFont);
        }
        let raw_name = &bytes[..NAME_LEN];
        let name_len = raw_name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let name = core::str::from_utf8(&raw_name[..name_len]).map_err(|_| Error::InvalidFont)?;
        let size = u16::from_le_bytes([bytes[14], bytes[15]]) as usize;
        let data = bytes
            .get(DESCRIPTOR_HEADER_LEN..DESCRIPTOR_HEADER_LEN + size)
            .ok_or(Error::InvalidFont)?;
        Ok(Self {
            name,
            width: bytes[10],
            height: bytes[11],
            bytes_per_line: bytes[12],
            data,
        })
    }

    /// Copy the glyph table into an owned [`Font`].
    pub fn to_font(&self) -> FontResult<Font> {
        Font::new(
            self.name,
            self.width,
            self.height,
            self.bytes_per_line,
            Vec::from(self.data),
        )
    }
}

/// Fonts registered on a device, keyed by name, plus the active selection.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: BTreeMap<String, Font>,
    active: Option<String>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, font: Font) -> FontResult<()> {
        if self.fonts.contains_key(font.name()) {
            log::warn!("st7735: font {} already added", font.name());
            return Err(Error::DuplicateFont);
        }
        log::debug!(
            "st7735: add font {} {}x{}",
            font.name(),
            font.width(),
            font.height()
        );
        self.fonts.insert(String::from(font.name()), font);
        Ok(())
    }

    /// Make `name` the active font.
    pub fn select(&mut self, name: &str) -> FontResult<()> {
        if !self.fonts.contains_key(name) {
            log::warn!("st7735: font {name} not found");
            return Err(Error::UnknownFont);
        }
        log::debug!("st7735: set font {name}");
        self.active = Some(String::from(name));
        Ok(())
    }

    pub fn active(&self) -> Option<&Font> {
        self.active.as_deref().and_then(|name| self.fonts.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Drop every font and the selection.
    pub fn clear(&mut self) {
        self.fonts.clear();
        self.active = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 8x8 font where every glyph is a filled left column, except 'A' which
    /// is a checkerboard.
    pub(crate) fn bar_font(name: &str, glyphs: usize) -> Font {
        let mut data = vec![0x80u8; glyphs * 8];
        let a = (b'A' - FIRST_CHAR) as usize * 8;
        if a + 8 <= data.len() {
            for (row, byte) in data[a..a + 8].iter_mut().enumerate() {
                *byte = if row % 2 == 0 { 0xAA } else { 0x55 };
            }
        }
        Font::new(name, 8, 8, 1, data).unwrap()
    }

    pub(crate) fn packed(name: &str, width: u8, height: u8, bpl: u8, data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; DESCRIPTOR_HEADER_LEN];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        bytes[10] = width;
        bytes[11] = height;
        bytes[12] = bpl;
        bytes[14..16].copy_from_slice(&(data.len() as u16).to_le_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn descriptor_round_trips_header_fields() {
        let data = [0xFFu8; 32];
        let bytes = packed("mono6x8", 6, 8, 1, &data);
        let desc = FontDescriptor::parse(&bytes).unwrap();
        assert_eq!(desc.name, "mono6x8");
        assert_eq!((desc.width, desc.height, desc.bytes_per_line), (6, 8, 1));
        assert_eq!(desc.data.len(), 32);
        assert_eq!(desc.to_font().unwrap().name(), "mono6x8");
    }

    #[test]
    fn descriptor_rejects_truncated_data() {
        let mut bytes = packed("f", 8, 8, 1, &[0u8; 8]);
        bytes.truncate(20);
        assert_eq!(FontDescriptor::parse(&bytes), Err(Error::InvalidFont));
        assert_eq!(FontDescriptor::parse(&[0u8; 4]), Err(Error::InvalidFont));
    }

    #[test]
    fn malformed_fonts_are_rejected() {
        assert_eq!(Font::new("", 8, 8, 1, vec![0; 8]), Err(Error::InvalidFont));
        assert_eq!(Font::new("f", 0, 8, 1, vec![0; 8]), Err(Error::InvalidFont));
        assert_eq!(Font::new("f", 12, 8, 1, vec![0; 8]), Err(Error::InvalidFont));
        assert_eq!(Font::new("f", 8, 8, 1, vec![0; 7]), Err(Error::InvalidFont));
        assert!(Font::new("f", 12, 8, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn glyph_lookup_falls_back_to_space() {
        let font = bar_font("bar", 96);
        assert_eq!(font.glyph(b'A')[0], 0xAA);
        assert_eq!(font.glyph(0x0A), font.glyph(b' '));
        assert_eq!(font.glyph(0xC8), font.glyph(b' '));

        // only space and '!' present
        let short = bar_font("short", 2);
        assert_eq!(short.glyph(b'A'), short.glyph(b' '));
    }

    #[test]
    fn pixel_honours_bit_order() {
        let font = Font::new("f", 8, 1, 1, vec![0x01]).unwrap();
        let glyph = font.glyph(b' ');
        assert!(font.pixel(glyph, 7, 0));
        assert!(!font.pixel(glyph, 0, 0));

        let font = font.with_bit_order(BitOrder::LsbFirst);
        let glyph = font.glyph(b' ');
        assert!(font.pixel(glyph, 0, 0));
        assert!(!font.pixel(glyph, 7, 0));
    }

    #[test]
    fn registry_rejects_duplicates_and_unknown_names() {
        let mut fonts = FontRegistry::new();
        fonts.add(bar_font("a", 1)).unwrap();
        assert_eq!(fonts.add(bar_font("a", 1)), Err(Error::DuplicateFont));
        assert_eq!(fonts.select("b"), Err(Error::UnknownFont));
        assert!(fonts.active().is_none());

        fonts.select("a").unwrap();
        assert_eq!(fonts.active().map(Font::name), Some("a"));

        fonts.clear();
        assert!(fonts.is_empty());
        assert!(fonts.active().is_none());
    }
}
