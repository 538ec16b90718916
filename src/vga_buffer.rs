use core::fmt;
use volatile::Volatile;
use crate::constants::vga::{
    BUFFER_ADDR, BUFFER_CELLS, BUFFER_WIDTH, BYTES_PER_CELL, DEFAULT_ATTRIBUTE,
};

#[allow(dead_code)]
#[derive(Clone, Copy)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// Attribute byte: background in the high nibble, foreground in the low one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const DEFAULT: ColorCode = ColorCode(DEFAULT_ATTRIBUTE);

    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    pub const fn attribute(self) -> u8 {
        self.0
    }
}

impl From<u8> for ColorCode {
    fn from(attribute: u8) -> Self {
        ColorCode(attribute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

impl ScreenChar {
    pub const fn new(ascii_character: u8, attribute: u8) -> ScreenChar {
        ScreenChar { ascii_character, color_code: ColorCode(attribute) }
    }

    pub const fn blank() -> ScreenChar {
        ScreenChar::new(b' ', DEFAULT_ATTRIBUTE)
    }
}

const _: () = assert!(core::mem::size_of::<ScreenChar>() == BYTES_PER_CELL);

/// Index past the end of a [`ScreenRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds {
    pub index: usize,
    pub len: usize,
}

/// The cursor has reached the end of the grid; there is no scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenFull;

/// A bounded window onto text-mode cell memory.
///
/// All accesses are volatile and index-checked, so a runaway cursor can never
/// write past the end of the mapped grid.
pub struct ScreenRegion<'a> {
    cells: &'a mut [Volatile<ScreenChar>],
}

impl ScreenRegion<'static> {
    /// # Safety
    /// `addr` must point to `len` cells of memory that stay mapped for the rest
    /// of the kernel's life, and nothing else may create a second region over it.
    pub unsafe fn from_raw(addr: usize, len: usize) -> Self {
        ScreenRegion {
            cells: core::slice::from_raw_parts_mut(addr as *mut Volatile<ScreenChar>, len),
        }
    }

    /// The 80x25 colour text buffer at 0xb8000.
    ///
    /// # Safety
    /// Same as [`ScreenRegion::from_raw`]: call at most once.
    pub unsafe fn vga() -> Self {
        Self::from_raw(BUFFER_ADDR, BUFFER_CELLS)
    }
}

impl<'a> ScreenRegion<'a> {
    pub fn new(cells: &'a mut [Volatile<ScreenChar>]) -> Self {
        ScreenRegion { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn read(&self, index: usize) -> Option<ScreenChar> {
        self.cells.get(index).map(Volatile::read)
    }

    pub fn write(&mut self, index: usize, character: ScreenChar) -> Result<(), OutOfBounds> {
        let len = self.cells.len();
        match self.cells.get_mut(index) {
            Some(cell) => {
                cell.write(character);
                Ok(())
            }
            None => Err(OutOfBounds { index, len }),
        }
    }
}

/// Cursor-tracked writer over a [`ScreenRegion`].
///
/// The cursor counts bytes, two per cell, and only ever moves forward
/// (except for [`Writer::clear`]).
pub struct Writer<'a> {
    cursor: usize,
    region: ScreenRegion<'a>,
}

impl<'a> Writer<'a> {
    pub fn new(region: ScreenRegion<'a>) -> Self {
        Writer { cursor: 0, region }
    }

    /// Byte offset of the next write.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn region(&self) -> &ScreenRegion<'a> {
        &self.region
    }

    fn end(&self) -> usize {
        self.region.len() * BYTES_PER_CELL
    }

    pub fn clear(&mut self) {
        for index in 0..self.region.len() {
            // index < len, cannot fail
            let _ = self.region.write(index, ScreenChar::blank());
        }
        self.cursor = 0;
    }

    pub fn write_char(&mut self, c: char, color_code: ColorCode) -> Result<(), ScreenFull> {
        let byte = if c.is_ascii() { c as u8 } else { 0xfe };
        self.region
            .write(
                self.cursor / BYTES_PER_CELL,
                ScreenChar { ascii_character: byte, color_code },
            )
            .map_err(|_| ScreenFull)?;
        self.cursor += BYTES_PER_CELL;
        Ok(())
    }

    /// Moves the cursor to the start of the next row.
    pub fn new_line(&mut self) {
        let line = BUFFER_WIDTH * BYTES_PER_CELL;
        self.cursor = (self.cursor + line - self.cursor % line).min(self.end());
    }

    /// Writes `s` up to its first NUL, if any. `'\n'` starts a new row.
    pub fn write_string(&mut self, s: &str, color_code: ColorCode) -> Result<(), ScreenFull> {
        for c in s.chars().take_while(|&c| c != '\0') {
            match c {
                '\n' => self.new_line(),
                c => self.write_char(c, color_code)?,
            }
        }
        Ok(())
    }
}

impl fmt::Write for Writer<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s, ColorCode::DEFAULT).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn clear_blanks_every_cell_and_rewinds_cursor() {
        let mut cells = testing::cells();
        let mut writer = Writer::new(ScreenRegion::new(&mut cells));
        writer.write_char('x', ColorCode::DEFAULT).unwrap();

        writer.clear();

        assert_eq!(writer.cursor(), 0);
        for index in 0..BUFFER_CELLS {
            assert_eq!(writer.region().read(index), Some(ScreenChar::new(b' ', 0x07)));
        }
    }

    #[test]
    fn write_char_fills_first_slot() {
        let mut cells = testing::cells();
        let mut writer = Writer::new(ScreenRegion::new(&mut cells));
        writer.clear();

        writer.write_char('k', ColorCode::from(0x07)).unwrap();

        assert_eq!(writer.cursor(), 2);
        let first = writer.region().read(0).unwrap();
        assert_eq!(first.ascii_character, b'k');
        assert_eq!(first.color_code.attribute(), 0x07);
        assert_eq!(writer.region().read(1), Some(ScreenChar::blank()));
    }

    #[test]
    fn cell_is_character_then_attribute() {
        let cell = ScreenChar::new(b'k', 0x07);
        let bytes: [u8; 2] = unsafe { core::mem::transmute(cell) };
        assert_eq!(bytes, [b'k', 0x07]);
    }

    #[test]
    fn write_past_grid_is_refused() {
        let mut cells = testing::cells();
        let mut writer = Writer::new(ScreenRegion::new(&mut cells[..3]));
        writer.clear();

        for c in ['a', 'b', 'c'] {
            writer.write_char(c, ColorCode::DEFAULT).unwrap();
        }
        assert_eq!(writer.write_char('d', ColorCode::DEFAULT), Err(ScreenFull));
        assert_eq!(writer.cursor(), 6);
        assert_eq!(cells[3].read(), ScreenChar::new(0, 0));
    }

    #[test]
    fn region_rejects_out_of_range_index() {
        let mut cells = testing::cells();
        let mut region = ScreenRegion::new(&mut cells);
        assert_eq!(
            region.write(BUFFER_CELLS, ScreenChar::blank()),
            Err(OutOfBounds { index: BUFFER_CELLS, len: BUFFER_CELLS })
        );
        assert_eq!(region.read(BUFFER_CELLS), None);
    }

    #[test]
    fn write_string_stops_at_nul() {
        let mut cells = testing::cells();
        let mut writer = Writer::new(ScreenRegion::new(&mut cells));
        writer.clear();

        let attribute = ColorCode::new(Color::LightCyan, Color::Black);
        writer.write_string("ok\0ignored", attribute).unwrap();

        assert_eq!(writer.cursor(), 4);
        assert_eq!(writer.region().read(0), Some(ScreenChar::new(b'o', 0x0b)));
        assert_eq!(writer.region().read(1), Some(ScreenChar::new(b'k', 0x0b)));
        assert_eq!(writer.region().read(2), Some(ScreenChar::blank()));
    }

    #[test]
    fn newline_moves_to_next_row() {
        let mut cells = testing::cells();
        let mut writer = Writer::new(ScreenRegion::new(&mut cells));
        writer.clear();

        writer.write_string("hi\n", ColorCode::DEFAULT).unwrap();
        assert_eq!(writer.cursor(), BUFFER_WIDTH * 2);

        writer.write_char('x', ColorCode::DEFAULT).unwrap();
        assert_eq!(writer.region().read(BUFFER_WIDTH).unwrap().ascii_character, b'x');
    }

    #[test]
    fn fmt_write_uses_default_attribute() {
        use core::fmt::Write;

        let mut cells = testing::cells();
        let mut writer = Writer::new(ScreenRegion::new(&mut cells));
        writer.clear();

        write!(writer, "{}", 42).unwrap();
        assert_eq!(writer.region().read(0), Some(ScreenChar::new(b'4', 0x07)));
        assert_eq!(writer.region().read(1), Some(ScreenChar::new(b'2', 0x07)));
    }
}
