//! PS/2 keyboard: scan code translation and the IRQ1 continuation.

use bitflags::bitflags;

use crate::constants::keyboard::{DATA_PORT, RELEASE_BIT, STATUS_PORT};
use crate::pic;
use crate::port::PortBus;
use crate::vga_buffer::{ColorCode, ScreenFull, Writer};

/// Runs of consecutive set-1 make codes that produce a printable key.
const PRINTABLE_ROWS: [(u8, &[u8]); 4] = [
    (0x02, b"1234567890"),
    (0x10, b"qwertyuiop"),
    (0x1E, b"asdfghjkl"),
    (0x2C, b"zxcvbnm"),
];

/// Scan code set 1 make code -> ASCII, 0 where nothing is printed.
pub static SCANCODE_MAP: [u8; 128] = {
    let mut map = [0u8; 128];
    let mut row = 0;
    while row < PRINTABLE_ROWS.len() {
        let (first, keys) = PRINTABLE_ROWS[row];
        let mut i = 0;
        while i < keys.len() {
            map[first as usize + i] = keys[i];
            i += 1;
        }
        row += 1;
    }
    map
};

/// Lowercase letter or digit for a make code; `None` for anything else.
pub fn translate(code: u8) -> Option<char> {
    match SCANCODE_MAP.get(usize::from(code)) {
        Some(&0) | None => None,
        Some(&ascii) => Some(char::from(ascii)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(u8),
    /// Break code, still carrying the release bit.
    Released(u8),
}

impl KeyEvent {
    pub fn from_scancode(code: u8) -> KeyEvent {
        if code & RELEASE_BIT != 0 {
            KeyEvent::Released(code)
        } else {
            KeyEvent::Pressed(code)
        }
    }
}

bitflags! {
    /// 8042 status register (port 0x64).
    pub struct KeyboardStatus: u8 {
        const OUTPUT_FULL   = 1 << 0;
        const INPUT_FULL    = 1 << 1;
        const SYSTEM        = 1 << 2;
        const COMMAND       = 1 << 3;
        const TIMEOUT_ERROR = 1 << 6;
        const PARITY_ERROR  = 1 << 7;
    }
}

/// What one pass through [`service`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serviced {
    /// Status said there was nothing to read.
    Spurious,
    Released(u8),
    /// A press with no printable mapping.
    Unmapped(u8),
    Printed(char),
    ScreenFull(char),
}

/// The keyboard interrupt continuation.
///
/// Acknowledges the PIC first, then reads at most one scan code and writes at
/// most one cell. Nothing here allocates, blocks or logs.
pub fn service<B: PortBus>(bus: &mut B, writer: &mut Writer<'_>) -> Serviced {
    pic::notify_end_of_interrupt(bus);

    let status = KeyboardStatus::from_bits_truncate(bus.read(STATUS_PORT));
    if !status.contains(KeyboardStatus::OUTPUT_FULL) {
        return Serviced::Spurious;
    }

    let code = match KeyEvent::from_scancode(bus.read(DATA_PORT)) {
        KeyEvent::Released(code) => return Serviced::Released(code),
        KeyEvent::Pressed(code) => code,
    };

    match translate(code) {
        None => Serviced::Unmapped(code),
        Some(c) => match writer.write_char(c, ColorCode::DEFAULT) {
            Ok(()) => Serviced::Printed(c),
            Err(ScreenFull) => Serviced::ScreenFull(c),
        },
    }
}

/// State owned by the keyboard interrupt: the port bus and the screen.
///
/// Built once during boot and handed to
/// [`interrupts::register`](crate::interrupts::register) before the IRQ line
/// is unmasked.
pub struct KeyboardService<'a, B: PortBus> {
    bus: B,
    writer: Writer<'a>,
}

impl<'a, B: PortBus> KeyboardService<'a, B> {
    pub fn new(bus: B, writer: Writer<'a>) -> Self {
        KeyboardService { bus, writer }
    }

    /// Handles one keyboard interrupt.
    ///
    /// Preconditions for callers: interrupts are disabled for the whole call
    /// (the CPU guarantees this inside an interrupt gate), the stack may be
    /// small and must not grow unboundedly, and the PIC has to see its EOI
    /// before the interrupt returns, which this method always sends.
    pub fn service(&mut self) -> Serviced {
        service(&mut self.bus, &mut self.writer)
    }

    pub fn writer(&self) -> &Writer<'a> {
        &self.writer
    }
}
