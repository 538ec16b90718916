//! COM1 serial output, used as the log sink.

use core::fmt;
use lazy_static::lazy_static;
use spin::Mutex;
use uart_16550::SerialPort;

use crate::constants::serial::COM1;
use crate::interrupts;

lazy_static! {
    pub static ref SERIAL1: Mutex<SerialPort> = {
        let mut serial_port = unsafe { SerialPort::new(COM1) };
        serial_port.init();
        Mutex::new(serial_port)
    };
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;

    interrupts::without_interrupts(|| {
        // The serial sink never reports errors.
        let _ = SERIAL1.lock().write_fmt(args);
    });
}

/// Writes `args` only if `sink` is free. Returns whether anything was written.
pub fn write_if_free<W: fmt::Write>(sink: &Mutex<W>, args: fmt::Arguments) -> bool {
    match sink.try_lock() {
        Some(mut writer) => writer.write_fmt(args).is_ok(),
        None => false,
    }
}

/// Panic-path print: skips the output instead of spinning on a held lock.
#[doc(hidden)]
pub fn _try_print(args: fmt::Arguments) -> bool {
    write_if_free(&SERIAL1, args)
}

/// Prints to the host through the serial interface.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::serial::_print(format_args!($($arg)*));
    };
}

/// Prints to the host through the serial interface, appending a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(
        concat!($fmt, "\n"), $($arg)*));
}
