//! Single-byte x86 port I/O.
//!
//! Everything that touches a port goes through [`PortBus`] so the PIC,
//! keyboard and UART sequences can be replayed against a recording bus in
//! tests. [`HardwarePorts`] is the real thing.

use core::arch::asm;

/// Reads one byte from `port`.
///
/// # Safety
/// Needs I/O privilege, and reading some ports has hardware side effects
/// (reading 0x60 pops the keyboard controller's output buffer).
#[inline]
pub unsafe fn read_port(port: u16) -> u8 {
    let value: u8;
    asm!("in al, dx", in("dx") port, out("al") value, options(nomem, nostack, preserves_flags));
    value
}

/// Writes one byte to `port`.
///
/// # Safety
/// Needs I/O privilege; the write goes straight to hardware.
#[inline]
pub unsafe fn write_port(port: u16, value: u8) {
    asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
}

/// Byte-wide access to the I/O address space.
pub trait PortBus {
    fn read(&mut self, port: u16) -> u8;
    fn write(&mut self, port: u16, value: u8);
}

impl<B: PortBus + ?Sized> PortBus for &mut B {
    fn read(&mut self, port: u16) -> u8 {
        (**self).read(port)
    }

    fn write(&mut self, port: u16, value: u8) {
        (**self).write(port, value)
    }
}

/// The processor's I/O ports, reached with `in`/`out`.
#[derive(Debug)]
pub struct HardwarePorts {
    _private: (),
}

impl HardwarePorts {
    /// # Safety
    /// The caller must be running at ring 0 (or with a permissive IOPL) on x86.
    pub const unsafe fn new() -> Self {
        HardwarePorts { _private: () }
    }
}

impl PortBus for HardwarePorts {
    fn read(&mut self, port: u16) -> u8 {
        unsafe { read_port(port) }
    }

    fn write(&mut self, port: u16, value: u8) {
        unsafe { write_port(port, value) }
    }
}
