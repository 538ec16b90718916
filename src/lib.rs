//! Interrupt-driven keyboard input for a minimal 32-bit x86 kernel.
//!
//! Boot order: clear the screen, register the [`keyboard::KeyboardService`],
//! remap the PICs with every line masked, load the IDT, then unmask IRQ1.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]

pub mod constants;
pub mod idt;
pub mod interrupts;
pub mod keyboard;
pub mod logger;
pub mod pic;
pub mod port;
pub mod serial;
pub mod vga_buffer;

#[cfg(test)]
mod testing;
