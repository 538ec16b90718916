//! Protected-mode interrupt descriptor table.
//!
//! Gate layout (8 bytes, little-endian):
//!
//! | bytes | field              |
//! |-------|--------------------|
//! | 0..2  | handler offset low |
//! | 2..4  | code selector      |
//! | 4     | reserved, zero     |
//! | 5     | type / attributes  |
//! | 6..8  | handler offset high|

use core::arch::asm;
use core::mem::size_of;
use core::ops::Index;

use crate::constants::idt::{ENTRIES, INTERRUPT_GATE, KERNEL_CODE_SELECTOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct GateDescriptor {
    offset_low: u16,
    selector: u16,
    reserved: u8,
    type_attributes: u8,
    offset_high: u16,
}

const _: () = assert!(size_of::<GateDescriptor>() == 8);

impl GateDescriptor {
    /// Not present; the CPU raises #NP (and ends up triple faulting) if hit.
    pub const fn missing() -> Self {
        GateDescriptor { offset_low: 0, selector: 0, reserved: 0, type_attributes: 0, offset_high: 0 }
    }

    /// Present ring-0 32-bit interrupt gate in the kernel code segment.
    pub const fn interrupt_gate(handler: u32) -> Self {
        GateDescriptor {
            offset_low: (handler & 0xFFFF) as u16,
            selector: KERNEL_CODE_SELECTOR,
            reserved: 0,
            type_attributes: INTERRUPT_GATE,
            offset_high: ((handler >> 16) & 0xFFFF) as u16,
        }
    }

    pub fn handler_address(&self) -> u32 {
        u32::from(self.offset_high) << 16 | u32::from(self.offset_low)
    }

    pub fn offset_low(&self) -> u16 {
        self.offset_low
    }

    pub fn offset_high(&self) -> u16 {
        self.offset_high
    }

    pub fn selector(&self) -> u16 {
        self.selector
    }

    pub fn type_attributes(&self) -> u8 {
        self.type_attributes
    }

    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    pub fn is_present(&self) -> bool {
        self.type_attributes & 0x80 != 0
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let [l0, l1] = self.offset_low.to_le_bytes();
        let [s0, s1] = self.selector.to_le_bytes();
        let [h0, h1] = self.offset_high.to_le_bytes();
        [l0, l1, s0, s1, self.reserved, self.type_attributes, h0, h1]
    }
}

#[repr(C, align(8))]
pub struct InterruptDescriptorTable {
    entries: [GateDescriptor; ENTRIES],
}

impl InterruptDescriptorTable {
    pub const fn new() -> Self {
        InterruptDescriptorTable { entries: [GateDescriptor::missing(); ENTRIES] }
    }

    /// Points `vector` at `handler` through an interrupt gate.
    pub fn set_handler(&mut self, vector: u8, handler: u32) -> &mut GateDescriptor {
        let entry = &mut self.entries[usize::from(vector)];
        *entry = GateDescriptor::interrupt_gate(handler);
        entry
    }

    pub fn pointer(&self) -> DescriptorTablePointer {
        DescriptorTablePointer::new(self)
    }

    /// Loads the table with `lidt` and then enables interrupts with `sti`.
    ///
    /// # Safety
    /// Must run in 32-bit protected mode at ring 0 with the kernel code segment
    /// at selector 0x08. Every vector that can fire from here on must have a
    /// valid gate; keep PIC lines masked until the returned token is used.
    pub unsafe fn load(&'static self) -> LoadedIdt {
        let pointer = self.pointer();
        asm!("lidt [{}]", in(reg) &pointer, options(readonly, nostack, preserves_flags));
        asm!("sti", options(nomem, nostack));
        log::info!("IDT loaded at {:#010x}, interrupts enabled", { pointer.base });
        LoadedIdt { _private: () }
    }
}

impl Default for InterruptDescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for InterruptDescriptorTable {
    type Output = GateDescriptor;

    fn index(&self, vector: u8) -> &GateDescriptor {
        &self.entries[usize::from(vector)]
    }
}

/// Operand of `lidt`: table limit (size - 1) and linear base address.
#[derive(Debug, Clone, Copy)]
#[repr(C, packed(2))]
pub struct DescriptorTablePointer {
    pub limit: u16,
    pub base: u32,
}

const _: () = assert!(size_of::<DescriptorTablePointer>() == 6);

impl DescriptorTablePointer {
    pub fn new(table: &InterruptDescriptorTable) -> Self {
        DescriptorTablePointer {
            limit: (size_of::<InterruptDescriptorTable>() - 1) as u16,
            base: table as *const InterruptDescriptorTable as usize as u32,
        }
    }
}

/// Proof that an IDT is loaded and interrupts are enabled.
#[derive(Debug)]
pub struct LoadedIdt {
    _private: (),
}

#[cfg(test)]
impl LoadedIdt {
    pub(crate) fn assume_loaded() -> Self {
        LoadedIdt { _private: () }
    }
}
