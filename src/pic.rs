//! The two cascaded 8259A interrupt controllers.
//!
//! Initialization moves through three states so the keyboard line can only be
//! unmasked after the IDT is live: `Uninit` -> `Masked` (remapped, every line
//! off) -> `KeyboardOnly`.

use core::marker::PhantomData;

use crate::constants::keyboard::IRQ_LINE;
use crate::constants::pic::{
    END_OF_INTERRUPT, ICW1_INIT, ICW3_NO_CASCADE, ICW4_8086, MASK_ALL, PIC_1_COMMAND, PIC_1_DATA,
    PIC_2_COMMAND, PIC_2_DATA,
};
use crate::idt::LoadedIdt;
use crate::port::PortBus;

struct Pic {
    offset: u8,
    command: u16,
    data: u16,
}

#[derive(Debug)]
pub struct Uninit;
#[derive(Debug)]
pub struct Masked;
#[derive(Debug)]
pub struct KeyboardOnly;

pub struct ChainedPics<State> {
    pics: [Pic; 2],
    _state: PhantomData<State>,
}

impl ChainedPics<Uninit> {
    pub const fn new(offset1: u8, offset2: u8) -> Self {
        ChainedPics {
            pics: [
                Pic { offset: offset1, command: PIC_1_COMMAND, data: PIC_1_DATA },
                Pic { offset: offset2, command: PIC_2_COMMAND, data: PIC_2_DATA },
            ],
            _state: PhantomData,
        }
    }

    /// Sends ICW1..ICW4 to both chips and masks every line.
    ///
    /// The write order is fixed by the 8259A protocol: each chip counts the
    /// data-port writes that follow its ICW1.
    pub fn remap<B: PortBus>(self, bus: &mut B) -> ChainedPics<Masked> {
        let [primary, secondary] = &self.pics;

        bus.write(primary.command, ICW1_INIT);
        bus.write(secondary.command, ICW1_INIT);

        bus.write(primary.data, primary.offset);
        bus.write(secondary.data, secondary.offset);

        bus.write(primary.data, ICW3_NO_CASCADE);
        bus.write(secondary.data, ICW3_NO_CASCADE);

        bus.write(primary.data, ICW4_8086);
        bus.write(secondary.data, ICW4_8086);

        bus.write(primary.data, MASK_ALL);
        bus.write(secondary.data, MASK_ALL);

        log::info!(
            "PICs remapped to {:#04x}/{:#04x}, all lines masked",
            primary.offset,
            secondary.offset
        );
        self.advance()
    }
}

impl ChainedPics<Masked> {
    /// Enables IRQ1 on the primary chip. Needs proof the IDT has been loaded,
    /// otherwise the first keypress would vector through an empty gate.
    pub fn unmask_keyboard<B: PortBus>(self, bus: &mut B, _idt: &LoadedIdt) -> ChainedPics<KeyboardOnly> {
        let primary = &self.pics[0];
        bus.write(primary.data, !(1 << IRQ_LINE));
        log::info!("IRQ{} unmasked -> vector {:#04x}", IRQ_LINE, self.keyboard_vector());
        self.advance()
    }
}

impl<State> ChainedPics<State> {
    fn advance<Next>(self) -> ChainedPics<Next> {
        ChainedPics { pics: self.pics, _state: PhantomData }
    }

    /// Vector the keyboard line lands on.
    pub fn keyboard_vector(&self) -> u8 {
        self.pics[0].offset + IRQ_LINE
    }
}

/// Acknowledges the current interrupt on the primary chip.
pub fn notify_end_of_interrupt<B: PortBus>(bus: &mut B) {
    bus.write(PIC_1_COMMAND, END_OF_INTERRUPT);
}
