/// System-wide constants to avoid magic numbers

/// VGA text mode constants
pub mod vga {
    /// VGA text buffer physical address
    pub const BUFFER_ADDR: usize = 0xb8000;

    /// VGA text mode dimensions
    pub const BUFFER_HEIGHT: usize = 25;
    pub const BUFFER_WIDTH: usize = 80;
    pub const BUFFER_CELLS: usize = BUFFER_HEIGHT * BUFFER_WIDTH;

    /// One cell is a character byte followed by an attribute byte
    pub const BYTES_PER_CELL: usize = 2;

    /// Light grey on black
    pub const DEFAULT_ATTRIBUTE: u8 = 0x07;
}

/// PS/2 Keyboard controller constants
pub mod keyboard {
    /// PS/2 keyboard data port
    pub const DATA_PORT: u16 = 0x60;

    /// PS/2 keyboard status/command port
    pub const STATUS_PORT: u16 = 0x64;

    /// Set on every break (release) code of scan code set 1
    pub const RELEASE_BIT: u8 = 0x80;

    /// IRQ line of the keyboard on the master PIC
    pub const IRQ_LINE: u8 = 1;
}

/// PIC (8259A) constants
pub mod pic {
    pub const PIC_1_COMMAND: u16 = 0x20;
    pub const PIC_1_DATA: u16 = 0x21;
    pub const PIC_2_COMMAND: u16 = 0xA0;
    pub const PIC_2_DATA: u16 = 0xA1;

    /// We remap PIC interrupts to start at 32 to avoid conflicts with CPU exceptions
    pub const PIC_1_OFFSET: u8 = 0x20;
    pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

    /// ICW1: edge triggered, cascade mode, ICW4 follows
    pub const ICW1_INIT: u8 = 0x11;
    /// ICW3: no cascading wired up
    pub const ICW3_NO_CASCADE: u8 = 0x00;
    /// ICW4: 8086/88 mode
    pub const ICW4_8086: u8 = 0x01;

    pub const MASK_ALL: u8 = 0xFF;
    pub const END_OF_INTERRUPT: u8 = 0x20;
}

/// Interrupt descriptor table constants
pub mod idt {
    pub const ENTRIES: usize = 256;

    /// Kernel code segment set up by the boot trampoline's GDT
    pub const KERNEL_CODE_SELECTOR: u16 = 0x08;

    /// Present, ring 0, 32-bit interrupt gate
    pub const INTERRUPT_GATE: u8 = 0x8E;
}

/// COM1 serial port used by the logger
pub mod serial {
    pub const COM1: u16 = 0x3F8;
}
