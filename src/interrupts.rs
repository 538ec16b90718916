use spin::Mutex;
use crate::constants::keyboard::IRQ_LINE;
use crate::constants::pic::PIC_1_OFFSET;
use crate::keyboard::{KeyboardService, Serviced};
use crate::pic;
use crate::port::{HardwarePorts, PortBus};

/// Hardware interrupt numbers (after remapping)
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    Keyboard = PIC_1_OFFSET + IRQ_LINE,
}

impl InterruptIndex {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// What the CPU pushes on entry to a same-privilege interrupt gate.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct InterruptStackFrame {
    pub instruction_pointer: u32,
    pub code_segment: u32,
    pub eflags: u32,
}

pub type KernelKeyboard = KeyboardService<'static, HardwarePorts>;

/// Keyboard state reachable from the interrupt handler. Foreground code may
/// only touch it inside [`without_interrupts`].
static KEYBOARD: Mutex<Option<KernelKeyboard>> = Mutex::new(None);

/// Proof that the keyboard service is in place.
#[derive(Debug)]
pub struct KeyboardRegistered {
    _private: (),
}

/// Hands the keyboard state to the interrupt handler.
pub fn register(service: KernelKeyboard) -> KeyboardRegistered {
    without_interrupts(|| {
        *KEYBOARD.lock() = Some(service);
    });
    log::info!("keyboard service registered");
    KeyboardRegistered { _private: () }
}

/// Runs the registered service, or just acknowledges the PIC when there is
/// none or it is busy. Never spins.
#[cfg_attr(not(target_os = "none"), allow(dead_code))]
fn dispatch<B: PortBus>(
    slot: &Mutex<Option<KeyboardService<'_, B>>>,
    fallback: &mut impl PortBus,
) -> Option<Serviced> {
    match slot.try_lock() {
        Some(mut guard) => match guard.as_mut() {
            Some(keyboard) => Some(keyboard.service()),
            None => {
                pic::notify_end_of_interrupt(fallback);
                None
            }
        },
        None => {
            pic::notify_end_of_interrupt(fallback);
            None
        }
    }
}

#[cfg(target_os = "none")]
pub use self::bare_metal::init;

#[cfg(target_os = "none")]
mod bare_metal {
    use lazy_static::lazy_static;

    use super::{dispatch, InterruptIndex, InterruptStackFrame, KeyboardRegistered, KEYBOARD};
    use crate::constants::pic::{PIC_1_OFFSET, PIC_2_OFFSET};
    use crate::idt::InterruptDescriptorTable;
    use crate::pic::{ChainedPics, KeyboardOnly};
    use crate::port::HardwarePorts;

    lazy_static! {
        static ref IDT: InterruptDescriptorTable = {
            let mut idt = InterruptDescriptorTable::new();
            idt.set_handler(
                InterruptIndex::Keyboard.as_u8(),
                keyboard_interrupt_handler as usize as u32,
            );
            idt
        };
    }

    /// Remaps the PICs, loads the IDT (which turns interrupts on) and only
    /// then lets IRQ1 through.
    pub fn init(bus: &mut HardwarePorts, _keyboard: &KeyboardRegistered) -> ChainedPics<KeyboardOnly> {
        let pics = ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET).remap(bus);
        let idt = unsafe { IDT.load() };
        pics.unmask_keyboard(bus, &idt)
    }

    extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
        let mut ports = unsafe { HardwarePorts::new() };
        dispatch(&KEYBOARD, &mut ports);
    }
}

#[cfg(target_arch = "x86")]
#[allow(unused_unsafe)]
pub fn are_enabled() -> bool {
    use x86::bits32::eflags::{self, EFlags};
    unsafe { eflags::read() }.contains(EFlags::FLAGS_IF)
}

#[cfg(not(target_arch = "x86"))]
#[allow(unused_unsafe)]
pub fn are_enabled() -> bool {
    use x86::bits64::rflags::{self, RFlags};
    unsafe { rflags::read() }.contains(RFlags::FLAGS_IF)
}

pub fn enable() {
    unsafe { x86::irq::enable() };
}

pub fn disable() {
    unsafe { x86::irq::disable() };
}

/// Runs `f` with interrupts off, restoring the previous state afterwards.
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let saved = are_enabled();
    if saved {
        disable();
    }
    let ret = f();
    if saved {
        enable();
    }
    ret
}

pub fn hlt() {
    unsafe { x86::halt() };
}

pub fn hlt_loop() -> ! {
    loop {
        hlt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::keyboard::{DATA_PORT, STATUS_PORT};
    use crate::testing::{self, RecordingBus};
    use crate::vga_buffer::{ScreenRegion, Writer};

    #[test]
    fn keyboard_vector_is_0x21() {
        assert_eq!(InterruptIndex::Keyboard.as_u8(), 0x21);
    }

    #[test]
    fn dispatch_runs_registered_service() {
        let mut cells = testing::cells();
        let mut writer = Writer::new(ScreenRegion::new(&mut cells));
        writer.clear();
        let mut bus = RecordingBus::new();
        bus.queue_read(STATUS_PORT, 0x01).queue_read(DATA_PORT, 0x10);
        let slot = Mutex::new(Some(KeyboardService::new(bus, writer)));
        let mut fallback = RecordingBus::new();

        assert_eq!(dispatch(&slot, &mut fallback), Some(Serviced::Printed('q')));
        assert!(fallback.writes.is_empty());
    }

    #[test]
    fn dispatch_without_service_still_acknowledges() {
        let slot: Mutex<Option<KeyboardService<'_, RecordingBus>>> = Mutex::new(None);
        let mut fallback = RecordingBus::new();

        assert_eq!(dispatch(&slot, &mut fallback), None);
        assert_eq!(fallback.writes, vec![(0x20, 0x20)]);
    }

    #[test]
    fn dispatch_while_locked_still_acknowledges() {
        let slot: Mutex<Option<KeyboardService<'_, RecordingBus>>> = Mutex::new(None);
        let _held = slot.lock();
        let mut fallback = RecordingBus::new();

        assert_eq!(dispatch(&slot, &mut fallback), None);
        assert_eq!(fallback.writes, vec![(0x20, 0x20)]);
    }
}
