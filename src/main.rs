#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod kernel {
    use core::panic::PanicInfo;

    use dxkbd::interrupts;
    use dxkbd::keyboard::KeyboardService;
    use dxkbd::port::HardwarePorts;
    use dxkbd::vga_buffer::{Color, ColorCode, ScreenRegion, Writer};
    use dxkbd::{logger, serial_println};

    const BANNER: &str = "DxOS keyboard console\n\0";

    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        interrupts::disable();
        dxkbd::serial::_try_print(format_args!("[ERROR] {}\n", info));
        interrupts::hlt_loop();
    }

    /// Called once by the multiboot trampoline, interrupts off, stack set up.
    #[no_mangle]
    pub extern "C" fn kmain() -> ! {
        if let Err(err) = logger::init() {
            serial_println!("logger unavailable: {}", err);
        }
        log::info!("starting");

        let mut writer = Writer::new(unsafe { ScreenRegion::vga() });
        writer.clear();
        if writer
            .write_string(BANNER, ColorCode::new(Color::LightCyan, Color::Black))
            .is_err()
        {
            log::warn!("banner truncated");
        }

        let registered = interrupts::register(KeyboardService::new(
            unsafe { HardwarePorts::new() },
            writer,
        ));
        let mut ports = unsafe { HardwarePorts::new() };
        interrupts::init(&mut ports, &registered);
        log::info!("waiting for keys");

        interrupts::hlt_loop();
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
