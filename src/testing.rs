//! Test doubles for hardware.

use std::collections::{HashMap, VecDeque};

use volatile::Volatile;

use crate::constants::vga::BUFFER_CELLS;
use crate::port::PortBus;
use crate::vga_buffer::ScreenChar;

/// A bus that answers reads from per-port queues and remembers every write.
#[derive(Debug, Default)]
pub struct RecordingBus {
    reads: HashMap<u16, VecDeque<u8>>,
    pub writes: Vec<(u16, u8)>,
    pub read_log: Vec<u16>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `value` as the next answer for a read of `port`.
    pub fn queue_read(&mut self, port: u16, value: u8) -> &mut Self {
        self.reads.entry(port).or_default().push_back(value);
        self
    }

    pub fn writes_to(&self, port: u16) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(p, _)| *p == port)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl PortBus for RecordingBus {
    fn read(&mut self, port: u16) -> u8 {
        self.read_log.push(port);
        self.reads
            .get_mut(&port)
            .and_then(VecDeque::pop_front)
            .unwrap_or(0)
    }

    fn write(&mut self, port: u16, value: u8) {
        self.writes.push((port, value));
    }
}

/// Zeroed stand-in for VGA text memory.
pub fn cells() -> Vec<Volatile<ScreenChar>> {
    (0..BUFFER_CELLS)
        .map(|_| Volatile::new(ScreenChar::new(0, 0)))
        .collect()
}
