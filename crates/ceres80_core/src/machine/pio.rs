use std::any::Any;

use super::bus::Device;

/// Z80 PIO placeholder. Nothing is wired to it on the board yet, so reads
/// return 0 and writes are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pio;

impl Pio {
    pub fn new() -> Self {
        Self
    }
}

impl Device for Pio {
    fn read(&mut self, _offset: u16) -> u8 {
        0x00
    }

    fn write(&mut self, offset: u16, value: u8) {
        log::trace!("PIO write {:#04X} to offset {} dropped", value, offset);
    }

    fn reset(&mut self) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
