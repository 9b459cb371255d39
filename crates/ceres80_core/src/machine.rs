mod bus;
mod ceres80;
mod ctc;
mod lcd;
mod memory;
mod pio;
mod trace;

pub use bus::{
    AccessDirection, AccessEvent, AddressSpace, BusObserver, Device, DeviceId, DeviceMapping,
    SystemBus, OPEN_BUS,
};
pub use ceres80::Ceres80;
pub use ctc::{Ctc, CtcChannel, CTC_CHANNEL_STATE_LEN, CTC_STATE_LEN};
pub use lcd::{Lcd, LcdSection};
pub use memory::Memory;
pub use pio::Pio;
pub use trace::TraceLog;

/// Board memory map.
pub const ROM_START: u16 = 0x0000;
pub const ROM_END: u16 = 0x7FFF;
pub const RAM_START: u16 = 0x8000;
pub const RAM_END: u16 = 0xFFFF;

/// Board port map.
pub const CTC_PORTS: (u16, u16) = (0x00, 0x03);
pub const PIO_PORTS: (u16, u16) = (0x04, 0x07);
pub const LCD_PORTS: (u16, u16) = (0x08, 0x0B);

#[cfg(test)]
mod tests;
