pub mod cpu;
pub mod error;
pub mod interrupts;
pub mod machine;

pub use error::{Ceres80Error, MapError, StateError};
pub use interrupts::{InterruptManager, INTERRUPT_STATE_LEN};
pub use machine::Ceres80;

/// ROM occupies the lower half of the address space.
pub const ROM_SIZE: usize = 0x8000;
/// RAM occupies the upper half.
pub const RAM_SIZE: usize = 0x8000;
/// CPU clock in Hz.
pub const CLOCK_HZ: u32 = 6_144_000;
/// Host frame rate the cycle budget is divided by.
pub const FRAMES_PER_SECOND: u32 = 60;
/// LCD width in pixels (two 64-pixel halves).
pub const SCREEN_WIDTH: usize = 128;
/// LCD height in pixels.
pub const SCREEN_HEIGHT: usize = 64;
/// Upper bound accepted by `Ceres80::set_speed`.
pub const MAX_SPEED_PERCENT: u32 = 500;
