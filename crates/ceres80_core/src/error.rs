use thiserror::Error;

/// A save-state block did not have the size its component expects.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("state length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// An address range could not be mapped onto the bus.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    #[error("range {start:#06X}..={end:#06X} overlaps an existing mapping")]
    Overlap { start: u16, end: u16 },
    #[error("range start {start:#06X} is past its end {end:#06X}")]
    Inverted { start: u16, end: u16 },
}

#[derive(Debug, Error)]
pub enum Ceres80Error {
    #[error("{store} image is {size} bytes, capacity is {capacity}")]
    ImageTooLarge {
        store: &'static str,
        size: usize,
        capacity: usize,
    },
    #[error("speed {0}% is out of range (0..=500)")]
    InvalidSpeed(u32),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("{0} is not attached to the bus")]
    MissingDevice(&'static str),
}
