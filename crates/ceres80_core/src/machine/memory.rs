use std::any::Any;

use super::bus::Device;

/// Plain byte store used for both ROM and RAM.
pub struct Memory {
    data: Vec<u8>,
    writable: bool,
}

impl Memory {
    pub fn new(size: usize, writable: bool) -> Self {
        Self {
            data: vec![0; size],
            writable,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy `image` to the start of the store, ignoring write protection.
    ///
    /// Returns `false` without touching the store if the image does not fit.
    #[must_use]
    pub fn load(&mut self, image: &[u8]) -> bool {
        if image.len() > self.data.len() {
            return false;
        }
        self.data[..image.len()].copy_from_slice(image);
        true
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    fn index(&self, offset: u16) -> usize {
        offset as usize % self.data.len().max(1)
    }
}

impl Device for Memory {
    fn read(&mut self, offset: u16) -> u8 {
        let index = self.index(offset);
        self.data.get(index).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u16, value: u8) {
        if !self.writable {
            return;
        }
        let index = self.index(offset);
        if let Some(cell) = self.data.get_mut(index) {
            *cell = value;
        }
    }

    /// RAM is cleared. ROM keeps its program image.
    fn reset(&mut self) {
        if self.writable {
            self.clear();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
