use std::any::Any;

use super::bus::Device;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Width in pixels of one controller's half of the panel.
const SECTION_WIDTH: usize = 64;
const PAGES: usize = 8;

const STATUS_DISPLAY_ON: u8 = 0b0010_0000;

/// One KS0108-style controller driving a 64x64 half of the panel.
///
/// Display RAM is addressed by a y address (0-63, one pixel column) and a
/// page (0-7, eight pixel rows). Each byte is one 8-pixel column slice with
/// bit 0 at the top.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LcdSection {
    ram: [[u8; PAGES]; SECTION_WIDTH],
    y: u8,
    page: u8,
    start_line: u8,
    display_on: bool,
}

impl Default for LcdSection {
    fn default() -> Self {
        Self {
            ram: [[0; PAGES]; SECTION_WIDTH],
            y: 0,
            page: 0,
            start_line: 0,
            display_on: false,
        }
    }
}

impl LcdSection {
    /// Busy and reset states are not modelled.
    pub fn read_status(&self) -> u8 {
        if self.display_on {
            STATUS_DISPLAY_ON
        } else {
            0
        }
    }

    pub fn read_data(&mut self) -> u8 {
        let value = self.ram[self.y as usize][self.page as usize];
        self.advance_y();
        value
    }

    pub fn write_data(&mut self, value: u8) {
        self.ram[self.y as usize][self.page as usize] = value;
        self.advance_y();
    }

    pub fn write_command(&mut self, command: u8) {
        if command & 0b1111_1110 == 0b0011_1110 {
            self.display_on = command & 0x01 != 0;
            log::debug!("LCD display {}", if self.display_on { "on" } else { "off" });
        } else if command & 0b1100_0000 == 0b0100_0000 {
            self.y = command & 0b0011_1111;
        } else if command & 0b1111_1000 == 0b1011_1000 {
            self.page = command & 0b0000_0111;
        } else if command & 0b1100_0000 == 0b1100_0000 {
            self.start_line = command & 0b0011_1111;
            log::debug!("LCD start line {}", self.start_line);
        } else {
            log::debug!("LCD command {:#04X} ignored", command);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    fn advance_y(&mut self) {
        self.y = (self.y + 1) % SECTION_WIDTH as u8;
    }

    /// Draw this half into `frame` starting at column `x_offset`.
    fn render(&self, frame: &mut [u8], x_offset: usize) {
        if !self.display_on {
            return;
        }
        for (y, column) in self.ram.iter().enumerate() {
            let x = x_offset + (y + self.start_line as usize) % SECTION_WIDTH;
            for (page, byte) in column.iter().enumerate() {
                for bit in 0..8 {
                    let row = page * 8 + bit;
                    frame[row * SCREEN_WIDTH + x] = (byte >> bit) & 0x01;
                }
            }
        }
    }
}

/// The 128x64 panel: two controllers side by side.
///
/// Port offsets: 0 left status/command, 1 left data, 2 right
/// status/command, 3 right data.
#[derive(Clone, Debug, Default)]
pub struct Lcd {
    left: LcdSection,
    right: LcdSection,
}

impl Lcd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left(&self) -> &LcdSection {
        &self.left
    }

    pub fn right(&self) -> &LcdSection {
        &self.right
    }

    /// Row-major 128x64 buffer, one byte per pixel, 1 = pixel set.
    pub fn framebuffer(&self) -> Vec<u8> {
        let mut frame = vec![0; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.left.render(&mut frame, 0);
        self.right.render(&mut frame, SECTION_WIDTH);
        frame
    }
}

impl Device for Lcd {
    fn read(&mut self, offset: u16) -> u8 {
        match offset % 4 {
            0 => self.left.read_status(),
            1 => self.left.read_data(),
            2 => self.right.read_status(),
            _ => self.right.read_data(),
        }
    }

    fn write(&mut self, offset: u16, value: u8) {
        match offset % 4 {
            0 => self.left.write_command(value),
            1 => self.left.write_data(value),
            2 => self.right.write_command(value),
            _ => self.right.write_data(value),
        }
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_writes_advance_y_and_wrap() {
        let mut section = LcdSection::default();
        section.write_command(0x40 | 63);
        section.write_data(0xAA);
        section.write_data(0x55);

        section.write_command(0x40 | 63);
        assert_eq!(section.read_data(), 0xAA);
        assert_eq!(section.read_data(), 0x55);
    }

    #[test]
    fn status_reports_display_on() {
        let mut lcd = Lcd::new();
        assert_eq!(lcd.read(0), 0x00);
        lcd.write(0, 0x3F);
        assert_eq!(lcd.read(0), 0x20);
        assert_eq!(lcd.read(2), 0x00);
        lcd.write(0, 0x3E);
        assert_eq!(lcd.read(0), 0x00);
    }

    #[test]
    fn framebuffer_maps_pages_to_rows_and_y_to_columns() {
        let mut lcd = Lcd::new();
        // Left: display on, page 1, y 3, bits 0 and 7.
        lcd.write(0, 0x3F);
        lcd.write(0, 0xB8 | 1);
        lcd.write(0, 0x40 | 3);
        lcd.write(1, 0x81);
        // Right: display on, start line 2, page 0, y 63, bit 2.
        lcd.write(2, 0x3F);
        lcd.write(2, 0xC0 | 2);
        lcd.write(2, 0xB8);
        lcd.write(2, 0x40 | 63);
        lcd.write(3, 0x04);

        let frame = lcd.framebuffer();
        assert_eq!(frame.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
        assert_eq!(frame[8 * SCREEN_WIDTH + 3], 1);
        assert_eq!(frame[15 * SCREEN_WIDTH + 3], 1);
        // (63 + 2) % 64 = 1, shifted into the right half.
        assert_eq!(frame[2 * SCREEN_WIDTH + 64 + 1], 1);
        assert_eq!(frame.iter().filter(|&&p| p != 0).count(), 3);
    }

    #[test]
    fn display_off_renders_blank() {
        let mut lcd = Lcd::new();
        lcd.write(1, 0xFF);
        assert!(lcd.framebuffer().iter().all(|&p| p == 0));
    }

    #[test]
    fn state_is_empty() {
        let mut lcd = Lcd::new();
        assert_eq!(lcd.state_len(), 0);
        assert!(lcd.save_state().is_empty());
        assert!(lcd.load_state(&[]).is_ok());
        assert!(lcd.load_state(&[1]).is_err());
    }
}
