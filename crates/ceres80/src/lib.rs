use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use ceres80_core::cpu::Registers;
use ceres80_core::{Ceres80, SCREEN_HEIGHT, SCREEN_WIDTH};

pub mod controller;

pub use controller::{ControllerConfig, ControllerError, ControllerEvent, EmulatorController};

pub const DEFAULT_FRAMES: u32 = 60;

/// Build a machine and load the ROM image, plus an optional RAM image.
pub fn load_machine(rom_path: &Path, ram_path: Option<&Path>) -> anyhow::Result<Ceres80> {
    let mut machine = Ceres80::new().context("failed to build the Ceres80 board")?;

    let rom = std::fs::read(rom_path)
        .with_context(|| format!("failed to read ROM image '{}'", rom_path.display()))?;
    machine
        .load_rom(&rom)
        .with_context(|| format!("failed to load ROM image '{}'", rom_path.display()))?;

    if let Some(ram_path) = ram_path {
        let ram = std::fs::read(ram_path)
            .with_context(|| format!("failed to read RAM image '{}'", ram_path.display()))?;
        machine
            .load_ram(&ram)
            .with_context(|| format!("failed to load RAM image '{}'", ram_path.display()))?;
    }

    Ok(machine)
}

/// Run up to `frames` frames without pacing. Returns the number of frames
/// actually run.
///
/// Stops early once the CPU is halted with interrupts disabled, since
/// nothing can wake it. A halt with interrupts enabled is just a wait for
/// the CTC.
pub fn run_headless(machine: &mut Ceres80, frames: u32) -> u32 {
    let mut ran = 0;
    while ran < frames && !halted_for_good(machine) {
        machine.run_frame();
        ran += 1;
    }
    log::info!("ran {} of {} frames", ran, frames);
    ran
}

fn halted_for_good(machine: &Ceres80) -> bool {
    machine.cpu().halted && !machine.registers().iff1
}

/// Render a framebuffer as text, one line per pixel row: `#` set, `.` clear.
pub fn render_ascii(frame: &[u8]) -> String {
    let mut out = String::with_capacity((SCREEN_WIDTH + 1) * SCREEN_HEIGHT);
    for row in frame.chunks(SCREEN_WIDTH).take(SCREEN_HEIGHT) {
        out.extend(row.iter().map(|&pixel| if pixel != 0 { '#' } else { '.' }));
        out.push('\n');
    }
    out
}

pub fn format_registers(regs: &Registers) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "AF={:04X} BC={:04X} DE={:04X} HL={:04X}",
        regs.af(),
        regs.bc(),
        regs.de(),
        regs.hl()
    );
    let _ = writeln!(
        out,
        "AF'={:04X} BC'={:04X} DE'={:04X} HL'={:04X}",
        regs.af_alt, regs.bc_alt, regs.de_alt, regs.hl_alt
    );
    let _ = writeln!(
        out,
        "IX={:04X} IY={:04X} SP={:04X} PC={:04X}",
        regs.ix, regs.iy, regs.sp, regs.pc
    );
    let _ = write!(
        out,
        "I={:02X} R={:02X} IFF1={} IFF2={}",
        regs.i, regs.r, regs.iff1 as u8, regs.iff2 as u8
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_with(program: &[u8]) -> Ceres80 {
        let mut machine = Ceres80::new().unwrap();
        machine.load_rom(program).unwrap();
        machine
    }

    #[test]
    fn headless_run_stops_on_final_halt() {
        // LD A,5 ; HALT
        let mut machine = machine_with(&[0x3E, 0x05, 0x76]);
        assert_eq!(run_headless(&mut machine, 10), 1);
        assert_eq!(machine.registers().a, 5);
    }

    #[test]
    fn headless_run_keeps_going_through_interruptible_halt() {
        // EI ; HALT ; JR -3
        let mut machine = machine_with(&[0xFB, 0x76, 0x18, 0xFD]);
        assert_eq!(run_headless(&mut machine, 3), 3);
        assert!(machine.cpu().halted);
    }

    #[test]
    fn ascii_render_has_one_line_per_row() {
        let mut frame = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT];
        frame[0] = 1;
        frame[SCREEN_WIDTH + 2] = 1;

        let text = render_ascii(&frame);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), SCREEN_HEIGHT);
        assert!(lines.iter().all(|line| line.len() == SCREEN_WIDTH));
        assert!(lines[0].starts_with("#..."));
        assert!(lines[1].starts_with("..#."));
        assert_eq!(text.matches('#').count(), 2);
    }

    #[test]
    fn registers_are_formatted_in_hex() {
        let mut machine = machine_with(&[0x21, 0x34, 0x12, 0x76]); // LD HL,0x1234
        run_headless(&mut machine, 1);

        let text = format_registers(machine.registers());
        assert!(text.contains("HL=1234"), "{text}");
        assert!(text.contains("PC=0004"), "{text}");
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn missing_rom_reports_the_path() {
        let err = load_machine(Path::new("/nonexistent/ceres80.rom"), None)
            .err()
            .expect("loading a missing ROM should fail");
        assert!(format!("{err:#}").contains("/nonexistent/ceres80.rom"));
    }
}
