mod alu;
mod bus;
mod cb;
pub mod disasm;
mod ed;
mod exec;
mod helpers;
mod index;
mod regs;
mod state;

pub use bus::{AccessKind, Bus};
pub use disasm::Prefix;
pub use regs::{Flags, Registers};
pub use state::CPU_STATE_LEN;

use crate::interrupts::InterruptManager;

/// Fixed restart address used by interrupt mode 1.
pub const INTERRUPT_VECTOR: u16 = 0x0038;

const INTERRUPT_CYCLES: u32 = 13;
const HALT_CYCLES: u32 = 4;
/// Extra cost of a block instruction that loops back onto itself.
const REPEAT_CYCLES: u32 = 5;

/// Interrupt mode selected by `IM 0/1/2`.
///
/// The board wires the CTC for mode 1 only. The other modes are remembered
/// so that `IM` round-trips through save states, but interrupts are always
/// serviced as mode 1.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InterruptMode {
    #[default]
    Mode0,
    Mode1,
    Mode2,
}

/// Zilog Z80 core.
///
/// `step` executes one instruction (or accepts one interrupt) and returns
/// the number of T-cycles it took. Peripherals are not ticked here; the
/// owning machine ticks them afterwards, cycle by cycle.
#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub regs: Registers,
    pub halted: bool,
    /// Set by `EI`; shields the following instruction from interrupts.
    ei_delay: bool,
    /// Set by a repeating block instruction whose loop condition holds.
    repeating: bool,
    interrupt_mode: InterruptMode,
    /// Prefix and final opcode byte of the instruction being executed.
    decoded: (Prefix, u8),
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the CPU to its power-on state: every register zero, interrupts
    /// disabled, mode 0.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.halted = false;
        self.ei_delay = false;
        self.repeating = false;
        self.interrupt_mode = InterruptMode::Mode0;
        self.decoded = (Prefix::None, 0);
    }

    pub fn interrupt_mode(&self) -> InterruptMode {
        self.interrupt_mode
    }

    /// Prefix and opcode of the most recently decoded instruction.
    pub fn last_decoded(&self) -> (Prefix, u8) {
        self.decoded
    }

    /// Execute a single instruction, or accept a pending interrupt, and
    /// return the number of T-cycles consumed.
    ///
    /// A return value of 0 means an unassigned opcode was skipped.
    pub fn step<B: Bus>(&mut self, bus: &mut B, irq: &mut InterruptManager) -> u32 {
        // An EI executed during the previous step protects exactly this one.
        let ei_shield = std::mem::take(&mut self.ei_delay);

        if irq.is_interrupt_pending() && self.regs.iff1 && !ei_shield {
            return self.service_interrupt(bus, irq);
        }

        if self.halted {
            // PC already points past the HALT opcode.
            return HALT_CYCLES;
        }

        let start = self.regs.pc;
        bus.begin_instruction(start);
        self.repeating = false;

        let opcode = self.fetch_opcode(bus);
        let mut cycles = self.exec_opcode(bus, opcode);

        self.increment_refresh();

        if self.repeating {
            self.regs.pc = start;
            cycles += REPEAT_CYCLES;
        }

        let mnemonic = if bus.tracing() {
            disasm::mnemonic(self.decoded.0, self.decoded.1)
        } else {
            ""
        };
        bus.end_instruction(start, mnemonic, cycles);
        cycles
    }

    /// Mode 1 interrupt entry: push PC and restart at 0x0038.
    fn service_interrupt<B: Bus>(&mut self, bus: &mut B, irq: &mut InterruptManager) -> u32 {
        let return_pc = self.regs.pc;
        bus.begin_instruction(return_pc);

        self.halted = false;
        self.push_u16(bus, return_pc);
        self.regs.pc = INTERRUPT_VECTOR;
        irq.acknowledge_interrupt();
        self.regs.iff1 = false;
        self.regs.iff2 = false;

        bus.interrupt_accepted(return_pc);
        let mnemonic = if bus.tracing() {
            disasm::INTERRUPT_MNEMONIC
        } else {
            ""
        };
        bus.end_instruction(return_pc, mnemonic, INTERRUPT_CYCLES);
        INTERRUPT_CYCLES
    }

    /// R counts in its low seven bits; bit 7 only changes via `LD R,A`.
    #[inline]
    fn increment_refresh(&mut self) {
        let r = self.regs.r;
        self.regs.r = (r & 0x80) | (r.wrapping_add(1) & 0x7F);
    }
}
