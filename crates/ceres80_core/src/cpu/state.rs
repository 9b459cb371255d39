use super::{Cpu, InterruptMode, Prefix};
use crate::error::StateError;

/// Size of the CPU save-state block.
pub const CPU_STATE_LEN: usize = 32;

impl Cpu {
    /// Serialize the register file and core flags.
    ///
    /// Layout: A F B C D E H L, A' F' B' C' D' E' H' L', IX IY SP PC
    /// (little-endian), I, R, IFF1, IFF2, interrupt mode, halted, EI delay,
    /// repeat.
    pub fn save_state(&self) -> Vec<u8> {
        let r = &self.regs;
        let mut out = Vec::with_capacity(CPU_STATE_LEN);
        out.extend_from_slice(&[r.a, r.f, r.b, r.c, r.d, r.e, r.h, r.l]);
        for pair in [r.af_alt, r.bc_alt, r.de_alt, r.hl_alt] {
            out.extend_from_slice(&pair.to_be_bytes());
        }
        for word in [r.ix, r.iy, r.sp, r.pc] {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.extend_from_slice(&[
            r.i,
            r.r,
            r.iff1 as u8,
            r.iff2 as u8,
            self.interrupt_mode as u8,
            self.halted as u8,
            self.ei_delay as u8,
            self.repeating as u8,
        ]);
        out
    }

    /// Restore a block written by [`Cpu::save_state`]. The CPU is left
    /// untouched when the length is wrong.
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        if data.len() != CPU_STATE_LEN {
            return Err(StateError::LengthMismatch {
                expected: CPU_STATE_LEN,
                actual: data.len(),
            });
        }

        let word_be = |i: usize| u16::from_be_bytes([data[i], data[i + 1]]);
        let word_le = |i: usize| u16::from_le_bytes([data[i], data[i + 1]]);

        let r = &mut self.regs;
        r.a = data[0];
        r.f = data[1];
        r.b = data[2];
        r.c = data[3];
        r.d = data[4];
        r.e = data[5];
        r.h = data[6];
        r.l = data[7];
        r.af_alt = word_be(8);
        r.bc_alt = word_be(10);
        r.de_alt = word_be(12);
        r.hl_alt = word_be(14);
        r.ix = word_le(16);
        r.iy = word_le(18);
        r.sp = word_le(20);
        r.pc = word_le(22);
        r.i = data[24];
        r.r = data[25];
        r.iff1 = data[26] != 0;
        r.iff2 = data[27] != 0;

        self.interrupt_mode = match data[28] {
            1 => InterruptMode::Mode1,
            2 => InterruptMode::Mode2,
            _ => InterruptMode::Mode0,
        };
        self.halted = data[29] != 0;
        self.ei_delay = data[30] != 0;
        self.repeating = data[31] != 0;
        self.decoded = (Prefix::None, 0);
        Ok(())
    }
}
