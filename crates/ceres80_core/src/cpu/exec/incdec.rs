use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_inc8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let reg = (opcode >> 3) & 0x07;
        let value = self.read_reg8(bus, reg);
        let result = self.inc8(value);
        self.write_reg8(bus, reg, result);

        if reg == 6 {
            11
        } else {
            4
        }
    }

    pub(super) fn exec_dec8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let reg = (opcode >> 3) & 0x07;
        let value = self.read_reg8(bus, reg);
        let result = self.dec8(value);
        self.write_reg8(bus, reg, result);

        if reg == 6 {
            11
        } else {
            4
        }
    }

    /// INC rr: no flags.
    pub(super) fn exec_inc16(&mut self, opcode: u8) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let value = self.read_rp(rp).wrapping_add(1);
        self.write_rp(rp, value);
        6
    }

    /// DEC rr: no flags.
    pub(super) fn exec_dec16(&mut self, opcode: u8) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let value = self.read_rp(rp).wrapping_sub(1);
        self.write_rp(rp, value);
        6
    }
}
