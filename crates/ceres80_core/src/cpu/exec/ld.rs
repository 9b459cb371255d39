use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_ld_rr_nn<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x01 | 0x11 | 0x21 | 0x31));

        let value = self.fetch16(bus);
        self.write_rp((opcode >> 4) & 0x03, value);
        10
    }

    pub(super) fn exec_ld_indirect_a<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x02 | 0x12 | 0x22 | 0x32));

        match opcode {
            0x02 => {
                let addr = self.regs.bc();
                self.write8(bus, addr, self.regs.a);
                7
            }
            0x12 => {
                let addr = self.regs.de();
                self.write8(bus, addr, self.regs.a);
                7
            }
            0x22 => {
                let addr = self.fetch16(bus);
                let hl = self.regs.hl();
                self.write16(bus, addr, hl);
                16
            }
            _ => {
                let addr = self.fetch16(bus);
                self.write8(bus, addr, self.regs.a);
                13
            }
        }
    }

    pub(super) fn exec_ld_a_indirect<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x0A | 0x1A | 0x2A | 0x3A));

        match opcode {
            0x0A => {
                let addr = self.regs.bc();
                self.regs.a = self.read8(bus, addr);
                7
            }
            0x1A => {
                let addr = self.regs.de();
                self.regs.a = self.read8(bus, addr);
                7
            }
            0x2A => {
                let addr = self.fetch16(bus);
                let value = self.read16(bus, addr);
                self.regs.set_hl(value);
                16
            }
            _ => {
                let addr = self.fetch16(bus);
                self.regs.a = self.read8(bus, addr);
                13
            }
        }
    }

    pub(super) fn exec_ld_r_n<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(
            opcode,
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E
        ));

        let reg = (opcode >> 3) & 0x07;
        let value = self.fetch8(bus);
        self.write_reg8(bus, reg, value);

        if reg == 6 {
            10
        } else {
            7
        }
    }

    /// LD r,r' for 0x40..=0x7F, except 0x76 (HALT).
    pub(super) fn exec_ld_r_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!((0x40..=0x7F).contains(&opcode) && opcode != 0x76);

        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        let value = self.read_reg8(bus, src);
        self.write_reg8(bus, dst, value);

        if dst == 6 || src == 6 {
            7
        } else {
            4
        }
    }

    pub(super) fn exec_ld_sp_hl(&mut self) -> u32 {
        self.regs.sp = self.regs.hl();
        6
    }

    pub(super) fn exec_exchange<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x08 | 0xD9 | 0xEB | 0xE3));

        match opcode {
            0x08 => {
                self.regs.exchange_af();
                4
            }
            0xD9 => {
                self.regs.exchange_all();
                4
            }
            0xEB => {
                self.regs.exchange_de_hl();
                4
            }
            _ => {
                // EX (SP),HL
                let sp = self.regs.sp;
                let value = self.read16(bus, sp);
                let hl = self.regs.hl();
                self.write16(bus, sp, hl);
                self.regs.set_hl(value);
                19
            }
        }
    }
}
