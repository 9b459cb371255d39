use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP A,r (0x80..=0xBF).
    pub(super) fn exec_alu_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!((0x80..=0xBF).contains(&opcode));

        let op = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        let value = self.read_reg8(bus, src);
        self.alu_a(op, value);

        if src == 6 {
            7
        } else {
            4
        }
    }

    /// ALU A,n
    pub(super) fn exec_alu_n<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(opcode & 0xC7 == 0xC6);

        let value = self.fetch8(bus);
        self.alu_a((opcode >> 3) & 0x07, value);
        7
    }

    pub(super) fn exec_add_hl_rr(&mut self, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x09 | 0x19 | 0x29 | 0x39));

        let value = self.read_rp((opcode >> 4) & 0x03);
        let hl = self.regs.hl();
        let result = self.add16(hl, value);
        self.regs.set_hl(result);
        11
    }

    pub(super) fn exec_rotate_a(&mut self, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x07 | 0x0F | 0x17 | 0x1F));

        self.rotate_a((opcode >> 3) & 0x03);
        4
    }

    pub(super) fn exec_misc_a(&mut self, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x27 | 0x2F | 0x37 | 0x3F));

        match opcode {
            0x27 => self.daa(),
            0x2F => self.cpl(),
            0x37 => self.scf(),
            _ => self.ccf(),
        }
        4
    }
}
