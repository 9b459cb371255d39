use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// JR d / JR NZ,d / JR Z,d / JR NC,d / JR C,d
    pub(super) fn exec_jr<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x18 | 0x20 | 0x28 | 0x30 | 0x38));

        let cond = match opcode {
            0x18 => true,
            // y - 4 selects NZ, Z, NC, C.
            _ => self.condition(((opcode >> 3) & 0x07) - 4),
        };
        self.jr(bus, cond)
    }

    pub(super) fn exec_jp<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let cond = opcode == 0xC3 || self.condition((opcode >> 3) & 0x07);
        self.jp_cond(bus, cond)
    }

    /// JP (HL): despite the syntax, no memory access.
    pub(super) fn exec_jp_hl(&mut self) -> u32 {
        self.regs.pc = self.regs.hl();
        4
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let cond = opcode == 0xCD || self.condition((opcode >> 3) & 0x07);
        self.call_cond(bus, cond)
    }

    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.pop_u16(bus);
        10
    }

    pub(super) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let cond = self.condition((opcode >> 3) & 0x07);
        self.ret_cond(bus, cond)
    }

    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        self.rst(bus, (opcode & 0x38) as u16)
    }
}
