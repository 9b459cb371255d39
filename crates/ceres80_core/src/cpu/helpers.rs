use super::{AccessKind, Bus, Cpu, Flags};

impl Cpu {
    /// Helper to read an 8-bit register or (HL) by index.
    ///
    /// The encoding matches the Z80 register field used by opcode tables:
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.
    #[inline]
    pub(super) fn read_reg8<B: Bus>(&mut self, bus: &mut B, index: u8) -> u8 {
        match index {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => bus.read8(self.regs.hl(), AccessKind::Standard),
            _ => self.regs.a,
        }
    }

    /// Helper to write an 8-bit register or (HL) by index.
    ///
    /// The encoding matches `read_reg8`.
    #[inline]
    pub(super) fn write_reg8<B: Bus>(&mut self, bus: &mut B, index: u8, value: u8) {
        match index {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            6 => bus.write8(self.regs.hl(), value, AccessKind::Standard),
            _ => self.regs.a = value,
        }
    }

    /// Register pair by the `p` field: 0=BC, 1=DE, 2=HL, 3=SP.
    #[inline]
    pub(super) fn read_rp(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    #[inline]
    pub(super) fn write_rp(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    /// Register pair for PUSH/POP: as `read_rp` but 3=AF.
    #[inline]
    pub(super) fn read_rp2(&self, index: u8) -> u16 {
        match index & 0x03 {
            3 => self.regs.af(),
            p => self.read_rp(p),
        }
    }

    #[inline]
    pub(super) fn write_rp2(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            3 => self.regs.set_af(value),
            p => self.write_rp(p, value),
        }
    }

    /// Condition by the `y` field: NZ, Z, NC, C, PO, PE, P, M.
    pub(super) fn condition(&self, index: u8) -> bool {
        let f = self.regs.flags();
        match index & 0x07 {
            0 => !f.contains(Flags::ZERO),
            1 => f.contains(Flags::ZERO),
            2 => !f.contains(Flags::CARRY),
            3 => f.contains(Flags::CARRY),
            4 => !f.contains(Flags::PARITY_OVERFLOW),
            5 => f.contains(Flags::PARITY_OVERFLOW),
            6 => !f.contains(Flags::SIGN),
            _ => f.contains(Flags::SIGN),
        }
    }

    /// Fetch an opcode or prefix byte.
    #[inline]
    pub(super) fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc, AccessKind::OpcodeFetch);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Fetch an operand byte.
    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc, AccessKind::Immediate);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    #[inline]
    pub(super) fn read8<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        bus.read8(addr, AccessKind::Standard)
    }

    #[inline]
    pub(super) fn write8<B: Bus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        bus.write8(addr, value, AccessKind::Standard);
    }

    pub(super) fn read16<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let lo = bus.read8(addr, AccessKind::Standard);
        let hi = bus.read8(addr.wrapping_add(1), AccessKind::Standard);
        u16::from_le_bytes([lo, hi])
    }

    pub(super) fn write16<B: Bus>(&mut self, bus: &mut B, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        bus.write8(addr, lo, AccessKind::Standard);
        bus.write8(addr.wrapping_add(1), hi, AccessKind::Standard);
    }

    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        // Stack grows downward: memory[SP] = low, memory[SP+1] = high.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi, AccessKind::Stack);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo, AccessKind::Stack);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp, AccessKind::Stack);
        let hi = bus.read8(self.regs.sp.wrapping_add(1), AccessKind::Stack);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }

    /// Relative jump helper used by JR/JR cc.
    ///
    /// The displacement is a signed 8-bit offset relative to the address
    /// following the operand.
    pub(super) fn jr<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        let offset = self.fetch8(bus) as i8;
        if cond {
            self.regs.pc = self.regs.pc.wrapping_add_signed(offset as i16);
            12
        } else {
            7
        }
    }

    /// `DJNZ d`: decrement B and jump while it is non-zero.
    pub(super) fn djnz<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.b = self.regs.b.wrapping_sub(1);
        let offset = self.fetch8(bus) as i8;
        if self.regs.b != 0 {
            self.regs.pc = self.regs.pc.wrapping_add_signed(offset as i16);
            13
        } else {
            8
        }
    }

    /// Absolute jump helper used by JP nn and JP cc,nn.
    ///
    /// The operand is always fetched, so both outcomes cost the same.
    pub(super) fn jp_cond<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        let addr = self.fetch16(bus);
        if cond {
            self.regs.pc = addr;
        }
        10
    }

    /// Call helper used by CALL nn and CALL cc,nn.
    pub(super) fn call_cond<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        let addr = self.fetch16(bus);
        if cond {
            let ret = self.regs.pc;
            self.push_u16(bus, ret);
            self.regs.pc = addr;
            17
        } else {
            10
        }
    }

    /// Conditional return helper used by RET cc.
    pub(super) fn ret_cond<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        if cond {
            self.regs.pc = self.pop_u16(bus);
            11
        } else {
            5
        }
    }

    /// `RST p`: push PC and jump to one of the eight page-zero vectors.
    pub(super) fn rst<B: Bus>(&mut self, bus: &mut B, vector: u16) -> u32 {
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = vector;
        11
    }
}
