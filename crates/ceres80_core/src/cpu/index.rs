use super::{AccessKind, Bus, Cpu, Prefix};

/// Which index register a DD/FD prefix selects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum IndexReg {
    Ix,
    Iy,
}

impl IndexReg {
    fn prefix(self) -> Prefix {
        match self {
            IndexReg::Ix => Prefix::Dd,
            IndexReg::Iy => Prefix::Fd,
        }
    }

    fn bit_prefix(self) -> Prefix {
        match self {
            IndexReg::Ix => Prefix::DdCb,
            IndexReg::Iy => Prefix::FdCb,
        }
    }
}

/// Extra cost of an index prefix in front of an instruction that ignores it.
const PREFIX_CYCLES: u32 = 4;

impl Cpu {
    #[inline]
    fn index(&self, reg: IndexReg) -> u16 {
        match reg {
            IndexReg::Ix => self.regs.ix,
            IndexReg::Iy => self.regs.iy,
        }
    }

    #[inline]
    fn set_index(&mut self, reg: IndexReg, value: u16) {
        match reg {
            IndexReg::Ix => self.regs.ix = value,
            IndexReg::Iy => self.regs.iy = value,
        }
    }

    /// Fetch the displacement byte and form `IX+d` / `IY+d`.
    fn indexed_addr<B: Bus>(&mut self, bus: &mut B, reg: IndexReg) -> u16 {
        let d = self.fetch8(bus) as i8;
        self.index(reg).wrapping_add_signed(d as i16)
    }

    /// Register field read with H/L replaced by the index halves
    /// (undocumented IXH/IXL/IYH/IYL). Code 6 never reaches here.
    fn read_reg8_index(&self, reg: IndexReg, code: u8) -> u8 {
        let [hi, lo] = self.index(reg).to_be_bytes();
        match code {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => hi,
            5 => lo,
            _ => self.regs.a,
        }
    }

    fn write_reg8_index(&mut self, reg: IndexReg, code: u8, value: u8) {
        let [hi, lo] = self.index(reg).to_be_bytes();
        match code {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.set_index(reg, u16::from_be_bytes([value, lo])),
            5 => self.set_index(reg, u16::from_be_bytes([hi, value])),
            _ => self.regs.a = value,
        }
    }

    /// Handle DD/FD-prefixed instructions.
    ///
    /// HL becomes IX/IY, `(HL)` becomes `(IX+d)`, and H/L become the index
    /// halves when no memory operand is involved. Opcodes that do not touch
    /// HL run unprefixed with 4 extra cycles.
    pub(super) fn exec_index<B: Bus>(&mut self, bus: &mut B, reg: IndexReg) -> u32 {
        let op = self.fetch_opcode(bus);
        self.decoded = (reg.prefix(), op);

        match op {
            // ADD IX,rr with rr = BC, DE, IX, SP.
            0x09 | 0x19 | 0x29 | 0x39 => {
                let base = self.index(reg);
                let value = match (op >> 4) & 0x03 {
                    2 => base,
                    p => self.read_rp(p),
                };
                let result = self.add16(base, value);
                self.set_index(reg, result);
                15
            }
            0x21 => {
                let value = self.fetch16(bus);
                self.set_index(reg, value);
                14
            }
            0x22 => {
                let addr = self.fetch16(bus);
                let value = self.index(reg);
                self.write16(bus, addr, value);
                20
            }
            0x2A => {
                let addr = self.fetch16(bus);
                let value = self.read16(bus, addr);
                self.set_index(reg, value);
                20
            }
            0x23 => {
                let value = self.index(reg).wrapping_add(1);
                self.set_index(reg, value);
                10
            }
            0x2B => {
                let value = self.index(reg).wrapping_sub(1);
                self.set_index(reg, value);
                10
            }

            // INC/DEC/LD n on IXH/IXL.
            0x24 | 0x2C => {
                let code = (op >> 3) & 0x07;
                let value = self.read_reg8_index(reg, code);
                let result = self.inc8(value);
                self.write_reg8_index(reg, code, result);
                8
            }
            0x25 | 0x2D => {
                let code = (op >> 3) & 0x07;
                let value = self.read_reg8_index(reg, code);
                let result = self.dec8(value);
                self.write_reg8_index(reg, code, result);
                8
            }
            0x26 | 0x2E => {
                let value = self.fetch8(bus);
                self.write_reg8_index(reg, (op >> 3) & 0x07, value);
                11
            }

            // INC/DEC/LD n on (IX+d).
            0x34 | 0x35 => {
                let addr = self.indexed_addr(bus, reg);
                let value = self.read8(bus, addr);
                let result = if op == 0x34 {
                    self.inc8(value)
                } else {
                    self.dec8(value)
                };
                self.write8(bus, addr, result);
                23
            }
            0x36 => {
                let addr = self.indexed_addr(bus, reg);
                let value = self.fetch8(bus);
                self.write8(bus, addr, value);
                19
            }

            // LD r,r' block. (IX+d) operands pair with plain H/L.
            0x40..=0x7F if op != 0x76 => {
                let dst = (op >> 3) & 0x07;
                let src = op & 0x07;
                if src == 6 {
                    let addr = self.indexed_addr(bus, reg);
                    let value = self.read8(bus, addr);
                    self.write_reg8(bus, dst, value);
                    19
                } else if dst == 6 {
                    let addr = self.indexed_addr(bus, reg);
                    let value = self.read_reg8(bus, src);
                    self.write8(bus, addr, value);
                    19
                } else if matches!(dst, 4 | 5) || matches!(src, 4 | 5) {
                    let value = self.read_reg8_index(reg, src);
                    self.write_reg8_index(reg, dst, value);
                    8
                } else {
                    self.exec_main(bus, op) + PREFIX_CYCLES
                }
            }

            // ALU A,r block.
            0x80..=0xBF => {
                let alu = (op >> 3) & 0x07;
                let src = op & 0x07;
                match src {
                    6 => {
                        let addr = self.indexed_addr(bus, reg);
                        let value = self.read8(bus, addr);
                        self.alu_a(alu, value);
                        19
                    }
                    4 | 5 => {
                        let value = self.read_reg8_index(reg, src);
                        self.alu_a(alu, value);
                        8
                    }
                    _ => self.exec_main(bus, op) + PREFIX_CYCLES,
                }
            }

            0xCB => self.exec_index_cb(bus, reg),

            0xE1 => {
                let value = self.pop_u16(bus);
                self.set_index(reg, value);
                14
            }
            0xE5 => {
                let value = self.index(reg);
                self.push_u16(bus, value);
                15
            }
            0xE3 => {
                // EX (SP),IX
                let sp = self.regs.sp;
                let value = self.read16(bus, sp);
                let index = self.index(reg);
                self.write16(bus, sp, index);
                self.set_index(reg, value);
                23
            }
            0xE9 => {
                self.regs.pc = self.index(reg);
                8
            }
            0xF9 => {
                self.regs.sp = self.index(reg);
                10
            }

            // A prefix directly followed by another prefix acts as a 4-cycle
            // no-op; the second prefix is decoded on the next step.
            0xDD | 0xFD | 0xED => {
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                PREFIX_CYCLES
            }

            _ => self.exec_main(bus, op) + PREFIX_CYCLES,
        }
    }

    /// DD CB d op / FD CB d op.
    ///
    /// The displacement comes before the final opcode byte and is shared by
    /// every operation. For register codes other than 6 the result is also
    /// copied into that register (undocumented).
    fn exec_index_cb<B: Bus>(&mut self, bus: &mut B, reg: IndexReg) -> u32 {
        let addr = self.indexed_addr(bus, reg);
        let op = bus.read8(self.regs.pc, AccessKind::OpcodeFetch);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.decoded = (reg.bit_prefix(), op);

        let x = op >> 6;
        let y = (op >> 3) & 0x07;
        let z = op & 0x07;
        let value = self.read8(bus, addr);

        if x == 1 {
            self.bit8(y, value);
            return 20;
        }

        let result = match x {
            0 => self.rotate_shift(y, value),
            2 => value & !(1 << y),
            _ => value | (1 << y),
        };
        self.write8(bus, addr, result);
        if z != 6 {
            self.write_reg8(bus, z, result);
        }
        23
    }
}
