use super::{Bus, Cpu, Flags, InterruptMode, Prefix};

/// Direction of a block instruction's HL/DE update.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Step {
    Increment,
    Decrement,
}

impl Step {
    #[inline]
    fn apply(self, value: u16) -> u16 {
        match self {
            Step::Increment => value.wrapping_add(1),
            Step::Decrement => value.wrapping_sub(1),
        }
    }
}

impl Cpu {
    /// Handle ED-prefixed instructions.
    ///
    /// Cycle counts include the prefix fetch.
    pub(super) fn exec_ed<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let op = self.fetch_opcode(bus);
        self.decoded = (Prefix::Ed, op);

        let x = op >> 6;
        let y = (op >> 3) & 0x07;
        let z = op & 0x07;
        let p = y >> 1;
        let q = y & 0x01;

        match (x, z) {
            (1, 0) => self.exec_in_r_c(bus, y),
            (1, 1) => self.exec_out_c_r(bus, y),
            (1, 2) => {
                let hl = self.regs.hl();
                let value = self.read_rp(p);
                let carry = self.regs.flag(Flags::CARRY);
                let result = if q == 0 {
                    self.sbc16(hl, value, carry)
                } else {
                    self.adc16(hl, value, carry)
                };
                self.regs.set_hl(result);
                15
            }
            (1, 3) => {
                let addr = self.fetch16(bus);
                if q == 0 {
                    let value = self.read_rp(p);
                    self.write16(bus, addr, value);
                } else {
                    let value = self.read16(bus, addr);
                    self.write_rp(p, value);
                }
                20
            }
            (1, 4) => {
                self.neg();
                8
            }
            (1, 5) => {
                // RETN / RETI: both restore IFF1 from IFF2 here, since there
                // is no daisy chain to notify.
                self.regs.pc = self.pop_u16(bus);
                self.regs.iff1 = self.regs.iff2;
                14
            }
            (1, 6) => self.exec_im(y),
            (1, 7) => self.exec_ed_misc(bus, y),
            (2, 0..=3) if y >= 4 => self.exec_block(bus, y, z),
            _ => {
                log::warn!(
                    "unknown opcode ED {:02X} at {:04X}, skipped",
                    op,
                    self.regs.pc.wrapping_sub(2)
                );
                0
            }
        }
    }

    /// IN r,(C). Register code 6 only updates flags.
    fn exec_in_r_c<B: Bus>(&mut self, bus: &mut B, reg: u8) -> u32 {
        let value = bus.port_in(self.regs.bc());
        if reg != 6 {
            self.write_reg8(bus, reg, value);
        }
        self.set_szp_keep_carry(value);
        12
    }

    /// OUT (C),r. Register code 6 outputs zero.
    fn exec_out_c_r<B: Bus>(&mut self, bus: &mut B, reg: u8) -> u32 {
        let value = if reg == 6 {
            0
        } else {
            self.read_reg8(bus, reg)
        };
        bus.port_out(self.regs.bc(), value);
        12
    }

    fn exec_im(&mut self, y: u8) -> u32 {
        let mode = match y & 0x03 {
            0 | 1 => InterruptMode::Mode0,
            2 => InterruptMode::Mode1,
            _ => InterruptMode::Mode2,
        };
        if mode != InterruptMode::Mode1 {
            log::warn!("{:?} selected, interrupts are still serviced in mode 1", mode);
        }
        self.interrupt_mode = mode;
        8
    }

    /// LD I,A / LD R,A / LD A,I / LD A,R / RRD / RLD and the two ED NOPs.
    fn exec_ed_misc<B: Bus>(&mut self, bus: &mut B, y: u8) -> u32 {
        match y {
            0 => {
                self.regs.i = self.regs.a;
                9
            }
            1 => {
                self.regs.r = self.regs.a;
                9
            }
            2 | 3 => {
                let value = if y == 2 { self.regs.i } else { self.regs.r };
                self.regs.a = value;
                self.set_szp_keep_carry(value);
                self.regs.set_flag(Flags::PARITY_OVERFLOW, self.regs.iff2);
                9
            }
            4 => {
                // RRD: A low nibble -> (HL) high, (HL) high -> (HL) low,
                // (HL) low -> A low.
                let hl = self.regs.hl();
                let m = self.read8(bus, hl);
                let a = self.regs.a;
                self.write8(bus, hl, (a << 4) | (m >> 4));
                self.regs.a = (a & 0xF0) | (m & 0x0F);
                self.set_szp_keep_carry(self.regs.a);
                18
            }
            5 => {
                // RLD: the same digits rotating the other way.
                let hl = self.regs.hl();
                let m = self.read8(bus, hl);
                let a = self.regs.a;
                self.write8(bus, hl, (m << 4) | (a & 0x0F));
                self.regs.a = (a & 0xF0) | (m >> 4);
                self.set_szp_keep_carry(self.regs.a);
                18
            }
            _ => 8,
        }
    }

    /// LDI/CPI/INI/OUTI, their decrementing forms and the repeating
    /// variants. `y` 4/5 = single increment/decrement, 6/7 = repeat.
    fn exec_block<B: Bus>(&mut self, bus: &mut B, y: u8, z: u8) -> u32 {
        let step = if y & 0x01 == 0 {
            Step::Increment
        } else {
            Step::Decrement
        };
        let repeat = y >= 6;

        let again = match z {
            0 => self.block_ld(bus, step),
            1 => self.block_cp(bus, step),
            2 => self.block_in(bus, step),
            _ => self.block_out(bus, step),
        };

        if repeat && again {
            self.repeating = true;
        }
        16
    }

    /// One LDI/LDD transfer. Returns whether a repeat should continue.
    fn block_ld<B: Bus>(&mut self, bus: &mut B, step: Step) -> bool {
        let hl = self.regs.hl();
        let de = self.regs.de();
        let value = self.read8(bus, hl);
        self.write8(bus, de, value);

        self.regs.set_hl(step.apply(hl));
        self.regs.set_de(step.apply(de));
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        self.regs.set_flag(Flags::HALF_CARRY, false);
        self.regs.set_flag(Flags::SUBTRACT, false);
        self.regs.set_flag(Flags::PARITY_OVERFLOW, bc != 0);
        bc != 0
    }

    /// One CPI/CPD compare. Repeats stop on a match as well as on BC = 0.
    fn block_cp<B: Bus>(&mut self, bus: &mut B, step: Step) -> bool {
        let hl = self.regs.hl();
        let value = self.read8(bus, hl);
        let a = self.regs.a;
        let result = a.wrapping_sub(value);

        self.regs.set_hl(step.apply(hl));
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        self.regs.set_flag(Flags::SIGN, result & 0x80 != 0);
        self.regs.set_flag(Flags::ZERO, result == 0);
        self.regs.set_flag(Flags::HALF_CARRY, (a & 0x0F) < (value & 0x0F));
        self.regs.set_flag(Flags::SUBTRACT, true);
        self.regs.set_flag(Flags::PARITY_OVERFLOW, bc != 0);
        bc != 0 && result != 0
    }

    /// One INI/IND: port (C) -> (HL), B counts down.
    fn block_in<B: Bus>(&mut self, bus: &mut B, step: Step) -> bool {
        let value = bus.port_in(self.regs.bc());
        let hl = self.regs.hl();
        self.write8(bus, hl, value);
        self.regs.set_hl(step.apply(hl));
        self.regs.b = self.regs.b.wrapping_sub(1);

        self.regs.set_flag(Flags::SUBTRACT, true);
        self.regs.set_flag(Flags::ZERO, self.regs.b == 0);
        self.regs.b != 0
    }

    /// One OUTI/OUTD: (HL) -> port (C). B is decremented before it goes
    /// out on the upper address lines.
    fn block_out<B: Bus>(&mut self, bus: &mut B, step: Step) -> bool {
        let hl = self.regs.hl();
        let value = self.read8(bus, hl);
        self.regs.b = self.regs.b.wrapping_sub(1);
        bus.port_out(self.regs.bc(), value);
        self.regs.set_hl(step.apply(hl));

        self.regs.set_flag(Flags::SUBTRACT, true);
        self.regs.set_flag(Flags::ZERO, self.regs.b == 0);
        self.regs.b != 0
    }
}
