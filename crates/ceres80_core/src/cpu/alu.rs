use super::{Cpu, Flags};

/// Sign, zero and even-parity flags for an 8-bit result.
#[inline]
fn szp(value: u8) -> Flags {
    let mut f = Flags::empty();
    f.set(Flags::SIGN, value & 0x80 != 0);
    f.set(Flags::ZERO, value == 0);
    f.set(Flags::PARITY_OVERFLOW, value.count_ones() % 2 == 0);
    f
}

impl Cpu {
    /// Core 8-bit ADD/ADC.
    ///
    /// `carry` is the incoming carry (always false for ADD).
    pub(super) fn add8(&mut self, a: u8, b: u8, carry: bool) -> u8 {
        let c = carry as u8;
        let full = a as u16 + b as u16 + c as u16;
        let result = full as u8;

        let mut f = Flags::empty();
        f.set(Flags::SIGN, result & 0x80 != 0);
        f.set(Flags::ZERO, result == 0);
        f.set(Flags::HALF_CARRY, (a & 0x0F) + (b & 0x0F) + c > 0x0F);
        // Overflow: both operands share a sign the result does not.
        f.set(Flags::PARITY_OVERFLOW, (!(a ^ b) & (a ^ result) & 0x80) != 0);
        f.set(Flags::CARRY, full > 0xFF);
        self.regs.set_flags(f);
        result
    }

    /// Core 8-bit SUB/SBC.
    ///
    /// `carry` is the incoming borrow (always false for SUB and CP).
    pub(super) fn sub8(&mut self, a: u8, b: u8, carry: bool) -> u8 {
        let c = carry as u8;
        let result = a.wrapping_sub(b).wrapping_sub(c);

        let mut f = Flags::SUBTRACT;
        f.set(Flags::SIGN, result & 0x80 != 0);
        f.set(Flags::ZERO, result == 0);
        f.set(Flags::HALF_CARRY, (a & 0x0F) < (b & 0x0F) + c);
        // Overflow: operands differ in sign and the result took b's sign.
        f.set(Flags::PARITY_OVERFLOW, ((a ^ b) & (a ^ result) & 0x80) != 0);
        f.set(Flags::CARRY, (a as u16) < b as u16 + c as u16);
        self.regs.set_flags(f);
        result
    }

    #[inline]
    pub(super) fn and8(&mut self, a: u8, b: u8) -> u8 {
        let result = a & b;
        self.regs.set_flags(szp(result) | Flags::HALF_CARRY);
        result
    }

    #[inline]
    pub(super) fn or8(&mut self, a: u8, b: u8) -> u8 {
        let result = a | b;
        self.regs.set_flags(szp(result));
        result
    }

    #[inline]
    pub(super) fn xor8(&mut self, a: u8, b: u8) -> u8 {
        let result = a ^ b;
        self.regs.set_flags(szp(result));
        result
    }

    /// Compare A with `value`, setting flags as if `A - value` was performed.
    /// A itself is not modified.
    #[inline]
    pub(super) fn cp8(&mut self, a: u8, value: u8) {
        self.sub8(a, value, false);
    }

    /// Dispatch the eight accumulator operations by the `y` field:
    /// ADD, ADC, SUB, SBC, AND, XOR, OR, CP.
    pub(super) fn alu_a(&mut self, op: u8, value: u8) {
        let a = self.regs.a;
        let carry = self.regs.flag(Flags::CARRY);
        self.regs.a = match op & 0x07 {
            0 => self.add8(a, value, false),
            1 => self.add8(a, value, carry),
            2 => self.sub8(a, value, false),
            3 => self.sub8(a, value, carry),
            4 => self.and8(a, value),
            5 => self.xor8(a, value),
            6 => self.or8(a, value),
            _ => {
                self.cp8(a, value);
                a
            }
        };
    }

    /// 8-bit increment used by INC r / INC (HL). C is left unchanged.
    #[inline]
    pub(super) fn inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        let mut f = szp(result) & !Flags::PARITY_OVERFLOW;
        f.set(Flags::HALF_CARRY, value & 0x0F == 0x0F);
        f.set(Flags::PARITY_OVERFLOW, value == 0x7F);
        f.set(Flags::CARRY, self.regs.flag(Flags::CARRY));
        self.regs.set_flags(f);
        result
    }

    /// 8-bit decrement used by DEC r / DEC (HL). C is left unchanged.
    #[inline]
    pub(super) fn dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        let mut f = (szp(result) & !Flags::PARITY_OVERFLOW) | Flags::SUBTRACT;
        f.set(Flags::HALF_CARRY, value & 0x0F == 0);
        f.set(Flags::PARITY_OVERFLOW, value == 0x80);
        f.set(Flags::CARRY, self.regs.flag(Flags::CARRY));
        self.regs.set_flags(f);
        result
    }

    /// 16-bit add for `ADD HL,rr` and `ADD IX/IY,rr`.
    ///
    /// Only H (carry out of bit 11), N and C change; S, Z and P/V keep
    /// their previous values.
    pub(super) fn add16(&mut self, a: u16, b: u16) -> u16 {
        let full = a as u32 + b as u32;
        self.regs.set_flag(Flags::HALF_CARRY, (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF);
        self.regs.set_flag(Flags::SUBTRACT, false);
        self.regs.set_flag(Flags::CARRY, full > 0xFFFF);
        full as u16
    }

    /// `ADC HL,rr`: like `add16` but with carry in and full S/Z/P/V update.
    pub(super) fn adc16(&mut self, a: u16, b: u16, carry: bool) -> u16 {
        let c = carry as u32;
        let full = a as u32 + b as u32 + c;
        let result = full as u16;

        let mut f = Flags::empty();
        f.set(Flags::SIGN, result & 0x8000 != 0);
        f.set(Flags::ZERO, result == 0);
        f.set(
            Flags::HALF_CARRY,
            (a as u32 & 0x0FFF) + (b as u32 & 0x0FFF) + c > 0x0FFF,
        );
        f.set(Flags::PARITY_OVERFLOW, (!(a ^ b) & (a ^ result) & 0x8000) != 0);
        f.set(Flags::CARRY, full > 0xFFFF);
        self.regs.set_flags(f);
        result
    }

    /// `SBC HL,rr`.
    pub(super) fn sbc16(&mut self, a: u16, b: u16, carry: bool) -> u16 {
        let c = carry as u16;
        let result = a.wrapping_sub(b).wrapping_sub(c);

        let mut f = Flags::SUBTRACT;
        f.set(Flags::SIGN, result & 0x8000 != 0);
        f.set(Flags::ZERO, result == 0);
        f.set(Flags::HALF_CARRY, (a & 0x0FFF) < (b & 0x0FFF) + c);
        f.set(Flags::PARITY_OVERFLOW, ((a ^ b) & (a ^ result) & 0x8000) != 0);
        f.set(Flags::CARRY, (a as u32) < b as u32 + c as u32);
        self.regs.set_flags(f);
        result
    }

    /// Shared flag update for the CB rotate/shift group.
    #[inline]
    fn shift_flags(&mut self, result: u8, carry: bool) -> u8 {
        let mut f = szp(result);
        f.set(Flags::CARRY, carry);
        self.regs.set_flags(f);
        result
    }

    pub(super) fn rlc8(&mut self, value: u8) -> u8 {
        self.shift_flags(value.rotate_left(1), value & 0x80 != 0)
    }

    pub(super) fn rrc8(&mut self, value: u8) -> u8 {
        self.shift_flags(value.rotate_right(1), value & 0x01 != 0)
    }

    /// Rotate left through carry: the old carry enters bit 0.
    pub(super) fn rl8(&mut self, value: u8) -> u8 {
        let carry_in = self.regs.flag(Flags::CARRY) as u8;
        self.shift_flags((value << 1) | carry_in, value & 0x80 != 0)
    }

    /// Rotate right through carry: the old carry enters bit 7.
    pub(super) fn rr8(&mut self, value: u8) -> u8 {
        let carry_in = (self.regs.flag(Flags::CARRY) as u8) << 7;
        self.shift_flags((value >> 1) | carry_in, value & 0x01 != 0)
    }

    pub(super) fn sla8(&mut self, value: u8) -> u8 {
        self.shift_flags(value << 1, value & 0x80 != 0)
    }

    pub(super) fn sra8(&mut self, value: u8) -> u8 {
        self.shift_flags((value >> 1) | (value & 0x80), value & 0x01 != 0)
    }

    /// Undocumented "shift left logical": like SLA but bit 0 becomes 1.
    pub(super) fn sll8(&mut self, value: u8) -> u8 {
        self.shift_flags((value << 1) | 0x01, value & 0x80 != 0)
    }

    pub(super) fn srl8(&mut self, value: u8) -> u8 {
        self.shift_flags(value >> 1, value & 0x01 != 0)
    }

    /// Dispatch the CB rotate/shift group by the `y` field.
    pub(super) fn rotate_shift(&mut self, op: u8, value: u8) -> u8 {
        match op & 0x07 {
            0 => self.rlc8(value),
            1 => self.rrc8(value),
            2 => self.rl8(value),
            3 => self.rr8(value),
            4 => self.sla8(value),
            5 => self.sra8(value),
            6 => self.sll8(value),
            _ => self.srl8(value),
        }
    }

    /// RLCA/RRCA/RLA/RRA by the `y` field (0..=3).
    ///
    /// Unlike the CB forms these only touch H, N and C.
    pub(super) fn rotate_a(&mut self, op: u8) {
        let a = self.regs.a;
        let carry_in = self.regs.flag(Flags::CARRY) as u8;
        let (result, carry) = match op & 0x03 {
            0 => (a.rotate_left(1), a & 0x80 != 0),
            1 => (a.rotate_right(1), a & 0x01 != 0),
            2 => ((a << 1) | carry_in, a & 0x80 != 0),
            _ => ((a >> 1) | (carry_in << 7), a & 0x01 != 0),
        };
        self.regs.a = result;
        self.regs.set_flag(Flags::HALF_CARRY, false);
        self.regs.set_flag(Flags::SUBTRACT, false);
        self.regs.set_flag(Flags::CARRY, carry);
    }

    /// `BIT b,value`: Z (and P/V) = tested bit clear, H = 1, N = 0.
    /// S reflects bit 7 only when bit 7 is the one tested. C is kept.
    pub(super) fn bit8(&mut self, bit: u8, value: u8) {
        let set = value & (1 << bit) != 0;
        let mut f = Flags::HALF_CARRY;
        f.set(Flags::ZERO, !set);
        f.set(Flags::PARITY_OVERFLOW, !set);
        f.set(Flags::SIGN, bit == 7 && set);
        f.set(Flags::CARRY, self.regs.flag(Flags::CARRY));
        self.regs.set_flags(f);
    }

    /// Decimal adjust A after a BCD addition or subtraction.
    ///
    /// The correction is 0x06 when H is set or the low nibble exceeds 9,
    /// plus 0x60 when C is set or A exceeds 0x99; it is added after an
    /// addition and subtracted after a subtraction. N is preserved.
    pub(super) fn daa(&mut self) {
        let a = self.regs.a;
        let flags = self.regs.flags();
        let carry = flags.contains(Flags::CARRY);
        let half = flags.contains(Flags::HALF_CARRY);
        let subtract = flags.contains(Flags::SUBTRACT);
        let low = a & 0x0F;

        let mut correction = 0u8;
        let mut new_carry = carry;
        if half || low > 9 {
            correction |= 0x06;
        }
        if carry || a > 0x99 {
            correction |= 0x60;
            new_carry = true;
        }

        let (result, new_half) = if subtract {
            (a.wrapping_sub(correction), half && low < 6)
        } else {
            (a.wrapping_add(correction), low > 9)
        };

        let mut f = szp(result);
        f.set(Flags::SUBTRACT, subtract);
        f.set(Flags::HALF_CARRY, new_half);
        f.set(Flags::CARRY, new_carry);
        self.regs.set_flags(f);
        self.regs.a = result;
    }

    /// `CPL`: A = !A, H = N = 1.
    pub(super) fn cpl(&mut self) {
        self.regs.a = !self.regs.a;
        self.regs.set_flag(Flags::HALF_CARRY, true);
        self.regs.set_flag(Flags::SUBTRACT, true);
    }

    /// `NEG`: A = 0 - A.
    pub(super) fn neg(&mut self) {
        let a = self.regs.a;
        self.regs.a = self.sub8(0, a, false);
    }

    /// `SCF`
    pub(super) fn scf(&mut self) {
        self.regs.set_flag(Flags::HALF_CARRY, false);
        self.regs.set_flag(Flags::SUBTRACT, false);
        self.regs.set_flag(Flags::CARRY, true);
    }

    /// `CCF`: H takes the old carry.
    pub(super) fn ccf(&mut self) {
        let carry = self.regs.flag(Flags::CARRY);
        self.regs.set_flag(Flags::HALF_CARRY, carry);
        self.regs.set_flag(Flags::SUBTRACT, false);
        self.regs.set_flag(Flags::CARRY, !carry);
    }

    /// Flags after `IN r,(C)`, `RRD`/`RLD` and `LD A,I/R`-style loads:
    /// S, Z and parity from `value`, H = N = 0, C kept.
    pub(super) fn set_szp_keep_carry(&mut self, value: u8) {
        let mut f = szp(value);
        f.set(Flags::CARRY, self.regs.flag(Flags::CARRY));
        self.regs.set_flags(f);
    }
}
