use bitflags::bitflags;

bitflags! {
    /// Named bits of the F register.
    ///
    /// Bits 3 and 5 are undocumented copies of result bits on real silicon.
    /// They are not modelled, but writes through `set_flag`/`set_flags`
    /// leave them untouched.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Flags: u8 {
        const SIGN = 0b1000_0000;
        const ZERO = 0b0100_0000;
        const HALF_CARRY = 0b0001_0000;
        const PARITY_OVERFLOW = 0b0000_0100;
        const SUBTRACT = 0b0000_0010;
        const CARRY = 0b0000_0001;
    }
}

/// Z80 register file.
///
/// The main set is stored as individual bytes because most instructions
/// address them one at a time. The shadow set is only ever reached through
/// the exchange instructions, so it is kept as pairs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub af_alt: u16,
    pub bc_alt: u16,
    pub de_alt: u16,
    pub hl_alt: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    /// Interrupt vector base (only meaningful in mode 2).
    pub i: u8,
    /// Memory refresh counter. Only the low 7 bits count.
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
}

impl Registers {
    /// Zero every register, flag and interrupt latch.
    ///
    /// Real hardware leaves most registers undefined after reset; a
    /// deterministic all-zero state keeps runs reproducible. SP = 0 makes the
    /// first push land at the top of RAM.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.f = f;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_bits_retain(self.f)
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flags, value: bool) {
        let mut f = self.flags();
        f.set(flag, value);
        self.f = f.bits();
    }

    /// Replace all six named flags at once, keeping bits 3 and 5.
    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.f = (self.f & !Flags::all().bits()) | flags.bits();
    }

    /// `EX AF,AF'`
    pub fn exchange_af(&mut self) {
        let af = self.af();
        self.set_af(self.af_alt);
        self.af_alt = af;
    }

    /// `EXX`: swap BC, DE and HL with their shadows.
    pub fn exchange_all(&mut self) {
        let (bc, de, hl) = (self.bc(), self.de(), self.hl());
        self.set_bc(self.bc_alt);
        self.set_de(self.de_alt);
        self.set_hl(self.hl_alt);
        self.bc_alt = bc;
        self.de_alt = de;
        self.hl_alt = hl;
    }

    /// `EX DE,HL`
    pub fn exchange_de_hl(&mut self) {
        let de = self.de();
        self.set_de(self.hl());
        self.set_hl(de);
    }
}
