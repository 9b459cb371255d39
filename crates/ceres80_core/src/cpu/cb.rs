use super::{Bus, Cpu, Prefix};

impl Cpu {
    /// Handle CB-prefixed instructions (bit operations, shifts, and rotates).
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let cb = self.fetch_opcode(bus);
        self.decoded = (Prefix::Cb, cb);

        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;

        match x {
            0 => {
                // Rotates and shifts.
                let value = self.read_reg8(bus, z);
                let result = self.rotate_shift(y, value);
                self.write_reg8(bus, z, result);
                if z == 6 {
                    15
                } else {
                    8
                }
            }
            1 => {
                // BIT b, r
                let value = self.read_reg8(bus, z);
                self.bit8(y, value);
                if z == 6 {
                    12
                } else {
                    8
                }
            }
            _ => {
                // RES b, r (x = 2) / SET b, r (x = 3). No flags.
                let value = self.read_reg8(bus, z);
                let result = if x == 2 {
                    value & !(1 << y)
                } else {
                    value | (1 << y)
                };
                self.write_reg8(bus, z, result);
                if z == 6 {
                    15
                } else {
                    8
                }
            }
        }
    }
}
