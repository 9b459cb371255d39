mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::index::IndexReg;
use super::{Bus, Cpu, Prefix};

impl Cpu {
    /// Decode and execute the instruction whose first byte is `opcode` and
    /// return the number of cycles.
    pub(super) fn exec_opcode<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        self.decoded = (Prefix::None, opcode);
        self.exec_main(bus, opcode)
    }

    /// The unprefixed instruction table.
    ///
    /// Index prefixes fall back to this table for opcodes that do not
    /// involve HL, so it must not assume `decoded` describes `opcode`.
    pub(super) fn exec_main<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        match opcode {
            // 0x00: NOP
            0x00 => 4,

            // Prefixes.
            0xCB => self.exec_cb(bus),
            0xED => self.exec_ed(bus),
            0xDD => self.exec_index(bus, IndexReg::Ix),
            0xFD => self.exec_index(bus, IndexReg::Iy),

            // 16-bit immediate loads.
            0x01 | 0x11 | 0x21 | 0x31 => self.exec_ld_rr_nn(bus, opcode),

            // LD (BC),A / LD (DE),A / LD (nn),HL / LD (nn),A
            0x02 | 0x12 | 0x22 | 0x32 => self.exec_ld_indirect_a(bus, opcode),

            // LD A,(BC) / LD A,(DE) / LD HL,(nn) / LD A,(nn)
            0x0A | 0x1A | 0x2A | 0x3A => self.exec_ld_a_indirect(bus, opcode),

            // 16-bit INC rr / DEC rr
            0x03 | 0x13 | 0x23 | 0x33 => self.exec_inc16(opcode),
            0x0B | 0x1B | 0x2B | 0x3B => self.exec_dec16(opcode),

            // INC r / DEC r (and (HL))
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => self.exec_inc8(bus, opcode),
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => self.exec_dec8(bus, opcode),

            // LD r,n (and LD (HL),n)
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                self.exec_ld_r_n(bus, opcode)
            }

            // RLCA / RRCA / RLA / RRA
            0x07 | 0x0F | 0x17 | 0x1F => self.exec_rotate_a(opcode),

            // DAA / CPL / SCF / CCF
            0x27 | 0x2F | 0x37 | 0x3F => self.exec_misc_a(opcode),

            // ADD HL,rr
            0x09 | 0x19 | 0x29 | 0x39 => self.exec_add_hl_rr(opcode),

            // EX AF,AF' / EXX / EX DE,HL / EX (SP),HL
            0x08 | 0xD9 | 0xEB | 0xE3 => self.exec_exchange(bus, opcode),

            // DJNZ d / JR d / JR cc,d
            0x10 => self.djnz(bus),
            0x18 | 0x20 | 0x28 | 0x30 | 0x38 => self.exec_jr(bus, opcode),

            // HALT sits in the middle of the LD r,r' block.
            0x76 => self.exec_halt(),

            // 8-bit register/memory transfers: LD r1,r2
            0x40..=0x7F => self.exec_ld_r_r(bus, opcode),

            // ALU A,r
            0x80..=0xBF => self.exec_alu_r(bus, opcode),

            // RET cc / RET
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => self.exec_ret_cc(bus, opcode),
            0xC9 => self.exec_ret(bus),

            // POP qq / PUSH qq
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.exec_pop(bus, opcode),
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.exec_push(bus, opcode),

            // JP cc,nn / JP nn / JP (HL)
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA | 0xC3 => {
                self.exec_jp(bus, opcode)
            }
            0xE9 => self.exec_jp_hl(),

            // CALL cc,nn / CALL nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC | 0xCD => {
                self.exec_call(bus, opcode)
            }

            // LD SP,HL
            0xF9 => self.exec_ld_sp_hl(),

            // OUT (n),A / IN A,(n)
            0xD3 => self.exec_out_n_a(bus),
            0xDB => self.exec_in_a_n(bus),

            // DI / EI
            0xF3 => self.exec_di(),
            0xFB => self.exec_ei(),

            // ALU A,n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => self.exec_alu_n(bus, opcode),

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => self.exec_rst(bus, opcode),
        }
    }
}
