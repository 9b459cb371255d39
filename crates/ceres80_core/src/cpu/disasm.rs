//! Mnemonic templates for every opcode the core decodes.
//!
//! Templates are upper case except for operand placeholders, which a
//! tracer fills in from the operand bytes of the executed instruction:
//!
//! - `n`: 8-bit immediate
//! - `nn`: 16-bit immediate (little-endian in memory)
//! - `d`: signed displacement or relative jump offset

use lazy_static::lazy_static;

/// Which opcode table an instruction was decoded from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Prefix {
    #[default]
    None,
    Cb,
    Ed,
    Dd,
    Fd,
    DdCb,
    FdCb,
}

/// Reported in place of a mnemonic when the CPU accepts an interrupt.
pub const INTERRUPT_MNEMONIC: &str = "INT 38H";

/// Template for an unassigned opcode.
pub const UNKNOWN_MNEMONIC: &str = "???";

const R: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const RP: [&str; 4] = ["BC", "DE", "HL", "SP"];
const RP2: [&str; 4] = ["BC", "DE", "HL", "AF"];
const CC: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];
const ALU: [&str; 8] = [
    "ADD A,", "ADC A,", "SUB ", "SBC A,", "AND ", "XOR ", "OR ", "CP ",
];
const ROT: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SLL", "SRL"];

lazy_static! {
    static ref MAIN: Vec<String> = (0..=255u8).map(main_mnemonic).collect();
    static ref CB: Vec<String> = (0..=255u8).map(cb_mnemonic).collect();
    static ref ED: Vec<String> = (0..=255u8).map(ed_mnemonic).collect();
    static ref DD: Vec<String> = (0..=255u8).map(|op| index_mnemonic(op, "IX")).collect();
    static ref FD: Vec<String> = (0..=255u8).map(|op| index_mnemonic(op, "IY")).collect();
    static ref DDCB: Vec<String> = (0..=255u8).map(|op| index_cb_mnemonic(op, "IX")).collect();
    static ref FDCB: Vec<String> = (0..=255u8).map(|op| index_cb_mnemonic(op, "IY")).collect();
}

/// Look up the mnemonic template for `opcode` in the table of `prefix`.
pub fn mnemonic(prefix: Prefix, opcode: u8) -> &'static str {
    let table: &'static Vec<String> = match prefix {
        Prefix::None => &MAIN,
        Prefix::Cb => &CB,
        Prefix::Ed => &ED,
        Prefix::Dd => &DD,
        Prefix::Fd => &FD,
        Prefix::DdCb => &DDCB,
        Prefix::FdCb => &FDCB,
    };
    table[opcode as usize].as_str()
}

fn main_mnemonic(op: u8) -> String {
    let x = op >> 6;
    let y = ((op >> 3) & 0x07) as usize;
    let z = op & 0x07;
    let p = y >> 1;
    let q = y & 0x01;

    match (x, z) {
        (0, 0) => match y {
            0 => "NOP".to_string(),
            1 => "EX AF,AF'".to_string(),
            2 => "DJNZ d".to_string(),
            3 => "JR d".to_string(),
            _ => format!("JR {},d", CC[y - 4]),
        },
        (0, 1) if q == 0 => format!("LD {},nn", RP[p]),
        (0, 1) => format!("ADD HL,{}", RP[p]),
        (0, 2) => [
            "LD (BC),A",
            "LD A,(BC)",
            "LD (DE),A",
            "LD A,(DE)",
            "LD (nn),HL",
            "LD HL,(nn)",
            "LD (nn),A",
            "LD A,(nn)",
        ][y]
            .to_string(),
        (0, 3) if q == 0 => format!("INC {}", RP[p]),
        (0, 3) => format!("DEC {}", RP[p]),
        (0, 4) => format!("INC {}", R[y]),
        (0, 5) => format!("DEC {}", R[y]),
        (0, 6) => format!("LD {},n", R[y]),
        (0, _) => ["RLCA", "RRCA", "RLA", "RRA", "DAA", "CPL", "SCF", "CCF"][y].to_string(),
        (1, _) if op == 0x76 => "HALT".to_string(),
        (1, _) => format!("LD {},{}", R[y], R[z as usize]),
        (2, _) => format!("{}{}", ALU[y], R[z as usize]),
        (_, 0) => format!("RET {}", CC[y]),
        (_, 1) if q == 0 => format!("POP {}", RP2[p]),
        (_, 1) => ["RET", "EXX", "JP (HL)", "LD SP,HL"][p].to_string(),
        (_, 2) => format!("JP {},nn", CC[y]),
        (_, 3) => [
            "JP nn",
            "PREFIX CB",
            "OUT (n),A",
            "IN A,(n)",
            "EX (SP),HL",
            "EX DE,HL",
            "DI",
            "EI",
        ][y]
            .to_string(),
        (_, 4) => format!("CALL {},nn", CC[y]),
        (_, 5) if q == 0 => format!("PUSH {}", RP2[p]),
        (_, 5) => ["CALL nn", "PREFIX DD", "PREFIX ED", "PREFIX FD"][p].to_string(),
        (_, 6) => format!("{}n", ALU[y]),
        _ => format!("RST {:02X}H", y * 8),
    }
}

fn cb_mnemonic(op: u8) -> String {
    let y = ((op >> 3) & 0x07) as usize;
    let reg = R[(op & 0x07) as usize];
    match op >> 6 {
        0 => format!("{} {}", ROT[y], reg),
        1 => format!("BIT {},{}", y, reg),
        2 => format!("RES {},{}", y, reg),
        _ => format!("SET {},{}", y, reg),
    }
}

fn ed_mnemonic(op: u8) -> String {
    let x = op >> 6;
    let y = ((op >> 3) & 0x07) as usize;
    let z = (op & 0x07) as usize;
    let p = y >> 1;
    let q = y & 0x01;

    match (x, z) {
        (1, 0) if y == 6 => "IN (C)".to_string(),
        (1, 0) => format!("IN {},(C)", R[y]),
        (1, 1) if y == 6 => "OUT (C),0".to_string(),
        (1, 1) => format!("OUT (C),{}", R[y]),
        (1, 2) if q == 0 => format!("SBC HL,{}", RP[p]),
        (1, 2) => format!("ADC HL,{}", RP[p]),
        (1, 3) if q == 0 => format!("LD (nn),{}", RP[p]),
        (1, 3) => format!("LD {},(nn)", RP[p]),
        (1, 4) => "NEG".to_string(),
        (1, 5) if y == 1 => "RETI".to_string(),
        (1, 5) => "RETN".to_string(),
        (1, 6) => ["IM 0", "IM 0", "IM 1", "IM 2"][y & 0x03].to_string(),
        (1, _) => [
            "LD I,A", "LD R,A", "LD A,I", "LD A,R", "RRD", "RLD", "NOP", "NOP",
        ][y]
            .to_string(),
        (2, 0..=3) if y >= 4 => [
            ["LDI", "CPI", "INI", "OUTI"],
            ["LDD", "CPD", "IND", "OUTD"],
            ["LDIR", "CPIR", "INIR", "OTIR"],
            ["LDDR", "CPDR", "INDR", "OTDR"],
        ][y - 4][z]
            .to_string(),
        _ => UNKNOWN_MNEMONIC.to_string(),
    }
}

/// Whether a DD/FD prefix changes the meaning of `op`.
fn uses_index(op: u8) -> bool {
    let dst = (op >> 3) & 0x07;
    let src = op & 0x07;
    match op {
        0x09 | 0x19 | 0x29 | 0x39 => true,
        0x21..=0x26 | 0x29..=0x2E | 0x34..=0x36 => true,
        0x40..=0x7F if op != 0x76 => matches!(dst, 4..=6) || matches!(src, 4..=6),
        0x80..=0xBF => matches!(src, 4..=6),
        0xE1 | 0xE3 | 0xE5 | 0xE9 | 0xF9 => true,
        _ => false,
    }
}

/// Rewrite an unprefixed template for IX/IY: `(HL)` becomes `(IX+d)`, HL
/// becomes IX, and H/L become IXH/IXL unless a memory operand is present.
fn index_form(text: &str, name: &str) -> String {
    let Some((mnem, operands)) = text.split_once(' ') else {
        return text.to_string();
    };
    let memory = operands.contains("(HL)");
    let operands: Vec<String> = operands
        .split(',')
        .map(|operand| match operand {
            "(HL)" => format!("({}+d)", name),
            "HL" => name.to_string(),
            "H" if !memory => format!("{}H", name),
            "L" if !memory => format!("{}L", name),
            other => other.to_string(),
        })
        .collect();
    format!("{} {}", mnem, operands.join(","))
}

fn index_mnemonic(op: u8, name: &str) -> String {
    match op {
        0xE9 => format!("JP ({})", name),
        0xCB => format!("PREFIX {}CB", &name[1..]),
        0xDD | 0xFD | 0xED => "NONI".to_string(),
        _ if uses_index(op) => index_form(&main_mnemonic(op), name),
        _ => main_mnemonic(op),
    }
}

fn index_cb_mnemonic(op: u8, name: &str) -> String {
    let y = ((op >> 3) & 0x07) as usize;
    let z = (op & 0x07) as usize;
    let target = format!("({}+d)", name);
    let base = match op >> 6 {
        0 => format!("{} {}", ROT[y], target),
        1 => return format!("BIT {},{}", y, target),
        2 => format!("RES {},{}", y, target),
        _ => format!("SET {},{}", y, target),
    };
    if z == 6 {
        base
    } else {
        format!("{},{}", base, R[z])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_table_covers_common_opcodes() {
        assert_eq!(mnemonic(Prefix::None, 0x00), "NOP");
        assert_eq!(mnemonic(Prefix::None, 0x3E), "LD A,n");
        assert_eq!(mnemonic(Prefix::None, 0x21), "LD HL,nn");
        assert_eq!(mnemonic(Prefix::None, 0x76), "HALT");
        assert_eq!(mnemonic(Prefix::None, 0xC6), "ADD A,n");
        assert_eq!(mnemonic(Prefix::None, 0x20), "JR NZ,d");
        assert_eq!(mnemonic(Prefix::None, 0xFF), "RST 38H");
        assert_eq!(mnemonic(Prefix::None, 0xF5), "PUSH AF");
    }

    #[test]
    fn index_tables_substitute_registers() {
        assert_eq!(mnemonic(Prefix::Dd, 0x21), "LD IX,nn");
        assert_eq!(mnemonic(Prefix::Dd, 0x7E), "LD A,(IX+d)");
        assert_eq!(mnemonic(Prefix::Fd, 0x36), "LD (IY+d),n");
        assert_eq!(mnemonic(Prefix::Dd, 0x66), "LD H,(IX+d)");
        assert_eq!(mnemonic(Prefix::Dd, 0x65), "LD IXH,IXL");
        assert_eq!(mnemonic(Prefix::Fd, 0x84), "ADD A,IYH");
        assert_eq!(mnemonic(Prefix::Dd, 0xE9), "JP (IX)");
        assert_eq!(mnemonic(Prefix::Dd, 0xEB), "EX DE,HL");
        assert_eq!(mnemonic(Prefix::DdCb, 0x06), "RLC (IX+d)");
        assert_eq!(mnemonic(Prefix::FdCb, 0xC0), "SET 0,(IY+d),B");
        assert_eq!(mnemonic(Prefix::DdCb, 0x46), "BIT 0,(IX+d)");
    }

    #[test]
    fn ed_table_marks_unassigned_opcodes() {
        assert_eq!(mnemonic(Prefix::Ed, 0xB0), "LDIR");
        assert_eq!(mnemonic(Prefix::Ed, 0x4A), "ADC HL,BC");
        assert_eq!(mnemonic(Prefix::Ed, 0x73), "LD (nn),SP");
        assert_eq!(mnemonic(Prefix::Ed, 0x00), UNKNOWN_MNEMONIC);
        assert_eq!(mnemonic(Prefix::Ed, 0xBC), UNKNOWN_MNEMONIC);
    }
}
