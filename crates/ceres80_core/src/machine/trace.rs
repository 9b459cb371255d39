use std::any::Any;
use std::fmt::Write as _;

use super::bus::{AccessDirection, AccessEvent, AddressSpace, BusObserver};
use crate::cpu::AccessKind;

/// Bus observer that renders one block of text per executed instruction
/// and emits it through `log::trace!`.
///
/// ```text
/// Executed 0x3A LD A,(0x8123) @ 0x0010 (13 cycles)
///     Read Value 0x42 @ Address 0x8123
/// ```
#[derive(Debug, Default)]
pub struct TraceLog {
    opcode_bytes: Vec<u8>,
    operands: Vec<u8>,
    accesses: Vec<AccessEvent>,
    interrupt: bool,
    last: String,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text rendered for the most recently finished instruction.
    pub fn last(&self) -> &str {
        &self.last
    }

    fn render(&self, pc: u16, mnemonic: &str, cycles: u32) -> String {
        let mut out = String::from("Executed ");
        if !self.opcode_bytes.is_empty() {
            out.push_str("0x");
            for byte in &self.opcode_bytes {
                let _ = write!(out, "{:02X}", byte);
            }
            out.push(' ');
        }
        out.push_str(&fill_operands(mnemonic, &self.operands));
        let _ = write!(out, " @ 0x{:04X} ({} cycles)", pc, cycles);

        for access in &self.accesses {
            let verb = match access.direction {
                AccessDirection::Read => "Read",
                AccessDirection::Write => "Wrote",
            };
            let _ = match access.space {
                AddressSpace::Memory => write!(
                    out,
                    "\n    {} Value 0x{:02X} @ Address 0x{:04X}",
                    verb, access.value, access.address
                ),
                AddressSpace::Port => write!(
                    out,
                    "\n    {} Value 0x{:02X} @ Port 0x{:02X}",
                    verb, access.value, access.address
                ),
            };
        }

        if self.interrupt {
            out.push_str("\n    Interrupt was acknowledged");
        }
        out
    }
}

impl BusObserver for TraceLog {
    fn access(&mut self, event: AccessEvent) {
        match (event.space, event.kind) {
            (AddressSpace::Memory, AccessKind::OpcodeFetch) => self.opcode_bytes.push(event.value),
            (AddressSpace::Memory, AccessKind::Immediate) => self.operands.push(event.value),
            _ => self.accesses.push(event),
        }
    }

    fn begin_instruction(&mut self, _pc: u16) {
        self.opcode_bytes.clear();
        self.operands.clear();
        self.accesses.clear();
        self.interrupt = false;
    }

    fn end_instruction(&mut self, pc: u16, mnemonic: &'static str, cycles: u32) {
        self.last = self.render(pc, mnemonic, cycles);
        log::trace!("{}", self.last);
    }

    fn interrupt_accepted(&mut self, _return_pc: u16) {
        self.interrupt = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Substitute operand bytes into a mnemonic template, in order: `d` as
/// signed decimal, `nn` as a little-endian word, `n` as a byte.
/// Placeholders without a matching operand are left as written.
pub(crate) fn fill_operands(template: &str, operands: &[u8]) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut bytes = operands.iter().copied();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            'd' => match bytes.next() {
                Some(b) => {
                    let _ = write!(out, "{}", b as i8);
                }
                None => out.push(c),
            },
            'n' if chars.peek() == Some(&'n') => {
                chars.next();
                match (bytes.next(), bytes.next()) {
                    (Some(lo), Some(hi)) => {
                        let _ = write!(out, "0x{:04X}", u16::from_le_bytes([lo, hi]));
                    }
                    _ => out.push_str("nn"),
                }
            }
            'n' => match bytes.next() {
                Some(b) => {
                    let _ = write!(out, "0x{:02X}", b);
                }
                None => out.push(c),
            },
            _ => out.push(c),
        }
    }
    out
}
