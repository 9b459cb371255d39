/// Classification of a CPU memory access.
///
/// The CPU tags every read and write so that an attached observer can tell
/// opcode bytes from operands and stack traffic. Buses are free to ignore
/// the tag; it never changes what is read or written.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessKind {
    /// Ordinary data access, e.g. `LD A,(HL)`.
    Standard,
    /// Opcode or prefix byte fetched from PC.
    OpcodeFetch,
    /// Operand byte fetched from PC (immediate value or displacement).
    Immediate,
    /// Push/pop traffic, including interrupt entry.
    Stack,
}

/// Abstraction over the Z80's view of the machine: a 16-bit memory space
/// and an I/O port space.
///
/// Port accesses carry the full 16-bit address the Z80 places on the bus
/// (`B` or `A` in the upper byte); devices that only decode the low byte
/// simply truncate it.
pub trait Bus {
    fn read8(&mut self, addr: u16, kind: AccessKind) -> u8;
    fn write8(&mut self, addr: u16, value: u8, kind: AccessKind);

    fn port_in(&mut self, port: u16) -> u8;
    fn port_out(&mut self, port: u16, value: u8);

    /// Whether the bus wants decoded mnemonics in `end_instruction`.
    ///
    /// Decoding a mnemonic costs a table lookup per step, so the CPU only
    /// does it when this returns `true`.
    fn tracing(&self) -> bool {
        false
    }

    /// Hook that marks the beginning of a single CPU instruction at `pc`.
    fn begin_instruction(&mut self, _pc: u16) {}

    /// Hook that finalises a single CPU instruction.
    ///
    /// `mnemonic` is empty unless `tracing` returned `true`.
    fn end_instruction(&mut self, _pc: u16, _mnemonic: &'static str, _cycles: u32) {}

    /// Called after the CPU accepted a maskable interrupt. `return_pc` is
    /// the address that was pushed.
    fn interrupt_accepted(&mut self, _return_pc: u16) {}
}
