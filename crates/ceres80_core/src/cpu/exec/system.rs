use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// HALT: stop fetching until an interrupt is accepted. PC is left
    /// pointing at the next instruction, which is where the interrupt will
    /// return to.
    pub(super) fn exec_halt(&mut self) -> u32 {
        self.halted = true;
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        4
    }

    /// EI takes effect after the instruction that follows it, so that
    /// `EI; RET` at the end of a handler returns before the next interrupt.
    pub(super) fn exec_ei(&mut self) -> u32 {
        self.regs.iff1 = true;
        self.regs.iff2 = true;
        self.ei_delay = true;
        4
    }

    /// OUT (n),A: A goes out on the upper address lines.
    pub(super) fn exec_out_n_a<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let n = self.fetch8(bus);
        let port = u16::from_be_bytes([self.regs.a, n]);
        bus.port_out(port, self.regs.a);
        11
    }

    /// IN A,(n): no flags affected.
    pub(super) fn exec_in_a_n<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let n = self.fetch8(bus);
        let port = u16::from_be_bytes([self.regs.a, n]);
        self.regs.a = bus.port_in(port);
        11
    }
}
