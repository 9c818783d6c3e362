use crate::cpu::{Bus, Cpu, CpuState};

impl Cpu {
    pub(super) fn exec_halt(&mut self) -> u32 {
        log::debug!("HALT at PC=0x{:04X}", self.regs.pc.wrapping_sub(1));
        self.state = CpuState::Halted;
        4
    }

    /// STOP is a 2-byte instruction; the padding byte is fetched and
    /// discarded. The CPU then stays stopped until the machine is reset.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let _padding = self.fetch8(bus);
        log::debug!("STOP at PC=0x{:04X}", self.regs.pc.wrapping_sub(2));
        self.state = CpuState::Stopped;
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ei_pending = false;
        4
    }

    pub(super) fn exec_ei(&mut self) -> u32 {
        // IME is raised at the start of the next step.
        self.ei_pending = true;
        4
    }
}
