use crate::error::Result;

use super::{Bus, Cpu, CpuState};

impl Cpu {
    /// Execute one instruction and return the T-cycles it consumed.
    ///
    /// A halted CPU idles for 4 cycles without fetching. A stopped CPU
    /// reports 0 cycles so frame loops can detect that it will make no
    /// further progress until reset.
    pub fn next_instruction<B: Bus>(&mut self, bus: &mut B) -> Result<u32> {
        if self.ei_pending {
            self.ei_pending = false;
            self.ime = true;
        }

        match self.state {
            CpuState::Stopped => return Ok(0),
            CpuState::Halted => return Ok(4),
            CpuState::Running => {}
        }

        let pc = self.regs.pc;
        let opcode = self.fetch8(bus);
        let cycles = self.exec_opcode(bus, opcode)?;

        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "PC={:04X} op={:02X} cyc={:>2} AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} IME={}",
                pc,
                opcode,
                cycles,
                self.regs.af(),
                self.regs.bc(),
                self.regs.de(),
                self.regs.hl(),
                self.regs.sp,
                self.ime as u8,
            );
        }

        Ok(cycles)
    }
}
