mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod interrupts;
mod regs;
mod shift;
mod step;

pub use bus::Bus;
pub use interrupts::Interrupt;
pub use regs::{Flags, Reg, Registers};

/// Execution state of the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CpuState {
    #[default]
    Running,
    /// Entered by HALT; any pending enabled interrupt wakes the CPU, even
    /// with IME clear.
    Halted,
    /// Entered by STOP; only a reset leaves this state.
    Stopped,
}

/// Game Boy CPU core (Sharp LR35902).
///
/// The core executes one whole instruction per call to
/// [`Cpu::next_instruction`] and reports how many T-cycles it took. All
/// memory traffic goes through a [`Bus`].
#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    state: CpuState,
    /// Set by EI; IME is raised at the start of the following step.
    ei_pending: bool,
}

impl Cpu {
    /// A CPU with every register cleared and PC at 0, ready to run a boot
    /// ROM.
    pub fn new() -> Self {
        Self::default()
    }

    /// A CPU in the state the DMG boot ROM leaves behind.
    pub fn post_boot() -> Self {
        Self {
            regs: Registers::post_boot(),
            ..Self::default()
        }
    }

    /// Clear registers and execution state.
    pub fn reset(&mut self) {
        self.regs.clear();
        self.ime = false;
        self.state = CpuState::Running;
        self.ei_pending = false;
    }

    #[inline]
    pub fn state(&self) -> CpuState {
        self.state
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state == CpuState::Stopped
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.regs.f.contains(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flags, value: bool) {
        self.regs.f.set(flag, value);
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = Flags::empty();
    }
}
