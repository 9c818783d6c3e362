use super::{Bus, Cpu, CpuState};

pub(crate) const IF_ADDR: u16 = 0xFF0F;
pub(crate) const IE_ADDR: u16 = 0xFFFF;

/// Interrupt sources the core dispatches, in priority order.
///
/// The LCD STAT line (bit 1) can be latched in IF and IE but is never
/// serviced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    pub const PRIORITY: [Interrupt; 4] = [
        Interrupt::VBlank,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    /// Bit mask of this source in IF/IE.
    #[inline]
    pub const fn mask(self) -> u8 {
        match self {
            Interrupt::VBlank => 0x01,
            Interrupt::Timer => 0x04,
            Interrupt::Serial => 0x08,
            Interrupt::Joypad => 0x10,
        }
    }

    #[inline]
    pub const fn vector(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x0040,
            Interrupt::Timer => 0x0050,
            Interrupt::Serial => 0x0058,
            Interrupt::Joypad => 0x0060,
        }
    }
}

impl Cpu {
    /// Poll IF & IE and service at most one interrupt.
    ///
    /// Any pending enabled line wakes a halted CPU, even with IME clear.
    /// Returns the cycles spent on dispatch: 20 when an interrupt was
    /// taken, 0 otherwise.
    pub fn handle_interrupt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let iflags = bus.read8(IF_ADDR);
        let ie = bus.read8(IE_ADDR);
        let pending = iflags & ie & 0x1F;

        if pending == 0 {
            return 0;
        }

        if self.state == CpuState::Halted {
            self.state = CpuState::Running;
        }

        if !self.ime {
            return 0;
        }

        let Some(interrupt) = Interrupt::PRIORITY
            .into_iter()
            .find(|irq| pending & irq.mask() != 0)
        else {
            return 0;
        };

        let pc = self.regs.pc;
        log::debug!(
            "interrupt {:?}: vector=0x{:04X} pc=0x{:04X} sp=0x{:04X} IF=0x{:02X} IE=0x{:02X}",
            interrupt,
            interrupt.vector(),
            pc,
            self.regs.sp,
            iflags & 0x1F,
            ie,
        );

        self.ime = false;
        bus.write8(IF_ADDR, iflags & !interrupt.mask());
        self.push_u16(bus, pc);
        self.regs.pc = interrupt.vector();

        20
    }
}
