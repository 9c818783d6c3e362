use crate::cpu::Interrupt;

pub const DIV_ADDR: u16 = 0xFF04;
pub const TIMA_ADDR: u16 = 0xFF05;
pub const TMA_ADDR: u16 = 0xFF06;
pub const TAC_ADDR: u16 = 0xFF07;

const DIV_PERIOD: u32 = 256;

/// DIV/TIMA/TMA/TAC with two free-running cycle accumulators.
///
/// DIV counts every 256 T-cycles. TIMA counts at the TAC-selected rate
/// while TAC bit 2 is set, and on overflow reloads from TMA and raises the
/// timer interrupt.
#[derive(Clone, Debug, Default)]
pub struct Timer {
    div: u8,
    tima: u8,
    tma: u8,
    tac: u8,
    div_cycles: u32,
    tima_cycles: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn enabled(&self) -> bool {
        self.tac & 0x04 != 0
    }

    /// TIMA period in T-cycles for TAC[1:0].
    #[inline]
    fn tima_period(&self) -> u32 {
        match self.tac & 0x03 {
            0 => 1024,
            1 => 16,
            2 => 64,
            _ => 256,
        }
    }

    /// Advance both accumulators by `cycles`, updating IF on overflow.
    pub fn tick(&mut self, cycles: u32, if_reg: &mut u8) {
        self.div_cycles += cycles;
        while self.div_cycles >= DIV_PERIOD {
            self.div_cycles -= DIV_PERIOD;
            self.div = self.div.wrapping_add(1);
        }

        if !self.enabled() {
            return;
        }

        let period = self.tima_period();
        self.tima_cycles += cycles;
        while self.tima_cycles >= period {
            self.tima_cycles -= period;
            let (next, overflow) = self.tima.overflowing_add(1);
            if overflow {
                self.tima = self.tma;
                *if_reg |= Interrupt::Timer.mask();
            } else {
                self.tima = next;
            }
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            DIV_ADDR => self.div,
            TIMA_ADDR => self.tima,
            TMA_ADDR => self.tma,
            TAC_ADDR => self.tac,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            // Any write clears DIV and restarts both phases.
            DIV_ADDR => {
                self.div = 0;
                self.div_cycles = 0;
                self.tima_cycles = 0;
            }
            TIMA_ADDR => self.tima = value,
            TMA_ADDR => self.tma = value,
            TAC_ADDR => self.tac = value,
            _ => {}
        }
    }

    /// DIV value a DMG shows when the boot ROM hands over to the cartridge.
    pub(crate) fn post_boot() -> Self {
        Self {
            div: 0xAB,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_counts_every_256_cycles() {
        let mut timer = Timer::new();
        let mut iflags = 0;

        timer.tick(255, &mut iflags);
        assert_eq!(timer.read(DIV_ADDR), 0);
        timer.tick(1, &mut iflags);
        assert_eq!(timer.read(DIV_ADDR), 1);

        timer.tick(256 * 255, &mut iflags);
        assert_eq!(timer.read(DIV_ADDR), 0, "DIV wraps");
    }

    #[test]
    fn tima_idle_while_disabled() {
        let mut timer = Timer::new();
        let mut iflags = 0;
        timer.write(TAC_ADDR, 0x01);

        timer.tick(1024, &mut iflags);
        assert_eq!(timer.read(TIMA_ADDR), 0);
    }

    #[test]
    fn tima_overflow_reloads_tma_and_requests_interrupt() {
        let mut timer = Timer::new();
        let mut iflags = 0;
        timer.write(TAC_ADDR, 0x05); // enabled, 16 cycles
        timer.write(TMA_ADDR, 0x42);
        timer.write(TIMA_ADDR, 0xFF);

        timer.tick(15, &mut iflags);
        assert_eq!(timer.read(TIMA_ADDR), 0xFF);
        assert_eq!(iflags, 0);

        timer.tick(1, &mut iflags);
        assert_eq!(timer.read(TIMA_ADDR), 0x42);
        assert_eq!(iflags & 0x04, 0x04);
    }

    #[test]
    fn tac_selects_period() {
        for (tac, period) in [(0x04, 1024), (0x05, 16), (0x06, 64), (0x07, 256)] {
            let mut timer = Timer::new();
            let mut iflags = 0;
            timer.write(TAC_ADDR, tac);

            timer.tick(period - 1, &mut iflags);
            assert_eq!(timer.read(TIMA_ADDR), 0, "TAC={tac:#04x}");
            timer.tick(1, &mut iflags);
            assert_eq!(timer.read(TIMA_ADDR), 1, "TAC={tac:#04x}");
        }
    }

    #[test]
    fn div_write_resets_both_phases() {
        let mut timer = Timer::new();
        let mut iflags = 0;
        timer.write(TAC_ADDR, 0x05);

        timer.tick(300, &mut iflags);
        assert_eq!(timer.read(DIV_ADDR), 1);
        assert_eq!(timer.read(TIMA_ADDR), 18);

        timer.write(DIV_ADDR, 0x99);
        assert_eq!(timer.read(DIV_ADDR), 0);

        timer.tick(15, &mut iflags);
        assert_eq!(timer.read(TIMA_ADDR), 18, "TIMA phase restarted");
        timer.tick(1, &mut iflags);
        assert_eq!(timer.read(TIMA_ADDR), 19);
    }
}
