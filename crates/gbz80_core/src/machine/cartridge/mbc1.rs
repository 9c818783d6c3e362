const EXT_RAM_SIZE: usize = 0x8000;

/// MBC1 bank controller state.
///
/// External RAM is allocated at the largest supported size (four 8 KiB
/// banks) regardless of what the header declares.
#[derive(Clone, Debug)]
pub struct Mbc1 {
    ram: Vec<u8>,
    ram_enabled: bool,
    /// Primary 5-bit ROM bank register (2000-3FFF), stored as written.
    bank1: u8,
    /// Secondary 2-bit register (4000-5FFF): upper ROM bank bits or RAM bank.
    bank2: u8,
    mode: u8,
    rom_size_code: u8,
    ram_size_code: u8,
}

impl Mbc1 {
    pub fn new(rom_size_code: u8, ram_size_code: u8) -> Self {
        Self {
            ram: vec![0; EXT_RAM_SIZE],
            ram_enabled: false,
            bank1: 1,
            bank2: 0,
            mode: 0,
            rom_size_code,
            ram_size_code,
        }
    }

    #[inline]
    fn bank_mask(&self) -> usize {
        (2usize << self.rom_size_code.min(8)) - 1
    }

    #[inline]
    fn rom_byte(rom: &[u8], bank: usize, addr: u16) -> u8 {
        let index = bank * 0x4000 + (addr & 0x3FFF) as usize;
        rom.get(index).copied().unwrap_or(0xFF)
    }

    /// Bank mapped into 0x0000-0x3FFF. Only mode 1 moves it off bank 0.
    pub fn low_bank(&self) -> usize {
        if self.mode == 1 {
            ((self.bank2 as usize) << 5) & self.bank_mask()
        } else {
            0
        }
    }

    /// Bank mapped into 0x4000-0x7FFF.
    ///
    /// Banks 0x00/0x20/0x40/0x60 cannot be selected; they resolve to the
    /// following bank.
    pub fn high_bank(&self) -> usize {
        let mut bank = if self.rom_size_code >= 5 {
            ((self.bank2 as usize) << 5) | self.bank1 as usize
        } else {
            self.bank1 as usize
        };
        if matches!(bank, 0x00 | 0x20 | 0x40 | 0x60) {
            bank += 1;
        }
        bank & self.bank_mask()
    }

    pub fn read_rom(&self, rom: &[u8], addr: u16) -> u8 {
        let bank = if addr < 0x4000 {
            self.low_bank()
        } else {
            self.high_bank()
        };
        Self::rom_byte(rom, bank, addr)
    }

    /// ROM read with the multicart wiring: the secondary register is
    /// shifted by four and only the low nibble of the primary is used.
    pub fn read_rom_multicart(&self, rom: &[u8], addr: u16) -> u8 {
        let bank = if addr < 0x4000 {
            if self.mode == 1 {
                (self.bank2 as usize) << 4
            } else {
                0
            }
        } else {
            let bank = ((self.bank2 as usize) << 4) | (self.bank1 & 0x0F) as usize;
            if matches!(self.bank1, 0x00 | 0x20 | 0x40 | 0x60) {
                bank + 1
            } else {
                bank
            }
        };
        Self::rom_byte(rom, bank, addr)
    }

    /// Writes into 0x0000-0x7FFF land on the control registers.
    pub fn write_control(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                self.ram_enabled = (value & 0x0F) == 0x0A;
            }
            0x2000..=0x3FFF => self.bank1 = value & 0x1F,
            0x4000..=0x5FFF => {
                self.bank2 = value & 0x03;
                log::debug!("MBC1 secondary bank register = {}", self.bank2);
            }
            0x6000..=0x7FFF => {
                self.mode = value & 0x01;
                log::debug!("MBC1 banking mode = {}", self.mode);
            }
            _ => {}
        }
    }

    #[inline]
    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    fn ram_offset(&self, addr: u16) -> usize {
        let offset = (addr & 0x1FFF) as usize;
        if self.mode == 1 && self.ram_size_code > 2 {
            offset + 0x2000 * self.bank2 as usize
        } else {
            offset
        }
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        self.ram[self.ram_offset(addr)]
    }

    pub fn write_ram(&mut self, addr: u16, value: u8) {
        if self.ram_enabled {
            let offset = self.ram_offset(addr);
            self.ram[offset] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::cartridge::tests::build_rom;

    #[test]
    fn bank_zero_register_maps_bank_one() {
        let rom = build_rom(4, 0x01, 0x01, 0x00);
        let mut mbc = Mbc1::new(0x01, 0x00);

        mbc.write_control(0x2000, 0x00);
        assert_eq!(mbc.high_bank(), 1);
        assert_eq!(mbc.read_rom(&rom, 0x4000), 0x01);

        mbc.write_control(0x2000, 0x03);
        assert_eq!(mbc.read_rom(&rom, 0x4000), 0x03);
        assert_eq!(mbc.read_rom(&rom, 0x0000), 0x00);
    }

    #[test]
    fn bank_0x20_resolves_to_0x21() {
        // 1 MiB image: 64 banks, size code 5.
        let rom = build_rom(64, 0x01, 0x05, 0x00);
        let mut mbc = Mbc1::new(0x05, 0x00);

        mbc.write_control(0x4000, 0x01);
        mbc.write_control(0x2000, 0x00);
        assert_eq!(mbc.high_bank(), 0x21);
        assert_eq!(mbc.read_rom(&rom, 0x4000), 0x21);

        mbc.write_control(0x2000, 0x05);
        assert_eq!(mbc.read_rom(&rom, 0x4000), 0x25);
    }

    #[test]
    fn mode_one_moves_low_window() {
        let rom = build_rom(64, 0x01, 0x05, 0x00);
        let mut mbc = Mbc1::new(0x05, 0x00);

        mbc.write_control(0x4000, 0x01);
        assert_eq!(mbc.read_rom(&rom, 0x0000), 0x00);

        mbc.write_control(0x6000, 0x01);
        assert_eq!(mbc.low_bank(), 0x20);
        assert_eq!(mbc.read_rom(&rom, 0x0000), 0x20);
    }

    #[test]
    fn bank_number_is_masked_to_rom_size() {
        // 4 banks: only two bits of the register are used.
        let rom = build_rom(4, 0x01, 0x01, 0x00);
        let mut mbc = Mbc1::new(0x01, 0x00);

        mbc.write_control(0x2000, 0x06);
        assert_eq!(mbc.high_bank(), 0x02);
        assert_eq!(mbc.read_rom(&rom, 0x4000), 0x02);
    }

    #[test]
    fn multicart_uses_four_bit_primary() {
        let rom = build_rom(64, 0x01, 0x05, 0x00);
        let mut mbc = Mbc1::new(0x05, 0x00);

        mbc.write_control(0x4000, 0x01);
        mbc.write_control(0x2000, 0x12);
        assert_eq!(mbc.read_rom_multicart(&rom, 0x4000), 0x12);

        mbc.write_control(0x2000, 0x00);
        assert_eq!(mbc.read_rom_multicart(&rom, 0x4000), 0x11);

        mbc.write_control(0x6000, 0x01);
        assert_eq!(mbc.read_rom_multicart(&rom, 0x0000), 0x10);
    }

    #[test]
    fn ram_requires_enable() {
        let mut mbc = Mbc1::new(0x00, 0x02);

        mbc.write_ram(0xA000, 0x42);
        assert_eq!(mbc.read_ram(0xA000), 0xFF);

        mbc.write_control(0x0000, 0x0A);
        assert!(mbc.ram_enabled());
        mbc.write_ram(0xA000, 0x42);
        assert_eq!(mbc.read_ram(0xA000), 0x42);

        mbc.write_control(0x1FFF, 0x00);
        assert_eq!(mbc.read_ram(0xA000), 0xFF);
    }

    #[test]
    fn ram_banks_switch_only_in_mode_one() {
        let mut mbc = Mbc1::new(0x00, 0x03);
        mbc.write_control(0x0000, 0x0A);

        mbc.write_ram(0xA123, 0x11);
        mbc.write_control(0x4000, 0x02);
        assert_eq!(mbc.read_ram(0xA123), 0x11, "mode 0 ignores the RAM bank");

        mbc.write_control(0x6000, 0x01);
        assert_eq!(mbc.read_ram(0xA123), 0x00);
        mbc.write_ram(0xA123, 0x22);

        mbc.write_control(0x4000, 0x00);
        assert_eq!(mbc.read_ram(0xA123), 0x11);
    }
}
