mod mmio;

use crate::cpu::Bus;
use crate::error::{GbError, Result};

use super::cartridge::{Cartridge, Mbc};
use super::joypad::{Input, Joypad};
use super::ppu::Ppu;
use super::timer::Timer;

pub const BOOT_ROM_SIZE: usize = 0x100;
const VRAM_SIZE: usize = 0x2000;
const WRAM_SIZE: usize = 0x2000;
const OAM_SIZE: usize = 0xA0;
const ZRAM_SIZE: usize = 0x7F;

/// Memory dispatcher for the DMG address space.
///
/// Owns every RAM region and the memory-mapped peripherals so that a
/// single `&mut Mmu` is all the CPU needs.
pub struct Mmu {
    boot_rom: Option<[u8; BOOT_ROM_SIZE]>,
    boot_rom_enabled: bool,
    cartridge: Option<Cartridge>,
    mbc: Mbc,
    vram: Box<[u8; VRAM_SIZE]>,
    wram: Box<[u8; WRAM_SIZE]>,
    oam: [u8; OAM_SIZE],
    zram: [u8; ZRAM_SIZE],
    if_reg: u8,
    ie_reg: u8,
    timer: Timer,
    ppu: Ppu,
    joypad: Joypad,
}

impl Default for Mmu {
    fn default() -> Self {
        Self {
            boot_rom: None,
            boot_rom_enabled: false,
            cartridge: None,
            mbc: Mbc::NoMbc,
            vram: Box::new([0; VRAM_SIZE]),
            wram: Box::new([0; WRAM_SIZE]),
            oam: [0; OAM_SIZE],
            zram: [0; ZRAM_SIZE],
            if_reg: 0,
            ie_reg: 0,
            timer: Timer::new(),
            ppu: Ppu::new(),
            joypad: Joypad::new(),
        }
    }
}

impl Mmu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cartridge and select its bank controller from the header.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) {
        log::info!(
            "cartridge \"{}\": mbc=0x{:02X} rom_size=0x{:02X} ram_size=0x{:02X} sgb={}",
            cartridge.title(),
            cartridge.mbc_type(),
            cartridge.rom_size(),
            cartridge.ram_size(),
            cartridge.has_sgb_support(),
        );
        if !cartridge.is_logo_valid() {
            log::warn!("cartridge logo does not match the Nintendo logo");
        }
        if !cartridge.is_header_valid() {
            log::warn!("cartridge header checksum mismatch");
        }
        if !cartridge.is_cartridge_valid() {
            log::warn!("cartridge global checksum mismatch");
        }

        self.mbc = cartridge.create_mbc();
        self.cartridge = Some(cartridge);
    }

    /// Replace the bank controller chosen at load time, e.g. to wire an
    /// MBC1 cartridge as a multicart.
    pub fn set_mbc(&mut self, mbc: Mbc) {
        self.mbc = mbc;
    }

    #[inline]
    pub fn mbc(&self) -> &Mbc {
        &self.mbc
    }

    #[inline]
    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Map a 256-byte boot ROM over 0x0000-0x00FF until FF50 is written.
    pub fn load_boot_rom(&mut self, boot: &[u8]) -> Result<()> {
        let image: [u8; BOOT_ROM_SIZE] = boot
            .try_into()
            .map_err(|_| GbError::BootRomSize(boot.len()))?;
        self.boot_rom = Some(image);
        self.boot_rom_enabled = true;
        Ok(())
    }

    #[inline]
    pub fn is_boot_rom_enabled(&self) -> bool {
        self.boot_rom_enabled && self.boot_rom.is_some()
    }

    /// Seed the I/O registers the boot ROM would have configured.
    pub(crate) fn apply_post_boot_io(&mut self) {
        self.timer = Timer::post_boot();
        self.ppu = Ppu::post_boot();
        self.boot_rom_enabled = false;
    }

    #[inline]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    #[inline]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    #[inline]
    pub fn vram(&self) -> &[u8] {
        &self.vram[..]
    }

    #[inline]
    pub fn interrupt_flag(&self) -> u8 {
        self.if_reg
    }

    /// Advance the timer and run the PPU state machine.
    pub fn tick(&mut self, cycles: u32) {
        self.timer.tick(cycles, &mut self.if_reg);
        self.ppu.step(cycles, &self.vram[..], self.ie_reg, &mut self.if_reg);
    }

    /// Account for interrupt-dispatch cycles: the timer runs, the PPU only
    /// banks them for its next step.
    pub fn tick_interrupt(&mut self, cycles: u32) {
        if cycles == 0 {
            return;
        }
        self.timer.tick(cycles, &mut self.if_reg);
        self.ppu.add_cycles(cycles);
    }

    pub fn press(&mut self, input: Input) {
        self.joypad.press(input, &mut self.if_reg);
    }

    pub fn release(&mut self, input: Input) {
        self.joypad.release(input);
    }

    /// Zero every RAM region and the interrupt registers.
    pub fn clear_memory(&mut self) {
        self.vram.fill(0);
        self.wram.fill(0);
        self.oam.fill(0);
        self.zram.fill(0);
        self.if_reg = 0;
        self.ie_reg = 0;
    }

    /// Power-cycle everything except the inserted cartridge and boot ROM.
    pub fn reset(&mut self) {
        self.clear_memory();
        self.timer = Timer::new();
        self.ppu.clear();
        self.joypad = Joypad::new();
        self.boot_rom_enabled = self.boot_rom.is_some();
        if let Some(cart) = &self.cartridge {
            let multicart = matches!(self.mbc, Mbc::Mbc1Multicart(_));
            let mbc = cart.create_mbc();
            self.mbc = if multicart { mbc.into_multicart() } else { mbc };
        }
    }

    fn read_rom(&self, addr: u16) -> u8 {
        if addr < 0x0100 && self.boot_rom_enabled {
            if let Some(boot) = &self.boot_rom {
                return boot[addr as usize];
            }
        }
        match &self.cartridge {
            Some(cart) => self.mbc.read_rom(cart.rom(), addr),
            None => 0xFF,
        }
    }

    pub fn read8(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.read_rom(addr),
            0x8000..=0x9FFF => self.vram[(addr & 0x1FFF) as usize],
            0xA000..=0xBFFF => self.mbc.read_ram(addr),
            // Work RAM and its echo share one array.
            0xC000..=0xFDFF => self.wram[(addr & 0x1FFF) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            0xFEA0..=0xFEFF => 0,
            0xFF80..=0xFFFE => self.zram[(addr & 0x7F) as usize],
            0xFF00..=0xFF7F | 0xFFFF => self.read_io(addr),
        }
    }

    pub fn write8(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => self.mbc.write_rom(addr, value),
            0x8000..=0x9FFF => self.vram[(addr & 0x1FFF) as usize] = value,
            0xA000..=0xBFFF => self.mbc.write_ram(addr, value),
            0xC000..=0xFDFF => self.wram[(addr & 0x1FFF) as usize] = value,
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = value,
            0xFEA0..=0xFEFF => {}
            0xFF80..=0xFFFE => self.zram[(addr & 0x7F) as usize] = value,
            0xFF00..=0xFF7F | 0xFFFF => self.write_io(addr, value),
        }
    }
}

impl Bus for Mmu {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        Mmu::read8(self, addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        Mmu::write8(self, addr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::cartridge::tests::build_rom;

    fn mmu_with_rom() -> Mmu {
        let mut mmu = Mmu::new();
        let cart = Cartridge::from_bytes(build_rom(2, 0x00, 0x00, 0x00)).unwrap();
        mmu.load_cartridge(cart);
        mmu
    }

    #[test]
    fn echo_ram_mirrors_work_ram() {
        let mut mmu = Mmu::new();
        for offset in (0..0x1E00u16).step_by(0x1F) {
            mmu.write8(0xC000 + offset, offset as u8 ^ 0x5A);
            assert_eq!(mmu.read8(0xE000 + offset), offset as u8 ^ 0x5A);

            mmu.write8(0xE000 + offset, offset as u8);
            assert_eq!(mmu.read8(0xC000 + offset), offset as u8);
        }
        mmu.write8(0xFDFF, 0x77);
        assert_eq!(mmu.read8(0xDDFF), 0x77);
    }

    #[test]
    fn unusable_range_reads_zero() {
        let mut mmu = Mmu::new();
        for addr in 0xFEA0..=0xFEFFu16 {
            mmu.write8(addr, 0xAA);
            assert_eq!(mmu.read8(addr), 0);
        }
        assert_eq!(mmu.read8(0xFE9F), 0);
    }

    #[test]
    fn oam_covers_all_160_bytes() {
        let mut mmu = Mmu::new();
        mmu.write8(0xFE00, 0x01);
        mmu.write8(0xFE9F, 0x9F);
        assert_eq!(mmu.read8(0xFE00), 0x01);
        assert_eq!(mmu.read8(0xFE9F), 0x9F);
    }

    #[test]
    fn word_access_is_little_endian() {
        let mut mmu = Mmu::new();
        Bus::write16(&mut mmu, 0xC100, 0x0150);
        assert_eq!(Bus::read16(&mut mmu, 0xC100), 0x0150);
        assert_eq!(mmu.read8(0xC100), 0x50);
        assert_eq!(mmu.read8(0xC101), 0x01);
    }

    #[test]
    fn zero_page_and_interrupt_enable_are_separate() {
        let mut mmu = Mmu::new();
        mmu.write8(0xFF80, 0x11);
        mmu.write8(0xFFFE, 0x22);
        mmu.write8(0xFFFF, 0x1F);
        assert_eq!(mmu.read8(0xFF80), 0x11);
        assert_eq!(mmu.read8(0xFFFE), 0x22);
        assert_eq!(mmu.read8(0xFFFF), 0x1F);
    }

    #[test]
    fn interrupt_flag_top_bits_read_high() {
        let mut mmu = Mmu::new();
        assert_eq!(mmu.read8(0xFF0F), 0xE0);
        mmu.write8(0xFF0F, 0x05);
        assert_eq!(mmu.read8(0xFF0F), 0xE5);
        assert_eq!(mmu.interrupt_flag(), 0x05);

        // Writing back a padded read keeps only the five request bits.
        mmu.write8(0xFF0F, 0xE4);
        assert_eq!(mmu.interrupt_flag(), 0x04);
    }

    #[test]
    fn boot_rom_overlays_until_disabled() {
        let mut mmu = mmu_with_rom();
        let boot = [0x31u8; BOOT_ROM_SIZE];
        mmu.load_boot_rom(&boot).unwrap();

        assert_eq!(mmu.read8(0x0000), 0x31);
        assert_eq!(mmu.read8(0x0104), 0xCE, "header is outside the overlay");

        mmu.write8(0xFF50, 0x01);
        assert!(!mmu.is_boot_rom_enabled());
        assert_eq!(mmu.read8(0x0000), 0x00);

        mmu.write8(0xFF50, 0x00);
        assert_eq!(mmu.read8(0x0000), 0x00, "disable latch is one-way");
    }

    #[test]
    fn boot_rom_must_be_256_bytes() {
        let mut mmu = Mmu::new();
        let err = mmu.load_boot_rom(&[0; 255]).unwrap_err();
        assert_eq!(err, GbError::BootRomSize(255));
    }

    #[test]
    fn rom_writes_never_modify_rom() {
        let mut mmu = mmu_with_rom();
        mmu.write8(0x4000, 0x99);
        assert_eq!(mmu.read8(0x4000), 0x01);
    }

    #[test]
    fn external_ram_without_mbc_reads_ff() {
        let mut mmu = mmu_with_rom();
        mmu.write8(0xA000, 0x12);
        assert_eq!(mmu.read8(0xA000), 0xFF);
    }

    #[test]
    fn mbc1_ram_through_bus() {
        let mut mmu = Mmu::new();
        let cart = Cartridge::from_bytes(build_rom(4, 0x03, 0x01, 0x02)).unwrap();
        mmu.load_cartridge(cart);

        mmu.write8(0x0000, 0x0A);
        mmu.write8(0xB000, 0x5C);
        assert_eq!(mmu.read8(0xB000), 0x5C);

        mmu.write8(0x2000, 0x02);
        assert_eq!(mmu.read8(0x4000), 0x02);
    }

    #[test]
    fn cgb_speed_register_reads_ff() {
        let mmu = Mmu::new();
        assert_eq!(mmu.read8(0xFF4D), 0xFF);
        assert_eq!(mmu.read8(0xFF01), 0x00);
    }

    #[test]
    fn peripheral_registers_are_mapped() {
        let mut mmu = Mmu::new();
        mmu.write8(0xFF06, 0x42);
        assert_eq!(mmu.read8(0xFF06), 0x42);

        mmu.write8(0xFF42, 0x10);
        mmu.write8(0xFF43, 0x20);
        assert_eq!(mmu.read8(0xFF42), 0x10);
        assert_eq!(mmu.read8(0xFF43), 0x20);

        mmu.write8(0xFF00, 0x20);
        mmu.press(Input::Down);
        assert_eq!(mmu.read8(0xFF00), 0xC0 | 0x20 | 0x07);
        assert_eq!(mmu.read8(0xFF0F) & 0x10, 0x10);
    }

    #[test]
    fn timer_interrupt_lands_in_if() {
        let mut mmu = Mmu::new();
        mmu.write8(0xFF07, 0x05);
        mmu.write8(0xFF05, 0xFF);
        mmu.tick(16);
        assert_eq!(mmu.read8(0xFF0F) & 0x04, 0x04);
    }

    #[test]
    fn clear_memory_zeroes_ram() {
        let mut mmu = Mmu::new();
        mmu.write8(0x8000, 1);
        mmu.write8(0xC000, 2);
        mmu.write8(0xFE00, 3);
        mmu.write8(0xFF80, 4);
        mmu.write8(0xFFFF, 5);

        mmu.clear_memory();
        for addr in [0x8000, 0xC000, 0xFE00, 0xFF80, 0xFFFF] {
            assert_eq!(mmu.read8(addr), 0);
        }
    }
}
