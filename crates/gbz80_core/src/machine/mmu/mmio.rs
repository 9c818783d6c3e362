use crate::machine::joypad::JOYP_ADDR;
use crate::machine::ppu::{BGP_ADDR, LCDC_ADDR, LY_ADDR, SCX_ADDR, SCY_ADDR, STAT_ADDR};
use crate::machine::timer::{DIV_ADDR, TAC_ADDR};

use super::Mmu;

const IF_ADDR: u16 = 0xFF0F;
const KEY1_ADDR: u16 = 0xFF4D;
const BOOT_OFF_ADDR: u16 = 0xFF50;
const IE_ADDR: u16 = 0xFFFF;

impl Mmu {
    pub(super) fn read_io(&self, addr: u16) -> u8 {
        match addr {
            JOYP_ADDR => self.joypad.read(),
            DIV_ADDR..=TAC_ADDR => self.timer.read(addr),
            // Bits 5-7 of IF are unconnected and read back as 1.
            IF_ADDR => self.if_reg | 0xE0,
            LCDC_ADDR | STAT_ADDR | SCY_ADDR | SCX_ADDR | LY_ADDR | BGP_ADDR => {
                self.ppu.read(addr)
            }
            // No double-speed mode on DMG.
            KEY1_ADDR => 0xFF,
            IE_ADDR => self.ie_reg,
            _ => 0,
        }
    }

    pub(super) fn write_io(&mut self, addr: u16, value: u8) {
        match addr {
            JOYP_ADDR => self.joypad.write(value),
            DIV_ADDR..=TAC_ADDR => self.timer.write(addr, value),
            IF_ADDR => self.if_reg = value & 0x1F,
            LCDC_ADDR | STAT_ADDR | SCY_ADDR | SCX_ADDR | LY_ADDR | BGP_ADDR => {
                self.ppu.write(addr, value)
            }
            BOOT_OFF_ADDR => {
                if self.boot_rom_enabled {
                    log::debug!("boot ROM disabled");
                }
                self.boot_rom_enabled = false;
            }
            IE_ADDR => self.ie_reg = value,
            _ => {}
        }
    }
}
