mod cartridge;
mod gameboy;
mod joypad;
mod mmu;
mod ppu;
mod timer;

pub use cartridge::{Cartridge, Mbc, Mbc1, NINTENDO_LOGO};
pub use gameboy::{GameBoy, TILE_SET_HEIGHT, TILE_SET_WIDTH};
pub use joypad::{Input, Joypad};
pub use mmu::{Mmu, BOOT_ROM_SIZE};
pub use ppu::{Ppu, PpuMode, DMG_COLORS};
pub use timer::Timer;
