mod mbc1;

pub use mbc1::Mbc1;

use crate::error::{GbError, Result};

/// Smallest image that still holds the whole cartridge header.
pub const HEADER_END: usize = 0x150;

const TITLE: std::ops::Range<usize> = 0x134..0x144;
const LOGO: std::ops::Range<usize> = 0x104..0x134;
const SGB_FLAG: usize = 0x146;
const MBC_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
const HEADER_CHECKSUM: usize = 0x14D;
const GLOBAL_CHECKSUM_HI: usize = 0x14E;
const GLOBAL_CHECKSUM_LO: usize = 0x14F;

/// Nintendo logo bitmap the boot ROM compares against 0x104..0x134.
pub const NINTENDO_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// Immutable cartridge ROM image plus its header fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cartridge {
    rom: Vec<u8>,
}

impl Cartridge {
    pub fn from_bytes(rom: Vec<u8>) -> Result<Self> {
        if rom.len() < HEADER_END {
            return Err(GbError::RomTooSmall(rom.len()));
        }
        Ok(Self { rom })
    }

    #[inline]
    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    /// Header title, up to the first NUL.
    pub fn title(&self) -> String {
        let raw = &self.rom[TITLE];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
    }

    #[inline]
    pub fn mbc_type(&self) -> u8 {
        self.rom[MBC_TYPE]
    }

    /// ROM size code; the image holds `2 << code` banks of 16 KiB.
    #[inline]
    pub fn rom_size(&self) -> u8 {
        self.rom[ROM_SIZE]
    }

    #[inline]
    pub fn ram_size(&self) -> u8 {
        self.rom[RAM_SIZE]
    }

    pub fn has_sgb_support(&self) -> bool {
        self.rom[SGB_FLAG] == 0x03
    }

    pub fn is_logo_valid(&self) -> bool {
        self.rom[LOGO] == NINTENDO_LOGO
    }

    /// Checksum over 0x134..=0x14C as computed by the boot ROM.
    pub fn header_checksum(&self) -> u8 {
        self.rom[0x134..=0x14C]
            .iter()
            .fold(0u8, |x, &b| x.wrapping_sub(b).wrapping_sub(1))
    }

    pub fn is_header_valid(&self) -> bool {
        self.header_checksum() == self.rom[HEADER_CHECKSUM]
    }

    /// 16-bit sum of every byte in the image except the checksum itself.
    pub fn global_checksum(&self) -> u16 {
        self.rom
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != GLOBAL_CHECKSUM_HI && *i != GLOBAL_CHECKSUM_LO)
            .fold(0u16, |sum, (_, &b)| sum.wrapping_add(b as u16))
    }

    pub fn is_cartridge_valid(&self) -> bool {
        let stored = u16::from_be_bytes([
            self.rom[GLOBAL_CHECKSUM_HI],
            self.rom[GLOBAL_CHECKSUM_LO],
        ]);
        self.global_checksum() == stored
    }

    /// Pick the bank controller declared by the header.
    pub fn create_mbc(&self) -> Mbc {
        match self.mbc_type() {
            0x00 => Mbc::NoMbc,
            0x01..=0x03 => Mbc::Mbc1(Mbc1::new(self.rom_size(), self.ram_size())),
            other => {
                log::warn!("unsupported MBC type 0x{other:02X}, mapping ROM without banking");
                Mbc::NoMbc
            }
        }
    }
}

/// Bank controller variant, chosen once when the cartridge is inserted.
#[derive(Clone, Debug, Default)]
pub enum Mbc {
    /// 32 KiB ROM mapped directly, no external RAM.
    #[default]
    NoMbc,
    Mbc1(Mbc1),
    /// MBC1 wired for multi-game carts: only four bits of the primary
    /// bank register reach the ROM.
    Mbc1Multicart(Mbc1),
}

impl Mbc {
    pub fn read_rom(&self, rom: &[u8], addr: u16) -> u8 {
        match self {
            Mbc::NoMbc => rom.get(addr as usize).copied().unwrap_or(0xFF),
            Mbc::Mbc1(m) => m.read_rom(rom, addr),
            Mbc::Mbc1Multicart(m) => m.read_rom_multicart(rom, addr),
        }
    }

    pub fn write_rom(&mut self, addr: u16, value: u8) {
        match self {
            Mbc::NoMbc => {}
            Mbc::Mbc1(m) | Mbc::Mbc1Multicart(m) => m.write_control(addr, value),
        }
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        match self {
            Mbc::NoMbc => 0xFF,
            Mbc::Mbc1(m) | Mbc::Mbc1Multicart(m) => m.read_ram(addr),
        }
    }

    pub fn write_ram(&mut self, addr: u16, value: u8) {
        match self {
            Mbc::NoMbc => {}
            Mbc::Mbc1(m) | Mbc::Mbc1Multicart(m) => m.write_ram(addr, value),
        }
    }

    /// Convert an MBC1 controller to its multicart wiring.
    pub fn into_multicart(self) -> Self {
        match self {
            Mbc::Mbc1(m) => Mbc::Mbc1Multicart(m),
            other => other,
        }
    }
}
