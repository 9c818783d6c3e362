use crate::cpu::Interrupt;
use crate::BACKGROUND_SIZE;

pub const LCDC_ADDR: u16 = 0xFF40;
pub const STAT_ADDR: u16 = 0xFF41;
pub const SCY_ADDR: u16 = 0xFF42;
pub const SCX_ADDR: u16 = 0xFF43;
pub const LY_ADDR: u16 = 0xFF44;
pub const BGP_ADDR: u16 = 0xFF47;

const OAM_SCAN_CYCLES: u32 = 80;
const TRANSFER_CYCLES: u32 = 172;
const HBLANK_CYCLES: u32 = 204;
const LINE_CYCLES: u32 = 456;
const LAST_VISIBLE_LINE: u8 = 143;
const LAST_LINE: u8 = 153;

/// Lightest to darkest DMG green.
pub const DMG_COLORS: [u32; 4] = [0xE0F8D0, 0x88C070, 0x346856, 0x081820];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

/// Scanline timing state machine plus background renderer.
///
/// VRAM is owned by the MMU and handed in for rendering; the PPU keeps
/// only its registers and the 256x256 background framebuffer.
#[derive(Clone, Debug)]
pub struct Ppu {
    lcdc: u8,
    stat: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    bgp: u8,
    palette: [u32; 4],
    mode: PpuMode,
    cycles: u32,
    framebuffer: Vec<u32>,
}

impl Default for Ppu {
    fn default() -> Self {
        let mut ppu = Self {
            lcdc: 0,
            stat: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            bgp: 0,
            palette: DMG_COLORS,
            mode: PpuMode::OamScan,
            cycles: 0,
            framebuffer: vec![DMG_COLORS[0]; BACKGROUND_SIZE * BACKGROUND_SIZE],
        };
        ppu.set_mode(PpuMode::OamScan);
        ppu
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register state the boot ROM leaves behind (LCD and BG on, BGP=0xFC).
    pub(crate) fn post_boot() -> Self {
        let mut ppu = Self::default();
        ppu.lcdc = 0x91;
        ppu.set_bgp(0xFC);
        ppu
    }

    #[inline]
    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    #[inline]
    pub fn ly(&self) -> u8 {
        self.ly
    }

    /// 256x256 RGB colors, row-major.
    #[inline]
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    #[inline]
    pub fn palette(&self) -> [u32; 4] {
        self.palette
    }

    fn set_mode(&mut self, mode: PpuMode) {
        self.mode = mode;
        self.stat = (self.stat & !0x03) | mode as u8;
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            LCDC_ADDR => self.lcdc,
            STAT_ADDR => self.stat,
            SCY_ADDR => self.scy,
            SCX_ADDR => self.scx,
            LY_ADDR => self.ly,
            BGP_ADDR => self.bgp,
            _ => 0,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            LCDC_ADDR => self.lcdc = value,
            // Mode bits are owned by the state machine.
            STAT_ADDR => self.stat = (value & !0x03) | (self.stat & 0x03),
            SCY_ADDR => self.scy = value,
            SCX_ADDR => self.scx = value,
            // Writing LY restarts the line counter.
            LY_ADDR => self.ly = 0,
            BGP_ADDR => self.set_bgp(value),
            _ => {}
        }
    }

    fn set_bgp(&mut self, value: u8) {
        self.bgp = value;
        for (i, entry) in self.palette.iter_mut().enumerate() {
            *entry = DMG_COLORS[((value >> (2 * i)) & 0x03) as usize];
        }
    }

    /// Count cycles without running any transitions.
    ///
    /// Used for interrupt-dispatch cycles, which the next [`Ppu::step`]
    /// consumes.
    #[inline]
    pub fn add_cycles(&mut self, cycles: u32) {
        self.cycles += cycles;
    }

    /// Accumulate `cycles` and perform at most one mode transition.
    ///
    /// Entering line 144 requests VBlank in `if_reg` only when `ie` enables it.
    pub fn step(&mut self, cycles: u32, vram: &[u8], ie: u8, if_reg: &mut u8) {
        self.cycles += cycles;

        match self.mode {
            PpuMode::OamScan => {
                if self.cycles >= OAM_SCAN_CYCLES {
                    self.cycles -= OAM_SCAN_CYCLES;
                    self.set_mode(PpuMode::Transfer);
                }
            }
            PpuMode::Transfer => {
                if self.cycles >= TRANSFER_CYCLES {
                    self.cycles -= TRANSFER_CYCLES;
                    self.set_mode(PpuMode::HBlank);
                    self.render_scan_line(self.ly, vram);
                }
            }
            PpuMode::HBlank => {
                if self.cycles >= HBLANK_CYCLES {
                    self.cycles -= HBLANK_CYCLES;
                    self.ly += 1;
                    if self.ly > LAST_VISIBLE_LINE {
                        let mask = Interrupt::VBlank.mask();
                        if ie & mask != 0 {
                            *if_reg |= mask;
                        }
                        self.set_mode(PpuMode::VBlank);
                    } else {
                        self.set_mode(PpuMode::OamScan);
                    }
                }
            }
            PpuMode::VBlank => {
                if self.cycles >= LINE_CYCLES {
                    self.cycles -= LINE_CYCLES;
                    self.ly += 1;
                    if self.ly > LAST_LINE {
                        self.ly = 0;
                        self.set_mode(PpuMode::OamScan);
                    }
                }
            }
        }
    }

    /// Address of a background tile's 16 data bytes for the current LCDC.
    fn tile_data_addr(&self, tile_index: u8) -> u16 {
        if self.lcdc & 0x10 != 0 {
            0x8000 + tile_index as u16 * 16
        } else {
            0x9000u16.wrapping_add((tile_index as i8 as i16 * 16) as u16)
        }
    }

    /// Colour index (0-3) of one pixel of the tile whose data starts at
    /// `addr`. Offsets wrap inside the 8 KiB of VRAM.
    fn tile_pixel(vram: &[u8], addr: u16, row: u8, col: u8) -> u8 {
        let base = addr as usize + row as usize * 2;
        let lo = vram[base & 0x1FFF];
        let hi = vram[(base + 1) & 0x1FFF];
        let bit = 7 - col;
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    /// Draw the tile row containing `line` across all 32 map columns.
    pub fn render_scan_line(&mut self, line: u8, vram: &[u8]) {
        let map_base: u16 = if self.lcdc & 0x08 != 0 { 0x9C00 } else { 0x9800 };
        let map_row = (line / 8) as u16;
        let tile_row = line % 8;
        let y = line.wrapping_sub(self.scy) as usize;

        for column in 0..32u16 {
            let map_addr = map_base + map_row * 32 + column;
            let tile_index = vram[(map_addr - 0x8000) as usize];
            let tile_addr = self.tile_data_addr(tile_index);

            for px in 0..8u8 {
                let color = Self::tile_pixel(vram, tile_addr, tile_row, px);
                let x = ((column as u8) * 8 + px).wrapping_sub(self.scx) as usize;
                self.framebuffer[y * BACKGROUND_SIZE + x] = self.palette[color as usize];
            }
        }
    }

    /// One 8x8 tile from VRAM through the current palette, row-major.
    pub fn tile_pixels(&self, vram: &[u8], addr: u16) -> [u32; 64] {
        let mut out = [0u32; 64];
        for row in 0..8u8 {
            for col in 0..8u8 {
                let color = Self::tile_pixel(vram, addr, row, col);
                out[row as usize * 8 + col as usize] = self.palette[color as usize];
            }
        }
        out
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
