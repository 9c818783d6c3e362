use crate::cpu::Cpu;
use crate::error::Result;
use crate::{BACKGROUND_SIZE, CYCLES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH};

use super::cartridge::Cartridge;
use super::joypad::Input;
use super::mmu::Mmu;

/// Tiles stored in VRAM at 0x8000-0x97FF.
const TILE_COUNT: usize = 384;
const TILES_PER_ROW: usize = 16;
pub const TILE_SET_WIDTH: usize = TILES_PER_ROW * 8;
pub const TILE_SET_HEIGHT: usize = TILE_COUNT / TILES_PER_ROW * 8;

/// A whole DMG: CPU plus the memory dispatcher and its peripherals.
///
/// This is the only owner of machine state; every component reaches the
/// others through it.
pub struct GameBoy {
    pub cpu: Cpu,
    mmu: Mmu,
    /// Cycles the previous frame ran past its budget.
    frame_carry: u32,
}

impl GameBoy {
    /// Start from the state the boot ROM leaves behind, with PC at 0x0100.
    pub fn new(rom: Vec<u8>) -> Result<Self> {
        let mut mmu = Mmu::new();
        mmu.load_cartridge(Cartridge::from_bytes(rom)?);
        mmu.apply_post_boot_io();

        Ok(Self {
            cpu: Cpu::post_boot(),
            mmu,
            frame_carry: 0,
        })
    }

    /// Start at PC=0 with `boot` mapped over the cartridge.
    pub fn with_boot_rom(rom: Vec<u8>, boot: &[u8]) -> Result<Self> {
        let mut mmu = Mmu::new();
        mmu.load_boot_rom(boot)?;
        mmu.load_cartridge(Cartridge::from_bytes(rom)?);

        Ok(Self {
            cpu: Cpu::new(),
            mmu,
            frame_carry: 0,
        })
    }

    #[inline]
    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    #[inline]
    pub fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    /// Power-cycle the machine, keeping the cartridge and boot ROM. This is
    /// the only way out of STOP.
    pub fn reset(&mut self) {
        self.mmu.reset();
        if self.mmu.is_boot_rom_enabled() {
            self.cpu = Cpu::new();
        } else {
            self.mmu.apply_post_boot_io();
            self.cpu = Cpu::post_boot();
        }
        self.frame_carry = 0;
        log::info!("machine reset, PC=0x{:04X}", self.cpu.regs.pc);
    }

    /// One instruction followed by one interrupt check.
    ///
    /// Returns the T-cycles consumed, or 0 once the CPU is stopped.
    pub fn step(&mut self) -> Result<u32> {
        if self.cpu.is_stopped() {
            return Ok(0);
        }

        let cycles = self.cpu.next_instruction(&mut self.mmu)?;
        self.mmu.tick(cycles);

        let irq_cycles = self.cpu.handle_interrupt(&mut self.mmu);
        self.mmu.tick_interrupt(irq_cycles);

        Ok(cycles + irq_cycles)
    }

    /// Like [`GameBoy::step`], logging the register file afterwards.
    pub fn debug_step(&mut self) -> Result<u32> {
        let cycles = self.step()?;
        let regs = &self.cpu.regs;
        log::debug!(
            "cycles={} PC=0x{:04X} SP=0x{:04X} AF=0x{:04X} BC=0x{:04X} DE=0x{:04X} HL=0x{:04X} IME={} state={:?} IF=0x{:02X}",
            cycles,
            regs.pc,
            regs.sp,
            regs.af(),
            regs.bc(),
            regs.de(),
            regs.hl(),
            self.cpu.ime,
            self.cpu.state(),
            self.mmu.interrupt_flag(),
        );
        Ok(cycles)
    }

    /// Run until one frame's worth of cycles (70224) has elapsed.
    ///
    /// Any overshoot is credited to the next frame. Returns early without
    /// error if the CPU stops.
    pub fn step_frame(&mut self) -> Result<()> {
        let mut elapsed = self.frame_carry;
        while elapsed < CYCLES_PER_FRAME {
            let cycles = self.step()?;
            if cycles == 0 {
                log::debug!("CPU stopped at PC=0x{:04X}", self.cpu.regs.pc);
                break;
            }
            elapsed += cycles;
        }
        self.frame_carry = elapsed.saturating_sub(CYCLES_PER_FRAME);
        Ok(())
    }

    pub fn press(&mut self, input: Input) {
        self.mmu.press(input);
    }

    pub fn release(&mut self, input: Input) {
        self.mmu.release(input);
    }

    /// Full 256x256 background plane as packed 0xRRGGBB.
    #[inline]
    pub fn framebuffer(&self) -> &[u32] {
        self.mmu.ppu().framebuffer()
    }

    /// Top-left 160x144 of the background plane as RGB24 bytes.
    pub fn visible_frame(&self) -> Vec<u8> {
        let fb = self.framebuffer();
        let mut out = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3);
        for row in fb.chunks_exact(BACKGROUND_SIZE).take(SCREEN_HEIGHT) {
            for &color in &row[..SCREEN_WIDTH] {
                let [_, r, g, b] = color.to_be_bytes();
                out.extend_from_slice(&[r, g, b]);
            }
        }
        out
    }

    /// Every VRAM tile through the current palette, 16 tiles per row
    /// (128x192 pixels, packed 0xRRGGBB).
    pub fn tile_set(&self) -> Vec<u32> {
        let ppu = self.mmu.ppu();
        let vram = self.mmu.vram();
        let mut out = vec![0u32; TILE_SET_WIDTH * TILE_SET_HEIGHT];

        for tile in 0..TILE_COUNT {
            let pixels = ppu.tile_pixels(vram, 0x8000 + (tile * 16) as u16);
            let origin_x = (tile % TILES_PER_ROW) * 8;
            let origin_y = (tile / TILES_PER_ROW) * 8;
            for (i, &color) in pixels.iter().enumerate() {
                let x = origin_x + i % 8;
                let y = origin_y + i / 8;
                out[y * TILE_SET_WIDTH + x] = color;
            }
        }
        out
    }
}
