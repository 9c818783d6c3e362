use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gbz80_common::app::App;
use gbz80_common::key::Key;
use gbz80_common::Color;
use gbz80_core::machine::{TILE_SET_HEIGHT, TILE_SET_WIDTH};
use gbz80_core::{GameBoy, GameBoyApp};
use typed_builder::TypedBuilder;

/// Everything the headless runner needs for one session.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunConfig {
    pub rom: PathBuf,
    /// Without a boot ROM the machine starts in the post-boot state.
    #[builder(default)]
    pub boot_rom: Option<PathBuf>,
    #[builder(default = 60)]
    pub frames: u64,
    /// Where to write the last visible frame as a PNG.
    #[builder(default)]
    pub frame_out: Option<PathBuf>,
    /// Where to write the VRAM tile set as a PNG.
    #[builder(default)]
    pub tiles_out: Option<PathBuf>,
    /// Key held down for the whole run.
    #[builder(default)]
    pub hold: Option<Key>,
    /// Wire an MBC1 cartridge as a multicart.
    #[builder(default = false)]
    pub multicart: bool,
}

/// What a finished run looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub pc: u16,
    pub stopped: bool,
}

pub fn load_machine(config: &RunConfig) -> Result<GameBoy> {
    let rom = fs::read(&config.rom)
        .with_context(|| format!("failed to read ROM '{}'", config.rom.display()))?;
    log::info!("loaded ROM '{}' ({} bytes)", config.rom.display(), rom.len());

    let mut gb = match &config.boot_rom {
        Some(path) => {
            let boot = fs::read(path)
                .with_context(|| format!("failed to read boot ROM '{}'", path.display()))?;
            GameBoy::with_boot_rom(rom, &boot).context("failed to start with boot ROM")?
        }
        None => GameBoy::new(rom).context("failed to load cartridge")?,
    };

    if config.multicart {
        let mbc = gb.mmu().mbc().clone().into_multicart();
        gb.mmu_mut().set_mbc(mbc);
    }
    Ok(gb)
}

/// Drive an [`App`] for up to `frames` frames without a window.
///
/// Returns the screen buffer as last presented.
pub fn run_headless(app: &mut impl App, frames: u64, hold: Option<Key>) -> Vec<u8> {
    let mut screen = vec![0u8; (app.width() * app.height() * 3) as usize];

    app.init();
    if let Some(key) = hold {
        app.handle_key_event(key, true);
    }

    for _ in 0..frames {
        if app.should_exit() {
            break;
        }
        app.update(&mut screen);
    }

    if let Some(key) = hold {
        app.handle_key_event(key, false);
    }
    app.exit();
    screen
}

pub fn run(config: RunConfig) -> Result<RunSummary> {
    let gb = load_machine(&config)?;
    let mut app = GameBoyApp::new(gb);
    log::info!("running '{}' for {} frames", app.title(), config.frames);

    let screen = run_headless(&mut app, config.frames, config.hold);
    if app.frame_counter() < config.frames && !app.gb.cpu.is_stopped() {
        bail!(
            "emulation aborted after {} frames at PC=0x{:04X}",
            app.frame_counter(),
            app.gb.cpu.regs.pc
        );
    }

    if let Some(path) = &config.frame_out {
        write_png(path, app.width() as usize, app.height() as usize, &screen)?;
        log::info!("wrote frame to '{}'", path.display());
    }

    if let Some(path) = &config.tiles_out {
        let rgb = packed_to_rgb24(&app.gb.tile_set());
        write_png(path, TILE_SET_WIDTH, TILE_SET_HEIGHT, &rgb)?;
        log::info!("wrote tile set to '{}'", path.display());
    }

    Ok(RunSummary {
        frames: app.frame_counter(),
        pc: app.gb.cpu.regs.pc,
        stopped: app.gb.cpu.is_stopped(),
    })
}

fn packed_to_rgb24(pixels: &[u32]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|&p| {
            let (r, g, b) = Color::from_rgb24(p).rgb();
            [r, g, b]
        })
        .collect()
}

/// PNG encoding of an RGB24 buffer.
pub fn encode_png(width: usize, height: usize, rgb: &[u8]) -> Result<Vec<u8>> {
    if rgb.len() != width * height * 3 {
        bail!(
            "pixel buffer is {} bytes, expected {} for {}x{}",
            rgb.len(),
            width * height * 3,
            width,
            height
        );
    }

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)?;
    writer.finish()?;
    Ok(out)
}

pub fn write_png(path: &Path, width: usize, height: usize, rgb: &[u8]) -> Result<()> {
    let data = encode_png(width, height, rgb)?;
    fs::write(path, data).with_context(|| format!("failed to write '{}'", path.display()))
}
