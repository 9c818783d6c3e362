use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gbz80::RunConfig;
use gbz80_common::key::Key;

/// Headless DMG Game Boy runner
#[derive(Parser, Debug)]
#[command(name = "gbz80")]
#[command(about = "Run a Game Boy ROM headlessly and dump what it drew", long_about = None)]
struct Args {
    /// Path to the cartridge ROM
    rom: PathBuf,

    /// 256-byte DMG boot ROM; without it the machine starts post-boot
    #[arg(short, long)]
    boot_rom: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 60)]
    frames: u64,

    /// Write the final 160x144 frame as a PNG image
    #[arg(short = 'o', long)]
    frame_out: Option<PathBuf>,

    /// Write the VRAM tile set as a PNG image
    #[arg(short, long)]
    tiles_out: Option<PathBuf>,

    /// Keyboard key held for the whole run (z, x, a, s, up, down, left, right)
    #[arg(long)]
    hold: Option<Key>,

    /// Treat an MBC1 cartridge as a multicart
    #[arg(long)]
    multicart: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = RunConfig::builder()
        .rom(args.rom)
        .boot_rom(args.boot_rom)
        .frames(args.frames)
        .frame_out(args.frame_out)
        .tiles_out(args.tiles_out)
        .hold(args.hold)
        .multicart(args.multicart)
        .build();

    let summary = gbz80::run(config)?;
    log::info!(
        "finished {} frames, PC=0x{:04X}{}",
        summary.frames,
        summary.pc,
        if summary.stopped { " (stopped)" } else { "" }
    );
    Ok(())
}
