pub mod app;
pub mod bits;
pub mod cpu;
pub mod error;
pub mod machine;

pub use app::GameBoyApp;
pub use error::{GbError, Result};
pub use machine::GameBoy;

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// Default integer scaling factor suggested to front ends.
pub const SCREEN_SCALE: u32 = 3;
/// Side length of the background plane the PPU renders into.
pub const BACKGROUND_SIZE: usize = 256;
/// T-cycles in one full DMG frame (154 lines of 456 cycles).
pub const CYCLES_PER_FRAME: u32 = 70_224;
