use thiserror::Error;

use crate::cpu::Reg;

/// Fatal conditions raised by the emulation core.
///
/// None of these are recoverable for the running session: a register
/// range violation or an unknown opcode means PC no longer tracks the
/// real instruction stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GbError {
    #[error("value 0x{value:X} does not fit register {reg:?}")]
    RegisterRange { reg: Reg, value: u32 },

    #[error("unhandled opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    UnhandledOpcode { opcode: u8, pc: u16 },

    #[error("unhandled CB opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    UnhandledCbOpcode { opcode: u8, pc: u16 },

    #[error("boot ROM must be exactly 256 bytes, got {0}")]
    BootRomSize(usize),

    #[error("ROM image is {0} bytes, too small to hold a cartridge header")]
    RomTooSmall(usize),
}

pub type Result<T> = std::result::Result<T, GbError>;
