use bitflags::bitflags;

use crate::bits;
use crate::error::{GbError, Result};

bitflags! {
    /// Flag bits in the F register.
    ///
    /// Layout (bit index in the byte, from MSB to LSB):
    /// - bit 7: Z (zero)
    /// - bit 6: N (subtract)
    /// - bit 5: H (half carry)
    /// - bit 4: C (carry)
    /// - bits 0–3 are always zero.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const Z = 1 << 7;
        const N = 1 << 6;
        const H = 1 << 5;
        const C = 1 << 4;
    }
}

impl Flags {
    /// Unpack a raw F byte. The low nibble is discarded.
    #[inline]
    pub const fn from_byte(value: u8) -> Self {
        Self::from_bits_truncate(value)
    }

    #[inline]
    pub const fn to_byte(self) -> u8 {
        self.bits()
    }
}

/// Named register operands.
///
/// Covers the seven 8-bit registers, F, the two 16-bit pointers and the
/// four concatenated pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    PC,
    SP,
    AF,
    BC,
    DE,
    HL,
}

impl Reg {
    #[inline]
    pub const fn is_wide(self) -> bool {
        matches!(
            self,
            Reg::PC | Reg::SP | Reg::AF | Reg::BC | Reg::DE | Reg::HL
        )
    }

    /// Decode the 3-bit register field used by most opcodes.
    ///
    /// The encoding is 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A. Index 6
    /// is a memory operand, so it maps to `None`.
    #[inline]
    pub const fn from_r8_index(index: u8) -> Option<Reg> {
        match index & 0x07 {
            0 => Some(Reg::B),
            1 => Some(Reg::C),
            2 => Some(Reg::D),
            3 => Some(Reg::E),
            4 => Some(Reg::H),
            5 => Some(Reg::L),
            7 => Some(Reg::A),
            _ => None,
        }
    }

    /// Decode the 2-bit pair field of LD rr,d16 / INC rr / ADD HL,rr.
    #[inline]
    pub const fn from_rp_index(index: u8) -> Reg {
        match index & 0x03 {
            0 => Reg::BC,
            1 => Reg::DE,
            2 => Reg::HL,
            _ => Reg::SP,
        }
    }

    /// Decode the 2-bit pair field of PUSH/POP, where 3 selects AF.
    #[inline]
    pub const fn from_rp2_index(index: u8) -> Reg {
        match index & 0x03 {
            0 => Reg::BC,
            1 => Reg::DE,
            2 => Reg::HL,
            _ => Reg::AF,
        }
    }
}

/// Registers for the Game Boy CPU (LR35902).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Register values the DMG boot ROM leaves behind when it hands control
    /// to the cartridge at 0x0100.
    pub fn post_boot() -> Self {
        let mut regs = Self::default();
        regs.set_af(0x01B0);
        regs.set_bc(0x0013);
        regs.set_de(0x00D8);
        regs.set_hl(0x014D);
        regs.sp = 0xFFFE;
        regs.pc = 0x0100;
        regs
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f.to_byte()])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.f = Flags::from_byte(f);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    /// Read any register by name. 8-bit registers are zero-extended.
    pub fn read(&self, reg: Reg) -> u16 {
        match reg {
            Reg::A => self.a as u16,
            Reg::F => self.f.to_byte() as u16,
            Reg::B => self.b as u16,
            Reg::C => self.c as u16,
            Reg::D => self.d as u16,
            Reg::E => self.e as u16,
            Reg::H => self.h as u16,
            Reg::L => self.l as u16,
            Reg::PC => self.pc,
            Reg::SP => self.sp,
            Reg::AF => self.af(),
            Reg::BC => self.bc(),
            Reg::DE => self.de(),
            Reg::HL => self.hl(),
        }
    }

    /// Write any register by name.
    ///
    /// Fails with [`GbError::RegisterRange`] when `value` does not fit the
    /// register; nothing is written in that case.
    pub fn write(&mut self, reg: Reg, value: u32) -> Result<()> {
        let fits = if reg.is_wide() {
            bits::is_word(value)
        } else {
            bits::is_byte(value)
        };
        if !fits {
            return Err(GbError::RegisterRange { reg, value });
        }

        let byte = value as u8;
        let word = value as u16;
        match reg {
            Reg::A => self.a = byte,
            Reg::F => self.f = Flags::from_byte(byte),
            Reg::B => self.b = byte,
            Reg::C => self.c = byte,
            Reg::D => self.d = byte,
            Reg::E => self.e = byte,
            Reg::H => self.h = byte,
            Reg::L => self.l = byte,
            Reg::PC => self.pc = word,
            Reg::SP => self.sp = word,
            Reg::AF => self.set_af(word),
            Reg::BC => self.set_bc(word),
            Reg::DE => self.set_de(word),
            Reg::HL => self.set_hl(word),
        }
        Ok(())
    }

    /// Infallible 8-bit store used by the instruction decoder, whose
    /// operands are already typed as bytes.
    #[inline]
    pub(crate) fn set8(&mut self, reg: Reg, value: u8) {
        match reg {
            Reg::A => self.a = value,
            Reg::F => self.f = Flags::from_byte(value),
            Reg::B => self.b = value,
            Reg::C => self.c = value,
            Reg::D => self.d = value,
            Reg::E => self.e = value,
            Reg::H => self.h = value,
            Reg::L => self.l = value,
            wide => unreachable!("set8 on 16-bit register {wide:?}"),
        }
    }

    /// Infallible 16-bit store used by the instruction decoder.
    #[inline]
    pub(crate) fn set16(&mut self, reg: Reg, value: u16) {
        match reg {
            Reg::PC => self.pc = value,
            Reg::SP => self.sp = value,
            Reg::AF => self.set_af(value),
            Reg::BC => self.set_bc(value),
            Reg::DE => self.set_de(value),
            Reg::HL => self.set_hl(value),
            narrow => unreachable!("set16 on 8-bit register {narrow:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BYTE_REGS: [Reg; 7] = [Reg::A, Reg::B, Reg::C, Reg::D, Reg::E, Reg::H, Reg::L];

    #[test]
    fn byte_registers_hold_every_byte_value() {
        let mut regs = Registers::default();
        for reg in BYTE_REGS {
            for value in 0..=0xFFu32 {
                regs.write(reg, value).unwrap();
                assert_eq!(regs.read(reg), value as u16, "{reg:?}");
            }
        }
    }

    #[test]
    fn out_of_range_writes_fail_without_side_effects() {
        let mut regs = Registers::default();
        regs.b = 0x12;
        assert_eq!(
            regs.write(Reg::B, 0x100),
            Err(GbError::RegisterRange {
                reg: Reg::B,
                value: 0x100
            })
        );
        assert_eq!(regs.b, 0x12);
        assert!(regs.write(Reg::HL, 0x1_0000).is_err());
        assert!(regs.write(Reg::SP, 0xFFFF).is_ok());
    }

    #[test]
    #[should_panic(expected = "set8 on 16-bit register HL")]
    fn byte_store_into_pair_panics() {
        Registers::default().set8(Reg::HL, 0x12);
    }

    #[test]
    #[should_panic(expected = "set16 on 8-bit register A")]
    fn word_store_into_byte_register_panics() {
        Registers::default().set16(Reg::A, 0x1234);
    }

    #[test]
    fn af_write_discards_low_flag_nibble() {
        let mut regs = Registers::default();
        regs.write(Reg::AF, 0xFFFE).unwrap();
        assert_eq!(regs.read(Reg::A), 0xFF);
        assert_eq!(regs.read(Reg::F), 0xF0);
        assert_eq!(regs.read(Reg::AF), 0xFFF0);
    }

    #[test]
    fn pairs_concatenate_high_then_low() {
        let mut regs = Registers::default();
        regs.write(Reg::BC, 0x1234).unwrap();
        assert_eq!((regs.b, regs.c), (0x12, 0x34));
        regs.d = 0xAB;
        regs.e = 0xCD;
        assert_eq!(regs.read(Reg::DE), 0xABCD);
    }

    #[test]
    fn flag_pack_round_trip() {
        for byte in 0..=0xFFu8 {
            let flags = Flags::from_byte(byte);
            assert_eq!(flags.to_byte(), byte & 0xF0);
            assert_eq!(Flags::from_byte(flags.to_byte()), flags);
        }
    }

    #[test]
    fn flag_bit_positions() {
        assert_eq!((Flags::Z | Flags::C).to_byte(), 0b1001_0000);
        assert_eq!(Flags::N.to_byte(), 0b0100_0000);
        assert_eq!((Flags::N | Flags::H).to_byte(), 0b0110_0000);

        let flags = Flags::from_byte(0xDD);
        assert!(flags.contains(Flags::Z | Flags::N | Flags::C));
        assert!(!flags.contains(Flags::H));
    }

    #[test]
    fn post_boot_values() {
        let regs = Registers::post_boot();
        assert_eq!(regs.af(), 0x01B0);
        assert_eq!(regs.bc(), 0x0013);
        assert_eq!(regs.de(), 0x00D8);
        assert_eq!(regs.hl(), 0x014D);
        assert_eq!(regs.sp, 0xFFFE);
        assert_eq!(regs.pc, 0x0100);
    }
}
