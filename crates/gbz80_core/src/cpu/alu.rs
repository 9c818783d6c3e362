use crate::bits;

use super::{Cpu, Flags};

impl Cpu {
    /// Core 8-bit ADD/ADC operation on A.
    ///
    /// `use_carry` selects between ADD (false) and ADC (true).
    pub(super) fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = use_carry && self.flag(Flags::C);
        let result = a.wrapping_add(value).wrapping_add(carry_in as u8);

        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, bits::half_carry_add(a, value, carry_in));
        self.set_flag(Flags::C, bits::carry_add(a, value, carry_in));
    }

    /// Core 8-bit SUB/SBC operation on A.
    ///
    /// SBC derives H from the XOR of operands and result, which gives the
    /// borrow out of bit 4 with the carry already folded in.
    pub(super) fn alu_sub(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = use_carry && self.flag(Flags::C);
        let result = a.wrapping_sub(value).wrapping_sub(carry_in as u8);

        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, (a ^ value ^ result) & 0x10 != 0);
        self.set_flag(Flags::C, bits::carry_sub(a, value, carry_in));
    }

    #[inline]
    pub(super) fn alu_and(&mut self, value: u8) {
        let result = self.regs.a & value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, true);
    }

    #[inline]
    pub(super) fn alu_or(&mut self, value: u8) {
        let result = self.regs.a | value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
    }

    #[inline]
    pub(super) fn alu_xor(&mut self, value: u8) {
        let result = self.regs.a ^ value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
    }

    /// Compare A with `value`, setting flags as if `A - value` was performed.
    /// A itself is not modified.
    #[inline]
    pub(super) fn alu_cp(&mut self, value: u8) {
        let a = self.regs.a;

        self.clear_flags();
        self.set_flag(Flags::Z, a == value);
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, bits::half_carry_sub(a, value, false));
        self.set_flag(Flags::C, bits::carry_sub(a, value, false));
    }

    /// Decimal adjust accumulator after BCD addition/subtraction.
    ///
    /// The correction is built from H, N, C and A. C is only ever set here,
    /// never cleared; H is always cleared and N is left alone.
    pub(super) fn alu_daa(&mut self) {
        let a = self.regs.a;
        let subtract = self.flag(Flags::N);
        let mut correction = 0u8;

        if self.flag(Flags::H) || (!subtract && (a & 0x0F) > 0x09) {
            correction |= 0x06;
        }
        if self.flag(Flags::C) || (!subtract && a > 0x99) {
            correction |= 0x60;
            self.set_flag(Flags::C, true);
        }

        let result = if subtract {
            a.wrapping_sub(correction)
        } else {
            a.wrapping_add(correction)
        };

        self.regs.a = result;
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, false);
    }

    /// 8-bit increment helper used by INC r and INC (HL).
    ///
    /// Updates Z, N, H while leaving C unchanged.
    #[inline]
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, bits::half_carry_add(value, 1, false));
        result
    }

    /// 8-bit decrement helper used by DEC r and DEC (HL).
    ///
    /// Updates Z, N, H while leaving C unchanged.
    #[inline]
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, bits::half_carry_sub(value, 1, false));
        result
    }

    /// 16-bit add helper for `ADD HL,rr`.
    ///
    /// Z is unaffected; H is the carry out of bit 11 and C out of bit 15.
    #[inline]
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();

        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.set_flag(Flags::C, hl as u32 + value as u32 > 0xFFFF);

        self.regs.set_hl(hl.wrapping_add(value));
    }

    /// Signed 8-bit offset added to a 16-bit base, shared by `ADD SP,s8`
    /// and `LD HL,SP+s8`.
    ///
    /// Z and N are cleared; H and C are the carries out of bits 3 and 7 of
    /// the unsigned low-byte addition.
    #[inline]
    pub(super) fn alu_add16_signed(&mut self, base: u16, imm8: u8) -> u16 {
        let offset = imm8 as i8 as u16;
        let result = base.wrapping_add(offset);
        let carries = base ^ offset ^ result;

        self.clear_flags();
        self.set_flag(Flags::H, carries & 0x0010 != 0);
        self.set_flag(Flags::C, carries & 0x0100 != 0);
        result
    }
}
