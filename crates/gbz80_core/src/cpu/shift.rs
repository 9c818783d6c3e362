use super::{Cpu, Flags};

/// The eight rotate/shift operations, in CB-table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    /// Decode bits 3..=5 of a CB opcode whose top two bits are zero.
    #[inline]
    pub(super) const fn from_index(index: u8) -> ShiftOp {
        match index & 0x07 {
            0 => ShiftOp::Rlc,
            1 => ShiftOp::Rrc,
            2 => ShiftOp::Rl,
            3 => ShiftOp::Rr,
            4 => ShiftOp::Sla,
            5 => ShiftOp::Sra,
            6 => ShiftOp::Swap,
            _ => ShiftOp::Srl,
        }
    }
}

impl Cpu {
    /// Apply a rotate/shift to `value` and return the result.
    ///
    /// N and H are cleared, C receives the bit shifted out (cleared for
    /// SWAP) and Z reflects the result.
    pub(super) fn shift(&mut self, op: ShiftOp, value: u8) -> u8 {
        let carry_in = self.flag(Flags::C);
        let (result, carry_out) = match op {
            ShiftOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            ShiftOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            ShiftOp::Rl => ((value << 1) | carry_in as u8, value & 0x80 != 0),
            ShiftOp::Rr => ((value >> 1) | ((carry_in as u8) << 7), value & 0x01 != 0),
            ShiftOp::Sla => (value << 1, value & 0x80 != 0),
            ShiftOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            ShiftOp::Swap => (value.rotate_left(4), false),
            ShiftOp::Srl => (value >> 1, value & 0x01 != 0),
        };

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::C, carry_out);
        result
    }

    /// RLCA/RRCA/RLA/RRA: same as the CB forms on A, except Z is always
    /// cleared.
    pub(super) fn shift_a(&mut self, op: ShiftOp) {
        let result = self.shift(op, self.regs.a);
        self.regs.a = result;
        self.set_flag(Flags::Z, false);
    }
}
