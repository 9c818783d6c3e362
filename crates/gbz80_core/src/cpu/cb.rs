use crate::bits;
use crate::error::{GbError, Result};

use super::shift::ShiftOp;
use super::{Bus, Cpu, Flags};

impl Cpu {
    /// Handle CB-prefixed instructions (bit operations, shifts, and rotates).
    ///
    /// The opcode splits as `xx yyy zzz`: `x` picks the group, `y` the
    /// operation or bit number, `z` the operand register.
    pub(super) fn step_cb<B: Bus>(&mut self, bus: &mut B) -> Result<u32> {
        let cb = self.fetch8(bus);
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;
        let hl_operand = z == 6;

        let cycles = match x {
            0 => {
                let value = self.read_r8(bus, z);
                let result = self.shift(ShiftOp::from_index(y), value);
                self.write_r8(bus, z, result);
                if hl_operand { 16 } else { 8 }
            }
            1 => {
                // BIT b, r: Z is the complement of the bit, C untouched.
                let value = self.read_r8(bus, z);
                self.set_flag(Flags::Z, !bits::is_set(value, y));
                self.set_flag(Flags::N, false);
                self.set_flag(Flags::H, true);
                if hl_operand { 12 } else { 8 }
            }
            2 => {
                let value = self.read_r8(bus, z);
                self.write_r8(bus, z, bits::reset_bit(value, y));
                if hl_operand { 16 } else { 8 }
            }
            3 => {
                let value = self.read_r8(bus, z);
                self.write_r8(bus, z, bits::set_bit(value, y));
                if hl_operand { 16 } else { 8 }
            }
            _ => {
                return Err(GbError::UnhandledCbOpcode {
                    opcode: cb,
                    pc: self.regs.pc.wrapping_sub(2),
                })
            }
        };

        Ok(cycles)
    }
}
