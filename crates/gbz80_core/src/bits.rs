//! Bit-level helpers shared by the CPU and the peripherals.
//!
//! Everything here is a pure function. The carry predicates take the
//! operands before the operation, so they can be evaluated either before
//! or after the result is written back.

/// True when `value` fits in an unsigned byte.
#[inline]
pub const fn is_byte(value: u32) -> bool {
    value <= 0xFF
}

/// True when `value` fits in an unsigned 16-bit word.
#[inline]
pub const fn is_word(value: u32) -> bool {
    value <= 0xFFFF
}

#[inline]
pub const fn is_set(value: u8, bit: u8) -> bool {
    (value >> bit) & 1 != 0
}

#[inline]
pub const fn set_bit(value: u8, bit: u8) -> u8 {
    value | (1 << bit)
}

#[inline]
pub const fn reset_bit(value: u8, bit: u8) -> u8 {
    value & !(1 << bit)
}

/// Carry out of bit 3 for `a + b + carry`.
#[inline]
pub const fn half_carry_add(a: u8, b: u8, carry: bool) -> bool {
    (a & 0x0F) + (b & 0x0F) + carry as u8 > 0x0F
}

/// Carry out of bit 7 for `a + b + carry`.
#[inline]
pub const fn carry_add(a: u8, b: u8, carry: bool) -> bool {
    a as u16 + b as u16 + carry as u16 > 0xFF
}

/// Borrow from bit 4 for `a - b - carry`.
#[inline]
pub const fn half_carry_sub(a: u8, b: u8, carry: bool) -> bool {
    ((a & 0x0F) as u16) < (b & 0x0F) as u16 + carry as u16
}

/// Borrow for `a - b - carry`.
#[inline]
pub const fn carry_sub(a: u8, b: u8, carry: bool) -> bool {
    (a as u16) < b as u16 + carry as u16
}
