use crate::cpu::shift::ShiftOp;
use crate::cpu::{Bus, Cpu, Flags, Reg};

impl Cpu {
    /// Dispatch one of the eight accumulator operations by its 3-bit index.
    fn alu_op(&mut self, operation: u8, value: u8) {
        match operation & 0x07 {
            0 => self.alu_add(value, false),
            1 => self.alu_add(value, true),
            2 => self.alu_sub(value, false),
            3 => self.alu_sub(value, true),
            4 => self.alu_and(value),
            5 => self.alu_xor(value),
            6 => self.alu_or(value),
            _ => self.alu_cp(value),
        }
    }

    pub(super) fn exec_alu_reg_group<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!((0x80..=0xBF).contains(&opcode));
        let src = opcode & 0x07;
        let value = self.read_r8(bus, src);
        self.alu_op(opcode >> 3, value);

        if src == 6 { 8 } else { 4 }
    }

    pub(super) fn exec_alu_imm<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(
            opcode,
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE
        ));
        let value = self.fetch8(bus);
        self.alu_op(opcode >> 3, value);
        8
    }

    pub(super) fn exec_shift_a(&mut self, op: ShiftOp) -> u32 {
        self.shift_a(op);
        4
    }

    pub(super) fn exec_add_hl_rr(&mut self, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x09 | 0x19 | 0x29 | 0x39));
        let value = self.regs.read(Reg::from_rp_index(opcode >> 4));
        self.alu_add16_hl(value);
        8
    }

    pub(super) fn exec_add_sp_s8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let imm = self.fetch8(bus);
        self.regs.sp = self.alu_add16_signed(self.regs.sp, imm);
        16
    }

    pub(super) fn exec_ld_hl_sp_s8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let imm = self.fetch8(bus);
        let result = self.alu_add16_signed(self.regs.sp, imm);
        self.regs.set_hl(result);
        12
    }

    pub(super) fn exec_daa(&mut self) -> u32 {
        self.alu_daa();
        4
    }

    pub(super) fn exec_cpl(&mut self) -> u32 {
        self.regs.a = !self.regs.a;
        self.set_flag(Flags::H, true);
        self.set_flag(Flags::N, true);
        4
    }

    pub(super) fn exec_scf(&mut self) -> u32 {
        self.set_flag(Flags::C, true);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::N, false);
        4
    }

    pub(super) fn exec_ccf(&mut self) -> u32 {
        let carry = self.flag(Flags::C);
        self.set_flag(Flags::C, !carry);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::N, false);
        4
    }
}
