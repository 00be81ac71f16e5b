use crate::stage4_arm_gen::platform::{
    imm_can_encode, offset_can_encode, reg_name, RegNo, SP_REG, TMP_REG,
};

/// Pre-formatted ARM32 instruction lines for one function. Mnemonic lines
/// are tab-indented; labels sit in column zero.
#[derive(Default)]
pub struct IlocArm32 {
    code: Vec<String>,
}

impl IlocArm32 {
    pub fn into_code(self) -> Vec<String> {
        self.code
    }

    pub fn inst(&mut self, op: &str, operands: &[&str]) {
        self.code.push(format!("\t{op} {}", operands.join(", ")));
    }

    pub fn label(&mut self, name: &str) {
        self.code.push(format!("{name}:"));
    }

    pub fn jump(&mut self, label: &str) {
        self.inst("b", &[label]);
    }

    pub fn call_fun(&mut self, name: &str) {
        self.inst("bl", &[name]);
    }

    /// Materialize an integer constant.
    pub fn load_imm(&mut self, rd: RegNo, value: i32) {
        if imm_can_encode(value) {
            self.inst("mov", &[reg_name(rd), &format!("#{value}")]);
        } else {
            // The assembler places the literal in the constant pool.
            self.inst("ldr", &[reg_name(rd), &format!("={value}")]);
        }
    }

    /// Materialize the address of a symbol.
    pub fn load_symbol(&mut self, rd: RegNo, name: &str) {
        self.inst("ldr", &[reg_name(rd), &format!("={name}")]);
    }

    /// `rd = [base + offset]`, bridging through `rd` itself when the
    /// displacement does not encode.
    pub fn load_base(&mut self, rd: RegNo, base: RegNo, offset: i32) {
        if offset_can_encode(offset) {
            self.inst(
                "ldr",
                &[reg_name(rd), &format!("[{}, #{offset}]", reg_name(base))],
            );
        } else {
            self.load_imm(rd, offset);
            self.inst("add", &[reg_name(rd), reg_name(base), reg_name(rd)]);
            self.inst("ldr", &[reg_name(rd), &format!("[{}]", reg_name(rd))]);
        }
    }

    /// `[base + offset] = rs`, bridging through the reserved scratch when
    /// the displacement does not encode.
    pub fn store_base(&mut self, rs: RegNo, base: RegNo, offset: i32) {
        if offset_can_encode(offset) {
            self.inst(
                "str",
                &[reg_name(rs), &format!("[{}, #{offset}]", reg_name(base))],
            );
        } else {
            self.load_imm(TMP_REG, offset);
            self.inst("add", &[reg_name(TMP_REG), reg_name(base), reg_name(TMP_REG)]);
            self.inst("str", &[reg_name(rs), &format!("[{}]", reg_name(TMP_REG))]);
        }
    }

    /// `rd = base + offset`: the address of a frame-resident aggregate.
    pub fn lea_base(&mut self, rd: RegNo, base: RegNo, offset: i32) {
        if offset >= 0 && imm_can_encode(offset) {
            self.inst("add", &[reg_name(rd), reg_name(base), &format!("#{offset}")]);
        } else if offset < 0 && imm_can_encode(-offset) {
            self.inst("sub", &[reg_name(rd), reg_name(base), &format!("#{}", -offset)]);
        } else {
            self.load_imm(rd, offset);
            self.inst("add", &[reg_name(rd), reg_name(base), reg_name(rd)]);
        }
    }

    /// Grow the frame in the prologue.
    pub fn alloc_stack(&mut self, size: i32) {
        if size == 0 {
            return;
        }
        if imm_can_encode(size) {
            self.inst("sub", &["sp", "sp", &format!("#{size}")]);
        } else {
            self.load_imm(TMP_REG, size);
            self.inst("sub", &["sp", "sp", reg_name(TMP_REG)]);
        }
    }

    /// `[sp + offset] = rs`: outgoing stack arguments.
    pub fn store_outgoing(&mut self, rs: RegNo, offset: i32) {
        self.store_base(rs, SP_REG, offset);
    }
}
