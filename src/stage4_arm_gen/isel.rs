use crate::common::diag::{CompileError, Result};
use crate::stage2_ir::{
    ArithOp, BinaryOp, CmpOp, FunId, Function, InstrId, InstrKind, Module, ValueRef,
};
use crate::stage4_arm_gen::frame::{self, FrameLayout};
use crate::stage4_arm_gen::iloc::IlocArm32;
use crate::stage4_arm_gen::platform::{reg_name, RegNo, FP_REG};
use crate::stage4_arm_gen::regalloc::SimpleRegisterAllocator;
use crate::stage4_arm_gen::AsmFunction;

/// Where a value lives when an instruction handler needs it.
enum Loc {
    /// A formal parameter still in its incoming register.
    Reg(RegNo),
    /// fp-relative scalar slot.
    Frame(i32),
    Imm(i32),
    /// A scalar with static storage: load/store through its address.
    GlobalScalar(String),
    /// The value *is* an address: a global array's symbol...
    GlobalArray(String),
    /// ...or a frame-resident array's base.
    LocalArray(i32),
}

/// Per-function instruction selector. Walks the linear IR in program
/// order and dispatches on the opcode; every opcode has a handler.
pub struct InstSelectorArm32<'a> {
    module: &'a Module,
    fun: &'a Function,
    frame: FrameLayout,
    iloc: IlocArm32,
    allocator: SimpleRegisterAllocator,
}

impl<'a> InstSelectorArm32<'a> {
    pub fn new(module: &'a Module, fun: &'a Function) -> Self {
        Self {
            module,
            fun,
            frame: frame::layout(fun),
            iloc: IlocArm32::default(),
            allocator: SimpleRegisterAllocator::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        log::debug!(
            "selecting {}: frame {} bytes",
            self.fun.name,
            self.frame.frame_size
        );
        for &id in &self.fun.code {
            self.translate(id)?;
            self.allocator.reset();
        }
        Ok(())
    }

    pub fn finish(self) -> (AsmFunction, Vec<RegNo>) {
        let asm_fun = AsmFunction {
            name: self.fun.name.clone(),
            lines: self.iloc.into_code(),
        };
        (asm_fun, self.frame.protected)
    }

    fn translate(&mut self, id: InstrId) -> Result<()> {
        match &self.fun.instr(id).kind {
            InstrKind::Entry => self.translate_entry(),
            InstrKind::Exit(ret) => self.translate_exit(*ret),
            InstrKind::Label => {
                let name = self.asm_label(id);
                self.iloc.label(&name);
                Ok(())
            }
            InstrKind::Goto(target) => {
                let name = self.asm_label(*target);
                self.iloc.jump(&name);
                Ok(())
            }
            InstrKind::Branch { cond, if_true, if_false } => {
                self.translate_branch(*cond, *if_true, *if_false)
            }
            InstrKind::Move { dst, src } => self.translate_move(*dst, *src),
            InstrKind::Binary { op: BinaryOp::Arith(op), lhs, rhs } => match op {
                ArithOp::Add => self.translate_two_operator(id, "add", *lhs, *rhs),
                ArithOp::Sub => self.translate_two_operator(id, "sub", *lhs, *rhs),
                ArithOp::Mul => self.translate_two_operator(id, "mul", *lhs, *rhs),
                ArithOp::Div => self.translate_two_operator(id, "sdiv", *lhs, *rhs),
                ArithOp::Rem => self.translate_rem(id, *lhs, *rhs),
            },
            InstrKind::Binary { op: BinaryOp::Cmp(op), lhs, rhs } => {
                self.translate_comparison(id, *op, *lhs, *rhs)
            }
            InstrKind::Call { callee, args } => self.translate_call(id, *callee, args),
        }
    }

    /* Prologue and epilogue */

    fn translate_entry(&mut self) -> Result<()> {
        let push_list = self.protected_reg_list();
        self.iloc.inst("push", &[&push_list]);
        self.iloc.inst("mov", &["fp", "sp"]);
        self.iloc.alloc_stack(self.frame.frame_size);
        Ok(())
    }

    fn translate_exit(&mut self, ret: Option<ValueRef>) -> Result<()> {
        if let Some(ret) = ret {
            self.load_value(0, ret)?;
        }
        self.iloc.inst("mov", &["sp", "fp"]);
        let pop_list = self.protected_reg_list();
        self.iloc.inst("pop", &[&pop_list]);
        self.iloc.inst("bx", &["lr"]);
        Ok(())
    }

    fn protected_reg_list(&self) -> String {
        let names: Vec<&str> = self
            .frame
            .protected
            .iter()
            .map(|&r| reg_name(r))
            .collect();
        format!("{{{}}}", names.join(","))
    }

    /* Control flow */

    /// The operand is the comparison emitted just before; its opcode
    /// selects the condition suffix.
    fn translate_branch(
        &mut self,
        cond: ValueRef,
        if_true: InstrId,
        if_false: InstrId,
    ) -> Result<()> {
        let suffix = self.branch_condition_suffix(cond)?;
        let true_name = self.asm_label(if_true);
        let false_name = self.asm_label(if_false);
        self.iloc.inst(&format!("b{suffix}"), &[&true_name]);
        self.iloc.jump(&false_name);
        Ok(())
    }

    fn branch_condition_suffix(&self, cond: ValueRef) -> Result<&'static str> {
        let ValueRef::Instr(id) = cond else {
            return Err(CompileError::internal(
                "branch condition is not an instruction result".to_string(),
            ));
        };
        match self.fun.instr(id).kind {
            InstrKind::Binary { op: BinaryOp::Cmp(op), .. } => Ok(op.arm_suffix()),
            _ => Err(CompileError::internal(
                "branch condition is not a comparison result".to_string(),
            )),
        }
    }

    /* Moves */

    fn translate_move(&mut self, dst: ValueRef, src: ValueRef) -> Result<()> {
        let dst_is_ptr = self.module.value_type(self.fun, dst).is_pointer();
        let src_is_ptr = self.module.value_type(self.fun, src).is_pointer();

        if dst_is_ptr && !src_is_ptr {
            // Store through pointer: *dst = src.
            let addr_reg = self.allocator.allocate_for(dst)?;
            self.load_value(addr_reg, dst)?;
            let value_reg = self.allocator.allocate_for(src)?;
            self.load_value(value_reg, src)?;
            self.iloc.inst(
                "str",
                &[reg_name(value_reg), &format!("[{}]", reg_name(addr_reg))],
            );
            self.allocator.free_value(dst);
            self.allocator.free_value(src);
        } else if !dst_is_ptr && src_is_ptr {
            // Load through pointer: dst = *src.
            let addr_reg = self.allocator.allocate_for(src)?;
            self.load_value(addr_reg, src)?;
            let value_reg = self.allocator.allocate_for(dst)?;
            self.iloc.inst(
                "ldr",
                &[reg_name(value_reg), &format!("[{}]", reg_name(addr_reg))],
            );
            self.store_value(value_reg, dst)?;
            self.allocator.free_value(src);
            self.allocator.free_value(dst);
        } else {
            // Scalar copy, pointer copy included.
            self.emit_scalar_move(dst, src)?;
        }
        Ok(())
    }

    /// Register/memory-agnostic scalar copy through one scratch register.
    fn emit_scalar_move(&mut self, dst: ValueRef, src: ValueRef) -> Result<()> {
        let reg = self.allocator.allocate()?;
        self.load_value(reg, src)?;
        self.store_value(reg, dst)?;
        self.allocator.free_reg(reg);
        Ok(())
    }

    /* Arithmetic */

    /// load both operands -> compute into the result register -> store the
    /// result slot -> free scratch registers.
    fn translate_two_operator(
        &mut self,
        id: InstrId,
        op: &str,
        lhs: ValueRef,
        rhs: ValueRef,
    ) -> Result<()> {
        let lhs_reg = self.allocator.allocate_for(lhs)?;
        self.load_value(lhs_reg, lhs)?;
        let rhs_reg = self.allocator.allocate_for(rhs)?;
        self.load_value(rhs_reg, rhs)?;

        let result = ValueRef::Instr(id);
        let result_reg = self.allocator.allocate_for(result)?;
        self.iloc
            .inst(op, &[reg_name(result_reg), reg_name(lhs_reg), reg_name(rhs_reg)]);
        self.store_value(result_reg, result)?;

        self.allocator.free_value(lhs);
        self.allocator.free_value(rhs);
        self.allocator.free_value(result);
        Ok(())
    }

    /// There is no hardware remainder: a - (a / b) * b.
    fn translate_rem(&mut self, id: InstrId, lhs: ValueRef, rhs: ValueRef) -> Result<()> {
        let lhs_reg = self.allocator.allocate_for(lhs)?;
        self.load_value(lhs_reg, lhs)?;
        let rhs_reg = self.allocator.allocate_for(rhs)?;
        self.load_value(rhs_reg, rhs)?;

        let quot_reg = self.allocator.allocate()?;
        self.iloc
            .inst("sdiv", &[reg_name(quot_reg), reg_name(lhs_reg), reg_name(rhs_reg)]);
        self.iloc
            .inst("mul", &[reg_name(quot_reg), reg_name(quot_reg), reg_name(rhs_reg)]);

        let result = ValueRef::Instr(id);
        let result_reg = self.allocator.allocate_for(result)?;
        self.iloc
            .inst("sub", &[reg_name(result_reg), reg_name(lhs_reg), reg_name(quot_reg)]);
        self.store_value(result_reg, result)?;

        self.allocator.free_reg(quot_reg);
        self.allocator.free_value(lhs);
        self.allocator.free_value(rhs);
        self.allocator.free_value(result);
        Ok(())
    }

    /// `cmp` followed by a conditional 0/1 materialization; the branch
    /// handler re-derives the flags' meaning from the IR opcode.
    fn translate_comparison(
        &mut self,
        id: InstrId,
        op: CmpOp,
        lhs: ValueRef,
        rhs: ValueRef,
    ) -> Result<()> {
        let lhs_reg = self.allocator.allocate_for(lhs)?;
        self.load_value(lhs_reg, lhs)?;
        let rhs_reg = self.allocator.allocate_for(rhs)?;
        self.load_value(rhs_reg, rhs)?;

        self.iloc.inst("cmp", &[reg_name(lhs_reg), reg_name(rhs_reg)]);

        let result = ValueRef::Instr(id);
        let result_reg = self.allocator.allocate_for(result)?;
        self.iloc.inst("mov", &[reg_name(result_reg), "#0"]);
        self.iloc
            .inst(&format!("mov{}", op.arm_suffix()), &[reg_name(result_reg), "#1"]);
        self.store_value(result_reg, result)?;

        self.allocator.free_value(lhs);
        self.allocator.free_value(rhs);
        self.allocator.free_value(result);
        Ok(())
    }

    /* Calls */

    fn translate_call(&mut self, id: InstrId, callee: FunId, args: &[ValueRef]) -> Result<()> {
        let callee = self.module.fun(callee);

        // Args 4+ go to the outgoing area at [sp, #0] upward.
        let mut esp = 0;
        for &arg in args.iter().skip(4) {
            let reg = self.allocator.allocate()?;
            self.load_value(reg, arg)?;
            self.iloc.store_outgoing(reg, esp);
            self.allocator.free_reg(reg);
            esp += 4;
        }

        // Args 0-3 pin their registers for the duration of the call.
        for (k, &arg) in args.iter().take(4).enumerate() {
            self.allocator.allocate_fixed(k as RegNo);
            self.load_value(k as RegNo, arg)?;
        }

        self.iloc.call_fun(&callee.name);

        for k in 0..args.len().min(4) {
            self.allocator.free_reg(k as RegNo);
        }

        if self.fun.instr(id).has_result() {
            self.store_value(0, ValueRef::Instr(id))?;
        }
        Ok(())
    }

    /* Operand resolution */

    fn loc_of(&self, value: ValueRef) -> Result<Loc> {
        let frame_loc = |v: ValueRef| -> Result<i32> {
            self.frame.offsets.get(&v).copied().ok_or_else(|| {
                CompileError::internal(format!("operand {v:?} has no frame slot"))
            })
        };
        match value {
            ValueRef::Const(id) => Ok(Loc::Imm(self.module.const_int(id).value)),
            ValueRef::Global(id) => {
                let global = self.module.global(id);
                if global.typ.is_array() {
                    Ok(Loc::GlobalArray(global.name.clone()))
                } else {
                    Ok(Loc::GlobalScalar(global.name.clone()))
                }
            }
            ValueRef::Param(id) if id.index() < 4 => Ok(Loc::Reg(id.index() as RegNo)),
            ValueRef::Param(_) => Ok(Loc::Frame(frame_loc(value)?)),
            ValueRef::Local(id) => {
                if self.fun.locals[id.index()].typ.is_array() {
                    Ok(Loc::LocalArray(frame_loc(value)?))
                } else {
                    Ok(Loc::Frame(frame_loc(value)?))
                }
            }
            ValueRef::Mem(_) | ValueRef::Instr(_) => Ok(Loc::Frame(frame_loc(value)?)),
        }
    }

    /// Bring a value into `rd`. Array-typed values yield their base
    /// address; that is how whole arrays travel as call arguments.
    fn load_value(&mut self, rd: RegNo, value: ValueRef) -> Result<()> {
        match self.loc_of(value)? {
            Loc::Reg(rs) => {
                if rs != rd {
                    self.iloc.inst("mov", &[reg_name(rd), reg_name(rs)]);
                }
            }
            Loc::Frame(offset) => self.iloc.load_base(rd, FP_REG, offset),
            Loc::Imm(imm) => self.iloc.load_imm(rd, imm),
            Loc::GlobalScalar(name) => {
                self.iloc.load_symbol(rd, &name);
                self.iloc
                    .inst("ldr", &[reg_name(rd), &format!("[{}]", reg_name(rd))]);
            }
            Loc::GlobalArray(name) => self.iloc.load_symbol(rd, &name),
            Loc::LocalArray(offset) => self.iloc.lea_base(rd, FP_REG, offset),
        }
        Ok(())
    }

    /// Store `rs` into a value's storage.
    fn store_value(&mut self, rs: RegNo, value: ValueRef) -> Result<()> {
        match self.loc_of(value)? {
            Loc::Frame(offset) => {
                self.iloc.store_base(rs, FP_REG, offset);
                Ok(())
            }
            Loc::GlobalScalar(name) => {
                let addr_reg = self.allocator.allocate()?;
                self.iloc.load_symbol(addr_reg, &name);
                self.iloc
                    .inst("str", &[reg_name(rs), &format!("[{}]", reg_name(addr_reg))]);
                self.allocator.free_reg(addr_reg);
                Ok(())
            }
            Loc::Reg(_) | Loc::Imm(_) | Loc::GlobalArray(_) | Loc::LocalArray(_) => {
                Err(CompileError::internal(format!(
                    "value {value:?} is not a writable location"
                )))
            }
        }
    }

    /// IR label names restart per function; the assembly file is shared,
    /// so labels carry the function name.
    fn asm_label(&self, id: InstrId) -> String {
        let ir_name = &self.fun.instr(id).ir_name;
        let index = ir_name.trim_start_matches(".L");
        format!(".L{}_{}", self.fun.name, index)
    }
}
