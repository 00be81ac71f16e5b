use super::ary::ArrayAccess;
use super::IrGenerator;
use crate::common::diag::{CompileError, Result};
use crate::common::types::IrType;
use crate::stage1_ast as ast;
use crate::stage2_ir::{ArithOp, BinaryOp, CmpOp, InstrKind, ValueRef};

/// The destination of an assignment: a named variable, or an element
/// address computed from an array reference.
enum Place {
    Direct(ValueRef),
    Pointee(ValueRef),
}

/// Expressions.
impl IrGenerator {
    /// Translate an expression and require a scalar (or pointer) result;
    /// rejects `void` calls in value position.
    pub(super) fn gen_exp_value(&mut self, exp: &ast::Expr) -> Result<ValueRef> {
        let value = self.gen_exp(exp)?;
        let typ = self.module.value_type(self.module.cur_fun(), value);
        if typ.is_void() {
            return Err(CompileError::typing(
                exp.line(),
                "void function call used where a value is required",
            ));
        }
        Ok(value)
    }

    /// Translate an expression in rvalue mode. The returned value carries
    /// the expression's result; its emitted instructions are already
    /// appended.
    pub(super) fn gen_exp(&mut self, exp: &ast::Expr) -> Result<ValueRef> {
        match exp {
            ast::Expr::LiteralInt { value, .. } => Ok(self.const_ref(*value)),
            ast::Expr::Var { name, line } => self.gen_exp_var(name, *line),
            ast::Expr::ArrayRef { name, indices, line } => {
                match self.gen_array_access(name, indices, *line)? {
                    // An element read loads through the computed address
                    // into an anonymous stack slot.
                    ArrayAccess::Element(addr) => {
                        let dst = self.new_temp_mem(IrType::Int32);
                        self.append(InstrKind::Move { dst, src: addr }, IrType::Void);
                        Ok(dst)
                    }
                    // A partial reference is already the sub-array address.
                    ArrayAccess::SubArray(addr) => Ok(addr),
                }
            }
            ast::Expr::Call { name, args, line } => self.gen_exp_call(name, args, *line),
            ast::Expr::Neg { sub, .. } => {
                // 0 - x; there is no dedicated negate opcode.
                let zero = self.const_ref(0);
                let sub = self.gen_operand(sub)?;
                Ok(ValueRef::Instr(self.append(
                    InstrKind::Binary {
                        op: ArithOp::Sub.into(),
                        lhs: zero,
                        rhs: sub,
                    },
                    IrType::Int32,
                )))
            }
            ast::Expr::Binary { op, lhs, rhs, line } => {
                let lhs = self.gen_operand(lhs)?;
                let rhs = self.gen_operand(rhs)?;
                if matches!(op, ast::BinOp::Div | ast::BinOp::Mod) && self.is_const_zero(rhs) {
                    // Lowered as-is; the emitted sdiv traps or yields an
                    // unspecified value at run time.
                    log::warn!("Line {line}: division by constant zero is undefined");
                }
                let (op, typ) = lower_binop(*op);
                Ok(ValueRef::Instr(self.append(
                    InstrKind::Binary { op, lhs, rhs },
                    typ,
                )))
            }
            ast::Expr::LogicalAnd { .. }
            | ast::Expr::LogicalOr { .. }
            | ast::Expr::LogicalNot { .. } => self.gen_logical_value(exp),
        }
    }

    fn gen_exp_var(&mut self, name: &str, line: u32) -> Result<ValueRef> {
        self.module
            .find_var(name)
            .ok_or_else(|| CompileError::semantic(line, format!("'{name}' is not declared")))
    }

    /// An operand of an arithmetic or comparison instruction. `Int1`
    /// results are usable as 0/1 scalars; aggregate operands are rejected.
    fn gen_operand(&mut self, exp: &ast::Expr) -> Result<ValueRef> {
        let value = self.gen_exp_value(exp)?;
        let typ = self.module.value_type(self.module.cur_fun(), value);
        match typ {
            IrType::Int32 | IrType::Int1 => Ok(value),
            typ => Err(CompileError::typing(
                exp.line(),
                format!("operand of type {typ} is not valid for this operator"),
            )),
        }
    }

    /* Assignment */

    pub(super) fn gen_stmt_assign(
        &mut self,
        lhs: &ast::Expr,
        rhs: &ast::Expr,
        line: u32,
    ) -> Result<()> {
        let src = self.gen_exp_value(rhs)?;
        let place = self.gen_exp_lvalue(lhs, line)?;
        let dst = match place {
            Place::Direct(dst) => dst,
            Place::Pointee(addr) => addr,
        };
        self.append(InstrKind::Move { dst, src }, IrType::Void);
        Ok(())
    }

    /// Translate the left-hand side of an assignment: no final load is
    /// emitted, the place itself is the result.
    fn gen_exp_lvalue(&mut self, exp: &ast::Expr, line: u32) -> Result<Place> {
        match exp {
            ast::Expr::Var { name, line } => {
                let value = self.gen_exp_var(name, *line)?;
                let typ = self.module.value_type(self.module.cur_fun(), value);
                if typ.is_array() {
                    return Err(CompileError::typing(
                        *line,
                        format!("array '{name}' is not assignable"),
                    ));
                }
                Ok(Place::Direct(value))
            }
            ast::Expr::ArrayRef { name, indices, line } => {
                match self.gen_array_access(name, indices, *line)? {
                    ArrayAccess::Element(addr) => Ok(Place::Pointee(addr)),
                    ArrayAccess::SubArray(_) => Err(CompileError::typing(
                        *line,
                        format!("partial reference of array '{name}' is not assignable"),
                    )),
                }
            }
            _ => Err(CompileError::semantic(
                line,
                "left-hand side of assignment is not assignable",
            )),
        }
    }

    /* Return */

    pub(super) fn gen_stmt_return(&mut self, exp: Option<&ast::Expr>, line: u32) -> Result<()> {
        let ret_slot = self.module.cur_fun().return_slot_ref();
        match (exp, ret_slot) {
            (Some(exp), Some(dst)) => {
                let src = self.gen_exp_value(exp)?;
                self.append(InstrKind::Move { dst, src }, IrType::Void);
            }
            (None, None) => {}
            (Some(_), None) => {
                return Err(CompileError::semantic(
                    line,
                    "void function cannot return a value",
                ));
            }
            (None, Some(_)) => {
                return Err(CompileError::semantic(
                    line,
                    "non-void function must return a value",
                ));
            }
        }
        let exit = self.module.cur_fun().exit_label();
        self.append(InstrKind::Goto(exit), IrType::Void);
        Ok(())
    }

    /* Calls */

    fn gen_exp_call(&mut self, name: &str, args: &[ast::Expr], line: u32) -> Result<ValueRef> {
        let callee = self.module.find_function(name).ok_or_else(|| {
            CompileError::semantic(line, format!("function '{name}' is not declared"))
        })?;

        let param_count = self.module.fun(callee).typ.params.len();
        if args.len() != param_count {
            return Err(CompileError::semantic(
                line,
                format!(
                    "function '{name}' takes {param_count} argument(s), {} given",
                    args.len()
                ),
            ));
        }

        {
            let fun = self.module.cur_fun_mut();
            fun.has_call = true;
            fun.max_call_arg_count = fun.max_call_arg_count.max(args.len() as u32);
        }

        let args: Vec<ValueRef> = args
            .iter()
            .map(|arg| self.gen_exp_value(arg))
            .collect::<Result<_>>()?;

        let ret = self.module.fun(callee).typ.ret.clone();
        Ok(ValueRef::Instr(
            self.append(InstrKind::Call { callee, args }, ret),
        ))
    }

    /* Helpers */

    pub(super) fn new_temp_mem(&mut self, typ: IrType) -> ValueRef {
        ValueRef::Mem(self.module.cur_fun_mut().new_mem(typ))
    }

    fn is_const_zero(&self, value: ValueRef) -> bool {
        match value {
            ValueRef::Const(id) => self.module.const_int(id).value == 0,
            _ => false,
        }
    }
}

fn lower_binop(op: ast::BinOp) -> (BinaryOp, IrType) {
    use ast::BinOp as B;
    match op {
        B::Add => (ArithOp::Add.into(), IrType::Int32),
        B::Sub => (ArithOp::Sub.into(), IrType::Int32),
        B::Mul => (ArithOp::Mul.into(), IrType::Int32),
        B::Div => (ArithOp::Div.into(), IrType::Int32),
        B::Mod => (ArithOp::Rem.into(), IrType::Int32),
        B::Lt => (CmpOp::Lt.into(), IrType::Int1),
        B::Le => (CmpOp::Le.into(), IrType::Int1),
        B::Gt => (CmpOp::Gt.into(), IrType::Int1),
        B::Ge => (CmpOp::Ge.into(), IrType::Int1),
        B::Eq => (CmpOp::Eq.into(), IrType::Int1),
        B::Ne => (CmpOp::Ne.into(), IrType::Int1),
    }
}
