use super::IrGenerator;
use crate::common::diag::{CompileError, Result};
use crate::common::types::IrType;
use crate::stage1_ast as ast;
use crate::stage2_ir::{CmpOp, InstrId, InstrKind, ValueRef};

/// Conditions and `if`. Short-circuit operators lower through inherited
/// true/false continuation labels; no boolean value is materialized in
/// branch position.
impl IrGenerator {
    pub(super) fn gen_stmt_if(
        &mut self,
        cond: &ast::Expr,
        then: &ast::Stmt,
        elze: Option<&ast::Stmt>,
    ) -> Result<()> {
        let fun = self.module.cur_fun_mut();
        let true_label = fun.new_label();
        let end_label = fun.new_label();
        let false_label = match elze {
            Some(_) => self.module.cur_fun_mut().new_label(),
            None => end_label,
        };

        self.emit_branch_for_condition(cond, true_label, false_label)?;

        self.module.cur_fun_mut().append(true_label);
        self.gen_stmt(then)?;
        self.append(InstrKind::Goto(end_label), IrType::Void);

        if let Some(elze) = elze {
            self.module.cur_fun_mut().append(false_label);
            self.gen_stmt(elze)?;
        }

        self.module.cur_fun_mut().append(end_label);
        Ok(())
    }

    /// Translate `cond` so that control reaches `true_label` iff it holds
    /// and `false_label` otherwise.
    pub(super) fn emit_branch_for_condition(
        &mut self,
        cond: &ast::Expr,
        true_label: InstrId,
        false_label: InstrId,
    ) -> Result<()> {
        match cond {
            ast::Expr::Binary { op, .. } if op.is_comparison() => {
                // Both operands evaluate left to right, then the
                // comparison lands, then the branch reads it.
                let cond = self.gen_exp(cond)?;
                self.append(
                    InstrKind::Branch { cond, if_true: true_label, if_false: false_label },
                    IrType::Void,
                );
                Ok(())
            }
            ast::Expr::LogicalNot { sub, .. } => {
                // Negation swaps the continuations.
                self.emit_branch_for_condition(sub, false_label, true_label)
            }
            ast::Expr::LogicalAnd { lhs, rhs, .. } => {
                let mid = self.module.cur_fun_mut().new_label();
                self.emit_branch_for_condition(lhs, mid, false_label)?;
                self.module.cur_fun_mut().append(mid);
                self.emit_branch_for_condition(rhs, true_label, false_label)
            }
            ast::Expr::LogicalOr { lhs, rhs, .. } => {
                let mid = self.module.cur_fun_mut().new_label();
                self.emit_branch_for_condition(lhs, true_label, mid)?;
                self.module.cur_fun_mut().append(mid);
                self.emit_branch_for_condition(rhs, true_label, false_label)
            }
            exp => {
                let value = self.gen_exp(exp)?;
                let typ = self.module.value_type(self.module.cur_fun(), value);
                let cond = match typ {
                    // Comparison results branch directly.
                    IrType::Int1 => value,
                    // Integers compare against zero first.
                    IrType::Int32 => {
                        let zero = self.const_ref(0);
                        ValueRef::Instr(self.append(
                            InstrKind::Binary {
                                op: CmpOp::Ne.into(),
                                lhs: value,
                                rhs: zero,
                            },
                            IrType::Int1,
                        ))
                    }
                    typ => {
                        return Err(CompileError::semantic(
                            exp.line(),
                            format!("condition of type {typ} is not valid"),
                        ));
                    }
                };
                self.append(
                    InstrKind::Branch { cond, if_true: true_label, if_false: false_label },
                    IrType::Void,
                );
                Ok(())
            }
        }
    }

    /// A logical expression in value position (`int x = a && b;`)
    /// materializes 0/1 into an anonymous slot through the same jump
    /// threading used in branch position.
    pub(super) fn gen_logical_value(&mut self, exp: &ast::Expr) -> Result<ValueRef> {
        let fun = self.module.cur_fun_mut();
        let true_label = fun.new_label();
        let false_label = fun.new_label();
        let end_label = fun.new_label();
        let result = self.new_temp_mem(IrType::Int32);

        self.emit_branch_for_condition(exp, true_label, false_label)?;

        self.module.cur_fun_mut().append(true_label);
        let one = self.const_ref(1);
        self.append(InstrKind::Move { dst: result, src: one }, IrType::Void);
        self.append(InstrKind::Goto(end_label), IrType::Void);

        self.module.cur_fun_mut().append(false_label);
        let zero = self.const_ref(0);
        self.append(InstrKind::Move { dst: result, src: zero }, IrType::Void);

        self.module.cur_fun_mut().append(end_label);
        Ok(result)
    }
}
