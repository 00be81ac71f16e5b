use super::IrGenerator;
use crate::common::diag::{CompileError, Result};
use crate::common::types::IrType;
use crate::stage1_ast as ast;
use crate::stage2_ir::InstrKind;

/// `while`, `break`, `continue`.
impl IrGenerator {
    pub(super) fn gen_stmt_while(&mut self, cond: &ast::Expr, body: &ast::Stmt) -> Result<()> {
        let fun = self.module.cur_fun_mut();
        let cond_label = fun.new_label();
        let body_label = fun.new_label();
        let exit_label = fun.new_label();

        fun.loop_stack.push((cond_label, exit_label));

        self.module.cur_fun_mut().append(cond_label);
        self.emit_branch_for_condition(cond, body_label, exit_label)?;

        self.module.cur_fun_mut().append(body_label);
        self.gen_stmt(body)?;
        self.append(InstrKind::Goto(cond_label), IrType::Void);

        self.module.cur_fun_mut().append(exit_label);

        self.module.cur_fun_mut().loop_stack.pop();
        Ok(())
    }

    pub(super) fn gen_stmt_break(&mut self, line: u32) -> Result<()> {
        let target = match self.module.cur_fun().loop_stack.last() {
            Some(&(_, break_target)) => break_target,
            None => {
                return Err(CompileError::semantic(line, "break statement not within a loop"));
            }
        };
        self.append(InstrKind::Goto(target), IrType::Void);
        Ok(())
    }

    pub(super) fn gen_stmt_continue(&mut self, line: u32) -> Result<()> {
        let target = match self.module.cur_fun().loop_stack.last() {
            Some(&(continue_target, _)) => continue_target,
            None => {
                return Err(CompileError::semantic(
                    line,
                    "continue statement not within a loop",
                ));
            }
        };
        self.append(InstrKind::Goto(target), IrType::Void);
        Ok(())
    }
}
