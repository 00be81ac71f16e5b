use crate::common::diag::Result;
use crate::common::types::IrType;
use crate::stage1_ast as ast;
use crate::stage2_ir::{InstrId, InstrKind, Module, ValueRef};
use crate::utils::noop;

/// Walks one compile unit and builds the `Module`. Halts at the first
/// error; the partially built module is discarded by the caller.
pub struct IrGenerator {
    pub(super) module: Module,
}

impl IrGenerator {
    pub fn translate(unit: &ast::CompileUnit) -> Result<Module> {
        let mut gen = Self { module: Module::new() };
        gen.gen_compile_unit(unit)?;
        for fun in &mut gen.module.funs {
            fun.rename_ir();
        }
        Ok(gen.module)
    }

    fn gen_compile_unit(&mut self, unit: &ast::CompileUnit) -> Result<()> {
        log::debug!("translating compile unit: {} items", unit.items.len());
        self.module.set_current_function(None);
        for item in &unit.items {
            match item {
                ast::UnitItem::FuncDef(fun_def) => self.gen_fun_def(fun_def)?,
                ast::UnitItem::GlobalDecl(decl) => self.gen_global_decl(decl)?,
            }
        }
        Ok(())
    }

    /* Block */

    pub(super) fn gen_block(&mut self, block: &ast::Block, new_scope: bool) -> Result<()> {
        if new_scope {
            self.module.enter_scope();
        }
        let result = self.gen_block_items(block);
        if new_scope {
            self.module.leave_scope();
        }
        result
    }
    fn gen_block_items(&mut self, block: &ast::Block) -> Result<()> {
        for item in &block.items {
            match item {
                ast::BlockItem::Decl(decl) => self.gen_decl_stmt(decl)?,
                ast::BlockItem::Stmt(stmt) => self.gen_stmt(stmt)?,
            }
        }
        Ok(())
    }

    /* Statement */

    pub(super) fn gen_stmt(&mut self, stmt: &ast::Stmt) -> Result<()> {
        match stmt {
            ast::Stmt::Assign { lhs, rhs, line } => self.gen_stmt_assign(lhs, rhs, *line),
            ast::Stmt::Return { exp, line } => self.gen_stmt_return(exp.as_ref(), *line),
            ast::Stmt::If { cond, then, elze } => {
                self.gen_stmt_if(cond, then, elze.as_deref())
            }
            ast::Stmt::While { cond, body } => self.gen_stmt_while(cond, body),
            ast::Stmt::Break { line } => self.gen_stmt_break(*line),
            ast::Stmt::Continue { line } => self.gen_stmt_continue(*line),
            ast::Stmt::Expr(exp) => {
                self.gen_exp(exp)?;
                Ok(())
            }
            ast::Stmt::Block(block) => self.gen_block(block, true),
            ast::Stmt::Empty => {
                noop!("null statement");
                Ok(())
            }
        }
    }

    /* Shared emission helpers */

    pub(super) fn append(&mut self, kind: InstrKind, typ: IrType) -> InstrId {
        self.module.cur_fun_mut().append_instr(kind, typ)
    }

    pub(super) fn const_ref(&mut self, value: i32) -> ValueRef {
        ValueRef::Const(self.module.interning_const_int(value))
    }
}
