use super::IrGenerator;
use crate::common::diag::{CompileError, Result};
use crate::common::types::{FunType, IrType};
use crate::stage1_ast as ast;
use crate::stage2_ir::{FormalParam, InstrKind, ValueRef};

/// Definitions: functions, formal parameters, global and local variables.
impl IrGenerator {
    pub(super) fn gen_fun_def(&mut self, fun_def: &ast::FuncDef) -> Result<()> {
        let ast::FuncDef { ret_type, name, line, params, body } = fun_def;

        if self.module.current_function().is_some() {
            return Err(CompileError::semantic(
                *line,
                format!("nested definition of function '{name}'"),
            ));
        }

        let ret = match ret_type {
            ast::TypeSpec::Int => IrType::Int32,
            ast::TypeSpec::Void => IrType::Void,
        };
        let param_storage: Vec<(IrType, Option<IrType>)> = params
            .iter()
            .map(|p| self.param_storage_type(p))
            .collect::<Result<_>>()?;

        let typ = FunType {
            ret: ret.clone(),
            params: param_storage.iter().map(|(t, _)| t.clone()).collect(),
        };
        let fun_id = self.module.define_function(name, typ, *line)?;
        self.module.set_current_function(Some(fun_id));
        self.module.enter_scope();

        self.append(InstrKind::Entry, IrType::Void);

        // Created now, appended after the body; `return` lowers to a jump here.
        let exit_label = self.module.cur_fun_mut().new_label();
        self.module.cur_fun_mut().exit_label = Some(exit_label);

        if !ret.is_void() {
            let level = self.module.scope_level();
            let slot = self.module.cur_fun_mut().new_local(ret, None, level);
            self.module.cur_fun_mut().return_slot = Some(slot);
        }

        self.gen_formal_params(params, &param_storage)?;

        // A `main` that falls off the end must still exit 0.
        if name == "main" {
            if let Some(ret_slot) = self.module.cur_fun().return_slot_ref() {
                let zero = self.const_ref(0);
                self.append(InstrKind::Move { dst: ret_slot, src: zero }, IrType::Void);
            }
        }

        self.gen_block(body, false)?;

        self.module.cur_fun_mut().append(exit_label);
        let ret_slot = self.module.cur_fun().return_slot_ref();
        self.append(InstrKind::Exit(ret_slot), IrType::Void);

        self.module.set_current_function(None);
        self.module.leave_scope();
        Ok(())
    }

    /// The storage type of a formal parameter, and the original array type
    /// for array parameters (dims with a leading 0).
    fn param_storage_type(
        &self,
        param: &ast::FormalParam,
    ) -> Result<(IrType, Option<IrType>)> {
        match &param.dims {
            None => Ok((IrType::Int32, None)),
            Some(dims) => {
                let mut dim_values = Vec::with_capacity(dims.len());
                for (k, dim) in dims.iter().enumerate() {
                    match dim {
                        None if k == 0 => dim_values.push(0),
                        None => {
                            return Err(CompileError::semantic(
                                param.line,
                                format!(
                                    "array parameter '{}' requires dimension {}",
                                    param.name,
                                    k + 1
                                ),
                            ));
                        }
                        Some(exp) => {
                            dim_values.push(self.eval_const_dim(exp, param.line)?)
                        }
                    }
                }
                let original = IrType::array_of(IrType::Int32, dim_values);
                Ok((IrType::pointer_to(IrType::Int32), Some(original)))
            }
        }
    }

    /// Each formal parameter gets a local copy of its storage type; a
    /// `Move` from the incoming value to the copy runs before any user
    /// code, and the copy owns the parameter's name in the function scope.
    fn gen_formal_params(
        &mut self,
        params: &[ast::FormalParam],
        storage: &[(IrType, Option<IrType>)],
    ) -> Result<()> {
        let level = self.module.scope_level();
        for (param, (typ, original)) in params.iter().zip(storage) {
            let fun = self.module.cur_fun_mut();
            let param_id = fun.new_param(FormalParam {
                typ: typ.clone(),
                name: param.name.clone(),
                original_array: original.clone(),
                ir_name: String::new(),
            });
            let local_id = fun.new_local(typ.clone(), Some(param.name.clone()), level);
            fun.locals[local_id.index()].original_array = original.clone();

            self.append(
                InstrKind::Move {
                    dst: ValueRef::Local(local_id),
                    src: ValueRef::Param(param_id),
                },
                IrType::Void,
            );
            self.module
                .declare_name(&param.name, ValueRef::Local(local_id), param.line)?;
        }
        Ok(())
    }

    /* Global declarations */

    pub(super) fn gen_global_decl(&mut self, decl: &ast::DeclStmt) -> Result<()> {
        for var in &decl.decls {
            if !var.dims.is_empty() {
                if var.init.is_some() {
                    return Err(CompileError::semantic(
                        var.line,
                        format!("global array '{}' cannot take an initializer", var.name),
                    ));
                }
                let dims = self.eval_const_dims(&var.dims, var.line)?;
                let typ = IrType::array_of(IrType::Int32, dims);
                self.module.new_global(typ, &var.name, None, var.line)?;
            } else {
                let init = match &var.init {
                    // A zero initializer still lands in BSS.
                    Some(exp) => match self.eval_const_exp(exp)? {
                        0 => None,
                        value => Some(value),
                    },
                    None => None,
                };
                self.module.new_global(IrType::Int32, &var.name, init, var.line)?;
            }
        }
        Ok(())
    }

    /* Local declarations */

    pub(super) fn gen_decl_stmt(&mut self, decl: &ast::DeclStmt) -> Result<()> {
        for var in &decl.decls {
            self.gen_var_decl(var)?;
        }
        Ok(())
    }

    fn gen_var_decl(&mut self, var: &ast::VarDecl) -> Result<()> {
        if !var.dims.is_empty() {
            if var.init.is_some() {
                return Err(CompileError::semantic(
                    var.line,
                    format!("array '{}' cannot take a scalar initializer", var.name),
                ));
            }
            let dims = self.eval_const_dims(&var.dims, var.line)?;
            let typ = IrType::array_of(IrType::Int32, dims);
            self.module.define_var(typ, &var.name, var.line)?;
            return Ok(());
        }

        let dst = self.module.define_var(IrType::Int32, &var.name, var.line)?;
        if let Some(init) = &var.init {
            let src = self.gen_exp_value(init)?;
            self.append(InstrKind::Move { dst, src }, IrType::Void);
        }
        Ok(())
    }

    /* Compile-time constants */

    fn eval_const_dims(&self, dims: &[ast::Expr], line: u32) -> Result<Vec<i32>> {
        dims.iter().map(|d| self.eval_const_dim(d, line)).collect()
    }

    fn eval_const_dim(&self, exp: &ast::Expr, line: u32) -> Result<i32> {
        let value = self.eval_const_exp(exp)?;
        if value <= 0 {
            return Err(CompileError::semantic(
                line,
                format!("array dimension must be a positive constant, got {value}"),
            ));
        }
        Ok(value)
    }

    /// Folds the constant-expression subset: literals, unary minus, and
    /// integer arithmetic over constants.
    pub(super) fn eval_const_exp(&self, exp: &ast::Expr) -> Result<i32> {
        let non_const = |line: u32| {
            CompileError::semantic(line, "expression is not a compile-time integer constant")
        };
        match exp {
            ast::Expr::LiteralInt { value, .. } => Ok(*value),
            ast::Expr::Neg { sub, .. } => Ok(self.eval_const_exp(sub)?.wrapping_neg()),
            ast::Expr::Binary { op, lhs, rhs, line } => {
                let lhs = self.eval_const_exp(lhs)?;
                let rhs = self.eval_const_exp(rhs)?;
                match op {
                    ast::BinOp::Add => Ok(lhs.wrapping_add(rhs)),
                    ast::BinOp::Sub => Ok(lhs.wrapping_sub(rhs)),
                    ast::BinOp::Mul => Ok(lhs.wrapping_mul(rhs)),
                    ast::BinOp::Div if rhs != 0 => Ok(lhs.wrapping_div(rhs)),
                    ast::BinOp::Mod if rhs != 0 => Ok(lhs.wrapping_rem(rhs)),
                    _ => Err(non_const(*line)),
                }
            }
            other => Err(non_const(other.line())),
        }
    }
}
