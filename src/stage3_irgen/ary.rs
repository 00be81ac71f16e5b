use super::IrGenerator;
use crate::common::diag::{CompileError, Result};
use crate::common::types::IrType;
use crate::stage1_ast as ast;
use crate::stage2_ir::{ArithOp, InstrKind, ValueRef};

/// What an array reference denotes.
pub(super) enum ArrayAccess {
    /// Full-rank access: the address of one element, `Pointer(Int32)`.
    /// The caller decides whether to load through it or store through it.
    Element(ValueRef),
    /// Partial access: the address of a sub-array, passed on to an
    /// array-parameter call.
    SubArray(ValueRef),
}

/// Array address arithmetic.
impl IrGenerator {
    /// Lower `a[i1][i2]...[ik]` to explicit offset arithmetic:
    /// the element offset accumulates as
    /// `(((i1*d2) + i2)*d3 + ...) + ik`, is scaled to bytes, and is added
    /// to the base. The first dimension never participates, so an
    /// unknown-bound (0) leading dim of a decayed parameter is harmless.
    pub(super) fn gen_array_access(
        &mut self,
        name: &str,
        indices: &[ast::Expr],
        line: u32,
    ) -> Result<ArrayAccess> {
        let base = self.module.find_var(name).ok_or_else(|| {
            CompileError::semantic(line, format!("'{name}' is not declared"))
        })?;

        let dims = self.array_dims_of(base, name, line)?;
        let rank = dims.len();
        if indices.is_empty() || indices.len() > rank {
            return Err(CompileError::semantic(
                line,
                format!(
                    "array '{name}' has {rank} dimension(s), {} index(es) given",
                    indices.len()
                ),
            ));
        }

        let mut offset = self.gen_index_value(&indices[0])?;
        for (k, index) in indices.iter().enumerate().skip(1) {
            let dim = self.const_ref(dims[k]);
            let scaled = self.append(
                InstrKind::Binary { op: ArithOp::Mul.into(), lhs: offset, rhs: dim },
                IrType::Int32,
            );
            let index = self.gen_index_value(index)?;
            offset = ValueRef::Instr(self.append(
                InstrKind::Binary {
                    op: ArithOp::Add.into(),
                    lhs: ValueRef::Instr(scaled),
                    rhs: index,
                },
                IrType::Int32,
            ));
        }

        // Bytes per step of the innermost supplied index: the element size
        // for full-rank access, the sub-array size otherwise.
        let elem_size = IrType::Int32.bytelen();
        let step: i32 = dims[indices.len()..].iter().product::<i32>() * elem_size;
        let step = self.const_ref(step);
        let byte_offset = ValueRef::Instr(self.append(
            InstrKind::Binary { op: ArithOp::Mul.into(), lhs: offset, rhs: step },
            IrType::Int32,
        ));

        let addr = ValueRef::Instr(self.append(
            InstrKind::Binary { op: ArithOp::Add.into(), lhs: base, rhs: byte_offset },
            IrType::pointer_to(IrType::Int32),
        ));

        if indices.len() == rank {
            Ok(ArrayAccess::Element(addr))
        } else {
            Ok(ArrayAccess::SubArray(addr))
        }
    }

    /// The dimension vector governing indexing of `base`: the declared
    /// dims of an array value, or the recorded original dims of an
    /// array-decayed parameter copy (leading 0).
    fn array_dims_of(&self, base: ValueRef, name: &str, line: u32) -> Result<Vec<i32>> {
        let fun = self.module.cur_fun();
        if let ValueRef::Local(id) = base {
            if let Some(original) = &fun.locals[id.index()].original_array {
                if let Some(dims) = original.array_dims() {
                    return Ok(dims.to_vec());
                }
            }
        }
        let typ = self.module.value_type(fun, base);
        match typ.array_dims() {
            Some(dims) => Ok(dims.to_vec()),
            None => Err(CompileError::typing(
                line,
                format!("'{name}' of type {typ} cannot be indexed"),
            )),
        }
    }

    fn gen_index_value(&mut self, index: &ast::Expr) -> Result<ValueRef> {
        let value = self.gen_exp_value(index)?;
        let typ = self.module.value_type(self.module.cur_fun(), value);
        match typ {
            IrType::Int32 | IrType::Int1 => Ok(value),
            typ => Err(CompileError::typing(
                index.line(),
                format!("array index of type {typ} is not valid"),
            )),
        }
    }
}
