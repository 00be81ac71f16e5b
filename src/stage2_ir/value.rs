use crate::common::types::IrType;
use derive_more::From;

macro_rules! id_newtype {
    ($($name:ident),+ $(,)?) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
            pub struct $name(pub(crate) u32);
            impl $name {
                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )+
    };
}
id_newtype!(ConstId, GlobalId, LocalId, ParamId, MemId, InstrId, FunId);

/// A handle to any operand value. Constants and globals resolve through the
/// `Module`; the rest resolve through the owning `Function`.
#[derive(From, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ValueRef {
    Const(ConstId),
    Global(GlobalId),
    Local(LocalId),
    Param(ParamId),
    Mem(MemId),
    Instr(InstrId),
}

/// An interned integer constant. One `ConstInt` per distinct value per
/// `Module`.
#[derive(Debug)]
pub struct ConstInt {
    pub value: i32,
}

#[derive(Debug)]
pub struct GlobalVariable {
    pub typ: IrType,
    pub name: String,
    /// `None` marks a BSS global; `Some` an initialized one.
    pub init: Option<i32>,
}

impl GlobalVariable {
    pub fn ir_name(&self) -> String {
        format!("@{}", self.name)
    }
}

#[derive(Debug)]
pub struct LocalVariable {
    pub typ: IrType,
    /// Source name; anonymous for compiler-introduced slots such as the
    /// return slot.
    pub name: Option<String>,
    pub scope_level: u32,
    /// For the materialized copy of an array-decayed parameter: the
    /// original `Array` type, dims with a leading 0. Indexing inside the
    /// callee uses these dims.
    pub original_array: Option<IrType>,
    /// Assigned by the rename pass.
    pub ir_name: String,
}

/// An anonymous stack-resident slot: rvalue loads of array elements, and
/// outgoing stack arguments.
#[derive(Debug)]
pub struct MemVariable {
    pub typ: IrType,
    pub ir_name: String,
}

/// The incoming argument value at function entry. Distinct from the
/// user-accessible local copy that shadows it.
#[derive(Debug)]
pub struct FormalParam {
    pub typ: IrType,
    pub name: String,
    /// For array parameters: the original `Array` type, dims with a
    /// leading 0. The storage `typ` is already `Pointer`.
    pub original_array: Option<IrType>,
    pub ir_name: String,
}
