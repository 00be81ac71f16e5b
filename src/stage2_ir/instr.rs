use crate::common::types::IrType;
use crate::stage2_ir::value::{FunId, InstrId, ValueRef};
use derive_more::From;

/// One IR instruction: a common header plus a per-opcode payload. An
/// instruction that produces a result is itself a value (`ValueRef::Instr`).
#[derive(Debug)]
pub struct Instruction {
    pub kind: InstrKind,
    /// Result type; `Void` for instructions without a result.
    pub typ: IrType,
    /// Assigned by the rename pass (`%tN` for results, `.LN` for labels).
    pub ir_name: String,
}

impl Instruction {
    pub fn new(kind: InstrKind, typ: IrType) -> Self {
        Self { kind, typ, ir_name: String::new() }
    }

    /// Whether this instruction produces an SSA-style result value.
    pub fn has_result(&self) -> bool {
        match &self.kind {
            InstrKind::Binary { .. } => true,
            InstrKind::Call { .. } => !self.typ.is_void(),
            InstrKind::Entry
            | InstrKind::Exit(_)
            | InstrKind::Label
            | InstrKind::Goto(_)
            | InstrKind::Branch { .. }
            | InstrKind::Move { .. } => false,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self.kind, InstrKind::Label)
    }
}

#[derive(Debug)]
pub enum InstrKind {
    /// First instruction of every function.
    Entry,
    /// Last instruction of every function; reads the return slot if any.
    Exit(Option<ValueRef>),
    /// A jump target. Acts as a value only in the sense that jumps hold
    /// its handle.
    Label,
    Goto(InstrId),
    /// Conditional branch. `cond` must be the result of a comparison; the
    /// selector recovers the condition code from that instruction.
    Branch { cond: ValueRef, if_true: InstrId, if_false: InstrId },
    /// Scalar copy, or a load/store through a pointer depending on the
    /// operand types (see the printer and the selector).
    Move { dst: ValueRef, src: ValueRef },
    Binary { op: BinaryOp, lhs: ValueRef, rhs: ValueRef },
    Call { callee: FunId, args: Vec<ValueRef> },
}

#[derive(From, Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Arith(ArithOp),
    Cmp(CmpOp),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn ir_text(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Rem => "mod",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn ir_text(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }

    /// The ARM condition suffix. All comparisons are signed.
    pub fn arm_suffix(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }
}
