//! The linear, label-based three-address IR.
//!
//! + Values live in per-`Module` / per-`Function` arenas and are referred
//!   to by `Copy` handles, never by pointers.
//! + Instructions are values when they produce a result; labels are a
//!   variant of instruction and the only jump targets.
//! + A function's program order is a sequence of instruction handles,
//!   separate from the arena, so a label can be created early and placed
//!   late.

pub mod function;
pub mod instr;
pub mod module;
pub mod printer;
pub mod value;

pub use self::{function::*, instr::*, module::*, value::*};
