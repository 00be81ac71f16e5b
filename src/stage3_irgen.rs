//! + Walk the AST and translate each function into a linear sequence of
//!   typed IR instructions with explicit labels and branches.
//! + Conditions lower through jump threading with inherited true/false
//!   continuation labels, so `&&`, `||` and `!` never materialize a value
//!   in branch position.
//! + Array accesses lower to explicit offset arithmetic over the declared
//!   (or original, for decayed parameters) dimensions.

mod ary;
mod conditional;
mod defn;
mod exp;
mod generate;
mod looping;

pub use self::generate::IrGenerator;
