//! Final textual assembly: selected function bodies plus the data and BSS
//! sections for globals. Builtins stay external references for the linker.

pub mod emit;

pub use self::emit::emit_program;
