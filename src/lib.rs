#![allow(rustdoc::private_intra_doc_links)]

mod common;
pub mod driver;
pub mod stage1_ast;
mod stage2_ir;
mod stage3_irgen;
mod stage4_arm_gen;
mod stage5_asm_emit;

#[cfg(test)]
mod test;

mod utils {
    macro_rules! noop {
        ($($comment:literal)?) => {{}}; // Empty expression
    }

    pub(crate) use noop;
}

pub use crate::common::diag::{CompileError, Result};

use crate::stage1_ast::CompileUnit;

/// Translate a compile unit into the textual linear IR.
pub fn compile_to_ir(ast: &CompileUnit) -> Result<String> {
    let module = stage3_irgen::IrGenerator::translate(ast)?;
    Ok(stage2_ir::printer::module_to_string(&module))
}

/// Translate a compile unit all the way down to ARM32 assembly text.
pub fn compile_to_asm(ast: &CompileUnit) -> Result<String> {
    let mut module = stage3_irgen::IrGenerator::translate(ast)?;
    let asm = stage4_arm_gen::select_module(&mut module)?;
    Ok(stage5_asm_emit::emit_program(&module, &asm))
}
