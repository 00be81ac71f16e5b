//! + Lower each function's linear IR to an ARM32 mnemonic stream.
//! + Operands move through a trivial register allocator: every value is
//!   memory-resident between IR instructions, loaded into scratch
//!   registers per instruction and stored back; `r10` is reserved for
//!   bridging offsets and immediates that do not encode.
//! + The calling convention passes the first four arguments in `r0`-`r3`
//!   and the rest in the caller's outgoing stack area.

pub mod frame;
pub mod iloc;
pub mod isel;
pub mod platform;
pub mod regalloc;

use crate::common::diag::Result;
use crate::stage2_ir::Module;

/// The selected assembly of one function, one formatted line per
/// instruction or label.
#[derive(Debug)]
pub struct AsmFunction {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug)]
pub struct AsmProgram {
    pub funs: Vec<AsmFunction>,
}

/// Run instruction selection over every defined function. Also records
/// each function's callee-saved register list.
pub fn select_module(module: &mut Module) -> Result<AsmProgram> {
    let mut funs = Vec::new();
    for id in 0..module.funs.len() {
        if module.funs[id].is_builtin {
            continue;
        }
        let (asm_fun, protected) = {
            let fun = &module.funs[id];
            let mut selector = isel::InstSelectorArm32::new(module, fun);
            selector.run()?;
            selector.finish()
        };
        module.funs[id].protected_regs = protected;
        log::debug!(
            "{}: protects {:?}",
            module.funs[id].name,
            module.funs[id].protected_regs
        );
        funs.push(asm_fun);
    }
    Ok(AsmProgram { funs })
}
