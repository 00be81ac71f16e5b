use crate::stage2_ir::Module;
use crate::stage4_arm_gen::AsmProgram;
use std::fmt::Write;

const TAB: &str = "\t";

pub fn emit_program(module: &Module, asm: &AsmProgram) -> String {
    let mut out = String::new();

    writeln!(out, "{TAB}.text").unwrap();
    for fun in &asm.funs {
        writeln!(out, "{TAB}.global{TAB}{}", fun.name).unwrap();
        writeln!(out, "{}:", fun.name).unwrap();
        for line in &fun.lines {
            out.push_str(line);
            out.push('\n');
        }
    }

    let initialized: Vec<_> = module
        .globals
        .iter()
        .filter(|g| g.init.is_some())
        .collect();
    let bss: Vec<_> = module.globals.iter().filter(|g| g.init.is_none()).collect();

    if !initialized.is_empty() {
        writeln!(out, "{TAB}.data").unwrap();
        for global in initialized {
            writeln!(out, "{TAB}.global{TAB}{}", global.name).unwrap();
            writeln!(out, "{TAB}.align{TAB}2").unwrap();
            writeln!(out, "{}:", global.name).unwrap();
            let value = global.init.expect("filtered on initialized globals");
            writeln!(out, "{TAB}.word{TAB}{value}").unwrap();
        }
    }

    if !bss.is_empty() {
        writeln!(out, "{TAB}.bss").unwrap();
        for global in bss {
            writeln!(out, "{TAB}.global{TAB}{}", global.name).unwrap();
            writeln!(out, "{TAB}.align{TAB}2").unwrap();
            writeln!(out, "{}:", global.name).unwrap();
            writeln!(out, "{TAB}.space{TAB}{}", global.typ.bytelen()).unwrap();
        }
    }

    out
}
