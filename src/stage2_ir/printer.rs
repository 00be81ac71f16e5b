//! Textual form of the IR. This format is externally observable and
//! bit-stable; tests compare against it verbatim.

use crate::common::types::IrType;
use crate::stage2_ir::function::Function;
use crate::stage2_ir::instr::{BinaryOp, InstrKind};
use crate::stage2_ir::module::Module;
use crate::stage2_ir::value::ValueRef;
use std::fmt::Write;

pub fn module_to_string(module: &Module) -> String {
    let mut out = String::new();

    for global in &module.globals {
        match (&global.typ, global.init) {
            (IrType::Array { elem, dims }, _) => {
                write!(out, "declare {elem} {}", global.ir_name()).unwrap();
                for d in dims {
                    write!(out, "[{d}]").unwrap();
                }
                out.push('\n');
            }
            (typ, Some(value)) => {
                writeln!(out, "declare {typ} {} = {value}", global.ir_name()).unwrap();
            }
            (typ, None) => {
                writeln!(out, "declare {typ} {}", global.ir_name()).unwrap();
            }
        }
    }

    for fun in &module.funs {
        if fun.is_builtin {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        write_fun(&mut out, module, fun);
    }

    out
}

fn write_fun(out: &mut String, module: &Module, fun: &Function) {
    write!(out, "define {} {}(", fun.typ.ret, fun.ir_name()).unwrap();
    for (k, param) in fun.params.iter().enumerate() {
        if k > 0 {
            out.push_str(", ");
        }
        match &param.original_array {
            Some(IrType::Array { elem, dims }) => {
                write!(out, "{elem} {}", param.ir_name).unwrap();
                for d in dims {
                    write!(out, "[{d}]").unwrap();
                }
            }
            _ => write!(out, "{} {}", param.typ, param.ir_name).unwrap(),
        }
    }
    out.push_str(")\n{\n");

    for var in &fun.locals {
        let shown = var.original_array.as_ref().unwrap_or(&var.typ);
        match shown {
            IrType::Array { elem, dims } => {
                write!(out, "\tdeclare {elem} {}", var.ir_name).unwrap();
                for d in dims {
                    write!(out, "[{d}]").unwrap();
                }
            }
            typ => write!(out, "\tdeclare {typ} {}", var.ir_name).unwrap(),
        }
        if let Some(name) = &var.name {
            write!(out, " ; variable: {name}").unwrap();
        }
        out.push('\n');
    }

    for mem in &fun.mems {
        writeln!(out, "\tdeclare {} {}", mem.typ, mem.ir_name).unwrap();
    }

    for &id in &fun.code {
        let inst = fun.instr(id);
        if inst.has_result() {
            writeln!(out, "\tdeclare {} {}", inst.typ, inst.ir_name).unwrap();
        }
    }

    for &id in &fun.code {
        let inst = fun.instr(id);
        match &inst.kind {
            InstrKind::Label => {
                writeln!(out, "{}:", inst.ir_name).unwrap();
            }
            kind => {
                let text = instr_text(module, fun, kind, &inst.ir_name);
                writeln!(out, "\t{text}").unwrap();
            }
        }
    }

    out.push_str("}\n");
}

fn instr_text(module: &Module, fun: &Function, kind: &InstrKind, name: &str) -> String {
    let val = |v: ValueRef| module.value_text(fun, v);
    match kind {
        InstrKind::Entry => "entry".to_string(),
        InstrKind::Exit(Some(v)) => format!("exit {}", val(*v)),
        InstrKind::Exit(None) => "exit".to_string(),
        InstrKind::Label => unreachable!("labels are printed by the caller"),
        InstrKind::Goto(target) => {
            format!("br label {}", fun.instr(*target).ir_name)
        }
        InstrKind::Branch { cond, if_true, if_false } => format!(
            "bc {}, label {}, label {}",
            val(*cond),
            fun.instr(*if_true).ir_name,
            fun.instr(*if_false).ir_name,
        ),
        InstrKind::Move { dst, src } => {
            let dst_is_ptr = module.value_type(fun, *dst).is_pointer();
            let src_is_ptr = module.value_type(fun, *src).is_pointer();
            match (dst_is_ptr, src_is_ptr) {
                (true, false) => format!("*{} = {}", val(*dst), val(*src)),
                (false, true) => format!("{} = *{}", val(*dst), val(*src)),
                _ => format!("{} = {}", val(*dst), val(*src)),
            }
        }
        InstrKind::Binary { op: BinaryOp::Arith(op), lhs, rhs } => {
            format!("{name} = {} {},{}", op.ir_text(), val(*lhs), val(*rhs))
        }
        InstrKind::Binary { op: BinaryOp::Cmp(op), lhs, rhs } => {
            format!("{name} = cmp {} {}, {}", op.ir_text(), val(*lhs), val(*rhs))
        }
        InstrKind::Call { callee, args } => {
            let callee = module.fun(*callee);
            let mut text = if callee.typ.ret.is_void() {
                format!("call void {}(", callee.ir_name())
            } else {
                format!("{name} = call {} {}(", callee.typ.ret, callee.ir_name())
            };
            for (k, &arg) in args.iter().enumerate() {
                if k > 0 {
                    text.push_str(", ");
                }
                text.push_str(&call_arg_text(module, fun, callee, k, arg));
            }
            text.push(')');
            text
        }
    }
}

/// Array arguments mirror the source element type and dimensions in the
/// printed call; the ABI is still a pointer in a register or on the stack.
fn call_arg_text(
    module: &Module,
    fun: &Function,
    callee: &Function,
    k: usize,
    arg: ValueRef,
) -> String {
    let mut name = module.value_text(fun, arg);
    let arg_typ = module.value_type(fun, arg);

    let param = callee.params.get(k);
    let param_dims = param.and_then(|p| p.original_array.as_ref()).and_then(IrType::array_dims);

    let (type_text, dims) = match (&arg_typ, param_dims) {
        (IrType::Array { elem, dims }, _) => (elem.to_string(), Some(dims.clone())),
        (IrType::Pointer(elem), Some(dims)) => (elem.to_string(), Some(dims.to_vec())),
        (typ, _) => (typ.to_string(), None),
    };
    if let Some(dims) = dims {
        for d in &dims {
            write!(name, "[{d}]").unwrap();
        }
    }
    format!("{type_text} {name}")
}
