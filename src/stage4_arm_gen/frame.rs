use crate::stage2_ir::{Function, ValueRef};
use crate::stage4_arm_gen::platform::{RegNo, PROTECTED_REGS};
use std::collections::HashMap;

/// Stack-frame layout of one function.
///
/// ```text
///   ...                      incoming stack args (fp + 4*npushed + ...)
///   pushed {r4-r7, fp, lr}
///   fp ->                    (fp = sp right after the push)
///   locals / temps / mems    negative fp offsets
///   outgoing args            [sp, #0] upward
///   sp = fp - frame_size
/// ```
#[derive(Debug)]
pub struct FrameLayout {
    /// fp-relative offsets of every memory-resident value.
    pub offsets: HashMap<ValueRef, i32>,
    pub frame_size: i32,
    pub protected: Vec<RegNo>,
}

pub fn layout(fun: &Function) -> FrameLayout {
    let protected: Vec<RegNo> = PROTECTED_REGS.to_vec();
    let mut offsets = HashMap::new();

    // Incoming params: the first four stay in r0-r3 until their
    // materialization moves; the rest arrive above the pushed registers.
    let incoming_base = 4 * protected.len() as i32;
    for (k, _) in fun.params.iter().enumerate().skip(4) {
        offsets.insert(
            ValueRef::Param(crate::stage2_ir::ParamId(k as u32)),
            incoming_base + 4 * (k as i32 - 4),
        );
    }

    let mut offset = 0i32;
    let mut place = |offsets: &mut HashMap<ValueRef, i32>, value: ValueRef, size: i32| {
        let size = (size.max(4) + 3) & !3;
        offset -= size;
        offsets.insert(value, offset);
    };

    for (k, var) in fun.locals.iter().enumerate() {
        place(
            &mut offsets,
            ValueRef::Local(crate::stage2_ir::LocalId(k as u32)),
            var.typ.bytelen(),
        );
    }
    for (k, mem) in fun.mems.iter().enumerate() {
        place(
            &mut offsets,
            ValueRef::Mem(crate::stage2_ir::MemId(k as u32)),
            mem.typ.bytelen(),
        );
    }
    for &id in &fun.code {
        if fun.instr(id).has_result() {
            place(&mut offsets, ValueRef::Instr(id), 4);
        }
    }

    let vars_area = -offset;
    let outgoing_area = if fun.has_call {
        4 * (fun.max_call_arg_count as i32 - 4).max(0)
    } else {
        0
    };
    let frame_size = (vars_area + outgoing_area + 7) & !7;

    FrameLayout { offsets, frame_size, protected }
}
