use crate::common::types::{FunType, IrType};
use crate::stage2_ir::instr::{InstrKind, Instruction};
use crate::stage2_ir::value::{
    FormalParam, InstrId, LocalId, LocalVariable, MemId, MemVariable, ParamId, ValueRef,
};

/// A function under construction and its value arenas.
///
/// `instrs` is the arena; `code` is the program order. Creating a label
/// pushes into the arena only; `append` places it.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub typ: FunType,
    pub is_builtin: bool,

    pub params: Vec<FormalParam>,
    pub locals: Vec<LocalVariable>,
    pub mems: Vec<MemVariable>,
    pub instrs: Vec<Instruction>,
    pub code: Vec<InstrId>,

    pub exit_label: Option<InstrId>,
    pub return_slot: Option<LocalId>,

    /// `(continue_target, break_target)` pairs, innermost last. Used only
    /// during body translation.
    pub loop_stack: Vec<(InstrId, InstrId)>,

    /// Largest argument count among calls in this body; sizes the outgoing
    /// argument area of the stack frame.
    pub max_call_arg_count: u32,
    pub has_call: bool,

    /// ARM32 register numbers this function must preserve. Filled by the
    /// instruction selector.
    pub protected_regs: Vec<u8>,
}

impl Function {
    pub fn new(name: String, typ: FunType, is_builtin: bool) -> Self {
        Self {
            name,
            typ,
            is_builtin,
            params: Vec::new(),
            locals: Vec::new(),
            mems: Vec::new(),
            instrs: Vec::new(),
            code: Vec::new(),
            exit_label: None,
            return_slot: None,
            loop_stack: Vec::new(),
            max_call_arg_count: 0,
            has_call: false,
            protected_regs: Vec::new(),
        }
    }

    pub fn ir_name(&self) -> String {
        format!("@{}", self.name)
    }

    /* Value creation */

    pub fn new_param(&mut self, param: FormalParam) -> ParamId {
        self.params.push(param);
        ParamId(self.params.len() as u32 - 1)
    }

    pub fn new_local(
        &mut self,
        typ: IrType,
        name: Option<String>,
        scope_level: u32,
    ) -> LocalId {
        self.locals.push(LocalVariable {
            typ,
            name,
            scope_level,
            original_array: None,
            ir_name: String::new(),
        });
        LocalId(self.locals.len() as u32 - 1)
    }

    /// An anonymous stack-resident slot.
    pub fn new_mem(&mut self, typ: IrType) -> MemId {
        self.mems.push(MemVariable { typ, ir_name: String::new() });
        MemId(self.mems.len() as u32 - 1)
    }

    /* Instruction creation */

    /// Put an instruction into the arena without placing it.
    pub fn new_instr(&mut self, kind: InstrKind, typ: IrType) -> InstrId {
        self.instrs.push(Instruction::new(kind, typ));
        InstrId(self.instrs.len() as u32 - 1)
    }

    /// Put an instruction into the arena and place it at the end of the
    /// program order.
    pub fn append_instr(&mut self, kind: InstrKind, typ: IrType) -> InstrId {
        let id = self.new_instr(kind, typ);
        self.append(id);
        id
    }

    pub fn new_label(&mut self) -> InstrId {
        self.new_instr(InstrKind::Label, IrType::Void)
    }

    pub fn append(&mut self, id: InstrId) {
        self.code.push(id);
    }

    /* Accessors */

    pub fn instr(&self, id: InstrId) -> &Instruction {
        &self.instrs[id.index()]
    }

    pub fn exit_label(&self) -> InstrId {
        self.exit_label.expect("exit label exists for any defined function")
    }

    pub fn return_slot_ref(&self) -> Option<ValueRef> {
        self.return_slot.map(ValueRef::Local)
    }

    /// The type of a value owned by this function. Constants and globals
    /// resolve through the `Module` instead.
    pub fn value_type(&self, v: ValueRef) -> Option<&IrType> {
        match v {
            ValueRef::Local(id) => Some(&self.locals[id.index()].typ),
            ValueRef::Param(id) => Some(&self.params[id.index()].typ),
            ValueRef::Mem(id) => Some(&self.mems[id.index()].typ),
            ValueRef::Instr(id) => Some(&self.instr(id).typ),
            ValueRef::Const(_) | ValueRef::Global(_) => None,
        }
    }

    /// Assign the externally stable IR names: one counter shared across
    /// `%t`, `%l` and `.L` prefixes, contiguous over the whole function.
    /// Formal params first, then locals, then mem slots, then labels and
    /// instruction results in program order.
    pub fn rename_ir(&mut self) {
        if self.is_builtin {
            return;
        }

        let mut index = 0u32;
        let mut next = |pfx: &str| {
            let name = format!("{pfx}{index}");
            index += 1;
            name
        };

        for param in &mut self.params {
            param.ir_name = next("%t");
            log::trace!("{}: param {} -> {}", self.name, param.name, param.ir_name);
        }
        for var in &mut self.locals {
            var.ir_name = next("%l");
            log::trace!(
                "{}: local {:?} (scope {}) -> {}",
                self.name,
                var.name,
                var.scope_level,
                var.ir_name
            );
        }
        for mem in &mut self.mems {
            mem.ir_name = next("%t");
        }
        for &id in &self.code {
            let inst = &mut self.instrs[id.index()];
            if inst.is_label() {
                inst.ir_name = next(".L");
            } else if inst.has_result() {
                inst.ir_name = next("%t");
            }
        }
    }
}
