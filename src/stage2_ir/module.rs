use crate::common::diag::{CompileError, Result};
use crate::common::types::{FunType, IrType};
use crate::stage2_ir::function::Function;
use crate::stage2_ir::value::{
    ConstId, ConstInt, FunId, GlobalId, GlobalVariable, ValueRef,
};
use std::collections::HashMap;

/// The process-wide container of one compilation run: functions, globals,
/// interned constants, and the scope stack used during translation.
#[derive(Debug)]
pub struct Module {
    pub funs: Vec<Function>,
    fun_index: HashMap<String, FunId>,

    pub globals: Vec<GlobalVariable>,

    pub consts: Vec<ConstInt>,
    const_index: HashMap<i32, ConstId>,

    /// Innermost scope last. Level 0 holds globals and lives as long as
    /// the module; function scopes start at level 1.
    scopes: Vec<HashMap<String, ValueRef>>,

    current_fun: Option<FunId>,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        let mut module = Self {
            funs: Vec::new(),
            fun_index: HashMap::new(),
            globals: Vec::new(),
            consts: Vec::new(),
            const_index: HashMap::new(),
            scopes: vec![HashMap::new()],
            current_fun: None,
        };
        module.declare_builtins();
        module
    }

    /* Functions */

    pub fn define_function(&mut self, name: &str, typ: FunType, line: u32) -> Result<FunId> {
        if self.fun_index.contains_key(name) {
            return Err(CompileError::semantic(
                line,
                format!("function '{name}' is already defined"),
            ));
        }
        let id = self.push_function(Function::new(name.to_string(), typ, false));
        Ok(id)
    }

    pub fn find_function(&self, name: &str) -> Option<FunId> {
        self.fun_index.get(name).copied()
    }

    pub fn fun(&self, id: FunId) -> &Function {
        &self.funs[id.index()]
    }
    pub fn fun_mut(&mut self, id: FunId) -> &mut Function {
        &mut self.funs[id.index()]
    }

    fn push_function(&mut self, fun: Function) -> FunId {
        let id = FunId(self.funs.len() as u32);
        self.fun_index.insert(fun.name.clone(), id);
        self.funs.push(fun);
        id
    }

    /// The standard I/O primitives, callable without a user definition.
    /// Their bodies are externally linked.
    fn declare_builtins(&mut self) {
        let i32_t = || IrType::Int32;
        let i32_ptr = || IrType::pointer_to(IrType::Int32);
        let builtins: [(&str, FunType); 6] = [
            ("getint", FunType { ret: i32_t(), params: vec![] }),
            ("putint", FunType { ret: IrType::Void, params: vec![i32_t()] }),
            ("getch", FunType { ret: i32_t(), params: vec![] }),
            ("putch", FunType { ret: IrType::Void, params: vec![i32_t()] }),
            ("getarray", FunType { ret: i32_t(), params: vec![i32_ptr()] }),
            ("putarray", FunType { ret: IrType::Void, params: vec![i32_t(), i32_ptr()] }),
        ];
        for (name, typ) in builtins {
            self.push_function(Function::new(name.to_string(), typ, true));
        }
    }

    /* Current function */

    pub fn set_current_function(&mut self, id: Option<FunId>) {
        self.current_fun = id;
    }
    pub fn current_function(&self) -> Option<FunId> {
        self.current_fun
    }
    pub fn cur_fun(&self) -> &Function {
        let id = self.current_fun.expect("translation is inside a function");
        self.fun(id)
    }
    pub fn cur_fun_mut(&mut self) -> &mut Function {
        let id = self.current_fun.expect("translation is inside a function");
        self.fun_mut(id)
    }

    /* Constants */

    pub fn interning_const_int(&mut self, value: i32) -> ConstId {
        if let Some(&id) = self.const_index.get(&value) {
            return id;
        }
        let id = ConstId(self.consts.len() as u32);
        self.consts.push(ConstInt { value });
        self.const_index.insert(value, id);
        id
    }

    pub fn const_int(&self, id: ConstId) -> &ConstInt {
        &self.consts[id.index()]
    }

    /* Globals */

    pub fn new_global(
        &mut self,
        typ: IrType,
        name: &str,
        init: Option<i32>,
        line: u32,
    ) -> Result<GlobalId> {
        if self.scopes[0].contains_key(name) {
            return Err(CompileError::semantic(
                line,
                format!("redefinition of global '{name}'"),
            ));
        }
        let id = GlobalId(self.globals.len() as u32);
        self.globals.push(GlobalVariable { typ, name: name.to_string(), init });
        self.scopes[0].insert(name.to_string(), ValueRef::Global(id));
        Ok(id)
    }

    pub fn global(&self, id: GlobalId) -> &GlobalVariable {
        &self.globals[id.index()]
    }

    /* Scopes */

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }
    pub fn leave_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "global scope is never popped");
        self.scopes.pop();
    }
    pub fn scope_level(&self) -> u32 {
        self.scopes.len() as u32 - 1
    }

    /// Record a new name in the innermost scope. Fails on redefinition in
    /// the same scope; shadowing an outer name is fine.
    pub fn declare_name(&mut self, name: &str, value: ValueRef, line: u32) -> Result<()> {
        let scope = self.scopes.last_mut().expect("at least the global scope exists");
        if scope.contains_key(name) {
            return Err(CompileError::semantic(
                line,
                format!("redefinition of '{name}' in the same scope"),
            ));
        }
        scope.insert(name.to_string(), value);
        Ok(())
    }

    /// Create a local variable in the current function and record it in
    /// the innermost scope.
    pub fn define_var(&mut self, typ: IrType, name: &str, line: u32) -> Result<ValueRef> {
        let level = self.scope_level();
        let local = self.cur_fun_mut().new_local(typ, Some(name.to_string()), level);
        let value = ValueRef::Local(local);
        self.declare_name(name, value, line)?;
        Ok(value)
    }

    /// Walk the scope stack inside-out.
    pub fn find_var(&self, name: &str) -> Option<ValueRef> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /* Value resolution */

    /// The type of any operand, resolving function-owned values through
    /// `fun`. Cloning is cheap: nested types are `Rc`-shared.
    pub fn value_type(&self, fun: &Function, v: ValueRef) -> IrType {
        match v {
            ValueRef::Const(_) => IrType::Int32,
            ValueRef::Global(id) => self.global(id).typ.clone(),
            _ => fun
                .value_type(v)
                .expect("function-owned operand resolves in its function")
                .clone(),
        }
    }

    /// The textual operand form: a bare literal for constants, `@name` for
    /// globals, the renamed IR name otherwise.
    pub fn value_text(&self, fun: &Function, v: ValueRef) -> String {
        match v {
            ValueRef::Const(id) => self.const_int(id).value.to_string(),
            ValueRef::Global(id) => self.global(id).ir_name(),
            ValueRef::Local(id) => fun.locals[id.index()].ir_name.clone(),
            ValueRef::Param(id) => fun.params[id.index()].ir_name.clone(),
            ValueRef::Mem(id) => fun.mems[id.index()].ir_name.clone(),
            ValueRef::Instr(id) => fun.instr(id).ir_name.clone(),
        }
    }
}
