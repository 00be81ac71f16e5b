//! AST builders and IR-text helpers shared by the test modules. The
//! frontend is out of scope, so test programs are constructed as trees.

use crate::common::diag::CompileError;
use crate::stage1_ast::*;

macro_rules! fail {
    ( $($arg:tt),* ) => {
        panic!($($arg)*)
    };
}
pub(crate) use fail;

/* Expressions. Line numbers default to 1; error tests pass explicit ones
via the `*_at` variants. */

pub fn lit(value: i32) -> Expr {
    Expr::LiteralInt { value, line: 1 }
}
pub fn var(name: &str) -> Expr {
    var_at(name, 1)
}
pub fn var_at(name: &str, line: u32) -> Expr {
    Expr::Var { name: name.to_string(), line }
}
pub fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), line: 1 }
}
pub fn neg(sub: Expr) -> Expr {
    Expr::Neg { sub: Box::new(sub), line: 1 }
}
pub fn and(lhs: Expr, rhs: Expr) -> Expr {
    Expr::LogicalAnd { lhs: Box::new(lhs), rhs: Box::new(rhs), line: 1 }
}
pub fn or(lhs: Expr, rhs: Expr) -> Expr {
    Expr::LogicalOr { lhs: Box::new(lhs), rhs: Box::new(rhs), line: 1 }
}
pub fn not(sub: Expr) -> Expr {
    Expr::LogicalNot { sub: Box::new(sub), line: 1 }
}
pub fn aref(name: &str, indices: Vec<Expr>) -> Expr {
    Expr::ArrayRef { name: name.to_string(), indices, line: 1 }
}
pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    call_at(name, args, 1)
}
pub fn call_at(name: &str, args: Vec<Expr>, line: u32) -> Expr {
    Expr::Call { name: name.to_string(), args, line }
}

/* Statements */

pub fn assign(lhs: Expr, rhs: Expr) -> Stmt {
    Stmt::Assign { lhs, rhs, line: 1 }
}
pub fn ret(exp: Expr) -> Stmt {
    Stmt::Return { exp: Some(exp), line: 1 }
}
pub fn ret_void() -> Stmt {
    Stmt::Return { exp: None, line: 1 }
}
pub fn ret_at(exp: Option<Expr>, line: u32) -> Stmt {
    Stmt::Return { exp, line }
}
pub fn iff(cond: Expr, then: Stmt) -> Stmt {
    Stmt::If { cond, then: Box::new(then), elze: None }
}
pub fn if_else(cond: Expr, then: Stmt, elze: Stmt) -> Stmt {
    Stmt::If { cond, then: Box::new(then), elze: Some(Box::new(elze)) }
}
pub fn wile(cond: Expr, body: Stmt) -> Stmt {
    Stmt::While { cond, body: Box::new(body) }
}
pub fn brk_at(line: u32) -> Stmt {
    Stmt::Break { line }
}
pub fn cont_at(line: u32) -> Stmt {
    Stmt::Continue { line }
}
pub fn expr_stmt(exp: Expr) -> Stmt {
    Stmt::Expr(exp)
}
pub fn block_stmt(stmts: Vec<Stmt>) -> Stmt {
    Stmt::Block(Block { items: stmts.into_iter().map(BlockItem::Stmt).collect() })
}

/* Declarations */

pub fn decl(name: &str, init: Option<Expr>) -> BlockItem {
    decl_at(name, init, 1)
}
pub fn decl_at(name: &str, init: Option<Expr>, line: u32) -> BlockItem {
    BlockItem::Decl(DeclStmt {
        decls: vec![VarDecl { name: name.to_string(), line, dims: vec![], init }],
    })
}
pub fn decl_arr(name: &str, dims: Vec<i32>) -> BlockItem {
    BlockItem::Decl(DeclStmt {
        decls: vec![VarDecl {
            name: name.to_string(),
            line: 1,
            dims: dims.into_iter().map(lit).collect(),
            init: None,
        }],
    })
}
pub fn stmt(s: Stmt) -> BlockItem {
    BlockItem::Stmt(s)
}

pub fn global_scalar(name: &str, init: Option<Expr>) -> UnitItem {
    UnitItem::GlobalDecl(DeclStmt {
        decls: vec![VarDecl { name: name.to_string(), line: 1, dims: vec![], init }],
    })
}
pub fn global_array(name: &str, dims: Vec<i32>) -> UnitItem {
    UnitItem::GlobalDecl(DeclStmt {
        decls: vec![VarDecl {
            name: name.to_string(),
            line: 1,
            dims: dims.into_iter().map(lit).collect(),
            init: None,
        }],
    })
}

/* Functions */

pub fn param(name: &str) -> FormalParam {
    FormalParam { name: name.to_string(), line: 1, dims: None }
}
/// `dims[0] = 0` stands for the empty first dimension.
pub fn array_param(name: &str, dims: Vec<i32>) -> FormalParam {
    FormalParam {
        name: name.to_string(),
        line: 1,
        dims: Some(
            dims.into_iter()
                .map(|d| if d == 0 { None } else { Some(lit(d)) })
                .collect(),
        ),
    }
}

pub fn fun_def(
    ret_type: TypeSpec,
    name: &str,
    params: Vec<FormalParam>,
    items: Vec<BlockItem>,
) -> UnitItem {
    UnitItem::FuncDef(FuncDef {
        ret_type,
        name: name.to_string(),
        line: 1,
        params,
        body: Block { items },
    })
}

pub fn main_fun(items: Vec<BlockItem>) -> UnitItem {
    fun_def(TypeSpec::Int, "main", vec![], items)
}

pub fn unit(items: Vec<UnitItem>) -> CompileUnit {
    CompileUnit { items }
}

/* Compilation shorthands */

pub fn ir_of(unit: &CompileUnit) -> String {
    crate::compile_to_ir(unit).unwrap()
}

pub fn asm_of(unit: &CompileUnit) -> String {
    crate::compile_to_asm(unit).unwrap()
}

pub fn err_of(unit: &CompileUnit) -> CompileError {
    crate::compile_to_ir(unit).unwrap_err()
}

/* IR-text inspection */

/// Label indices defined in the text (`.LN:` lines).
pub fn defined_labels(ir: &str) -> Vec<String> {
    ir.lines()
        .filter(|line| line.starts_with(".L") && line.ends_with(':'))
        .map(|line| line.trim_end_matches(':').to_string())
        .collect()
}

/// Label names referenced by `br` / `bc` lines.
pub fn referenced_labels(ir: &str) -> Vec<String> {
    let mut labels = vec![];
    for line in ir.lines() {
        let mut rest = line;
        while let Some(pos) = rest.find("label ") {
            let tail = &rest[pos + "label ".len()..];
            let end = tail.find([',', ' ']).unwrap_or(tail.len());
            labels.push(tail[..end].to_string());
            rest = &tail[end..];
        }
    }
    labels
}

/// The `(true, false)` label pair of a `bc` line.
pub fn branch_labels(line: &str) -> (String, String) {
    let mut parts = line.split("label ").skip(1);
    let mut next = || {
        parts
            .next()
            .unwrap_or_else(|| fail!("not a bc line: {line}"))
            .trim()
            .trim_end_matches(',')
            .to_string()
    };
    (next(), next())
}

/// Index of the first line containing `needle`.
pub fn line_index_of(text: &str, needle: &str) -> usize {
    text.lines()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| fail!("no line contains {needle:?} in:\n{text}"))
}
