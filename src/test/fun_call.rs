use crate::common::diag::CompileError;
use crate::stage1_ast::{BinOp, TypeSpec};
use crate::test::utils::{self, fail};
use anyhow::Result;

#[test]
fn builtins_callable_without_definition() -> Result<()> {
    // int main() { int c = getint(); putint(c); putch(10); return 0; }
    let unit = utils::unit(vec![utils::main_fun(vec![
        utils::decl("c", Some(utils::call("getint", vec![]))),
        utils::stmt(utils::expr_stmt(utils::call("putint", vec![utils::var("c")]))),
        utils::stmt(utils::expr_stmt(utils::call("putch", vec![utils::lit(10)]))),
        utils::stmt(utils::ret(utils::lit(0))),
    ])]);
    let ir = utils::ir_of(&unit);

    assert!(ir.contains("= call i32 @getint()"), "{ir}");
    assert!(ir.contains("call void @putint(i32 %l1)"), "{ir}");
    assert!(ir.contains("call void @putch(i32 10)"), "{ir}");
    // Builtins never print definitions.
    assert!(!ir.contains("define i32 @getint"), "{ir}");
    Ok(())
}

#[test]
fn recursion_calls_own_definition() -> Result<()> {
    // int f(int n) { if (n <= 1) return n; return f(n-1) + f(n-2); }
    // int main() { return f(10); }
    let unit = utils::unit(vec![
        utils::fun_def(
            TypeSpec::Int,
            "f",
            vec![utils::param("n")],
            vec![
                utils::stmt(utils::iff(
                    utils::bin(BinOp::Le, utils::var("n"), utils::lit(1)),
                    utils::ret(utils::var("n")),
                )),
                utils::stmt(utils::ret(utils::bin(
                    BinOp::Add,
                    utils::call("f", vec![utils::bin(BinOp::Sub, utils::var("n"), utils::lit(1))]),
                    utils::call("f", vec![utils::bin(BinOp::Sub, utils::var("n"), utils::lit(2))]),
                ))),
            ],
        ),
        utils::main_fun(vec![utils::stmt(utils::ret(utils::call(
            "f",
            vec![utils::lit(10)],
        )))]),
    ]);
    let ir = utils::ir_of(&unit);

    let f_part = ir.split("define i32 @main").next().unwrap();
    assert_eq!(f_part.matches("call i32 @f(").count(), 2, "{ir}");
    assert!(ir.contains("call i32 @f(i32 10)"), "{ir}");
    Ok(())
}

#[test]
fn call_arity_must_match() -> Result<()> {
    let unit = utils::unit(vec![utils::main_fun(vec![utils::stmt(
        utils::expr_stmt(utils::call_at("putint", vec![], 7)),
    )])]);
    match utils::err_of(&unit) {
        CompileError::SemanticError { line: 7, message } => {
            assert!(message.contains("putint"), "{message}");
            assert!(message.contains("1 argument"), "{message}");
        }
        err => fail!("{err:?}"),
    }
    Ok(())
}

#[test]
fn undefined_function_is_semantic_error() -> Result<()> {
    let unit = utils::unit(vec![utils::main_fun(vec![utils::stmt(
        utils::expr_stmt(utils::call_at("mystery", vec![], 3)),
    )])]);
    match utils::err_of(&unit) {
        CompileError::SemanticError { line: 3, message } => {
            assert!(message.contains("mystery"), "{message}")
        }
        err => fail!("{err:?}"),
    }
    Ok(())
}

#[test]
fn arguments_evaluate_left_to_right() -> Result<()> {
    // six(getint(), getint(), 3, 4, 5, 6): the two getint calls appear in
    // order before the outer call.
    let unit = utils::unit(vec![
        utils::fun_def(
            TypeSpec::Int,
            "six",
            (0..6).map(|k| utils::param(&format!("p{k}"))).collect(),
            vec![utils::stmt(utils::ret(utils::var("p0")))],
        ),
        utils::main_fun(vec![utils::stmt(utils::ret(utils::call(
            "six",
            vec![
                utils::call("getint", vec![]),
                utils::call("getint", vec![]),
                utils::lit(3),
                utils::lit(4),
                utils::lit(5),
                utils::lit(6),
            ],
        )))]),
    ]);
    let ir = utils::ir_of(&unit);

    let main_part = &ir[ir.find("define i32 @main").unwrap()..];
    let first = utils::line_index_of(main_part, "call i32 @getint()");
    let outer = utils::line_index_of(main_part, "call i32 @six(");
    let second = first
        + 1
        + main_part
            .lines()
            .skip(first + 1)
            .position(|l| l.contains("call i32 @getint()"))
            .unwrap();
    assert!(first < second && second < outer, "{ir}");
    Ok(())
}

#[test]
fn six_params_materialize_in_signature_order() -> Result<()> {
    let unit = utils::unit(vec![
        utils::fun_def(
            TypeSpec::Int,
            "six",
            (0..6).map(|k| utils::param(&format!("p{k}"))).collect(),
            vec![utils::stmt(utils::ret(utils::var("p5")))],
        ),
        utils::main_fun(vec![utils::stmt(utils::ret(utils::lit(0)))]),
    ]);
    let ir = utils::ir_of(&unit);

    assert!(
        ir.contains("define i32 @six(i32 %t0, i32 %t1, i32 %t2, i32 %t3, i32 %t4, i32 %t5)"),
        "{ir}"
    );
    // Copies run in signature order before user code: %l7 = %t0 ... (%l6
    // is the return slot).
    for k in 0..6u32 {
        assert!(ir.contains(&format!("%l{} = %t{k}", 7 + k)), "{ir}");
    }
    Ok(())
}
