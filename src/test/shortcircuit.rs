use crate::stage1_ast::BinOp;
use crate::test::utils;
use anyhow::Result;

#[test]
fn and_divides_only_after_lhs_holds() -> Result<()> {
    // int main() { int a=1; int b=0; if (a && (1/b)) return 1; return 0; }
    // The division must sit strictly after the mid label: if `a` is false
    // it never executes.
    let unit = utils::unit(vec![utils::main_fun(vec![
        utils::decl("a", Some(utils::lit(1))),
        utils::decl("b", Some(utils::lit(0))),
        utils::stmt(utils::iff(
            utils::and(
                utils::var("a"),
                utils::bin(BinOp::Div, utils::lit(1), utils::var("b")),
            ),
            utils::ret(utils::lit(1)),
        )),
        utils::stmt(utils::ret(utils::lit(0))),
    ])]);
    let ir = utils::ir_of(&unit);

    assert_eq!(ir.matches(" div ").count(), 1, "{ir}");

    // First bc belongs to the lhs; its true label is the mid label, and
    // the division comes after that label's definition.
    let first_bc = utils::line_index_of(&ir, "bc ");
    let lines: Vec<&str> = ir.lines().collect();
    let (mid_label, _) = utils::branch_labels(lines[first_bc]);
    let mid_def = utils::line_index_of(&ir, &format!("{mid_label}:"));
    let div_line = utils::line_index_of(&ir, " div ");
    assert!(
        mid_def < div_line,
        "division evaluated before {mid_label}:\n{ir}"
    );
    assert!(first_bc < mid_def, "{ir}");
    Ok(())
}

#[test]
fn or_short_circuits_to_true_target() -> Result<()> {
    // if (a || b): the first bc jumps straight to the true label, and the
    // rhs evaluates under the mid label.
    let unit = utils::unit(vec![utils::main_fun(vec![
        utils::decl("a", Some(utils::lit(0))),
        utils::decl("b", Some(utils::lit(1))),
        utils::stmt(utils::iff(
            utils::or(utils::var("a"), utils::var("b")),
            utils::ret(utils::lit(1)),
        )),
        utils::stmt(utils::ret(utils::lit(0))),
    ])]);
    let ir = utils::ir_of(&unit);
    let lines: Vec<&str> = ir.lines().collect();

    let first_bc = utils::line_index_of(&ir, "bc ");
    let second_bc = first_bc
        + 1
        + lines[first_bc + 1..]
            .iter()
            .position(|l| l.contains("bc "))
            .unwrap();

    // Both bc lines share the same ultimate true label.
    let (lhs_true, lhs_false) = utils::branch_labels(lines[first_bc]);
    let (rhs_true, _) = utils::branch_labels(lines[second_bc]);
    assert_eq!(lhs_true, rhs_true, "{ir}");

    // The lhs false label is the mid label, defined between the two bc's.
    let mid_def = utils::line_index_of(&ir, &format!("{lhs_false}:"));
    assert!(first_bc < mid_def && mid_def < second_bc, "{ir}");
    Ok(())
}

#[test]
fn not_swaps_branch_targets() -> Result<()> {
    let base = |cond: crate::stage1_ast::Expr| {
        utils::unit(vec![utils::main_fun(vec![
            utils::decl("a", Some(utils::lit(1))),
            utils::stmt(utils::if_else(
                cond,
                utils::ret(utils::lit(1)),
                utils::ret(utils::lit(2)),
            )),
            utils::stmt(utils::ret(utils::lit(0))),
        ])])
    };

    let plain = utils::ir_of(&base(utils::bin(
        BinOp::Lt,
        utils::var("a"),
        utils::lit(5),
    )));
    let negated = utils::ir_of(&base(utils::not(utils::bin(
        BinOp::Lt,
        utils::var("a"),
        utils::lit(5),
    ))));

    let bc_labels = |ir: &str| {
        let line = ir.lines().find(|l| l.contains("bc ")).unwrap();
        utils::branch_labels(line)
    };
    let (plain_t, plain_f) = bc_labels(&plain);
    let (neg_t, neg_f) = bc_labels(&negated);

    // Same comparison, swapped continuations.
    assert_eq!((plain_t, plain_f), (neg_f, neg_t));
    Ok(())
}

#[test]
fn logical_value_materializes_zero_or_one() -> Result<()> {
    // int x = a && b; uses jump threading plus a 0/1 store.
    let unit = utils::unit(vec![utils::main_fun(vec![
        utils::decl("a", Some(utils::lit(1))),
        utils::decl("b", Some(utils::lit(0))),
        utils::decl("x", Some(utils::and(utils::var("a"), utils::var("b")))),
        utils::stmt(utils::ret(utils::var("x"))),
    ])]);
    let ir = utils::ir_of(&unit);

    // The slot receives 1 on the true path and 0 on the false path.
    let temp_line = ir
        .lines()
        .find(|l| {
            let t = l.trim();
            t.starts_with("%t") && t.ends_with("= 1")
        })
        .unwrap_or_else(|| panic!("no true-path store:\n{ir}"));
    let temp = temp_line.trim().split(' ').next().unwrap().to_string();
    assert!(ir.contains(&format!("{temp} = 0")), "{ir}");
    // And the declared variable copies from the slot.
    assert!(ir.contains(&format!("%l3 = {temp}")), "{ir}");
    Ok(())
}
