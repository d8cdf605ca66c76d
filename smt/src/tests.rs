use crate::{Cmp, Constraint, Context, Expr};

#[test]
fn test_constant_folding() {
    let sum = Expr::sum([Expr::Const(2.0), Expr::Const(3.0)]);
    assert_eq!(sum, Expr::Const(5.0));
    assert_eq!(sum.as_const(), Some(5.0));

    let product = Expr::mul(Expr::Const(2.0), Expr::Const(3.0));
    assert_eq!(product, Expr::Const(6.0));

    let mut context = Context::new();
    let x = context.real("x");
    let mixed = Expr::sum([Expr::Const(2.0), Expr::Sym(x), Expr::Const(3.0)]);
    assert!(mixed.is_symbolic());
    assert_eq!(Expr::mul(Expr::Const(0.0), Expr::Sym(x)), Expr::Const(0.0));
}

#[test]
fn test_interned_variables_are_stable() {
    let mut context = Context::new();
    let x = context.real("f_A-B-red");
    assert_eq!(context.real("f_A-B-red"), x);
    assert_ne!(context.real("f_A-B-Bus"), x);
    assert_eq!(context.var_name(x), "f_A-B-red");
}

#[test]
fn test_check_simple_system() {
    let mut context = Context::new();
    let x = context.real("x");
    let y = context.real("y");
    context.assert(Cmp::eq(Expr::Sym(x) + Expr::Sym(y), 10.0).into());
    context.assert(Cmp::ge(x, 4.0).into());
    context.assert(Cmp::le(x, 4.0).into());

    assert!(context.check().is_sat());
    let model = context.model().unwrap();
    assert!((model.value(x) - 4.0).abs() < 1.0e-6);
    assert!((model.value(y) - 6.0).abs() < 1.0e-6);
}

#[test]
fn test_contradiction_is_unsat() {
    let mut context = Context::new();
    let x = context.real("x");
    context.assert(Cmp::ge(x, 5.0).into());
    context.assert(Cmp::le(x, 3.0).into());

    assert!(!context.check().is_sat());
    assert!(context.model().is_none());
}

#[test]
fn test_popped_frame_leaves_no_assertions_behind() {
    let mut context = Context::new();
    let x = context.real("x");

    context.push();
    context.assert(Cmp::ge(x, 5.0).into());
    assert!(context.check().is_sat());
    context.pop();

    context.assert(Cmp::le(x, 3.0).into());
    assert!(context.check().is_sat());
}

#[test]
fn test_implication_enforces_body_when_gate_holds() {
    let mut context = Context::new();
    let x = context.real("x");
    let y = context.real("y");
    context.assert(Cmp::ge(y, 10.0).into());
    context.assert(Constraint::implies(
        Cmp::ge(Expr::Sym(y), 1.0),
        vec![Cmp::eq(Expr::Sym(x), Expr::Const(7.0))],
    ));

    assert!(context.check().is_sat());
    let model = context.model().unwrap();
    assert!((model.value(x) - 7.0).abs() < 1.0e-6);
}

#[test]
fn test_implication_is_vacuous_when_gate_fails() {
    let mut context = Context::new();
    let x = context.real("x");
    let y = context.real("y");
    context.assert(Cmp::le(y, 0.0).into());
    context.assert(Cmp::le(x, 3.0).into());
    context.assert(Constraint::implies(
        Cmp::ge(Expr::Sym(y), 1.0),
        vec![Cmp::eq(Expr::Sym(x), Expr::Const(7.0))],
    ));

    assert!(context.check().is_sat());
    let model = context.model().unwrap();
    assert!(model.value(x) <= 3.0 + 1.0e-6);
}

#[test]
fn test_constant_gate_is_decided_natively() {
    let mut context = Context::new();
    let x = context.real("x");
    // the gate is a plain number, so the body is simply dropped
    context.assert(Constraint::implies(
        Cmp::ge(Expr::Const(0.0), 1.0),
        vec![Cmp::eq(Expr::Sym(x), Expr::Const(7.0))],
    ));
    context.assert(Cmp::le(x, 3.0).into());
    assert!(context.check().is_sat());

    // and asserted directly when it holds
    context.push();
    context.assert(Constraint::implies(
        Cmp::ge(Expr::Const(2.0), 1.0),
        vec![Cmp::ge(Expr::Sym(x), Expr::Const(3.0))],
    ));
    assert!(context.check().is_sat());
    let model = context.model().unwrap();
    assert!((model.value(x) - 3.0).abs() < 1.0e-6);
    context.pop();
}

#[test]
fn test_trivially_false_assertion_is_unsat() {
    let mut context = Context::new();
    context.assert(Cmp::ge(Expr::Const(0.0), 1.0).into());
    assert!(!context.check().is_sat());
}

#[test]
fn test_minimize_linear_objective() {
    let mut context = Context::new();
    let x = context.real("x");
    context.assert(Cmp::ge(x, 2.0).into());
    context.minimize(Expr::Sym(x));

    assert!(context.check().is_sat());
    let model = context.model().unwrap();
    assert!((model.value(x) - 2.0).abs() < 1.0e-6);
}

#[test]
fn test_minimize_bilinear_objective() {
    let mut context = Context::new();
    let x = context.real("x");
    let y = context.real("y");
    context.assert(Cmp::ge(x, 2.0).into());
    context.assert(Cmp::le(x, 3.0).into());
    context.assert(Cmp::ge(y, 4.0).into());
    context.assert(Cmp::le(y, 5.0).into());
    context.minimize(Expr::mul(Expr::Sym(x), Expr::Sym(y)));

    assert!(context.check().is_sat());
    let model = context.model().unwrap();
    // the relaxation bottoms out at the cheap corner of the box
    assert!((model.eval(&Expr::mul(Expr::Sym(x), Expr::Sym(y))) - 8.0).abs() < 1.0e-4);
}

#[test]
fn test_nonlinear_assertions_are_skipped_not_asserted() {
    let mut context = Context::new();
    let x = context.real("x");
    let y = context.real("y");
    context.assert(Cmp::eq(Expr::mul(Expr::Sym(x), Expr::Sym(y)), 100.0).into());
    context.assert(Cmp::eq(Expr::Sym(x), Expr::Const(0.0)).into());

    // the product assertion cannot be lowered and is dropped for liveness
    assert!(context.check().is_sat());
}
