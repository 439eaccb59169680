// SPDX-License-Identifier: Apache-2.0

//! End-to-end SMT interchange scenario: render a constraint set to an
//! SMT-LIB 2 script, parse a solver's reply in each supported dialect, and
//! check the parsed model against the original constraints by substitution
//! and simplification.
//!
//! The constraint set asks for 4-bit `a` and `b` with `a + b == 10` and
//! `a < b` (unsigned); `a = 4, b = 6` is one satisfying assignment.

use boolfn::bf::BooleanFunction;
use boolfn::bf_parser::from_string;
use boolfn::smt::{
    constraints_to_smt2, Constraint, Model, QueryConfig, SolverResult, SolverType,
};
use boolfn::value::Value;
use pretty_assertions::assert_eq;

fn parse(text: &str) -> BooleanFunction {
    from_string(text).unwrap()
}

fn scenario_constraints() -> Vec<Constraint> {
    let sum = parse("a: bits[4] + b: bits[4]");
    let ten = parse("bits[4]:10");
    let a_below_b = parse("ult(a: bits[4], b: bits[4])");
    vec![
        Constraint::Equality(sum, ten),
        Constraint::Expression(a_below_b),
    ]
}

#[test]
fn test_rendered_query_is_reproducible() {
    let _ = env_logger::builder().is_test(true).try_init();
    let script = constraints_to_smt2(&scenario_constraints(), &QueryConfig::default()).unwrap();
    assert_eq!(
        script,
        "(set-option :produce-models true)\n\
         (set-logic QF_BV)\n\
         (declare-const a (_ BitVec 4))\n\
         (declare-const b (_ BitVec 4))\n\
         (assert (= (bvadd a b) #b1010))\n\
         (assert (= (ite (bvult a b) #b1 #b0) #b1))\n\
         (check-sat)\n\
         (get-model)\n"
    );
}

#[test]
fn test_z3_reply_satisfies_the_constraints() {
    let _ = env_logger::builder().is_test(true).try_init();
    let reply = "sat\n\
                 (\n\
                 \x20 (define-fun a () (_ BitVec 4) #x4)\n\
                 \x20 (define-fun b () (_ BitVec 4) (_ bv6 4))\n\
                 )\n";
    let model = Model::parse(reply, SolverType::Z3).unwrap();
    assert_eq!(model.get("a"), Some((4, 4)));
    assert_eq!(model.get("b"), Some((6, 4)));

    let constraints = scenario_constraints();
    let (sum, ten) = constraints[0].get_equality().unwrap();
    assert_eq!(
        model.evaluate(sum).unwrap(),
        model.evaluate(ten).unwrap(),
        "model does not satisfy the sum equality"
    );
    let a_below_b = constraints[1].get_expression().unwrap();
    assert_eq!(
        model.evaluate(a_below_b).unwrap(),
        BooleanFunction::constant_bit(Value::One),
        "model does not satisfy the comparison"
    );
}

#[test]
fn test_bitwuzla_reply_parses_to_the_same_model() {
    let _ = env_logger::builder().is_test(true).try_init();
    let z3_reply = "sat ((define-fun a () (_ BitVec 4) #b0100) \
                    (define-fun b () (_ BitVec 4) #b0110))";
    let bitwuzla_reply = "sat (((define-fun a () (_ BitVec 4) #b0100) \
                          (define-fun b () (_ BitVec 4) #b0110)))";
    let from_z3 = Model::parse(z3_reply, SolverType::Z3).unwrap();
    let from_bitwuzla = Model::parse(bitwuzla_reply, SolverType::Bitwuzla).unwrap();
    assert_eq!(from_z3, from_bitwuzla);
}

#[test]
fn test_boolector_reply_satisfies_the_constraints() {
    let _ = env_logger::builder().is_test(true).try_init();
    let reply = "sat\n(model\n  (a #b0100)\n  (b #b0110)\n)\n";
    let model = Model::parse(reply, SolverType::Boolector).unwrap();
    assert_eq!(model.get("a"), Some((4, 4)));
    assert_eq!(model.get("b"), Some((6, 4)));

    let constraints = scenario_constraints();
    let a_below_b = constraints[1].get_expression().unwrap();
    assert_eq!(
        model.evaluate(a_below_b).unwrap(),
        BooleanFunction::constant_bit(Value::One)
    );
}

#[test]
fn test_partial_model_leaves_a_residual_function() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut model = Model::new();
    model.insert("b", 6, 4);
    let sum = parse("a: bits[4] + b: bits[4]");
    let residual = model.evaluate(&sum).unwrap();
    assert_eq!(residual.get_variable_names(), vec!["a".to_string()]);
    assert_eq!(format!("{}", residual), "(a + bits[4]:6)");
}

#[test]
fn test_solver_reply_to_result_flow() {
    let _ = env_logger::builder().is_test(true).try_init();
    let reply = "sat ((define-fun a () (_ BitVec 4) #x4))";
    let result = if reply.starts_with("sat") {
        SolverResult::Sat(Some(Model::parse(reply, SolverType::Z3).unwrap()))
    } else if reply.starts_with("unsat") {
        SolverResult::Unsat
    } else {
        SolverResult::Unknown
    };
    assert!(result.is_sat());
    let model = result.get_model().unwrap();
    assert_eq!(model.get("a"), Some((4, 4)));

    assert!(SolverResult::Unsat.is_unsat());
    assert!(SolverResult::Unsat.get_model().is_none());
    assert!(SolverResult::Unknown.is_unknown());
}
