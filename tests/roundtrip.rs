// SPDX-License-Identifier: Apache-2.0

//! Tests that printing a function and reparsing the text reproduces it,
//! both structurally and under evaluation.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use boolfn::bf::BooleanFunction;
use boolfn::bf_eval::evaluate_bits;
use boolfn::bf_parser::from_string;
use boolfn::fuzz_utils::{arbitrary_boolean_function, arbitrary_values};

#[test]
fn random_expressions_roundtrip_structurally() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for i in 0..128 {
        let f = arbitrary_boolean_function(&mut rng, &["a", "b", "c"], 4, 5);
        let text = f.to_string();
        let reparsed = from_string(&text)
            .unwrap_or_else(|e| panic!("iteration {}: reparsing {:?} failed: {}", i, text, e));
        assert_eq!(reparsed, f, "iteration {}: text was {:?}", i, text);
    }
}

#[test]
fn random_expressions_roundtrip_under_evaluation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(0xf00d);
    for _ in 0..64 {
        let f = arbitrary_boolean_function(&mut rng, &["a", "b", "c"], 6, 4);
        let reparsed = from_string(&f.to_string()).unwrap();

        let mut env = HashMap::new();
        for name in f.get_variable_names() {
            env.insert(name, arbitrary_values(&mut rng, 6, false));
        }
        assert_eq!(evaluate_bits(&reparsed, &env), evaluate_bits(&f, &env));
    }
}

#[test]
fn call_operators_roundtrip() {
    let a = BooleanFunction::var("a", 4).unwrap();
    let b = BooleanFunction::var("b", 4).unwrap();
    let candidates = vec![
        BooleanFunction::sdiv(&a, &b, 4).unwrap(),
        BooleanFunction::urem(&a, &b, 4).unwrap(),
        BooleanFunction::slt(&a, &b, 1).unwrap(),
        BooleanFunction::concat(&a, &b, 8).unwrap(),
        BooleanFunction::slice(&a, 0, 2, 3).unwrap(),
        BooleanFunction::sext(&a, 7).unwrap(),
        BooleanFunction::ite(
            &BooleanFunction::eq(&a, &b, 1).unwrap(),
            &a,
            &b,
            4,
        )
        .unwrap(),
    ];
    for f in candidates {
        let text = f.to_string();
        let reparsed =
            from_string(&text).unwrap_or_else(|e| panic!("reparsing {:?} failed: {}", text, e));
        assert_eq!(reparsed, f, "text was {:?}", text);
    }
}
