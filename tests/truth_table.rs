// SPDX-License-Identifier: Apache-2.0

//! Truth-table enumeration scenarios driven through the text format.

use test_case::test_case;

use boolfn::bf_eval::compute_truth_table;
use boolfn::bf_parser::from_string;
use boolfn::value::Value;

fn table_bits(text: &str, order: &[&str]) -> Vec<u8> {
    let f = from_string(text).unwrap();
    let order: Vec<String> = order.iter().map(|s| s.to_string()).collect();
    let table = compute_truth_table(&f, &order, false).unwrap();
    table
        .into_iter()
        .map(|row| {
            assert_eq!(row.len(), 1);
            match row[0] {
                Value::Zero => 0,
                Value::One => 1,
                other => panic!("unexpected table value {}", other),
            }
        })
        .collect()
}

#[test_case("a & b", &[0, 0, 0, 1] ; "and")]
#[test_case("a | b", &[0, 1, 1, 1] ; "or")]
#[test_case("a ^ b", &[0, 1, 1, 0] ; "xor")]
#[test_case("!a & b", &[0, 0, 1, 0] ; "andn")]
#[test_case("eq(a, b)", &[1, 0, 0, 1] ; "eq")]
fn two_variable_tables(text: &str, expected: &[u8]) {
    assert_eq!(table_bits(text, &[]), expected);
}

#[test]
fn variable_order_controls_row_indexing() {
    // Row r assigns bit k of r to variable k of the order, so swapping the
    // order transposes the asymmetric rows.
    assert_eq!(table_bits("!a & b", &["a", "b"]), vec![0, 0, 1, 0]);
    assert_eq!(table_bits("!a & b", &["b", "a"]), vec![0, 1, 0, 0]);
}

#[test]
fn foreign_variables_duplicate_or_drop() {
    let f = from_string("!a").unwrap();
    let order = vec!["a".to_string(), "ghost".to_string()];

    let kept = compute_truth_table(&f, &order, false).unwrap();
    assert_eq!(kept.len(), 4);
    assert_eq!(
        kept.iter().map(|row| row[0]).collect::<Vec<_>>(),
        vec![Value::One, Value::Zero, Value::One, Value::Zero]
    );

    let dropped = compute_truth_table(&f, &order, true).unwrap();
    assert_eq!(dropped.len(), 2);
    assert_eq!(dropped[0][0], Value::One);
    assert_eq!(dropped[1][0], Value::Zero);
}

#[test]
fn order_must_cover_function_variables() {
    let f = from_string("a & b").unwrap();
    let order = vec!["a".to_string()];
    let err = compute_truth_table(&f, &order, false).expect_err("expected missing variable");
    let msg = format!("{}", err);
    assert!(msg.contains("b"), "unexpected: {}", msg);
}

#[test]
fn more_than_ten_variables_is_rejected() {
    let text = (0..11).map(|i| format!("v{}", i)).collect::<Vec<_>>().join(" ^ ");
    let f = from_string(&text).unwrap();
    let err = compute_truth_table(&f, &[], false).expect_err("expected variable limit error");
    let msg = format!("{}", err);
    assert!(msg.contains("11"), "unexpected: {}", msg);
    assert!(msg.contains("10"), "unexpected: {}", msg);

    // Ten variables is still fine: 1024 rows.
    let text = (0..10).map(|i| format!("v{}", i)).collect::<Vec<_>>().join(" ^ ");
    let f = from_string(&text).unwrap();
    assert_eq!(compute_truth_table(&f, &[], false).unwrap().len(), 1024);
}

#[test]
fn wide_variables_are_rejected() {
    let f = from_string("a: bits[4] + b: bits[4]").unwrap();
    let err = compute_truth_table(&f, &[], false).expect_err("expected wide-variable error");
    let msg = format!("{}", err);
    assert!(msg.contains("width 4"), "unexpected: {}", msg);
}

#[test]
fn constant_function_has_a_single_row() {
    let f = from_string("bits[3]:5").unwrap();
    let table = compute_truth_table(&f, &[], false).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0], vec![Value::One, Value::Zero, Value::One]);
}

#[test]
fn multi_bit_outputs_are_enumerated_per_row() {
    // Output can be wide even though the variables are single-bit.
    let f = from_string("concat(a, b)").unwrap();
    let table = compute_truth_table(&f, &[], false).unwrap();
    assert_eq!(table.len(), 4);
    // Row 1 assigns a=1, b=0; concat puts a in the high digit.
    assert_eq!(table[1], vec![Value::Zero, Value::One]);
    // Row 2 assigns a=0, b=1.
    assert_eq!(table[2], vec![Value::One, Value::Zero]);
}
