// SPDX-License-Identifier: Apache-2.0

//! Error reporting tests for the expression parser.
//!
//! Every rejected input should name what the parser expected and, where
//! there is unconsumed text, quote it so the position of the problem can be
//! recovered from the message alone.

use boolfn::bf_parser::from_string;
use test_case::test_case;

#[test_case("a &", "expected expression, got EOF" ; "missing rhs operand")]
#[test_case("!", "expected expression, got EOF" ; "missing unary operand")]
#[test_case("(a", "expected \")\" in parenthesized expression" ; "unbalanced parenthesis")]
#[test_case("a b", "unexpected trailing text" ; "trailing text")]
#[test_case("2", "needs a width annotation" ; "unsized number literal")]
#[test_case("foo(a)", "unknown function \"foo\"" ; "unknown function")]
#[test_case("bits[2]:5", "value 5 does not fit in 2 bit(s)" ; "decimal literal too wide")]
#[test_case("bits[2]:0b101", "does not fit in bits[2]" ; "binary literal too wide")]
#[test_case("bits[0]:0", "cannot make a zero-width value vector" ; "zero width literal")]
#[test_case("bits[4]", "expected \":\" in bits literal" ; "bits literal without value")]
#[test_case("a : bits(4)", "expected \"[\" in variable width annotation" ; "malformed width annotation")]
#[test_case("slice(a, 3, 1)", "slice start 3 exceeds end 1" ; "inverted slice bounds")]
#[test_case("zext(a)", "expected \",\" in extension arguments" ; "extension missing width")]
#[test_case("eq(a)", "expected \",\" in call arguments" ; "binary call missing comma")]
#[test_case("ite(c, t)", "expected \",\" in ite arguments" ; "ite missing alternative")]
#[test_case("& a", "expected expression, got '&'" ; "leading operator")]
fn test_rejected_input_names_the_problem(text: &str, needle: &str) {
    let _ = env_logger::builder().is_test(true).try_init();
    let err = from_string(text).expect_err("parse should fail");
    let msg = format!("{}", err);
    assert!(msg.contains(needle), "unexpected error message: {}", msg);
}

#[test]
fn test_error_message_quotes_the_unconsumed_text() {
    let _ = env_logger::builder().is_test(true).try_init();
    let err = from_string("a & & b").expect_err("parse should fail");
    let msg = format!("{}", err);
    assert!(msg.contains("rest_of_line"), "unexpected error message: {}", msg);
    assert!(msg.contains("& b"), "unexpected error message: {}", msg);
}

#[test]
fn test_all_errors_carry_the_parse_error_prefix() {
    let _ = env_logger::builder().is_test(true).try_init();
    for text in ["a &", "foo(a)", "bits[2]:5"] {
        let err = from_string(text).expect_err("parse should fail");
        let msg = format!("{}", err);
        assert!(
            msg.starts_with("ParseError: "),
            "message for {:?} lacks prefix: {}",
            text,
            msg
        );
    }
}
