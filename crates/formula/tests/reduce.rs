//! Constant folding and the formatting of reduced trees.

use formula::{EvalError, FormulaType, JsonVariable, Member, Parser, Value};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn parser() -> Parser {
    let mut parser = Parser::with_defaults();
    for (name, ty) in [
        ("x", FormulaType::Long),
        ("y", FormulaType::Long),
        ("z", FormulaType::Long),
        ("b", FormulaType::Boolean),
        ("s", FormulaType::String),
    ] {
        parser.add_variable(name, Arc::new(JsonVariable::new(format!("/{name}"), ty)));
    }
    parser
}

fn reduced(text: &str) -> Member {
    reduced_with(&parser(), text)
}

fn reduced_with(parser: &Parser, text: &str) -> Member {
    let member = parser
        .parse(text)
        .unwrap_or_else(|e| panic!("parse({text}) failed: {e}"));
    parser.reduce(&member)
}

fn check(text: &str, expected: &str) {
    let parser = parser();
    let member = reduced_with(&parser, text);
    assert_eq!(parser.format(&member).unwrap(), expected, "expression: {text}");
}

/// The reduced tree, formatted and parsed again, evaluates like the source.
fn check_same_value(text: &str) {
    let parser = parser();
    let ctx = json!({"x": 7, "y": -3, "z": 2, "b": true, "s": "q"});
    let original = parser.parse(text).unwrap().value(&ctx);
    let reduced = parser.reduce(&parser.parse(text).unwrap());
    assert_eq!(reduced.value(&ctx), original, "reduced: {text}");
    let reparsed = parser.parse(&parser.format(&reduced).unwrap()).unwrap();
    assert_eq!(reparsed.value(&ctx), original, "reparsed: {text}");
}

#[test]
fn test_constant_expression_folds_to_literal() {
    check("1 + 2 * 3", "7");
    check("(1 + 2) * 3", "9");
    check("-4²", "16.0");
    check("6 / 0", "NaN");
    check("\"a\" + \"b\"", "\"ab\"");
    check("If(1 > 2, \"yes\", \"no\")", "\"no\"");
    check("NoNull(Null, Null, 5)", "5");
    assert!(matches!(reduced("Max(1, PI)"), Member::Value(_)));
}

#[test]
fn test_negative_literal_is_grouped() {
    check("-3", "-3");
    check("x + -3", "x + (-3)");
}

#[test]
fn test_concatenation_merges_adjacent_constants() {
    let member = reduced("\"a\" + \"b\" + s + \"c\" + \"d\"");
    let Member::Operator(node) = &member else {
        panic!("expected an operator, got {member:?}");
    };
    assert_eq!(node.members().len(), 3);
    assert_eq!(node.members()[0].value(&()), Ok(Value::String("ab".into())));
    assert!(matches!(node.members()[1], Member::Variable(_)));
    assert_eq!(node.members()[2].value(&()), Ok(Value::String("cd".into())));
    check("\"a\" + \"b\" + s + \"c\" + \"d\"", "\"ab\" + s + \"cd\"");
}

#[test]
fn test_addition_collects_constants() {
    check("x + 1 + 2", "x + 3");
    check("1 + x + 2", "3 + x");
    check("x + y", "x + y");
    check("x + null", "null");
}

#[test]
fn test_subtraction_becomes_addition() {
    check("x - 2", "x + (-2)");
    check("x - 2 - 3", "x + (-5)");
    check("x - y", "x - y");
    check("10 - 2 - 3", "5");
}

#[test]
fn test_negated_operands_are_grouped() {
    check("x - 1 - (y + z)", "x + (-1) + (-(y + z))");
    check("x - 1 - y * z", "x + (-1) + (-(y * z))");
    check("3 - x - 1", "2 + (-x)");
    check("x - 2 * (-y)", "x - 2 * (-y)");
}

#[test]
fn test_failing_constants_are_kept() {
    let text = "x + (9223372036854775807 + 1) + 1 + 2";
    check(text, "x + (9223372036854775807 + 1) + 3");
    let ctx = json!({"x": 1});
    assert_eq!(reduced(text).value(&ctx), Err(EvalError::Overflow));
    assert_eq!(reduced("x + (9223372036854775807 + 1) + null").value(&ctx), Err(EvalError::Overflow));
}

#[test]
fn test_multiplication() {
    check("x * 0", "0");
    check("0.0 * x", "0.0");
    check("1 * x", "x");
    check("2 * x * 3", "6 * x");
    check("x * 5", "x * 5");
    check("1.0 * x", "1.0 * x");
    check("x * null", "null");
}

#[test]
fn test_division() {
    check("x / 0", "NaN");
    check("x / null", "NaN");
    check("0 / x", "0.0");
    check("x / 2 / 3", "x / 6");
    check("x / y", "x / y");
}

#[test]
fn test_if_picks_a_constant_branch() {
    check("If(true, x, 2)", "x");
    check("If(1 > 2, x, 2)", "2");
    check("If(true, 1, 2.5)", "1.0");
    check("If(b, x, 2)", "If(b, x, 2)");
    check("If(true, x, 0.5)", "If(true, x, 0.5)");
}

#[test]
fn test_logic_short_circuits() {
    check("b | true", "true");
    check("b & false", "false");
    check("b & true", "b & true");
    check("!(1 > 2)", "true");
}

#[test]
fn test_functions_fold() {
    check("Sqrt(16) + x", "4.0 + x");
    check("Upper(\"ab\") + s", "\"AB\" + s");
    check("Length(\"abc\") * x", "3 * x");
    check("Now()", "Now()");
}

#[test]
fn test_blocks_are_dropped_unless_needed() {
    check("((x))", "x");
    check("(x * 2) + 1", "x * 2 + 1");
    check("(x + 1) * 2", "(x + 1) * 2");
    check("x - (y - z)", "x - (y - z)");
    check("(x - y) - z", "x - y - z");
    check("-(x + 1)", "-(x + 1)");
    check("-(x²)", "-(x²)");
    check("x - (-y)", "x - (-y)");
}

#[test]
fn test_reduced_values_match() {
    for text in [
        "(x + 1) * 2",
        "x - 1 - (y + z)",
        "x - 1 - y * z",
        "x - 2 * (-y)",
        "x + (9223372036854775807 + 1) + 1 + 2",
        "x - (y - z)",
        "(x - y) - z",
        "x - 2 - 3",
        "2 * x * 3",
        "1.0 * x",
        "x / 2 / 3",
        "-(x + 1)²",
        "If(x > y, x - 1, y + 1) * 3",
        "If(1 < 2, x, 0.5) + 1",
        "\"a\" + \"b\" + s + \"c\" + \"d\"",
        "b & (x > 2 | y < 0)",
        "NoNull(x, 1) + Abs(y)",
    ] {
        check_same_value(text);
    }
}
