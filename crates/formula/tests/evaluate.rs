//! Parsing and evaluation through the default registry.

use chrono::{NaiveDate, NaiveDateTime};
use formula::member::{BlockMember, ConstantMember, FunctionMember, OperatorMember, ValueMember, VariableMember};
use formula::operators::And;
use formula::{EngineConfig, EvalError, FormulaType, JsonVariable, Parser, Value, Visitor};
use serde_json::json;
use std::sync::Arc;

fn check(text: &str, expected: Value) {
    let parser = Parser::with_defaults();
    let member = parser
        .parse(text)
        .unwrap_or_else(|e| panic!("parse({text}) failed: {e}"));
    let value = member
        .value(&())
        .unwrap_or_else(|e| panic!("value({text}) failed: {e}"));
    assert_eq!(value, expected, "expression: {text}");
}

fn check_type(text: &str, expected: FormulaType) {
    let parser = Parser::with_defaults();
    let member = parser.parse(text).unwrap();
    assert_eq!(member.get_type(), expected, "expression: {text}");
}

fn check_syntax_err(text: &str) -> String {
    Parser::with_defaults()
        .parse(text)
        .err()
        .unwrap_or_else(|| panic!("expected a syntax error for {text}"))
        .fragment
}

fn order_parser() -> Parser {
    let mut parser = Parser::with_defaults();
    parser.add_variable("qty", Arc::new(JsonVariable::new("/qty", FormulaType::Long)));
    parser.add_variable("price", Arc::new(JsonVariable::new("/price", FormulaType::Double)));
    parser.add_variable("name", Arc::new(JsonVariable::new("/name", FormulaType::String)));
    parser.add_variable("day", Arc::new(JsonVariable::new("/day", FormulaType::Date)));
    parser
}

// ----------------------------------------------------------------- Arithmetic

#[test]
fn test_precedence() {
    check("1+2*3", Value::Long(7));
    check("(1+2)*3", Value::Long(9));
    check("10 - 2 - 3", Value::Long(5));
    check("2 * 3²", Value::Double(18.0));
    check("1 + 2 * 3 - 4 / 2", Value::Double(5.0));
}

#[test]
fn test_division() {
    let nan = Parser::with_defaults().parse("6/0").unwrap().value(&()).unwrap();
    assert!(nan.as_double().unwrap().is_nan());
    check("0/6", Value::Double(0.0));
    check("null/6", Value::Double(0.0));
    check("7/2", Value::Double(3.5));
    check("12/2/3", Value::Double(2.0));
    check_type("4/2", FormulaType::Double);
}

#[test]
fn test_unary() {
    check("-4²", Value::Double(16.0));
    check("-(4²)", Value::Double(-16.0));
    check("- 4", Value::Long(-4));
    check("-1.5", Value::Double(-1.5));
    check("3 + -2", Value::Long(1));
}

#[test]
fn test_numeric_promotion() {
    check_type("1 + 2", FormulaType::Long);
    check_type("1 + 2.0", FormulaType::Double);
    check("1 + 2.5", Value::Double(3.5));
}

#[test]
fn test_null_propagation() {
    check("1 + null", Value::Null);
    check("2 * null", Value::Null);
    check("\"a\" + null", Value::Null);
}

#[test]
fn test_overflow() {
    let parser = Parser::with_defaults();
    let member = parser.parse("9223372036854775807 + 1").unwrap();
    assert_eq!(member.value(&()), Err(EvalError::Overflow));
}

// ---------------------------------------------------------- Logic/comparison

#[test]
fn test_logic() {
    check("true & !false", Value::Boolean(true));
    check("false | true & false", Value::Boolean(false));
    check("null | true", Value::Boolean(true));
    check("null & true", Value::Null);
    check("!null", Value::Null);
}

#[test]
fn test_comparison() {
    check("1 = 1.0", Value::Boolean(true));
    check("1 != 2", Value::Boolean(true));
    check("2 <= 2", Value::Boolean(true));
    check("3 >= 4", Value::Boolean(false));
    check("1 + 1 > 1", Value::Boolean(true));
    check("\"b\" > \"a\"", Value::Boolean(true));
    check("null = null", Value::Boolean(true));
    check("null < 0", Value::Boolean(true));
}

#[test]
fn test_comparison_rejects_incompatible_operands() {
    assert_eq!(check_syntax_err("1 = \"1\""), "1 = \"1\"");
}

#[test]
fn test_temporal_literals() {
    let day = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    check("02.01.2020", Value::Date(day));
    check("01.01.2020 < 02.01.2020", Value::Boolean(true));
    check("02.01.2020 00:00:00 = 02.01.2020", Value::Boolean(true));
    check("12:00:00 > 09:30:00", Value::Boolean(true));
}

// ------------------------------------------------------------------ Strings

#[test]
fn test_strings() {
    check("\"a\" + \"b\"", Value::String("ab".into()));
    check("\"a+b\" + \"c\"", Value::String("a+bc".into()));
    check("Upper(\"ab\") + \"c\"", Value::String("ABc".into()));
    check("Lower(\"AB\")", Value::String("ab".into()));
    check("Length(\"héllo\")", Value::Long(5));
    check_type("\"a\" + \"b\"", FormulaType::String);
}

// ---------------------------------------------------------------- Functions

#[test]
fn test_if() {
    check("If(1 > 2, \"yes\", \"no\")", Value::String("no".into()));
    check("if(true, 1, 2.5)", Value::Double(1.0));
    check("If(null, 1, 2)", Value::Long(2));
    check_type("If(true, 1, 2.5)", FormulaType::Double);
}

#[test]
fn test_null_functions() {
    check("NoNull(Null, Null, 5)", Value::Long(5));
    check("NoNull(null, 2, 5.0)", Value::Double(2.0));
    check("IsNull(null)", Value::Boolean(true));
    check("IsNull(1 + null)", Value::Boolean(true));
    check("IsNull(0)", Value::Boolean(false));
    check("NoZero(0)", Value::Null);
    check("NoZero(3)", Value::Long(3));
    check("Type(1.5)", Value::String("Double".into()));
    check("Type(null)", Value::String("Null".into()));
}

#[test]
fn test_no_null_needs_a_constant_fallback() {
    assert_eq!(check_syntax_err("NoNull(1, Null)"), "NoNull(1, Null)");
}

#[test]
fn test_math_functions() {
    check("Hexa(255)", Value::String("FF".into()));
    check("Sqrt(16)", Value::Double(4.0));
    check("Abs(-3)", Value::Long(3));
    check("Round(2.5)", Value::Long(3));
    check("Min(3, 1.5, 2)", Value::Double(1.5));
    check("Max(3, 1, 2)", Value::Long(3));
    check("Max(1, null)", Value::Null);
}

#[test]
fn test_calculate() {
    check("Calculate(1 + 2)", Value::Boolean(true));
    check("Calculate(Round(Sqrt(-1)))", Value::Boolean(false));
    check("Calculate(1, Round(1/0))", Value::Boolean(false));
}

#[test]
fn test_constants() {
    check("PI", Value::Double(std::f64::consts::PI));
    check("pi * 2", Value::Double(std::f64::consts::TAU));
    check_type("E", FormulaType::Double);
}

#[test]
fn test_now_is_frozen() {
    let parser = Parser::with_defaults();
    let first = parser.parse("Now()").unwrap().value(&()).unwrap();
    let second = parser.parse("now()").unwrap().value(&()).unwrap();
    assert_eq!(first, second);
    assert!(matches!(first, Value::DateTime(_)));
    check("Now() = Now()", Value::Boolean(true));
}

// ---------------------------------------------------------------- Variables

#[test]
fn test_json_variables() {
    let parser = order_parser();
    let ctx = json!({"qty": 3, "price": 2.5, "name": "tea", "day": "2024-02-29"});

    let total = parser.parse("qty * price").unwrap();
    assert_eq!(total.get_type(), FormulaType::Double);
    assert_eq!(total.value(&ctx), Ok(Value::Double(7.5)));

    let label = parser.parse("Upper(name) + \":\" + Hexa(qty)").unwrap();
    assert_eq!(label.value(&ctx), Ok(Value::String("TEA:3".into())));

    let leap = parser.parse("day > 28.02.2024").unwrap();
    assert_eq!(leap.value(&ctx), Ok(Value::Boolean(true)));
}

#[test]
fn test_missing_variable_is_null() {
    let parser = order_parser();
    let member = parser.parse("NoNull(qty, 1)").unwrap();
    assert_eq!(member.value(&json!({})), Ok(Value::Long(1)));
    let member = parser.parse("IsNull(price)").unwrap();
    assert_eq!(member.value(&json!({"qty": 1})), Ok(Value::Boolean(true)));
}

#[test]
fn test_variable_needs_json_context() {
    let parser = order_parser();
    let member = parser.parse("qty + 1").unwrap();
    assert!(matches!(member.value(&()), Err(EvalError::InvalidContext(_))));
}

#[test]
fn test_evaluation_is_repeatable() {
    let parser = order_parser();
    let member = parser.parse("qty * 2").unwrap();
    assert_eq!(member.value(&json!({"qty": 2})), Ok(Value::Long(4)));
    assert_eq!(member.value(&json!({"qty": 5})), Ok(Value::Long(10)));
}

// ------------------------------------------------------------------- Errors

#[test]
fn test_syntax_errors() {
    assert_eq!(check_syntax_err("1 +"), "1 +");
    assert_eq!(check_syntax_err("Foo(1)"), "Foo(1)");
    assert_eq!(check_syntax_err("(1"), "(1");
    assert_eq!(check_syntax_err("1 + 2 * $$"), "$$");
    assert_eq!(check_syntax_err("\"unterminated"), "\"unterminated");
}

#[test]
fn test_syntax_error_position_is_zero() {
    let err = Parser::with_defaults().parse("1 + 2 + #").unwrap_err();
    assert_eq!(err.position, 0);
    assert_eq!(err.to_string(), "Syntax error at 0: \"#\"");
}

// ------------------------------------------------------------ Configuration

#[test]
fn test_configured_syntax() {
    let config = EngineConfig::from_toml_str(
        r#"
        [syntax]
        separator = ";"
        radix = 16
        true_literal = "yes"
        false_literal = "no"
        date_pattern = "%Y.%m.%d"

        [variables.qty]
        pointer = "/order/qty"
        type = "Long"
        "#,
    )
    .unwrap();
    let parser = config.into_parser().unwrap();

    let member = parser.parse("Max(qty; 1F)").unwrap();
    assert_eq!(member.value(&json!({"order": {"qty": 40}})), Ok(Value::Long(40)));
    assert_eq!(parser.parse("If(yes; a; 0)").unwrap().value(&()), Ok(Value::Long(10)));
    assert_eq!(
        parser.parse("2020.01.02").unwrap().value(&()),
        Ok(Value::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()))
    );
}

#[test]
fn test_word_operator() {
    let mut parser = Parser::with_defaults();
    parser.add_operator(" and ", Arc::new(And));
    let member = parser.parse("true AND false").unwrap();
    assert_eq!(member.value(&()), Ok(Value::Boolean(false)));
    assert_eq!(parser.format(&member).unwrap(), "true and false");
}

// ------------------------------------------------------------------ Visitor

struct VariableCount;

impl Visitor for VariableCount {
    type Output = usize;

    fn visit_value(&mut self, _member: &ValueMember) -> usize {
        0
    }

    fn visit_constant(&mut self, _member: &ConstantMember) -> usize {
        0
    }

    fn visit_variable(&mut self, _member: &VariableMember) -> usize {
        1
    }

    fn visit_operator(&mut self, member: &OperatorMember) -> usize {
        member.members().iter().map(|m| m.accept(self)).sum()
    }

    fn visit_function(&mut self, member: &FunctionMember) -> usize {
        member.members().iter().map(|m| m.accept(self)).sum()
    }

    fn visit_block(&mut self, member: &BlockMember) -> usize {
        member.member().accept(self)
    }
}

#[test]
fn test_custom_visitor() {
    let parser = order_parser();
    let member = parser.parse("(qty + 1) * Max(qty, price, PI)").unwrap();
    assert_eq!(member.accept(&mut VariableCount), 3);
    assert!(!member.is_constant());
    assert!(parser.parse("Max(1, PI)").unwrap().is_constant());
}

#[test]
fn test_datetime_literal_round_trip() {
    let parser = Parser::with_defaults();
    let member = parser.parse("31.12.1999 23:59:59").unwrap();
    let expected = NaiveDateTime::parse_from_str("1999-12-31 23:59:59", "%Y-%m-%d %H:%M:%S").unwrap();
    assert_eq!(member.value(&()), Ok(Value::DateTime(expected)));
    assert_eq!(parser.format(&member).unwrap(), "31.12.1999 23:59:59");
}
