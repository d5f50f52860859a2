//! Built-in operators.

pub mod arithmetic;
pub mod comparison;
pub mod logical;
pub mod string;

pub use arithmetic::{Addition, Division, Multiplication, Negation, Square, Subtraction};
pub use comparison::{Comparator, Comparison};
pub use logical::{And, Not, Or};
pub use string::Concatenation;

use crate::parser::Parser;
use std::sync::Arc;

/// Registers the default operators, loosest-binding first.
///
/// Tokens shared by several operators (`+` for addition and concatenation,
/// `-` for subtraction and negation) are told apart by each operator's
/// `check`. Two-character comparison tokens come before their one-character
/// prefixes.
pub fn register(parser: &mut Parser) {
    let addition = Arc::new(Addition);
    let multiplication = Arc::new(Multiplication);
    let negation = Arc::new(Negation);

    parser.add_operator("|", Arc::new(Or));
    parser.add_operator("&", Arc::new(And));
    parser.add_operator("!", Arc::new(Not));
    parser.add_operator("!=", Arc::new(Comparison::new(Comparator::NotEqual)));
    parser.add_operator("<=", Arc::new(Comparison::new(Comparator::LessOrEqual)));
    parser.add_operator(">=", Arc::new(Comparison::new(Comparator::GreaterOrEqual)));
    parser.add_operator("=", Arc::new(Comparison::new(Comparator::Equal)));
    parser.add_operator("<", Arc::new(Comparison::new(Comparator::Less)));
    parser.add_operator(">", Arc::new(Comparison::new(Comparator::Greater)));
    parser.add_operator("+", addition.clone());
    parser.add_operator("+", Arc::new(Concatenation));
    parser.add_operator("-", Arc::new(Subtraction::new(addition, negation.clone())));
    parser.add_operator("*", multiplication.clone());
    parser.add_operator("/", Arc::new(Division::new(multiplication)));
    parser.add_operator("²", Arc::new(Square));
    parser.add_operator("-", negation);
}
