//! Built-in functions.

pub mod branching;
pub mod math;
pub mod null;
pub mod string;
pub mod temporal;

pub use branching::{Calculate, If};
pub use math::{Abs, Extremum, Hexa, Round, Sqrt};
pub use null::{IsNull, NoNull, NoZero, Type};
pub use string::{Case, ChangeCase, Length};
pub use temporal::DateFunction;

use crate::parser::Parser;
use std::sync::Arc;

pub fn register(parser: &mut Parser) {
    parser.add_function("If", Arc::new(If));
    parser.add_function("IsNull", Arc::new(IsNull));
    parser.add_function("NoNull", Arc::new(NoNull));
    parser.add_function("NoZero", Arc::new(NoZero));
    parser.add_function("Hexa", Arc::new(Hexa));
    parser.add_function("Sqrt", Arc::new(Sqrt));
    parser.add_function("Type", Arc::new(Type));
    parser.add_function("Calculate", Arc::new(Calculate));
    parser.add_function("Now", Arc::new(DateFunction::new()));
    parser.add_function("Abs", Arc::new(Abs));
    parser.add_function("Round", Arc::new(Round));
    parser.add_function("Min", Arc::new(Extremum::min()));
    parser.add_function("Max", Arc::new(Extremum::max()));
    parser.add_function("Length", Arc::new(Length));
    parser.add_function("Upper", Arc::new(ChangeCase::new(Case::Upper)));
    parser.add_function("Lower", Arc::new(ChangeCase::new(Case::Lower)));
}
