//! Embeddable formula engine.
//!
//! # Overview
//!
//! Text such as `If(x > 3, "big", "small")` is parsed against a [`Parser`]
//! registry of constants, variables, operators and functions into a tree of
//! typed [`Member`]s. A tree can be evaluated against a caller supplied
//! context, formatted back into text, or reduced by folding its constant
//! parts.
//!
//! # Example
//!
//! ```
//! use formula::{FormulaType, JsonVariable, Parser, Value};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut parser = Parser::with_defaults();
//! parser.add_variable("qty", Arc::new(JsonVariable::new("/qty", FormulaType::Long)));
//!
//! let member = parser.parse("qty * (2 + 3)").unwrap();
//! assert_eq!(member.get_type(), FormulaType::Long);
//! assert_eq!(member.value(&json!({"qty": 4})), Ok(Value::Long(20)));
//!
//! let reduced = parser.reduce(&member);
//! assert_eq!(parser.format(&reduced).unwrap(), "qty * 5");
//! ```

pub mod capability;
pub mod config;
pub mod error;
pub mod format;
pub mod functions;
pub mod member;
pub mod operators;
pub mod parser;
pub mod reduce;
pub mod syntax;
pub mod types;
pub mod util;
pub mod variables;
pub mod visitor;

pub use capability::{Constant, Function, Operator, Reduced, Variable};
pub use config::{EngineConfig, SyntaxConfig, VariableConfig};
pub use error::{ConfigError, EvalError, FormatError, SyntaxError};
pub use format::Formatter;
pub use member::Member;
pub use parser::Parser;
pub use reduce::Reducer;
pub use syntax::{DateFormatter, PatternFormat, SyntaxConfiguration};
pub use types::{FormulaType, Value};
pub use variables::{JsonVariable, ValueConstant};
pub use visitor::Visitor;
