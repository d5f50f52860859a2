use crate::types::FormulaType;
use thiserror::Error;

/// Raised by [`Parser::parse`](crate::Parser::parse) when no constant,
/// variable, operator, function or literal matches a piece of the input.
///
/// `position` is always `0`, whatever the location of `fragment` inside the
/// original text. Callers that need a location should search for `fragment`
/// themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Syntax error at {position}: \"{fragment}\"")]
pub struct SyntaxError {
    pub fragment: String,
    pub position: usize,
}

impl SyntaxError {
    pub fn new(fragment: impl Into<String>) -> Self {
        SyntaxError {
            fragment: fragment.into(),
            position: 0,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Cannot convert {value} to {to}")]
    Conversion { value: String, to: FormulaType },

    #[error("Integer overflow")]
    Overflow,

    #[error("Invalid evaluation context: {0}")]
    InvalidContext(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unregistered {kind}: {detail}")]
    Unregistered { kind: &'static str, detail: String },

    #[error("Cannot format {0} literal")]
    Literal(FormulaType),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
