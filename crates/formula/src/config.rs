//! Serializable engine settings, loadable from TOML or JSON.
//!
//! ```toml
//! [syntax]
//! separator = ";"
//! date_pattern = "%Y-%m-%d"
//!
//! [variables.qty]
//! pointer = "/order/qty"
//! type = "Long"
//! ```

use crate::error::ConfigError;
use crate::parser::Parser;
use crate::syntax::{PatternFormat, SyntaxConfiguration, DEFAULT_DATETIME_PATTERN, DEFAULT_DATE_PATTERN, DEFAULT_TIME_PATTERN};
use crate::types::FormulaType;
use crate::variables::JsonVariable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxConfig {
    pub block_open: char,
    pub block_close: char,
    pub string_open: char,
    pub string_close: char,
    pub function_open: char,
    pub function_close: char,
    pub separator: char,
    pub radix: u32,
    pub null_literal: String,
    pub true_literal: String,
    pub false_literal: String,
    pub date_pattern: String,
    pub time_pattern: String,
    pub datetime_pattern: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        SyntaxConfig {
            block_open: '(',
            block_close: ')',
            string_open: '"',
            string_close: '"',
            function_open: '(',
            function_close: ')',
            separator: ',',
            radix: 10,
            null_literal: "null".to_string(),
            true_literal: "true".to_string(),
            false_literal: "false".to_string(),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            time_pattern: DEFAULT_TIME_PATTERN.to_string(),
            datetime_pattern: DEFAULT_DATETIME_PATTERN.to_string(),
        }
    }
}

fn invalid(message: String) -> ConfigError {
    error!(%message, "rejected syntax configuration");
    ConfigError::Invalid(message)
}

impl SyntaxConfig {
    /// Validates the settings and builds the runtime syntax with
    /// [`PatternFormat`] date formatters.
    pub fn build(&self) -> Result<SyntaxConfiguration, ConfigError> {
        if !(2..=36).contains(&self.radix) {
            return Err(invalid(format!("radix {} is outside 2..=36", self.radix)));
        }
        if self.block_open == self.block_close {
            return Err(invalid(format!("block delimiters are both '{}'", self.block_open)));
        }
        if self.function_open == self.function_close {
            return Err(invalid(format!("function delimiters are both '{}'", self.function_open)));
        }
        let nesting = [self.block_open, self.block_close, self.function_open, self.function_close];
        for quote in [self.string_open, self.string_close] {
            if nesting.contains(&quote) {
                return Err(invalid(format!("string delimiter '{quote}' is also a nesting delimiter")));
            }
        }
        if nesting.contains(&self.separator) || self.separator == self.string_open || self.separator == self.string_close {
            return Err(invalid(format!("separator '{}' is also a delimiter", self.separator)));
        }
        for (what, spelling) in [
            ("null", &self.null_literal),
            ("true", &self.true_literal),
            ("false", &self.false_literal),
        ] {
            if spelling.trim().is_empty() {
                return Err(invalid(format!("{what} literal is empty")));
            }
        }

        let date = PatternFormat::date(self.date_pattern.clone());
        let time = PatternFormat::time(self.time_pattern.clone());
        let datetime = PatternFormat::datetime(self.datetime_pattern.clone());
        for format in [&date, &time, &datetime] {
            if !format.is_valid() {
                return Err(invalid(format!("unusable date pattern \"{}\"", format.pattern())));
            }
        }

        Ok(SyntaxConfiguration {
            block_open: self.block_open,
            block_close: self.block_close,
            string_open: self.string_open,
            string_close: self.string_close,
            function_open: self.function_open,
            function_close: self.function_close,
            separator: self.separator,
            radix: self.radix,
            null_literal: self.null_literal.clone(),
            true_literal: self.true_literal.clone(),
            false_literal: self.false_literal.clone(),
            date_format: Arc::new(date),
            time_format: Arc::new(time),
            datetime_format: Arc::new(datetime),
        })
    }
}

/// A JSON-pointer variable declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub pointer: String,
    #[serde(rename = "type")]
    pub ty: FormulaType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub syntax: SyntaxConfig,
    pub variables: IndexMap<String, VariableConfig>,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// A parser with the default library, this syntax, and every configured
    /// variable registered as a [`JsonVariable`].
    pub fn into_parser(self) -> Result<Parser, ConfigError> {
        let mut parser = Parser::with_defaults();
        parser.set_syntax(self.syntax.build()?);
        for (name, variable) in self.variables {
            if name.trim().is_empty() {
                return Err(invalid("variable with an empty name".to_string()));
            }
            parser.add_variable(&name, Arc::new(JsonVariable::new(variable.pointer, variable.ty)));
        }
        Ok(parser)
    }
}
