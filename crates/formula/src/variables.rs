//! Built-in constant and variable capabilities.

use crate::capability::{Constant, Variable};
use crate::error::EvalError;
use crate::parser::Parser;
use crate::types::{FormulaType, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;

/// A constant holding a fixed value.
#[derive(Debug, Clone)]
pub struct ValueConstant {
    ty: FormulaType,
    value: Value,
}

impl ValueConstant {
    pub fn new(value: Value) -> Self {
        ValueConstant {
            ty: FormulaType::of(&value),
            value,
        }
    }

    pub fn typed(ty: FormulaType, value: Value) -> Self {
        ValueConstant { ty, value }
    }
}

impl Constant for ValueConstant {
    fn get_type(&self) -> FormulaType {
        self.ty
    }

    fn value(&self) -> Value {
        self.value.clone()
    }
}

/// A variable read from a `serde_json::Value` context through a JSON
/// pointer.
///
/// A missing pointer yields null. Temporal types are read from ISO 8601
/// strings.
#[derive(Debug, Clone)]
pub struct JsonVariable {
    pointer: String,
    ty: FormulaType,
}

impl JsonVariable {
    pub fn new(pointer: impl Into<String>, ty: FormulaType) -> Self {
        JsonVariable {
            pointer: pointer.into(),
            ty,
        }
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }
}

impl Variable for JsonVariable {
    fn get_type(&self) -> FormulaType {
        self.ty
    }

    fn value(&self, ctx: &dyn Any) -> Result<Value, EvalError> {
        let document = ctx
            .downcast_ref::<serde_json::Value>()
            .ok_or_else(|| EvalError::InvalidContext(format!("{} expects a JSON document", self.pointer)))?;
        match document.pointer(&self.pointer) {
            None => Ok(Value::Null),
            Some(json) => from_json(json, self.ty),
        }
    }
}

fn from_json(json: &serde_json::Value, ty: FormulaType) -> Result<Value, EvalError> {
    use serde_json::Value as Json;

    let value = match (ty, json) {
        (_, Json::Null) | (FormulaType::Null, _) => Some(Value::Null),
        (FormulaType::Boolean, Json::Bool(b)) => Some(Value::Boolean(*b)),
        (FormulaType::Long, Json::Number(n)) => n.as_i64().map(Value::Long),
        (FormulaType::Double, Json::Number(n)) => n.as_f64().map(Value::Double),
        (FormulaType::String, Json::String(s)) => Some(Value::String(s.clone())),
        (FormulaType::Date, Json::String(s)) => NaiveDate::from_str(s).ok().map(Value::Date),
        (FormulaType::Time, Json::String(s)) => NaiveTime::from_str(s).ok().map(Value::Time),
        (FormulaType::DateTime, Json::String(s)) => NaiveDateTime::from_str(s).ok().map(Value::DateTime),
        _ => None,
    };
    value.ok_or_else(|| EvalError::Conversion {
        value: json.to_string(),
        to: ty,
    })
}

pub fn register(parser: &mut Parser) {
    parser.add_constant("PI", Arc::new(ValueConstant::new(Value::Double(std::f64::consts::PI))));
    parser.add_constant("E", Arc::new(ValueConstant::new(Value::Double(std::f64::consts::E))));
}
