use crate::capability::Function;
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use chrono::{Local, NaiveDateTime};
use std::any::Any;

/// `Now()`: the local date and time at which this function object was
/// created. Every evaluation returns that same instant.
#[derive(Debug)]
pub struct DateFunction {
    now: NaiveDateTime,
}

impl DateFunction {
    pub fn new() -> Self {
        DateFunction::at(Local::now().naive_local())
    }

    pub fn at(now: NaiveDateTime) -> Self {
        DateFunction { now }
    }

    pub fn instant(&self) -> NaiveDateTime {
        self.now
    }
}

impl Default for DateFunction {
    fn default() -> Self {
        DateFunction::new()
    }
}

impl Function for DateFunction {
    fn check(&self, members: &[Member]) -> bool {
        members.is_empty()
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::DateTime
    }

    fn value(&self, _members: &[Member], _ctx: &dyn Any) -> Result<Value, EvalError> {
        Ok(Value::DateTime(self.now))
    }
}
