use crate::capability::{Function, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;

/// Character count of a string.
#[derive(Debug, Default)]
pub struct Length;

impl Function for Length {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::accepts(members, FormulaType::String)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Long
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        Ok(util::string(members[0].value(ctx)?)?
            .map(|s| Value::Long(s.chars().count() as i64))
            .unwrap_or(Value::Null))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, FormulaType::Long, |m| self.value(m, &()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Upper,
    Lower,
}

/// `Upper(s)` / `Lower(s)`.
#[derive(Debug)]
pub struct ChangeCase {
    case: Case,
}

impl ChangeCase {
    pub fn new(case: Case) -> Self {
        ChangeCase { case }
    }
}

impl Function for ChangeCase {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::accepts(members, FormulaType::String)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::String
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        Ok(util::string(members[0].value(ctx)?)?
            .map(|s| match self.case {
                Case::Upper => Value::String(s.to_uppercase()),
                Case::Lower => Value::String(s.to_lowercase()),
            })
            .unwrap_or(Value::Null))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, FormulaType::String, |m| self.value(m, &()))
    }
}
