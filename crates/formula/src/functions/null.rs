//! Null handling functions.

use crate::capability::{Function, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;

#[derive(Debug, Default)]
pub struct IsNull;

impl Function for IsNull {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Boolean
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        Ok(Value::Boolean(members[0].value(ctx)?.is_null()))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold_literal(members, FormulaType::Boolean, |m| self.value(m, &()))
    }
}

/// `NoNull(a, b, ..., fallback)`: the first non-null operand.
///
/// The last operand must be a non-null constant, so a value is always
/// produced.
#[derive(Debug, Default)]
pub struct NoNull;

impl Function for NoNull {
    fn check(&self, members: &[Member]) -> bool {
        let fallback = members
            .last()
            .and_then(Member::literal_value)
            .is_some_and(|v| !v.is_null());
        fallback
            && FormulaType::compatible_list(members)
            && FormulaType::compatible_list_type(members).is_some()
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::compatible_list_type(members).unwrap_or(FormulaType::Null)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let ty = self.get_type(members);
        for member in members {
            let value = member.value(ctx)?;
            if !value.is_null() {
                return ty.coerce(value);
            }
        }
        Ok(Value::Null)
    }

    /// Answers from leading literals only: skips null literals and stops at
    /// the first operand that is not known yet.
    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        let ty = self.get_type(members);
        for member in members {
            match member.literal_value() {
                Some(Value::Null) => continue,
                Some(value) => return Some(Reduced::Member(Member::literal(ty, ty.coerce(value).ok()?))),
                None => return None,
            }
        }
        None
    }
}

/// Maps a numeric zero to null.
#[derive(Debug, Default)]
pub struct NoZero;

impl Function for NoZero {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::numeric(members)
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        members[0].get_type()
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let value = members[0].value(ctx)?;
        Ok(if value.is_zero() { Value::Null } else { value })
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold_literal(members, self.get_type(members), |m| self.value(m, &()))
    }
}

/// The name of the operand's runtime type.
#[derive(Debug, Default)]
pub struct Type;

impl Function for Type {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::String
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let value = members[0].value(ctx)?;
        Ok(Value::String(FormulaType::of(&value).name().to_string()))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold_literal(members, FormulaType::String, |m| self.value(m, &()))
    }
}
