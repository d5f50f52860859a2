//! Boolean operators with three-valued logic: a dominating value (`true`
//! for `Or`, `false` for `And`) wins over null, otherwise null wins.

use crate::capability::{Operator, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;

fn connective(members: &[Member], ctx: &dyn Any, dominant: bool) -> Result<Value, EvalError> {
    let mut saw_null = false;
    for member in members {
        match util::boolean(member.value(ctx)?)? {
            Some(b) if b == dominant => return Ok(Value::Boolean(dominant)),
            Some(_) => {}
            None => saw_null = true,
        }
    }
    Ok(if saw_null {
        Value::Null
    } else {
        Value::Boolean(!dominant)
    })
}

fn reduce_connective<O: Operator>(op: &O, members: &[Member], dominant: bool) -> Option<Reduced> {
    if let Some(folded) = util::fold(members, FormulaType::Boolean, |m| op.value(m, &())) {
        return Some(folded);
    }
    members
        .iter()
        .any(|m| m.literal_value() == Some(Value::Boolean(dominant)))
        .then(|| Reduced::Member(Member::literal(FormulaType::Boolean, dominant)))
}

#[derive(Debug, Default)]
pub struct Or;

impl Operator for Or {
    fn check(&self, members: &[Member]) -> bool {
        members.len() >= 2 && util::accepts(members, FormulaType::Boolean)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Boolean
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        connective(members, ctx, true)
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        reduce_connective(self, members, true)
    }
}

#[derive(Debug, Default)]
pub struct And;

impl Operator for And {
    fn check(&self, members: &[Member]) -> bool {
        members.len() >= 2 && util::accepts(members, FormulaType::Boolean)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Boolean
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        connective(members, ctx, false)
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        reduce_connective(self, members, false)
    }
}

#[derive(Debug, Default)]
pub struct Not;

impl Operator for Not {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::accepts(members, FormulaType::Boolean)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Boolean
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        Ok(util::boolean(members[0].value(ctx)?)?
            .map(|b| Value::Boolean(!b))
            .unwrap_or(Value::Null))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, FormulaType::Boolean, |m| self.value(m, &()))
    }

    fn is_unary(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(v: bool) -> Member {
        Member::from_value(v)
    }

    fn null() -> Member {
        Member::literal(FormulaType::Null, Value::Null)
    }

    #[test]
    fn three_valued_or() {
        assert_eq!(Or.value(&[b(false), b(true)], &()), Ok(Value::Boolean(true)));
        assert_eq!(Or.value(&[null(), b(true)], &()), Ok(Value::Boolean(true)));
        assert_eq!(Or.value(&[null(), b(false)], &()), Ok(Value::Null));
        assert_eq!(Or.value(&[b(false), b(false)], &()), Ok(Value::Boolean(false)));
    }

    #[test]
    fn three_valued_and() {
        assert_eq!(And.value(&[b(true), b(true)], &()), Ok(Value::Boolean(true)));
        assert_eq!(And.value(&[null(), b(false)], &()), Ok(Value::Boolean(false)));
        assert_eq!(And.value(&[null(), b(true)], &()), Ok(Value::Null));
    }

    #[test]
    fn not() {
        assert_eq!(Not.value(&[b(true)], &()), Ok(Value::Boolean(false)));
        assert_eq!(Not.value(&[null()], &()), Ok(Value::Null));
        assert!(!Not.check(&[Member::from_value(1i64)]));
    }
}
