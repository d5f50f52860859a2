//! String operators.

use crate::capability::{Operator, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;

/// String concatenation. Registered on the same token as numeric addition
/// and selected only when every operand is a string (or null).
#[derive(Debug, Default)]
pub struct Concatenation;

impl Operator for Concatenation {
    fn check(&self, members: &[Member]) -> bool {
        members.len() >= 2 && util::accepts(members, FormulaType::String)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::String
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let mut out = String::new();
        for member in members {
            match util::string(member.value(ctx)?)? {
                Some(s) => out.push_str(&s),
                None => return Ok(Value::Null),
            }
        }
        Ok(Value::String(out))
    }

    /// Merges runs of adjacent constant operands; other operands stay where
    /// they are.
    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        let mut operands: Vec<Member> = Vec::with_capacity(members.len());
        let mut run: Option<String> = None;
        for member in members {
            match member.literal_value() {
                Some(v) => match util::string(v).ok()? {
                    Some(s) => run.get_or_insert_with(String::new).push_str(&s),
                    None => return Some(Reduced::Member(Member::literal(FormulaType::String, Value::Null))),
                },
                None => {
                    if let Some(s) = run.take() {
                        operands.push(Member::from_value(s));
                    }
                    operands.push(member.clone());
                }
            }
        }
        if let Some(s) = run.take() {
            operands.push(Member::from_value(s));
        }

        match operands.len() {
            n if n == members.len() => None,
            1 => operands.pop().map(Reduced::Member),
            _ => Some(Reduced::Operands(operands)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates() {
        let members = vec![Member::from_value("a"), Member::from_value("b")];
        assert_eq!(Concatenation.value(&members, &()), Ok(Value::String("ab".into())));
    }

    #[test]
    fn rejects_numbers() {
        assert!(!Concatenation.check(&[Member::from_value("a"), Member::from_value(1i64)]));
    }

    #[test]
    fn all_constant_run_folds_to_one_literal() {
        let members = vec![Member::from_value("a"), Member::from_value("b"), Member::from_value("c")];
        match Concatenation.reduced_member(&members) {
            Some(Reduced::Member(m)) => assert_eq!(m.value(&()), Ok(Value::String("abc".into()))),
            other => panic!("unexpected {other:?}"),
        }
    }
}
