//! Comparison operators.

use crate::capability::{Operator, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparator {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparator::Equal => ordering == Ordering::Equal,
            Comparator::NotEqual => ordering != Ordering::Equal,
            Comparator::Less => ordering == Ordering::Less,
            Comparator::LessOrEqual => ordering != Ordering::Greater,
            Comparator::Greater => ordering == Ordering::Greater,
            Comparator::GreaterOrEqual => ordering != Ordering::Less,
        }
    }
}

/// Binary comparison over two compatible operands.
///
/// Two nulls are equal and null sorts before anything else; other values are
/// coerced into the operands' unified type and compared there.
#[derive(Debug)]
pub struct Comparison {
    comparator: Comparator,
}

impl Comparison {
    pub fn new(comparator: Comparator) -> Self {
        Comparison { comparator }
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }
}

pub fn compare(ty: FormulaType, a: Value, b: Value) -> Result<Ordering, EvalError> {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ok(Ordering::Equal),
        (true, false) => Ok(Ordering::Less),
        (false, true) => Ok(Ordering::Greater),
        (false, false) => {
            let a = ty.coerce(a)?;
            let b = ty.coerce(b)?;
            Ok(ty.compare(&a, &b))
        }
    }
}

impl Operator for Comparison {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 2 && FormulaType::compatible_list_type(members).is_some()
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Boolean
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let ty = FormulaType::compatible_list_type(members).unwrap_or(FormulaType::Null);
        let a = members[0].value(ctx)?;
        let b = members[1].value(ctx)?;
        let ordering = compare(ty, a, b)?;
        Ok(Value::Boolean(self.comparator.accepts(ordering)))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, FormulaType::Boolean, |m| self.value(m, &()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(comparator: Comparator, a: Member, b: Member) -> Value {
        Comparison::new(comparator).value(&[a, b], &()).unwrap()
    }

    fn null() -> Member {
        Member::literal(FormulaType::Null, Value::Null)
    }

    #[test]
    fn compares_across_numeric_widths() {
        assert_eq!(
            eval(Comparator::Equal, Member::from_value(2i64), Member::from_value(2.0)),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(Comparator::Less, Member::from_value(1i64), Member::from_value(1.5)),
            Value::Boolean(true)
        );
    }

    #[test]
    fn nulls() {
        assert_eq!(eval(Comparator::Equal, null(), null()), Value::Boolean(true));
        assert_eq!(eval(Comparator::Less, null(), Member::from_value(-5i64)), Value::Boolean(true));
        assert_eq!(
            eval(Comparator::GreaterOrEqual, Member::from_value("a"), null()),
            Value::Boolean(true)
        );
    }

    #[test]
    fn incompatible_operands_fail_check() {
        let cmp = Comparison::new(Comparator::Equal);
        assert!(!cmp.check(&[Member::from_value(1i64), Member::from_value("1")]));
        assert!(cmp.check(&[Member::from_value("a"), Member::from_value("b")]));
    }
}
