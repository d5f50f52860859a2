//! Numeric functions.

use crate::capability::{Function, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::operators::comparison;
use crate::syntax::format_radix;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;
use std::cmp::Ordering;

/// Upper-case hexadecimal rendering of a `Long`.
#[derive(Debug, Default)]
pub struct Hexa;

impl Function for Hexa {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::accepts(members, FormulaType::Long)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::String
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        match members[0].value(ctx)? {
            Value::Null => Ok(Value::Null),
            v => Ok(Value::String(format_radix(util::long(v)?, 16))),
        }
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold_literal(members, FormulaType::String, |m| self.value(m, &()))
    }
}

#[derive(Debug, Default)]
pub struct Sqrt;

impl Function for Sqrt {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::numeric(members)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Double
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        match members[0].value(ctx)? {
            Value::Null => Ok(Value::Null),
            v => Ok(Value::Double(util::double(v)?.sqrt())),
        }
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold_literal(members, FormulaType::Double, |m| self.value(m, &()))
    }
}

#[derive(Debug, Default)]
pub struct Abs;

impl Function for Abs {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::numeric(members)
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::numeric_type(members)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let value = members[0].value(ctx)?;
        match (self.get_type(members), value) {
            (_, Value::Null) => Ok(Value::Null),
            (FormulaType::Long, v) => util::long(v)?
                .checked_abs()
                .map(Value::Long)
                .ok_or(EvalError::Overflow),
            (_, v) => Ok(Value::Double(util::double(v)?.abs())),
        }
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, self.get_type(members), |m| self.value(m, &()))
    }
}

/// Rounds half away from zero to a `Long`.
#[derive(Debug, Default)]
pub struct Round;

impl Function for Round {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::numeric(members)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Long
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        match members[0].value(ctx)? {
            Value::Null => Ok(Value::Null),
            Value::Long(n) => Ok(Value::Long(n)),
            v => {
                let n = util::double(v)?.round();
                if !n.is_finite() || n < i64::MIN as f64 || n >= i64::MAX as f64 {
                    return Err(EvalError::Conversion {
                        value: n.to_string(),
                        to: FormulaType::Long,
                    });
                }
                Ok(Value::Long(n as i64))
            }
        }
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, FormulaType::Long, |m| self.value(m, &()))
    }
}

/// `Min(...)` and `Max(...)` over numeric operands; any null gives null.
#[derive(Debug)]
pub struct Extremum {
    wanted: Ordering,
}

impl Extremum {
    pub fn min() -> Self {
        Extremum { wanted: Ordering::Less }
    }

    pub fn max() -> Self {
        Extremum {
            wanted: Ordering::Greater,
        }
    }
}

impl Function for Extremum {
    fn check(&self, members: &[Member]) -> bool {
        !members.is_empty() && util::numeric(members)
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::numeric_type(members)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let ty = self.get_type(members);
        let mut best: Option<Value> = None;
        for value in util::values(members, ctx)? {
            if value.is_null() {
                return Ok(Value::Null);
            }
            let value = ty.coerce(value)?;
            let replace = match &best {
                None => true,
                Some(current) => comparison::compare(ty, value.clone(), current.clone())? == self.wanted,
            };
            if replace {
                best = Some(value);
            }
        }
        Ok(best.unwrap_or(Value::Null))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, self.get_type(members), |m| self.value(m, &()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hexa_is_upper_case() {
        assert_eq!(Hexa.value(&[Member::from_value(255i64)], &()), Ok(Value::String("FF".into())));
        assert!(!Hexa.check(&[Member::from_value(1.5)]));
    }

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(Round.value(&[Member::from_value(2.5)], &()), Ok(Value::Long(3)));
        assert_eq!(Round.value(&[Member::from_value(-2.5)], &()), Ok(Value::Long(-3)));
        assert!(Round.value(&[Member::from_value(f64::NAN)], &()).is_err());
    }

    #[test]
    fn extremum() {
        let members = vec![Member::from_value(3i64), Member::from_value(1.5), Member::from_value(2i64)];
        assert_eq!(Extremum::min().value(&members, &()), Ok(Value::Double(1.5)));
        assert_eq!(Extremum::max().value(&members, &()), Ok(Value::Double(3.0)));
    }

    #[test]
    fn abs_keeps_width() {
        assert_eq!(Abs.value(&[Member::from_value(-4i64)], &()), Ok(Value::Long(4)));
        assert_eq!(Abs.value(&[Member::from_value(-0.5)], &()), Ok(Value::Double(0.5)));
    }
}
