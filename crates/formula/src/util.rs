//! Helpers shared by the built-in operators and functions.

use crate::capability::Reduced;
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use std::any::Any;

// ----------------------------------------------------------------- Checks

/// Every operand coerces into `ty`.
pub fn accepts(members: &[Member], ty: FormulaType) -> bool {
    members.iter().all(|m| ty.convertable_from(m.get_type()))
}

/// Every operand is numeric (or null).
pub fn numeric(members: &[Member]) -> bool {
    accepts(members, FormulaType::Double)
}

// ------------------------------------------------------------- Evaluation

pub fn values(members: &[Member], ctx: &dyn Any) -> Result<Vec<Value>, EvalError> {
    members.iter().map(|m| m.value(ctx)).collect()
}

pub fn long(value: Value) -> Result<i64, EvalError> {
    let coerced = FormulaType::Long.coerce(value)?;
    coerced.as_long().ok_or(EvalError::Conversion {
        value: format!("{coerced:?}"),
        to: FormulaType::Long,
    })
}

pub fn double(value: Value) -> Result<f64, EvalError> {
    let coerced = FormulaType::Double.coerce(value)?;
    coerced.as_double().ok_or(EvalError::Conversion {
        value: format!("{coerced:?}"),
        to: FormulaType::Double,
    })
}

pub fn boolean(value: Value) -> Result<Option<bool>, EvalError> {
    match FormulaType::Boolean.coerce(value)? {
        Value::Null => Ok(None),
        v => Ok(v.as_bool()),
    }
}

pub fn string(value: Value) -> Result<Option<String>, EvalError> {
    match FormulaType::String.coerce(value)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Sum of non-null values in `ty` (`Long` or `Double`).
pub fn sum(values: Vec<Value>, ty: FormulaType) -> Result<Value, EvalError> {
    match ty {
        FormulaType::Long => values
            .into_iter()
            .try_fold(0i64, |acc, v| acc.checked_add(long(v)?).ok_or(EvalError::Overflow))
            .map(Value::Long),
        _ => values
            .into_iter()
            .try_fold(0.0f64, |acc, v| Ok(acc + double(v)?))
            .map(Value::Double),
    }
}

/// Product of non-null values in `ty` (`Long` or `Double`).
pub fn product(values: Vec<Value>, ty: FormulaType) -> Result<Value, EvalError> {
    match ty {
        FormulaType::Long => values
            .into_iter()
            .try_fold(1i64, |acc, v| acc.checked_mul(long(v)?).ok_or(EvalError::Overflow))
            .map(Value::Long),
        _ => values
            .into_iter()
            .try_fold(1.0f64, |acc, v| Ok(acc * double(v)?))
            .map(Value::Double),
    }
}

pub fn negate(value: Value) -> Result<Value, EvalError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Long(n) => n.checked_neg().map(Value::Long).ok_or(EvalError::Overflow),
        v => Ok(Value::Double(-double(v)?)),
    }
}

pub fn zero(ty: FormulaType) -> Value {
    match ty {
        FormulaType::Double => Value::Double(0.0),
        _ => Value::Long(0),
    }
}

// ---------------------------------------------------------------- Folding

/// Replaces a call whose operands are all constant with its value.
///
/// Evaluation errors leave the node alone so they surface at run time.
pub fn fold<F>(members: &[Member], ty: FormulaType, eval: F) -> Option<Reduced>
where
    F: FnOnce(&[Member]) -> Result<Value, EvalError>,
{
    if !members.iter().all(Member::is_constant) {
        return None;
    }
    eval(members)
        .ok()
        .map(|value| Reduced::Member(Member::literal(ty, value)))
}

/// Folds a single-operand call once the operand is a literal.
pub fn fold_literal<F>(members: &[Member], ty: FormulaType, eval: F) -> Option<Reduced>
where
    F: FnOnce(&[Member]) -> Result<Value, EvalError>,
{
    match members {
        [Member::Value(_)] => fold(members, ty, eval),
        _ => None,
    }
}
