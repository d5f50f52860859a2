//! Value types and their coercion rules.

use crate::error::EvalError;
use crate::member::Member;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The closed set of value types a member can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaType {
    Boolean,
    Long,
    Double,
    Date,
    Time,
    DateTime,
    String,
    Null,
}

impl FormulaType {
    pub const ALL: [FormulaType; 8] = [
        FormulaType::Boolean,
        FormulaType::Long,
        FormulaType::Double,
        FormulaType::Date,
        FormulaType::Time,
        FormulaType::DateTime,
        FormulaType::String,
        FormulaType::Null,
    ];

    /// Runtime type of a value. `Value::Null` is `Null`.
    pub fn of(value: &Value) -> FormulaType {
        match value {
            Value::Null => FormulaType::Null,
            Value::Boolean(_) => FormulaType::Boolean,
            Value::Long(_) => FormulaType::Long,
            Value::Double(_) => FormulaType::Double,
            Value::Date(_) => FormulaType::Date,
            Value::Time(_) => FormulaType::Time,
            Value::DateTime(_) => FormulaType::DateTime,
            Value::String(_) => FormulaType::String,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FormulaType::Boolean => "Boolean",
            FormulaType::Long => "Long",
            FormulaType::Double => "Double",
            FormulaType::Date => "Date",
            FormulaType::Time => "Time",
            FormulaType::DateTime => "DateTime",
            FormulaType::String => "String",
            FormulaType::Null => "Null",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FormulaType::Long | FormulaType::Double)
    }

    /// Can a value of type `other` be coerced into this type?
    ///
    /// `Null` converts into anything, `Double` accepts every numeric type and
    /// `DateTime` accepts every temporal type. Nothing else converts.
    pub fn convertable_from(self, other: FormulaType) -> bool {
        if self == other || other == FormulaType::Null {
            return true;
        }
        match self {
            FormulaType::Double => other.is_numeric(),
            FormulaType::DateTime => matches!(other, FormulaType::Date | FormulaType::Time),
            _ => false,
        }
    }

    /// Converts `value`, declared as `other`, into this type.
    pub fn convert_from(self, value: Value, other: FormulaType) -> Result<Value, EvalError> {
        if !self.convertable_from(other) {
            return Err(conversion_error(&value, self));
        }
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (FormulaType::Double, Value::Long(n)) => Ok(Value::Double(n as f64)),
            (FormulaType::DateTime, Value::Date(d)) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
            (FormulaType::DateTime, Value::Time(t)) => Ok(Value::DateTime(epoch().and_time(t))),
            (ty, v) if FormulaType::of(&v) == ty => Ok(v),
            (ty, v) => Err(conversion_error(&v, ty)),
        }
    }

    /// Converts `value` into this type using its runtime type as the source.
    pub fn coerce(self, value: Value) -> Result<Value, EvalError> {
        let other = FormulaType::of(&value);
        self.convert_from(value, other)
    }

    /// Orders two non-null values of this type.
    ///
    /// Values of different runtime types are ordered by type rank so the
    /// order stays total; callers are expected to coerce first.
    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => rank(a).cmp(&rank(b)),
        }
    }

    /// Holds if either type coerces into the other.
    pub fn compatible(t1: FormulaType, t2: FormulaType) -> bool {
        t1.convertable_from(t2) || t2.convertable_from(t1)
    }

    /// Whichever of the two types the other one coerces into.
    pub fn compatible_type(t1: FormulaType, t2: FormulaType) -> Option<FormulaType> {
        if t1.convertable_from(t2) {
            Some(t1)
        } else if t2.convertable_from(t1) {
            Some(t2)
        } else {
            None
        }
    }

    pub fn compatible_members(m1: &Member, m2: &Member) -> bool {
        FormulaType::compatible(m1.get_type(), m2.get_type())
    }

    /// A list is compatible when every element is compatible with the first
    /// one. This is not transitive compatibility: `[Null, Long, String]`
    /// passes.
    pub fn compatible_list(members: &[Member]) -> bool {
        match members.split_first() {
            None => true,
            Some((first, rest)) => rest.iter().all(|m| FormulaType::compatible_members(first, m)),
        }
    }

    /// Unifies the types of a list, folding left with [`compatible_type`](Self::compatible_type).
    pub fn compatible_list_type(members: &[Member]) -> Option<FormulaType> {
        let (first, rest) = members.split_first()?;
        rest.iter()
            .try_fold(first.get_type(), |acc, m| FormulaType::compatible_type(acc, m.get_type()))
    }

    /// Numeric promotion: `Long` unless some operand is `Double`.
    pub fn numeric_type(members: &[Member]) -> FormulaType {
        if members.iter().any(|m| m.get_type() == FormulaType::Double) {
            FormulaType::Double
        } else {
            FormulaType::Long
        }
    }
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Boolean(_) => 1,
        Value::Long(_) => 2,
        Value::Double(_) => 3,
        Value::Date(_) => 4,
        Value::Time(_) => 5,
        Value::DateTime(_) => 6,
        Value::String(_) => 7,
    }
}

fn conversion_error(value: &Value, to: FormulaType) -> EvalError {
    EvalError::Conversion {
        value: format!("{value:?}"),
        to,
    }
}

/// A runtime value. Null is untyped; the declared type lives on the member.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Long(i64),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of the value; `Long` is widened.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Long(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric zero of either width.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Long(n) => *n == 0,
            Value::Double(n) => *n == 0.0,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
