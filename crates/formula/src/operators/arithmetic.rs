//! Arithmetic operators.
//!
//! All of them promote: `Long` operands stay `Long`, a single `Double`
//! operand makes the result `Double`. Null operands make the result null,
//! except for [`Division`].

use crate::capability::{Operator, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;
use std::sync::Arc;

fn is_one(value: &Value) -> bool {
    match value {
        Value::Long(n) => *n == 1,
        Value::Double(n) => *n == 1.0,
        _ => false,
    }
}

/// Rebuilds `operator` over `members` after letting it reduce them once.
fn rebuild(operator: &Arc<dyn Operator>, members: Vec<Member>) -> Member {
    match operator.reduced_member(&members) {
        Some(Reduced::Member(member)) => member,
        Some(Reduced::Operands(operands)) => Member::operator(Arc::clone(operator), operands),
        None => Member::operator(Arc::clone(operator), members),
    }
}

#[derive(Debug, Default)]
pub struct Addition;

impl Operator for Addition {
    fn check(&self, members: &[Member]) -> bool {
        members.len() >= 2 && util::numeric(members)
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::numeric_type(members)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let values = util::values(members, ctx)?;
        if values.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        util::sum(values, self.get_type(members))
    }

    /// Collapses every constant operand into one term, placed where the first
    /// constant was. Other operands keep their order.
    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        let ty = self.get_type(members);
        if let Some(folded) = util::fold(members, ty, |m| self.value(m, &())) {
            return Some(folded);
        }

        let constants: Vec<(usize, Value)> = members
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.literal_value().map(|v| (i, v)))
            .collect();
        let all_evaluated = constants.len() == members.iter().filter(|m| m.is_constant()).count();
        if all_evaluated && constants.iter().any(|(_, v)| v.is_null()) {
            return Some(Reduced::Member(Member::literal(ty, Value::Null)));
        }
        if constants.len() < 2 {
            return None;
        }

        let first = constants[0].0;
        let constant_members: Vec<Member> = constants
            .iter()
            .map(|(i, _)| members[*i].clone())
            .collect();
        let term_type = FormulaType::numeric_type(&constant_members);
        let merged: Vec<usize> = constants.iter().map(|(i, _)| *i).collect();
        let term = util::sum(constants.into_iter().map(|(_, v)| v).collect(), term_type).ok()?;

        // A constant that fails to evaluate is not merged and keeps its place.
        let mut operands = Vec::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            if i == first {
                operands.push(Member::literal(term_type, term.clone()));
            } else if !merged.contains(&i) {
                operands.push(member.clone());
            }
        }
        Some(Reduced::Operands(operands))
    }
}

/// `a - b - c` is `a - (b + c)`. Folding rewrites it as an addition of the
/// negated remainder so the addition can merge constants.
#[derive(Debug)]
pub struct Subtraction {
    addition: Arc<dyn Operator>,
    negation: Arc<dyn Operator>,
}

impl Subtraction {
    pub fn new(addition: Arc<dyn Operator>, negation: Arc<dyn Operator>) -> Self {
        Subtraction { addition, negation }
    }
}

impl Operator for Subtraction {
    fn check(&self, members: &[Member]) -> bool {
        members.len() >= 2 && util::numeric(members)
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::numeric_type(members)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let mut values = util::values(members, ctx)?;
        if values.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        let ty = self.get_type(members);
        let first = values.remove(0);
        let rest = util::sum(values, ty)?;
        match ty {
            FormulaType::Long => util::long(first)?
                .checked_sub(util::long(rest)?)
                .map(Value::Long)
                .ok_or(EvalError::Overflow),
            _ => Ok(Value::Double(util::double(first)? - util::double(rest)?)),
        }
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        let ty = self.get_type(members);
        if let Some(folded) = util::fold(members, ty, |m| self.value(m, &())) {
            return Some(folded);
        }
        if !members[1..].iter().any(Member::is_constant) {
            return None;
        }

        let mut terms = Vec::with_capacity(members.len());
        terms.push(members[0].clone());
        for member in &members[1..] {
            match member.literal_value() {
                Some(v) => terms.push(Member::literal(member.get_type(), util::negate(v).ok()?)),
                None => terms.push(Member::operator(Arc::clone(&self.negation), vec![member.clone()])),
            }
        }
        Some(Reduced::Member(rebuild(&self.addition, terms)))
    }
}

#[derive(Debug, Default)]
pub struct Multiplication;

impl Operator for Multiplication {
    fn check(&self, members: &[Member]) -> bool {
        members.len() >= 2 && util::numeric(members)
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::numeric_type(members)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let values = util::values(members, ctx)?;
        if values.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        util::product(values, self.get_type(members))
    }

    /// Multiplies constant factors into one leading coefficient. A zero
    /// factor folds the whole product to zero and a coefficient of one is
    /// dropped.
    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        let ty = self.get_type(members);
        if let Some(folded) = util::fold(members, ty, |m| self.value(m, &())) {
            return Some(folded);
        }

        let mut factors = Vec::new();
        let mut constants = Vec::new();
        let mut variables = Vec::new();
        for member in members {
            match member.literal_value() {
                Some(v) if v.is_zero() => return Some(Reduced::Member(Member::literal(ty, util::zero(ty)))),
                Some(Value::Null) => return Some(Reduced::Member(Member::literal(ty, Value::Null))),
                Some(v) => {
                    factors.push(v);
                    constants.push(member.clone());
                }
                None => variables.push(member.clone()),
            }
        }
        if factors.is_empty() {
            return None;
        }

        let coefficient_type = FormulaType::numeric_type(&constants);
        let coefficient = util::product(factors, coefficient_type).ok()?;
        let widens = coefficient_type == FormulaType::Double
            && FormulaType::numeric_type(&variables) == FormulaType::Long;
        let keep = !is_one(&coefficient) || widens;
        if constants.len() == 1 && keep {
            return None;
        }

        let mut operands = Vec::with_capacity(variables.len() + 1);
        if keep {
            operands.push(Member::literal(coefficient_type, coefficient));
        }
        operands.extend(variables);
        if operands.len() == 1 {
            return operands.pop().map(Reduced::Member);
        }
        Some(Reduced::Operands(operands))
    }
}

/// `a / b / c` is `a / (b * c)`; the divisor list is a product.
///
/// A null or zero numerator gives `0.0`, a null or zero divisor gives `NaN`.
#[derive(Debug)]
pub struct Division {
    multiplication: Arc<dyn Operator>,
}

impl Division {
    pub fn new(multiplication: Arc<dyn Operator>) -> Self {
        Division { multiplication }
    }

    fn divisor(&self, members: &[Member]) -> Member {
        match members {
            [single] => single.clone(),
            _ => rebuild(&self.multiplication, members.to_vec()),
        }
    }
}

impl Operator for Division {
    fn check(&self, members: &[Member]) -> bool {
        members.len() >= 2 && util::numeric(members)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Double
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let numerator = members[0].value(ctx)?;
        if numerator.is_null() || numerator.is_zero() {
            return Ok(Value::Double(0.0));
        }
        let divisor = match &members[1..] {
            [single] => single.value(ctx)?,
            rest => self.multiplication.value(rest, ctx)?,
        };
        if divisor.is_null() || divisor.is_zero() {
            return Ok(Value::Double(f64::NAN));
        }
        Ok(Value::Double(util::double(numerator)? / util::double(divisor)?))
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        let numerator = &members[0];
        if let Some(v) = numerator.literal_value() {
            if v.is_null() || v.is_zero() {
                return Some(Reduced::Member(Member::literal(FormulaType::Double, 0.0)));
            }
        }

        let divisor = self.divisor(&members[1..]);
        if divisor.is_constant() {
            match divisor.value(&()) {
                Ok(v) if !(v.is_null() || v.is_zero()) => {}
                _ => return Some(Reduced::Member(Member::literal(FormulaType::Double, f64::NAN))),
            }
        }

        let operands = vec![numerator.clone(), divisor];
        if let Some(folded) = util::fold(&operands, FormulaType::Double, |m| self.value(m, &())) {
            return Some(folded);
        }
        if members.len() == 2 {
            return None;
        }
        Some(Reduced::Operands(operands))
    }
}

/// Suffix square. Always `Double`.
#[derive(Debug, Default)]
pub struct Square;

impl Operator for Square {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::numeric(members)
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Double
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        match members[0].value(ctx)? {
            Value::Null => Ok(Value::Null),
            v => {
                let n = util::double(v)?;
                Ok(Value::Double(n * n))
            }
        }
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, FormulaType::Double, |m| self.value(m, &()))
    }

    fn is_unary(&self) -> bool {
        true
    }

    fn is_unary_suffix(&self) -> bool {
        true
    }
}

/// Prefix negation.
#[derive(Debug, Default)]
pub struct Negation;

impl Operator for Negation {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 1 && util::numeric(members)
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::numeric_type(members)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let value = members[0].value(ctx)?;
        match self.get_type(members) {
            FormulaType::Double if !value.is_null() => Ok(Value::Double(-util::double(value)?)),
            _ => util::negate(value),
        }
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        util::fold(members, self.get_type(members), |m| self.value(m, &()))
    }

    fn is_unary(&self) -> bool {
        true
    }
}
