use crate::capability::{Function, Reduced};
use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use crate::util;
use std::any::Any;

/// `If(condition, then, else)`. A null condition selects `else`.
#[derive(Debug, Default)]
pub struct If;

impl Function for If {
    fn check(&self, members: &[Member]) -> bool {
        members.len() == 3
            && FormulaType::Boolean.convertable_from(members[0].get_type())
            && FormulaType::compatible_list_type(&members[1..]).is_some()
    }

    fn get_type(&self, members: &[Member]) -> FormulaType {
        FormulaType::compatible_list_type(&members[1..]).unwrap_or(FormulaType::Null)
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        let branch = match util::boolean(members[0].value(ctx)?)? {
            Some(true) => &members[1],
            _ => &members[2],
        };
        self.get_type(members).coerce(branch.value(ctx)?)
    }

    fn reduced_member(&self, members: &[Member]) -> Option<Reduced> {
        let condition = util::boolean(members[0].literal_value()?).ok()?;
        let branch = if condition == Some(true) { &members[1] } else { &members[2] };
        let ty = self.get_type(members);
        if branch.get_type() == ty {
            return Some(Reduced::Member(branch.clone()));
        }
        // A branch of another type is replaced only once it is a literal.
        let value = branch.literal_value()?;
        Some(Reduced::Member(Member::literal(ty, ty.coerce(value).ok()?)))
    }
}

/// `Calculate(expr, ...)` is true when every operand evaluates without an
/// error. Operand errors are swallowed, never propagated.
#[derive(Debug, Default)]
pub struct Calculate;

impl Function for Calculate {
    fn check(&self, members: &[Member]) -> bool {
        !members.is_empty()
    }

    fn get_type(&self, _members: &[Member]) -> FormulaType {
        FormulaType::Boolean
    }

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError> {
        Ok(Value::Boolean(members.iter().all(|m| m.value(ctx).is_ok())))
    }
}
