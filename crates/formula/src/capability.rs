//! Pluggable semantics referenced by tree nodes.
//!
//! Capabilities are registered in a [`Parser`](crate::Parser) under a name
//! (constants, variables, functions) or a token (operators) and shared by
//! every member built from that registration.

use crate::error::EvalError;
use crate::member::Member;
use crate::types::{FormulaType, Value};
use std::any::Any;
use std::fmt;

/// A named value known without any context.
pub trait Constant: fmt::Debug + Send + Sync {
    fn get_type(&self) -> FormulaType;
    fn value(&self) -> Value;
}

/// A named value resolved from the caller's evaluation context.
///
/// The context is passed through untouched; implementations downcast it to
/// whatever type they expect.
pub trait Variable: fmt::Debug + Send + Sync {
    fn get_type(&self) -> FormulaType;
    fn value(&self, ctx: &dyn Any) -> Result<Value, EvalError>;
}

/// Outcome of a successful fold.
#[derive(Debug, Clone)]
pub enum Reduced {
    /// Replace the node with this member.
    Member(Member),
    /// Keep the node's capability, rebuilt over these operands.
    Operands(Vec<Member>),
}

/// A named n-ary function, written `name(arg, ...)`.
pub trait Function: fmt::Debug + Send + Sync {
    /// Validates an operand list. A failed check makes the parser treat the
    /// candidate as not applicable.
    fn check(&self, members: &[Member]) -> bool;

    fn get_type(&self, members: &[Member]) -> FormulaType;

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError>;

    /// Folds the call given already reduced operands, or `None` when nothing
    /// can be simplified.
    fn reduced_member(&self, _members: &[Member]) -> Option<Reduced> {
        None
    }
}

/// An operator bound to a token. Unary operators are prefix unless
/// [`is_unary_suffix`](Operator::is_unary_suffix) says otherwise.
pub trait Operator: fmt::Debug + Send + Sync {
    fn check(&self, members: &[Member]) -> bool;

    fn get_type(&self, members: &[Member]) -> FormulaType;

    fn value(&self, members: &[Member], ctx: &dyn Any) -> Result<Value, EvalError>;

    fn reduced_member(&self, _members: &[Member]) -> Option<Reduced> {
        None
    }

    fn is_unary(&self) -> bool {
        false
    }

    fn is_unary_suffix(&self) -> bool {
        false
    }
}
