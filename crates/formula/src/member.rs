//! Expression tree nodes.

use crate::capability::{Constant, Function, Operator, Variable};
use crate::error::EvalError;
use crate::types::{FormulaType, Value};
use crate::visitor::Visitor;
use std::any::Any;
use std::sync::Arc;

/// One node of the expression tree.
///
/// Nodes are immutable once built: operator and function nodes take
/// ownership of a finished operand list and only hand out slices of it.
#[derive(Debug, Clone)]
pub enum Member {
    Value(ValueMember),
    Constant(ConstantMember),
    Variable(VariableMember),
    Operator(OperatorMember),
    Function(FunctionMember),
    Block(BlockMember),
}

impl Member {
    /// A typed literal.
    pub fn literal(ty: FormulaType, value: impl Into<Value>) -> Member {
        Member::Value(ValueMember::new(ty, value.into()))
    }

    /// A literal typed after its runtime value.
    pub fn from_value(value: impl Into<Value>) -> Member {
        let value = value.into();
        Member::Value(ValueMember::new(FormulaType::of(&value), value))
    }

    pub fn constant(constant: Arc<dyn Constant>) -> Member {
        Member::Constant(ConstantMember { constant })
    }

    pub fn variable(variable: Arc<dyn Variable>) -> Member {
        Member::Variable(VariableMember { variable })
    }

    pub fn operator(operator: Arc<dyn Operator>, members: Vec<Member>) -> Member {
        Member::Operator(OperatorMember::new(operator, members))
    }

    pub fn function(function: Arc<dyn Function>, members: Vec<Member>) -> Member {
        Member::Function(FunctionMember::new(function, members))
    }

    pub fn block(member: Member) -> Member {
        Member::Block(BlockMember {
            member: Box::new(member),
        })
    }

    pub fn get_type(&self) -> FormulaType {
        match self {
            Member::Value(m) => m.ty,
            Member::Constant(m) => m.constant.get_type(),
            Member::Variable(m) => m.variable.get_type(),
            Member::Operator(m) => m.operator.get_type(&m.members),
            Member::Function(m) => m.function.get_type(&m.members),
            Member::Block(m) => m.member.get_type(),
        }
    }

    /// True iff nothing below this node depends on the evaluation context.
    pub fn is_constant(&self) -> bool {
        match self {
            Member::Value(_) | Member::Constant(_) => true,
            Member::Variable(_) => false,
            Member::Operator(m) => m.members.iter().all(Member::is_constant),
            Member::Function(m) => m.members.iter().all(Member::is_constant),
            Member::Block(m) => m.member.is_constant(),
        }
    }

    /// Evaluates the subtree. Nothing is cached between calls.
    pub fn value(&self, ctx: &dyn Any) -> Result<Value, EvalError> {
        match self {
            Member::Value(m) => Ok(m.value.clone()),
            Member::Constant(m) => Ok(m.constant.value()),
            Member::Variable(m) => m.variable.value(ctx),
            Member::Operator(m) => m.operator.value(&m.members, ctx),
            Member::Function(m) => m.function.value(&m.members, ctx),
            Member::Block(m) => m.member.value(ctx),
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Member::Value(m) => visitor.visit_value(m),
            Member::Constant(m) => visitor.visit_constant(m),
            Member::Variable(m) => visitor.visit_variable(m),
            Member::Operator(m) => visitor.visit_operator(m),
            Member::Function(m) => visitor.visit_function(m),
            Member::Block(m) => visitor.visit_block(m),
        }
    }

    /// The literal value of a constant subtree, evaluated without context.
    /// `None` for non-constant members or when evaluation fails.
    pub fn literal_value(&self) -> Option<Value> {
        if self.is_constant() {
            self.value(&()).ok()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValueMember {
    ty: FormulaType,
    value: Value,
}

impl ValueMember {
    pub fn new(ty: FormulaType, value: Value) -> Self {
        ValueMember { ty, value }
    }

    pub fn get_type(&self) -> FormulaType {
        self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Debug, Clone)]
pub struct ConstantMember {
    constant: Arc<dyn Constant>,
}

impl ConstantMember {
    pub fn constant(&self) -> &Arc<dyn Constant> {
        &self.constant
    }
}

#[derive(Debug, Clone)]
pub struct VariableMember {
    variable: Arc<dyn Variable>,
}

impl VariableMember {
    pub fn variable(&self) -> &Arc<dyn Variable> {
        &self.variable
    }
}

#[derive(Debug, Clone)]
pub struct OperatorMember {
    operator: Arc<dyn Operator>,
    members: Vec<Member>,
}

impl OperatorMember {
    pub fn new(operator: Arc<dyn Operator>, members: Vec<Member>) -> Self {
        OperatorMember { operator, members }
    }

    pub fn operator(&self) -> &Arc<dyn Operator> {
        &self.operator
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn into_parts(self) -> (Arc<dyn Operator>, Vec<Member>) {
        (self.operator, self.members)
    }
}

#[derive(Debug, Clone)]
pub struct FunctionMember {
    function: Arc<dyn Function>,
    members: Vec<Member>,
}

impl FunctionMember {
    pub fn new(function: Arc<dyn Function>, members: Vec<Member>) -> Self {
        FunctionMember { function, members }
    }

    pub fn function(&self) -> &Arc<dyn Function> {
        &self.function
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn into_parts(self) -> (Arc<dyn Function>, Vec<Member>) {
        (self.function, self.members)
    }
}

/// Explicit grouping. Has no effect on type or value.
#[derive(Debug, Clone)]
pub struct BlockMember {
    member: Box<Member>,
}

impl BlockMember {
    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn into_member(self) -> Member {
        *self.member
    }
}

/// Identity of a shared capability, ignoring vtable metadata.
pub(crate) fn same_capability<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
