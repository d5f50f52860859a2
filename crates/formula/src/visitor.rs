use crate::member::{
    BlockMember, ConstantMember, FunctionMember, OperatorMember, ValueMember, VariableMember,
};

/// Double dispatch over the six member variants, driven by
/// [`Member::accept`](crate::Member::accept).
pub trait Visitor {
    type Output;

    fn visit_value(&mut self, member: &ValueMember) -> Self::Output;
    fn visit_constant(&mut self, member: &ConstantMember) -> Self::Output;
    fn visit_variable(&mut self, member: &VariableMember) -> Self::Output;
    fn visit_operator(&mut self, member: &OperatorMember) -> Self::Output;
    fn visit_function(&mut self, member: &FunctionMember) -> Self::Output;
    fn visit_block(&mut self, member: &BlockMember) -> Self::Output;
}
