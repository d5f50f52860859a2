//! Constant folding.

use crate::capability::Reduced;
use crate::member::{
    BlockMember, ConstantMember, FunctionMember, Member, OperatorMember, ValueMember, VariableMember,
};
use crate::parser::Parser;
use crate::visitor::Visitor;
use std::sync::Arc;
use tracing::debug;

/// Reduces children first, then asks each operator or function for a
/// folded replacement. Blocks are dropped and re-inserted only where the
/// precedence list requires them for the result to format back correctly.
pub struct Reducer<'p> {
    parser: &'p Parser,
}

impl<'p> Reducer<'p> {
    pub fn new(parser: &'p Parser) -> Self {
        Reducer { parser }
    }

    fn children(&mut self, members: &[Member]) -> Vec<Member> {
        members.iter().map(|m| m.accept(self)).collect()
    }

    /// Wraps operands that would otherwise change meaning when the tree is
    /// formatted and parsed again: operators listed before the parent, and
    /// operators sharing the parent's token (except the parent itself in
    /// leading position).
    fn regroup(&self, member: Member) -> Member {
        let Member::Operator(node) = member else {
            return member;
        };
        let Some(parent) = self.parser.operator_index(node.operator()) else {
            return Member::Operator(node);
        };
        let parent_token = self.parser.operator_token(node.operator());
        let (operator, members) = node.into_parts();

        let members = members
            .into_iter()
            .enumerate()
            .map(|(position, child)| {
                let Member::Operator(inner) = &child else {
                    return child;
                };
                let Some(index) = self.parser.operator_index(inner.operator()) else {
                    return child;
                };
                let same_token = self.parser.operator_token(inner.operator()) == parent_token;
                let leading_self = index == parent && position == 0;
                if index < parent || (same_token && !leading_self) {
                    Member::block(child)
                } else {
                    child
                }
            })
            .collect();
        Member::operator(operator, members)
    }

    /// [`Self::regroup`] applied bottom-up over a tree built by a
    /// `reduced_member`, whose inner nodes were never visited.
    fn regroup_all(&self, member: Member) -> Member {
        match member {
            Member::Operator(node) => {
                let (operator, members) = node.into_parts();
                let members = members.into_iter().map(|m| self.regroup_all(m)).collect();
                self.regroup(Member::operator(operator, members))
            }
            Member::Function(node) => {
                let (function, members) = node.into_parts();
                let members = members.into_iter().map(|m| self.regroup_all(m)).collect();
                Member::function(function, members)
            }
            Member::Block(block) => Member::block(self.regroup_all(block.into_member())),
            other => other,
        }
    }
}

impl Visitor for Reducer<'_> {
    type Output = Member;

    fn visit_value(&mut self, member: &ValueMember) -> Member {
        Member::Value(member.clone())
    }

    fn visit_constant(&mut self, member: &ConstantMember) -> Member {
        Member::Constant(member.clone())
    }

    fn visit_variable(&mut self, member: &VariableMember) -> Member {
        Member::Variable(member.clone())
    }

    fn visit_operator(&mut self, member: &OperatorMember) -> Member {
        let members = self.children(member.members());
        let operator = Arc::clone(member.operator());
        match operator.reduced_member(&members) {
            Some(Reduced::Member(replacement)) => {
                debug!(operator = ?operator, "operator folded");
                self.regroup_all(replacement)
            }
            Some(Reduced::Operands(operands)) => self.regroup_all(Member::operator(operator, operands)),
            None => self.regroup(Member::operator(operator, members)),
        }
    }

    fn visit_function(&mut self, member: &FunctionMember) -> Member {
        let members = self.children(member.members());
        let function = Arc::clone(member.function());
        match function.reduced_member(&members) {
            Some(Reduced::Member(replacement)) => {
                debug!(function = ?function, "function folded");
                self.regroup_all(replacement)
            }
            Some(Reduced::Operands(operands)) => self.regroup_all(Member::function(function, operands)),
            None => Member::function(function, members),
        }
    }

    fn visit_block(&mut self, member: &BlockMember) -> Member {
        member.member().accept(self)
    }
}
