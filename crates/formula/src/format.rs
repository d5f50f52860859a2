//! Renders member trees back to source text.

use crate::error::FormatError;
use crate::member::{
    BlockMember, ConstantMember, FunctionMember, Member, OperatorMember, ValueMember, VariableMember,
};
use crate::parser::Parser;
use crate::visitor::Visitor;

/// Formats a tree with the parser's syntax and reverse name lookups.
///
/// Operands of n-ary operators are joined by the trimmed token with a space
/// on each side, unary operators
/// are glued to their operand and function arguments are separated by the
/// configured separator and a space.
pub struct Formatter<'p> {
    parser: &'p Parser,
}

impl<'p> Formatter<'p> {
    pub fn new(parser: &'p Parser) -> Self {
        Formatter { parser }
    }

    /// Formats an operator operand. Text that starts with a prefix operator
    /// token is grouped so it reads back as one operand: a negative literal
    /// anywhere, a prefix operator only under an n-ary parent, where
    /// `x - 2 * -y` would otherwise split on the inner token.
    fn operand(&mut self, member: &Member, nary: bool) -> Result<String, FormatError> {
        let text = member.accept(self)?;
        let groupable = match member {
            Member::Value(_) => true,
            Member::Operator(_) => nary,
            _ => false,
        };
        if groupable && self.starts_with_prefix_token(&text) {
            return Ok(self.group(&text));
        }
        Ok(text)
    }

    fn starts_with_prefix_token(&self, text: &str) -> bool {
        let lower = text.to_ascii_lowercase();
        self.parser.operators().any(|(token, op)| {
            op.is_unary() && !op.is_unary_suffix() && !token.is_empty() && lower.starts_with(&token.to_ascii_lowercase())
        })
    }

    fn group(&self, text: &str) -> String {
        let syntax = self.parser.syntax();
        let mut out = String::with_capacity(text.len() + 2);
        out.push(syntax.block_open);
        out.push_str(text);
        out.push(syntax.block_close);
        out
    }
}

impl Visitor for Formatter<'_> {
    type Output = Result<String, FormatError>;

    fn visit_value(&mut self, member: &ValueMember) -> Self::Output {
        self.parser
            .syntax()
            .format_literal(member.value(), member.get_type())
    }

    fn visit_constant(&mut self, member: &ConstantMember) -> Self::Output {
        self.parser
            .constant_name(member.constant())
            .map(str::to_string)
            .ok_or_else(|| FormatError::Unregistered {
                kind: "constant",
                detail: format!("{:?}", member.constant()),
            })
    }

    fn visit_variable(&mut self, member: &VariableMember) -> Self::Output {
        self.parser
            .variable_name(member.variable())
            .map(str::to_string)
            .ok_or_else(|| FormatError::Unregistered {
                kind: "variable",
                detail: format!("{:?}", member.variable()),
            })
    }

    fn visit_operator(&mut self, member: &OperatorMember) -> Self::Output {
        let operator = member.operator();
        let token = self
            .parser
            .operator_token(operator)
            .ok_or_else(|| FormatError::Unregistered {
                kind: "operator",
                detail: format!("{operator:?}"),
            })?
            .to_string();
        let operands = member
            .members()
            .iter()
            .map(|m| self.operand(m, !operator.is_unary()))
            .collect::<Result<Vec<_>, _>>()?;

        if operator.is_unary() {
            let operand = operands.concat();
            return Ok(if operator.is_unary_suffix() {
                operand + &token
            } else {
                token + &operand
            });
        }
        Ok(operands.join(&format!(" {} ", token.trim())))
    }

    fn visit_function(&mut self, member: &FunctionMember) -> Self::Output {
        let function = member.function();
        let name = self
            .parser
            .function_name(function)
            .ok_or_else(|| FormatError::Unregistered {
                kind: "function",
                detail: format!("{function:?}"),
            })?
            .to_string();
        let syntax = self.parser.syntax();
        let arguments = member
            .members()
            .iter()
            .map(|m| m.accept(self))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = name;
        out.push(syntax.function_open);
        out.push_str(&arguments.join(&format!("{} ", syntax.separator)));
        out.push(syntax.function_close);
        Ok(out)
    }

    fn visit_block(&mut self, member: &BlockMember) -> Self::Output {
        let inner = member.member().accept(self)?;
        Ok(self.group(&inner))
    }
}

#[cfg(test)]
mod tests {
    use crate::Parser;
    use pretty_assertions::assert_eq;

    fn round(text: &str) -> String {
        let parser = Parser::with_defaults();
        let member = parser.parse(text).unwrap();
        parser.format(&member).unwrap()
    }

    #[test]
    fn infix_operators_are_spaced() {
        assert_eq!(round("1+2*3"), "1 + 2 * 3");
        assert_eq!(round("1+2+3"), "1 + 2 + 3");
    }

    #[test]
    fn blocks_keep_their_delimiters() {
        assert_eq!(round("(1+2)*3"), "(1 + 2) * 3");
        assert_eq!(round("((1))"), "((1))");
    }

    #[test]
    fn unary_operators_are_glued() {
        assert_eq!(round("- 4"), "-4");
        assert_eq!(round("4 ²"), "4²");
        assert_eq!(round("!true"), "!true");
    }

    #[test]
    fn prefix_operands_are_grouped() {
        assert_eq!(round("2 * -4"), "2 * (-4)");
        assert_eq!(round("1 - 2 * (-4)"), "1 - 2 * (-4)");
        let parser = Parser::with_defaults();
        let member = parser.parse("2 * (-3)").unwrap();
        assert_eq!(parser.format(&parser.reduce(&member)).unwrap(), "-6");
        assert_eq!(round("--4"), "--4");
        assert_eq!(round("true & !false"), "true & (!false)");
    }

    #[test]
    fn functions_use_registered_spelling() {
        assert_eq!(round("if(true,1,2)"), "If(true, 1, 2)");
        assert_eq!(round("NOW()"), "Now()");
    }

    #[test]
    fn literals() {
        assert_eq!(round("\"a\"+\"b\""), "\"a\" + \"b\"");
        assert_eq!(round("NULL"), "null");
        assert_eq!(round("1.50"), "1.5");
    }
}
