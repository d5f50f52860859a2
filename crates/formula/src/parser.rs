//! Registry and recursive scanning parser.
//!
//! The parser needs no tokenizer. For every (sub)string it tries, in order:
//! a fully wrapping block, a registered constant or variable name, each
//! registered operator in registration order, a function call, and finally
//! a literal. The first operator whose token splits the text at the top
//! nesting level and whose `check` accepts the parsed operands wins, so the
//! operator list doubles as the precedence table: earlier entries bind
//! looser.

use crate::capability::{Constant, Function, Operator, Variable};
use crate::error::{FormatError, SyntaxError};
use crate::format::Formatter;
use crate::member::{same_capability, Member};
use crate::reduce::Reducer;
use crate::syntax::SyntaxConfiguration;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// A registered capability with the spelling it was registered under.
#[derive(Debug)]
struct Entry<T: ?Sized> {
    name: String,
    capability: Arc<T>,
}

impl<T: ?Sized> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Entry {
            name: self.name.clone(),
            capability: Arc::clone(&self.capability),
        }
    }
}

#[derive(Debug, Clone)]
struct OperatorEntry {
    token: String,
    lower: String,
    operator: Arc<dyn Operator>,
}

/// Syntax configuration plus the constant, variable, function and operator
/// registries.
///
/// Build it once, then share it read-only: `parse`, `format` and `reduce`
/// take `&self`.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    syntax: SyntaxConfiguration,
    constants: IndexMap<String, Entry<dyn Constant>>,
    variables: IndexMap<String, Entry<dyn Variable>>,
    functions: IndexMap<String, Entry<dyn Function>>,
    operators: Vec<OperatorEntry>,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Parser {
    /// An empty registry with the default syntax.
    pub fn new() -> Self {
        Parser::default()
    }

    /// A registry holding the built-in constants, operators and functions.
    pub fn with_defaults() -> Self {
        let mut parser = Parser::new();
        crate::variables::register(&mut parser);
        crate::operators::register(&mut parser);
        crate::functions::register(&mut parser);
        parser
    }

    pub fn syntax(&self) -> &SyntaxConfiguration {
        &self.syntax
    }

    pub fn syntax_mut(&mut self) -> &mut SyntaxConfiguration {
        &mut self.syntax
    }

    pub fn set_syntax(&mut self, syntax: SyntaxConfiguration) {
        self.syntax = syntax;
    }

    // ------------------------------------------------------------ Registration

    /// Registers a constant, replacing any previous entry with the same
    /// (case-insensitive) name.
    pub fn add_constant(&mut self, name: &str, constant: Arc<dyn Constant>) {
        self.constants.insert(
            key(name),
            Entry {
                name: name.trim().to_string(),
                capability: constant,
            },
        );
    }

    pub fn add_variable(&mut self, name: &str, variable: Arc<dyn Variable>) {
        self.variables.insert(
            key(name),
            Entry {
                name: name.trim().to_string(),
                capability: variable,
            },
        );
    }

    pub fn add_function(&mut self, name: &str, function: Arc<dyn Function>) {
        self.functions.insert(
            key(name),
            Entry {
                name: name.trim().to_string(),
                capability: function,
            },
        );
    }

    /// Appends an operator. Tokens may repeat; entries are tried in the order
    /// they were added.
    pub fn add_operator(&mut self, token: &str, operator: Arc<dyn Operator>) {
        self.operators.push(OperatorEntry {
            token: token.to_string(),
            lower: token.to_ascii_lowercase(),
            operator,
        });
    }

    pub fn constant(&self, name: &str) -> Option<&Arc<dyn Constant>> {
        self.constants.get(&key(name)).map(|e| &e.capability)
    }

    pub fn variable(&self, name: &str) -> Option<&Arc<dyn Variable>> {
        self.variables.get(&key(name)).map(|e| &e.capability)
    }

    pub fn function(&self, name: &str) -> Option<&Arc<dyn Function>> {
        self.functions.get(&key(name)).map(|e| &e.capability)
    }

    /// Registered operators in precedence order.
    pub fn operators(&self) -> impl Iterator<Item = (&str, &Arc<dyn Operator>)> {
        self.operators.iter().map(|e| (e.token.as_str(), &e.operator))
    }

    // ---------------------------------------------------------- Reverse lookup

    pub fn constant_name(&self, constant: &Arc<dyn Constant>) -> Option<&str> {
        self.constants
            .values()
            .find(|e| same_capability(&e.capability, constant))
            .map(|e| e.name.as_str())
    }

    pub fn variable_name(&self, variable: &Arc<dyn Variable>) -> Option<&str> {
        self.variables
            .values()
            .find(|e| same_capability(&e.capability, variable))
            .map(|e| e.name.as_str())
    }

    pub fn function_name(&self, function: &Arc<dyn Function>) -> Option<&str> {
        self.functions
            .values()
            .find(|e| same_capability(&e.capability, function))
            .map(|e| e.name.as_str())
    }

    pub fn operator_token(&self, operator: &Arc<dyn Operator>) -> Option<&str> {
        self.operator_index(operator).map(|i| self.operators[i].token.as_str())
    }

    /// Position of the operator in the precedence list; lower binds looser.
    pub fn operator_index(&self, operator: &Arc<dyn Operator>) -> Option<usize> {
        self.operators
            .iter()
            .position(|e| same_capability(&e.operator, operator))
    }

    // ------------------------------------------------------------- Entry points

    /// Parses `text` into a typed member tree.
    pub fn parse(&self, text: &str) -> Result<Member, SyntaxError> {
        self.parse_member(text)
    }

    /// Renders a tree back to source text.
    pub fn format(&self, member: &Member) -> Result<String, FormatError> {
        member.accept(&mut Formatter::new(self))
    }

    /// Renders several trees joined by `separator`.
    pub fn format_list(&self, members: &[Member], separator: &str) -> Result<String, FormatError> {
        let parts = members
            .iter()
            .map(|m| self.format(m))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(separator))
    }

    /// Constant-folds a tree.
    pub fn reduce(&self, member: &Member) -> Member {
        member.accept(&mut Reducer::new(self))
    }

    // ------------------------------------------------------------------ Parsing

    fn parse_member(&self, text: &str) -> Result<Member, SyntaxError> {
        let text = text.trim();
        let lower = text.to_ascii_lowercase();
        let syntax = &self.syntax;

        if text.starts_with(syntax.block_open)
            && text.ends_with(syntax.block_close)
            && self.closing_index(text, 0) == Some(text.len() - syntax.block_close.len_utf8())
        {
            let inner = &text[syntax.block_open.len_utf8()..text.len() - syntax.block_close.len_utf8()];
            return Ok(Member::block(self.parse_member(inner)?));
        }

        let name = key(text);
        if let Some(entry) = self.constants.get(&name) {
            return Ok(Member::constant(Arc::clone(&entry.capability)));
        }
        if let Some(entry) = self.variables.get(&name) {
            return Ok(Member::variable(Arc::clone(&entry.capability)));
        }

        let mut failure: Option<SyntaxError> = None;

        for entry in &self.operators {
            if entry.lower.is_empty() {
                continue;
            }
            let fragments = if !entry.operator.is_unary() {
                let fragments = self.split(text, &lower, &entry.lower);
                if fragments.is_empty() {
                    continue;
                }
                fragments
            } else if entry.operator.is_unary_suffix() {
                if !lower.ends_with(&entry.lower) {
                    continue;
                }
                vec![&text[..text.len() - entry.lower.len()]]
            } else {
                if !lower.starts_with(&entry.lower) {
                    continue;
                }
                vec![&text[entry.lower.len()..]]
            };

            match self.parse_all(&fragments) {
                Ok(members) if entry.operator.check(&members) => {
                    debug!(token = %entry.token, operands = members.len(), "operator matched");
                    return Ok(Member::operator(Arc::clone(&entry.operator), members));
                }
                Ok(_) => trace!(token = %entry.token, text, "operator check rejected operands"),
                Err(e) => {
                    trace!(token = %entry.token, fragment = %e.fragment, "operand did not parse");
                    remember(&mut failure, e);
                }
            }
        }

        if let Some(member) = self.parse_function(text, &lower, &mut failure) {
            return Ok(member);
        }

        if let Some(literal) = syntax.parse_literal(text) {
            return Ok(Member::Value(literal));
        }

        Err(failure.unwrap_or_else(|| SyntaxError::new(text)))
    }

    fn parse_function(&self, text: &str, lower: &str, failure: &mut Option<SyntaxError>) -> Option<Member> {
        let syntax = &self.syntax;
        let open = text.find(syntax.function_open)?;
        let entry = self.functions.get(&key(&text[..open]))?;
        if !text.ends_with(syntax.function_close)
            || self.closing_index(text, open) != Some(text.len() - syntax.function_close.len_utf8())
        {
            return None;
        }

        let start = open + syntax.function_open.len_utf8();
        let end = text.len() - syntax.function_close.len_utf8();
        let interior = &text[start..end];
        let fragments = if interior.trim().is_empty() {
            Vec::new()
        } else {
            let separator = syntax.separator.to_string();
            let split = self.split(interior, &lower[start..end], &separator);
            if split.is_empty() {
                vec![interior]
            } else {
                split
            }
        };

        match self.parse_all(&fragments) {
            Ok(members) if entry.capability.check(&members) => {
                debug!(function = %entry.name, arguments = members.len(), "function matched");
                Some(Member::function(Arc::clone(&entry.capability), members))
            }
            Ok(_) => {
                trace!(function = %entry.name, "function check rejected arguments");
                None
            }
            Err(e) => {
                remember(failure, e);
                None
            }
        }
    }

    fn parse_all(&self, fragments: &[&str]) -> Result<Vec<Member>, SyntaxError> {
        fragments.iter().map(|f| self.parse_member(f)).collect()
    }

    /// Splits `text` at every occurrence of `token` outside quotes and at
    /// nesting depth 0. Returns no fragments when the token never occurs
    /// there. `lower` is the ASCII-lower-cased copy of `text` the token is
    /// matched against.
    fn split<'t>(&self, text: &'t str, lower: &str, token: &str) -> Vec<&'t str> {
        let syntax = &self.syntax;
        let mut fragments = Vec::new();
        let mut depth = 0i32;
        let mut quoted = false;
        let mut start = 0;
        let mut i = 0;

        while let Some(c) = text[i..].chars().next() {
            if quoted {
                if c == syntax.string_close {
                    quoted = false;
                }
            } else if c == syntax.string_open {
                quoted = true;
            } else if depth == 0 && lower[i..].starts_with(token) {
                fragments.push(&text[start..i]);
                i += token.len();
                start = i;
                continue;
            } else if c == syntax.block_open || c == syntax.function_open {
                depth += 1;
            } else if c == syntax.block_close || c == syntax.function_close {
                depth -= 1;
            }
            i += c.len_utf8();
        }

        if !fragments.is_empty() {
            fragments.push(&text[start..]);
        }
        fragments
    }

    /// Byte index of the delimiter closing the one opened at `open`.
    fn closing_index(&self, text: &str, open: usize) -> Option<usize> {
        let syntax = &self.syntax;
        let mut depth = 0i32;
        let mut quoted = false;
        for (i, c) in text[open..].char_indices() {
            if quoted {
                if c == syntax.string_close {
                    quoted = false;
                }
            } else if c == syntax.string_open {
                quoted = true;
            } else if c == syntax.block_open || c == syntax.function_open {
                depth += 1;
            } else if c == syntax.block_close || c == syntax.function_close {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
        }
        None
    }
}

/// Keeps the first meaningful fragment failure for error reporting.
fn remember(failure: &mut Option<SyntaxError>, error: SyntaxError) {
    if failure.is_none() && !error.fragment.is_empty() {
        *failure = Some(error);
    }
}
