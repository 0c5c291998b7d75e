//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing
//! infrastructure: error types, token helpers, the scope stack, label
//! numbering, and the [`Parser::parse_program`] entry point.
//!
//! # Parser Architecture
//!
//! The Parser pulls one token at a time from the lexer and dispatches to
//! the statement, declaration, and expression parsers implemented in the
//! sibling modules.  Structured control flow never reaches the AST: `if`,
//! `while`, and `for` are rewritten into label/jump sequences as they are
//! parsed.

use crate::ast::{Ast, BinOp, Node, NodeId, UnOp};
use crate::lexer::{LexError, Lexer, Span, Token};
use crate::symtab::MAX_SYMBOLS;
use crate::types::{CType, MAX_TYPE_DEPTH};
use thiserror::Error;

/// Everything that can go wrong while parsing: lexical errors forwarded
/// from the lexer, syntax errors, type errors, and scoping errors.  The
/// first error aborts the parse — later tokens cannot be trusted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        span: Span,
    },

    #[error("expected expression, found {found} at {span}")]
    ExpectedExpression { found: String, span: Span },

    #[error("operator '{op}' cannot be applied to '{operand}' at {span}")]
    InvalidUnary {
        op: UnOp,
        operand: String,
        span: Span,
    },

    #[error("operator '{op}' cannot be applied to '{left}' and '{right}' at {span}")]
    InvalidBinary {
        op: BinOp,
        left: String,
        right: String,
        span: Span,
    },

    #[error("cannot assign to immutable value of type '{left}' at {span}")]
    AssignToImmutable { left: String, span: Span },

    #[error("condition has non-scalar type '{found}' at {span}")]
    InvalidCondition { found: String, span: Span },

    #[error("initializer of type '{found}' does not match declared type '{expected}' at {span}")]
    InvalidInitializer {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("array nesting exceeds {max} dimensions at {span}", max = MAX_TYPE_DEPTH)]
    TypeDepthExceeded { span: Span },

    #[error("use of undeclared identifier '{name}' at {span}")]
    Undeclared { name: String, span: Span },

    #[error("redeclaration of '{name}' at {span}")]
    Redeclaration { name: String, span: Span },

    #[error("too many symbols in one scope (limit {max}) at {span}", max = MAX_SYMBOLS)]
    TooManySymbols { span: Span },
}

/// A fully parsed, type-checked, lowered program: the node arena plus the
/// id of the root scope.  Label and jump targets are opaque names unique
/// within this compilation unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub ast: Ast,
    pub root: NodeId,
}

/// Recursive descent parser for the C subset
pub struct Parser {
    lexer: Lexer,
    pub(crate) current: Token,
    pub(crate) ast: Ast,
    /// Innermost open scope — the top of the scope stack
    pub(crate) curr: NodeId,
    /// Label numbering counter for synthesized jump targets
    number: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        let mut ast = Ast::new();
        let root = ast.push(Node::scope(None, Span::new(1, 1)));
        Ok(Self {
            lexer,
            current,
            ast,
            curr: root,
            number: 0,
        })
    }

    /// Parse the entire program into a single root scope.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let root = self.curr;
        self.parse_statements()?;

        // parse_statements stops at '}' or end of input; anything left
        // over here (e.g. a stray '}') is a syntax error
        if !self.is_at_end() {
            return Err(ParseError::UnexpectedToken {
                expected: "end of input",
                found: self.current.to_string(),
                span: self.current_span(),
            });
        }

        Ok(Program {
            ast: self.ast,
            root,
        })
    }

    // ===== Token helpers =====

    /// Pull the next token from the lexer.
    pub(crate) fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.current) == std::mem::discriminant(token)
    }

    /// If the current token matches `token`, consume it and return true;
    /// otherwise return false without raising an error — a mismatch may be
    /// a legitimate grammar branch point.
    pub(crate) fn match_token(&mut self, token: &Token) -> Result<bool, ParseError> {
        if self.check(token) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume a mandatory token or fail with expected-vs-actual.
    pub(crate) fn expect_token(
        &mut self,
        token: &Token,
        expected: &'static str,
    ) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance()
        } else {
            Err(ParseError::UnexpectedToken {
                expected,
                found: self.current.to_string(),
                span: self.current_span(),
            })
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<(String, Span), ParseError> {
        if let Token::Ident(name, span) = self.current.clone() {
            self.advance()?;
            Ok((name, span))
        } else {
            Err(ParseError::UnexpectedToken {
                expected: "an identifier",
                found: self.current.to_string(),
                span: self.current_span(),
            })
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current.span()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current, Token::Eof(_))
    }

    // ===== Scope stack =====

    /// Open a new scope: the node is appended to the current scope's
    /// statements and becomes the innermost scope.
    pub(crate) fn enter(&mut self, span: Span) -> NodeId {
        let scope = self.ast.push(Node::scope(Some(self.curr), span));
        self.ast.append_child(self.curr, scope);
        self.curr = scope;
        scope
    }

    /// Close the innermost scope, restoring its enclosing scope.  Paired
    /// with [`enter`](Parser::enter) by every block construct.
    pub(crate) fn leave(&mut self) {
        if let Some(parent) = self.ast.scope_parent(self.curr) {
            self.curr = parent;
        }
    }

    /// Append an existing node as the next statement of the current scope.
    pub(crate) fn append(&mut self, node: NodeId) {
        self.ast.append_child(self.curr, node);
    }

    /// Resolve an identifier by walking the scope chain outward.  Only
    /// names whose declarations have already been parsed are visible.
    pub(crate) fn resolve(&self, name: &str) -> Option<&CType> {
        let mut scope = Some(self.curr);
        while let Some(id) = scope {
            let table = self.ast.scope_table(id);
            if let Some(idx) = table.lookup(name) {
                return Some(&table.get(idx).ctype);
            }
            scope = self.ast.scope_parent(id);
        }
        None
    }

    /// Synthesize a fresh, unique label name.
    pub(crate) fn next_label(&mut self) -> String {
        let n = self.number;
        self.number += 1;
        format!("L{}", n)
    }

    /// Result type of an already-parsed expression node.
    pub(crate) fn expr_ctype(&self, id: NodeId) -> &CType {
        match self.ast.node(id).ctype() {
            Some(ctype) => ctype,
            None => unreachable!("expression parsers only produce typed nodes"),
        }
    }

    pub(crate) fn is_type_keyword(&self) -> bool {
        matches!(
            self.current,
            Token::Int(_) | Token::Float(_) | Token::Char(_) | Token::Void(_) | Token::Const(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::types::BaseType;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source)?.parse_program()
    }

    #[test]
    fn test_parse_simple_declaration() {
        let program = parse("int x = 1 + 2;").unwrap();
        let children = program.ast.children(program.root);
        assert_eq!(children.len(), 1);

        match &program.ast.node(children[0]).kind {
            NodeKind::Declare { ctype, name, init } => {
                assert_eq!(name, "x");
                assert_eq!(ctype.base, BaseType::Int);
                assert!(ctype.is_mut);

                let init = init.expect("initializer subtree");
                match &program.ast.node(init).kind {
                    NodeKind::Binary {
                        op, left, right, ..
                    } => {
                        assert_eq!(*op, BinOp::Add);
                        assert!(matches!(
                            &program.ast.node(*left).kind,
                            NodeKind::Literal { value, .. } if value == "1"
                        ));
                        assert!(matches!(
                            &program.ast.node(*right).kind,
                            NodeKind::Literal { value, .. } if value == "2"
                        ));
                    }
                    other => panic!("expected binary add initializer, got {:?}", other),
                }
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_identifier() {
        let err = parse("x = 1;").unwrap_err();
        assert!(matches!(err, ParseError::Undeclared { name, .. } if name == "x"));
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        let err = parse("int x; float x;").unwrap_err();
        assert!(matches!(err, ParseError::Redeclaration { name, .. } if name == "x"));
    }

    #[test]
    fn test_use_before_declaration_fails() {
        let err = parse("x = 1; int x;").unwrap_err();
        assert!(matches!(err, ParseError::Undeclared { name, .. } if name == "x"));
    }

    #[test]
    fn test_outer_scope_visible_from_inner() {
        parse("int x; { x = 2; }").unwrap();
    }

    #[test]
    fn test_inner_scope_not_visible_after_leave() {
        let err = parse("{ int x; } x = 1;").unwrap_err();
        assert!(matches!(err, ParseError::Undeclared { name, .. } if name == "x"));
    }

    #[test]
    fn test_shadowing_in_inner_scope_allowed() {
        parse("int x; { float x; x = 1.5; }").unwrap();
    }

    #[test]
    fn test_stray_closing_brace() {
        let err = parse("int x; }").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: "end of input",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_semicolon_is_syntax_error() {
        let err = parse("int x = 1").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_lexical_error_is_distinct() {
        let err = parse("int x = \"abc;").unwrap_err();
        assert!(matches!(err, ParseError::Lex(_)));
    }

    #[test]
    fn test_deref_of_non_pointer_is_type_error() {
        let err = parse("int x; *x = 5;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidUnary {
                op: UnOp::Deref,
                ..
            }
        ));
    }

    #[test]
    fn test_assignment_to_const() {
        let err = parse("const int x = 1; x = 2;").unwrap_err();
        assert!(matches!(err, ParseError::AssignToImmutable { .. }));
    }

    #[test]
    fn test_incompatible_operands() {
        let err = parse("int x; int *p = &x; float f; f = p + f;").unwrap_err();
        assert!(matches!(err, ParseError::InvalidBinary { .. }));
    }

    #[test]
    fn test_error_spans_point_at_the_problem() {
        let err = parse("int x;\n  y = 1;").unwrap_err();
        match err {
            ParseError::Undeclared { span, .. } => {
                assert_eq!(span, Span::new(2, 3));
            }
            other => panic!("expected undeclared error, got {:?}", other),
        }
    }
}
