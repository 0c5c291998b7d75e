//! Declaration parsing implementation
//!
//! Type specifiers (`const`, base type, `*` levels), array declarators,
//! and variable declarations.  A declaration registers its name in the
//! current scope before the initializer is parsed, then the initializer
//! must cast to the declared type.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::ast::Node;
use crate::lexer::Token;
use crate::parser::parse::{ParseError, Parser};
use crate::symtab::SymbolError;
use crate::types::{type_cast, BaseType, CType};

impl Parser {
    /// Parse a type specifier: optional `const`, a base type name, and any
    /// number of `*` levels.
    pub(crate) fn parse_type(&mut self) -> Result<CType, ParseError> {
        let is_mut = !self.match_token(&Token::Const(self.current_span()))?;

        let base = match self.current {
            Token::Int(_) => BaseType::Int,
            Token::Float(_) => BaseType::Float,
            Token::Char(_) => BaseType::Char,
            Token::Void(_) => BaseType::Void,
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a type name",
                    found: self.current.to_string(),
                    span: self.current_span(),
                })
            }
        };
        self.advance()?;

        let mut ctype = CType::new(base, is_mut);
        while self.match_token(&Token::Star(self.current_span()))? {
            ctype.point();
        }
        Ok(ctype)
    }

    /// Parse a full declaration statement:
    /// `type name ([size])* (= initializer)? ;`
    ///
    /// The name enters the symbol table before the initializer is parsed,
    /// matching C declarator scoping.
    pub(crate) fn parse_declare(&mut self) -> Result<(), ParseError> {
        let span = self.current_span();
        let mut ctype = self.parse_type()?;
        let (name, name_span) = self.expect_identifier()?;

        while self.match_token(&Token::LBracket(self.current_span()))? {
            let size = match self.current {
                Token::IntLiteral(n, _) => n as usize,
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "a constant array size",
                        found: self.current.to_string(),
                        span: self.current_span(),
                    })
                }
            };
            self.advance()?;
            ctype
                .array(size)
                .map_err(|_| ParseError::TypeDepthExceeded { span })?;
            self.expect_token(&Token::RBracket(self.current_span()), "']'")?;
        }

        let table = self.ast.scope_table_mut(self.curr);
        table
            .declare(ctype.clone(), &name)
            .map_err(|err| match err {
                SymbolError::Duplicate(name) => ParseError::Redeclaration {
                    name,
                    span: name_span,
                },
                SymbolError::TableFull => ParseError::TooManySymbols { span: name_span },
            })?;

        let init = if self.match_token(&Token::Eq(self.current_span()))? {
            let init_span = self.current_span();
            let init = self.parse_expression(0)?;
            let init_ty = self.expr_ctype(init);
            // same unification rule as assignment: the initializer must
            // share a common type with the declared type
            if type_cast(&ctype, init_ty).is_none() {
                return Err(ParseError::InvalidInitializer {
                    expected: ctype.to_string(),
                    found: init_ty.to_string(),
                    span: init_span,
                });
            }
            Some(init)
        } else {
            None
        };
        self.expect_token(&Token::Semicolon(self.current_span()), "';'")?;

        let node = self.ast.push(Node::declare(ctype, name, init, span));
        self.append(node);
        Ok(())
    }
}
