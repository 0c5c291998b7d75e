//! Statement parsing implementation
//!
//! Statement dispatch, block scoping, and control-flow lowering.  `if`,
//! `while`, and `for` never produce structured nodes: each construct is
//! rewritten into label/jump statements appended to the current scope as
//! it is parsed.
//!
//! # Lowering shapes
//!
//! ```text
//! if (c) B               jump_false c -> L0; B; label L0
//! if (c) B1 else B2      jump_false c -> L0; B1; jump L1; label L0; B2; label L1
//! while (c) B            label L0; jump_false c -> L1; B; jump L0; label L1
//! for (i; c; s) B        scope { i; label L0; jump_false c -> L1; B; s; jump L0; label L1 }
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::ast::{Node, NodeId};
use crate::lexer::{Span, Token};
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse statements until a closing '}' or end of input.  The caller
    /// owns the surrounding scope and consumes the brace itself.
    pub(crate) fn parse_statements(&mut self) -> Result<(), ParseError> {
        while !self.is_at_end() && !self.check(&Token::RBrace(self.current_span())) {
            self.parse_statement()?;
        }
        Ok(())
    }

    /// Parse one statement and append its lowered form to the current
    /// scope.
    pub(crate) fn parse_statement(&mut self) -> Result<(), ParseError> {
        let span = self.current_span();

        if self.is_type_keyword() {
            return self.parse_declare();
        }
        if self.match_token(&Token::If(span))? {
            return self.parse_if(span);
        }
        if self.match_token(&Token::While(span))? {
            return self.parse_while(span);
        }
        if self.match_token(&Token::For(span))? {
            return self.parse_for(span);
        }
        if self.match_token(&Token::LBrace(span))? {
            self.enter(span);
            self.parse_statements()?;
            self.expect_token(&Token::RBrace(self.current_span()), "'}'")?;
            self.leave();
            return Ok(());
        }
        // empty statement
        if self.match_token(&Token::Semicolon(span))? {
            return Ok(());
        }

        let expr = self.parse_expression(0)?;
        self.expect_token(&Token::Semicolon(self.current_span()), "';'")?;
        self.append(expr);
        Ok(())
    }

    /// Parse a condition expression and require a truthy (scalar) type.
    fn parse_condition(&mut self) -> Result<NodeId, ParseError> {
        let span = self.current_span();
        let cond = self.parse_expression(0)?;
        let ctype = self.expr_ctype(cond);
        if !ctype.is_truthy() {
            return Err(ParseError::InvalidCondition {
                found: ctype.to_string(),
                span,
            });
        }
        Ok(cond)
    }

    /// The body of a control-flow construct: a braced block gets its own
    /// scope, a lone statement does not.
    fn parse_body(&mut self) -> Result<(), ParseError> {
        let span = self.current_span();
        if self.match_token(&Token::LBrace(span))? {
            self.enter(span);
            self.parse_statements()?;
            self.expect_token(&Token::RBrace(self.current_span()), "'}'")?;
            self.leave();
            Ok(())
        } else {
            self.parse_statement()
        }
    }

    /// `if (c) B` lowers to `jump_false c -> else; B; label else`, with the
    /// else branch splicing in before the final label when present.
    fn parse_if(&mut self, span: Span) -> Result<(), ParseError> {
        self.expect_token(&Token::LParen(self.current_span()), "'(' after 'if'")?;
        let cond = self.parse_condition()?;
        self.expect_token(&Token::RParen(self.current_span()), "')' after condition")?;

        let else_label = self.next_label();
        let jump = self.ast.push(Node::jump_false(cond, else_label.clone(), span));
        self.append(jump);

        self.parse_body()?;

        let else_span = self.current_span();
        if self.match_token(&Token::Else(else_span))? {
            self.parse_else(else_label, else_span)
        } else {
            let label = self.ast.push(Node::label(else_label, span));
            self.append(label);
            Ok(())
        }
    }

    /// The else branch: the then-arm jumps over it to a fresh end label,
    /// and `else_label` anchors the branch itself.
    fn parse_else(&mut self, else_label: String, span: Span) -> Result<(), ParseError> {
        let end_label = self.next_label();

        let jump = self.ast.push(Node::jump(end_label.clone(), span));
        self.append(jump);
        let label = self.ast.push(Node::label(else_label, span));
        self.append(label);

        self.parse_body()?;

        let end = self.ast.push(Node::label(end_label, span));
        self.append(end);
        Ok(())
    }

    /// `while (c) B` lowers to
    /// `label head; jump_false c -> end; B; jump head; label end`.
    fn parse_while(&mut self, span: Span) -> Result<(), ParseError> {
        let head_label = self.next_label();
        let end_label = self.next_label();

        let head = self.ast.push(Node::label(head_label.clone(), span));
        self.append(head);

        self.expect_token(&Token::LParen(self.current_span()), "'(' after 'while'")?;
        let cond = self.parse_condition()?;
        self.expect_token(&Token::RParen(self.current_span()), "')' after condition")?;

        let jump = self.ast.push(Node::jump_false(cond, end_label.clone(), span));
        self.append(jump);

        self.parse_body()?;

        let back = self.ast.push(Node::jump(head_label, span));
        self.append(back);
        let end = self.ast.push(Node::label(end_label, span));
        self.append(end);
        Ok(())
    }

    /// `for (init; cond; step) B` desugars to a while loop inside a scope
    /// of its own, so an init declaration is only visible to the loop.
    /// The step expression is parsed in header order but appended after
    /// the body.
    fn parse_for(&mut self, span: Span) -> Result<(), ParseError> {
        self.expect_token(&Token::LParen(self.current_span()), "'(' after 'for'")?;
        self.enter(span);

        // init clause: empty, declaration, or expression
        if !self.match_token(&Token::Semicolon(self.current_span()))? {
            if self.is_type_keyword() {
                self.parse_declare()?;
            } else {
                let init = self.parse_expression(0)?;
                self.expect_token(&Token::Semicolon(self.current_span()), "';'")?;
                self.append(init);
            }
        }

        let head_label = self.next_label();
        let end_label = self.next_label();

        let head = self.ast.push(Node::label(head_label.clone(), span));
        self.append(head);

        // condition clause: absent means always true, no test is emitted
        if !self.check(&Token::Semicolon(self.current_span())) {
            let cond = self.parse_condition()?;
            let jump = self.ast.push(Node::jump_false(cond, end_label.clone(), span));
            self.append(jump);
        }
        self.expect_token(&Token::Semicolon(self.current_span()), "';'")?;

        // step clause, held back until after the body
        let step = if self.check(&Token::RParen(self.current_span())) {
            None
        } else {
            Some(self.parse_expression(0)?)
        };
        self.expect_token(&Token::RParen(self.current_span()), "')'")?;

        self.parse_body()?;

        if let Some(step) = step {
            self.append(step);
        }
        let back = self.ast.push(Node::jump(head_label, span));
        self.append(back);
        let end = self.ast.push(Node::label(end_label, span));
        self.append(end);

        self.leave();
        Ok(())
    }
}
