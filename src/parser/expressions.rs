//! Expression parsing implementation
//!
//! Expressions are parsed by precedence climbing: a minimum-precedence
//! bound threads through the recursive calls to resolve associativity and
//! binding strength.  Every operator is validated against the type model
//! as it is folded — an incompatible operand is a type error, not a parse
//! error, and carries the operator's span.
//!
//! # Precedence (loosest to tightest)
//!
//! ```text
//! 1  =            (right-associative)
//! 2  ||
//! 3  &&
//! 4  == !=
//! 5  < <= > >=
//! 6  + -
//! 7  * / %
//! 8  prefix - ! * &
//!    postfix [ ]
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::ast::{BinOp, Node, NodeId, UnOp};
use crate::lexer::Token;
use crate::parser::parse::{ParseError, Parser};
use crate::types::{binary_compatible, unary_compatible, BaseType, CType};

/// Prefix operators bind tighter than any binary operator.
const PREC_PREFIX: u8 = 8;

/// Binary operator and precedence for a token, if it starts one.
fn binary_op(token: &Token) -> Option<(BinOp, u8)> {
    let pair = match token {
        Token::Eq(_) => (BinOp::Assign, 1),
        Token::OrOr(_) => (BinOp::Or, 2),
        Token::AndAnd(_) => (BinOp::And, 3),
        Token::EqEq(_) => (BinOp::Eq, 4),
        Token::NotEq(_) => (BinOp::Ne, 4),
        Token::Lt(_) => (BinOp::Lt, 5),
        Token::Le(_) => (BinOp::Le, 5),
        Token::Gt(_) => (BinOp::Gt, 5),
        Token::Ge(_) => (BinOp::Ge, 5),
        Token::Plus(_) => (BinOp::Add, 6),
        Token::Minus(_) => (BinOp::Sub, 6),
        Token::Star(_) => (BinOp::Mul, 7),
        Token::Slash(_) => (BinOp::Div, 7),
        Token::Percent(_) => (BinOp::Mod, 7),
        _ => return None,
    };
    Some(pair)
}

impl Parser {
    /// Parse one expression subtree at the given minimum precedence.
    pub(crate) fn parse_expression(&mut self, min_prec: u8) -> Result<NodeId, ParseError> {
        let left = self.parse_prefix()?;
        self.parse_binary(left, min_prec)
    }

    /// Unary prefix operators, recursing at prefix precedence; anything
    /// else falls through to primary + suffix.
    pub(crate) fn parse_prefix(&mut self) -> Result<NodeId, ParseError> {
        let span = self.current_span();
        let op = match self.current {
            Token::Minus(_) => Some(UnOp::Neg),
            Token::Bang(_) => Some(UnOp::Not),
            Token::Star(_) => Some(UnOp::Deref),
            Token::Amp(_) => Some(UnOp::AddrOf),
            _ => None,
        };

        if let Some(op) = op {
            self.advance()?;
            let operand = self.parse_expression(PREC_PREFIX)?;
            let operand_ty = self.expr_ctype(operand).clone();
            let ctype =
                unary_compatible(op, &operand_ty).ok_or_else(|| ParseError::InvalidUnary {
                    op,
                    operand: operand_ty.to_string(),
                    span,
                })?;
            let node = self.ast.push(Node::unary(op, ctype, operand, span));
            return Ok(node);
        }

        let primary = self.parse_primary()?;
        self.parse_suffix(primary)
    }

    /// Literals, parenthesized subexpressions, and identifier references.
    ///
    /// Identifiers must resolve through the scope chain; literals get
    /// their type from the type model here, once, and the node carries it
    /// from then on.
    pub(crate) fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        match self.current.clone() {
            Token::IntLiteral(n, span) => {
                self.advance()?;
                let node = Node::literal(CType::new(BaseType::Int, false), n.to_string(), span);
                Ok(self.ast.push(node))
            }
            Token::FloatLiteral(x, span) => {
                self.advance()?;
                let node = Node::literal(CType::new(BaseType::Float, false), x.to_string(), span);
                Ok(self.ast.push(node))
            }
            Token::CharLiteral(c, span) => {
                self.advance()?;
                let node = Node::literal(CType::new(BaseType::Char, false), c.to_string(), span);
                Ok(self.ast.push(node))
            }
            Token::StringLiteral(s, span) => {
                self.advance()?;
                // A string literal is an immutable char pointer
                let mut ctype = CType::new(BaseType::Char, false);
                ctype.point();
                Ok(self.ast.push(Node::literal(ctype, s, span)))
            }
            Token::Ident(name, span) => {
                self.advance()?;
                let ctype = self
                    .resolve(&name)
                    .cloned()
                    .ok_or_else(|| ParseError::Undeclared {
                        name: name.clone(),
                        span,
                    })?;
                Ok(self.ast.push(Node::variable(ctype, name, span)))
            }
            Token::LParen(_) => {
                self.advance()?;
                let expr = self.parse_expression(0)?;
                self.expect_token(&Token::RParen(self.current_span()), "')'")?;
                Ok(expr)
            }
            other => Err(ParseError::ExpectedExpression {
                found: other.to_string(),
                span: other.span(),
            }),
        }
    }

    /// Postfix indexing applied to an already-parsed left operand.
    pub(crate) fn parse_suffix(&mut self, left: NodeId) -> Result<NodeId, ParseError> {
        let mut expr = left;

        loop {
            let span = self.current_span();
            if !self.match_token(&Token::LBracket(span))? {
                break;
            }

            let index = self.parse_expression(0)?;
            self.expect_token(&Token::RBracket(self.current_span()), "']' after index")?;

            let base_ty = self.expr_ctype(expr).clone();
            let index_ty = self.expr_ctype(index).clone();
            let ctype = binary_compatible(BinOp::Index, &base_ty, &index_ty).ok_or_else(|| {
                ParseError::InvalidBinary {
                    op: BinOp::Index,
                    left: base_ty.to_string(),
                    right: index_ty.to_string(),
                    span,
                }
            })?;

            expr = self
                .ast
                .push(Node::binary(BinOp::Index, ctype, expr, index, span));
        }

        Ok(expr)
    }

    /// Precedence-climbing loop: fold binary operators of precedence ≥
    /// `min_prec` into `left`, parsing each right-hand side at the
    /// operator's own precedence (`+ 1` for left-associativity; assignment
    /// stays at its own level and so nests to the right).
    pub(crate) fn parse_binary(&mut self, left: NodeId, min_prec: u8) -> Result<NodeId, ParseError> {
        let mut left = left;

        loop {
            let (op, prec) = match binary_op(&self.current) {
                Some(pair) if pair.1 >= min_prec => pair,
                _ => break,
            };
            let span = self.current_span();
            self.advance()?;

            let next_min = if op == BinOp::Assign { prec } else { prec + 1 };
            let right = self.parse_expression(next_min)?;

            let left_ty = self.expr_ctype(left).clone();
            let right_ty = self.expr_ctype(right).clone();
            let ctype = binary_compatible(op, &left_ty, &right_ty).ok_or_else(|| {
                if op == BinOp::Assign && !left_ty.is_mut {
                    ParseError::AssignToImmutable {
                        left: left_ty.to_string(),
                        span,
                    }
                } else {
                    ParseError::InvalidBinary {
                        op,
                        left: left_ty.to_string(),
                        right: right_ty.to_string(),
                        span,
                    }
                }
            })?;

            left = self.ast.push(Node::binary(op, ctype, left, right, span));
        }

        Ok(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::parser::parse::Program;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse_program().unwrap()
    }

    /// The initializer expression of the first (sole) declaration.
    fn init_of(program: &Program) -> NodeId {
        let children = program.ast.children(program.root);
        match &program.ast.node(*children.last().unwrap()).kind {
            NodeKind::Declare { init, .. } => init.unwrap(),
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_mul_binds_tighter() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let program = parse("int x = 1 + 2 * 3;");
        let root = init_of(&program);

        match &program.ast.node(root).kind {
            NodeKind::Binary {
                op: BinOp::Add,
                right,
                ..
            } => {
                assert!(matches!(
                    &program.ast.node(*right).kind,
                    NodeKind::Binary { op: BinOp::Mul, .. }
                ));
            }
            other => panic!("expected add at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        // 10 - 4 - 3 parses as (10 - 4) - 3
        let program = parse("int x = 10 - 4 - 3;");
        let root = init_of(&program);

        match &program.ast.node(root).kind {
            NodeKind::Binary {
                op: BinOp::Sub,
                left,
                right,
                ..
            } => {
                assert!(matches!(
                    &program.ast.node(*left).kind,
                    NodeKind::Binary { op: BinOp::Sub, .. }
                ));
                assert!(matches!(
                    &program.ast.node(*right).kind,
                    NodeKind::Literal { value, .. } if value == "3"
                ));
            }
            other => panic!("expected sub at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        // a = b = 1 parses as a = (b = 1)
        let program = parse("int a; int b; int x = (a = b = 1);");
        let root = init_of(&program);

        match &program.ast.node(root).kind {
            NodeKind::Binary {
                op: BinOp::Assign,
                left,
                right,
                ..
            } => {
                assert!(matches!(
                    &program.ast.node(*left).kind,
                    NodeKind::Variable { name, .. } if name == "a"
                ));
                assert!(matches!(
                    &program.ast.node(*right).kind,
                    NodeKind::Binary {
                        op: BinOp::Assign,
                        ..
                    }
                ));
            }
            other => panic!("expected assignment at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        // (1 + 2) * 3 keeps the add below the mul
        let program = parse("int x = (1 + 2) * 3;");
        let root = init_of(&program);

        match &program.ast.node(root).kind {
            NodeKind::Binary {
                op: BinOp::Mul,
                left,
                ..
            } => {
                assert!(matches!(
                    &program.ast.node(*left).kind,
                    NodeKind::Binary { op: BinOp::Add, .. }
                ));
            }
            other => panic!("expected mul at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_widening_in_binary_expression() {
        let program = parse("float f = 1 + 2.5;");
        let root = init_of(&program);
        let ctype = program.ast.node(root).ctype().unwrap();
        assert_eq!(ctype.base, BaseType::Float);
    }

    #[test]
    fn test_prefix_binds_tighter_than_binary() {
        // -1 + 2 parses as (-1) + 2
        let program = parse("int x = -1 + 2;");
        let root = init_of(&program);

        match &program.ast.node(root).kind {
            NodeKind::Binary {
                op: BinOp::Add,
                left,
                ..
            } => {
                assert!(matches!(
                    &program.ast.node(*left).kind,
                    NodeKind::Unary { op: UnOp::Neg, .. }
                ));
            }
            other => panic!("expected add at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_address_of_then_deref() {
        let program = parse("int x; int y = *(&x);");
        let root = init_of(&program);

        match &program.ast.node(root).kind {
            NodeKind::Unary {
                op: UnOp::Deref,
                ctype,
                operand,
            } => {
                assert_eq!(ctype.ptr, 0);
                assert_eq!(ctype.base, BaseType::Int);
                assert!(matches!(
                    &program.ast.node(*operand).kind,
                    NodeKind::Unary {
                        op: UnOp::AddrOf,
                        ..
                    }
                ));
            }
            other => panic!("expected deref at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_indexing_suffix() {
        let program = parse("int a[4]; int x = a[2];");
        let root = init_of(&program);

        match &program.ast.node(root).kind {
            NodeKind::Binary {
                op: BinOp::Index,
                ctype,
                left,
                ..
            } => {
                assert!(ctype.dims.is_empty());
                assert_eq!(ctype.base, BaseType::Int);
                assert!(matches!(
                    &program.ast.node(*left).kind,
                    NodeKind::Variable { name, .. } if name == "a"
                ));
            }
            other => panic!("expected index node, got {:?}", other),
        }
    }

    #[test]
    fn test_indexing_non_array_fails() {
        let err = Parser::new("int x; int y = x[0];")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidBinary {
                op: BinOp::Index,
                ..
            }
        ));
    }

    #[test]
    fn test_logical_operators_yield_int() {
        let program = parse("int x = 1 < 2 && 3 != 4;");
        let root = init_of(&program);
        let ctype = program.ast.node(root).ctype().unwrap();
        assert_eq!(ctype.base, BaseType::Int);

        match &program.ast.node(root).kind {
            NodeKind::Binary { op: BinOp::And, .. } => {}
            other => panic!("expected && at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_operand() {
        let err = Parser::new("int x = 1 + ;")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(matches!(err, ParseError::ExpectedExpression { .. }));
    }
}
