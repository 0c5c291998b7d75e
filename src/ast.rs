//! AST definitions for the lowered program form
//!
//! Nodes live in an [`Ast`] arena and reference each other by [`NodeId`],
//! so the scope chain (`prt` links) is plain indices rather than owning
//! pointers.  Ownership is the arena's alone; back-references never drive
//! destruction.
//!
//! There are no structured control-flow kinds: `if`, `while`, and `for`
//! are lowered at parse time into [`NodeKind::Label`], [`NodeKind::Jump`],
//! and [`NodeKind::JumpFalse`] sequences.

use crate::lexer::Span;
use crate::symtab::SymbolTable;
use crate::types::CType;
use std::fmt;

/// Unique identifier for AST nodes: an index into the [`Ast`] arena
pub type NodeId = usize;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Assign,
    // Logical
    Or,
    And,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Postfix indexing
    Index,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinOp::Assign => "=",
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Index => "[]",
        };
        write!(f, "{}", text)
    }
}

/// Unary prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Not,    // !x
    Deref,  // *x
    AddrOf, // &x
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::Deref => "*",
            UnOp::AddrOf => "&",
        };
        write!(f, "{}", text)
    }
}

/// One AST node: a kind plus the source span it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Node payloads, one variant per kind.
///
/// Expression kinds carry the already-resolved result [`CType`] — the type
/// model validates operators during parsing; nodes never re-derive types.
/// Only [`NodeKind::Scope`] owns a [`SymbolTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Literal constant; `value` is its canonical text
    Literal { ctype: CType, value: String },

    /// Resolved reference to a declared variable
    Variable { ctype: CType, name: String },

    /// Unary expression
    Unary {
        op: UnOp,
        ctype: CType,
        operand: NodeId,
    },

    /// Binary expression
    Binary {
        op: BinOp,
        ctype: CType,
        left: NodeId,
        right: NodeId,
    },

    /// Variable declaration with optional initializer expression
    Declare {
        ctype: CType,
        name: String,
        init: Option<NodeId>,
    },

    /// Named anchor for lowered control flow
    Label { name: String },

    /// Unconditional transfer to a label
    Jump { target: String },

    /// Transfer to a label taken when `condition` evaluates *false*
    JumpFalse { condition: NodeId, target: String },

    /// Lexical scope: owns its symbol table, links to the enclosing scope
    /// by arena index, and lists its statements in order
    Scope {
        table: SymbolTable,
        prt: Option<NodeId>,
        children: Vec<NodeId>,
    },
}

impl Node {
    pub fn literal(ctype: CType, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind: NodeKind::Literal {
                ctype,
                value: value.into(),
            },
            span,
        }
    }

    pub fn variable(ctype: CType, name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: NodeKind::Variable {
                ctype,
                name: name.into(),
            },
            span,
        }
    }

    pub fn unary(op: UnOp, ctype: CType, operand: NodeId, span: Span) -> Self {
        Self {
            kind: NodeKind::Unary { op, ctype, operand },
            span,
        }
    }

    pub fn binary(op: BinOp, ctype: CType, left: NodeId, right: NodeId, span: Span) -> Self {
        Self {
            kind: NodeKind::Binary {
                op,
                ctype,
                left,
                right,
            },
            span,
        }
    }

    pub fn declare(ctype: CType, name: impl Into<String>, init: Option<NodeId>, span: Span) -> Self {
        Self {
            kind: NodeKind::Declare {
                ctype,
                name: name.into(),
                init,
            },
            span,
        }
    }

    pub fn label(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: NodeKind::Label { name: name.into() },
            span,
        }
    }

    pub fn jump(target: impl Into<String>, span: Span) -> Self {
        Self {
            kind: NodeKind::Jump {
                target: target.into(),
            },
            span,
        }
    }

    pub fn jump_false(condition: NodeId, target: impl Into<String>, span: Span) -> Self {
        Self {
            kind: NodeKind::JumpFalse {
                condition,
                target: target.into(),
            },
            span,
        }
    }

    /// Open a fresh scope with an empty symbol table, linked to its
    /// enclosing scope (`None` only for the program root).
    pub fn scope(prt: Option<NodeId>, span: Span) -> Self {
        Self {
            kind: NodeKind::Scope {
                table: SymbolTable::new(),
                prt,
                children: Vec::new(),
            },
            span,
        }
    }

    /// The expression result type, for expression-kind nodes only.
    pub fn ctype(&self) -> Option<&CType> {
        match &self.kind {
            NodeKind::Literal { ctype, .. }
            | NodeKind::Variable { ctype, .. }
            | NodeKind::Unary { ctype, .. }
            | NodeKind::Binary { ctype, .. } => Some(ctype),
            _ => None,
        }
    }
}

/// Arena of AST nodes.  Node 0 is conventionally the program root scope.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its id.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Statement list of a scope node.
    ///
    /// # Panics
    /// Panics if `scope` is not a [`NodeKind::Scope`].
    pub fn children(&self, scope: NodeId) -> &[NodeId] {
        match &self.nodes[scope].kind {
            NodeKind::Scope { children, .. } => children,
            other => panic!("expected scope node, found {:?}", other),
        }
    }

    /// Symbol table of a scope node.
    ///
    /// # Panics
    /// Panics if `scope` is not a [`NodeKind::Scope`].
    pub fn scope_table(&self, scope: NodeId) -> &SymbolTable {
        match &self.nodes[scope].kind {
            NodeKind::Scope { table, .. } => table,
            other => panic!("expected scope node, found {:?}", other),
        }
    }

    /// Mutable symbol table of a scope node.
    ///
    /// # Panics
    /// Panics if `scope` is not a [`NodeKind::Scope`].
    pub fn scope_table_mut(&mut self, scope: NodeId) -> &mut SymbolTable {
        match &mut self.nodes[scope].kind {
            NodeKind::Scope { table, .. } => table,
            other => panic!("expected scope node, found {:?}", other),
        }
    }

    /// Enclosing scope of a scope node (`None` at the program root).
    ///
    /// # Panics
    /// Panics if `scope` is not a [`NodeKind::Scope`].
    pub fn scope_parent(&self, scope: NodeId) -> Option<NodeId> {
        match &self.nodes[scope].kind {
            NodeKind::Scope { prt, .. } => *prt,
            other => panic!("expected scope node, found {:?}", other),
        }
    }

    /// Append a statement to a scope's child list.
    ///
    /// # Panics
    /// Panics if `scope` is not a [`NodeKind::Scope`].
    pub fn append_child(&mut self, scope: NodeId, child: NodeId) {
        match &mut self.nodes[scope].kind {
            NodeKind::Scope { children, .. } => children.push(child),
            other => panic!("expected scope node, found {:?}", other),
        }
    }
}
