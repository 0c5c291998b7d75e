//! # Introduction
//!
//! lowc is a front end for a subset of C that lowers structured control
//! flow while it parses: `if`, `while`, and `for` never appear in the
//! output, only labels and conditional/unconditional jumps, so the result
//! is ready for a linear code generator or interpreter loop.
//!
//! ## Parsing pipeline
//!
//! ```text
//! Source → Lexer → Parser (type checking + lowering) → AST
//! ```
//!
//! 1. [`lexer`] — hand-written character-level lexer producing one
//!    [`lexer::Token`] at a time, each carrying its source [`lexer::Span`].
//! 2. [`types`] — the structural type model: [`types::CType`] plus the
//!    compatibility and widening queries every operator is checked against.
//! 3. [`symtab`] — per-scope [`symtab::SymbolTable`] mapping names to
//!    declared types.
//! 4. [`ast`] — the arena-based lowered AST; scopes link to their parents
//!    by index and statements are flat label/jump sequences.
//! 5. [`parser`] — recursive descent with precedence climbing; validates
//!    types at every operator and emits the lowered form directly.
//!
//! ## Supported C subset
//!
//! Types: `int`, `float`, `char`, `void`, `const`, pointers, fixed-size
//! arrays.  Control flow: `if/else`, `while`, `for`.  Expressions:
//! arithmetic, comparison, logical, assignment, indexing, dereference,
//! and address-of, with char → int → float widening.
//!
//! ## Example
//!
//! ```
//! use lowc::parser::Parser;
//!
//! let program = Parser::new("int x = 0; while (x < 10) x = x + 1;")
//!     .and_then(|p| p.parse_program())
//!     .unwrap();
//! assert!(!program.ast.is_empty());
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod symtab;
pub mod types;
