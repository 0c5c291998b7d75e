//! Recursive descent parser with parse-time control-flow lowering
//!
//! The parser pulls tokens from the [`Lexer`](crate::lexer::Lexer) on
//! demand and builds the lowered AST directly:
//! - [`parse`]: the [`Parser`] struct, error types, helper methods, and the
//!   `parse_program` entry point
//! - `declarations`: type specifiers and variable declarations
//! - `statements`: statement dispatch, scoping, and `if`/`while`/`for`
//!   lowering into label/jump sequences
//! - `expressions`: precedence climbing with type checking at every
//!   operator
//!
//! Parser methods are split across multiple files using `impl Parser`
//! blocks, allowing each module to extend the Parser with related
//! functionality while maintaining access to the shared parser state.

pub mod parse;

mod declarations;
mod expressions;
mod statements;

pub use parse::{ParseError, Parser, Program};
