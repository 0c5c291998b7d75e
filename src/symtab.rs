//! Symbol table for one lexical scope
//!
//! A [`SymbolTable`] maps names to declared types within exactly one scope.
//! It never walks enclosing scopes — chain walking is the parser's job,
//! through the AST's scope links.

use crate::types::CType;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Maximum number of symbols in one scope.
pub const MAX_SYMBOLS: usize = 256;

/// Declaration errors within a single scope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("'{0}' is already declared in this scope")]
    Duplicate(String),

    #[error("scope exceeds {MAX_SYMBOLS} symbols")]
    TableFull,
}

/// A declared variable: its name and its exclusively owned type
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    pub name: String,
    pub ctype: CType,
}

/// Ordered name→type mapping for one lexical scope.
///
/// Entries keep declaration order; the name index gives O(1) lookup.
/// Declaring a duplicate fails rather than overwriting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    vars: Vec<VariableSymbol>,
    index: FxHashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `name` in this table only, or `None`.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The symbol at a previously returned index.
    pub fn get(&self, idx: usize) -> &VariableSymbol {
        &self.vars[idx]
    }

    /// Number of declared symbols.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Append a new entry; fails on a duplicate name or at capacity.
    pub fn declare(&mut self, ctype: CType, name: &str) -> Result<usize, SymbolError> {
        if self.index.contains_key(name) {
            return Err(SymbolError::Duplicate(name.to_string()));
        }
        if self.vars.len() >= MAX_SYMBOLS {
            return Err(SymbolError::TableFull);
        }

        let idx = self.vars.len();
        self.vars.push(VariableSymbol {
            name: name.to_string(),
            ctype,
        });
        self.index.insert(name.to_string(), idx);
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BaseType, CType};

    fn int() -> CType {
        CType::new(BaseType::Int, true)
    }

    #[test]
    fn test_declare_then_lookup() {
        let mut table = SymbolTable::new();
        let idx = table.declare(int(), "x").unwrap();

        assert_eq!(table.lookup("x"), Some(idx));
        assert_eq!(table.get(idx).name, "x");
        assert_eq!(table.get(idx).ctype.base, BaseType::Int);
        assert_eq!(table.lookup("y"), None);
    }

    #[test]
    fn test_duplicate_declaration_fails() {
        let mut table = SymbolTable::new();
        let first = table.declare(int(), "x").unwrap();

        let err = table
            .declare(CType::new(BaseType::Float, true), "x")
            .unwrap_err();
        assert_eq!(err, SymbolError::Duplicate("x".to_string()));

        // the first entry survives untouched
        assert_eq!(table.lookup("x"), Some(first));
        assert_eq!(table.get(first).ctype.base, BaseType::Int);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let mut table = SymbolTable::new();
        for i in 0..MAX_SYMBOLS {
            table.declare(int(), &format!("v{}", i)).unwrap();
        }
        assert_eq!(
            table.declare(int(), "one_too_many"),
            Err(SymbolError::TableFull)
        );
        assert_eq!(table.len(), MAX_SYMBOLS);
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut table = SymbolTable::new();
        table.declare(int(), "a").unwrap();
        table.declare(int(), "b").unwrap();
        table.declare(int(), "c").unwrap();

        assert_eq!(table.get(0).name, "a");
        assert_eq!(table.get(1).name, "b");
        assert_eq!(table.get(2).name, "c");
    }
}
