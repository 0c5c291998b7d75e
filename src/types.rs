//! Compiler type model
//!
//! [`CType`] describes one value type: a scalar [`BaseType`], a pointer
//! depth, nested array dimensions (outermost first), and a mutability flag.
//! Compatibility is resolved structurally — there are no named user types,
//! so two types are compatible exactly when their shapes permit the
//! requested operation.

use crate::ast::{BinOp, UnOp};
use std::fmt;
use thiserror::Error;

/// Maximum nesting of array dimensions on one type.
///
/// A hard semantic limit, not incidental sizing: [`CType::array`] returns
/// [`TypeError::DepthExceeded`] past this depth.
pub const MAX_TYPE_DEPTH: usize = 16;

/// Base types supported by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Float,
    Char,
    Void,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Int => write!(f, "int"),
            BaseType::Float => write!(f, "float"),
            BaseType::Char => write!(f, "char"),
            BaseType::Void => write!(f, "void"),
        }
    }
}

/// Errors from the in-place type mutators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("cannot remove a level of indirection from a non-pointer type")]
    NotAPointer,

    #[error("type nesting exceeds {MAX_TYPE_DEPTH} array dimensions")]
    DepthExceeded,
}

/// One value type: base kind, pointer depth, array dimensions, mutability.
///
/// `Clone` produces a fully independent copy, so mutating one type through
/// [`point`](CType::point)/[`depoint`](CType::depoint)/[`array`](CType::array)
/// never aliases another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CType {
    pub base: BaseType,
    /// Levels of indirection: 0 = not a pointer, 1 = `*`, 2 = `**`, ...
    pub ptr: usize,
    /// Array dimensions, outermost first; length capped at [`MAX_TYPE_DEPTH`]
    pub dims: Vec<usize>,
    /// Assignment gate: `false` for `const` declarations and all rvalues
    pub is_mut: bool,
}

impl CType {
    /// A base type with zero pointer depth and no array dimensions.
    pub fn new(base: BaseType, is_mut: bool) -> Self {
        Self {
            base,
            ptr: 0,
            dims: Vec::new(),
            is_mut,
        }
    }

    /// Add one level of indirection in place.
    pub fn point(&mut self) {
        self.ptr += 1;
    }

    /// Remove one level of indirection in place.
    pub fn depoint(&mut self) -> Result<(), TypeError> {
        if self.ptr == 0 {
            return Err(TypeError::NotAPointer);
        }
        self.ptr -= 1;
        Ok(())
    }

    /// Append an array dimension in place (outermost first).
    pub fn array(&mut self, size: usize) -> Result<(), TypeError> {
        if self.dims.len() >= MAX_TYPE_DEPTH {
            return Err(TypeError::DepthExceeded);
        }
        self.dims.push(size);
        Ok(())
    }

    /// A copy of this type stripped of assignability.  Every computed
    /// expression result is an rvalue.
    pub fn rvalue(&self) -> CType {
        let mut out = self.clone();
        out.is_mut = false;
        out
    }

    /// A plain value: no indirection, no dimensions, not `void`.
    pub fn is_scalar(&self) -> bool {
        self.ptr == 0 && self.dims.is_empty() && self.base != BaseType::Void
    }

    /// An integral scalar (`int` or `char`).
    pub fn is_integer(&self) -> bool {
        self.is_scalar() && matches!(self.base, BaseType::Int | BaseType::Char)
    }

    /// A numeric scalar (`int`, `char`, or `float`).
    pub fn is_numeric(&self) -> bool {
        self.is_scalar() && matches!(self.base, BaseType::Int | BaseType::Char | BaseType::Float)
    }

    /// Usable as a branch condition: any non-array value that is a pointer
    /// or a non-void scalar.
    pub fn is_truthy(&self) -> bool {
        if !self.dims.is_empty() {
            return false;
        }
        self.ptr > 0 || self.base != BaseType::Void
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_mut {
            write!(f, "const ")?;
        }
        write!(f, "{}", self.base)?;
        for _ in 0..self.ptr {
            write!(f, "*")?;
        }
        for dim in &self.dims {
            write!(f, "[{}]", dim)?;
        }
        Ok(())
    }
}

/// Widening rank for plain scalars: `char` promotes to `int`, `int` to
/// `float`.  `void` has no rank and never unifies.
fn rank(base: BaseType) -> Option<u8> {
    match base {
        BaseType::Char => Some(0),
        BaseType::Int => Some(1),
        BaseType::Float => Some(2),
        BaseType::Void => None,
    }
}

/// Returns the wider of two compatible types, as an rvalue, or `None` when
/// the two are not unifiable.
///
/// Pointer depths and array dimensions must match exactly; only plain
/// scalars widen.
pub fn type_cast(left: &CType, right: &CType) -> Option<CType> {
    if left.ptr != right.ptr || left.dims != right.dims {
        return None;
    }

    if left.ptr > 0 || !left.dims.is_empty() {
        if left.base == right.base {
            return Some(left.rvalue());
        }
        return None;
    }

    let left_rank = rank(left.base)?;
    let right_rank = rank(right.base)?;
    if left_rank >= right_rank {
        Some(left.rvalue())
    } else {
        Some(right.rvalue())
    }
}

/// Result type of a unary operator applied to `left`, or `None` when the
/// operator cannot apply.
pub fn unary_compatible(op: UnOp, left: &CType) -> Option<CType> {
    match op {
        UnOp::Neg => {
            if left.is_numeric() {
                Some(left.rvalue())
            } else {
                None
            }
        }
        UnOp::Not => {
            if left.is_truthy() {
                Some(CType::new(BaseType::Int, false))
            } else {
                None
            }
        }
        UnOp::Deref => {
            if left.ptr == 0 || !left.dims.is_empty() {
                return None;
            }
            // Mutability carries through: `*p = x` stays assignable when
            // `p` was declared mutable.
            let mut out = left.clone();
            out.ptr -= 1;
            Some(out)
        }
        UnOp::AddrOf => {
            // Only lvalues are addressable; computed results are not.
            if !left.is_mut {
                return None;
            }
            let mut out = left.rvalue();
            out.ptr += 1;
            Some(out)
        }
    }
}

/// Result type of a binary operator applied to `left` and `right`, or
/// `None` when the operand types are incompatible.
pub fn binary_compatible(op: BinOp, left: &CType, right: &CType) -> Option<CType> {
    match op {
        BinOp::Assign => {
            if !left.is_mut {
                return None;
            }
            type_cast(left, right)?;
            Some(left.rvalue())
        }
        BinOp::Add | BinOp::Sub => {
            // Pointer ± integer moves the pointer; mismatched pointer
            // levels stay invalid through type_cast.
            if left.ptr > 0 && left.dims.is_empty() && right.is_integer() {
                return Some(left.rvalue());
            }
            type_cast(left, right)
        }
        BinOp::Mul | BinOp::Div => {
            if !left.is_numeric() || !right.is_numeric() {
                return None;
            }
            type_cast(left, right)
        }
        BinOp::Mod => {
            if left.is_integer() && right.is_integer() {
                Some(CType::new(BaseType::Int, false))
            } else {
                None
            }
        }
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            type_cast(left, right)?;
            Some(CType::new(BaseType::Int, false))
        }
        BinOp::And | BinOp::Or => {
            if left.is_truthy() && right.is_truthy() {
                Some(CType::new(BaseType::Int, false))
            } else {
                None
            }
        }
        BinOp::Index => {
            if !right.is_integer() {
                return None;
            }
            if !left.dims.is_empty() {
                // Indexing strips the outermost dimension
                let mut out = left.clone();
                out.dims.remove(0);
                Some(out)
            } else if left.ptr > 0 {
                let mut out = left.clone();
                out.ptr -= 1;
                Some(out)
            } else {
                None
            }
        }
    }
}
