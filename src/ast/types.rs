//! Source-level type tags.
//!
//! Decaf only knows four types. They are mapped onto LLVM types by the
//! compiler's type resolver; here they are plain tags that the AST carries
//! and that render in the canonical textual form as `IntType`, `BoolType`,
//! `VoidType` and `StringType`.

use std::fmt::Display;

/// The four source type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecafType {
    Int,
    Bool,
    Void,
    String,
}

impl DecafType {
    /// Returns whether values of this type can be stored, passed or loaded.
    pub fn is_value_type(&self) -> bool {
        !matches!(self, DecafType::Void)
    }
}

impl Display for DecafType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecafType::Int => write!(f, "IntType"),
            DecafType::Bool => write!(f, "BoolType"),
            DecafType::Void => write!(f, "VoidType"),
            DecafType::String => write!(f, "StringType"),
        }
    }
}
