#![allow(clippy::module_inception)]

//! Semantic analysis and LLVM IR generation for Decaf programs.
//!
//! The crate takes a finished [`ast::ast::Program`] from an external parser,
//! resolves names through a lexical scope stack and lowers every declaration,
//! statement and expression into an LLVM module.

use std::fmt::Display;

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod symbols;

pub use compiler::compiler::{compile, Compiler};
pub use compiler::options::CompilerOptions;

/// Source line the parser attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position(pub u32);

impl Position {
    pub fn null() -> Self {
        Position(0)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.0)
    }
}
