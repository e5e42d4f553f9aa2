//! Code generation module for the compiler.
//!
//! Lowers the AST into LLVM IR:
//!
//! - compiler: the lowering context and the `compile` entry point
//! - decl: externs, globals, method signatures and bodies
//! - stmt: blocks, assignments and structured control flow
//! - expr: literals, variables, calls and operators
//! - types: Decaf to LLVM type mapping and coercion
//! - literals: decoding of integer, character and string literal text

pub mod compiler;
pub mod decl;
pub mod expr;
pub mod literals;
pub mod options;
pub mod stmt;
pub mod types;
