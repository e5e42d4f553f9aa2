/// AST (Abstract Syntax Tree) module
/// The tree an external parser hands to the compiler.
///
/// Submodules:
/// - ast: Program, package, extern, field and method declarations
/// - expressions: Literal, variable, call, binary and unary expressions
/// - statements: Blocks and every statement kind
/// - types: The four source type tags
///
/// Every node renders in a canonical textual form through `Display`,
/// used for golden-output tests.
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
