//! Compile-time name resolution.
//!
//! - scope: descriptors, lexical scopes and the scope stack
//! - loops: the loop-context stack that `break` and `continue` resolve against

pub mod loops;
pub mod scope;
