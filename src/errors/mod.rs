//! Error types and error handling for the compiler.
//!
//! Every lowering step returns `Result<_, Error>`. An [`errors::Error`]
//! pairs an [`errors::ErrorImpl`] kind with the source line of the node that
//! failed, and can produce a short hint through [`errors::ErrorTip`].
//! Compilation stops at the first error.

pub mod errors;
