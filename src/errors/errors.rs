use std::fmt::Display;

use inkwell::builder::BuilderError;
use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    /// Shorthand for a lost lowering invariant, reported without a position.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::new(
            ErrorImpl::Internal {
                message: message.into(),
            },
            Position::null(),
        )
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::RedeclarationError { .. } => "RedeclarationError",
            ErrorImpl::UnknownIdentifier { .. } => "UnknownIdentifier",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::MissingPackage => "MissingPackage",
            ErrorImpl::InvalidControlTransfer { .. } => "InvalidControlTransfer",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::ArgumentCount { .. } => "ArgumentCount",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotAVariable { .. } => "NotAVariable",
            ErrorImpl::InvalidLiteral { .. } => "InvalidLiteral",
            ErrorImpl::InvalidArraySize { .. } => "InvalidArraySize",
            ErrorImpl::UnboundDescriptor { .. } => "UnboundDescriptor",
            ErrorImpl::Internal { .. } => "Internal",
            ErrorImpl::InvalidModule { .. } => "InvalidModule",
            ErrorImpl::Backend { .. } => "Backend",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::RedeclarationError {
                name,
                previous_line,
            } => ErrorTip::Suggestion(format!(
                "`{}` was already declared in this scope on {}, rename one of them",
                name, previous_line
            )),
            ErrorImpl::UnknownIdentifier { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in any enclosing scope", name))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::MissingPackage => ErrorTip::Suggestion(String::from(
                "Every program needs exactly one package declaration",
            )),
            ErrorImpl::InvalidControlTransfer { statement } => ErrorTip::Suggestion(format!(
                "`{}` can only be used inside a `while` or `for` body",
                statement
            )),
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Add a `return` at the end of `{}`",
                function
            )),
            ErrorImpl::ArgumentCount {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` takes {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::NotAnArray { name } => {
                ErrorTip::Suggestion(format!("`{}` cannot be indexed", name))
            }
            ErrorImpl::NotCallable { name } => {
                ErrorTip::Suggestion(format!("`{}` is a variable, not a method", name))
            }
            ErrorImpl::NotAVariable { name } => {
                ErrorTip::Suggestion(format!("`{}` is a method or an array, not a scalar", name))
            }
            ErrorImpl::InvalidLiteral { literal } => ErrorTip::Suggestion(format!(
                "Invalid literal: `{}`, is it above the integer limit?",
                literal
            )),
            ErrorImpl::InvalidArraySize { name } => ErrorTip::Suggestion(format!(
                "Array `{}` needs a capacity of at least one element",
                name
            )),
            ErrorImpl::UnboundDescriptor { .. }
            | ErrorImpl::Internal { .. }
            | ErrorImpl::InvalidModule { .. }
            | ErrorImpl::Backend { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.internal_error, self.position)
    }
}

impl std::error::Error for Error {}

impl From<BuilderError> for Error {
    fn from(error: BuilderError) -> Self {
        Error::new(
            ErrorImpl::Backend {
                message: error.to_string(),
            },
            Position::null(),
        )
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("{name:?} redeclared, previously declared on {previous_line}")]
    RedeclarationError {
        name: String,
        previous_line: Position,
    },
    #[error("unknown identifier {name:?}")]
    UnknownIdentifier { name: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("program has no package")]
    MissingPackage,
    #[error("{statement} outside of a loop")]
    InvalidControlTransfer { statement: String },
    #[error("method {function:?} can reach its end without returning a value")]
    MissingReturn { function: String },
    #[error("method {function:?} expects {expected} arguments, received {received}")]
    ArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("{name:?} is not an array")]
    NotAnArray { name: String },
    #[error("{name:?} is not callable")]
    NotCallable { name: String },
    #[error("{name:?} is not a scalar variable")]
    NotAVariable { name: String },
    #[error("invalid literal {literal:?}")]
    InvalidLiteral { literal: String },
    #[error("array {name:?} has an invalid size")]
    InvalidArraySize { name: String },
    #[error("descriptor for {name:?} used before it was lowered")]
    UnboundDescriptor { name: String },
    #[error("internal compiler error: {message}")]
    Internal { message: String },
    #[error("module failed verification: {message}")]
    InvalidModule { message: String },
    #[error("IR builder error: {message}")]
    Backend { message: String },
}
