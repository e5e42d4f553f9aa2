//! Knobs for behaviour that differs between Decaf dialects.

pub use crate::symbols::scope::RedeclarationPolicy;

/// What to do when control can fall off the end of a non-void method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingReturnPolicy {
    #[default]
    Error,
    /// Return the zero value of the method's return type.
    ZeroValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Module identifier until the package is reached. A compiled module is
    /// always named after its package.
    pub module_name: String,
    pub redeclaration: RedeclarationPolicy,
    /// Calls to undeclared names declare an external function on the fly.
    pub implicit_externs: bool,
    pub missing_return: MissingReturnPolicy,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            module_name: String::from("decaf"),
            redeclaration: RedeclarationPolicy::Error,
            implicit_externs: true,
            missing_return: MissingReturnPolicy::Error,
        }
    }
}

impl CompilerOptions {
    pub fn with_redeclaration(mut self, redeclaration: RedeclarationPolicy) -> Self {
        self.redeclaration = redeclaration;
        self
    }

    pub fn with_implicit_externs(mut self, implicit_externs: bool) -> Self {
        self.implicit_externs = implicit_externs;
        self
    }

    pub fn with_missing_return(mut self, missing_return: MissingReturnPolicy) -> Self {
        self.missing_return = missing_return;
        self
    }
}
