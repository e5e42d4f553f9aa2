use indexmap::IndexMap;
use inkwell::values::{FunctionValue, GlobalValue, PointerValue};
use tracing::{trace, warn};

use crate::{
    ast::types::DecafType,
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// What to do when a name is declared twice in the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedeclarationPolicy {
    #[default]
    Error,
    /// Log a warning and rebind the name to the newer declaration.
    Warn,
}

/// IR handle a descriptor is bound to once it has been lowered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'ctx> {
    Global(GlobalValue<'ctx>),
    Function(FunctionValue<'ctx>),
    Slot(PointerValue<'ctx>),
}

impl<'ctx> Binding<'ctx> {
    /// Address of the storage behind a variable binding.
    pub fn pointer(&self) -> Option<PointerValue<'ctx>> {
        match self {
            Binding::Global(global) => Some(global.as_pointer_value()),
            Binding::Slot(slot) => Some(*slot),
            Binding::Function(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    Variable,
    /// Global array with its declared capacity.
    Array(u32),
    /// Callable with its parameter types.
    Callable(Vec<DecafType>),
}

/// Descriptor
/// Metadata bound to one identifier in one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor<'ctx> {
    pub decaf_type: DecafType,
    pub position: Position,
    pub kind: DescriptorKind,
    binding: Option<Binding<'ctx>>,
}

impl<'ctx> Descriptor<'ctx> {
    pub fn variable(decaf_type: DecafType, position: Position) -> Self {
        Descriptor {
            decaf_type,
            position,
            kind: DescriptorKind::Variable,
            binding: None,
        }
    }

    pub fn array(decaf_type: DecafType, size: u32, position: Position) -> Self {
        Descriptor {
            decaf_type,
            position,
            kind: DescriptorKind::Array(size),
            binding: None,
        }
    }

    /// `decaf_type` is the return type.
    pub fn callable(decaf_type: DecafType, params: Vec<DecafType>, position: Position) -> Self {
        Descriptor {
            decaf_type,
            position,
            kind: DescriptorKind::Callable(params),
            binding: None,
        }
    }

    pub fn with_binding(mut self, binding: Binding<'ctx>) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The IR handle, which must already be attached.
    pub fn binding(&self, name: &str) -> Result<Binding<'ctx>, Error> {
        self.binding.ok_or_else(|| {
            Error::new(
                ErrorImpl::UnboundDescriptor {
                    name: name.to_string(),
                },
                self.position,
            )
        })
    }
}

/// Insertion-ordered identifier map for one lexical scope.
#[derive(Debug, Default)]
pub struct Scope<'ctx> {
    descriptors: IndexMap<String, Descriptor<'ctx>>,
}

impl<'ctx> Scope<'ctx> {
    pub fn get(&self, name: &str) -> Option<&Descriptor<'ctx>> {
        self.descriptors.get(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Scope Stack
///
/// Innermost scope last. The outermost scope holds externs, globals and
/// methods; every block and method body pushes one more.
#[derive(Debug, Default)]
pub struct ScopeStack<'ctx> {
    scopes: Vec<Scope<'ctx>>,
    policy: RedeclarationPolicy,
}

impl<'ctx> ScopeStack<'ctx> {
    pub fn new(policy: RedeclarationPolicy) -> Self {
        ScopeStack {
            scopes: Vec::new(),
            policy,
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        trace!(depth = self.scopes.len(), "push scope");
    }

    pub fn pop_scope(&mut self) -> Option<Scope<'ctx>> {
        let scope = self.scopes.pop();
        trace!(depth = self.scopes.len(), "pop scope");
        scope
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn current(&self) -> Option<&Scope<'ctx>> {
        self.scopes.last()
    }

    /// Declares `name` in the innermost scope.
    pub fn declare(&mut self, name: &str, descriptor: Descriptor<'ctx>) -> Result<(), Error> {
        let policy = self.policy;
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| Error::internal(format!("declaring `{}` with no open scope", name)))?;

        insert(scope, policy, name, descriptor)
    }

    /// Declares `name` in the outermost scope, wherever lowering currently is.
    pub fn declare_global(&mut self, name: &str, descriptor: Descriptor<'ctx>) -> Result<(), Error> {
        let policy = self.policy;
        let scope = self
            .scopes
            .first_mut()
            .ok_or_else(|| Error::internal(format!("declaring `{}` with no open scope", name)))?;

        insert(scope, policy, name, descriptor)
    }

    /// Attaches the IR handle to the innermost descriptor named `name`.
    pub fn attach(&mut self, name: &str, binding: Binding<'ctx>) -> Result<(), Error> {
        let descriptor = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.descriptors.get_mut(name))
            .ok_or_else(|| Error::internal(format!("attaching to undeclared `{}`", name)))?;

        descriptor.binding = Some(binding);
        Ok(())
    }

    /// Innermost-first search.
    pub fn lookup(&self, name: &str) -> Option<&Descriptor<'ctx>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn resolve(&self, name: &str, position: Position) -> Result<&Descriptor<'ctx>, Error> {
        self.lookup(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownIdentifier {
                    name: name.to_string(),
                },
                position,
            )
        })
    }
}

fn insert<'ctx>(
    scope: &mut Scope<'ctx>,
    policy: RedeclarationPolicy,
    name: &str,
    descriptor: Descriptor<'ctx>,
) -> Result<(), Error> {
    if let Some(previous) = scope.descriptors.get(name) {
        match policy {
            RedeclarationPolicy::Error => {
                return Err(Error::new(
                    ErrorImpl::RedeclarationError {
                        name: name.to_string(),
                        previous_line: previous.position,
                    },
                    descriptor.position,
                ));
            }
            RedeclarationPolicy::Warn => {
                warn!(
                    identifier = %name,
                    previous = %previous.position,
                    current = %descriptor.position,
                    "redeclaration in the same scope, keeping the newer declaration"
                );
            }
        }
    }

    scope.descriptors.insert(name.to_string(), descriptor);
    Ok(())
}
