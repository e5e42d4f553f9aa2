//! Main compiler module.
//!
//! Holds the lowering context threaded through every code generation call:
//! the LLVM context, module and builder, the scope stack used for name
//! resolution and the loop stack used by `break` and `continue`.

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::Module,
    types::BasicTypeEnum,
    values::{FunctionValue, PointerValue},
};

use crate::{
    ast::{ast::Program, ast::VarDef, types::DecafType},
    errors::errors::{Error, ErrorImpl},
    symbols::{
        loops::{LoopContext, LoopStack},
        scope::ScopeStack,
    },
    Position,
};

use super::{decl::gen_program, options::CompilerOptions};

/// The method whose body is currently being lowered.
#[derive(Debug, Clone)]
pub struct FunctionContext<'a> {
    pub value: FunctionValue<'a>,
    pub name: String,
    pub return_type: DecafType,
    pub params: Vec<VarDef>,
}

/// The main compiler structure that holds the state of the compilation process.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the LLVM context
pub struct Compiler<'a> {
    pub options: CompilerOptions,

    /// Lexical scopes, outermost first
    pub scopes: ScopeStack<'a>,
    /// Enclosing loops of the statement being lowered
    pub loops: LoopStack<'a>,
    /// Set while a method body is being lowered
    pub function: Option<FunctionContext<'a>>,

    /// Reference to the LLVM context
    pub context: &'a Context,
    /// The LLVM module being built
    pub module: Module<'a>,
    /// The LLVM IR builder
    pub builder: Builder<'a>,
}

impl<'a> Compiler<'a> {
    pub fn new(options: CompilerOptions, context: &'a Context) -> Self {
        Compiler {
            scopes: ScopeStack::new(options.redeclaration),
            loops: LoopStack::default(),
            function: None,
            module: context.create_module(&options.module_name),
            builder: context.create_builder(),
            context,
            options,
        }
    }

    /// Runs `lower` inside a fresh scope. The scope is popped on every exit path.
    pub fn with_scope<T>(
        &mut self,
        lower: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.scopes.push_scope();
        let result = lower(self);
        self.scopes.pop_scope();
        result
    }

    /// Runs `lower` with `loop_context` as the innermost loop.
    pub fn with_loop<T>(
        &mut self,
        loop_context: LoopContext<'a>,
        lower: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.loops.push(loop_context);
        let result = lower(self);
        self.loops.pop();
        result
    }

    pub fn current_function(&self) -> Result<&FunctionContext<'a>, Error> {
        self.function
            .as_ref()
            .ok_or_else(|| Error::internal("statement lowered outside of a method"))
    }

    pub fn insert_block(&self) -> Result<BasicBlock<'a>, Error> {
        self.builder
            .get_insert_block()
            .ok_or_else(|| Error::internal("builder has no insertion point"))
    }

    /// Appends a new basic block to the current method.
    pub fn append_block(&self, name: &str) -> Result<BasicBlock<'a>, Error> {
        let function = self.current_function()?.value;
        Ok(self.context.append_basic_block(function, name))
    }

    /// A block nothing branches to, other than a function's entry block.
    pub fn is_dead(&self, block: BasicBlock<'a>) -> bool {
        let is_entry = block
            .get_parent()
            .and_then(|function| function.get_first_basic_block())
            == Some(block);

        !is_entry && block.get_first_use().is_none()
    }

    /// Whether code appended at the insertion point could never run.
    pub fn is_unreachable(&self) -> bool {
        match self.builder.get_insert_block() {
            Some(block) => block.get_terminator().is_some() || self.is_dead(block),
            None => true,
        }
    }

    /// Falls through from the insertion point into `target`.
    ///
    /// Nothing is emitted when the current block already ends in a
    /// terminator; a block control can never reach is deleted instead.
    pub fn branch_to(&self, target: BasicBlock<'a>) -> Result<(), Error> {
        let Some(block) = self.builder.get_insert_block() else {
            return Ok(());
        };

        if block.get_terminator().is_some() {
            return Ok(());
        }

        if self.is_dead(block) {
            return self.discard_block(block);
        }

        self.builder.build_unconditional_branch(target)?;
        Ok(())
    }

    pub fn discard_block(&self, block: BasicBlock<'a>) -> Result<(), Error> {
        if self.builder.get_insert_block() == Some(block) {
            self.builder.clear_insertion_position();
        }

        unsafe { block.delete() }.map_err(|_| Error::internal("failed to delete basic block"))
    }

    /// Allocates a stack slot at the top of the current method's entry block.
    pub fn entry_alloca(
        &self,
        var_type: BasicTypeEnum<'a>,
        name: &str,
    ) -> Result<PointerValue<'a>, Error> {
        let function = self.current_function()?.value;
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| Error::internal("method has no entry block"))?;

        let builder = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(instruction) => builder.position_before(&instruction),
            None => builder.position_at_end(entry),
        }

        Ok(builder.build_alloca(var_type, name)?)
    }

    /// Textual LLVM IR of the module.
    pub fn ir_text(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn verify(&self) -> Result<(), Error> {
        self.module.verify().map_err(|message| {
            Error::new(
                ErrorImpl::InvalidModule {
                    message: message.to_string(),
                },
                Position::null(),
            )
        })
    }
}

/// Lowers `program` into a fresh LLVM module.
///
/// # Arguments
///
/// * `program` - The root of the tree built by the parser
/// * `options` - Dialect options, see [`CompilerOptions`]
/// * `context` - Reference to the LLVM context that will own the module
///
/// # Returns
///
/// The compiler holding the verified module, or the first error hit. No
/// module is handed back on failure.
pub fn compile<'a>(
    program: &Program,
    options: CompilerOptions,
    context: &'a Context,
) -> Result<Compiler<'a>, Error> {
    let mut compiler = Compiler::new(options, context);

    gen_program(&mut compiler, program)?;
    compiler.verify()?;

    Ok(compiler)
}
