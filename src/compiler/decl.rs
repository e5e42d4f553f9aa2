//! Declaration lowering.
//!
//! Externs are declared first, in order. A package then lowers its fields,
//! declares every method signature (pass 1) and only afterwards lowers the
//! method bodies (pass 2), so methods can call each other regardless of
//! declaration order.

use inkwell::{
    module::Linkage,
    types::BasicType,
    values::FunctionValue,
};
use tracing::debug;

use crate::{
    ast::{
        ast::{Extern, Field, FieldKind, Method, Package, Program},
        types::DecafType,
    },
    errors::errors::{Error, ErrorImpl},
    symbols::scope::{Binding, Descriptor},
    Position,
};

use super::{
    compiler::{Compiler, FunctionContext},
    expr::gen_constant,
    options::MissingReturnPolicy,
    stmt::gen_block,
};

/// Lowers the whole program inside the outermost scope.
pub fn gen_program<'a>(compiler: &mut Compiler<'a>, program: &Program) -> Result<(), Error> {
    compiler.with_scope(|compiler| {
        for extern_decl in program.externs.iter() {
            gen_extern(compiler, extern_decl)?;
        }

        let package = program
            .package
            .as_ref()
            .ok_or_else(|| Error::new(ErrorImpl::MissingPackage, Position::null()))?;

        gen_package(compiler, package)
    })
}

pub fn gen_extern<'a>(compiler: &mut Compiler<'a>, extern_decl: &Extern) -> Result<(), Error> {
    debug!(extern_name = %extern_decl.name, "lowering extern");

    compiler.scopes.declare(
        &extern_decl.name,
        Descriptor::callable(
            extern_decl.return_type,
            extern_decl.param_types.clone(),
            extern_decl.position,
        ),
    )?;

    let function_type = compiler.function_type(
        extern_decl.return_type,
        &extern_decl.param_types,
        extern_decl.position,
    )?;
    let function = match compiler.module.get_function(&extern_decl.name) {
        Some(existing) if existing.get_type() == function_type => existing,
        _ => compiler.module.add_function(
            &extern_decl.name,
            function_type,
            Some(Linkage::External),
        ),
    };

    compiler
        .scopes
        .attach(&extern_decl.name, Binding::Function(function))?;

    debug!(extern_name = %extern_decl.name, "lowered extern");
    Ok(())
}

/// Global variable: scalars are internal and zeroed unless initialized,
/// arrays are external and zeroed.
pub fn gen_field<'a>(compiler: &mut Compiler<'a>, field: &Field) -> Result<(), Error> {
    debug!(field = %field.name, "lowering field");

    let descriptor = match &field.kind {
        FieldKind::Array(0) => {
            return Err(Error::new(
                ErrorImpl::InvalidArraySize {
                    name: field.name.clone(),
                },
                field.position,
            ))
        }
        FieldKind::Array(size) => Descriptor::array(field.field_type, *size, field.position),
        FieldKind::Scalar | FieldKind::Initialized(_) => {
            Descriptor::variable(field.field_type, field.position)
        }
    };
    compiler.scopes.declare(&field.name, descriptor)?;

    let element_type = compiler.basic_type(field.field_type, field.position)?;
    let global = match &field.kind {
        FieldKind::Array(size) => {
            let array_type = element_type.array_type(*size);
            let global = compiler.module.add_global(array_type, None, &field.name);
            global.set_initializer(&array_type.const_zero());
            global.set_linkage(Linkage::External);
            global
        }
        FieldKind::Scalar => {
            let zero = compiler.zero_value(field.field_type, field.position)?;
            let global = compiler.module.add_global(element_type, None, &field.name);
            global.set_initializer(&zero);
            global.set_linkage(Linkage::Internal);
            global
        }
        FieldKind::Initialized(constant) => {
            let value = gen_constant(compiler, constant)?;
            let value = compiler.coerce_constant(value, field.field_type, field.position)?;
            let global = compiler.module.add_global(element_type, None, &field.name);
            global.set_initializer(&value);
            global.set_linkage(Linkage::Internal);
            global
        }
    };

    compiler
        .scopes
        .attach(&field.name, Binding::Global(global))?;

    debug!(field = %field.name, "lowered field");
    Ok(())
}

/// Pass 1: creates the method's function and registers its descriptor.
pub fn declare_method<'a>(
    compiler: &mut Compiler<'a>,
    method: &Method,
) -> Result<FunctionValue<'a>, Error> {
    debug!(method = %method.name, "declaring method");

    let param_types = method.param_types();
    compiler.scopes.declare(
        &method.name,
        Descriptor::callable(method.return_type, param_types.clone(), method.position),
    )?;

    let function_type = compiler.function_type(method.return_type, &param_types, method.position)?;
    let function = compiler
        .module
        .add_function(&method.name, function_type, Some(Linkage::External));

    for (param, argument) in method.params.iter().zip(function.get_param_iter()) {
        argument.set_name(&param.name);
    }

    compiler
        .scopes
        .attach(&method.name, Binding::Function(function))?;

    Ok(function)
}

/// Pass 2: lowers the body of a method declared in pass 1.
pub fn gen_method<'a>(
    compiler: &mut Compiler<'a>,
    method: &Method,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    debug!(method = %method.name, "lowering method");

    let entry = compiler.context.append_basic_block(function, "entry");
    compiler.builder.position_at_end(entry);
    compiler.function = Some(FunctionContext {
        value: function,
        name: method.name.clone(),
        return_type: method.return_type,
        params: method.params.clone(),
    });

    let result = gen_method_body(compiler, method, function);

    compiler.function = None;
    compiler.builder.clear_insertion_position();

    debug!(method = %method.name, ok = result.is_ok(), "lowered method");
    result
}

fn gen_method_body<'a>(
    compiler: &mut Compiler<'a>,
    method: &Method,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    gen_block(compiler, &method.body)?;
    finish_method(compiler, method)?;

    if !function.verify(false) {
        return Err(Error::new(
            ErrorImpl::InvalidModule {
                message: format!("method `{}` failed verification", method.name),
            },
            method.position,
        ));
    }

    Ok(())
}

/// Terminates the block control falls into at the end of the body.
fn finish_method<'a>(compiler: &mut Compiler<'a>, method: &Method) -> Result<(), Error> {
    let Some(block) = compiler.builder.get_insert_block() else {
        return Ok(());
    };

    if block.get_terminator().is_some() {
        return Ok(());
    }

    if compiler.is_dead(block) {
        return compiler.discard_block(block);
    }

    match (method.return_type, compiler.options.missing_return) {
        (DecafType::Void, _) => {
            compiler.builder.build_return(None)?;
        }
        (_, MissingReturnPolicy::Error) => {
            return Err(Error::new(
                ErrorImpl::MissingReturn {
                    function: method.name.clone(),
                },
                method.position,
            ));
        }
        (return_type, MissingReturnPolicy::ZeroValue) => {
            let zero = compiler.zero_value(return_type, method.position)?;
            compiler.builder.build_return(Some(&zero))?;
        }
    }

    Ok(())
}

pub fn gen_package<'a>(compiler: &mut Compiler<'a>, package: &Package) -> Result<(), Error> {
    debug!(package = %package.name, "lowering package");
    compiler.module.set_name(&package.name);

    for field in package.fields.iter() {
        gen_field(compiler, field)?;
    }

    let functions = package
        .methods
        .iter()
        .map(|method| declare_method(compiler, method))
        .collect::<Result<Vec<FunctionValue<'a>>, Error>>()?;

    for (method, function) in package.methods.iter().zip(functions) {
        gen_method(compiler, method, function)?;
    }

    debug!(package = %package.name, "lowered package");
    Ok(())
}
