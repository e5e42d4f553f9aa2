use inkwell::{
    module::Linkage,
    values::{BasicMetadataValueEnum, FunctionValue, PointerValue},
    IntPredicate,
};
use tracing::debug;

use crate::{
    ast::{
        expressions::{
            BinaryExpr, BinaryOperator, Constant, Expr, Literal, MethodCall, UnaryExpr,
            UnaryOperator, Value,
        },
        types::DecafType,
    },
    errors::errors::{Error, ErrorImpl},
    symbols::scope::{Binding, Descriptor, DescriptorKind},
    Position,
};

use super::{
    compiler::Compiler,
    literals::{decode_string_literal, parse_int_literal},
    types::{type_mismatch, TypedValue},
};

/// Generates LLVM IR for the given expression.
///
/// `expected_type` is the type the surrounding context wants. It only
/// matters for calls to undeclared methods, whose return type is inferred
/// from it. Operators pass down the operand type they require.
pub fn gen_expression<'a>(
    compiler: &mut Compiler<'a>,
    expression: &Expr,
    expected_type: Option<DecafType>,
) -> Result<TypedValue<'a>, Error> {
    match expression {
        Expr::Constant(constant) => gen_constant(compiler, constant),
        Expr::Value(value) => gen_value(compiler, value),
        Expr::Call(call) => gen_call(compiler, call, expected_type)?
            .ok_or_else(|| type_mismatch("a value", DecafType::Void, call.position)),
        Expr::Binary(binary) => gen_binary(compiler, binary),
        Expr::Unary(unary) => gen_unary(compiler, unary),
    }
}

/// Lowers a literal to a constant. No instructions are emitted, so this is
/// also used for global initializers.
pub fn gen_constant<'a>(
    compiler: &Compiler<'a>,
    constant: &Constant,
) -> Result<TypedValue<'a>, Error> {
    match &constant.literal {
        Literal::Int(text) => {
            let value = parse_int_literal(text, constant.position)?;
            Ok(TypedValue::new(
                compiler.context.i32_type().const_int(value as u64, false),
                DecafType::Int,
            ))
        }
        Literal::Bool(value) => Ok(TypedValue::new(
            compiler.context.bool_type().const_int(*value as u64, false),
            DecafType::Bool,
        )),
        Literal::Str(text) => {
            let decoded = decode_string_literal(text, constant.position)?;
            let bytes = compiler.context.const_string(decoded.as_bytes(), true);

            let global = compiler
                .module
                .add_global(bytes.get_type(), None, "globalstring");
            global.set_initializer(&bytes);
            global.set_constant(true);
            global.set_linkage(Linkage::Private);

            let zero = compiler.context.i32_type().const_zero();
            let pointer = unsafe {
                global
                    .as_pointer_value()
                    .const_in_bounds_gep(&[zero, zero])
            };

            Ok(TypedValue::new(pointer, DecafType::String))
        }
    }
}

/// Address of the storage a scalar or array descriptor is bound to.
fn storage_pointer<'a>(
    descriptor: &Descriptor<'a>,
    name: &str,
    position: Position,
) -> Result<PointerValue<'a>, Error> {
    descriptor.binding(name)?.pointer().ok_or_else(|| {
        Error::new(
            ErrorImpl::NotAVariable {
                name: name.to_string(),
            },
            position,
        )
    })
}

/// Resolves the address a `Value` refers to, for loads and stores alike.
///
/// Returns the pointer and the element type stored there.
pub fn gen_lvalue<'a>(
    compiler: &mut Compiler<'a>,
    value: &Value,
) -> Result<(PointerValue<'a>, DecafType), Error> {
    let descriptor = compiler.scopes.resolve(&value.name, value.position)?.clone();

    match (&value.index, &descriptor.kind) {
        (None, DescriptorKind::Variable) => Ok((
            storage_pointer(&descriptor, &value.name, value.position)?,
            descriptor.decaf_type,
        )),
        (None, _) => Err(Error::new(
            ErrorImpl::NotAVariable {
                name: value.name.clone(),
            },
            value.position,
        )),
        (Some(index), DescriptorKind::Array(_)) => {
            let base = storage_pointer(&descriptor, &value.name, value.position)?;
            let element = element_pointer(compiler, base, index, value.position)?;
            Ok((element, descriptor.decaf_type))
        }
        (Some(_), _) => Err(Error::new(
            ErrorImpl::NotAnArray {
                name: value.name.clone(),
            },
            value.position,
        )),
    }
}

fn element_pointer<'a>(
    compiler: &mut Compiler<'a>,
    base: PointerValue<'a>,
    index: &Expr,
    position: Position,
) -> Result<PointerValue<'a>, Error> {
    let index = gen_expression(compiler, index, Some(DecafType::Int))?;
    if index.decaf_type != DecafType::Int {
        return Err(type_mismatch(DecafType::Int, index.decaf_type, position));
    }

    let zero = compiler.context.i32_type().const_zero();
    let pointer = unsafe {
        compiler
            .builder
            .build_in_bounds_gep(base, &[zero, index.value.into_int_value()], "arrayidx")?
    };

    Ok(pointer)
}

fn gen_value<'a>(compiler: &mut Compiler<'a>, value: &Value) -> Result<TypedValue<'a>, Error> {
    let (pointer, decaf_type) = gen_lvalue(compiler, value)?;
    let name = match value.index {
        Some(_) => "arrayval",
        None => value.name.as_str(),
    };

    let loaded = compiler.builder.build_load(pointer, name)?;
    Ok(TypedValue::new(loaded, decaf_type))
}

/// Lowers a method call. Calls to `void` methods produce no value.
pub fn gen_call<'a>(
    compiler: &mut Compiler<'a>,
    call: &MethodCall,
    expected_type: Option<DecafType>,
) -> Result<Option<TypedValue<'a>>, Error> {
    let Some(descriptor) = compiler.scopes.lookup(&call.name).cloned() else {
        if compiler.options.implicit_externs {
            return gen_implicit_call(compiler, call, expected_type);
        }

        return Err(Error::new(
            ErrorImpl::UnknownIdentifier {
                name: call.name.clone(),
            },
            call.position,
        ));
    };

    let (DescriptorKind::Callable(param_types), Binding::Function(function)) =
        (&descriptor.kind, descriptor.binding(&call.name)?)
    else {
        return Err(Error::new(
            ErrorImpl::NotCallable {
                name: call.name.clone(),
            },
            call.position,
        ));
    };

    if param_types.len() != call.args.len() {
        return Err(Error::new(
            ErrorImpl::ArgumentCount {
                function: call.name.clone(),
                expected: param_types.len(),
                received: call.args.len(),
            },
            call.position,
        ));
    }

    let mut args: Vec<BasicMetadataValueEnum<'a>> = Vec::with_capacity(call.args.len());
    for (arg, param_type) in call.args.iter().zip(param_types.iter()) {
        let value = gen_expression(compiler, arg, Some(*param_type))?;
        args.push(compiler.coerce(value, *param_type, arg.position())?.into());
    }

    build_call(compiler, function, &args, descriptor.decaf_type)
}

/// Calls a method nobody declared, declaring it as an extern on first use.
fn gen_implicit_call<'a>(
    compiler: &mut Compiler<'a>,
    call: &MethodCall,
    expected_type: Option<DecafType>,
) -> Result<Option<TypedValue<'a>>, Error> {
    let mut args: Vec<BasicMetadataValueEnum<'a>> = Vec::with_capacity(call.args.len());
    let mut param_types = Vec::with_capacity(call.args.len());
    for arg in call.args.iter() {
        let value = gen_expression(compiler, arg, expected_type)?;
        param_types.push(value.decaf_type);
        args.push(value.value.into());
    }

    let return_type = expected_type.unwrap_or(DecafType::Void);
    let function = declare_implicit_extern(compiler, call, return_type, &param_types)?;

    build_call(compiler, function, &args, return_type)
}

fn declare_implicit_extern<'a>(
    compiler: &mut Compiler<'a>,
    call: &MethodCall,
    return_type: DecafType,
    param_types: &[DecafType],
) -> Result<FunctionValue<'a>, Error> {
    let function_type = compiler.function_type(return_type, param_types, call.position)?;

    let function = match compiler.module.get_function(&call.name) {
        Some(existing) if existing.get_type() == function_type => existing,
        Some(_) => {
            return Err(Error::new(
                ErrorImpl::NotCallable {
                    name: call.name.clone(),
                },
                call.position,
            ))
        }
        None => compiler
            .module
            .add_function(&call.name, function_type, Some(Linkage::External)),
    };

    debug!(
        method = %call.name,
        params = ?param_types,
        returns = %return_type,
        "implicitly declared extern"
    );

    compiler.scopes.declare_global(
        &call.name,
        Descriptor::callable(return_type, param_types.to_vec(), call.position)
            .with_binding(Binding::Function(function)),
    )?;

    Ok(function)
}

fn build_call<'a>(
    compiler: &Compiler<'a>,
    function: FunctionValue<'a>,
    args: &[BasicMetadataValueEnum<'a>],
    return_type: DecafType,
) -> Result<Option<TypedValue<'a>>, Error> {
    let name = match return_type {
        DecafType::Void => "",
        _ => "calltmp",
    };

    let site = compiler.builder.build_call(function, args, name)?;
    Ok(site
        .try_as_basic_value()
        .left()
        .map(|value| TypedValue::new(value, return_type)))
}

fn expect_type(value: &TypedValue, expected: DecafType, position: Position) -> Result<(), Error> {
    if value.decaf_type == expected {
        Ok(())
    } else {
        Err(type_mismatch(expected, value.decaf_type, position))
    }
}

fn gen_binary<'a>(
    compiler: &mut Compiler<'a>,
    binary: &BinaryExpr,
) -> Result<TypedValue<'a>, Error> {
    if binary.operator.is_short_circuit() {
        return gen_short_circuit(compiler, binary);
    }

    // Equality compares like with like: the right operand follows the left,
    // an undeclared left operand is taken to be an int.
    let (left, right) = match binary.operator {
        BinaryOperator::Eq | BinaryOperator::Neq => {
            let left = gen_expression(compiler, &binary.left, Some(DecafType::Int))?;
            let right = gen_expression(compiler, &binary.right, Some(left.decaf_type))?;
            (left, right)
        }
        _ => (
            gen_expression(compiler, &binary.left, Some(DecafType::Int))?,
            gen_expression(compiler, &binary.right, Some(DecafType::Int))?,
        ),
    };
    let position = binary.position;

    match binary.operator {
        BinaryOperator::Eq | BinaryOperator::Neq => {
            if left.decaf_type != right.decaf_type
                || !matches!(left.decaf_type, DecafType::Int | DecafType::Bool)
            {
                return Err(type_mismatch(left.decaf_type, right.decaf_type, position));
            }

            let (predicate, name) = match binary.operator {
                BinaryOperator::Eq => (IntPredicate::EQ, "eqtmp"),
                _ => (IntPredicate::NE, "neqtmp"),
            };

            let value = compiler.builder.build_int_compare(
                predicate,
                left.value.into_int_value(),
                right.value.into_int_value(),
                name,
            )?;
            Ok(TypedValue::new(value, DecafType::Bool))
        }
        BinaryOperator::Lt | BinaryOperator::Leq | BinaryOperator::Gt | BinaryOperator::Geq => {
            expect_type(&left, DecafType::Int, position)?;
            expect_type(&right, DecafType::Int, position)?;

            let (predicate, name) = match binary.operator {
                BinaryOperator::Lt => (IntPredicate::SLT, "lttmp"),
                BinaryOperator::Leq => (IntPredicate::SLE, "leqtmp"),
                BinaryOperator::Gt => (IntPredicate::SGT, "gttmp"),
                _ => (IntPredicate::SGE, "geqtmp"),
            };

            let value = compiler.builder.build_int_compare(
                predicate,
                left.value.into_int_value(),
                right.value.into_int_value(),
                name,
            )?;
            Ok(TypedValue::new(value, DecafType::Bool))
        }
        _ => {
            expect_type(&left, DecafType::Int, position)?;
            expect_type(&right, DecafType::Int, position)?;

            let lhs = left.value.into_int_value();
            let rhs = right.value.into_int_value();
            let builder = &compiler.builder;

            let value = match binary.operator {
                BinaryOperator::Plus => builder.build_int_add(lhs, rhs, "addtmp")?,
                BinaryOperator::Minus => builder.build_int_sub(lhs, rhs, "subtmp")?,
                BinaryOperator::Mult => builder.build_int_mul(lhs, rhs, "multmp")?,
                BinaryOperator::Div => builder.build_int_signed_div(lhs, rhs, "divtmp")?,
                BinaryOperator::Mod => builder.build_int_signed_rem(lhs, rhs, "modtmp")?,
                BinaryOperator::Leftshift => builder.build_left_shift(lhs, rhs, "lstmp")?,
                BinaryOperator::Rightshift => {
                    builder.build_right_shift(lhs, rhs, false, "rstmp")?
                }
                operator => {
                    return Err(Error::internal(format!(
                        "{} is not an arithmetic operator",
                        operator
                    )))
                }
            };
            Ok(TypedValue::new(value, DecafType::Int))
        }
    }
}

/// `&&` and `||`: the right operand only runs when the left one does not
/// already decide the result. Both paths meet in a phi.
fn gen_short_circuit<'a>(
    compiler: &mut Compiler<'a>,
    binary: &BinaryExpr,
) -> Result<TypedValue<'a>, Error> {
    let left = gen_expression(compiler, &binary.left, Some(DecafType::Bool))?;
    expect_type(&left, DecafType::Bool, binary.position)?;

    // Operands may contain their own joins, so take the block control is in
    // now rather than the one the expression started in.
    let origin = compiler.insert_block()?;
    let rhs_block = compiler.append_block("rval")?;
    let merge_block = compiler.append_block("merge")?;

    let condition = left.value.into_int_value();
    match binary.operator {
        BinaryOperator::And => {
            compiler
                .builder
                .build_conditional_branch(condition, rhs_block, merge_block)?
        }
        _ => compiler
            .builder
            .build_conditional_branch(condition, merge_block, rhs_block)?,
    };

    compiler.builder.position_at_end(rhs_block);
    let right = gen_expression(compiler, &binary.right, Some(DecafType::Bool))?;
    expect_type(&right, DecafType::Bool, binary.position)?;
    let rhs_end = compiler.insert_block()?;
    compiler.builder.build_unconditional_branch(merge_block)?;

    compiler.builder.position_at_end(merge_block);
    let phi = compiler
        .builder
        .build_phi(compiler.context.bool_type(), "phival")?;
    phi.add_incoming(&[(&left.value, origin), (&right.value, rhs_end)]);

    Ok(TypedValue::new(phi.as_basic_value(), DecafType::Bool))
}

fn gen_unary<'a>(compiler: &mut Compiler<'a>, unary: &UnaryExpr) -> Result<TypedValue<'a>, Error> {
    let required = match unary.operator {
        UnaryOperator::Not => DecafType::Bool,
        UnaryOperator::UnaryMinus => DecafType::Int,
    };
    let operand = gen_expression(compiler, &unary.operand, Some(required))?;

    match unary.operator {
        UnaryOperator::Not => {
            expect_type(&operand, DecafType::Bool, unary.position)?;
            let value = compiler
                .builder
                .build_not(operand.value.into_int_value(), "unottmp")?;
            Ok(TypedValue::new(value, DecafType::Bool))
        }
        UnaryOperator::UnaryMinus => {
            expect_type(&operand, DecafType::Int, unary.position)?;
            let value = compiler
                .builder
                .build_int_neg(operand.value.into_int_value(), "unegtmp")?;
            Ok(TypedValue::new(value, DecafType::Int))
        }
    }
}
