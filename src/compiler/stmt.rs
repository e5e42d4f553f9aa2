use inkwell::values::IntValue;
use tracing::trace;

use crate::{
    ast::{
        ast::VarDef,
        expressions::Expr,
        statements::{Assign, Block, ForStmt, IfStmt, ReturnStmt, Stmt, WhileStmt},
        types::DecafType,
    },
    errors::errors::{Error, ErrorImpl},
    symbols::{
        loops::LoopContext,
        scope::{Binding, Descriptor},
    },
    Position,
};

use super::{
    compiler::Compiler,
    expr::{gen_call, gen_expression, gen_lvalue},
    types::type_mismatch,
};

/// Lowers a block inside its own scope.
///
/// A method's entry block first gives every parameter a stack slot. Once
/// control can no longer reach the insertion point, the remaining
/// statements are dropped.
pub fn gen_block<'a>(compiler: &mut Compiler<'a>, block: &Block) -> Result<(), Error> {
    compiler.with_scope(|compiler| {
        if block.is_method_entry {
            bind_params(compiler)?;
        }

        for decl in block.local_decls.iter() {
            gen_local(compiler, decl)?;
        }

        for (index, statement) in block.statements.iter().enumerate() {
            if compiler.is_unreachable() {
                trace!(
                    skipped = block.statements.len() - index,
                    "dropping unreachable statements"
                );
                break;
            }

            gen_statement(compiler, statement)?;
        }

        Ok(())
    })
}

fn bind_params<'a>(compiler: &mut Compiler<'a>) -> Result<(), Error> {
    let function = compiler.current_function()?.clone();

    for (param, argument) in function.params.iter().zip(function.value.get_param_iter()) {
        let slot = compiler.entry_alloca(
            compiler.basic_type(param.var_type, param.position)?,
            &param.name,
        )?;
        compiler.builder.build_store(slot, argument)?;

        compiler.scopes.declare(
            &param.name,
            Descriptor::variable(param.var_type, param.position).with_binding(Binding::Slot(slot)),
        )?;
    }

    Ok(())
}

/// Block-local variable: a slot in the entry block, zeroed where declared.
fn gen_local<'a>(compiler: &mut Compiler<'a>, decl: &VarDef) -> Result<(), Error> {
    let slot = compiler.entry_alloca(
        compiler.basic_type(decl.var_type, decl.position)?,
        &decl.name,
    )?;

    if !compiler.is_unreachable() {
        let zero = compiler.zero_value(decl.var_type, decl.position)?;
        compiler.builder.build_store(slot, zero)?;
    }

    compiler.scopes.declare(
        &decl.name,
        Descriptor::variable(decl.var_type, decl.position).with_binding(Binding::Slot(slot)),
    )
}

pub fn gen_statement<'a>(compiler: &mut Compiler<'a>, statement: &Stmt) -> Result<(), Error> {
    match statement {
        Stmt::Assign(assign) => gen_assign(compiler, assign),
        Stmt::Call(call) => gen_call(compiler, call, None).map(|_| ()),
        Stmt::If(if_stmt) => gen_if(compiler, if_stmt),
        Stmt::While(while_stmt) => gen_while(compiler, while_stmt),
        Stmt::For(for_stmt) => gen_for(compiler, for_stmt),
        Stmt::Return(return_stmt) => gen_return(compiler, return_stmt),
        Stmt::Break(position) => gen_break(compiler, *position),
        Stmt::Continue(position) => gen_continue(compiler, *position),
        Stmt::Block(block) => gen_block(compiler, block),
    }
}

pub fn gen_assign<'a>(compiler: &mut Compiler<'a>, assign: &Assign) -> Result<(), Error> {
    let (pointer, target_type) = gen_lvalue(compiler, &assign.target)?;

    let value = gen_expression(compiler, &assign.expr, Some(target_type))?;
    let value = compiler.coerce(value, target_type, assign.position)?;

    compiler.builder.build_store(pointer, value)?;
    Ok(())
}

fn gen_condition<'a>(
    compiler: &mut Compiler<'a>,
    condition: &Expr,
    position: Position,
) -> Result<IntValue<'a>, Error> {
    let value = gen_expression(compiler, condition, Some(DecafType::Bool))?;
    if value.decaf_type != DecafType::Bool {
        return Err(type_mismatch(DecafType::Bool, value.decaf_type, position));
    }

    Ok(value.value.into_int_value())
}

fn gen_if<'a>(compiler: &mut Compiler<'a>, if_stmt: &IfStmt) -> Result<(), Error> {
    let start_block = compiler.append_block("ifstart")?;
    compiler.branch_to(start_block)?;
    compiler.builder.position_at_end(start_block);

    let condition = gen_condition(compiler, &if_stmt.condition, if_stmt.position)?;

    let then_block = compiler.append_block("iftrue")?;
    let else_block = compiler.append_block("iffalse")?;
    let end_block = compiler.append_block("ifend")?;
    compiler
        .builder
        .build_conditional_branch(condition, then_block, else_block)?;

    compiler.builder.position_at_end(then_block);
    gen_block(compiler, &if_stmt.then_block)?;
    compiler.branch_to(end_block)?;

    compiler.builder.position_at_end(else_block);
    if let Some(else_body) = &if_stmt.else_block {
        gen_block(compiler, else_body)?;
    }
    compiler.branch_to(end_block)?;

    compiler.builder.position_at_end(end_block);
    Ok(())
}

fn gen_while<'a>(compiler: &mut Compiler<'a>, while_stmt: &WhileStmt) -> Result<(), Error> {
    let start_block = compiler.append_block("whilestart")?;
    compiler.branch_to(start_block)?;
    compiler.builder.position_at_end(start_block);

    let condition = gen_condition(compiler, &while_stmt.condition, while_stmt.position)?;

    let body_block = compiler.append_block("whiletrue")?;
    let end_block = compiler.append_block("whileend")?;
    compiler
        .builder
        .build_conditional_branch(condition, body_block, end_block)?;

    compiler.builder.position_at_end(body_block);
    let loop_context = LoopContext {
        continue_block: start_block,
        break_block: end_block,
    };
    compiler.with_loop(loop_context, |compiler| {
        gen_block(compiler, &while_stmt.body)
    })?;
    compiler.branch_to(start_block)?;

    compiler.builder.position_at_end(end_block);
    Ok(())
}

/// `continue` jumps to the step block, so the step runs before the
/// condition is tested again.
fn gen_for<'a>(compiler: &mut Compiler<'a>, for_stmt: &ForStmt) -> Result<(), Error> {
    gen_assign(compiler, &for_stmt.init)?;

    let start_block = compiler.append_block("forstart")?;
    compiler.branch_to(start_block)?;
    compiler.builder.position_at_end(start_block);

    let condition = gen_condition(compiler, &for_stmt.condition, for_stmt.position)?;

    let body_block = compiler.append_block("fortrue")?;
    let post_block = compiler.append_block("forpost")?;
    let end_block = compiler.append_block("forend")?;
    compiler
        .builder
        .build_conditional_branch(condition, body_block, end_block)?;

    compiler.builder.position_at_end(body_block);
    let loop_context = LoopContext {
        continue_block: post_block,
        break_block: end_block,
    };
    compiler.with_loop(loop_context, |compiler| {
        gen_block(compiler, &for_stmt.body)
    })?;
    compiler.branch_to(post_block)?;

    // The body may leave the loop on every path.
    if compiler.is_dead(post_block) {
        compiler.discard_block(post_block)?;
    } else {
        compiler.builder.position_at_end(post_block);
        gen_assign(compiler, &for_stmt.step)?;
        compiler.branch_to(start_block)?;
    }

    compiler.builder.position_at_end(end_block);
    Ok(())
}

fn gen_return<'a>(compiler: &mut Compiler<'a>, return_stmt: &ReturnStmt) -> Result<(), Error> {
    let return_type = compiler.current_function()?.return_type;
    let position = return_stmt.position;

    match (&return_stmt.value, return_type) {
        (None, DecafType::Void) => {
            compiler.builder.build_return(None)?;
        }
        (None, _) => {
            let zero = compiler.zero_value(return_type, position)?;
            compiler.builder.build_return(Some(&zero))?;
        }
        (Some(expr), DecafType::Void) => {
            let value = gen_expression(compiler, expr, None)?;
            return Err(type_mismatch(DecafType::Void, value.decaf_type, position));
        }
        (Some(expr), _) => {
            let value = gen_expression(compiler, expr, Some(return_type))?;
            let value = compiler.coerce(value, return_type, position)?;
            compiler.builder.build_return(Some(&value))?;
        }
    }

    Ok(())
}

fn invalid_transfer(statement: &str, position: Position) -> Error {
    Error::new(
        ErrorImpl::InvalidControlTransfer {
            statement: statement.to_string(),
        },
        position,
    )
}

fn gen_break<'a>(compiler: &mut Compiler<'a>, position: Position) -> Result<(), Error> {
    let target = compiler
        .loops
        .current()
        .map(|loop_context| loop_context.break_block)
        .ok_or_else(|| invalid_transfer("break", position))?;

    compiler.branch_to(target)
}

fn gen_continue<'a>(compiler: &mut Compiler<'a>, position: Position) -> Result<(), Error> {
    let target = compiler
        .loops
        .current()
        .map(|loop_context| loop_context.continue_block)
        .ok_or_else(|| invalid_transfer("continue", position))?;

    compiler.branch_to(target)
}
