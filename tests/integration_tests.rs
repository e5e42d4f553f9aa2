//! Integration tests for end-to-end compilation.
//!
//! Each test builds a program tree the way a parser would, lowers it with
//! `compile` and inspects the resulting LLVM module.

use inkwell::values::AnyValue;
use decafc::{
    ast::{
        ast::{Extern, Field, Method, Package, Program, VarDef},
        expressions::{BinaryOperator, Constant, Expr, UnaryOperator, Value},
        statements::{Assign, Block, Stmt},
        types::DecafType,
    },
    compile,
    compiler::{decl::gen_program, options::MissingReturnPolicy},
    symbols::scope::RedeclarationPolicy,
    Compiler, CompilerOptions, Position,
};
use inkwell::{
    basic_block::BasicBlock,
    context::Context,
    values::{FunctionValue, InstructionOpcode},
};
use pretty_assertions::assert_eq;

fn program(externs: Vec<Extern>, fields: Vec<Field>, methods: Vec<Method>) -> Program {
    Program::new(externs, Package::new("Test", fields, methods))
}

fn method(name: &str, return_type: DecafType, locals: Vec<VarDef>, body: Vec<Stmt>) -> Method {
    Method::new(name, return_type, vec![], Block::new(locals, body))
}

fn int(text: &str) -> Expr {
    Expr::int(text)
}

fn var(name: &str) -> Expr {
    Expr::var(name)
}

fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Expr {
    Expr::binary(operator, left, right)
}

fn assign(name: &str, expr: Expr) -> Assign {
    Assign::new(Value::scalar(name), expr)
}

fn print_int() -> Extern {
    Extern::new("print_int", vec![DecafType::Int], DecafType::Void)
}

fn name_of(block: BasicBlock) -> String {
    block.get_name().to_str().unwrap().to_string()
}

fn block_named<'a>(function: FunctionValue<'a>, prefix: &str) -> BasicBlock<'a> {
    function
        .get_basic_blocks()
        .into_iter()
        .find(|block| name_of(*block).starts_with(prefix))
        .unwrap_or_else(|| panic!("no block named {}", prefix))
}

fn branch_targets(block: BasicBlock) -> Vec<String> {
    let terminator = block.get_terminator().expect("block is not terminated");
    (0..terminator.get_num_operands())
        .filter_map(|index| terminator.get_operand(index).and_then(|operand| operand.right()))
        .map(name_of)
        .collect()
}

fn block_text(block: BasicBlock) -> String {
    let mut text = String::new();
    let mut instruction = block.get_first_instruction();
    while let Some(current) = instruction {
        text.push_str(&current.print_to_string().to_string());
        text.push('\n');
        instruction = current.get_next_instruction();
    }
    text
}

/// Every block ends in a terminator and every non-entry block has a predecessor.
fn assert_well_formed(function: FunctionValue) {
    for (index, block) in function.get_basic_blocks().into_iter().enumerate() {
        assert!(
            block.get_terminator().is_some(),
            "block {} is not terminated",
            name_of(block)
        );
        if index > 0 {
            assert!(
                block.get_first_use().is_some(),
                "block {} is unreachable",
                name_of(block)
            );
        }
    }
}

#[test]
fn test_compile_simple_program() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Int,
            vec![],
            vec![Stmt::ret(Some(int("0")))],
        )],
    );

    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert_eq!(compiler.module.get_name().to_str().unwrap(), "Test");
    assert!(compiler.module.get_function("main").is_some());
    assert!(compiler.scopes.is_empty());
    assert!(compiler.loops.is_empty());
}

#[test]
fn test_initialized_global() {
    let context = Context::create();
    let field = Field::initialized("x", DecafType::Int, Constant::int("5"));
    assert_eq!(field.to_string(), "AssignGlobalVar(x,IntType,NumberExpr(5))");

    let program = program(
        vec![],
        vec![field],
        vec![method("main", DecafType::Void, vec![], vec![])],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    let global = compiler.module.get_global("x").unwrap();
    let initializer = global.get_initializer().unwrap().into_int_value();
    assert_eq!(initializer.get_zero_extended_constant(), Some(5));
    assert!(compiler.ir_text().contains("@x = internal global i32 5"));
}

#[test]
fn test_globals_are_zero_initialized() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![
            Field::scalar("count", DecafType::Int),
            Field::scalar("flag", DecafType::Bool),
            Field::array("list", DecafType::Int, 25),
            Field::initialized("wide", DecafType::Int, Constant::boolean(true)),
        ],
        vec![method("main", DecafType::Void, vec![], vec![])],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let ir = compiler.ir_text();

    assert!(ir.contains("@count = internal global i32 0"));
    assert!(ir.contains("@flag = internal global i1 false"));
    assert!(ir.contains("@list = global [25 x i32] zeroinitializer"));
    assert!(ir.contains("@wide = internal global i32 1"));
}

#[test]
fn test_array_capacity_comes_from_declaration() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![Field::array("list", DecafType::Int, 3)],
        vec![method(
            "main",
            DecafType::Int,
            vec![],
            vec![
                Stmt::assign(Value::element("list", int("2")), int("7")),
                Stmt::ret(Some(Expr::element("list", int("2")))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let ir = compiler.ir_text();

    assert!(ir.contains("[3 x i32]"));
    assert!(!ir.contains("[10 x i32]"));
    assert!(ir.contains("[3 x i32]* @list, i32 0, i32 2"));
}

#[test]
fn test_for_continue_runs_step() {
    let context = Context::create();
    let body = Block::of(vec![
        Stmt::if_else(
            binary(BinaryOperator::Eq, var("i"), int("5")),
            Block::of(vec![Stmt::cont()]),
            None,
        ),
        Stmt::call("print_int", vec![var("i")]),
    ]);
    let program = program(
        vec![print_int()],
        vec![],
        vec![method(
            "main",
            DecafType::Int,
            vec![VarDef::local("i", DecafType::Int)],
            vec![
                Stmt::for_loop(
                    assign("i", int("0")),
                    binary(BinaryOperator::Lt, var("i"), int("10")),
                    assign("i", binary(BinaryOperator::Plus, var("i"), int("1"))),
                    body,
                ),
                Stmt::ret(Some(int("0"))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    let continue_block = block_named(main, "iftrue");
    assert_eq!(branch_targets(continue_block), vec!["forpost".to_string()]);

    let post = block_named(main, "forpost");
    assert!(block_text(post).contains("add i32"));
    assert_eq!(branch_targets(post), vec!["forstart".to_string()]);

    assert_well_formed(main);
}

#[test]
fn test_while_continue_retests_condition() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![VarDef::local("b", DecafType::Bool)],
            vec![Stmt::while_loop(
                var("b"),
                Block::of(vec![
                    Stmt::assign(Value::scalar("b"), Expr::boolean(false)),
                    Stmt::cont(),
                ]),
            )],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    let body = block_named(main, "whiletrue");
    assert_eq!(branch_targets(body), vec!["whilestart".to_string()]);
    assert_well_formed(main);
}

#[test]
fn test_break_in_if_targets_enclosing_loop() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![],
            vec![Stmt::while_loop(
                Expr::boolean(true),
                Block::of(vec![Stmt::if_else(
                    Expr::boolean(true),
                    Block::of(vec![Stmt::brk()]),
                    None,
                )]),
            )],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    let then_block = block_named(main, "iftrue");
    assert_eq!(branch_targets(then_block), vec!["whileend".to_string()]);
    assert_well_formed(main);
}

#[test]
fn test_nested_loops_break_innermost() {
    let context = Context::create();
    let inner = Stmt::while_loop(Expr::boolean(true), Block::of(vec![Stmt::brk()]));
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![],
            vec![Stmt::while_loop(
                Expr::boolean(true),
                Block::of(vec![inner, Stmt::brk()]),
            )],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    let blocks = main
        .get_basic_blocks()
        .into_iter()
        .filter(|block| name_of(*block).starts_with("whiletrue"))
        .collect::<Vec<BasicBlock>>();
    assert_eq!(blocks.len(), 2);

    // Outer body falls into the inner loop; the inner body leaves the inner loop.
    let inner_targets = branch_targets(blocks[1]);
    assert_eq!(inner_targets.len(), 1);
    assert!(inner_targets[0].starts_with("whileend"));
    assert_ne!(inner_targets[0], "whileend");
    assert_well_formed(main);
}

#[test]
fn test_break_outside_loop_is_rejected() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method("main", DecafType::Void, vec![], vec![Stmt::brk()])],
    );

    let error = compile(&program, CompilerOptions::default(), &context)
        .err()
        .unwrap();
    assert_eq!(error.get_error_name(), "InvalidControlTransfer");
}

#[test]
fn test_continue_after_loop_is_rejected() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![],
            vec![
                Stmt::while_loop(Expr::boolean(false), Block::default()),
                Stmt::cont(),
            ],
        )],
    );

    let error = compile(&program, CompilerOptions::default(), &context)
        .err()
        .unwrap();
    assert_eq!(error.get_error_name(), "InvalidControlTransfer");
}

#[test]
fn test_implicit_extern_declared_once() {
    let context = Context::create();
    let call = || Stmt::call("foo", vec![int("1"), int("2")]);
    let program = program(
        vec![],
        vec![],
        vec![method("main", DecafType::Void, vec![], vec![call(), call()])],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    let foo = compiler.module.get_function("foo").unwrap();
    assert_eq!(foo.count_params(), 2);
    assert_eq!(foo.count_basic_blocks(), 0);
    assert!(compiler.module.get_function("foo.1").is_none());
    assert_eq!(compiler.ir_text().matches("call void @foo(i32 1, i32 2)").count(), 1);
    assert_eq!(compiler.ir_text().matches("call void @foo(").count(), 2);
}

#[test]
fn test_implicit_extern_return_type_from_assignment() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Int,
            vec![VarDef::local("x", DecafType::Int)],
            vec![
                Stmt::assign(Value::scalar("x"), Expr::call("read_int", vec![])),
                Stmt::ret(Some(var("x"))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert!(compiler.ir_text().contains("declare i32 @read_int()"));
}

#[test]
fn test_implicit_extern_inside_arithmetic_returns_int() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Int,
            vec![VarDef::local("x", DecafType::Int)],
            vec![
                Stmt::assign(
                    Value::scalar("x"),
                    binary(
                        BinaryOperator::Plus,
                        Expr::call("foo", vec![int("1")]),
                        int("1"),
                    ),
                ),
                Stmt::ret(Some(var("x"))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    let ir = compiler.ir_text();
    assert!(ir.contains("declare i32 @foo(i32)"));
    assert!(ir.contains("call i32 @foo(i32 1)"));
}

#[test]
fn test_implicit_extern_operands_take_operator_types() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![VarDef::local("ok", DecafType::Bool)],
            vec![
                Stmt::assign(
                    Value::scalar("ok"),
                    Expr::unary(UnaryOperator::Not, Expr::call("ready", vec![])),
                ),
                Stmt::if_else(
                    binary(BinaryOperator::Gt, Expr::call("count", vec![]), int("0")),
                    Block::of(vec![]),
                    None,
                ),
                Stmt::if_else(
                    binary(BinaryOperator::Eq, Expr::call("limit", vec![]), int("3")),
                    Block::of(vec![]),
                    None,
                ),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    let ir = compiler.ir_text();
    assert!(ir.contains("declare i1 @ready()"));
    assert!(ir.contains("declare i32 @count()"));
    assert!(ir.contains("declare i32 @limit()"));
}

#[test]
fn test_implicit_externs_can_be_disabled() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![],
            vec![Stmt::call("foo", vec![])],
        )],
    );

    let options = CompilerOptions::default().with_implicit_externs(false);
    let error = compile(&program, options, &context).err().unwrap();
    assert_eq!(error.get_error_name(), "UnknownIdentifier");
}

#[test]
fn test_bool_assigned_to_int_is_widened() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Int,
            vec![
                VarDef::local("x", DecafType::Int),
                VarDef::local("b", DecafType::Bool),
            ],
            vec![
                Stmt::assign(Value::scalar("b"), Expr::boolean(true)),
                Stmt::assign(Value::scalar("x"), var("b")),
                Stmt::ret(Some(var("x"))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let ir = compiler.ir_text();

    assert!(ir.contains("%zexttmp = zext i1 %b"));
    assert!(ir.contains("store i32 %zexttmp, i32* %x"));
}

#[test]
fn test_bool_argument_is_widened() {
    let context = Context::create();
    let program = program(
        vec![print_int()],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![VarDef::local("b", DecafType::Bool)],
            vec![Stmt::call("print_int", vec![var("b")])],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert!(compiler.ir_text().contains("call void @print_int(i32 %zexttmp)"));
}

#[test]
fn test_short_circuit_and() {
    let context = Context::create();
    let program = program(
        vec![
            Extern::new("f", vec![], DecafType::Bool),
            Extern::new("g", vec![], DecafType::Bool),
        ],
        vec![],
        vec![method(
            "main",
            DecafType::Bool,
            vec![],
            vec![Stmt::ret(Some(binary(
                BinaryOperator::And,
                Expr::call("f", vec![]),
                Expr::call("g", vec![]),
            )))],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    let entry = main.get_first_basic_block().unwrap();
    assert!(block_text(entry).contains("@f()"));
    assert!(!block_text(entry).contains("@g()"));
    assert_eq!(
        branch_targets(entry),
        vec!["merge".to_string(), "rval".to_string()]
    );

    let rhs = block_named(main, "rval");
    assert!(block_text(rhs).contains("@g()"));

    let merge = block_named(main, "merge");
    let phi = merge.get_first_instruction().unwrap();
    assert_eq!(phi.get_opcode(), InstructionOpcode::Phi);
    assert_well_formed(main);
}

#[test]
fn test_short_circuit_or_skips_right_when_true() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Bool,
            vec![VarDef::local("a", DecafType::Bool)],
            vec![Stmt::ret(Some(binary(
                BinaryOperator::Or,
                var("a"),
                Expr::unary(UnaryOperator::Not, var("a")),
            )))],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    // LLVM lists the false successor first.
    let entry = main.get_first_basic_block().unwrap();
    assert_eq!(
        branch_targets(entry),
        vec!["rval".to_string(), "merge".to_string()]
    );
    assert!(block_text(block_named(main, "rval")).contains("xor i1"));
}

#[test]
fn test_nested_short_circuit_phi_sources() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Bool,
            vec![
                VarDef::local("a", DecafType::Bool),
                VarDef::local("b", DecafType::Bool),
                VarDef::local("c", DecafType::Bool),
            ],
            vec![Stmt::ret(Some(binary(
                BinaryOperator::And,
                binary(BinaryOperator::Or, var("a"), var("b")),
                var("c"),
            )))],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    // The outer `&&` branches from the inner join, not from the entry block.
    let inner_merge = block_named(main, "merge");
    assert_eq!(inner_merge.get_first_instruction().unwrap().get_opcode(), InstructionOpcode::Phi);
    assert_eq!(branch_targets(inner_merge).len(), 2);
    assert_well_formed(main);
}

#[test]
fn test_shadowing_reverts_after_block() {
    let context = Context::create();
    let inner = Block::new(
        vec![VarDef::local("x", DecafType::Bool)],
        vec![Stmt::assign(Value::scalar("x"), Expr::boolean(true))],
    );
    let program = program(
        vec![],
        vec![Field::scalar("x", DecafType::Int)],
        vec![method(
            "main",
            DecafType::Int,
            vec![],
            vec![
                Stmt::Block(inner),
                Stmt::assign(Value::scalar("x"), int("3")),
                Stmt::ret(Some(var("x"))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let ir = compiler.ir_text();

    assert!(ir.contains("store i1 true, i1* %x"));
    assert!(ir.contains("store i32 3, i32* @x"));
}

#[test]
fn test_parameters_get_stack_slots() {
    let context = Context::create();
    let add = Method::new(
        "add",
        DecafType::Int,
        vec![
            VarDef::param("a", DecafType::Int),
            VarDef::param("b", DecafType::Int),
        ],
        Block::of(vec![Stmt::ret(Some(binary(
            BinaryOperator::Plus,
            var("a"),
            var("b"),
        )))]),
    );
    let program = program(vec![], vec![], vec![add]);
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let ir = compiler.ir_text();

    assert!(ir.contains("define i32 @add(i32 %a, i32 %b)"));
    assert!(ir.contains("store i32 %a, i32* %a"));
    assert!(ir.contains("%addtmp = add i32"));
}

#[test]
fn test_forward_and_recursive_calls() {
    let context = Context::create();
    let main = method(
        "main",
        DecafType::Int,
        vec![],
        vec![Stmt::ret(Some(Expr::call("fact", vec![int("5")])))],
    );
    let fact = Method::new(
        "fact",
        DecafType::Int,
        vec![VarDef::param("n", DecafType::Int)],
        Block::of(vec![
            Stmt::if_else(
                binary(BinaryOperator::Leq, var("n"), int("1")),
                Block::of(vec![Stmt::ret(Some(int("1")))]),
                None,
            ),
            Stmt::ret(Some(binary(
                BinaryOperator::Mult,
                var("n"),
                Expr::call(
                    "fact",
                    vec![binary(BinaryOperator::Minus, var("n"), int("1"))],
                ),
            ))),
        ]),
    );
    let program = program(vec![], vec![], vec![main, fact]);
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert!(compiler.ir_text().contains("call i32 @fact(i32 5)"));
    assert_well_formed(compiler.module.get_function("fact").unwrap());
}

#[test]
fn test_if_else_both_returning() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Int,
            vec![VarDef::local("b", DecafType::Bool)],
            vec![Stmt::if_else(
                var("b"),
                Block::of(vec![Stmt::ret(Some(int("1")))]),
                Some(Block::of(vec![Stmt::ret(Some(int("2")))])),
            )],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let main = compiler.module.get_function("main").unwrap();

    assert!(main
        .get_basic_blocks()
        .into_iter()
        .all(|block| !name_of(block).starts_with("ifend")));
    assert_well_formed(main);
}

#[test]
fn test_statements_after_return_are_dropped() {
    let context = Context::create();
    let program = program(
        vec![print_int()],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![],
            vec![Stmt::ret(None), Stmt::call("print_int", vec![int("1")])],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert!(!compiler.ir_text().contains("call void @print_int"));
}

#[test]
fn test_missing_return() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method("main", DecafType::Int, vec![], vec![])],
    );

    let error = compile(&program, CompilerOptions::default(), &context)
        .err()
        .unwrap();
    assert_eq!(error.get_error_name(), "MissingReturn");

    let options = CompilerOptions::default().with_missing_return(MissingReturnPolicy::ZeroValue);
    let compiler = compile(&program, options, &context).unwrap();
    assert!(compiler.ir_text().contains("ret i32 0"));
}

#[test]
fn test_empty_return_uses_zero_value() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method("main", DecafType::Bool, vec![], vec![Stmt::ret(None)])],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert!(compiler.ir_text().contains("ret i1 false"));
}

#[test]
fn test_literals() {
    let context = Context::create();
    let program = program(
        vec![Extern::new(
            "print_string",
            vec![DecafType::String],
            DecafType::Void,
        )],
        vec![],
        vec![method(
            "main",
            DecafType::Int,
            vec![],
            vec![
                Stmt::call("print_string", vec![Expr::string("\"hi\\n\"")]),
                Stmt::ret(Some(binary(BinaryOperator::Plus, int("0x1F"), int("'a'")))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();
    let ir = compiler.ir_text();

    assert!(ir.contains("c\"hi\\0A\\00\""));
    assert!(ir.contains("ret i32 128"));
}

#[test]
fn test_missing_package() {
    let context = Context::create();
    let program = Program {
        externs: vec![print_int()],
        package: None,
    };

    let error = compile(&program, CompilerOptions::default(), &context)
        .err()
        .unwrap();
    assert_eq!(error.get_error_name(), "MissingPackage");
}

#[test]
fn test_global_redeclaration() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![
            Field::scalar("x", DecafType::Int).at(Position(2)),
            Field::scalar("x", DecafType::Bool).at(Position(3)),
        ],
        vec![method("main", DecafType::Void, vec![], vec![])],
    );

    let error = compile(&program, CompilerOptions::default(), &context)
        .err()
        .unwrap();
    assert_eq!(error.get_error_name(), "RedeclarationError");
    assert_eq!(*error.get_position(), Position(3));

    let options = CompilerOptions::default().with_redeclaration(RedeclarationPolicy::Warn);
    assert!(compile(&program, options, &context).is_ok());
}

#[test]
fn test_type_errors() {
    let context = Context::create();
    let cases = vec![
        Stmt::assign(Value::scalar("x"), Expr::string("\"s\"")),
        Stmt::if_else(int("1"), Block::default(), None),
        Stmt::assign(
            Value::scalar("x"),
            binary(BinaryOperator::Plus, int("1"), Expr::boolean(true)),
        ),
        Stmt::assign(
            Value::scalar("x"),
            Expr::unary(UnaryOperator::UnaryMinus, Expr::boolean(true)),
        ),
    ];

    for statement in cases {
        let program = program(
            vec![],
            vec![],
            vec![method(
                "main",
                DecafType::Void,
                vec![VarDef::local("x", DecafType::Int)],
                vec![statement],
            )],
        );
        let error = compile(&program, CompilerOptions::default(), &context)
            .err()
            .unwrap();
        assert_eq!(error.get_error_name(), "TypeMismatch");
    }
}

#[test]
fn test_name_errors() {
    let context = Context::create();
    let cases = vec![
        (Stmt::assign(Value::scalar("y"), int("1")), "UnknownIdentifier"),
        (Stmt::assign(Value::element("x", int("0")), int("1")), "NotAnArray"),
        (Stmt::assign(Value::scalar("list"), int("1")), "NotAVariable"),
        (Stmt::call("x", vec![]), "NotCallable"),
        (Stmt::call("print_int", vec![]), "ArgumentCount"),
    ];

    for (statement, expected) in cases {
        let program = program(
            vec![print_int()],
            vec![Field::array("list", DecafType::Int, 4)],
            vec![method(
                "main",
                DecafType::Void,
                vec![VarDef::local("x", DecafType::Int)],
                vec![statement],
            )],
        );
        let error = compile(&program, CompilerOptions::default(), &context)
            .err()
            .unwrap();
        assert_eq!(error.get_error_name(), expected);
    }
}

#[test]
fn test_scope_stack_unwinds_on_error() {
    let context = Context::create();
    let program = program(
        vec![],
        vec![],
        vec![method(
            "main",
            DecafType::Void,
            vec![],
            vec![Stmt::while_loop(
                Expr::boolean(true),
                Block::of(vec![Stmt::Block(Block::of(vec![Stmt::assign(
                    Value::scalar("missing"),
                    int("1"),
                )]))]),
            )],
        )],
    );

    let mut compiler = Compiler::new(CompilerOptions::default(), &context);
    let error = gen_program(&mut compiler, &program).unwrap_err();

    assert_eq!(error.get_error_name(), "UnknownIdentifier");
    assert!(compiler.scopes.is_empty());
    assert!(compiler.loops.is_empty());
    assert!(compiler.function.is_none());
}

#[test]
fn test_complex_program_is_well_formed() {
    let context = Context::create();
    let loop_body = Block::new(
        vec![VarDef::local("odd", DecafType::Bool)],
        vec![
            Stmt::assign(
                Value::scalar("odd"),
                binary(
                    BinaryOperator::Eq,
                    binary(BinaryOperator::Mod, var("i"), int("2")),
                    int("1"),
                ),
            ),
            Stmt::if_else(
                var("odd"),
                Block::of(vec![Stmt::cont()]),
                Some(Block::of(vec![Stmt::if_else(
                    binary(BinaryOperator::Gt, var("i"), int("6")),
                    Block::of(vec![Stmt::brk()]),
                    None,
                )])),
            ),
            Stmt::assign(
                Value::element("list", var("i")),
                binary(BinaryOperator::Leftshift, var("i"), int("1")),
            ),
        ],
    );
    let program = program(
        vec![print_int()],
        vec![Field::array("list", DecafType::Int, 10)],
        vec![method(
            "main",
            DecafType::Int,
            vec![VarDef::local("i", DecafType::Int)],
            vec![
                Stmt::for_loop(
                    assign("i", int("0")),
                    binary(BinaryOperator::Lt, var("i"), int("10")),
                    assign("i", binary(BinaryOperator::Plus, var("i"), int("1"))),
                    loop_body,
                ),
                Stmt::while_loop(
                    binary(BinaryOperator::Geq, var("i"), int("0")),
                    Block::of(vec![
                        Stmt::call("print_int", vec![Expr::element("list", var("i"))]),
                        Stmt::assign(
                            Value::scalar("i"),
                            binary(BinaryOperator::Minus, var("i"), int("1")),
                        ),
                    ]),
                ),
                Stmt::ret(Some(Expr::binary(
                    BinaryOperator::Rightshift,
                    Expr::element("list", int("4")),
                    int("1"),
                ))),
            ],
        )],
    );
    let compiler = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert_well_formed(compiler.module.get_function("main").unwrap());
    assert!(compiler.ir_text().contains("lshr i32"));
}
