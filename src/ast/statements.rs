use std::fmt::Display;

use crate::Position;

use super::{
    ast::{comma_list, optional, VarDef},
    expressions::{Expr, MethodCall, Value},
};

/// Block Statement
///
/// Opens a lexical scope. The entry block of a method also binds the
/// method's parameters before its own declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub local_decls: Vec<VarDef>,
    pub statements: Vec<Stmt>,
    pub is_method_entry: bool,
}

impl Block {
    pub fn new(local_decls: Vec<VarDef>, statements: Vec<Stmt>) -> Self {
        Block {
            local_decls,
            statements,
            is_method_entry: false,
        }
    }

    pub fn of(statements: Vec<Stmt>) -> Self {
        Block::new(vec![], statements)
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.is_method_entry {
            "MethodBlock"
        } else {
            "Block"
        };

        write!(
            f,
            "{}({},{})",
            name,
            comma_list(&self.local_decls),
            comma_list(&self.statements)
        )
    }
}

/// Assignment to a variable or an array element.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: Value,
    pub expr: Expr,
    pub position: Position,
}

impl Assign {
    pub fn new(target: Value, expr: Expr) -> Self {
        Assign {
            target,
            expr,
            position: Position::null(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Display for Assign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target.index {
            None => write!(f, "AssignVar({},{})", self.target.name, self.expr),
            Some(index) => write!(
                f,
                "AssignArrayLoc({},{},{})",
                self.target.name, index, self.expr
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub position: Position,
}

impl Display for IfStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IfStmt({},{},{})",
            self.condition,
            self.then_block,
            optional(self.else_block.as_ref())
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub position: Position,
}

impl Display for WhileStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WhileStmt({},{})", self.condition, self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Assign,
    pub condition: Expr,
    pub step: Assign,
    pub body: Block,
    pub position: Position,
}

impl Display for ForStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ForStmt({},{},{},{})",
            self.init, self.condition, self.step, self.body
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub position: Position,
}

impl Display for ReturnStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReturnStmt({})", optional(self.value.as_ref()))
    }
}

/// Statement
///
/// Closed set of statement kinds. Lowering matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign(Assign),
    Call(MethodCall),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Break(Position),
    Continue(Position),
    Block(Block),
}

impl Stmt {
    pub fn assign(target: Value, expr: Expr) -> Self {
        Stmt::Assign(Assign::new(target, expr))
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Stmt::Call(MethodCall::new(name, args))
    }

    pub fn if_else(condition: Expr, then_block: Block, else_block: Option<Block>) -> Self {
        Stmt::If(IfStmt {
            condition,
            then_block,
            else_block,
            position: Position::null(),
        })
    }

    pub fn while_loop(condition: Expr, body: Block) -> Self {
        Stmt::While(WhileStmt {
            condition,
            body,
            position: Position::null(),
        })
    }

    pub fn for_loop(init: Assign, condition: Expr, step: Assign, body: Block) -> Self {
        Stmt::For(ForStmt {
            init,
            condition,
            step,
            body,
            position: Position::null(),
        })
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Stmt::Return(ReturnStmt {
            value,
            position: Position::null(),
        })
    }

    pub fn brk() -> Self {
        Stmt::Break(Position::null())
    }

    pub fn cont() -> Self {
        Stmt::Continue(Position::null())
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Assign(assign) => write!(f, "{}", assign),
            Stmt::Call(call) => write!(f, "{}", call),
            Stmt::If(if_stmt) => write!(f, "{}", if_stmt),
            Stmt::While(while_stmt) => write!(f, "{}", while_stmt),
            Stmt::For(for_stmt) => write!(f, "{}", for_stmt),
            Stmt::Return(return_stmt) => write!(f, "{}", return_stmt),
            Stmt::Break(_) => write!(f, "BreakStmt"),
            Stmt::Continue(_) => write!(f, "ContinueStmt"),
            Stmt::Block(block) => write!(f, "{}", block),
        }
    }
}
