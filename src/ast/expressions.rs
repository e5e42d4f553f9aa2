use std::fmt::Display;

use crate::Position;

use super::{ast::comma_list, types::DecafType};

/// Binary operators, named the way they appear in the textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Leftshift,
    Rightshift,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    And,
    Or,
}

impl BinaryOperator {
    /// `&&` and `||` evaluate their right operand conditionally.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BinaryOperator::Plus => "Plus",
            BinaryOperator::Minus => "Minus",
            BinaryOperator::Mult => "Mult",
            BinaryOperator::Div => "Div",
            BinaryOperator::Mod => "Mod",
            BinaryOperator::Leftshift => "Leftshift",
            BinaryOperator::Rightshift => "Rightshift",
            BinaryOperator::Eq => "Eq",
            BinaryOperator::Neq => "Neq",
            BinaryOperator::Lt => "Lt",
            BinaryOperator::Leq => "Leq",
            BinaryOperator::Gt => "Gt",
            BinaryOperator::Geq => "Geq",
            BinaryOperator::And => "And",
            BinaryOperator::Or => "Or",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    UnaryMinus,
    Not,
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::UnaryMinus => write!(f, "UnaryMinus"),
            UnaryOperator::Not => write!(f, "Not"),
        }
    }
}

// LITERALS

/// Literal payload as the lexer produced it.
///
/// Integer text may be decimal, `0x` hexadecimal or a quoted character;
/// string text keeps its quotes and escape sequences. Decoding happens during
/// lowering so that the textual form reproduces the source verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(String),
    Bool(bool),
    Str(String),
}

/// Constant Expression
/// Represents a literal in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub literal: Literal,
    pub position: Position,
}

impl Constant {
    pub fn int(text: impl Into<String>) -> Self {
        Constant {
            literal: Literal::Int(text.into()),
            position: Position::null(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Constant {
            literal: Literal::Bool(value),
            position: Position::null(),
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Constant {
            literal: Literal::Str(text.into()),
            position: Position::null(),
        }
    }

    pub fn decaf_type(&self) -> DecafType {
        match self.literal {
            Literal::Int(_) => DecafType::Int,
            Literal::Bool(_) => DecafType::Bool,
            Literal::Str(_) => DecafType::String,
        }
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.literal {
            Literal::Int(text) => write!(f, "NumberExpr({})", text),
            Literal::Bool(true) => write!(f, "BoolExpr(True)"),
            Literal::Bool(false) => write!(f, "BoolExpr(False)"),
            Literal::Str(text) => write!(f, "StringConstant({})", text),
        }
    }
}

// COMPLEX

/// Value Expression
/// A variable reference, or an array element reference when `index` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub name: String,
    pub index: Option<Box<Expr>>,
    pub position: Position,
}

impl Value {
    pub fn scalar(name: impl Into<String>) -> Self {
        Value {
            name: name.into(),
            index: None,
            position: Position::null(),
        }
    }

    pub fn element(name: impl Into<String>, index: Expr) -> Self {
        Value {
            name: name.into(),
            index: Some(Box::new(index)),
            position: Position::null(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.index {
            None => write!(f, "VariableExpr({})", self.name),
            Some(index) => write!(f, "ArrayLocExpr({},{})", self.name, index),
        }
    }
}

/// Method Call Expression
/// Also used as a statement when the result is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub position: Position,
}

impl MethodCall {
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        MethodCall {
            name: name.into(),
            args,
            position: Position::null(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Display for MethodCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MethodCall({},{})", self.name, comma_list(&self.args))
    }
}

/// Binary Expression
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub operator: BinaryOperator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub position: Position,
}

impl Display for BinaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BinaryExpr({},{},{})", self.operator, self.left, self.right)
    }
}

/// Unary Expression
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: Box<Expr>,
    pub position: Position,
}

impl Display for UnaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UnaryExpr({},{})", self.operator, self.operand)
    }
}

/// Expression
///
/// Closed set of expression kinds. Lowering matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Constant),
    Value(Value),
    Call(MethodCall),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
}

impl Expr {
    pub fn int(text: impl Into<String>) -> Self {
        Expr::Constant(Constant::int(text))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Constant(Constant::boolean(value))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expr::Constant(Constant::string(text))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Value(Value::scalar(name))
    }

    pub fn element(name: impl Into<String>, index: Expr) -> Self {
        Expr::Value(Value::element(name, index))
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call(MethodCall::new(name, args))
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            position: Position::null(),
        })
    }

    pub fn unary(operator: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary(UnaryExpr {
            operator,
            operand: Box::new(operand),
            position: Position::null(),
        })
    }

    /// Line the parser attached to this expression.
    pub fn position(&self) -> Position {
        match self {
            Expr::Constant(constant) => constant.position,
            Expr::Value(value) => value.position,
            Expr::Call(call) => call.position,
            Expr::Binary(binary) => binary.position,
            Expr::Unary(unary) => unary.position,
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Constant(constant) => write!(f, "{}", constant),
            Expr::Value(value) => write!(f, "{}", value),
            Expr::Call(call) => write!(f, "{}", call),
            Expr::Binary(binary) => write!(f, "{}", binary),
            Expr::Unary(unary) => write!(f, "{}", unary),
        }
    }
}
