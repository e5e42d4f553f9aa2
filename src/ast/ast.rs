use std::fmt::Display;

use crate::Position;

use super::{expressions::Constant, statements::Block, types::DecafType};

/// Joins sibling nodes with commas; an empty list renders as `None`.
pub fn comma_list<T: Display>(items: &[T]) -> String {
    if items.is_empty() {
        return String::from("None");
    }

    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(",")
}

/// Renders an optional child, `None` when absent.
pub fn optional<T: Display>(item: Option<&T>) -> String {
    match item {
        Some(item) => item.to_string(),
        None => String::from("None"),
    }
}

/// Program
///
/// Root of the tree handed over by the parser. A missing package is a
/// structural error reported by the compiler, not by the tree itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub externs: Vec<Extern>,
    pub package: Option<Package>,
}

impl Program {
    pub fn new(externs: Vec<Extern>, package: Package) -> Self {
        Program {
            externs,
            package: Some(package),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Program({},{})",
            comma_list(&self.externs),
            optional(self.package.as_ref())
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl Package {
    pub fn new(name: impl Into<String>, fields: Vec<Field>, methods: Vec<Method>) -> Self {
        Package {
            name: name.into(),
            fields,
            methods,
        }
    }
}

impl Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Package({},{},{})",
            self.name,
            comma_list(&self.fields),
            comma_list(&self.methods)
        )
    }
}

/// External function declaration. Parameters are types only.
#[derive(Debug, Clone, PartialEq)]
pub struct Extern {
    pub name: String,
    pub param_types: Vec<DecafType>,
    pub return_type: DecafType,
    pub position: Position,
}

impl Extern {
    pub fn new(name: impl Into<String>, param_types: Vec<DecafType>, return_type: DecafType) -> Self {
        Extern {
            name: name.into(),
            param_types,
            return_type,
            position: Position::null(),
        }
    }
}

impl Display for Extern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self
            .param_types
            .iter()
            .map(|param| format!("VarDef({})", param))
            .collect::<Vec<String>>();

        write!(
            f,
            "ExternFunction({},{},{})",
            self.name,
            self.return_type,
            comma_list(&params)
        )
    }
}

/// Storage shape of a global field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar,
    Array(u32),
    Initialized(Constant),
}

/// Global Field Declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: DecafType,
    pub kind: FieldKind,
    pub position: Position,
}

impl Field {
    pub fn scalar(name: impl Into<String>, field_type: DecafType) -> Self {
        Field::with_kind(name, field_type, FieldKind::Scalar)
    }

    pub fn array(name: impl Into<String>, field_type: DecafType, size: u32) -> Self {
        Field::with_kind(name, field_type, FieldKind::Array(size))
    }

    pub fn initialized(name: impl Into<String>, field_type: DecafType, value: Constant) -> Self {
        Field::with_kind(name, field_type, FieldKind::Initialized(value))
    }

    fn with_kind(name: impl Into<String>, field_type: DecafType, kind: FieldKind) -> Self {
        Field {
            name: name.into(),
            field_type,
            kind,
            position: Position::null(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FieldKind::Scalar => write!(f, "FieldDecl({},{},Scalar)", self.name, self.field_type),
            FieldKind::Array(size) => write!(
                f,
                "FieldDecl({},{},Array({}))",
                self.name, self.field_type, size
            ),
            FieldKind::Initialized(value) => write!(
                f,
                "AssignGlobalVar({},{},{})",
                self.name, self.field_type, value
            ),
        }
    }
}

/// Named variable definition: a method parameter or a block-local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub var_type: DecafType,
    pub is_parameter: bool,
    pub position: Position,
}

impl VarDef {
    pub fn local(name: impl Into<String>, var_type: DecafType) -> Self {
        VarDef {
            name: name.into(),
            var_type,
            is_parameter: false,
            position: Position::null(),
        }
    }

    pub fn param(name: impl Into<String>, var_type: DecafType) -> Self {
        VarDef {
            name: name.into(),
            var_type,
            is_parameter: true,
            position: Position::null(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Display for VarDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VarDef({},{})", self.name, self.var_type)
    }
}

/// Method Declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub return_type: DecafType,
    pub params: Vec<VarDef>,
    pub body: Block,
    pub position: Position,
}

impl Method {
    /// Builds a method; the body is marked as the method's entry block.
    pub fn new(
        name: impl Into<String>,
        return_type: DecafType,
        params: Vec<VarDef>,
        mut body: Block,
    ) -> Self {
        body.is_method_entry = true;

        Method {
            name: name.into(),
            return_type,
            params,
            body,
            position: Position::null(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn param_types(&self) -> Vec<DecafType> {
        self.params.iter().map(|param| param.var_type).collect()
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Method({},{},{},{})",
            self.name,
            self.return_type,
            comma_list(&self.params),
            self.body
        )
    }
}
