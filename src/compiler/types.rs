//! Mapping from Decaf type tags to LLVM types, and the one implicit
//! conversion the language has: widening a `bool` to an `int`.

use inkwell::{
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType},
    values::BasicValueEnum,
    AddressSpace,
};

use crate::{
    ast::types::DecafType,
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::compiler::Compiler;

/// A lowered value together with the Decaf type it was produced as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedValue<'a> {
    pub value: BasicValueEnum<'a>,
    pub decaf_type: DecafType,
}

impl<'a> TypedValue<'a> {
    pub fn new(value: impl Into<BasicValueEnum<'a>>, decaf_type: DecafType) -> Self {
        TypedValue {
            value: value.into(),
            decaf_type,
        }
    }
}

pub fn type_mismatch(expected: impl ToString, received: impl ToString, position: Position) -> Error {
    Error::new(
        ErrorImpl::TypeMismatch {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position,
    )
}

impl<'a> Compiler<'a> {
    /// `None` for `void`, which has no storable representation.
    pub fn convert_type(&self, decaf_type: DecafType) -> Option<BasicTypeEnum<'a>> {
        match decaf_type {
            DecafType::Int => Some(self.context.i32_type().into()),
            DecafType::Bool => Some(self.context.bool_type().into()),
            DecafType::String => Some(
                self.context
                    .i8_type()
                    .ptr_type(AddressSpace::default())
                    .into(),
            ),
            DecafType::Void => None,
        }
    }

    /// Like [`Compiler::convert_type`], rejecting `void` where a value is needed.
    pub fn basic_type(
        &self,
        decaf_type: DecafType,
        position: Position,
    ) -> Result<BasicTypeEnum<'a>, Error> {
        self.convert_type(decaf_type)
            .ok_or_else(|| type_mismatch("a value type", decaf_type, position))
    }

    pub fn function_type(
        &self,
        return_type: DecafType,
        param_types: &[DecafType],
        position: Position,
    ) -> Result<FunctionType<'a>, Error> {
        let params = param_types
            .iter()
            .map(|param| {
                self.basic_type(*param, position)
                    .map(BasicMetadataTypeEnum::from)
            })
            .collect::<Result<Vec<BasicMetadataTypeEnum<'a>>, Error>>()?;

        Ok(match self.convert_type(return_type) {
            Some(basic) => basic.fn_type(&params, false),
            None => self.context.void_type().fn_type(&params, false),
        })
    }

    /// `0`, `false` or a null string pointer.
    pub fn zero_value(
        &self,
        decaf_type: DecafType,
        position: Position,
    ) -> Result<BasicValueEnum<'a>, Error> {
        match self.basic_type(decaf_type, position)? {
            BasicTypeEnum::IntType(int_type) => Ok(int_type.const_zero().into()),
            BasicTypeEnum::PointerType(pointer_type) => Ok(pointer_type.const_null().into()),
            other => Err(Error::internal(format!("no zero value for {:?}", other))),
        }
    }

    /// Converts `value` to `expected`, emitting a `zext` for a bool used as an int.
    pub fn coerce(
        &self,
        value: TypedValue<'a>,
        expected: DecafType,
        position: Position,
    ) -> Result<BasicValueEnum<'a>, Error> {
        match (value.decaf_type, expected) {
            (received, expected) if received == expected => Ok(value.value),
            (DecafType::Bool, DecafType::Int) => Ok(self
                .builder
                .build_int_z_extend(
                    value.value.into_int_value(),
                    self.context.i32_type(),
                    "zexttmp",
                )?
                .into()),
            (received, expected) => Err(type_mismatch(expected, received, position)),
        }
    }

    /// Constant-folded [`Compiler::coerce`], for global initializers.
    pub fn coerce_constant(
        &self,
        value: TypedValue<'a>,
        expected: DecafType,
        position: Position,
    ) -> Result<BasicValueEnum<'a>, Error> {
        match (value.decaf_type, expected) {
            (received, expected) if received == expected => Ok(value.value),
            (DecafType::Bool, DecafType::Int) => Ok(value
                .value
                .into_int_value()
                .const_z_ext(self.context.i32_type())
                .into()),
            (received, expected) => Err(type_mismatch(expected, received, position)),
        }
    }
}
