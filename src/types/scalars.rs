use derive_more::with_trait::{Display, Error};

use crate::{
    ast::InputValue,
    value::{ScalarValue, Value},
};

/// Error of coercing a scalar input or output value.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("{message}")]
pub struct ScalarError {
    message: String,
}

impl ScalarError {
    /// Creates a new [`ScalarError`] with the given `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Contract every scalar type of a schema follows.
///
/// Only [`ScalarType::parse_value`] and [`ScalarType::serialize`] are
/// required; literal handling is derived from them.
pub trait ScalarType {
    /// Name of the scalar in the schema.
    const NAME: &'static str;

    /// Coerces a runtime input scalar into this type's representation.
    fn parse_value(value: &ScalarValue) -> Result<ScalarValue, ScalarError>;

    /// Coerces a resolved output value into its serialized form.
    fn serialize(value: &Value) -> Result<Value, ScalarError>;

    /// Coerces an input literal, `None` meaning an explicit `null`.
    fn parse_literal(literal: &InputValue) -> Result<Option<ScalarValue>, ScalarError> {
        match literal {
            InputValue::Null => Ok(None),
            InputValue::Scalar(s) => Self::parse_value(s).map(Some),
            other => Err(ScalarError::new(format!(
                "Expected `{}` literal, found: {other}",
                Self::NAME,
            ))),
        }
    }

    /// Whether the literal is a valid non-null value of this type.
    fn is_instance_of(literal: &InputValue) -> bool {
        matches!(Self::parse_literal(literal), Ok(Some(_)))
    }
}

fn unexpected_output(name: &str, value: &Value) -> ScalarError {
    ScalarError::new(format!("`{name}` cannot represent value: {value}"))
}

fn unexpected_input(name: &str, value: &ScalarValue) -> ScalarError {
    ScalarError::new(format!("Expected `{name}`, found: {value}"))
}

/// The built-in `Boolean` scalar.
#[derive(Clone, Copy, Debug)]
pub struct BooleanType;

impl ScalarType for BooleanType {
    const NAME: &'static str = "Boolean";

    fn parse_value(value: &ScalarValue) -> Result<ScalarValue, ScalarError> {
        match value {
            ScalarValue::Boolean(_) => Ok(value.clone()),
            v => Err(unexpected_input(Self::NAME, v)),
        }
    }

    fn serialize(value: &Value) -> Result<Value, ScalarError> {
        match value {
            Value::Scalar(ScalarValue::Boolean(_)) => Ok(value.clone()),
            v => Err(unexpected_output(Self::NAME, v)),
        }
    }
}

/// The built-in `Int` scalar, a signed 32-bit integer.
#[derive(Clone, Copy, Debug)]
pub struct IntType;

impl ScalarType for IntType {
    const NAME: &'static str = "Int";

    fn parse_value(value: &ScalarValue) -> Result<ScalarValue, ScalarError> {
        match value {
            ScalarValue::Int(_) => Ok(value.clone()),
            v => Err(unexpected_input(Self::NAME, v)),
        }
    }

    fn serialize(value: &Value) -> Result<Value, ScalarError> {
        match value {
            Value::Scalar(ScalarValue::Int(_)) => Ok(value.clone()),
            v => Err(unexpected_output(Self::NAME, v)),
        }
    }
}

/// The built-in `Float` scalar, a double-precision number.
///
/// Integers are accepted and widened.
#[derive(Clone, Copy, Debug)]
pub struct FloatType;

impl ScalarType for FloatType {
    const NAME: &'static str = "Float";

    fn parse_value(value: &ScalarValue) -> Result<ScalarValue, ScalarError> {
        value
            .as_float()
            .map(ScalarValue::Float)
            .ok_or_else(|| unexpected_input(Self::NAME, value))
    }

    fn serialize(value: &Value) -> Result<Value, ScalarError> {
        value
            .as_scalar()
            .and_then(ScalarValue::as_float)
            .map(Value::scalar)
            .ok_or_else(|| unexpected_output(Self::NAME, value))
    }
}

/// The built-in `String` scalar.
#[derive(Clone, Copy, Debug)]
pub struct StringType;

impl ScalarType for StringType {
    const NAME: &'static str = "String";

    fn parse_value(value: &ScalarValue) -> Result<ScalarValue, ScalarError> {
        match value {
            ScalarValue::String(_) => Ok(value.clone()),
            v => Err(unexpected_input(Self::NAME, v)),
        }
    }

    fn serialize(value: &Value) -> Result<Value, ScalarError> {
        match value {
            Value::Scalar(ScalarValue::String(_)) => Ok(value.clone()),
            v => Err(unexpected_output(Self::NAME, v)),
        }
    }
}

/// The built-in `ID` scalar.
///
/// Accepts strings and integers, always represented as a string.
#[derive(Clone, Copy, Debug)]
pub struct IdType;

impl ScalarType for IdType {
    const NAME: &'static str = "ID";

    fn parse_value(value: &ScalarValue) -> Result<ScalarValue, ScalarError> {
        match value {
            ScalarValue::String(_) => Ok(value.clone()),
            ScalarValue::Int(i) => Ok(ScalarValue::String(i.to_string())),
            v => Err(unexpected_input(Self::NAME, v)),
        }
    }

    fn serialize(value: &Value) -> Result<Value, ScalarError> {
        match value.as_scalar() {
            Some(s @ (ScalarValue::String(_) | ScalarValue::Int(_))) => {
                Self::parse_value(s).map(Value::Scalar)
            }
            _ => Err(unexpected_output(Self::NAME, value)),
        }
    }
}
