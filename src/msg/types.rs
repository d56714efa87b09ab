//! Core model types: fields, constants, arity, roles

use std::fmt;

use super::catalog::{self, Primitive, ResolvedType};
use super::errors::{ParseError, ParseResult, malformed};
use super::validation::{
    ARRAY_UPPER_BOUND_TOKEN, PrimitiveValue, ValueError, is_valid_constant_name,
    is_valid_field_name, parse_primitive_value,
};

/// Whether a field is scalar or one of the array shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// A single value
    Scalar,
    /// Fixed-size array `[N]`
    Fixed(u32),
    /// Bounded array `[<=N]`. The bound is advisory metadata: it is checked
    /// against default-value literals at parse time but never enforced in
    /// generated code.
    Bounded(u32),
    /// Unbounded array `[]`
    Unbounded,
}

impl Arity {
    /// Whether this is any of the array shapes
    #[must_use]
    pub fn is_array(&self) -> bool {
        !matches!(self, Arity::Scalar)
    }
}

/// Full type of a field: a catalog resolution plus its arity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    /// The element type
    pub base: ResolvedType,
    /// Scalar or array shape
    pub arity: Arity,
}

impl Type {
    /// Parse a type token such as `int32`, `float64[3]`, `string[<=10]`,
    /// or `geometry_msgs/Pose[]`.
    ///
    /// A bound of zero is legal: it describes an empty-capacity bound.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedDefinition`] on invalid array syntax
    /// or invalid type names.
    pub fn parse(type_string: &str, context_package: &str) -> ParseResult<Self> {
        let (base_string, arity) = if type_string.ends_with(']') {
            let bracket_start = type_string
                .rfind('[')
                .ok_or_else(|| malformed(type_string, "ends with ']' but missing '['"))?;
            let inner = &type_string[bracket_start + 1..type_string.len() - 1];
            let arity = if inner.is_empty() {
                Arity::Unbounded
            } else if let Some(bound) = inner.strip_prefix(ARRAY_UPPER_BOUND_TOKEN) {
                Arity::Bounded(parse_bound(type_string, bound)?)
            } else {
                Arity::Fixed(parse_bound(type_string, inner)?)
            };
            (&type_string[..bracket_start], arity)
        } else {
            (type_string, Arity::Scalar)
        };

        let base = catalog::resolve(base_string, context_package)?;
        Ok(Type { base, arity })
    }

    /// Whether the element type is primitive
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.base.is_primitive()
    }
}

fn parse_bound(type_string: &str, bound: &str) -> ParseResult<u32> {
    bound
        .parse::<u32>()
        .map_err(|_| malformed(type_string, "array bound must be a non-negative integer"))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        match self.arity {
            Arity::Scalar => Ok(()),
            Arity::Unbounded => write!(f, "[]"),
            Arity::Fixed(n) => write!(f, "[{n}]"),
            Arity::Bounded(n) => write!(f, "[{ARRAY_UPPER_BOUND_TOKEN}{n}]"),
        }
    }
}

/// A default value attached to a field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Single primitive value
    Primitive(PrimitiveValue),
    /// Sequence literal for array fields
    Array(Vec<PrimitiveValue>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(v) => write!(f, "{v}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Type of the field
    pub ty: Type,
    /// Field name, unique within its message
    pub name: String,
    /// Optional default value, already validated against `ty`
    pub default: Option<Value>,
}

impl Field {
    /// Create a field, validating the name and parsing the default value
    /// (when present) against the field type and arity.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedDefinition`] for a bad field name and
    /// [`ParseError::InvalidDefaultValue`] for a default that does not fit
    /// the declared type.
    pub fn new(ty: Type, name: &str, default_string: Option<&str>) -> ParseResult<Self> {
        if !is_valid_field_name(name) {
            return Err(malformed(name, "invalid field name pattern"));
        }

        let default = match default_string {
            Some(text) => Some(parse_default_value(&ty, text).map_err(|e| {
                ParseError::InvalidDefaultValue {
                    line: 0,
                    field: name.to_string(),
                    value: text.to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Field {
            ty,
            name: name.to_string(),
            default,
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)?;
        if let Some(ref value) = self.default {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// A constant declaration. Constants are primitive-typed only.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// Primitive type of the constant
    pub ty: Primitive,
    /// Constant name
    pub name: String,
    /// The parsed literal value
    pub value: PrimitiveValue,
}

impl Constant {
    /// Create a constant from its declared type name, constant name, and
    /// literal text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedDefinition`] for a non-primitive type
    /// or a bad constant name, and [`ParseError::InvalidConstantValue`] when
    /// the literal does not parse for the type.
    pub fn new(type_name: &str, name: &str, value_string: &str) -> ParseResult<Self> {
        let Some(ty) = Primitive::from_name(type_name) else {
            return Err(malformed(type_name, "constant type must be primitive"));
        };

        if !is_valid_constant_name(name) {
            return Err(malformed(name, "invalid constant name pattern"));
        }

        let value = parse_primitive_value(ty, value_string).map_err(|e| {
            ParseError::InvalidConstantValue {
                line: 0,
                constant: name.to_string(),
                value: value_string.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Constant {
            ty,
            name: name.to_string(),
            value,
        })
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}={}", self.ty, self.name, self.value)
    }
}

/// Whether a message model represents a plain message or one side of a
/// service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// A plain message
    Message,
    /// The request side of a service
    ServiceRequest,
    /// The response side of a service
    ServiceResponse,
}

impl Role {
    /// Detect the role from a source file name: files whose name contains
    /// `Request` or `Response` belong to a service.
    #[must_use]
    pub fn from_filename(file_name: &str) -> Self {
        if file_name.contains("Request") {
            Role::ServiceRequest
        } else if file_name.contains("Response") {
            Role::ServiceResponse
        } else {
            Role::Message
        }
    }

    /// Whether this role belongs to a service
    #[must_use]
    pub fn is_service(&self) -> bool {
        !matches!(self, Role::Message)
    }

    /// Output filename suffix for this role: `msg` or `srv`
    #[must_use]
    pub fn file_suffix(&self) -> &'static str {
        if self.is_service() { "srv" } else { "msg" }
    }
}

fn parse_default_value(ty: &Type, value_string: &str) -> Result<Value, ValueError> {
    let ResolvedType::Primitive(primitive) = ty.base else {
        return Err(ValueError {
            value: value_string.to_string(),
            expected: ty.to_string(),
            reason: "only primitive fields can carry a default value".to_string(),
        });
    };

    if !ty.arity.is_array() {
        return Ok(Value::Primitive(parse_primitive_value(
            primitive,
            value_string,
        )?));
    }

    let trimmed = value_string.trim();
    if !trimmed.starts_with('[') || !trimmed.ends_with(']') {
        return Err(ValueError {
            value: value_string.to_string(),
            expected: ty.to_string(),
            reason: "array default must start with '[' and end with ']'".to_string(),
        });
    }

    let elements = &trimmed[1..trimmed.len() - 1];
    let element_strings: Vec<&str> = if elements.trim().is_empty() {
        Vec::new()
    } else {
        elements.split(',').collect()
    };

    match ty.arity {
        Arity::Fixed(n) if element_strings.len() != n as usize => {
            return Err(ValueError {
                value: value_string.to_string(),
                expected: ty.to_string(),
                reason: format!(
                    "array must have exactly {n} elements, not {}",
                    element_strings.len()
                ),
            });
        }
        Arity::Bounded(n) if element_strings.len() > n as usize => {
            return Err(ValueError {
                value: value_string.to_string(),
                expected: ty.to_string(),
                reason: format!(
                    "array must have at most {n} elements, not {}",
                    element_strings.len()
                ),
            });
        }
        _ => {}
    }

    let mut values = Vec::with_capacity(element_strings.len());
    for element in element_strings {
        values.push(parse_primitive_value(primitive, element.trim())?);
    }
    Ok(Value::Array(values))
}
