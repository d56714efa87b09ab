//! Type catalog: the fixed table of primitive IDL types and the resolution
//! of everything else into cross-message references

use std::fmt;

use super::errors::{ParseResult, malformed};
use super::validation::{PACKAGE_TYPE_SEPARATOR, is_valid_message_name, is_valid_package_name};

/// Names of all primitive IDL types, in catalog order
pub const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "byte", "char", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32",
    "uint64", "float32", "float64", "string", "time", "duration",
];

/// A primitive IDL type
///
/// `time` and `duration` are the two well-known built-ins: they live in the
/// primitive table for lookup purposes but have no literal form, so they can
/// never appear as constant or default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Primitive {
    Bool,
    Byte,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Time,
    Duration,
}

impl Primitive {
    /// Look up a primitive by its IDL name. Names are case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Primitive::Bool),
            "byte" => Some(Primitive::Byte),
            "char" => Some(Primitive::Char),
            "int8" => Some(Primitive::Int8),
            "int16" => Some(Primitive::Int16),
            "int32" => Some(Primitive::Int32),
            "int64" => Some(Primitive::Int64),
            "uint8" => Some(Primitive::UInt8),
            "uint16" => Some(Primitive::UInt16),
            "uint32" => Some(Primitive::UInt32),
            "uint64" => Some(Primitive::UInt64),
            "float32" => Some(Primitive::Float32),
            "float64" => Some(Primitive::Float64),
            "string" => Some(Primitive::String),
            "time" => Some(Primitive::Time),
            "duration" => Some(Primitive::Duration),
            _ => None,
        }
    }

    /// The IDL name of this primitive
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::UInt8 => "uint8",
            Primitive::UInt16 => "uint16",
            Primitive::UInt32 => "uint32",
            Primitive::UInt64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::String => "string",
            Primitive::Time => "time",
            Primitive::Duration => "duration",
        }
    }

    /// Whether values of this primitive can be written as literals
    ///
    /// `time` and `duration` cannot.
    #[must_use]
    pub fn has_literal_form(&self) -> bool {
        !matches!(self, Primitive::Time | Primitive::Duration)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a catalog lookup: a primitive, or a reference to another
/// message model by package-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    /// One of the fixed primitive types
    Primitive(Primitive),
    /// A reference to another message model. Not an error at this stage;
    /// the code generator resolves it against the models the caller supplies.
    Composite {
        /// Owning package of the referenced message
        package: String,
        /// Referenced message name
        name: String,
    },
}

impl ResolvedType {
    /// Whether this is a primitive type
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, ResolvedType::Primitive(_))
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Primitive(p) => write!(f, "{p}"),
            ResolvedType::Composite { package, name } => {
                write!(f, "{package}{PACKAGE_TYPE_SEPARATOR}{name}")
            }
        }
    }
}

/// Resolve a type name against the catalog.
///
/// A name containing the package separator is split into (package, type); an
/// unqualified non-primitive name is assumed to live in `context_package`.
///
/// # Errors
///
/// Returns [`super::errors::ParseError::MalformedDefinition`] when the name
/// does not follow the package or message naming patterns.
pub fn resolve(type_name: &str, context_package: &str) -> ParseResult<ResolvedType> {
    if let Some(primitive) = Primitive::from_name(type_name) {
        return Ok(ResolvedType::Primitive(primitive));
    }

    let parts: Vec<&str> = type_name.split(PACKAGE_TYPE_SEPARATOR).collect();
    let (package, name) = match parts.as_slice() {
        [name] => (context_package, *name),
        [package, name] => (*package, *name),
        _ => {
            return Err(malformed(
                type_name,
                "type reference must be NAME or PACKAGE/NAME",
            ));
        }
    };

    if !is_valid_package_name(package) {
        return Err(malformed(package, "invalid package name pattern"));
    }
    if !is_valid_message_name(name) {
        return Err(malformed(name, "invalid message name pattern"));
    }

    Ok(ResolvedType::Composite {
        package: package.to_string(),
        name: name.to_string(),
    })
}
