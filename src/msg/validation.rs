//! Validation utilities: naming patterns and literal value parsing

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use super::catalog::Primitive;

// Tokens of the message definition grammar
#[allow(missing_docs)]
pub const PACKAGE_TYPE_SEPARATOR: &str = "/";
#[allow(missing_docs)]
pub const COMMENT_DELIMITER: char = '#';
#[allow(missing_docs)]
pub const CONSTANT_SEPARATOR: &str = "=";
#[allow(missing_docs)]
pub const ARRAY_UPPER_BOUND_TOKEN: &str = "<=";

// Regex patterns for validation
static VALID_PACKAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9_])*$").unwrap());

static VALID_MESSAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]([A-Za-z0-9_])*$").unwrap());

static VALID_FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9_])*$").unwrap());

static VALID_CONSTANT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]([A-Z0-9_])*$").unwrap());

/// Validate a package name
#[must_use]
pub fn is_valid_package_name(name: &str) -> bool {
    VALID_PACKAGE_NAME_PATTERN.is_match(name)
}

/// Validate a message name
#[must_use]
pub fn is_valid_message_name(name: &str) -> bool {
    VALID_MESSAGE_NAME_PATTERN.is_match(name)
}

/// Validate a field name
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    VALID_FIELD_NAME_PATTERN.is_match(name)
}

/// Validate a constant name
#[must_use]
pub fn is_valid_constant_name(name: &str) -> bool {
    VALID_CONSTANT_NAME_PATTERN.is_match(name)
}

/// Why a literal value was rejected for a type
///
/// Deliberately not a [`super::errors::ParseError`]: the same literal parser
/// serves constants and field defaults, and the caller decides which error
/// variant the failure becomes.
#[derive(Debug, Error)]
#[error("invalid value `{value}` for {expected}: {reason}")]
pub struct ValueError {
    /// The rejected literal text
    pub value: String,
    /// The type the literal was parsed against
    pub expected: String,
    /// Why it was rejected
    pub reason: String,
}

fn value_error(value: &str, expected: &str, reason: &str) -> ValueError {
    ValueError {
        value: value.to_string(),
        expected: expected.to_string(),
        reason: reason.to_string(),
    }
}

/// A parsed primitive literal value
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum PrimitiveValue {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl std::fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveValue::Bool(v) => write!(f, "{v}"),
            PrimitiveValue::Int8(v) => write!(f, "{v}"),
            PrimitiveValue::UInt8(v) => write!(f, "{v}"),
            PrimitiveValue::Int16(v) => write!(f, "{v}"),
            PrimitiveValue::UInt16(v) => write!(f, "{v}"),
            PrimitiveValue::Int32(v) => write!(f, "{v}"),
            PrimitiveValue::UInt32(v) => write!(f, "{v}"),
            PrimitiveValue::Int64(v) => write!(f, "{v}"),
            PrimitiveValue::UInt64(v) => write!(f, "{v}"),
            PrimitiveValue::Float32(v) => write!(f, "{v}"),
            PrimitiveValue::Float64(v) => write!(f, "{v}"),
            PrimitiveValue::String(v) => write!(f, "\"{v}\""),
        }
    }
}

/// Parse a literal according to a primitive type.
///
/// Integer literals accept decimal, hex (`0x`), octal (leading `0`), and
/// binary (`0b`) notation and are range-checked against the type's width.
/// Float literals must be finite; `inf` and `NaN` have no representation in
/// generated code. Booleans accept `true`/`false`/`1`/`0`. Strings may be
/// single-quoted, double-quoted (with escapes), or bare.
///
/// # Errors
///
/// Returns a [`ValueError`] when the literal does not fit the type, or when
/// the type has no literal form (`time`, `duration`).
pub fn parse_primitive_value(
    primitive: Primitive,
    value_string: &str,
) -> Result<PrimitiveValue, ValueError> {
    let value_string = value_string.trim();
    match primitive {
        Primitive::Bool => {
            let lower = value_string.to_lowercase();
            match lower.as_str() {
                "true" | "1" => Ok(PrimitiveValue::Bool(true)),
                "false" | "0" => Ok(PrimitiveValue::Bool(false)),
                _ => Err(value_error(
                    value_string,
                    "bool",
                    "must be either 'true' / '1' or 'false' / '0'",
                )),
            }
        }
        Primitive::Byte | Primitive::Char | Primitive::UInt8 => {
            parse_unsigned_integer(value_string)
                .and_then(|v| {
                    u8::try_from(v)
                        .map_err(|_| value_error(value_string, primitive.name(), "value out of range"))
                })
                .map(PrimitiveValue::UInt8)
        }
        Primitive::Int8 => parse_signed_integer(value_string)
            .and_then(|v| {
                i8::try_from(v)
                    .map_err(|_| value_error(value_string, "int8", "value out of range"))
            })
            .map(PrimitiveValue::Int8),
        Primitive::Int16 => parse_signed_integer(value_string)
            .and_then(|v| {
                i16::try_from(v)
                    .map_err(|_| value_error(value_string, "int16", "value out of range"))
            })
            .map(PrimitiveValue::Int16),
        Primitive::UInt16 => parse_unsigned_integer(value_string)
            .and_then(|v| {
                u16::try_from(v)
                    .map_err(|_| value_error(value_string, "uint16", "value out of range"))
            })
            .map(PrimitiveValue::UInt16),
        Primitive::Int32 => parse_signed_integer(value_string)
            .and_then(|v| {
                i32::try_from(v)
                    .map_err(|_| value_error(value_string, "int32", "value out of range"))
            })
            .map(PrimitiveValue::Int32),
        Primitive::UInt32 => parse_unsigned_integer(value_string)
            .and_then(|v| {
                u32::try_from(v)
                    .map_err(|_| value_error(value_string, "uint32", "value out of range"))
            })
            .map(PrimitiveValue::UInt32),
        Primitive::Int64 => parse_signed_integer(value_string).map(PrimitiveValue::Int64),
        Primitive::UInt64 => parse_unsigned_integer(value_string).map(PrimitiveValue::UInt64),
        Primitive::Float32 => value_string
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(PrimitiveValue::Float32)
            .ok_or_else(|| value_error(value_string, "float32", "must be a finite float")),
        Primitive::Float64 => value_string
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(PrimitiveValue::Float64)
            .ok_or_else(|| value_error(value_string, "float64", "must be a finite float")),
        Primitive::String => Ok(PrimitiveValue::String(parse_string_literal(value_string))),
        Primitive::Time | Primitive::Duration => Err(value_error(
            value_string,
            primitive.name(),
            "type has no literal form",
        )),
    }
}

/// Parse a string literal, handling quotes and escape sequences.
///
/// Unquoted text is taken verbatim (trimmed).
#[must_use]
pub fn parse_string_literal(value_string: &str) -> String {
    let trimmed = value_string.trim();

    let quote_char = match trimmed.chars().next() {
        Some(c @ ('"' | '\'')) if trimmed.len() >= 2 && trimmed.ends_with(c) => c,
        _ => return trimmed.to_string(),
    };

    let content = &trimmed[1..trimmed.len() - 1];
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some('n') => {
                    result.push('\n');
                    chars.next();
                }
                Some('t') => {
                    result.push('\t');
                    chars.next();
                }
                Some('r') => {
                    result.push('\r');
                    chars.next();
                }
                Some('\\') => {
                    result.push('\\');
                    chars.next();
                }
                Some(&c) if c == quote_char => {
                    result.push(c);
                    chars.next();
                }
                _ => result.push(ch),
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Parse a signed integer (supports decimal, hex, octal, binary).
///
/// Base prefixes are checked before the decimal parse; a leading-zero
/// literal like `010` would otherwise parse as decimal ten.
fn parse_signed_integer(value_string: &str) -> Result<i64, ValueError> {
    let parsed = if let Some(hex) = value_string
        .strip_prefix("0x")
        .or_else(|| value_string.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else if let Some(bin) = value_string
        .strip_prefix("0b")
        .or_else(|| value_string.strip_prefix("0B"))
    {
        i64::from_str_radix(bin, 2)
    } else if value_string.starts_with('0') && value_string.len() > 1 {
        i64::from_str_radix(&value_string[1..], 8)
    } else {
        value_string.parse::<i64>()
    };
    parsed.map_err(|_| value_error(value_string, "integer", "must be a valid integer"))
}

/// Parse an unsigned integer (supports decimal, hex, octal, binary).
///
/// Base prefixes are checked before the decimal parse, as for signed
/// integers.
fn parse_unsigned_integer(value_string: &str) -> Result<u64, ValueError> {
    let parsed = if let Some(hex) = value_string
        .strip_prefix("0x")
        .or_else(|| value_string.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = value_string
        .strip_prefix("0b")
        .or_else(|| value_string.strip_prefix("0B"))
    {
        u64::from_str_radix(bin, 2)
    } else if value_string.starts_with('0') && value_string.len() > 1 {
        u64::from_str_radix(&value_string[1..], 8)
    } else {
        value_string.parse::<u64>()
    };
    parsed.map_err(|_| {
        value_error(
            value_string,
            "unsigned integer",
            "must be a valid unsigned integer",
        )
    })
}
