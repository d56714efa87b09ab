//! Message definition parser
//!
//! This module implements the line-oriented message definition grammar:
//! the type catalog, the message model, and the parser that populates it.

/// Type catalog: primitives and cross-message references
pub mod catalog;
/// Error types and handling
pub mod errors;
/// Message model and definition parser
pub mod message;
/// Model leaf types: fields, constants, arity, roles
pub mod types;
/// Naming patterns and literal value parsing
pub mod validation;

pub use catalog::{PRIMITIVE_TYPES, Primitive, ResolvedType, resolve};
pub use errors::{ParseError, ParseResult};
pub use message::{MessageModel, parse_message_file, parse_message_string};
pub use types::{Arity, Constant, Field, Role, Type, Value};
pub use validation::{
    PrimitiveValue, ValueError, is_valid_constant_name, is_valid_field_name,
    is_valid_message_name, is_valid_package_name, parse_primitive_value,
};
