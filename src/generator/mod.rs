//! Code generator: turns a parsed message model into Rust source text
//!
//! Generation is a pure function from model to text; writing the output file
//! is the caller's responsibility. Composite field types are resolved against
//! a [`ModelCatalog`] supplied wholesale by the caller.

mod codegen;
mod types;

pub use codegen::CodeGenerator;
pub use types::TypeMapper;

use std::collections::HashMap;
use thiserror::Error;

use crate::msg::{MessageModel, ParseError};

/// Errors that can occur during code generation
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Message definition parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A composite field type could not be resolved against the supplied
    /// models
    #[error("unresolved type: {package}/{type_name}")]
    UnresolvedType {
        /// Package of the missing message
        package: String,
        /// Name of the missing message
        type_name: String,
    },

    /// A field name collides with an identifier Rust reserves even in raw
    /// form (`self`, `super`, `crate`)
    #[error("field name `{field}` is reserved in generated code")]
    ReservedFieldName {
        /// The offending field name
        field: String,
    },

    /// Generated tokens failed to render as a Rust source file
    #[error("failed to render generated code: {0}")]
    Render(#[from] syn::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Package-scoped lookup from type name to message model
///
/// Each message is parsed independently, so composite-type resolution is
/// supplied wholesale at generation time: the caller parses every sibling
/// model first and registers it here.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<(String, String), MessageModel>,
}

impl ModelCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, keyed by its package and name.
    ///
    /// A later model with the same key replaces the earlier one.
    pub fn insert(&mut self, model: MessageModel) {
        self.models
            .insert((model.package.clone(), model.name.clone()), model);
    }

    /// Look up a model by package and name
    #[must_use]
    pub fn get(&self, package: &str, name: &str) -> Option<&MessageModel> {
        self.models
            .get(&(package.to_string(), name.to_string()))
    }

    /// Whether a model with this package and name is registered
    #[must_use]
    pub fn contains(&self, package: &str, name: &str) -> bool {
        self.get(package, name).is_some()
    }

    /// Number of registered models
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
