//! Schema compiler for robotics interface definitions
//!
//! `ros2msgc` turns line-oriented message definition files into Rust source
//! and compiles generated packages into loadable modules. It is organized as
//! three layers:
//!
//! - [`msg`]: the definition grammar, type catalog, and message model
//! - [`generator`]: Rust code emission from a parsed model
//! - [`build`]: source-set compilation and installed-module discovery
//!
//! The [`ops`] module composes the layers into the two entry points a
//! packaging pipeline calls.
//!
//! # Example
//!
//! ```
//! use ros2msgc::msg::{Role, parse_message_string};
//! use ros2msgc::generator::{CodeGenerator, ModelCatalog};
//!
//! let model = parse_message_string(
//!     "geometry_msgs",
//!     "Point",
//!     Role::Message,
//!     "float64 x\nfloat64 y\nfloat64 z\n",
//! )?;
//!
//! let code = CodeGenerator::new().generate(&model, &ModelCatalog::new())?;
//! assert!(code.contains("pub struct Point"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod build;
pub mod generator;
pub mod msg;
pub mod ops;

pub use build::{BuildDriver, BuildError, BuildOutcome, CompileDiagnostic, Severity};
pub use generator::{CodeGenerator, GeneratorError, ModelCatalog};
pub use msg::{MessageModel, ParseError, Role};
pub use ops::{compile_package, generate_from_file};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
