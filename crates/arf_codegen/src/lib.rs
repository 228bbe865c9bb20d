//! Code generation back-end for resolved arf schemas.
//!
//! [`generate_all`] renders one source file per package for the language selected in
//! [`GeneratorOptions`]. Everything below it is dialect independent: [`TypeMapper`]
//! converts IDL types, [`names`] derives canonical names, [`method`] classifies service
//! methods and lays out their signatures, and [`IndentedWriter`] collects the text.

pub mod dialect;
pub mod error;
pub mod generator;
pub mod method;
pub mod names;
pub mod options;
pub mod targets;
pub mod types;
pub mod writer;

pub use error::{CodegenError, Result};
pub use generator::{generate_all, Generated, GeneratedFile, Generator};
pub use method::{MethodDefinition, Shape, Signature};
pub use options::{parse_mapping, GeneratorOptions, Language};
pub use types::TypeMapper;
pub use writer::IndentedWriter;
