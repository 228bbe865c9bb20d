//! Back-end of the arf IDL compiler.
//!
//! `ast` holds the resolved declaration tree, `codegen` turns it into Go or Ruby sources.

pub use arf_ast as ast;
pub use arf_codegen as codegen;
