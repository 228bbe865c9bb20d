//! Resolved declaration tree consumed by the arf code generators.
//!
//! Everything here is produced by the front-end (parser and resolver) and is immutable
//! once built. Declarations live in a single arena owned by [`Schema`]; nesting is
//! expressed with [`DeclId`] indices, never with owning pointers.

mod schema;

pub use schema::*;
