//! The abstract syntax tree the external frontend hands to the translator.
//!
//! The node set is closed; every construct that can raise a diagnostic
//! carries its source line.

pub mod ast;

pub use self::ast::*;
