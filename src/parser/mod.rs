//! Turns a token stream into a [`Program`](crate::ast::ast::Program).
//!
//! Expressions go through a Pratt parser: [`lookups`] maps every token kind
//! to its binding power and to the prefix (NUD) or infix (LED) handler that
//! owns it. Statements and types use separate lookup tables keyed the same
//! way. Every name a file declares is qualified with the file's program id
//! here, and `type T` statements are filled in from the importer's type
//! arguments.
//!
//! Errors are collected, not returned early: a statement that fails to parse
//! is skipped and parsing resumes at the next one.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
