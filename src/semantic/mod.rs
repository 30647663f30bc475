//! Semantic analysis.
//!
//! Walks a parsed [`Program`](crate::ast::ast::Program), resolving named
//! types, checking every expression and statement, and compiling imported
//! files into [`Module`](modules::Module)s. Types are written back into the
//! tree so later stages never see an unresolved name.

pub mod builtins;
pub mod expressions;
pub mod modules;
pub mod semantic;
pub mod symbols;

#[cfg(test)]
mod tests;
