//! Abstract syntax tree and type model.
//!
//! Submodules:
//! - ast: programs, blocks, operators and qualified-name helpers
//! - expressions: the expression node family
//! - statements: the statement node family
//! - types: the structural type model with size/alignment rules
//!
//! Nodes are closed enums. The parser builds the tree; the semantic
//! analyzer only overwrites the `Type` fields in place.
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
