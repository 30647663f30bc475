//! Lexical analysis.
//!
//! Converts source text into a pull-based stream of tokens. It handles:
//!
//! - Tokenization of source code using an ordered table of anchored regex patterns
//! - Recognition of keywords, identifiers, numeric and string literals, and operators
//! - Line/column tracking for error reporting
//! - Comments and whitespace handling
//!
//! Characters no pattern accepts become `Illegal` tokens; reporting them is
//! left to the parser.

pub mod lexer;
pub mod tokens;
