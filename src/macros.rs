//! Macros shared by the lexer.

/// Builds a [`Token`](crate::lexer::tokens::Token) from its kind, text and span.
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// A lexer handler for punctuation and operators, whose text is fixed.
///
/// ```ignore
/// RegexPattern::new(r"^<<", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<"))
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _text: &str| Some(lexer.emit($kind, String::from($value), $value.len()))
    };
}
