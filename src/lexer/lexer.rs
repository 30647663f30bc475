use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::{
    errors::errors::{Error, ParseError},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Handles text matched by a pattern. Returning `None` skips the text.
pub type RegexHandler = fn(&mut Lexer, &str) -> Option<Token>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

impl RegexPattern {
    fn new(pattern: &str, handler: RegexHandler) -> Self {
        RegexPattern {
            regex: Regex::new(pattern).expect("lexer patterns are valid regexes"),
            handler,
        }
    }
}

lazy_static! {
    // Order matters: the first pattern matching at the cursor wins, so
    // longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern::new(r"^\s+", skip_handler),
        RegexPattern::new(r"^//[^\n]*", skip_handler),
        RegexPattern::new(r"^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        RegexPattern::new(r"^0x[0-9a-fA-F]+", |lexer: &mut Lexer, text: &str| {
            Some(lexer.emit(TokenKind::Hex, text.to_string(), text.len()))
        }),
        RegexPattern::new(r"^0b[01]+", |lexer: &mut Lexer, text: &str| {
            Some(lexer.emit(TokenKind::Binary, text.to_string(), text.len()))
        }),
        RegexPattern::new(r"^[0-9]+\.[0-9]+", |lexer: &mut Lexer, text: &str| {
            Some(lexer.emit(TokenKind::Float, text.to_string(), text.len()))
        }),
        RegexPattern::new(r"^[0-9]+", |lexer: &mut Lexer, text: &str| {
            Some(lexer.emit(TokenKind::Integer, text.to_string(), text.len()))
        }),
        RegexPattern::new(r#"^"(\\.|[^"\\])*""#, string_handler),
        RegexPattern::new(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        RegexPattern::new(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        RegexPattern::new(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        RegexPattern::new(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        RegexPattern::new(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        RegexPattern::new(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        RegexPattern::new(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        RegexPattern::new(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        RegexPattern::new(r"^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        RegexPattern::new(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        RegexPattern::new(r"^<<", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<")),
        RegexPattern::new(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        RegexPattern::new(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        RegexPattern::new(r"^>>", MK_DEFAULT_HANDLER!(TokenKind::ShiftRight, ">>")),
        RegexPattern::new(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        RegexPattern::new(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        RegexPattern::new(r"^\|\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        RegexPattern::new(r"^\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|")),
        RegexPattern::new(r"^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        RegexPattern::new(r"^&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&")),
        RegexPattern::new(r"^\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
        RegexPattern::new(r"^@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
        RegexPattern::new(r"^\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        RegexPattern::new(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        RegexPattern::new(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        RegexPattern::new(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        RegexPattern::new(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        RegexPattern::new(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        RegexPattern::new(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        RegexPattern::new(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        RegexPattern::new(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

/// A pull-based tokenizer over one in-memory source.
pub struct Lexer {
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
    finished: bool,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            source,
            pos: 0,
            line: 1,
            column: 1,
            file: file_name,
            finished: false,
        }
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.pos as u32, self.line, self.column, Rc::clone(&self.file))
    }

    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for c in self.source[self.pos..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    /// Builds a token starting at the cursor and moves past `length` bytes.
    pub fn emit(&mut self, kind: TokenKind, value: String, length: usize) -> Token {
        let start = self.current_position();
        self.advance_n(length);

        MK_TOKEN!(kind, value, Span { start, end: self.current_position() })
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Produces the next token. Once the source is exhausted every call
    /// returns an `EOF` token.
    pub fn next_token(&mut self) -> Token {
        loop {
            if self.at_eof() {
                let position = self.current_position();
                return MK_TOKEN!(
                    TokenKind::EOF,
                    String::from("EOF"),
                    Span { start: position.clone(), end: position }
                );
            }

            let matched = PATTERNS.iter().find_map(|pattern| {
                pattern
                    .regex
                    .find(self.remainder())
                    .map(|m| (pattern.handler, m.as_str().to_string()))
            });

            match matched {
                Some((handler, text)) => {
                    if let Some(token) = handler(self, &text) {
                        return token;
                    }
                }
                None => {
                    let illegal = self.remainder().chars().next().unwrap_or('\0');
                    return self.emit(TokenKind::Illegal, illegal.to_string(), illegal.len_utf8());
                }
            }
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields every token including a single trailing `EOF`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.kind == TokenKind::EOF {
            self.finished = true;
        }

        Some(token)
    }
}

fn skip_handler(lexer: &mut Lexer, text: &str) -> Option<Token> {
    lexer.advance_n(text.len());
    None
}

fn symbol_handler(lexer: &mut Lexer, text: &str) -> Option<Token> {
    let kind = RESERVED_LOOKUP
        .get(text)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    Some(lexer.emit(kind, text.to_string(), text.len()))
}

fn string_handler(lexer: &mut Lexer, text: &str) -> Option<Token> {
    let string_literal = &text[1..text.len() - 1];

    let mut result = String::new();
    let mut chars = string_literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('n') => {
                result.push('\n');
                chars.next();
            }
            Some('t') => {
                result.push('\t');
                chars.next();
            }
            Some('r') => {
                result.push('\r');
                chars.next();
            }
            Some('\\') => {
                result.push('\\');
                chars.next();
            }
            Some('"') => {
                result.push('"');
                chars.next();
            }
            Some('0') => {
                result.push('\0');
                chars.next();
            }
            Some('x') => {
                chars.next();
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex.push(*c);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                // Literals are stored as UTF-8, so only ASCII bytes survive
                // as a single byte.
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) if byte.is_ascii() => result.push(byte as char),
                    Ok(_) => {
                        return Some(lexer.emit(TokenKind::Illegal, format!("\\x{}", hex), text.len()));
                    }
                    Err(_) => {
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
            }
            // Unknown escapes keep the backslash
            _ => result.push(ch),
        }
    }

    Some(lexer.emit(TokenKind::String, result, text.len()))
}

/// Collects the whole token stream, failing on the first illegal character.
pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut tokens = vec![];

    for token in Lexer::new(source, file) {
        if token.kind == TokenKind::Illegal {
            return Err(Error::new(
                ParseError::UnrecognisedToken { token: token.value },
                token.span.start,
            ));
        }

        tokens.push(token);
    }

    trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}
