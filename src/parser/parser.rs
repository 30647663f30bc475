//! Parser implementation for building the Abstract Syntax Tree.
//!
//! The parser pulls tokens from a [`Lexer`] one at a time, keeping the
//! current token and one token of lookahead. It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//! - Type parsing handlers
//!
//! Every declared name is qualified with the program id, and `type T`
//! generics are substituted while parsing.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{create_identifier, Program},
        types::Type,
    },
    errors::errors::{Error, ParseError},
    lexer::{
        lexer::Lexer,
        tokens::{Token, TokenKind},
    },
    session::IdGenerator,
    Position,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_statements,
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// Everything a parser needs besides its tokens.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Suffix used to qualify every name declared in the file.
    pub program_id: String,
    /// Concrete types consumed, in order, by `type T` statements.
    pub generics: Vec<Type>,
    pub ids: IdGenerator,
    pub max_errors: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            program_id: String::from("0"),
            generics: vec![],
            ids: IdGenerator::new(),
            max_errors: 10,
        }
    }
}

/// The main parser structure that maintains parsing state.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    program_id: String,
    ids: IdGenerator,
    /// Type arguments not yet bound by a `type T` statement
    generic_args: VecDeque<Type>,
    /// Generic names bound so far in this file
    generics: HashMap<String, Type>,
    errors: Vec<Error>,
    max_errors: usize,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Lookup table for type null denotation handlers
    type_nud_lookup: TypeNUDLookup,
}

impl Parser {
    /// Creates a parser with its lookup tables registered and the first two
    /// tokens read.
    pub fn new(mut lexer: Lexer, options: ParserOptions) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        let mut parser = Parser {
            lexer,
            current,
            peek,
            program_id: options.program_id,
            ids: options.ids,
            generic_args: options.generics.into(),
            generics: HashMap::new(),
            errors: vec![],
            max_errors: options.max_errors.max(1),
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        };

        create_token_lookups(&mut parser);
        create_token_type_lookups(&mut parser);

        parser
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Returns the kind of the token after the current one.
    pub fn peek_token_kind(&self) -> TokenKind {
        self.peek.kind
    }

    /// Advances to the next token and returns the previous one.
    pub fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let peek = std::mem::replace(&mut self.peek, next);
        std::mem::replace(&mut self.current, peek)
    }

    /// Consumes the current token if it has the expected kind.
    ///
    /// # Returns
    ///
    /// The consumed token, or an `UnexpectedToken` error positioned at the
    /// current token.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        if self.current.kind != expected_kind {
            return Err(self.unexpected(&expected_kind.to_string()));
        }

        Ok(self.advance())
    }

    /// Builds an `UnexpectedToken` error for the current token.
    pub fn unexpected(&self, expected: &str) -> Error {
        Error::new(
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                got: self.current.to_string(),
            },
            self.get_position(),
        )
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current.kind != TokenKind::EOF
    }

    /// Consumes any run of semicolons.
    pub fn skip_semicolons(&mut self) {
        while self.current.kind == TokenKind::Semicolon {
            self.advance();
        }
    }

    /// Records a non-fatal error.
    pub fn error(&mut self, error: Error) {
        trace!(error = %error, "parse error");
        if !self.is_saturated() {
            self.errors.push(error);
        }
    }

    /// Whether the error cap has been reached.
    pub fn is_saturated(&self) -> bool {
        self.errors.len() >= self.max_errors
    }

    pub fn get_errors(&self) -> &[Error] {
        &self.errors
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the type NUD lookup table.
    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Binding power of the current token, `Default` if it is not an infix
    /// operator.
    pub fn current_binding_power(&self) -> BindingPower {
        self.binding_power_lookup
            .get(&self.current.kind)
            .copied()
            .unwrap_or(BindingPower::Default)
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a type null denotation handler.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    /// Qualifies a declared or referenced name with this file's program id.
    pub fn qualify(&self, name: &str) -> String {
        create_identifier(name, &self.program_id)
    }

    /// A fresh id for a struct or union declaration.
    pub fn next_type_id(&self) -> u64 {
        self.ids.next_id()
    }

    /// Takes the next type argument supplied by the importer, if any is left.
    pub fn next_generic_argument(&mut self) -> Option<Type> {
        self.generic_args.pop_front()
    }

    /// Binds a generic name for the rest of the file.
    pub fn define_generic(&mut self, name: &str, ty: Type) {
        self.generics.insert(name.to_string(), ty);
    }

    pub fn generic(&self, name: &str) -> Option<&Type> {
        self.generics.get(name)
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current.span.start.clone()
    }
}

/// Parses a whole source file.
///
/// This is the main entry point for parsing. Errors do not stop the parse:
/// every statement that can be parsed is returned together with every error
/// recorded, up to the configured cap.
pub fn parse(lexer: Lexer, options: ParserOptions) -> (Program, Vec<Error>) {
    let mut parser = Parser::new(lexer, options);
    debug!(program_id = %parser.program_id, "parsing program");

    let statements = parse_statements(&mut parser, TokenKind::EOF);

    if parser.is_saturated() && parser.has_tokens() {
        let count = parser.errors.len();
        let position = parser.get_position();
        parser
            .errors
            .push(Error::new(ParseError::TooManyErrors { count }, position));
    }

    debug!(
        statements = statements.len(),
        errors = parser.errors.len(),
        "parsed program"
    );

    let program = Program {
        id: parser.program_id,
        statements,
    };

    (program, parser.errors)
}
