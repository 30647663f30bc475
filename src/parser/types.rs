//! Type parsing implementation.
//!
//! Types are written prefix style, so only null denotation handlers exist:
//!
//! - `*T` pointers
//! - `[N]T` fixed size arrays
//! - `func(A, B) R` function types
//! - names: primitives, generics bound by `type T`, local types and
//!   `module.Name` references into imported modules
//!
//! Named types that are not primitives or generics become anonymous
//! references, resolved later by the analyzer.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::types::{AnonymousType, FunctionType, Type},
    errors::errors::{Error, ParseError},
    lexer::tokens::{Token, TokenKind},
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::Star, parse_pointer_type);
    parser.type_nud(TokenKind::OpenBracket, parse_array_type);
    parser.type_nud(TokenKind::Func, parse_function_type);
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("type"));
    };

    nud(parser)
}

/// Whether `token` can begin a type.
pub fn starts_type(parser: &Parser, token: &Token) -> bool {
    parser.get_type_nud_lookup().contains_key(&token.kind)
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    if let Some(primitive) = Type::from_primitive(&token.value) {
        return Ok(primitive);
    }

    if let Some(generic) = parser.generic(&token.value) {
        return Ok(generic.clone());
    }

    let mut path = vec![token.value];
    while parser.current_token_kind() == TokenKind::Dot
        && parser.peek_token_kind() == TokenKind::Identifier
    {
        parser.advance();
        path.push(parser.advance().value);
    }

    let mut names: Vec<String> = path.iter().map(|name| parser.qualify(name)).collect();
    let name = names.pop().unwrap_or_default();

    Ok(Type::Anonymous(AnonymousType {
        name,
        modules: names,
    }))
}

pub fn parse_pointer_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::Star)?;
    Ok(Type::pointer(parse_type(parser)?))
}

pub fn parse_array_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenBracket)?;

    let size = parser.advance();
    let length = match size.kind {
        TokenKind::Integer => size.value.parse::<u64>().ok(),
        TokenKind::Hex => u64::from_str_radix(&size.value[2..], 16).ok(),
        TokenKind::Binary => u64::from_str_radix(&size.value[2..], 2).ok(),
        _ => None,
    };
    let Some(length) = length else {
        return Err(Error::new(
            ParseError::InvalidArraySize {
                token: size.to_string(),
            },
            size.span.start.clone(),
        ));
    };

    parser.expect(TokenKind::CloseBracket)?;
    Ok(Type::array(parse_type(parser)?, length))
}

/// `func(A, B) R`. The return type must start on the same line as the
/// closing parenthesis, otherwise the function returns void.
pub fn parse_function_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::Func)?;
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        parameters.push(parse_type(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected(&TokenKind::CloseParen.to_string()));
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;
    let return_type = parse_trailing_return_type(parser, &close)?;

    Ok(Type::Function(Rc::new(FunctionType {
        name: String::new(),
        names: vec![String::new(); parameters.len()],
        parameters,
        return_type,
    })))
}

/// Return type following `close`, or void if the next token does not start
/// a type on the same line.
pub fn parse_trailing_return_type(parser: &mut Parser, close: &Token) -> Result<Type, Error> {
    let current = parser.current_token();
    if starts_type(parser, current) && current.line() == close.line() {
        parse_type(parser)
    } else {
        Ok(Type::Void)
    }
}
