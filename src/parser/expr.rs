use std::rc::Rc;

use crate::{
    ast::{
        ast::Operation,
        expressions::{Expr, ExprKind, FieldInit},
        types::{FunctionType, Type},
    },
    errors::errors::{Error, ParseError},
    lexer::tokens::{Token, TokenKind},
};

use super::{
    lookups::{BindingPower, BUILTIN_LOOKUP},
    parser::Parser,
    stmt::{parse_block, parse_parameters},
    types::parse_type,
};

/// Precedence climbing: parses a prefix expression, then keeps folding infix
/// operators that bind tighter than `bp`.
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    let token_kind = parser.current_token_kind();
    let mut left = match parser.get_nud_lookup().get(&token_kind).copied() {
        Some(nud) => nud(parser)?,
        None => parse_unknown_prefix(parser),
    };

    while parser.current_token_kind() != TokenKind::Semicolon
        && parser.has_tokens()
        && bp < parser.current_binding_power()
    {
        let Some(led) = parser
            .get_led_lookup()
            .get(&parser.current_token_kind())
            .copied()
        else {
            break;
        };

        let binding_power = parser.current_binding_power();
        left = led(parser, left, binding_power)?;
    }

    Ok(left)
}

/// Records the error, skips the offending token and stands in a literal so
/// the surrounding statement can still be parsed.
fn parse_unknown_prefix(parser: &mut Parser) -> Expr {
    let token = parser.current_token().clone();
    let error = if token.kind == TokenKind::Illegal {
        ParseError::UnrecognisedToken {
            token: token.value.clone(),
        }
    } else {
        ParseError::UnknownPrefix {
            token: token.to_string(),
        }
    };
    parser.error(Error::new(error, token.span.start.clone()));
    parser.advance();

    Expr::new(ExprKind::Integer(1), Type::Integer(32), token)
}

fn parse_integer(token: &Token) -> Result<i64, Error> {
    let result = match token.kind {
        TokenKind::Hex => i64::from_str_radix(&token.value[2..], 16),
        TokenKind::Binary => i64::from_str_radix(&token.value[2..], 2),
        _ => token.value.parse(),
    };

    result.map_err(|_| {
        Error::new(
            ParseError::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start.clone(),
        )
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();

    let expr = match token.kind {
        TokenKind::Integer | TokenKind::Hex | TokenKind::Binary => {
            let value = parse_integer(&token)?;
            Expr::new(ExprKind::Integer(value), Type::Integer(32), token)
        }
        TokenKind::Float => {
            let value = token.value.parse().map_err(|_| {
                Error::new(
                    ParseError::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                )
            })?;
            Expr::new(ExprKind::Float(value), Type::Float(64), token)
        }
        TokenKind::String => Expr::new(
            ExprKind::String(token.value.clone()),
            Type::pointer(Type::Integer(8)),
            token,
        ),
        TokenKind::True => Expr::new(ExprKind::Integer(1), Type::boolean(), token),
        TokenKind::False => Expr::new(ExprKind::Integer(0), Type::boolean(), token),
        TokenKind::Identifier => {
            Expr::untyped(ExprKind::Identifier(parser.qualify(&token.value)), token)
        }
        _ => {
            return Err(Error::new(
                ParseError::UnknownPrefix {
                    token: token.to_string(),
                },
                token.span.start.clone(),
            ))
        }
    };

    Ok(expr)
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let right = parse_expr(parser, bp)?;

    let op = Operation::from_infix(operator_token.kind)
        .ok_or_else(|| unexpected_token(&operator_token, "operator"))?;

    Ok(Expr::untyped(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        operator_token,
    ))
}

/// `a, b, c`. Items bind tighter than the comma, so a list is flat.
pub fn parse_comma_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let token = left.token.clone();
    let mut expressions = vec![left];

    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        expressions.push(parse_expr(parser, BindingPower::Comma)?);
    }

    Ok(Expr::untyped(ExprKind::Comma(expressions), token))
}

fn unexpected_token(token: &Token, expected: &str) -> Error {
    Error::new(
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            got: token.to_string(),
        },
        token.span.start.clone(),
    )
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let operand = parse_expr(parser, BindingPower::Prefix)?;

    let op = Operation::from_prefix(operator_token.kind)
        .ok_or_else(|| unexpected_token(&operator_token, "prefix operator"))?;

    Ok(Expr::untyped(
        ExprKind::Prefix {
            op,
            operand: Box::new(operand),
        },
        operator_token,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Comma separated expressions up to and including `closing`.
fn parse_arguments(parser: &mut Parser, closing: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut args = vec![];

    while parser.current_token_kind() != closing {
        if !parser.has_tokens() {
            return Err(parser.unexpected(&closing.to_string()));
        }

        args.push(parse_expr(parser, BindingPower::Comma)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != closing {
            return Err(parser.unexpected(&closing.to_string()));
        }
    }

    parser.expect(closing)?;
    Ok(args)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let token = parser.advance();
    let args = parse_arguments(parser, TokenKind::CloseParen)?;

    Ok(Expr::untyped(
        ExprKind::Call {
            callee: Box::new(left),
            args,
        },
        token,
    ))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let token = parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::untyped(
        ExprKind::Index {
            base: Box::new(left),
            index: Box::new(index),
        },
        token,
    ))
}

/// `a.b`, or `module.@Name{...}` which becomes a struct literal tagged with
/// its module.
pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let operator = parser.advance();
    let member = parse_expr(parser, BindingPower::Member)?;

    if let (ExprKind::Identifier(module), ExprKind::StructLiteral { .. }) =
        (&left.kind, &member.kind)
    {
        let module = module.clone();
        let Expr { kind, ty, token } = member;
        let ExprKind::StructLiteral { name, fields, .. } = kind else {
            unreachable!("checked above");
        };

        return Ok(Expr::new(
            ExprKind::StructLiteral {
                name,
                module: Some(module),
                fields,
            },
            ty,
            token,
        ));
    }

    Ok(Expr::untyped(
        ExprKind::Binary {
            left: Box::new(left),
            op: Operation::Dot,
            right: Box::new(member),
        },
        operator,
    ))
}

/// `value as T` is sugar for `@cast(T, value)`.
pub fn parse_cast_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let token = parser.advance();
    let ty = parse_type(parser)?;

    Ok(Expr::untyped(
        ExprKind::Builtin {
            name: String::from("cast"),
            type_args: vec![ty],
            args: vec![left],
        },
        token,
    ))
}

/// Everything introduced by `@`: builtin calls and struct literals.
pub fn parse_at_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();
    let name = parser.expect(TokenKind::Identifier)?;

    if parser.current_token_kind() == TokenKind::OpenCurly {
        return parse_struct_literal(parser, name);
    }

    parse_builtin_call(parser, token, name)
}

fn parse_builtin_call(parser: &mut Parser, token: Token, name: Token) -> Result<Expr, Error> {
    let Some(requirements) = BUILTIN_LOOKUP.get(name.value.as_str()).copied() else {
        return Err(Error::new(
            ParseError::UnknownBuiltin {
                name: name.value.clone(),
            },
            name.span.start.clone(),
        ));
    };

    parser.expect(TokenKind::OpenParen)?;

    let mut type_args = vec![];
    for _ in 0..requirements.type_args {
        if parser.current_token_kind() == TokenKind::CloseParen {
            return Err(Error::new(
                ParseError::MissingTypeArguments {
                    name: name.value.clone(),
                    expected: requirements.type_args,
                },
                parser.get_position(),
            ));
        }

        type_args.push(parse_type(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }

    let args = parse_arguments(parser, TokenKind::CloseParen)?;

    Ok(Expr::untyped(
        ExprKind::Builtin {
            name: name.value,
            type_args,
            args,
        },
        token,
    ))
}

fn parse_struct_literal(parser: &mut Parser, name: Token) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut fields = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let field_name = parser.expect(TokenKind::Identifier)?.value;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expr(parser, BindingPower::Comma)?;

        fields.push(FieldInit {
            name: field_name,
            value,
        });

        match parser.current_token_kind() {
            TokenKind::Comma | TokenKind::Semicolon => {
                parser.advance();
            }
            TokenKind::CloseCurly => {}
            _ => return Err(parser.unexpected(&TokenKind::CloseCurly.to_string())),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    let qualified = parser.qualify(&name.value);
    Ok(Expr::untyped(
        ExprKind::StructLiteral {
            name: qualified,
            module: None,
            fields,
        },
        name,
    ))
}

/// `[N]T{a, b, c}`
pub fn parse_array_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();
    let array_type = parse_type(parser)?;

    parser.expect(TokenKind::OpenCurly)?;
    let elements = parse_arguments(parser, TokenKind::CloseCurly)?;

    Ok(Expr::new(
        ExprKind::ArrayLiteral {
            array_type: array_type.clone(),
            elements,
        },
        array_type,
        token,
    ))
}

/// `func(a T, b U) R { ... }`, a function value without a name.
pub fn parse_function_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.expect(TokenKind::Func)?;
    let (names, parameters, _) = parse_parameters(parser)?;

    let return_type = if parser.current_token_kind() == TokenKind::OpenCurly {
        Type::Void
    } else {
        parse_type(parser)?
    };

    let body = parse_block(parser)?;
    let function = FunctionType {
        name: String::new(),
        parameters,
        names,
        return_type,
    };

    Ok(Expr::untyped(
        ExprKind::Function {
            function: Rc::new(function),
            body,
        },
        token,
    ))
}
