use std::rc::Rc;

use crate::{
    ast::{
        ast::{Block, Operation},
        expressions::{Expr, ExprKind},
        statements::{
            AssignmentStmt, ConditionalBlock, DeclarationStmt, ExpressionStmt, ExternStmt,
            ForStmt, FunctionDeclStmt, GenericTypeStmt, IfStmt, ImportStmt,
            MultipleDeclarationStmt, ReturnStmt, Stmt, StructStmt, UnionStmt,
        },
        types::{Field, FunctionType, StructType, Type, UnionType},
    },
    errors::errors::{Error, ParseError},
    lexer::tokens::{Token, TokenKind},
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    parser::Parser,
    types::{parse_trailing_return_type, parse_type},
};

/// Parses statements until `terminator` (not consumed) or the end of input.
///
/// A statement that fails is recorded and skipped: the parser always moves
/// at least one token forward before trying the next statement.
pub fn parse_statements(parser: &mut Parser, terminator: TokenKind) -> Vec<Stmt> {
    let mut statements = vec![];

    parser.skip_semicolons();
    while parser.has_tokens() && parser.current_token_kind() != terminator {
        if parser.is_saturated() {
            break;
        }

        let start = parser.current_token().span.start.offset;
        match parse_stmt(parser) {
            Ok(stmt) => statements.push(stmt),
            Err(error) => {
                parser.error(error);
                if parser.current_token().span.start.offset == start {
                    parser.advance();
                }
            }
        }

        parser.skip_semicolons();
    }

    statements
}

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = parser.current_token_kind();
    // `func(` starts a function literal rather than a declaration.
    let literal = kind == TokenKind::Func && parser.peek_token_kind() == TokenKind::OpenParen;

    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied().filter(|_| !literal) {
        return handler(parser);
    }

    if kind == TokenKind::Identifier && parser.peek_token_kind() == TokenKind::Colon {
        return parse_declaration_stmt(parser);
    }

    let token = parser.current_token().clone();
    let expression = parse_expr(parser, BindingPower::Default)?;

    if let ExprKind::Comma(_) = expression.kind {
        if parser.current_token_kind() == TokenKind::Colon {
            return parse_multiple_declaration_stmt(parser, expression);
        }
    }

    into_statement(token, expression)
}

/// `a, b : T = x, y` or `a, b := x, y`, with the names already parsed.
fn parse_multiple_declaration_stmt(parser: &mut Parser, names: Expr) -> Result<Stmt, Error> {
    let token = names.token.clone();
    let ExprKind::Comma(expressions) = names.kind else {
        return Err(Error::new(ParseError::InvalidAssignment, token.span.start));
    };

    parser.expect(TokenKind::Colon)?;
    let ty = if parser.current_token_kind() == TokenKind::Assignment {
        Type::Todo
    } else {
        parse_type(parser)?
    };

    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default)?;

    // Names are checked once the whole statement is consumed so that
    // recovery resumes after it.
    let mut declared = Vec::with_capacity(expressions.len());
    for expression in expressions {
        match expression.kind {
            ExprKind::Identifier(name) => declared.push(name),
            _ => {
                return Err(Error::new(
                    ParseError::InvalidAssignment,
                    expression.token.span.start,
                ))
            }
        }
    }

    Ok(Stmt::MultipleDeclaration(MultipleDeclarationStmt {
        token,
        types: vec![ty.clone(); declared.len()],
        names: declared,
        ty,
        value,
    }))
}

/// Binary `=` at statement level is an assignment, as long as its target is
/// something that can be written to.
fn into_statement(token: Token, expression: Expr) -> Result<Stmt, Error> {
    let ExprKind::Binary {
        op: Operation::Assign,
        ..
    } = &expression.kind
    else {
        return Ok(Stmt::Expression(ExpressionStmt { token, expression }));
    };

    let position = expression.token.span.start.clone();
    let ExprKind::Binary { left, right, .. } = expression.kind else {
        unreachable!("checked above");
    };

    if !is_assignable(&left) {
        return Err(Error::new(ParseError::InvalidAssignment, position));
    }

    Ok(Stmt::Assignment(AssignmentStmt {
        token,
        target: *left,
        value: *right,
    }))
}

fn is_assignable(target: &Expr) -> bool {
    if let ExprKind::Comma(targets) = &target.kind {
        return targets.iter().all(is_assignable);
    }

    matches!(
        target.kind,
        ExprKind::Identifier(_)
            | ExprKind::Index { .. }
            | ExprKind::Binary {
                op: Operation::Dot,
                ..
            }
            | ExprKind::Prefix {
                op: Operation::Dereference,
                ..
            }
    )
}

/// `name : T = value` or `name := value`.
pub fn parse_declaration_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    parser.expect(TokenKind::Colon)?;

    let ty = if parser.current_token_kind() == TokenKind::Assignment {
        Type::Todo
    } else {
        parse_type(parser)?
    };

    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::Declaration(DeclarationStmt {
        name: parser.qualify(&token.value),
        token,
        ty,
        value,
    }))
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    parser.expect(TokenKind::OpenCurly)?;
    let statements = parse_statements(parser, TokenKind::CloseCurly);
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Block::new(statements))
}

/// A braced block, or a single statement standing in for one.
fn parse_body(parser: &mut Parser) -> Result<Block, Error> {
    if parser.current_token_kind() == TokenKind::OpenCurly {
        return parse_block(parser);
    }

    Ok(Block::new(vec![parse_stmt(parser)?]))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let block = parse_body(parser)?;

    let mut else_ifs = vec![];
    let mut else_block = None;

    while parser.current_token_kind() == TokenKind::Else {
        parser.advance();

        if parser.current_token_kind() != TokenKind::If {
            else_block = Some(parse_body(parser)?);
            break;
        }

        parser.advance();
        let condition = parse_expr(parser, BindingPower::Default)?;
        let block = parse_body(parser)?;
        else_ifs.push(ConditionalBlock { condition, block });
    }

    Ok(Stmt::If(IfStmt {
        token,
        condition,
        block,
        else_ifs,
        else_block,
    }))
}

/// The four loop forms, told apart by what follows the first statement:
///
/// - `for { ... }` loops forever
/// - `for cond { ... }` is a while loop
/// - `for init; cond; post { ... }` with an optional condition and post
/// - `for stmt` repeats a single statement forever
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();

    let mut for_stmt = ForStmt {
        token,
        init: None,
        condition: None,
        post: None,
        body: Block::default(),
    };

    if parser.current_token_kind() == TokenKind::OpenCurly {
        for_stmt.body = parse_block(parser)?;
        return Ok(Stmt::For(for_stmt));
    }

    let first = parse_stmt(parser)?;

    match parser.current_token_kind() {
        TokenKind::OpenCurly => {
            let Stmt::Expression(condition) = first else {
                return Err(parser.unexpected(&TokenKind::Semicolon.to_string()));
            };
            for_stmt.condition = Some(condition.expression);
            for_stmt.body = parse_block(parser)?;
        }
        TokenKind::Semicolon => {
            parser.advance();
            for_stmt.init = Some(Box::new(first));

            if parser.current_token_kind() != TokenKind::Semicolon {
                for_stmt.condition = Some(parse_expr(parser, BindingPower::Default)?);
            }

            if parser.current_token_kind() == TokenKind::Semicolon {
                parser.advance();
                if parser.current_token_kind() != TokenKind::OpenCurly {
                    for_stmt.post = Some(Box::new(parse_stmt(parser)?));
                }
            }

            parser.skip_semicolons();
            for_stmt.body = parse_block(parser)?;
        }
        _ => {
            for_stmt.body = Block::new(vec![first]);
        }
    }

    Ok(Stmt::For(for_stmt))
}

/// Fields of a struct or union body: `name T`, optionally separated by `,`
/// or `;`.
fn parse_fields(parser: &mut Parser) -> Result<Vec<Field>, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut fields = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let name = parser.expect(TokenKind::Identifier)?;
        let ty = parse_type(parser)?;
        fields.push(Field::new(name.value, ty));

        while parser.current_token().is_one_of_many(&[TokenKind::Comma, TokenKind::Semicolon]) {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(fields)
}

pub fn parse_struct_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();
    let name = parser.expect(TokenKind::Identifier)?;
    let fields = parse_fields(parser)?;

    let ty = StructType {
        name: parser.qualify(&name.value),
        fields,
        id: parser.next_type_id(),
    };

    Ok(Stmt::Struct(StructStmt {
        token,
        ty: Rc::new(ty),
    }))
}

pub fn parse_union_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();
    let name = parser.expect(TokenKind::Identifier)?;
    let fields = parse_fields(parser)?;

    let ty = UnionType {
        name: parser.qualify(&name.value),
        fields,
        id: parser.next_type_id(),
    };

    Ok(Stmt::Union(UnionStmt {
        token,
        ty: Rc::new(ty),
    }))
}

/// `(a T, b U)`, returning the qualified names, the types and the closing
/// parenthesis.
pub(super) fn parse_parameters(parser: &mut Parser) -> Result<(Vec<String>, Vec<Type>, Token), Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut names = vec![];
    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = parser.expect(TokenKind::Identifier)?;
        names.push(parser.qualify(&name.value));
        parameters.push(parse_type(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected(&TokenKind::CloseParen.to_string()));
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;
    Ok((names, parameters, close))
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();
    let name = parser.expect(TokenKind::Identifier)?;
    let (names, parameters, _) = parse_parameters(parser)?;

    let return_type = if parser.current_token_kind() == TokenKind::OpenCurly {
        Type::Void
    } else {
        parse_type(parser)?
    };

    let body = parse_block(parser)?;

    let function = FunctionType {
        name: parser.qualify(&name.value),
        parameters,
        names,
        return_type,
    };

    Ok(Stmt::FunctionDecl(FunctionDeclStmt {
        token,
        function: Rc::new(function),
        body,
    }))
}

/// `extern func name(a T) R`. The name is kept as written since it refers to
/// a symbol outside the program.
pub fn parse_extern_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();
    parser.expect(TokenKind::Func)?;
    let name = parser.expect(TokenKind::Identifier)?;
    let (names, parameters, close) = parse_parameters(parser)?;
    let return_type = parse_trailing_return_type(parser, &close)?;

    Ok(Stmt::Extern(ExternStmt {
        token,
        function: Rc::new(FunctionType {
            name: name.value,
            parameters,
            names,
            return_type,
        }),
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();

    let value = if parser.current_token().is_one_of_many(&[
        TokenKind::Semicolon,
        TokenKind::CloseCurly,
        TokenKind::EOF,
    ]) {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };

    Ok(Stmt::Return(ReturnStmt { token, value }))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Break(parser.advance()))
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Continue(parser.advance()))
}

/// `import alias, T1, T2, "path"`
pub fn parse_import_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();
    let alias = parser.expect(TokenKind::Identifier)?;

    let mut type_args = vec![];
    loop {
        parser.expect(TokenKind::Comma)?;

        if parser.current_token_kind() == TokenKind::String {
            break;
        }
        type_args.push(parse_type(parser)?);
    }

    let path = parser.expect(TokenKind::String)?.value;

    Ok(Stmt::Import(ImportStmt {
        token,
        name: parser.qualify(&alias.value),
        type_args,
        path,
    }))
}

/// `type T` binds `T` to the next type argument given by the importer.
pub fn parse_generic_type_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();
    let name = parser.expect(TokenKind::Identifier)?;

    let ty = match parser.next_generic_argument() {
        Some(ty) => ty,
        None => {
            parser.error(Error::new(
                ParseError::MissingGenericArgument {
                    name: name.value.clone(),
                },
                name.span.start.clone(),
            ));
            Type::Todo
        }
    };
    parser.define_generic(&name.value, ty.clone());

    Ok(Stmt::GenericType(GenericTypeStmt {
        token,
        name: name.value,
        ty,
    }))
}
