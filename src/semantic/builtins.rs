use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    ast::{
        expressions::{Expr, ExprKind},
        types::Type,
    },
    errors::errors::SemanticError,
    lexer::tokens::Token,
    parser::lookups::BUILTIN_LOOKUP,
};

use super::semantic::Semantic;

/// Checks a builtin call whose argument counts are already known to be
/// right. Type arguments arrive resolved.
type BuiltinHandler = fn(&mut Semantic, &[Type], &mut [Expr], &Token) -> Type;

lazy_static! {
    static ref BUILTIN_HANDLERS: HashMap<&'static str, BuiltinHandler> = {
        let mut map: HashMap<&'static str, BuiltinHandler> = HashMap::new();
        map.insert("cast", analyze_cast);
        map.insert("alloc", analyze_alloc);
        map.insert("free", analyze_free);
        map.insert("realloc", analyze_realloc);
        map.insert("sizeof", analyze_sizeof);
        map.insert("print", analyze_print);
        map.insert("println", analyze_print);
        map.insert("unreachable", analyze_unreachable);
        map.insert("asm", analyze_asm);
        map
    };
}

impl Semantic {
    pub(crate) fn analyze_builtin(
        &mut self,
        name: &str,
        type_args: &mut [Type],
        args: &mut [Expr],
        token: &Token,
    ) -> Type {
        let Some(handler) = BUILTIN_HANDLERS.get(name).copied() else {
            self.error(
                SemanticError::UnknownBuiltin {
                    name: name.to_string(),
                },
                token,
            );
            self.analyze_expressions(args);
            return Type::Todo;
        };

        let expected = BUILTIN_LOOKUP
            .get(name)
            .and_then(|requirements| requirements.parameters);
        if let Some(expected) = expected.filter(|expected| *expected != args.len()) {
            self.error(
                SemanticError::BuiltinArguments {
                    name: name.to_string(),
                    expected: format!("{} argument(s), got {}", expected, args.len()),
                },
                token,
            );
            self.analyze_expressions(args);
            return Type::Todo;
        }

        for ty in type_args.iter_mut() {
            *ty = self.resolve_or_report(ty, token);
        }

        handler(self, type_args, args, token)
    }
}

fn castable(ty: &Type) -> bool {
    ty.is_numeric() || ty.is_pointer() || ty.is_array()
}

/// `@cast(T, value)`: numbers, pointers and arrays convert between each
/// other freely. Anything else only casts to itself.
fn analyze_cast(semantic: &mut Semantic, type_args: &[Type], args: &mut [Expr], token: &Token) -> Type {
    let target = type_args.first().cloned().unwrap_or(Type::Todo);
    let from = semantic.analyze_expression(&mut args[0]);
    let from = semantic.resolve(&from);

    if from.is_todo() || target.is_todo() {
        return target;
    }

    if (castable(&from) && castable(&target)) || from.equals(&target, semantic) {
        return target;
    }

    semantic.error(
        SemanticError::InvalidCast {
            from: from.to_string(),
            to: target.to_string(),
        },
        token,
    );
    Type::Todo
}

/// `@alloc(T, count)` yields `*T`.
fn analyze_alloc(semantic: &mut Semantic, type_args: &[Type], args: &mut [Expr], token: &Token) -> Type {
    let count = semantic.analyze_expression(&mut args[0]);
    expect_integer(semantic, &count, token);

    Type::pointer(type_args.first().cloned().unwrap_or(Type::Todo))
}

fn analyze_free(semantic: &mut Semantic, _type_args: &[Type], args: &mut [Expr], token: &Token) -> Type {
    let pointer = semantic.analyze_expression(&mut args[0]);
    expect_pointer(semantic, &pointer, token);

    Type::Void
}

/// `@realloc(pointer, count)` yields the pointer's own type.
fn analyze_realloc(semantic: &mut Semantic, _type_args: &[Type], args: &mut [Expr], token: &Token) -> Type {
    let pointer = semantic.analyze_expression(&mut args[0]);
    let pointer = semantic.resolve(&pointer);
    expect_pointer(semantic, &pointer, token);

    let count = semantic.analyze_expression(&mut args[1]);
    expect_integer(semantic, &count, token);

    pointer
}

fn analyze_sizeof(_semantic: &mut Semantic, _type_args: &[Type], _args: &mut [Expr], _token: &Token) -> Type {
    Type::Integer(32)
}

fn analyze_print(semantic: &mut Semantic, _type_args: &[Type], args: &mut [Expr], _token: &Token) -> Type {
    semantic.analyze_expressions(args);
    Type::Void
}

/// Marks the path as terminated and satisfies whatever the enclosing
/// function returns.
fn analyze_unreachable(semantic: &mut Semantic, _type_args: &[Type], _args: &mut [Expr], _token: &Token) -> Type {
    semantic.returns = true;
    semantic.expected_return.clone().unwrap_or(Type::Void)
}

/// `@asm(T, "code", inputs...)`: inline assembly producing a `T`. The code
/// must be a string literal.
fn analyze_asm(semantic: &mut Semantic, type_args: &[Type], args: &mut [Expr], token: &Token) -> Type {
    let ty = type_args.first().cloned().unwrap_or(Type::Todo);

    let Some((code, inputs)) = args.split_first_mut() else {
        semantic.error(
            SemanticError::BuiltinArguments {
                name: String::from("asm"),
                expected: String::from("a string literal with the assembly"),
            },
            token,
        );
        return Type::Todo;
    };

    if !matches!(code.kind, ExprKind::String(_)) {
        semantic.error(
            SemanticError::BuiltinArguments {
                name: String::from("asm"),
                expected: format!("a string literal with the assembly, got {}", code),
            },
            token,
        );
    }
    semantic.analyze_expression(code);
    semantic.analyze_expressions(inputs);

    ty
}

fn expect_integer(semantic: &mut Semantic, ty: &Type, token: &Token) {
    let ty = semantic.resolve(ty);
    if !ty.is_todo() && !ty.is_integer() {
        semantic.error(SemanticError::ExpectedNumeric { got: ty.to_string() }, token);
    }
}

fn expect_pointer(semantic: &mut Semantic, ty: &Type, token: &Token) {
    let ty = semantic.resolve(ty);
    if !ty.is_todo() && !ty.is_pointer() {
        semantic.error(SemanticError::ExpectedPointer { got: ty.to_string() }, token);
    }
}
