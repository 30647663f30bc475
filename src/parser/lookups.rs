use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    ast::{expressions::Expr, statements::Stmt},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*};

/// Operator precedence, weakest first.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Assignment,
    Comma,
    Logical,
    Relational,
    Additive,
    Bitwise,
    Multiplicative,
    Cast,
    Prefix,
    Call,
    Index,
    Member,
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

/// How many leading type arguments and value arguments a builtin takes.
/// `None` parameters means variadic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinRequirements {
    pub type_args: usize,
    pub parameters: Option<usize>,
}

const fn builtin(type_args: usize, parameters: Option<usize>) -> BuiltinRequirements {
    BuiltinRequirements {
        type_args,
        parameters,
    }
}

lazy_static! {
    pub static ref BUILTIN_LOOKUP: HashMap<&'static str, BuiltinRequirements> = {
        let mut map = HashMap::new();
        map.insert("alloc", builtin(1, Some(1)));
        map.insert("cast", builtin(1, Some(1)));
        map.insert("sizeof", builtin(1, Some(0)));
        map.insert("free", builtin(0, Some(1)));
        map.insert("realloc", builtin(0, Some(2)));
        map.insert("print", builtin(0, None));
        map.insert("println", builtin(0, None));
        map.insert("unreachable", builtin(0, Some(0)));
        map.insert("asm", builtin(1, None));
        map
    };
}

pub fn create_token_lookups(parser: &mut Parser) {
    parser.led(TokenKind::Assignment, BindingPower::Assignment, parse_binary_expr);
    parser.led(TokenKind::Comma, BindingPower::Comma, parse_comma_expr);

    // Logical
    parser.led(TokenKind::And, BindingPower::Logical, parse_binary_expr);
    parser.led(TokenKind::Or, BindingPower::Logical, parse_binary_expr);

    // Relational
    parser.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Equals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Relational, parse_binary_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);

    // Bitwise
    parser.led(TokenKind::Ampersand, BindingPower::Bitwise, parse_binary_expr);
    parser.led(TokenKind::Pipe, BindingPower::Bitwise, parse_binary_expr);
    parser.led(TokenKind::Caret, BindingPower::Bitwise, parse_binary_expr);
    parser.led(TokenKind::ShiftLeft, BindingPower::Bitwise, parse_binary_expr);
    parser.led(TokenKind::ShiftRight, BindingPower::Bitwise, parse_binary_expr);

    parser.led(TokenKind::As, BindingPower::Cast, parse_cast_expr);
    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Index, parse_index_expr);
    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);

    // Literals and symbols
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::Hex, parse_primary_expr);
    parser.nud(TokenKind::Binary, parse_primary_expr);
    parser.nud(TokenKind::Float, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);

    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Plus, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::Star, parse_prefix_expr);
    parser.nud(TokenKind::Ampersand, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::At, parse_at_expr);
    parser.nud(TokenKind::OpenBracket, parse_array_literal_expr);
    parser.nud(TokenKind::Func, parse_function_literal_expr);

    // Statements
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::For, parse_for_stmt);
    parser.stmt(TokenKind::Struct, parse_struct_decl_stmt);
    parser.stmt(TokenKind::Union, parse_union_decl_stmt);
    parser.stmt(TokenKind::Func, parse_fn_decl_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::Import, parse_import_stmt);
    parser.stmt(TokenKind::Break, parse_break_stmt);
    parser.stmt(TokenKind::Continue, parse_continue_stmt);
    parser.stmt(TokenKind::Extern, parse_extern_stmt);
    parser.stmt(TokenKind::Type, parse_generic_type_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
