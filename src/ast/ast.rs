use std::fmt::Display;

use crate::lexer::tokens::TokenKind;

use super::statements::Stmt;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Suffix appended to every name declared in this file.
    pub id: String,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Block { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let statements = self
            .statements
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", statements.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Assign,
    Dot,
    // Prefix only
    Not,
    Negate,
    Identity,
    Dereference,
    Reference,
}

impl Operation {
    pub fn from_infix(kind: TokenKind) -> Option<Operation> {
        let operation = match kind {
            TokenKind::Plus => Operation::Add,
            TokenKind::Dash => Operation::Subtract,
            TokenKind::Star => Operation::Multiply,
            TokenKind::Slash => Operation::Divide,
            TokenKind::Percent => Operation::Modulo,
            TokenKind::And => Operation::And,
            TokenKind::Or => Operation::Or,
            TokenKind::Ampersand => Operation::BitAnd,
            TokenKind::Pipe => Operation::BitOr,
            TokenKind::Caret => Operation::BitXor,
            TokenKind::ShiftLeft => Operation::ShiftLeft,
            TokenKind::ShiftRight => Operation::ShiftRight,
            TokenKind::Equals => Operation::Equals,
            TokenKind::NotEquals => Operation::NotEquals,
            TokenKind::Less => Operation::Less,
            TokenKind::LessEquals => Operation::LessEquals,
            TokenKind::Greater => Operation::Greater,
            TokenKind::GreaterEquals => Operation::GreaterEquals,
            TokenKind::Assignment => Operation::Assign,
            TokenKind::Dot => Operation::Dot,
            _ => return None,
        };

        Some(operation)
    }

    pub fn from_prefix(kind: TokenKind) -> Option<Operation> {
        let operation = match kind {
            TokenKind::Not => Operation::Not,
            TokenKind::Dash => Operation::Negate,
            TokenKind::Plus => Operation::Identity,
            TokenKind::Star => Operation::Dereference,
            TokenKind::Ampersand => Operation::Reference,
            _ => return None,
        };

        Some(operation)
    }

    /// Operators producing a boolean (`i1`) result.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operation::Equals
                | Operation::NotEquals
                | Operation::Less
                | Operation::LessEquals
                | Operation::Greater
                | Operation::GreaterEquals
                | Operation::And
                | Operation::Or
        )
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operation::Add | Operation::Identity => "+",
            Operation::Subtract | Operation::Negate => "-",
            Operation::Multiply | Operation::Dereference => "*",
            Operation::Divide => "/",
            Operation::Modulo => "%",
            Operation::And => "&&",
            Operation::Or => "||",
            Operation::BitAnd | Operation::Reference => "&",
            Operation::BitOr => "|",
            Operation::BitXor => "^",
            Operation::ShiftLeft => "<<",
            Operation::ShiftRight => ">>",
            Operation::Equals => "==",
            Operation::NotEquals => "!=",
            Operation::Less => "<",
            Operation::LessEquals => "<=",
            Operation::Greater => ">",
            Operation::GreaterEquals => ">=",
            Operation::Assign => "=",
            Operation::Dot => ".",
            Operation::Not => "!",
        };
        write!(f, "{}", symbol)
    }
}

/// Qualifies `name` with a program id, so equal names declared in different
/// files never collide. `main` is never qualified.
pub fn create_identifier(name: &str, program_id: &str) -> String {
    if name == "main" {
        String::from(name)
    } else {
        format!("{}-{}", name, program_id)
    }
}

/// The bare name of a qualified identifier.
pub fn retrieve_name(qualified: &str) -> &str {
    match qualified.split_once('-') {
        Some((name, _)) => name,
        None => qualified,
    }
}

/// The program id suffix of a qualified identifier.
pub fn extract_id(qualified: &str) -> Option<&str> {
    qualified.split_once('-').map(|(_, id)| id)
}

/// Re-qualifies a name with another program's id.
pub fn requalify(qualified: &str, program_id: &str) -> String {
    create_identifier(retrieve_name(qualified), program_id)
}
