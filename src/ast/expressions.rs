use std::{fmt::Display, rc::Rc};

use crate::lexer::tokens::Token;

use super::{
    ast::{retrieve_name, Block, Operation},
    types::{FunctionType, Type},
};

/// An expression node. `ty` starts as whatever the parser knows (literals
/// are typed, everything else is `Todo`) and is overwritten by analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    Integer(i64),
    Float(f64),
    String(String),
    Binary {
        left: Box<Expr>,
        op: Operation,
        right: Box<Expr>,
    },
    Prefix {
        op: Operation,
        operand: Box<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Builtin {
        name: String,
        type_args: Vec<Type>,
        args: Vec<Expr>,
    },
    StructLiteral {
        name: String,
        module: Option<String>,
        fields: Vec<FieldInit>,
    },
    ArrayLiteral {
        array_type: Type,
        elements: Vec<Expr>,
    },
    /// `a, b, c`: only meaningful on either side of an assignment or as the
    /// value of a multiple declaration.
    Comma(Vec<Expr>),
    /// `func(a T) R { ... }`
    Function {
        function: Rc<FunctionType>,
        body: Block,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, token: Token) -> Self {
        Expr { kind, ty, token }
    }

    pub fn untyped(kind: ExprKind, token: Token) -> Self {
        Expr::new(kind, Type::Todo, token)
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::new();
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\0"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Identifier(name) => write!(f, "{}", retrieve_name(name)),
            ExprKind::Integer(value) => write!(f, "{}", value),
            ExprKind::Float(value) => write!(f, "{:?}", value),
            ExprKind::String(value) => write!(f, "\"{}\"", escape(value)),
            ExprKind::Binary { left, op, right } => write!(f, "({}{}{})", left, op, right),
            ExprKind::Prefix { op, operand } => write!(f, "{}{}", op, operand),
            ExprKind::Index { base, index } => write!(f, "{}[{}]", base, index),
            ExprKind::Call { callee, args } => write!(f, "{}({})", callee, join(args)),
            ExprKind::Builtin {
                name,
                type_args,
                args,
            } => {
                let mut arguments = type_args.iter().map(|t| t.to_string()).collect::<Vec<_>>();
                arguments.extend(args.iter().map(|a| a.to_string()));
                write!(f, "@{}({})", name, arguments.join(", "))
            }
            ExprKind::StructLiteral {
                name,
                module,
                fields,
            } => {
                if let Some(module) = module {
                    write!(f, "{}.", retrieve_name(module))?;
                }
                write!(f, "@{}{{\n", retrieve_name(name))?;
                for field in fields {
                    writeln!(f, "{}: {},", field.name, field.value)?;
                }
                write!(f, "}}")
            }
            ExprKind::ArrayLiteral {
                array_type,
                elements,
            } => write!(f, "{}{{{}}}", array_type, join(elements)),
            ExprKind::Comma(expressions) => write!(f, "{}", join(expressions)),
            ExprKind::Function { function, body } => {
                let parameters = function
                    .names
                    .iter()
                    .zip(function.parameters.iter())
                    .map(|(name, ty)| format!("{} {}", retrieve_name(name), ty))
                    .collect::<Vec<_>>()
                    .join(", ");

                write!(f, "func({})", parameters)?;
                if function.return_type != Type::Void {
                    write!(f, " {}", function.return_type)?;
                }
                write!(f, " {{\n{}\n}}", body)
            }
        }
    }
}
