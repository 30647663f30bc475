use std::{fmt::Display, rc::Rc};

use crate::lexer::tokens::Token;

use super::{
    ast::{retrieve_name, Block},
    expressions::Expr,
    types::{FunctionType, StructType, Type, UnionType},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Declaration(DeclarationStmt),
    MultipleDeclaration(MultipleDeclarationStmt),
    Assignment(AssignmentStmt),
    Struct(StructStmt),
    Union(UnionStmt),
    FunctionDecl(FunctionDeclStmt),
    If(IfStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Break(Token),
    Continue(Token),
    Extern(ExternStmt),
    Import(ImportStmt),
    GenericType(GenericTypeStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub token: Token,
    pub expression: Expr,
}

/// `name : T = value` or, with `ty` left as `Todo`, `name := value`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationStmt {
    pub token: Token,
    pub name: String,
    pub ty: Type,
    pub value: Expr,
}

/// `a, b : T = x, y` or `a, b := x, y`. `ty` is the type as written;
/// analysis fills `types` with one resolved type per name.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleDeclarationStmt {
    pub token: Token,
    pub names: Vec<String>,
    pub ty: Type,
    pub types: Vec<Type>,
    pub value: Expr,
}

/// `target = value`. Either side may be a comma list.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub token: Token,
    pub target: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructStmt {
    pub token: Token,
    pub ty: Rc<StructType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionStmt {
    pub token: Token,
    pub ty: Rc<UnionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclStmt {
    pub token: Token,
    pub function: Rc<FunctionType>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    pub condition: Expr,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub token: Token,
    pub condition: Expr,
    pub block: Block,
    pub else_ifs: Vec<ConditionalBlock>,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub token: Token,
    pub init: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub token: Token,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternStmt {
    pub token: Token,
    pub function: Rc<FunctionType>,
}

/// `import alias, T1, T2, "path"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub token: Token,
    pub name: String,
    pub type_args: Vec<Type>,
    pub path: String,
}

/// `type T`: binds `T` to the next type argument of the file's importer.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericTypeStmt {
    pub token: Token,
    pub name: String,
    pub ty: Type,
}

impl Stmt {
    pub fn token(&self) -> &Token {
        match self {
            Stmt::Expression(stmt) => &stmt.token,
            Stmt::Declaration(stmt) => &stmt.token,
            Stmt::MultipleDeclaration(stmt) => &stmt.token,
            Stmt::Assignment(stmt) => &stmt.token,
            Stmt::Struct(stmt) => &stmt.token,
            Stmt::Union(stmt) => &stmt.token,
            Stmt::FunctionDecl(stmt) => &stmt.token,
            Stmt::If(stmt) => &stmt.token,
            Stmt::For(stmt) => &stmt.token,
            Stmt::Return(stmt) => &stmt.token,
            Stmt::Break(token) | Stmt::Continue(token) => token,
            Stmt::Extern(stmt) => &stmt.token,
            Stmt::Import(stmt) => &stmt.token,
            Stmt::GenericType(stmt) => &stmt.token,
        }
    }
}

fn signature(function: &FunctionType) -> String {
    let parameters = function
        .names
        .iter()
        .zip(function.parameters.iter())
        .map(|(name, ty)| format!("{} {}", retrieve_name(name), ty))
        .collect::<Vec<_>>()
        .join(", ");

    let mut signature = format!("func {}({})", retrieve_name(&function.name), parameters);
    if function.return_type != Type::Void {
        signature.push_str(&format!(" {}", function.return_type));
    }
    signature
}

impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Expression(stmt) => write!(f, "{};", stmt.expression),
            Stmt::Declaration(stmt) => write!(
                f,
                "{} :{} = {};",
                retrieve_name(&stmt.name),
                stmt.ty,
                stmt.value
            ),
            Stmt::MultipleDeclaration(stmt) => {
                let names = stmt
                    .names
                    .iter()
                    .map(|name| retrieve_name(name))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} :{} = {};", names, stmt.ty, stmt.value)
            }
            Stmt::Assignment(stmt) => write!(f, "{} = {};", stmt.target, stmt.value),
            Stmt::Struct(stmt) => {
                writeln!(f, "struct {} {{", retrieve_name(&stmt.ty.name))?;
                for field in &stmt.ty.fields {
                    writeln!(f, "{} {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Stmt::Union(stmt) => {
                writeln!(f, "union {} {{", retrieve_name(&stmt.ty.name))?;
                for field in &stmt.ty.fields {
                    writeln!(f, "{} {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Stmt::FunctionDecl(stmt) => {
                write!(f, "{} {{\n{}\n}}", signature(&stmt.function), stmt.body)
            }
            Stmt::If(stmt) => {
                write!(f, "if {} {{\n{}\n}}", stmt.condition, stmt.block)?;
                for else_if in &stmt.else_ifs {
                    write!(f, " else if {} {{\n{}\n}}", else_if.condition, else_if.block)?;
                }
                if let Some(else_block) = &stmt.else_block {
                    write!(f, " else {{\n{}\n}}", else_block)?;
                }
                Ok(())
            }
            Stmt::For(stmt) => {
                write!(f, "for")?;
                if let Some(init) = &stmt.init {
                    write!(f, " {}", init)?;
                }
                if let Some(condition) = &stmt.condition {
                    write!(f, " {}", condition)?;
                }
                if let Some(post) = &stmt.post {
                    write!(f, "; {}", post)?;
                } else if stmt.init.is_some() {
                    write!(f, ";")?;
                }
                write!(f, " {{\n{}\n}}", stmt.body)
            }
            Stmt::Return(stmt) => match &stmt.value {
                Some(value) => write!(f, "return {};", value),
                None => write!(f, "return;"),
            },
            Stmt::Break(_) => write!(f, "break;"),
            Stmt::Continue(_) => write!(f, "continue;"),
            Stmt::Extern(stmt) => write!(f, "extern {};", signature(&stmt.function)),
            Stmt::Import(stmt) => {
                write!(f, "import {}", retrieve_name(&stmt.name))?;
                for ty in &stmt.type_args {
                    write!(f, ", {}", ty)?;
                }
                write!(f, ", \"{}\";", stmt.path)
            }
            Stmt::GenericType(stmt) => write!(f, "type {};", stmt.name),
        }
    }
}
