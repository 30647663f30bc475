use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: impl Into<ErrorImpl>, position: Position) -> Self {
        Error {
            internal_error: error_impl.into(),
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self.internal_error, ErrorImpl::Parse(_))
    }

    pub fn is_semantic_error(&self) -> bool {
        matches!(self.internal_error, ErrorImpl::Semantic(_))
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::Parse(error) => match error {
                ParseError::UnrecognisedToken { .. } => "UnrecognisedToken",
                ParseError::UnexpectedToken { .. } => "UnexpectedToken",
                ParseError::UnknownPrefix { .. } => "UnknownPrefix",
                ParseError::NumberParseError { .. } => "NumberParseError",
                ParseError::InvalidArraySize { .. } => "InvalidArraySize",
                ParseError::InvalidAssignment => "InvalidAssignment",
                ParseError::MissingGenericArgument { .. } => "MissingGenericArgument",
                ParseError::UnknownBuiltin { .. } => "UnknownBuiltin",
                ParseError::MissingTypeArguments { .. } => "MissingTypeArguments",
                ParseError::TooManyErrors { .. } => "TooManyErrors",
            },
            ErrorImpl::Semantic(error) => match error {
                SemanticError::TypeMismatch { .. } => "TypeMismatch",
                SemanticError::UndefinedVariable { .. } => "UndefinedVariable",
                SemanticError::UnknownType { .. } => "UnknownType",
                SemanticError::RecursiveType { .. } => "RecursiveType",
                SemanticError::UnknownStructField { .. } => "UnknownStructField",
                SemanticError::DuplicateField { .. } => "DuplicateField",
                SemanticError::ExpectedStruct { .. } => "ExpectedStruct",
                SemanticError::ExpectedNumeric { .. } => "ExpectedNumeric",
                SemanticError::ExpectedPointer { .. } => "ExpectedPointer",
                SemanticError::NotIndexable { .. } => "NotIndexable",
                SemanticError::NotCallable { .. } => "NotCallable",
                SemanticError::ArgumentCount { .. } => "ArgumentCount",
                SemanticError::InvalidCast { .. } => "InvalidCast",
                SemanticError::ArrayLiteralTooLong { .. } => "ArrayLiteralTooLong",
                SemanticError::NotAllPathsReturn { .. } => "NotAllPathsReturn",
                SemanticError::ReturnOutsideFunction => "ReturnOutsideFunction",
                SemanticError::OutsideLoop { .. } => "OutsideLoop",
                SemanticError::AssignmentInExpression => "AssignmentInExpression",
                SemanticError::AssignmentCount { .. } => "AssignmentCount",
                SemanticError::UnexpectedComma => "UnexpectedComma",
                SemanticError::CapturedVariable { .. } => "CapturedVariable",
                SemanticError::UnknownBuiltin { .. } => "UnknownBuiltin",
                SemanticError::BuiltinArguments { .. } => "BuiltinArguments",
                SemanticError::ModuleAsValue { .. } => "ModuleAsValue",
                SemanticError::UnknownModuleMember { .. } => "UnknownModuleMember",
                SemanticError::ImportUnavailable { .. } => "ImportUnavailable",
                SemanticError::ImportCycle { .. } => "ImportCycle",
                SemanticError::ImportFailed { .. } => "ImportFailed",
            },
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::Parse(error) => match error {
                ParseError::UnexpectedToken { expected, .. } if expected == "Semicolon" => {
                    ErrorTip::Suggestion(String::from("did you miss a semicolon?"))
                }
                ParseError::NumberParseError { token } => ErrorTip::Suggestion(format!(
                    "Invalid number: `{}`, is it above the integer limit?",
                    token
                )),
                ParseError::InvalidAssignment => ErrorTip::Suggestion(String::from(
                    "only variables, fields, indexes and dereferences can be assigned to",
                )),
                ParseError::MissingGenericArgument { name } => ErrorTip::Suggestion(format!(
                    "pass a type for `{}` in the import statement",
                    name
                )),
                _ => ErrorTip::None,
            },
            ErrorImpl::Semantic(error) => match error {
                SemanticError::RecursiveType { .. } => ErrorTip::Suggestion(String::from(
                    "use a pointer to refer to the struct from inside itself",
                )),
                SemanticError::NotAllPathsReturn { .. } => ErrorTip::Suggestion(String::from(
                    "add an else branch or a trailing return",
                )),
                SemanticError::UndefinedVariable { variable } => {
                    ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
                }
                SemanticError::CapturedVariable { .. } => ErrorTip::Suggestion(String::from(
                    "function literals can't capture local variables, pass them as parameters",
                )),
                SemanticError::ImportFailed { count, .. } => {
                    ErrorTip::Suggestion(format!("{} error(s) reported in the module", count))
                }
                _ => ErrorTip::None,
            },
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.line, self.position.column, self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Errors raised while turning tokens into a program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token, expected={expected}, got={got}")]
    UnexpectedToken { expected: String, got: String },
    #[error("unknown token to parse: {token:?}")]
    UnknownPrefix { token: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("invalid array size {token:?}")]
    InvalidArraySize { token: String },
    #[error("this operation is not permitted in an assignment")]
    InvalidAssignment,
    #[error("no type argument was supplied for generic type {name}")]
    MissingGenericArgument { name: String },
    #[error("unknown builtin function @{name}")]
    UnknownBuiltin { name: String },
    #[error("@{name} expects {expected} type argument(s)")]
    MissingTypeArguments { name: String, expected: usize },
    #[error("too many errors, giving up after {count}")]
    TooManyErrors { count: usize },
}

/// Errors raised by the semantic analyzer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("mismatched types, expected={expected}, got={got}")]
    TypeMismatch { expected: String, got: String },
    #[error("undefined variable {variable}")]
    UndefinedVariable { variable: String },
    #[error("unknown type {name}")]
    UnknownType { name: String },
    #[error("recursive type detected in {name}")]
    RecursiveType { name: String },
    #[error("unknown struct field {field} in {ty}")]
    UnknownStructField { field: String, ty: String },
    #[error("field {field} is initialised more than once")]
    DuplicateField { field: String },
    #[error("expected a struct, got={got}")]
    ExpectedStruct { got: String },
    #[error("expected a numeric type, got={got}")]
    ExpectedNumeric { got: String },
    #[error("can't dereference non-pointer type {got}")]
    ExpectedPointer { got: String },
    #[error("can't index type {got}")]
    NotIndexable { got: String },
    #[error("{callee} of type {ty} is not callable")]
    NotCallable { callee: String, ty: String },
    #[error("expected {expected} argument(s), got {received}")]
    ArgumentCount { expected: usize, received: usize },
    #[error("can't cast {from} to {to}")]
    InvalidCast { from: String, to: String },
    #[error("expected an array of length {length} or less, got {received} element(s)")]
    ArrayLiteralTooLong { length: u64, received: usize },
    #[error("not all paths of the function '{function}' return a variable")]
    NotAllPathsReturn { function: String },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("{keyword} outside of a loop")]
    OutsideLoop { keyword: String },
    #[error("assignment is not allowed inside an expression")]
    AssignmentInExpression,
    #[error("assignment mismatch: {expected} target(s) but {received} value(s)")]
    AssignmentCount { expected: usize, received: usize },
    #[error("comma separated values are only allowed in assignments and declarations")]
    UnexpectedComma,
    #[error("local variable {variable} can't be used inside a function literal")]
    CapturedVariable { variable: String },
    #[error("unknown builtin function @{name}")]
    UnknownBuiltin { name: String },
    #[error("@{name} expects {expected}")]
    BuiltinArguments { name: String, expected: String },
    #[error("module {module} can only be used with a dot")]
    ModuleAsValue { module: String },
    #[error("module {module} has no member {member}")]
    UnknownModuleMember { module: String, member: String },
    #[error("unable to read import {path}: {reason}")]
    ImportUnavailable { path: String, reason: String },
    #[error("import cycle detected: {chain}")]
    ImportCycle { chain: String },
    #[error("module {path} failed to compile")]
    ImportFailed { path: String, count: usize },
}
