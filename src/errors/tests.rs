//! Unit tests for error handling.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip, ParseError, SemanticError};
use crate::Position;
use std::rc::Rc;

fn position(line: u32, column: u32) -> Position {
    Position::new(0, line, column, Rc::new("test.cd".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ParseError::UnrecognisedToken {
            token: "$".to_string(),
        },
        position(1, 10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert!(error.is_parse_error());
    assert!(!error.is_semantic_error());
}

#[test]
fn test_error_position() {
    let error = Error::new(SemanticError::ReturnOutsideFunction, position(4, 2));

    assert_eq!(error.get_position().line, 4);
    assert_eq!(error.get_position().column, 2);
}

#[test]
fn test_error_display_includes_position() {
    let error = Error::new(
        SemanticError::TypeMismatch {
            expected: "i32".to_string(),
            got: "i64".to_string(),
        },
        position(3, 7),
    );

    assert_eq!(
        error.to_string(),
        "3:7: mismatched types, expected=i32, got=i64"
    );
}

#[test]
fn test_not_all_paths_return_message() {
    let error = Error::new(
        SemanticError::NotAllPathsReturn {
            function: "test".to_string(),
        },
        position(1, 1),
    );

    assert!(error
        .to_string()
        .contains("not all paths of the function 'test' return a variable"));
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));
}

#[test]
fn test_internal_error_is_exposed() {
    let error = Error::new(
        SemanticError::RecursiveType {
            name: "Point".to_string(),
        },
        position(1, 1),
    );

    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::Semantic(SemanticError::RecursiveType { .. })
    ));
    assert!(error.to_string().contains("recursive type detected"));
}

#[test]
fn test_tip_for_missing_semicolon() {
    let error = Error::new(
        ParseError::UnexpectedToken {
            expected: "Semicolon".to_string(),
            got: "x".to_string(),
        },
        position(1, 1),
    );

    assert_eq!(error.get_tip().to_string(), "did you miss a semicolon?");
}

#[test]
fn test_error_without_tip() {
    let error = Error::new(
        SemanticError::InvalidCast {
            from: "Point".to_string(),
            to: "i32".to_string(),
        },
        position(1, 1),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_error_name(), "InvalidCast");
    assert!(error.to_string().contains("can't cast Point to i32"));
}

#[test]
fn test_tip_for_captured_variable() {
    let error = Error::new(
        SemanticError::CapturedVariable {
            variable: "count".to_string(),
        },
        position(3, 5),
    );

    assert_eq!(error.get_error_name(), "CapturedVariable");
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));
    assert!(error
        .to_string()
        .ends_with("local variable count can't be used inside a function literal"));
}
