#![allow(clippy::module_inception)]

use std::{
    fmt::Display,
    path::Path,
    rc::Rc,
};

use tracing::{debug, info};

use crate::{
    ast::{ast::Program, types::Type},
    errors::errors::{Error, ErrorTip},
    lexer::lexer::Lexer,
    parser::parser::{parse, ParserOptions},
    semantic::{modules::normalize_path, semantic::Semantic},
    session::Session,
};

pub mod ast;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod semantic;
pub mod session;

extern crate regex;

/// A point in a source file. Lines and columns start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(offset: u32, line: u32, column: u32, file: Rc<String>) -> Self {
        Position {
            offset,
            line,
            column,
            file,
        }
    }

    pub fn null() -> Self {
        Position::new(0, 0, 0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A parsed and analysed compilation unit, ready to be lowered.
pub struct Unit {
    pub program: Program,
    pub semantic: Semantic,
}

/// Runs the lexer, parser and semantic analyzer over one source file.
///
/// Parse errors short-circuit: the analyzer never sees a program that failed
/// to parse. `generics` is the positional list of concrete types consumed by
/// `type T` statements in the file.
pub fn compile_unit(
    source: String,
    path: &Path,
    generics: Vec<Type>,
    session: &Rc<Session>,
) -> Result<Unit, Vec<Error>> {
    let file_name = path.to_string_lossy().to_string();
    let program_id = session.ids.next_program_id();

    debug!(file = %file_name, program_id = %program_id, "parsing");
    let lexer = Lexer::new(source, Some(file_name.clone()));
    let (mut program, errors) = parse(
        lexer,
        ParserOptions {
            program_id: program_id.clone(),
            generics,
            ids: session.ids.clone(),
            max_errors: session.config.max_parse_errors,
        },
    );

    if !errors.is_empty() {
        info!(file = %file_name, count = errors.len(), "parsing failed");
        return Err(errors);
    }

    let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut semantic = Semantic::new(Rc::clone(session), program_id, directory);
    semantic.analyze(&mut program);

    if semantic.has_errors() {
        info!(file = %file_name, count = semantic.errors().len(), "analysis failed");
        return Err(semantic.take_errors());
    }

    debug!(file = %file_name, statements = program.statements.len(), "analysis finished");
    Ok(Unit { program, semantic })
}

/// Compiles the root file of a build.
///
/// The file sits on the session's import stack while it is analysed, so a
/// module that imports it back is reported as a cycle.
pub fn compile_file(source: String, path: &Path, session: &Rc<Session>) -> Result<Unit, Vec<Error>> {
    let path = normalize_path(path);
    info!(path = %path.display(), "compiling");

    session.begin_import(&path);
    let result = compile_unit(source, &path, vec![], session);
    session.end_import(&path);

    result
}

pub fn get_line_at_position(source: &str, line: u32) -> Option<String> {
    source
        .split('\n')
        .nth(line.saturating_sub(1) as usize)
        .map(|line| line.trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nfoo := 3\n\nTesting { }\n";

        assert_eq!(
            super::get_line_at_position(source, 1).as_deref(),
            Some("Hello, world!")
        );
        assert_eq!(
            super::get_line_at_position(source, 4).as_deref(),
            Some("Testing { }")
        );
        assert_eq!(super::get_line_at_position(source, 9), None);
    }

    #[test]
    fn test_remove_starting_whitespace() {
        let (text, removed) = super::remove_starting_whitespace("    x := 3");
        assert_eq!(text, "x := 3");
        assert_eq!(removed, 4);
    }
}

pub fn display_error(error: &Error, source: &str) {
    /*
        error: message
        -> final.cd
           |
        20 | x := #;
           | -----^
    */

    let position = error.get_position();

    if let ErrorTip::None = error.get_tip() {
        println!("Error: {}: {}", error.get_error_name(), error);
    } else {
        println!(
            "Error: {}: {} ({})",
            error.get_error_name(),
            error,
            error.get_tip()
        );
    }
    println!("-> {}", position.file);

    let Some(line_text) = get_line_at_position(source, position.line) else {
        return;
    };

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    println!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    println!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = (position.column as usize)
        .saturating_sub(removed_whitespace)
        .max(1);

    println!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
