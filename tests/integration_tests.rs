//! Integration tests for end-to-end checking.
//!
//! These tests drive the public pipeline from source text through lexing,
//! parsing and semantic analysis, including imports served from memory and
//! from disk.

use std::{fs, path::Path, rc::Rc};

use candice::{
    ast::{statements::Stmt, types::Type},
    compile_file,
    config::CompilerConfig,
    errors::errors::Error,
    semantic::modules::MemoryLoader,
    session::Session,
    Unit,
};
use tempfile::TempDir;

fn check(source: &str, loader: MemoryLoader) -> Result<Unit, Vec<Error>> {
    let session = Rc::new(Session::new(CompilerConfig::default(), Box::new(loader)));
    compile_file(source.to_string(), Path::new("main.cd"), &session)
}

fn error_names(result: Result<Unit, Vec<Error>>) -> Vec<String> {
    match result {
        Ok(_) => vec![],
        Err(errors) => errors
            .iter()
            .map(|error| error.get_error_name().to_string())
            .collect(),
    }
}

#[test]
fn test_check_linked_list_program() {
    let source = r#"
extern func puts(s *i8) i32

struct Node {
    value i64
    next *Node
}

func push(head *Node, value i64) *Node {
    node := @alloc(Node, 1)
    node.value = value
    node.next = head
    return node
}

func sum(head *Node) i64 {
    total : i64 = @cast(i64, 0)
    for head != @cast(*Node, 0) {
        total = total + head.value
        head = head.next
    }
    return total
}

func main() i32 {
    list := push(@cast(*Node, 0), @cast(i64, 1))
    list = push(list, @cast(i64, 2))
    if sum(list) == @cast(i64, 3) {
        puts("ok")
        return 0
    }
    return 1
}
"#;

    let result = check(source, MemoryLoader::new());
    // Pointers are not numeric, so comparing them is rejected.
    assert_eq!(error_names(result), vec!["ExpectedNumeric", "ExpectedNumeric"]);
}

#[test]
fn test_check_program_with_loops_and_arrays() {
    let source = r#"
func total(values [4]i32) i32 {
    sum := 0
    for i := 0; i < 4; i = i + 1 {
        sum = sum + values[i]
    }
    return sum
}

func main() i32 {
    values := [4]i32{1, 2, 3}
    if total(values) > 5 {
        return 0
    } else {
        return 1
    }
}
"#;

    let unit = check(source, MemoryLoader::new()).unwrap_or_else(|errors| {
        panic!("unexpected errors: {:?}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>())
    });
    let main = unit.semantic.function("main").expect("main was not recorded");
    assert_eq!(main.function.return_type, Type::Integer(32));
}

#[test]
fn test_check_program_with_literals_and_multiple_assignment() {
    let source = r#"
struct Pair {
    first i64
    second i64
}

func fib(n i32) i64 {
    a, b := @cast(i64, 0), @cast(i64, 1)
    for i := 0; i < n; i = i + 1 {
        a, b = b, a + b
    }
    return a
}

func main() i32 {
    pick := func(pair Pair, second i32) i64 {
        if second {
            return pair.second
        }
        return pair.first
    }
    pair := @Pair{first: fib(10), second: fib(11)}
    if pick(pair, 1) == @cast(i64, 89) {
        return 0
    }
    return 1
}
"#;

    let unit = check(source, MemoryLoader::new()).unwrap_or_else(|errors| {
        panic!("unexpected errors: {:?}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>())
    });
    assert!(unit.semantic.function("fib-0").is_some());
}

#[test]
fn test_errors_are_collected_across_the_program() {
    let source = r#"
struct Point { point Point }

func f() i32 {
    if 1 { return 1 }
}

a := [2]i32{1, 2, 3}
b : i64 = 1
"#;

    assert_eq!(
        error_names(check(source, MemoryLoader::new())),
        vec!["RecursiveType", "NotAllPathsReturn", "ArrayLiteralTooLong", "TypeMismatch"]
    );
}

#[test]
fn test_parse_errors_stop_before_analysis() {
    // `y` is undefined, but the parse error is all that gets reported.
    let names = error_names(check("x := )\nz := y", MemoryLoader::new()));
    assert_eq!(names, vec!["UnknownPrefix"]);
}

#[test]
fn test_generic_module_from_memory() {
    let loader = MemoryLoader::new().with_file(
        "std/box.cd",
        r#"
type T

struct Box { value T }

func wrap(value T) Box {
    return @Box{value: value}
}

func unwrap(box Box) T {
    return box.value
}
"#,
    );

    let source = r#"
import box, f64, "std/box.cd"

b : box.Box = box.wrap(2.5)
v : f64 = box.unwrap(b)
"#;

    let unit = check(source, loader).unwrap_or_else(|errors| {
        panic!("unexpected errors: {:?}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>())
    });

    let Stmt::Import(import) = &unit.program.statements[0] else {
        panic!("expected an import");
    };
    assert_eq!(import.type_args, vec![Type::Float(64)]);
}

#[test]
fn test_same_module_imported_with_different_generics() {
    let loader = MemoryLoader::new().with_file(
        "box.cd",
        "type T\nstruct Box { value T }\nfunc wrap(value T) Box { return @Box{value: value} }",
    );

    let source = r#"
import ints, i32, "box.cd"
import floats, f64, "box.cd"

a : ints.Box = ints.wrap(1)
b : floats.Box = floats.wrap(1.5)
c : ints.Box = floats.wrap(2.5)
"#;

    assert_eq!(error_names(check(source, loader)), vec!["TypeMismatch"]);
}

#[test]
fn test_nested_module_errors_are_forwarded() {
    let loader = MemoryLoader::new()
        .with_file("a.cd", "import b, \"b.cd\"")
        .with_file("b.cd", "x : i32 = 1.5");

    assert_eq!(
        error_names(check("import a, \"a.cd\"", loader)),
        vec!["ImportFailed", "ImportFailed", "TypeMismatch"]
    );
}

#[test]
fn test_import_cycle_through_three_files() {
    let loader = MemoryLoader::new()
        .with_file("b.cd", "import c, \"c.cd\"")
        .with_file("c.cd", "import main, \"main.cd\"");

    let result = check("import b, \"b.cd\"", loader);
    let Err(errors) = result else {
        panic!("expected a cycle");
    };

    let cycle = errors
        .iter()
        .find(|error| error.get_error_name() == "ImportCycle")
        .expect("cycle was not reported");
    assert!(cycle
        .to_string()
        .ends_with("main.cd -> b.cd -> c.cd -> main.cd"));
}

#[test]
fn test_imports_from_disk() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(
        dir.path().join("lib").join("math.cd"),
        "func square(n i32) i32 { return n * n }",
    )
    .unwrap();

    let main_path = dir.path().join("main.cd");
    let source = "import math, \"./lib/math.cd\"\nfunc main() i32 {\n return math.square(3)\n}";
    fs::write(&main_path, source).unwrap();

    let session = Rc::new(Session::with_filesystem(CompilerConfig::default()));
    let unit = compile_file(source.to_string(), &main_path, &session)
        .unwrap_or_else(|errors| panic!("unexpected errors: {:?}", errors));

    let module = unit.semantic.module("math-0").expect("math was not imported");
    assert!(module.path.ends_with("lib/math.cd"));
}

#[test]
fn test_missing_file_on_disk() {
    let dir = TempDir::new().unwrap();
    let main_path = dir.path().join("main.cd");

    let session = Rc::new(Session::with_filesystem(CompilerConfig::default()));
    let result = compile_file("import gone, \"gone.cd\"".to_string(), &main_path, &session);

    assert_eq!(error_names(result), vec!["ImportUnavailable"]);
}
