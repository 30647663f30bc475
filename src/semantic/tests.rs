//! Unit tests for the semantic analyzer.

use std::{path::Path, rc::Rc};

use crate::{
    ast::{expressions::ExprKind, statements::Stmt, types::Type},
    compile_file,
    config::CompilerConfig,
    errors::errors::Error,
    session::Session,
    Unit,
};

use super::{
    modules::{normalize_path, MemoryLoader, SourceLoader},
    symbols::SymbolTable,
};

fn compile_at(
    path: &str,
    source: &str,
    loader: MemoryLoader,
    config: CompilerConfig,
) -> Result<Unit, Vec<Error>> {
    let session = Rc::new(Session::new(config, Box::new(loader)));
    compile_file(source.to_string(), Path::new(path), &session)
}

fn analyze_with(source: &str, loader: MemoryLoader) -> Result<Unit, Vec<Error>> {
    compile_at("main.cd", source, loader, CompilerConfig::default())
}

fn analyze_ok(source: &str) -> Unit {
    expect_ok(analyze_with(source, MemoryLoader::new()))
}

fn analyze_errors(source: &str) -> Vec<Error> {
    expect_errors(analyze_with(source, MemoryLoader::new()))
}

fn expect_ok(result: Result<Unit, Vec<Error>>) -> Unit {
    match result {
        Ok(unit) => unit,
        Err(errors) => panic!(
            "unexpected errors: {:?}",
            errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
        ),
    }
}

fn expect_errors(result: Result<Unit, Vec<Error>>) -> Vec<Error> {
    match result {
        Ok(_) => panic!("expected the analysis to fail"),
        Err(errors) => errors,
    }
}

fn error_names(errors: &[Error]) -> Vec<&str> {
    errors.iter().map(|error| error.get_error_name()).collect()
}

#[test]
fn test_symbol_table_frames_restore_shadowed_bindings() {
    let mut table = SymbolTable::new();
    table.add("x", 1);

    table.enter_frame();
    table.add("x", 2);
    table.add("y", 3);
    assert_eq!(table.get("x"), Some(&2));
    assert_eq!(table.depth(), 1);

    table.leave_frame();
    assert_eq!(table.get("x"), Some(&1));
    assert_eq!(table.get("y"), None);
    assert_eq!(table.depth(), 0);
}

#[test]
fn test_symbol_table_rebinding_in_one_frame() {
    let mut table = SymbolTable::new();
    table.enter_frame();
    table.add("x", "first");
    table.add("x", "second");
    assert_eq!(table.get("x"), Some(&"second"));

    table.leave_frame();
    assert!(!table.contains("x"));
}

#[test]
#[should_panic(expected = "leave_frame")]
fn test_symbol_table_unbalanced_leave_panics() {
    let mut table: SymbolTable<i32> = SymbolTable::new();
    table.leave_frame();
}

#[test]
fn test_symbol_table_depth_of_tracks_the_visible_binding() {
    let mut table = SymbolTable::new();
    table.add("global", 0);

    table.enter_frame();
    table.add("local", 1);
    table.enter_frame();
    table.add("global", 2);
    assert_eq!(table.depth_of("global"), Some(2));
    assert_eq!(table.depth_of("local"), Some(1));

    table.leave_frame();
    assert_eq!(table.depth_of("global"), Some(0));
    assert_eq!(table.depth_of("missing"), None);
}

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path(Path::new("./lib/../list.cd")), Path::new("list.cd"));
    assert_eq!(normalize_path(Path::new("a/b/./c.cd")), Path::new("a/b/c.cd"));
    assert_eq!(normalize_path(Path::new("../up.cd")), Path::new("../up.cd"));
    assert_eq!(normalize_path(Path::new("/root/../x.cd")), Path::new("/x.cd"));
}

#[test]
fn test_memory_loader_normalizes_keys() {
    let loader = MemoryLoader::new().with_file("./lib/list.cd", "x := 1");

    assert_eq!(loader.load(Path::new("lib/list.cd")).ok().as_deref(), Some("x := 1"));
    assert_eq!(
        loader.load(Path::new("lib/../lib/list.cd")).ok().as_deref(),
        Some("x := 1")
    );
    assert!(loader.load(Path::new("other.cd")).is_err());
}

#[test]
fn test_redeclaration_with_cast() {
    analyze_ok("variable : i64 = @cast(i64, 32)\nvariable : i32 = 32");
}

#[test]
fn test_declaration_mismatch() {
    let errors = analyze_errors("x : i64 = 5");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);
    assert_eq!(
        errors[0].to_string(),
        "1:1: mismatched types, expected=i64, got=i32"
    );
}

#[test]
fn test_inferred_declaration_type_is_written_back() {
    let unit = analyze_ok("x := 4 + 5\ny := x < 3\np := &x");
    let types = unit
        .program
        .statements
        .iter()
        .map(|statement| match statement {
            Stmt::Declaration(declaration) => declaration.ty.clone(),
            other => panic!("expected a declaration, got {}", other),
        })
        .collect::<Vec<_>>();

    assert_eq!(
        types,
        vec![
            Type::Integer(32),
            Type::boolean(),
            Type::pointer(Type::Integer(32))
        ]
    );
}

#[test]
fn test_undefined_variable_reports_once() {
    let errors = analyze_errors("y := x + 1\nz := y * 2");
    assert_eq!(error_names(&errors), vec!["UndefinedVariable"]);
    assert_eq!(errors[0].to_string(), "1:6: undefined variable x");
}

#[test]
fn test_block_scope_ends_with_block() {
    let errors = analyze_errors("func f() {\n if 1 { inner := 2 }\n x := inner\n}");
    assert_eq!(error_names(&errors), vec!["UndefinedVariable"]);
}

#[test]
fn test_recursive_struct() {
    let errors = analyze_errors("struct Point {\n point Point\n}");
    assert_eq!(error_names(&errors), vec!["RecursiveType"]);
    assert!(errors[0]
        .to_string()
        .ends_with("recursive type detected in Point"));
}

#[test]
fn test_recursive_struct_through_array() {
    let errors = analyze_errors("struct Grid { cells [4]Grid }");
    assert_eq!(error_names(&errors), vec!["RecursiveType"]);
}

#[test]
fn test_pointer_self_reference_is_allowed() {
    let unit = analyze_ok(
        "struct Node { value i32, next *Node }\nfunc second(node *Node) i32 {\n return node.next.value\n}",
    );

    let Some(Type::Struct(node)) = unit.semantic.defined_type("Node-0") else {
        panic!("Node was not recorded");
    };
    assert_eq!(node.fields.len(), 2);
    assert_eq!(node.layout().size, 16);
}

#[test]
fn test_unknown_field_type() {
    let errors = analyze_errors("struct A { b Missing }");
    assert_eq!(error_names(&errors), vec!["UnknownType"]);
}

#[test]
fn test_nested_struct_is_resolved() {
    let unit = analyze_ok(
        "struct Point { x i32, y i32 }\nstruct Line { start Point, end Point }\nl := @Line{start: @Point{x: 1, y: 2}, end: @Point{x: 3, y: 4}}\nx : i32 = l.end.x",
    );

    let Some(Type::Struct(line)) = unit.semantic.defined_type("Line-0") else {
        panic!("Line was not recorded");
    };
    assert!(matches!(line.fields[0].ty, Type::Struct(_)));
    assert_eq!(line.layout().size, 16);
}

#[test]
fn test_union_fields() {
    analyze_ok("union Value { i i64, f f64 }\nfunc get(v Value) f64 {\n return v.f\n}");
}

#[test]
fn test_all_paths_return() {
    analyze_ok(
        "func sign(x i32) i32 {\n if x > 0 { return 1 } else if x < 0 { return -1 } else { return 0 }\n}",
    );
    analyze_ok("func sign(x i32) i32 {\n if x > 0 { return 1 }\n return 0\n}");
    analyze_ok("func hello() {\n @println(\"hi\")\n}");
}

#[test]
fn test_missing_return_path() {
    let errors = analyze_errors("func sign(x i32) i32 {\n if x > 0 { return 1 }\n}");
    assert_eq!(error_names(&errors), vec!["NotAllPathsReturn"]);
    assert!(errors[0]
        .to_string()
        .ends_with("not all paths of the function 'sign' return a variable"));
}

#[test]
fn test_loops_never_guarantee_a_return() {
    let errors = analyze_errors("func spin() i32 {\n for { return 1 }\n}");
    assert_eq!(error_names(&errors), vec!["NotAllPathsReturn"]);
}

#[test]
fn test_unreachable_terminates_a_path() {
    analyze_ok("func pick(x i32) i32 {\n if x > 0 { return 1 }\n @unreachable()\n}");
}

#[test]
fn test_return_type_mismatch() {
    let errors = analyze_errors("func f() i32 {\n return 1.5\n}\nfunc g() {\n return 1\n}");
    assert_eq!(error_names(&errors), vec!["TypeMismatch", "TypeMismatch"]);
}

#[test]
fn test_return_and_break_placement() {
    let errors = analyze_errors("return 1\nbreak\ncontinue");
    assert_eq!(
        error_names(&errors),
        vec!["ReturnOutsideFunction", "OutsideLoop", "OutsideLoop"]
    );

    analyze_ok("for i := 0; i < 10; i = i + 1 {\n if i == 5 { break }\n continue\n}");
}

#[test]
fn test_loop_condition_must_be_numeric() {
    let errors = analyze_errors("struct P { x i32 }\np := @P{x: 1}\nfor p { break }");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);
}

#[test]
fn test_array_literal_bounds() {
    let unit = analyze_ok("a := [4]i32{1, 2}\nb : i32 = a[1]");
    let Stmt::Declaration(declaration) = &unit.program.statements[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(declaration.ty, Type::array(Type::Integer(32), 4));

    let errors = analyze_errors("a := [2]i32{1, 2, 3}");
    assert_eq!(error_names(&errors), vec!["ArrayLiteralTooLong"]);
    assert!(errors[0]
        .to_string()
        .ends_with("expected an array of length 2 or less, got 3 element(s)"));
}

#[test]
fn test_struct_literal_fields() {
    let errors = analyze_errors("struct Point { x i32, y i32 }\np := @Point{x: 1, z: 2, x: 3}");
    assert_eq!(
        error_names(&errors),
        vec!["UnknownStructField", "DuplicateField"]
    );

    let errors = analyze_errors("struct Point { x i32, y i32 }\np := @Point{x: 1.5}");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);

    let errors = analyze_errors("p := @Nowhere{x: 1}");
    assert_eq!(error_names(&errors), vec!["UnknownType"]);
}

#[test]
fn test_field_access_errors() {
    let errors = analyze_errors("struct Point { x i32 }\np := @Point{x: 1}\ny := p.z\nn := 1\nm := n.x");
    assert_eq!(error_names(&errors), vec!["UnknownStructField", "ExpectedStruct"]);
}

#[test]
fn test_calls() {
    let errors = analyze_errors(
        "func add(a i32, b i32) i32 { return a + b }\nx := add(1)\ny := add(1, 2.0)\nz : i32 = add(1, 2)",
    );
    assert_eq!(error_names(&errors), vec!["ArgumentCount", "TypeMismatch"]);

    let errors = analyze_errors("n := 3\nn(1)");
    assert_eq!(error_names(&errors), vec!["NotCallable"]);
}

#[test]
fn test_functions_are_recorded() {
    let unit = analyze_ok("func add(a i32, b i32) i32 { return a + b }\nfunc main() i32 { return add(1, 2) }");

    assert!(unit.semantic.function("main").is_some());
    let add = unit.semantic.function("add-0").expect("add was not recorded");
    assert_eq!(add.function.return_type, Type::Integer(32));
    assert_eq!(unit.semantic.functions().count(), 2);
}

#[test]
fn test_function_values() {
    analyze_ok("func add(a i32, b i32) i32 { return a + b }\ncb : func(i32, i32) i32 = add\nx : i32 = cb(1, 2)");
}

#[test]
fn test_arithmetic_operands() {
    let errors = analyze_errors("x := 1 + 2.5");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);

    let errors = analyze_errors("s := \"a\" * 2");
    assert_eq!(error_names(&errors), vec!["ExpectedNumeric"]);
}

#[test]
fn test_pointers() {
    analyze_ok("x := 3\np := &x\ny : i32 = *p;\n*p = 4");

    let errors = analyze_errors("x := 3\ny := *x");
    assert_eq!(error_names(&errors), vec!["ExpectedPointer"]);
}

#[test]
fn test_indexing() {
    analyze_ok("p := @alloc(i64, 4)\nv : i64 = p[2]");

    let errors = analyze_errors("n := 1\nn[0]");
    assert_eq!(error_names(&errors), vec!["NotIndexable"]);
}

#[test]
fn test_memory_builtins() {
    let unit = analyze_ok(
        "struct Point { x i32, y i32 }\np := @alloc(Point, 1)\np.x = 3\np = @realloc(p, 2)\n@free(p)\nsize := @sizeof(Point)",
    );

    let Stmt::Declaration(declaration) = &unit.program.statements[1] else {
        panic!("expected a declaration");
    };
    let Type::Pointer(inner) = &declaration.ty else {
        panic!("expected a pointer, got {}", declaration.ty);
    };
    assert!(matches!(inner.as_ref(), Type::Struct(_)));
}

#[test]
fn test_builtin_errors() {
    let errors = analyze_errors("@free(3)\n@realloc(3, 8)\np := @alloc(i32, 1)\n@free(p, p)\nq := @alloc(i32, 1.5)");
    assert_eq!(
        error_names(&errors),
        vec!["ExpectedPointer", "ExpectedPointer", "BuiltinArguments", "ExpectedNumeric"]
    );
}

#[test]
fn test_casts() {
    analyze_ok("x := 3\ny := @cast(f32, x)\np := @cast(*i8, 0)\nz := x as i64");

    let errors = analyze_errors("struct P { x i32 }\np := @P{x: 1}\nq := @cast(i32, p)");
    assert_eq!(error_names(&errors), vec!["InvalidCast"]);
}

#[test]
fn test_assignment_in_expression() {
    let errors = analyze_errors("x := 1\ny := (x = 2)");
    assert_eq!(error_names(&errors), vec!["AssignmentInExpression"]);
}

#[test]
fn test_extern_functions() {
    let unit = analyze_ok("extern func puts(s *i8) i32\nputs(\"hello\")");
    assert!(matches!(unit.semantic.symbol("puts-0"), Some(Type::Function(_))));

    let errors = analyze_errors("extern func puts(s *i8) i32\nputs(1)");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);
}

#[test]
fn test_semantic_error_cap() {
    let result = compile_at(
        "main.cd",
        "a := x\nb := y\nc := z",
        MemoryLoader::new(),
        CompilerConfig::default().with_max_semantic_errors(Some(2)),
    );
    assert_eq!(expect_errors(result).len(), 2);
}

#[test]
fn test_import_function() {
    let loader = MemoryLoader::new().with_file("math.cd", "func square(n i32) i32 { return n * n }");
    let unit = expect_ok(analyze_with(
        "import math, \"math.cd\"\nx : i32 = math.square(3)",
        loader,
    ));

    let module = unit.semantic.module("math-0").expect("math was not imported");
    assert_eq!(module.path, Path::new("math.cd"));

    // The callee is renamed to the module's own qualified name.
    let Stmt::Declaration(declaration) = &unit.program.statements[1] else {
        panic!("expected a declaration");
    };
    let ExprKind::Call { callee, .. } = &declaration.value.kind else {
        panic!("expected a call");
    };
    let ExprKind::Binary { left, right, .. } = &callee.kind else {
        panic!("expected a member access");
    };
    assert_eq!(left.ty, Type::Module(String::from("math-0")));
    let expected = format!("square-{}", module.unit.semantic.program_id());
    assert_eq!(right.identifier_name(), Some(expected.as_str()));
}

#[test]
fn test_import_module_types() {
    let loader = MemoryLoader::new().with_file(
        "shapes.cd",
        "struct Point { x i32, y i32 }\nfunc origin() Point { return @Point{x: 0, y: 0} }",
    );

    expect_ok(analyze_with(
        "import shapes, \"shapes.cd\"\np : shapes.Point = shapes.origin()\nq := shapes.@Point{x: 1, y: 2}\nr : i32 = q.x + p.y",
        loader,
    ));
}

#[test]
fn test_structs_from_different_files_are_distinct() {
    let loader = MemoryLoader::new().with_file("shapes.cd", "struct Point { x i32 }");

    let errors = expect_errors(analyze_with(
        "import shapes, \"shapes.cd\"\nstruct Point { x i32 }\np : Point = shapes.@Point{x: 1}",
        loader,
    ));
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);
}

#[test]
fn test_generic_import() {
    let loader = MemoryLoader::new().with_file(
        "list.cd",
        "type T\nfunc first(items *T) T {\n return *items\n}",
    );

    expect_ok(analyze_with(
        "struct Point { x i32, y i32 }\nimport list, Point, \"list.cd\"\np := @alloc(Point, 1)\nq : Point = list.first(p)",
        loader,
    ));
}

#[test]
fn test_generic_import_missing_argument() {
    let loader = MemoryLoader::new().with_file("list.cd", "type T\nx : T = 1");

    let errors = expect_errors(analyze_with("import list, \"list.cd\"", loader));
    assert_eq!(error_names(&errors), vec!["ImportFailed", "MissingGenericArgument"]);
}

#[test]
fn test_module_misuse() {
    let loader = MemoryLoader::new().with_file("math.cd", "func square(n i32) i32 { return n * n }");

    let errors = expect_errors(analyze_with(
        "import math, \"math.cd\"\nm := math\nmath.cube(2)",
        loader,
    ));
    assert_eq!(error_names(&errors), vec!["ModuleAsValue", "UnknownModuleMember"]);
}

#[test]
fn test_import_unavailable() {
    let errors = analyze_errors("import x, \"missing.cd\"");
    assert_eq!(error_names(&errors), vec!["ImportUnavailable"]);
}

#[test]
fn test_import_cycle() {
    let loader = MemoryLoader::new().with_file("lib/b.cd", "import a, \"../a.cd\"");

    let errors = expect_errors(compile_at(
        "a.cd",
        "import b, \"lib/b.cd\"",
        loader,
        CompilerConfig::default(),
    ));
    assert_eq!(error_names(&errors), vec!["ImportFailed", "ImportCycle"]);
    assert!(errors[1].to_string().ends_with("a.cd -> lib/b.cd -> a.cd"));
}

#[test]
fn test_forward_referenced_type_must_exist_at_value_use() {
    let errors = analyze_errors(
        "func f(p *Node) i32 {\n n := *p\n return 0\n}\nstruct Node { x i32 }",
    );
    assert_eq!(error_names(&errors), vec!["UnknownType"]);
    assert!(errors[0].to_string().ends_with("Node"));

    let errors = analyze_errors(
        "struct List { head *Item }\nfunc first(l List) i32 {\n return l.head.value\n}\nstruct Item { value i32 }",
    );
    assert_eq!(error_names(&errors), vec!["UnknownType"]);

    analyze_ok("struct Node { x i32 }\nfunc f(p *Node) i32 {\n n := *p\n return n.x\n}");
}

#[test]
fn test_local_types_end_with_their_scope() {
    analyze_ok(
        "func f() i32 {\n struct Inner { x i32 }\n v := @Inner{x: 1}\n return v.x\n}",
    );

    let errors = analyze_errors("func f() {\n struct Inner { x i32 }\n}\ny := @Inner{x: 1}");
    assert_eq!(error_names(&errors), vec!["UnknownType"]);

    let unit = analyze_ok("func f() {\n union Local { i i32, f f32 }\n}");
    assert!(unit.semantic.defined_type("Local-0").is_none());
}

#[test]
fn test_local_types_stay_out_of_modules() {
    let loader = MemoryLoader::new().with_file(
        "shapes.cd",
        "struct Point { x i32 }\nfunc f() {\n struct Hidden { y i32 }\n}",
    );

    expect_ok(analyze_with(
        "import shapes, \"shapes.cd\"\np := shapes.@Point{x: 1}",
        loader.clone(),
    ));

    let errors = expect_errors(analyze_with(
        "import shapes, \"shapes.cd\"\nh := shapes.@Hidden{y: 1}",
        loader,
    ));
    assert_eq!(error_names(&errors), vec!["UnknownType"]);
}

#[test]
fn test_multiple_declaration_types_are_written_back() {
    let unit = analyze_ok("a := 1\nb := 2.5\na, b := b, a\nc, d : i64 = @cast(i64, a), 4 as i64");

    let Stmt::MultipleDeclaration(swap) = &unit.program.statements[2] else {
        panic!("expected a multiple declaration");
    };
    assert_eq!(swap.types, vec![Type::Float(64), Type::Integer(32)]);
    assert_eq!(swap.value.ty, Type::Void);

    let Stmt::MultipleDeclaration(declared) = &unit.program.statements[3] else {
        panic!("expected a multiple declaration");
    };
    assert_eq!(declared.ty, Type::Integer(64));
    assert_eq!(declared.types, vec![Type::Integer(64); 2]);
}

#[test]
fn test_multiple_declaration_errors() {
    let errors = analyze_errors("a, b := 1, 2, 3");
    assert_eq!(error_names(&errors), vec!["AssignmentCount"]);
    assert!(errors[0]
        .to_string()
        .ends_with("assignment mismatch: 2 target(s) but 3 value(s)"));

    let errors = analyze_errors("a, b : i32 = 1, 2.5");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);
}

#[test]
fn test_comma_lists_outside_assignments() {
    let errors = analyze_errors("x := 1, 2");
    assert_eq!(error_names(&errors), vec!["UnexpectedComma"]);

    let errors = analyze_errors("func f() i32 {\n return 1, 2\n}");
    assert_eq!(error_names(&errors), vec!["UnexpectedComma"]);
}

#[test]
fn test_multiple_assignment() {
    analyze_ok("a := 1\nb := 2\na, b = b, a");

    let errors = analyze_errors("a := 1\nb := 2\na, b = 1");
    assert_eq!(error_names(&errors), vec!["AssignmentCount"]);

    let errors = analyze_errors("a := 1\nb := 2\na, b = 1.5, 2");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);
}

#[test]
fn test_function_literals() {
    let unit = analyze_ok(
        "add := func(a i32, b i32) i32 { return a + b }\nx : i32 = add(1, 2)\ny := func() i64 { return 4 as i64 }()",
    );

    let Stmt::Declaration(add) = &unit.program.statements[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(add.ty.to_string(), "func(i32, i32) i32");

    let Stmt::Declaration(y) = &unit.program.statements[2] else {
        panic!("expected a declaration");
    };
    assert_eq!(y.ty, Type::Integer(64));
}

#[test]
fn test_function_literal_returns() {
    let errors = analyze_errors("f := func() i32 {\n if 1 { return 1 }\n}");
    assert_eq!(error_names(&errors), vec!["NotAllPathsReturn"]);
    assert!(errors[0].to_string().contains("'<anonymous>'"));

    let errors = analyze_errors("f := func() i32 { return 1.5 }");
    assert_eq!(error_names(&errors), vec!["TypeMismatch"]);

    // A literal returning does not make its enclosing function return.
    let errors = analyze_errors("func outer() i32 {\n f := func() i32 { return 1 }\n}");
    assert_eq!(error_names(&errors), vec!["NotAllPathsReturn"]);
    assert!(errors[0].to_string().contains("'outer'"));
}

#[test]
fn test_function_literals_cannot_capture_locals() {
    let errors = analyze_errors(
        "func outer(n i32) i32 {\n x := 1\n f := func() i32 { return x + n }\n return f()\n}",
    );
    assert_eq!(
        error_names(&errors),
        vec!["CapturedVariable", "CapturedVariable"]
    );
    assert!(errors[0]
        .to_string()
        .ends_with("local variable x can't be used inside a function literal"));

    analyze_ok(
        "limit := 10\nfunc outer() i32 {\n f := func(v i32) i32 {\n  doubled := v * 2\n  return doubled + limit\n }\n return f(1)\n}",
    );
}

#[test]
fn test_asm_builtin() {
    let unit = analyze_ok("x := 3\ny := @asm(i64, \"mov $0, $1\", x)");
    let Stmt::Declaration(y) = &unit.program.statements[1] else {
        panic!("expected a declaration");
    };
    assert_eq!(y.ty, Type::Integer(64));

    let errors = analyze_errors("y := @asm(i32, 5)");
    assert_eq!(error_names(&errors), vec!["BuiltinArguments"]);
}
