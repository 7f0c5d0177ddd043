//! End-to-end tests over the public pipeline: lex, parse, analyze, emit.

use occ::ast::Ast;
use occ::codegen::{OilGen, emit_program};
use occ::diagnostic::DiagnosticEngine;
use occ::lexer::tokenize;
use occ::parser::parse;
use occ::semantic::{SemaOutput, analyze};

/// Runs the front end, returning the tree, analysis output and diagnostics.
fn compile(source: &str) -> (Ast, SemaOutput, DiagnosticEngine) {
    let lexed = tokenize(source, "test.oc");
    assert!(lexed.errors.is_empty(), "lexical errors: {:?}", lexed.errors);
    let mut ast = Ast::new();
    parse(&lexed.tokens, &mut ast).unwrap();
    let mut diag = DiagnosticEngine::default();
    let sema = analyze(&mut ast, &mut diag);
    (ast, sema, diag)
}

fn diagnostics(source: &str) -> String {
    compile(source).2.render()
}

#[test]
fn global_initialization() {
    let (ast, sema, diag) = compile("int x = 3 + 4;");
    assert!(!diag.has_errors());
    assert_eq!(
        emit_program(&ast, &sema),
        "int __x;\nvoid __ocmain (void)\n{\n        int i1 = 3 + 4;\n        __x = i1;\n}\n"
    );
}

#[test]
fn value_returned_from_void_function() {
    assert_eq!(
        diagnostics("void f() { return 1; }"),
        "occ: returns non-void value from void function: return (0.1.11)\n"
    );
}

#[test]
fn selecting_from_an_int() {
    assert_eq!(
        diagnostics("int i = 0;\nint j = i.f;"),
        "occ: passed non-selectable type int: . (0.2.9)\n"
    );
}

#[test]
fn errors_do_not_cascade_from_undeclared_names() {
    assert_eq!(
        diagnostics("int a = b + 1;\nbool c = b < 2;\nint d = b.f;"),
        "occ: reference to undeclared identifier: b (0.1.8)\n\
         occ: reference to undeclared identifier: b (0.2.9)\n\
         occ: reference to undeclared identifier: b (0.3.8)\n"
    );
}

#[test]
fn emission_is_repeatable_from_the_same_counter() {
    let source = "int f(int n) { int m = n * 2; while (m > 0) m = m - 1; return m; }\nint r = f(3);";
    let (ast, sema, diag) = compile(source);
    assert!(!diag.has_errors());

    let mut first = OilGen::new(&ast, &sema).with_counter(5);
    let a = first.emit_module();
    let mut second = OilGen::new(&ast, &sema).with_counter(5);
    let b = second.emit_module();
    assert_eq!(a, b);
    assert_eq!(first.counter(), second.counter());
    assert!(a.contains("int i5 = _1_n * 2;"));
    assert!(!a.contains("i1 "));
}

#[test]
fn whole_program() {
    let source = r#"
struct list { int head; list tail; }

list cons(int head, list tail) {
    list cell = new list();
    cell.head = head;
    cell.tail = tail;
    return cell;
}

int length(list l) {
    int n = 0;
    while (l != null) {
        n = n + 1;
        l = l.tail;
    }
    return n;
}

string greeting = "hello";
list xs = cons(1, cons(2, null));
int len = length(xs);
"#;
    let (ast, sema, diag) = compile(source);
    assert_eq!(diag.render(), "");
    let oil = emit_program(&ast, &sema);
    assert!(oil.starts_with("struct s_list {\n        int f_list_head;\n        struct s_list* f_list_tail;\n};\n"));
    assert!(oil.contains("char* s1 = \"hello\";\n"));
    assert!(oil.contains("struct s_list* __cons (\n        int _1_head,\n        struct s_list* _1_tail)\n"));
    assert!(oil.contains("        struct s_list* _1_cell = p2;\n"));
    assert!(oil.contains("        __len = "));
    assert!(oil.contains("void __ocmain (void)\n{\n        __greeting = s1;\n"));
}
