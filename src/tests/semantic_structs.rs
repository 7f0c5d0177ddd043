use crate::driver::artifact::CompilePhase;
use crate::tests::test_utils::{assert_clean, ast_dump_of, diagnostics_of, run_fail_with_message, run_pipeline_success};

#[test]
fn self_referencing_struct() {
    assert_clean(
        "struct node { int value; node next; }\n\
         node n = new node();\n\
         int v = n.value;\n\
         n.next = null;\n\
         n.next.value = 2;",
    );
}

#[test]
fn unknown_field() {
    assert_eq!(
        diagnostics_of("struct p { int x; }\np q = new p();\nint y = q.z;"),
        "occ: selects unknown field from struct \"p\": z (0.3.10)\n"
    );
}

#[test]
fn undefined_struct_is_incomplete() {
    assert_eq!(
        diagnostics_of("q x = null;"),
        "occ: reference to incomplete type: q (0.1.0)\n"
    );
    run_fail_with_message("int[] v = null;\nv = new int[1];\nw[] a = new w[2];", "reference to incomplete type: w");
}

#[test]
fn fields_may_name_structs_defined_later() {
    assert_clean("struct a { b other; }\nstruct b { int n; }");
}

#[test]
fn struct_defined_twice() {
    assert_eq!(
        diagnostics_of("struct a { int x; }\nstruct a { int y; }"),
        "occ: identifier previously declared: a (0.2.7)\n"
    );
}

#[test]
fn duplicate_and_void_fields() {
    assert_eq!(
        diagnostics_of("struct a { int x; bool x; }"),
        "occ: identifier previously declared: x (0.1.23)\n"
    );
    assert_eq!(
        diagnostics_of("struct a { void v; }"),
        "occ: declares identifier of type void: v (0.1.16)\n"
    );
}

#[test]
fn struct_types_compare_by_name() {
    run_fail_with_message(
        "struct a { int x; }\nstruct b { int x; }\na p = new b();",
        "expects type struct \"a\" but operand is of type struct \"b\": = (0.3.4)",
    );
}

#[test]
fn selection_is_decorated_with_the_field_type() {
    insta::assert_snapshot!(ast_dump_of("struct s { char c; }\ns v = new s();\nv.c = 'x';"), @r#"
    ROOT "<<ROOT>>" (0.0.0) {0}
    |  STRUCT "struct" (0.1.0) {0}
    |  |  TYPEID "s" (0.1.7) {0} struct "s"
    |  |  CHAR "char" (0.1.11) {0}
    |  |  |  FIELD "c" (0.1.16) {0} char field
    |  VARDECL "=" (0.2.4) {0}
    |  |  TYPEID "s" (0.2.0) {0} struct "s"
    |  |  |  DECLID "v" (0.2.2) {0} struct "s" variable lval
    |  |  NEW "new" (0.2.6) {0} struct "s" vreg
    |  |  |  TYPEID "s" (0.2.10) {0} struct "s"
    |  '=' "=" (0.3.4) {0} char vreg
    |  |  '.' "." (0.3.1) {0} char lval vaddr
    |  |  |  IDENT "v" (0.3.0) {0} struct "s" variable lval (0.2.2)
    |  |  |  FIELD "c" (0.3.2) {0} field
    |  |  CHARCON "'x'" (0.3.6) {0} char const
    "#);
}

#[test]
fn selecting_through_an_undefined_struct() {
    let source = "struct a { b inner; }\na v = new a();\nint y = v.inner.z;";
    assert_eq!(diagnostics_of(source), "occ: reference to incomplete type: b (0.3.16)\n");

    let (driver, artifact) = run_pipeline_success(source, CompilePhase::Emit);
    assert_eq!(driver.diagnostics().error_count(), 1);
    assert!(artifact.oil.is_none());
}
