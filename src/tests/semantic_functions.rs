use crate::tests::test_utils::{assert_clean, diagnostics_of, run_fail_with_message};

#[test]
fn non_void_function_needs_a_return() {
    assert_eq!(
        diagnostics_of("int f() { }"),
        "occ: expects return type int, but is missing return statement: f (0.1.4)\n"
    );
}

#[test]
fn void_function_returns_no_value() {
    assert_eq!(
        diagnostics_of("void f() { return 1; }"),
        "occ: returns non-void value from void function: return (0.1.11)\n"
    );
    assert_clean("void g() { return; }");
}

#[test]
fn bare_return_in_non_void_function() {
    assert_eq!(
        diagnostics_of("int f() { return; }"),
        "occ: expects type int but operand is of type void: return (0.1.10)\n"
    );
}

#[test]
fn returns_inside_nested_statements_are_checked() {
    assert_clean("int abs(int x) { if (x < 0) return -x; return x; }");
    run_fail_with_message(
        "int f(bool b) { while (b) { return true; } return 0; }",
        "expects type int but operand is of type bool: return (0.1.28)",
    );
}

#[test]
fn call_argument_counts() {
    let source = "void g(int a, bool b) { }\ng(1);\ng(1, true, 'c');";
    assert_eq!(
        diagnostics_of(source),
        "occ: call missing argument of type bool: g (0.2.0)\n\
         occ: call has extra argument of type char: g (0.3.0)\n"
    );
}

#[test]
fn only_first_mismatched_argument_is_reported() {
    assert_eq!(
        diagnostics_of("void g(int a, bool b) { }\ng(true, 1);"),
        "occ: expects type int but operand is of type bool: g (0.2.0)\n"
    );
}

#[test]
fn calling_a_variable() {
    assert_eq!(
        diagnostics_of("int x = 1;\nx(2);"),
        "occ: is not a function: x (0.2.0)\n"
    );
}

#[test]
fn call_takes_the_return_type() {
    assert_clean("string name() { return \"oc\"; }\nstring s = name();\nchar c = name()[0];");
    run_fail_with_message(
        "bool yes() { return true; }\nint n = yes();",
        "expects type int but operand is of type bool: = (0.2.6)",
    );
}

#[test]
fn definition_matching_its_prototype() {
    assert_clean("int f(int a);\nint g() { return f(2); }\nint f(int a) { return a; }\nint y = f(1);");
}

#[test]
fn definition_differing_from_prototype() {
    assert_eq!(
        diagnostics_of("int f(int a);\nint f(bool a) { return 1; }"),
        "occ: declared function differs from prototype: f (0.2.11)\n"
    );
    assert_eq!(
        diagnostics_of("int f(int a);\nint f(int b) { return 1; }"),
        "occ: declared function differs from prototype: f (0.2.10)\n"
    );
    run_fail_with_message(
        "int f(int a);\nbool f(int a) { return true; }",
        "declared function differs from prototype: f (0.2.5)",
    );
}

#[test]
fn definition_clears_the_prototype() {
    assert_eq!(
        diagnostics_of("int f(int a);\nint f(int a) { return a; }\nint f(int a) { return a; }"),
        "occ: identifier previously declared: f (0.3.4)\n"
    );
}

#[test]
fn mismatched_definition_still_clears_the_prototype() {
    assert_eq!(
        diagnostics_of("int f(int a);\nint f(bool a) { return 1; }\nint f(int a) { return a; }"),
        "occ: declared function differs from prototype: f (0.2.11)\n\
         occ: identifier previously declared: f (0.3.4)\n"
    );
}

#[test]
fn parameter_count_differs_from_prototype() {
    assert_eq!(
        diagnostics_of("int f(int a, int b);\nint f(int a) { return a; }"),
        "occ: declared function differs from prototype: f (0.2.10)\n"
    );
    assert_eq!(
        diagnostics_of("int f(int a);\nint f(int a, int b) { return a; }"),
        "occ: declared function differs from prototype: f (0.2.17)\n"
    );
    assert_eq!(
        diagnostics_of("int f(int a);\nint f() { return 1; }"),
        "occ: declared function differs from prototype: f (0.2.4)\n"
    );
}

#[test]
fn function_defined_twice() {
    assert_eq!(
        diagnostics_of("void f() { }\nvoid f() { }"),
        "occ: identifier previously declared: f (0.2.5)\n"
    );
}

#[test]
fn void_parameter() {
    assert_eq!(
        diagnostics_of("void f(void v) { }"),
        "occ: declares identifier of type void: v (0.1.12)\n"
    );
}
