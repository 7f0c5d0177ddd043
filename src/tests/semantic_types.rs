use crate::tests::test_utils::{assert_clean, diagnostics_of, run_fail_with_message};

#[test]
fn initializer_must_match_declared_type() {
    assert_eq!(
        diagnostics_of("int x = true;"),
        "occ: expects type int but operand is of type bool: = (0.1.6)\n"
    );
}

#[test]
fn null_initializes_references_only() {
    assert_clean("string s = null;\nint[] v = null;");
    assert_eq!(
        diagnostics_of("int n = null;"),
        "occ: expects type int but operand is of type null: = (0.1.6)\n"
    );
}

#[test]
fn conditions_must_be_bool() {
    assert_eq!(
        diagnostics_of("while (1) ;"),
        "occ: expects type bool but operand is of type int: while (0.1.0)\n"
    );
    run_fail_with_message(
        "if ('c') ; else ;",
        "expects type bool but operand is of type char: if (0.1.0)",
    );
    run_fail_with_message("bool b = !3;", "expects type bool but operand is of type int: ! (0.1.9)");
}

#[test]
fn arithmetic_takes_ints() {
    assert_eq!(
        diagnostics_of("int x = 1 + 'a';"),
        "occ: expects type int but operand is of type char: + (0.1.10)\n"
    );
    run_fail_with_message("int y = -true;", "expects type int but operand is of type bool: - (0.1.8)");
}

#[test]
fn relational_operands_must_be_ordered() {
    assert_eq!(
        diagnostics_of("bool b = \"a\" < \"b\";"),
        "occ: expects type bool char int but operand is of type string: < (0.1.13)\n"
    );
    assert_clean("bool c = 'a' < 'b';\nbool d = false <= true;");
}

#[test]
fn equality_accepts_null_against_references() {
    assert_clean("string s = null;\nbool b = s == null;\nbool c = 1 != 2;");
    run_fail_with_message("bool b = 1 == 'c';", "expects type int but operand is of type char: == (0.1.11)");
}

#[test]
fn assignment_needs_an_lvalue() {
    assert_eq!(
        diagnostics_of("1 = 2;"),
        "occ: assigns to non-lvalue of type int: = (0.1.2)\n"
    );
}

#[test]
fn ord_and_chr_convert_between_char_and_int() {
    assert_clean("int i = ord 'a';\nchar c = chr 65;");
    assert_eq!(
        diagnostics_of("char c = chr true;"),
        "occ: expects type int but operand is of type bool: chr (0.1.9)\n"
    );
}

#[test]
fn indexing_arrays_and_strings() {
    assert_clean("int[] v = new int[3];\nint x = v[0];\nstring s = new string(2);\nchar c = s[1];");
    assert_eq!(
        diagnostics_of("int n = 0;\nint m = n[0];"),
        "occ: passed non-indexable type int: [ (0.2.9)\n"
    );
    run_fail_with_message(
        "int[] v = new int[3];\nint x = v[true];",
        "expects type int but operand is of type bool: [ (0.2.9)",
    );
}

#[test]
fn selecting_from_a_non_struct() {
    assert_eq!(
        diagnostics_of("int n = 0;\nint m = n.f;"),
        "occ: passed non-selectable type int: . (0.2.9)\n"
    );
}

#[test]
fn array_allocation_checks_size_and_element() {
    run_fail_with_message(
        "int[] v = new int['c'];",
        "expects type int but operand is of type char: new (0.1.10)",
    );
    run_fail_with_message("void[] v = null;", "declares identifier of type void array: v (0.1.7)");
}

#[test]
fn void_calls_do_not_compare() {
    assert_eq!(
        diagnostics_of("void f() { }\nbool t = f() == f();"),
        "occ: expects type non-void but operand is of type void: == (0.2.13)\n"
    );
    run_fail_with_message(
        "void f() { }\nint n = 1;\nbool t = n != f();",
        "expects type non-void but operand is of type void: != (0.3.11)",
    );
}
