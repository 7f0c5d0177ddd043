use crate::driver::artifact::CompilePhase;
use crate::tests::test_utils::{ast_dump_of, run_pipeline_success};

#[test]
fn decorated_dump_shows_blocks_attributes_and_declarations() {
    insta::assert_snapshot!(ast_dump_of("int x = 1;\nx = x + 2;"), @r#"
    ROOT "<<ROOT>>" (0.0.0) {0}
    |  VARDECL "=" (0.1.6) {0}
    |  |  INT "int" (0.1.0) {0}
    |  |  |  DECLID "x" (0.1.4) {0} int variable lval
    |  |  INTCON "1" (0.1.8) {0} int const
    |  '=' "=" (0.2.2) {0} int vreg
    |  |  IDENT "x" (0.2.0) {0} int variable lval (0.1.4)
    |  |  '+' "+" (0.2.6) {0} int vreg
    |  |  |  IDENT "x" (0.2.4) {0} int variable lval (0.1.4)
    |  |  |  INTCON "2" (0.2.8) {0} int const
    "#);
}

#[test]
fn undeclared_identifier_is_marked() {
    insta::assert_snapshot!(ast_dump_of("y;"), @r#"
    ROOT "<<ROOT>>" (0.0.0) {0}
    |  IDENT "y" (0.1.0) {0} (not declared)
    "#);
}

#[test]
fn parse_phase_keeps_the_raw_tree() {
    let (_, output) = run_pipeline_success("{ x; }", CompilePhase::Parse);
    assert!(output.ast_dump.is_none());
    let ast = output.ast.unwrap();
    insta::assert_snapshot!(crate::ast::dumper::AstDumper::new(&ast, None).dump(), @r#"
    ROOT "<<ROOT>>" (0.0.0)
    |  BLOCK "{" (0.1.0)
    |  |  IDENT "x" (0.1.2)
    "#);
}

#[test]
fn released_tree_dumps_only_the_root() {
    let (_, output) = run_pipeline_success("int x = 1;", CompilePhase::Analyze);
    let mut ast = output.ast.unwrap();
    let first = ast.children(ast.root())[0];
    assert_eq!(ast.release_subtree(first), 4);
    assert_eq!(crate::ast::dumper::AstDumper::new(&ast, None).dump(), "ROOT \"<<ROOT>>\" (0.0.0)\n");
}
