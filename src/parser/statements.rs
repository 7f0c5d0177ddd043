//! Statement parsing module

use log::trace;

use crate::ast::{NodeRef, NodeSymbol};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;

use super::Parser;
use super::declarations::parse_identdecl;
use super::expressions::parse_expr;

/// Parse a statement
pub(super) fn parse_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    trace!("parse_statement: {:?}", parser.current_token_kind());
    match parser.current_token_kind() {
        TokenKind::Punct('{') => parse_block(parser),
        TokenKind::Punct(';') => {
            let semi = parser.advance();
            Ok(parser.push_token_node(NodeSymbol::Semicolon, semi))
        }
        TokenKind::While => parse_while(parser),
        TokenKind::If => parse_if(parser),
        TokenKind::Return => parse_return(parser),
        _ if parser.starts_declaration() => {
            let decl = parse_identdecl(parser, NodeSymbol::DeclId)?;
            parse_vardecl_rest(parser, decl)
        }
        _ => {
            let expr = parse_expr(parser)?;
            parser.expect_punct(';')?;
            Ok(expr)
        }
    }
}

/// `'{' { statement } '}'`
pub(super) fn parse_block(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let open = parser.expect_punct('{')?;
    let block = parser.push_token_node(NodeSymbol::Block, open);
    while !parser.is_token(TokenKind::Punct('}')) {
        if parser.at_end() {
            return Err(parser.error("'}'"));
        }
        let statement = parse_statement(parser)?;
        parser.ast.adopt(block, statement)?;
    }
    parser.expect_punct('}')?;
    Ok(block)
}

/// `'=' expr ';'` following an already parsed declaration.
pub(super) fn parse_vardecl_rest(parser: &mut Parser, decl: NodeRef) -> Result<NodeRef, ParseError> {
    let assign = parser.expect_punct('=')?;
    let node = parser.push_token_node(NodeSymbol::VarDecl, assign);
    let init = parse_expr(parser)?;
    parser.expect_punct(';')?;
    Ok(parser.ast.adopt2(node, decl, init)?)
}

fn parse_condition(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    parser.expect_punct('(')?;
    let cond = parse_expr(parser)?;
    parser.expect_punct(')')?;
    Ok(cond)
}

fn parse_while(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::While)?;
    let node = parser.push_token_node(NodeSymbol::While, keyword);
    let cond = parse_condition(parser)?;
    let body = parse_statement(parser)?;
    Ok(parser.ast.adopt2(node, cond, body)?)
}

/// `if` with an `else` arm becomes IFELSE with three children.
fn parse_if(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::If)?;
    let node = parser.push_token_node(NodeSymbol::If, keyword);
    let cond = parse_condition(parser)?;
    let then_arm = parse_statement(parser)?;
    parser.ast.adopt2(node, cond, then_arm)?;
    if parser.accept(TokenKind::Else).is_some() {
        let else_arm = parse_statement(parser)?;
        parser.ast.adopt_sym(node, else_arm, NodeSymbol::IfElse)?;
    }
    Ok(node)
}

fn parse_return(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Return)?;
    let node = parser.push_token_node(NodeSymbol::Return, keyword);
    if parser.accept(TokenKind::Punct(';')).is_some() {
        return Ok(parser.ast.change_sym(node, NodeSymbol::ReturnVoid));
    }
    let value = parse_expr(parser)?;
    parser.expect_punct(';')?;
    Ok(parser.ast.adopt(node, value)?)
}

#[cfg(test)]
mod tests {
    use crate::ast::Ast;
    use crate::ast::dumper::AstDumper;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    #[test]
    fn control_flow_shapes() {
        let source = "while (i < n) { if (!done) i = i + 1; else return i; }";
        let lexed = tokenize(source, "test.oc");
        let mut ast = Ast::new();
        parse(&lexed.tokens, &mut ast).unwrap();
        insta::assert_snapshot!(AstDumper::new(&ast, None).dump(), @r#"
        ROOT "<<ROOT>>" (0.0.0)
        |  WHILE "while" (0.1.0)
        |  |  LT "<" (0.1.9)
        |  |  |  IDENT "i" (0.1.7)
        |  |  |  IDENT "n" (0.1.11)
        |  |  BLOCK "{" (0.1.14)
        |  |  |  IFELSE "if" (0.1.16)
        |  |  |  |  '!' "!" (0.1.20)
        |  |  |  |  |  IDENT "done" (0.1.21)
        |  |  |  |  '=' "=" (0.1.29)
        |  |  |  |  |  IDENT "i" (0.1.27)
        |  |  |  |  |  '+' "+" (0.1.33)
        |  |  |  |  |  |  IDENT "i" (0.1.31)
        |  |  |  |  |  |  INTCON "1" (0.1.35)
        |  |  |  |  RETURN "return" (0.1.43)
        |  |  |  |  |  IDENT "i" (0.1.50)
        "#);
    }

    #[test]
    fn local_declaration_and_empty_statement() {
        let lexed = tokenize("{ string[] s = null; ; }", "test.oc");
        let mut ast = Ast::new();
        parse(&lexed.tokens, &mut ast).unwrap();
        insta::assert_snapshot!(AstDumper::new(&ast, None).dump(), @r#"
        ROOT "<<ROOT>>" (0.0.0)
        |  BLOCK "{" (0.1.0)
        |  |  VARDECL "=" (0.1.13)
        |  |  |  ARRAY "[]" (0.1.8)
        |  |  |  |  STRING "string" (0.1.2)
        |  |  |  |  DECLID "s" (0.1.11)
        |  |  |  NULL "null" (0.1.15)
        |  |  ';' ";" (0.1.21)
        "#);
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let lexed = tokenize("{ x = 1;", "test.oc");
        let mut ast = Ast::new();
        let error = parse(&lexed.tokens, &mut ast).unwrap_err();
        assert_eq!(error.to_string(), "syntax error: unexpected end of file, expected '}'");
    }
}
