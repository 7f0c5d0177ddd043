//! Top-level items, struct definitions, functions and declarations.

use crate::ast::{NodeRef, NodeSymbol};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;

use super::Parser;
use super::statements::{parse_block, parse_statement, parse_vardecl_rest};

/// One top-level item: struct, function, prototype or statement.
pub(super) fn parse_item(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    if parser.is_token(TokenKind::Struct) {
        return parse_struct(parser);
    }
    if parser.starts_declaration() {
        let decl = parse_identdecl(parser, NodeSymbol::DeclId)?;
        if parser.is_token(TokenKind::Punct('(')) {
            return parse_function(parser, decl);
        }
        return parse_vardecl_rest(parser, decl);
    }
    parse_statement(parser)
}

/// `'struct' TYPEID '{' { fielddecl ';' } '}' [';']`
fn parse_struct(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Struct)?;
    let node = parser.push_token_node(NodeSymbol::Struct, keyword);
    let name = parser.expect_name()?;
    let type_id = parser.push_token_node(NodeSymbol::TypeId, name);
    parser.ast.adopt(node, type_id)?;

    parser.expect_punct('{')?;
    while !parser.is_token(TokenKind::Punct('}')) {
        let field = parse_identdecl(parser, NodeSymbol::Field)?;
        parser.expect_punct(';')?;
        parser.ast.adopt(node, field)?;
    }
    parser.expect_punct('}')?;
    parser.accept(TokenKind::Punct(';'));
    Ok(node)
}

/// `basetype ['[]'] NAME`. The name node is tagged `name_symbol`.
pub(super) fn parse_identdecl(parser: &mut Parser, name_symbol: NodeSymbol) -> Result<NodeRef, ParseError> {
    let base = parse_basetype(parser)?;
    let array = parser.accept(TokenKind::Array);
    let name = parser.expect_name()?;
    let ident = parser.push_token_node(name_symbol, name);
    match array {
        Some(marker) => {
            let node = parser.push_token_node(NodeSymbol::Array, marker);
            Ok(parser.ast.adopt2(node, base, ident)?)
        }
        None => Ok(parser.ast.adopt(base, ident)?),
    }
}

/// `'void' | 'bool' | 'char' | 'int' | 'string' | TYPEID`
pub(super) fn parse_basetype(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let token = parser.current_token();
    let symbol = match token.kind {
        TokenKind::Void => NodeSymbol::Void,
        TokenKind::Bool => NodeSymbol::Bool,
        TokenKind::Char => NodeSymbol::Char,
        TokenKind::Int => NodeSymbol::Int,
        TokenKind::String => NodeSymbol::String,
        TokenKind::Ident => NodeSymbol::TypeId,
        _ => return Err(parser.error("type")),
    };
    parser.advance();
    Ok(parser.push_token_node(symbol, token))
}

/// `'(' [identdecl {',' identdecl}] ')' ( block | ';' )` after the declaration.
fn parse_function(parser: &mut Parser, decl: NodeRef) -> Result<NodeRef, ParseError> {
    let open = parser.expect_punct('(')?;
    let params = parser.push_token_node(NodeSymbol::ParamList, open);
    if !parser.is_token(TokenKind::Punct(')')) {
        loop {
            let param = parse_identdecl(parser, NodeSymbol::DeclId)?;
            parser.ast.adopt(params, param)?;
            if parser.accept(TokenKind::Punct(',')).is_none() {
                break;
            }
        }
    }
    parser.expect_punct(')')?;

    let terminator = if let Some(semi) = parser.accept(TokenKind::Punct(';')) {
        parser.push_token_node(NodeSymbol::Semicolon, semi)
    } else if parser.is_token(TokenKind::Punct('{')) {
        parse_block(parser)?
    } else {
        return Err(parser.error("'{' or ';'"));
    };
    Ok(parser.ast.adopt_function(decl, params, terminator)?)
}

#[cfg(test)]
mod tests {
    use crate::ast::Ast;
    use crate::ast::dumper::AstDumper;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    #[test]
    fn struct_fields_and_optional_semicolon() {
        let lexed = tokenize("struct node { int value; node[] kids; }\nstruct e {};", "test.oc");
        let mut ast = Ast::new();
        parse(&lexed.tokens, &mut ast).unwrap();
        insta::assert_snapshot!(AstDumper::new(&ast, None).dump(), @r#"
        ROOT "<<ROOT>>" (0.0.0)
        |  STRUCT "struct" (0.1.0)
        |  |  TYPEID "node" (0.1.7)
        |  |  INT "int" (0.1.14)
        |  |  |  FIELD "value" (0.1.18)
        |  |  ARRAY "[]" (0.1.29)
        |  |  |  TYPEID "node" (0.1.25)
        |  |  |  FIELD "kids" (0.1.32)
        |  STRUCT "struct" (0.2.0)
        |  |  TYPEID "e" (0.2.7)
        "#);
    }
}
