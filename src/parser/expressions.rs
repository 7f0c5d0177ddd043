//! Expression parsing module
//!
//! Pratt parser over the oc operator table. Binary operators build a node
//! from the operator token with the operands as its two children.

use log::trace;

use crate::ast::{NodeRef, NodeSymbol};
use crate::diagnostic::ParseError;
use crate::lexer::{Token, TokenKind};

use super::Parser;
use super::declarations::parse_basetype;

/// Binding power for Pratt parser operator precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BindingPower(u8);

impl BindingPower {
    pub const MIN: Self = Self(0);
    pub const ASSIGNMENT: Self = Self(1);
    pub const RELATIONAL: Self = Self(2);
    pub const ADDITIVE: Self = Self(3);
    pub const MULTIPLICATIVE: Self = Self(4);
    pub const UNARY: Self = Self(5);
    pub const POSTFIX: Self = Self(6);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Pratt parser implementation
pub struct PrattParser;

impl PrattParser {
    pub fn get_binding_power(token_kind: TokenKind) -> Option<(BindingPower, Associativity)> {
        match token_kind {
            TokenKind::Punct('=') => Some((BindingPower::ASSIGNMENT, Associativity::Right)),

            // All six comparisons share one level
            TokenKind::Eq | TokenKind::Ne | TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => {
                Some((BindingPower::RELATIONAL, Associativity::Left))
            }

            TokenKind::Punct('+') | TokenKind::Punct('-') => Some((BindingPower::ADDITIVE, Associativity::Left)),

            TokenKind::Punct('*') | TokenKind::Punct('/') | TokenKind::Punct('%') => {
                Some((BindingPower::MULTIPLICATIVE, Associativity::Left))
            }

            TokenKind::Punct('(') | TokenKind::Punct('[') | TokenKind::Punct('.') => {
                Some((BindingPower::POSTFIX, Associativity::Left))
            }

            _ => None,
        }
    }

    /// Node for a binary operator token.
    fn binary_symbol(token_kind: TokenKind) -> Option<NodeSymbol> {
        let symbol = match token_kind {
            TokenKind::Punct('=') => NodeSymbol::Assign,
            TokenKind::Eq => NodeSymbol::Eq,
            TokenKind::Ne => NodeSymbol::Ne,
            TokenKind::Lt => NodeSymbol::Lt,
            TokenKind::Le => NodeSymbol::Le,
            TokenKind::Gt => NodeSymbol::Gt,
            TokenKind::Ge => NodeSymbol::Ge,
            TokenKind::Punct('+') => NodeSymbol::Add,
            TokenKind::Punct('-') => NodeSymbol::Sub,
            TokenKind::Punct('*') => NodeSymbol::Mul,
            TokenKind::Punct('/') => NodeSymbol::Div,
            TokenKind::Punct('%') => NodeSymbol::Rem,
            _ => return None,
        };
        Some(symbol)
    }
}

/// Parse a full expression.
pub(super) fn parse_expr(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    parse_expression(parser, BindingPower::MIN)
}

/// Main expression parsing using Pratt algorithm
pub fn parse_expression(parser: &mut Parser, min_binding_power: BindingPower) -> Result<NodeRef, ParseError> {
    trace!("parse_expression: min_binding_power={}", min_binding_power.0);
    let mut left = parse_prefix(parser)?;

    loop {
        let kind = parser.current_token_kind();
        let Some((binding_power, associativity)) = PrattParser::get_binding_power(kind) else {
            break;
        };
        if binding_power < min_binding_power {
            break;
        }
        // Only a bare name can be called.
        if kind == TokenKind::Punct('(') && parser.ast.symbol(left) != NodeSymbol::Ident {
            break;
        }

        let next_min_bp = match associativity {
            Associativity::Right => binding_power,
            Associativity::Left => BindingPower(binding_power.0 + 1),
        };
        let op_token = parser.advance();
        left = parse_infix(parser, left, op_token, next_min_bp)?;
    }

    Ok(left)
}

/// Parse prefix expression
fn parse_prefix(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let token = parser.current_token();
    trace!("parse_prefix: token={:?} at {}", token.kind, token.loc);
    match token.kind {
        TokenKind::Punct('+') => parse_unary_operator(parser, NodeSymbol::Add, NodeSymbol::Pos),
        TokenKind::Punct('-') => parse_unary_operator(parser, NodeSymbol::Sub, NodeSymbol::Neg),
        TokenKind::Punct('!') => parse_unary_operator(parser, NodeSymbol::Not, NodeSymbol::Not),
        TokenKind::Ord => parse_unary_operator(parser, NodeSymbol::Ord, NodeSymbol::Ord),
        TokenKind::Chr => parse_unary_operator(parser, NodeSymbol::Chr, NodeSymbol::Chr),
        TokenKind::Punct('(') => {
            parser.advance();
            let expr = parse_expr(parser)?;
            parser.expect_punct(')')?;
            Ok(expr)
        }
        TokenKind::New => parse_allocator(parser),
        TokenKind::Ident => leaf(parser, NodeSymbol::Ident),
        TokenKind::IntCon => leaf(parser, NodeSymbol::IntCon),
        TokenKind::CharCon => leaf(parser, NodeSymbol::CharCon),
        TokenKind::StringCon => leaf(parser, NodeSymbol::StringCon),
        TokenKind::False => leaf(parser, NodeSymbol::False),
        TokenKind::True => leaf(parser, NodeSymbol::True),
        TokenKind::Null => leaf(parser, NodeSymbol::Null),
        _ => Err(parser.error("expression")),
    }
}

fn leaf(parser: &mut Parser, symbol: NodeSymbol) -> Result<NodeRef, ParseError> {
    let token = parser.advance();
    Ok(parser.push_token_node(symbol, token))
}

/// Parse unary operator. The node is created with the operator's binary
/// symbol and re-tagged once the operand is adopted.
fn parse_unary_operator(parser: &mut Parser, symbol: NodeSymbol, unary: NodeSymbol) -> Result<NodeRef, ParseError> {
    let token = parser.advance();
    let node = parser.push_token_node(symbol, token);
    let operand = parse_expression(parser, BindingPower::UNARY)?;
    Ok(parser.ast.adopt_sym(node, operand, unary)?)
}

/// `new TYPEID '(' ')'`, `new string '(' expr ')'` or `new basetype '[' expr ']'`.
fn parse_allocator(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::New)?;

    if parser.is_token(TokenKind::String) && parser.peek_token_kind(1) == TokenKind::Punct('(') {
        parser.advance();
        let node = parser.push_token_node(NodeSymbol::NewString, keyword);
        parser.expect_punct('(')?;
        let size = parse_expr(parser)?;
        parser.expect_punct(')')?;
        return Ok(parser.ast.adopt(node, size)?);
    }

    if parser.is_token(TokenKind::Ident) && parser.peek_token_kind(1) == TokenKind::Punct('(') {
        let name = parser.advance();
        let node = parser.push_token_node(NodeSymbol::New, keyword);
        let type_id = parser.push_token_node(NodeSymbol::TypeId, name);
        parser.expect_punct('(')?;
        parser.expect_punct(')')?;
        return Ok(parser.ast.adopt(node, type_id)?);
    }

    let base = parse_basetype(parser)?;
    let node = parser.push_token_node(NodeSymbol::NewArray, keyword);
    parser.expect_punct('[')?;
    let size = parse_expr(parser)?;
    parser.expect_punct(']')?;
    Ok(parser.ast.adopt2(node, base, size)?)
}

/// Parse infix operator
fn parse_infix(
    parser: &mut Parser,
    left: NodeRef,
    operator_token: Token,
    min_bp: BindingPower,
) -> Result<NodeRef, ParseError> {
    match operator_token.kind {
        TokenKind::Punct('(') => return parse_function_call(parser, left, operator_token),
        TokenKind::Punct('[') => return parse_index_access(parser, left, operator_token),
        TokenKind::Punct('.') => return parse_member_access(parser, left, operator_token),
        _ => {}
    }

    let Some(symbol) = PrattParser::binary_symbol(operator_token.kind) else {
        return Err(parser.error("operator"));
    };
    let node = parser.push_token_node(symbol, operator_token);
    let right = parse_expression(parser, min_bp)?;
    Ok(parser.ast.adopt2(node, left, right)?)
}

/// `IDENT '(' [expr {',' expr}] ')'`
fn parse_function_call(parser: &mut Parser, function: NodeRef, open: Token) -> Result<NodeRef, ParseError> {
    let node = parser.push_token_node(NodeSymbol::Call, open);
    parser.ast.adopt(node, function)?;
    if !parser.is_token(TokenKind::Punct(')')) {
        loop {
            let arg = parse_expr(parser)?;
            parser.ast.adopt(node, arg)?;
            if parser.accept(TokenKind::Punct(',')).is_none() {
                break;
            }
        }
    }
    parser.expect_punct(')')?;
    Ok(node)
}

fn parse_index_access(parser: &mut Parser, array: NodeRef, open: Token) -> Result<NodeRef, ParseError> {
    let node = parser.push_token_node(NodeSymbol::Index, open);
    let subscript = parse_expr(parser)?;
    parser.expect_punct(']')?;
    Ok(parser.ast.adopt2(node, array, subscript)?)
}

fn parse_member_access(parser: &mut Parser, object: NodeRef, dot: Token) -> Result<NodeRef, ParseError> {
    let node = parser.push_token_node(NodeSymbol::Select, dot);
    let name = parser.expect_name()?;
    let field = parser.push_token_node(NodeSymbol::Field, name);
    Ok(parser.ast.adopt2(node, object, field)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::ast::dumper::AstDumper;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    #[test]
    fn binding_powers() {
        assert!(
            PrattParser::get_binding_power(TokenKind::Punct('*')).unwrap().0
                > PrattParser::get_binding_power(TokenKind::Punct('-')).unwrap().0
        );
        assert_eq!(
            PrattParser::get_binding_power(TokenKind::Eq),
            PrattParser::get_binding_power(TokenKind::Ge)
        );
        assert_eq!(
            PrattParser::get_binding_power(TokenKind::Punct('=')),
            Some((BindingPower::ASSIGNMENT, Associativity::Right))
        );
        assert_eq!(PrattParser::get_binding_power(TokenKind::Punct(';')), None);
    }

    #[test]
    fn subtraction_is_left_associative() {
        let lexed = tokenize("a - b - c;", "test.oc");
        let mut ast = Ast::new();
        parse(&lexed.tokens, &mut ast).unwrap();
        insta::assert_snapshot!(AstDumper::new(&ast, None).dump(), @r#"
        ROOT "<<ROOT>>" (0.0.0)
        |  '-' "-" (0.1.6)
        |  |  '-' "-" (0.1.2)
        |  |  |  IDENT "a" (0.1.0)
        |  |  |  IDENT "b" (0.1.4)
        |  |  IDENT "c" (0.1.8)
        "#);
    }

    #[test]
    fn ord_chr_and_comparison_chain() {
        let lexed = tokenize("ord c == chr 65 != false;", "test.oc");
        let mut ast = Ast::new();
        parse(&lexed.tokens, &mut ast).unwrap();
        insta::assert_snapshot!(AstDumper::new(&ast, None).dump(), @r#"
        ROOT "<<ROOT>>" (0.0.0)
        |  NE "!=" (0.1.16)
        |  |  EQ "==" (0.1.6)
        |  |  |  ORD "ord" (0.1.0)
        |  |  |  |  IDENT "c" (0.1.4)
        |  |  |  CHR "chr" (0.1.9)
        |  |  |  |  INTCON "65" (0.1.13)
        |  |  FALSE "false" (0.1.19)
        "#);
    }

    #[test]
    fn call_needs_a_name() {
        let lexed = tokenize("f(1)(2);", "test.oc");
        let mut ast = Ast::new();
        let error = parse(&lexed.tokens, &mut ast).unwrap_err();
        assert_eq!(error.to_string(), "syntax error: expected ';', found (");
    }
}
