//! Recursive-descent parser building the oc tree.
//!
//! Declarations and statements are parsed by plain recursive descent,
//! expressions by precedence climbing (see [`expressions::BindingPower`]).
//! The first syntax error ends parsing.

pub mod declarations;
pub mod expressions;
pub mod statements;

use log::debug;

use crate::ast::{Ast, NameId, NodeRef, NodeSymbol};
use crate::diagnostic::ParseError;
use crate::lexer::{Token, TokenKind};
use crate::source::SourceLoc;

/// Main parser structure
pub struct Parser<'arena, 'src> {
    tokens: &'src [Token],
    current_idx: usize,
    ast: &'arena mut Ast,
}

impl<'arena, 'src> Parser<'arena, 'src> {
    pub fn new(tokens: &'src [Token], ast: &'arena mut Ast) -> Self {
        Parser {
            tokens,
            current_idx: 0,
            ast,
        }
    }

    /// Get the current token. Past the end this keeps returning end of file.
    fn current_token(&self) -> Token {
        match self.tokens.get(self.current_idx).or(self.tokens.last()) {
            Some(token) => *token,
            None => Token {
                kind: TokenKind::EndOfFile,
                loc: SourceLoc::default(),
                lexeme: NameId::new(""),
            },
        }
    }

    fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Peek `offset` tokens past the current one.
    fn peek_token_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.current_idx + offset)
            .map_or(TokenKind::EndOfFile, |token| token.kind)
    }

    fn is_token(&self, kind: TokenKind) -> bool {
        self.current_token_kind() == kind
    }

    fn at_end(&self) -> bool {
        self.is_token(TokenKind::EndOfFile)
    }

    /// Advance to the next token and return the previous one
    fn advance(&mut self) -> Token {
        let token = self.current_token();
        if self.current_idx < self.tokens.len() {
            self.current_idx += 1;
        }
        token
    }

    /// Consume the current token if it is of the accepted kind
    fn accept(&mut self, accepted: TokenKind) -> Option<Token> {
        if self.is_token(accepted) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if self.is_token(expected) {
            Ok(self.advance())
        } else {
            Err(self.error(&expected.name()))
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<Token, ParseError> {
        self.expect(TokenKind::Punct(punct))
    }

    fn expect_name(&mut self) -> Result<Token, ParseError> {
        self.expect(TokenKind::Ident)
    }

    /// Syntax error at the current token.
    fn error(&self, expected: &str) -> ParseError {
        let token = self.current_token();
        if token.kind == TokenKind::EndOfFile {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                location: token.loc,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.lexeme.to_string(),
                location: token.loc,
            }
        }
    }

    /// New detached node carrying a token's location and lexeme.
    fn push_token_node(&mut self, symbol: NodeSymbol, token: Token) -> NodeRef {
        self.ast.push_node(symbol, token.loc, token.lexeme.as_str())
    }

    /// True if the upcoming tokens start a declaration: a base type keyword,
    /// or a struct name followed by a name or `[]`.
    fn starts_declaration(&self) -> bool {
        let kind = self.current_token_kind();
        kind.is_base_type()
            || (kind == TokenKind::Ident
                && matches!(self.peek_token_kind(1), TokenKind::Ident | TokenKind::Array))
    }

    /// Parse a whole program into the tree's root.
    pub fn parse_program(&mut self) -> Result<NodeRef, ParseError> {
        let root = self.ast.root();
        while !self.at_end() {
            let item = declarations::parse_item(self)?;
            self.ast.adopt(root, item)?;
        }
        debug!("parser: {} top-level items", self.ast.children(root).len());
        Ok(root)
    }
}

/// Parse `tokens` into `ast`, returning the root.
pub fn parse(tokens: &[Token], ast: &mut Ast) -> Result<NodeRef, ParseError> {
    Parser::new(tokens, ast).parse_program()
}
