//! Hand-written scanner for oc source text.
//!
//! The input is expected to be preprocessor output: line markers of the form
//! `# <line> "<file>"` switch the current file. Comments are skipped as well,
//! so raw sources scan the same way.

use std::fmt::Write;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;

use log::{debug, trace};

use crate::ast::NameId;
use crate::diagnostic::LexError;
use crate::source::{FileId, SourceLoc, SourceMap};

/// oc token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === KEYWORDS ===
    Void,
    Bool,
    Char,
    Int,
    String,
    If,
    Else,
    While,
    Return,
    Struct,
    False,
    True,
    Null,
    New,
    Ord,
    Chr,

    // === MULTI-CHARACTER OPERATORS ===
    /// `[]` array marker
    Array,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // === IDENTIFIERS AND LITERALS ===
    Ident,
    IntCon,
    CharCon,
    StringCon,

    /// Single-character operator or punctuator, coded by its ASCII value.
    Punct(char),

    EndOfFile,
}

impl TokenKind {
    /// Numeric token code. Single characters use their ASCII value, every
    /// other token is numbered from 258.
    pub fn code(self) -> u32 {
        match self {
            TokenKind::Void => 258,
            TokenKind::Bool => 259,
            TokenKind::Char => 260,
            TokenKind::Int => 261,
            TokenKind::String => 262,
            TokenKind::If => 263,
            TokenKind::Else => 264,
            TokenKind::While => 265,
            TokenKind::Return => 266,
            TokenKind::Struct => 267,
            TokenKind::False => 268,
            TokenKind::True => 269,
            TokenKind::Null => 270,
            TokenKind::New => 271,
            TokenKind::Array => 272,
            TokenKind::Eq => 273,
            TokenKind::Ne => 274,
            TokenKind::Lt => 275,
            TokenKind::Le => 276,
            TokenKind::Gt => 277,
            TokenKind::Ge => 278,
            TokenKind::Ident => 279,
            TokenKind::IntCon => 280,
            TokenKind::CharCon => 281,
            TokenKind::StringCon => 282,
            TokenKind::Ord => 292,
            TokenKind::Chr => 293,
            TokenKind::Punct(c) => c as u32,
            TokenKind::EndOfFile => 0,
        }
    }

    pub fn name(self) -> String {
        let name = match self {
            TokenKind::Void => "TOK_VOID",
            TokenKind::Bool => "TOK_BOOL",
            TokenKind::Char => "TOK_CHAR",
            TokenKind::Int => "TOK_INT",
            TokenKind::String => "TOK_STRING",
            TokenKind::If => "TOK_IF",
            TokenKind::Else => "TOK_ELSE",
            TokenKind::While => "TOK_WHILE",
            TokenKind::Return => "TOK_RETURN",
            TokenKind::Struct => "TOK_STRUCT",
            TokenKind::False => "TOK_FALSE",
            TokenKind::True => "TOK_TRUE",
            TokenKind::Null => "TOK_NULL",
            TokenKind::New => "TOK_NEW",
            TokenKind::Ord => "TOK_ORD",
            TokenKind::Chr => "TOK_CHR",
            TokenKind::Array => "TOK_ARRAY",
            TokenKind::Eq => "TOK_EQ",
            TokenKind::Ne => "TOK_NE",
            TokenKind::Lt => "TOK_LT",
            TokenKind::Le => "TOK_LE",
            TokenKind::Gt => "TOK_GT",
            TokenKind::Ge => "TOK_GE",
            TokenKind::Ident => "TOK_IDENT",
            TokenKind::IntCon => "TOK_INTCON",
            TokenKind::CharCon => "TOK_CHARCON",
            TokenKind::StringCon => "TOK_STRINGCON",
            TokenKind::Punct(c) => return format!("'{}'", c),
            TokenKind::EndOfFile => "$end",
        };
        name.to_string()
    }

    /// True for tokens that start a base type in a declaration.
    pub fn is_base_type(self) -> bool {
        matches!(
            self,
            TokenKind::Void | TokenKind::Bool | TokenKind::Char | TokenKind::Int | TokenKind::String
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: SourceLoc,
    pub lexeme: NameId,
}

pub fn is_keyword(symbol: NameId) -> Option<TokenKind> {
    keyword_map().get(&symbol).copied()
}

fn keyword_map() -> &'static hashbrown::HashMap<NameId, TokenKind> {
    static KEYWORDS: OnceLock<hashbrown::HashMap<NameId, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        let mut m = hashbrown::HashMap::new();
        m.insert(NameId::new("bool"), TokenKind::Bool);
        m.insert(NameId::new("char"), TokenKind::Char);
        m.insert(NameId::new("chr"), TokenKind::Chr);
        m.insert(NameId::new("else"), TokenKind::Else);
        m.insert(NameId::new("false"), TokenKind::False);
        m.insert(NameId::new("if"), TokenKind::If);
        m.insert(NameId::new("int"), TokenKind::Int);
        m.insert(NameId::new("new"), TokenKind::New);
        m.insert(NameId::new("null"), TokenKind::Null);
        m.insert(NameId::new("ord"), TokenKind::Ord);
        m.insert(NameId::new("return"), TokenKind::Return);
        m.insert(NameId::new("string"), TokenKind::String);
        m.insert(NameId::new("struct"), TokenKind::Struct);
        m.insert(NameId::new("true"), TokenKind::True);
        m.insert(NameId::new("void"), TokenKind::Void);
        m.insert(NameId::new("while"), TokenKind::While);
        m
    })
}

/// Everything the scanner produced for one source.
#[derive(Debug, Clone)]
pub struct LexOutput {
    /// Tokens in source order, terminated by [`TokenKind::EndOfFile`].
    pub tokens: Vec<Token>,
    pub sources: SourceMap,
    pub errors: Vec<LexError>,
    /// Token listing, one line per token and per line marker.
    pub dump: String,
}

/// Scan a whole source text. `file_name` becomes file 0.
pub fn tokenize(source: &str, file_name: &str) -> LexOutput {
    let mut lexer = Lexer::new(source, file_name);
    let tokens = lexer.tokenize_all();
    debug!(
        "lexer: {} tokens, {} files, {} errors",
        tokens.len(),
        lexer.sources.len(),
        lexer.errors.len()
    );
    LexOutput {
        tokens,
        sources: lexer.sources,
        errors: lexer.errors,
        dump: lexer.dump,
    }
}

/// Lexer state machine
pub struct Lexer<'src> {
    chars: Peekable<Chars<'src>>,
    sources: SourceMap,
    file: FileId,
    line: u32,
    col: u32,
    errors: Vec<LexError>,
    dump: String,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file_name: &str) -> Self {
        let mut sources = SourceMap::new();
        let file = sources.add_file(file_name);
        Lexer {
            chars: source.chars().peekable(),
            sources,
            file,
            line: 1,
            col: 0,
            errors: Vec::new(),
            dump: String::new(),
        }
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.file, self.line, self.col)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Consume characters while `pred` holds, appending them to `text`.
    fn bump_while(&mut self, text: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
    }

    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let loc = self.loc();
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::EndOfFile,
                    loc,
                    lexeme: NameId::new(""),
                });
                break;
            };
            if c == '#' && loc.col == 0 {
                self.line_marker();
                continue;
            }
            if let Some((kind, text)) = self.next_token(c) {
                let token = Token {
                    kind,
                    loc,
                    lexeme: NameId::new(&text),
                };
                self.record(&token);
                tokens.push(token);
            }
        }
        tokens
    }

    fn record(&mut self, token: &Token) {
        trace!("token {} {:?} \"{}\"", token.loc, token.kind, token.lexeme);
        let _ = writeln!(
            self.dump,
            "{:4} {:3}.{:03} {:4} {:<13} ({})",
            token.loc.file.0,
            token.loc.line,
            token.loc.col,
            token.kind.code(),
            token.kind.name(),
            token.lexeme
        );
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.next() {
                        Some('/') => {
                            while let Some(c) = self.peek() {
                                if c == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some('*') => {
                            self.bump();
                            self.bump();
                            let mut last = '\0';
                            while let Some(c) = self.bump() {
                                if last == '*' && c == '/' {
                                    break;
                                }
                                last = c;
                            }
                        }
                        _ => return,
                    }
                }
                _ => return,
            }
        }
    }

    /// `# <line> "<file>"`, optionally followed by cpp flags.
    fn line_marker(&mut self) {
        let loc = self.loc();
        let mut text = String::new();
        self.bump_while(&mut text, |c| c != '\n');

        let parsed = text
            .strip_prefix('#')
            .map(str::trim_start)
            .and_then(|rest| {
                let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                let line: u32 = rest[..digits_end].parse().ok()?;
                let rest = rest[digits_end..].trim_start().strip_prefix('"')?;
                let name = &rest[..rest.find('"')?];
                Some((line, name.to_string()))
            });

        match parsed {
            Some((line, name)) => {
                let _ = writeln!(self.dump, "# {} \"{}\"", line, name);
                self.file = self.sources.add_file(name);
                // The newline ending the marker brings the counter to `line`.
                self.line = line.saturating_sub(1);
                debug!("lexer: now scanning file {} from line {}", self.file, line);
            }
            None => self.errors.push(LexError::InvalidDirective { text, location: loc }),
        }
    }

    fn next_token(&mut self, c: char) -> Option<(TokenKind, String)> {
        let loc = self.loc();
        if c.is_ascii_alphabetic() || c == '_' {
            let mut text = String::new();
            self.bump_while(&mut text, |c| c.is_ascii_alphanumeric() || c == '_');
            let kind = is_keyword(NameId::new(&text)).unwrap_or(TokenKind::Ident);
            return Some((kind, text));
        }
        if c.is_ascii_digit() {
            let mut text = String::new();
            self.bump_while(&mut text, |c| c.is_ascii_digit());
            if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
                self.bump_while(&mut text, |c| c.is_ascii_alphanumeric() || c == '_');
                self.errors.push(LexError::BadToken { text, location: loc });
                return None;
            }
            return Some((TokenKind::IntCon, text));
        }
        if c == '\'' {
            return self.quoted('\'', TokenKind::CharCon);
        }
        if c == '"' {
            return self.quoted('"', TokenKind::StringCon);
        }

        self.bump();
        let next = self.peek();
        let two = |lexer: &mut Self, kind: TokenKind, text: &str| {
            lexer.bump();
            Some((kind, text.to_string()))
        };
        match (c, next) {
            ('=', Some('=')) => two(self, TokenKind::Eq, "=="),
            ('!', Some('=')) => two(self, TokenKind::Ne, "!="),
            ('<', Some('=')) => two(self, TokenKind::Le, "<="),
            ('>', Some('=')) => two(self, TokenKind::Ge, ">="),
            ('[', Some(']')) => two(self, TokenKind::Array, "[]"),
            ('<', _) => Some((TokenKind::Lt, "<".to_string())),
            ('>', _) => Some((TokenKind::Gt, ">".to_string())),
            ('=' | '!' | '+' | '-' | '*' | '/' | '%' | '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';' | '.', _) => {
                Some((TokenKind::Punct(c), c.to_string()))
            }
            _ => {
                self.errors.push(LexError::BadChar {
                    text: c.to_string(),
                    location: loc,
                });
                None
            }
        }
    }

    /// Character or string constant. The lexeme keeps its quotes and escapes.
    fn quoted(&mut self, quote: char, kind: TokenKind) -> Option<(TokenKind, String)> {
        let loc = self.loc();
        let mut text = String::new();
        text.push(quote);
        self.bump();
        let mut chars = 0;
        let mut valid = true;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.errors.push(LexError::BadToken { text, location: loc });
                    return None;
                }
                Some(c) if c == quote => {
                    text.push(c);
                    self.bump();
                    break;
                }
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    match self.peek() {
                        Some(e @ ('n' | 't' | '0' | '\\' | '\'' | '"')) => {
                            text.push(e);
                            self.bump();
                        }
                        _ => valid = false,
                    }
                    chars += 1;
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                    chars += 1;
                }
            }
        }
        if !valid || (kind == TokenKind::CharCon && chars != 1) {
            self.errors.push(LexError::BadToken { text, location: loc });
            return None;
        }
        Some((kind, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, "test.oc").tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_operators() {
        assert_eq!(
            kinds("int[] a = new int[n]; if (a != null) x <= 3;"),
            vec![
                TokenKind::Int,
                TokenKind::Array,
                TokenKind::Ident,
                TokenKind::Punct('='),
                TokenKind::New,
                TokenKind::Int,
                TokenKind::Punct('['),
                TokenKind::Ident,
                TokenKind::Punct(']'),
                TokenKind::Punct(';'),
                TokenKind::If,
                TokenKind::Punct('('),
                TokenKind::Ident,
                TokenKind::Ne,
                TokenKind::Null,
                TokenKind::Punct(')'),
                TokenKind::Ident,
                TokenKind::Le,
                TokenKind::IntCon,
                TokenKind::Punct(';'),
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn locations_count_lines_from_one_and_columns_from_zero() {
        let out = tokenize("int x;\n  x = 'a';\n", "test.oc");
        let x = out.tokens[3];
        assert_eq!(x.loc, SourceLoc::new(FileId(0), 2, 2));
        assert_eq!(out.tokens[5].lexeme.as_str(), "'a'");
    }

    #[test]
    fn line_markers_switch_files() {
        let out = tokenize("# 1 \"lib.oh\"\nvoid f();\n# 3 \"main.oc\"\nint y;\n", "main.oc");
        assert!(out.errors.is_empty());
        assert_eq!(out.sources.name(FileId(1)), Some("lib.oh"));
        assert_eq!(out.tokens[0].loc, SourceLoc::new(FileId(1), 1, 0));
        assert_eq!(out.tokens[5].loc, SourceLoc::new(FileId(2), 3, 0));
        insta::assert_snapshot!(out.dump, @r#"
        # 1 "lib.oh"
           1   1.000  258 TOK_VOID      (void)
           1   1.005  279 TOK_IDENT     (f)
           1   1.006   40 '('           (()
           1   1.007   41 ')'           ())
           1   1.008   59 ';'           (;)
        # 3 "main.oc"
           2   3.000  261 TOK_INT       (int)
           2   3.004  279 TOK_IDENT     (y)
           2   3.005   59 ';'           (;)
        "#);
    }

    #[test]
    fn bad_input_is_reported_and_skipped() {
        let out = tokenize("int @x = 12ab;\nstring s = \"open\n", "test.oc");
        let messages: Vec<String> = out.errors.iter().map(|e| format!("{} {}", e, e.text())).collect();
        assert_eq!(
            messages,
            vec!["invalid source character @", "invalid token 12ab", "invalid token \"open"]
        );
        assert_eq!(
            out.tokens.iter().filter(|t| t.kind == TokenKind::Ident).count(),
            2
        );
    }
}
