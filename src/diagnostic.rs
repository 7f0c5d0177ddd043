use std::fmt;

use crate::ast::NameId;
use crate::source::SourceLoc;

/// One recoverable error, already rendered to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Offending name or operator lexeme.
    pub name: String,
    pub location: SourceLoc,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.message, self.name, self.location)
    }
}

/// Lexical errors. Scanning continues after each one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("invalid source character")]
    BadChar { text: String, location: SourceLoc },

    #[error("invalid token")]
    BadToken { text: String, location: SourceLoc },

    #[error("invalid directive")]
    InvalidDirective { text: String, location: SourceLoc },
}

impl LexError {
    pub fn location(&self) -> SourceLoc {
        match self {
            LexError::BadChar { location, .. } => *location,
            LexError::BadToken { location, .. } => *location,
            LexError::InvalidDirective { location, .. } => *location,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            LexError::BadChar { text, .. } => text,
            LexError::BadToken { text, .. } => text,
            LexError::InvalidDirective { text, .. } => text,
        }
    }
}

/// Syntax errors. The first one stops the compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLoc,
    },

    #[error("syntax error: unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: String, location: SourceLoc },

    #[error("internal tree error: {0}")]
    Tree(#[from] crate::ast::AstError),
}

impl ParseError {
    pub fn location(&self) -> SourceLoc {
        match self {
            ParseError::UnexpectedToken { location, .. } => *location,
            ParseError::UnexpectedEof { location, .. } => *location,
            ParseError::Tree(_) => SourceLoc::default(),
        }
    }
}

/// Static-semantics violations found by the resolver and the type checker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("identifier previously declared")]
    Redeclaration { name: NameId, location: SourceLoc },

    #[error("reference to undeclared identifier")]
    UndeclaredIdentifier { name: NameId, location: SourceLoc },

    #[error("reference to incomplete type")]
    IncompleteType { name: NameId, location: SourceLoc },

    #[error("declared function differs from prototype")]
    PrototypeMismatch { name: NameId, location: SourceLoc },

    #[error("declares identifier of type {found}")]
    VoidDeclaration {
        name: NameId,
        found: String,
        location: SourceLoc,
    },

    #[error("expects type {expected} but operand is of type {found}")]
    TypeMismatch {
        name: NameId,
        expected: String,
        found: String,
        location: SourceLoc,
    },

    #[error("expects return type {expected}, but is missing return statement")]
    MissingReturn {
        name: NameId,
        expected: String,
        location: SourceLoc,
    },

    #[error("returns non-void value from void function")]
    ValueReturnFromVoid { name: NameId, location: SourceLoc },

    #[error("call has extra argument of type {found}")]
    ExtraArgument {
        name: NameId,
        found: String,
        location: SourceLoc,
    },

    #[error("call missing argument of type {expected}")]
    MissingArgument {
        name: NameId,
        expected: String,
        location: SourceLoc,
    },

    #[error("passed non-indexable type {found}")]
    NonIndexable {
        name: NameId,
        found: String,
        location: SourceLoc,
    },

    #[error("passed non-selectable type {found}")]
    NonSelectable {
        name: NameId,
        found: String,
        location: SourceLoc,
    },

    #[error("selects unknown field from {found}")]
    UnknownField {
        name: NameId,
        found: String,
        location: SourceLoc,
    },

    #[error("is not a function")]
    NotCallable { name: NameId, location: SourceLoc },

    #[error("assigns to non-lvalue of type {found}")]
    NotLvalue {
        name: NameId,
        found: String,
        location: SourceLoc,
    },
}

impl SemanticError {
    pub fn location(&self) -> SourceLoc {
        match self {
            SemanticError::Redeclaration { location, .. } => *location,
            SemanticError::UndeclaredIdentifier { location, .. } => *location,
            SemanticError::IncompleteType { location, .. } => *location,
            SemanticError::PrototypeMismatch { location, .. } => *location,
            SemanticError::VoidDeclaration { location, .. } => *location,
            SemanticError::TypeMismatch { location, .. } => *location,
            SemanticError::MissingReturn { location, .. } => *location,
            SemanticError::ValueReturnFromVoid { location, .. } => *location,
            SemanticError::ExtraArgument { location, .. } => *location,
            SemanticError::MissingArgument { location, .. } => *location,
            SemanticError::NonIndexable { location, .. } => *location,
            SemanticError::NonSelectable { location, .. } => *location,
            SemanticError::UnknownField { location, .. } => *location,
            SemanticError::NotCallable { location, .. } => *location,
            SemanticError::NotLvalue { location, .. } => *location,
        }
    }

    pub fn name(&self) -> NameId {
        match self {
            SemanticError::Redeclaration { name, .. } => *name,
            SemanticError::UndeclaredIdentifier { name, .. } => *name,
            SemanticError::IncompleteType { name, .. } => *name,
            SemanticError::PrototypeMismatch { name, .. } => *name,
            SemanticError::VoidDeclaration { name, .. } => *name,
            SemanticError::TypeMismatch { name, .. } => *name,
            SemanticError::MissingReturn { name, .. } => *name,
            SemanticError::ValueReturnFromVoid { name, .. } => *name,
            SemanticError::ExtraArgument { name, .. } => *name,
            SemanticError::MissingArgument { name, .. } => *name,
            SemanticError::NonIndexable { name, .. } => *name,
            SemanticError::NonSelectable { name, .. } => *name,
            SemanticError::UnknownField { name, .. } => *name,
            SemanticError::NotCallable { name, .. } => *name,
            SemanticError::NotLvalue { name, .. } => *name,
        }
    }
}

/// Append-only collector for recoverable errors.
#[derive(Debug, Clone)]
pub struct DiagnosticEngine {
    /// Prefix of every rendered line, normally the program name.
    pub context: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new("occ")
    }
}

impl DiagnosticEngine {
    pub fn new(context: impl Into<String>) -> Self {
        DiagnosticEngine {
            context: context.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn report_error(&mut self, error: SemanticError) {
        log::debug!("semantic error at {}: {}", error.location(), error);
        self.diagnostics.push(Diagnostic {
            message: error.to_string(),
            name: error.name().to_string(),
            location: error.location(),
        });
    }

    pub fn report_lex_error(&mut self, error: LexError) {
        self.diagnostics.push(Diagnostic {
            message: error.to_string(),
            name: error.text().to_string(),
            location: error.location(),
        });
    }

    pub fn report_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// One line per diagnostic, `<context>: <message>: <name> (f.l.c)`.
    pub fn render(&self) -> String {
        self.diagnostics
            .iter()
            .map(|diag| format!("{}: {}\n", self.context, diag))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileId;

    #[test]
    fn renders_context_message_name_and_location() {
        let mut engine = DiagnosticEngine::default();
        engine.report_error(SemanticError::UndeclaredIdentifier {
            name: NameId::new("y"),
            location: SourceLoc::new(FileId(0), 4, 9),
        });
        engine.report_error(SemanticError::TypeMismatch {
            name: NameId::new("="),
            expected: "int".to_string(),
            found: "bool".to_string(),
            location: SourceLoc::new(FileId(0), 5, 6),
        });
        assert!(engine.has_errors());
        insta::assert_snapshot!(engine.render(), @r"
        occ: reference to undeclared identifier: y (0.4.9)
        occ: expects type int but operand is of type bool: = (0.5.6)
        ");
    }

    #[test]
    fn lex_errors_use_offending_text() {
        let mut engine = DiagnosticEngine::new("test.oc");
        engine.report_lex_error(LexError::BadChar {
            text: "@".to_string(),
            location: SourceLoc::new(FileId(0), 1, 3),
        });
        assert_eq!(engine.render(), "test.oc: invalid source character: @ (0.1.3)\n");
    }
}
