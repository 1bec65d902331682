//! Parser error types for Go file headers

use crate::lexer::{LexError, Location, Span, TokenKind};
use thiserror::Error;

/// A parser error with location information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error
    pub kind: ParseErrorKind,
    /// Source location where the error occurred
    pub span: Span,
    /// Line and column of `span.start`, filled in once the source is known
    pub location: Option<Location>,
}

impl ParseError {
    /// Create a new parse error
    #[must_use]
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            location: None,
        }
    }

    /// Attach a line/column location
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.location {
            Some(location) => write!(f, "{location}: {}", self.kind),
            None => write!(f, "{} at {}", self.kind, self.span),
        }
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected 'package', found {found}")]
    MissingPackageClause { found: TokenKind },

    #[error("expected package name, found {found}")]
    ExpectedPackageName { found: TokenKind },

    #[error("expected import path, found {found}")]
    ExpectedImportPath { found: TokenKind },

    #[error("invalid import path: {0:?}")]
    InvalidImportPath(String),

    #[error("invalid escape sequence in string literal: \\{0}")]
    InvalidEscape(char),

    #[error("expected ';' or newline after {context}, found {found}")]
    ExpectedTerminator {
        context: &'static str,
        found: TokenKind,
    },

    #[error("unexpected end of file in import declaration")]
    UnexpectedEof,

    #[error("{0}")]
    Lex(#[from] LexError),
}
