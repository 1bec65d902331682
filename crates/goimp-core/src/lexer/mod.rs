//! Lexer for Go source file headers
//!
//! Wraps a `logos` lexer over [`TokenKind`] and adds:
//! - An explicit [`TokenKind::Eof`] token
//! - Error classification (unterminated strings and comments)
//! - Byte spans for every token

mod span;
mod token;

pub use span::{Location, Span};
pub use token::TokenKind;

use logos::Logos;
use thiserror::Error;

/// A token with its kind, span, and source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'source> {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source code
    pub span: Span,
    /// The source text of the token
    pub lexeme: &'source str,
}

/// Lexer error types
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character")]
    UnexpectedChar,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated raw string literal")]
    UnterminatedRawString,
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// The header lexer
pub struct Lexer<'source> {
    source: &'source str,
    inner: logos::Lexer<'source, TokenKind>,
    last_error: Option<LexError>,
    done: bool,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source code
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            last_error: None,
            done: false,
        }
    }

    /// The error behind the most recent [`TokenKind::Error`] token
    #[must_use]
    pub fn last_error(&self) -> Option<LexError> {
        self.last_error
    }

    /// Get the next token, including comments and newlines.
    ///
    /// After the end of input every call returns an `Eof` token.
    pub fn next_token(&mut self) -> Token<'source> {
        if self.done {
            return self.eof();
        }

        match self.inner.next() {
            Some(Ok(kind)) => Token {
                kind,
                span: Span::from(self.inner.span()),
                lexeme: self.inner.slice(),
            },
            Some(Err(())) => {
                let range = self.inner.span();
                let rest = &self.source[range.start..];
                let error = if rest.starts_with('"') {
                    LexError::UnterminatedString
                } else if rest.starts_with('`') {
                    LexError::UnterminatedRawString
                } else if rest.starts_with("/*") {
                    LexError::UnterminatedComment
                } else {
                    LexError::UnexpectedChar
                };
                self.last_error = Some(error);
                Token {
                    kind: TokenKind::Error,
                    span: Span::from(range),
                    lexeme: self.inner.slice(),
                }
            }
            None => {
                self.done = true;
                self.eof()
            }
        }
    }

    fn eof(&self) -> Token<'source> {
        let end = self.source.len();
        Token {
            kind: TokenKind::Eof,
            span: Span::from(end..end),
            lexeme: "",
        }
    }
}
