//! Token types for the Go header lexer

use logos::Logos;

/// The kind of token produced by the lexer.
///
/// Only the vocabulary of a Go file header is modelled: the package clause,
/// import declarations, and the comments and separators around them. The
/// first top-level keyword after the imports (`func`, `var`, `type`, ...)
/// lexes as an [`TokenKind::Ident`], which is where header parsing stops.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("package")]
    Package,
    #[token("import")]
    Import,

    // ========== Literals ==========
    /// Interpreted string literal: "..."
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    /// Raw string literal: `...`
    #[regex(r"`[^`]*`")]
    RawString,

    // ========== Identifiers ==========
    /// Identifier (Unicode letters, digits and underscore)
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,

    // ========== Punctuation ==========
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    // ========== Comments ==========
    /// Line comment: // ...
    #[regex(r"//[^\n]*")]
    LineComment,

    /// Block comment: /* ... */
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // ========== Special ==========
    #[token("\n")]
    Newline,

    /// End of file (added by lexer, not matched by logos)
    Eof,

    /// Lexer error (added by lexer, not matched by logos)
    Error,
}

impl TokenKind {
    /// Returns true for comments
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Returns true if this token ends an import spec or package clause
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(self, Self::Newline | Self::Semicolon | Self::Eof)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Import => write!(f, "import"),
            Self::String => write!(f, "string literal"),
            Self::RawString => write!(f, "raw string literal"),
            Self::Ident => write!(f, "identifier"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::Semicolon => write!(f, "';'"),
            Self::Dot => write!(f, "'.'"),
            Self::LineComment => write!(f, "// comment"),
            Self::BlockComment => write!(f, "/* comment */"),
            Self::Newline => write!(f, "newline"),
            Self::Eof => write!(f, "end of file"),
            Self::Error => write!(f, "invalid token"),
        }
    }
}
