//! Parser for Go source file headers
//!
//! Recognizes the part of a Go file that determines its dependencies:
//!
//! ```text
//! SourceFile   = PackageClause ";" { ImportDecl ";" } ...
//! PackageClause = "package" identifier
//! ImportDecl   = "import" ( ImportSpec | "(" { ImportSpec ";" } ")" )
//! ImportSpec   = [ "." | identifier ] ImportPath
//! ```
//!
//! Parsing stops at the first top-level declaration that is not an import,
//! so function bodies are never examined.

mod error;

pub use error::{ParseError, ParseErrorKind};

use crate::lexer::{LexError, Lexer, Location, Span, Token, TokenKind};

/// Characters that may not appear in an import path
const ILLEGAL_IMPORT_CHARS: &str = "!\"#$%&'()*,:;<=>?[\\]^{|}`\u{FFFD}";

/// The parsed header of a Go source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFile {
    /// Name from the package clause
    pub package: String,
    /// Import specs in source order
    pub imports: Vec<ImportSpec>,
}

impl GoFile {
    /// Iterate over the import paths in source order
    pub fn import_paths(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(|spec| spec.path.as_str())
    }
}

/// A single import spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name (`_`, `.`, or an identifier), if given
    pub name: Option<String>,
    /// The unquoted import path
    pub path: String,
    /// Span of the path literal
    pub span: Span,
}

/// Parse the header of a Go source file.
///
/// Errors carry the line and column at which they occurred.
pub fn parse_file(source: &str) -> Result<GoFile, ParseError> {
    let body = source.strip_prefix('\u{feff}').unwrap_or(source);
    let offset = source.len() - body.len();
    Parser::new(body).parse().map_err(|mut err| {
        // Report positions relative to the original text, BOM included.
        err.span = err.span.shifted(offset);
        let location = Location::locate(source, err.span.start);
        err.with_location(location)
    })
}

/// Recursive-descent parser over the header token stream
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    current: Token<'source>,
}

impl<'source> Parser<'source> {
    /// Create a parser positioned at the first significant token
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = Self::significant(&mut lexer);
        Self { lexer, current }
    }

    /// Parse the package clause and every import declaration
    pub fn parse(mut self) -> Result<GoFile, ParseError> {
        self.skip_separators();

        if self.current.kind != TokenKind::Package {
            return Err(self.error_here(ParseErrorKind::MissingPackageClause {
                found: self.current.kind,
            }));
        }
        self.advance();

        if self.current.kind != TokenKind::Ident {
            return Err(self.error_here(ParseErrorKind::ExpectedPackageName {
                found: self.current.kind,
            }));
        }
        let package = self.advance().lexeme.to_string();
        self.expect_terminator("package clause")?;

        let mut imports = Vec::new();
        loop {
            self.skip_separators();
            match self.current.kind {
                TokenKind::Import => {
                    self.advance();
                    self.parse_import_decl(&mut imports)?;
                }
                TokenKind::Error => {
                    return Err(self.error_here(ParseErrorKind::Lex(LexError::UnexpectedChar)))
                }
                _ => break,
            }
        }

        Ok(GoFile { package, imports })
    }

    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> Result<(), ParseError> {
        // A newline directly after `import` does not end the declaration.
        self.skip_newlines();

        if self.current.kind != TokenKind::LParen {
            imports.push(self.parse_import_spec()?);
            return self.expect_terminator("import declaration");
        }

        self.advance();
        loop {
            self.skip_separators();
            match self.current.kind {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(self.error_here(ParseErrorKind::UnexpectedEof)),
                _ => {}
            }

            imports.push(self.parse_import_spec()?);

            match self.current.kind {
                TokenKind::RParen => {}
                found if found.is_terminator() => {
                    self.advance();
                }
                found => {
                    return Err(self.error_here(ParseErrorKind::ExpectedTerminator {
                        context: "import spec",
                        found,
                    }))
                }
            }
        }

        self.expect_terminator("import declaration")
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let name = match self.current.kind {
            TokenKind::Dot | TokenKind::Ident => Some(self.advance().lexeme.to_string()),
            _ => None,
        };

        let token = self.current;
        let path = match token.kind {
            TokenKind::String => unquote(token.lexeme, token.span)?,
            TokenKind::RawString => token.lexeme[1..token.lexeme.len() - 1].to_string(),
            found => {
                return Err(self.error_here(ParseErrorKind::ExpectedImportPath { found }));
            }
        };

        if !is_valid_import_path(&path) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidImportPath(path),
                token.span,
            ));
        }

        self.advance();
        Ok(ImportSpec {
            name,
            path,
            span: token.span,
        })
    }

    fn expect_terminator(&mut self, context: &'static str) -> Result<(), ParseError> {
        match self.current.kind {
            found if found.is_terminator() => {
                self.advance();
                Ok(())
            }
            found => Err(self.error_here(ParseErrorKind::ExpectedTerminator { context, found })),
        }
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.current.kind,
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.current.kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn advance(&mut self) -> Token<'source> {
        let token = self.current;
        if token.kind != TokenKind::Eof {
            self.current = Self::significant(&mut self.lexer);
        }
        token
    }

    /// Next token that is not a comment. A block comment spanning lines
    /// separates like a newline.
    fn significant(lexer: &mut Lexer<'source>) -> Token<'source> {
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::BlockComment if token.lexeme.contains('\n') => {
                    return Token {
                        kind: TokenKind::Newline,
                        ..token
                    };
                }
                kind if kind.is_comment() => {}
                _ => return token,
            }
        }
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        let kind = if self.current.kind == TokenKind::Error {
            ParseErrorKind::Lex(self.lexer.last_error().unwrap_or(LexError::UnexpectedChar))
        } else {
            kind
        };
        ParseError::new(kind, self.current.span)
    }
}

/// Reports whether `path` is acceptable as an import path
fn is_valid_import_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !ILLEGAL_IMPORT_CHARS.contains(c))
}

/// Decode an interpreted string literal, quotes included
fn unquote(lexeme: &str, span: Span) -> Result<String, ParseError> {
    let body = &lexeme[1..lexeme.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    let invalid = |c: char| ParseError::new(ParseErrorKind::InvalidEscape(c), span);

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let esc = chars.next().ok_or_else(|| invalid('\\'))?;
        let decoded = match esc {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '\\' => '\\',
            '"' => '"',
            'x' => take_code_point(&mut chars, 2, 16)
                .filter(char::is_ascii)
                .ok_or_else(|| invalid(esc))?,
            'u' => take_code_point(&mut chars, 4, 16).ok_or_else(|| invalid(esc))?,
            'U' => take_code_point(&mut chars, 8, 16).ok_or_else(|| invalid(esc))?,
            '0'..='7' => {
                let rest = take_code_point(&mut chars, 2, 8).ok_or_else(|| invalid(esc))?;
                let value = esc.to_digit(8).unwrap_or(0) * 64 + u32::from(rest);
                char::from_u32(value)
                    .filter(char::is_ascii)
                    .ok_or_else(|| invalid(esc))?
            }
            other => return Err(invalid(other)),
        };
        out.push(decoded);
    }

    Ok(out)
}

/// Read exactly `digits` digits in `radix` and convert them to a char
fn take_code_point(chars: &mut std::str::Chars<'_>, digits: usize, radix: u32) -> Option<char> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let digit = chars.next()?.to_digit(radix)?;
        value = value.checked_mul(radix)?.checked_add(digit)?;
    }
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Location;

    fn paths(source: &str) -> Vec<String> {
        parse_file(source)
            .unwrap()
            .import_paths()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn parse_package_only() {
        let file = parse_file("package main\n").unwrap();
        assert_eq!(file.package, "main");
        assert!(file.imports.is_empty());
    }

    #[test]
    fn parse_single_imports() {
        let source = "package main\n\nimport \"fmt\"\nimport \"github.com/a/b\"\n\nfunc main() {}\n";
        assert_eq!(paths(source), vec!["fmt", "github.com/a/b"]);
    }

    #[test]
    fn parse_grouped_imports_with_names_and_comments() {
        let source = r#"// Package x does things.
package x // trailing

import (
	"fmt"
	_ "github.com/lib/pq" // driver
	. "github.com/onsi/gomega"
	yaml "gopkg.in/yaml.v2"
	/* block */ "example.com/y"
)

var _ = fmt.Println
"#;
        let file = parse_file(source).unwrap();
        assert_eq!(file.package, "x");
        let names: Vec<_> = file.imports.iter().map(|i| i.name.as_deref()).collect();
        assert_eq!(names, vec![None, Some("_"), Some("."), Some("yaml"), None]);
        assert_eq!(
            file.import_paths().collect::<Vec<_>>(),
            vec![
                "fmt",
                "github.com/lib/pq",
                "github.com/onsi/gomega",
                "gopkg.in/yaml.v2",
                "example.com/y"
            ]
        );
    }

    #[test]
    fn parse_semicolon_separated_group() {
        assert_eq!(
            paths("package p; import (\"a/b\"; \"c/d\"); func f() {}"),
            vec!["a/b", "c/d"]
        );
    }

    #[test]
    fn parse_raw_string_and_escapes() {
        assert_eq!(
            paths("package p\nimport `raw/path`\nimport \"esc\\x2fpath\"\n"),
            vec!["raw/path", "esc/path"]
        );
    }

    #[test]
    fn newline_after_import_keyword_is_allowed() {
        assert_eq!(paths("package p\nimport\n\"a/b\"\n"), vec!["a/b"]);
    }

    #[test]
    fn header_parsing_ignores_the_body() {
        let source = "package p\nimport \"a\"\nfunc f() { import := 1; @@@ }\n";
        assert_eq!(paths(source), vec!["a"]);
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        assert_eq!(paths("\u{feff}package p\nimport \"a\"\n"), vec!["a"]);
    }

    #[test]
    fn missing_package_clause() {
        let err = parse_file("import \"fmt\"\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::MissingPackageClause {
                found: TokenKind::Import
            }
        ));
        assert_eq!(err.location, Some(Location::new(1, 1)));
    }

    #[test]
    fn empty_import_path_is_rejected() {
        let err = parse_file("package p\nimport \"\"\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidImportPath(_)));
        assert_eq!(err.location, Some(Location::new(2, 8)));
    }

    #[test]
    fn unterminated_group_is_rejected() {
        let err = parse_file("package p\nimport (\n\"a\"\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn group_cut_after_a_spec_is_rejected() {
        let err = parse_file("package p\nimport (\"a\"").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
        assert_eq!(err.location, Some(Location::new(2, 12)));
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let err = parse_file("package p\nimport \"fmt\n").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::Lex(LexError::UnterminatedString)
        );
    }

    #[test]
    fn two_specs_on_one_line_need_a_separator() {
        let err = parse_file("package p\nimport (\"a\" \"b\")\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::ExpectedTerminator { .. }
        ));
    }

    #[test]
    fn invalid_escape_is_rejected() {
        let err = parse_file("package p\nimport \"a\\qb\"\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidEscape('q'));
    }
}
