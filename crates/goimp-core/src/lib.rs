//! goimp Core - source analysis for the goimp dependency pinning tool
//!
//! This crate provides:
//! - Lexer: tokenization of Go file headers
//! - Parser: package clause and import declarations
//! - Set: the unordered string set used to deduplicate import paths
//! - StdLib: classification of standard library import paths

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lexer module - tokenization of Go file headers
pub mod lexer;

/// Parser module - package clause and imports
pub mod parser;

mod set;
mod stdlib;

pub use parser::{parse_file, GoFile, ImportSpec, ParseError, ParseErrorKind};
pub use set::Set;
pub use stdlib::{StdLib, STD_PACKAGES};
