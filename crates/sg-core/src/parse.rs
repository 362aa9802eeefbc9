//! The parsing capability.
//!
//! Anything that can turn a [`SourceUnit`] into a [`CompilationUnit`] with
//! signature-level resolution can drive the rest of the pipeline.

use std::path::PathBuf;

use crate::model::CompilationUnit;
use crate::source::{Location, SourceUnit};

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Fatal parse failure. Always carries a file location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{location}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("{location}: unexpected end of file")]
    UnexpectedEof { location: Location },

    #[error("{location}: unterminated {what}")]
    Unterminated { what: &'static str, location: Location },

    #[error("{location}: unexpected character {found:?}")]
    InvalidCharacter { found: char, location: Location },

    #[error("{}: no type declaration found", path.display())]
    NoTypeDeclaration { path: PathBuf },
}

impl ParseError {
    /// Path of the file the error was found in.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEof { location }
            | ParseError::Unterminated { location, .. }
            | ParseError::InvalidCharacter { location, .. } => &location.path,
            ParseError::NoTypeDeclaration { path } => path,
        }
    }
}

/// Parse source text into a declaration tree.
pub trait SourceParser {
    fn parse(&self, unit: &SourceUnit) -> ParseResult<CompilationUnit>;
}
