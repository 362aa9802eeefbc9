//! # sg-parser
//!
//! Signature-level Java parser. Resolves packages, imports, type
//! declarations and method signatures; skips everything executable.

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};

use sg_core::{CompilationUnit, ParseResult, SourceParser, SourceUnit};

/// The bundled [`SourceParser`] for Java sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaSourceParser;

impl JavaSourceParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for JavaSourceParser {
    fn parse(&self, unit: &SourceUnit) -> ParseResult<CompilationUnit> {
        let tree = Parser::new(unit)?.parse_compilation_unit()?;
        tracing::debug!(
            path = %unit.path().display(),
            types = tree.types.len(),
            methods = tree.types.iter().map(|t| t.methods.len()).sum::<usize>(),
            "parsed compilation unit"
        );
        Ok(tree)
    }
}
