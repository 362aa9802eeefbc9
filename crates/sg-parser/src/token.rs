//! Token definitions for the signature-level Java lexer.

use std::fmt;

use sg_core::Span;

/// Kinds of tokens.
///
/// Keywords are kept as identifiers; the parser matches them by text.
/// Punctuation is one token per character except `...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    /// String, text block, char or number literal. Contents are not kept.
    Literal,
    Punct(char),
    Ellipsis,
    Eof,
}

impl TokenKind {
    pub fn is_ident(&self, text: &str) -> bool {
        matches!(self, TokenKind::Ident(s) if s == text)
    }

    pub fn is_punct(&self, c: char) -> bool {
        *self == TokenKind::Punct(c)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "`{}`", s),
            TokenKind::Literal => f.write_str("literal"),
            TokenKind::Punct(c) => write!(f, "`{}`", c),
            TokenKind::Ellipsis => f.write_str("`...`"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

/// A token with its span and the Javadoc comment immediately preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub doc: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            doc: None,
        }
    }
}

/// Modifier keywords accepted before a member or type declaration.
pub const MODIFIER_KEYWORDS: [&str; 12] = [
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "default",
    "transient",
    "volatile",
    "strictfp",
];

/// Keywords that open a type declaration.
pub const TYPE_KEYWORDS: [&str; 4] = ["class", "interface", "enum", "record"];
