//! Lexer for Java source, precise enough for signatures.
//!
//! Comments are dropped except Javadoc, which is attached to the next token.
//! Literal contents are discarded; only their extent matters.

use std::str::Chars;

use sg_core::{ParseError, ParseResult, SourceUnit, Span};

use crate::token::{Token, TokenKind};

/// The lexer over one source unit.
pub struct Lexer<'a> {
    unit: &'a SourceUnit,
    chars: Chars<'a>,
    /// Current byte position in the source.
    pos: u32,
    /// The character at the current position (None if at end).
    current: Option<char>,
    /// Javadoc seen since the last token.
    pending_doc: Option<String>,
}

impl<'a> Lexer<'a> {
    pub fn new(unit: &'a SourceUnit) -> Self {
        let mut chars = unit.text().chars();
        let current = chars.next();
        Self {
            unit,
            chars,
            pos: 0,
            current,
            pending_doc: None,
        }
    }

    /// Tokenizes the entire source. The last token is always `Eof`.
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_trivia()?;

        let start = self.pos;
        let kind = match self.current {
            None => TokenKind::Eof,
            Some(c) if is_ident_start(c) => self.lex_ident(),
            Some(c) if c.is_ascii_digit() => self.lex_number(),
            Some('.') if self.peek_next().map_or(false, |c| c.is_ascii_digit()) => {
                self.lex_number()
            }
            Some('"') => self.lex_string(start)?,
            Some('\'') => self.lex_char(start)?,
            Some('.') if self.rest().starts_with("...") => {
                self.advance();
                self.advance();
                self.advance();
                TokenKind::Ellipsis
            }
            Some(c) if is_punct(c) => {
                self.advance();
                TokenKind::Punct(c)
            }
            Some(c) => {
                return Err(ParseError::InvalidCharacter {
                    found: c,
                    location: self.unit.locate(start),
                })
            }
        };

        let mut token = Token::new(kind, Span::new(start, self.pos));
        token.doc = self.pending_doc.take();
        Ok(token)
    }

    fn advance(&mut self) -> Option<char> {
        let current = self.current;
        if let Some(c) = current {
            self.pos += c.len_utf8() as u32;
            self.current = self.chars.next();
        }
        current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn rest(&self) -> &'a str {
        &self.unit.text()[self.pos as usize..]
    }

    /// Skips whitespace and comments, remembering the last Javadoc.
    fn skip_trivia(&mut self) -> ParseResult<()> {
        loop {
            match self.current {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.current.is_some() && self.current != Some('\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    let start = self.pos;
                    let is_doc = self.rest().starts_with("/**") && !self.rest().starts_with("/**/");
                    self.advance();
                    self.advance();
                    loop {
                        match self.current {
                            None => {
                                return Err(ParseError::Unterminated {
                                    what: "block comment",
                                    location: self.unit.locate(start),
                                })
                            }
                            Some('*') if self.peek_next() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                        }
                    }
                    if is_doc {
                        let raw = self.unit.slice(Span::new(start, self.pos));
                        self.pending_doc = Some(strip_doc_comment(raw));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while self.current.map_or(false, is_ident_continue) {
            self.advance();
        }
        TokenKind::Ident(self.unit.slice(Span::new(start, self.pos)).to_string())
    }

    /// Numbers are consumed loosely: digits, letters, `_` and `.`.
    fn lex_number(&mut self) -> TokenKind {
        while let Some(c) = self.current {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else if c == '.' && self.peek_next().map_or(false, |n| n.is_ascii_digit()) {
                self.advance();
            } else if c == '.' && !self.rest().starts_with("..") {
                // `1.` and `1.f`
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Literal
    }

    fn lex_string(&mut self, start: u32) -> ParseResult<TokenKind> {
        if self.rest().starts_with("\"\"\"") {
            return self.lex_text_block(start);
        }
        self.advance();
        loop {
            match self.current {
                None | Some('\n') => {
                    return Err(ParseError::Unterminated {
                        what: "string literal",
                        location: self.unit.locate(start),
                    })
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::Literal);
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn lex_text_block(&mut self, start: u32) -> ParseResult<TokenKind> {
        for _ in 0..3 {
            self.advance();
        }
        loop {
            if self.rest().starts_with("\"\"\"") {
                for _ in 0..3 {
                    self.advance();
                }
                return Ok(TokenKind::Literal);
            }
            match self.current {
                None => {
                    return Err(ParseError::Unterminated {
                        what: "text block",
                        location: self.unit.locate(start),
                    })
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn lex_char(&mut self, start: u32) -> ParseResult<TokenKind> {
        self.advance();
        loop {
            match self.current {
                None | Some('\n') => {
                    return Err(ParseError::Unterminated {
                        what: "character literal",
                        location: self.unit.locate(start),
                    })
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    return Ok(TokenKind::Literal);
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_punct(c: char) -> bool {
    matches!(
        c,
        '{' | '}' | '(' | ')' | '[' | ']' | '<' | '>' | ';' | ',' | '.' | '@' | '?' | ':' | '='
            | '+' | '-' | '*' | '/' | '%' | '!' | '~' | '&' | '|' | '^'
    )
}

/// Strip `/**`, `*/` and leading `*` gutters from a Javadoc comment.
pub fn strip_doc_comment(raw: &str) -> String {
    let inner = raw.strip_prefix("/**").unwrap_or(raw);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    let lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let without_gutter = trimmed.strip_prefix('*').unwrap_or(trimmed);
            without_gutter.strip_prefix(' ').unwrap_or(without_gutter).trim_end()
        })
        .collect();

    let first = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let last = lines.iter().rposition(|l| !l.is_empty()).map_or(first, |i| i + 1);
    lines[first..last].join("\n")
}
