//! Recursive-descent parser down to method signatures.
//!
//! Bodies of methods, constructors, initializers and nested types are skipped
//! by bracket matching. Field initializers are skipped up to their `;`.

use sg_core::model::PRIMITIVE_TYPES;
use sg_core::{
    ClassDeclaration, ClassKind, CompilationUnit, Import, MethodDeclaration, Modifiers, Parameter,
    ParseError, ParseResult, SourceUnit, Span, TypeRef, Visibility, WildcardBound,
};

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind, MODIFIER_KEYWORDS, TYPE_KEYWORDS};

/// The parser over one tokenized source unit.
pub struct Parser<'a> {
    unit: &'a SourceUnit,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Tokenize `unit` and prepare to parse it.
    pub fn new(unit: &'a SourceUnit) -> ParseResult<Self> {
        let tokens = Lexer::new(unit).tokenize()?;
        Ok(Self {
            unit,
            tokens,
            pos: 0,
        })
    }

    /// Parse the whole unit.
    pub fn parse_compilation_unit(&mut self) -> ParseResult<CompilationUnit> {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();

        // Annotations on a package declaration (package-info style).
        if self.at_punct('@') && !self.peek(1).is_ident("interface") {
            let checkpoint = self.pos;
            self.parse_modifiers()?;
            if !self.at_ident("package") {
                self.pos = checkpoint;
            }
        }

        if self.eat_ident("package") {
            package = Some(self.parse_qualified_name()?);
            self.expect_punct(';')?;
        }

        while self.eat_ident("import") {
            let is_static = self.eat_ident("static");
            let path = self.parse_qualified_name()?;
            let mut on_demand = false;
            if self.eat_punct('.') {
                self.expect_punct('*')?;
                on_demand = true;
            }
            self.expect_punct(';')?;
            imports.push(Import {
                path,
                is_static,
                on_demand,
            });
        }

        while !self.at_eof() {
            if self.eat_punct(';') {
                continue;
            }
            let start = self.current().span;
            let doc = self.current().doc.clone();
            self.parse_modifiers()?;
            types.push(self.parse_type_declaration(doc, start)?);
        }

        Ok(CompilationUnit {
            package,
            imports,
            types,
        })
    }

    /// Parse a type declaration after its modifiers.
    fn parse_type_declaration(
        &mut self,
        doc: Option<String>,
        start: Span,
    ) -> ParseResult<ClassDeclaration> {
        let kind = if self.at_punct('@') && self.peek(1).is_ident("interface") {
            self.advance();
            self.advance();
            ClassKind::Annotation
        } else if self.eat_ident("class") {
            ClassKind::Class
        } else if self.eat_ident("interface") {
            ClassKind::Interface
        } else if self.eat_ident("enum") {
            ClassKind::Enum
        } else if self.eat_ident("record") {
            ClassKind::Record
        } else {
            return Err(self.error_expected("type declaration"));
        };

        let name = self.expect_ident()?;
        let type_params = if self.at_punct('<') {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        if kind == ClassKind::Record && self.at_punct('(') {
            self.skip_balanced('(', ')')?;
        }

        // extends / implements / permits
        while !self.at_punct('{') {
            if self.at_eof() {
                return Err(self.error_expected("`{`"));
            }
            if self.at_punct('<') {
                self.skip_balanced('<', '>')?;
            } else {
                self.advance();
            }
        }

        let (methods, nested_types) = match kind {
            ClassKind::Class | ClassKind::Interface | ClassKind::Record => {
                self.parse_class_body(&name, kind)?
            }
            ClassKind::Enum | ClassKind::Annotation => {
                self.skip_balanced('{', '}')?;
                (Vec::new(), Vec::new())
            }
        };

        Ok(ClassDeclaration {
            name,
            kind,
            type_params,
            methods,
            nested_types,
            doc,
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_class_body(
        &mut self,
        class_name: &str,
        kind: ClassKind,
    ) -> ParseResult<(Vec<MethodDeclaration>, Vec<String>)> {
        let mut methods = Vec::new();
        let mut nested_types = Vec::new();

        self.expect_punct('{')?;
        loop {
            if self.eat_punct('}') {
                break;
            }
            if self.at_eof() {
                return Err(self.error_expected("`}`"));
            }
            if self.eat_punct(';') {
                continue;
            }

            let start = self.current().span;
            let doc = self.current().doc.clone();
            let (mut modifiers, annotations) = self.parse_modifiers()?;

            if self.at_punct('{') {
                self.skip_balanced('{', '}')?;
                continue;
            }

            if self.at_type_declaration() {
                let nested = self.parse_type_declaration(doc, start)?;
                nested_types.push(nested.name);
                continue;
            }

            let type_params = if self.at_punct('<') {
                self.parse_type_params()?
            } else {
                Vec::new()
            };

            if self.current().kind.is_ident(class_name) && self.peek(1).is_punct('(') {
                self.advance();
                self.skip_balanced('(', ')')?;
                self.skip_constructor_rest()?;
                continue;
            }

            let mut return_type = self.parse_type()?;
            let name = self.expect_ident()?;

            if !self.at_punct('(') {
                self.skip_field_rest()?;
                continue;
            }

            let params = self.parse_params()?;
            while self.at_punct('[') && self.peek(1).is_punct(']') {
                self.advance();
                self.advance();
                return_type = TypeRef::Array(Box::new(return_type));
            }

            let mut throws = Vec::new();
            if self.eat_ident("throws") {
                loop {
                    throws.push(self.parse_type()?);
                    if !self.eat_punct(',') {
                        break;
                    }
                }
            }

            if self.at_punct('{') {
                self.skip_balanced('{', '}')?;
            } else if self.eat_punct(';') {
                // abstract or interface method
            } else if self.eat_ident("default") {
                self.skip_field_rest()?;
            } else {
                return Err(self.error_expected("method body or `;`"));
            }

            if kind == ClassKind::Interface {
                if modifiers.visibility == Visibility::PackagePrivate {
                    modifiers.visibility = Visibility::Public;
                }
                if !modifiers.is_default
                    && !modifiers.is_static
                    && modifiers.visibility != Visibility::Private
                {
                    modifiers.is_abstract = true;
                }
            }

            methods.push(MethodDeclaration {
                name,
                params,
                return_type,
                modifiers,
                annotations,
                type_params,
                throws,
                doc,
                index: methods.len(),
                span: start.merge(self.previous_span()),
            });
        }

        Ok((methods, nested_types))
    }

    /// Modifier keywords and annotations, in any order.
    fn parse_modifiers(&mut self) -> ParseResult<(Modifiers, Vec<String>)> {
        let mut modifiers = Modifiers::default();
        let mut annotations = Vec::new();

        loop {
            if self.at_punct('@') && !self.peek(1).is_ident("interface") {
                self.advance();
                annotations.push(self.parse_qualified_name()?);
                if self.at_punct('(') {
                    self.skip_balanced('(', ')')?;
                }
                continue;
            }

            let word = match &self.current().kind {
                TokenKind::Ident(word) => word.clone(),
                _ => break,
            };

            if MODIFIER_KEYWORDS.contains(&word.as_str()) {
                match word.as_str() {
                    "public" => modifiers.visibility = Visibility::Public,
                    "protected" => modifiers.visibility = Visibility::Protected,
                    "private" => modifiers.visibility = Visibility::Private,
                    "static" => modifiers.is_static = true,
                    "final" => modifiers.is_final = true,
                    "abstract" => modifiers.is_abstract = true,
                    "synchronized" => modifiers.is_synchronized = true,
                    "default" => modifiers.is_default = true,
                    _ => {}
                }
                self.advance();
            } else if word == "sealed" && matches!(self.peek(1), TokenKind::Ident(_)) {
                self.advance();
            } else if word == "non"
                && self.peek(1).is_punct('-')
                && self.peek(2).is_ident("sealed")
            {
                self.advance();
                self.advance();
                self.advance();
            } else {
                break;
            }
        }

        Ok((modifiers, annotations))
    }

    fn at_type_declaration(&self) -> bool {
        match &self.current().kind {
            TokenKind::Ident(word) if word == "record" => {
                matches!(self.peek(1), TokenKind::Ident(_))
                    && (self.peek(2).is_punct('(') || self.peek(2).is_punct('<'))
            }
            TokenKind::Ident(word) => TYPE_KEYWORDS.contains(&word.as_str()),
            TokenKind::Punct('@') => self.peek(1).is_ident("interface"),
            _ => false,
        }
    }

    /// A type reference: primitive, `void`, wildcard or class type, with array dims.
    pub fn parse_type(&mut self) -> ParseResult<TypeRef> {
        // Type-use annotations
        while self.at_punct('@') && !self.peek(1).is_ident("interface") {
            self.advance();
            self.parse_qualified_name()?;
            if self.at_punct('(') {
                self.skip_balanced('(', ')')?;
            }
        }

        let mut ty = match self.current().kind.clone() {
            TokenKind::Ident(word) if word == "void" => {
                self.advance();
                TypeRef::Void
            }
            TokenKind::Ident(word) if PRIMITIVE_TYPES.contains(&word.as_str()) => {
                self.advance();
                TypeRef::Primitive(word)
            }
            TokenKind::Punct('?') => {
                self.advance();
                let bound = if self.eat_ident("extends") {
                    Some(WildcardBound::Extends(Box::new(self.parse_type()?)))
                } else if self.eat_ident("super") {
                    Some(WildcardBound::Super(Box::new(self.parse_type()?)))
                } else {
                    None
                };
                return Ok(TypeRef::Wildcard(bound));
            }
            TokenKind::Ident(_) => self.parse_class_type()?,
            _ => return Err(self.error_expected("type")),
        };

        while self.at_punct('[') && self.peek(1).is_punct(']') {
            self.advance();
            self.advance();
            ty = TypeRef::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_class_type(&mut self) -> ParseResult<TypeRef> {
        let mut name = self.expect_ident()?;
        let mut args = Vec::new();
        loop {
            if self.at_punct('<') {
                args = self.parse_type_args()?;
            }
            if self.at_punct('.') && matches!(self.peek(1), TokenKind::Ident(_)) {
                if !args.is_empty() {
                    // Outer<A>.Inner: keep the outer arguments in the name.
                    name = TypeRef::generic(name, std::mem::take(&mut args)).to_string();
                }
                self.advance();
                name.push('.');
                name.push_str(&self.expect_ident()?);
            } else {
                break;
            }
        }
        Ok(TypeRef::Class { name, args })
    }

    fn parse_type_args(&mut self) -> ParseResult<Vec<TypeRef>> {
        self.expect_punct('<')?;
        let mut args = Vec::new();
        if self.eat_punct('>') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_type()?);
            if self.eat_punct(',') {
                continue;
            }
            self.expect_punct('>')?;
            return Ok(args);
        }
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Parameter>> {
        self.expect_punct('(')?;
        let mut params = Vec::new();
        if self.eat_punct(')') {
            return Ok(params);
        }
        loop {
            self.parse_modifiers()?;
            let mut ty = self.parse_type()?;
            let varargs = self.eat_ellipsis();

            // Receiver parameter: `Foo this`
            if self.eat_ident("this") {
                if self.eat_punct(',') {
                    continue;
                }
                self.expect_punct(')')?;
                return Ok(params);
            }

            let name = self.expect_ident()?;
            while self.at_punct('[') && self.peek(1).is_punct(']') {
                self.advance();
                self.advance();
                ty = TypeRef::Array(Box::new(ty));
            }
            params.push(Parameter { name, ty, varargs });

            if self.eat_punct(',') {
                continue;
            }
            self.expect_punct(')')?;
            return Ok(params);
        }
    }

    /// Generic parameter declarations as written, e.g. `["T extends Foo<T>", "U"]`.
    fn parse_type_params(&mut self) -> ParseResult<Vec<String>> {
        let open = self.current().span;
        self.expect_punct('<')?;

        let mut params = Vec::new();
        let mut depth = 1u32;
        let mut segment: Option<Span> = None;

        loop {
            let token = self.current().clone();
            match token.kind {
                TokenKind::Eof => {
                    return Err(ParseError::Unterminated {
                        what: "type parameter list",
                        location: self.unit.locate(open.start),
                    })
                }
                TokenKind::Punct('<') => depth += 1,
                TokenKind::Punct('>') => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        params.extend(segment.map(|s| self.normalized(s)));
                        return Ok(params);
                    }
                }
                TokenKind::Punct(',') if depth == 1 => {
                    self.advance();
                    params.extend(segment.take().map(|s| self.normalized(s)));
                    continue;
                }
                _ => {}
            }
            segment = Some(segment.map_or(token.span, |s| s.merge(token.span)));
            self.advance();
        }
    }

    fn normalized(&self, span: Span) -> String {
        self.unit.slice(span).split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn parse_qualified_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_ident()?;
        while self.at_punct('.') && matches!(self.peek(1), TokenKind::Ident(_)) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    /// After constructor parameters: optional `throws`, then the body.
    fn skip_constructor_rest(&mut self) -> ParseResult<()> {
        while !self.at_punct('{') {
            if self.at_eof() || self.at_punct('}') || self.at_punct(';') {
                return Err(self.error_expected("constructor body"));
            }
            self.advance();
        }
        self.skip_balanced('{', '}')
    }

    /// Skip to and past the `;` ending a field or annotation element.
    fn skip_field_rest(&mut self) -> ParseResult<()> {
        loop {
            match self.current().kind {
                TokenKind::Punct(';') => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::Punct('{') => self.skip_balanced('{', '}')?,
                TokenKind::Punct('(') => self.skip_balanced('(', ')')?,
                TokenKind::Punct('[') => self.skip_balanced('[', ']')?,
                TokenKind::Punct('}') | TokenKind::Eof => return Err(self.error_expected("`;`")),
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip a bracketed region starting at the current `open` token.
    fn skip_balanced(&mut self, open: char, close: char) -> ParseResult<()> {
        let start = self.current().span;
        self.expect_punct(open)?;
        let mut depth = 1u32;
        while depth > 0 {
            match self.current().kind {
                TokenKind::Eof => {
                    let what = match open {
                        '{' => "block",
                        '(' => "parenthesized list",
                        '[' => "brackets",
                        _ => "type argument list",
                    };
                    return Err(ParseError::Unterminated {
                        what,
                        location: self.unit.locate(start.start),
                    });
                }
                TokenKind::Punct(c) if c == open => depth += 1,
                TokenKind::Punct(c) if c == close => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self, n: usize) -> &TokenKind {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn at_punct(&self, c: char) -> bool {
        self.current().kind.is_punct(c)
    }

    fn at_ident(&self, text: &str) -> bool {
        self.current().kind.is_ident(text)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.at_punct(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, text: &str) -> bool {
        if self.at_ident(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ellipsis(&mut self) -> bool {
        if self.current().kind == TokenKind::Ellipsis {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> ParseResult<()> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error_expected(&format!("`{}`", c)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_expected("identifier")),
        }
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        let token = self.current();
        let location = self.unit.locate(token.span.start);
        match token.kind {
            TokenKind::Eof => ParseError::UnexpectedEof { location },
            ref found => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
                location,
            },
        }
    }
}
