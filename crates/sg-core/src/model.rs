//! Declaration model produced by a [`SourceParser`](crate::SourceParser).
//!
//! Only what the shim pipeline needs is kept: type names as written,
//! signatures, modifiers and documentation. Method bodies are never modeled.

use std::fmt;

use serde::Serialize;

use crate::source::Span;

/// Java primitive type names.
pub const PRIMITIVE_TYPES: [&str; 8] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// A type reference as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    Void,
    Primitive(String),
    /// A (possibly qualified) class or interface type, e.g. `ActionListener<GetResponse>`.
    Class { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    Wildcard(Option<WildcardBound>),
}

/// Bound of a `?` type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum WildcardBound {
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

impl TypeRef {
    /// Plain class type without type arguments.
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Generic class type.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// True for primitives and arrays whose element type is primitive.
    pub fn is_primitive_like(&self) -> bool {
        match self {
            TypeRef::Primitive(_) => true,
            TypeRef::Array(inner) => inner.is_primitive_like(),
            _ => false,
        }
    }

    /// Last segment of a class type name (`org.foo.Bar` → `Bar`).
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeRef::Class { name, .. } => name.rsplit('.').next(),
            _ => None,
        }
    }

    /// Type arguments of a class type; empty for anything else.
    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Class { args, .. } => args,
            _ => &[],
        }
    }

    /// The reference type usable as a generic argument.
    ///
    /// Primitives box to their wrapper class; `void` becomes `Void`.
    pub fn boxed(&self) -> TypeRef {
        match self {
            TypeRef::Void => TypeRef::class("Void"),
            TypeRef::Primitive(p) => {
                let wrapper = match p.as_str() {
                    "boolean" => "Boolean",
                    "byte" => "Byte",
                    "char" => "Character",
                    "short" => "Short",
                    "int" => "Integer",
                    "long" => "Long",
                    "float" => "Float",
                    "double" => "Double",
                    other => other,
                };
                TypeRef::class(wrapper)
            }
            other => other.clone(),
        }
    }

    /// Erase type arguments, keeping array structure (`List<String>[]` → `List[]`).
    pub fn erased(&self) -> TypeRef {
        match self {
            TypeRef::Class { name, .. } => TypeRef::class(name.clone()),
            TypeRef::Array(inner) => TypeRef::Array(Box::new(inner.erased())),
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Primitive(p) => f.write_str(p),
            TypeRef::Class { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Array(inner) => write!(f, "{}[]", inner),
            TypeRef::Wildcard(None) => f.write_str("?"),
            TypeRef::Wildcard(Some(WildcardBound::Extends(t))) => write!(f, "? extends {}", t),
            TypeRef::Wildcard(Some(WildcardBound::Super(t))) => write!(f, "? super {}", t),
        }
    }
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    /// `String... names`; `ty` holds the element type.
    pub varargs: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            varargs: false,
        }
    }

    /// The parameter type as declared, varargs rendered with `...`.
    pub fn declared_type(&self) -> String {
        if self.varargs {
            format!("{}...", self.ty)
        } else {
            self.ty.to_string()
        }
    }

    /// Type used for signature identity: varargs count as arrays.
    pub fn signature_type(&self) -> TypeRef {
        if self.varargs {
            TypeRef::Array(Box::new(self.ty.clone()))
        } else {
            self.ty.clone()
        }
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

/// Method modifiers relevant to classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_default: bool,
    pub is_synchronized: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            visibility: Visibility::PackagePrivate,
            is_static: false,
            is_final: false,
            is_abstract: false,
            is_default: false,
            is_synchronized: false,
        }
    }
}

/// A method declared directly in a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: TypeRef,
    pub modifiers: Modifiers,
    /// Annotation names as written, without `@` (e.g. `Deprecated`).
    pub annotations: Vec<String>,
    /// Generic type parameters as written, e.g. `["T extends Request"]`.
    pub type_params: Vec<String>,
    pub throws: Vec<TypeRef>,
    /// Javadoc text with comment markers stripped.
    pub doc: Option<String>,
    /// Position among the methods of the owning class.
    pub index: usize,
    pub span: Span,
}

impl MethodDeclaration {
    /// Name plus full parameter-type list.
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.clone(),
            param_types: self.params.iter().map(|p| p.signature_type().to_string()).collect(),
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| a == "Deprecated" || a == "java.lang.Deprecated")
            || self
                .doc
                .as_deref()
                .map_or(false, |d| d.lines().any(|l| l.trim_start().starts_with("@deprecated")))
    }

    pub fn last_param(&self) -> Option<&Parameter> {
        self.params.last()
    }
}

/// Method identity: name plus rendered parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub param_types: Vec<String>,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.param_types.join(", "))
    }
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// A top-level type declaration and the methods declared on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDeclaration {
    pub name: String,
    pub kind: ClassKind,
    /// Generic type parameters as written.
    pub type_params: Vec<String>,
    pub methods: Vec<MethodDeclaration>,
    /// Simple names of member types declared in the body.
    pub nested_types: Vec<String>,
    pub doc: Option<String>,
    pub span: Span,
}

/// An import declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// Dotted path without the trailing `.*`.
    pub path: String,
    pub is_static: bool,
    pub on_demand: bool,
}

impl Import {
    /// Simple name bound by a single-type import.
    pub fn simple_name(&self) -> Option<&str> {
        if self.on_demand {
            None
        } else {
            self.path.rsplit('.').next()
        }
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            f.write_str("static ")?;
        }
        f.write_str(&self.path)?;
        if self.on_demand {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

/// Parsed tree of one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<ClassDeclaration>,
}

impl CompilationUnit {
    /// The type shims are generated for: the one named after the file, else the first.
    pub fn primary_type(&self, stem: Option<&str>) -> Option<&ClassDeclaration> {
        stem.and_then(|s| self.types.iter().find(|t| t.name == s))
            .or_else(|| self.types.first())
    }

    /// Fully qualified name of a top-level type in this unit.
    pub fn qualified_name(&self, simple: &str) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package, simple),
            None => simple.to_string(),
        }
    }
}
