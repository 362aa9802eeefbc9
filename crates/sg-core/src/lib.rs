//! # sg-core
//!
//! Shared types for the async shim generator.
//!
//! - [`source`]: loading source text and resolving locations
//! - [`model`]: classes, methods and type references as written
//! - [`parse`]: the [`SourceParser`] capability the pipeline depends on
//! - [`shim`]: pairings, shim descriptions and generated units
//! - [`diagnostic`]: non-fatal warnings collected during a run
//!
//! ```text
//! path ──> SourceUnit ──> CompilationUnit ──> MethodPairing ──> ShimSpec ──> GeneratedUnit
//!          (source)       (parse/model)       (classifier)      (mapper)     (emitter)
//! ```

pub mod diagnostic;
pub mod model;
pub mod parse;
pub mod shim;
pub mod source;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use model::{
    ClassDeclaration, ClassKind, CompilationUnit, Import, MethodDeclaration, MethodSignature,
    Modifiers, Parameter, TypeRef, Visibility, WildcardBound,
};
pub use parse::{ParseError, ParseResult, SourceParser};
pub use shim::{
    ClassPlan, DelegationTemplate, GeneratedUnit, MethodPairing, NestedAccessor, ResultShape,
    ShimSpec,
};
pub use source::{LineCol, Location, SourceError, SourceUnit, Span};
