//! Run output: pairings, shim descriptions and rendered units.

use std::path::PathBuf;

use serde::Serialize;

use crate::model::{Import, MethodDeclaration, MethodSignature, Parameter, TypeRef};

/// A synchronous candidate and the asynchronous method it delegates to.
///
/// `counterpart` is `None` when the classifier found no asynchronous sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPairing<'a> {
    pub candidate: &'a MethodDeclaration,
    pub counterpart: Option<&'a MethodDeclaration>,
}

impl<'a> MethodPairing<'a> {
    pub fn paired(candidate: &'a MethodDeclaration, counterpart: &'a MethodDeclaration) -> Self {
        Self {
            candidate,
            counterpart: Some(counterpart),
        }
    }

    pub fn unpaired(candidate: &'a MethodDeclaration) -> Self {
        Self {
            candidate,
            counterpart: None,
        }
    }
}

/// How the generated method hands its result back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResultShape {
    /// Returns a runtime future of `value`.
    Future { value: TypeRef },
    /// Takes a trailing runtime handler notified with `value`.
    Callback { value: TypeRef },
}

impl ResultShape {
    pub fn value(&self) -> &TypeRef {
        match self {
            ResultShape::Future { value } | ResultShape::Callback { value } => value,
        }
    }
}

/// Which original method the shim calls and how outcomes are routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DelegationTemplate {
    /// Call the asynchronous counterpart, supplying an internal callback
    /// whose success/failure completes the container.
    Counterpart {
        method: String,
        /// Callback type as rendered for the anonymous implementation.
        callback: TypeRef,
        /// Parameter names forwarded, in order.
        arguments: Vec<String>,
    },
    /// Run the synchronous method on the runtime's worker pool.
    BackgroundDispatch {
        method: String,
        arguments: Vec<String>,
    },
}

impl DelegationTemplate {
    /// Name of the delegated-to method.
    pub fn method(&self) -> &str {
        match self {
            DelegationTemplate::Counterpart { method, .. }
            | DelegationTemplate::BackgroundDispatch { method, .. } => method,
        }
    }
}

/// Abstract description of one method to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimSpec {
    pub target_name: String,
    pub params: Vec<Parameter>,
    pub result: ResultShape,
    pub delegation: DelegationTemplate,
    /// Method type parameters carried from the candidate.
    pub type_params: Vec<String>,
    /// Documentation lines for the generated method.
    pub doc: Vec<String>,
    /// Signature of the candidate this shim originates from.
    pub origin: MethodSignature,
    /// Declaration index of the candidate, for ordering.
    pub origin_index: usize,
}

impl ShimSpec {
    /// Signature of the generated method as seen by callers.
    pub fn target_signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.target_name.clone(),
            param_types: self.params.iter().map(|p| p.signature_type().to_string()).collect(),
        }
    }
}

/// Accessor returning the shim of a nested client, e.g. `indices()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedAccessor {
    pub method: String,
    /// Simple name of the nested client class.
    pub client: String,
    pub origin_index: usize,
}

/// Everything the emitter needs to render one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassPlan {
    /// Simple name of the original client class.
    pub class_name: String,
    /// Fully qualified name of the original client class.
    pub qualified_name: String,
    pub source_package: Option<String>,
    pub class_type_params: Vec<String>,
    /// Non-static imports of the source unit.
    pub source_imports: Vec<Import>,
    pub accessors: Vec<NestedAccessor>,
    pub shims: Vec<ShimSpec>,
}

impl ClassPlan {
    /// Class type parameter names without bounds (`T extends Foo` → `T`).
    pub fn type_param_names(&self) -> Vec<&str> {
        self.class_type_params
            .iter()
            .filter_map(|p| p.split_whitespace().next())
            .collect()
    }
}

/// Rendered output and its path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub relative_path: PathBuf,
    pub text: String,
}
