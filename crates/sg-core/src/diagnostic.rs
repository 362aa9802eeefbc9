//! Non-fatal diagnostics collected during classification and mapping.

use std::fmt;

use serde::Serialize;

use crate::model::MethodSignature;
use crate::source::Location;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Something a maintainer should look at; generation continued.
    Warning,
    /// Expected exclusion (e.g. a private helper), recorded for completeness.
    Note,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Several asynchronous counterparts fit; the group was skipped.
    AmbiguousPairing,
    /// An eligible method has no asynchronous counterpart.
    NoCounterpart,
    /// The method does not meet the eligibility rules.
    Ineligible,
    /// The class produced no shims at all.
    NoEligibleMethods,
    /// A delegation template could not be built for a pairing.
    TemplateMismatch,
    /// Two shims would have the same generated signature; the later one was dropped.
    DuplicateTarget,
    /// A nested client's source file was not found next to the input.
    NestedSourceMissing,
}

impl DiagnosticKind {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::AmbiguousPairing => "ambiguous-pairing",
            DiagnosticKind::NoCounterpart => "no-counterpart",
            DiagnosticKind::Ineligible => "ineligible",
            DiagnosticKind::NoEligibleMethods => "no-eligible-methods",
            DiagnosticKind::TemplateMismatch => "template-mismatch",
            DiagnosticKind::DuplicateTarget => "duplicate-target",
            DiagnosticKind::NestedSourceMissing => "nested-source-missing",
        }
    }
}

/// A classification warning or emission error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Class the diagnostic belongs to.
    pub class: String,
    pub method: Option<MethodSignature>,
    pub location: Option<Location>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(
        kind: DiagnosticKind,
        class: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            class: class.into(),
            method: None,
            location: None,
            message: message.into(),
        }
    }

    pub fn note(
        kind: DiagnosticKind,
        class: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Note,
            ..Self::warning(kind, class, message)
        }
    }

    /// Attach the method the diagnostic is about.
    pub fn for_method(mut self, signature: MethodSignature) -> Self {
        self.method = Some(signature);
        self
    }

    /// Attach a source location.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "WARN",
            Severity::Note => "NOTE",
        };
        write!(f, "[{}] {}", severity, self.kind.name())?;
        if let Some(ref location) = self.location {
            write!(f, " at {}", location)?;
        }
        write!(f, " {}", self.class)?;
        if let Some(ref method) = self.method {
            write!(f, "#{}", method)?;
        }
        write!(f, ": {}", self.message)
    }
}
