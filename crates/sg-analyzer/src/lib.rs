//! # sg-analyzer
//!
//! Decides which methods of a client class get an asynchronous shim and
//! describes each shim abstractly.
//!
//! ```text
//! ClassDeclaration ──> Classifier ──> MethodPairing* ──> SignatureMapper ──> ClassPlan
//!                          │                                   │
//!                          └──────────── Diagnostic* ──────────┘
//! ```

pub mod classify;
pub mod config;
pub mod mapper;

pub use classify::{Classification, Classifier, IneligibleReason, MethodOutcome};
pub use config::{AnalyzerConfig, AsyncIdiom, FallbackPolicy};
pub use mapper::{EmissionError, SignatureMapper};

use std::collections::HashSet;

use sg_core::{
    ClassDeclaration, ClassPlan, CompilationUnit, Diagnostic, DiagnosticKind, NestedAccessor,
    SourceUnit,
};

/// Plan for one class plus everything noticed while building it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub plan: ClassPlan,
    pub diagnostics: Vec<Diagnostic>,
    /// Simple names of nested clients the plan links to.
    pub nested_clients: Vec<String>,
}

impl Analysis {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }
}

/// Classification and mapping for whole classes.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Build the plan for `class`, declared in `tree`, parsed from `unit`.
    ///
    /// Nested accessors are always planned; the caller drops those whose
    /// client it cannot generate.
    pub fn analyze(
        &self,
        unit: &SourceUnit,
        tree: &CompilationUnit,
        class: &ClassDeclaration,
    ) -> Analysis {
        let classification = Classifier::new(&self.config).classify(unit, class);
        let mut diagnostics = classification.diagnostics.clone();

        let qualified_name = tree.qualified_name(&class.name);
        let mapper = SignatureMapper::new(&self.config, class, qualified_name.clone());

        let mut shims = Vec::new();
        let mut targets = HashSet::new();
        for pairing in classification.pairings() {
            let location = unit.locate(pairing.candidate.span.start);
            let shim = match mapper.map(pairing) {
                Ok(shim) => shim,
                // Already reported by the classifier.
                Err(_)
                    if pairing.counterpart.is_none()
                        && self.config.fallback == FallbackPolicy::Skip =>
                {
                    continue
                }
                Err(err) => {
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::TemplateMismatch,
                            &class.name,
                            err.to_string(),
                        )
                        .for_method(err.origin().clone())
                        .at(location),
                    );
                    continue;
                }
            };

            let target = shim.target_signature();
            if !targets.insert(target.clone()) {
                let err = EmissionError::DuplicateTarget {
                    origin: shim.origin.clone(),
                    target,
                };
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::DuplicateTarget,
                        &class.name,
                        err.to_string(),
                    )
                    .for_method(shim.origin.clone())
                    .at(location),
                );
                continue;
            }
            shims.push(shim);
        }

        let accessors: Vec<NestedAccessor> = classification
            .outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                MethodOutcome::NestedAccessor { method, client } => Some(NestedAccessor {
                    method: method.name.clone(),
                    client: client.clone(),
                    origin_index: method.index,
                }),
                _ => None,
            })
            .collect();

        if shims.is_empty() {
            let mut diagnostic = Diagnostic::warning(
                DiagnosticKind::NoEligibleMethods,
                &class.name,
                "no eligible methods; the generated class has no shims",
            );
            diagnostic.location = Some(unit.locate(class.span.start));
            diagnostics.push(diagnostic);
        }

        tracing::debug!(
            class = %qualified_name,
            methods = class.methods.len(),
            shims = shims.len(),
            accessors = accessors.len(),
            diagnostics = diagnostics.len(),
            "analyzed class"
        );

        let nested_clients = classification
            .nested_clients()
            .into_iter()
            .map(str::to_string)
            .collect();

        Analysis {
            plan: ClassPlan {
                class_name: class.name.clone(),
                qualified_name,
                source_package: tree.package.clone(),
                class_type_params: class.type_params.clone(),
                source_imports: tree.imports.iter().filter(|i| !i.is_static).cloned().collect(),
                accessors,
                shims,
            },
            diagnostics,
            nested_clients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::{DelegationTemplate, SourceParser};
    use sg_parser::JavaSourceParser;

    fn analyze(config: AnalyzerConfig, source: &str) -> Analysis {
        let unit = SourceUnit::new("Client.java", source);
        let tree = JavaSourceParser::new().parse(&unit).unwrap();
        Analyzer::new(config).analyze(&unit, &tree, &tree.types[0])
    }

    #[test]
    fn test_scenario_single_shim_for_paired_overload() {
        let analysis = analyze(
            AnalyzerConfig::default(),
            "package org.example;
            import java.io.IOException;
            public class Client {
                public Response get(Request r) { return null; }
                public Response get(Request r, Options o) { return null; }
                public Cancellable getAsync(Request r, Options o, Listener<Response> l) { return null; }
            }",
        );
        let plan = &analysis.plan;
        assert_eq!(plan.qualified_name, "org.example.Client");
        assert_eq!(plan.shims.len(), 1);
        assert_eq!(plan.shims[0].origin.to_string(), "get(Request, Options)");
        assert_eq!(plan.shims[0].delegation.method(), "getAsync");
        assert_eq!(plan.source_imports.len(), 1);
    }

    #[test]
    fn test_scenario_primitive_without_counterpart_is_skipped() {
        let source = "public class Client {
                public boolean ping() { return true; }
                public Info info() { return null; }
                public void infoAsync(ActionListener<Info> l) {}
            }";
        for _ in 0..2 {
            let analysis = analyze(AnalyzerConfig::rest_client(), source);
            assert_eq!(analysis.plan.shims.len(), 1);
            assert_eq!(analysis.plan.shims[0].target_name, "infoAsync");
            let skipped: Vec<_> = analysis
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::NoCounterpart)
                .collect();
            assert_eq!(skipped.len(), 1);
            assert_eq!(skipped[0].method.as_ref().unwrap().name, "ping");
            // No template mismatch is reported on top of the skip.
            assert_eq!(analysis.warning_count(), 1);
        }
    }

    #[test]
    fn test_scenario_empty_class_warns() {
        let analysis = analyze(AnalyzerConfig::default(), "public class Empty {}");
        assert!(analysis.plan.shims.is_empty());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].kind, DiagnosticKind::NoEligibleMethods);
    }

    #[test]
    fn test_ambiguous_group_produces_no_shim() {
        let analysis = analyze(
            AnalyzerConfig {
                fallback: FallbackPolicy::ExecuteBlocking,
                ..Default::default()
            },
            "public class Client {
                public Info info(Options o) { return null; }
                public Info info(Options o, Callback<Info> c) { return null; }
                public Info infoAsync(Options o, ActionListener<Info> l) { return null; }
            }",
        );
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::AmbiguousPairing));
        assert!(analysis.plan.shims.is_empty());
    }

    #[test]
    fn test_nested_accessors_and_background_dispatch() {
        let analysis = analyze(
            AnalyzerConfig {
                fallback: FallbackPolicy::ExecuteBlocking,
                ..AnalyzerConfig::rest_client()
            },
            "public class Client {
                public IndicesClient indices() { return indices; }
                public boolean ping(Options o) { return true; }
            }",
        );
        assert_eq!(analysis.nested_clients, vec!["IndicesClient".to_string()]);
        assert_eq!(analysis.plan.accessors[0].method, "indices");
        assert!(matches!(
            analysis.plan.shims[0].delegation,
            DelegationTemplate::BackgroundDispatch { .. }
        ));
        assert_eq!(analysis.warning_count(), 0);
    }
}
