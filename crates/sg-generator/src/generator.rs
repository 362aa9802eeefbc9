//! The generation run: load, parse, analyze, emit, write.
//!
//! Every input is loaded, parsed and planned before the output directory
//! is touched. Output is staged and committed as one batch, so a fatal error
//! leaves the file system unchanged.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use sg_analyzer::{Analysis, Analyzer};
use sg_core::{
    Diagnostic, DiagnosticKind, ParseError, Severity, SourceError, SourceParser, SourceUnit,
};
use sg_emitter::ShimEmitter;
use sg_parser::JavaSourceParser;

use crate::config::GeneratorConfig;
use crate::output::OutputBatch;

const JAVA_KEYWORDS: [&str; 53] = [
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null",
];

/// Fatal errors. Nothing is written once one of these occurs.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid namespace `{namespace}`: {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to one generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WriteStatus {
    Written,
    /// Existing file already had identical contents.
    Unchanged,
}

/// One generated class.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub class: String,
    pub source: PathBuf,
    pub path: PathBuf,
    pub shims: usize,
    pub accessors: usize,
    pub status: WriteStatus,
}

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub namespace: String,
    pub units: Vec<UnitReport>,
    pub diagnostics: Vec<Diagnostic>,
    pub duration: Duration,
}

impl RunReport {
    pub fn shim_count(&self) -> usize {
        self.units.iter().map(|u| u.shims).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    pub fn written(&self) -> usize {
        self.units.iter().filter(|u| u.status == WriteStatus::Written).count()
    }

    /// Format as a summary string.
    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "Generated {} shim(s) in {} class(es) for {} in {:.2}s\n",
            self.shim_count(),
            self.units.len(),
            self.namespace,
            self.duration.as_secs_f64(),
        );

        for unit in &self.units {
            let status = match unit.status {
                WriteStatus::Written => "written",
                WriteStatus::Unchanged => "unchanged",
            };
            summary.push_str(&format!(
                "  {} -> {} ({} shims, {} accessors, {})\n",
                unit.class,
                unit.path.display(),
                unit.shims,
                unit.accessors,
                status
            ));
        }

        let warnings: Vec<&Diagnostic> =
            self.diagnostics.iter().filter(|d| d.is_warning()).collect();
        if !warnings.is_empty() {
            summary.push_str(&format!("\n{} warning(s):\n", warnings.len()));
            for diagnostic in warnings {
                summary.push_str(&format!("  {}\n", diagnostic));
            }
        }

        summary
    }
}

/// A parsed unit and the plan for its primary class.
struct PlannedUnit {
    source: PathBuf,
    analysis: Analysis,
}

/// Generates the asynchronous wrapper of a client class.
pub struct ShimGenerator<P = JavaSourceParser> {
    parser: P,
    config: GeneratorConfig,
}

impl ShimGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_parser(JavaSourceParser::new(), config)
    }
}

impl<P: SourceParser> ShimGenerator<P> {
    pub fn with_parser(parser: P, config: GeneratorConfig) -> Self {
        Self { parser, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate shims for the client declared in `input` into `output_dir`.
    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<RunReport, GeneratorError> {
        let start = Instant::now();
        let namespace = self.config.namespace.as_str();
        validate_namespace(namespace)?;

        tracing::info!(
            input = %input.display(),
            output = %output_dir.display(),
            namespace,
            "generating shims"
        );

        let planned = self.plan_all(input)?;

        let emitter = ShimEmitter::new(self.config.emitter.clone());
        let mut diagnostics = Vec::new();
        let mut generated = Vec::with_capacity(planned.len());
        for unit in planned {
            diagnostics.extend(unit.analysis.diagnostics.iter().cloned());
            let rendered = emitter.emit(&unit.analysis.plan, namespace);
            generated.push((unit, rendered));
        }

        let mut batch = OutputBatch::new();
        let mut units = Vec::with_capacity(generated.len());
        for (unit, rendered) in &generated {
            let path = output_dir.join(&rendered.relative_path);
            let status = batch.stage(&path, &rendered.text)?;
            units.push(UnitReport {
                class: unit.analysis.plan.class_name.clone(),
                source: unit.source.clone(),
                path,
                shims: unit.analysis.plan.shims.len(),
                accessors: unit.analysis.plan.accessors.len(),
                status,
            });
        }
        batch.commit()?;
        for unit in &units {
            tracing::info!(
                class = %unit.class,
                path = %unit.path.display(),
                shims = unit.shims,
                status = ?unit.status,
                "generated class"
            );
        }

        let report = RunReport {
            namespace: namespace.to_string(),
            units,
            diagnostics,
            duration: start.elapsed(),
        };
        match serde_json::to_string(&report) {
            Ok(json) => tracing::debug!(report = %json, "run report"),
            Err(err) => tracing::debug!(error = %err, "run report not serializable"),
        }
        Ok(report)
    }

    /// Load, parse and analyze the input and every nested client it reaches.
    fn plan_all(&self, input: &Path) -> Result<Vec<PlannedUnit>, GeneratorError> {
        let analyzer = Analyzer::new(self.config.analyzer.clone());
        let mut planned = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut queue: VecDeque<PathBuf> = VecDeque::from([input.to_path_buf()]);

        while let Some(path) = queue.pop_front() {
            if !visited.insert(path.clone()) {
                continue;
            }

            let unit = SourceUnit::load(&path)?;
            let tree = self.parser.parse(&unit)?;
            let class = tree
                .primary_type(unit.stem())
                .ok_or_else(|| ParseError::NoTypeDeclaration { path: path.clone() })?;

            if tree.package.as_deref() == Some(self.config.namespace.as_str()) {
                return Err(GeneratorError::InvalidNamespace {
                    namespace: self.config.namespace.clone(),
                    reason: format!(
                        "generated `{}` would replace the class it wraps",
                        class.name
                    ),
                });
            }

            let mut analysis = analyzer.analyze(&unit, &tree, class);

            if self.config.follow_nested_clients {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                let mut missing = Vec::new();
                for client in &analysis.nested_clients {
                    let nested = dir.join(format!("{}.java", client));
                    if nested.is_file() {
                        queue.push_back(nested);
                    } else {
                        missing.push(client.clone());
                        analysis.diagnostics.push(
                            Diagnostic::warning(
                                DiagnosticKind::NestedSourceMissing,
                                &class.name,
                                format!("{} not found; accessor skipped", nested.display()),
                            )
                            .at(unit.locate(class.span.start)),
                        );
                    }
                }
                analysis.plan.accessors.retain(|a| !missing.contains(&a.client));
            } else {
                analysis.plan.accessors.clear();
            }

            for diagnostic in &analysis.diagnostics {
                match diagnostic.severity {
                    Severity::Warning => tracing::warn!("{}", diagnostic),
                    Severity::Note => tracing::debug!("{}", diagnostic),
                }
            }

            planned.push(PlannedUnit {
                source: path,
                analysis,
            });
        }

        Ok(planned)
    }
}

/// Dotted sequence of Java identifiers, none of them a keyword.
pub fn validate_namespace(namespace: &str) -> Result<(), GeneratorError> {
    let invalid = |reason: String| GeneratorError::InvalidNamespace {
        namespace: namespace.to_string(),
        reason,
    };

    if namespace.is_empty() {
        return Err(invalid("namespace is empty".to_string()));
    }
    for segment in namespace.split('.') {
        let mut chars = segment.chars();
        let valid_start = chars
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_' || c == '$');
        if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            return Err(invalid(format!("`{}` is not a Java identifier", segment)));
        }
        if JAVA_KEYWORDS.contains(&segment) || segment == "_" {
            return Err(invalid(format!("`{}` is a reserved word", segment)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_namespace() {
        assert!(validate_namespace("io.reactiverse.opensearch.client").is_ok());
        assert!(validate_namespace("shim").is_ok());
        assert!(validate_namespace("_internal.$gen").is_ok());

        for bad in ["", "io..client", "io.1client", "io.class.shim", "io.my-client", "io.client."] {
            let err = validate_namespace(bad).unwrap_err();
            assert!(
                matches!(err, GeneratorError::InvalidNamespace { .. }),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_report_summary() {
        let report = RunReport {
            namespace: "io.example".into(),
            units: vec![UnitReport {
                class: "Client".into(),
                source: PathBuf::from("Client.java"),
                path: PathBuf::from("out/io/example/Client.java"),
                shims: 2,
                accessors: 1,
                status: WriteStatus::Written,
            }],
            diagnostics: vec![
                Diagnostic::warning(
                    DiagnosticKind::NoCounterpart,
                    "Client",
                    "no asynchronous counterpart",
                ),
                Diagnostic::note(DiagnosticKind::Ineligible, "Client", "not public"),
            ],
            duration: Duration::from_millis(5),
        };
        let summary = report.format_summary();
        assert!(summary.starts_with("Generated 2 shim(s) in 1 class(es) for io.example"));
        assert!(summary.contains("1 warning(s)"));
        assert!(!summary.contains("not public"));
        assert_eq!(report.written(), 1);
    }
}
