//! Method classification.
//!
//! Methods are grouped by base name (`get` and `getAsync` share a group).
//! Within a group, an asynchronous method is the counterpart of a candidate
//! when its parameters are exactly the candidate's plus one trailing
//! completion callback. A group where that relation is not one-to-one is
//! ambiguous and skipped as a whole.

use std::collections::HashMap;
use std::fmt;

use sg_core::{
    ClassDeclaration, Diagnostic, DiagnosticKind, MethodDeclaration, MethodPairing, SourceUnit,
    TypeRef, Visibility,
};

use crate::config::{AnalyzerConfig, FallbackPolicy};

/// Why a method is not wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    NotPublic(Visibility),
    Static,
    Deprecated,
    VoidReturn,
    PrimitiveReturn,
    /// Returns a client type that is never wrapped, such as the low-level client.
    FilteredClient,
}

impl IneligibleReason {
    /// Expected exclusions, reported as notes rather than warnings.
    fn is_expected(&self) -> bool {
        matches!(self, IneligibleReason::NotPublic(_) | IneligibleReason::FilteredClient)
    }
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibleReason::NotPublic(v) => write!(f, "not public ({:?})", v),
            IneligibleReason::Static => f.write_str("static method"),
            IneligibleReason::Deprecated => f.write_str("deprecated"),
            IneligibleReason::VoidReturn => f.write_str("returns void"),
            IneligibleReason::PrimitiveReturn => f.write_str("returns a primitive"),
            IneligibleReason::FilteredClient => f.write_str("returns a filtered client type"),
        }
    }
}

/// Classification of a single method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodOutcome<'a> {
    /// Eligible candidate with its counterpart.
    Paired(MethodPairing<'a>),
    /// Eligible candidate without counterpart.
    Unpaired(MethodPairing<'a>),
    /// Already asynchronous; never re-wrapped.
    Asynchronous(&'a MethodDeclaration),
    /// Accessor of a nested client such as `indices()`.
    NestedAccessor {
        method: &'a MethodDeclaration,
        client: String,
    },
    Ineligible {
        method: &'a MethodDeclaration,
        reason: IneligibleReason,
    },
    /// Member of an ambiguous group.
    Ambiguous(&'a MethodDeclaration),
}

impl<'a> MethodOutcome<'a> {
    pub fn method(&self) -> &'a MethodDeclaration {
        match self {
            MethodOutcome::Paired(p) | MethodOutcome::Unpaired(p) => p.candidate,
            MethodOutcome::Asynchronous(m) | MethodOutcome::Ambiguous(m) => *m,
            MethodOutcome::NestedAccessor { method, .. }
            | MethodOutcome::Ineligible { method, .. } => *method,
        }
    }
}

/// Outcomes for every method of a class, in declaration order.
#[derive(Debug, Clone)]
pub struct Classification<'a> {
    pub class: &'a ClassDeclaration,
    pub outcomes: Vec<MethodOutcome<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Classification<'a> {
    /// Paired and unpaired candidates, in declaration order.
    pub fn pairings(&self) -> impl Iterator<Item = &MethodPairing<'a>> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            MethodOutcome::Paired(p) | MethodOutcome::Unpaired(p) => Some(p),
            _ => None,
        })
    }

    /// Simple names of nested clients reachable through accessors.
    pub fn nested_clients(&self) -> Vec<&str> {
        let mut clients: Vec<&str> = Vec::new();
        for outcome in &self.outcomes {
            if let MethodOutcome::NestedAccessor { client, .. } = outcome {
                if !clients.contains(&client.as_str()) {
                    clients.push(client);
                }
            }
        }
        clients
    }
}

/// Per-method facts computed before grouping.
enum Shape {
    Asynchronous,
    Candidate,
    NestedAccessor(String),
    Ineligible(IneligibleReason),
}

/// Partitions the methods of one class.
pub struct Classifier<'c> {
    config: &'c AnalyzerConfig,
}

impl<'c> Classifier<'c> {
    pub fn new(config: &'c AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Classify every method declared directly on `class`.
    pub fn classify<'a>(
        &self,
        unit: &SourceUnit,
        class: &'a ClassDeclaration,
    ) -> Classification<'a> {
        let shapes: Vec<Shape> = class.methods.iter().map(|m| self.shape(class, m)).collect();

        // Groups by base name, in order of first declaration.
        let mut group_index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for (i, method) in class.methods.iter().enumerate() {
            let base = self.config.base_name(&method.name);
            let slot = *group_index.entry(base).or_insert_with(|| {
                groups.push((base, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(i);
        }

        let mut counterpart_of: Vec<Option<usize>> = vec![None; class.methods.len()];
        let mut uncallable_of: Vec<Option<usize>> = vec![None; class.methods.len()];
        let mut ambiguous = vec![false; class.methods.len()];
        let mut diagnostics = Vec::new();

        for (base, members) in &groups {
            let candidates: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&i| matches!(shapes[i], Shape::Candidate))
                .collect();
            let asynchronous: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&i| matches!(shapes[i], Shape::Asynchronous))
                .collect();

            let mut matches: Vec<(usize, Vec<usize>)> = Vec::new();
            let mut claimed: HashMap<usize, usize> = HashMap::new();
            for &c in &candidates {
                let (found, uncallable): (Vec<usize>, Vec<usize>) = asynchronous
                    .iter()
                    .copied()
                    .filter(|&a| self.matches_parameters(&class.methods[c], &class.methods[a]))
                    .partition(|&a| self.is_callable(&class.methods[a]));
                uncallable_of[c] = uncallable.first().copied();
                for &a in &found {
                    *claimed.entry(a).or_insert(0) += 1;
                }
                matches.push((c, found));
            }

            let is_ambiguous = matches.iter().any(|(_, found)| found.len() > 1)
                || claimed.values().any(|&n| n > 1);

            if is_ambiguous {
                for &c in &candidates {
                    ambiguous[c] = true;
                }
                let first = &class.methods[candidates[0]];
                let options: Vec<String> = asynchronous
                    .iter()
                    .map(|&a| class.methods[a].signature().to_string())
                    .collect();
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::AmbiguousPairing,
                        &class.name,
                        format!(
                            "group `{}` has more than one plausible asynchronous counterpart \
                             ({}); skipped",
                            base,
                            options.join(", ")
                        ),
                    )
                    .for_method(first.signature())
                    .at(unit.locate(first.span.start)),
                );
                continue;
            }

            for (c, found) in matches {
                counterpart_of[c] = found.first().copied();
            }
        }

        let mut outcomes = Vec::with_capacity(class.methods.len());
        for (i, method) in class.methods.iter().enumerate() {
            let outcome = match &shapes[i] {
                Shape::Asynchronous => MethodOutcome::Asynchronous(method),
                Shape::NestedAccessor(client) => MethodOutcome::NestedAccessor {
                    method,
                    client: client.clone(),
                },
                Shape::Ineligible(reason) => {
                    let message = format!("not wrapped: {}", reason);
                    let diagnostic = if reason.is_expected() {
                        Diagnostic::note(DiagnosticKind::Ineligible, &class.name, message)
                    } else {
                        Diagnostic::warning(DiagnosticKind::Ineligible, &class.name, message)
                    };
                    diagnostics.push(
                        diagnostic
                            .for_method(method.signature())
                            .at(unit.locate(method.span.start)),
                    );
                    MethodOutcome::Ineligible {
                        method,
                        reason: *reason,
                    }
                }
                Shape::Candidate if ambiguous[i] => MethodOutcome::Ambiguous(method),
                Shape::Candidate => match counterpart_of[i] {
                    Some(a) => {
                        MethodOutcome::Paired(MethodPairing::paired(method, &class.methods[a]))
                    }
                    None => {
                        let reason = match uncallable_of[i] {
                            Some(a) => format!(
                                "asynchronous counterpart `{}` is not a public instance method",
                                class.methods[a].signature()
                            ),
                            None => "no asynchronous counterpart".to_string(),
                        };
                        let diagnostic = match self.config.fallback {
                            FallbackPolicy::Skip => Diagnostic::warning(
                                DiagnosticKind::NoCounterpart,
                                &class.name,
                                format!("{}; skipped", reason),
                            ),
                            FallbackPolicy::ExecuteBlocking => Diagnostic::note(
                                DiagnosticKind::NoCounterpart,
                                &class.name,
                                format!("{}; wrapped with executeBlocking", reason),
                            ),
                        };
                        diagnostics.push(
                            diagnostic
                                .for_method(method.signature())
                                .at(unit.locate(method.span.start)),
                        );
                        MethodOutcome::Unpaired(MethodPairing::unpaired(method))
                    }
                },
            };
            outcomes.push(outcome);
        }

        Classification {
            class,
            outcomes,
            diagnostics,
        }
    }

    fn shape(&self, class: &ClassDeclaration, method: &MethodDeclaration) -> Shape {
        if self.is_asynchronous(method) {
            return Shape::Asynchronous;
        }
        if method.modifiers.visibility != Visibility::Public {
            return Shape::Ineligible(IneligibleReason::NotPublic(method.modifiers.visibility));
        }
        if method.modifiers.is_static {
            return Shape::Ineligible(IneligibleReason::Static);
        }
        if method.is_deprecated() {
            return Shape::Ineligible(IneligibleReason::Deprecated);
        }
        if let Some(client) = self.nested_client(class, method) {
            return Shape::NestedAccessor(client);
        }
        if let Some(simple) = method.return_type.simple_name() {
            if self.config.filtered_clients.iter().any(|f| f == simple) {
                return Shape::Ineligible(IneligibleReason::FilteredClient);
            }
        }
        if method.return_type.is_void() {
            return Shape::Ineligible(IneligibleReason::VoidReturn);
        }
        if method.return_type.is_primitive_like() && !self.config.allow_primitive_returns {
            return Shape::Ineligible(IneligibleReason::PrimitiveReturn);
        }
        Shape::Candidate
    }

    /// Trailing parameter has the completion-callback shape.
    pub fn is_asynchronous(&self, method: &MethodDeclaration) -> bool {
        method
            .last_param()
            .filter(|p| !p.varargs)
            .and_then(|p| p.ty.simple_name())
            .map_or(false, |name| self.config.is_callback_name(name))
    }

    /// `asynchronous` can be delegated to on behalf of `candidate`.
    pub fn is_counterpart(
        &self,
        candidate: &MethodDeclaration,
        asynchronous: &MethodDeclaration,
    ) -> bool {
        self.matches_parameters(candidate, asynchronous) && self.is_callable(asynchronous)
    }

    /// Public, instance and not deprecated.
    fn is_callable(&self, method: &MethodDeclaration) -> bool {
        method.modifiers.visibility == Visibility::Public
            && !method.modifiers.is_static
            && !method.is_deprecated()
    }

    /// Leading parameters of `asynchronous` are exactly those of `candidate`.
    fn matches_parameters(
        &self,
        candidate: &MethodDeclaration,
        asynchronous: &MethodDeclaration,
    ) -> bool {
        asynchronous.params.len() == candidate.params.len() + 1
            && candidate
                .params
                .iter()
                .zip(&asynchronous.params)
                .all(|(c, a)| c.signature_type() == a.signature_type())
    }

    fn nested_client(
        &self,
        class: &ClassDeclaration,
        method: &MethodDeclaration,
    ) -> Option<String> {
        if !method.params.is_empty() || !method.type_params.is_empty() {
            return None;
        }
        match &method.return_type {
            TypeRef::Class { args, .. } if args.is_empty() => {
                let simple = method.return_type.simple_name()?;
                (simple != class.name && self.config.is_nested_client_name(simple))
                    .then(|| simple.to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::{CompilationUnit, SourceParser};
    use sg_parser::JavaSourceParser;

    fn parse(source: &str) -> (SourceUnit, CompilationUnit) {
        let unit = SourceUnit::new("Client.java", source);
        let tree = JavaSourceParser::new().parse(&unit).unwrap();
        (unit, tree)
    }

    fn names(classification: &Classification<'_>) -> Vec<(String, Option<String>)> {
        classification
            .pairings()
            .map(|p| {
                (
                    p.candidate.signature().to_string(),
                    p.counterpart.map(|c| c.name.clone()),
                )
            })
            .collect()
    }

    #[test]
    fn test_scenario_overloads_with_single_counterpart() {
        let (unit, tree) = parse(
            "public class Client {
                public Response get(Request r) { return null; }
                public Response get(Request r, Options o) { return null; }
                public Cancellable getAsync(Request r, Options o, Listener<Response> l) { return null; }
            }",
        );
        let config = AnalyzerConfig::default();
        let result = Classifier::new(&config).classify(&unit, &tree.types[0]);

        assert_eq!(
            names(&result),
            vec![
                ("get(Request)".to_string(), None),
                ("get(Request, Options)".to_string(), Some("getAsync".to_string())),
            ]
        );
        assert!(matches!(result.outcomes[2], MethodOutcome::Asynchronous(_)));
        assert!(result.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::NoCounterpart && d.method.as_ref().unwrap().name == "get"
        }));
    }

    #[test]
    fn test_ambiguous_group_is_skipped() {
        let (unit, tree) = parse(
            "public class Client {
                public Response get(Request r) { return null; }
                public void getAsync(Request r, ActionListener<Response> l) {}
                public void get(Request r, ResponseListener l) {}
                public Info info() { return null; }
                public void infoAsync(ActionListener<Info> l) {}
            }",
        );
        let config = AnalyzerConfig::default();
        let result = Classifier::new(&config).classify(&unit, &tree.types[0]);

        assert!(matches!(result.outcomes[0], MethodOutcome::Ambiguous(_)));
        assert_eq!(names(&result), vec![("info()".to_string(), Some("infoAsync".to_string()))]);
        let ambiguous: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::AmbiguousPairing)
            .collect();
        assert_eq!(ambiguous.len(), 1);
        assert!(ambiguous[0].message.contains("`get`"));
    }

    #[test]
    fn test_counterpart_claimed_twice_is_ambiguous() {
        let (unit, tree) = parse(
            "public class Client {
                public Response search(Request r) { return null; }
                public Response searchAsync(Request r) { return null; }
                public void searchAsync(Request r, ActionListener<Response> l) {}
            }",
        );
        let config = AnalyzerConfig::default();
        let result = Classifier::new(&config).classify(&unit, &tree.types[0]);
        assert_eq!(result.pairings().count(), 0);
        assert!(result.diagnostics.iter().any(|d| d.kind == DiagnosticKind::AmbiguousPairing));
    }

    #[test]
    fn test_eligibility_rules() {
        let (unit, tree) = parse(
            "public class Client {
                private Response hidden(Request r) { return null; }
                public static Response create(Request r) { return null; }
                @Deprecated public Response old(Request r) { return null; }
                public void close() {}
                public boolean ping(RequestOptions o) { return true; }
                public IndicesClient indices() { return indices; }
                public RestClient getLowLevelClient() { return client; }
            }",
        );
        let config = AnalyzerConfig::default();
        let result = Classifier::new(&config).classify(&unit, &tree.types[0]);

        let reasons: Vec<Option<IneligibleReason>> = result
            .outcomes
            .iter()
            .map(|o| match o {
                MethodOutcome::Ineligible { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(reasons[0], Some(IneligibleReason::NotPublic(Visibility::Private)));
        assert_eq!(reasons[1], Some(IneligibleReason::Static));
        assert_eq!(reasons[2], Some(IneligibleReason::Deprecated));
        assert_eq!(reasons[3], Some(IneligibleReason::VoidReturn));
        assert_eq!(reasons[4], Some(IneligibleReason::PrimitiveReturn));
        assert!(matches!(
            &result.outcomes[5],
            MethodOutcome::NestedAccessor { client, .. } if client == "IndicesClient"
        ));
        assert_eq!(reasons[6], Some(IneligibleReason::FilteredClient));
        assert_eq!(result.nested_clients(), vec!["IndicesClient"]);

        let private_note = &result.diagnostics[0];
        assert!(!private_note.is_warning());
        assert_eq!(private_note.location.as_ref().unwrap().position.line, 2);
    }

    #[test]
    fn test_primitive_returns_when_allowed() {
        let (unit, tree) = parse(
            "public class Client {
                public boolean exists(GetRequest r, RequestOptions o) { return true; }
                public Cancellable existsAsync(GetRequest r, RequestOptions o, ActionListener<Boolean> l) { return null; }
            }",
        );
        let config = AnalyzerConfig::rest_client();
        let result = Classifier::new(&config).classify(&unit, &tree.types[0]);
        assert_eq!(
            names(&result),
            vec![(
                "exists(GetRequest, RequestOptions)".to_string(),
                Some("existsAsync".to_string())
            )]
        );
    }

    #[test]
    fn test_overloads_pair_independently() {
        let (unit, tree) = parse(
            "public class Client {
                public Response bulk(BulkRequest r, RequestOptions o) { return null; }
                public Response bulk(String body, RequestOptions o) { return null; }
                public Cancellable bulkAsync(BulkRequest r, RequestOptions o, ActionListener<Response> l) { return null; }
                public Cancellable bulkAsync(String body, RequestOptions o, ActionListener<Response> l) { return null; }
            }",
        );
        let config = AnalyzerConfig::default();
        let result = Classifier::new(&config).classify(&unit, &tree.types[0]);
        let pairs: Vec<_> = result.pairings().collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].counterpart.unwrap().index, 2);
        assert_eq!(pairs[1].counterpart.unwrap().index, 3);
    }

    #[test]
    fn test_uncallable_counterparts_are_not_paired() {
        let (unit, tree) = parse(
            "public class Client {
                public GetResponse get(GetRequest r) { return null; }
                private void getAsync(GetRequest r, ActionListener<GetResponse> l) {}
                public Info info(Options o) { return null; }
                public static void infoAsync(Options o, ActionListener<Info> l) {}
                public Stats stats() { return null; }
                @Deprecated public void statsAsync(ActionListener<Stats> l) {}
            }",
        );
        let config = AnalyzerConfig::default();
        let result = Classifier::new(&config).classify(&unit, &tree.types[0]);

        assert_eq!(
            names(&result),
            vec![
                ("get(GetRequest)".to_string(), None),
                ("info(Options)".to_string(), None),
                ("stats()".to_string(), None),
            ]
        );
        let messages: Vec<&str> = result
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::NoCounterpart)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("`getAsync(GetRequest, ActionListener<GetResponse>)`"));
        assert!(messages.iter().all(|m| m.contains("not a public instance method")));
        // The uncallable variants themselves are never wrapped.
        assert!(matches!(result.outcomes[1], MethodOutcome::Asynchronous(_)));
    }
}
