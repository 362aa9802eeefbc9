//! Maps a method pairing onto the description of one generated method.

use sg_core::{
    ClassDeclaration, DelegationTemplate, MethodDeclaration, MethodPairing, MethodSignature,
    ResultShape, ShimSpec, TypeRef, WildcardBound,
};

use crate::config::{AnalyzerConfig, AsyncIdiom, FallbackPolicy};

/// Errors building a shim for a single pairing. The method is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmissionError {
    #[error("cannot delegate {origin}: {detail}")]
    TemplateMismatch { origin: MethodSignature, detail: String },

    #[error("{origin} would generate {target}, which is already generated")]
    DuplicateTarget {
        origin: MethodSignature,
        target: MethodSignature,
    },
}

impl EmissionError {
    pub fn origin(&self) -> &MethodSignature {
        match self {
            EmissionError::TemplateMismatch { origin, .. }
            | EmissionError::DuplicateTarget { origin, .. } => origin,
        }
    }
}

/// Builds [`ShimSpec`]s for the pairings of one class.
pub struct SignatureMapper<'c> {
    config: &'c AnalyzerConfig,
    class: &'c ClassDeclaration,
    /// Qualified name of `class`, prefixed to its member types.
    qualified_name: String,
}

impl<'c> SignatureMapper<'c> {
    pub fn new(
        config: &'c AnalyzerConfig,
        class: &'c ClassDeclaration,
        qualified_name: impl Into<String>,
    ) -> Self {
        Self {
            config,
            class,
            qualified_name: qualified_name.into(),
        }
    }

    pub fn map(&self, pairing: &MethodPairing<'_>) -> Result<ShimSpec, EmissionError> {
        let candidate = pairing.candidate;
        let value = self.qualify(&candidate.return_type.boxed());

        let (target_name, delegation) = match pairing.counterpart {
            Some(counterpart) => (
                counterpart.name.clone(),
                self.counterpart_template(candidate, counterpart, &value)?,
            ),
            None => match self.config.fallback {
                FallbackPolicy::ExecuteBlocking => (
                    format!("{}{}", candidate.name, self.config.async_suffix),
                    DelegationTemplate::BackgroundDispatch {
                        method: candidate.name.clone(),
                        arguments: candidate.params.iter().map(|p| p.name.clone()).collect(),
                    },
                ),
                FallbackPolicy::Skip => {
                    return Err(EmissionError::TemplateMismatch {
                        origin: candidate.signature(),
                        detail: "no counterpart and background dispatch is disabled".to_string(),
                    })
                }
            },
        };

        let params = candidate
            .params
            .iter()
            .map(|p| {
                let mut param = p.clone();
                param.ty = self.qualify(&p.ty);
                param
            })
            .collect();

        let result = match self.config.idiom {
            AsyncIdiom::Future => ResultShape::Future { value },
            AsyncIdiom::Callback => ResultShape::Callback { value },
        };

        Ok(ShimSpec {
            target_name,
            params,
            result,
            delegation,
            type_params: candidate.type_params.clone(),
            doc: self.doc_lines(candidate),
            origin: candidate.signature(),
            origin_index: candidate.index,
        })
    }

    fn counterpart_template(
        &self,
        candidate: &MethodDeclaration,
        counterpart: &MethodDeclaration,
        value: &TypeRef,
    ) -> Result<DelegationTemplate, EmissionError> {
        let mismatch = |detail: String| EmissionError::TemplateMismatch {
            origin: candidate.signature(),
            detail,
        };

        if counterpart.params.len() != candidate.params.len() + 1 {
            return Err(mismatch(format!(
                "`{}` takes {} parameters, expected {}",
                counterpart.signature(),
                counterpart.params.len(),
                candidate.params.len() + 1
            )));
        }
        for (i, (c, a)) in candidate.params.iter().zip(&counterpart.params).enumerate() {
            if c.signature_type() != a.signature_type() {
                return Err(mismatch(format!(
                    "parameter {} is `{}` here but `{}` on `{}`",
                    i + 1,
                    c.declared_type(),
                    a.declared_type(),
                    counterpart.name
                )));
            }
        }

        let callback = match counterpart.last_param() {
            Some(param) => &param.ty,
            None => return Err(mismatch("counterpart has no callback parameter".to_string())),
        };
        let (name, arg) = match callback {
            TypeRef::Class { name, args } if args.len() == 1 => (name, &args[0]),
            _ => {
                return Err(mismatch(format!(
                    "callback type `{}` does not carry a single result type",
                    callback
                )))
            }
        };
        let raw_value = candidate.return_type.boxed();
        let compatible = match arg {
            TypeRef::Wildcard(None) => true,
            TypeRef::Wildcard(Some(WildcardBound::Super(t) | WildcardBound::Extends(t))) => {
                same_type(t, &raw_value)
            }
            other => same_type(other, &raw_value),
        };
        if !compatible {
            return Err(mismatch(format!(
                "callback `{}` does not receive `{}`",
                callback, raw_value
            )));
        }

        Ok(DelegationTemplate::Counterpart {
            method: counterpart.name.clone(),
            // Anonymous implementations cannot be instantiated with wildcards.
            callback: self.qualify(&TypeRef::generic(name.clone(), vec![value.clone()])),
            arguments: candidate.params.iter().map(|p| p.name.clone()).collect(),
        })
    }

    /// Prefix member types of the client with its qualified name.
    fn qualify(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Class { name, args } => {
                let head = name.split('.').next().unwrap_or(name);
                let name = if self.class.nested_types.iter().any(|n| n == head) {
                    format!("{}.{}", self.qualified_name, name)
                } else {
                    name.clone()
                };
                TypeRef::generic(name, args.iter().map(|a| self.qualify(a)).collect())
            }
            TypeRef::Array(inner) => TypeRef::Array(Box::new(self.qualify(inner))),
            TypeRef::Wildcard(Some(WildcardBound::Extends(t))) => {
                TypeRef::Wildcard(Some(WildcardBound::Extends(Box::new(self.qualify(t)))))
            }
            TypeRef::Wildcard(Some(WildcardBound::Super(t))) => {
                TypeRef::Wildcard(Some(WildcardBound::Super(Box::new(self.qualify(t)))))
            }
            other => other.clone(),
        }
    }

    fn doc_lines(&self, candidate: &MethodDeclaration) -> Vec<String> {
        let mut lines: Vec<String> = candidate
            .doc
            .as_deref()
            .map(|d| d.lines().map(|l| l.trim_end().to_string()).collect())
            .unwrap_or_default();
        while lines.last().map_or(false, |l| l.is_empty()) {
            lines.pop();
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }

        let erased: Vec<String> = candidate
            .params
            .iter()
            .map(|p| self.qualify(&p.signature_type().erased()).to_string())
            .collect();
        lines.push(format!(
            "Asynchronous variant of {{@link {}#{}({})}}.",
            self.qualified_name,
            candidate.name,
            erased.join(", ")
        ));
        if candidate.throws.is_empty() {
            lines.push(
                "Exceptions thrown by the delegate fail the result instead of propagating."
                    .to_string(),
            );
        } else {
            let declared: Vec<String> = candidate
                .throws
                .iter()
                .map(|t| format!("{{@code {}}}", self.qualify(t)))
                .collect();
            lines.push(format!(
                "Failures of the delegate ({}) fail the result instead of propagating.",
                declared.join(", ")
            ));
        }
        lines
    }
}

/// Type equality that ignores an explicit `java.lang.` prefix.
fn same_type(a: &TypeRef, b: &TypeRef) -> bool {
    fn normalized(ty: &TypeRef) -> String {
        ty.to_string().replace("java.lang.", "")
    }
    a == b || normalized(a) == normalized(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::{CompilationUnit, SourceParser, SourceUnit};
    use sg_parser::JavaSourceParser;

    fn parse(source: &str) -> CompilationUnit {
        let unit = SourceUnit::new("Client.java", source);
        JavaSourceParser::new().parse(&unit).unwrap()
    }

    fn pair<'a>(
        class: &'a ClassDeclaration,
        candidate: usize,
        counterpart: usize,
    ) -> MethodPairing<'a> {
        MethodPairing::paired(&class.methods[candidate], &class.methods[counterpart])
    }

    #[test]
    fn test_map_counterpart() {
        let tree = parse(
            "package org.example;
            public class Client {
                /** Fetches a document. */
                public GetResponse get(GetRequest request, RequestOptions options)
                        throws IOException, TimeoutException { return null; }
                public Cancellable getAsync(GetRequest request, RequestOptions options, ActionListener<GetResponse> listener) { return null; }
            }",
        );
        let class = &tree.types[0];
        let config = AnalyzerConfig::default();
        let mapper = SignatureMapper::new(&config, class, "org.example.Client");
        let spec = mapper.map(&pair(class, 0, 1)).unwrap();

        assert_eq!(spec.target_name, "getAsync");
        assert_eq!(spec.target_signature().to_string(), "getAsync(GetRequest, RequestOptions)");
        assert_eq!(spec.result, ResultShape::Future { value: TypeRef::class("GetResponse") });
        assert_eq!(
            spec.delegation,
            DelegationTemplate::Counterpart {
                method: "getAsync".into(),
                callback: TypeRef::generic("ActionListener", vec![TypeRef::class("GetResponse")]),
                arguments: vec!["request".into(), "options".into()],
            }
        );
        assert_eq!(spec.doc[0], "Fetches a document.");
        assert!(spec.doc[2].contains("{@link org.example.Client#get(GetRequest, RequestOptions)}"));
        assert_eq!(
            spec.doc[3],
            "Failures of the delegate ({@code IOException}, {@code TimeoutException}) \
             fail the result instead of propagating."
        );
    }

    #[test]
    fn test_boxes_primitive_and_accepts_wildcards() {
        let tree = parse(
            "public class Client {
                public boolean exists(GetRequest r) { return true; }
                public void existsAsync(GetRequest r, ActionListener<? super Boolean> l) {}
            }",
        );
        let class = &tree.types[0];
        let config = AnalyzerConfig::rest_client();
        let spec = SignatureMapper::new(&config, class, "Client")
            .map(&pair(class, 0, 1))
            .unwrap();
        assert_eq!(spec.result.value(), &TypeRef::class("Boolean"));
        match spec.delegation {
            DelegationTemplate::Counterpart { callback, .. } => {
                assert_eq!(callback.to_string(), "ActionListener<Boolean>")
            }
            other => panic!("unexpected delegation {:?}", other),
        }
    }

    #[test]
    fn test_incompatible_callback_is_rejected() {
        let tree = parse(
            "public class Client {
                public GetResponse get(GetRequest r) { return null; }
                public void getAsync(GetRequest r, ActionListener<SearchResponse> l) {}
                public void getAsync(GetRequest r, ResponseListener l) {}
            }",
        );
        let class = &tree.types[0];
        let config = AnalyzerConfig::default();
        let mapper = SignatureMapper::new(&config, class, "Client");

        let err = mapper.map(&pair(class, 0, 1)).unwrap_err();
        assert!(matches!(err, EmissionError::TemplateMismatch { .. }));
        assert!(err.to_string().contains("SearchResponse"));

        let err = mapper.map(&pair(class, 0, 2)).unwrap_err();
        assert!(err.to_string().contains("single result type"));
        assert_eq!(err.origin().name, "get");
    }

    #[test]
    fn test_leading_type_mismatch() {
        let tree = parse(
            "public class Client {
                public GetResponse get(GetRequest r) { return null; }
                public void getAsync(String r, ActionListener<GetResponse> l) {}
            }",
        );
        let class = &tree.types[0];
        let config = AnalyzerConfig::default();
        let err = SignatureMapper::new(&config, class, "Client")
            .map(&pair(class, 0, 1))
            .unwrap_err();
        assert!(err.to_string().contains("parameter 1"));
    }

    #[test]
    fn test_background_dispatch_fallback() {
        let tree = parse(
            "public class Client {
                public MainResponse info(RequestOptions options) { return null; }
            }",
        );
        let class = &tree.types[0];
        let config = AnalyzerConfig {
            fallback: FallbackPolicy::ExecuteBlocking,
            ..Default::default()
        };
        let spec = SignatureMapper::new(&config, class, "Client")
            .map(&MethodPairing::unpaired(&class.methods[0]))
            .unwrap();
        assert_eq!(spec.target_name, "infoAsync");
        assert_eq!(
            spec.delegation,
            DelegationTemplate::BackgroundDispatch {
                method: "info".into(),
                arguments: vec!["options".into()],
            }
        );

        let skip = AnalyzerConfig::default();
        assert!(SignatureMapper::new(&skip, class, "Client")
            .map(&MethodPairing::unpaired(&class.methods[0]))
            .is_err());
    }

    #[test]
    fn test_member_types_are_qualified() {
        let tree = parse(
            "package org.example;
            public class Client {
                public Result run(Options o) { return null; }
                public void runAsync(Options o, Callback<Result> c) {}
                public static class Result {}
                public static class Options {}
            }",
        );
        let class = &tree.types[0];
        let config = AnalyzerConfig::callbacks();
        let spec = SignatureMapper::new(&config, class, "org.example.Client")
            .map(&pair(class, 0, 1))
            .unwrap();
        assert_eq!(
            spec.result,
            ResultShape::Callback { value: TypeRef::class("org.example.Client.Result") }
        );
        assert_eq!(spec.params[0].ty.to_string(), "org.example.Client.Options");
        // Identity stays as declared.
        assert_eq!(spec.origin.to_string(), "run(Options)");
    }
}
