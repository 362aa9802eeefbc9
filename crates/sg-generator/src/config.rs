//! Run configuration.

use sg_analyzer::AnalyzerConfig;
use sg_emitter::EmitterConfig;

/// Package the reactiverse OpenSearch wrapper is generated into.
pub const DEFAULT_NAMESPACE: &str = "io.reactiverse.opensearch.client";

/// Everything a run needs besides its input and output paths.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Package of the generated classes.
    pub namespace: String,
    pub analyzer: AnalyzerConfig,
    pub emitter: EmitterConfig,
    /// Also generate shims for nested clients found next to the input.
    pub follow_nested_clients: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            analyzer: AnalyzerConfig::default(),
            emitter: EmitterConfig::default(),
            follow_nested_clients: true,
        }
    }
}

impl GeneratorConfig {
    /// Rules for a high-level REST client, generated into `namespace`.
    pub fn rest_client(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            analyzer: AnalyzerConfig::rest_client(),
            ..Default::default()
        }
    }

    /// Only the input class; nested accessors are left out.
    pub fn single_class(namespace: impl Into<String>) -> Self {
        Self {
            follow_nested_clients: false,
            ..Self::rest_client(namespace)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_config_presets() {
        let default = GeneratorConfig::default();
        assert_eq!(default.namespace, DEFAULT_NAMESPACE);
        assert!(default.follow_nested_clients);

        let rest = GeneratorConfig::rest_client("io.example.shim");
        assert_eq!(rest.namespace, "io.example.shim");
        assert!(rest.analyzer.allow_primitive_returns);

        assert!(!GeneratorConfig::single_class("io.example.shim").follow_nested_clients);
    }
}
