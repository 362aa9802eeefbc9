//! Analyzer configuration.

/// What to do with an eligible method that has no asynchronous counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Skip it and emit a warning.
    Skip,
    /// Wrap the synchronous call in the runtime's `executeBlocking`.
    ExecuteBlocking,
}

/// Result shape of generated methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncIdiom {
    /// `Future<R> getAsync(...)`
    Future,
    /// `void getAsync(..., Handler<AsyncResult<R>> handler)`
    Callback,
}

/// Classification and mapping rules.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Suffix marking asynchronous variants (`getAsync`).
    pub async_suffix: String,
    /// Simple-name suffixes of completion-callback types.
    pub callback_suffixes: Vec<String>,
    /// Wrap methods returning primitives (boxed in the container).
    pub allow_primitive_returns: bool,
    /// Policy for eligible methods without counterpart.
    pub fallback: FallbackPolicy,
    pub idiom: AsyncIdiom,
    /// Simple-name suffix of nested client types (`IndicesClient`).
    pub client_suffix: String,
    /// Client types never treated as nested clients.
    pub filtered_clients: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            async_suffix: "Async".to_string(),
            callback_suffixes: vec!["Listener".to_string(), "Callback".to_string()],
            allow_primitive_returns: false,
            fallback: FallbackPolicy::Skip,
            idiom: AsyncIdiom::Future,
            client_suffix: "Client".to_string(),
            filtered_clients: vec!["RestClient".to_string(), "MigrationClient".to_string()],
        }
    }
}

impl AnalyzerConfig {
    /// Rules for a high-level REST client whose `exists`/`ping` return `boolean`.
    pub fn rest_client() -> Self {
        Self {
            allow_primitive_returns: true,
            ..Default::default()
        }
    }

    /// Handler-based shims instead of futures.
    pub fn callbacks() -> Self {
        Self {
            idiom: AsyncIdiom::Callback,
            ..Self::rest_client()
        }
    }

    /// Method name with the async suffix removed, if something remains.
    pub fn base_name<'n>(&self, name: &'n str) -> &'n str {
        match name.strip_suffix(self.async_suffix.as_str()) {
            Some(base) if !base.is_empty() && !self.async_suffix.is_empty() => base,
            _ => name,
        }
    }

    /// Whether a simple type name has the completion-callback shape.
    pub fn is_callback_name(&self, simple_name: &str) -> bool {
        self.callback_suffixes
            .iter()
            .any(|suffix| !suffix.is_empty() && simple_name.ends_with(suffix.as_str()))
    }

    /// Whether a simple type name denotes a nested client worth following.
    pub fn is_nested_client_name(&self, simple_name: &str) -> bool {
        !self.client_suffix.is_empty()
            && simple_name.ends_with(self.client_suffix.as_str())
            && !self.filtered_clients.iter().any(|f| f == simple_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_presets() {
        let default = AnalyzerConfig::default();
        assert!(!default.allow_primitive_returns);
        assert_eq!(default.fallback, FallbackPolicy::Skip);

        let rest = AnalyzerConfig::rest_client();
        assert!(rest.allow_primitive_returns);

        let callbacks = AnalyzerConfig::callbacks();
        assert_eq!(callbacks.idiom, AsyncIdiom::Callback);
    }

    #[test]
    fn test_base_name() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.base_name("getAsync"), "get");
        assert_eq!(config.base_name("get"), "get");
        assert_eq!(config.base_name("Async"), "Async");
    }

    #[test]
    fn test_name_shapes() {
        let config = AnalyzerConfig::default();
        assert!(config.is_callback_name("ActionListener"));
        assert!(config.is_callback_name("Callback"));
        assert!(!config.is_callback_name("RequestOptions"));

        assert!(config.is_nested_client_name("IndicesClient"));
        assert!(!config.is_nested_client_name("RestClient"));
        assert!(!config.is_nested_client_name("ClientOptions"));
    }
}
