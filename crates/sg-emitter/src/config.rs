//! Emitter configuration.

/// Layout and runtime names used when rendering shims.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// One indentation level.
    pub indent: String,
    /// Lines of the block comment opening every generated file.
    pub header: Vec<String>,
    /// Package of the runtime types (`Vertx`, `Future`, ...).
    pub runtime_package: String,
    /// Success method of the delegate's callback type.
    pub success_method: String,
    /// Failure method of the delegate's callback type.
    pub failure_method: String,
    /// Parameter type of `failure_method`.
    pub failure_type: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            header: vec![
                "[NOTE] This is an automatically generated file.".to_string(),
                "       Do not make changes to this file but to the shim code generator."
                    .to_string(),
            ],
            runtime_package: "io.vertx.core".to_string(),
            success_method: "onResponse".to_string(),
            failure_method: "onFailure".to_string(),
            failure_type: "Exception".to_string(),
        }
    }
}

impl EmitterConfig {
    /// Two-space layout, as used by Google-style Java code bases.
    pub fn compact() -> Self {
        Self {
            indent: "  ".to_string(),
            ..Default::default()
        }
    }
}
