//! Renders a [`ClassPlan`] as one Java compilation unit.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use sg_core::{ClassPlan, DelegationTemplate, GeneratedUnit, NestedAccessor, ResultShape, ShimSpec};

use crate::builder::JavaSourceBuilder;
use crate::config::EmitterConfig;

const VERTX: &str = "Vertx";
const CONTEXT: &str = "Context";
const PROMISE: &str = "Promise";
const FUTURE: &str = "Future";
const HANDLER: &str = "Handler";
const ASYNC_RESULT: &str = "AsyncResult";

const RUNTIME_TYPES: [&str; 6] = [VERTX, CONTEXT, PROMISE, FUTURE, HANDLER, ASYNC_RESULT];

/// Pure text renderer; the same plan and namespace always yield the same bytes.
#[derive(Debug, Clone, Default)]
pub struct ShimEmitter {
    config: EmitterConfig,
}

impl ShimEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Path of the unit generated for `class_name`, relative to the output directory.
    pub fn relative_path(namespace: &str, class_name: &str) -> PathBuf {
        let mut path: PathBuf = namespace.split('.').filter(|s| !s.is_empty()).collect();
        path.push(format!("{}.java", class_name));
        path
    }

    pub fn emit(&self, plan: &ClassPlan, namespace: &str) -> GeneratedUnit {
        let mut builder = JavaSourceBuilder::new(self.config.indent.clone());

        builder.push_line("/*");
        for line in &self.config.header {
            builder.push_line(format!(" * {}", line).trim_end());
        }
        builder.push_line(" */");
        builder.blank_line();

        builder.push_line(&format!("package {};", namespace));
        builder.blank_line();

        for import in self.imports(plan, namespace) {
            builder.push_line(&format!("import {};", import));
        }
        builder.blank_line();

        self.render_class(&mut builder, plan);

        let text = builder.build();
        tracing::debug!(
            class = %plan.qualified_name,
            namespace,
            shims = plan.shims.len(),
            bytes = text.len(),
            text = %text,
            "rendered shim class"
        );

        GeneratedUnit {
            relative_path: Self::relative_path(namespace, &plan.class_name),
            text,
        }
    }

    /// Runtime types, the source package, then source imports that do not clash.
    fn imports(&self, plan: &ClassPlan, namespace: &str) -> BTreeSet<String> {
        let mut runtime = vec![VERTX];
        if !plan.shims.is_empty() {
            runtime.push(CONTEXT);
        }
        for shim in &plan.shims {
            if matches!(shim.delegation, DelegationTemplate::Counterpart { .. }) {
                runtime.push(PROMISE);
            }
            match shim.result {
                ResultShape::Future { .. } => runtime.push(FUTURE),
                ResultShape::Callback { .. } => {
                    runtime.push(HANDLER);
                    runtime.push(ASYNC_RESULT);
                }
            }
        }

        let mut imports: BTreeSet<String> = runtime
            .into_iter()
            .map(|name| format!("{}.{}", self.config.runtime_package, name))
            .collect();

        if let Some(package) = &plan.source_package {
            if package != namespace {
                imports.insert(format!("{}.*", package));
            }
        }

        let generated: HashSet<&str> = std::iter::once(plan.class_name.as_str())
            .chain(plan.accessors.iter().map(|a| a.client.as_str()))
            .collect();
        for import in &plan.source_imports {
            if import.is_static {
                continue;
            }
            if let Some(simple) = import.simple_name() {
                if RUNTIME_TYPES.contains(&simple) || generated.contains(simple) {
                    continue;
                }
            }
            imports.insert(import.to_string());
        }
        imports
    }

    fn render_class(&self, b: &mut JavaSourceBuilder, plan: &ClassPlan) {
        let type_params = if plan.class_type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", plan.class_type_params.join(", "))
        };
        let delegate_type = {
            let names = plan.type_param_names();
            if names.is_empty() {
                plan.qualified_name.clone()
            } else {
                format!("{}<{}>", plan.qualified_name, names.join(", "))
            }
        };

        b.doc_comment(&[format!(
            "Asynchronous shim over {{@link {}}}.",
            plan.qualified_name
        )]);
        b.open_block(&format!("public class {}{}", plan.class_name, type_params));
        b.push_line(&format!("private final {} vertx;", VERTX));
        b.push_line(&format!("private final {} delegate;", delegate_type));
        b.blank_line();

        b.open_block(&format!(
            "public {}({} vertx, {} delegate)",
            plan.class_name, VERTX, delegate_type
        ));
        b.push_line("this.vertx = vertx;");
        b.push_line("this.delegate = delegate;");
        b.close_block("");
        b.blank_line();

        b.open_block(&format!("public {} getDelegate()", delegate_type));
        b.push_line("return delegate;");
        b.close_block("");

        for accessor in &plan.accessors {
            b.blank_line();
            self.render_accessor(b, accessor);
        }

        let mut shims: Vec<&ShimSpec> = plan.shims.iter().collect();
        shims.sort_by_key(|s| s.origin_index);
        for shim in shims {
            b.blank_line();
            self.render_shim(b, shim);
        }

        b.close_block("");
    }

    fn render_accessor(&self, b: &mut JavaSourceBuilder, accessor: &NestedAccessor) {
        b.open_block(&format!("public {} {}()", accessor.client, accessor.method));
        b.push_line(&format!(
            "return new {}(vertx, delegate.{}());",
            accessor.client, accessor.method
        ));
        b.close_block("");
    }

    fn render_shim(&self, b: &mut JavaSourceBuilder, shim: &ShimSpec) {
        let mut names = FreshNames::new(shim.params.iter().map(|p| p.name.as_str()));
        let value = shim.result.value().to_string();

        // A trailing handler cannot follow varargs.
        let callback_idiom = matches!(shim.result, ResultShape::Callback { .. });
        let mut params: Vec<String> = shim
            .params
            .iter()
            .map(|p| {
                if callback_idiom {
                    format!("{} {}", p.signature_type(), p.name)
                } else {
                    format!("{} {}", p.declared_type(), p.name)
                }
            })
            .collect();
        let (return_type, handler) = match shim.result {
            ResultShape::Future { .. } => (format!("{}<{}>", FUTURE, value), None),
            ResultShape::Callback { .. } => {
                let handler = names.fresh("handler");
                params.push(format!("{}<{}<{}>> {}", HANDLER, ASYNC_RESULT, value, handler));
                ("void".to_string(), Some(handler))
            }
        };
        let type_params = if shim.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}> ", shim.type_params.join(", "))
        };

        b.doc_comment(&shim.doc);
        b.open_block(&format!(
            "public {}{} {}({})",
            type_params,
            return_type,
            shim.target_name,
            params.join(", ")
        ));

        let context = names.fresh("context");
        b.push_line(&format!("{} {} = this.vertx.getOrCreateContext();", CONTEXT, context));

        match &shim.delegation {
            DelegationTemplate::Counterpart {
                method,
                callback,
                arguments,
            } => {
                let promise = names.fresh("promise");
                let result = names.fresh("result");
                let failure = names.fresh("failure");
                let ignored = names.fresh("ignored");
                let thrown = names.fresh("thrown");

                b.push_line(&format!(
                    "{}<{}> {} = {}.promise();",
                    PROMISE, value, promise, PROMISE
                ));
                b.open_block("try");
                let mut args: Vec<String> = arguments.clone();
                args.push(format!("new {}()", callback));
                b.open_block(&format!("this.delegate.{}({}", method, args.join(", ")));
                b.push_line("@Override");
                b.open_block(&format!(
                    "public void {}({} {})",
                    self.config.success_method, value, result
                ));
                b.push_line(&format!(
                    "{}.runOnContext({} -> {}.tryComplete({}));",
                    context, ignored, promise, result
                ));
                b.close_block("");
                b.blank_line();
                b.push_line("@Override");
                b.open_block(&format!(
                    "public void {}({} {})",
                    self.config.failure_method, self.config.failure_type, failure
                ));
                b.push_line(&format!(
                    "{}.runOnContext({} -> {}.tryFail({}));",
                    context, ignored, promise, failure
                ));
                b.close_block("");
                b.close_block(");");
                b.dedent();
                b.open_block(&format!("}} catch ({} {})", self.config.failure_type, thrown));
                b.push_line(&format!("{}.tryFail({});", promise, thrown));
                b.close_block("");

                match handler {
                    Some(handler) => {
                        b.push_line(&format!("{}.future().onComplete({});", promise, handler))
                    }
                    None => b.push_line(&format!("return {}.future();", promise)),
                }
            }
            DelegationTemplate::BackgroundDispatch { method, arguments } => {
                let promise = names.fresh("promise");
                let thrown = names.fresh("thrown");
                let call = format!(
                    "{}.<{}>executeBlocking({} ->",
                    context, value, promise
                );
                match handler {
                    Some(_) => b.open_block(&call),
                    None => b.open_block(&format!("return {}", call)),
                }
                b.open_block("try");
                b.push_line(&format!(
                    "{}.complete(this.delegate.{}({}));",
                    promise,
                    method,
                    arguments.join(", ")
                ));
                b.dedent();
                b.open_block(&format!("}} catch ({} {})", self.config.failure_type, thrown));
                b.push_line(&format!("{}.fail({});", promise, thrown));
                b.close_block("");
                match handler {
                    Some(handler) => b.close_block(&format!(", false).onComplete({});", handler)),
                    None => b.close_block(", false);"),
                }
            }
        }

        b.close_block("");
    }
}

/// Local-variable names that do not collide with parameters or each other.
struct FreshNames {
    used: HashSet<String>,
}

impl FreshNames {
    fn new<'a>(taken: impl Iterator<Item = &'a str>) -> Self {
        let mut used: HashSet<String> = taken.map(str::to_string).collect();
        // Fields are always accessed through `this`, but keep them readable.
        used.insert("vertx".to_string());
        used.insert("delegate".to_string());
        Self { used }
    }

    fn fresh(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{}{}", base, n);
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_analyzer::{Analyzer, AnalyzerConfig, FallbackPolicy};
    use sg_core::{SourceParser, SourceUnit};
    use sg_parser::JavaSourceParser;

    const CLIENT: &str = "package org.example;

import java.io.IOException;
import org.example.action.ActionListener;
import java.util.concurrent.Future;

public class Client {
    /** Fetches a document. */
    public GetResponse get(GetRequest request, RequestOptions options) throws IOException { return null; }
    public Cancellable getAsync(GetRequest request, RequestOptions options, ActionListener<GetResponse> listener) { return null; }
    public IndicesClient indices() { return indices; }
    public boolean ping(RequestOptions options) { return true; }
}
";

    fn plan(config: AnalyzerConfig, source: &str) -> ClassPlan {
        let unit = SourceUnit::new("Client.java", source);
        let tree = JavaSourceParser::new().parse(&unit).unwrap();
        Analyzer::new(config).analyze(&unit, &tree, &tree.types[0]).plan
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            ShimEmitter::relative_path("io.example.shim", "Client"),
            PathBuf::from("io/example/shim/Client.java")
        );
    }

    #[test]
    fn test_emit_future_shim() {
        let plan = plan(AnalyzerConfig::rest_client(), CLIENT);
        let unit = ShimEmitter::default().emit(&plan, "io.example.shim");
        let text = &unit.text;

        assert!(text.starts_with("/*\n * [NOTE] This is an automatically generated file."));
        assert!(text.contains("package io.example.shim;\n"));
        assert!(text.contains("import io.vertx.core.Future;\n"));
        assert!(text.contains("import org.example.*;\n"));
        assert!(text.contains("import org.example.action.ActionListener;\n"));
        assert!(text.contains("import java.io.IOException;\n"));
        // Clashes with the runtime future.
        assert!(!text.contains("java.util.concurrent.Future"));
        assert!(!text.contains("io.vertx.core.Handler"));

        assert!(text.contains("public class Client {\n"));
        assert!(text.contains("    private final org.example.Client delegate;\n"));
        assert!(text.contains("    public Client(Vertx vertx, org.example.Client delegate) {\n"));
        assert!(text.contains("        return new IndicesClient(vertx, delegate.indices());\n"));
        assert!(text.contains(
            "    public Future<GetResponse> getAsync(GetRequest request, RequestOptions options) {\n"
        ));
        assert!(text.contains(
            "            this.delegate.getAsync(request, options, new ActionListener<GetResponse>() {\n"
        ));
        assert!(text.contains(
            "                    context.runOnContext(ignored -> promise.tryComplete(result));\n"
        ));
        assert!(text.contains("        } catch (Exception thrown) {\n"));
        assert!(text.contains("        return promise.future();\n"));
        assert!(text.contains("     * Fetches a document.\n"));
        // `ping` has no counterpart under the skip policy.
        assert!(!text.contains("pingAsync"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_emit_generic_client() {
        let plan = plan(
            AnalyzerConfig::default(),
            "package org.example;\npublic class Client<T extends Request, R> {}\n",
        );
        assert_eq!(plan.type_param_names(), vec!["T", "R"]);

        let text = ShimEmitter::default().emit(&plan, "io.example.shim").text;
        assert!(text.contains("public class Client<T extends Request, R> {\n"));
        assert!(text.contains("    private final org.example.Client<T, R> delegate;\n"));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let plan = plan(AnalyzerConfig::rest_client(), CLIENT);
        let emitter = ShimEmitter::default();
        let first = emitter.emit(&plan, "io.example.shim");
        let second = emitter.emit(&plan, "io.example.shim");
        assert_eq!(first, second);
    }

    #[test]
    fn test_emit_empty_class() {
        let plan = plan(AnalyzerConfig::default(), "package org.example;\npublic class Empty {}\n");
        let unit = ShimEmitter::default().emit(&plan, "io.example.shim");
        let imports: Vec<&str> = unit.text.lines().filter(|l| l.starts_with("import ")).collect();
        assert_eq!(imports, vec!["import io.vertx.core.Vertx;", "import org.example.*;"]);
        assert!(unit.text.contains("public class Empty {\n"));
        assert!(unit.text.contains("public org.example.Empty getDelegate()"));
        assert_eq!(unit.text.matches('{').count(), unit.text.matches('}').count());
    }

    #[test]
    fn test_emit_background_dispatch_with_callbacks() {
        let config = AnalyzerConfig {
            fallback: FallbackPolicy::ExecuteBlocking,
            ..AnalyzerConfig::callbacks()
        };
        let plan = plan(config, CLIENT);
        let unit = ShimEmitter::new(EmitterConfig::compact()).emit(&plan, "io.example.shim");
        let text = &unit.text;

        assert!(text.contains("import io.vertx.core.AsyncResult;\n"));
        assert!(text.contains("import io.vertx.core.Handler;\n"));
        assert!(text.contains(
            "  public void pingAsync(RequestOptions options, Handler<AsyncResult<Boolean>> handler) {\n"
        ));
        assert!(text.contains("    context.<Boolean>executeBlocking(promise -> {\n"));
        assert!(text.contains("        promise.complete(this.delegate.ping(options));\n"));
        assert!(text.contains("    }, false).onComplete(handler);\n"));
        assert!(text.contains("    promise.future().onComplete(handler);\n"));
        assert_eq!(text.matches('{').count(), text.matches('}').count());
    }

    #[test]
    fn test_internal_names_avoid_parameters() {
        let plan = plan(
            AnalyzerConfig::default(),
            "public class Client {
                public Info info(Options context, Options promise) { return null; }
                public void infoAsync(Options context, Options promise, ActionListener<Info> listener) {}
            }",
        );
        let text = ShimEmitter::default().emit(&plan, "shim").text;
        assert!(text.contains("Context context1 = this.vertx.getOrCreateContext();"));
        assert!(text.contains("Promise<Info> promise1 = Promise.promise();"));
        assert!(
            text.contains("this.delegate.infoAsync(context, promise, new ActionListener<Info>() {")
        );
    }
}
