//! JSX lowering and runtime import injection.
//!
//! Each source file goes through the same pipeline:
//!
//! 1. Parse with oxc using the source type implied by the extension.
//! 2. Lower JSX to classic-runtime factory calls (`_neutronium.h(...)`),
//!    stripping TypeScript syntax along the way.
//! 3. Generate code, then rewrite runtime and relative specifiers.
//! 4. Prepend the runtime namespace import when the source lacks one.
//! 5. For the entry module, append the mount bootstrap if requested.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, Declaration, ExportDefaultDeclarationKind, Program, Statement,
};
use oxc_codegen::Codegen;
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{JsxOptions, JsxRuntime, TransformOptions, Transformer};

use crate::error::TransformError;
use crate::rewrite::{rewrite_relative_extensions, rewrite_runtime_specifiers};

/// Default element factory.
pub const DEFAULT_PRAGMA: &str = "_neutronium.h";

/// Default fragment factory.
pub const DEFAULT_PRAGMA_FRAG: &str = "_neutronium.Fragment";

/// Name of the root component the mount bootstrap looks for.
const APP_COMPONENT: &str = "App";

/// Options shared by every file in a build pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformerOptions {
    pub pragma: String,
    pub pragma_frag: String,
    /// Append `createApp(App).mount("#app")` to the entry module.
    pub auto_mount: bool,
}

impl Default for TransformerOptions {
    fn default() -> Self {
        Self {
            pragma: DEFAULT_PRAGMA.to_string(),
            pragma_frag: DEFAULT_PRAGMA_FRAG.to_string(),
            auto_mount: true,
        }
    }
}

/// Per-file inputs to [`SourceTransformer::transform`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    /// Resolved runtime specifier for this output file.
    pub runtime_specifier: &'a str,
    /// Whether this file is the manifest's entry.
    pub is_entry: bool,
}

/// Result of transforming one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub code: String,
    /// Whether the runtime namespace import was prepended.
    pub injected_runtime_import: bool,
    /// Whether the mount bootstrap was appended.
    pub mounted: bool,
}

/// Lowers JSX sources into plain ES modules that import the runtime.
#[derive(Debug, Clone, Default)]
pub struct SourceTransformer {
    options: TransformerOptions,
}

impl SourceTransformer {
    pub fn new(options: TransformerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformerOptions {
        &self.options
    }

    /// Namespace binding the factories hang off (`_neutronium`).
    pub fn namespace(&self) -> &str {
        pragma_namespace(&self.options.pragma)
    }

    /// Transform `source`, read from `path`, into an ES module.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the source does not parse or the JSX
    /// cannot be lowered. No other file is affected.
    pub fn transform(
        &self,
        source: &str,
        path: &Path,
        ctx: &ModuleContext<'_>,
    ) -> Result<Transformed, TransformError> {
        let allocator = Allocator::default();
        let source_type = source_type_for(path);

        let ParserReturn {
            mut program,
            errors,
            panicked,
            ..
        } = Parser::new(&allocator, source, source_type).parse();

        if panicked || !errors.is_empty() {
            return Err(TransformError::Parse {
                path: path.to_path_buf(),
                diagnostics: errors.iter().map(|err| err.to_string()).collect(),
            });
        }

        let declares_app = declares_top_level(&program, APP_COMPONENT);

        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();

        let options = TransformOptions {
            jsx: JsxOptions {
                runtime: JsxRuntime::Classic,
                pragma: Some(self.options.pragma.clone()),
                pragma_frag: Some(self.options.pragma_frag.clone()),
                ..JsxOptions::default()
            },
            ..TransformOptions::default()
        };

        let lowered = Transformer::new(&allocator, path, &options)
            .build_with_scoping(scoping, &mut program);

        if !lowered.errors.is_empty() {
            return Err(TransformError::Lower {
                path: path.to_path_buf(),
                diagnostics: lowered.errors.iter().map(|err| err.to_string()).collect(),
            });
        }

        let generated = Codegen::new().build(&program).code;
        let generated = rewrite_runtime_specifiers(&generated, ctx.runtime_specifier);
        let mut code = rewrite_relative_extensions(&generated);

        let namespace = self.namespace();
        let injected_runtime_import = !source.contains(&format!("* as {namespace}"));
        if injected_runtime_import {
            code = format!(
                "import * as {namespace} from \"{}\";\n{code}",
                ctx.runtime_specifier
            );
        }

        let mounted = ctx.is_entry
            && self.options.auto_mount
            && declares_app
            && !source.contains("createApp(");
        if mounted {
            if !code.ends_with('\n') {
                code.push('\n');
            }
            code.push_str(&format!(
                "{namespace}.createApp({APP_COMPONENT}).mount(\"#app\");\n"
            ));
        }

        Ok(Transformed {
            code,
            injected_runtime_import,
            mounted,
        })
    }
}

/// Namespace part of a pragma: `_neutronium.h` -> `_neutronium`.
pub fn pragma_namespace(pragma: &str) -> &str {
    pragma.split('.').next().unwrap_or(pragma)
}

fn source_type_for(path: &Path) -> SourceType {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ts") => SourceType::ts(),
        Some("tsx") => SourceType::tsx(),
        // Plain .js and .mjs sources may contain JSX too.
        _ => SourceType::jsx(),
    }
}

fn declares_top_level(program: &Program<'_>, name: &str) -> bool {
    program.body.iter().any(|statement| match statement {
        Statement::FunctionDeclaration(func) => is_named(func.id.as_ref(), name),
        Statement::ClassDeclaration(class) => is_named(class.id.as_ref(), name),
        Statement::VariableDeclaration(decl) => decl.declarations.iter().any(|declarator| {
            declarator
                .id
                .get_binding_identifier()
                .is_some_and(|id| id.name.as_str() == name)
        }),
        Statement::ExportNamedDeclaration(export) => export
            .declaration
            .as_ref()
            .is_some_and(|decl| declaration_binds(decl, name)),
        Statement::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                is_named(func.id.as_ref(), name)
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                is_named(class.id.as_ref(), name)
            }
            _ => false,
        },
        _ => false,
    })
}

fn declaration_binds(decl: &Declaration<'_>, name: &str) -> bool {
    match decl {
        Declaration::FunctionDeclaration(func) => is_named(func.id.as_ref(), name),
        Declaration::ClassDeclaration(class) => is_named(class.id.as_ref(), name),
        Declaration::VariableDeclaration(var) => var.declarations.iter().any(|declarator| {
            declarator
                .id
                .get_binding_identifier()
                .is_some_and(|id| id.name.as_str() == name)
        }),
        _ => false,
    }
}

fn is_named(id: Option<&BindingIdentifier<'_>>, name: &str) -> bool {
    id.is_some_and(|id| id.name.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNTIME: &str = "../node_modules/neutronium/src/index.js";

    fn transform(source: &str, file: &str, is_entry: bool) -> Result<Transformed, TransformError> {
        SourceTransformer::default().transform(
            source,
            Path::new(file),
            &ModuleContext {
                runtime_specifier: RUNTIME,
                is_entry,
            },
        )
    }

    #[test]
    fn test_lowers_element_to_factory_call() {
        let out = transform("const el = <h1>Hello</h1>;", "App.js", false).unwrap();
        assert!(out.code.contains("_neutronium.h("));
        assert!(out.code.contains("\"h1\""));
        assert!(out.code.contains("\"Hello\""));
    }

    #[test]
    fn test_preserves_attribute_and_child_order() {
        let out = transform(
            "const el = <div id=\"a\" title=\"b\"><span>one</span><em>two</em></div>;",
            "App.jsx",
            false,
        )
        .unwrap();
        let id = out.code.find("id:").unwrap();
        let title = out.code.find("title:").unwrap();
        let one = out.code.find("\"one\"").unwrap();
        let two = out.code.find("\"two\"").unwrap();
        assert!(id < title);
        assert!(one < two);
    }

    #[test]
    fn test_fragment_uses_fragment_factory() {
        let out = transform("const el = <><p>a</p></>;", "App.js", false).unwrap();
        assert!(out.code.contains("_neutronium.Fragment"));
    }

    #[test]
    fn test_prepends_runtime_import_once() {
        let out = transform("const el = <p />;", "App.js", false).unwrap();
        assert!(out.injected_runtime_import);
        assert!(out.code.starts_with(&format!(
            "import * as _neutronium from \"{RUNTIME}\";"
        )));

        let existing = transform(
            "import * as _neutronium from 'neutronium';\nconst el = <p />;",
            "App.js",
            false,
        )
        .unwrap();
        assert!(!existing.injected_runtime_import);
        assert_eq!(existing.code.matches("* as _neutronium").count(), 1);
        assert!(existing.code.contains(RUNTIME));
    }

    #[test]
    fn test_rewrites_named_runtime_imports() {
        let out = transform(
            "import { createApp } from \"neutronium\";\nexport const x = createApp;",
            "main.js",
            false,
        )
        .unwrap();
        assert!(!out.code.contains("from \"neutronium\""));
        assert!(out.code.contains(&format!("from \"{RUNTIME}\"")));
    }

    #[test]
    fn test_strips_typescript() {
        let out = transform(
            "interface Props { label: string }\nexport function Button(props: Props) { return <button>{props.label}</button>; }",
            "Button.tsx",
            false,
        )
        .unwrap();
        assert!(!out.code.contains("interface"));
        assert!(out.code.contains("_neutronium.h("));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = transform("const el = <h1>Hello</h2>;", "Broken.js", false).unwrap_err();
        assert!(matches!(err, TransformError::Parse { .. }));
        assert_eq!(err.path(), &std::path::PathBuf::from("Broken.js"));
    }

    #[test]
    fn test_entry_gets_mount_bootstrap() {
        let out = transform("function App() { return <h1>Hi</h1>; }", "App.js", true).unwrap();
        assert!(out.mounted);
        assert!(out
            .code
            .trim_end()
            .ends_with("_neutronium.createApp(App).mount(\"#app\");"));
    }

    #[test]
    fn test_mount_detects_every_app_declaration_form() {
        let forms = [
            "export default function App() { return <h1>Hi</h1>; }",
            "export function App() { return <h1>Hi</h1>; }",
            "class App { render() { return <h1>Hi</h1>; } }",
            "export const App = () => <h1>Hi</h1>;",
        ];
        for form in forms {
            assert!(transform(form, "App.jsx", true).unwrap().mounted, "{form}");
        }

        let other = "function Apps() { return <h1>Hi</h1>; }";
        assert!(!transform(other, "App.jsx", true).unwrap().mounted);
    }

    #[test]
    fn test_no_mount_when_not_entry_or_already_mounted() {
        let component = "export default function App() { return <h1>Hi</h1>; }";
        assert!(!transform(component, "App.js", false).unwrap().mounted);

        let mounted =
            "function App() { return <h1>Hi</h1>; }\n_neutronium.createApp(App).mount('#app');";
        assert!(!transform(mounted, "App.js", true).unwrap().mounted);

        let no_app = "const el = <h1>Hello</h1>;";
        assert!(!transform(no_app, "App.js", true).unwrap().mounted);
    }

    #[test]
    fn test_custom_pragma() {
        let transformer = SourceTransformer::new(TransformerOptions {
            pragma: "N.el".to_string(),
            pragma_frag: "N.Frag".to_string(),
            auto_mount: false,
        });
        let out = transformer
            .transform(
                "const el = <><b /></>;",
                Path::new("App.js"),
                &ModuleContext {
                    runtime_specifier: RUNTIME,
                    is_entry: true,
                },
            )
            .unwrap();
        assert_eq!(transformer.namespace(), "N");
        assert!(out.code.contains("N.el("));
        assert!(out.code.contains("N.Frag"));
        assert!(out.code.starts_with("import * as N from"));
    }

    #[test]
    fn test_pragma_namespace() {
        assert_eq!(pragma_namespace("_neutronium.h"), "_neutronium");
        assert_eq!(pragma_namespace("h"), "h");
    }
}
