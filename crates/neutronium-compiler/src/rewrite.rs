//! String-level rewriting of module specifiers in generated code.
//!
//! Runs after code generation, so only the quoting styles the code
//! generator emits need to be handled, plus single quotes for safety.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Published name of the runtime package.
pub const RUNTIME_PACKAGE: &str = "neutronium";

/// `from "neutronium"`, `import "neutronium"` and `import("neutronium")`.
static RUNTIME_SPECIFIER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(\b(?:from|import)\s*\(?\s*)["']neutronium["']"#).ok()
});

/// Relative specifiers ending in a source extension other than `.js`.
static RELATIVE_SOURCE_SPECIFIER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(\b(?:from|import)\s*\(?\s*)(["'])(\.{1,2}/[^"'\n]*?)\.(?:jsx|tsx|ts|mjs)(["'])"#).ok()
});

/// Point every import of the runtime package at `specifier`.
pub fn rewrite_runtime_specifiers(code: &str, specifier: &str) -> String {
    let Some(re) = RUNTIME_SPECIFIER.as_ref() else {
        return code.to_string();
    };
    re.replace_all(code, |caps: &Captures<'_>| {
        format!("{}\"{}\"", &caps[1], specifier)
    })
    .into_owned()
}

/// Retarget relative imports of sibling sources at their `.js` outputs.
pub fn rewrite_relative_extensions(code: &str) -> String {
    let Some(re) = RELATIVE_SOURCE_SPECIFIER.as_ref() else {
        return code.to_string();
    };
    re.replace_all(code, |caps: &Captures<'_>| {
        format!("{}{}{}.js{}", &caps[1], &caps[2], &caps[3], &caps[4])
    })
    .into_owned()
}
