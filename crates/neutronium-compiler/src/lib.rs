//! # neutronium-compiler
//!
//! Compiles Neutronium JSX projects into plain ES modules a browser can load
//! directly, plus an `index.html` that boots the entry module.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neutronium_compiler::{BuildOptions, Builder};
//!
//! let report = Builder::new(BuildOptions::new("./my-app")).build()?;
//! println!("wrote {} files", report.files_written.len());
//! # Ok::<(), neutronium_compiler::BuildError>(())
//! ```
//!
//! ## Pipeline
//!
//! - [`manifest`] reads `package.json` for the entry, title and favicon
//! - [`source`] discovers `.js`/`.jsx`/`.mjs`/`.ts`/`.tsx` files
//! - [`transform`] lowers JSX to `_neutronium.h(...)` calls via oxc
//! - [`runtime`] decides where the runtime is imported from
//! - [`writer`] writes artifacts under the output directory
//! - [`html`] renders the entry document
//! - [`build`] ties it together with per-file failure isolation

pub mod build;
pub mod error;
pub mod html;
pub mod manifest;
pub mod rewrite;
pub mod runtime;
pub mod source;
pub mod transform;
pub mod typecheck;
pub mod writer;

pub use build::{BuildOptions, BuildReport, Builder, FileFailure, DEFAULT_OUT_DIR, INDEX_HTML};
pub use error::{BuildError, FileError, ManifestError, TransformError, WriteError};
pub use html::{FAVICON_ROUTE, RELOAD_MESSAGE, RELOAD_PATH};
pub use manifest::{MANIFEST_FILE, ProjectManifest};
pub use runtime::{DEFAULT_CDN_VERSION, RuntimeLocator, RuntimeMode};
pub use source::{SOURCE_EXTENSIONS, SourceFile, discover_sources, is_recognized};
pub use transform::{
    DEFAULT_PRAGMA, DEFAULT_PRAGMA_FRAG, ModuleContext, SourceTransformer, Transformed,
    TransformerOptions,
};
pub use typecheck::{DEFAULT_TYPE_CHECK_COMMAND, TSCONFIG_FILE, TypeCheck, TypeCheckOutcome};
pub use writer::OutputWriter;
