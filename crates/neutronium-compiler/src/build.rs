//! Build orchestration.
//!
//! A build pass is a full, idempotent regeneration of the output directory:
//!
//! 1. Load `package.json` (fatal on failure).
//! 2. Run the optional type-check (advisory).
//! 3. Discover sources and resolve the entry (fatal if missing).
//! 4. Transform and write every source, isolating per-file failures.
//! 5. Write `index.html` referencing the entry output.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use path_clean::PathClean;

use crate::error::{BuildError, FileError, ReadError, Result};
use crate::html::{EntryDocument, render_entry_document};
use crate::manifest::ProjectManifest;
use crate::runtime::{DEFAULT_CDN_VERSION, RuntimeLocator, RuntimeMode};
use crate::source::{SourceFile, discover_sources, output_relative};
use crate::transform::{ModuleContext, SourceTransformer, TransformerOptions};
use crate::typecheck::{TypeCheck, TypeCheckOutcome};
use crate::writer::OutputWriter;

/// Default output directory, relative to the project root.
pub const DEFAULT_OUT_DIR: &str = "dist";

/// File name of the generated entry document.
pub const INDEX_HTML: &str = "index.html";

/// Everything a build pass needs to know.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub project_root: PathBuf,
    /// Output directory; relative paths resolve against `project_root`.
    pub out_dir: PathBuf,
    pub runtime: RuntimeMode,
    pub cdn_version: String,
    pub transformer: TransformerOptions,
    /// `None` disables the type-check step entirely.
    pub type_check: Option<TypeCheck>,
    /// Remove the output directory before writing.
    pub clean: bool,
    /// Embed the websocket reload listener in `index.html`.
    pub live_reload: bool,
}

impl BuildOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            runtime: RuntimeMode::default(),
            cdn_version: DEFAULT_CDN_VERSION.to_string(),
            transformer: TransformerOptions::default(),
            type_check: Some(TypeCheck::default()),
            clean: false,
            live_reload: false,
        }
    }

    /// Absolute, lexically normalized output directory.
    pub fn out_dir_path(&self) -> PathBuf {
        if self.out_dir.is_absolute() {
            self.out_dir.clean()
        } else {
            self.project_root.join(&self.out_dir).clean()
        }
    }
}

/// A source file that was left out of the build output.
#[derive(Debug)]
pub struct FileFailure {
    /// Source path relative to the project root.
    pub source: PathBuf,
    pub error: FileError,
}

/// Summary of a non-fatal build pass.
#[derive(Debug)]
pub struct BuildReport {
    /// Output paths written, relative to the output directory.
    pub files_written: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub type_check: TypeCheckOutcome,
    /// Output path of the entry module, relative to the output directory.
    pub entry_output: PathBuf,
    pub index_html: PathBuf,
    pub duration: Duration,
}

impl BuildReport {
    /// No per-file failures and no failed type-check.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.type_check.is_failure()
    }

    /// Per-file failures plus a failed type-check, if any.
    pub fn warning_count(&self) -> usize {
        self.failures.len() + usize::from(self.type_check.is_failure())
    }
}

/// Runs build passes for one project.
#[derive(Debug, Clone)]
pub struct Builder {
    options: BuildOptions,
    transformer: SourceTransformer,
}

impl Builder {
    pub fn new(options: BuildOptions) -> Self {
        let transformer = SourceTransformer::new(options.transformer.clone());
        Self {
            options,
            transformer,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Run one full build pass.
    ///
    /// # Errors
    ///
    /// Fails only when the manifest cannot be loaded, the entry is missing,
    /// or the output directory cannot be prepared. Per-file failures and
    /// type-check failures are recorded in the returned [`BuildReport`].
    pub fn build(&self) -> Result<BuildReport> {
        let start = Instant::now();
        let root = &self.options.project_root;
        let out_dir = self.options.out_dir_path();

        let manifest = ProjectManifest::load(root)?;

        let type_check = self.run_type_check(root);

        let sources = discover_sources(root, &out_dir);
        let entry = manifest.entry();
        if !sources.iter().any(|source| source.relative == entry) {
            return Err(BuildError::EntryNotFound {
                entry: manifest.entry_label().to_string(),
                root: root.clone(),
            });
        }

        if root.starts_with(&out_dir) {
            return Err(BuildError::UnsafeOutDir(out_dir));
        }

        let writer = OutputWriter::new(&out_dir);
        if self.options.clean {
            tracing::debug!("Cleaning {}", out_dir.display());
            writer.clean()?;
        }
        writer.ensure_dir(Path::new(""))?;

        let locator = RuntimeLocator::new(
            self.options.runtime,
            root.clone(),
            out_dir.clone(),
            self.options.cdn_version.clone(),
        );
        if let Some(runtime) = locator.install(&writer)? {
            tracing::debug!("Bundled runtime written to {}", runtime.display());
        }

        let owners = output_owners(&sources, &entry);
        let mut files_written = Vec::with_capacity(sources.len());
        let mut failures = Vec::new();

        for source in &sources {
            let output = source.output_relative();
            if let Some(owner) = owners.get(&output).filter(|owner| **owner != source.relative) {
                let error = FileError::OutputCollision {
                    source_path: source.relative.clone(),
                    output,
                    claimed_by: owner.clone(),
                };
                tracing::error!("{}", error);
                failures.push(FileFailure {
                    source: source.relative.clone(),
                    error,
                });
                continue;
            }

            let is_entry = source.relative == entry;
            match self.compile_file(source, is_entry, &locator, &writer) {
                Ok(output) => {
                    tracing::debug!("{} -> {}", source.relative.display(), output.display());
                    files_written.push(output);
                }
                Err(error) => {
                    tracing::error!("{}", error);
                    failures.push(FileFailure {
                        source: source.relative.clone(),
                        error,
                    });
                }
            }
        }

        let entry_output = output_relative(&entry);
        let script_src = format!("/{}", to_url_path(&entry_output));
        let html = render_entry_document(&EntryDocument {
            title: manifest.title(),
            script_src: &script_src,
            favicon: manifest.favicon_path(root).is_some(),
            live_reload: self.options.live_reload,
        });
        let index_html = writer.write(Path::new(INDEX_HTML), html)?;

        Ok(BuildReport {
            files_written,
            failures,
            type_check,
            entry_output,
            index_html,
            duration: start.elapsed(),
        })
    }

    fn run_type_check(&self, root: &Path) -> TypeCheckOutcome {
        let Some(check) = &self.options.type_check else {
            return TypeCheckOutcome::Skipped;
        };

        let outcome = check.run(root);
        match &outcome {
            TypeCheckOutcome::Skipped => {}
            TypeCheckOutcome::Passed => tracing::info!("Type-check passed"),
            TypeCheckOutcome::Failed { status, output } => {
                tracing::warn!(
                    "Type-check failed (exit code {}), continuing build",
                    status.map_or_else(|| "unknown".to_string(), |code| code.to_string())
                );
                if !output.is_empty() {
                    tracing::warn!("{}", output);
                }
            }
            TypeCheckOutcome::Unavailable { reason } => {
                tracing::warn!("Type-check skipped: {}", reason);
            }
        }
        outcome
    }

    fn compile_file(
        &self,
        source: &SourceFile,
        is_entry: bool,
        locator: &RuntimeLocator,
        writer: &OutputWriter,
    ) -> std::result::Result<PathBuf, FileError> {
        let text = fs::read_to_string(&source.path).map_err(|err| ReadError {
            path: source.relative.clone(),
            source: err,
        })?;

        let output = source.output_relative();
        let specifier = locator.specifier_for(&output);
        let transformed = self.transformer.transform(
            &text,
            &source.relative,
            &ModuleContext {
                runtime_specifier: &specifier,
                is_entry,
            },
        )?;

        writer.write(&output, transformed.code)?;
        Ok(output)
    }
}

/// Pick the one source allowed to write each output path.
///
/// The entry always owns its output; otherwise the first source in sorted
/// order does.
fn output_owners(sources: &[SourceFile], entry: &Path) -> HashMap<PathBuf, PathBuf> {
    let mut owners = HashMap::with_capacity(sources.len());
    owners.insert(output_relative(entry), entry.to_path_buf());
    for source in sources {
        owners
            .entry(source.output_relative())
            .or_insert_with(|| source.relative.clone());
    }
    owners
}

fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn options(root: &Path) -> BuildOptions {
        BuildOptions {
            type_check: None,
            ..BuildOptions::new(root)
        }
    }

    #[test]
    fn test_out_dir_resolution() {
        let opts = BuildOptions::new("/project");
        assert_eq!(opts.out_dir_path(), PathBuf::from("/project/dist"));

        let absolute = BuildOptions {
            out_dir: PathBuf::from("/tmp/out"),
            ..BuildOptions::new("/project")
        };
        assert_eq!(absolute.out_dir_path(), PathBuf::from("/tmp/out"));

        let parent = BuildOptions {
            out_dir: PathBuf::from("../build"),
            ..BuildOptions::new("/work/project")
        };
        assert_eq!(parent.out_dir_path(), PathBuf::from("/work/build"));
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let dir = project(&[("App.js", "const a = 1;")]);
        let err = Builder::new(options(dir.path())).build().unwrap_err();
        assert!(matches!(err, BuildError::Manifest(_)));
        assert!(!dir.path().join("dist").join(INDEX_HTML).exists());
    }

    #[test]
    fn test_out_dir_containing_root_is_rejected() {
        let dir = project(&[("package.json", "{}"), ("App.js", "const a = 1;")]);
        let opts = BuildOptions {
            out_dir: dir.path().to_path_buf(),
            ..options(dir.path())
        };
        let err = Builder::new(opts).build().unwrap_err();
        assert!(matches!(err, BuildError::UnsafeOutDir(_)));
    }

    #[test]
    fn test_clean_removes_stale_outputs() {
        let dir = project(&[("package.json", "{}"), ("App.js", "const a = <p />;")]);
        let stale = dir.path().join("dist").join("Old.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();

        Builder::new(options(dir.path())).build().unwrap();
        assert!(stale.exists());

        let clean = BuildOptions {
            clean: true,
            ..options(dir.path())
        };
        Builder::new(clean).build().unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_local_runtime_is_installed() {
        let dir = project(&[("package.json", "{}"), ("App.js", "const a = <p />;")]);
        let opts = BuildOptions {
            runtime: RuntimeMode::Local,
            ..options(dir.path())
        };
        Builder::new(opts).build().unwrap();

        let app = fs::read_to_string(dir.path().join("dist/App.js")).unwrap();
        assert!(app.contains("from \"./_neutronium/runtime.js\""));
        assert!(dir.path().join("dist/_neutronium/runtime.js").is_file());
    }

    #[test]
    fn test_warning_count_includes_type_check() {
        let report = BuildReport {
            files_written: vec![],
            failures: vec![],
            type_check: TypeCheckOutcome::Failed {
                status: Some(2),
                output: String::new(),
            },
            entry_output: PathBuf::from("App.js"),
            index_html: PathBuf::from("dist/index.html"),
            duration: Duration::ZERO,
        };
        assert!(!report.is_clean());
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_entry_owns_its_output_path() {
        let sources = vec![
            SourceFile {
                path: PathBuf::from("/p/App.js"),
                relative: PathBuf::from("App.js"),
            },
            SourceFile {
                path: PathBuf::from("/p/App.jsx"),
                relative: PathBuf::from("App.jsx"),
            },
            SourceFile {
                path: PathBuf::from("/p/Util.ts"),
                relative: PathBuf::from("Util.ts"),
            },
            SourceFile {
                path: PathBuf::from("/p/Util.tsx"),
                relative: PathBuf::from("Util.tsx"),
            },
        ];

        let owners = output_owners(&sources, Path::new("App.jsx"));

        assert_eq!(owners[&PathBuf::from("App.js")], PathBuf::from("App.jsx"));
        assert_eq!(owners[&PathBuf::from("Util.js")], PathBuf::from("Util.ts"));
        assert_eq!(owners.len(), 2);
    }

    #[test]
    fn test_url_path_uses_forward_slashes() {
        assert_eq!(
            to_url_path(&PathBuf::from("src").join("App.js")),
            "src/App.js"
        );
    }
}
