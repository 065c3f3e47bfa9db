//! Optional external type-check step.
//!
//! When `tsconfig.json` exists at the project root the configured command
//! (by default `npx tsc --noEmit`) runs as a blocking subprocess before
//! sources are transformed. Its outcome is advisory: a failing type-check
//! is reported but never stops the build.

use std::path::Path;
use std::process::Command;

/// Config file whose presence enables the type-check.
pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Command used when none is configured.
pub const DEFAULT_TYPE_CHECK_COMMAND: &str = "npx tsc --noEmit";

/// An external type-check command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheck {
    program: String,
    args: Vec<String>,
}

/// What happened when the type-check step ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCheckOutcome {
    /// Disabled, or no `tsconfig.json` at the root.
    Skipped,
    Passed,
    /// The checker exited non-zero.
    Failed {
        status: Option<i32>,
        output: String,
    },
    /// The checker could not be started.
    Unavailable { reason: String },
}

impl TypeCheckOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Unavailable { .. })
    }
}

impl Default for TypeCheck {
    fn default() -> Self {
        Self::parse(DEFAULT_TYPE_CHECK_COMMAND).unwrap_or_else(|| Self {
            program: "npx".to_string(),
            args: vec!["tsc".to_string(), "--noEmit".to_string()],
        })
    }
}

impl TypeCheck {
    /// Split a whitespace-separated command line. `None` if it is empty.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Build from an argv list (`["npx", "tsc", "--noEmit"]`). `None` if it
    /// is empty or the program is blank.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        let program = program.as_ref().trim();
        if program.is_empty() {
            return None;
        }
        Some(Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.as_ref().to_string()).collect(),
        })
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether `root` opts into type-checking.
    pub fn applies_to(root: &Path) -> bool {
        root.join(TSCONFIG_FILE).is_file()
    }

    /// Run the check in `root`, blocking until it exits.
    pub fn run(&self, root: &Path) -> TypeCheckOutcome {
        if !Self::applies_to(root) {
            return TypeCheckOutcome::Skipped;
        }

        tracing::debug!("Running type-check: {}", self.command_line());

        match Command::new(&self.program)
            .args(&self.args)
            .current_dir(root)
            .output()
        {
            Ok(output) if output.status.success() => TypeCheckOutcome::Passed,
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                TypeCheckOutcome::Failed {
                    status: output.status.code(),
                    output: text.trim().to_string(),
                }
            }
            Err(err) => TypeCheckOutcome::Unavailable {
                reason: format!("failed to run `{}`: {}", self.command_line(), err),
            },
        }
    }
}
