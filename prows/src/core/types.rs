//! Outcome types shared by the command orchestrators and the CLI.
//!
//! Expected failures (missing input, missing formatter, a failing bundler) are
//! variants here rather than errors, so the dispatcher can map each one to a
//! stable exit status.

use std::fmt;
use std::path::PathBuf;

use crate::exit_codes;

/// External formatter run over every bundle, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTool {
    /// Import sorter.
    Isort,
    /// Code formatter.
    Black,
}

impl FormatTool {
    /// Gate and formatting order: imports are sorted before code is formatted.
    pub const ORDER: [FormatTool; 2] = [FormatTool::Isort, FormatTool::Black];

    /// Python module name, as passed to `python -m`.
    pub fn module(self) -> &'static str {
        match self {
            FormatTool::Isort => "isort",
            FormatTool::Black => "black",
        }
    }

    /// Extra arguments placed before the target file when formatting.
    pub fn format_args(self) -> &'static [&'static str] {
        match self {
            FormatTool::Isort => &["--quiet"],
            FormatTool::Black => &["-q"],
        }
    }
}

impl fmt::Display for FormatTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module())
    }
}

/// Result of a clipboard copy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardOutcome {
    /// The named utility accepted the contents.
    Copied { tool: String },
    /// The named utility ran and exited non-zero.
    Failed { tool: String, code: i32 },
    /// The chosen utility could not be driven (spawn or wait failed).
    Errored { message: String },
    /// None of the candidate utilities is installed.
    Unavailable,
}

impl ClipboardOutcome {
    /// One-line status message for stderr.
    pub fn message(&self) -> String {
        match self {
            ClipboardOutcome::Copied { tool } => format!("copied to clipboard ({tool})"),
            ClipboardOutcome::Failed { tool, code } => {
                format!("clipboard copy failed ({tool} exited with {code})")
            }
            ClipboardOutcome::Errored { message } => format!("clipboard copy failed: {message}"),
            ClipboardOutcome::Unavailable => {
                "no clipboard utility found (pbcopy, wl-copy, xclip, xsel); copy the file manually"
                    .to_string()
            }
        }
    }
}

/// Structured result of `prows bundle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutcome {
    /// Bundled and formatted. Clipboard outcome is informational only.
    Bundled {
        output: PathBuf,
        clipboard: ClipboardOutcome,
    },
    /// The bundler module exited non-zero.
    BundlerFailed { code: i32 },
    /// A formatter is not installed. The unformatted bundle is left at `output`.
    FormatterMissing { tool: FormatTool, output: PathBuf },
    /// A formatter ran and exited non-zero.
    FormatFailed {
        tool: FormatTool,
        code: i32,
        output: PathBuf,
    },
}

impl BundleOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            BundleOutcome::Bundled { .. } => exit_codes::OK,
            BundleOutcome::BundlerFailed { code } => *code,
            BundleOutcome::FormatterMissing { .. } | BundleOutcome::FormatFailed { .. } => {
                exit_codes::FAILURE
            }
        }
    }
}

/// Structured result of `prows run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The input file does not exist; nothing was executed.
    InputMissing { input: PathBuf },
    /// The entry program ran to completion (or was killed) with this status.
    Finished { code: i32 },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::InputMissing { .. } => exit_codes::FAILURE,
            RunOutcome::Finished { code } => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatters_run_isort_before_black() {
        let modules: Vec<&str> = FormatTool::ORDER.iter().map(|t| t.module()).collect();
        assert_eq!(modules, vec!["isort", "black"]);
    }

    #[test]
    fn clipboard_outcome_never_changes_bundle_status() {
        for clipboard in [
            ClipboardOutcome::Copied {
                tool: "pbcopy".to_string(),
            },
            ClipboardOutcome::Failed {
                tool: "xclip".to_string(),
                code: 1,
            },
            ClipboardOutcome::Errored {
                message: "spawn wl-copy".to_string(),
            },
            ClipboardOutcome::Unavailable,
        ] {
            let outcome = BundleOutcome::Bundled {
                output: PathBuf::from("logs/bundled_20240101000000.py"),
                clipboard,
            };
            assert_eq!(outcome.exit_code(), exit_codes::OK);
        }
    }

    #[test]
    fn bundler_exit_code_is_passed_through() {
        let outcome = BundleOutcome::BundlerFailed { code: 7 };
        assert_eq!(outcome.exit_code(), 7);
    }

    #[test]
    fn missing_formatter_is_a_stage_failure() {
        let outcome = BundleOutcome::FormatterMissing {
            tool: FormatTool::Black,
            output: PathBuf::from("logs/bundled_20240101000000.py"),
        };
        assert_eq!(outcome.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn run_outcome_codes() {
        let missing = RunOutcome::InputMissing {
            input: PathBuf::from("io/input.txt"),
        };
        assert_eq!(missing.exit_code(), exit_codes::FAILURE);
        assert_eq!(RunOutcome::Finished { code: 3 }.exit_code(), 3);
    }
}
