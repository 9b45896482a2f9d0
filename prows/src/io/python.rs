//! Python tool adapter: the bundler module, the formatters, and entry programs.
//!
//! The [`PythonTools`] trait decouples command orchestration from real
//! subprocesses. Tests use scripted implementations that return predetermined
//! exit codes and write files without spawning anything.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument};

use super::interpreter::Interpreter;
use super::process::{exit_code, run_passthrough, run_probe, run_with_tee};
use super::workspace::Workspace;
use crate::core::path::python_search_path;
use crate::core::types::FormatTool;

/// Module path of the external bundler, run as `python -m lib.bundle`.
pub const BUNDLER_MODULE: &str = "lib.bundle";

/// Operations prows needs from a Python installation.
pub trait PythonTools {
    /// Bundle `entry` into `output`. Returns the bundler's exit code.
    fn bundle(&self, entry: &Path, output: &Path) -> Result<i32>;

    /// Whether `tool` answers its `--version` query successfully.
    fn probe(&self, tool: FormatTool) -> bool;

    /// Format `file` in place with `tool`. Returns the tool's exit code.
    fn format(&self, tool: FormatTool, file: &Path) -> Result<i32>;

    /// Run `entry` with `stdin` as input, tee-ing stdout to `tee`. Returns its exit code.
    fn run_entry(&self, entry: &Path, stdin: &Path, tee: &Path) -> Result<i32>;
}

/// [`PythonTools`] backed by a resolved interpreter.
///
/// Every child runs in the repo root with `PYTHONPATH` led by the root, so
/// `lib.*` imports resolve no matter where the entry file lives.
pub struct InterpreterTools {
    program: PathBuf,
    root: PathBuf,
    search_path: OsString,
    probe_timeout: Duration,
}

impl InterpreterTools {
    pub fn new(workspace: &Workspace, interpreter: &Interpreter) -> Result<Self> {
        let root = workspace.root().to_path_buf();
        let inherited = std::env::var_os("PYTHONPATH");
        let search_path = python_search_path(&root, inherited.as_deref())?;
        Ok(Self {
            program: interpreter.program.clone(),
            root,
            search_path,
            probe_timeout: Duration::from_secs(workspace.config.probe_timeout_secs),
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.root)
            .env("PYTHONPATH", &self.search_path);
        cmd
    }

    fn module(&self, module: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("-m").arg(module);
        cmd
    }
}

impl PythonTools for InterpreterTools {
    #[instrument(skip_all, fields(entry = %entry.display(), output = %output.display()))]
    fn bundle(&self, entry: &Path, output: &Path) -> Result<i32> {
        info!("running bundler");
        let mut cmd = self.module(BUNDLER_MODULE);
        cmd.arg(entry)
            .arg("-o")
            .arg(output)
            .arg("--root")
            .arg(&self.root);
        let status = run_passthrough(cmd)?;
        Ok(exit_code(status))
    }

    #[instrument(skip_all, fields(tool = %tool))]
    fn probe(&self, tool: FormatTool) -> bool {
        let mut cmd = self.module(tool.module());
        cmd.arg("--version");
        match run_probe(cmd, self.probe_timeout) {
            Ok(Some(status)) => {
                debug!(success = status.success(), "formatter probed");
                status.success()
            }
            Ok(None) => false,
            Err(err) => {
                debug!(err = %format!("{err:#}"), "formatter probe failed");
                false
            }
        }
    }

    #[instrument(skip_all, fields(tool = %tool, file = %file.display()))]
    fn format(&self, tool: FormatTool, file: &Path) -> Result<i32> {
        let mut cmd = self.module(tool.module());
        cmd.args(tool.format_args()).arg(file);
        let status = run_passthrough(cmd)?;
        Ok(exit_code(status))
    }

    #[instrument(skip_all, fields(entry = %entry.display()))]
    fn run_entry(&self, entry: &Path, stdin: &Path, tee: &Path) -> Result<i32> {
        let mut cmd = self.command();
        cmd.arg(entry);
        let status = run_with_tee(cmd, stdin, tee)?;
        Ok(exit_code(status))
    }
}

/// Formatter gate: the first tool in [`FormatTool::ORDER`] that is not usable.
pub fn missing_formatter<P: PythonTools + ?Sized>(tools: &P) -> Option<FormatTool> {
    FormatTool::ORDER.into_iter().find(|&tool| !tools.probe(tool))
}
