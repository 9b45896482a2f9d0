//! Orchestration for `prows run` / `prows exec`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::types::RunOutcome;
use crate::io::python::PythonTools;
use crate::io::workspace::Workspace;

/// Pipe `io/input.txt` through `entry` (absolute), tee-ing stdout to `io/output.txt`.
///
/// A missing input file short-circuits before anything is spawned or written.
#[instrument(skip_all, fields(entry = %entry.display()))]
pub fn run_program<P: PythonTools + ?Sized>(
    workspace: &Workspace,
    entry: &Path,
    tools: &P,
) -> Result<RunOutcome> {
    let paths = &workspace.paths;
    if !paths.input_path.is_file() {
        debug!(input = %paths.input_path.display(), "input file missing");
        return Ok(RunOutcome::InputMissing {
            input: paths.input_path.clone(),
        });
    }

    if let Some(parent) = paths.output_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let code = tools
        .run_entry(entry, &paths.input_path, &paths.output_path)
        .with_context(|| format!("run {}", entry.display()))?;
    debug!(code, "program finished");
    Ok(RunOutcome::Finished { code })
}
