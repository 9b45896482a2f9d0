//! Orchestration for `prows bundle`.
//!
//! Bundle → gate on formatters → isort → black → clipboard. Every stage
//! returns early on failure; nothing is rolled back, so an unformatted bundle
//! stays on disk for manual use.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{debug, info, instrument, warn};

use crate::core::naming::bundle_file_name;
use crate::core::types::{BundleOutcome, ClipboardOutcome, FormatTool};
use crate::io::clipboard::Clipboard;
use crate::io::python::{PythonTools, missing_formatter};
use crate::io::workspace::Workspace;

/// Bundle `entry` (absolute) into `logs/bundled_<now>.py`.
#[instrument(skip_all, fields(entry = %entry.display()))]
pub fn run_bundle<P, C>(
    workspace: &Workspace,
    entry: &Path,
    tools: &P,
    clipboard: &C,
    now: NaiveDateTime,
) -> Result<BundleOutcome>
where
    P: PythonTools + ?Sized,
    C: Clipboard + ?Sized,
{
    let logs_dir = &workspace.paths.logs_dir;
    fs::create_dir_all(logs_dir).with_context(|| format!("create {}", logs_dir.display()))?;

    let output = logs_dir.join(bundle_file_name(now));
    if output.exists() {
        warn!(output = %output.display(), "bundle from the same second exists, overwriting");
    }

    let code = tools.bundle(entry, &output).context("run bundler")?;
    if code != 0 {
        debug!(code, "bundler failed");
        return Ok(BundleOutcome::BundlerFailed { code });
    }
    debug!(output = %output.display(), "bundle written");

    if let Some(tool) = missing_formatter(tools) {
        debug!(tool = %tool, "formatter missing");
        return Ok(BundleOutcome::FormatterMissing { tool, output });
    }

    for tool in FormatTool::ORDER {
        let code = tools
            .format(tool, &output)
            .with_context(|| format!("run {tool}"))?;
        if code != 0 {
            debug!(tool = %tool, code, "formatter failed");
            return Ok(BundleOutcome::FormatFailed { tool, code, output });
        }
    }

    let contents = fs::read(&output).with_context(|| format!("read {}", output.display()))?;
    let clipboard = match clipboard.copy(&contents) {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(err = %format!("{err:#}"), "clipboard copy errored");
            ClipboardOutcome::Errored {
                message: format!("{err:#}"),
            }
        }
    };

    info!(output = %output.display(), "bundle complete");
    Ok(BundleOutcome::Bundled { output, clipboard })
}
