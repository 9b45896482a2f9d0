//! Clipboard adapter over platform copy utilities.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use super::process::exit_code;
use crate::core::types::ClipboardOutcome;

/// Abstraction over clipboard backends so bundle orchestration can be tested
/// without touching the real clipboard.
pub trait Clipboard {
    /// Copy `contents` to the clipboard.
    fn copy(&self, contents: &[u8]) -> Result<ClipboardOutcome>;
}

/// Clipboard that pipes into the first installed utility from a fixed list.
pub struct SystemClipboard {
    commands: Vec<Vec<String>>,
}

impl SystemClipboard {
    pub fn new(commands: Vec<Vec<String>>) -> Self {
        Self { commands }
    }

    /// First candidate whose program is on `PATH`, with its resolved location.
    fn select(&self) -> Option<(PathBuf, &[String])> {
        self.commands.iter().find_map(|argv| {
            let (program, args) = argv.split_first()?;
            which::which(program).ok().map(|path| (path, args))
        })
    }
}

impl Clipboard for SystemClipboard {
    #[instrument(skip_all, fields(bytes = contents.len()))]
    fn copy(&self, contents: &[u8]) -> Result<ClipboardOutcome> {
        let Some((program, args)) = self.select() else {
            debug!("no clipboard utility installed");
            return Ok(ClipboardOutcome::Unavailable);
        };
        let tool = program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        debug!(tool = %tool, "copying to clipboard");

        let mut child = Command::new(&program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawn {tool}"))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .with_context(|| format!("{tool} stdin was not piped"))?;
            if let Err(e) = stdin.write_all(contents) {
                debug!(tool = %tool, err = %e, "clipboard utility closed stdin early");
            }
        }

        let status = child.wait().with_context(|| format!("wait for {tool}"))?;
        if status.success() {
            Ok(ClipboardOutcome::Copied { tool })
        } else {
            let code = exit_code(status);
            debug!(tool = %tool, code, "clipboard utility failed");
            Ok(ClipboardOutcome::Failed { tool, code })
        }
    }
}
