//! Python interpreter resolution.
//!
//! Priority: `python` from `prows.toml`, then the repo-local venv interpreter,
//! then `python3` and `python` on `PATH`. The first hit wins; nothing is
//! executed to validate it.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::{debug, instrument};

use super::workspace::Workspace;

/// System interpreters tried after the venv, in order.
pub const FALLBACK_COMMANDS: [&str; 2] = ["python3", "python"];

/// Where the resolved interpreter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterSource {
    Configured,
    Venv,
    Path(&'static str),
}

impl fmt::Display for InterpreterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpreterSource::Configured => f.write_str("prows.toml"),
            InterpreterSource::Venv => f.write_str("venv"),
            InterpreterSource::Path(name) => write!(f, "PATH ({name})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: PathBuf,
    pub source: InterpreterSource,
}

/// Interpreter inside a virtual environment directory.
pub fn venv_python(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join("python.exe")
    } else {
        venv_dir.join("bin").join("python")
    }
}

/// Resolve the interpreter for `workspace`, searching `PATH` for fallbacks.
#[instrument(skip_all)]
pub fn resolve_interpreter(workspace: &Workspace) -> Result<Interpreter> {
    let interpreter = resolve_with(workspace, |name| which::which(name).ok())?;
    debug!(
        program = %interpreter.program.display(),
        source = %interpreter.source,
        "resolved interpreter"
    );
    Ok(interpreter)
}

fn resolve_with<F>(workspace: &Workspace, lookup: F) -> Result<Interpreter>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if let Some(python) = &workspace.config.python {
        return Ok(Interpreter {
            program: PathBuf::from(python),
            source: InterpreterSource::Configured,
        });
    }

    let venv = venv_python(&workspace.paths.venv_dir);
    if venv.is_file() {
        return Ok(Interpreter {
            program: venv,
            source: InterpreterSource::Venv,
        });
    }

    for name in FALLBACK_COMMANDS {
        if let Some(program) = lookup(name) {
            return Ok(Interpreter {
                program,
                source: InterpreterSource::Path(name),
            });
        }
    }

    Err(anyhow!(
        "no python interpreter found ({} missing, {} not on PATH); run {} to create the venv",
        venv.display(),
        FALLBACK_COMMANDS.join(" / "),
        workspace.setup_script().display()
    ))
}
