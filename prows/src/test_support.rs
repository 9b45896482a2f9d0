//! Test-only helpers: temporary workspaces, scripted tools, and fake interpreters.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use crate::core::types::{ClipboardOutcome, FormatTool};
use crate::io::clipboard::Clipboard;
use crate::io::config::CONFIG_FILE_NAME;
use crate::io::python::PythonTools;
use crate::io::workspace::Workspace;

/// Deterministic timestamp on 2024-03-09.
pub fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .expect("valid test timestamp")
}

/// Repo root in a temp directory, removed on drop.
pub struct TestWorkspace {
    _temp: TempDir,
    workspace: Workspace,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Self::with_config("")
    }

    /// Create a workspace whose `prows.toml` holds `config`.
    pub fn with_config(config: &str) -> Result<Self> {
        let temp = tempfile::tempdir().context("create temp dir")?;
        fs::write(temp.path().join(CONFIG_FILE_NAME), config).context("write prows.toml")?;
        let workspace = Workspace::open(temp.path())?;
        Ok(Self {
            _temp: temp,
            workspace,
        })
    }

    pub fn root(&self) -> &Path {
        self.workspace.root()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write_file(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_input(&self, contents: &str) -> Result<PathBuf> {
        self.write_file("io/input.txt", contents)
    }
}

/// [`PythonTools`] that records calls and returns scripted exit codes.
///
/// `bundle` writes the scripted text to the output path; `run_entry` echoes
/// stdin into the tee file.
pub struct ScriptedTools {
    bundled: String,
    bundle_exit: i32,
    missing: Vec<FormatTool>,
    format_exits: Vec<(FormatTool, i32)>,
    run_exit: i32,
    calls: RefCell<Vec<String>>,
}

impl ScriptedTools {
    pub fn new(bundled: &str) -> Self {
        Self {
            bundled: bundled.to_string(),
            bundle_exit: 0,
            missing: Vec::new(),
            format_exits: Vec::new(),
            run_exit: 0,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn bundle_exit(mut self, code: i32) -> Self {
        self.bundle_exit = code;
        self
    }

    pub fn without(mut self, tool: FormatTool) -> Self {
        self.missing.push(tool);
        self
    }

    pub fn format_exit(mut self, tool: FormatTool, code: i32) -> Self {
        self.format_exits.push((tool, code));
        self
    }

    pub fn run_exit(mut self, code: i32) -> Self {
        self.run_exit = code;
        self
    }

    /// Calls so far, as `"<op> <arg>"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, op: &str, arg: impl AsRef<str>) {
        self.calls
            .borrow_mut()
            .push(format!("{op} {}", arg.as_ref()));
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl PythonTools for ScriptedTools {
    fn bundle(&self, entry: &Path, output: &Path) -> Result<i32> {
        self.record("bundle", file_name(entry));
        if self.bundle_exit == 0 {
            fs::write(output, &self.bundled)?;
        }
        Ok(self.bundle_exit)
    }

    fn probe(&self, tool: FormatTool) -> bool {
        self.record("probe", tool.module());
        !self.missing.contains(&tool)
    }

    fn format(&self, tool: FormatTool, _file: &Path) -> Result<i32> {
        self.record("format", tool.module());
        Ok(self
            .format_exits
            .iter()
            .find(|(t, _)| *t == tool)
            .map_or(0, |(_, code)| *code))
    }

    fn run_entry(&self, entry: &Path, stdin: &Path, tee: &Path) -> Result<i32> {
        self.record("run", file_name(entry));
        fs::copy(stdin, tee)?;
        Ok(self.run_exit)
    }
}

/// [`Clipboard`] that records what it was given and returns a fixed outcome.
pub struct ScriptedClipboard {
    result: std::result::Result<ClipboardOutcome, String>,
    copied: RefCell<Option<Vec<u8>>>,
}

impl ScriptedClipboard {
    fn with(result: std::result::Result<ClipboardOutcome, String>) -> Self {
        Self {
            result,
            copied: RefCell::new(None),
        }
    }

    pub fn copied(tool: &str) -> Self {
        Self::with(Ok(ClipboardOutcome::Copied {
            tool: tool.to_string(),
        }))
    }

    pub fn failing(tool: &str, code: i32) -> Self {
        Self::with(Ok(ClipboardOutcome::Failed {
            tool: tool.to_string(),
            code,
        }))
    }

    pub fn unavailable() -> Self {
        Self::with(Ok(ClipboardOutcome::Unavailable))
    }

    pub fn erroring(message: &str) -> Self {
        Self::with(Err(message.to_string()))
    }

    /// Contents passed to the last `copy`, if any.
    pub fn copied_text(&self) -> Option<String> {
        self.copied
            .borrow()
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Clipboard for ScriptedClipboard {
    fn copy(&self, contents: &[u8]) -> Result<ClipboardOutcome> {
        *self.copied.borrow_mut() = Some(contents.to_vec());
        self.result.clone().map_err(|message| anyhow!(message))
    }
}

/// Behaviour of a fake `python` executable written by [`write_fake_python`].
#[derive(Debug, Clone, Default)]
pub struct FakePython {
    /// Exit code for `-m lib.bundle`; on 0 the entry is copied to the output.
    pub bundle_exit: i32,
    /// Formatter modules whose `--version` probe fails.
    pub missing: Vec<FormatTool>,
    /// When set, every invocation appends `<cwd>|<PYTHONPATH>|<args>` to this file.
    pub record: Option<PathBuf>,
}

/// One invocation logged by a recording [`FakePython`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCall {
    pub cwd: PathBuf,
    pub python_path: String,
    pub args: String,
}

/// Parse the invocations a recording [`FakePython`] wrote to `path`.
pub fn read_fake_calls(path: &Path) -> Result<Vec<FakeCall>> {
    let log = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    log.lines()
        .map(|line| {
            let mut fields = line.splitn(3, '|');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(cwd), Some(python_path), Some(args)) => Ok(FakeCall {
                    cwd: PathBuf::from(cwd),
                    python_path: python_path.to_string(),
                    args: args.to_string(),
                }),
                _ => Err(anyhow!("malformed call record: {line}")),
            }
        })
        .collect()
}

/// Write an executable shell script that mimics the interpreter surface prows
/// uses: the bundler, formatter probes and runs, and entry programs (which echo
/// stdin to stdout).
#[cfg(unix)]
pub fn write_fake_python(dir: &Path, fake: &FakePython) -> Result<PathBuf> {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let missing_cases: String = fake
        .missing
        .iter()
        .map(|tool| format!("      {}) exit 1 ;;\n", tool.module()))
        .collect();
    let record = fake
        .record
        .as_ref()
        .map(|path| {
            format!(
                "printf '%s|%s|%s\\n' \"$(pwd -P)\" \"$PYTHONPATH\" \"$*\" >> '{}'\n",
                path.display()
            )
        })
        .unwrap_or_default();
    let script = format!(
        r#"#!/bin/sh
{record}if [ "$1" = "-m" ]; then
  case "$2" in
    lib.bundle)
      if [ {bundle_exit} -ne 0 ]; then
        echo "bundle: failed" >&2
        exit {bundle_exit}
      fi
      cat "$3" > "$5"
      exit 0
      ;;
    isort|black)
      case "$2" in
{missing_cases}      esac
      if [ "$3" = "--version" ]; then
        echo "$2 0.0"
      fi
      exit 0
      ;;
  esac
  echo "no module named $2" >&2
  exit 1
fi
exec cat
"#,
        bundle_exit = fake.bundle_exit,
    );

    let path = dir.join("fake-python");
    let mut file = fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
    file.write_all(script.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", path.display()))?;
    Ok(path)
}
