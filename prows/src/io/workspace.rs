//! Repo root discovery and the canonical paths derived from it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use super::config::{CONFIG_FILE_NAME, ProwsConfig, load_config};
use crate::core::path::resolve_entry;

/// Relative path of the bundler module inside a repo root.
const BUNDLER_SOURCE: &str = "lib/bundle.py";

/// All canonical paths prows reads or writes for a repo root.
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub venv_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub io_dir: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl Into<PathBuf>, config: &ProwsConfig) -> Self {
        let root = root.into();
        let io_dir = root.join(&config.io_dir);
        Self {
            config_path: root.join(CONFIG_FILE_NAME),
            venv_dir: root.join(&config.venv_dir),
            logs_dir: root.join(&config.logs_dir),
            input_path: io_dir.join("input.txt"),
            output_path: io_dir.join("output.txt"),
            io_dir,
            root,
        }
    }
}

/// Resolved repo root plus its configuration, built once per invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub paths: WorkspacePaths,
    pub config: ProwsConfig,
}

impl Workspace {
    /// Open the workspace rooted at `root` and load its `prows.toml`, if any.
    pub fn open(root: &Path) -> Result<Self> {
        let root = fs::canonicalize(root)
            .with_context(|| format!("resolve repo root {}", root.display()))?;
        if !root.is_dir() {
            return Err(anyhow!("repo root {} is not a directory", root.display()));
        }
        let config = load_config(&root.join(CONFIG_FILE_NAME))?;
        let paths = WorkspacePaths::new(root, &config);
        Ok(Self { paths, config })
    }

    /// Use `explicit` when given, otherwise search upward from `cwd`.
    #[instrument(skip_all)]
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let root = match explicit {
            Some(root) => {
                debug!(root = %root.display(), "using explicit repo root");
                root.to_path_buf()
            }
            None => find_root(cwd).ok_or_else(|| {
                anyhow!(
                    "could not determine repo root from {} (no {} or {} in any parent); pass --root",
                    cwd.display(),
                    CONFIG_FILE_NAME,
                    BUNDLER_SOURCE
                )
            })?,
        };
        let workspace = Self::open(&root)?;
        debug!(root = %workspace.root().display(), "workspace opened");
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    /// Absolute entry path; falls back to `default_entry` when none is given.
    pub fn entry_path(&self, entry: Option<&Path>) -> PathBuf {
        let entry = entry.unwrap_or_else(|| Path::new(&self.config.default_entry));
        resolve_entry(self.root(), entry)
    }

    /// Setup script path as shown in remediation messages.
    pub fn setup_script(&self) -> PathBuf {
        self.root().join(&self.config.setup_script)
    }
}

/// Nearest ancestor of `start` (inclusive) holding `prows.toml` or `lib/bundle.py`.
pub fn find_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file() || dir.join(BUNDLER_SOURCE).is_file())
        .map(Path::to_path_buf)
}
