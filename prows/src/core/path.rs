//! Path helpers for entry resolution and the child module search path.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve an entry path against the repo root. Absolute paths are kept as-is.
pub fn resolve_entry(root: &Path, entry: &Path) -> PathBuf {
    if entry.is_absolute() {
        entry.to_path_buf()
    } else {
        root.join(entry)
    }
}

/// Build a `PYTHONPATH` value with `root` first, followed by any inherited entries.
pub fn python_search_path(root: &Path, inherited: Option<&OsStr>) -> Result<OsString> {
    let mut entries = vec![root.to_path_buf()];
    if let Some(inherited) = inherited {
        entries.extend(std::env::split_paths(inherited).filter(|p| p != root));
    }
    std::env::join_paths(entries)
        .with_context(|| format!("build PYTHONPATH from {}", root.display()))
}
