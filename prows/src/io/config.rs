//! Workspace configuration stored in `prows.toml` at the repo root.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// File name looked up at the repo root.
pub const CONFIG_FILE_NAME: &str = "prows.toml";

/// prows configuration (TOML).
///
/// The file is optional and meant to be edited by humans. Missing fields fall
/// back to the conventional repo layout (`.venv/`, `logs/`, `io/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProwsConfig {
    /// Interpreter to use verbatim, skipping venv and `PATH` lookup.
    pub python: Option<String>,

    /// Virtual environment directory, relative to the repo root.
    pub venv_dir: String,

    /// Entry program used when a command is given no path.
    pub default_entry: String,

    /// Directory receiving `bundled_<timestamp>.py` files.
    pub logs_dir: String,

    /// Directory holding `input.txt` and `output.txt` for `prows run`.
    pub io_dir: String,

    /// Setup script named in remediation messages.
    pub setup_script: String,

    /// Upper bound for each formatter `--version` probe, in seconds.
    pub probe_timeout_secs: u64,

    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Clipboard utilities in priority order, each as an argv list.
    pub commands: Vec<Vec<String>>,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        let argv = |parts: &[&str]| parts.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            commands: vec![
                argv(&["pbcopy"]),
                argv(&["wl-copy"]),
                argv(&["xclip", "-selection", "clipboard"]),
                argv(&["xsel", "--clipboard", "--input"]),
            ],
        }
    }
}

impl Default for ProwsConfig {
    fn default() -> Self {
        Self {
            python: None,
            venv_dir: ".venv".to_string(),
            default_entry: "main.py".to_string(),
            logs_dir: "logs".to_string(),
            io_dir: "io".to_string(),
            setup_script: "setup.sh".to_string(),
            probe_timeout_secs: 30,
            clipboard: ClipboardConfig::default(),
        }
    }
}

impl ProwsConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(python) = &self.python
            && python.trim().is_empty()
        {
            return Err(anyhow!("python must not be empty when set"));
        }
        for (key, value) in [
            ("venv_dir", &self.venv_dir),
            ("default_entry", &self.default_entry),
            ("logs_dir", &self.logs_dir),
            ("io_dir", &self.io_dir),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{key} must not be empty"));
            }
        }
        if self.probe_timeout_secs == 0 {
            return Err(anyhow!("probe_timeout_secs must be > 0"));
        }
        if self
            .clipboard
            .commands
            .iter()
            .any(|argv| argv.is_empty() || argv[0].trim().is_empty())
        {
            return Err(anyhow!("clipboard.commands entries must be non-empty arrays"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ProwsConfig::default()`.
pub fn load_config(path: &Path) -> Result<ProwsConfig> {
    if !path.exists() {
        let cfg = ProwsConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ProwsConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}
