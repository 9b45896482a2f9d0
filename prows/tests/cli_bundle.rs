//! CLI tests for `prows bundle`.
//!
//! A fake interpreter script stands in for python: `-m lib.bundle` copies the
//! entry to the output path and the formatters succeed unless marked missing.
//! The clipboard candidate list is emptied so tests never touch a real clipboard.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use prows::core::types::FormatTool;
use prows::exit_codes;
use prows::test_support::{FakePython, TestWorkspace, read_fake_calls, write_fake_python};
use regex::Regex;

const SOLUTION: &str = "from lib.math.comb import Comb\nprint(Comb(10).nCr(5, 2))\n";

fn setup(bin_dir: &Path, fake: &FakePython) -> TestWorkspace {
    let python = write_fake_python(bin_dir, fake).expect("fake python");
    let config = format!(
        "python = \"{}\"\n\n[clipboard]\ncommands = []\n",
        python.display()
    );
    let ws = TestWorkspace::with_config(&config).expect("workspace");
    ws.write_file("main.py", SOLUTION).expect("main.py");
    ws
}

fn prows(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_prows"))
        .env_remove("PROWS_ROOT")
        .env_remove("RUST_LOG")
        .current_dir(root)
        .args(args)
        .output()
        .expect("run prows")
}

fn bundles(root: &Path) -> Vec<PathBuf> {
    let logs = root.join("logs");
    if !logs.exists() {
        return Vec::new();
    }
    fs::read_dir(logs)
        .expect("read logs")
        .map(|entry| entry.expect("entry").path())
        .collect()
}

#[test]
fn bundle_writes_one_timestamped_file() {
    let bin = tempfile::tempdir().expect("bin dir");
    let ws = setup(bin.path(), &FakePython::default());

    let out = prows(ws.root(), &["bundle"]);
    assert_eq!(
        out.status.code(),
        Some(exit_codes::OK),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let files = bundles(ws.root());
    assert_eq!(files.len(), 1);
    let name = files[0]
        .file_name()
        .expect("file name")
        .to_string_lossy()
        .into_owned();
    let pattern = Regex::new(r"^bundled_\d{14}\.py$").expect("regex");
    assert!(pattern.is_match(&name), "unexpected name {name}");
    assert_eq!(fs::read_to_string(&files[0]).expect("read"), SOLUTION);

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim(), files[0].display().to_string());
}

#[test]
fn missing_clipboard_only_changes_the_message() {
    let bin = tempfile::tempdir().expect("bin dir");
    let ws = setup(bin.path(), &FakePython::default());

    let out = prows(ws.root(), &["bundle", "main.py"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no clipboard utility found"), "stderr: {stderr}");
}

#[test]
fn missing_formatter_fails_but_keeps_bundle() {
    let bin = tempfile::tempdir().expect("bin dir");
    let ws = setup(
        bin.path(),
        &FakePython {
            missing: vec![FormatTool::Black],
            ..FakePython::default()
        },
    );

    let out = prows(ws.root(), &["bundle"]);
    assert_eq!(out.status.code(), Some(exit_codes::FAILURE));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("black is not available"), "stderr: {stderr}");
    assert!(stderr.contains("setup.sh"), "stderr: {stderr}");

    let files = bundles(ws.root());
    assert_eq!(files.len(), 1);
    assert_eq!(fs::read_to_string(&files[0]).expect("read"), SOLUTION);
}

#[test]
fn bundler_exit_code_is_propagated() {
    let bin = tempfile::tempdir().expect("bin dir");
    let ws = setup(
        bin.path(),
        &FakePython {
            bundle_exit: 2,
            ..FakePython::default()
        },
    );

    let out = prows(ws.root(), &["bundle"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    assert!(bundles(ws.root()).is_empty());
}

#[test]
fn bundler_gets_root_cwd_pythonpath_and_root_flag() {
    let bin = tempfile::tempdir().expect("bin dir");
    let calls = bin.path().join("calls.log");
    let ws = setup(
        bin.path(),
        &FakePython {
            record: Some(calls.clone()),
            ..FakePython::default()
        },
    );
    let sub = ws.root().join("sub");
    fs::create_dir_all(&sub).expect("mkdir");

    let out = prows(&sub, &["bundle"]);
    assert_eq!(
        out.status.code(),
        Some(exit_codes::OK),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let root = ws.root().display().to_string();
    let recorded = read_fake_calls(&calls).expect("calls");
    // bundler, two probes, two formatter runs
    assert_eq!(recorded.len(), 5, "calls: {recorded:?}");
    for call in &recorded {
        assert_eq!(call.cwd.as_path(), ws.root(), "call: {call:?}");
        assert!(call.python_path.starts_with(&root), "call: {call:?}");
    }

    let bundler = &recorded[0];
    let output = &bundles(ws.root())[0];
    assert_eq!(
        bundler.args,
        format!(
            "-m lib.bundle {} -o {} --root {root}",
            ws.root().join("main.py").display(),
            output.display()
        )
    );
}

#[test]
fn missing_formatter_prints_only_status_lines() {
    let bin = tempfile::tempdir().expect("bin dir");
    let ws = setup(
        bin.path(),
        &FakePython {
            missing: vec![FormatTool::Isort],
            ..FakePython::default()
        },
    );

    let out = prows(ws.root(), &["bundle"]);
    assert_eq!(out.status.code(), Some(exit_codes::FAILURE));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("isort is not available"), "stderr: {stderr}");
    assert!(!stderr.contains("WARN"), "stderr: {stderr}");
    assert!(!stderr.contains("ERROR"), "stderr: {stderr}");
}
