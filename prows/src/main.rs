//! `prows`: bundle and locally run competitive-programming solutions.
//!
//! Resolves the repo root and interpreter once, then dispatches to the
//! `bundle` or `run` orchestrator and maps its outcome to an exit status.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use prows::bundle::run_bundle;
use prows::core::types::{BundleOutcome, RunOutcome};
use prows::exit_codes;
use prows::io::clipboard::SystemClipboard;
use prows::io::interpreter::{Interpreter, resolve_interpreter};
use prows::io::python::InterpreterTools;
use prows::io::workspace::Workspace;
use prows::logging;
use prows::run::run_program;

#[derive(Parser)]
#[command(
    name = "prows",
    version,
    about = "Bundle, format and locally run competitive-programming Python solutions",
    arg_required_else_help = true
)]
struct Cli {
    /// Repo root. Defaults to the nearest ancestor holding prows.toml or lib/bundle.py.
    #[arg(long, global = true, env = "PROWS_ROOT", value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bundle an entry file into logs/, format it, and copy it to the clipboard.
    Bundle {
        /// Entry file, relative to the repo root (default: main.py).
        entry: Option<PathBuf>,
    },
    /// Pipe io/input.txt through an entry file and tee its stdout to io/output.txt.
    #[command(visible_alias = "exec")]
    Run {
        /// Entry file, relative to the repo root (default: main.py).
        entry: Option<PathBuf>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout with status 0; anything else is a usage error.
            let code = if err.use_stderr() {
                exit_codes::USAGE
            } else {
                exit_codes::OK
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    logging::init();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            exit_codes::FAILURE
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let workspace = Workspace::discover(cli.root.as_deref(), &cwd)?;
    let interpreter = resolve_interpreter(&workspace)?;
    let tools = InterpreterTools::new(&workspace, &interpreter)?;

    match cli.command {
        Command::Bundle { entry } => cmd_bundle(&workspace, &interpreter, &tools, entry.as_deref()),
        Command::Run { entry } => cmd_run(&workspace, &tools, entry.as_deref()),
    }
}

fn cmd_bundle(
    workspace: &Workspace,
    interpreter: &Interpreter,
    tools: &InterpreterTools,
    entry: Option<&Path>,
) -> Result<i32> {
    let entry = workspace.entry_path(entry);
    let clipboard = SystemClipboard::new(workspace.config.clipboard.commands.clone());
    let now = chrono::Local::now().naive_local();

    let outcome = run_bundle(workspace, &entry, tools, &clipboard, now)?;
    match &outcome {
        BundleOutcome::Bundled { output, clipboard } => {
            eprintln!("bundled: {}", output.display());
            eprintln!("clipboard: {}", clipboard.message());
            println!("{}", output.display());
        }
        BundleOutcome::BundlerFailed { code } => {
            eprintln!(
                "bundle: {} failed for {} (exit code {code})",
                prows::io::python::BUNDLER_MODULE,
                entry.display()
            );
        }
        BundleOutcome::FormatterMissing { tool, output } => {
            eprintln!(
                "bundle: {tool} is not available for {}",
                interpreter.program.display()
            );
            eprintln!("  unformatted bundle kept at {}", output.display());
            eprintln!(
                "  run {} to create the venv and install requirements.txt",
                workspace.setup_script().display()
            );
        }
        BundleOutcome::FormatFailed { tool, code, output } => {
            eprintln!("bundle: {tool} failed (exit code {code})");
            eprintln!("  bundle kept at {}", output.display());
        }
    }
    Ok(outcome.exit_code())
}

fn cmd_run(workspace: &Workspace, tools: &InterpreterTools, entry: Option<&Path>) -> Result<i32> {
    let entry = workspace.entry_path(entry);
    let outcome = run_program(workspace, &entry, tools)?;
    if let RunOutcome::InputMissing { input } = &outcome {
        eprintln!("run: missing input file {}", input.display());
    }
    Ok(outcome.exit_code())
}
