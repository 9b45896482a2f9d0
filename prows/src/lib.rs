//! Convenience layer around a Python submission bundler.
//!
//! `prows bundle` runs the repo's `lib.bundle` module, formats the result with
//! isort and black, and copies it to the clipboard. `prows run` pipes
//! `io/input.txt` through a solution and tees its stdout to `io/output.txt`.
//!
//! - **[`core`]**: Pure logic (naming, path resolution, outcome types).
//! - **[`io`]**: Side-effecting operations (config, interpreter lookup,
//!   subprocesses, clipboard). Trait seams allow scripted fakes in tests.
//!
//! Orchestration modules ([`bundle`], [`run`]) coordinate core logic with I/O
//! to implement CLI commands.

pub mod bundle;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
