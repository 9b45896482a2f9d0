//! Stable exit codes for prows CLI commands.
//!
//! Subprocess failures (the bundler, the entry program) are passed through
//! verbatim and may use any code; these are the codes prows itself chooses.

/// Command succeeded.
pub const OK: i32 = 0;
/// A stage failed: missing prerequisite, formatter failure, or an internal error.
pub const FAILURE: i32 = 1;
/// No command, or an unrecognized one, was given.
pub const USAGE: i32 = 2;
