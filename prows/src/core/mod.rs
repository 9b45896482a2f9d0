//! Deterministic, pure logic shared by the prows commands.
//!
//! Core modules must be free of I/O side effects. They operate on paths, clock
//! values and outcome types and return deterministic outputs suitable for tests.

pub mod naming;
pub mod path;
pub mod types;
