//! I/O helpers for prows commands.

pub mod clipboard;
pub mod config;
pub mod interpreter;
pub mod process;
pub mod python;
pub mod workspace;
