//! Utilities that are used across the `amrwrap` subcommands.

pub mod args;
pub mod path;
