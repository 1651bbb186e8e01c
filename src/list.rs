//! Functionality related to the `amrwrap list` command.

pub mod command;
