//! `amrwrap` is a command line tool that runs NCBI AMRFinderPlus over
//! directories of metagenome-assembled genomes, contigs and protein
//! sequences, and condenses the per-unit reports into tables. This package is
//! composed of both a library crate, as well as a binary crate.
//!
//! This documentation generally refers to the library crate documentation for
//! use by developers of `amrwrap`. The library is organised around the stages
//! of a run: [`annotate`] validates the inputs and drives AMRFinderPlus once
//! per processing unit discovered by [`layout`], and [`aggregate`] turns the
//! resulting reports into presence matrices, count tables and a combined
//! long-format table.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod aggregate;
pub mod annotate;
pub mod database;
pub mod formats;
pub mod layout;
pub mod list;
pub mod utils;
