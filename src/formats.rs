//! Utilities related to the file formats read and written around
//! AMRFinderPlus.

pub mod annotation;
pub mod fasta;
pub mod tsv;
