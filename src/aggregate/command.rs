//! Functionality related to the `amrwrap feature-table`, `amrwrap count-table`,
//! `amrwrap combine` and `amrwrap collate` commands.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use num_format::{Locale, ToFormattedString};
use tracing::info;

use crate::aggregate::combine::combine_dir;
use crate::aggregate::counts::count_table_from_dir;
use crate::aggregate::presence::presence_matrix_from_dir;
use crate::formats::tsv;
use crate::layout::annotations::collate;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `amrwrap feature-table`.
#[derive(Args)]
pub struct FeatureTableArgs {
    /// Directory of annotation reports, flat or one subdirectory per sample.
    src: PathBuf,

    /// Where to write the contig by gene table. Defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Command line arguments for `amrwrap count-table`.
#[derive(Args)]
pub struct CountTableArgs {
    /// Directory of annotation reports, flat or one subdirectory per sample.
    src: PathBuf,

    /// Where to write the sample by gene table. Defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Command line arguments for `amrwrap combine`.
#[derive(Args)]
pub struct CombineArgs {
    /// Directory of reports, flat or one subdirectory per sample.
    src: PathBuf,

    /// Where to write the combined table. Defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Command line arguments for `amrwrap collate`.
#[derive(Args)]
pub struct CollateArgs {
    /// Report directories to merge.
    #[arg(required = true)]
    srcs: Vec<PathBuf>,

    /// Directory to merge the reports into.
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,
}

//===============//
// Main commands //
//===============//

/// Main method for the `amrwrap feature-table` subcommand.
pub fn feature_table(args: FeatureTableArgs) -> anyhow::Result<()> {
    info!("Building feature table from {}.", args.src.display());
    let matrix = presence_matrix_from_dir(&args.src)?;
    info!(
        "{} contig(s) by {} gene(s).",
        matrix.rows.len().to_formatted_string(&Locale::en),
        matrix.columns.len().to_formatted_string(&Locale::en)
    );

    matrix
        .write_tsv(tsv::destination(args.output.as_deref())?)
        .with_context(|| "writing feature table")
}

/// Main method for the `amrwrap count-table` subcommand.
pub fn count_table(args: CountTableArgs) -> anyhow::Result<()> {
    info!("Building count table from {}.", args.src.display());
    let matrix = count_table_from_dir(&args.src)?;
    info!(
        "{} unit(s) by {} gene(s).",
        matrix.rows.len().to_formatted_string(&Locale::en),
        matrix.columns.len().to_formatted_string(&Locale::en)
    );

    matrix
        .write_tsv(tsv::destination(args.output.as_deref())?)
        .with_context(|| "writing count table")
}

/// Main method for the `amrwrap combine` subcommand.
pub fn combine(args: CombineArgs) -> anyhow::Result<()> {
    info!("Combining reports from {}.", args.src.display());
    let table = combine_dir(&args.src)?;
    info!(
        "Combined {} row(s).",
        table.rows.len().to_formatted_string(&Locale::en)
    );

    table
        .write_tsv(tsv::destination(args.output.as_deref())?)
        .with_context(|| "writing combined table")
}

/// Main method for the `amrwrap collate` subcommand.
pub fn collate_dirs(args: CollateArgs) -> anyhow::Result<()> {
    collate(&args.srcs, &args.output)?;
    Ok(())
}
