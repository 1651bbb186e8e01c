//! Functionality related to the `amrwrap fetch-db` command itself.

use std::env;
use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use tracing::info;

use crate::annotate::invocation::{AmrFinder, PROGRAM};
use crate::database::{conda_data_dir, copy_database};

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `amrwrap fetch-db`.
#[derive(Args)]
pub struct FetchDbArgs {
    /// Directory to place the database in.
    dest: PathBuf,

    /// Directory `amrfinder -u` downloads into. Defaults to
    /// `$CONDA_PREFIX/share/amrfinderplus/data/latest`.
    #[arg(long, value_name = "PATH")]
    source: Option<PathBuf>,

    /// The AMRFinderPlus executable.
    #[arg(long, value_name = "PATH", default_value = PROGRAM)]
    executable: PathBuf,
}

//==============//
// Main command //
//==============//

/// Main method for the `amrwrap fetch-db` subcommand.
pub fn fetch_db(args: FetchDbArgs) -> anyhow::Result<()> {
    let source = match args.source {
        Some(source) => source,
        None => match env::var_os("CONDA_PREFIX") {
            Some(prefix) => conda_data_dir(prefix),
            None => bail!(
                "could not locate the downloaded database: \"CONDA_PREFIX\" is not set. \
                Please provide \"--source\"."
            ),
        },
    };

    let amrfinder = AmrFinder::new(args.executable);
    info!(
        "Downloading the latest AMRFinderPlus database with {}...",
        amrfinder.executable().display()
    );
    amrfinder.update_database()?;

    let database = copy_database(&source, &args.dest)?;
    info!(
        "Database version {} is ready at {}.",
        database.version,
        database.path.display()
    );

    Ok(())
}
