use clap::{Parser, Subcommand};
use git_testament::{git_testament, render_testament};

use amrwrap::aggregate::command::{
    collate_dirs, combine, count_table, feature_table, CollateArgs, CombineArgs, CountTableArgs,
    FeatureTableArgs,
};
use amrwrap::annotate::command::{annotate, AnnotateArgs};
use amrwrap::database::command::{fetch_db, FetchDbArgs};
use amrwrap::list::command::{list, ListArgs};

git_testament!(TESTAMENT);

#[derive(Parser)]
#[command(author, version = render_testament!(TESTAMENT), propagate_version = true, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// All available information, including debug information, is printed
    /// to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs AMRFinderPlus over every MAG, contig file or protein file.
    Annotate(AnnotateArgs),

    /// Builds a contig by gene presence matrix from annotation reports.
    FeatureTable(FeatureTableArgs),

    /// Builds a sample by gene count table from annotation reports.
    CountTable(CountTableArgs),

    /// Concatenates reports into one long-format table.
    Combine(CombineArgs),

    /// Merges several report directories into one.
    Collate(CollateArgs),

    /// Downloads the AMRFinderPlus database.
    FetchDb(FetchDbArgs),

    /// Lists values accepted by the `annotate` options.
    List(ListArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut level = tracing::Level::INFO;
    if cli.quiet {
        level = tracing::Level::ERROR;
    } else if cli.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match cli.command {
        Commands::Annotate(args) => annotate(args),
        Commands::FeatureTable(args) => feature_table(args),
        Commands::CountTable(args) => count_table(args),
        Commands::Combine(args) => combine(args),
        Commands::Collate(args) => collate_dirs(args),
        Commands::FetchDb(args) => fetch_db(args),
        Commands::List(args) => list(args),
    }
}
