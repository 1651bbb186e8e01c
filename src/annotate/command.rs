//! Functionality related to the `amrwrap annotate` command itself.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::aggregate::counts::{count_table, gene_counts};
use crate::annotate::batch::{run_batch, AnnotateInputs, BatchReport};
use crate::annotate::invocation::{AmrFinder, ToolRunner, PROGRAM};
use crate::annotate::outputs::OutputArtifactSet;
use crate::annotate::params::{
    AmrFinderParams, AnnotationFormat, DEFAULT_TRANSLATION_TABLE, ORGANISMS, TRANSLATION_TABLES,
};
use crate::annotate::validate::{validate, InputPresence};
use crate::database::Database;
use crate::layout::{resolve_units, SequenceInput, SequenceLayout};
use crate::utils::args::{fraction, positive_usize};

/// File name of the optional count table, relative to the output directory.
pub const COUNT_TABLE_FILE: &str = "feature_table.tsv";

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `amrwrap annotate`.
#[derive(Args)]
pub struct AnnotateArgs {
    /// AMRFinderPlus database directory (see `amrwrap fetch-db`).
    #[arg(long, value_name = "PATH")]
    database: PathBuf,

    /// Directory to write the outputs to. Must be absent or empty.
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Nucleotide sequences: one subdirectory of MAGs per sample, a flat
    /// directory of `{sample}_contigs.fasta` files, or a flat directory of
    /// MAGs.
    #[arg(long, value_name = "PATH")]
    sequences: Option<PathBuf>,

    /// Overrides the detected shape of the "--sequences" directory.
    #[arg(long, value_enum, requires = "sequences")]
    sequences_layout: Option<SequenceLayout>,

    /// Protein sequences, laid out like the nucleotide input.
    #[arg(long, value_name = "PATH")]
    proteins: Option<PathBuf>,

    /// GFF files locating the proteins on the nucleotide sequences.
    #[arg(long, value_name = "PATH")]
    loci: Option<PathBuf>,

    /// Taxon for point-mutation screening and taxon-specific filtering.
    #[arg(long, value_parser = PossibleValuesParser::new(ORGANISMS))]
    organism: Option<String>,

    /// Also screen for stress, heat, biocide, metal and virulence genes.
    #[arg(long)]
    plus: bool,

    /// Report every equally-scoring best hit.
    #[arg(long)]
    report_all_equal: bool,

    /// Minimum identity for a BLAST-based hit, as a fraction. Uses the
    /// curated per-family threshold when omitted.
    #[arg(long, value_name = "F64", value_parser = fraction)]
    ident_min: Option<f64>,

    /// Use the curated per-family identity threshold.
    #[arg(long)]
    curated_ident: bool,

    /// Minimum coverage of the reference protein, as a fraction.
    #[arg(long, value_name = "F64", value_parser = fraction, default_value_t = 0.5)]
    coverage_min: f64,

    /// NCBI genetic code for translated BLAST.
    #[arg(
        long,
        value_parser = PossibleValuesParser::new(TRANSLATION_TABLES),
        default_value = DEFAULT_TRANSLATION_TABLE
    )]
    translation_table: String,

    /// Dialect of the "--loci" GFF files.
    #[arg(long, value_enum, default_value_t = AnnotationFormat::Prodigal)]
    annotation_format: AnnotationFormat,

    /// Report proteins common to the taxonomic group. Requires "--plus" and
    /// "--organism".
    #[arg(long)]
    report_common: bool,

    /// Threads AMRFinderPlus may use.
    #[arg(long, value_name = "USIZE", value_parser = positive_usize)]
    threads: Option<usize>,

    /// Also write a sample by gene count table to `OUTPUT/feature_table.tsv`.
    #[arg(long)]
    count_table: bool,

    /// The AMRFinderPlus executable.
    #[arg(long, value_name = "PATH", default_value = PROGRAM)]
    executable: PathBuf,
}

impl AnnotateArgs {
    fn request(&self) -> AnnotateRequest {
        AnnotateRequest {
            database: self.database.clone(),
            sequences: self.sequences.clone(),
            sequences_layout: self.sequences_layout,
            proteins: self.proteins.clone(),
            loci: self.loci.clone(),
            output: self.output.clone(),
            count_table: self.count_table,
        }
    }

    fn params(&self) -> AmrFinderParams {
        AmrFinderParams {
            organism: self.organism.clone(),
            plus: self.plus,
            report_all_equal: self.report_all_equal,
            ident_min: self.ident_min,
            curated_ident: self.curated_ident,
            coverage_min: Some(self.coverage_min),
            translation_table: Some(self.translation_table.clone()),
            annotation_format: Some(self.annotation_format),
            report_common: self.report_common,
            threads: self.threads,
        }
    }
}

/// The directories of one annotation run.
#[derive(Clone, Debug, Default)]
pub struct AnnotateRequest {
    /// AMRFinderPlus database directory.
    pub database: PathBuf,

    /// Nucleotide input directory.
    pub sequences: Option<PathBuf>,

    /// Shape of the nucleotide input; detected when `None`.
    pub sequences_layout: Option<SequenceLayout>,

    /// Protein input directory.
    pub proteins: Option<PathBuf>,

    /// GFF input directory.
    pub loci: Option<PathBuf>,

    /// Output directory.
    pub output: PathBuf,

    /// Whether to write [`COUNT_TABLE_FILE`].
    pub count_table: bool,
}

impl AnnotateRequest {
    fn presence(&self) -> InputPresence {
        InputPresence {
            sequences: self.sequences.is_some(),
            proteins: self.proteins.is_some(),
            loci: self.loci.is_some(),
        }
    }
}

//=========//
// Summary //
//=========//

/// What an annotation run produced, printed as JSON when the run succeeds.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Version of the database used.
    pub database_version: String,

    /// The parameters handed to AMRFinderPlus.
    pub params: AmrFinderParams,

    /// The output directories.
    pub outputs: OutputArtifactSet,

    /// Per-unit results.
    pub batch: BatchReport,

    /// The count table, when one was requested.
    pub count_table: Option<PathBuf>,
}

//==============//
// Main command //
//==============//

/// Runs the whole annotation pipeline with `runner` standing in for
/// AMRFinderPlus: validation, database check, unit resolution, the batch and
/// (optionally) the count table.
///
/// Nothing is created on disk until every input check has passed.
pub fn run_annotation<R>(
    runner: &R,
    request: &AnnotateRequest,
    params: &AmrFinderParams,
) -> anyhow::Result<RunSummary>
where
    R: ToolRunner,
{
    validate(&request.presence(), params)?;
    let database = Database::open(&request.database)?;

    let sequences = match &request.sequences {
        Some(path) => Some(SequenceInput::new(path.clone(), request.sequences_layout)?),
        None => None,
    };
    let inputs = AnnotateInputs {
        sequences,
        proteins: request.proteins.clone(),
        loci: request.loci.clone(),
    };
    let samples = resolve_units(inputs.sequences.as_ref(), inputs.proteins.as_deref())?;

    let outputs = OutputArtifactSet::create(&request.output)?;
    let batch = run_batch(runner, &database.path, &inputs, params, &samples, &outputs)?;

    let count_table = match request.count_table {
        true => Some(write_count_table(&batch, &request.output)?),
        false => None,
    };

    Ok(RunSummary {
        database_version: database.version,
        params: params.clone(),
        outputs,
        batch,
        count_table,
    })
}

fn write_count_table(batch: &BatchReport, output: &Path) -> anyhow::Result<PathBuf> {
    let mut frames = Vec::with_capacity(batch.units.len());
    for report in &batch.units {
        frames.push(gene_counts(&report.annotations, &report.unit.qualified_id())?);
    }

    let matrix = count_table(frames)?;
    let path = output.join(COUNT_TABLE_FILE);
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("creating count table: {}", path.display()))?;
    matrix.write_tsv(BufWriter::new(file))?;

    info!("Wrote count table to {}.", path.display());
    Ok(path)
}

/// Main method for the `amrwrap annotate` subcommand.
pub fn annotate(args: AnnotateArgs) -> anyhow::Result<()> {
    let runner = AmrFinder::new(args.executable.clone());
    let summary = run_annotation(&runner, &args.request(), &args.params())?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &summary)
        .with_context(|| "writing run summary")?;
    writeln!(stdout).with_context(|| "writing run summary")?;

    Ok(())
}
