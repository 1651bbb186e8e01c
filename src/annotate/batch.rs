//! Running AMRFinderPlus once per processing unit.

use std::path::{Path, PathBuf};

use anyhow::bail;
use indicatif::{ProgressBar, ProgressStyle};
use num_format::{Locale, ToFormattedString};
use serde::Serialize;
use tracing::{debug, info};

use crate::annotate::dedup::deduplicate_in_place;
use crate::annotate::invocation::{build_args, ToolRunner};
use crate::annotate::outputs::{ActiveOutputs, OutputArtifactSet, UnitOutputs};
use crate::annotate::params::AmrFinderParams;
use crate::annotate::validate::InputPresence;
use crate::layout::{ProcessingUnit, SampleGroupMap, SequenceInput};

//========//
// Inputs //
//========//

/// The input directories of a run.
#[derive(Clone, Debug, Default)]
pub struct AnnotateInputs {
    /// Nucleotide sequences and their shape.
    pub sequences: Option<SequenceInput>,

    /// Protein sequences (`{sample}/{unit}.fasta` or `{unit}.fasta`).
    pub proteins: Option<PathBuf>,

    /// GFF loci (`{sample}/{unit}.gff` or `{unit}.gff`).
    pub loci: Option<PathBuf>,
}

impl AnnotateInputs {
    /// Which input categories are present.
    pub fn presence(&self) -> InputPresence {
        InputPresence {
            sequences: self.sequences.is_some(),
            proteins: self.proteins.is_some(),
            loci: self.loci.is_some(),
        }
    }
}

/// Works out every input file of one unit.
///
/// `file` is the path the unit was resolved from: the nucleotide FASTA when
/// sequences were given, otherwise the protein FASTA. Companion protein and
/// GFF files are expected at `{sample}/{unit}.fasta` and `{sample}/{unit}.gff`
/// in their respective inputs.
pub fn resolve_companions(
    inputs: &AnnotateInputs,
    sample_id: &str,
    unit_id: &str,
    file: &Path,
) -> anyhow::Result<ProcessingUnit> {
    let (dna, protein) = match (&inputs.sequences, &inputs.proteins) {
        (Some(_), Some(proteins)) => {
            let protein = proteins.join(sample_id).join(format!("{}.fasta", unit_id));
            if !protein.exists() {
                bail!(
                    "Proteins file for ID '{}' is missing in proteins input (expected {}).",
                    unit_id,
                    protein.display()
                );
            }
            (Some(file.to_path_buf()), Some(protein))
        }
        (Some(_), None) => (Some(file.to_path_buf()), None),
        (None, _) => (None, Some(file.to_path_buf())),
    };

    let gff = match &inputs.loci {
        Some(loci) => {
            let gff = loci.join(sample_id).join(format!("{}.gff", unit_id));
            if !gff.exists() {
                bail!(
                    "GFF file for ID '{}' is missing in loci input (expected {}).",
                    unit_id,
                    gff.display()
                );
            }
            Some(gff)
        }
        None => None,
    };

    Ok(ProcessingUnit {
        sample_id: sample_id.to_string(),
        unit_id: unit_id.to_string(),
        dna,
        protein,
        gff,
    })
}

//=========//
// Results //
//=========//

/// What was produced for one unit.
#[derive(Debug, Serialize)]
pub struct UnitReport {
    /// The unit and its inputs.
    pub unit: ProcessingUnit,

    /// Annotation report.
    pub annotations: PathBuf,

    /// Hit nucleotide sequences, when nucleotide input was given.
    pub genes: Option<PathBuf>,

    /// Hit protein sequences, when protein input was given.
    pub proteins: Option<PathBuf>,

    /// All-mutations report, when an organism was given.
    pub all_mutations: Option<PathBuf>,
}

/// What a whole batch produced.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// One entry per unit, in processing order.
    pub units: Vec<UnitReport>,

    /// Placeholder files inserted into otherwise empty outputs.
    pub placeholders: Vec<PathBuf>,

    /// Repeated FASTA records removed from hit sequence files.
    pub duplicates_removed: usize,
}

//========//
// Runner //
//========//

/// Annotates every unit in `samples`, in sorted sample then unit order.
///
/// The first failing unit aborts the batch. Files written for earlier units
/// stay on disk.
pub fn run_batch<R>(
    runner: &R,
    database: &Path,
    inputs: &AnnotateInputs,
    params: &AmrFinderParams,
    samples: &SampleGroupMap,
    outputs: &OutputArtifactSet,
) -> anyhow::Result<BatchReport>
where
    R: ToolRunner,
{
    let active = ActiveOutputs {
        genes: inputs.sequences.is_some(),
        proteins: inputs.proteins.is_some(),
        all_mutations: params.organism().is_some(),
    };

    let total: usize = samples.values().map(|units| units.len()).sum();
    info!(
        "Annotating {} unit(s) across {} sample group(s)...",
        total.to_formatted_string(&Locale::en),
        samples.len().to_formatted_string(&Locale::en)
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.cyan.bold} {spinner:.green} [{elapsed_precise}] [{bar}] {pos}/{len} ({eta})")
            .progress_chars("=> "),
    );
    pb.set_prefix("Annotating");

    let mut units = Vec::with_capacity(total);
    let mut duplicates_removed = 0;

    for (sample_id, files) in samples {
        outputs.ensure_sample_dirs(sample_id, active)?;

        for (unit_id, file) in files {
            let unit = resolve_companions(inputs, sample_id, unit_id, file)?;
            let unit_outputs = outputs.unit_outputs(sample_id, unit_id);

            debug!("  [*] Processing unit {}.", unit.qualified_id());
            let args = build_args(database, &unit, &unit_outputs, params);
            runner.run(&args)?;

            if params.report_all_equal {
                if unit.dna.is_some() {
                    duplicates_removed += deduplicate_in_place(&unit_outputs.genes)?;
                }
                if unit.protein.is_some() {
                    duplicates_removed += deduplicate_in_place(&unit_outputs.proteins)?;
                }
            }

            units.push(unit_report(unit, unit_outputs, active));
            pb.inc(1);
        }
    }

    pb.finish_and_clear();

    let placeholders = outputs.insert_placeholders(active)?;
    info!(
        "Finished annotating {} unit(s).",
        units.len().to_formatted_string(&Locale::en)
    );

    Ok(BatchReport {
        units,
        placeholders,
        duplicates_removed,
    })
}

fn unit_report(unit: ProcessingUnit, outputs: UnitOutputs, active: ActiveOutputs) -> UnitReport {
    UnitReport {
        annotations: outputs.annotations,
        genes: unit.dna.as_ref().map(|_| outputs.genes),
        proteins: unit.protein.as_ref().map(|_| outputs.proteins),
        all_mutations: active.all_mutations.then_some(outputs.all_mutations),
        unit,
    }
}
