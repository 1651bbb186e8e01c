//! The output directories of an annotation run and the per-unit file names
//! inside them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;

/// Suffix of per-unit annotation reports.
pub const ANNOTATIONS_SUFFIX: &str = "_amr_annotations";

/// Suffix of per-unit all-mutations reports.
pub const ALL_MUTATIONS_SUFFIX: &str = "_amr_all_mutations";

/// Placeholder inserted into sequence outputs that received no files.
pub const EMPTY_FASTA: &str = "empty.fasta";

/// Placeholder inserted into the all-mutations output when no organism was
/// given.
pub const EMPTY_ALL_MUTATIONS: &str = "empty_amr_all_mutations.tsv";

/// Paths of the files AMRFinderPlus writes for one processing unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnitOutputs {
    /// Gene and mutation annotations (`-o`).
    pub annotations: PathBuf,

    /// Nucleotide sequences of the hits (`--nucleotide_output`).
    pub genes: PathBuf,

    /// Protein sequences of the hits (`--protein_output`).
    pub proteins: PathBuf,

    /// Report of every screened locus (`--mutation_all`).
    pub all_mutations: PathBuf,
}

/// Which output categories will actually be populated by a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveOutputs {
    /// Nucleotide input was given, so hit sequences are written.
    pub genes: bool,

    /// Protein input was given, so hit proteins are written.
    pub proteins: bool,

    /// An organism was given, so the all-mutations report is written.
    pub all_mutations: bool,
}

/// The four output directories of a run.
#[derive(Clone, Debug, Serialize)]
pub struct OutputArtifactSet {
    /// `amr_annotations/`
    pub annotations: PathBuf,

    /// `amr_all_mutations/`
    pub all_mutations: PathBuf,

    /// `amr_genes/`
    pub genes: PathBuf,

    /// `amr_proteins/`
    pub proteins: PathBuf,
}

impl OutputArtifactSet {
    /// Lays out the output directories under `root` without touching the
    /// filesystem.
    pub fn under<P>(root: P) -> Self
    where
        P: AsRef<Path>,
    {
        let root = root.as_ref();
        OutputArtifactSet {
            annotations: root.join("amr_annotations"),
            all_mutations: root.join("amr_all_mutations"),
            genes: root.join("amr_genes"),
            proteins: root.join("amr_proteins"),
        }
    }

    /// Creates the (empty) output directories under `root`. Refuses to reuse
    /// a directory that already has content: `root` may only hold the four
    /// output directories, and those must be empty.
    pub fn create<P>(root: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let root = root.as_ref();
        let set = Self::under(root);

        if root.exists() {
            let entries = fs::read_dir(root)
                .with_context(|| format!("reading output directory: {}", root.display()))?;
            for entry in entries {
                let path = entry
                    .with_context(|| format!("reading entry of {}", root.display()))?
                    .path();
                if !set.dirs().contains(&path.as_path()) {
                    bail!(
                        "refusing to write into non-empty output directory: {} (found {}). \
                        Please delete it or choose another output directory.",
                        root.display(),
                        path.display()
                    );
                }
            }
        }

        for dir in set.dirs() {
            if dir.exists() {
                let mut entries = fs::read_dir(dir)
                    .with_context(|| format!("reading output directory: {}", dir.display()))?;
                if entries.next().is_some() {
                    bail!(
                        "refusing to write into non-empty output directory: {}. Please \
                        delete it or choose another output directory.",
                        dir.display()
                    );
                }
            }

            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory: {}", dir.display()))?;
        }

        Ok(set)
    }

    fn dirs(&self) -> [&Path; 4] {
        [
            self.annotations.as_path(),
            self.all_mutations.as_path(),
            self.genes.as_path(),
            self.proteins.as_path(),
        ]
    }

    /// Ensures the per-sample subdirectories exist in every active output.
    /// Safe to call repeatedly for the same sample.
    pub fn ensure_sample_dirs(&self, sample_id: &str, active: ActiveOutputs) -> anyhow::Result<()> {
        let mut dirs = vec![&self.annotations];
        if active.genes {
            dirs.push(&self.genes);
        }
        if active.proteins {
            dirs.push(&self.proteins);
        }
        if active.all_mutations {
            dirs.push(&self.all_mutations);
        }

        for dir in dirs {
            let dir = dir.join(sample_id);
            fs::create_dir_all(&dir)
                .with_context(|| format!("creating sample directory: {}", dir.display()))?;
        }

        Ok(())
    }

    /// The conventional output paths for one unit of one sample. An empty
    /// `sample_id` places the files at the top of each output.
    pub fn unit_outputs(&self, sample_id: &str, unit_id: &str) -> UnitOutputs {
        UnitOutputs {
            annotations: self
                .annotations
                .join(sample_id)
                .join(format!("{}{}.tsv", unit_id, ANNOTATIONS_SUFFIX)),
            genes: self
                .genes
                .join(sample_id)
                .join(format!("{}_amr_genes.fasta", unit_id)),
            proteins: self
                .proteins
                .join(sample_id)
                .join(format!("{}_amr_proteins.fasta", unit_id)),
            all_mutations: self
                .all_mutations
                .join(sample_id)
                .join(format!("{}{}.tsv", unit_id, ALL_MUTATIONS_SUFFIX)),
        }
    }

    /// Inserts an empty placeholder file into every output whose input
    /// category was absent for the whole run, so no output is left without
    /// files. Returns the placeholders created.
    pub fn insert_placeholders(&self, active: ActiveOutputs) -> anyhow::Result<Vec<PathBuf>> {
        let mut created = Vec::new();

        if !active.genes {
            created.push(touch(self.genes.join(EMPTY_FASTA))?);
            info!("\"amr_genes\" output is empty because no \"--sequences\" input was given.");
        }

        if !active.proteins {
            created.push(touch(self.proteins.join(EMPTY_FASTA))?);
            info!("\"amr_proteins\" output is empty because no \"--proteins\" input was given.");
        }

        if !active.all_mutations {
            created.push(touch(self.all_mutations.join(EMPTY_ALL_MUTATIONS))?);
            info!(
                "\"amr_all_mutations\" output is empty because no \"--organism\" parameter \
                was given."
            );
        }

        Ok(created)
    }
}

fn touch(path: PathBuf) -> anyhow::Result<PathBuf> {
    fs::File::create(&path)
        .with_context(|| format!("creating placeholder file: {}", path.display()))?;
    Ok(path)
}
