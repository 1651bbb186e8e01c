//! Turning the input directory trees into a sorted map of processing units.
//!
//! # Overview
//!
//! Nucleotide inputs come in three shapes:
//!
//! * per-sample MAGs: `root/{sample}/{mag}.fasta`,
//! * per-sample contigs: `root/{sample}_contigs.fasta`,
//! * feature MAGs: `root/{mag}.fasta`.
//!
//! The shape is captured once as a [`SequenceLayout`] (detected from the
//! directory structure unless given explicitly) and every later step branches
//! on that tag. Protein inputs are classified purely by whether the root
//! contains any subdirectory.
//!
//! Whatever the shape, the result is a [`SampleGroupMap`]. Flat shapes are
//! wrapped under the [`UNGROUPED`] key.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::layout::UNGROUPED;
use crate::utils::path::{file_name_str, file_stem_str, is_hidden};

/// Nucleotide FASTA file names.
const NUCLEOTIDE_PATTERN: &str = r"^.+\.(fa|fasta)$";

/// Protein FASTA file names.
const PROTEIN_PATTERN: &str = r"^.+\.(fa|faa|fasta)$";

/// Stem suffix of per-sample contig files.
const CONTIGS_SUFFIX: &str = "_contigs";

/// grouping id → { unit id → file path }, both levels sorted by key.
pub type SampleGroupMap = BTreeMap<String, BTreeMap<String, PathBuf>>;

//=================//
// Sequence layout //
//=================//

/// The shape of a nucleotide input directory.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceLayout {
    /// One subdirectory per sample, one FASTA per MAG inside it.
    PerSample,

    /// One `{sample}_contigs.fasta` per sample at the top level.
    Contigs,

    /// One FASTA per MAG at the top level, with no sample grouping.
    Mags,
}

impl SequenceLayout {
    /// Classifies a nucleotide input directory by its structure alone.
    ///
    /// Any subdirectory makes it [`SequenceLayout::PerSample`]. Otherwise, if
    /// every FASTA file is named `*_contigs.fa(sta)`, it is
    /// [`SequenceLayout::Contigs`]; else [`SequenceLayout::Mags`].
    pub fn detect<P>(root: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let root = root.as_ref();
        let pattern = Regex::new(NUCLEOTIDE_PATTERN)?;
        let entries = list_dir(root)?;

        if entries.iter().any(|entry| entry.is_dir()) {
            return Ok(SequenceLayout::PerSample);
        }

        let mut stems = Vec::new();
        for entry in &entries {
            if pattern.is_match(file_name_str(entry)?) {
                stems.push(file_stem_str(entry)?);
            }
        }

        match !stems.is_empty() && stems.iter().all(|stem| stem.ends_with(CONTIGS_SUFFIX)) {
            true => Ok(SequenceLayout::Contigs),
            false => Ok(SequenceLayout::Mags),
        }
    }
}

impl fmt::Display for SequenceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceLayout::PerSample => write!(f, "per-sample"),
            SequenceLayout::Contigs => write!(f, "contigs"),
            SequenceLayout::Mags => write!(f, "mags"),
        }
    }
}

/// A nucleotide input directory together with its shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceInput {
    /// Root of the directory tree.
    pub path: PathBuf,

    /// Shape of the tree.
    pub layout: SequenceLayout,
}

impl SequenceInput {
    /// Pairs `path` with `layout`, detecting the layout when none is given.
    pub fn new<P>(path: P, layout: Option<SequenceLayout>) -> anyhow::Result<Self>
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        let layout = match layout {
            Some(layout) => layout,
            None => {
                let layout = SequenceLayout::detect(&path)?;
                debug!("Detected {} layout for {}.", layout, path.display());
                layout
            }
        };

        Ok(SequenceInput { path, layout })
    }
}

//============//
// Resolution //
//============//

/// Resolves the processing units of a run.
///
/// Nucleotide input, when present, drives the resolution; protein input only
/// does when it is the sole input (its companion role is handled per unit by
/// the batch runner).
pub fn resolve_units(
    sequences: Option<&SequenceInput>,
    proteins: Option<&Path>,
) -> anyhow::Result<SampleGroupMap> {
    let (root, map) = match (sequences, proteins) {
        (Some(sequences), _) => {
            let pattern = Regex::new(NUCLEOTIDE_PATTERN)?;
            let map = match sequences.layout {
                SequenceLayout::PerSample => grouped(&sequences.path, &pattern)?,
                SequenceLayout::Contigs => ungrouped(flat(&sequences.path, &pattern, contig_id)?),
                SequenceLayout::Mags => ungrouped(flat(&sequences.path, &pattern, stem_id)?),
            };
            (sequences.path.as_path(), map)
        }
        (None, Some(proteins)) => {
            let pattern = Regex::new(PROTEIN_PATTERN)?;
            let has_subdirectories = list_dir(proteins)?.iter().any(|entry| entry.is_dir());
            let map = match has_subdirectories {
                true => grouped(proteins, &pattern)?,
                false => ungrouped(flat(proteins, &pattern, stem_id)?),
            };
            (proteins, map)
        }
        (None, None) => bail!("no sequence or protein input to resolve units from"),
    };

    if map.values().all(|units| units.is_empty()) {
        bail!("no FASTA files were found in {}", root.display());
    }

    Ok(map)
}

/// `root/{sample}/{unit}.fasta` → { sample → { unit → path } }.
fn grouped(root: &Path, pattern: &Regex) -> anyhow::Result<SampleGroupMap> {
    let mut map = SampleGroupMap::new();

    for entry in list_dir(root)? {
        if !entry.is_dir() {
            continue;
        }

        let sample_id = file_name_str(&entry)?.to_string();
        let units = flat(&entry, pattern, stem_id)?;
        map.insert(sample_id, units);
    }

    Ok(map)
}

/// Every matching file directly in `root`, keyed by `id_of` applied to the
/// file stem.
fn flat(
    root: &Path,
    pattern: &Regex,
    id_of: fn(&str) -> &str,
) -> anyhow::Result<BTreeMap<String, PathBuf>> {
    let mut units = BTreeMap::new();

    for entry in list_dir(root)? {
        if entry.is_dir() || !pattern.is_match(file_name_str(&entry)?) {
            continue;
        }

        let id = id_of(file_stem_str(&entry)?).to_string();
        if let Some(previous) = units.insert(id.clone(), entry.clone()) {
            bail!(
                "duplicate id '{}' in {}: both {} and {} map to it",
                id,
                root.display(),
                previous.display(),
                entry.display()
            );
        }
    }

    Ok(units)
}

fn ungrouped(units: BTreeMap<String, PathBuf>) -> SampleGroupMap {
    SampleGroupMap::from([(UNGROUPED.to_string(), units)])
}

fn stem_id(stem: &str) -> &str {
    stem
}

fn contig_id(stem: &str) -> &str {
    stem.strip_suffix(CONTIGS_SUFFIX).unwrap_or(stem)
}

/// Non-hidden entries of a directory.
pub(crate) fn list_dir(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("reading directory: {}", root.display()))?
    {
        let path = entry
            .with_context(|| format!("reading entry of {}", root.display()))?
            .path();
        if !is_hidden(&path) {
            entries.push(path);
        }
    }

    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, ">seq\nACGT\n").unwrap();
    }

    #[test]
    fn test_per_sample_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mag = dir.path().join("sample1").join("mag.fasta");
        touch(&mag);

        let input = SequenceInput::new(dir.path(), None).unwrap();
        assert_eq!(input.layout, SequenceLayout::PerSample);

        let map = resolve_units(Some(&input), None).unwrap();
        assert_eq!(
            map,
            SampleGroupMap::from([(
                String::from("sample1"),
                BTreeMap::from([(String::from("mag"), mag)])
            )])
        );
    }

    #[test]
    fn test_flat_contigs_tree() {
        let dir = tempfile::tempdir().unwrap();
        let contigs = dir.path().join("sample1_contigs.fasta");
        touch(&contigs);

        let input = SequenceInput::new(dir.path(), None).unwrap();
        assert_eq!(input.layout, SequenceLayout::Contigs);

        let map = resolve_units(Some(&input), None).unwrap();
        assert_eq!(
            map,
            SampleGroupMap::from([(
                String::new(),
                BTreeMap::from([(String::from("sample1"), contigs)])
            )])
        );
    }

    #[test]
    fn test_feature_mags_tree() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("mag_b.fa"));
        touch(&dir.path().join("mag_a.fasta"));
        fs::write(dir.path().join("MANIFEST"), "sample-id,filename\n").unwrap();

        let input = SequenceInput::new(dir.path(), None).unwrap();
        assert_eq!(input.layout, SequenceLayout::Mags);

        let map = resolve_units(Some(&input), None).unwrap();
        let units: Vec<&String> = map[""].keys().collect();
        assert_eq!(units, vec!["mag_a", "mag_b"]);
    }

    #[test]
    fn test_both_levels_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for (sample, mag) in [("s2", "m2"), ("s1", "m9"), ("s1", "m1"), ("s2", "m0")] {
            touch(&dir.path().join(sample).join(format!("{}.fasta", mag)));
        }

        let input = SequenceInput::new(dir.path(), Some(SequenceLayout::PerSample)).unwrap();
        let map = resolve_units(Some(&input), None).unwrap();

        let order: Vec<(String, String)> = map
            .iter()
            .flat_map(|(sample, units)| {
                units
                    .keys()
                    .map(move |unit| (sample.clone(), unit.clone()))
            })
            .collect();
        assert_eq!(
            order,
            vec![
                (String::from("s1"), String::from("m1")),
                (String::from("s1"), String::from("m9")),
                (String::from("s2"), String::from("m0")),
                (String::from("s2"), String::from("m2")),
            ]
        );
    }

    #[test]
    fn test_protein_only_classification() {
        let grouped_dir = tempfile::tempdir().unwrap();
        touch(&grouped_dir.path().join("sample1").join("mag1.faa"));
        let map = resolve_units(None, Some(grouped_dir.path())).unwrap();
        assert!(map["sample1"].contains_key("mag1"));

        let flat_dir = tempfile::tempdir().unwrap();
        touch(&flat_dir.path().join("mag1.faa"));
        let map = resolve_units(None, Some(flat_dir.path())).unwrap();
        assert!(map[""].contains_key("mag1"));
    }

    #[test]
    fn test_sequences_take_precedence_over_proteins() {
        let sequences = tempfile::tempdir().unwrap();
        let proteins = tempfile::tempdir().unwrap();
        touch(&sequences.path().join("sample1").join("mag1.fasta"));
        touch(&proteins.path().join("other.faa"));

        let input = SequenceInput::new(sequences.path(), None).unwrap();
        let map = resolve_units(Some(&input), Some(proteins.path())).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["sample1"]);
    }

    #[test]
    fn test_duplicate_ids_and_empty_inputs_fail() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("mag1.fa"));
        touch(&dir.path().join("mag1.fasta"));
        let input = SequenceInput::new(dir.path(), None).unwrap();
        let err = resolve_units(Some(&input), None).unwrap_err();
        assert!(err.to_string().contains("duplicate id 'mag1'"));

        let empty = tempfile::tempdir().unwrap();
        let input = SequenceInput::new(empty.path(), None).unwrap();
        let err = resolve_units(Some(&input), None).unwrap_err();
        assert!(err.to_string().contains("no FASTA files were found"));
    }
}
