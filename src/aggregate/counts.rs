//! Sample × gene count table.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::debug;

use crate::aggregate::matrix::FrequencyMatrix;
use crate::formats::{annotation, tsv};
use crate::layout::annotations::annotation_map;
use crate::layout::unit::qualified_id;

/// Row label of the table.
pub const INDEX_NAME: &str = "sample_id";

/// How often each gene symbol occurs in one unit's report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneCounts {
    /// The unit-qualified id (`sample/unit`).
    pub id: String,

    /// gene symbol → occurrences.
    pub counts: BTreeMap<String, u64>,
}

/// Counts the gene symbols of the report at `path`. A file without any
/// content yields no counts.
pub fn gene_counts<P>(path: P, id: &str) -> anyhow::Result<GeneCounts>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut counts = BTreeMap::new();

    if !tsv::is_empty(path)? {
        for record in annotation::read(path)?.records {
            *counts.entry(record.element_symbol).or_default() += 1;
        }
    }

    Ok(GeneCounts {
        id: id.to_string(),
        counts,
    })
}

/// Outer-merges per-unit gene counts into a unit × gene table. Rows follow
/// the order of `frames`; units without any gene are left out.
pub fn count_table(frames: Vec<GeneCounts>) -> anyhow::Result<FrequencyMatrix> {
    let frames: Vec<GeneCounts> = frames
        .into_iter()
        .filter(|frame| !frame.counts.is_empty())
        .collect();

    if frames.is_empty() {
        bail!("No AMR genes could be identified and no output can be created.");
    }

    debug!("Merging gene counts of {} unit(s).", frames.len());

    Ok(FrequencyMatrix::from_rows(
        INDEX_NAME,
        frames.into_iter().map(|frame| (frame.id, frame.counts)),
    ))
}

/// Builds the count table over every report in the directory at `root`,
/// labelling rows `sample/unit` (or `unit` for top-level reports).
pub fn count_table_from_dir<P>(root: P) -> anyhow::Result<FrequencyMatrix>
where
    P: AsRef<Path>,
{
    let root = root.as_ref();
    let reports = annotation_map(root)
        .with_context(|| format!("listing reports in {}", root.display()))?;

    let mut frames = Vec::new();
    for (sample_id, units) in &reports {
        for (unit_id, path) in units {
            frames.push(gene_counts(path, &qualified_id(sample_id, unit_id))?);
        }
    }

    count_table(frames)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::formats::annotation::tests::report;
    use crate::formats::annotation::Schema;

    fn counts(id: &str, genes: &[(&str, u64)]) -> GeneCounts {
        GeneCounts {
            id: id.to_string(),
            counts: genes
                .iter()
                .map(|(gene, count)| (gene.to_string(), *count))
                .collect(),
        }
    }

    #[test]
    fn test_partially_overlapping_gene_sets() {
        let table = count_table(vec![
            counts("s1/m1", &[("blaTEM", 1), ("mecA", 2)]),
            counts("s2/m1", &[("mecA", 1), ("vanA", 3)]),
        ])
        .unwrap();

        assert_eq!(table.index_name, "sample_id");
        assert_eq!(table.rows, vec!["s1/m1", "s2/m1"]);
        assert_eq!(table.columns, vec!["blaTEM", "mecA", "vanA"]);
        assert_eq!(table.values, vec![vec![1, 2, 0], vec![0, 1, 3]]);
    }

    #[test]
    fn test_nothing_detected() {
        let err = count_table(vec![]).unwrap_err();
        assert!(err
            .to_string()
            .contains("No AMR genes could be identified"));

        let err = count_table(vec![counts("s1/m1", &[])]).unwrap_err();
        assert!(err
            .to_string()
            .contains("No AMR genes could be identified"));
    }

    #[test]
    fn test_gene_counts_from_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m1_amr_annotations.tsv");
        fs::write(
            &path,
            report(
                Schema::Legacy,
                false,
                &[(None, "mecA"), (None, "blaTEM"), (None, "mecA")],
            ),
        )
        .unwrap();

        let frame = gene_counts(&path, "s1/m1").unwrap();
        assert_eq!(frame, counts("s1/m1", &[("blaTEM", 1), ("mecA", 2)]));
    }

    #[test]
    fn test_count_table_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("s1")).unwrap();
        fs::write(
            dir.path().join("s1/m1_amr_annotations.tsv"),
            report(Schema::Current, false, &[(None, "mecA")]),
        )
        .unwrap();
        fs::write(
            dir.path().join("s1/m2_amr_annotations.tsv"),
            report(Schema::Current, false, &[]),
        )
        .unwrap();
        fs::write(
            dir.path().join("m3_amr_annotations.tsv"),
            report(Schema::Legacy, true, &[(Some(("c1", 1, 90, "+")), "vanA")]),
        )
        .unwrap();

        let table = count_table_from_dir(dir.path()).unwrap();
        assert_eq!(table.rows, vec!["m3", "s1/m1"]);
        assert_eq!(table.columns, vec!["mecA", "vanA"]);
        assert_eq!(table.values, vec![vec![0, 1], vec![1, 0]]);
    }
}
