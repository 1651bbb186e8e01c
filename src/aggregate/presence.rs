//! Contig × gene frequency matrix.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context};
use tracing::debug;

use crate::aggregate::matrix::FrequencyMatrix;
use crate::formats::{annotation, tsv};
use crate::layout::annotations::annotation_map;
use crate::layout::SampleGroupMap;

/// Row label of the matrix.
pub const INDEX_NAME: &str = "Contig id";

/// Builds the contig × gene matrix over every report in `reports`.
///
/// Only contig id, gene symbol, start, stop and strand are considered;
/// rows that are identical in all five count once. A cell holds how many
/// distinct hits of that gene sit on that contig.
pub fn presence_matrix(reports: &SampleGroupMap) -> anyhow::Result<FrequencyMatrix> {
    if reports.values().all(|units| units.is_empty()) {
        bail!("no AMRFinderPlus reports were given, so no feature table can be created.");
    }

    let mut hits = BTreeSet::new();

    for path in reports.values().flat_map(|units| units.values()) {
        if tsv::is_empty(path)? {
            bail!(
                "File is empty: {}. The all mutations output is empty if no organism \
                was specified.",
                path.display()
            );
        }

        let report = annotation::read(path)?;
        if !report.header.has_coordinates {
            bail!(
                "{} has no \"{}\" column. If the annotations were created solely from \
                protein data, there is no positional information and no gene abundance \
                per contig can be calculated.",
                path.display(),
                annotation::CONTIG_ID
            );
        }

        for record in report.records {
            if let Some(contig) = record.contig_id {
                hits.insert((
                    contig,
                    record.element_symbol,
                    record.start,
                    record.stop,
                    record.strand,
                ));
            }
        }
    }

    debug!("Collected {} distinct hits.", hits.len());

    let mut rows: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for (contig, gene, ..) in hits {
        *rows.entry(contig).or_default().entry(gene).or_default() += 1;
    }

    Ok(FrequencyMatrix::from_rows(INDEX_NAME, rows))
}

/// Builds the contig × gene matrix over every report in the directory at
/// `root`.
pub fn presence_matrix_from_dir<P>(root: P) -> anyhow::Result<FrequencyMatrix>
where
    P: AsRef<Path>,
{
    let root = root.as_ref();
    let reports = annotation_map(root)
        .with_context(|| format!("listing reports in {}", root.display()))?;

    if reports.values().all(|units| units.is_empty()) {
        bail!("no AMRFinderPlus reports were found in {}", root.display());
    }

    presence_matrix(&reports)
}
