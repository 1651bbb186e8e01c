//! A single unit of annotation work.

use std::path::PathBuf;

use serde::Serialize;

/// One genome, MAG, contig set or protein set that is annotated by exactly
/// one AMRFinderPlus invocation.
///
/// At least one of `dna` and `protein` is set for every unit handed to the
/// batch runner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessingUnit {
    /// The sample this unit belongs to (empty when ungrouped).
    pub sample_id: String,

    /// Identifier of the unit, unique within its sample.
    pub unit_id: String,

    /// Nucleotide FASTA.
    pub dna: Option<PathBuf>,

    /// Protein FASTA.
    pub protein: Option<PathBuf>,

    /// GFF linking the proteins to nucleotide coordinates.
    pub gff: Option<PathBuf>,
}

impl ProcessingUnit {
    /// `sample/unit`, or just `unit` when the unit is ungrouped.
    pub fn qualified_id(&self) -> String {
        qualified_id(&self.sample_id, &self.unit_id)
    }
}

/// Joins a grouping id and a unit id with `/`, omitting an empty grouping id.
pub fn qualified_id(sample_id: &str, unit_id: &str) -> String {
    match sample_id.is_empty() {
        true => unit_id.to_string(),
        false => format!("{}/{}", sample_id, unit_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_id() {
        assert_eq!(qualified_id("sample1", "mag1"), "sample1/mag1");
        assert_eq!(qualified_id("", "mag1"), "mag1");
    }
}
