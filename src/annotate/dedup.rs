//! Removing repeated records from hit FASTA files.
//!
//! With `--report_all_equal`, AMRFinderPlus writes one FASTA record per
//! equally-scoring hit, so the same sequence identifier can appear several
//! times. Downstream consumers key sequences by identifier, so only the
//! first record of each identifier is kept.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::formats::fasta;
use crate::utils::path::AppendExtension;

/// Rewrites the FASTA file at `path` keeping the first record of every
/// identifier. Missing files are left alone. Returns the number of records
/// dropped.
pub fn deduplicate_in_place(path: &Path) -> anyhow::Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let scratch = path
        .to_path_buf()
        .append_extension("dedup")
        .with_context(|| format!("building scratch path for {}", path.display()))?;

    let (kept, dropped) = fasta::copy_unique_records(path, &scratch)?;
    fs::rename(&scratch, path)
        .with_context(|| format!("replacing {} with deduplicated records", path.display()))?;

    debug!(
        "  [*] Deduplicated {}: kept {}, dropped {}.",
        path.display(),
        kept,
        dropped
    );

    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_record_of_each_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mag1_amr_genes.fasta");
        fs::write(
            &path,
            ">blaTEM-1 first\nACGT\n>mecA\nTTTT\n>blaTEM-1 second\nGGGG\n",
        )
        .unwrap();

        let dropped = deduplicate_in_place(&path).unwrap();
        assert_eq!(dropped, 1);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, ">blaTEM-1 first\nACGT\n>mecA\nTTTT\n");
        assert!(!dir.path().join("mag1_amr_genes.fasta.dedup").exists());
    }

    #[test]
    fn test_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.fasta");
        assert_eq!(deduplicate_in_place(&missing).unwrap(), 0);
        assert!(!missing.exists());

        let empty = dir.path().join("empty.fasta");
        fs::write(&empty, "").unwrap();
        assert_eq!(deduplicate_in_place(&empty).unwrap(), 0);
        assert_eq!(fs::read_to_string(&empty).unwrap(), "");
    }
}
