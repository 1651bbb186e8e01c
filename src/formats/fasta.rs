//! Utilities related to opening and rewriting FASTA files.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use noodles::fasta;

/// Attempts to open a FASTA file from a given source.
pub fn open<P>(src: P) -> anyhow::Result<fasta::Reader<BufReader<File>>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    let file =
        File::open(path).with_context(|| format!("opening FASTA file: {}", path.display()))?;
    Ok(fasta::Reader::new(BufReader::new(file)))
}

/// Copies every record from `src` to `dst`, skipping records whose name has
/// already been written. Returns `(kept, dropped)`.
pub fn copy_unique_records<P, Q>(src: P, dst: Q) -> anyhow::Result<(usize, usize)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let src = src.as_ref();
    let dst = dst.as_ref();

    let mut reader = open(src)?;
    let file =
        File::create(dst).with_context(|| format!("creating FASTA file: {}", dst.display()))?;
    let mut writer = fasta::Writer::new(file);

    let mut seen = HashSet::new();
    let (mut kept, mut dropped) = (0, 0);

    for result in reader.records() {
        let record = result.with_context(|| format!("reading FASTA record from {}", src.display()))?;

        if seen.insert(record.name().to_string()) {
            writer
                .write_record(&record)
                .with_context(|| format!("writing FASTA record to {}", dst.display()))?;
            kept += 1;
        } else {
            dropped += 1;
        }
    }

    Ok((kept, dropped))
}
