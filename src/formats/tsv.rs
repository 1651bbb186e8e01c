//! Utilities related to opening and writing tab-separated files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;

/// Attempts to open a headered, tab-separated file for reading.
///
/// Quoting is disabled: AMRFinderPlus never quotes its fields, and names of
/// closest reference sequences routinely contain `"` characters.
pub fn reader<P>(src: P) -> anyhow::Result<csv::Reader<File>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .from_path(path)
        .with_context(|| format!("opening TSV file: {}", path.display()))
}

/// Creates a tab-separated writer over any destination.
pub fn writer<W>(dst: W) -> csv::Writer<W>
where
    W: Write,
{
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(dst)
}

/// Opens the destination of a table: the file at `dst` when given, standard
/// output otherwise.
pub fn destination(dst: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match dst {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Whether the file at `path` has no content at all (not even a header).
pub fn is_empty<P>(path: P) -> anyhow::Result<bool>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?;
    Ok(metadata.len() == 0)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_reader_does_not_interpret_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.tsv");
        fs::write(&path, "Name\tClass\n\"tetracycline\" efflux\tTETRACYCLINE\n").unwrap();

        let mut reader = reader(&path).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "\"tetracycline\" efflux");
    }

    #[test]
    fn test_destination_file_and_emptiness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv");

        {
            let mut dst = destination(Some(path.as_path())).unwrap();
            dst.flush().unwrap();
        }
        assert!(is_empty(&path).unwrap());

        {
            let mut dst = writer(destination(Some(path.as_path())).unwrap());
            dst.write_record(["a", "b"]).unwrap();
            dst.flush().unwrap();
        }
        assert!(!is_empty(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\tb\n");
    }
}
