//! The AMRFinderPlus annotation report (`-o` / `--mutation_all` output).
//!
//! # Overview
//!
//! AMRFinderPlus writes one tab-separated row per detected gene or point
//! mutation. Two header variants are in circulation: the _legacy_ naming
//! (`Protein identifier`, `Gene symbol`, ...) written by 3.x releases and the
//! _current_ naming (`Protein id`, `Element symbol`, ...) written by 4.x
//! releases. Both are accepted everywhere in this crate.
//!
//! The four coordinate columns (`Contig id`, `Start`, `Stop`, `Strand`) are
//! only present when nucleotide input was given to the tool, so each variant
//! comes in a with- and a without-coordinates flavour.

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::formats::tsv;

/// Legacy header, coordinates included.
pub const LEGACY_COLUMNS: [&str; 23] = [
    "Protein identifier",
    "Contig id",
    "Start",
    "Stop",
    "Strand",
    "Gene symbol",
    "Sequence name",
    "Scope",
    "Element type",
    "Element subtype",
    "Class",
    "Subclass",
    "Method",
    "Target length",
    "Reference sequence length",
    "% Coverage of reference sequence",
    "% Identity to reference sequence",
    "Alignment length",
    "Accession of closest sequence",
    "Name of closest sequence",
    "HMM id",
    "HMM description",
    "Hierarchy node",
];

/// Current header, coordinates included.
pub const CURRENT_COLUMNS: [&str; 23] = [
    "Protein id",
    "Contig id",
    "Start",
    "Stop",
    "Strand",
    "Element symbol",
    "Element name",
    "Scope",
    "Type",
    "Subtype",
    "Class",
    "Subclass",
    "Method",
    "Target length",
    "Reference sequence length",
    "% Coverage of reference",
    "% Identity to reference",
    "Alignment length",
    "Closest reference accession",
    "Closest reference name",
    "HMM accession",
    "HMM description",
    "Hierarchy node",
];

/// Columns that only exist when nucleotide input was supplied. They always
/// sit directly after the first column.
pub const COORDINATE_COLUMNS: [&str; 4] = ["Contig id", "Start", "Stop", "Strand"];

/// Name of the contig column, shared by both header variants.
pub const CONTIG_ID: &str = "Contig id";

/// The two accepted column namings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schema {
    /// AMRFinderPlus 3.x naming.
    Legacy,

    /// AMRFinderPlus 4.x naming.
    Current,
}

impl Schema {
    /// The full column list, coordinates included.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Schema::Legacy => &LEGACY_COLUMNS,
            Schema::Current => &CURRENT_COLUMNS,
        }
    }

    /// The column list without the coordinate block.
    pub fn columns_without_coordinates(&self) -> Vec<&'static str> {
        let columns = self.columns();
        let mut result = vec![columns[0]];
        result.extend_from_slice(&columns[1 + COORDINATE_COLUMNS.len()..]);
        result
    }

    /// Name of the gene symbol column under this naming.
    pub fn gene_symbol(&self) -> &'static str {
        self.columns()[5]
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Legacy => write!(f, "legacy"),
            Schema::Current => write!(f, "current"),
        }
    }
}

/// A recognised annotation header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Which column naming the header uses.
    pub schema: Schema,

    /// Whether the coordinate block is present.
    pub has_coordinates: bool,
}

impl Header {
    /// Matches an observed header against every accepted variant.
    pub fn detect<'a, I>(observed: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let observed: Vec<&str> = observed.into_iter().collect();

        for schema in [Schema::Current, Schema::Legacy] {
            if observed == schema.columns() {
                return Ok(Header {
                    schema,
                    has_coordinates: true,
                });
            }

            if observed == schema.columns_without_coordinates() {
                return Ok(Header {
                    schema,
                    has_coordinates: false,
                });
            }
        }

        bail!(
            "Header line does not match the AMRFinderPlus annotation format. Must \
            consist of the following values: {}.\n\nWhile {} are optional.\n\n\
            Found instead: {}",
            CURRENT_COLUMNS.join(", "),
            COORDINATE_COLUMNS.join(", "),
            observed.join(", ")
        )
    }
}

/// Validates the header of an annotation report on disk. Empty files are
/// valid and yield `None`.
pub fn validate<P>(src: P) -> anyhow::Result<Option<Header>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    if tsv::is_empty(path)? {
        return Ok(None);
    }

    let mut reader = tsv::reader(path)?;
    let headers = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?;
    let header =
        Header::detect(headers.iter()).with_context(|| format!("validating {}", path.display()))?;

    Ok(Some(header))
}

/// A single row of an AMRFinderPlus annotation report.
///
/// Legacy column names are accepted through serde aliases; the coordinate
/// fields are `None` when the report was produced from protein input only.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AnnotationRecord {
    /// Protein (or, for nucleotide-only searches, `NA`) identifier.
    #[serde(rename = "Protein id", alias = "Protein identifier")]
    pub protein_id: String,

    /// Contig the element was found on.
    #[serde(rename = "Contig id", default)]
    pub contig_id: Option<String>,

    /// 1-based start coordinate.
    #[serde(
        rename = "Start",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub start: Option<u64>,

    /// 1-based stop coordinate.
    #[serde(rename = "Stop", default, deserialize_with = "csv::invalid_option")]
    pub stop: Option<u64>,

    /// `+` or `-`.
    #[serde(rename = "Strand", default)]
    pub strand: Option<String>,

    /// Gene symbol (or point mutation) reported.
    #[serde(rename = "Element symbol", alias = "Gene symbol")]
    pub element_symbol: String,

    /// Name of the element or mutation.
    #[serde(rename = "Element name", alias = "Sequence name", default)]
    pub element_name: String,

    /// `core` or `plus`.
    #[serde(rename = "Scope", default)]
    pub scope: String,

    /// `AMR`, `STRESS` or `VIRULENCE`.
    #[serde(rename = "Type", alias = "Element type", default)]
    pub element_type: String,

    /// `AMR`, `POINT`, `METAL`, ...
    #[serde(rename = "Subtype", alias = "Element subtype", default)]
    pub element_subtype: String,

    /// Drug class.
    #[serde(rename = "Class", default)]
    pub class: String,

    /// Drug subclass.
    #[serde(rename = "Subclass", default)]
    pub subclass: String,

    /// Detection method (`EXACTX`, `BLASTP`, `HMM`, ...).
    #[serde(rename = "Method", default)]
    pub method: String,

    /// Percent of the reference covered by the hit.
    #[serde(
        rename = "% Coverage of reference",
        alias = "% Coverage of reference sequence",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub coverage: Option<f64>,

    /// Percent identity to the reference.
    #[serde(
        rename = "% Identity to reference",
        alias = "% Identity to reference sequence",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub identity: Option<f64>,

    /// Accession of the closest reference sequence.
    #[serde(
        rename = "Closest reference accession",
        alias = "Accession of closest sequence",
        default
    )]
    pub closest_accession: Option<String>,

    /// Node in the reference gene hierarchy (`--print_node`).
    #[serde(rename = "Hierarchy node", default)]
    pub hierarchy_node: Option<String>,
}

/// The header and rows of one annotation report.
#[derive(Debug)]
pub struct AnnotationReport {
    /// The validated header.
    pub header: Header,

    /// Every row in file order.
    pub records: Vec<AnnotationRecord>,
}

/// Reads and validates an annotation report. Fails on empty files; callers
/// that tolerate them should check [`tsv::is_empty`] first.
pub fn read<P>(src: P) -> anyhow::Result<AnnotationReport>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    let header = match validate(path)? {
        Some(header) => header,
        None => bail!("annotation file is empty: {}", path.display()),
    };

    let mut reader = tsv::reader(path)?;
    let mut records = Vec::new();

    for (i, result) in reader.deserialize().enumerate() {
        let record: AnnotationRecord = result
            .with_context(|| format!("parsing row {} of {}", i + 1, path.display()))?;
        records.push(record);
    }

    Ok(AnnotationReport { header, records })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Renders one annotation row under `schema`, filling the columns that
    /// the aggregations do not look at with plausible values.
    pub(crate) fn row(coordinates: Option<(&str, u64, u64, &str)>, gene: &str) -> String {
        let mut fields = vec![String::from("NA")];
        if let Some((contig, start, stop, strand)) = coordinates {
            fields.push(contig.to_string());
            fields.push(start.to_string());
            fields.push(stop.to_string());
            fields.push(strand.to_string());
        }
        fields.push(gene.to_string());
        fields.extend(
            [
                "class A beta-lactamase",
                "core",
                "AMR",
                "AMR",
                "BETA-LACTAM",
                "BETA-LACTAM",
                "BLASTX",
                "286",
                "286",
                "100.00",
                "99.65",
                "286",
                "WP_000027057.1",
                "class A beta-lactamase TEM-1",
                "NA",
                "NA",
                gene,
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        fields.join("\t")
    }

    /// Renders a complete report.
    pub(crate) fn report(
        schema: Schema,
        with_coordinates: bool,
        rows: &[(Option<(&str, u64, u64, &str)>, &str)],
    ) -> String {
        let header = match with_coordinates {
            true => schema.columns().join("\t"),
            false => schema.columns_without_coordinates().join("\t"),
        };
        let mut lines = vec![header];
        for (coordinates, gene) in rows {
            lines.push(row(*coordinates, gene));
        }
        lines.join("\n") + "\n"
    }

    #[test]
    fn test_header_detection_accepts_all_four_variants() {
        for schema in [Schema::Legacy, Schema::Current] {
            let full = Header::detect(schema.columns().iter().copied()).unwrap();
            assert_eq!(full.schema, schema);
            assert!(full.has_coordinates);

            let short = Header::detect(schema.columns_without_coordinates()).unwrap();
            assert_eq!(short.schema, schema);
            assert!(!short.has_coordinates);
        }
    }

    #[test]
    fn test_header_detection_rejects_mixed_naming() {
        let mut columns: Vec<&str> = LEGACY_COLUMNS.to_vec();
        columns[5] = "Element symbol";
        let err = Header::detect(columns).unwrap_err();
        assert!(err.to_string().contains("Found instead: Protein identifier"));
    }

    #[test]
    fn test_columns_without_coordinates_drops_the_block() {
        let columns = Schema::Legacy.columns_without_coordinates();
        assert_eq!(columns.len(), 19);
        assert_eq!(columns[0], "Protein identifier");
        assert_eq!(columns[1], "Gene symbol");
        assert_eq!(Schema::Current.gene_symbol(), "Element symbol");
    }

    #[test]
    fn test_read_legacy_report_with_coordinates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let content = report(
            Schema::Legacy,
            true,
            &[(Some(("contig_1", 10, 870, "+")), "blaTEM-1")],
        );
        file.write_all(content.as_bytes()).unwrap();

        let report = read(file.path()).unwrap();
        assert_eq!(report.header.schema, Schema::Legacy);
        assert_eq!(report.records.len(), 1);

        let record = &report.records[0];
        assert_eq!(record.contig_id.as_deref(), Some("contig_1"));
        assert_eq!(record.start, Some(10));
        assert_eq!(record.stop, Some(870));
        assert_eq!(record.strand.as_deref(), Some("+"));
        assert_eq!(record.element_symbol, "blaTEM-1");
        assert_eq!(record.identity, Some(99.65));
    }

    #[test]
    fn test_read_current_report_without_coordinates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let content = report(Schema::Current, false, &[(None, "mecA")]);
        file.write_all(content.as_bytes()).unwrap();

        let report = read(file.path()).unwrap();
        assert!(!report.header.has_coordinates);
        assert_eq!(report.records[0].contig_id, None);
        assert_eq!(report.records[0].start, None);
        assert_eq!(report.records[0].element_symbol, "mecA");
    }

    #[test]
    fn test_empty_file_is_valid_but_unreadable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(validate(file.path()).unwrap(), None);
        assert!(read(file.path()).is_err());
    }
}
