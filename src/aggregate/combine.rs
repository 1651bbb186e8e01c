//! Long-format view of many reports: every row of every report, tagged with
//! the id of the unit it came from.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use indexmap::IndexSet;
use tracing::debug;

use crate::formats::tsv;
use crate::layout::annotations::annotation_map;
use crate::layout::unit::qualified_id;

/// Name of the dense row index.
pub const INDEX_NAME: &str = "id";

/// Name of the inserted unit id column.
pub const ID_COLUMN: &str = "Sample/MAG_ID";

/// The rows of one report, tagged with a unit id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedFrame {
    /// Unit id (`sample/unit` or `unit`).
    pub id: String,

    /// The report's own header.
    pub columns: Vec<String>,

    /// The report's rows.
    pub rows: Vec<Vec<String>>,
}

/// Reads the report at `path` and tags it with `id`. Files without any
/// content yield a frame without columns or rows.
pub fn read_tagged<P>(path: P, id: &str) -> anyhow::Result<TaggedFrame>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut frame = TaggedFrame {
        id: id.to_string(),
        columns: Vec::new(),
        rows: Vec::new(),
    };

    if tsv::is_empty(path)? {
        debug!("Skipping empty report {}.", path.display());
        return Ok(frame);
    }

    let mut reader = tsv::reader(path)?;
    frame.columns = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(String::from)
        .collect();

    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {} of {}", i + 1, path.display()))?;
        frame.rows.push(record.iter().map(String::from).collect());
    }

    Ok(frame)
}

/// All tagged rows, sorted by unit id, with a dense `"0"`, `"1"`, ... index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombinedTable {
    /// Column names, starting with [`ID_COLUMN`].
    pub columns: Vec<String>,

    /// `(index, values)` pairs; `values` lines up with `columns`.
    pub rows: Vec<(String, Vec<String>)>,
}

impl CombinedTable {
    /// Writes the table as a headered TSV with the index as first column.
    pub fn write_tsv<W>(&self, dst: W) -> anyhow::Result<()>
    where
        W: Write,
    {
        let mut writer = tsv::writer(dst);

        let mut header = vec![INDEX_NAME];
        header.extend(self.columns.iter().map(String::as_str));
        writer
            .write_record(&header)
            .with_context(|| "writing combined header")?;

        for (index, values) in &self.rows {
            let mut record = vec![index.as_str()];
            record.extend(values.iter().map(String::as_str));
            writer
                .write_record(&record)
                .with_context(|| format!("writing combined row {}", index))?;
        }

        writer.flush().with_context(|| "flushing combined table")?;
        Ok(())
    }
}

/// Concatenates tagged frames.
///
/// The columns are [`ID_COLUMN`] followed by the union of every frame's
/// columns in order of first appearance; cells a frame does not have are
/// left empty. Rows are stably sorted by unit id, then given a dense index.
pub fn combine(frames: Vec<TaggedFrame>) -> CombinedTable {
    let mut columns: IndexSet<String> = IndexSet::new();
    for frame in &frames {
        columns.extend(frame.columns.iter().cloned());
    }

    let mut tagged: Vec<(String, Vec<String>)> = Vec::new();
    for frame in frames {
        let positions: Vec<usize> = frame
            .columns
            .iter()
            .map(|column| columns.get_index_of(column).unwrap_or_default())
            .collect();

        for row in frame.rows {
            let mut values = vec![String::new(); columns.len()];
            for (position, value) in positions.iter().zip(row) {
                values[*position] = value;
            }
            tagged.push((frame.id.clone(), values));
        }
    }

    tagged.sort_by(|a, b| a.0.cmp(&b.0));

    let mut all_columns = vec![ID_COLUMN.to_string()];
    all_columns.extend(columns);

    CombinedTable {
        columns: all_columns,
        rows: tagged
            .into_iter()
            .enumerate()
            .map(|(i, (id, values))| {
                let mut row = vec![id];
                row.extend(values);
                (i.to_string(), row)
            })
            .collect(),
    }
}

/// Combines every report in the directory at `root`. Ids are recovered from
/// the file names, prefixed by the sample directory when nested.
pub fn combine_dir<P>(root: P) -> anyhow::Result<CombinedTable>
where
    P: AsRef<Path>,
{
    let root = root.as_ref();
    let reports = annotation_map(root)
        .with_context(|| format!("listing reports in {}", root.display()))?;

    let mut frames = Vec::new();
    for (sample_id, units) in &reports {
        for (unit_id, path) in units {
            frames.push(read_tagged(path, &qualified_id(sample_id, unit_id))?);
        }
    }

    Ok(combine(frames))
}
