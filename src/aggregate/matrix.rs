//! A dense, labelled matrix of counts.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use anyhow::Context;

use crate::formats::tsv;

/// Counts indexed by a row label and a column label. Absent combinations are
/// zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyMatrix {
    /// Name of the row labels, written as the first header cell.
    pub index_name: String,

    /// Row labels.
    pub rows: Vec<String>,

    /// Column labels, sorted.
    pub columns: Vec<String>,

    /// `values[row][column]`.
    pub values: Vec<Vec<u64>>,
}

impl FrequencyMatrix {
    /// Builds a matrix from per-row counts. Rows keep the given order;
    /// columns are the sorted union of every row's keys, missing cells are
    /// filled with zero.
    pub fn from_rows<I>(index_name: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = (String, BTreeMap<String, u64>)>,
    {
        let rows: Vec<(String, BTreeMap<String, u64>)> = rows.into_iter().collect();
        let columns: Vec<String> = rows
            .iter()
            .flat_map(|(_, counts)| counts.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut labels = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());

        for (label, counts) in rows {
            values.push(
                columns
                    .iter()
                    .map(|column| counts.get(column).copied().unwrap_or(0))
                    .collect(),
            );
            labels.push(label);
        }

        FrequencyMatrix {
            index_name: index_name.to_string(),
            rows: labels,
            columns,
            values,
        }
    }

    /// The count at (`row`, `column`), if both labels exist.
    pub fn get(&self, row: &str, column: &str) -> Option<u64> {
        let r = self.rows.iter().position(|label| label == row)?;
        let c = self.columns.iter().position(|label| label == column)?;
        Some(self.values[r][c])
    }

    /// Writes the matrix as a headered TSV.
    pub fn write_tsv<W>(&self, dst: W) -> anyhow::Result<()>
    where
        W: Write,
    {
        let mut writer = tsv::writer(dst);

        let mut header = vec![self.index_name.as_str()];
        header.extend(self.columns.iter().map(String::as_str));
        writer
            .write_record(&header)
            .with_context(|| "writing matrix header")?;

        for (label, values) in self.rows.iter().zip(&self.values) {
            let mut record = vec![label.clone()];
            record.extend(values.iter().map(|value| value.to_string()));
            writer
                .write_record(&record)
                .with_context(|| format!("writing matrix row for {}", label))?;
        }

        writer.flush().with_context(|| "flushing matrix")?;
        Ok(())
    }
}
