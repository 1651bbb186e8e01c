//! Functionality related to the `amrwrap list` command itself.

use anyhow::bail;
use clap::{builder::PossibleValuesParser, Args};
use prettytable::{row, Table};

use crate::annotate::params::{
    is_gpipe_organism, AnnotationFormat, DEFAULT_TRANSLATION_TABLE, ORGANISMS, TRANSLATION_TABLES,
};

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `amrwrap list`.
#[derive(Args)]
pub struct ListArgs {
    /// The subject which you want to list values for.
    #[arg(value_parser = PossibleValuesParser::new(["organisms", "translation-tables", "annotation-formats"]))]
    subject: String,
}

//========//
// Tables //
//========//

/// Every organism accepted by `--organism`, with whether AMRFinderPlus also
/// receives `--gpipe_org` for it.
pub fn organisms_table() -> Table {
    let mut table = Table::new();
    table.add_row(row!["Organism", "GPipe taxgroup"]);
    for organism in ORGANISMS {
        let gpipe = if is_gpipe_organism(organism) { "yes" } else { "" };
        table.add_row(row![organism, gpipe]);
    }
    table
}

/// Every genetic code accepted by `--translation-table`.
pub fn translation_tables_table() -> Table {
    let mut table = Table::new();
    table.add_row(row!["Translation table", "Default"]);
    for code in TRANSLATION_TABLES {
        let default = if code == DEFAULT_TRANSLATION_TABLE { "yes" } else { "" };
        table.add_row(row![code, default]);
    }
    table
}

/// Every GFF dialect accepted by `--annotation-format`.
pub fn annotation_formats_table() -> Table {
    let mut table = Table::new();
    table.add_row(row!["Annotation format", "Default"]);
    for format in AnnotationFormat::all() {
        let default = if format == AnnotationFormat::Prodigal { "yes" } else { "" };
        table.add_row(row![format, default]);
    }
    table
}

//==============//
// Main command //
//==============//

/// Main method for the `amrwrap list` subcommand.
pub fn list(args: ListArgs) -> anyhow::Result<()> {
    let table = match args.subject.as_str() {
        "organisms" => organisms_table(),
        "translation-tables" => translation_tables_table(),
        "annotation-formats" => annotation_formats_table(),
        s => bail!("Unsupported subject: {}", s),
    };

    table.printstd();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_have_a_row_per_value() {
        assert_eq!(organisms_table().len(), ORGANISMS.len() + 1);
        assert_eq!(translation_tables_table().len(), TRANSLATION_TABLES.len() + 1);
        assert_eq!(
            annotation_formats_table().len(),
            AnnotationFormat::all().len() + 1
        );
    }
}
