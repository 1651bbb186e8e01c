//! The recognised AMRFinderPlus options and the configuration record built
//! from them.

use std::fmt;

use serde::Serialize;

//===========//
// Organisms //
//===========//

/// Taxa accepted by `--organism`.
pub const ORGANISMS: [&str; 34] = [
    "Acinetobacter",
    "Acinetobacter_baumannii",
    "Bordetella_pertussis",
    "Burkholderia_cepacia",
    "Burkholderia_cepacia_complex",
    "Burkholderia_pseudomallei",
    "Campylobacter",
    "Citrobacter_freundii",
    "Clostridioides_difficile",
    "Corynebacterium_diphtheriae",
    "Enterobacter_asburiae",
    "Enterobacter_cloacae",
    "Enterococcus_faecalis",
    "Enterococcus_faecium",
    "Escherichia",
    "Escherichia_coli_Shigella",
    "Haemophilus_influenzae",
    "Klebsiella",
    "Klebsiella_oxytoca",
    "Klebsiella_pneumoniae",
    "Neisseria_gonorrhoeae",
    "Neisseria_meningitidis",
    "Pseudomonas_aeruginosa",
    "Salmonella",
    "Serratia",
    "Serratia_marcescens",
    "Staphylococcus_aureus",
    "Staphylococcus_pseudintermedius",
    "Streptococcus_agalactiae",
    "Streptococcus_pneumoniae",
    "Streptococcus_pyogenes",
    "Vibrio_cholerae",
    "Vibrio_parahaemolyticus",
    "Vibrio_vulnificus",
];

/// Organisms whose names are NCBI Pathogen Detection (gpipe) taxgroups.
/// These need `--gpipe_org` so AMRFinderPlus interprets them correctly.
pub const GPIPE_ORGANISMS: [&str; 5] = [
    "Acinetobacter",
    "Burkholderia_cepacia_complex",
    "Escherichia_coli_Shigella",
    "Klebsiella",
    "Serratia",
];

/// Whether `organism` requires gpipe mode.
pub fn is_gpipe_organism(organism: &str) -> bool {
    GPIPE_ORGANISMS.contains(&organism)
}

//====================//
// Translation tables //
//====================//

/// NCBI genetic code identifiers accepted by `--translation_table`.
pub const TRANSLATION_TABLES: [&str; 26] = [
    "1", "2", "3", "4", "5", "6", "9", "10", "11", "12", "13", "14", "15", "16", "21", "22",
    "23", "24", "25", "26", "27", "28", "29", "30", "31", "33",
];

/// Default genetic code (bacterial, archaeal and plant plastid).
pub const DEFAULT_TRANSLATION_TABLE: &str = "11";

//====================//
// Annotation formats //
//====================//

/// GFF dialects accepted by `--annotation_format`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationFormat {
    /// Bakta GFF3.
    Bakta,

    /// GenBank flat file converted to GFF.
    Genbank,

    /// MicroScope.
    Microscope,

    /// PATRIC.
    Patric,

    /// NCBI Prokaryotic Genome Annotation Pipeline.
    Pgap,

    /// Prodigal.
    Prodigal,

    /// Prokka.
    Prokka,

    /// Pseudomonas Genome Database.
    Pseudomonasdb,

    /// RAST.
    Rast,

    /// The AMRFinderPlus standard GFF (protein id in the `Name=` attribute).
    Standard,
}

impl AnnotationFormat {
    /// Every dialect, in the order they are listed.
    pub fn all() -> [AnnotationFormat; 10] {
        [
            AnnotationFormat::Bakta,
            AnnotationFormat::Genbank,
            AnnotationFormat::Microscope,
            AnnotationFormat::Patric,
            AnnotationFormat::Pgap,
            AnnotationFormat::Prodigal,
            AnnotationFormat::Prokka,
            AnnotationFormat::Pseudomonasdb,
            AnnotationFormat::Rast,
            AnnotationFormat::Standard,
        ]
    }
}

impl fmt::Display for AnnotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationFormat::Bakta => "bakta",
            AnnotationFormat::Genbank => "genbank",
            AnnotationFormat::Microscope => "microscope",
            AnnotationFormat::Patric => "patric",
            AnnotationFormat::Pgap => "pgap",
            AnnotationFormat::Prodigal => "prodigal",
            AnnotationFormat::Prokka => "prokka",
            AnnotationFormat::Pseudomonasdb => "pseudomonasdb",
            AnnotationFormat::Rast => "rast",
            AnnotationFormat::Standard => "standard",
        };
        write!(f, "{}", name)
    }
}

//==========================//
// Configuration parameters //
//==========================//

/// The rarely-changing options that map one-to-one onto AMRFinderPlus flags.
///
/// Built once from the command line after validation and passed by reference
/// to the command builder and the batch runner.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AmrFinderParams {
    /// Taxon for point-mutation screening (`--organism`).
    pub organism: Option<String>,

    /// Include the "plus" genes (`--plus`).
    pub plus: bool,

    /// Report every equally-scoring best hit (`--report_all_equal`).
    pub report_all_equal: bool,

    /// Minimum identity as a fraction (`--ident_min`).
    pub ident_min: Option<f64>,

    /// Use the curated per-family identity threshold (`--ident_min -1`).
    pub curated_ident: bool,

    /// Minimum coverage of the reference as a fraction (`--coverage_min`).
    pub coverage_min: Option<f64>,

    /// NCBI genetic code (`--translation_table`).
    pub translation_table: Option<String>,

    /// GFF dialect of the loci files (`--annotation_format`).
    pub annotation_format: Option<AnnotationFormat>,

    /// Report proteins common to the taxgroup (`--report_common`).
    pub report_common: bool,

    /// Threads AMRFinderPlus may use internally (`--threads`).
    pub threads: Option<usize>,
}

impl AmrFinderParams {
    /// The identity threshold when one was actually supplied. Zero counts as
    /// "not supplied", mirroring how the flag is emitted.
    pub fn ident_min(&self) -> Option<f64> {
        self.ident_min.filter(|value| *value != 0.0)
    }

    /// The coverage threshold when one was actually supplied.
    pub fn coverage_min(&self) -> Option<f64> {
        self.coverage_min.filter(|value| *value != 0.0)
    }

    /// The thread count when a positive one was supplied.
    pub fn threads(&self) -> Option<usize> {
        self.threads.filter(|value| *value > 0)
    }

    /// The organism, if one was given and is non-empty.
    pub fn organism(&self) -> Option<&str> {
        self.organism.as_deref().filter(|organism| !organism.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpipe_organisms_are_recognised_organisms() {
        for organism in GPIPE_ORGANISMS {
            assert!(ORGANISMS.contains(&organism));
        }
        assert!(is_gpipe_organism("Klebsiella"));
        assert!(!is_gpipe_organism("Salmonella"));
        assert!(!is_gpipe_organism("Klebsiella_pneumoniae"));
    }

    #[test]
    fn test_translation_tables_include_default() {
        assert!(TRANSLATION_TABLES.contains(&DEFAULT_TRANSLATION_TABLE));
    }

    #[test]
    fn test_annotation_format_display_matches_flag_values() {
        let names: Vec<String> = AnnotationFormat::all()
            .iter()
            .map(|format| format.to_string())
            .collect();
        assert_eq!(names.len(), 10);
        assert!(names.contains(&String::from("prodigal")));
        assert!(names.contains(&String::from("pseudomonasdb")));
    }

    #[test]
    fn test_zero_thresholds_count_as_absent() {
        let params = AmrFinderParams {
            ident_min: Some(0.0),
            coverage_min: Some(0.0),
            threads: Some(0),
            organism: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.ident_min(), None);
        assert_eq!(params.coverage_min(), None);
        assert_eq!(params.threads(), None);
        assert_eq!(params.organism(), None);
    }
}
