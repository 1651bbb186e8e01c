//! Building AMRFinderPlus command lines and running them.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context};
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, error, info};

use crate::annotate::outputs::UnitOutputs;
use crate::annotate::params::{is_gpipe_organism, AmrFinderParams};
use crate::layout::unit::ProcessingUnit;

/// Default name of the AMRFinderPlus executable.
pub const PROGRAM: &str = "amrfinder";

/// Matches AMRFinderPlus complaints about the `-g` GFF input: a GFF mention
/// anywhere after the `*** ERROR` marker, which may sit on its own line.
const MALFORMED_GFF_PATTERN: &str = r"(?is)\*\*\*\s*ERROR\b.*\bgff";

//=================//
// Command builder //
//=================//

/// Builds the AMRFinderPlus argument list (without the program name) for one
/// processing unit.
///
/// The order of the arguments only depends on the inputs, so identical
/// inputs always produce identical command lines.
pub fn build_args(
    database: &Path,
    unit: &ProcessingUnit,
    outputs: &UnitOutputs,
    params: &AmrFinderParams,
) -> Vec<String> {
    let mut args = vec![
        String::from("--database"),
        database.display().to_string(),
        String::from("-o"),
        outputs.annotations.display().to_string(),
        String::from("--print_node"),
    ];

    if let Some(dna) = &unit.dna {
        args.push(String::from("-n"));
        args.push(dna.display().to_string());
        args.push(String::from("--nucleotide_output"));
        args.push(outputs.genes.display().to_string());
    }

    if let Some(protein) = &unit.protein {
        args.push(String::from("-p"));
        args.push(protein.display().to_string());
        args.push(String::from("--protein_output"));
        args.push(outputs.proteins.display().to_string());
    }

    if let Some(gff) = &unit.gff {
        args.push(String::from("-g"));
        args.push(gff.display().to_string());
    }

    if let Some(threads) = params.threads() {
        args.push(String::from("--threads"));
        args.push(threads.to_string());
    }

    if let Some(organism) = params.organism() {
        args.push(String::from("--organism"));
        args.push(organism.to_string());
        args.push(String::from("--mutation_all"));
        args.push(outputs.all_mutations.display().to_string());
    }

    for (enabled, flag) in [
        (params.plus, "--plus"),
        (params.report_all_equal, "--report_all_equal"),
        (params.report_common, "--report_common"),
    ] {
        if enabled {
            args.push(String::from(flag));
        }
    }

    if let Some(ident_min) = params.ident_min() {
        args.push(String::from("--ident_min"));
        args.push(ident_min.to_string());
    } else if params.curated_ident {
        args.push(String::from("--ident_min"));
        args.push(String::from("-1"));
    }

    if let Some(coverage_min) = params.coverage_min() {
        args.push(String::from("--coverage_min"));
        args.push(coverage_min.to_string());
    }

    if let Some(translation_table) = &params.translation_table {
        args.push(String::from("--translation_table"));
        args.push(translation_table.clone());
    }

    if let Some(annotation_format) = &params.annotation_format {
        args.push(String::from("--annotation_format"));
        args.push(annotation_format.to_string());
    }

    if params.organism().map(is_gpipe_organism).unwrap_or(false) {
        args.push(String::from("--gpipe_org"));
    }

    args
}

//=============//
// Tool runner //
//=============//

/// Something that can execute an AMRFinderPlus argument list to completion.
///
/// The batch runner only talks to AMRFinderPlus through this trait, so a
/// fake that writes the expected output files can stand in for the real
/// binary.
pub trait ToolRunner {
    /// Runs the tool with `args`, blocking until it exits. Any non-zero exit
    /// is an error.
    fn run(&self, args: &[String]) -> anyhow::Result<()>;
}

/// Runs the real `amrfinder` executable as a subprocess.
#[derive(Clone, Debug)]
pub struct AmrFinder {
    executable: PathBuf,
}

impl Default for AmrFinder {
    fn default() -> Self {
        AmrFinder::new(PROGRAM)
    }
}

impl AmrFinder {
    /// Creates a runner for the executable at `executable` (a bare name is
    /// looked up on `PATH`).
    pub fn new<P>(executable: P) -> Self
    where
        P: Into<PathBuf>,
    {
        AmrFinder {
            executable: executable.into(),
        }
    }

    /// The executable this runner invokes.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Runs `amrfinder -u`, which downloads the latest database into the
    /// tool's own data directory.
    pub fn update_database(&self) -> anyhow::Result<()> {
        self.run(&[String::from("-u")])
    }
}

impl ToolRunner for AmrFinder {
    fn run(&self, args: &[String]) -> anyhow::Result<()> {
        info!(
            "Running external command line application. This may print messages \
            to stdout and/or stderr. The command below depends on files that may \
            not outlive this run, so it cannot necessarily be re-run by hand."
        );
        info!(
            "  [*] Command: {} {}",
            self.executable.display(),
            args.iter().join(" ")
        );

        let output = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| {
                format!(
                    "failed to spawn {}. Is AMRFinderPlus installed?",
                    self.executable.display()
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            for line in stderr.lines() {
                debug!("  [amrfinder] {}", line);
            }
            return Ok(());
        }

        for line in stderr.lines() {
            error!("  [amrfinder] {}", line);
        }

        bail!(failure_message(output.status.code(), &stderr))
    }
}

/// Describes a failed AMRFinderPlus run. Recognised failure signatures in
/// `stderr` get a targeted remediation message.
pub fn failure_message(code: Option<i32>, stderr: &str) -> String {
    let code = code
        .map(|c| c.to_string())
        .unwrap_or_else(|| String::from("none, terminated by signal"));

    let malformed_gff = Regex::new(MALFORMED_GFF_PATTERN)
        .map(|re| re.is_match(stderr))
        .unwrap_or(false);

    match malformed_gff {
        true => format!(
            "AMRFinderPlus could not match the GFF loci to the sequence input \
            (return code {}). Make sure the loci and proteins were produced by the \
            same gene caller, that the protein identifiers in the FASTA headers \
            match the GFF, and that \"--annotation-format\" names the GFF dialect \
            (default: prodigal).",
            code
        ),
        false => format!(
            "An error was encountered while running AMRFinderPlus (return code {}), \
            please inspect stdout and stderr to learn more.",
            code
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::params::AnnotationFormat;

    fn outputs() -> UnitOutputs {
        UnitOutputs {
            annotations: PathBuf::from("amr_annotations_path"),
            genes: PathBuf::from("amr_genes_path"),
            proteins: PathBuf::from("amr_proteins_path"),
            all_mutations: PathBuf::from("amr_all_mutations_path"),
        }
    }

    fn unit(dna: Option<&str>, protein: Option<&str>, gff: Option<&str>) -> ProcessingUnit {
        ProcessingUnit {
            sample_id: String::from("sample1"),
            unit_id: String::from("id1"),
            dna: dna.map(PathBuf::from),
            protein: protein.map(PathBuf::from),
            gff: gff.map(PathBuf::from),
        }
    }

    fn full_params() -> AmrFinderParams {
        AmrFinderParams {
            organism: Some(String::from("Escherichia")),
            plus: true,
            report_all_equal: true,
            ident_min: Some(1.0),
            curated_ident: false,
            coverage_min: Some(1.0),
            translation_table: Some(String::from("11")),
            annotation_format: Some(AnnotationFormat::Prodigal),
            report_common: true,
            threads: Some(4),
        }
    }

    #[test]
    fn test_build_args_with_everything() {
        let args = build_args(
            Path::new("amrfinderplus_db"),
            &unit(
                Some("dna_sequences"),
                Some("protein_sequences"),
                Some("gff"),
            ),
            &outputs(),
            &full_params(),
        );

        assert_eq!(
            args,
            vec![
                "--database",
                "amrfinderplus_db",
                "-o",
                "amr_annotations_path",
                "--print_node",
                "-n",
                "dna_sequences",
                "--nucleotide_output",
                "amr_genes_path",
                "-p",
                "protein_sequences",
                "--protein_output",
                "amr_proteins_path",
                "-g",
                "gff",
                "--threads",
                "4",
                "--organism",
                "Escherichia",
                "--mutation_all",
                "amr_all_mutations_path",
                "--plus",
                "--report_all_equal",
                "--report_common",
                "--ident_min",
                "1",
                "--coverage_min",
                "1",
                "--translation_table",
                "11",
                "--annotation_format",
                "prodigal",
            ]
        );
    }

    #[test]
    fn test_build_args_minimal_with_curated_ident() {
        let params = AmrFinderParams {
            curated_ident: true,
            ..Default::default()
        };
        let args = build_args(
            Path::new("amrfinderplus_db"),
            &unit(None, None, None),
            &outputs(),
            &params,
        );

        assert_eq!(
            args,
            vec![
                "--database",
                "amrfinderplus_db",
                "-o",
                "amr_annotations_path",
                "--print_node",
                "--ident_min",
                "-1",
            ]
        );
    }

    #[test]
    fn test_build_args_is_deterministic() {
        let unit = unit(Some("dna"), None, None);
        let first = build_args(Path::new("db"), &unit, &outputs(), &full_params());
        let second = build_args(Path::new("db"), &unit, &outputs(), &full_params());
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_args_omits_exactly_the_nucleotide_pair() {
        let params = full_params();
        let with_dna = build_args(
            Path::new("db"),
            &unit(Some("dna"), Some("prot"), Some("gff")),
            &outputs(),
            &params,
        );
        let without_dna = build_args(
            Path::new("db"),
            &unit(None, Some("prot"), Some("gff")),
            &outputs(),
            &params,
        );

        assert_eq!(with_dna.len(), without_dna.len() + 4);
        let removed: Vec<&String> = with_dna
            .iter()
            .filter(|arg| !without_dna.contains(arg))
            .collect();
        assert_eq!(
            removed,
            vec!["-n", "dna", "--nucleotide_output", "amr_genes_path"]
        );
    }

    #[test]
    fn test_gpipe_flag_for_klebsiella_only() {
        let klebsiella = AmrFinderParams {
            organism: Some(String::from("Klebsiella")),
            ..Default::default()
        };
        let args = build_args(
            Path::new("db"),
            &unit(Some("dna"), None, None),
            &outputs(),
            &klebsiella,
        );
        assert_eq!(args.last().map(String::as_str), Some("--gpipe_org"));

        let salmonella = AmrFinderParams {
            organism: Some(String::from("Salmonella")),
            ..Default::default()
        };
        let args = build_args(
            Path::new("db"),
            &unit(Some("dna"), None, None),
            &outputs(),
            &salmonella,
        );
        assert!(!args.contains(&String::from("--gpipe_org")));
    }

    #[test]
    fn test_fractional_thresholds_are_rendered_plainly() {
        let params = AmrFinderParams {
            ident_min: Some(0.9),
            coverage_min: Some(0.5),
            ..Default::default()
        };
        let args = build_args(
            Path::new("db"),
            &unit(Some("dna"), None, None),
            &outputs(),
            &params,
        );
        let tail: Vec<&str> = args[args.len() - 4..].iter().map(String::as_str).collect();
        assert_eq!(tail, vec!["--ident_min", "0.9", "--coverage_min", "0.5"]);
    }

    #[test]
    fn test_failure_message_generic() {
        let message = failure_message(Some(1), "*** ERROR: something else went wrong");
        assert!(message.contains("return code 1"));
        assert!(message.contains("please inspect stdout and stderr"));
    }

    #[test]
    fn test_failure_message_malformed_gff() {
        let message = failure_message(
            Some(1),
            "*** ERROR: Protein id \"gene_1\" is not found in the .gff-file",
        );
        assert!(message.contains("could not match the GFF loci"));
        assert!(message.contains("return code 1"));
    }

    #[test]
    fn test_failure_message_malformed_gff_on_separate_lines() {
        let message = failure_message(
            Some(1),
            "\n*** ERROR ***\nProtein id \"gene_1\" is not found in the GFF file\n",
        );
        assert!(message.contains("could not match the GFF loci"));
    }

    #[test]
    fn test_failure_message_ignores_gff_before_the_error() {
        let message = failure_message(
            Some(1),
            "Running: amrfinder -p mag1.faa -g mag1.gff\n*** ERROR ***\nDatabase is missing\n",
        );
        assert!(message.contains("please inspect stdout and stderr"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_reported() {
        let runner = AmrFinder::new("sh");
        let err = runner
            .run(&[
                String::from("-c"),
                String::from("echo '*** ERROR ***' >&2; exit 3"),
            ])
            .unwrap_err();
        assert!(err.to_string().contains("return code 3"));
        assert!(err.to_string().contains("please inspect stdout and stderr"));

        let err = runner
            .run(&[
                String::from("-c"),
                String::from("printf '*** ERROR ***\\nnot found in the GFF file\\n' >&2; exit 1"),
            ])
            .unwrap_err();
        assert!(err.to_string().contains("could not match the GFF loci"));

        runner.run(&[String::from("-c"), String::from("exit 0")]).unwrap();
    }

    #[test]
    fn test_missing_executable_is_reported() {
        let runner = AmrFinder::new("/nonexistent/amrfinder");
        let err = runner.run(&[String::from("--version")]).unwrap_err();
        assert!(format!("{:#}", err).contains("Is AMRFinderPlus installed?"));
    }
}
