//! AMRFinderPlus reference database directories.

pub mod command;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, info};

/// Files every usable database directory contains.
pub const REQUIRED_FILES: [&str; 9] = [
    "AMR.LIB",
    "AMRProt",
    "AMRProt-mutation.tab",
    "AMRProt-suppress",
    "AMRProt-susceptible.tab",
    "fam.tab",
    "taxgroup.tab",
    "version.txt",
    "database_format_version.txt",
];

/// Where `amrfinder -u` places the latest database, relative to the conda
/// environment prefix.
pub const CONDA_DATA_DIR: &str = "share/amrfinderplus/data/latest";

/// A database directory that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Database {
    /// The directory handed to AMRFinderPlus via `-d`.
    pub path: PathBuf,

    /// Contents of `version.txt`.
    pub version: String,
}

impl Database {
    /// Checks that `path` is a complete database directory. Every missing
    /// file is reported at once.
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        if !path.is_dir() {
            bail!("database directory does not exist: {}", path.display());
        }

        let missing: Vec<&str> = REQUIRED_FILES
            .iter()
            .copied()
            .filter(|name| !path.join(name).exists())
            .collect();

        if !missing.is_empty() {
            bail!(
                "{} is not a complete AMRFinderPlus database. Missing: {}. Run \
                \"amrwrap fetch-db\" to download one.",
                path.display(),
                missing.join(", ")
            );
        }

        let version_file = path.join("version.txt");
        let version = fs::read_to_string(&version_file)
            .with_context(|| format!("reading {}", version_file.display()))?
            .trim()
            .to_string();

        info!("Using AMRFinderPlus database version {}.", version);

        Ok(Database {
            path: path.to_path_buf(),
            version,
        })
    }
}

/// The directory `amrfinder -u` downloads into for the conda environment at
/// `prefix`.
pub fn conda_data_dir<P>(prefix: P) -> PathBuf
where
    P: AsRef<Path>,
{
    prefix.as_ref().join(CONDA_DATA_DIR)
}

/// Copies the database at `src` into `dest` (created if needed) and returns
/// the validated copy. Symbolic links are followed.
pub fn copy_database(src: &Path, dest: &Path) -> anyhow::Result<Database> {
    Database::open(src).with_context(|| format!("validating downloaded database at {}", src.display()))?;

    let copied = copy_dir(src, dest)?;
    debug!("Copied {} file(s) into {}.", copied, dest.display());

    Database::open(dest)
}

fn copy_dir(src: &Path, dest: &Path) -> anyhow::Result<usize> {
    fs::create_dir_all(dest).with_context(|| format!("creating directory: {}", dest.display()))?;

    let mut copied = 0;
    for entry in fs::read_dir(src).with_context(|| format!("reading directory: {}", src.display()))? {
        let entry = entry.with_context(|| format!("reading entry of {}", src.display()))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());

        if from.is_dir() {
            copied += copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}
