//! Utilities related to path manipulation.

use std::{ffi::OsStr, path::Path, path::PathBuf};

use anyhow::{bail, Context};

/// A trait that is intended to add a `append_extension` method to [`PathBuf`].
/// This makes it significantly more ergonomic to work with scratch files
/// where the filename is simply the target file name with some extra
/// extension.
pub trait AppendExtension {
    /// Appends an extension with the specified further extension.
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use amrwrap::utils::path::AppendExtension;
    ///
    /// let fasta = PathBuf::from("out/mag1_amr_genes.fasta");
    /// let scratch = fasta.append_extension("dedup").unwrap();
    /// assert_eq!(scratch.file_name().unwrap(), "mag1_amr_genes.fasta.dedup");
    /// ```
    fn append_extension<P>(self, ext: P) -> anyhow::Result<Self>
    where
        Self: Sized,
        P: AsRef<OsStr>;
}

impl AppendExtension for PathBuf {
    fn append_extension<P>(mut self, ext: P) -> anyhow::Result<Self>
    where
        P: AsRef<OsStr>,
    {
        let mut new_ext = match self.extension() {
            Some(ext) => ext.to_os_string(),
            None => bail!("path did not have an extension: {}", self.display()),
        };

        new_ext.push(".");
        new_ext.push(ext);

        self.set_extension(new_ext);
        Ok(self)
    }
}

/// Returns the final component of a path as UTF-8.
pub fn file_name_str(path: &Path) -> anyhow::Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("path has no UTF-8 file name: {}", path.display()))
}

/// Returns the file stem of a path as UTF-8 (the file name without its final
/// extension).
pub fn file_stem_str(path: &Path) -> anyhow::Result<&str> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("path has no UTF-8 file stem: {}", path.display()))
}

/// Whether a directory entry should be skipped when scanning inputs (dot
/// files such as `.DS_Store` or editor swap files).
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
