//! Directories of AMRFinderPlus reports (`*_amr_annotations.tsv` and
//! `*_amr_all_mutations.tsv`), either per sample or flat.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use regex::Regex;
use tracing::{debug, info};

use crate::annotate::outputs::{ALL_MUTATIONS_SUFFIX, ANNOTATIONS_SUFFIX};
use crate::layout::resolve::list_dir;
use crate::layout::{SampleGroupMap, UNGROUPED};
use crate::utils::path::{file_name_str, file_stem_str};

/// Names of report files.
const REPORT_PATTERN: &str = r".*amr_(annotations|all_mutations)\.tsv$";

/// Recovers the unit id from a report file stem by stripping the report
/// suffix. Returns `None` for stems that carry neither suffix.
pub fn unit_id_from_stem(stem: &str) -> Option<&str> {
    stem.strip_suffix(ANNOTATIONS_SUFFIX)
        .or_else(|| stem.strip_suffix(ALL_MUTATIONS_SUFFIX))
}

/// Maps every report in `root` to its unit id.
///
/// Reports inside subdirectories are grouped under the subdirectory name;
/// reports at the top level are grouped under [`UNGROUPED`]. Files that are
/// not reports are ignored. Both levels are sorted.
pub fn annotation_map<P>(root: P) -> anyhow::Result<SampleGroupMap>
where
    P: AsRef<Path>,
{
    let root = root.as_ref();
    let pattern = Regex::new(REPORT_PATTERN)?;
    let mut map = SampleGroupMap::new();

    for entry in list_dir(root)? {
        if entry.is_dir() {
            let sample_id = file_name_str(&entry)?.to_string();
            let units = map.entry(sample_id).or_default();

            for path in list_dir(&entry)? {
                if path.is_file() && pattern.is_match(file_name_str(&path)?) {
                    insert_report(units, path)?;
                }
            }
        } else if pattern.is_match(file_name_str(&entry)?) {
            insert_report(map.entry(UNGROUPED.to_string()).or_default(), entry)?;
        }
    }

    debug!(
        "Found {} report(s) in {}.",
        map.values().map(|units| units.len()).sum::<usize>(),
        root.display()
    );

    Ok(map)
}

fn insert_report(units: &mut BTreeMap<String, PathBuf>, path: PathBuf) -> anyhow::Result<()> {
    let stem = file_stem_str(&path)?;
    let id = match unit_id_from_stem(stem) {
        Some(id) => id.to_string(),
        None => bail!("not an AMRFinderPlus report file name: {}", path.display()),
    };

    if let Some(previous) = units.get(&id) {
        bail!(
            "both {} and {} map to unit id '{}'. Annotation and all-mutations reports \
            must live in separate directories.",
            previous.display(),
            path.display(),
            id
        );
    }

    units.insert(id, path);
    Ok(())
}

/// Merges several report directories (for example, the partitions of one
/// run) into `dest`, keeping the per-sample structure. Two sources that
/// provide the same relative file are an error.
pub fn collate<P>(sources: &[P], dest: &Path) -> anyhow::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let mut written = Vec::new();

    for source in sources {
        let source = source.as_ref();
        for (sample_id, units) in annotation_map(source)? {
            let target_dir = dest.join(&sample_id);
            fs::create_dir_all(&target_dir)
                .with_context(|| format!("creating directory: {}", target_dir.display()))?;

            for path in units.values() {
                let target = target_dir.join(file_name_str(path)?);
                if target.exists() {
                    bail!(
                        "refusing to overwrite {} while collating {}: the same report \
                        exists in more than one input",
                        target.display(),
                        source.display()
                    );
                }

                fs::copy(path, &target).with_context(|| {
                    format!("copying {} to {}", path.display(), target.display())
                })?;
                written.push(target);
            }
        }
    }

    info!(
        "Collated {} report(s) from {} director{} into {}.",
        written.len(),
        sources.len(),
        if sources.len() == 1 { "y" } else { "ies" },
        dest.display()
    );

    Ok(written)
}
