//! Legality checks for combinations of inputs and parameters.
//!
//! Everything here runs before any directory is created or any process is
//! spawned.

use anyhow::bail;

use crate::annotate::params::AmrFinderParams;

/// Which input categories were supplied for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputPresence {
    /// Nucleotide sequences (MAGs or contigs).
    pub sequences: bool,

    /// Protein sequences.
    pub proteins: bool,

    /// GFF loci linking proteins to nucleotide coordinates.
    pub loci: bool,
}

/// Fails with a descriptive error if the inputs and parameters cannot be
/// combined.
pub fn validate(inputs: &InputPresence, params: &AmrFinderParams) -> anyhow::Result<()> {
    if !inputs.sequences && !inputs.proteins {
        bail!("\"--sequences\" or \"--proteins\" input has to be provided.");
    }

    if inputs.sequences && inputs.loci && !inputs.proteins {
        bail!("\"--loci\" input can only be given in combination with \"--proteins\" input.");
    }

    if inputs.sequences && inputs.proteins && !inputs.loci {
        bail!(
            "\"--sequences\" and \"--proteins\" inputs together can only be given in \
            combination with \"--loci\" input."
        );
    }

    if params.ident_min().is_some() && params.curated_ident {
        bail!("\"--ident-min\" and \"--curated-ident\" cannot be used simultaneously.");
    }

    if params.report_common && (!params.plus || params.organism().is_none()) {
        bail!("\"--report-common\" requires \"--plus\" and \"--organism\".");
    }

    Ok(())
}
