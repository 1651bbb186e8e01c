//! Running AMRFinderPlus over a directory of samples.

pub mod batch;
pub mod command;
pub mod dedup;
pub mod invocation;
pub mod outputs;
pub mod params;
pub mod validate;

pub use self::batch::{run_batch, AnnotateInputs, BatchReport};
pub use self::invocation::{build_args, AmrFinder, ToolRunner};
pub use self::outputs::OutputArtifactSet;
pub use self::params::AmrFinderParams;
