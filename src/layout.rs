//! Discovery of processing units from input directory trees, and the
//! directory maps of annotation outputs.

pub mod annotations;
pub mod resolve;
pub mod unit;

pub use self::resolve::resolve_units;
pub use self::resolve::SampleGroupMap;
pub use self::resolve::SequenceInput;
pub use self::resolve::SequenceLayout;
pub use self::unit::ProcessingUnit;

/// The grouping id used when the input has no per-sample structure.
pub const UNGROUPED: &str = "";
