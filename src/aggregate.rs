//! Consolidating per-unit AMRFinderPlus reports into single tables.

pub mod combine;
pub mod command;
pub mod counts;
pub mod matrix;
pub mod presence;

pub use self::combine::combine;
pub use self::counts::count_table;
pub use self::matrix::FrequencyMatrix;
pub use self::presence::presence_matrix;
