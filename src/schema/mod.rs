//! Schema module - Configuration and output types for evolutionary runs.

mod evolution;
mod logbook;

pub use evolution::*;
pub use logbook::*;
