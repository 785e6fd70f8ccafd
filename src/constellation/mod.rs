mod coordinator;
mod coverage;
mod types;

pub use coordinator::ConstellationCoordinator;
pub use coverage::{coverage_percent, covered, merge_windows};
pub use types::{
    Assignment, ConstellationReport, CoverageSettings, CoverageWindow, Recommendation, Target,
    TargetCoverage, TargetPasses,
};
