mod error;
mod hohmann;
mod planner;
mod station_keeping;
mod types;

pub use error::ManeuverError;
pub use hohmann::hohmann_transfer;
pub use planner::ManeuverPlanner;
pub use station_keeping::plan_station_keeping;
pub use types::{
    Burn, BurnDirection, CorrectedElement, Correction, ManeuverKind, ManeuverPlan,
    ManeuverSettings, StationKeepingPlan, StationKeepingTolerances,
};
