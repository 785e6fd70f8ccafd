use crate::elements::OrbitalElements;
use crate::maneuver::error::ManeuverError;
use crate::maneuver::hohmann::hohmann_transfer;
use crate::maneuver::station_keeping::plan_station_keeping;
use crate::maneuver::types::{ManeuverKind, ManeuverPlan, ManeuverSettings, StationKeepingPlan};

/// Plans maneuvers between element sets. Only coplanar, near-circular
/// transfers are modelled; anything else is reported as unsupported.
#[derive(Debug, Clone, Default)]
pub struct ManeuverPlanner {
    settings: ManeuverSettings,
}

impl ManeuverPlanner {
    pub fn new(settings: ManeuverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ManeuverSettings {
        &self.settings
    }

    pub fn hohmann(&self, r1_km: f64, r2_km: f64) -> Result<ManeuverPlan, ManeuverError> {
        Ok(hohmann_transfer(r1_km, r2_km)?)
    }

    pub fn station_keeping(
        &self,
        current: &OrbitalElements,
        target: &OrbitalElements,
    ) -> Result<StationKeepingPlan, ManeuverError> {
        plan_station_keeping(current, target, &self.settings.station_keeping)
    }

    /// Transfer from `current` to `target`: a Hohmann transfer when the size
    /// changes by more than the threshold, no maneuver otherwise.
    pub fn plan(
        &self,
        current: &OrbitalElements,
        target: &OrbitalElements,
    ) -> Result<ManeuverPlan, ManeuverError> {
        current.validate()?;
        target.validate()?;

        let tol = self.settings.plane_tolerance_deg;
        let di = (target.inclination_deg - current.inclination_deg).abs();
        if di > tol {
            return Err(ManeuverError::Unsupported {
                reason: format!("plane change of {di:.3} deg in inclination"),
            });
        }
        // the node is undefined for equatorial orbits
        let equatorial = |i: f64| i <= tol || i >= 180.0 - tol;
        if !(equatorial(current.inclination_deg) && equatorial(target.inclination_deg)) {
            let d_raan = angle_between(current.raan_deg, target.raan_deg);
            if d_raan > tol {
                return Err(ManeuverError::Unsupported {
                    reason: format!("plane change of {d_raan:.3} deg in RAAN"),
                });
            }
        }

        let max_e = self.settings.max_circular_eccentricity;
        if current.eccentricity > max_e || target.eccentricity > max_e {
            return Err(ManeuverError::Unsupported {
                reason: format!(
                    "non-circular orbits (e = {:.4} -> {:.4})",
                    current.eccentricity, target.eccentricity
                ),
            });
        }

        let r1 = current.semi_major_axis_km;
        let r2 = target.semi_major_axis_km;
        if (r2 - r1).abs() <= self.settings.transfer_threshold_km {
            return Ok(ManeuverPlan {
                kind: ManeuverKind::None,
                origin_semi_major_axis_km: r1,
                target_semi_major_axis_km: r2,
                transfer_semi_major_axis_km: r1,
                transfer_eccentricity: 0.0,
                burns: Vec::new(),
                total_delta_v_km_s: 0.0,
                transfer_time_s: 0.0,
                transfer_period_s: 0.0,
            });
        }

        self.hohmann(r1, r2)
    }
}

fn angle_between(a_deg: f64, b_deg: f64) -> f64 {
    ((b_deg - a_deg + 180.0).rem_euclid(360.0) - 180.0).abs()
}
