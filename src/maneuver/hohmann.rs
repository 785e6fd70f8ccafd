use std::f64::consts::PI;

use crate::constants::{EARTH_RADIUS_KM, MU_EARTH};
use crate::maneuver::types::{Burn, BurnDirection, ManeuverKind, ManeuverPlan};
use crate::validation::{in_range, ValidationError};

/// Two-burn Hohmann transfer between circular coplanar orbits of radius `r1` and `r2` (km).
pub fn hohmann_transfer(r1: f64, r2: f64) -> Result<ManeuverPlan, ValidationError> {
    in_range("r1_km", r1, r1 > EARTH_RADIUS_KM, "> Earth radius")?;
    in_range("r2_km", r2, r2 > EARTH_RADIUS_KM, "> Earth radius")?;

    let a_t = (r1 + r2) / 2.0;
    let e_t = (r2 - r1).abs() / (r1 + r2);

    let v_c1 = (MU_EARTH / r1).sqrt();
    let v_c2 = (MU_EARTH / r2).sqrt();
    // vis-viva on the transfer ellipse
    let v_t1 = (MU_EARTH * (2.0 / r1 - 1.0 / a_t)).sqrt();
    let v_t2 = (MU_EARTH * (2.0 / r2 - 1.0 / a_t)).sqrt();

    let dv1 = (v_t1 - v_c1).abs();
    let dv2 = (v_c2 - v_t2).abs();

    let period = 2.0 * PI * (a_t.powi(3) / MU_EARTH).sqrt();
    let direction = if r2 >= r1 {
        BurnDirection::Prograde
    } else {
        BurnDirection::Retrograde
    };

    let burns = if r1 == r2 {
        Vec::new()
    } else {
        vec![
            Burn {
                label: "departure".to_string(),
                delta_v_km_s: dv1,
                direction,
                radius_km: r1,
            },
            Burn {
                label: "circularization".to_string(),
                delta_v_km_s: dv2,
                direction,
                radius_km: r2,
            },
        ]
    };

    Ok(ManeuverPlan {
        kind: ManeuverKind::Hohmann,
        origin_semi_major_axis_km: r1,
        target_semi_major_axis_km: r2,
        transfer_semi_major_axis_km: a_t,
        transfer_eccentricity: e_t,
        total_delta_v_km_s: burns.iter().map(|b| b.delta_v_km_s).sum(),
        burns,
        transfer_time_s: period / 2.0,
        transfer_period_s: period,
    })
}
