use crate::constants::MU_EARTH;
use crate::elements::OrbitalElements;
use crate::maneuver::error::ManeuverError;
use crate::maneuver::types::{
    BurnDirection, CorrectedElement, Correction, StationKeepingPlan, StationKeepingTolerances,
};

/// Independent first-order corrections that bring `current` back to `target`.
///
/// Each element is corrected on its own around the current circular speed
/// `v = √(μ/a)`:
/// * semi-major axis: `Δv = v·|Δa| / (2a)`, prograde to raise
/// * inclination: `Δv = 2v·sin(|Δi| / 2)`, at a node
/// * eccentricity: `Δv = v·|Δe| / 2`, tangential at perigee or apogee
pub fn plan_station_keeping(
    current: &OrbitalElements,
    target: &OrbitalElements,
    tolerances: &StationKeepingTolerances,
) -> Result<StationKeepingPlan, ManeuverError> {
    current.validate()?;
    target.validate()?;

    let a = current.semi_major_axis_km;
    let v = (MU_EARTH / a).sqrt();

    let da = target.semi_major_axis_km - a;
    let di = target.inclination_deg - current.inclination_deg;
    let de = target.eccentricity - current.eccentricity;

    let corrections = vec![
        Correction {
            element: CorrectedElement::SemiMajorAxis,
            deviation: da,
            delta_v_km_s: v * da.abs() / (2.0 * a),
            direction: if da >= 0.0 {
                BurnDirection::Prograde
            } else {
                BurnDirection::Retrograde
            },
            required: da.abs() > tolerances.semi_major_axis_km,
        },
        Correction {
            element: CorrectedElement::Inclination,
            deviation: di,
            delta_v_km_s: 2.0 * v * (di.abs().to_radians() / 2.0).sin(),
            direction: if di >= 0.0 {
                BurnDirection::Normal
            } else {
                BurnDirection::AntiNormal
            },
            required: di.abs() > tolerances.inclination_deg,
        },
        Correction {
            element: CorrectedElement::Eccentricity,
            deviation: de,
            delta_v_km_s: v * de.abs() / 2.0,
            direction: BurnDirection::Tangential,
            required: de.abs() > tolerances.eccentricity,
        },
    ];

    let total_delta_v_km_s = corrections
        .iter()
        .filter(|c| c.required)
        .map(|c| c.delta_v_km_s)
        .sum();
    let required = corrections.iter().any(|c| c.required);

    Ok(StationKeepingPlan {
        corrections,
        total_delta_v_km_s,
        required,
    })
}
