use chrono::{Datelike, Timelike};

use crate::constants::SECONDS_PER_DAY;
use crate::elements::error::ElementsError;
use crate::elements::types::{wrap_degrees, OrbitalElements, SatelliteInfo, SatelliteRecord};
use crate::validation::ValidationError;

/// Catalogue number written for element sets that never had one.
pub const UNKNOWN_NORAD_ID: u64 = 99_999;

/// Split a single two- or three-line TLE into (name, line1, line2).
pub fn parse_tle_lines(tle: &str) -> Result<(Option<String>, String, String), ElementsError> {
    let lines: Vec<String> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    match lines.len() {
        2 => Ok((None, lines[0].clone(), lines[1].clone())),
        3 => Ok((Some(lines[0].clone()), lines[1].clone(), lines[2].clone())),
        _ => Err(ElementsError::InvalidTleFormat),
    }
}

/// Parse multi-satellite TLE content
pub fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1; // Skip unknown line
        }
    }

    result
}

/// Parse every TLE record in `content`. The first invalid record fails the whole text.
pub fn records_from_tle_text(
    content: &str,
    source: &str,
) -> Result<Vec<SatelliteRecord>, ElementsError> {
    parse_multi_tle(content)
        .into_iter()
        .map(|(name, line1, line2)| record_from_tle(name, &line1, &line2, source))
        .collect()
}

pub fn record_from_tle(
    name: Option<String>,
    line1: &str,
    line2: &str,
    source: &str,
) -> Result<SatelliteRecord, ElementsError> {
    let name = name
        .map(|n| clean_name(&n))
        .filter(|n| !n.is_empty());

    let parsed = sgp4::Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
        .map_err(|e| ElementsError::InvalidTle {
            file: source.to_string(),
            message: e.to_string(),
        })?;

    let sat_name = name.unwrap_or_else(|| format!("NORAD {}", parsed.norad_id));
    let id = satellite_id(&sat_name);
    let elements = elements_from_sgp4(&parsed).map_err(|e| ElementsError::InvalidElements {
        satellite: id.clone(),
        source: e,
    })?;

    Ok(SatelliteRecord {
        info: SatelliteInfo {
            id,
            name: sat_name,
            norad_id: Some(parsed.norad_id),
            source: source.to_string(),
        },
        elements,
    })
}

pub fn elements_from_sgp4(parsed: &sgp4::Elements) -> Result<OrbitalElements, ValidationError> {
    let mut elements = OrbitalElements::from_mean_motion(
        parsed.mean_motion,
        parsed.eccentricity,
        parsed.inclination,
        parsed.right_ascension,
        parsed.argument_of_perigee,
        parsed.mean_anomaly,
        parsed.datetime.and_utc(),
    )?;
    elements.drag_term = parsed.drag_term;
    elements.mean_motion_dot = parsed.mean_motion_dot;
    elements.mean_motion_ddot = parsed.mean_motion_ddot;
    elements.norad_id = Some(parsed.norad_id);
    Ok(elements)
}

/// Render an element set as TLE lines (with checksums). Precision is that
/// of the TLE format: 1e-4 deg for angles, 1e-7 for eccentricity and 1e-8
/// day for the epoch.
pub fn format_tle(elements: &OrbitalElements) -> (String, String) {
    let norad_id = elements
        .norad_id
        .filter(|id| *id <= UNKNOWN_NORAD_ID)
        .unwrap_or(UNKNOWN_NORAD_ID);

    let epoch = elements.epoch;
    let year = epoch.year().rem_euclid(100);
    let seconds_of_day =
        epoch.num_seconds_from_midnight() as f64 + epoch.nanosecond() as f64 * 1e-9;
    // truncated so the fraction never rounds into the next day
    let day = ((epoch.ordinal() as f64 + seconds_of_day / SECONDS_PER_DAY) * 1e8).floor() / 1e8;

    let line1 = format!(
        "1 {:05}U {:<8} {:02}{:012.8} {} {} {} 0 {:>4}",
        norad_id,
        format!("{:02}001A", year),
        year,
        day,
        format_rate(elements.mean_motion_dot),
        format_exponent(elements.mean_motion_ddot),
        format_exponent(elements.drag_term),
        999
    );

    let eccentricity = ((elements.eccentricity * 1e7).round() as u64).min(9_999_999);
    let line2 = format!(
        "2 {:05} {:8.4} {:8.4} {:07} {:8.4} {:8.4} {:11.8}{:05}",
        norad_id,
        (elements.inclination_deg * 1e4).round() / 1e4,
        tle_angle(elements.raan_deg),
        eccentricity,
        tle_angle(elements.arg_perigee_deg),
        tle_angle(elements.mean_anomaly_deg),
        elements.mean_motion_rev_day(),
        0
    );

    (with_checksum(line1), with_checksum(line2))
}

/// Registry id derived from a satellite name: "ISS (ZARYA)" -> "iss_zarya".
pub fn satellite_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c.to_ascii_lowercase());
        } else if !id.ends_with('_') {
            id.push('_');
        }
    }
    id.trim_matches('_').to_string()
}

// 3LE files from some providers prefix the name line with "0 "
fn clean_name(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix("0 ").unwrap_or(name).trim().to_string()
}

fn tle_angle(deg: f64) -> f64 {
    wrap_degrees((deg * 1e4).round() / 1e4)
}

fn format_rate(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { ' ' };
    let digits = ((value.abs() * 1e8).round() as u64).min(99_999_999);
    format!("{}.{:08}", sign, digits)
}

/// TLE "assumed decimal point" notation: -0.000031515 -> "-31515-4".
fn format_exponent(value: f64) -> String {
    const ZERO: &str = " 00000-0";
    let magnitude = value.abs();
    if !magnitude.is_finite() || magnitude < 1e-10 {
        return ZERO.to_string();
    }

    let sign = if value < 0.0 { '-' } else { ' ' };
    let mut exponent = magnitude.log10().floor() as i32 + 1;
    let mut mantissa = (magnitude / 10f64.powi(exponent) * 1e5).round() as u64;
    if mantissa >= 100_000 {
        mantissa /= 10;
        exponent += 1;
    }
    if exponent < -9 {
        return ZERO.to_string();
    }
    let exponent = exponent.min(9);
    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{:05}{}{}", sign, mantissa, exponent_sign, exponent.abs())
}

fn with_checksum(line: String) -> String {
    let sum: u32 = line
        .chars()
        .map(|c| match c {
            '0'..='9' => c.to_digit(10).unwrap_or(0),
            '-' => 1,
            _ => 0,
        })
        .sum();
    format!("{}{}", line, sum % 10)
}
