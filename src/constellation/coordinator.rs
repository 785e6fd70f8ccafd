use chrono::{DateTime, Utc};

use crate::constellation::coverage::{covered, coverage_percent, merge_windows};
use crate::constellation::types::{
    Assignment, ConstellationReport, CoverageSettings, Recommendation, Target, TargetCoverage,
    TargetPasses,
};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Default)]
pub struct ConstellationCoordinator {
    settings: CoverageSettings,
}

impl ConstellationCoordinator {
    pub fn new(settings: CoverageSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CoverageSettings {
        &self.settings
    }

    /// Round-robin: target `k` gets satellite `k mod n`.
    pub fn assign(
        &self,
        satellite_ids: &[String],
        targets: &[Target],
    ) -> Result<Vec<Assignment>, ValidationError> {
        if satellite_ids.is_empty() {
            return Err(ValidationError::Invalid {
                field: "satellite_ids",
                message: "at least one satellite is needed for assignment".to_string(),
            });
        }
        Ok(targets
            .iter()
            .enumerate()
            .map(|(k, target)| Assignment {
                target_id: target.id.clone(),
                satellite_id: satellite_ids[k % satellite_ids.len()].clone(),
            })
            .collect())
    }

    /// Per-target coverage over `[start, end]` plus the constellation-wide summary.
    ///
    /// `per_target` and `assignments` are matched by position.
    pub fn report(
        &self,
        per_target: &[TargetPasses],
        assignments: &[Assignment],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ConstellationReport, ValidationError> {
        if per_target.is_empty() {
            return Err(ValidationError::Invalid {
                field: "targets",
                message: "no targets to cover".to_string(),
            });
        }
        if per_target.len() != assignments.len() {
            return Err(ValidationError::Invalid {
                field: "assignments",
                message: format!(
                    "{} assignments for {} targets",
                    assignments.len(),
                    per_target.len()
                ),
            });
        }
        if end <= start {
            return Err(ValidationError::Invalid {
                field: "end",
                message: "coverage window is empty".to_string(),
            });
        }

        let horizon = end - start;
        let targets: Vec<TargetCoverage> = per_target
            .iter()
            .zip(assignments)
            .map(|(entry, assignment)| {
                let windows = merge_windows(&entry.passes, start, end);
                let percent = coverage_percent(&windows, horizon);
                let next_pass = entry
                    .passes
                    .iter()
                    .filter(|p| p.satellite_id == assignment.satellite_id)
                    .filter(|p| p.max_elevation_deg >= self.settings.assignment_min_elevation_deg)
                    .min_by_key(|p| p.start)
                    .cloned();

                TargetCoverage {
                    target_id: entry.target.id.clone(),
                    covered_minutes: covered(&windows).num_milliseconds() as f64 / 60_000.0,
                    windows,
                    coverage_percent: percent,
                    below_floor: percent < self.settings.floor_percent,
                    assigned_satellite: assignment.satellite_id.clone(),
                    next_pass,
                }
            })
            .collect();

        let n = targets.len() as f64;
        let average = targets.iter().map(|t| t.coverage_percent).sum::<f64>() / n;
        let minimum = targets
            .iter()
            .map(|t| t.coverage_percent)
            .fold(f64::INFINITY, f64::min);
        let maximum = targets
            .iter()
            .map(|t| t.coverage_percent)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut recommendations = Vec::new();
        if minimum < self.settings.floor_percent {
            recommendations.push(Recommendation::AddMoreSatellites);
        }
        if average < self.settings.adjust_below_percent {
            recommendations.push(Recommendation::AdjustOrbitalParameters);
        }

        for target in targets.iter().filter(|t| t.below_floor) {
            log::info!(
                "Target {} covered {:.1}% of the window, below the {:.0}% floor",
                target.target_id,
                target.coverage_percent,
                self.settings.floor_percent
            );
        }

        Ok(ConstellationReport {
            window_start: start,
            window_end: end,
            targets,
            average_coverage_percent: average,
            minimum_coverage_percent: minimum,
            maximum_coverage_percent: maximum,
            optimization_score: 0.7 * average + 0.3 * minimum,
            recommendations,
            truncated: per_target.iter().any(|t| t.truncated),
        })
    }
}
