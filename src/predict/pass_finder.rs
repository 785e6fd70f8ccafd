use chrono::{DateTime, Duration, Utc};

use crate::abort::AbortHandle;
use crate::coordinates::{CoordinateTransform, LookAngles, Observer};
use crate::elements::SatelliteInfo;
use crate::predict::error::PredictError;
use crate::predict::types::{Pass, PassSearch, PassType, SearchSettings};
use crate::propagation::Ephemeris;
use crate::validation::{in_range, ValidationError};

/// Finds passes of one satellite over one observer.
///
/// The search alternates between two states: searching (coarse steps while
/// below the minimum elevation) and in-pass (fine steps while above it,
/// tracking the peak). Rise and set are refined by bisection down to the
/// configured resolution.
#[derive(Debug, Clone, Default)]
pub struct PassPredictor {
    transform: CoordinateTransform,
    settings: SearchSettings,
}

/// Why the sampling loop stopped early.
enum Halt {
    Budget,
    Failed(PredictError),
}

impl From<PredictError> for Halt {
    fn from(err: PredictError) -> Self {
        Halt::Failed(err)
    }
}

struct Sampler<'a> {
    ephemeris: &'a dyn Ephemeris,
    transform: &'a CoordinateTransform,
    observer: &'a Observer,
    abort: &'a AbortHandle,
    budget: u64,
    used: u64,
}

impl Sampler<'_> {
    fn look(&mut self, t: DateTime<Utc>) -> Result<Sample, Halt> {
        if self.used >= self.budget {
            return Err(Halt::Budget);
        }
        self.abort.check().map_err(PredictError::from)?;
        self.used += 1;

        let state = self.ephemeris.state_at(t).map_err(PredictError::from)?;
        Ok(Sample {
            time: t,
            look: self.transform.look_angles(self.observer, &state),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    time: DateTime<Utc>,
    look: LookAngles,
}

struct OpenPass {
    rise: Sample,
    peak: Sample,
}

impl OpenPass {
    fn track(&mut self, sample: Sample) {
        if sample.look.elevation_deg > self.peak.look.elevation_deg {
            self.peak = sample;
        }
    }
}

impl PassPredictor {
    pub fn new(transform: CoordinateTransform, settings: SearchSettings) -> Self {
        Self { transform, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Passes with elevation ≥ `min_elevation_deg` between `start` and `end`.
    ///
    /// A pass already in progress at `start` begins at `start`; one still in
    /// progress at `end` is closed at `end`.
    #[allow(clippy::too_many_arguments)]
    pub fn predict(
        &self,
        ephemeris: &dyn Ephemeris,
        satellite: &SatelliteInfo,
        observer: &Observer,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_elevation_deg: f64,
        abort: &AbortHandle,
    ) -> Result<PassSearch, PredictError> {
        observer.validate()?;
        self.validate_settings()?;
        in_range(
            "min_elevation_deg",
            min_elevation_deg,
            (-90.0..=90.0).contains(&min_elevation_deg),
            "[-90, 90]",
        )?;
        if end <= start {
            return Err(ValidationError::Invalid {
                field: "end",
                message: format!("search window end {end} is not after start {start}"),
            }
            .into());
        }

        let mut truncated = false;
        let mut end = end;
        if end - start > self.settings.max_horizon {
            end = start + self.settings.max_horizon;
            truncated = true;
            log::debug!(
                "Pass search for {} clipped to the maximum horizon of {} h",
                satellite.id,
                self.settings.max_horizon.num_hours()
            );
        }

        let mut sampler = Sampler {
            ephemeris,
            transform: &self.transform,
            observer,
            abort,
            budget: self.settings.max_samples,
            used: 0,
        };
        let mut passes = Vec::new();

        match self.scan(&mut sampler, satellite, start, end, min_elevation_deg, &mut passes) {
            Ok(()) => {}
            Err(Halt::Budget) => {
                log::debug!(
                    "Pass search for {} ran out of its {} sample budget",
                    satellite.id,
                    self.settings.max_samples
                );
                truncated = true;
            }
            Err(Halt::Failed(err)) => return Err(err),
        }

        Ok(PassSearch {
            passes,
            truncated,
            samples_used: sampler.used,
        })
    }

    fn scan(
        &self,
        sampler: &mut Sampler<'_>,
        satellite: &SatelliteInfo,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_el: f64,
        passes: &mut Vec<Pass>,
    ) -> Result<(), Halt> {
        let first = sampler.look(start)?;
        let mut open = if first.look.elevation_deg >= min_el {
            Some(OpenPass {
                rise: first,
                peak: first,
            })
        } else {
            None
        };
        let mut prev_above = open.is_some();
        let mut cursor = start;

        while cursor < end {
            match open.as_mut() {
                None => {
                    let next = (cursor + self.settings.coarse_step).min(end);
                    let sample = sampler.look(next)?;
                    let above = sample.look.elevation_deg >= min_el;

                    if above && !prev_above {
                        let rise = self.refine_rise(sampler, cursor, sample, min_el)?;
                        let mut pass = OpenPass { rise, peak: rise };
                        pass.track(sample);
                        open = Some(pass);
                        cursor = rise.time;
                    } else {
                        cursor = next;
                    }
                    prev_above = above;
                }
                Some(pass) => {
                    let next = (cursor + self.settings.fine_step).min(end);
                    let sample = sampler.look(next)?;

                    if sample.look.elevation_deg >= min_el {
                        pass.track(sample);
                        cursor = next;
                        continue;
                    }

                    let set = self.refine_set(sampler, cursor, next, min_el)?;
                    pass.track(set);
                    if let Some(done) = self.close(pass, set, satellite, sampler.observer) {
                        passes.push(done);
                    }
                    open = None;

                    // skip ahead so the same pass is not picked up again
                    cursor = (set.time + self.settings.guard).max(next);
                    if cursor >= end {
                        break;
                    }
                    prev_above = sampler.look(cursor)?.look.elevation_deg >= min_el;
                }
            }
        }

        if let Some(pass) = open {
            let last = if pass.peak.time == end {
                pass.peak
            } else {
                sampler.look(end)?
            };
            if let Some(done) = self.close(&pass, last, satellite, sampler.observer) {
                passes.push(done);
            }
        }

        Ok(())
    }

    /// `below` is known to be under the threshold and `above` at or over it.
    fn refine_rise(
        &self,
        sampler: &mut Sampler<'_>,
        below: DateTime<Utc>,
        above: Sample,
        min_el: f64,
    ) -> Result<Sample, Halt> {
        let mut low = below;
        let mut high = above;

        while high.time - low > self.settings.resolution {
            let mid = low + (high.time - low) / 2;
            let sample = sampler.look(mid)?;
            if sample.look.elevation_deg >= min_el {
                high = sample;
            } else {
                low = mid;
            }
        }
        Ok(high)
    }

    /// `above` is at or over the threshold and `below` under it.
    fn refine_set(
        &self,
        sampler: &mut Sampler<'_>,
        above: DateTime<Utc>,
        below: DateTime<Utc>,
        min_el: f64,
    ) -> Result<Sample, Halt> {
        let mut low = sampler.look(above)?;
        let mut high = below;

        while high - low.time > self.settings.resolution {
            let mid = low.time + (high - low.time) / 2;
            let sample = sampler.look(mid)?;
            if sample.look.elevation_deg >= min_el {
                low = sample;
            } else {
                high = mid;
            }
        }
        Ok(low)
    }

    fn close(
        &self,
        pass: &OpenPass,
        set: Sample,
        satellite: &SatelliteInfo,
        observer: &Observer,
    ) -> Option<Pass> {
        if set.time <= pass.rise.time {
            return None;
        }
        let sun = self.transform.sun_elevation_deg(observer, pass.rise.time);
        let duration = set.time - pass.rise.time;

        Some(Pass {
            satellite_id: satellite.id.clone(),
            satellite_name: satellite.name.clone(),
            start: pass.rise.time,
            end: set.time,
            max_elevation_time: pass.peak.time,
            duration_minutes: duration.num_milliseconds() as f64 / 60_000.0,
            max_elevation_deg: pass.peak.look.elevation_deg,
            azimuth_deg: pass.peak.look.azimuth_deg,
            rise_azimuth_deg: pass.rise.look.azimuth_deg,
            set_azimuth_deg: set.look.azimuth_deg,
            pass_type: PassType::from_sun_elevation(sun, self.settings.twilight_threshold_deg),
        })
    }

    fn validate_settings(&self) -> Result<(), ValidationError> {
        let positive = |field: &'static str, step: Duration| {
            if step > Duration::zero() {
                Ok(())
            } else {
                Err(ValidationError::Invalid {
                    field,
                    message: "must be a positive duration".to_string(),
                })
            }
        };
        positive("coarse_step", self.settings.coarse_step)?;
        positive("fine_step", self.settings.fine_step)?;
        positive("resolution", self.settings.resolution)?;
        positive("max_horizon", self.settings.max_horizon)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{OrbitalElements, SatelliteRecord};
    use crate::propagation::{PropagationModel, Propagator};
    use chrono::TimeZone;

    fn leo() -> SatelliteRecord {
        let epoch = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        SatelliteRecord::new(
            "leo-1",
            "LEO 1",
            OrbitalElements::new(6878.0, 0.0005, 97.4, 30.0, 0.0, 0.0, epoch).unwrap(),
        )
    }

    fn search(
        predictor: &PassPredictor,
        record: &SatelliteRecord,
        hours: i64,
        min_el: f64,
    ) -> PassSearch {
        let ephemeris = Propagator::new(PropagationModel::TwoBody)
            .prepare(&record.elements)
            .unwrap();
        let observer = Observer::new(52.0, 4.4, 0.0).unwrap();
        let start = record.elements.epoch;
        predictor
            .predict(
                ephemeris.as_ref(),
                &record.info,
                &observer,
                start,
                start + Duration::hours(hours),
                min_el,
                &AbortHandle::new(),
            )
            .unwrap()
    }

    #[test]
    fn boundaries_sit_on_the_threshold_and_peak_is_highest() {
        let predictor = PassPredictor::default();
        let record = leo();
        let result = search(&predictor, &record, 24, 5.0);
        assert!(!result.truncated);
        assert!(!result.passes.is_empty());

        let ephemeris = Propagator::new(PropagationModel::TwoBody)
            .prepare(&record.elements)
            .unwrap();
        let observer = Observer::new(52.0, 4.4, 0.0).unwrap();
        let transform = CoordinateTransform::default();
        let elevation = |t| {
            transform
                .look_angles(&observer, &ephemeris.state_at(t).unwrap())
                .elevation_deg
        };

        for pass in &result.passes {
            assert!(pass.start < pass.end);
            assert!(pass.max_elevation_deg >= 5.0);
            // within one resolution step of the crossing
            assert!(elevation(pass.start) >= 5.0);
            assert!(elevation(pass.start - Duration::seconds(1)) < 5.0);
            assert!(elevation(pass.end) >= 5.0);
            assert!(elevation(pass.end + Duration::seconds(1)) < 5.0);
            assert!(pass.max_elevation_deg >= elevation(pass.start));
            assert!(pass.max_elevation_deg >= elevation(pass.end));
            assert!(pass.max_elevation_time >= pass.start && pass.max_elevation_time <= pass.end);
        }
        for pair in result.passes.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn tiny_budget_truncates() {
        let predictor = PassPredictor::new(
            CoordinateTransform::default(),
            SearchSettings {
                max_samples: 100,
                ..SearchSettings::default()
            },
        );
        let result = search(&predictor, &leo(), 24, 5.0);
        assert!(result.truncated);
        assert_eq!(result.samples_used, 100);
    }

    #[test]
    fn horizon_beyond_the_maximum_is_clipped() {
        let predictor = PassPredictor::new(
            CoordinateTransform::default(),
            SearchSettings {
                max_horizon: Duration::hours(6),
                ..SearchSettings::default()
            },
        );
        let record = leo();
        let result = search(&predictor, &record, 24, 5.0);
        assert!(result.truncated);
        let limit = record.elements.epoch + Duration::hours(6);
        assert!(result.passes.iter().all(|p| p.end <= limit));
    }

    #[test]
    fn geostationary_overhead_spans_the_whole_window() {
        let epoch = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let record = SatelliteRecord::new(
            "geo",
            "GEO",
            OrbitalElements::new(42_164.0, 0.0, 0.0, 0.0, 0.0, 0.0, epoch).unwrap(),
        );
        let ephemeris = Propagator::new(PropagationModel::TwoBody)
            .prepare(&record.elements)
            .unwrap();
        let transform = CoordinateTransform::default();
        // put the observer under the satellite
        let overhead = ephemeris.state_at(epoch).unwrap().position_km;
        let sub_point = transform.inertial_to_geodetic(overhead, epoch);
        let observer = Observer::new(0.0, sub_point.longitude_deg, 0.0).unwrap();

        let result = PassPredictor::default()
            .predict(
                ephemeris.as_ref(),
                &record.info,
                &observer,
                epoch,
                epoch + Duration::hours(2),
                10.0,
                &AbortHandle::new(),
            )
            .unwrap();
        assert_eq!(result.passes.len(), 1);
        assert_eq!(result.passes[0].start, epoch);
        assert_eq!(result.passes[0].end, epoch + Duration::hours(2));
    }

    #[test]
    fn cancelled_search_reports_cancelled() {
        let record = leo();
        let ephemeris = Propagator::new(PropagationModel::TwoBody)
            .prepare(&record.elements)
            .unwrap();
        let abort = AbortHandle::new();
        abort.cancel();
        let err = PassPredictor::default()
            .predict(
                ephemeris.as_ref(),
                &record.info,
                &Observer::new(0.0, 0.0, 0.0).unwrap(),
                record.elements.epoch,
                record.elements.epoch + Duration::hours(1),
                10.0,
                &abort,
            )
            .unwrap_err();
        assert_eq!(err, PredictError::Cancelled);
    }

    #[test]
    fn empty_window_is_a_validation_error() {
        let record = leo();
        let ephemeris = Propagator::new(PropagationModel::TwoBody)
            .prepare(&record.elements)
            .unwrap();
        let t = record.elements.epoch;
        let err = PassPredictor::default()
            .predict(
                ephemeris.as_ref(),
                &record.info,
                &Observer::new(0.0, 0.0, 0.0).unwrap(),
                t,
                t,
                10.0,
                &AbortHandle::new(),
            )
            .unwrap_err();
        assert!(matches!(err, PredictError::Validation(_)));
    }
}
