//! Exposure Engine
//!
//! Walks a route polyline in time, samples the sun along each segment and
//! buckets the minutes of direct sunlight into the four vehicle quadrants.
//!
//! Two approximations are deliberate and keep output stable:
//! - heading is constant per segment (initial great-circle bearing);
//! - sub-samples are interpolated linearly in degrees, not along the geodesic.

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::geometry::{bearing, distance, normalize};
use crate::models::{Coordinate, ExposureTotals, Quadrant};
use crate::solar::SolarPositionProvider;

/// Spatial sampling resolution along a segment.
pub const SAMPLE_INTERVAL_KM: f64 = 5.0;

/// Sun closer than this to the nose or tail of the vehicle is ignored.
pub const SIDE_THRESHOLD_DEG: f64 = 30.0;

/// Upper bound of the counted band (180 - `SIDE_THRESHOLD_DEG`).
pub const REAR_THRESHOLD_DEG: f64 = 150.0;

/// Which quadrant a sun bearing falls in, given its angle relative to the
/// heading. `relative` must already be normalized into (-180, 180].
///
/// Returns `None` inside the front and rear dead zones. A relative angle of
/// exactly zero counts as left, but it always falls in the front dead zone.
#[must_use]
pub fn classify(relative: f64) -> Option<Quadrant> {
    let abs_rel = relative.abs();
    if !(SIDE_THRESHOLD_DEG..=REAR_THRESHOLD_DEG).contains(&abs_rel) {
        return None;
    }

    let front = abs_rel <= 90.0;
    let quadrant = if relative > 0.0 {
        if front {
            Quadrant::FrontRight
        } else {
            Quadrant::BackRight
        }
    } else if front {
        Quadrant::FrontLeft
    } else {
        Quadrant::BackLeft
    };
    Some(quadrant)
}

/// Seconds to a chrono delta at microsecond resolution
fn seconds_delta(seconds: f64) -> TimeDelta {
    TimeDelta::microseconds((seconds * 1_000_000.0).round() as i64)
}

/// Computes per-quadrant exposure for a route against a solar model
pub struct ExposureEngine<'a, S: SolarPositionProvider + ?Sized> {
    sun: &'a S,
}

impl<'a, S: SolarPositionProvider + ?Sized> ExposureEngine<'a, S> {
    pub fn new(sun: &'a S) -> Self {
        Self { sun }
    }

    /// Minutes of sun per quadrant for a trip of `total_duration_secs`
    /// starting at `departure` along `polyline`.
    ///
    /// Time is apportioned to segments by their share of the route length.
    /// Zero-length routes yield all-zero totals.
    pub fn compute(
        &self,
        polyline: &[Coordinate],
        total_duration_secs: f64,
        departure: DateTime<Tz>,
    ) -> ExposureTotals {
        let mut totals = ExposureTotals::default();

        let segment_distances: Vec<f64> = polyline
            .windows(2)
            .map(|pair| {
                distance(
                    pair[0].latitude,
                    pair[0].longitude,
                    pair[1].latitude,
                    pair[1].longitude,
                )
            })
            .collect();
        let total_distance: f64 = segment_distances.iter().sum();

        if total_distance == 0.0 {
            debug!(points = polyline.len(), "Zero-length route, no exposure");
            return totals;
        }

        let mut cursor = departure;

        for (pair, &segment_km) in polyline.windows(2).zip(&segment_distances) {
            let (start, end) = (pair[0], pair[1]);
            let segment_secs = total_duration_secs * (segment_km / total_distance);
            let heading = bearing(start.latitude, start.longitude, end.latitude, end.longitude);

            let samples = ((segment_km / SAMPLE_INTERVAL_KM).ceil() as usize).max(1);
            let sample_minutes = segment_secs / samples as f64 / 60.0;

            for k in 0..samples {
                let fraction = (k as f64 + 0.5) / samples as f64;
                let point = start.lerp(&end, fraction);
                let time = cursor + seconds_delta(segment_secs * fraction);

                let sun = match self.sun.sun_position(point, &time) {
                    Ok(sun) => sun,
                    Err(e) => {
                        warn!("Skipping sample at {}: {:#}", point.format_coordinates(), e);
                        continue;
                    }
                };

                if !sun.is_up() {
                    continue;
                }

                if let Some(quadrant) = classify(normalize(sun.azimuth - heading)) {
                    totals.add(quadrant, sample_minutes);
                }
            }

            cursor += seconds_delta(segment_secs);
        }

        debug!(
            front_left = totals.front_left,
            back_left = totals.back_left,
            front_right = totals.front_right,
            back_right = totals.back_right,
            "Exposure computed"
        );
        totals
    }
}

/// Convenience wrapper around [`ExposureEngine::compute`]
pub fn compute_exposure<S: SolarPositionProvider + ?Sized>(
    polyline: &[Coordinate],
    total_duration_secs: f64,
    departure: DateTime<Tz>,
    sun: &S,
) -> ExposureTotals {
    ExposureEngine::new(sun).compute(polyline, total_duration_secs, departure)
}
