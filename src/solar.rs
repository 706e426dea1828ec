//! Solar position lookup
//!
//! Wraps the NREL SPA implementation from `solar_positioning` behind a small
//! trait so the exposure engine can be driven by a fixed sun in tests.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use solar_positioning::{spa, time::DeltaT, types::RefractionCorrection};

use crate::models::Coordinate;

/// Sun direction as seen from a point on the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Compass direction in degrees, 0 = North, clockwise
    pub azimuth: f64,
    /// Degrees above the horizon; <= 0 means no direct sun
    pub elevation: f64,
}

impl SunPosition {
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Source of sun azimuth/elevation for a place and instant.
///
/// Implementations must be pure computations: no network or disk access.
pub trait SolarPositionProvider: Send + Sync {
    fn sun_position(&self, at: Coordinate, time: &DateTime<Tz>) -> Result<SunPosition>;
}

/// SPA-backed provider for a ground-level observer with standard refraction
#[derive(Clone, Copy)]
pub struct SpaSolarPosition {
    /// Observer altitude in meters
    pub altitude: f64,
    pub refraction: Option<RefractionCorrection>,
}

impl Default for SpaSolarPosition {
    fn default() -> Self {
        Self {
            altitude: 0.0,
            refraction: Some(RefractionCorrection::standard()),
        }
    }
}

impl SolarPositionProvider for SpaSolarPosition {
    fn sun_position(&self, at: Coordinate, time: &DateTime<Tz>) -> Result<SunPosition> {
        let delta_t = DeltaT::estimate_from_date(time.year(), time.month())
            .with_context(|| format!("No DeltaT estimate for {}", time.date_naive()))?;

        let position = spa::solar_position(
            *time,
            at.latitude,
            at.longitude,
            self.altitude,
            delta_t,
            self.refraction,
        )
        .with_context(|| {
            format!(
                "Solar position failed at ({}) {}",
                at.format_coordinates(),
                time
            )
        })?;

        Ok(SunPosition {
            azimuth: position.azimuth(),
            elevation: position.elevation_angle(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    const DELHI: Coordinate = Coordinate {
        latitude: 28.6139,
        longitude: 77.2090,
    };

    #[test]
    fn test_midday_sun_is_high_and_southern_in_winter() {
        let noon = Kolkata.with_ymd_and_hms(2024, 12, 21, 12, 15, 0).unwrap();
        let sun = SpaSolarPosition::default().sun_position(DELHI, &noon).unwrap();

        assert!(sun.is_up());
        assert!(sun.elevation > 30.0 && sun.elevation < 45.0, "elevation {}", sun.elevation);
        assert!(sun.azimuth > 160.0 && sun.azimuth < 200.0, "azimuth {}", sun.azimuth);
    }

    #[test]
    fn test_midnight_sun_is_below_horizon() {
        let midnight = Kolkata.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap();
        let sun = SpaSolarPosition::default().sun_position(DELHI, &midnight).unwrap();

        assert!(!sun.is_up());
    }

    #[test]
    fn test_morning_sun_is_in_the_east() {
        let morning = Kolkata.with_ymd_and_hms(2024, 3, 20, 8, 0, 0).unwrap();
        let sun = SpaSolarPosition::default().sun_position(DELHI, &morning).unwrap();

        assert!(sun.is_up());
        assert!(sun.azimuth > 60.0 && sun.azimuth < 120.0, "azimuth {}", sun.azimuth);
    }
}
