//! Seat Recommendation Module
//!
//! Glue between the collaborators and the core: resolves both place names
//! concurrently, fetches the route, then runs the exposure engine and the
//! seat allocator and shapes the response.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::cache::LookupCache;
use crate::config::SeatifyConfig;
use crate::exposure::ExposureEngine;
use crate::location_resolver::{LocationResolver, NominatimGeocoder};
use crate::models::{Coordinate, Seat};
use crate::routing::{OsrmRouter, RouteResolver};
use crate::seats::{build_seat_list, round_to};
use crate::solar::{SolarPositionProvider, SpaSolarPosition};
use crate::{Result, SeatifyError};

/// Query parameters of `GET /seat_recommendation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatRecommendationQuery {
    pub start_location: String,
    pub end_location: String,
    /// Departure time, `HH:MM`
    pub time: String,
    /// Departure date, `YYYY-MM-DD`; today in the journey timezone if absent
    #[serde(default)]
    pub date: Option<String>,
}

/// Response body of `GET /seat_recommendation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRecommendation {
    pub front_left_minutes: f64,
    pub back_left_minutes: f64,
    pub front_right_minutes: f64,
    pub back_right_minutes: f64,
    pub seats: Vec<Seat>,
}

/// Parse `HH:MM` plus an optional `YYYY-MM-DD` into a zoned departure time.
///
/// A missing or blank date falls back to `today`.
pub fn parse_departure(
    time: &str,
    date: Option<&str>,
    timezone: Tz,
    today: NaiveDate,
) -> Result<DateTime<Tz>> {
    let day = match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| SeatifyError::validation(format!("date '{date}': {e}")))?,
        None => today,
    };

    let clock = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|e| SeatifyError::validation(format!("time '{time}': {e}")))?;

    timezone
        .from_local_datetime(&day.and_time(clock))
        .earliest()
        .ok_or_else(|| {
            SeatifyError::validation(format!("{day} {clock} does not exist in {timezone}"))
        })
}

/// Orchestrates one recommendation per request
pub struct SeatRecommendationService {
    locations: LocationResolver,
    routes: RouteResolver,
    sun: Arc<dyn SolarPositionProvider>,
    timezone: Tz,
    total_rows: u32,
}

impl SeatRecommendationService {
    pub fn new(
        locations: LocationResolver,
        routes: RouteResolver,
        sun: Arc<dyn SolarPositionProvider>,
        timezone: Tz,
        total_rows: u32,
    ) -> Self {
        Self {
            locations,
            routes,
            sun,
            timezone,
            total_rows,
        }
    }

    /// Wire the production collaborators from configuration
    pub fn from_config(config: &SeatifyConfig) -> anyhow::Result<Self> {
        let timezone = config.journey.tz()?;

        let locations = LocationResolver::new(
            Arc::new(NominatimGeocoder::new(&config.geocoding)?),
            Arc::new(LookupCache::new(
                config.cache.max_entries,
                config.cache.ttl(),
            )),
        );
        let routes = RouteResolver::new(
            Arc::new(OsrmRouter::new(&config.routing)?),
            Arc::new(LookupCache::new(
                config.cache.max_entries,
                config.cache.ttl(),
            )),
            config.cache.ttl(),
            config.cache.negative_ttl(),
        );

        Ok(Self::new(
            locations,
            routes,
            Arc::new(SpaSolarPosition::default()),
            timezone,
            config.journey.total_rows,
        ))
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    async fn resolve_named(&self, place_name: &str) -> Result<Coordinate> {
        self.locations
            .resolve(place_name)
            .await
            .ok_or_else(|| SeatifyError::location_not_found(place_name))
    }

    /// Compute per-quadrant totals and the seat list for one journey
    #[instrument(skip(self), fields(from = %query.start_location, to = %query.end_location))]
    pub async fn recommend(&self, query: &SeatRecommendationQuery) -> Result<SeatRecommendation> {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        let departure = parse_departure(&query.time, query.date.as_deref(), self.timezone, today)?;

        let (start, end) = tokio::join!(
            self.resolve_named(&query.start_location),
            self.resolve_named(&query.end_location),
        );
        let (start, end) = (start?, end?);

        let route = self.routes.get_route(start, end).await?;

        let exposure = ExposureEngine::new(self.sun.as_ref()).compute(
            &route.polyline,
            route.duration_secs,
            departure,
        );
        let seats = build_seat_list(&exposure, self.total_rows);

        info!(
            departure = %departure,
            sun_minutes = exposure.total(),
            "Recommendation ready"
        );

        Ok(SeatRecommendation {
            front_left_minutes: round_to(exposure.front_left, 2),
            back_left_minutes: round_to(exposure.back_left, 2),
            front_right_minutes: round_to(exposure.front_right, 2),
            back_right_minutes: round_to(exposure.back_right, 2),
            seats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location_resolver::Geocoder;
    use crate::routing::{Route, RouteProvider};
    use crate::solar::SunPosition;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{Datelike, Timelike};
    use chrono_tz::Asia::Kolkata;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::time::Duration;

    struct MapGeocoder(HashMap<&'static str, Coordinate>);

    #[async_trait]
    impl Geocoder for MapGeocoder {
        async fn geocode(&self, place_name: &str) -> anyhow::Result<Option<Coordinate>> {
            Ok(self.0.get(place_name).copied())
        }
    }

    struct StraightRouter {
        fail: bool,
    }

    #[async_trait]
    impl RouteProvider for StraightRouter {
        async fn route(
            &self,
            origin: Coordinate,
            destination: Coordinate,
        ) -> anyhow::Result<Route> {
            if self.fail {
                return Err(anyhow!("upstream timeout"));
            }
            Ok(Route {
                polyline: vec![origin, destination],
                duration_secs: 3600.0,
            })
        }
    }

    /// Sun due west, always up
    struct WestSun;

    impl SolarPositionProvider for WestSun {
        fn sun_position(
            &self,
            _at: Coordinate,
            _time: &DateTime<Tz>,
        ) -> anyhow::Result<SunPosition> {
            Ok(SunPosition {
                azimuth: 270.0,
                elevation: 40.0,
            })
        }
    }

    fn service(route_fails: bool) -> SeatRecommendationService {
        let geocoder = MapGeocoder(HashMap::from([
            ("Origin Town", Coordinate::new(0.0, 0.0)),
            ("North Town", Coordinate::new(0.5, 0.0)),
        ]));
        SeatRecommendationService::new(
            LocationResolver::new(
                Arc::new(geocoder),
                Arc::new(LookupCache::new(10, Duration::from_secs(60))),
            ),
            RouteResolver::new(
                Arc::new(StraightRouter { fail: route_fails }),
                Arc::new(LookupCache::new(10, Duration::from_secs(60))),
                Duration::from_secs(60),
                Duration::from_secs(60),
            ),
            Arc::new(WestSun),
            Kolkata,
            12,
        )
    }

    fn query(start: &str, end: &str) -> SeatRecommendationQuery {
        SeatRecommendationQuery {
            start_location: start.to_string(),
            end_location: end.to_string(),
            time: "09:30".to_string(),
            date: Some("2024-03-20".to_string()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_parse_departure_with_date() {
        let departure = parse_departure("07:45", Some("2024-06-01"), Kolkata, today()).unwrap();
        assert_eq!(departure.year(), 2024);
        assert_eq!(departure.month(), 6);
        assert_eq!(departure.day(), 1);
        assert_eq!(departure.hour(), 7);
        assert_eq!(departure.minute(), 45);
        assert_eq!(departure.timezone(), Kolkata);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn test_parse_departure_defaults_to_today(#[case] date: Option<&str>) {
        let departure = parse_departure("18:00", date, Kolkata, today()).unwrap();
        assert_eq!(departure.date_naive(), today());
    }

    #[rstest]
    #[case("25:00", Some("2024-06-01"))]
    #[case("9am", None)]
    #[case("09:00:00", None)]
    #[case("09:00", Some("01/06/2024"))]
    #[case("09:00", Some("2024-02-30"))]
    fn test_parse_departure_rejects_malformed(#[case] time: &str, #[case] date: Option<&str>) {
        let err = parse_departure(time, date, Kolkata, today()).unwrap_err();
        assert!(matches!(err, SeatifyError::Validation { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_recommend_end_to_end() {
        let result = service(false)
            .recommend(&query("Origin Town", "North Town"))
            .await
            .unwrap();

        assert_eq!(result.front_left_minutes, 60.0);
        assert_eq!(result.back_left_minutes, 0.0);
        assert_eq!(result.front_right_minutes, 0.0);
        assert_eq!(result.back_right_minutes, 0.0);
        assert_eq!(result.seats.len(), 60);
        assert_eq!(result.seats[0].seat_id, "L1A");
        assert_eq!(result.seats[0].exposure_minutes, 55.0);
        assert_eq!(result.seats[0].exposure_ratio, 1.0);
    }

    #[tokio::test]
    async fn test_unknown_location_names_the_place() {
        let err = service(false)
            .recommend(&query("Origin Town", "Qwxzzy Nowhere"))
            .await
            .unwrap_err();

        assert!(
            matches!(&err, SeatifyError::LocationNotFound { name } if name == "Qwxzzy Nowhere")
        );
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_start_location_reported_first() {
        let err = service(false)
            .recommend(&query("Atlantis", "El Dorado"))
            .await
            .unwrap_err();

        assert!(matches!(&err, SeatifyError::LocationNotFound { name } if name == "Atlantis"));
    }

    #[tokio::test]
    async fn test_route_failure_is_upstream() {
        let err = service(true)
            .recommend(&query("Origin Town", "North Town"))
            .await
            .unwrap_err();

        assert!(matches!(err, SeatifyError::Upstream { .. }));
        assert!(!err.is_input_error());
    }

    #[tokio::test]
    async fn test_bad_time_is_validation_error() {
        let mut bad = query("Origin Town", "North Town");
        bad.time = "quarter past nine".to_string();
        let err = service(false).recommend(&bad).await.unwrap_err();

        assert!(matches!(err, SeatifyError::Validation { .. }));
    }
}
