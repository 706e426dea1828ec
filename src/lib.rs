//! `Seatify` - sun-aware seat recommendations for road journeys
//!
//! This library resolves two place names to a driving route, integrates
//! the sun's position along it and ranks the vehicle's seats by how much
//! direct sunlight each one is expected to receive.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod exposure;
pub mod geometry;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod recommendation;
pub mod routing;
pub mod seats;
pub mod solar;
pub mod web;

// Re-export core types for public API
pub use cache::LookupCache;
pub use config::SeatifyConfig;
pub use error::SeatifyError;
pub use exposure::{ExposureEngine, compute_exposure};
pub use location_resolver::{Geocoder, LocationResolver, NominatimGeocoder};
pub use models::{Coordinate, ExposureTotals, Quadrant, Seat, SeatPosition, Side};
pub use recommendation::{SeatRecommendation, SeatRecommendationQuery, SeatRecommendationService};
pub use routing::{OsrmRouter, Route, RouteProvider, RouteResolver};
pub use seats::build_seat_list;
pub use solar::{SolarPositionProvider, SpaSolarPosition, SunPosition};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SeatifyError>;
