//! Coordinate model for route points and geocoding results

use serde::{Deserialize, Serialize};

/// WGS84 coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Route geometry in travel order
pub type Polyline = Vec<Coordinate>;

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from a GeoJSON `[lon, lat]` position
    #[must_use]
    pub fn from_lon_lat(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Key fragment rounded to 4 decimals (~11 m)
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }

    /// Point at fraction `f` of the straight line (in degrees) towards `other`
    #[must_use]
    pub fn lerp(&self, other: &Coordinate, f: f64) -> Coordinate {
        Coordinate::new(
            self.latitude + (other.latitude - self.latitude) * f,
            self.longitude + (other.longitude - self.longitude) * f,
        )
    }
}
