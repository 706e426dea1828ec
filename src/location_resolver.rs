//! Location Resolution Module
//!
//! This module turns free-text place names into coordinates via a geocoding
//! service, caching both hits and misses by normalized name.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::LookupCache;
use crate::config::GeocodingConfig;
use crate::models::Coordinate;

/// Maps a place name to a coordinate, `None` when the name is unknown.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place_name: &str) -> Result<Option<Coordinate>>;
}

/// Nominatim (OpenStreetMap) search client
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

/// One entry of a Nominatim `format=json` search response
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    /// Create a new client
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .with_context(|| "Failed to create geocoding HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, place_name: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(place_name)
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, place_name: &str) -> Result<Option<Coordinate>> {
        debug!("Calling the geocoding API");
        let places: Vec<NominatimPlace> = self
            .client
            .get(self.search_url(place_name))
            .send()
            .await
            .with_context(|| format!("Geocoding request for '{place_name}' failed"))?
            .error_for_status()
            .with_context(|| format!("Geocoding service rejected '{place_name}'"))?
            .json()
            .await
            .with_context(|| "Failed to parse Nominatim search response")?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .with_context(|| format!("Invalid latitude '{}'", place.lat))?;
        let longitude: f64 = place
            .lon
            .parse()
            .with_context(|| format!("Invalid longitude '{}'", place.lon))?;

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            place.display_name.as_deref().unwrap_or(place_name),
            latitude,
            longitude
        );
        Ok(Some(Coordinate::new(latitude, longitude)))
    }
}

/// Service for resolving place names, backed by a shared cache
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<LookupCache<String, Option<Coordinate>>>,
}

impl LocationResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        cache: Arc<LookupCache<String, Option<Coordinate>>>,
    ) -> Self {
        Self { geocoder, cache }
    }

    /// Cache key: trimmed, lower-cased name
    #[must_use]
    pub fn cache_key(place_name: &str) -> String {
        place_name.trim().to_lowercase()
    }

    /// Resolve a place name to coordinates.
    ///
    /// Lookup failures are logged and resolved as not found; both outcomes
    /// are cached so a failing name is not retried for the cache lifetime.
    pub async fn resolve(&self, place_name: &str) -> Option<Coordinate> {
        let key = Self::cache_key(place_name);

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Geocode cache hit for '{}'", key);
            return cached;
        }

        let result = match self.geocoder.geocode(place_name).await {
            Ok(Some(coordinate)) => {
                info!(
                    "Geocoded '{}' → ({})",
                    place_name,
                    coordinate.format_coordinates()
                );
                Some(coordinate)
            }
            Ok(None) => {
                debug!("No geocoding results for '{}'", place_name);
                None
            }
            Err(e) => {
                warn!("Geocoding failed for '{}': {:#}", place_name, e);
                None
            }
        };

        self.cache.put(key, result).await;
        result
    }
}
