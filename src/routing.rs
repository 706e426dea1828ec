use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rand::RngExt;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::cache::LookupCache;
use crate::config::RoutingConfig;
use crate::models::{Coordinate, Polyline};
use crate::SeatifyError;

/// Driving route between two points
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub polyline: Polyline,
    /// Total travel time in seconds
    pub duration_secs: f64,
}

/// Maps an origin and destination to a driving route
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route>;
}

/// OSRM `route` service client
pub struct OsrmRouter {
    client: Client,
    base_url: String,
    profile: String,
}

impl OsrmRouter {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .with_context(|| "Failed to create routing HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
        })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            self.profile,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        )
    }
}

#[async_trait]
impl RouteProvider for OsrmRouter {
    #[instrument(skip(self))]
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        tracing::debug!("Calling the API");
        let response: ApiResponse = self
            .client
            .get(self.route_url(origin, destination))
            .send()
            .await
            .with_context(|| "Routing request failed")?
            .error_for_status()
            .with_context(|| "Routing service returned an error status")?
            .json()
            .await
            .with_context(|| "Failed to parse OSRM route response")?;

        response.into_route()
    }
}

#[derive(Debug, Deserialize)]
struct GeometryResponse {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    geometry: GeometryResponse,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteResponse>,
}

impl ApiResponse {
    fn into_route(self) -> Result<Route> {
        if self.code != "Ok" {
            return Err(anyhow!(
                "OSRM returned {}: {}",
                self.code,
                self.message.unwrap_or_default()
            ));
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or(anyhow!("No routes in response"))?;

        if !route.duration.is_finite() || route.duration < 0.0 {
            return Err(anyhow!("Invalid route duration {}", route.duration));
        }
        if route.geometry.coordinates.is_empty() {
            return Err(anyhow!("Route geometry is empty"));
        }

        Ok(Route {
            polyline: route
                .geometry
                .coordinates
                .into_iter()
                .map(Coordinate::from_lon_lat)
                .collect(),
            duration_secs: route.duration,
        })
    }
}

/// Cached outcome of a route lookup; failures keep their message
pub type CachedRoute = std::result::Result<Arc<Route>, String>;

/// Route lookups behind a shared cache keyed by rounded endpoints
pub struct RouteResolver {
    provider: Arc<dyn RouteProvider>,
    cache: Arc<LookupCache<String, CachedRoute>>,
    ttl: Duration,
    negative_ttl: Duration,
}

impl RouteResolver {
    pub fn new(
        provider: Arc<dyn RouteProvider>,
        cache: Arc<LookupCache<String, CachedRoute>>,
        ttl: Duration,
        negative_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            ttl,
            negative_ttl,
        }
    }

    #[must_use]
    pub fn cache_key(origin: &Coordinate, destination: &Coordinate) -> String {
        origin.cache_key() + ";" + &destination.cache_key()
    }

    /// Fetch (or replay) the route between two points.
    ///
    /// Failures are cached for the negative TTL and surface as
    /// [`SeatifyError::Upstream`].
    #[instrument(skip(self))]
    pub async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> crate::Result<Arc<Route>> {
        let key = Self::cache_key(&origin, &destination);

        if let Some(cached) = self.cache.get(&key).await {
            return cached.map_err(|message| SeatifyError::upstream("routing", message));
        }

        match self.provider.route(origin, destination).await {
            Ok(route) => {
                tracing::info!(
                    "Route fetched: {} points, {:.1} min",
                    route.polyline.len(),
                    route.duration_secs / 60.0
                );
                let route = Arc::new(route);
                let jitter: f32 = rand::rng().random_range(0.9..1.1);
                self.cache
                    .put_with_ttl(key, Ok(route.clone()), self.ttl.mul_f32(jitter))
                    .await;
                Ok(route)
            }
            Err(e) => {
                let message = format!("{e:#}");
                tracing::error!("Route fetch failed: {}", message);
                self.cache
                    .put_with_ttl(key, Err(message.clone()), self.negative_ttl)
                    .await;
                Err(SeatifyError::upstream("routing", message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRouter {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RouteProvider for CountingRouter {
        async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("HTTP 503"));
            }
            Ok(Route {
                polyline: vec![origin, destination],
                duration_secs: 600.0,
            })
        }
    }

    fn resolver(router: Arc<CountingRouter>) -> RouteResolver {
        RouteResolver::new(
            router,
            Arc::new(LookupCache::new(100, Duration::from_secs(3600))),
            Duration::from_secs(3600),
            Duration::from_secs(600),
        )
    }

    #[test]
    fn test_cache_key_rounds_endpoints() {
        let key = RouteResolver::cache_key(
            &Coordinate::new(28.613_93, 77.209_02),
            &Coordinate::new(27.175_01, 78.042_17),
        );
        assert_eq!(key, "28.6139,77.2090;27.1750,78.0422");
    }

    #[test]
    fn test_route_url_is_lon_lat() {
        let router = OsrmRouter::new(&RoutingConfig::default()).unwrap();
        let url = router.route_url(Coordinate::new(28.5, 77.25), Coordinate::new(27.0, 78.5));
        assert_eq!(
            url,
            "http://router.project-osrm.org/route/v1/driving/77.25,28.5;78.5,27?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_osrm_payload_parses_to_route() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "geometry": {"type": "LineString", "coordinates": [[77.2, 28.6], [77.5, 28.0], [78.0, 27.2]]},
                "duration": 12345.6,
                "distance": 230000.0
            }],
            "waypoints": []
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let route = response.into_route().unwrap();

        assert_eq!(route.duration_secs, 12345.6);
        assert_eq!(route.polyline.len(), 3);
        assert_eq!(route.polyline[0], Coordinate::new(28.6, 77.2));
        assert_eq!(route.polyline[2], Coordinate::new(27.2, 78.0));
    }

    #[test]
    fn test_osrm_error_code_is_rejected() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let err = response.into_route().unwrap_err();
        assert!(err.to_string().contains("NoRoute"));
    }

    #[test]
    fn test_osrm_empty_routes_rejected() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
        assert!(response.into_route().is_err());
    }

    #[tokio::test]
    async fn test_successful_route_is_cached() {
        let router = Arc::new(CountingRouter {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let resolver = resolver(router.clone());
        let a = Coordinate::new(12.97, 77.59);
        let b = Coordinate::new(13.08, 80.27);

        let first = resolver.get_route(a, b).await.unwrap();
        let second = resolver
            .get_route(Coordinate::new(12.970_01, 77.59), b)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(router.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_route_is_upstream_error_and_cached() {
        let router = Arc::new(CountingRouter {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let resolver = resolver(router.clone());
        let a = Coordinate::new(12.97, 77.59);
        let b = Coordinate::new(13.08, 80.27);

        let err = resolver.get_route(a, b).await.unwrap_err();
        assert!(matches!(err, SeatifyError::Upstream { .. }));
        let err = resolver.get_route(a, b).await.unwrap_err();
        assert!(matches!(err, SeatifyError::Upstream { .. }));
        assert_eq!(router.calls.load(Ordering::SeqCst), 1);
    }
}
