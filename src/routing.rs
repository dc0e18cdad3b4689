//! Road-network route metrics (distance/duration) between two points.
//!
//! The matcher only consumes `{distance_km, duration_min}`; routing itself
//! belongs to an external collaborator. An OSRM HTTP adapter covers the
//! real thing, with a haversine provider as the always-available fallback
//! (ignores roads, but never down).

use serde::Deserialize;

use crate::geo::{self, Coordinate};
use crate::traits::RouteMetricsProvider;

/// Effective average road speed assumed when estimating durations.
pub const DEFAULT_SPEED_KMH: f64 = 28.0;

/// Floor for trip distance; billing below this is not meaningful.
pub const MIN_TRIP_KM: f64 = 0.5;

/// A route geometry as decoded coordinates.
///
/// Points are stored directly for internal processing; encoding to a compact
/// polyline format happens at API boundaries, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    points: Vec<Coordinate>,
}

impl RouteGeometry {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    /// Total great-circle length of the path in kilometers.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| geo::haversine_km(pair[0], pair[1]))
            .sum()
    }
}

/// Road metrics between two points, as consumed by the matcher and the
/// price estimator feature derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_min: f64,
    pub geometry: RouteGeometry,
}

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

/// OSRM `route/v1` adapter.
#[derive(Debug, Clone)]
pub struct OsrmRouting {
    config: RoutingConfig,
    client: reqwest::blocking::Client,
}

impl OsrmRouting {
    pub fn new(config: RoutingConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RouteMetricsProvider for OsrmRouting {
    fn metrics_between(&self, from: Coordinate, to: Coordinate) -> Option<RouteMetrics> {
        let url = format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=geojson",
            self.config.base_url, self.config.profile, from.lng, from.lat, to.lng, to.lat
        );

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>());

        let body = match response {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(error = ?err, "route metrics request failed");
                return None;
            }
        };

        let route = body.routes.into_iter().next()?;
        let points = route
            .geometry
            .map(|geometry| {
                geometry
                    .coordinates
                    .into_iter()
                    .map(|[lng, lat]| Coordinate::new(lat, lng))
                    .collect()
            })
            .unwrap_or_default();

        Some(RouteMetrics {
            distance_km: (route.distance / 1000.0 * 100.0).round() / 100.0,
            duration_min: (route.duration / 60.0).round(),
            geometry: RouteGeometry::new(points),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
    geometry: Option<OsrmGeometry>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[lng, lat]`.
    coordinates: Vec<[f64; 2]>,
}

/// Haversine-based route metrics provider.
///
/// Estimates duration from straight-line distance and an assumed speed.
/// Useful as a fallback when the routing collaborator is unavailable.
#[derive(Debug, Clone)]
pub struct HaversineRouting {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineRouting {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineRouting {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl RouteMetricsProvider for HaversineRouting {
    fn metrics_between(&self, from: Coordinate, to: Coordinate) -> Option<RouteMetrics> {
        let distance_km = geo::haversine_km(from, to).max(MIN_TRIP_KM);

        Some(RouteMetrics {
            distance_km,
            duration_min: (distance_km / self.speed_kmh * 60.0).round(),
            geometry: RouteGeometry::new(vec![from, to]),
        })
    }
}
