//! Price estimation with graceful degradation.
//!
//! A primary strategy (external scoring process, HTTP service, anything
//! implementing [`PriceStrategy`]) is tried once per estimation; any failure
//! is absorbed and answered with a deterministic heuristic. Ride publishing
//! and live matching must not block or fail just because the external
//! estimator is slow or absent.

use std::io;

use serde::{Deserialize, Serialize};

use crate::routing::DEFAULT_SPEED_KMH;
use crate::traits::PriceStrategy;

/// Base fare in currency units.
pub const DEFAULT_BASE_PRICE: f64 = 100.0;

/// Per-kilometer rate in currency units.
pub const PER_KM_RATE: f64 = 6.0;

/// Fraction of the base fare added per unit of demand.
pub const DEMAND_SURCHARGE_RATE: f64 = 0.15;

/// Trip feature set fed to the primary strategy.
///
/// This is the wire shape of the external estimator contract: input is this
/// struct serialized as JSON, output is `{"price": number}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripFeatures {
    pub distance_km: f64,
    pub duration_min: f64,
    pub seats: u32,
    /// Departure time (unix timestamp, seconds), when known.
    pub when: Option<i64>,
}

impl TripFeatures {
    /// Derive features from a trip distance, assuming the default effective
    /// road speed for the duration.
    pub fn from_distance(distance_km: f64, seats: u32, when: Option<i64>) -> Self {
        Self {
            distance_km,
            duration_min: (distance_km / DEFAULT_SPEED_KMH * 60.0).round(),
            seats,
            when,
        }
    }
}

/// Errors from a primary price strategy.
#[derive(Debug)]
pub enum EstimateError {
    Io(io::Error),
    Http(reqwest::Error),
    Json(serde_json::Error),
    /// The external process exited abnormally or produced unusable output.
    Process(String),
    TimedOut,
    Unavailable,
}

impl From<io::Error> for EstimateError {
    fn from(err: io::Error) -> Self {
        EstimateError::Io(err)
    }
}

impl From<reqwest::Error> for EstimateError {
    fn from(err: reqwest::Error) -> Self {
        EstimateError::Http(err)
    }
}

impl From<serde_json::Error> for EstimateError {
    fn from(err: serde_json::Error) -> Self {
        EstimateError::Json(err)
    }
}

/// Deterministic fallback price.
///
/// `round(base + distance_km * 6 + base * 0.15 * demand)`
pub fn heuristic_price(base: f64, distance_km: f64, demand: f64) -> f64 {
    (base + distance_km * PER_KM_RATE + base * DEMAND_SURCHARGE_RATE * demand).round()
}

/// Two-tier price estimator: primary strategy with heuristic fallback.
///
/// [`PriceEstimator::estimate`] never fails. The primary is tried at most
/// once per call; estimations share no mutable state, so concurrent calls
/// for different trips cannot interfere.
pub struct PriceEstimator {
    primary: Option<Box<dyn PriceStrategy + Send + Sync>>,
    /// Base fare fed to the fallback heuristic.
    pub base_price: f64,
    /// Demand factor fed to the fallback heuristic.
    pub demand: f64,
}

impl PriceEstimator {
    /// Estimator with no primary strategy; every call answers heuristically.
    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            base_price: DEFAULT_BASE_PRICE,
            demand: 1.0,
        }
    }

    /// Estimator that tries `primary` first and falls back on any failure.
    pub fn with_primary(primary: impl PriceStrategy + Send + Sync + 'static) -> Self {
        Self {
            primary: Some(Box::new(primary)),
            base_price: DEFAULT_BASE_PRICE,
            demand: 1.0,
        }
    }

    /// Estimate a price for the given features. Infallible: any primary
    /// failure (error, timeout, non-finite output) falls back to
    /// [`heuristic_price`].
    pub fn estimate(&self, features: &TripFeatures) -> f64 {
        if let Some(primary) = &self.primary {
            match primary.estimate(features) {
                Ok(price) if price.is_finite() => return price.round(),
                Ok(price) => {
                    tracing::debug!(price, "primary strategy returned non-finite price");
                }
                Err(err) => {
                    tracing::debug!(error = ?err, "primary price strategy failed");
                }
            }
        }

        heuristic_price(self.base_price, features.distance_km, self.demand)
    }
}
