//! Core domain traits for the ride matcher.
//!
//! These are intentionally minimal and domain-agnostic. Concrete apps should
//! implement them for their own data models.

use std::hash::Hash;

use crate::geo::Coordinate;
use crate::pricing::{EstimateError, TripFeatures};
use crate::routing::RouteMetrics;

/// Unique identifier for matcher entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A published ride offer under consideration for a trip request.
///
/// Offers are owned by the persistence layer; the matcher only reads a
/// snapshot. Geometry accessors return `None` when the stored record has no
/// usable coordinates, so one malformed document never aborts a batch.
pub trait RideOffer {
    type Id: Id;
    type DriverId: Id;

    fn id(&self) -> &Self::Id;

    /// Identity of the driver who published the offer.
    fn driver_id(&self) -> &Self::DriverId;

    /// Pickup point of the published route, if the record carries one.
    fn origin(&self) -> Option<Coordinate>;

    /// Drop-off point of the published route, if the record carries one.
    fn destination(&self) -> Option<Coordinate>;

    /// Seats still available on this offer.
    fn seats_available(&self) -> u32;

    /// Driver-fixed price, if any. `None` (or a non-finite value) means the
    /// matcher should attach an estimate instead.
    fn price(&self) -> Option<f64>;

    /// Scheduled departure (unix timestamp, seconds).
    fn departure_epoch(&self) -> i64;

    fn status(&self) -> OfferStatus;
}

impl<R: RideOffer> RideOffer for &R {
    type Id = R::Id;
    type DriverId = R::DriverId;

    fn id(&self) -> &Self::Id {
        (**self).id()
    }

    fn driver_id(&self) -> &Self::DriverId {
        (**self).driver_id()
    }

    fn origin(&self) -> Option<Coordinate> {
        (**self).origin()
    }

    fn destination(&self) -> Option<Coordinate> {
        (**self).destination()
    }

    fn seats_available(&self) -> u32 {
        (**self).seats_available()
    }

    fn price(&self) -> Option<f64> {
        (**self).price()
    }

    fn departure_epoch(&self) -> i64 {
        (**self).departure_epoch()
    }

    fn status(&self) -> OfferStatus {
        (**self).status()
    }
}

/// Lifecycle status of a published offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferStatus {
    Active,
    Ended,
    Cancelled,
}

/// Primary price estimation strategy.
///
/// Input is the trip feature set, output a single price. Any transport
/// (subprocess, HTTP, in-process model) satisfying this contract works; the
/// wrapping estimator absorbs every failure and falls back to a heuristic.
pub trait PriceStrategy {
    fn estimate(&self, features: &TripFeatures) -> Result<f64, EstimateError>;
}

/// Provides road-network distance/duration between two coordinates.
///
/// `None` means the collaborator is unavailable; callers degrade to a
/// straight-line fallback.
pub trait RouteMetricsProvider {
    fn metrics_between(&self, from: Coordinate, to: Coordinate) -> Option<RouteMetrics>;
}
