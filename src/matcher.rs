//! Ride matching engine.
//!
//! Consumes a rider's trip request and a candidate set of published offers
//! (already restricted by the caller to eligible ones), filters by route
//! proximity, scores and ranks survivors, and attaches a price per result.

use rayon::prelude::*;

use crate::geo::{self, COARSE_RADIUS_DEG, Coordinate, SearchBox};
use crate::pricing::{PriceEstimator, TripFeatures};
use crate::traits::{OfferStatus, RideOffer};

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Maximum perpendicular distance (km) from a candidate's route for the
    /// rider's points to count as "on the way". Hard filter, not a penalty.
    pub proximity_threshold_km: f64,
    /// Effective approach speed for pickup ETA, km per minute.
    pub approach_speed_km_per_min: f64,
    /// Minimum reported ETA, modeling dispatch latency.
    pub min_eta_minutes: u32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            proximity_threshold_km: 5.0,
            approach_speed_km_per_min: 0.5,
            min_eta_minutes: 3,
        }
    }
}

/// Rejected trip request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripRequestError {
    InvalidOrigin,
    InvalidDestination,
    NoSeatsRequested,
}

/// A rider's search: validated at construction so the engine itself is total.
#[derive(Debug, Clone)]
pub struct TripRequest {
    origin: Coordinate,
    destination: Coordinate,
    seats: u32,
    departure_epoch: Option<i64>,
}

impl TripRequest {
    pub fn new(
        origin: Coordinate,
        destination: Coordinate,
        seats: u32,
        departure_epoch: Option<i64>,
    ) -> Result<Self, TripRequestError> {
        if !origin.is_valid() {
            return Err(TripRequestError::InvalidOrigin);
        }
        if !destination.is_valid() {
            return Err(TripRequestError::InvalidDestination);
        }
        if seats == 0 {
            return Err(TripRequestError::NoSeatsRequested);
        }

        Ok(Self {
            origin,
            destination,
            seats,
            departure_epoch,
        })
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn destination(&self) -> Coordinate {
        self.destination
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn departure_epoch(&self) -> Option<i64> {
        self.departure_epoch
    }
}

/// One ranked candidate. Ephemeral: recomputed per query, never persisted.
#[derive(Debug, Clone)]
pub struct MatchResult<Id> {
    pub offer_id: Id,
    /// Rider origin to candidate origin, km.
    pub pickup_km: f64,
    /// Rider destination to candidate destination, km.
    pub drop_km: f64,
    /// Both rider points lie within the proximity threshold of the
    /// candidate's route. Always true for returned results.
    pub along_route: bool,
    /// `1 / (1 + pickup_km + drop_km)`, rounded to 3 decimals.
    pub match_score: f64,
    pub price: f64,
    pub eta_minutes: u32,
}

/// Score and rank `candidates` for `trip`.
///
/// Candidates are expected to already be restricted to eligible offers
/// (seats, departure, status) — see [`filter_eligible`]; this is a pure
/// scoring pass over the snapshot it is given. Offers with missing or
/// out-of-range coordinates are skipped, never failing the batch. An empty
/// result is a valid outcome. Output is sorted by descending score; equal
/// scores keep their input order.
pub fn find_matches<R>(
    trip: &TripRequest,
    candidates: &[R],
    estimator: &PriceEstimator,
    options: MatchOptions,
) -> Vec<MatchResult<R::Id>>
where
    R: RideOffer + Sync,
    R::Id: Send,
{
    // Per-candidate work is independent; an indexed collect keeps input order.
    let scored: Vec<Option<MatchResult<R::Id>>> = candidates
        .par_iter()
        .map(|candidate| score_candidate(trip, candidate, estimator, &options))
        .collect();

    let mut results: Vec<MatchResult<R::Id>> = scored.into_iter().flatten().collect();

    // Stable sort: ties resolve to input order.
    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    results
}

fn score_candidate<R>(
    trip: &TripRequest,
    candidate: &R,
    estimator: &PriceEstimator,
    options: &MatchOptions,
) -> Option<MatchResult<R::Id>>
where
    R: RideOffer,
{
    let Some((origin, destination)) = candidate_route(candidate) else {
        tracing::warn!("skipping ride offer with missing or out-of-range coordinates");
        return None;
    };

    let pickup_km = geo::haversine_km(trip.origin(), origin);
    let drop_km = geo::haversine_km(trip.destination(), destination);

    let origin_to_path = geo::point_to_segment_km(origin, destination, trip.origin());
    let dest_to_path = geo::point_to_segment_km(origin, destination, trip.destination());

    if origin_to_path >= options.proximity_threshold_km
        || dest_to_path >= options.proximity_threshold_km
    {
        return None;
    }

    let match_score = round3(1.0 / (1.0 + pickup_km + drop_km));

    let price = match candidate.price().filter(|price| price.is_finite()) {
        Some(price) => price,
        None => {
            let route_km = geo::haversine_km(origin, destination);
            estimator.estimate(&TripFeatures::from_distance(
                route_km,
                trip.seats(),
                trip.departure_epoch(),
            ))
        }
    };

    let eta_minutes = (pickup_km / options.approach_speed_km_per_min)
        .round()
        .max(f64::from(options.min_eta_minutes)) as u32;

    Some(MatchResult {
        offer_id: candidate.id().clone(),
        pickup_km,
        drop_km,
        along_route: true,
        match_score,
        price,
        eta_minutes,
    })
}

/// Keep offers a rider may actually book: active, departing at or after
/// `now_epoch`, enough seats, and not published by `exclude_driver` (riders
/// never match their own offers).
pub fn filter_eligible<'a, R>(
    candidates: &'a [R],
    trip: &TripRequest,
    now_epoch: i64,
    exclude_driver: Option<&R::DriverId>,
) -> Vec<&'a R>
where
    R: RideOffer,
{
    candidates
        .iter()
        .filter(|offer| {
            offer.status() == OfferStatus::Active
                && offer.departure_epoch() >= now_epoch
                && offer.seats_available() >= trip.seats()
                && exclude_driver.is_none_or(|driver| offer.driver_id() != driver)
        })
        .collect()
}

/// Coarse degree-box pre-pass around the rider's endpoints. Cheap enough to
/// push down into an indexed persistence query; exact proximity scoring
/// still happens in [`find_matches`].
pub fn coarse_prefilter<'a, R>(trip: &TripRequest, candidates: &'a [R]) -> Vec<&'a R>
where
    R: RideOffer,
{
    let origin_box = SearchBox::around(trip.origin(), COARSE_RADIUS_DEG);
    let dest_box = SearchBox::around(trip.destination(), COARSE_RADIUS_DEG);

    candidates
        .iter()
        .filter(|offer| match (offer.origin(), offer.destination()) {
            (Some(origin), Some(destination)) => {
                origin_box.contains(origin) && dest_box.contains(destination)
            }
            _ => false,
        })
        .collect()
}

fn candidate_route<R: RideOffer>(candidate: &R) -> Option<(Coordinate, Coordinate)> {
    let origin = candidate.origin()?;
    let destination = candidate.destination()?;
    if !origin.is_valid() || !destination.is_valid() {
        return None;
    }
    Some((origin, destination))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
