//! Great-circle geometry for route proximity scoring.
//!
//! Pure functions over coordinates; no external dependencies. The
//! point-to-segment helper treats the three points as a planar triangle,
//! which is accurate enough at the city scale the matcher operates over.

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coarse prefilter radius in degrees (~5 km at low latitudes).
pub const COARSE_RADIUS_DEG: f64 = 0.045;

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are inside the valid geographic ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
            && self.lat.is_finite()
            && self.lng.is_finite()
    }
}

/// Great-circle distance between two points in kilometers.
///
/// Symmetric, zero for identical points. The inner square-root argument is
/// clamped to non-negative so floating-point underflow near zero cannot
/// produce a NaN.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.max(0.0).sqrt().asin()
}

/// Approximate distance (km) from point `c` to the path between `a` and `b`.
///
/// Uses Heron's formula on the three pairwise haversine distances and reads
/// the triangle height off the area. If `a` and `b` coincide the path is a
/// point, so this degrades to `haversine_km(a, c)`. The area term is clamped
/// to non-negative: for near-collinear points rounding can push Heron's
/// product slightly below zero.
pub fn point_to_segment_km(a: Coordinate, b: Coordinate, c: Coordinate) -> f64 {
    let base = haversine_km(a, b);
    if base == 0.0 {
        return haversine_km(a, c);
    }

    let d_ac = haversine_km(a, c);
    let d_bc = haversine_km(b, c);
    let s = (base + d_ac + d_bc) / 2.0;
    let area = (s * (s - base) * (s - d_ac) * (s - d_bc)).max(0.0).sqrt();

    2.0 * area / base
}

/// Axis-aligned degree box around a point, for cheap candidate prefiltering
/// before exact scoring. Persistence layers can translate `contains` into an
/// indexed range query.
#[derive(Debug, Clone, Copy)]
pub struct SearchBox {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl SearchBox {
    pub fn around(center: Coordinate, radius_deg: f64) -> Self {
        Self {
            min_lat: center.lat - radius_deg,
            max_lat: center.lat + radius_deg,
            min_lng: center.lng - radius_deg,
            max_lng: center.lng + radius_deg,
        }
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let p = Coordinate::new(13.05, 80.25);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Chennai Central (13.08, 80.27) to Bangalore (12.97, 77.59)
        // Actual distance ~290 km
        let dist = haversine_km(Coordinate::new(13.08, 80.27), Coordinate::new(12.97, 77.59));
        assert!(dist > 270.0 && dist < 310.0, "Chennai to Bangalore should be ~290km, got {}", dist);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Coordinate::new(13.05, 80.25);
        let b = Coordinate::new(12.97, 80.22);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn test_haversine_non_negative() {
        let points = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(90.0, 0.0),
            Coordinate::new(-90.0, 180.0),
            Coordinate::new(13.05, 80.25),
            Coordinate::new(13.050000001, 80.250000001),
        ];
        for a in points {
            for b in points {
                let d = haversine_km(a, b);
                assert!(d >= 0.0 && d.is_finite(), "d({:?},{:?}) = {}", a, b, d);
            }
        }
    }

    #[test]
    fn test_segment_degenerates_to_point_distance() {
        let a = Coordinate::new(13.05, 80.25);
        let c = Coordinate::new(13.00, 80.28);
        assert_eq!(point_to_segment_km(a, a, c), haversine_km(a, c));
    }

    #[test]
    fn test_midpoint_lies_on_segment() {
        let a = Coordinate::new(13.05, 80.25);
        let b = Coordinate::new(12.95, 80.15);
        let mid = Coordinate::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0);
        let d = point_to_segment_km(a, b, mid);
        assert!(d < 0.05, "midpoint should be ~0 km off the path, got {}", d);
    }

    #[test]
    fn test_near_collinear_does_not_go_negative() {
        // Three nearly collinear points; Heron's product can round below zero
        let a = Coordinate::new(13.0, 80.0);
        let b = Coordinate::new(13.2, 80.2);
        let c = Coordinate::new(13.1, 80.1000000001);
        let d = point_to_segment_km(a, b, c);
        assert!(d >= 0.0 && d.is_finite());
    }

    #[test]
    fn test_offset_point_distance_is_plausible() {
        // Point ~11 km east of a north-south path
        let a = Coordinate::new(13.0, 80.0);
        let b = Coordinate::new(13.5, 80.0);
        let c = Coordinate::new(13.25, 80.1);
        let d = point_to_segment_km(a, b, c);
        assert!(d > 8.0 && d < 13.0, "expected ~11 km, got {}", d);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(13.05, 80.25).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_search_box_contains() {
        let center = Coordinate::new(13.05, 80.25);
        let boxed = SearchBox::around(center, COARSE_RADIUS_DEG);
        assert!(boxed.contains(center));
        assert!(boxed.contains(Coordinate::new(13.08, 80.22)));
        assert!(!boxed.contains(Coordinate::new(13.2, 80.25)));
        assert!(!boxed.contains(Coordinate::new(13.05, 80.4)));
    }
}
