// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Coord;

/// Approximate length of one degree of latitude, in meters.
/// Used to present [planar_distance] results in meters.
pub const METERS_PER_DEGREE: f64 = 111111.1;

/// Calculates the planar approximation of the distance between two
/// lat-lon positions. Longitude differences are scaled by the inverse
/// cosine of the mean latitude to account for meridian convergence.
/// Returns the result in degrees of latitude.
///
/// The approximation degenerates close to the poles and across the
/// antimeridian (180°/-180° longitude), where the flat-plane assumption
/// no longer holds.
pub fn planar_distance(a: Coord, b: Coord) -> f64 {
    let lon_scale = 1.0 / ((a.lat + b.lat) * 0.5).to_radians().cos();
    let d_lat = b.lat - a.lat;
    let d_lon = (b.lon - a.lon) * lon_scale;
    (d_lat * d_lat + d_lon * d_lon).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coord {
        Coord { lat, lon }
    }

    #[test]
    fn along_equator() {
        // No latitude difference and cos(0) == 1 - the result is exact.
        assert_eq!(planar_distance(c(0.0, 0.0), c(0.0, 1.0)), 1.0);
        assert_eq!(planar_distance(c(0.0, 2.0), c(0.0, -1.0)), 3.0);
    }

    #[test]
    fn along_meridian() {
        // Longitude does not change, so the scale factor is irrelevant.
        assert_eq!(planar_distance(c(1.0, 21.0), c(3.0, 21.0)), 2.0);
        assert_eq!(planar_distance(c(-0.5, 0.0), c(0.5, 0.0)), 1.0);
    }

    #[test]
    fn scales_longitude_by_latitude() {
        // At 60°N one degree of longitude stretches to two degree-units.
        let d = planar_distance(c(60.0, 0.0), c(60.0, 1.0));
        assert!((d - 2.0).abs() < 1e-9, "got {}", d);
    }

    #[test]
    fn symmetric() {
        let a = c(52.23024, 21.01062);
        let b = c(52.23852, 21.0446);
        assert_eq!(planar_distance(a, b), planar_distance(b, a));
    }
}
