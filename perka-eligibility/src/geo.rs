use perka_shared::Coordinates;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two WGS-84 positions, in meters.
///
/// Haversine formula. Pure; NaN in either input propagates to the result,
/// so callers validate coordinates first (`Coordinates::is_valid`).
pub fn distance_meters(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: Coordinates = Coordinates {
        latitude: 48.8566,
        longitude: 2.3522,
    };
    const LONDON: Coordinates = Coordinates {
        latitude: 51.5074,
        longitude: -0.1278,
    };

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(
            distance_meters(&PARIS, &LONDON),
            distance_meters(&LONDON, &PARIS)
        );
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert!(distance_meters(&PARIS, &PARIS).abs() < 1e-9);
    }

    #[test]
    fn paris_to_london_is_about_343km() {
        let d = distance_meters(&PARIS, &LONDON);
        assert!((d / 1000.0 - 343.5).abs() < 1.0, "got {d}m");
    }

    #[test]
    fn meridian_arc_of_100m() {
        let north = Coordinates::new(
            PARIS.latitude + (100.0 / EARTH_RADIUS_M).to_degrees(),
            PARIS.longitude,
        );
        let d = distance_meters(&PARIS, &north);
        assert!((d - 100.0).abs() < 1e-6, "got {d}m");
    }

    #[test]
    fn nan_propagates() {
        let broken = Coordinates::new(f64::NAN, 0.0);
        assert!(distance_meters(&broken, &PARIS).is_nan());
    }
}
