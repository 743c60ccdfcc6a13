use crate::types::{CarbonError, CarbonResult};
use std::f64::consts::PI;

/// WGS84 semi-major axis in meters
const WGS84_SEMI_MAJOR: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters
const WGS84_SEMI_MINOR: f64 = 6_356_752.3142;

/// Ground area in hectares of a square pixel on the WGS84 ellipsoid.
///
/// `pixel_size` is the angular edge length of the cell in degrees and
/// `center_lat` the latitude of its center. The area is the longitudinal
/// fraction of the ellipsoidal zone between the pixel's bounding
/// latitudes, so it shrinks toward the poles.
///
/// The pixel must lie entirely within [-90, 90] degrees latitude:
/// `|center_lat| + pixel_size / 2 <= 90`, otherwise the zone integral is
/// evaluated outside its domain and the request fails with
/// [`CarbonError::InvalidLatitude`].
pub fn area_of_pixel(pixel_size: f64, center_lat: f64) -> CarbonResult<f64> {
    if !pixel_size.is_finite() || pixel_size <= 0.0 {
        return Err(CarbonError::InvalidPixelSize(pixel_size));
    }
    let half = pixel_size / 2.0;
    if !center_lat.is_finite() || center_lat.abs() + half > 90.0 {
        return Err(CarbonError::InvalidLatitude {
            center_lat,
            pixel_size,
        });
    }

    let a = WGS84_SEMI_MAJOR;
    let b = WGS84_SEMI_MINOR;
    let e = (1.0 - (b / a).powi(2)).sqrt();

    // Area of the ellipsoidal zone from the equator up to latitude `lat`,
    // up to the constant longitudinal factor applied below.
    let zone_term = |lat: f64| -> f64 {
        let sin_lat = lat.to_radians().sin();
        let zm = 1.0 - e * sin_lat;
        let zp = 1.0 + e * sin_lat;
        PI * b * b * ((zp / zm).ln() / (2.0 * e) + sin_lat / (zp * zm))
    };

    let area_m2 = pixel_size / 360.0 * (zone_term(center_lat + half) - zone_term(center_lat - half));
    // m^2 -> ha
    Ok(area_m2 * 1e-4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Spherical small-pixel approximation with the WGS84 mean radius
    fn spherical_approx(pixel_size: f64, center_lat: f64) -> f64 {
        let r = 6_371_000.0_f64;
        let side = pixel_size.to_radians() * r;
        side * side * center_lat.to_radians().cos() * 1e-4
    }

    #[test]
    fn test_equator_matches_spherical_approximation() {
        for pixel_size in [0.0027, 0.005, 0.01] {
            let area = area_of_pixel(pixel_size, 0.0).unwrap();
            let approx = spherical_approx(pixel_size, 0.0);
            let rel = (area - approx).abs() / approx;
            assert!(
                rel < 0.01,
                "pixel_size {}: area {} vs spherical {} ({}% off)",
                pixel_size,
                area,
                approx,
                rel * 100.0
            );
        }
    }

    #[test]
    fn test_positive_and_decreasing_toward_poles() {
        let pixel_size = 0.0027;
        let mut previous = f64::MAX;
        for lat in [0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 89.0] {
            let area = area_of_pixel(pixel_size, lat).unwrap();
            assert!(area > 0.0, "area must stay positive at lat {}", lat);
            assert!(
                area < previous,
                "area must shrink toward the pole (lat {})",
                lat
            );
            previous = area;
        }
    }

    #[test]
    fn test_symmetric_about_equator() {
        let north = area_of_pixel(0.0027, 42.5).unwrap();
        let south = area_of_pixel(0.0027, -42.5).unwrap();
        assert_relative_eq!(north, south, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_latitude_outside_domain() {
        let result = area_of_pixel(1.0, 89.9);
        assert!(matches!(
            result,
            Err(CarbonError::InvalidLatitude { .. })
        ));

        let result = area_of_pixel(0.0027, -90.1);
        assert!(matches!(
            result,
            Err(CarbonError::InvalidLatitude { .. })
        ));
    }

    #[test]
    fn test_valid_at_domain_boundary() {
        // |lat| + half pixel exactly 90 is still valid
        let area = area_of_pixel(1.0, 89.5).unwrap();
        assert!(area > 0.0);
    }

    #[test]
    fn test_rejects_bad_pixel_size() {
        assert!(matches!(
            area_of_pixel(0.0, 0.0),
            Err(CarbonError::InvalidPixelSize(_))
        ));
        assert!(matches!(
            area_of_pixel(-0.5, 0.0),
            Err(CarbonError::InvalidPixelSize(_))
        ));
    }

    #[test]
    fn test_300m_pixel_magnitude() {
        // A 0.0027 degree cell is roughly 300 m on a side at the equator,
        // about 9 ha of ground.
        let area = area_of_pixel(0.0027, 0.0).unwrap();
        assert!(area > 8.0 && area < 10.0, "got {} ha", area);
    }
}
